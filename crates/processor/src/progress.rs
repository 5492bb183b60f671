use std::collections::VecDeque;
use std::time::{Duration, Instant};


/// Processing speed over a sliding time window
pub struct Progress {
    samples: VecDeque<(u64, Instant)>,
    window_size: usize,
    granularity: Duration,
    has_news: bool
}


impl Progress {
    pub fn new(window_size: usize, granularity: Duration) -> Self {
        Self {
            samples: VecDeque::with_capacity(window_size + 1),
            window_size: window_size.max(1),
            granularity,
            has_news: false
        }
    }

    pub fn set_current_value(&mut self, value: u64) {
        self.set_value_at(value, Instant::now())
    }

    fn set_value_at(&mut self, value: u64, time: Instant) {
        self.has_news = true;

        let (last_value, last_time) = match self.samples.back() {
            Some(last) => *last,
            None => {
                self.samples.push_back((value, time));
                return
            }
        };

        let value = value.max(last_value);

        // samples closer than `granularity` are merged, except the very first one
        if self.samples.len() > 1 && time <= last_time + self.granularity {
            if let Some(last) = self.samples.back_mut() {
                last.0 = value
            }
            return
        }

        self.samples.push_back((value, time));
        if self.samples.len() > self.window_size + 1 {
            self.samples.pop_front();
        }
    }

    pub fn get_current_value(&self) -> Option<u64> {
        self.samples.back().map(|(value, _)| *value)
    }

    pub fn has_news(&self) -> bool {
        self.has_news
    }

    /// Units per second
    pub fn speed(&mut self) -> f64 {
        self.has_news = false;
        let (Some(beg), Some(end)) = (self.samples.front(), self.samples.back()) else {
            return 0.0
        };
        let duration = end.1.duration_since(beg.1).as_secs_f64();
        if duration == 0.0 {
            return 0.0
        }
        (end.0 - beg.0) as f64 / duration
    }
}
