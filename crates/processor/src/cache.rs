use std::collections::HashMap;
use tao_primitives::Netuid;
use tao_store::{Burn, EntityStore};
use tracing::debug;


/// Tracked per-subnet chain parameter
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Metric {
    Burn
}


impl Metric {
    pub fn name(self) -> &'static str {
        match self {
            Metric::Burn => "burn"
        }
    }
}


/// Last observed value of every `(metric, netuid)` pair.
///
/// A pair is loaded from the store on first access only, absent values included.
/// Values set while processing a block are staged until [RunningStateCache::confirm].
/// Owned by the block processor, never shared.
#[derive(Debug, Default)]
pub struct RunningStateCache {
    values: HashMap<(Metric, Netuid), Option<i128>>,
    staged: HashMap<(Metric, Netuid), i128>,
    loads: usize
}


impl RunningStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<S: EntityStore>(
        &mut self,
        store: &S,
        metric: Metric,
        netuid: Netuid
    ) -> anyhow::Result<Option<i128>> {
        if let Some(value) = self.staged.get(&(metric, netuid)) {
            return Ok(Some(*value))
        }
        if let Some(value) = self.values.get(&(metric, netuid)) {
            return Ok(*value)
        }

        let value = match metric {
            Metric::Burn => store.find_latest::<Burn>(netuid)?.map(|row| row.amount)
        };

        debug!(
            metric = metric.name(),
            netuid = netuid,
            value = ?value,
            "loaded last known value"
        );

        self.loads += 1;
        self.values.insert((metric, netuid), value);
        Ok(value)
    }

    /// Visible to subsequent reads right away, kept only after [RunningStateCache::confirm]
    pub fn set(&mut self, metric: Metric, netuid: Netuid, value: i128) {
        self.staged.insert((metric, netuid), value);
    }

    /// Staged values became durable
    pub fn confirm(&mut self) {
        for (key, value) in self.staged.drain() {
            self.values.insert(key, Some(value));
        }
    }

    /// Drops staged values.
    ///
    /// Their pairs are reloaded from the store on next access, since it is unknown
    /// whether the writes behind them were committed.
    pub fn discard(&mut self) {
        for (key, _) in self.staged.drain() {
            self.values.remove(&key);
        }
    }

    /// Number of store lookups made so far
    pub fn loads(&self) -> usize {
        self.loads
    }
}
