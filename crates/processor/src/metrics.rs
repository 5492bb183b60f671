use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use std::sync::atomic::AtomicU64;


lazy_static::lazy_static! {
    pub static ref PROGRESS: Gauge<f64, AtomicU64> = Default::default();
    pub static ref LAST_BLOCK: Gauge = Default::default();
    pub static ref TRANSFERS: Counter = Default::default();
    pub static ref NEURON_REGISTRATIONS: Counter = Default::default();
    pub static ref BURN_CHANGES: Counter = Default::default();
    pub static ref ANOMALIES_SKIPPED: Counter = Default::default();
}


pub fn register_metrics(registry: &mut Registry) {
    registry.register(
        "tao_progress_blocks_per_second",
        "Overall block processing speed",
        PROGRESS.clone()
    );
    registry.register(
        "tao_last_block",
        "Last committed block",
        LAST_BLOCK.clone()
    );
    registry.register(
        "tao_transfers",
        "Number of indexed balance transfers",
        TRANSFERS.clone()
    );
    registry.register(
        "tao_neuron_registrations",
        "Number of indexed neuron registrations",
        NEURON_REGISTRATIONS.clone()
    );
    registry.register(
        "tao_burn_changes",
        "Number of recorded burn and difficulty changes",
        BURN_CHANGES.clone()
    );
    registry.register(
        "tao_anomalies_skipped",
        "Number of tracked values dropped by the anomaly filter",
        ANOMALIES_SKIPPED.clone()
    );
}
