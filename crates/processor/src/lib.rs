pub mod anomaly;
pub mod cache;
pub mod chain_state;
pub mod config;
pub mod indexer;
pub mod metrics;
pub mod processor;
pub mod progress;
pub mod ss58;
