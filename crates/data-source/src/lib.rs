mod standard;
mod types;


pub use standard::StandardDataSource;
pub use types::*;
