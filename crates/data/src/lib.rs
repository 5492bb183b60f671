pub mod substrate;
mod types;


pub use types::*;
