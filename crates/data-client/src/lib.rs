pub mod reqwest;
mod types;


pub use types::*;
