mod error;
mod payload;
mod record;
mod rules;
mod storage;
mod value;
mod versioned;


pub use error::*;
pub use payload::*;
pub use record::*;
pub use rules::{DecodeRule, Layout, RULES};
pub use storage::*;
pub use value::*;
pub use versioned::*;
