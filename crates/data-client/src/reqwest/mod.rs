mod client;
mod lines;

pub use client::*;
pub use lines::*;
