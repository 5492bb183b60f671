mod entities;
mod keys;
mod memory;
mod rocks;
mod store;
mod tx;


pub use entities::*;
pub use memory::MemoryStorage;
pub use rocks::RocksStorage;
pub use store::*;
pub use tx::BlockTx;
