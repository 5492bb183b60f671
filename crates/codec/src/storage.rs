use codec::Encode;
use tao_primitives::Name;
use xxhash_rust::xxh64::xxh64;
use crate::payload::Payload;


#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StorageHasher {
    Identity
}


#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct StorageEntry {
    pub pallet: Name,
    pub item: Name,
    pub hasher: StorageHasher
}


impl StorageEntry {
    pub fn of(payload: Payload) -> Option<StorageEntry> {
        match payload {
            Payload::Burn => Some(StorageEntry {
                pallet: "SubtensorModule",
                item: "Burn",
                hasher: StorageHasher::Identity
            }),
            _ => None
        }
    }

    pub fn prefix(&self) -> Vec<u8> {
        let mut key = Vec::with_capacity(32);
        key.extend_from_slice(&twox_128(self.pallet.as_bytes()));
        key.extend_from_slice(&twox_128(self.item.as_bytes()));
        key
    }

    /// Full key of a storage map entry
    pub fn map_key<K: Encode>(&self, key: &K) -> Vec<u8> {
        let mut out = self.prefix();
        match self.hasher {
            StorageHasher::Identity => key.encode_to(&mut out)
        }
        out
    }
}


pub fn twox_128(data: &[u8]) -> [u8; 16] {
    let mut out = [0; 16];
    out[..8].copy_from_slice(&xxh64(data, 0).to_le_bytes());
    out[8..].copy_from_slice(&xxh64(data, 1).to_le_bytes());
    out
}
