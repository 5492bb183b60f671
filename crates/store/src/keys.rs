use crate::entities::EntityKind;
use tao_primitives::{BlockNumber, Netuid};


pub(crate) fn entity_key(kind: EntityKind, id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + id.len());
    key.push(kind.tag());
    key.extend_from_slice(id.as_bytes());
    key
}


pub(crate) fn kind_prefix(kind: EntityKind) -> [u8; 1] {
    [kind.tag()]
}


pub(crate) fn series_prefix(kind: EntityKind, netuid: Netuid) -> [u8; 3] {
    let netuid = netuid.to_be_bytes();
    [kind.tag(), netuid[0], netuid[1]]
}


/// `tag ++ netuid(BE) ++ block(BE) ++ id`, so keys of one netuid sort by block
pub(crate) fn series_key(kind: EntityKind, netuid: Netuid, block: BlockNumber, id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(11 + id.len());
    key.extend_from_slice(&series_prefix(kind, netuid));
    key.extend_from_slice(&block.to_be_bytes());
    key.extend_from_slice(id.as_bytes());
    key
}


/// Upper bound of all series keys for the netuid
pub(crate) fn series_upper_bound(kind: EntityKind, netuid: Netuid) -> Vec<u8> {
    let mut key = series_prefix(kind, netuid).to_vec();
    key.extend_from_slice(&[0xff; 9]);
    key
}


pub(crate) fn parse_series_key(key: &[u8]) -> anyhow::Result<(BlockNumber, String)> {
    anyhow::ensure!(key.len() >= 11, "series key is too short");
    let mut block = [0; 8];
    block.copy_from_slice(&key[3..11]);
    let id = std::str::from_utf8(&key[11..])?.to_string();
    Ok((BlockNumber::from_be_bytes(block), id))
}
