use crate::entities::EntityKind;
use crate::keys::{entity_key, kind_prefix, parse_series_key, series_key, series_prefix, series_upper_bound};
use crate::store::{ChangeSet, Storage};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use tao_primitives::{BlockNumber, BlockRef, Netuid};


/// Non persistent [Storage] for tests and dry runs
#[derive(Default)]
pub struct MemoryStorage {
    state: RwLock<MemoryState>
}


#[derive(Default)]
struct MemoryState {
    entities: BTreeMap<Vec<u8>, Vec<u8>>,
    series: BTreeSet<Vec<u8>>,
    cursor: Option<BlockRef>
}


impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}


impl Storage for MemoryStorage {
    fn get(&self, kind: EntityKind, id: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let state = self.state.read();
        Ok(state.entities.get(&entity_key(kind, id)).cloned())
    }

    fn find_latest(&self, kind: EntityKind, netuid: Netuid) -> anyhow::Result<Option<(BlockNumber, String)>> {
        let state = self.state.read();
        let from = series_prefix(kind, netuid).to_vec();
        let to = series_upper_bound(kind, netuid);
        state.series.range(from..to)
            .next_back()
            .map(|key| parse_series_key(key))
            .transpose()
    }

    fn count(&self, kind: EntityKind) -> anyhow::Result<usize> {
        let state = self.state.read();
        let prefix = kind_prefix(kind);
        Ok(state.entities.range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .count())
    }

    fn get_cursor(&self) -> anyhow::Result<Option<BlockRef>> {
        Ok(self.state.read().cursor.clone())
    }

    fn commit(&self, changes: ChangeSet) -> anyhow::Result<()> {
        let mut state = self.state.write();
        for row in changes.rows {
            if let Some((netuid, block)) = row.stale_series {
                state.series.remove(&series_key(row.kind, netuid, block, &row.id));
            }
            if let Some((netuid, block)) = row.series {
                state.series.insert(series_key(row.kind, netuid, block, &row.id));
            }
            state.entities.insert(entity_key(row.kind, &row.id), row.data);
        }
        state.cursor = Some(changes.block);
        Ok(())
    }
}
