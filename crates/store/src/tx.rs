use crate::entities::{Entity, EntityKind};
use crate::store::{ChangeSet, EntityStore, Row, Storage};
use anyhow::Context;
use std::collections::BTreeMap;
use tao_primitives::{BlockRef, Netuid};


/// Pending writes of one block on top of a [Storage].
///
/// Reads observe the pending writes first.
pub struct BlockTx<'a, S: ?Sized> {
    storage: &'a S,
    block: BlockRef,
    rows: BTreeMap<(EntityKind, String), Row>
}


impl<'a, S: Storage + ?Sized> BlockTx<'a, S> {
    pub fn new(storage: &'a S, block: BlockRef) -> Self {
        Self {
            storage,
            block,
            rows: BTreeMap::new()
        }
    }

    pub fn block(&self) -> &BlockRef {
        &self.block
    }

    pub fn pending(&self) -> usize {
        self.rows.len()
    }

    pub fn into_changes(self) -> ChangeSet {
        ChangeSet {
            block: self.block,
            rows: self.rows.into_values().collect()
        }
    }

    pub fn commit(self) -> anyhow::Result<()> {
        let storage = self.storage;
        let block = self.block.clone();
        storage.commit(self.into_changes()).with_context(|| {
            format!("failed to commit block {}", block)
        })
    }

    fn get_stored<E: Entity>(&self, id: &str) -> anyhow::Result<Option<E>> {
        self.storage.get(E::KIND, id)?.map(|bytes| {
            borsh::from_slice(&bytes).with_context(|| {
                format!("failed to decode {} {}", E::KIND, id)
            })
        }).transpose()
    }
}


impl<'a, S: Storage + ?Sized> EntityStore for BlockTx<'a, S> {
    fn get<E: Entity>(&self, id: &str) -> anyhow::Result<Option<E>> {
        if let Some(row) = self.rows.get(&(E::KIND, id.to_string())) {
            let entity = borsh::from_slice(&row.data)?;
            return Ok(Some(entity))
        }
        self.get_stored(id)
    }

    fn save<E: Entity>(&mut self, entity: &E) -> anyhow::Result<()> {
        let key = (E::KIND, entity.id().to_string());
        let series = entity.series();

        let stale_series = match self.rows.get(&key) {
            Some(row) => row.stale_series,
            None if series.is_some() => {
                self.get_stored::<E>(entity.id())?
                    .and_then(|prev| prev.series())
                    .filter(|prev| Some(*prev) != series)
            },
            None => None
        };

        let row = Row {
            kind: E::KIND,
            id: entity.id().to_string(),
            data: borsh::to_vec(entity)?,
            series,
            stale_series
        };
        self.rows.insert(key, row);
        Ok(())
    }

    fn find_latest<E: Entity>(&self, netuid: Netuid) -> anyhow::Result<Option<E>> {
        let pending = self.rows.values()
            .filter(|row| row.kind == E::KIND)
            .filter_map(|row| {
                let (n, block) = row.series?;
                (n == netuid).then_some((block, row.id.as_str()))
            })
            .max();

        let stored = self.storage.find_latest(E::KIND, netuid)?;

        let id = match (pending, stored.as_ref()) {
            (None, None) => return Ok(None),
            (Some((_, id)), None) => id,
            (None, Some((_, id))) => id.as_str(),
            (Some(p), Some((block, id))) => std::cmp::max(p, (*block, id.as_str())).1
        };

        self.get(id)
    }
}
