use crate::entities::{Entity, EntityKind};
use std::sync::Arc;
use tao_primitives::{BlockNumber, BlockRef, Netuid};


/// Typed access to indexed entities
pub trait EntityStore {
    fn get<E: Entity>(&self, id: &str) -> anyhow::Result<Option<E>>;

    /// Returns the stored entity or a zero valued one.
    /// Nothing is persisted until [EntityStore::save].
    fn get_or_create<E: Entity>(&self, id: &str) -> anyhow::Result<E> {
        Ok(self.get(id)?.unwrap_or_else(|| E::create(id)))
    }

    /// Insert or replace by id
    fn save<E: Entity>(&mut self, entity: &E) -> anyhow::Result<()>;

    /// Row of the highest block in the netuid series
    fn find_latest<E: Entity>(&self, netuid: Netuid) -> anyhow::Result<Option<E>>;
}


#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Row {
    pub kind: EntityKind,
    pub id: String,
    pub data: Vec<u8>,
    pub series: Option<(Netuid, BlockNumber)>,
    /// Series position of the previously stored version, when it moved
    pub stale_series: Option<(Netuid, BlockNumber)>
}


/// All writes of a single block
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ChangeSet {
    pub block: BlockRef,
    pub rows: Vec<Row>
}


/// Raw entity storage backend
pub trait Storage: Send + Sync {
    fn get(&self, kind: EntityKind, id: &str) -> anyhow::Result<Option<Vec<u8>>>;

    /// Block and id of the newest series row for the netuid
    fn find_latest(&self, kind: EntityKind, netuid: Netuid) -> anyhow::Result<Option<(BlockNumber, String)>>;

    fn count(&self, kind: EntityKind) -> anyhow::Result<usize>;

    /// Last committed block
    fn get_cursor(&self) -> anyhow::Result<Option<BlockRef>>;

    /// Applies all rows and moves the cursor to `changes.block` atomically
    fn commit(&self, changes: ChangeSet) -> anyhow::Result<()>;
}


impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn get(&self, kind: EntityKind, id: &str) -> anyhow::Result<Option<Vec<u8>>> {
        self.as_ref().get(kind, id)
    }

    fn find_latest(&self, kind: EntityKind, netuid: Netuid) -> anyhow::Result<Option<(BlockNumber, String)>> {
        self.as_ref().find_latest(kind, netuid)
    }

    fn count(&self, kind: EntityKind) -> anyhow::Result<usize> {
        self.as_ref().count(kind)
    }

    fn get_cursor(&self) -> anyhow::Result<Option<BlockRef>> {
        self.as_ref().get_cursor()
    }

    fn commit(&self, changes: ChangeSet) -> anyhow::Result<()> {
        self.as_ref().commit(changes)
    }
}
