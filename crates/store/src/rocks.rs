use crate::entities::EntityKind;
use crate::keys::{entity_key, kind_prefix, parse_series_key, series_key, series_prefix, series_upper_bound};
use crate::store::{ChangeSet, Storage};
use anyhow::Context;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options as RocksOptions, WriteBatch};
use std::path::Path;
use tao_primitives::{BlockNumber, BlockRef, Name, Netuid};


const CF_ENTITIES: Name = "ENTITIES";
const CF_SERIES: Name = "SERIES";
const CF_META: Name = "META";

const CURSOR_KEY: &[u8] = b"cursor";


type RocksDB = rocksdb::DB;


pub struct RocksStorage {
    db: RocksDB
}


impl RocksStorage {
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let mut options = RocksOptions::default();
        options.create_if_missing(true);
        options.create_missing_column_families(true);
        options.set_wal_compression_type(rocksdb::DBCompressionType::Zstd);

        let db = RocksDB::open_cf_descriptors(&options, path.as_ref(), [
            ColumnFamilyDescriptor::new(CF_ENTITIES, {
                let mut options = RocksOptions::default();
                options.set_compression_type(rocksdb::DBCompressionType::Lz4);
                options
            }),
            ColumnFamilyDescriptor::new(CF_SERIES, RocksOptions::default()),
            ColumnFamilyDescriptor::new(CF_META, RocksOptions::default())
        ]).with_context(|| {
            format!("failed to open database at {}", path.as_ref().display())
        })?;

        Ok(Self {
            db
        })
    }

    fn cf_handle(&self, name: &str) -> &ColumnFamily {
        self.db.cf_handle(name).unwrap()
    }
}


impl Storage for RocksStorage {
    fn get(&self, kind: EntityKind, id: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let value = self.db.get_cf(self.cf_handle(CF_ENTITIES), entity_key(kind, id))?;
        Ok(value)
    }

    fn find_latest(&self, kind: EntityKind, netuid: Netuid) -> anyhow::Result<Option<(BlockNumber, String)>> {
        let prefix = series_prefix(kind, netuid);
        let mut it = self.db.raw_iterator_cf(self.cf_handle(CF_SERIES));
        it.seek_for_prev(series_upper_bound(kind, netuid));
        let latest = match it.key() {
            Some(key) if key.starts_with(&prefix) => Some(parse_series_key(key)?),
            _ => None
        };
        it.status()?;
        Ok(latest)
    }

    fn count(&self, kind: EntityKind) -> anyhow::Result<usize> {
        let prefix = kind_prefix(kind);
        let mut count = 0;
        let it = self.db.iterator_cf(
            self.cf_handle(CF_ENTITIES),
            IteratorMode::From(&prefix, Direction::Forward)
        );
        for item in it {
            let (key, _) = item?;
            if !key.starts_with(&prefix) {
                break
            }
            count += 1;
        }
        Ok(count)
    }

    fn get_cursor(&self) -> anyhow::Result<Option<BlockRef>> {
        let maybe_bytes = self.db.get_pinned_cf(self.cf_handle(CF_META), CURSOR_KEY)?;
        Ok(if let Some(bytes) = maybe_bytes {
            let cursor = borsh::from_slice(bytes.as_ref())?;
            Some(cursor)
        } else {
            None
        })
    }

    fn commit(&self, changes: ChangeSet) -> anyhow::Result<()> {
        let entities = self.cf_handle(CF_ENTITIES);
        let series = self.cf_handle(CF_SERIES);

        let mut batch = WriteBatch::default();
        for row in changes.rows.iter() {
            if let Some((netuid, block)) = row.stale_series {
                batch.delete_cf(series, series_key(row.kind, netuid, block, &row.id));
            }
            if let Some((netuid, block)) = row.series {
                batch.put_cf(series, series_key(row.kind, netuid, block, &row.id), b"");
            }
            batch.put_cf(entities, entity_key(row.kind, &row.id), &row.data);
        }
        batch.put_cf(self.cf_handle(CF_META), CURSOR_KEY, borsh::to_vec(&changes.block)?);

        self.db.write(batch)?;
        Ok(())
    }
}
