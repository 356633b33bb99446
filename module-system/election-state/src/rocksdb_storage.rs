use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use rocksdb::{ColumnFamily, Direction, IteratorMode, Options, WriteBatch, DB};
use tracing::debug;

use crate::config::StorageConfig;
use crate::storage::{OrderedWrites, ScanItem, Storage, StorageKey, StorageValue};

const STATE_CF: &str = "state";
const ACCESSORY_CF: &str = "accessory";

/// A [`Storage`] persisted in a RocksDB database.
///
/// Regular and accessory state live in two column families of the same
/// database, so a commit covering both is a single atomic write batch.
#[derive(Clone)]
pub struct RocksDbStorage {
    db: Arc<DB>,
}

impl RocksDbStorage {
    /// Opens the database at `path`, creating it if needed.
    pub fn with_path(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let mut options = Options::default();
        options.create_if_missing(true);
        options.create_missing_column_families(true);

        let db = DB::open_cf(&options, path.as_ref(), [STATE_CF, ACCESSORY_CF])
            .with_context(|| format!("Failed to open storage at {}", path.as_ref().display()))?;

        Ok(Self { db: Arc::new(db) })
    }

    fn column_family(&self, name: &str) -> anyhow::Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| anyhow!("Column family {name} is missing"))
    }

    fn get_from(&self, name: &str, key: &StorageKey) -> anyhow::Result<Option<StorageValue>> {
        let cf = self.column_family(name)?;
        let value = self.db.get_cf(cf, key.as_bytes())?;
        Ok(value.map(StorageValue::from))
    }

    fn write_into(
        &self,
        batch: &mut WriteBatch,
        name: &str,
        writes: &OrderedWrites,
    ) -> anyhow::Result<()> {
        let cf = self.column_family(name)?;
        for (key, value) in &writes.ordered_writes {
            batch.put_cf(cf, key.as_bytes(), value.value());
        }
        Ok(())
    }
}

impl Storage for RocksDbStorage {
    type RuntimeConfig = StorageConfig;

    fn with_config(config: Self::RuntimeConfig) -> Result<Self, anyhow::Error> {
        Self::with_path(config.path)
    }

    fn get(&self, key: &StorageKey) -> anyhow::Result<Option<StorageValue>> {
        self.get_from(STATE_CF, key)
    }

    fn get_accessory(&self, key: &StorageKey) -> anyhow::Result<Option<StorageValue>> {
        self.get_from(ACCESSORY_CF, key)
    }

    fn scan_prefix<'a>(&'a self, prefix: &[u8]) -> Box<dyn Iterator<Item = ScanItem> + 'a> {
        let cf = match self.column_family(STATE_CF) {
            Ok(cf) => cf,
            Err(e) => return Box::new(std::iter::once(Err(e))),
        };

        let prefix = prefix.to_vec();
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(&prefix, Direction::Forward))
            .take_while(move |item| match item {
                Ok((key, _)) => key.starts_with(&prefix),
                Err(_) => true,
            })
            .map(|item| {
                let (key, value) = item?;
                Ok((
                    StorageKey::from(key.into_vec()),
                    StorageValue::from(value.into_vec()),
                ))
            });

        Box::new(iter)
    }

    fn commit(
        &self,
        state: &OrderedWrites,
        accessory: &OrderedWrites,
    ) -> Result<(), anyhow::Error> {
        if state.is_empty() && accessory.is_empty() {
            return Ok(());
        }

        let mut batch = WriteBatch::default();
        self.write_into(&mut batch, STATE_CF, state)?;
        self.write_into(&mut batch, ACCESSORY_CF, accessory)?;

        debug!(
            state_writes = state.ordered_writes.len(),
            accessory_writes = accessory.ordered_writes.len(),
            "Committing to RocksDB"
        );
        self.db.write(batch)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writes(pairs: &[(&'static str, &'static str)]) -> OrderedWrites {
        OrderedWrites {
            ordered_writes: pairs
                .iter()
                .map(|(k, v)| (StorageKey::from(*k), StorageValue::from(*v)))
                .collect(),
        }
    }

    #[test]
    fn test_values_persist_across_reopen() {
        let tmpdir = tempfile::tempdir().unwrap();
        {
            let storage = RocksDbStorage::with_path(tmpdir.path()).unwrap();
            storage
                .commit(
                    &writes(&[("k1", "v1"), ("k2", "v2")]),
                    &writes(&[("outcome", "DRAW")]),
                )
                .unwrap();
        }

        let storage = RocksDbStorage::with_config(StorageConfig {
            path: tmpdir.path().to_path_buf(),
        })
        .unwrap();
        assert_eq!(
            storage.get(&StorageKey::from("k1")).unwrap(),
            Some(StorageValue::from("v1"))
        );
        assert_eq!(
            storage.get_accessory(&StorageKey::from("outcome")).unwrap(),
            Some(StorageValue::from("DRAW"))
        );
        assert_eq!(storage.get(&StorageKey::from("outcome")).unwrap(), None);
    }

    #[test]
    fn test_scan_prefix_stops_at_prefix_end() {
        let tmpdir = tempfile::tempdir().unwrap();
        let storage = RocksDbStorage::with_path(tmpdir.path()).unwrap();
        storage
            .commit(
                &writes(&[
                    ("v/E1/bob", "b"),
                    ("v/E1/alice", "a"),
                    ("v/E2/alice", "c"),
                    ("w", "d"),
                ]),
                &OrderedWrites::default(),
            )
            .unwrap();

        let keys: Vec<_> = storage
            .scan_prefix(b"v/E1/")
            .map(|item| item.unwrap().0)
            .collect();
        assert_eq!(
            keys,
            vec![StorageKey::from("v/E1/alice"), StorageKey::from("v/E1/bob")]
        );

        storage
            .commit(&writes(&[("v/E1/carol", "e")]), &OrderedWrites::default())
            .unwrap();
        assert_eq!(storage.scan_prefix(b"v/E1/").count(), 3);
    }

    #[test]
    fn test_empty_commit_is_a_no_op() {
        let tmpdir = tempfile::tempdir().unwrap();
        let storage = RocksDbStorage::with_path(tmpdir.path()).unwrap();
        storage
            .commit(&OrderedWrites::default(), &OrderedWrites::default())
            .unwrap();
        assert_eq!(storage.scan_prefix(b"").count(), 0);
    }
}
