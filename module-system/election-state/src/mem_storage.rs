use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use anyhow::anyhow;

use crate::storage::{OrderedWrites, ScanItem, Storage, StorageKey, StorageValue};

type Table = BTreeMap<StorageKey, StorageValue>;

#[derive(Default)]
struct Tables {
    state: Table,
    accessory: Table,
}

/// A [`Storage`] kept entirely in memory, backed by ordered maps.
///
/// Clones share the same underlying tables.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply(table: &mut Table, writes: &OrderedWrites) {
    for (key, value) in &writes.ordered_writes {
        table.insert(key.clone(), value.clone());
    }
}

impl Storage for InMemoryStorage {
    type RuntimeConfig = ();

    fn with_config(_config: Self::RuntimeConfig) -> Result<Self, anyhow::Error> {
        Ok(Self::new())
    }

    fn get(&self, key: &StorageKey) -> anyhow::Result<Option<StorageValue>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| anyhow!("In-memory storage lock is poisoned"))?;
        Ok(tables.state.get(key).cloned())
    }

    fn get_accessory(&self, key: &StorageKey) -> anyhow::Result<Option<StorageValue>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| anyhow!("In-memory storage lock is poisoned"))?;
        Ok(tables.accessory.get(key).cloned())
    }

    fn scan_prefix<'a>(&'a self, prefix: &[u8]) -> Box<dyn Iterator<Item = ScanItem> + 'a> {
        let tables = match self.tables.read() {
            Ok(tables) => tables,
            Err(_) => {
                return Box::new(std::iter::once(Err(anyhow!(
                    "In-memory storage lock is poisoned"
                ))))
            }
        };

        // The lock is not held across calls, so the matching range is copied out.
        // Values are reference counted, which keeps this cheap.
        let start = StorageKey::from(prefix.to_vec());
        let matching: Vec<ScanItem> = tables
            .state
            .range(start..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| Ok((key.clone(), value.clone())))
            .collect();

        Box::new(matching.into_iter())
    }

    fn commit(
        &self,
        state: &OrderedWrites,
        accessory: &OrderedWrites,
    ) -> Result<(), anyhow::Error> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| anyhow!("In-memory storage lock is poisoned"))?;
        apply(&mut tables.state, state);
        apply(&mut tables.accessory, accessory);
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
    fn test_scan_prefix_is_ordered_and_bounded() {
        let storage = InMemoryStorage::new();
        storage
            .commit(
                &writes(&[
                    ("a/2", "two"),
                    ("a/1", "one"),
                    ("ab", "outside"),
                    ("b/1", "other"),
                ]),
                &OrderedWrites::default(),
            )
            .unwrap();

        let scanned: Vec<_> = storage
            .scan_prefix(b"a/")
            .map(|item| item.unwrap())
            .collect();
        assert_eq!(
            scanned,
            vec![
                (StorageKey::from("a/1"), StorageValue::from("one")),
                (StorageKey::from("a/2"), StorageValue::from("two")),
            ]
        );

        // Restartable: a second scan sees the same data.
        assert_eq!(storage.scan_prefix(b"a/").count(), 2);
        assert_eq!(storage.scan_prefix(b"c").count(), 0);
    }

    #[test]
    fn test_accessory_is_separate() {
        let storage = InMemoryStorage::new();
        storage
            .commit(
                &OrderedWrites::default(),
                &writes(&[("public", "value")]),
            )
            .unwrap();

        let key = StorageKey::from("public");
        assert_eq!(storage.get(&key).unwrap(), None);
        assert_eq!(
            storage.get_accessory(&key).unwrap(),
            Some(StorageValue::from("value"))
        );
        assert_eq!(storage.scan_prefix(b"pub").count(), 0);
    }

    #[test]
    fn test_commit_overwrites() {
        let storage = InMemoryStorage::new();
        storage
            .commit(&writes(&[("k", "v")]), &OrderedWrites::default())
            .unwrap();
        storage
            .commit(&writes(&[("k", "w")]), &OrderedWrites::default())
            .unwrap();
        assert_eq!(
            storage.get(&StorageKey::from("k")).unwrap(),
            Some(StorageValue::from("w"))
        );
    }
}
