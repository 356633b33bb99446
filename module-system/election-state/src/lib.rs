//! Storage and state management interfaces for the election ledger.

#![deny(missing_docs)]

pub mod codec;
pub mod config;
mod containers;
mod events;
pub mod key;
mod mem_storage;
#[cfg(feature = "native")]
mod rocksdb_storage;
/// Trait and type definitions related to the [`Storage`] trait.
pub mod storage;
mod working_set;

#[cfg(test)]
mod state_tests;

use std::fmt::Display;
use std::str;

pub use containers::{AccessoryStateMap, StateMap, StateValue};
pub use events::{Event, EventKey, EventValue};
pub use mem_storage::InMemoryStorage;
#[cfg(feature = "native")]
pub use rocksdb_storage::RocksDbStorage;
pub use storage::{OrderedWrites, Storage, StorageKey, StorageValue};
pub use working_set::{
    AccessoryWorkingSet, PrefixScan, StateCheckpoint, StateReaderAndWriter, WorkingSet,
};

/// A prefix prepended to each key before insertion and retrieval from the storage.
///
/// All state containers of a module share the same working set, so every
/// container gets its own prefix to keep their keys apart. Prefixes built with
/// [`Prefix::for_field`] end with a `/`, which guarantees that no field prefix
/// is a prefix of another field's prefix.
#[derive(
    borsh::BorshDeserialize,
    borsh::BorshSerialize,
    Debug,
    PartialEq,
    Eq,
    Clone,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Prefix {
    prefix: Vec<u8>,
}

impl Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match str::from_utf8(&self.prefix) {
            Ok(s) => {
                write!(f, "{:?}", s)
            }
            Err(_) => {
                write!(f, "0x{}", hex::encode(&self.prefix))
            }
        }
    }
}

impl Prefix {
    /// Creates a new prefix from a byte vector.
    pub fn new(prefix: Vec<u8>) -> Self {
        Self { prefix }
    }

    /// Creates the prefix of the state field `field` of module `module`,
    /// i.e. `"<module>/<field>/"`.
    pub fn for_field(module: &str, field: &str) -> Self {
        Self::new(format!("{module}/{field}/").into_bytes())
    }

    /// Returns the raw bytes of the prefix.
    pub fn as_bytes(&self) -> &[u8] {
        &self.prefix
    }

    /// Returns the length in bytes of the prefix.
    pub fn len(&self) -> usize {
        self.prefix.len()
    }

    /// Returns `true` if the prefix is empty, `false` otherwise.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Returns a new prefix allocated on the fly, by extending the current
    /// prefix with the given bytes.
    pub fn extended(&self, bytes: &[u8]) -> Self {
        let mut prefix = self.clone();
        prefix.extend(bytes.iter().copied());
        prefix
    }
}

impl Extend<u8> for Prefix {
    fn extend<T: IntoIterator<Item = u8>>(&mut self, iter: T) {
        self.prefix.extend(iter)
    }
}
