use std::fmt::Display;
use std::sync::Arc;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::codec::StateValueCodec;
use crate::Prefix;

/// `Key` type for the [`Storage`].
///
/// Keys are ordered by their raw bytes, which is the order every
/// [`Storage::scan_prefix`] implementation yields them in.
#[derive(
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    Serialize,
    Deserialize,
    BorshDeserialize,
    BorshSerialize,
)]
pub struct StorageKey {
    key: Arc<Vec<u8>>,
}

impl StorageKey {
    /// Creates a new [`StorageKey`] that combines a prefix and an already
    /// encoded key.
    pub fn new(prefix: &Prefix, encoded_key: &[u8]) -> Self {
        let mut full_key = Vec::<u8>::with_capacity(prefix.len() + encoded_key.len());
        full_key.extend_from_slice(prefix.as_bytes());
        full_key.extend_from_slice(encoded_key);

        Self {
            key: Arc::new(full_key),
        }
    }

    /// Creates a new [`StorageKey`] made of the prefix alone. Used by
    /// singleton containers such as [`crate::StateValue`].
    pub fn singleton(prefix: &Prefix) -> Self {
        Self {
            key: Arc::new(prefix.as_bytes().to_vec()),
        }
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    /// Returns `true` if the key begins with `prefix`.
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.key.starts_with(prefix)
    }
}

impl From<Vec<u8>> for StorageKey {
    fn from(key: Vec<u8>) -> Self {
        Self { key: Arc::new(key) }
    }
}

impl AsRef<[u8]> for StorageKey {
    fn as_ref(&self) -> &[u8] {
        &self.key
    }
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.as_bytes()))
    }
}

/// A serialized value suitable for storing. Internally uses an [`Arc<Vec<u8>>`] for cheap cloning.
#[derive(
    Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize, Default,
)]
pub struct StorageValue {
    value: Arc<Vec<u8>>,
}

impl From<Vec<u8>> for StorageValue {
    fn from(value: Vec<u8>) -> Self {
        Self {
            value: Arc::new(value),
        }
    }
}

impl StorageValue {
    /// Create a new storage value by serializing the input with the given codec.
    pub fn new<V, VC>(value: &V, codec: &VC) -> Result<Self, VC::Error>
    where
        VC: StateValueCodec<V>,
    {
        let encoded_value = codec.try_encode_value(value)?;
        Ok(Self {
            value: Arc::new(encoded_value),
        })
    }

    /// Get the bytes of this value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

/// The writes accumulated by a [`crate::StateCheckpoint`], in ascending key
/// order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OrderedWrites {
    /// Key-value pairs to be written, sorted by key.
    pub ordered_writes: Vec<(StorageKey, StorageValue)>,
}

impl OrderedWrites {
    /// Returns `true` if there is nothing to write.
    pub fn is_empty(&self) -> bool {
        self.ordered_writes.is_empty()
    }
}

/// A single item yielded by [`Storage::scan_prefix`].
pub type ScanItem = anyhow::Result<(StorageKey, StorageValue)>;

/// An interface for storing and retrieving values in an ordered key-value
/// store.
///
/// The store holds two disjoint keyspaces: the regular state, and the
/// "accessory" state which holds data published for outside readers and is
/// never read back by transactions.
pub trait Storage: Clone {
    /// The runtime config for this storage instance.
    type RuntimeConfig;

    /// Creates the storage from its runtime config.
    fn with_config(config: Self::RuntimeConfig) -> Result<Self, anyhow::Error>;

    /// Returns the value corresponding to the key or `None` if key is absent.
    fn get(&self, key: &StorageKey) -> anyhow::Result<Option<StorageValue>>;

    /// Returns the accessory value corresponding to the key or `None` if key is absent.
    fn get_accessory(&self, key: &StorageKey) -> anyhow::Result<Option<StorageValue>>;

    /// Returns every pair of the regular state whose key starts with `prefix`,
    /// in ascending key order.
    ///
    /// Each call starts a fresh scan; the returned iterator is finite.
    fn scan_prefix<'a>(&'a self, prefix: &[u8]) -> Box<dyn Iterator<Item = ScanItem> + 'a>;

    /// Atomically applies the given state and accessory writes.
    fn commit(&self, state: &OrderedWrites, accessory: &OrderedWrites)
        -> Result<(), anyhow::Error>;
}

// Used only in tests.
#[cfg(test)]
impl From<&'static str> for StorageKey {
    fn from(key: &'static str) -> Self {
        Self {
            key: Arc::new(key.as_bytes().to_vec()),
        }
    }
}

// Used only in tests.
#[cfg(test)]
impl From<&'static str> for StorageValue {
    fn from(value: &'static str) -> Self {
        Self {
            value: Arc::new(value.as_bytes().to_vec()),
        }
    }
}
