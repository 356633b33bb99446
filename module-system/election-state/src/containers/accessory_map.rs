use std::marker::PhantomData;

use crate::codec::{BorshCodec, StateValueCodec};
use crate::key::{CompositeKeyCodec, KeyParts};
use crate::storage::StorageKey;
use crate::{AccessoryWorkingSet, Prefix, StateReaderAndWriter, Storage};

/// A container that maps keys to values stored as "accessory" state.
///
/// Accessory state is published for readers outside the ledger. It shares
/// the transactional behaviour of the regular state, but is never part of a
/// prefix scan.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessoryStateMap<K, V, Codec = BorshCodec> {
    _phantom: (PhantomData<K>, PhantomData<V>),
    codec: Codec,
    prefix: Prefix,
}

impl<K, V> AccessoryStateMap<K, V> {
    /// Creates a new [`AccessoryStateMap`] with the given prefix and the default
    /// [`StateValueCodec`] (i.e. [`BorshCodec`]).
    pub fn new(prefix: Prefix) -> Self {
        Self::with_codec(prefix, BorshCodec)
    }
}

impl<K, V, Codec> AccessoryStateMap<K, V, Codec> {
    /// Creates a new [`AccessoryStateMap`] with the given prefix and [`StateValueCodec`].
    pub fn with_codec(prefix: Prefix, codec: Codec) -> Self {
        Self {
            _phantom: (PhantomData, PhantomData),
            codec,
            prefix,
        }
    }

    /// Returns the prefix used when this [`AccessoryStateMap`] was created.
    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    /// Returns the full storage key of `key`.
    pub fn storage_key<Q: KeyParts + ?Sized>(&self, key: &Q) -> anyhow::Result<StorageKey> {
        let encoded = CompositeKeyCodec.encode(key)?;
        Ok(StorageKey::new(&self.prefix, &encoded))
    }
}

impl<K, V, Codec> AccessoryStateMap<K, V, Codec>
where
    Codec: StateValueCodec<V>,
{
    /// Inserts a key-value pair into the map.
    pub fn set<Q, S: Storage>(
        &self,
        key: &Q,
        value: &V,
        working_set: &mut AccessoryWorkingSet<S>,
    ) -> anyhow::Result<()>
    where
        Q: KeyParts + ?Sized,
    {
        let storage_key = self.storage_key(key)?;
        working_set.set_value(&storage_key, value, &self.codec)
    }

    /// Returns the value corresponding to the key, or [`None`] if the map
    /// doesn't contain the key.
    pub fn get<Q, S: Storage>(
        &self,
        key: &Q,
        working_set: &mut AccessoryWorkingSet<S>,
    ) -> anyhow::Result<Option<V>>
    where
        Q: KeyParts + ?Sized,
    {
        let storage_key = self.storage_key(key)?;
        working_set.get_decoded(&storage_key, &self.codec)
    }
}
