use std::marker::PhantomData;

use crate::codec::{BorshCodec, StateValueCodec};
use crate::key::{CompositeKeyCodec, KeyParts};
use crate::storage::StorageKey;
use crate::{Prefix, StateReaderAndWriter, Storage, WorkingSet};

/// A container that maps composite keys to values.
///
/// # Type parameters
/// [`StateMap`] is generic over:
/// - a key type `K`, which documents the parts of the key;
/// - a value type `V`;
/// - a [`StateValueCodec`] `Codec`.
///
/// Keys are encoded with [`CompositeKeyCodec`], so all entries sharing their
/// leading key parts can be listed with [`StateMap::scan_prefix`].
#[derive(Debug, Clone, PartialEq)]
pub struct StateMap<K, V, Codec = BorshCodec> {
    _phantom: (PhantomData<K>, PhantomData<V>),
    codec: Codec,
    prefix: Prefix,
}

impl<K, V> StateMap<K, V> {
    /// Creates a new [`StateMap`] with the given prefix and the default
    /// [`StateValueCodec`] (i.e. [`BorshCodec`]).
    pub fn new(prefix: Prefix) -> Self {
        Self::with_codec(prefix, BorshCodec)
    }
}

impl<K, V, Codec> StateMap<K, V, Codec> {
    /// Creates a new [`StateMap`] with the given prefix and [`StateValueCodec`].
    pub fn with_codec(prefix: Prefix, codec: Codec) -> Self {
        Self {
            _phantom: (PhantomData, PhantomData),
            codec,
            prefix,
        }
    }

    /// Returns the prefix used when this [`StateMap`] was created.
    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    fn storage_key<Q: KeyParts + ?Sized>(&self, key: &Q) -> anyhow::Result<StorageKey> {
        let encoded = CompositeKeyCodec.encode(key)?;
        Ok(StorageKey::new(&self.prefix, &encoded))
    }
}

impl<K, V, Codec> StateMap<K, V, Codec>
where
    Codec: StateValueCodec<V>,
{
    /// Inserts a key-value pair into the map, replacing any previous value.
    ///
    /// Fails without writing anything if a key part holds a control byte.
    pub fn set<Q, S: Storage>(
        &self,
        key: &Q,
        value: &V,
        working_set: &mut WorkingSet<S>,
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
        working_set: &mut WorkingSet<S>,
    ) -> anyhow::Result<Option<V>>
    where
        Q: KeyParts + ?Sized,
    {
        let storage_key = self.storage_key(key)?;
        working_set.get_decoded(&storage_key, &self.codec)
    }

    /// Lists every entry whose key starts with the parts of `partial_key`,
    /// in ascending key order.
    ///
    /// Each item holds all parts of the entry's key and its decoded value.
    /// Entries whose leading part merely shares a textual prefix with
    /// `partial_key` are never returned.
    pub fn scan_prefix<'a, S: Storage>(
        &'a self,
        partial_key: &[&str],
        working_set: &'a WorkingSet<S>,
    ) -> anyhow::Result<impl Iterator<Item = anyhow::Result<(Vec<String>, V)>> + 'a> {
        let encoded = CompositeKeyCodec.prefix(partial_key)?;
        let scan_prefix = self.prefix.extended(&encoded);
        let map_prefix_len = self.prefix.len();

        let entries = working_set
            .scan_prefix(scan_prefix.as_bytes())
            .map(move |item| -> anyhow::Result<(Vec<String>, V)> {
                let (key, value) = item?;
                let parts = CompositeKeyCodec.decode(&key.as_bytes()[map_prefix_len..])?;
                let value = self.codec.try_decode_value(value.value())?;
                Ok((parts, value))
            });

        Ok(entries)
    }
}
