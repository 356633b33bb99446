use std::cmp::Ordering;
use std::collections::{btree_map, BTreeMap};
use std::fmt::Debug;
use std::iter::Peekable;

use anyhow::Context;

use crate::codec::StateValueCodec;
use crate::events::Event;
use crate::storage::{OrderedWrites, ScanItem, Storage, StorageKey, StorageValue};

/// Writes layered on top of the storage.
type Overlay = BTreeMap<StorageKey, StorageValue>;

/// The interface shared by the regular and the accessory views of a working set.
pub trait StateReaderAndWriter {
    /// Reads a raw value.
    fn get(&mut self, key: &StorageKey) -> anyhow::Result<Option<StorageValue>>;

    /// Writes a raw value.
    fn set(&mut self, key: &StorageKey, value: StorageValue);

    /// Encodes `value` with `codec` and writes it under `key`.
    fn set_value<V, VC>(&mut self, key: &StorageKey, value: &V, codec: &VC) -> anyhow::Result<()>
    where
        VC: StateValueCodec<V>,
    {
        let value = StorageValue::new(value, codec)
            .with_context(|| format!("Unable to encode the value for {key}"))?;
        self.set(key, value);
        Ok(())
    }

    /// Reads the value under `key` and decodes it with `codec`.
    fn get_decoded<V, VC>(&mut self, key: &StorageKey, codec: &VC) -> anyhow::Result<Option<V>>
    where
        VC: StateValueCodec<V>,
    {
        match self.get(key)? {
            Some(value) => {
                let decoded = codec
                    .try_decode_value(value.value())
                    .with_context(|| format!("Unable to decode the value stored at {key}"))?;
                Ok(Some(decoded))
            }
            None => Ok(None),
        }
    }
}

struct Delta<S: Storage> {
    inner: S,
    state: Overlay,
    accessory: Overlay,
}

impl<S: Storage> Delta<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            state: Default::default(),
            accessory: Default::default(),
        }
    }

    fn get(&self, key: &StorageKey) -> anyhow::Result<Option<StorageValue>> {
        match self.state.get(key) {
            Some(value) => Ok(Some(value.clone())),
            None => self.inner.get(key),
        }
    }

    fn get_accessory(&self, key: &StorageKey) -> anyhow::Result<Option<StorageValue>> {
        match self.accessory.get(key) {
            Some(value) => Ok(Some(value.clone())),
            None => self.inner.get_accessory(key),
        }
    }

    fn get_revertable_wrapper(self) -> RevertableDelta<S> {
        RevertableDelta {
            inner: self,
            state_writes: Default::default(),
            accessory_writes: Default::default(),
        }
    }
}

impl<S: Storage> Debug for Delta<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delta")
            .field("state_writes", &self.state.len())
            .field("accessory_writes", &self.accessory.len())
            .finish()
    }
}

/// Writes of a single transaction on top of a [`Delta`]. Dropping them is
/// how a transaction reverts.
struct RevertableDelta<S: Storage> {
    inner: Delta<S>,
    state_writes: Overlay,
    accessory_writes: Overlay,
}

impl<S: Storage> RevertableDelta<S> {
    fn get(&self, key: &StorageKey) -> anyhow::Result<Option<StorageValue>> {
        match self.state_writes.get(key) {
            Some(value) => Ok(Some(value.clone())),
            None => self.inner.get(key),
        }
    }

    fn get_accessory(&self, key: &StorageKey) -> anyhow::Result<Option<StorageValue>> {
        match self.accessory_writes.get(key) {
            Some(value) => Ok(Some(value.clone())),
            None => self.inner.get_accessory(key),
        }
    }

    fn commit(self) -> Delta<S> {
        let mut inner = self.inner;
        inner.state.extend(self.state_writes);
        inner.accessory.extend(self.accessory_writes);
        inner
    }

    fn revert(self) -> Delta<S> {
        self.inner
    }
}

/// The writes of every transaction applied so far that has not been
/// committed to the storage yet.
///
/// Obtained from a [`WorkingSet`] with either [`WorkingSet::checkpoint`] or
/// [`WorkingSet::revert`].
#[derive(Debug)]
pub struct StateCheckpoint<S: Storage> {
    delta: Delta<S>,
}

impl<S: Storage> StateCheckpoint<S> {
    /// Creates an empty checkpoint over `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            delta: Delta::new(inner),
        }
    }

    /// Starts a new transaction on top of this checkpoint.
    pub fn to_revertable(self) -> WorkingSet<S> {
        WorkingSet {
            delta: self.delta.get_revertable_wrapper(),
            events: Default::default(),
        }
    }

    /// Takes the accumulated regular state writes, in key order.
    pub fn freeze(&mut self) -> OrderedWrites {
        OrderedWrites {
            ordered_writes: std::mem::take(&mut self.delta.state).into_iter().collect(),
        }
    }

    /// Takes the accumulated accessory state writes, in key order.
    pub fn freeze_accessory(&mut self) -> OrderedWrites {
        OrderedWrites {
            ordered_writes: std::mem::take(&mut self.delta.accessory)
                .into_iter()
                .collect(),
        }
    }
}

/// This structure contains the writes and the events produced by the
/// transaction being executed.
///
/// There are two ways to turn it back into a [`StateCheckpoint`]:
/// 1. [`WorkingSet::checkpoint`] keeps the writes.
/// 2. [`WorkingSet::revert`] discards the writes of this transaction.
///
/// Reads always go through to the layers below, so nothing read by one
/// operation is reused by the next.
pub struct WorkingSet<S: Storage> {
    delta: RevertableDelta<S>,
    events: Vec<Event>,
}

impl<S: Storage> WorkingSet<S> {
    /// Creates a working set over `inner` with an empty checkpoint below it.
    pub fn new(inner: S) -> Self {
        StateCheckpoint::new(inner).to_revertable()
    }

    /// Keeps the writes of this working set.
    pub fn checkpoint(self) -> StateCheckpoint<S> {
        StateCheckpoint {
            delta: self.delta.commit(),
        }
    }

    /// Discards the writes of this working set.
    pub fn revert(self) -> StateCheckpoint<S> {
        StateCheckpoint {
            delta: self.delta.revert(),
        }
    }

    /// Returns a view over the accessory state.
    pub fn accessory_state(&mut self) -> AccessoryWorkingSet<'_, S> {
        AccessoryWorkingSet { ws: self }
    }

    /// Iterates over all live entries of the regular state whose key starts
    /// with `prefix`, in ascending key order.
    ///
    /// Writes of this working set and of the checkpoint below it shadow the
    /// storage.
    pub fn scan_prefix(&self, prefix: &[u8]) -> PrefixScan<'_> {
        let mut overlay: Overlay = overlay_range(&self.delta.inner.state, prefix).collect();
        overlay.extend(overlay_range(&self.delta.state_writes, prefix));

        PrefixScan {
            overlay: overlay.into_iter().peekable(),
            storage: self.delta.inner.inner.scan_prefix(prefix).peekable(),
            done: false,
        }
    }

    /// Records an event of the current transaction.
    pub fn add_event(&mut self, key: &str, value: &str) {
        self.events.push(Event::new(key, value));
    }

    /// Takes the events recorded so far.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Returns the events recorded so far.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[cfg(test)]
    pub(crate) fn backing(&self) -> &S {
        &self.delta.inner.inner
    }
}

impl<S: Storage> StateReaderAndWriter for WorkingSet<S> {
    fn get(&mut self, key: &StorageKey) -> anyhow::Result<Option<StorageValue>> {
        self.delta.get(key)
    }

    fn set(&mut self, key: &StorageKey, value: StorageValue) {
        self.delta.state_writes.insert(key.clone(), value);
    }
}

/// The accessory state of a [`WorkingSet`].
///
/// Accessory writes are reverted together with the transaction that made them.
pub struct AccessoryWorkingSet<'a, S: Storage> {
    ws: &'a mut WorkingSet<S>,
}

impl<'a, S: Storage> StateReaderAndWriter for AccessoryWorkingSet<'a, S> {
    fn get(&mut self, key: &StorageKey) -> anyhow::Result<Option<StorageValue>> {
        self.ws.delta.get_accessory(key)
    }

    fn set(&mut self, key: &StorageKey, value: StorageValue) {
        self.ws.delta.accessory_writes.insert(key.clone(), value);
    }
}

fn overlay_range<'a>(
    overlay: &'a Overlay,
    prefix: &'a [u8],
) -> impl Iterator<Item = (StorageKey, StorageValue)> + 'a {
    overlay
        .range(StorageKey::from(prefix.to_vec())..)
        .take_while(move |(key, _)| key.starts_with(prefix))
        .map(|(key, value)| (key.clone(), value.clone()))
}

/// Iterator returned by [`WorkingSet::scan_prefix`].
///
/// Storage entries are pulled lazily and merged with the pending writes in
/// key order. The scan stops after the first storage error.
pub struct PrefixScan<'a> {
    overlay: Peekable<btree_map::IntoIter<StorageKey, StorageValue>>,
    storage: Peekable<Box<dyn Iterator<Item = ScanItem> + 'a>>,
    done: bool,
}

impl<'a> Iterator for PrefixScan<'a> {
    type Item = ScanItem;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let storage_key = match self.storage.peek() {
            Some(Ok((key, _))) => Some(key.clone()),
            Some(Err(_)) => {
                self.done = true;
                return self.storage.next();
            }
            None => None,
        };
        let overlay_key = self.overlay.peek().map(|(key, _)| key.clone());

        let ordering = match (storage_key, overlay_key) {
            (None, None) => return None,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(storage_key), Some(overlay_key)) => storage_key.cmp(&overlay_key),
        };

        match ordering {
            Ordering::Less => self.storage.next(),
            Ordering::Equal => {
                // Shadowed by a pending write.
                self.storage.next();
                self.overlay.next().map(Ok)
            }
            Ordering::Greater => self.overlay.next().map(Ok),
        }
    }
}
