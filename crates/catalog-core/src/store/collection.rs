// ── Generic reactive entity collection ──
//
// Ordered, key-unique storage with push-based change notification via a
// `watch` channel. The snapshot *is* the collection: every mutation runs
// inside the channel's write lock, so readers never observe a half-applied
// change.

use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::watch;

use crate::model::Keyed;

/// Cheap, immutable view of a collection at one point in time.
pub type Snapshot<T> = Arc<Vec<Arc<T>>>;

/// A reactive, ordered collection for a single entity type.
///
/// Order is insertion order (or the order of the last wholesale
/// replacement). Keys are unique: inserting an entity whose key is already
/// present replaces it in place.
pub(crate) struct EntityCollection<T: Keyed + Send + Sync + 'static> {
    snapshot: watch::Sender<Snapshot<T>>,
}

impl<T: Keyed + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self { snapshot }
    }

    /// Replace the whole collection. Later duplicates of a key overwrite the
    /// earlier value but keep the earlier position.
    pub(crate) fn replace_all(&self, entities: impl IntoIterator<Item = T>) -> Snapshot<T> {
        let mut by_key: IndexMap<T::Key, Arc<T>> = IndexMap::new();
        for entity in entities {
            by_key.insert(entity.key().clone(), Arc::new(entity));
        }
        let next: Snapshot<T> = Arc::new(by_key.into_values().collect());

        // `send_replace` updates unconditionally, even with zero receivers.
        self.snapshot.send_replace(Arc::clone(&next));
        next
    }

    /// Append an entity, or replace it in place if the key already exists.
    pub(crate) fn append(&self, entity: T) -> Arc<T> {
        let entity = Arc::new(entity);
        self.snapshot.send_modify(|snap| {
            let list = Arc::make_mut(snap);
            match list.iter().position(|e| e.key() == entity.key()) {
                Some(pos) => list[pos] = Arc::clone(&entity),
                None => list.push(Arc::clone(&entity)),
            }
        });
        entity
    }

    /// Replace the entity with the same key, keeping its position.
    /// Returns `false` (and notifies nobody) if the key is absent.
    pub(crate) fn replace(&self, entity: Arc<T>) -> bool {
        self.snapshot.send_if_modified(|snap| {
            let Some(pos) = snap.iter().position(|e| e.key() == entity.key()) else {
                return false;
            };
            Arc::make_mut(snap)[pos] = Arc::clone(&entity);
            true
        })
    }

    /// Remove an entity by key. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, key: &T::Key) -> Option<Arc<T>> {
        let mut removed = None;
        self.snapshot.send_if_modified(|snap| {
            let Some(pos) = snap.iter().position(|e| e.key() == key) else {
                return false;
            };
            removed = Some(Arc::make_mut(snap).remove(pos));
            true
        });
        removed
    }

    /// Look up an entity by key.
    pub(crate) fn get(&self, key: &T::Key) -> Option<Arc<T>> {
        self.snapshot
            .borrow()
            .iter()
            .find(|e| e.key() == key)
            .map(Arc::clone)
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Snapshot<T> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.snapshot.borrow().is_empty()
    }
}
