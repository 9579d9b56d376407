use parking_lot::RwLock;
use std::{
    any::Any,
    borrow::Borrow,
    collections::hash_map::RandomState,
    fmt::{self, Display, Formatter},
    hash::{BuildHasher, Hash},
    sync::Arc,
};

use crate::OrderedMap;

/// Wrapper for an OrderedMap which is shareable across thread boundaries.
/// Clones are cheap and all point at the same map.
///
/// Readers don't queue behind waiting writers, so a steady stream of reads
/// can hold writers off.
pub struct SharedOrderedMap<K, V, S = RandomState>(Arc<RwLock<OrderedMap<K, V, S>>>)
where
    K: Eq + Hash,
    S: BuildHasher;

impl<K, V> SharedOrderedMap<K, V, RandomState>
where
    K: Eq + Hash,
{
    /// Makes a new, empty shared map.
    pub fn new() -> Self {
        Self::with_map(OrderedMap::new())
    }
}

impl<K, V, S> SharedOrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Wraps a map into a shared accessor, making it safe to move across
    /// thread boundaries.
    pub fn with_map(map: OrderedMap<K, V, S>) -> Self {
        Self(Arc::from(RwLock::from(map)))
    }

    /// Stores a value, returning the one it replaced.
    pub fn store(&self, k: K, v: V) -> Option<V> {
        self.0.write().store(k, v)
    }

    /// Get a value from the map. This clones it to minimize the lock time of
    /// the map.
    pub fn load<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.0.read_recursive().load(k).cloned()
    }

    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.0.read_recursive().contains_key(k)
    }

    /// Remove a key from the map, returning its value if it existed.
    pub fn delete<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.0.write().delete(k)
    }

    /// Clears the map.
    pub fn clear(&self) {
        self.0.write().clear()
    }

    /// The number of keys in the map at present.
    pub fn len(&self) -> usize {
        self.0.read_recursive().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read_recursive().is_empty()
    }

    /// Walks the map in insertion order while holding the read lock.
    ///
    /// Reads are taken recursively, so `visit` may call `load`, `len`,
    /// `contains_key` or format the map even while a writer is queued.
    /// Calling `store`, `delete` or `clear` on this map from inside `visit`
    /// will deadlock.
    pub fn range<F>(&self, visit: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.0.read_recursive().range(visit)
    }
}

impl<K, V, S> Clone for SharedOrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn clone(&self) -> Self {
        SharedOrderedMap(self.0.clone())
    }
}

impl<K, V> Default for SharedOrderedMap<K, V, RandomState>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Display for SharedOrderedMap<K, V, S>
where
    K: Eq + Hash + Display + Any,
    V: Display + Any,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&*self.0.read_recursive(), f)
    }
}
