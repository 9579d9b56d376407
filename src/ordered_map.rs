use std::{
    any::Any,
    borrow::Borrow,
    collections::{hash_map, hash_map::RandomState, HashMap},
    fmt::{self, Debug, Display, Formatter},
    hash::{BuildHasher, Hash, Hasher},
    iter::FromIterator,
    mem,
};

use crate::{
    error::Error,
    null_hasher::BuildNullHasher,
    order_list::{NodeHandle, OrderList},
    render::Rendered,
};

type KeyHash = u64;

/// Keys sharing a hash. Almost always exactly one handle long.
type Bucket = Vec<NodeHandle>;

/// A key and its value, as kept in the order list.
#[derive(Clone)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// A map that remembers the order its keys were first stored in.
///
/// Storing a key that is already present only replaces its value; the key
/// keeps its place. Deleting a key and storing it again puts it at the end.
///
/// Entries live in a flattened linked list, and a lookup table keyed by the
/// key's hash points at the list nodes, so store, load and delete are all
/// O(1) on average.
///
/// An OrderedMap does no locking of its own. Callers that need to share one
/// between threads wrap it in their own lock, or use
/// [`SharedOrderedMap`](crate::SharedOrderedMap).
#[derive(Clone)]
pub struct OrderedMap<K, V, S = RandomState>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    hash_builder: S,
    table: HashMap<KeyHash, Bucket, BuildNullHasher>,
    order: OrderList<Entry<K, V>>,
}

impl<K, V> OrderedMap<K, V, RandomState>
where
    K: Eq + Hash,
{
    /// Makes an empty map.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Makes an empty map with room for `capacity` entries before it has to
    /// reallocate.
    pub fn with_capacity(capacity: usize) -> Self {
        OrderedMap::with_capacity_and_hash_builder(capacity, Default::default())
    }
}

impl<K, V, S> OrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Makes an empty map which hashes keys with `hash_builder`.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hash_builder(0, hash_builder)
    }

    /// Makes an empty map with a specified capacity and hasher.
    pub fn with_capacity_and_hash_builder(capacity: usize, hash_builder: S) -> Self {
        OrderedMap {
            hash_builder,
            table: HashMap::with_capacity_and_hasher(capacity, BuildNullHasher),
            order: OrderList::with_capacity(capacity),
        }
    }

    /// Sets the value for a key, returning the value it replaced.
    ///
    /// A key that isn't present yet goes to the end of the iteration order. A
    /// key that is present keeps its position.
    pub fn store(&mut self, k: K, v: V) -> Option<V> {
        let k_hash = self.k_hash(&k);

        if let Some(entry) = self
            .find(k_hash, &k)
            .and_then(|node| self.order.get_mut(node))
        {
            return Some(mem::replace(&mut entry.value, v));
        }

        let node = self.order.push_back(Entry { key: k, value: v });
        self.table.entry(k_hash).or_default().push(node);
        log::trace!("appended key at position {}", self.order.len() - 1);

        #[cfg(test)]
        self.consistency_test();

        None
    }

    /// Returns the value stored for a key, or None if there isn't one.
    pub fn load<Q>(&self, k: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(self.k_hash(k), k)
            .and_then(|node| self.order.get(node))
            .map(|entry| &entry.value)
    }

    /// Like [`load`](Self::load), but the value can be changed in place. The
    /// key's position is not affected.
    pub fn load_mut<Q>(&mut self, k: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let node = self.find(self.k_hash(k), k)?;
        self.order.get_mut(node).map(|entry| &mut entry.value)
    }

    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(self.k_hash(k), k).is_some()
    }

    /// Removes a key from the map, returning whatever was stored there.
    /// Deleting a key that isn't present does nothing.
    pub fn delete<Q>(&mut self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let k_hash = self.k_hash(k);
        let node = self.find(k_hash, k)?;

        if let hash_map::Entry::Occupied(mut bucket) = self.table.entry(k_hash) {
            bucket.get_mut().retain(|n| *n != node);
            if bucket.get().is_empty() {
                bucket.remove();
            }
        }

        let removed = self.order.remove(node);
        log::trace!("removed key, {} remaining", self.order.len());

        #[cfg(test)]
        self.consistency_test();

        removed.map(|entry| entry.value)
    }

    /// The number of keys in the map right now.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calls `visit` for each key and value in insertion order. Iteration
    /// stops as soon as `visit` returns false.
    ///
    /// The map is borrowed for the whole walk, so it can't be changed from
    /// inside `visit` and no key is seen twice.
    pub fn range<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        for entry in self.order.iter() {
            if !visit(&entry.key, &entry.value) {
                break;
            }
        }
    }

    /// Like [`range`](Self::range), but each value may be changed in place.
    pub fn range_mut<F>(&mut self, mut visit: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut cursor = self.order.head();

        while let Some(node) = cursor {
            cursor = self.order.next(node);

            let keep_going = match self.order.get_mut(node) {
                Some(entry) => visit(&entry.key, &mut entry.value),
                None => false,
            };
            if !keep_going {
                break;
            }
        }
    }

    /// Removes every entry. Keeps the allocated storage around.
    pub fn clear(&mut self) {
        self.table.clear();
        self.order.clear();
        log::trace!("cleared");
    }

    /// Makes room for at least `additional` more keys.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
        self.order.reserve(additional);
    }

    /// Like [`reserve`](Self::reserve), but hands back an error instead of
    /// aborting when the allocation can't be made.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.table
            .try_reserve(additional)
            .and_then(|()| self.order.try_reserve(additional))
            .map_err(|source| Error::Reserve { additional, source })
    }

    /// The node holding `k`, if any. Keys that collide on `k_hash` share a
    /// bucket and are told apart by comparing the keys themselves.
    fn find<Q>(&self, k_hash: KeyHash, k: &Q) -> Option<NodeHandle>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.table.get(&k_hash)?.iter().copied().find(|node| {
            self.order
                .get(*node)
                .map_or(false, |entry| k.eq(entry.key.borrow()))
        })
    }

    fn k_hash<Q>(&self, k: &Q) -> KeyHash
    where
        Q: Hash + ?Sized,
    {
        let mut h = self.hash_builder.build_hasher();
        k.hash(&mut h);
        h.finish()
    }

    /// Makes sure the table and the order list still describe the same set
    /// of keys.
    #[cfg(test)]
    fn consistency_test(&self) {
        let table_len: usize = self.table.values().map(Vec::len).sum();
        assert_eq!(self.order.len(), table_len);
        assert!(self.table.values().all(|bucket| !bucket.is_empty()));

        for entry in self.order.iter() {
            let k_hash = self.k_hash(&entry.key);
            assert!(self.find(k_hash, &entry.key).is_some());
        }

        self.order.continuity_test();
    }
}

impl<K, V, S> Default for OrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V, S> Extend<(K, V)> for OrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.store(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for OrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

/// Renders as `{k1: v1, k2: v2}` in insertion order, with string keys and
/// values quoted.
impl<K, V, S> Display for OrderedMap<K, V, S>
where
    K: Eq + Hash + Display + Any,
    V: Display + Any,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, entry) in self.order.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", Rendered(&entry.key), Rendered(&entry.value))?;
        }
        f.write_str("}")
    }
}

impl<K, V, S> Debug for OrderedMap<K, V, S>
where
    K: Eq + Hash + Debug,
    V: Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.order.iter().map(|entry| (&entry.key, &entry.value)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::OrderedMap;
    use crate::null_hasher::BuildNullHasher;

    fn keys<V>(map: &OrderedMap<&'static str, V>) -> Vec<&'static str> {
        let mut keys = Vec::new();
        map.range(|k, _| {
            keys.push(*k);
            true
        });
        keys
    }

    #[test]
    fn test_store_appends_new_keys() {
        let mut map = OrderedMap::new();

        assert_eq!(None, map.store("C", 3));
        assert_eq!(None, map.store("A", 1));
        assert_eq!(None, map.store("B", 2));

        assert_eq!(vec!["C", "A", "B"], keys(&map));
        assert_eq!(3, map.len());
    }

    #[test]
    fn test_restore_keeps_position() {
        let mut map = OrderedMap::new();
        map.store("A", 1);
        map.store("B", 2);

        assert_eq!(Some(1), map.store("A", 10));

        assert_eq!(vec!["A", "B"], keys(&map));
        assert_eq!(Some(&10), map.load("A"));
        assert_eq!(2, map.len());
    }

    #[test]
    fn test_delete_then_store_moves_to_end() {
        let mut map = OrderedMap::new();
        map.store("A", 1);
        map.store("B", 2);
        map.store("C", 3);

        assert_eq!(Some(1), map.delete("A"));
        assert_eq!(vec!["B", "C"], keys(&map));

        map.store("A", 4);
        assert_eq!(vec!["B", "C", "A"], keys(&map));
        assert_eq!(Some(&4), map.load("A"));
    }

    #[test]
    fn test_delete_absent_key_is_noop() {
        let mut map = OrderedMap::new();
        map.store("A", 1);

        assert_eq!(None, map.delete("Z"));
        assert_eq!(1, map.len());
        assert_eq!(vec!["A"], keys(&map));
    }

    #[test]
    fn test_borrowed_lookups() {
        let mut map: OrderedMap<String, u32> = OrderedMap::new();
        map.store("Name".to_owned(), 1);

        assert_eq!(Some(&1), map.load("Name"));
        assert!(map.contains_key("Name"));
        assert!(!map.contains_key("name"));
        assert_eq!(Some(1), map.delete("Name"));
        assert!(map.is_empty());
    }

    #[test]
    fn test_load_mut_changes_value_only() {
        let mut map = OrderedMap::new();
        map.store("A", 1);
        map.store("B", 2);

        if let Some(v) = map.load_mut("A") {
            *v += 40;
        }

        assert_eq!(Some(&41), map.load("A"));
        assert_eq!(vec!["A", "B"], keys(&map));
        assert_eq!(None, map.load_mut("Z"));
    }

    #[test]
    fn test_range_stops_early() {
        let mut map = OrderedMap::new();
        map.store("A", 1);
        map.store("B", 2);
        map.store("C", 3);

        let mut seen = Vec::new();
        map.range(|k, v| {
            seen.push((*k, *v));
            *k != "B"
        });

        assert_eq!(vec![("A", 1), ("B", 2)], seen);
    }

    #[test]
    fn test_range_mut() {
        let mut map = OrderedMap::new();
        map.store("A", 1);
        map.store("B", 2);
        map.store("C", 3);

        map.range_mut(|k, v| {
            *v *= 10;
            *k != "B"
        });

        assert_eq!(Some(&10), map.load("A"));
        assert_eq!(Some(&20), map.load("B"));
        assert_eq!(Some(&3), map.load("C"));
    }

    /// Hashing through a NullHasher with only the low byte fed in makes
    /// every key below collide.
    #[test]
    fn test_colliding_keys() {
        #[derive(PartialEq, Eq, Debug)]
        struct Collides(u64);

        impl std::hash::Hash for Collides {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                (self.0 & 0xff).hash(state);
            }
        }

        let mut map: OrderedMap<Collides, u64, BuildNullHasher> =
            OrderedMap::default();
        map.store(Collides(0x100), 1);
        map.store(Collides(0x200), 2);
        map.store(Collides(0x300), 3);

        assert_eq!(1, map.table.len());
        assert_eq!(Some(&2), map.load(&Collides(0x200)));

        assert_eq!(Some(2), map.delete(&Collides(0x200)));
        assert_eq!(None, map.load(&Collides(0x200)));
        assert_eq!(Some(&1), map.load(&Collides(0x100)));
        assert_eq!(Some(&3), map.load(&Collides(0x300)));
        assert_eq!(2, map.len());
    }

    #[test]
    fn test_clear() {
        let mut map = OrderedMap::new();
        map.store("A", 1);
        map.store("B", 2);
        map.clear();

        assert!(map.is_empty());
        assert_eq!(None, map.load("A"));

        map.store("B", 3);
        assert_eq!(vec!["B"], keys(&map));
    }

    #[test]
    fn test_reserve() {
        let mut map: OrderedMap<&str, u32> = OrderedMap::new();
        map.reserve(16);
        assert!(map.try_reserve(16).is_ok());
        assert!(map.try_reserve(usize::MAX).is_err());
    }

    #[test]
    fn test_from_iter_dedups() {
        let map: OrderedMap<&str, u32> =
            vec![("A", 1), ("B", 2), ("A", 3)].into_iter().collect();

        assert_eq!(vec!["A", "B"], keys(&map));
        assert_eq!(Some(&3), map.load("A"));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut map = OrderedMap::new();
        map.store("A", 1);
        map.store("B", 2);

        let mut copy = map.clone();
        copy.delete("A");
        copy.store("A", 5);

        assert_eq!(vec!["A", "B"], keys(&map));
        assert_eq!(vec!["B", "A"], keys(&copy));
    }

    #[test]
    fn test_display() {
        let mut map = OrderedMap::new();
        map.store("Name", "Bob".to_owned());
        map.store("Job", "Builder".to_owned());

        assert_eq!("{\"Name\": \"Bob\", \"Job\": \"Builder\"}", map.to_string());

        let mut numbers = OrderedMap::new();
        numbers.store(1, 2.5);
        numbers.store(2, 3.0);
        assert_eq!("{1: 2.5, 2: 3}", numbers.to_string());
    }

    #[test]
    fn test_debug() {
        let mut map = OrderedMap::new();
        map.store("Name", "Bob");
        map.store("Age", "12");

        assert_eq!("{\"Name\": \"Bob\", \"Age\": \"12\"}", format!("{:?}", map));
    }
}
