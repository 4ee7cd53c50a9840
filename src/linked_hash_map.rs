//! LinkedHashMap: the chained table with a doubly-linked traversal order.
//!
//! Every entry is threaded on a list in insertion order or, with
//! [`OrderMode::Access`], in least-recently-used-first order. The list ends
//! give O(1) first/last access and removal, `put_first`/`put_last` place an
//! entry at either end, and an [`EvictionPolicy`] may drop the eldest entry
//! after each new insertion, which is how bounded LRU caches are built.
//!
//! ```
//! use chained_hashmap::LinkedHashMap;
//!
//! let mut cache = LinkedHashMap::lru(2);
//! cache.put(1, "x");
//! cache.put(2, "y");
//! cache.get(&1);
//! cache.put(3, "z");
//! assert_eq!(cache.keys().copied().collect::<Vec<_>>(), [1, 3]);
//! ```

use crate::config::{Config, OrderMode, DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR};
use crate::cursor::{Cursor, Sealed, Traversal};
use crate::error::MapError;
use crate::evict::{Capacity, EvictionPolicy, Unbounded};
use crate::iter::{map_iterators, RawIter};
use crate::order::{Linked, Placement};
use crate::raw_table::{Handle, Inserted, RawTable};
use crate::DefaultHashBuilder;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::Index;
use slotmap::DefaultKey;

map_iterators!(Linked);

/// Hash map with a deterministic traversal order and an eviction hook.
#[derive(Clone)]
pub struct LinkedHashMap<K, V, S = DefaultHashBuilder, E = Unbounded> {
    table: RawTable<K, V, S, Linked>,
    evict: E,
}

impl<K, V> LinkedHashMap<K, V> {
    /// Empty insertion-ordered map.
    pub fn new() -> Self {
        Self::with_order(OrderMode::Insertion)
    }

    pub fn with_order(order: OrderMode) -> Self {
        Self::from_parts(DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR, order, DefaultHashBuilder::default(), Unbounded)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_parts(capacity, DEFAULT_LOAD_FACTOR, OrderMode::Insertion, DefaultHashBuilder::default(), Unbounded)
    }

    pub fn with_config(config: Config) -> Result<Self, MapError> {
        Self::with_config_hasher_and_eviction(config, DefaultHashBuilder::default(), Unbounded)
    }
}

impl<K, V> LinkedHashMap<K, V, DefaultHashBuilder, Capacity> {
    /// Access-ordered map holding at most `max` entries; inserting beyond
    /// that evicts the least recently used entry.
    pub fn lru(max: usize) -> Self {
        Self::from_parts(
            max.saturating_add(1),
            DEFAULT_LOAD_FACTOR,
            OrderMode::Access,
            DefaultHashBuilder::default(),
            Capacity::new(max),
        )
    }
}

impl<K, V> Default for LinkedHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S, E> LinkedHashMap<K, V, S, E> {
    fn from_parts(capacity: usize, load_factor: f32, order: OrderMode, hasher: S, evict: E) -> Self {
        Self {
            table: RawTable::from_parts(capacity, load_factor, hasher, Linked::new(order)),
            evict,
        }
    }

    pub fn with_config_hasher_and_eviction(config: Config, hasher: S, evict: E) -> Result<Self, MapError> {
        Ok(Self {
            table: RawTable::with_config(&config, hasher, Linked::new(config.order))?,
            evict,
        })
    }

    /// Replace the eviction policy, keeping every entry and its order.
    pub fn with_eviction<E2>(self, evict: E2) -> LinkedHashMap<K, V, S, E2> {
        LinkedHashMap {
            table: self.table,
            evict,
        }
    }

    pub fn eviction_policy(&self) -> &E {
        &self.evict
    }

    pub fn eviction_policy_mut(&mut self) -> &mut E {
        &mut self.evict
    }

    pub fn order_mode(&self) -> OrderMode {
        self.table.order().mode()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Current number of buckets.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    pub fn hasher(&self) -> &S {
        self.table.hasher()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.table.contains_value(value)
    }

    fn entry_at(&self, k: Option<DefaultKey>) -> Option<(&K, &V)> {
        self.table.slot(k?).map(|s| (&s.key, &s.value))
    }

    /// Head of the order list: the eldest or least recently used entry.
    pub fn first_entry(&self) -> Option<(&K, &V)> {
        self.entry_at(self.table.order().head())
    }

    /// Tail of the order list: the newest or most recently used entry.
    pub fn last_entry(&self) -> Option<(&K, &V)> {
        self.entry_at(self.table.order().tail())
    }

    pub fn get_first(&self) -> Result<&V, MapError> {
        self.first_entry().map(|(_, v)| v).ok_or(MapError::Empty)
    }

    pub fn get_last(&self) -> Result<&V, MapError> {
        self.last_entry().map(|(_, v)| v).ok_or(MapError::Empty)
    }

    pub fn remove_first_entry(&mut self) -> Result<(K, V), MapError> {
        let head = self.table.order().head().ok_or(MapError::Empty)?;
        self.table.remove_handle(head).ok_or(MapError::Empty)
    }

    pub fn remove_last_entry(&mut self) -> Result<(K, V), MapError> {
        let tail = self.table.order().tail().ok_or(MapError::Empty)?;
        self.table.remove_handle(tail).ok_or(MapError::Empty)
    }

    pub fn remove_first(&mut self) -> Result<V, MapError> {
        self.remove_first_entry().map(|(_, v)| v)
    }

    pub fn remove_last(&mut self) -> Result<V, MapError> {
        self.remove_last_entry().map(|(_, v)| v)
    }

    /// Handle of the entry before `h` in the order list.
    pub fn handle_before(&self, h: Handle) -> Option<Handle> {
        let k = self.table.resolve(h)?;
        self.table
            .order()
            .before(self.table.slots(), k)
            .map(|k| self.table.handle(k))
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: RawIter::new(self.table.buckets(), self.table.slots(), self.table.order()),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Mutable iteration in traversal order.
    ///
    /// Unlike [`iter`](Self::iter) this is not lazy: positions for every
    /// entry are collected before the first item is yielded, an O(n) pass
    /// with one allocation.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.ordered_mut().into_iter(),
        }
    }

    /// Same up-front cost as [`iter_mut`](Self::iter_mut).
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// A fail-fast cursor positioned before the head of the order list.
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self)
    }

    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.table.retain(keep);
    }
}

impl<K, V, S, E> LinkedHashMap<K, V, S, E>
where
    K: Eq + Hash,
    S: BuildHasher,
    E: EvictionPolicy<K, V>,
{
    /// Look up `key` and record the access. In access order this moves the
    /// entry to the tail.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let h = self.table.find(key)?;
        self.table.touch(h);
        self.table.slot(h).map(|s| &s.value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let h = self.table.find(key)?;
        self.table.touch(h);
        self.table.slot_mut(h).map(|s| &mut s.value)
    }

    /// Look up `key` without recording an access.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let h = self.table.find(key)?;
        self.table.slot(h).map(|s| &s.value)
    }

    pub fn peek_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let h = self.table.find(key)?;
        self.table.slot(h).map(|s| (&s.key, &s.value))
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.find(key).is_some()
    }

    /// Handle to the entry for `key`. Does not record an access.
    pub fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.find(key).map(|k| self.table.handle(k))
    }

    fn put_at(&mut self, key: K, value: V, place: Placement) -> Option<V> {
        match self.table.insert(key, value, place) {
            Inserted::Replaced(_, old) => Some(old),
            Inserted::New(_) => {
                self.evict_eldest();
                None
            }
        }
    }

    /// Offer the head of the list to the eviction policy.
    fn evict_eldest(&mut self) {
        let Some(head) = self.table.order().head() else {
            return;
        };
        let len = self.table.len();
        let evict = match self.table.slot(head) {
            Some(s) => self.evict.should_evict(len, &s.key, &s.value),
            None => false,
        };
        if evict {
            self.table.remove_handle(head);
        }
    }

    /// Insert or update `key`. A new entry is appended to the tail; an update
    /// keeps its position in insertion order and moves to the tail in access
    /// order.
    #[doc(alias = "insert")]
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.put_at(key, value, Placement::Natural)
    }

    /// Insert or update `key` and place the entry at the head of the list.
    ///
    /// The eviction policy still sees the head afterwards, so a bounded map
    /// that is already full evicts the entry that was just placed.
    pub fn put_first(&mut self, key: K, value: V) -> Option<V> {
        self.put_at(key, value, Placement::Head)
    }

    /// Insert or update `key` and place the entry at the tail of the list.
    pub fn put_last(&mut self, key: K, value: V) -> Option<V> {
        self.put_at(key, value, Placement::Tail)
    }

    /// Insert every pair in order, pre-sizing the table first.
    pub fn put_all<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.extend(pairs);
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.remove(key).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.remove(key)
    }
}

impl<K, V, S, E> Sealed for LinkedHashMap<K, V, S, E> {}

impl<K, V, S, E> Traversal for LinkedHashMap<K, V, S, E> {
    type Key = K;
    type Value = V;

    fn mod_count(&self) -> u64 {
        self.table.mod_count()
    }

    fn map_id(&self) -> u64 {
        self.table.id()
    }

    fn first_handle(&self) -> Option<Handle> {
        self.table.first().map(|k| self.table.handle(k))
    }

    fn handle_after(&self, h: Handle) -> Option<Handle> {
        let k = self.table.resolve(h)?;
        self.table.after(k).map(|k| self.table.handle(k))
    }

    fn handle_entry(&self, h: Handle) -> Option<(&K, &V)> {
        self.table.slot(self.table.resolve(h)?).map(|s| (&s.key, &s.value))
    }

    fn handle_value_mut(&mut self, h: Handle) -> Option<&mut V> {
        let k = self.table.resolve(h)?;
        self.table.slot_mut(k).map(|s| &mut s.value)
    }

    fn remove_handle(&mut self, h: Handle) -> Option<(K, V)> {
        let k = self.table.resolve(h)?;
        self.table.remove_handle(k)
    }
}

impl<K, V, S, E> fmt::Debug for LinkedHashMap<K, V, S, E>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Equality compares contents only; traversal order is ignored.
impl<K, V, S, E> PartialEq for LinkedHashMap<K, V, S, E>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
    E: EvictionPolicy<K, V>,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.peek(k) == Some(v))
    }
}

impl<K, V, S, E> Eq for LinkedHashMap<K, V, S, E>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
    E: EvictionPolicy<K, V>,
{
}

/// Indexing peeks: it never records an access.
impl<K, Q, V, S, E> Index<&Q> for LinkedHashMap<K, V, S, E>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Eq + Hash,
    S: BuildHasher,
    E: EvictionPolicy<K, V>,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.peek(key).expect("no entry found for key")
    }
}

impl<K, V, S, E> Extend<(K, V)> for LinkedHashMap<K, V, S, E>
where
    K: Eq + Hash,
    S: BuildHasher,
    E: EvictionPolicy<K, V>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.table.reserve(iter.size_hint().0);
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V, S, E> FromIterator<(K, V)> for LinkedHashMap<K, V, S, E>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
    E: EvictionPolicy<K, V> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::from_parts(
            DEFAULT_INITIAL_CAPACITY,
            DEFAULT_LOAD_FACTOR,
            OrderMode::Insertion,
            S::default(),
            E::default(),
        );
        map.extend(iter);
        map
    }
}

impl<K, V, S, E> IntoIterator for LinkedHashMap<K, V, S, E> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.table.into_ordered(),
        }
    }
}

impl<'a, K, V, S, E> IntoIterator for &'a LinkedHashMap<K, V, S, E> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, S, E> IntoIterator for &'a mut LinkedHashMap<K, V, S, E> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys<S, E>(m: &LinkedHashMap<&'static str, i32, S, E>) -> Vec<&'static str> {
        m.keys().copied().collect()
    }

    /// Invariant: re-putting an existing key keeps its insertion position.
    #[test]
    fn insertion_order_ignores_updates() {
        let mut m = LinkedHashMap::new();
        m.put("a", 1);
        m.put("b", 2);
        assert_eq!(m.put("a", 3), Some(1));
        assert_eq!(m.get("a"), Some(&3));
        assert_eq!(m.len(), 2);
        assert_eq!(keys(&m), ["a", "b"]);
        m.table.assert_consistent();
    }

    /// Invariant: in access order both reads and updates move to the tail.
    #[test]
    fn access_order_promotes_on_get_and_put() {
        let mut m = LinkedHashMap::with_order(OrderMode::Access);
        m.put("a", 1);
        m.put("b", 2);
        m.put("c", 3);
        m.get("a");
        assert_eq!(keys(&m), ["b", "c", "a"]);
        m.put("b", 20);
        assert_eq!(keys(&m), ["c", "a", "b"]);
        assert_eq!(m.peek("c"), Some(&3));
        assert_eq!(keys(&m), ["c", "a", "b"], "peek does not promote");
        m.table.assert_consistent();
    }

    /// Invariant: put_first/put_last place new and existing entries at the ends.
    #[test]
    fn positional_puts() {
        let mut m = LinkedHashMap::new();
        m.put("a", 1);
        m.put("b", 2);
        m.put_first("z", 9);
        assert_eq!(keys(&m), ["z", "a", "b"]);
        m.put_last("z", 10);
        assert_eq!(keys(&m), ["a", "b", "z"]);
        m.put_first("b", 0);
        assert_eq!(keys(&m), ["b", "a", "z"]);
        assert_eq!(m.get_first(), Ok(&0));
        assert_eq!(m.get_last(), Ok(&10));
        m.table.assert_consistent();
    }

    /// Invariant: first/last removal unlinks from both structures.
    #[test]
    fn remove_ends() {
        let mut m: LinkedHashMap<&str, i32> = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        assert_eq!(m.remove_first(), Ok(1));
        assert_eq!(m.remove_last_entry(), Ok(("c", 3)));
        assert!(!m.contains_key("a") && !m.contains_key("c"));
        assert_eq!(m.remove_last(), Ok(2));
        assert_eq!(m.remove_first(), Err(MapError::Empty));
        assert_eq!(m.get_first(), Err(MapError::Empty));
        assert_eq!(m.last_entry(), None);
        m.table.assert_consistent();
    }

    /// Invariant: a bounded map evicts the head after each new insertion.
    #[test]
    fn capacity_policy_evicts_eldest() {
        let mut m = LinkedHashMap::new().with_eviction(Capacity::new(2));
        m.put(1, "x");
        m.put(2, "y");
        m.put(3, "z");
        assert_eq!(m.len(), 2);
        assert!(!m.contains_key(&1));
        assert_eq!(m.iter().collect::<Vec<_>>(), [(&2, &"y"), (&3, &"z")]);
        // Updates never evict.
        m.put(2, "w");
        assert_eq!(m.len(), 2);
        m.table.assert_consistent();
    }

    /// Invariant: a full bounded map drops an entry placed at the head.
    #[test]
    fn put_first_into_full_map_is_evicted() {
        let mut m = LinkedHashMap::new().with_eviction(Capacity::new(2));
        m.put("a", 1);
        m.put("b", 2);
        m.put_first("c", 3);
        assert_eq!(keys(&m), ["a", "b"]);
    }

    /// Invariant: closures receive the current length and the eldest entry.
    #[test]
    fn closure_policy() {
        let mut m = LinkedHashMap::new().with_eviction(|len: usize, _k: &&str, v: &i32| len > 3 || *v < 0);
        m.put("a", -1);
        assert!(m.is_empty(), "eldest rejected by value");
        for (k, v) in [("a", 1), ("b", 2), ("c", 3), ("d", 4)] {
            m.put(k, v);
        }
        assert_eq!(keys(&m), ["b", "c", "d"]);
    }

    /// Invariant: clear resets both the buckets and the order list.
    #[test]
    fn clear_resets_order() {
        let mut m: LinkedHashMap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();
        m.clear();
        assert!(m.is_empty());
        assert_eq!(m.first_entry(), None);
        m.put("c", 3);
        assert_eq!(keys(&m), ["c"]);
        m.table.assert_consistent();
    }

    /// Invariant: handles walk the list in both directions.
    #[test]
    fn handle_navigation() {
        let m: LinkedHashMap<&str, i32> = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        let b = m.find("b").unwrap();
        let a = m.handle_before(b).unwrap();
        assert_eq!(a.key(&m), Some(&"a"));
        assert_eq!(m.handle_before(a), None);
        assert_eq!(m.handle_after(b).and_then(|c| c.value(&m)), Some(&3));
    }
}
