//! HashMap: the unordered chained table.
//!
//! Iteration walks the bucket array in ascending index and each chain from
//! its newest entry; that order is unspecified and changes across resizes.

use crate::config::{Config, DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR};
use crate::cursor::{Cursor, Sealed, Traversal};
use crate::error::MapError;
use crate::iter::{map_iterators, RawIter};
use crate::order::{Placement, Unordered};
use crate::raw_table::{Handle, Inserted, RawTable};
use crate::DefaultHashBuilder;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::Index;

map_iterators!(Unordered);

/// Chained hash map with average O(1) `get`, `put` and `remove`.
///
/// ```
/// use chained_hashmap::HashMap;
///
/// let mut map = HashMap::new();
/// assert_eq!(map.put("a", 1), None);
/// assert_eq!(map.put("b", 2), None);
/// assert_eq!(map.put("a", 3), Some(1));
/// assert_eq!(map.get("a"), Some(&3));
/// assert_eq!(map.len(), 2);
/// ```
#[derive(Clone)]
pub struct HashMap<K, V, S = DefaultHashBuilder> {
    table: RawTable<K, V, S, Unordered>,
}

impl<K, V> HashMap<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_CAPACITY)
    }

    /// `capacity` is rounded up to a power of two and clamped to
    /// [`MAXIMUM_CAPACITY`](crate::MAXIMUM_CAPACITY).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: RawTable::from_parts(
                capacity,
                DEFAULT_LOAD_FACTOR,
                DefaultHashBuilder::default(),
                Unordered,
            ),
        }
    }

    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f32) -> Result<Self, MapError> {
        let config = Config::new()
            .with_initial_capacity(capacity)
            .with_load_factor(load_factor);
        Self::with_config_and_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K, V> Default for HashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> HashMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            table: RawTable::from_parts(DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR, hasher, Unordered),
        }
    }

    /// The `order` field of `config` is ignored: this map is unordered.
    pub fn with_config_and_hasher(config: Config, hasher: S) -> Result<Self, MapError> {
        Ok(Self {
            table: RawTable::with_config(&config, hasher, Unordered)?,
        })
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

    /// A fail-fast cursor positioned before the first entry.
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

impl<K, V, S> HashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let h = self.table.find(key)?;
        self.table.slot(h).map(|s| &s.value)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let h = self.table.find(key)?;
        self.table.slot(h).map(|s| (&s.key, &s.value))
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let h = self.table.find(key)?;
        self.table.slot_mut(h).map(|s| &mut s.value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.find(key).is_some()
    }

    /// Handle to the entry for `key`, for use with [`Handle`] accessors.
    pub fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.find(key).map(|k| self.table.handle(k))
    }

    /// Insert `value` under `key`, returning the previous value if any.
    #[doc(alias = "insert")]
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        match self.table.insert(key, value, Placement::Natural) {
            Inserted::New(_) => None,
            Inserted::Replaced(_, old) => Some(old),
        }
    }

    /// Insert every pair, pre-sizing the table for the incoming count first.
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

impl<K, V, S> Sealed for HashMap<K, V, S> {}

impl<K, V, S> Traversal for HashMap<K, V, S> {
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

impl<K, V, S> fmt::Debug for HashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Maps are equal when they hold the same key/value pairs, in any order.
impl<K, V, S> PartialEq for HashMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for HashMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, Q, V, S> Index<&Q> for HashMap<K, V, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Eq + Hash,
    S: BuildHasher,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K, V, S> Extend<(K, V)> for HashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.table.reserve(iter.size_hint().0);
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<K, V, S> IntoIterator for HashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.table.into_ordered(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut HashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}
