//! RawTable: chained buckets over a slot arena, with a pluggable ordering layer.

use crate::config::{table_size_for, threshold_for, Config, MAXIMUM_CAPACITY};
use crate::error::MapError;
use crate::order::{Order, Placement};
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::sync::atomic::{AtomicU64, Ordering};
use slotmap::{DefaultKey, SecondaryMap, SlotMap};

static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(0);

fn next_table_id() -> u64 {
    NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Stable, generational reference to a live entry.
///
/// Handles are obtained from `find` or a [`Cursor`](crate::Cursor) and stay
/// valid until their entry is removed; a stale handle never resolves, even if
/// its storage slot is reused. A handle only resolves against the map that
/// issued it; any other map, clones included, reports `None`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle {
    table: u64,
    key: DefaultKey,
}

impl Handle {
    pub fn key<'a, M: crate::Traversal>(&self, map: &'a M) -> Option<&'a M::Key> {
        map.handle_entry(*self).map(|(k, _)| k)
    }

    pub fn value<'a, M: crate::Traversal>(&self, map: &'a M) -> Option<&'a M::Value> {
        map.handle_entry(*self).map(|(_, v)| v)
    }

    pub fn value_mut<'a, M: crate::Traversal>(&self, map: &'a mut M) -> Option<&'a mut M::Value> {
        map.handle_value_mut(*self)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Slot<K, V, L> {
    pub(crate) hash: u32,
    pub(crate) key: K,
    pub(crate) value: V,
    /// Next entry in the same bucket.
    pub(crate) chain: Option<DefaultKey>,
    pub(crate) link: L,
}

pub(crate) type Slots<K, V, L> = SlotMap<DefaultKey, Slot<K, V, L>>;

/// Fold high bits into low bits so that masking by a power-of-two bucket
/// count does not discard most of a weak hash.
#[inline]
pub(crate) fn spread(mut h: u32) -> u32 {
    h ^= (h >> 20) ^ (h >> 12);
    h ^ (h >> 7) ^ (h >> 4)
}

#[inline]
pub(crate) fn index_for(hash: u32, len: usize) -> usize {
    debug_assert!(len.is_power_of_two());
    hash as usize & (len - 1)
}

/// Outcome of `RawTable::insert`.
pub(crate) enum Inserted<V> {
    New(DefaultKey),
    Replaced(DefaultKey, V),
}

pub(crate) struct RawTable<K, V, S, O: Order> {
    /// Identity checked by handles and cursors; never shared, even by clones.
    id: u64,
    hasher: S,
    buckets: Box<[Option<DefaultKey>]>,
    slots: Slots<K, V, O::Link>,
    threshold: usize,
    load_factor: f32,
    /// Bumped on every structural change; cursors compare against it.
    mod_count: u64,
    /// Bucket count at which resize stops growing. Always
    /// `MAXIMUM_CAPACITY` outside of tests.
    max_capacity: usize,
    order: O,
}

impl<K: Clone, V: Clone, S: Clone, O: Order + Clone> Clone for RawTable<K, V, S, O> {
    fn clone(&self) -> Self {
        Self {
            id: next_table_id(),
            hasher: self.hasher.clone(),
            buckets: self.buckets.clone(),
            slots: self.slots.clone(),
            threshold: self.threshold,
            load_factor: self.load_factor,
            mod_count: self.mod_count,
            max_capacity: self.max_capacity,
            order: self.order.clone(),
        }
    }
}

impl<K, V, S, O: Order> RawTable<K, V, S, O> {
    /// Build a table whose load factor is already known to be valid.
    pub(crate) fn from_parts(initial_capacity: usize, load_factor: f32, hasher: S, order: O) -> Self {
        debug_assert!(load_factor > 0.0 && load_factor.is_finite());
        let capacity = table_size_for(initial_capacity);
        Self {
            id: next_table_id(),
            hasher,
            buckets: vec![None; capacity].into_boxed_slice(),
            slots: SlotMap::with_key(),
            threshold: threshold_for(capacity, load_factor),
            load_factor,
            mod_count: 0,
            max_capacity: MAXIMUM_CAPACITY,
            order,
        }
    }

    /// Lower the growth cap so the saturated-resize path is reachable.
    #[cfg(test)]
    pub(crate) fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        debug_assert!(max_capacity.is_power_of_two() && max_capacity >= self.buckets.len());
        self.max_capacity = max_capacity;
        self
    }

    pub(crate) fn with_config(config: &Config, hasher: S, order: O) -> Result<Self, MapError> {
        config.validate()?;
        Ok(Self::from_parts(
            config.initial_capacity,
            config.load_factor,
            hasher,
            order,
        ))
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buckets.len()
    }

    #[cfg(test)]
    pub(crate) fn threshold(&self) -> usize {
        self.threshold
    }

    pub(crate) fn load_factor(&self) -> f32 {
        self.load_factor
    }

    pub(crate) fn mod_count(&self) -> u64 {
        self.mod_count
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Public handle for an entry of this table.
    pub(crate) fn handle(&self, k: DefaultKey) -> Handle {
        Handle { table: self.id, key: k }
    }

    /// Slot key behind `h`, or `None` if `h` was issued by another table.
    pub(crate) fn resolve(&self, h: Handle) -> Option<DefaultKey> {
        (h.table == self.id).then_some(h.key)
    }

    pub(crate) fn hasher(&self) -> &S {
        &self.hasher
    }

    pub(crate) fn order(&self) -> &O {
        &self.order
    }

    pub(crate) fn slots(&self) -> &Slots<K, V, O::Link> {
        &self.slots
    }

    pub(crate) fn slot(&self, k: DefaultKey) -> Option<&Slot<K, V, O::Link>> {
        self.slots.get(k)
    }

    pub(crate) fn slot_mut(&mut self, k: DefaultKey) -> Option<&mut Slot<K, V, O::Link>> {
        self.slots.get_mut(k)
    }

    #[inline]
    fn bump(&mut self) {
        self.mod_count = self.mod_count.wrapping_add(1);
    }

    pub(crate) fn first(&self) -> Option<DefaultKey> {
        self.order.first(&self.buckets, &self.slots)
    }

    pub(crate) fn after(&self, k: DefaultKey) -> Option<DefaultKey> {
        self.order.after(&self.buckets, &self.slots, k)
    }

    pub(crate) fn handles(&self) -> impl Iterator<Item = DefaultKey> + '_ {
        core::iter::successors(self.first(), move |&k| self.after(k))
    }

    pub(crate) fn buckets(&self) -> &[Option<DefaultKey>] {
        &self.buckets
    }

    /// Record a read of `k`; an access-ordered layer moves it to the tail.
    pub(crate) fn touch(&mut self, k: DefaultKey) {
        if self.order.accessed(&mut self.slots, k, Placement::Natural) {
            self.bump();
        }
    }

    /// Remove the entry behind a handle. Uses the cached hash, so `K: Hash`
    /// is not consulted.
    pub(crate) fn remove_handle(&mut self, k: DefaultKey) -> Option<(K, V)> {
        let (hash, next) = {
            let slot = self.slots.get(k)?;
            (slot.hash, slot.chain)
        };
        let index = index_for(hash, self.buckets.len());
        if self.buckets[index] == Some(k) {
            self.buckets[index] = next;
        } else {
            let mut cur = self.buckets[index];
            while let Some(c) = cur {
                let slot = &mut self.slots[c];
                if slot.chain == Some(k) {
                    slot.chain = next;
                    break;
                }
                cur = slot.chain;
            }
        }
        self.bump();
        self.order.unlinked(&mut self.slots, k);
        let slot = self.slots.remove(k)?;
        Some((slot.key, slot.value))
    }

    pub(crate) fn clear(&mut self) {
        self.bump();
        self.buckets.iter_mut().for_each(|b| *b = None);
        self.slots.clear();
        self.order.cleared();
    }

    pub(crate) fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.handles().any(|k| self.slots[k].value == *value)
    }

    /// Grow the bucket array to `new_capacity` and redistribute every entry
    /// by its cached hash, walking the ordering layer's traversal.
    fn resize(&mut self, new_capacity: usize) {
        if self.buckets.len() >= self.max_capacity {
            self.threshold = usize::MAX;
            return;
        }
        let new_capacity = new_capacity.min(self.max_capacity);
        let mut fresh = vec![None; new_capacity].into_boxed_slice();
        let mut cur = self.first();
        while let Some(k) = cur {
            // Read the successor before `k` is rethreaded into `fresh`.
            cur = self.after(k);
            let slot = &mut self.slots[k];
            let index = index_for(slot.hash, new_capacity);
            slot.chain = fresh[index];
            fresh[index] = Some(k);
        }
        self.buckets = fresh;
        self.threshold = threshold_for(new_capacity, self.load_factor);
    }

    /// Pre-size for `additional` incoming entries, as a bulk insert does.
    pub(crate) fn reserve(&mut self, additional: usize) {
        if additional <= self.threshold {
            return;
        }
        let target = ((additional as f64 / self.load_factor as f64) + 1.0) as usize;
        let target = target.min(self.max_capacity);
        let mut capacity = self.buckets.len();
        while capacity < target {
            capacity <<= 1;
        }
        if capacity > self.buckets.len() {
            self.resize(capacity);
        }
    }

    /// Mutable references in traversal order. Positions are resolved up front
    /// so that each slot is borrowed exactly once through the arena iterator;
    /// this costs an O(n) pass and allocation before the first item.
    pub(crate) fn ordered_mut(&mut self) -> Vec<(&K, &mut V)> {
        let mut position: SecondaryMap<DefaultKey, usize> = SecondaryMap::with_capacity(self.len());
        for (i, k) in self.handles().enumerate() {
            position.insert(k, i);
        }
        let mut placed: Vec<Option<(&K, &mut V)>> = (0..position.len()).map(|_| None).collect();
        for (k, slot) in self.slots.iter_mut() {
            if let Some(&i) = position.get(k) {
                placed[i] = Some((&slot.key, &mut slot.value));
            }
        }
        placed.into_iter().flatten().collect()
    }

    /// Consume the table, yielding owned pairs in traversal order.
    pub(crate) fn into_ordered(self) -> RawIntoIter<K, V, O::Link> {
        let handles: Vec<DefaultKey> = self.handles().collect();
        RawIntoIter {
            handles: handles.into_iter(),
            slots: self.slots,
        }
    }

    /// Keep only the entries for which `keep` returns true.
    pub(crate) fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut cur = self.first();
        while let Some(k) = cur {
            cur = self.after(k);
            let slot = &mut self.slots[k];
            if !keep(&slot.key, &mut slot.value) {
                self.remove_handle(k);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        use std::collections::HashSet;

        assert!(self.buckets.len().is_power_of_two());
        assert!(self.buckets.len() <= MAXIMUM_CAPACITY);

        let mut chained = HashSet::new();
        for (i, head) in self.buckets.iter().enumerate() {
            let mut cur = *head;
            while let Some(k) = cur {
                let slot = &self.slots[k];
                assert_eq!(index_for(slot.hash, self.buckets.len()), i, "entry in wrong bucket");
                assert!(chained.insert(k), "entry chained twice");
                cur = slot.chain;
            }
        }
        assert_eq!(chained.len(), self.slots.len(), "unreachable entries");

        let walked: Vec<DefaultKey> = self.handles().collect();
        let walked_set: HashSet<DefaultKey> = walked.iter().copied().collect();
        assert_eq!(walked.len(), walked_set.len(), "traversal repeats an entry");
        assert_eq!(walked_set, chained, "traversal and chains disagree");
        self.order.assert_links(&self.slots);
    }
}

impl<K, V, S, O> RawTable<K, V, S, O>
where
    K: Eq + Hash,
    S: BuildHasher,
    O: Order,
{
    pub(crate) fn make_hash<Q>(&self, q: &Q) -> u32
    where
        Q: ?Sized + Hash,
    {
        let h = self.hasher.hash_one(q);
        spread((h ^ (h >> 32)) as u32)
    }

    fn find_hashed<Q>(&self, hash: u32, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut cur = self.buckets[index_for(hash, self.buckets.len())];
        while let Some(k) = cur {
            let slot = &self.slots[k];
            if slot.hash == hash && slot.key.borrow() == q {
                return Some(k);
            }
            cur = slot.chain;
        }
        None
    }

    pub(crate) fn find<Q>(&self, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find_hashed(self.make_hash(q), q)
    }

    /// Insert or update. An update replaces the value in place and is
    /// reported to the ordering layer; only a new entry bumps `mod_count`
    /// unconditionally.
    pub(crate) fn insert(&mut self, key: K, value: V, place: Placement) -> Inserted<V> {
        let hash = self.make_hash(&key);
        if let Some(k) = self.find_hashed(hash, &key) {
            let old = core::mem::replace(&mut self.slots[k].value, value);
            if self.order.accessed(&mut self.slots, k, place) {
                self.bump();
            }
            return Inserted::Replaced(k, old);
        }

        self.bump();
        let mut index = index_for(hash, self.buckets.len());
        // Grow only when the new entry would start or extend a collision chain.
        if self.slots.len() >= self.threshold && self.buckets[index].is_some() {
            self.resize(2 * self.buckets.len());
            index = index_for(hash, self.buckets.len());
        }

        let chain = self.buckets[index];
        let k = self.slots.insert(Slot {
            hash,
            key,
            value,
            chain,
            link: Default::default(),
        });
        self.buckets[index] = Some(k);
        self.order.linked(&mut self.slots, k, place);
        Inserted::New(k)
    }

    pub(crate) fn remove<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let k = self.find(q)?;
        self.remove_handle(k)
    }
}

pub(crate) struct RawIntoIter<K, V, L> {
    handles: std::vec::IntoIter<DefaultKey>,
    slots: Slots<K, V, L>,
}

impl<K, V, L> Iterator for RawIntoIter<K, V, L> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        let k = self.handles.next()?;
        self.slots.remove(k).map(|s| (s.key, s.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.handles.size_hint()
    }
}
