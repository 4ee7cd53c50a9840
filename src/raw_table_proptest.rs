#![cfg(test)]

// Property tests for RawTable kept inside the crate so they can reach the
// internal layer and its structural checker.

use crate::config::OrderMode;
use crate::order::{Linked, Placement, Unordered};
use crate::raw_table::{Inserted, RawTable};
use hashbrown::HashMap;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use slotmap::DefaultKey;
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations so shrinking moves toward earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    PutFirst(usize, i32),
    PutLast(usize, i32),
    Get(usize),
    Remove(usize),
    RemoveHandle(usize),
    Contains(String),
    Mutate(usize, i32),
    Retain(i32),
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::PutFirst(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::PutLast(i, v)),
            3 => idx.clone().prop_map(OpI::Get),
            2 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::RemoveHandle),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => (-3i32..3).prop_map(OpI::Retain),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

/// Expected traversal order for a linked table; `None` for an unordered one.
struct OrderModel {
    mode: Option<OrderMode>,
    keys: Vec<Key>,
}

impl OrderModel {
    fn drop_key(&mut self, k: &Key) {
        self.keys.retain(|x| x != k);
    }

    fn put(&mut self, k: &Key, existed: bool, place: Placement) {
        let Some(mode) = self.mode else { return };
        match place {
            Placement::Head => {
                self.drop_key(k);
                self.keys.insert(0, k.clone());
            }
            Placement::Tail => {
                self.drop_key(k);
                self.keys.push(k.clone());
            }
            Placement::Natural if !existed => self.keys.push(k.clone()),
            Placement::Natural => self.touch(k, mode),
        }
    }

    fn touch(&mut self, k: &Key, mode: OrderMode) {
        if mode == OrderMode::Access {
            self.drop_key(k);
            self.keys.push(k.clone());
        }
    }
}

// State-machine equivalence against hashbrown::HashMap. After every op:
// - the bucket chains, the traversal and `len` agree (`assert_consistent`);
// - the key set matches the model, and a linked table walks in model order;
// - stale handles never resolve;
// - `mod_count` moves exactly when the op changes structure or order.
fn run<S, O>(
    mut sut: RawTable<Key, i32, S, O>,
    mode: Option<OrderMode>,
    pool: Vec<String>,
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher,
    O: crate::order::Order,
{
    let mut model: HashMap<Key, i32> = HashMap::new();
    let mut order = OrderModel { mode, keys: Vec::new() };
    let mut stale: Vec<DefaultKey> = Vec::new();

    for op in ops {
        let before = sut.mod_count();
        let mut structural = false;
        match op {
            OpI::Put(i, v) | OpI::PutFirst(i, v) | OpI::PutLast(i, v) => {
                let place = match op {
                    OpI::PutFirst(..) => Placement::Head,
                    OpI::PutLast(..) => Placement::Tail,
                    _ => Placement::Natural,
                };
                let k = key_from(&pool, i);
                let prev = model.insert(k.clone(), v);
                let existed = prev.is_some();
                match sut.insert(k.clone(), v, place) {
                    Inserted::New(h) => {
                        prop_assert!(!existed, "new entry for a present key");
                        prop_assert_eq!(sut.slot(h).map(|s| s.value), Some(v));
                        structural = true;
                    }
                    Inserted::Replaced(_, old) => {
                        prop_assert_eq!(Some(old), prev);
                        // Explicit placement reorders unless the entry already
                        // sits at that end; any access reorders in access order.
                        structural = match (mode, place) {
                            (None, _) => false,
                            (Some(_), Placement::Head) => order.keys.first() != Some(&k),
                            (Some(_), Placement::Tail) => order.keys.last() != Some(&k),
                            (Some(m), Placement::Natural) => m == OrderMode::Access,
                        };
                    }
                }
                order.put(&k, existed, place);
            }
            OpI::Get(i) => {
                let k = key_from(&pool, i);
                let found = sut.find(&k);
                prop_assert_eq!(found.is_some(), model.contains_key(&k));
                if let Some(h) = found {
                    sut.touch(h);
                    if let Some(m) = mode {
                        order.touch(&k, m);
                        structural = m == OrderMode::Access;
                    }
                }
            }
            OpI::Remove(i) => {
                let k = key_from(&pool, i);
                let got = sut.remove(k.0.as_str());
                let expected = model.remove(&k);
                structural = expected.is_some();
                prop_assert_eq!(got.map(|(_, v)| v), expected);
                order.drop_key(&k);
            }
            OpI::RemoveHandle(i) => {
                let k = key_from(&pool, i);
                if let Some(h) = sut.find(&k) {
                    let (kk, vv) = sut.remove_handle(h).expect("live handle");
                    prop_assert!(kk == k);
                    prop_assert_eq!(Some(vv), model.remove(&k));
                    order.drop_key(&k);
                    stale.push(h);
                    structural = true;
                } else {
                    prop_assert!(!model.contains_key(&k));
                }
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.find(s.as_str()).is_some(), model.contains_key(s.as_str()));
            }
            OpI::Mutate(i, d) => {
                let k = key_from(&pool, i);
                if let Some(h) = sut.find(&k) {
                    let slot = sut.slot_mut(h).expect("live handle");
                    slot.value = slot.value.wrapping_add(d);
                    let mv = model.get_mut(&k).expect("present in model");
                    *mv = mv.wrapping_add(d);
                }
            }
            OpI::Retain(m) => {
                let n = model.len();
                sut.retain(|_, v| v.rem_euclid(3) != m.rem_euclid(3));
                model.retain(|_, v| v.rem_euclid(3) != m.rem_euclid(3));
                order.keys.retain(|k| model.contains_key(k));
                structural = model.len() != n;
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
                order.keys.clear();
                structural = true;
            }
        }

        sut.assert_consistent();
        prop_assert_eq!(sut.len(), model.len());
        for (k, v) in &model {
            let h = sut.find(k);
            prop_assert_eq!(h.and_then(|h| sut.slot(h)).map(|s| s.value), Some(*v));
        }
        if mode.is_some() {
            let walked: Vec<Key> = sut.handles().map(|h| sut.slots()[h].key.clone()).collect();
            prop_assert_eq!(&walked, &order.keys);
        }
        for &h in &stale {
            prop_assert!(sut.slot(h).is_none());
        }
        if structural {
            prop_assert!(sut.mod_count() > before, "structural op did not bump mod_count");
        } else {
            prop_assert_eq!(sut.mod_count(), before);
        }
    }
    Ok(())
}

// Collision variant using a constant hasher to stress chain handling.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_unordered((pool, ops) in arb_scenario()) {
        let sut = RawTable::from_parts(1, 0.75, hashbrown::hash_map::DefaultHashBuilder::default(), Unordered);
        run(sut, None, pool, ops)?;
    }

    #[test]
    fn prop_insertion_order((pool, ops) in arb_scenario()) {
        let sut = RawTable::from_parts(2, 0.5, hashbrown::hash_map::DefaultHashBuilder::default(), Linked::new(OrderMode::Insertion));
        run(sut, Some(OrderMode::Insertion), pool, ops)?;
    }

    #[test]
    fn prop_access_order((pool, ops) in arb_scenario()) {
        let sut = RawTable::from_parts(4, 1.5, hashbrown::hash_map::DefaultHashBuilder::default(), Linked::new(OrderMode::Access));
        run(sut, Some(OrderMode::Access), pool, ops)?;
    }

    // Worst-case collisions: every key shares one bucket chain.
    #[test]
    fn prop_access_order_with_collisions((pool, ops) in arb_scenario()) {
        let sut = RawTable::from_parts(1, 0.75, ConstBuildHasher, Linked::new(OrderMode::Access));
        run(sut, Some(OrderMode::Access), pool, ops)?;
    }

    #[test]
    fn prop_unordered_with_collisions((pool, ops) in arb_scenario()) {
        let sut = RawTable::from_parts(1, 0.75, ConstBuildHasher, Unordered);
        run(sut, None, pool, ops)?;
    }
}
