use chained_hashmap::{Capacity, LinkedHashMap, OrderMode};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Put(u8, i32),
    PutFirst(u8, i32),
    Get(u8),
    Remove(u8),
    RemoveFirst,
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        4 => (0u8..16, any::<i32>()).prop_map(|(k, v)| Op::Put(k, v)),
        1 => (0u8..16, any::<i32>()).prop_map(|(k, v)| Op::PutFirst(k, v)),
        2 => (0u8..16).prop_map(Op::Get),
        1 => (0u8..16).prop_map(Op::Remove),
        1 => Just(Op::RemoveFirst),
    ];
    proptest::collection::vec(op, 1..200)
}

// Ordered (key, value) list; the front is the head of the map.
fn model_put(model: &mut Vec<(u8, i32)>, k: u8, v: i32, front: bool, access: bool) -> bool {
    let pos = model.iter().position(|(mk, _)| *mk == k);
    match pos {
        Some(i) if front => {
            model.remove(i);
            model.insert(0, (k, v));
        }
        Some(i) if access => {
            model.remove(i);
            model.push((k, v));
        }
        Some(i) => model[i].1 = v,
        None if front => model.insert(0, (k, v)),
        None => model.push((k, v)),
    }
    pos.is_none()
}

proptest! {
    // Property: the map walks in exactly the order a Vec model predicts, in
    // both modes, and every inserted key is retrievable until removed.
    #[test]
    fn prop_order_matches_model(ops in arb_ops(), access in any::<bool>()) {
        let mode = if access { OrderMode::Access } else { OrderMode::Insertion };
        let mut m: LinkedHashMap<u8, i32> = LinkedHashMap::with_order(mode);
        let mut model: Vec<(u8, i32)> = Vec::new();

        for op in ops {
            match op {
                Op::Put(k, v) => {
                    let prev = model.iter().find(|(mk, _)| *mk == k).map(|(_, v)| *v);
                    prop_assert_eq!(m.put(k, v), prev);
                    model_put(&mut model, k, v, false, access);
                }
                Op::PutFirst(k, v) => {
                    m.put_first(k, v);
                    model_put(&mut model, k, v, true, access);
                }
                Op::Get(k) => {
                    let pos = model.iter().position(|(mk, _)| *mk == k);
                    prop_assert_eq!(m.get(&k).copied(), pos.map(|i| model[i].1));
                    if let (Some(i), true) = (pos, access) {
                        let e = model.remove(i);
                        model.push(e);
                    }
                }
                Op::Remove(k) => {
                    let pos = model.iter().position(|(mk, _)| *mk == k);
                    prop_assert_eq!(m.remove(&k), pos.map(|i| model.remove(i).1));
                }
                Op::RemoveFirst => {
                    let want = if model.is_empty() { None } else { Some(model.remove(0)) };
                    prop_assert_eq!(m.remove_first_entry().ok(), want);
                }
            }
            prop_assert_eq!(m.len(), model.len());
            let got: Vec<(u8, i32)> = m.iter().map(|(k, v)| (*k, *v)).collect();
            prop_assert_eq!(&got, &model);
            prop_assert_eq!(m.first_entry().map(|(k, _)| *k), model.first().map(|e| e.0));
            prop_assert_eq!(m.last_entry().map(|(k, _)| *k), model.last().map(|e| e.0));
        }
    }

    // Property: with a `len > N` policy the map never exceeds N entries, and
    // each insertion evicts exactly the entry that was at the head.
    #[test]
    fn prop_eviction_bound(ops in arb_ops(), max in 1usize..6, access in any::<bool>()) {
        let mode = if access { OrderMode::Access } else { OrderMode::Insertion };
        let mut m = LinkedHashMap::<u8, i32>::with_order(mode).with_eviction(Capacity::new(max));
        let mut model: Vec<(u8, i32)> = Vec::new();

        for op in ops {
            match op {
                Op::Put(k, v) | Op::PutFirst(k, v) => {
                    let front = matches!(op, Op::PutFirst(..));
                    if front { m.put_first(k, v); } else { m.put(k, v); }
                    if model_put(&mut model, k, v, front, access) && model.len() > max {
                        model.remove(0);
                    }
                }
                Op::Get(k) => {
                    if let Some(i) = model.iter().position(|(mk, _)| *mk == k) {
                        prop_assert!(m.get(&k).is_some());
                        if access {
                            let e = model.remove(i);
                            model.push(e);
                        }
                    } else {
                        prop_assert!(m.get(&k).is_none());
                    }
                }
                Op::Remove(k) => {
                    model.retain(|(mk, _)| *mk != k);
                    m.remove(&k);
                }
                Op::RemoveFirst => {
                    if !model.is_empty() {
                        model.remove(0);
                    }
                    let _ = m.remove_first();
                }
            }
            prop_assert!(m.len() <= max);
            let got: Vec<(u8, i32)> = m.iter().map(|(k, v)| (*k, *v)).collect();
            prop_assert_eq!(&got, &model);
        }
    }
}
