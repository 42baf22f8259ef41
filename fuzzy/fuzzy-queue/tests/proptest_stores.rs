//! Property-based tests for the priority stores.
//!
//! Every backend is driven with the same random operation sequence and
//! checked against a simple map model.
//!
//! Run with: cargo test -p fuzzy-queue -- proptest

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use fuzzy_queue::{DoublyLinkedStore, HashedHeapStore, PriorityStore, QueueItem, SinglyLinkedStore};
use proptest::prelude::*;

const CAPACITY: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Item {
    id: u32,
    key: u32,
    payload: u64,
}

impl QueueItem for Item {
    type Id = u32;

    fn key(&self) -> u32 {
        self.key
    }

    fn id(&self) -> u32 {
        self.id
    }
}

#[derive(Debug, Clone)]
enum Op {
    Push(u32),
    Repush(usize, u32),
    Pop,
}

// =============================================================================
// Strategies
// =============================================================================

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..CAPACITY).prop_map(Op::Push),
        2 => (any::<usize>(), 0..CAPACITY).prop_map(|(i, k)| Op::Repush(i, k)),
        2 => Just(Op::Pop),
    ]
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(arb_op(), 1..200)
}

// =============================================================================
// Model check
// =============================================================================

/// Applies `ops` to `store` and to a map model, checking every pop.
fn check_against_model<S: PriorityStore<Item>>(mut store: S, ops: &[Op]) -> Vec<u32> {
    let mut model: BTreeMap<u32, Item> = BTreeMap::new();
    let mut next_id = 0;
    let mut popped_keys = Vec::new();

    for op in ops {
        match *op {
            Op::Push(key) => {
                let item = Item {
                    id: next_id,
                    key,
                    payload: u64::from(next_id) * 31,
                };
                next_id += 1;
                store.push(item).unwrap();
                model.insert(item.id, item);
            }
            Op::Repush(pick, key) => {
                if model.is_empty() {
                    continue;
                }
                let id = *model.keys().nth(pick % model.len()).unwrap();
                let old = model[&id];
                let moved = Item { key, ..old };
                store.repush(moved, old.key).unwrap();
                model.insert(id, moved);
            }
            Op::Pop => {
                let max = model.values().map(|i| i.key).max();
                let item = store.pop();
                assert_eq!(item.map(|i| i.key), max);
                if let Some(item) = item {
                    // The stored copy comes back unchanged.
                    assert_eq!(model.remove(&item.id), Some(item));
                    popped_keys.push(item.key);
                }
            }
        }
        assert_eq!(store.len(), model.len());
    }

    while let Some(item) = store.pop() {
        assert_eq!(model.remove(&item.id), Some(item));
        popped_keys.push(item.key);
    }
    assert!(model.is_empty());
    assert!(store.is_empty());
    popped_keys
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn proptest_singly_linked_matches_model(ops in arb_ops()) {
        check_against_model(SinglyLinkedStore::new(CAPACITY).unwrap(), &ops);
    }

    #[test]
    fn proptest_doubly_linked_matches_model(ops in arb_ops()) {
        check_against_model(DoublyLinkedStore::new(CAPACITY).unwrap(), &ops);
    }

    #[test]
    fn proptest_hashed_heap_matches_model(ops in arb_ops()) {
        check_against_model(HashedHeapStore::new(), &ops);
    }

    // Ties pop in backend-specific order, so a later re-key can pick a
    // different entry in each store. Without re-keys the keys line up.
    #[test]
    fn proptest_backends_pop_same_key_sequence(ops in arb_ops()) {
        let ops: Vec<Op> = ops.into_iter().filter(|op| !matches!(op, Op::Repush(..))).collect();
        let a = check_against_model(SinglyLinkedStore::new(CAPACITY).unwrap(), &ops);
        let b = check_against_model(DoublyLinkedStore::new(CAPACITY).unwrap(), &ops);
        let c = check_against_model(HashedHeapStore::new(), &ops);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(&a, &c);
    }

    #[test]
    fn proptest_n_pushes_then_n_pops_is_empty(keys in prop::collection::vec(0..CAPACITY, 0..3000)) {
        let mut store = SinglyLinkedStore::new(CAPACITY).unwrap();
        for (id, &key) in keys.iter().enumerate() {
            store.push(Item { id: u32::try_from(id).unwrap(), key, payload: 0 }).unwrap();
        }
        let mut last = u32::MAX;
        for _ in 0..keys.len() {
            let item = store.pop().unwrap();
            prop_assert!(item.key <= last);
            last = item.key;
        }
        prop_assert!(store.is_empty());
        prop_assert!(store.pop().is_none());
    }
}

#[test]
fn tied_keys_then_rekey_stay_consistent_per_backend() {
    // Three ties, a pop, then a re-key of whichever entry each store kept.
    let ops = [
        Op::Push(0),
        Op::Push(0),
        Op::Push(0),
        Op::Push(58),
        Op::Pop,
        Op::Pop,
        Op::Repush(0, 58),
        Op::Pop,
        Op::Pop,
    ];
    let singly = check_against_model(SinglyLinkedStore::new(CAPACITY).unwrap(), &ops);
    let doubly = check_against_model(DoublyLinkedStore::new(CAPACITY).unwrap(), &ops);
    let hashed = check_against_model(HashedHeapStore::new(), &ops);
    for keys in [&singly, &doubly, &hashed] {
        assert_eq!(keys, &[58, 0, 58, 0]);
    }
}

#[test]
fn out_of_range_key_rejected_by_bounded_stores() {
    let item = Item {
        id: 0,
        key: CAPACITY,
        payload: 0,
    };
    assert!(SinglyLinkedStore::new(CAPACITY).unwrap().push(item).is_err());
    assert!(DoublyLinkedStore::new(CAPACITY).unwrap().push(item).is_err());
    assert!(HashedHeapStore::new().push(item).is_ok());
}
