#![cfg(test)]

// Property tests for HashTable and ChainedList, checked against std
// collections as models.

use crate::chained_list::ChainedList;
use crate::config::TableConfig;
use crate::error::{ListError, RemoveError};
use crate::hash_table::HashTable;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations so shrinking moves toward earlier keys.
#[derive(Clone, Debug)]
enum TableOp {
    Set(usize, i32),
    Remove(usize),
    Get(usize),
    Has(String),
    Clear,
    Entries,
}

fn arb_table_scenario() -> impl Strategy<Value = (Vec<String>, Vec<TableOp>)> {
    proptest::collection::vec("[a-zA-Z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| TableOp::Set(i, v)),
            2 => idx.clone().prop_map(TableOp::Remove),
            2 => idx.clone().prop_map(TableOp::Get),
            1 => "[a-zA-Z]{0,5}".prop_map(TableOp::Has),
            1 => Just(TableOp::Clear),
            1 => Just(TableOp::Entries),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_table_ops(
    mut sut: HashTable<i32>,
    pool: &[String],
    ops: Vec<TableOp>,
    bounded_load: bool,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();
    let mut last_capacity = sut.capacity();

    for op in ops {
        match op {
            TableOp::Set(i, v) => {
                let k = &pool[i];
                sut.set(k.clone(), v);
                model.insert(k.clone(), v);
            }
            TableOp::Remove(i) => {
                let k = &pool[i];
                let bucket_was_empty = sut.bucket(k).is_empty();
                match sut.remove(k) {
                    Ok(v) => {
                        let mv = model.remove(k).expect("present in model");
                        prop_assert_eq!(v, mv);
                    }
                    Err(RemoveError::BucketEmpty { bucket }) => {
                        prop_assert!(bucket_was_empty);
                        prop_assert_eq!(bucket, sut.hash(k));
                        prop_assert!(!model.contains_key(k));
                    }
                    Err(RemoveError::KeyNotFound { key }) => {
                        prop_assert!(!bucket_was_empty);
                        prop_assert_eq!(&key, k);
                        prop_assert!(!model.contains_key(k));
                    }
                }
            }
            TableOp::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
            }
            TableOp::Has(s) => {
                prop_assert_eq!(sut.has(&s), model.contains_key(&s));
            }
            TableOp::Clear => {
                sut.clear();
                model.clear();
            }
            TableOp::Entries => {
                let got: BTreeSet<_> = sut.entries().into_iter().collect();
                let want: BTreeSet<_> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(got, want);
                prop_assert_eq!(sut.keys().len(), model.len());
            }
        }

        // Post-conditions after each op
        // 1) Size parity, walked and counted
        prop_assert_eq!(sut.length(), model.len());
        prop_assert_eq!(sut.len(), model.len());
        // 2) Capacity only grows, by doubling
        let cap = sut.capacity();
        prop_assert!(cap == last_capacity || cap == last_capacity * 2);
        last_capacity = cap;
        prop_assert_eq!(sut.buckets().len(), cap);
        // 3) Every key sits in the bucket its current hash names
        for (idx, bucket) in sut.buckets().iter().enumerate() {
            for (k, _) in bucket {
                prop_assert_eq!(sut.hash(k), idx);
            }
        }
        if bounded_load {
            prop_assert!(sut.len() as f64 <= cap as f64 * sut.load_factor());
        }
    }
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `get`/`has` parity with the model, overwrite keeps a single node.
// - `remove` returns the stored value, or the error kind matching the
//   bucket's state before the call.
// - Growth only doubles and leaves every key in its rehashed bucket.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_table_state_machine((pool, ops) in arb_table_scenario()) {
        run_table_ops(HashTable::new(), &pool, ops, true)?;
    }
}

// Property: Same invariants starting from a single bucket, where every key
// collides until the table has grown several times.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_table_state_machine_from_one_bucket((pool, ops) in arb_table_scenario()) {
        let sut = HashTable::with_config(TableConfig::new(1.0, 1)).expect("valid config");
        run_table_ops(sut, &pool, ops, true)?;
    }
}

// Property: re-inserting `entries()` into a fresh table of the same
// configuration reproduces the same pair set.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_entries_round_trip(pairs in proptest::collection::vec(("[a-z]{1,6}", any::<i32>()), 0..64)) {
        let mut a = HashTable::new();
        for (k, v) in &pairs {
            a.set(k.clone(), *v);
        }
        let mut b = HashTable::new();
        for (k, v) in a.entries() {
            b.set(k, v);
        }
        let sa: BTreeSet<_> = a.entries().into_iter().collect();
        let sb: BTreeSet<_> = b.entries().into_iter().collect();
        prop_assert_eq!(sa, sb);
        prop_assert_eq!(a.capacity(), b.capacity());
    }
}

#[derive(Clone, Debug)]
enum ListOp {
    Append(u8, i32),
    Prepend(u8, i32),
    InsertAt(u8, i32, usize),
    RemoveAt(usize),
    Pop,
    At(usize),
    Find(u8),
}

fn arb_list_op() -> impl Strategy<Value = ListOp> {
    prop_oneof![
        (0u8..6, any::<i32>()).prop_map(|(k, v)| ListOp::Append(k, v)),
        (0u8..6, any::<i32>()).prop_map(|(k, v)| ListOp::Prepend(k, v)),
        (0u8..6, any::<i32>(), 0usize..10).prop_map(|(k, v, i)| ListOp::InsertAt(k, v, i)),
        (0usize..10).prop_map(ListOp::RemoveAt),
        Just(ListOp::Pop),
        (0usize..10).prop_map(ListOp::At),
        (0u8..6).prop_map(ListOp::Find),
    ]
}

fn key(k: u8) -> String {
    format!("k{k}")
}

// Property: ChainedList behaves like a Vec of pairs for every positional
// operation, and failed operations leave it unchanged.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_list_matches_vec(ops in proptest::collection::vec(arb_list_op(), 1..60)) {
        let mut sut: ChainedList<i32> = ChainedList::new();
        let mut model: Vec<(String, i32)> = Vec::new();

        for op in ops {
            match op {
                ListOp::Append(k, v) => {
                    sut.append(key(k), v);
                    model.push((key(k), v));
                }
                ListOp::Prepend(k, v) => {
                    sut.prepend(key(k), v);
                    model.insert(0, (key(k), v));
                }
                ListOp::InsertAt(k, v, i) => {
                    let res = sut.insert_at(key(k), v, i);
                    if i == 0 || i < model.len() {
                        prop_assert_eq!(res, Ok(()));
                        model.insert(i, (key(k), v));
                    } else if model.is_empty() {
                        prop_assert_eq!(res, Err(ListError::Empty));
                    } else {
                        prop_assert_eq!(res, Err(ListError::IndexOutOfRange { index: i }));
                    }
                }
                ListOp::RemoveAt(i) => {
                    let res = sut.remove_at(i);
                    if model.is_empty() {
                        prop_assert_eq!(res, Err(ListError::Empty));
                    } else if i < model.len() {
                        prop_assert_eq!(res, Ok(model.remove(i)));
                    } else {
                        prop_assert_eq!(res, Err(ListError::IndexOutOfRange { index: i }));
                    }
                }
                ListOp::Pop => {
                    let res = sut.pop();
                    match model.pop() {
                        Some(pair) => prop_assert_eq!(res, Ok(pair)),
                        None => prop_assert_eq!(res, Err(ListError::Empty)),
                    }
                }
                ListOp::At(i) => {
                    let res = sut.at(i);
                    match model.get(i) {
                        Some((k, v)) => {
                            let h = res.expect("index in range");
                            prop_assert_eq!(h.key(&sut), Some(k.as_str()));
                            prop_assert_eq!(h.value(&sut), Some(v));
                        }
                        None if model.is_empty() => prop_assert_eq!(res, Err(ListError::Empty)),
                        None => prop_assert_eq!(res, Err(ListError::IndexOutOfRange { index: i })),
                    }
                }
                ListOp::Find(k) => {
                    let want = model.iter().position(|(mk, _)| *mk == key(k));
                    prop_assert_eq!(sut.find(&key(k)), want);
                    prop_assert_eq!(sut.contains(&key(k)), want.is_some());
                }
            }

            prop_assert_eq!(sut.size(), model.len());
            prop_assert_eq!(sut.entries(), model.clone());
            let tail = sut.tail().and_then(|h| h.key(&sut).map(str::to_string));
            prop_assert_eq!(tail, model.last().map(|(k, _)| k.clone()));
        }
    }
}
