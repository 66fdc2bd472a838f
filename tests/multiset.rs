use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tally_tree::{Comparator, Multiset, NaturalOrder, Rank};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 5_000;

/// Keys drawn from a narrow range so that duplicates are common.
fn key_strategy() -> impl Strategy<Value = i64> {
    -500i64..500i64
}

fn contents<C: Comparator<i64>>(set: &Multiset<i64, C>) -> Vec<(i64, usize)> {
    set.iter().map(|(k, c)| (*k, c)).collect()
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Put(i64),
    RemoveOne(i64),
    RemoveAll(i64),
    Count(i64),
    Contains(i64),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => key_strategy().prop_map(Op::Put),
        3 => key_strategy().prop_map(Op::RemoveOne),
        1 => key_strategy().prop_map(Op::RemoveAll),
        2 => key_strategy().prop_map(Op::Count),
        2 => key_strategy().prop_map(Op::Contains),
        1 => Just(Op::Clear),
    ]
}

// ─── Model comparison ────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays random operations on a `Multiset` and on a `BTreeMap` of counts
    /// and asserts identical results at every step.
    #[test]
    fn ops_match_counting_btreemap(ops in proptest::collection::vec(op_strategy(), TEST_SIZE)) {
        let mut set: Multiset<i64> = Multiset::new();
        let mut model: BTreeMap<i64, usize> = BTreeMap::new();
        let mut model_len = 0usize;

        for op in &ops {
            match *op {
                Op::Put(k) => {
                    prop_assert!(set.put(k).is_ok());
                    *model.entry(k).or_insert(0) += 1;
                    model_len += 1;
                }
                Op::RemoveOne(k) => {
                    let expected = match model.get_mut(&k) {
                        None => false,
                        Some(count) => {
                            *count -= 1;
                            if *count == 0 {
                                model.remove(&k);
                            }
                            model_len -= 1;
                            true
                        }
                    };
                    prop_assert_eq!(set.remove_one(&k), expected, "remove_one({})", k);
                }
                Op::RemoveAll(k) => {
                    let removed = model.remove(&k);
                    model_len -= removed.unwrap_or(0);
                    prop_assert_eq!(set.remove_all(&k), removed.is_some(), "remove_all({})", k);
                }
                Op::Count(k) => {
                    prop_assert_eq!(set.count(&k), model.get(&k).copied().unwrap_or(0), "count({})", k);
                }
                Op::Contains(k) => {
                    prop_assert_eq!(set.contains(&k), model.contains_key(&k), "contains({})", k);
                }
                Op::Clear => {
                    set.clear();
                    model.clear();
                    model_len = 0;
                }
            }
            prop_assert_eq!(set.len(), model_len, "len mismatch after {:?}", op);
            prop_assert_eq!(set.distinct_len(), model.len(), "distinct_len mismatch after {:?}", op);
            prop_assert_eq!(set.is_empty(), model_len == 0, "is_empty mismatch after {:?}", op);
        }

        let expected: Vec<(i64, usize)> = model.into_iter().collect();
        prop_assert_eq!(contents(&set), expected);
    }

    /// Distinct keys come out strictly increasing whatever the history.
    #[test]
    fn iteration_is_strictly_increasing(ops in proptest::collection::vec(op_strategy(), 1..TEST_SIZE)) {
        let mut set: Multiset<i64> = Multiset::new();
        for op in ops {
            match op {
                Op::Put(k) => set.put(k).unwrap(),
                Op::RemoveOne(k) => {
                    set.remove_one(&k);
                }
                Op::RemoveAll(k) => {
                    set.remove_all(&k);
                }
                Op::Count(_) | Op::Contains(_) | Op::Clear => {}
            }
        }

        let keys: Vec<i64> = set.iter().map(|(k, _)| *k).collect();
        prop_assert!(keys.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(set.iter().len(), set.distinct_len());
        prop_assert_eq!(set.iter().map(|(_, c)| c).sum::<usize>(), set.len());
    }

    /// Every rank maps to the key a flattened sorted vector has at that index.
    #[test]
    fn ranks_match_sorted_vec(values in proptest::collection::vec(key_strategy(), 1..2_000)) {
        let mut set: Multiset<i64> = Multiset::new();
        set.try_extend(values.iter().copied()).unwrap();

        let mut sorted = values.clone();
        sorted.sort_unstable();

        for (rank, value) in sorted.iter().enumerate() {
            prop_assert_eq!(set.get_by_rank(rank), Some(value));
            prop_assert_eq!(set[Rank(rank)], *value);
        }
        prop_assert_eq!(set.get_by_rank(sorted.len()), None);

        for value in &values {
            let first = sorted.partition_point(|v| v < value);
            prop_assert_eq!(set.rank_of(value), Some(first));
        }
    }

    /// A custom comparator drives ordering and equivalence.
    #[test]
    fn custom_comparator_groups_equivalent_keys(values in proptest::collection::vec(-1_000i64..1_000, 0..1_000)) {
        let by_magnitude = |a: &i64, b: &i64| a.unsigned_abs().cmp(&b.unsigned_abs());
        let mut set = Multiset::with_comparator(by_magnitude);
        set.try_extend(values.iter().copied()).unwrap();

        let mut model: BTreeMap<u64, usize> = BTreeMap::new();
        for v in &values {
            *model.entry(v.unsigned_abs()).or_insert(0) += 1;
        }

        prop_assert_eq!(set.len(), values.len());
        prop_assert_eq!(set.distinct_len(), model.len());
        for (&magnitude, &count) in &model {
            let positive = i64::try_from(magnitude).unwrap();
            prop_assert_eq!(set.count(&positive), count);
            prop_assert_eq!(set.count(&-positive), count);
        }
        let magnitudes: Vec<u64> = set.iter().map(|(k, _)| k.unsigned_abs()).collect();
        prop_assert_eq!(magnitudes, model.keys().copied().collect::<Vec<_>>());
    }
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn put_count_remove_scenario() {
    let mut set = Multiset::new();
    for key in [3, 1, 3, 2] {
        set.put(key).unwrap();
    }
    assert_eq!(set.len(), 4);
    assert_eq!(set.count(&3), 2);
    assert_eq!(set.count(&1), 1);
    assert!(!set.contains(&5));

    assert!(set.remove_one(&3));
    assert_eq!(set.count(&3), 1);
    assert_eq!(set.len(), 3);

    assert!(set.remove_all(&3));
    assert!(!set.contains(&3));
    assert_eq!(set.len(), 2);

    set.clear();
    assert_eq!(set.len(), 0);
    assert!(set.is_empty());
}

#[test]
fn duplicate_puts_share_one_record() {
    let mut set = Multiset::new();
    set.put("k").unwrap();
    set.put("k").unwrap();
    assert_eq!(set.count(&"k"), 2);
    assert_eq!(set.distinct_len(), 1);
    assert_eq!(set.iter().count(), 1);
}

#[test]
fn last_copy_removal_then_reinsert() {
    let mut set = Multiset::new();
    set.put(42u16).unwrap();
    assert!(set.remove_one(&42));
    assert!(!set.contains(&42));
    assert!(set.is_empty());
    assert!(!set.remove_one(&42));

    set.put(42).unwrap();
    assert_eq!(set.count(&42), 1);
}

#[test]
fn remove_all_drops_whole_multiplicity() {
    let mut set = Multiset::new();
    set.try_extend([9, 9, 9, 9, 9, 1, 2]).unwrap();
    let before = set.len();
    assert!(set.remove_all(&9));
    assert_eq!(set.len(), before - 5);
    assert!(!set.contains(&9));
    assert!(!set.remove_all(&9));
}

#[test]
fn missing_keys_are_not_errors() {
    let mut set: Multiset<u32> = Multiset::new();
    assert_eq!(set.count(&1), 0);
    assert!(!set.contains(&1));
    assert!(!set.remove_one(&1));
    assert!(!set.remove_all(&1));
    assert_eq!(set.get(&1), None);
    assert!(set.first().is_none() && set.last().is_none());
}

#[test]
fn cleared_multiset_is_reusable() {
    let mut set = Multiset::new();
    set.try_extend(0..1_000).unwrap();
    set.clear();
    assert!(set.is_empty());
    assert_eq!(set.distinct_len(), 0);

    set.try_extend([5, 5, 6]).unwrap();
    assert_eq!(contents_u(&set), vec![(5, 2), (6, 1)]);
}

fn contents_u(set: &Multiset<i32>) -> Vec<(i32, usize)> {
    set.into_iter().map(|(k, c)| (*k, c)).collect()
}

#[test]
fn first_last_and_get() {
    let mut set = Multiset::new();
    set.try_extend([7, -3, 7, 12]).unwrap();
    assert_eq!(set.first(), Some((&-3, 1)));
    assert_eq!(set.last(), Some((&12, 1)));
    assert_eq!(set.get(&7), Some(&7));
}

#[test]
fn descending_comparator_reverses_iteration() {
    let mut set = Multiset::with_comparator(|a: &i64, b: &i64| b.cmp(a));
    set.try_extend([1, 3, 2, 3]).unwrap();
    assert_eq!(contents(&set), vec![(3, 2), (2, 1), (1, 1)]);
    assert_eq!(set.rank_of(&1), Some(3));
}

#[test]
fn struct_keys_with_field_comparator() {
    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Reading {
        sensor: u16,
        value: f32,
    }

    struct BySensor;
    impl Comparator<Reading> for BySensor {
        fn compare(&self, a: &Reading, b: &Reading) -> Ordering {
            a.sensor.cmp(&b.sensor)
        }
    }

    let mut set = Multiset::with_comparator(BySensor);
    set.put(Reading { sensor: 2, value: 0.5 }).unwrap();
    set.put(Reading { sensor: 1, value: 9.0 }).unwrap();
    set.put(Reading { sensor: 2, value: 1.5 }).unwrap();

    // The first key put for a sensor is the one that is stored.
    let probe = Reading { sensor: 2, value: 0.0 };
    assert_eq!(set.count(&probe), 2);
    assert_eq!(set.get(&probe), Some(&Reading { sensor: 2, value: 0.5 }));
    assert_eq!(set.key_size(), std::mem::size_of::<Reading>());
}

#[test]
fn equality_ignores_insertion_order() {
    let mut a = Multiset::new();
    let mut b = Multiset::new();
    a.try_extend([1, 2, 2, 3]).unwrap();
    b.try_extend([2, 3, 2, 1]).unwrap();
    assert_eq!(a, b);

    b.remove_one(&2);
    assert!(a != b);

    let c = a.clone();
    assert_eq!(a, c);
    assert_eq!(format!("{c:?}"), "{1: 1, 2: 2, 3: 1}");
}

#[test]
fn equality_matches_keys_through_the_comparator() {
    let by_id = |a: &(u8, &str), b: &(u8, &str)| a.0.cmp(&b.0);
    let mut first = Multiset::with_comparator(by_id);
    let mut second = Multiset::with_comparator(by_id);
    first.try_extend([(1, "alpha"), (2, "beta"), (1, "again")]).unwrap();
    second.try_extend([(2, "other"), (1, "one"), (1, "uno")]).unwrap();

    // Different stored representatives, same classes and counts.
    assert_eq!(first.get(&(1, "")), Some(&(1, "alpha")));
    assert_eq!(second.get(&(1, "")), Some(&(1, "one")));
    assert_eq!(first, second);

    second.remove_one(&(1, ""));
    assert!(first != second);
}

#[test]
fn default_is_empty_natural_order() {
    let set: Multiset<char> = Multiset::default();
    assert!(set.is_empty());
    assert_eq!(*set.comparator(), NaturalOrder);
}

// ─── Resource release ────────────────────────────────────────────────────────

/// Key that counts how many of its instances are still alive.
struct Tracked {
    id: u32,
    live: Rc<Cell<usize>>,
}

impl Tracked {
    fn new(id: u32, live: &Rc<Cell<usize>>) -> Self {
        live.set(live.get() + 1);
        Self {
            id,
            live: Rc::clone(live),
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

fn by_id(a: &Tracked, b: &Tracked) -> Ordering {
    a.id.cmp(&b.id)
}

#[test]
fn duplicate_puts_drop_the_extra_key() {
    let live = Rc::new(Cell::new(0));
    let mut set = Multiset::with_comparator(by_id);
    for _ in 0..5 {
        set.put(Tracked::new(1, &live)).unwrap();
    }
    assert_eq!(set.len(), 5);
    assert_eq!(live.get(), 1);
}

#[test]
fn destroy_releases_every_record() {
    let live = Rc::new(Cell::new(0));
    let mut set = Multiset::with_comparator(by_id);
    for id in 0..2_000u32 {
        set.put(Tracked::new(id % 700, &live)).unwrap();
    }
    assert_eq!(live.get(), 700);

    set.destroy();
    assert_eq!(live.get(), 0);
}

#[test]
fn removals_and_clear_release_records() {
    let live = Rc::new(Cell::new(0));
    let mut set = Multiset::with_comparator(by_id);
    for id in 0..100u32 {
        set.put(Tracked::new(id, &live)).unwrap();
        set.put(Tracked::new(id, &live)).unwrap();
    }
    assert_eq!(live.get(), 100);

    let probe = Tracked::new(10, &live);
    assert!(set.remove_one(&probe));
    assert_eq!(live.get(), 101);
    assert!(set.remove_one(&probe));
    assert_eq!(live.get(), 100);
    assert!(set.remove_all(&Tracked::new(11, &live)));
    assert_eq!(live.get(), 99);

    set.clear();
    assert_eq!(live.get(), 1);
    drop(probe);
    assert_eq!(live.get(), 0);
}

#[test]
fn dropping_the_multiset_releases_every_record() {
    let live = Rc::new(Cell::new(0));
    {
        let mut set = Multiset::with_comparator(by_id);
        for id in 0..256u32 {
            set.put(Tracked::new(id, &live)).unwrap();
        }
        assert_eq!(live.get(), 256);
    }
    assert_eq!(live.get(), 0);
}
