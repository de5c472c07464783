// sprig-core - Property-based tests for collection operations
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Property-based tests for collection operations and invariants.
//!
//! Tests the following properties:
//! - cons/first/rest round-trips
//! - conj/count invariants
//! - assoc/get round-trips for maps
//! - contains?/conj for sets
//! - loop/recur and reduce agree

mod common;

use common::{Value, eval_str};
use proptest::prelude::*;

// =============================================================================
// Strategies for generating values
// =============================================================================

/// Generate small integers for collection elements
fn arb_small_int() -> impl Strategy<Value = i64> {
    -1000i64..1000i64
}

/// Generate small vectors (as sprig code strings)
fn arb_int_vector(max_len: usize) -> impl Strategy<Value = (Vec<i64>, String)> {
    prop::collection::vec(arb_small_int(), 0..=max_len).prop_map(|v| {
        let elements: Vec<String> = v.iter().map(|n| n.to_string()).collect();
        let code = format!("[{}]", elements.join(" "));
        (v, code)
    })
}

/// Generate simple keyword keys for maps
fn arb_keyword() -> impl Strategy<Value = String> {
    "[a-z]{1,5}".prop_map(|s| format!(":{}", s))
}

// =============================================================================
// Sequence properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// (first (cons x coll)) = x
    #[test]
    fn cons_first_identity(x in arb_small_int(), (_, coll) in arb_int_vector(5)) {
        let result = eval_str(&format!("(first (cons {} {}))", x, coll)).unwrap();
        prop_assert_eq!(result, Value::int(x));
    }

    /// (rest (cons x coll)) = coll
    #[test]
    fn cons_rest_identity(x in arb_small_int(), (_, coll) in arb_int_vector(5)) {
        let result = eval_str(&format!("(= (rest (cons {} {})) {})", x, coll, coll)).unwrap();
        prop_assert_eq!(result, Value::Bool(true));
    }

    /// (count (conj coll x)) = (inc (count coll))
    #[test]
    fn conj_increments_count(x in arb_small_int(), (items, coll) in arb_int_vector(8)) {
        let result = eval_str(&format!("(count (conj {} {}))", coll, x)).unwrap();
        prop_assert_eq!(result, Value::int(items.len() as i64 + 1));
    }

    /// (reverse (reverse coll)) = coll
    #[test]
    fn reverse_is_an_involution((_, coll) in arb_int_vector(8)) {
        let result = eval_str(&format!("(= (reverse (reverse {})) {})", coll, coll)).unwrap();
        prop_assert_eq!(result, Value::Bool(true));
    }

    /// (reduce + coll) matches a loop/recur sum
    #[test]
    fn reduce_matches_loop((items, coll) in arb_int_vector(10)) {
        let reduced = eval_str(&format!("(reduce + 0 {})", coll)).unwrap();
        let looped = eval_str(&format!(
            "(loop [xs (seq {}) acc 0] (if xs (recur (next xs) (+ acc (first xs))) acc))",
            coll
        ))
        .unwrap();
        prop_assert_eq!(&reduced, &looped);
        prop_assert_eq!(reduced, Value::int(items.iter().sum()));
    }

    /// (count (map inc coll)) = (count coll)
    #[test]
    fn map_preserves_count((items, coll) in arb_int_vector(10)) {
        let result = eval_str(&format!("(count (map inc {}))", coll)).unwrap();
        prop_assert_eq!(result, Value::int(items.len() as i64));
    }
}

// =============================================================================
// Map and set properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// (get (assoc m k v) k) = v
    #[test]
    fn assoc_get_round_trip(k in arb_keyword(), v in arb_small_int(), other in arb_keyword()) {
        let code = format!("(get (assoc {{{} 0}} {} {}) {})", other, k, v, k);
        prop_assert_eq!(eval_str(&code).unwrap(), Value::int(v));
    }

    /// (dissoc (assoc m k v) k) has no k
    #[test]
    fn dissoc_removes_key(k in arb_keyword(), v in arb_small_int()) {
        let code = format!("(contains? (dissoc (assoc {{}} {} {}) {}) {})", k, v, k, k);
        prop_assert_eq!(eval_str(&code).unwrap(), Value::Bool(false));
    }

    /// (contains? (conj s x) x) is always true
    #[test]
    fn set_conj_contains(x in arb_small_int(), (_, coll) in arb_int_vector(6)) {
        let code = format!("(contains? (conj (into #{{}} {}) {}) {})", coll, x, x);
        prop_assert_eq!(eval_str(&code).unwrap(), Value::Bool(true));
    }

    /// Sets hold each element once
    #[test]
    fn set_count_matches_distinct((items, coll) in arb_int_vector(10)) {
        let mut distinct = items.clone();
        distinct.sort_unstable();
        distinct.dedup();
        let result = eval_str(&format!("(count (into #{{}} {}))", coll)).unwrap();
        prop_assert_eq!(result, Value::int(distinct.len() as i64));
    }
}
