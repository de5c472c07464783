// sprig-core - Loop/recur integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Integration tests for sprig loop and recur special forms.
//!
//! Tests for: loop, recur, tail calls through if/cond/let/do/when

mod common;

use common::{Value, eval_str, read};

// =============================================================================
// Basic loop/recur
// =============================================================================

#[test]
fn test_loop_basic() {
    // Simple loop that returns immediately
    assert_eval!("(loop [] 42)", Value::int(42));
}

#[test]
fn test_loop_sequential_bindings() {
    assert_eval!("(loop [x 1 y 2] (+ x y))", Value::int(3));
    assert_eval!("(loop [x 10 y (+ x 5)] y)", Value::int(15));
}

#[test]
fn test_loop_accumulates() {
    assert_eval!(
        "(loop [i 0 acc []] (if (< i 4) (recur (inc i) (conj acc i)) acc))",
        read("[0 1 2 3]")
    );
}

#[test]
fn test_loop_does_not_grow_the_stack() {
    assert_eval!(
        "(loop [i 100000 acc 0] (if (= i 0) acc (recur (- i 1) (+ acc 1))))",
        Value::int(100_000)
    );
}

#[test]
fn test_recur_through_cond_let_and_do() {
    assert_eval!(
        "(loop [n 5 acc 1] (cond (= n 0) acc else (let [m (dec n)] (do (recur m (* acc n))))))",
        Value::int(120)
    );
}

#[test]
fn test_recur_through_prelude_macros() {
    assert_eval!("(loop [i 0] (when (< i 5) (recur (inc i))))", Value::Nil);
    assert_eval!(
        "(loop [i 0] (if-not (< i 3) i (recur (inc i))))",
        Value::int(3)
    );
}

#[test]
fn test_loop_rebinds_fresh_scope_each_iteration() {
    // Closures captured in one iteration keep that iteration's binding
    assert_eval!(
        "(def fs (atom []))
         (loop [i 0] (when (< i 3) (swap! fs conj (fn [] i)) (recur (inc i))))
         (map (fn [f] (f)) @fs)",
        read("(0 1 2)")
    );
}

// =============================================================================
// recur in functions
// =============================================================================

#[test]
fn test_recur_in_fn() {
    assert_eval!(
        "(def count-down (fn [n] (if (= n 0) :done (recur (- n 1))))) (count-down 50000)",
        Value::keyword("done")
    );
}

#[test]
fn test_recur_selects_arity_by_argument_count() {
    assert_eval!(
        "(def f (fn ([n] (recur n 0)) ([n acc] (if (= n 0) acc (recur (dec n) (+ acc n))))))
         (f 10)",
        Value::int(55)
    );
}

#[test]
fn test_recur_in_nested_loop_targets_innermost() {
    assert_eval!(
        "(loop [i 0 total 0]
           (if (< i 3)
             (recur (inc i) (+ total (loop [j 0 s 0] (if (< j 2) (recur (inc j) (+ s 1)) s))))
             total))",
        Value::int(6)
    );
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_recur_arity_mismatch() {
    assert_eval_err_contains!("(loop [a 1] (recur 1 2))", "'recur'");
}

#[test]
fn test_recur_outside_tail_position() {
    assert_eval_err_contains!("(loop [a 1] (+ 1 (recur 2)))", "tail position");
    assert_eval_err_contains!("(loop [a 1] (if (recur 2) 1 2))", "tail position");
}

#[test]
fn test_recur_at_top_level() {
    assert_eval_err_contains!("(recur 1)", "tail position");
}

#[test]
fn test_recur_inside_try_is_not_a_tail_call() {
    assert_eval_err_contains!(
        "(loop [i 0] (try (if (< i 3) (recur (inc i)) i) (finally nil)))",
        "tail position"
    );
}

#[test]
fn test_loop_requires_binding_vector() {
    assert_eval_err_contains!("(loop (i 0) i)", "binding vector");
    let result = eval_str("(loop [i] i)");
    assert!(result.is_err());
}
