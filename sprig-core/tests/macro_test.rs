// sprig-core - Macro integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Integration tests for sprig macros.
//!
//! Tests for: defmacro, macroexpand, macroexpand-1, the bootstrap macros,
//! eval, read-string, gensym

mod common;

use common::{Runtime, RuntimeOptions, Value, eval_str, eval_with, read};

// =============================================================================
// defmacro
// =============================================================================

#[test]
fn test_defmacro_receives_unevaluated_forms() {
    assert_eval!("(defmacro q [x] (list 'quote x)) (q (a b c))", read("(a b c)"));
}

#[test]
fn test_defmacro_expansion_is_evaluated() {
    assert_eval!(
        "(defmacro unless [c body] (list 'if c nil body)) (unless false 5)",
        Value::int(5)
    );
}

#[test]
fn test_variadic_and_multi_arity_macros() {
    assert_eval!(
        "(defmacro my-do [& forms] (cons 'do forms)) (my-do 1 2 3)",
        Value::int(3)
    );
    assert_eval!(
        "(defmacro opt ([] :none) ([x] x)) [(opt) (opt 4)]",
        read("[:none 4]")
    );
}

#[test]
fn test_defmacro_with_docstring() {
    assert_eval!(
        "(defmacro twice \"Evaluate x twice.\" [x] (list 'do x x)) (def n (atom 0)) (twice (swap! n inc))",
        Value::int(2)
    );
}

#[test]
fn test_macros_expand_to_macros() {
    assert_eval!(
        "(defmacro m1 [x] (list 'm2 x)) (defmacro m2 [x] (list '* x 10)) (m1 4)",
        Value::int(40)
    );
}

#[test]
fn test_special_forms_cannot_be_shadowed_by_macros() {
    assert_eval!("(defmacro if [a b c] 42) (if true 1 2)", Value::int(1));
}

#[test]
fn test_qualified_macro_call() {
    assert_eval!(
        "(ns tools) (defmacro sq [x] (list '* x x)) (ns user) (tools/sq 5)",
        Value::int(25)
    );
}

// =============================================================================
// macroexpand
// =============================================================================

#[test]
fn test_macroexpand_1() {
    assert_eval!(
        "(defmacro m [x] (list 'inc x)) (macroexpand-1 '(m 1))",
        read("(inc 1)")
    );
    assert_eval!("(macroexpand-1 '(+ 1 2))", read("(+ 1 2)"));
}

#[test]
fn test_macroexpand_to_fixpoint() {
    assert_eval!("(macroexpand '(when-not a b))", read("(if a nil (do b))"));
    assert_eval!("(macroexpand '(-> x (f 1) g))", read("(g (f x 1))"));
    assert_eval!("(macroexpand '(->> x (f 1) g))", read("(g (f 1 x))"));
}

#[test]
fn test_macroexpand_leaves_non_macros() {
    assert_eval!("(macroexpand 5)", Value::int(5));
    assert_eval!("(macroexpand '(if a b))", read("(if a b)"));
}

// =============================================================================
// Bootstrap macros
// =============================================================================

#[test]
fn test_when_and_when_not() {
    assert_eval!("(when true 1 2)", Value::int(2));
    assert_eval!("(when false 1)", Value::Nil);
    assert_eval!("(when-not false :ran)", Value::keyword("ran"));
    assert_eval!("(when-not true :ran)", Value::Nil);
}

#[test]
fn test_if_not() {
    assert_eval!("(if-not false 1 2)", Value::int(1));
    assert_eval!("(if-not true 1 2)", Value::int(2));
    assert_eval!("(if-not true 1)", Value::Nil);
}

#[test]
fn test_and() {
    assert_eval!("(and)", Value::Bool(true));
    assert_eval!("(and 1 2 3)", Value::int(3));
    assert_eval!("(and 1 nil 3)", Value::Nil);
    assert_eval!("(and 1 false 3)", Value::Bool(false));
}

#[test]
fn test_or() {
    assert_eval!("(or)", Value::Nil);
    assert_eval!("(or nil false 7)", Value::int(7));
    assert_eval!("(or nil false)", Value::Bool(false));
}

#[test]
fn test_and_or_short_circuit() {
    assert_eval!("(def hits (atom 0)) (or 1 (swap! hits inc)) @hits", Value::int(0));
    assert_eval!("(def hits (atom 0)) (and nil (swap! hits inc)) @hits", Value::int(0));
    // The tested form is evaluated once
    assert_eval!("(def hits (atom 0)) (and (swap! hits inc) true) @hits", Value::int(1));
}

#[test]
fn test_and_or_bind_temporaries_under_fresh_names() {
    assert_eval!("(let [g 5] (and true g))", Value::int(5));
    assert_eval!("(let [g nil] (or g 6))", Value::int(6));
}

#[test]
fn test_threading_macros() {
    assert_eval!("(-> 5 (- 2) inc)", Value::int(4));
    assert_eval!("(->> 5 (- 2))", Value::int(-3));
    assert_eval!("(->> [1 2 3] (map inc) (reduce +))", Value::int(9));
}

#[test]
fn test_comment_and_defn_private() {
    assert_eval!("(comment (this is ignored) 1 2)", Value::Nil);
    assert_eval_err_contains!("(ns a) (defn- f [] 1) (ns b) (a/f)", "is not public");
}

#[test]
fn test_runtime_without_prelude() {
    let runtime = Runtime::with_options(RuntimeOptions {
        prelude: false,
        host_globals: false,
        ..RuntimeOptions::default()
    })
    .unwrap();
    assert!(eval_with(&runtime, "(when true 1)").is_err());
    assert_eq!(eval_with(&runtime, "(+ 1 2)").unwrap(), Value::int(3));
}

// =============================================================================
// eval / read-string / gensym
// =============================================================================

#[test]
fn test_eval_builtin() {
    assert_eval!("(eval '(+ 1 2))", Value::int(3));
    assert_eval!("(eval (list '* 2 3))", Value::int(6));
    assert_eval!("(def x 4) (eval 'x)", Value::int(4));
}

#[test]
fn test_read_string() {
    assert_eval!("(read-string \"(+ 1 2)\")", read("(+ 1 2)"));
    assert_eval!("(eval (read-string \"(+ 1 2)\"))", Value::int(3));
    assert_eval!("(read-string \"\")", Value::Nil);
    assert_eval_err_contains!("(read-string \"(1\")", "EOF");
}

#[test]
fn test_gensym_is_unique() {
    assert_eval!("(= (gensym) (gensym))", Value::Bool(false));
    assert_eval!("(symbol? (gensym \"tmp\"))", Value::Bool(true));
    let sym = eval_str("(gensym \"tmp\")").unwrap();
    assert!(sym.to_string().starts_with("tmp"), "{}", sym);
}
