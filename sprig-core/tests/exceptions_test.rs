// sprig-core - Exception handling integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Integration tests for sprig exception handling.
//!
//! Tests for: throw, try, catch, finally, built-in error types, traces

mod common;

use common::{Error, Value, eval_with, new_runtime, read};

// =============================================================================
// throw / catch
// =============================================================================

#[test]
fn test_catch_thrown_string() {
    assert_eval!(
        "(try (throw \"boom\") (catch [e Error] (str \"caught: \" (.-message e))))",
        Value::string("caught: boom")
    );
}

#[test]
fn test_thrown_value_is_kept_as_data() {
    assert_eval!("(try (throw {:code 7}) (catch [e Error] (:code (.-data e))))", Value::int(7));
}

#[test]
fn test_alternative_catch_syntax() {
    assert_eval!("(try (throw \"x\") (catch Error e (.-message e)))", Value::string("x"));
    assert_eval!("(try (throw 42) (catch :default e (.-data e)))", Value::int(42));
}

#[test]
fn test_try_without_error_returns_body_value() {
    assert_eval!("(try 1 2 (catch [e Error] :caught))", Value::int(2));
}

#[test]
fn test_uncaught_throw_propagates() {
    assert_eval_err_contains!("(throw \"bad thing\")", "bad thing");
    assert_eval_err_contains!("(try (throw \"x\") (catch [e TypeError] 1))", "x");
}

#[test]
fn test_uncaught_throw_reaches_the_host_as_thrown() {
    let runtime = new_runtime();
    match runtime.eval_str("(throw {:a 1})") {
        Err(Error::Thrown(value)) => assert_eq!(value, read("{:a 1}")),
        other => panic!("expected a thrown value, got {:?}", other),
    }
}

// =============================================================================
// Typed catches
// =============================================================================

#[test]
fn test_builtin_error_types() {
    assert_eval!(
        "(try (undefined-thing) (catch [e UndefinedVariableError] :undefined))",
        Value::keyword("undefined")
    );
    assert_eval!("(try (+ 1 \"a\") (catch [e TypeError] :type))", Value::keyword("type"));
    assert_eval!("(try ((fn [x] x)) (catch [e ArityError] :arity))", Value::keyword("arity"));
    assert_eval!("(try (1 2) (catch [e InvocationError] :invoke))", Value::keyword("invoke"));
    assert_eval!("(try (if) (catch [e SyntaxError] :syntax))", Value::keyword("syntax"));
    assert_eval!(
        "(try (read-string \"(1\") (catch [e ReadError] :read))",
        Value::keyword("read")
    );
}

#[test]
fn test_every_builtin_error_is_an_error() {
    assert_eval!("(try (nth [] 5) (catch [e Error] :any))", Value::keyword("any"));
    assert_eval!("(try (undefined-thing) (catch [e Error] (.-data e)))", Value::symbol("undefined-thing"));
}

#[test]
fn test_first_matching_catch_wins() {
    assert_eval!(
        "(try (throw \"x\") (catch [e TypeError] 1) (catch [e Error] 2) (catch [e Error] 3))",
        Value::int(2)
    );
}

#[test]
fn test_user_types_can_be_thrown() {
    assert_eval!(
        "(deftype Oops [message]) (try (throw (Oops. \"m\")) (catch [e Oops] (.-message e)))",
        Value::string("m")
    );
    assert_eval!(
        "(deftype Oops [message]) (try (throw (Oops. \"m\")) (catch [e Error] :wrong) (catch [e Oops] :right))",
        Value::keyword("right")
    );
}

#[test]
fn test_catch_by_protocol() {
    assert_eval!(
        "(defprotocol Retryable (retry? [e] true))
         (deftype Timeout [message] Retryable)
         (try (throw (Timeout. \"slow\")) (catch [e Retryable] (retry? e)))",
        Value::Bool(true)
    );
}

#[test]
fn test_uncaught_user_type_message() {
    assert_eval_err_contains!("(deftype Oops [message]) (throw (Oops. \"custom\"))", "custom");
}

#[test]
fn test_catch_type_must_be_a_type() {
    assert_eval_err_contains!("(try (throw 1) (catch [e 5] nil))", "catch type must be a type");
}

// =============================================================================
// finally
// =============================================================================

#[test]
fn test_finally_value_wins() {
    assert_eval!("(try 1 (finally 2))", Value::int(2));
}

#[test]
fn test_finally_runs_on_error() {
    assert_eval!(
        "(def log (atom []))
         (try (try (throw \"x\") (finally (swap! log conj :cleanup))) (catch [e Error] nil))
         @log",
        read("[:cleanup]")
    );
}

#[test]
fn test_finally_runs_after_catch() {
    assert_eval!(
        "(def log (atom []))
         (try (throw \"x\") (catch [e Error] (swap! log conj :caught)) (finally (swap! log conj :finally)))
         @log",
        read("[:caught :finally]")
    );
}

#[test]
fn test_error_in_catch_propagates() {
    assert_eval_err_contains!("(try (throw \"a\") (catch [e Error] (throw \"b\")))", "b");
}

// =============================================================================
// Syntax
// =============================================================================

#[test]
fn test_try_syntax_errors() {
    assert_eval_err_contains!("(try 1)", "requires at least one catch or finally");
    assert_eval_err_contains!("(try 1 (finally 2) (catch [e Error] 3))", "catch may not follow finally");
    assert_eval_err_contains!("(try 1 (finally 2) (finally 3))", "only one finally");
    assert_eval_err_contains!("(try 1 (catch [e Error] 2) 3)", "body form after catch");
    assert_eval_err_contains!("(try 1 (catch [e] 2))", "catch binding must be [name Type]");
    assert_eval_err_contains!("(throw)", "Invalid 'throw' syntax");
}

// =============================================================================
// Traces
// =============================================================================

#[test]
fn test_uncaught_error_records_trace() {
    let runtime = new_runtime();
    let err = eval_with(&runtime, "(defn inner [] (throw \"deep\")) (defn outer [] (inner)) (outer)");
    assert!(err.is_err());
    let trace = runtime.last_trace();
    assert!(trace.frames().len() >= 2, "trace: {}", trace);
    assert!(trace.to_string().contains("(inner)"), "trace: {}", trace);
}

#[test]
fn test_caught_error_leaves_no_trace() {
    let runtime = new_runtime();
    eval_with(
        &runtime,
        "(defn fail [] (throw \"x\")) (try (fail) (catch [e Error] nil))",
    )
    .unwrap();
    // Only the placeholder frame remains
    let trace = runtime.last_trace();
    assert_eq!(trace.frames().len(), 1, "trace: {}", trace);
    assert_eq!(&*trace.frames()[0].source, "<unknown>");
}
