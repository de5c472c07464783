// sprig-core - Runtime API integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Integration tests for the embedding API of [`Runtime`].
//!
//! Tests for: eval, eval_json, eval_stream, load paths, independent runtimes

mod common;

use std::fs;

use common::{Runtime, RuntimeOptions, Value, eval_with, new_runtime, read, test_options};
use serde_json::json;
use sprig_core::Symbol;

#[test]
fn test_eval_single_form() {
    let runtime = new_runtime();
    assert_eq!(runtime.eval(&read("(* 6 7)")).unwrap(), Value::int(42));
}

#[test]
fn test_def_in_a_detached_root_scope() {
    let runtime = new_runtime();
    let scope = sprig_core::Env::new();
    runtime.eval_in(&read("(def z 5)"), &scope).unwrap();
    assert_eq!(runtime.eval_in(&read("z"), &scope).unwrap(), Value::int(5));
    assert_eq!(runtime.eval(&read("z")).unwrap(), Value::int(5));

    runtime
        .eval_in(&read("(def countdown (fn [n] (if (< n 1) :done (countdown (- n 1)))))"), &scope)
        .unwrap();
    assert_eq!(
        runtime.eval_in(&read("(countdown 3)"), &scope).unwrap(),
        Value::keyword("done")
    );
}

#[test]
fn test_qualified_def_stays_out_of_the_current_namespace() {
    let runtime = new_runtime();
    eval_with(&runtime, "(ns target) (ns other) (def target/v 9)").unwrap();
    assert!(runtime.current_ns().find_var("v").is_none());
    assert_eq!(eval_with(&runtime, "target/v").unwrap(), Value::int(9));
}

#[test]
fn test_eval_json_as_code() {
    let runtime = new_runtime();
    assert_eq!(runtime.eval_json(&json!(["+", 1, 2])).unwrap(), Value::int(3));
    assert_eq!(
        runtime.eval_json(&json!(["str", "\"a\"", "\"b\""])).unwrap(),
        Value::string("ab")
    );
    assert_eq!(
        runtime.eval_json(&json!(["get", {"k": 1}, ":k"])).unwrap(),
        Value::int(1)
    );
}

#[test]
fn test_eval_json_symbols_resolve() {
    let runtime = new_runtime();
    eval_with(&runtime, "(def answer 42)").unwrap();
    assert_eq!(runtime.eval_json(&json!("answer")).unwrap(), Value::int(42));
    assert!(runtime.eval_json(&json!("missing")).is_err());
}

#[test]
fn test_eval_stream_reads_lazily() {
    let runtime = new_runtime();
    let mut reader = sprig_core::Reader::new("(def x 1) (def y (+ x 1)) y", "<stream>");
    assert_eq!(runtime.eval_stream(&mut reader).unwrap(), Value::int(2));
}

#[test]
fn test_read_error_stops_stream_after_earlier_forms() {
    let runtime = new_runtime();
    let result = eval_with(&runtime, "(def ok 1) (+ 1");
    assert!(result.unwrap_err().contains("Read error"));
    assert_eq!(eval_with(&runtime, "ok").unwrap(), Value::int(1));
}

#[test]
fn test_runtimes_are_independent() {
    let a = new_runtime();
    let b = new_runtime();
    eval_with(&a, "(def shared 1)").unwrap();
    assert!(eval_with(&b, "shared").is_err());
}

#[test]
fn test_current_ns_follows_ns_form() {
    let runtime = new_runtime();
    assert_eq!(runtime.current_ns().name(), &Symbol::new("user"));
    eval_with(&runtime, "(ns app.main)").unwrap();
    assert_eq!(runtime.current_ns().name(), &Symbol::new("app.main"));
}

#[test]
fn test_load_paths_are_searched() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("pkg")).unwrap();
    fs::write(
        dir.path().join("pkg").join("math.sprig"),
        "(ns pkg.math) (defn square [x] (* x x))",
    )
    .unwrap();

    let runtime = Runtime::with_options(RuntimeOptions {
        load_paths: vec![dir.path().to_path_buf()],
        ..test_options()
    })
    .unwrap();
    assert_eq!(
        eval_with(&runtime, "(require '[pkg.math :as m]) (m/square 9)").unwrap(),
        Value::int(81)
    );
}

#[test]
fn test_load_file_from_the_host() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counter.sprig");
    fs::write(&path, "(def hits (atom 0)) (swap! hits inc)").unwrap();

    let runtime = new_runtime();
    assert_eq!(runtime.load_file(&path).unwrap(), Value::int(1));
    // Already loaded
    runtime.load_file(&path).unwrap();
    assert_eq!(eval_with(&runtime, "@hits").unwrap(), Value::int(1));
}
