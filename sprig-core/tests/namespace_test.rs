// sprig-core - Namespace integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Integration tests for sprig namespaces.
//!
//! Tests for: ns, in-ns, qualified symbols, private definitions, require,
//! use, aliases, refer, load-file, host import and export

mod common;

use std::fs;
use std::path::Path;

use common::{Runtime, RuntimeOptions, Value, eval_with, new_runtime};
use sprig_core::Object;
use tempfile::TempDir;

/// A runtime whose load path is a temporary directory holding `files`.
fn runtime_with_files(files: &[(&str, &str)]) -> (TempDir, Runtime) {
    let dir = tempfile::tempdir().unwrap();
    for (name, source) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, source).unwrap();
    }
    let runtime = Runtime::with_options(RuntimeOptions {
        load_paths: vec![dir.path().to_path_buf()],
        host_globals: false,
        ..RuntimeOptions::default()
    })
    .unwrap();
    (dir, runtime)
}

const UTIL: &str = "(ns lib.util \"Helpers.\")
(defn twice [x] (* 2 x))
(def {:private true} secret 1)
(defn- hidden [] secret)
(defn reveal [] (hidden))";

// =============================================================================
// ns / in-ns
// =============================================================================

#[test]
fn test_definitions_are_qualified_by_namespace() {
    assert_eval!(
        "(ns ns.a) (def x 1) (ns ns.b) (def x 2) [ns.a/x ns.b/x x]",
        common::read("[1 2 2]")
    );
}

#[test]
fn test_unqualified_names_do_not_cross_namespaces() {
    let runtime = new_runtime();
    eval_with(&runtime, "(ns ns.a) (def x 1) (ns ns.b)").unwrap();
    let err = runtime.eval_str("x").unwrap_err();
    assert!(matches!(&err, common::Error::UndefinedVariable(sym) if sym.name() == "x"));
    assert_eq!(err.to_string(), "Undefined variable: x");
    assert_eq!(eval_with(&runtime, "ns.a/x").unwrap(), Value::int(1));
}

#[test]
fn test_ns_switches_current_namespace() {
    assert_eval!("(ns my.app) *ns*", Value::symbol("my.app"));
    assert_eval!("(in-ns 'other) *ns*", Value::symbol("other"));
}

#[test]
fn test_in_ns_requires_a_symbol() {
    assert_eval_err_contains!("(in-ns \"x\")", "in-ns: expected symbol");
}

#[test]
fn test_builtins_visible_from_every_namespace() {
    assert_eval!("(ns fresh.one) (inc 1)", Value::int(2));
    assert_eval!("(ns fresh.two) (when true :ok)", Value::keyword("ok"));
    assert_eval!("(sprig.core/inc 1)", Value::int(2));
}

#[test]
fn test_namespace_definitions_shadow_builtins() {
    assert_eval!(
        "(ns mine) (defn inc [x] (+ x 100)) (inc 1)",
        Value::int(101)
    );
    assert_eval!("(ns mine) (defn inc [x] 0) (ns theirs) (inc 1)", Value::int(2));
}

#[test]
fn test_unknown_namespace() {
    assert_eval_err_contains!("nowhere/x", "No such namespace: nowhere");
    assert_eval_err_contains!("(ns a) (def y 1) a/x", "Undefined variable: a/x");
}

#[test]
fn test_qualified_def_into_existing_namespace() {
    assert_eval!("(ns target) (ns other) (def target/v 9) target/v", Value::int(9));
}

// =============================================================================
// Private definitions
// =============================================================================

#[test]
fn test_private_definitions_hidden_from_other_namespaces() {
    assert_eval_err_contains!(
        "(ns a) (def {:private true} secret 1) (ns b) a/secret",
        "a/secret is not public"
    );
    assert_eval_err_contains!(
        "(ns a) (defn- hidden [] 2) (ns b) (a/hidden)",
        "is not public"
    );
}

#[test]
fn test_private_definitions_usable_at_home() {
    assert_eval!("(ns a) (def {:private true} s 1) [s a/s]", common::read("[1 1]"));
    assert_eval!("(ns a) (def :private s 2) s", Value::int(2));
}

// =============================================================================
// require / use
// =============================================================================

#[test]
fn test_require_with_alias() {
    let (_dir, runtime) = runtime_with_files(&[("lib/util.sprig", UTIL)]);
    assert_eq!(
        eval_with(&runtime, "(require '[lib.util :as u]) (u/twice 21)").unwrap(),
        Value::int(42)
    );
    assert_eq!(eval_with(&runtime, "(lib.util/twice 1)").unwrap(), Value::int(2));
    // Private functions still work when called from their own namespace
    assert_eq!(eval_with(&runtime, "(u/reveal)").unwrap(), Value::int(1));
}

#[test]
fn test_require_restores_current_namespace() {
    let (_dir, runtime) = runtime_with_files(&[("lib/util.sprig", UTIL)]);
    assert_eq!(
        eval_with(&runtime, "(require 'lib.util) *ns*").unwrap(),
        Value::symbol("user")
    );
    let ns = runtime.registry().find("lib.util").unwrap();
    assert_eq!(ns.doc().as_deref(), Some("Helpers."));
}

#[test]
fn test_require_refer() {
    let (_dir, runtime) = runtime_with_files(&[("lib/util.sprig", UTIL)]);
    assert_eq!(
        eval_with(&runtime, "(require '[lib.util :refer [twice]]) (twice 4)").unwrap(),
        Value::int(8)
    );
    let err = eval_with(&runtime, "(reveal)").unwrap_err();
    assert!(err.contains("Undefined variable"), "{}", err);
}

#[test]
fn test_refer_of_private_name_fails() {
    let (_dir, runtime) = runtime_with_files(&[("lib/util.sprig", UTIL)]);
    let err = eval_with(&runtime, "(require '[lib.util :refer [secret]])").unwrap_err();
    assert!(err.contains("lib.util/secret is not public"), "{}", err);
}

#[test]
fn test_use_refers_every_public_name() {
    let (_dir, runtime) = runtime_with_files(&[("lib/util.sprig", UTIL)]);
    assert_eq!(
        eval_with(&runtime, "(use 'lib.util) [(twice 5) (reveal)]").unwrap(),
        common::read("[10 1]")
    );
    assert!(eval_with(&runtime, "secret").is_err());
}

#[test]
fn test_ns_clauses() {
    let (_dir, runtime) = runtime_with_files(&[("lib/util.sprig", UTIL)]);
    assert_eq!(
        eval_with(&runtime, "(ns app (:require [lib.util :as u])) (u/twice 2)").unwrap(),
        Value::int(4)
    );
    assert!(eval_with(&runtime, "(ns bad (:import x))").is_err());
}

#[test]
fn test_referred_variables_share_cells() {
    let (_dir, runtime) = runtime_with_files(&[("lib/state.sprig", "(ns lib.state) (def level 1)")]);
    assert_eq!(
        eval_with(&runtime, "(use 'lib.state) (set! level 5) lib.state/level").unwrap(),
        Value::int(5)
    );
}

#[test]
fn test_required_file_loads_once() {
    let (_dir, runtime) = runtime_with_files(&[(
        "lib/counted.sprig",
        "(ns lib.counted) (swap! user/loads inc)",
    )]);
    assert_eq!(
        eval_with(
            &runtime,
            "(def loads (atom 0)) (require 'lib.counted) (require 'lib.counted) @loads"
        )
        .unwrap(),
        Value::int(1)
    );
}

#[test]
fn test_require_missing_namespace() {
    let err = eval_with(&new_runtime(), "(require 'no.such.lib)").unwrap_err();
    assert!(err.contains("no source for namespace no.such.lib"), "{}", err);
}

#[test]
fn test_require_of_already_defined_namespace_without_file() {
    assert_eval!(
        "(ns made.here) (def v 3) (ns user) (require '[made.here :as m]) m/v",
        Value::int(3)
    );
}

#[test]
fn test_require_relative_to_requiring_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("app")).unwrap();
    fs::write(dir.path().join("app/dep.sprig"), "(ns app.dep) (def value 11)").unwrap();
    fs::write(
        dir.path().join("main.sprig"),
        "(ns main (:require [app.dep :as d])) (def result d/value)",
    )
    .unwrap();

    let runtime = new_runtime();
    runtime.run_file(dir.path().join("main.sprig")).unwrap();
    assert_eq!(eval_with(&runtime, "main/result").unwrap(), Value::int(11));
}

// =============================================================================
// load-file / run_file
// =============================================================================

fn counter_file(dir: &Path) -> String {
    let path = dir.join("count.sprig");
    fs::write(&path, "(def loaded (inc loaded))").unwrap();
    path.display().to_string()
}

#[test]
fn test_load_file_evaluates_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = counter_file(dir.path());
    let runtime = new_runtime();
    let src = format!(
        "(def loaded 0) (load-file \"{0}\") (load-file \"{0}\") loaded",
        path
    );
    assert_eq!(eval_with(&runtime, &src).unwrap(), Value::int(1));
}

#[test]
fn test_run_file_always_evaluates() {
    let dir = tempfile::tempdir().unwrap();
    let path = counter_file(dir.path());
    let runtime = new_runtime();
    eval_with(&runtime, "(def loaded 0)").unwrap();
    runtime.run_file(&path).unwrap();
    runtime.run_file(&path).unwrap();
    assert_eq!(eval_with(&runtime, "loaded").unwrap(), Value::int(2));
}

#[test]
fn test_load_file_missing() {
    let err = eval_with(&new_runtime(), "(load-file \"/no/such/file.sprig\")").unwrap_err();
    assert!(err.contains("Could not read /no/such/file.sprig"), "{}", err);
}

#[test]
fn test_file_source_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("named.sprig");
    fs::write(&path, "(def here *file*)").unwrap();
    let runtime = new_runtime();
    runtime.run_file(&path).unwrap();
    assert_eq!(
        eval_with(&runtime, "here").unwrap(),
        Value::string(&path.display().to_string())
    );
    assert_eq!(eval_with(&runtime, "*file*").unwrap(), Value::string("<string>"));
}

// =============================================================================
// Host import / export
// =============================================================================

#[test]
fn test_import_host_module() {
    let runtime = new_runtime();
    let host = Object::new();
    host.set("answer", Value::int(42));
    runtime.import_host_module("hostmod", &host);
    assert_eq!(eval_with(&runtime, "hostmod/answer").unwrap(), Value::int(42));
}

#[test]
fn test_export_projects_public_definitions() {
    let runtime = new_runtime();
    eval_with(
        &runtime,
        "(ns ns.a) (def x 1) (def {:private true} y 2) (in-ns 'user)",
    )
    .unwrap();
    let root = Object::new();
    let exported = runtime.export("ns.a", &root).unwrap();
    assert_eq!(exported.get("x"), Some(Value::int(1)));
    assert_eq!(exported.get("y"), None);
    let Some(Value::Object(ns)) = root.get("ns") else {
        panic!("expected nested object for ns");
    };
    assert!(matches!(ns.get("a"), Some(Value::Object(_))));
    assert!(runtime.export("missing", &root).is_none());
}

#[test]
fn test_host_namespace_is_whitelisted() {
    let runtime = Runtime::with_options(RuntimeOptions {
        args: vec!["one".to_string()],
        ..RuntimeOptions::default()
    })
    .unwrap();
    assert_eq!(
        eval_with(&runtime, "host/args").unwrap(),
        common::read("[\"one\"]")
    );
    assert_eq!(
        eval_with(&runtime, "host/platform").unwrap(),
        Value::string(std::env::consts::OS)
    );
}
