// sprig-core - Record type integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Integration tests for sprig record types.
//!
//! Tests for: deftype, constructors, field access, methods, interop sugar,
//! type predicates

mod common;

use common::{Value, eval_str, read};

const POINT: &str = "(deftype Point [x y] (sum [self] (+ (.-x self) (.-y self))))";

fn with_point(expr: &str) -> String {
    format!("{} {}", POINT, expr)
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_method_call_on_instance() {
    assert_eval!(&with_point("(.sum (Point. 3 4))"), Value::int(7));
}

#[test]
fn test_every_constructor_form() {
    assert_eval!(&with_point("(.sum (->Point 1 2))"), Value::int(3));
    assert_eval!(&with_point("(.sum (Point 1 2))"), Value::int(3));
    assert_eval!(&with_point("(.sum (new Point 1 2))"), Value::int(3));
}

#[test]
fn test_constructor_arity() {
    assert_eval_err_contains!(&with_point("(Point. 1)"), "Wrong number of arguments");
    assert_eval_err_contains!(&with_point("(Point. 1 2 3)"), "expected 2, got 3");
}

#[test]
fn test_new_with_non_constructor() {
    assert_eval_err_contains!("(new 5)", "is not a constructor");
}

#[test]
fn test_deftype_validates_fields() {
    assert_eval_err_contains!("(deftype Bad [1])", "fields must be unqualified symbols");
    assert_eval_err_contains!("(deftype Bad)", "requires a name and a field vector");
}

// =============================================================================
// Fields
// =============================================================================

#[test]
fn test_field_access_forms() {
    assert_eval!(
        &with_point("(let [p (Point. 3 4)] [(.-x p) (.- p y) (:x p) (.- p \"y\")])"),
        read("[3 4 3 4]")
    );
}

#[test]
fn test_missing_field_is_nil() {
    assert_eval!(&with_point("(.-z (Point. 1 2))"), Value::Nil);
}

#[test]
fn test_property_set() {
    assert_eval!(
        &with_point("(let [p (Point. 3 4)] (.-set! p x 10) (.sum p))"),
        Value::int(14)
    );
}

#[test]
fn test_property_access_on_nil() {
    assert_eval_err_contains!("(.-x nil)", "Cannot read property 'x' of nil");
    assert_eval_err_contains!("(.-set! nil x 1)", "Cannot set property 'x' of nil");
}

#[test]
fn test_length_property() {
    assert_eval!("(.-length \"héllo\")", Value::int(5));
    assert_eval!("(.-length [1 2 3])", Value::int(3));
}

#[test]
fn test_instances_count_their_fields() {
    assert_eval!(&with_point("(count (Point. 1 2))"), Value::int(2));
    assert_eval!(&with_point("(get (Point. 1 2) :y)"), Value::int(2));
}

// =============================================================================
// Methods
// =============================================================================

#[test]
fn test_method_with_arguments() {
    let counter = "(deftype Counter [n] (add [self k] (+ (.-n self) k)))";
    assert_eval!(&format!("{} (.add (Counter. 1) 5)", counter), Value::int(6));
    assert_eval!(&format!("{} (. (Counter. 1) (add 5))", counter), Value::int(6));
    assert_eval!(&format!("{} (. (Counter. 1) add 5)", counter), Value::int(6));
}

#[test]
fn test_multi_arity_method() {
    assert_eval!(
        "(deftype Greeter [greeting]
           (hello ([self] (.hello self \"world\"))
                  ([self who] (str (.-greeting self) \", \" who))))
         (.hello (Greeter. \"hi\"))",
        Value::string("hi, world")
    );
}

#[test]
fn test_unknown_method() {
    assert_eval_err_contains!(&with_point("(.nope (Point. 1 2))"), "No method 'nope'");
    assert_eval_err_contains!("(.m nil)", "Cannot call method 'm' on nil");
}

#[test]
fn test_function_valued_field_called_without_receiver() {
    assert_eval!(
        "(deftype Holder [f]) (.f (Holder. (fn [a] (* a 2))) 21)",
        Value::int(42)
    );
    assert_eval_err_contains!("(deftype Holder [f]) (.f (Holder. 1))", "property 'f' is number");
}

#[test]
fn test_map_method_call() {
    assert_eval!("(.greet {:greet (fn [n] (str \"hi \" n))} \"ann\")", Value::string("hi ann"));
}

// =============================================================================
// Type predicates
// =============================================================================

#[test]
fn test_type_of_instance() {
    assert_eval!(&with_point("(type (Point. 1 2))"), Value::symbol("user/Point"));
    assert_eval!("(type 1)", Value::keyword("number"));
    assert_eval!("(type \"s\")", Value::keyword("string"));
    assert_eval!(&with_point("(type Point)"), Value::keyword("type"));
}

#[test]
fn test_instance_and_class() {
    assert_eval!(
        &with_point("(let [p (Point. 1 2)] [(instance? Point p) (= (class p) Point) (class 5)])"),
        read("[true true nil]")
    );
}

#[test]
fn test_isa_and_types() {
    assert_eval!(
        &with_point("(let [p (Point. 1 2)] [(isa? p Point) (isa? p 'user/Point) (.isa? p Point)])"),
        read("[true true true]")
    );
    assert_eval!(
        &with_point("(contains? (types (Point. 1 2)) 'user/Point)"),
        Value::Bool(true)
    );
    assert_eval!(
        &with_point("(contains? (.types (Point. 1 2)) 'user/Point)"),
        Value::Bool(true)
    );
}

#[test]
fn test_distinct_instances_are_not_equal() {
    assert_eval!(&with_point("(= (Point. 1 2) (Point. 1 2))"), Value::Bool(false));
    assert_eval!(&with_point("(let [p (Point. 1 2)] (= p p))"), Value::Bool(true));
}

#[test]
fn test_type_with_docstring_and_metadata() {
    let result = eval_str("(deftype Doc [a] \"A documented type.\" {:since 1}) (Doc. 1)");
    assert!(result.is_ok(), "{:?}", result);
}

#[test]
fn test_types_defined_in_namespace() {
    assert_eval!(
        "(ns geo) (deftype Pt [x]) (ns user) (type (geo/->Pt 1))",
        Value::symbol("geo/Pt")
    );
    assert_eval!("(ns geo) (deftype Pt [x]) (ns user) (.-x (geo/Pt. 5))", Value::int(5));
}
