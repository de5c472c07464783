// sprig-core - Type predicate built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Type predicates: nil?, some?, number?, etc. and numeric predicates.

use sprig_reader::Value;

use super::{require_int, require_number};
use crate::error::{Error, Result, check_arity};

fn predicate(name: &str, args: &[Value], test: impl Fn(&Value) -> bool) -> Result<Value> {
    check_arity(name, args, 1)?;
    Ok(Value::Bool(test(&args[0])))
}

// ============================================================================
// Type Predicates
// ============================================================================

pub(crate) fn builtin_nil_p(args: &[Value]) -> Result<Value> {
    predicate("nil?", args, Value::is_nil)
}

pub(crate) fn builtin_some_p(args: &[Value]) -> Result<Value> {
    predicate("some?", args, |v| !v.is_nil())
}

pub(crate) fn builtin_true_p(args: &[Value]) -> Result<Value> {
    predicate("true?", args, |v| matches!(v, Value::Bool(true)))
}

pub(crate) fn builtin_false_p(args: &[Value]) -> Result<Value> {
    predicate("false?", args, |v| matches!(v, Value::Bool(false)))
}

pub(crate) fn builtin_number_p(args: &[Value]) -> Result<Value> {
    predicate("number?", args, |v| matches!(v, Value::Number(_)))
}

pub(crate) fn builtin_string_p(args: &[Value]) -> Result<Value> {
    predicate("string?", args, |v| matches!(v, Value::String(_)))
}

pub(crate) fn builtin_symbol_p(args: &[Value]) -> Result<Value> {
    predicate("symbol?", args, |v| matches!(v, Value::Symbol(_)))
}

pub(crate) fn builtin_keyword_p(args: &[Value]) -> Result<Value> {
    predicate("keyword?", args, |v| matches!(v, Value::Keyword(_)))
}

pub(crate) fn builtin_list_p(args: &[Value]) -> Result<Value> {
    predicate("list?", args, |v| matches!(v, Value::List(..)))
}

pub(crate) fn builtin_vector_p(args: &[Value]) -> Result<Value> {
    predicate("vector?", args, |v| matches!(v, Value::Vector(_)))
}

pub(crate) fn builtin_map_p(args: &[Value]) -> Result<Value> {
    predicate("map?", args, |v| matches!(v, Value::Map(_)))
}

pub(crate) fn builtin_set_p(args: &[Value]) -> Result<Value> {
    predicate("set?", args, |v| matches!(v, Value::Set(_)))
}

pub(crate) fn builtin_coll_p(args: &[Value]) -> Result<Value> {
    predicate("coll?", args, |v| {
        matches!(v, Value::List(..) | Value::Vector(_) | Value::Map(_) | Value::Set(_))
    })
}

pub(crate) fn builtin_seq_p(args: &[Value]) -> Result<Value> {
    predicate("seq?", args, |v| matches!(v, Value::List(..)))
}

pub(crate) fn builtin_fn_p(args: &[Value]) -> Result<Value> {
    predicate("fn?", args, |v| matches!(v, Value::Fn(_) | Value::NativeFn(_)))
}

pub(crate) fn builtin_regex_p(args: &[Value]) -> Result<Value> {
    predicate("regex?", args, |v| matches!(v, Value::Regex(_)))
}

pub(crate) fn builtin_date_p(args: &[Value]) -> Result<Value> {
    predicate("date?", args, |v| matches!(v, Value::Date(_)))
}

/// (empty? coll) - true for nil and for empty collections and strings
pub(crate) fn builtin_empty_p(args: &[Value]) -> Result<Value> {
    check_arity("empty?", args, 1)?;
    let empty = match &args[0] {
        Value::Nil => true,
        Value::String(s) => s.is_empty(),
        Value::List(items, _) | Value::Vector(items) => items.is_empty(),
        Value::Map(map) => map.is_empty(),
        Value::Set(set) => set.is_empty(),
        other => return Err(Error::type_error_in("empty?", "collection", other.type_name())),
    };
    Ok(Value::Bool(empty))
}

// ============================================================================
// Numeric Predicates
// ============================================================================

pub(crate) fn builtin_zero_p(args: &[Value]) -> Result<Value> {
    check_arity("zero?", args, 1)?;
    Ok(Value::Bool(require_number("zero?", &args[0])? == 0.0))
}

pub(crate) fn builtin_pos_p(args: &[Value]) -> Result<Value> {
    check_arity("pos?", args, 1)?;
    Ok(Value::Bool(require_number("pos?", &args[0])? > 0.0))
}

pub(crate) fn builtin_neg_p(args: &[Value]) -> Result<Value> {
    check_arity("neg?", args, 1)?;
    Ok(Value::Bool(require_number("neg?", &args[0])? < 0.0))
}

pub(crate) fn builtin_even_p(args: &[Value]) -> Result<Value> {
    check_arity("even?", args, 1)?;
    Ok(Value::Bool(require_int("even?", &args[0])? % 2 == 0))
}

pub(crate) fn builtin_odd_p(args: &[Value]) -> Result<Value> {
    check_arity("odd?", args, 1)?;
    Ok(Value::Bool(require_int("odd?", &args[0])? % 2 != 0))
}
