// sprig-core - Comparison built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Comparison operations: =, not=, <, >, <=, >=, identical?

use std::cmp::Ordering;
use std::rc::Rc;

use sprig_reader::Value;

use crate::error::{Error, Result, check_arity, check_arity_at_least};

pub(crate) fn builtin_eq(args: &[Value]) -> Result<Value> {
    check_arity_at_least("=", args, 1)?;
    Ok(Value::Bool(args.windows(2).all(|w| w[0] == w[1])))
}

pub(crate) fn builtin_not_eq(args: &[Value]) -> Result<Value> {
    check_arity_at_least("not=", args, 1)?;
    Ok(Value::Bool(!args.windows(2).all(|w| w[0] == w[1])))
}

/// Order two values of the same comparable kind. `None` for NaN.
fn compare(name: &str, a: &Value, b: &Value) -> Result<Option<Ordering>> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Ok(x.partial_cmp(y)),
        (Value::String(x), Value::String(y)) => Ok(Some(x.cmp(y))),
        (Value::Date(x), Value::Date(y)) => Ok(Some(x.cmp(y))),
        (Value::Number(_), other) | (other, _) => {
            Err(Error::type_error_in(name, "number", other.type_name()))
        }
    }
}

fn ordered(name: &str, args: &[Value], test: fn(Ordering) -> bool) -> Result<Value> {
    check_arity_at_least(name, args, 1)?;
    for w in args.windows(2) {
        match compare(name, &w[0], &w[1])? {
            Some(ord) if test(ord) => {}
            _ => return Ok(Value::Bool(false)),
        }
    }
    if let [single] = args {
        compare(name, single, single)?;
    }
    Ok(Value::Bool(true))
}

pub(crate) fn builtin_lt(args: &[Value]) -> Result<Value> {
    ordered("<", args, Ordering::is_lt)
}

pub(crate) fn builtin_gt(args: &[Value]) -> Result<Value> {
    ordered(">", args, Ordering::is_gt)
}

pub(crate) fn builtin_le(args: &[Value]) -> Result<Value> {
    ordered("<=", args, Ordering::is_le)
}

pub(crate) fn builtin_ge(args: &[Value]) -> Result<Value> {
    ordered(">=", args, Ordering::is_ge)
}

/// (identical? a b) - same object, not merely equal
pub(crate) fn builtin_identical_p(args: &[Value]) -> Result<Value> {
    check_arity("identical?", args, 2)?;
    let same = match (&args[0], &args[1]) {
        (Value::String(a), Value::String(b)) => Rc::ptr_eq(a, b),
        (Value::List(a, _), Value::List(b, _)) | (Value::Vector(a), Value::Vector(b)) => {
            a.ptr_eq(b)
        }
        (Value::Map(a), Value::Map(b)) => a.ptr_eq(b),
        (Value::Set(a), Value::Set(b)) => a.ptr_eq(b),
        (Value::Type(a), Value::Type(b)) => Rc::ptr_eq(a, b),
        (Value::Protocol(a), Value::Protocol(b)) => Rc::ptr_eq(a, b),
        // Functions, atoms and objects already compare by identity
        (a, b) => a == b,
    };
    Ok(Value::Bool(same))
}
