// sprig-core - Arithmetic built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Arithmetic operations.
//!
//! The [`Primitive`] operators are evaluated directly by the application
//! fast path when their names are not rebound; the same operators are also
//! registered as ordinary functions so they can be passed around as values.
//!
//! All numbers are doubles, so `(/ 1 0)` is `##Inf` rather than an error.
//! Bitwise operators work on the integral value and reject fractions.

use sprig_reader::Value;

use super::{require_int, require_number};
use crate::error::{Error, Result, check_arity};

/// An operator the evaluator applies without a function call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitOr,
    BitAnd,
    BitXor,
    BitNot,
    ShiftLeft,
    ShiftRight,
    Add1,
    Sub1,
    Not,
    Str,
}

impl Primitive {
    pub const ALL: [Primitive; 15] = [
        Primitive::Add,
        Primitive::Sub,
        Primitive::Mul,
        Primitive::Div,
        Primitive::Mod,
        Primitive::BitOr,
        Primitive::BitAnd,
        Primitive::BitXor,
        Primitive::BitNot,
        Primitive::ShiftLeft,
        Primitive::ShiftRight,
        Primitive::Add1,
        Primitive::Sub1,
        Primitive::Not,
        Primitive::Str,
    ];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Add => "+",
            Primitive::Sub => "-",
            Primitive::Mul => "*",
            Primitive::Div => "/",
            Primitive::Mod => "mod",
            Primitive::BitOr => "bit-or",
            Primitive::BitAnd => "bit-and",
            Primitive::BitXor => "bit-xor",
            Primitive::BitNot => "bit-not",
            Primitive::ShiftLeft => "bit-shift-left",
            Primitive::ShiftRight => "bit-shift-right",
            Primitive::Add1 => "add1",
            Primitive::Sub1 => "sub1",
            Primitive::Not => "not",
            Primitive::Str => "str",
        }
    }

    /// Apply the operator to evaluated arguments.
    pub fn apply(self, args: &[Value]) -> Result<Value> {
        let name = self.name();
        match self {
            Primitive::Add => fold(name, args, 0.0, |a, b| a + b),
            Primitive::Mul => fold(name, args, 1.0, |a, b| a * b),
            Primitive::Sub => match args {
                [] => Err(Error::arity_at_least(name, 1, 0)),
                [x] => Ok(Value::number(-require_number(name, x)?)),
                [first, rest @ ..] => fold(name, rest, require_number(name, first)?, |a, b| a - b),
            },
            Primitive::Div => match args {
                [] => Ok(Value::number(1.0)),
                [x] => Ok(Value::number(1.0 / require_number(name, x)?)),
                [first, rest @ ..] => fold(name, rest, require_number(name, first)?, |a, b| a / b),
            },
            Primitive::Mod => {
                check_arity(name, args, 2)?;
                let n = require_number(name, &args[0])?;
                let d = require_number(name, &args[1])?;
                Ok(Value::number(floor_mod(n, d)))
            }
            Primitive::BitOr => bit_fold(name, args, |a, b| a | b),
            Primitive::BitAnd => bit_fold(name, args, |a, b| a & b),
            Primitive::BitXor => bit_fold(name, args, |a, b| a ^ b),
            Primitive::BitNot => {
                check_arity(name, args, 1)?;
                Ok(Value::int(!require_int(name, &args[0])?))
            }
            Primitive::ShiftLeft | Primitive::ShiftRight => {
                check_arity(name, args, 2)?;
                let x = require_int(name, &args[0])?;
                let n = require_int(name, &args[1])?;
                let n = u32::try_from(n)
                    .ok()
                    .filter(|n| *n < 64)
                    .ok_or_else(|| Error::EvalError(format!("{}: shift out of range: {}", name, n)))?;
                Ok(Value::int(if self == Primitive::ShiftLeft {
                    x << n
                } else {
                    x >> n
                }))
            }
            Primitive::Add1 => {
                check_arity(name, args, 1)?;
                Ok(Value::number(require_number(name, &args[0])? + 1.0))
            }
            Primitive::Sub1 => {
                check_arity(name, args, 1)?;
                Ok(Value::number(require_number(name, &args[0])? - 1.0))
            }
            Primitive::Not => {
                check_arity(name, args, 1)?;
                Ok(Value::Bool(!args[0].is_truthy()))
            }
            Primitive::Str => Ok(Value::from(
                args.iter().map(Value::to_text).collect::<String>(),
            )),
        }
    }
}

fn fold(name: &str, args: &[Value], init: f64, op: impl Fn(f64, f64) -> f64) -> Result<Value> {
    let mut acc = init;
    for arg in args {
        acc = op(acc, require_number(name, arg)?);
    }
    Ok(Value::number(acc))
}

fn bit_fold(name: &str, args: &[Value], op: impl Fn(i64, i64) -> i64) -> Result<Value> {
    let Some((first, rest)) = args.split_first() else {
        return Err(Error::arity_at_least(name, 2, 0));
    };
    if rest.is_empty() {
        return Err(Error::arity_at_least(name, 2, 1));
    }
    let mut acc = require_int(name, first)?;
    for arg in rest {
        acc = op(acc, require_int(name, arg)?);
    }
    Ok(Value::int(acc))
}

/// Modulus taking the sign of the divisor.
fn floor_mod(n: f64, d: f64) -> f64 {
    let r = n % d;
    if r != 0.0 && (r < 0.0) != (d < 0.0) {
        r + d
    } else {
        r
    }
}

// ============================================================================
// Numeric functions
// ============================================================================

pub(crate) fn builtin_inc(args: &[Value]) -> Result<Value> {
    check_arity("inc", args, 1)?;
    Ok(Value::number(require_number("inc", &args[0])? + 1.0))
}

pub(crate) fn builtin_dec(args: &[Value]) -> Result<Value> {
    check_arity("dec", args, 1)?;
    Ok(Value::number(require_number("dec", &args[0])? - 1.0))
}

pub(crate) fn builtin_max(args: &[Value]) -> Result<Value> {
    extremum("max", args, f64::max)
}

pub(crate) fn builtin_min(args: &[Value]) -> Result<Value> {
    extremum("min", args, f64::min)
}

fn extremum(name: &str, args: &[Value], pick: fn(f64, f64) -> f64) -> Result<Value> {
    let Some((first, rest)) = args.split_first() else {
        return Err(Error::arity_at_least(name, 1, 0));
    };
    let mut acc = require_number(name, first)?;
    for arg in rest {
        acc = pick(acc, require_number(name, arg)?);
    }
    Ok(Value::number(acc))
}

pub(crate) fn builtin_abs(args: &[Value]) -> Result<Value> {
    check_arity("abs", args, 1)?;
    Ok(Value::number(require_number("abs", &args[0])?.abs()))
}
