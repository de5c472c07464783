// sprig-core - Atom built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Atoms: mutable reference cells. atom, atom?, deref, reset!, swap!

use sprig_reader::{Atom, Value};

use crate::context::Context;
use crate::error::{Error, Result, check_arity, check_arity_at_least};
use crate::eval::apply;

fn require_atom<'a>(name: &str, value: &'a Value) -> Result<&'a Atom> {
    match value {
        Value::Atom(atom) => Ok(atom),
        other => Err(Error::type_error_in(name, "atom", other.type_name())),
    }
}

pub(crate) fn builtin_atom(args: &[Value]) -> Result<Value> {
    check_arity("atom", args, 1)?;
    Ok(Value::Atom(Atom::new(args[0].clone())))
}

pub(crate) fn builtin_atom_p(args: &[Value]) -> Result<Value> {
    check_arity("atom?", args, 1)?;
    Ok(Value::Bool(matches!(args[0], Value::Atom(_))))
}

pub(crate) fn builtin_deref(args: &[Value]) -> Result<Value> {
    check_arity("deref", args, 1)?;
    Ok(require_atom("deref", &args[0])?.get())
}

/// (reset! atom value) - returns the new value
pub(crate) fn builtin_reset(args: &[Value]) -> Result<Value> {
    check_arity("reset!", args, 2)?;
    Ok(require_atom("reset!", &args[0])?.reset(args[1].clone()))
}

/// (swap! atom f arg...) - sets the atom to (f current arg...)
pub(crate) fn builtin_swap(ctx: &Context, args: &[Value]) -> Result<Value> {
    check_arity_at_least("swap!", args, 2)?;
    let atom = require_atom("swap!", &args[0])?;
    let mut call_args = Vec::with_capacity(args.len() - 1);
    call_args.push(atom.get());
    call_args.extend_from_slice(&args[2..]);
    let value = apply(&args[1], &call_args, ctx)?;
    Ok(atom.reset(value))
}
