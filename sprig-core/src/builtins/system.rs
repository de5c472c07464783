// sprig-core - Evaluation built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Functions reaching back into the evaluator: eval, macroexpand,
//! macroexpand-1, read-string, in-ns, load-file

use std::path::Path;

use sprig_reader::{Value, read_one};

use super::require_str;
use crate::context::Context;
use crate::error::{Error, Result, check_arity};
use crate::eval;

/// (eval form) - evaluate in the current namespace
pub(crate) fn builtin_eval(ctx: &Context, args: &[Value]) -> Result<Value> {
    check_arity("eval", args, 1)?;
    let env = ctx.registry().current().env().clone();
    eval::eval(&args[0], &env, ctx)
}

pub(crate) fn builtin_macroexpand(ctx: &Context, args: &[Value]) -> Result<Value> {
    check_arity("macroexpand", args, 1)?;
    let env = ctx.registry().current().env().clone();
    eval::macroexpand(&args[0], &env, ctx)
}

/// (macroexpand-1 form) - the form itself when its head is not a macro
pub(crate) fn builtin_macroexpand_1(ctx: &Context, args: &[Value]) -> Result<Value> {
    check_arity("macroexpand-1", args, 1)?;
    let env = ctx.registry().current().env().clone();
    Ok(eval::macroexpand_1(&args[0], &env, ctx)?.unwrap_or_else(|| args[0].clone()))
}

/// (read-string s) - the first form of `s`, nil for blank input
pub(crate) fn builtin_read_string(args: &[Value]) -> Result<Value> {
    check_arity("read-string", args, 1)?;
    Ok(read_one(require_str("read-string", &args[0])?)?)
}

/// (in-ns 'name) - switch to (creating if needed) a namespace
pub(crate) fn builtin_in_ns(ctx: &Context, args: &[Value]) -> Result<Value> {
    check_arity("in-ns", args, 1)?;
    let Value::Symbol(name) = &args[0] else {
        return Err(Error::type_error_in("in-ns", "symbol", args[0].type_name()));
    };
    let registry = ctx.registry();
    let ns = registry.intern(&name.to_string());
    registry.set_current(&ns);
    Ok(Value::Namespace(ns.name().clone()))
}

/// (load-file path) - evaluate a file once per runtime
pub(crate) fn builtin_load_file(ctx: &Context, args: &[Value]) -> Result<Value> {
    check_arity("load-file", args, 1)?;
    let path = require_str("load-file", &args[0])?;
    eval::load_file(Path::new(path), ctx)
}
