// sprig-core - Control flow special forms
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Control flow special forms: quote, do, if, cond, let, loop, recur.

use sprig_reader::{Symbol, Value};

use super::{Outcome, eval, eval_body, eval_tail};
use crate::context::Context;
use crate::env::Env;
use crate::error::{Error, Result};

/// (quote form)
pub(crate) fn eval_quote(args: &[Value]) -> Result<Value> {
    match args {
        [form] => Ok(form.clone()),
        _ => Err(Error::syntax("quote", "requires exactly 1 argument")),
    }
}

/// (do expr...) - evaluated in a child scope
pub(crate) fn eval_block(args: &[Value], env: &Env, ctx: &Context) -> Result<Outcome> {
    eval_body(args, &env.extend(), ctx)
}

/// (if test then else?)
pub(crate) fn eval_if(args: &[Value], env: &Env, ctx: &Context) -> Result<Outcome> {
    let (test, then, otherwise) = match args {
        [test, then] => (test, then, None),
        [test, then, otherwise] => (test, then, Some(otherwise)),
        _ => return Err(Error::syntax("if", "requires a test, a then branch and an optional else branch")),
    };
    if eval(test, env, ctx)?.is_truthy() {
        eval_tail(then, env, ctx)
    } else {
        match otherwise {
            Some(expr) => eval_tail(expr, env, ctx),
            None => Ok(Value::Nil.into()),
        }
    }
}

/// (cond test expr ...) - `else` or `:else` as a test always matches
pub(crate) fn eval_cond(args: &[Value], env: &Env, ctx: &Context) -> Result<Outcome> {
    if args.len() % 2 != 0 {
        let form = Value::list(
            std::iter::once(Value::symbol("cond"))
                .chain(args.iter().cloned())
                .collect(),
        );
        return Err(Error::syntax(
            "cond",
            format!("requires an even number of forms in {}", form),
        ));
    }
    for clause in args.chunks(2) {
        let (test, expr) = (&clause[0], &clause[1]);
        if is_else(test) || eval(test, env, ctx)?.is_truthy() {
            return eval_tail(expr, env, ctx);
        }
    }
    Ok(Value::Nil.into())
}

fn is_else(test: &Value) -> bool {
    match test {
        Value::Symbol(sym) => !sym.is_qualified() && sym.name() == "else",
        Value::Keyword(kw) => kw.namespace().is_none() && kw.name() == "else",
        _ => false,
    }
}

/// Names and init forms of a `[name init ...]` binding vector.
fn binding_pairs(form: &'static str, bindings: Option<&Value>) -> Result<Vec<(Symbol, Value)>> {
    let Some(Value::Vector(items)) = bindings else {
        return Err(Error::syntax(form, "requires a binding vector"));
    };
    if items.len() % 2 != 0 {
        return Err(Error::syntax(
            form,
            "binding vector requires an even number of forms",
        ));
    }
    let items: Vec<&Value> = items.iter().collect();
    items
        .chunks(2)
        .map(|pair| match pair[0] {
            Value::Symbol(sym) if !sym.is_qualified() => Ok((sym.clone(), pair[1].clone())),
            other => Err(Error::syntax(
                form,
                format!("binding names must be unqualified symbols, got {}", other),
            )),
        })
        .collect()
}

/// (let [name init ...] body...) - sequential bindings in a child scope
pub(crate) fn eval_let(args: &[Value], env: &Env, ctx: &Context) -> Result<Outcome> {
    let bindings = binding_pairs("let", args.first())?;
    let scope = env.extend();
    for (name, init) in bindings {
        let value = eval(&init, &scope, ctx)?;
        scope.define(name.name(), value);
    }
    eval_body(&args[1..], &scope, ctx)
}

/// (loop [name init ...] body...) - the body is re-run with new bindings
/// for every `recur` that reaches it in tail position
pub(crate) fn eval_loop(args: &[Value], env: &Env, ctx: &Context) -> Result<Outcome> {
    let bindings = binding_pairs("loop", args.first())?;
    let body = &args[1..];

    let mut scope = env.extend();
    for (name, init) in &bindings {
        let value = eval(init, &scope, ctx)?;
        scope.define(name.name(), value);
    }

    loop {
        match eval_body(body, &scope, ctx)? {
            Outcome::Value(value) => return Ok(value.into()),
            Outcome::TailCall(values) => {
                if values.len() != bindings.len() {
                    return Err(Error::arity_named("recur", bindings.len(), values.len()));
                }
                scope = env.extend();
                for ((name, _), value) in bindings.iter().zip(values) {
                    scope.define(name.name(), value);
                }
            }
        }
    }
}

/// (recur arg...) - arguments are evaluated eagerly, then handed to the
/// nearest loop or lambda
pub(crate) fn eval_recur(args: &[Value], env: &Env, ctx: &Context) -> Result<Outcome> {
    let values = args
        .iter()
        .map(|arg| eval(arg, env, ctx))
        .collect::<Result<Vec<_>>>()?;
    Ok(Outcome::TailCall(values))
}
