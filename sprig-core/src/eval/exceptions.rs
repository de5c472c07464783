// sprig-core - Exception handling
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Exception handling special forms: throw, try/catch/finally.

use sprig_reader::{Object, Symbol, Value};

use super::{eval, eval_do};
use crate::context::Context;
use crate::env::Env;
use crate::error::{Error, Result};

/// (throw expr) - throw an exception
pub(crate) fn eval_throw(args: &[Value], env: &Env, ctx: &Context) -> Result<Value> {
    let [expr] = args else {
        return Err(Error::syntax("throw", "requires exactly 1 argument"));
    };
    let val = eval(expr, env, ctx)?;
    Err(Error::Thrown(val))
}

struct CatchClause {
    binding: Symbol,
    /// Unevaluated exception type expression
    kind: Value,
    body: Vec<Value>,
}

/// (try body... (catch [e Type] handler...)... (finally cleanup...)?)
pub(crate) fn eval_try(args: &[Value], env: &Env, ctx: &Context) -> Result<Value> {
    let mut body = Vec::new();
    let mut catches = Vec::new();
    let mut finally: Option<Vec<Value>> = None;

    for arg in args {
        if arg.is_form("catch") {
            if finally.is_some() {
                return Err(Error::syntax("try", "catch may not follow finally"));
            }
            catches.push(parse_catch(arg)?);
        } else if arg.is_form("finally") {
            if finally.is_some() {
                return Err(Error::syntax("try", "only one finally clause allowed"));
            }
            finally = Some(super::list_items(arg)[1..].to_vec());
        } else if catches.is_empty() && finally.is_none() {
            body.push(arg.clone());
        } else {
            return Err(Error::syntax(
                "try",
                format!("body form after catch or finally: {}", arg),
            ));
        }
    }
    if catches.is_empty() && finally.is_none() {
        return Err(Error::syntax("try", "requires at least one catch or finally clause"));
    }

    let result = match eval_do(&body, &env.extend(), ctx) {
        Ok(value) => Ok(value),
        Err(err) => handle(err, &catches, env, ctx),
    };

    match finally {
        // The finally value wins; an unhandled error still propagates.
        Some(cleanup) => {
            let cleanup_value = eval_do(&cleanup, &env.extend(), ctx)?;
            result.map(|_| cleanup_value)
        }
        None => result,
    }
}

/// `(catch [e Type] body...)`, or `(catch Type e body...)`.
fn parse_catch(form: &Value) -> Result<CatchClause> {
    let items = super::list_items(form);
    let (binding, kind, body_start) = match items.get(1) {
        Some(Value::Vector(spec)) => match (spec.get(0), spec.get(1), spec.len()) {
            (Some(Value::Symbol(binding)), Some(kind), 2) => (binding.clone(), kind.clone(), 2),
            _ => return Err(Error::syntax("try", "catch binding must be [name Type]")),
        },
        Some(kind) => match items.get(2) {
            Some(Value::Symbol(binding)) => (binding.clone(), kind.clone(), 3),
            _ => return Err(Error::syntax("try", "catch requires a type and a binding")),
        },
        None => return Err(Error::syntax("try", "catch requires a type and a binding")),
    };
    Ok(CatchClause {
        binding,
        kind,
        body: items[body_start..].to_vec(),
    })
}

/// Run the first catch clause matching `err`, or give the error back.
fn handle(err: Error, catches: &[CatchClause], env: &Env, ctx: &Context) -> Result<Value> {
    if catches.is_empty() {
        return Err(err);
    }
    let exception = to_exception(&err, ctx);
    for clause in catches {
        if matches(&clause.kind, &exception, env, ctx)? {
            ctx.clear_fault();
            let scope = env.extend();
            scope.define(clause.binding.name(), exception);
            return eval_do(&clause.body, &scope, ctx);
        }
    }
    Err(err)
}

/// Whether a catch clause's type expression accepts `exception`.
fn matches(kind: &Value, exception: &Value, env: &Env, ctx: &Context) -> Result<bool> {
    if let Value::Keyword(kw) = kind
        && kw.name() == "default"
    {
        return Ok(true);
    }
    let tag = match eval(kind, env, ctx)? {
        Value::Type(def) => def.name.clone(),
        Value::Protocol(protocol) => protocol.name.clone(),
        other => {
            return Err(Error::syntax(
                "try",
                format!("catch type must be a type or protocol, got {}", other.type_name()),
            ));
        }
    };
    Ok(match exception {
        Value::Object(obj) => obj.isa(&tag),
        _ => false,
    })
}

/// The value a `catch` clause binds for `err`.
///
/// Typed objects that were thrown are passed through. Any other thrown
/// value is wrapped in an `Error` whose `message` is its text and whose
/// `data` is the value itself. Evaluator errors become an instance of the
/// built-in type matching their kind.
pub fn to_exception(err: &Error, ctx: &Context) -> Value {
    if let Error::Thrown(value) = err {
        return match value {
            Value::Object(obj) if obj.type_def().is_some() => value.clone(),
            other => new_exception(ctx, "Error", Value::string(&other.to_text()), other.clone()),
        };
    }
    let data = match err {
        Error::UndefinedVariable(sym) => Value::Symbol(sym.clone()),
        _ => Value::Nil,
    };
    new_exception(ctx, err.exception_type(), Value::string(&err.to_string()), data)
}

fn new_exception(ctx: &Context, type_name: &str, message: Value, data: Value) -> Value {
    match ctx.error_type(type_name) {
        Some(def) => Value::Object(Object::instance(def, vec![message, data])),
        None => {
            let obj = Object::new();
            obj.set("message", message);
            obj.set("data", data);
            Value::Object(obj)
        }
    }
}
