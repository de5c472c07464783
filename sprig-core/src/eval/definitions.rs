// sprig-core - Definition special forms
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Definition special forms: def, fn, defmacro, set!.

use std::rc::Rc;

use sprig_reader::{Arity, FnBody, Keyword, Lambda, Meta, Symbol, Value, Var, keys, meta_key};

use super::{eval, lookup_var};
use crate::context::Context;
use crate::env::Env;
use crate::error::{Error, Result};
use crate::namespace::Namespace;

/// Leading metadata of a definition: `{...}` (evaluated) or `:flag`.
pub(crate) fn leading_meta(
    form: &'static str,
    args: &[Value],
    env: &Env,
    ctx: &Context,
) -> Result<(Meta, usize)> {
    match args.first() {
        Some(map @ Value::Map(_)) => match eval(map, env, ctx)? {
            Value::Map(meta) => Ok((meta, 1)),
            other => Err(Error::syntax(
                form,
                format!("metadata must be a map, got {}", other.type_name()),
            )),
        },
        Some(Value::Keyword(kw)) => {
            let mut meta = Meta::new();
            meta.insert(Value::Keyword(kw.clone()), Value::Bool(true));
            Ok((meta, 1))
        }
        _ => Ok((Meta::new(), 0)),
    }
}

fn definition_name(form: &'static str, value: Option<&Value>) -> Result<Symbol> {
    match value {
        Some(Value::Symbol(sym)) => Ok(sym.clone()),
        Some(other) => Err(Error::syntax(
            form,
            format!("name must be a symbol, got {}", other.type_name()),
        )),
        None => Err(Error::syntax(form, "requires a name")),
    }
}

/// The namespace a definition of `name` lands in, and the plain name.
fn target_namespace(name: &Symbol, ctx: &Context) -> Result<(Namespace, String)> {
    let registry = ctx.registry();
    match name.namespace() {
        Some(ns_name) => {
            let ns = registry
                .find(ns_name)
                .ok_or_else(|| Error::EvalError(format!("No such namespace: {}", ns_name)))?;
            Ok((ns, name.name().to_string()))
        }
        None => Ok((registry.current(), name.name().to_string())),
    }
}

/// Install `value` under `name`: in the namespace (unless private) and in
/// `env` when that is any scope other than a namespace root. Both share one
/// cell. Qualified names are never bound into `env`.
pub(crate) fn install(name: &Symbol, value: Value, mut meta: Meta, env: &Env, ctx: &Context) -> Result<Var> {
    let (ns, plain) = target_namespace(name, ctx)?;
    meta.insert(
        meta_key(keys::TAG),
        Value::Keyword(Keyword::new(value.type_name())),
    );
    if let Value::Fn(lambda) = &value {
        meta.insert(meta_key(keys::ARGLISTS), lambda.arglists());
    }
    let private = meta
        .get(&meta_key(keys::PRIVATE))
        .or_else(|| meta.get(&meta_key("private")))
        .is_some_and(Value::is_truthy);

    let namespace_root = env.ptr_eq(ns.env()) || env.ptr_eq(ctx.registry().current().env());
    let local = !namespace_root && !name.is_qualified();
    if local && private {
        return Ok(env.define_with_meta(&plain, value, meta));
    }
    let var = ns.define(&plain, value, meta);
    if local {
        env.bind(&plain, var.clone());
    }
    Ok(var)
}

/// (def meta? name doc? value?)
pub(crate) fn eval_def(args: &[Value], env: &Env, ctx: &Context) -> Result<Value> {
    let (mut meta, skip) = leading_meta("def", args, env, ctx)?;
    let name = definition_name("def", args.get(skip))?;
    let rest = &args[skip + 1..];
    let init = match rest {
        [] => None,
        [init] => Some(init),
        [Value::String(doc), init] => {
            meta.insert(meta_key(keys::DOC), Value::String(Rc::clone(doc)));
            Some(init)
        }
        _ => return Err(Error::syntax("def", "too many arguments")),
    };

    if !name.is_qualified() {
        env.declare(name.name());
    }
    let value = match init {
        Some(expr) => eval(expr, env, ctx)?,
        None => Value::Nil,
    };
    let value = name_lambda(value, &name, ctx);
    install(&name, value.clone(), meta, env, ctx)?;
    Ok(value)
}

/// Lambdas take the qualified name they are defined under, for traces.
fn name_lambda(value: Value, name: &Symbol, ctx: &Context) -> Value {
    match value {
        Value::Fn(lambda) => {
            let qualified = match name.namespace() {
                Some(_) => name.clone(),
                None => Symbol::qualified(ctx.registry().current().name().name(), name.name()),
            };
            Value::Fn(lambda.with_name(qualified))
        }
        other => other,
    }
}

/// (set! name value)
pub(crate) fn eval_set(args: &[Value], env: &Env, ctx: &Context) -> Result<Value> {
    let [target, expr] = args else {
        return Err(Error::syntax("set!", "requires a name and a value"));
    };
    let Value::Symbol(sym) = target else {
        return Err(Error::syntax(
            "set!",
            format!("target must be a symbol, got {}", target.type_name()),
        ));
    };
    let var = lookup_var(sym, env, ctx)?;
    let value = eval(expr, env, ctx)?;
    var.set(value.clone());
    Ok(value)
}

// ============================================================================
// Lambdas
// ============================================================================

/// (fn name? [params] body...) or (fn name? ([params] body...)...)
pub(crate) fn eval_fn(args: &[Value], env: &Env) -> Result<Value> {
    let (self_name, rest) = match args.first() {
        Some(Value::Symbol(sym)) => (Some(sym.clone()), &args[1..]),
        _ => (None, args),
    };
    let bodies = parse_bodies("fn", rest)?;
    Ok(Value::Fn(Lambda::new(
        self_name,
        bodies,
        Rc::new(env.clone()),
    )))
}

/// Parse one or more arity bodies.
pub(crate) fn parse_bodies(form: &'static str, args: &[Value]) -> Result<Vec<FnBody>> {
    let bodies = match args.first() {
        Some(Value::Vector(_)) => vec![parse_body(form, args)?],
        Some(Value::List(..)) => args
            .iter()
            .map(|arity| match arity {
                Value::List(items, _) => {
                    let items: Vec<Value> = items.iter().cloned().collect();
                    parse_body(form, &items)
                }
                other => Err(Error::syntax(
                    form,
                    format!("expected an arity form ([params] body...), got {}", other),
                )),
            })
            .collect::<Result<Vec<_>>>()?,
        _ => return Err(Error::syntax(form, "requires a parameter vector")),
    };

    let mut seen: Vec<Arity> = Vec::new();
    for body in &bodies {
        let arity = body.arity();
        if seen.contains(&arity) {
            return Err(Error::syntax(form, format!("duplicate arity {}", arity)));
        }
        if arity.is_variadic() && seen.iter().any(Arity::is_variadic) {
            return Err(Error::syntax(form, "only one variadic arity is allowed"));
        }
        seen.push(arity);
    }
    Ok(bodies)
}

/// `[params] body...`
fn parse_body(form: &'static str, items: &[Value]) -> Result<FnBody> {
    let Some(Value::Vector(params)) = items.first() else {
        return Err(Error::syntax(form, "arity must start with a parameter vector"));
    };
    let (params, rest) = parse_params(form, params.iter())?;
    Ok(FnBody {
        params,
        rest,
        body: items[1..].to_vec(),
    })
}

/// Positional parameters and an optional rest parameter, written either
/// `& rest` or `&rest`.
fn parse_params<'a>(
    form: &'static str,
    params: impl Iterator<Item = &'a Value>,
) -> Result<(Vec<Symbol>, Option<Symbol>)> {
    let mut positional = Vec::new();
    let mut rest = None;
    let mut params = params.peekable();
    while let Some(param) = params.next() {
        let Value::Symbol(sym) = param else {
            return Err(Error::syntax(
                form,
                format!("parameters must be symbols, got {}", param),
            ));
        };
        if rest.is_some() {
            return Err(Error::syntax(form, "nothing may follow the rest parameter"));
        }
        match sym.name() {
            "&" => match params.next() {
                Some(Value::Symbol(name)) => rest = Some(name.clone()),
                _ => return Err(Error::syntax(form, "& must be followed by a symbol")),
            },
            name if name.len() > 1 && name.starts_with('&') => {
                rest = Some(Symbol::new(&name[1..]));
            }
            _ => positional.push(sym.clone()),
        }
    }
    Ok((positional, rest))
}

// ============================================================================
// Macros
// ============================================================================

/// (defmacro name doc? meta? [params] body...)
pub(crate) fn eval_defmacro(args: &[Value], env: &Env, ctx: &Context) -> Result<Value> {
    let name = definition_name("defmacro", args.first())?;
    let mut rest = &args[1..];
    let mut meta = Meta::new();
    if let Some(Value::String(doc)) = rest.first()
        && rest.len() > 1
    {
        meta.insert(meta_key(keys::DOC), Value::String(Rc::clone(doc)));
        rest = &rest[1..];
    }
    if let Some(Value::Map(extra)) = rest.first() {
        meta.extend(extra.clone());
        rest = &rest[1..];
    }
    meta.insert(meta_key(keys::MACRO), Value::Bool(true));

    let bodies = parse_bodies("defmacro", rest)?;
    let lambda = Value::Fn(Lambda::new(None, bodies, Rc::new(env.clone())));
    let lambda = name_lambda(lambda, &name, ctx);
    install(&name, lambda.clone(), meta, env, ctx)?;
    Ok(lambda)
}
