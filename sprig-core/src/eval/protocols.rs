// sprig-core - Protocol special forms
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! `defprotocol`: named method bundles that types mix in.

use std::rc::Rc;

use sprig_reader::{Keyword, Meta, ProtocolDef, ProtocolMethod, Symbol, Value, keys, meta_key};

use super::apply::{apply, make_native};
use super::definitions::{install, parse_bodies};
use super::eval;
use crate::context::Context;
use crate::env::Env;
use crate::error::{Error, Result};

/// (defprotocol Name doc? meta? spec...)
///
/// Each spec is a protocol to compose, or a method form. A method written
/// with only arglists (and an optional docstring) is a bare signature;
/// one written with a body is a default implementation taking `self` first.
pub(crate) fn eval_defprotocol(args: &[Value], env: &Env, ctx: &Context) -> Result<Value> {
    let Some(Value::Symbol(name)) = args.first() else {
        return Err(Error::syntax("defprotocol", "requires a symbol name"));
    };
    let mut rest = &args[1..];
    let mut meta = Meta::new();
    let mut doc = None;
    if let Some(Value::String(text)) = rest.first() {
        doc = Some(text.to_string());
        meta.insert(meta_key(keys::DOC), Value::String(Rc::clone(text)));
        rest = &rest[1..];
    }
    if let Some(map @ Value::Map(_)) = rest.first() {
        if let Value::Map(extra) = eval(map, env, ctx)? {
            meta.extend(extra);
        }
        rest = &rest[1..];
    }

    let ns = ctx.registry().current();
    let qualified = Symbol::qualified(ns.name().name(), name.name());
    let mut protocol = ProtocolDef {
        name: qualified.clone(),
        doc,
        methods: Vec::new(),
        composed: Vec::new(),
    };

    for spec in rest {
        match spec {
            Value::Symbol(_) => match eval(spec, env, ctx)? {
                Value::Protocol(inner) => protocol.composed.push(inner),
                other => {
                    return Err(Error::syntax(
                        "defprotocol",
                        format!("{} is a {}, not a protocol", spec, other.type_name()),
                    ));
                }
            },
            Value::List(items, _) => {
                let items: Vec<Value> = items.iter().cloned().collect();
                protocol.methods.push(parse_method(&qualified, &items, env)?);
            }
            other => {
                return Err(Error::syntax(
                    "defprotocol",
                    format!("expected a protocol or method form, got {}", other),
                ));
            }
        }
    }

    let protocol = Rc::new(protocol);
    tracing::debug!(protocol = %qualified, methods = protocol.methods.len(), "defining protocol");
    for method in &protocol.methods {
        let method_meta = sprig_reader::meta(&[(keys::ARGLISTS, method.arglists.clone())]);
        install(
            &Symbol::new(&method.name),
            dispatcher(Rc::clone(&protocol), &method.name),
            method_meta,
            env,
            ctx,
        )?;
    }

    meta.insert(meta_key(keys::PROTOCOL), Value::Bool(true));
    let value = Value::Protocol(protocol);
    install(name, value.clone(), meta, env, ctx)?;
    Ok(value)
}

/// `(name [self ...]...)` as a signature, or with a body as a default.
fn parse_method(protocol: &Symbol, items: &[Value], env: &Env) -> Result<ProtocolMethod> {
    let Some((Value::Symbol(name), rest)) = items.split_first() else {
        return Err(Error::syntax("defprotocol", "method form must start with a symbol"));
    };
    let signature_only = rest
        .iter()
        .all(|item| matches!(item, Value::Vector(_) | Value::String(_)));

    if signature_only {
        let arglists: Vec<Value> = rest
            .iter()
            .filter(|item| matches!(item, Value::Vector(_)))
            .cloned()
            .collect();
        if arglists.is_empty() {
            return Err(Error::syntax(
                "defprotocol",
                format!("method {} requires an arglist", name),
            ));
        }
        return Ok(ProtocolMethod {
            name: name.name().to_string(),
            arglists: Value::list(arglists),
            default: None,
        });
    }

    let bodies = parse_bodies("defprotocol", rest)?;
    let lambda = sprig_reader::Lambda::new(None, bodies, Rc::new(env.clone()))
        .with_name(Symbol::new(&format!("{}.{}", protocol, name)));
    Ok(ProtocolMethod {
        name: name.name().to_string(),
        arglists: lambda.arglists(),
        default: Some(Value::Fn(lambda)),
    })
}

/// A function calling `method` on its first argument: the receiver's own
/// implementation when its type has one, else the protocol default.
fn dispatcher(protocol: Rc<ProtocolDef>, method: &str) -> Value {
    let method_name = method.to_string();
    make_native(method, move |ctx, args| {
        let Some(receiver) = args.first() else {
            return Err(Error::arity_at_least(method_name.as_str(), 1, 0));
        };
        let implementation = match receiver {
            Value::Object(obj) => obj.method(&method_name),
            Value::Map(map) => map.get(&Value::Keyword(Keyword::new(&method_name))).cloned(),
            _ => None,
        };
        let implementation = implementation.or_else(|| {
            protocol
                .methods
                .iter()
                .find(|m| m.name == method_name)
                .and_then(|m| m.default.clone())
        });
        match implementation {
            Some(func) => apply(&func, args, ctx),
            None => Err(Error::EvalError(format!(
                "No implementation of method {} of protocol {} for {}",
                method_name,
                protocol.name,
                receiver.type_name()
            ))),
        }
    })
}
