// sprig-core - Record type special form
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! `deftype`: record types with positional fields and a method table.

use std::rc::Rc;

use sprig_reader::{Lambda, Meta, Symbol, TypeDef, Value, keys, meta_key};

use super::apply::{construct, make_native};
use super::definitions::{install, parse_bodies};
use super::eval;
use crate::context::Context;
use crate::env::Env;
use crate::error::{Error, Result};

/// (deftype Name [fields] doc? meta? spec...)
///
/// Protocol specs are mixed in first, in order, then literal method forms
/// `(name [self ...] body...)` are installed over them. Defines `Name`
/// and the positional constructor `->Name`.
pub(crate) fn eval_deftype(args: &[Value], env: &Env, ctx: &Context) -> Result<Value> {
    let (name, fields) = match args {
        [Value::Symbol(name), Value::Vector(fields), ..] => (name, fields),
        _ => return Err(Error::syntax("deftype", "requires a name and a field vector")),
    };
    let fields = fields
        .iter()
        .map(|field| match field {
            Value::Symbol(sym) if !sym.is_qualified() => Ok(sym.clone()),
            other => Err(Error::syntax(
                "deftype",
                format!("fields must be unqualified symbols, got {}", other),
            )),
        })
        .collect::<Result<Vec<_>>>()?;

    let mut rest = &args[2..];
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
    let mut def = TypeDef::new(qualified.clone(), fields);
    def.doc = doc;

    let mut literal = Vec::new();
    let mut protocols = Vec::new();
    for spec in rest {
        match spec {
            Value::Symbol(_) => match eval(spec, env, ctx)? {
                Value::Protocol(protocol) => {
                    def.mix_in(&protocol);
                    protocols.push(protocol);
                }
                other => {
                    return Err(Error::syntax(
                        "deftype",
                        format!("{} is a {}, not a protocol", spec, other.type_name()),
                    ));
                }
            },
            Value::List(items, _) => {
                let items: Vec<Value> = items.iter().cloned().collect();
                literal.push(parse_method(&qualified, &items, env)?);
            }
            other => {
                return Err(Error::syntax(
                    "deftype",
                    format!("expected a protocol or method form, got {}", other),
                ));
            }
        }
    }
    def.methods.extend(literal);
    for protocol in &protocols {
        for method in protocol.method_names() {
            if !def.methods.contains_key(&method) {
                tracing::warn!(
                    name = %qualified,
                    protocol = %protocol.name,
                    method = %method,
                    "type leaves protocol method unimplemented"
                );
            }
        }
    }

    tracing::debug!(name = %qualified, methods = def.methods.len(), "defining type");
    let def = Rc::new(def);

    let ctor_def = Rc::clone(&def);
    let ctor_name = format!("->{}", name.name());
    install(
        &Symbol::new(&ctor_name),
        make_native(&ctor_name, move |_, args| construct(&ctor_def, args)),
        Meta::new(),
        env,
        ctx,
    )?;

    meta.insert(meta_key(keys::TYPE), Value::Bool(true));
    let value = Value::Type(def);
    install(name, value.clone(), meta, env, ctx)?;
    Ok(value)
}

/// `(name [self ...] body...)` or `(name ([self] ...) ([self x] ...))`
fn parse_method(owner: &Symbol, items: &[Value], env: &Env) -> Result<(String, Value)> {
    let Some((Value::Symbol(name), rest)) = items.split_first() else {
        return Err(Error::syntax("deftype", "method form must start with a symbol"));
    };
    let bodies = parse_bodies("deftype", rest)?;
    let lambda = Lambda::new(None, bodies, Rc::new(env.clone()))
        .with_name(Symbol::new(&format!("{}.{}", owner, name)));
    Ok((name.name().to_string(), Value::Fn(lambda)))
}
