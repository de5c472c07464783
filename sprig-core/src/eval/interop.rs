// sprig-core - Object interop forms
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Property access, method calls and construction: `.-`, `.-set!`, `.`,
//! `new`, and the `.-field` / `.method` / `Ctor.` shorthands.

use sprig_reader::{Keyword, Object, Symbol, Value};

use super::apply::{apply, construct, eval_args, with_frame};
use super::forms::Sugar;
use super::{eval, list_items};
use crate::context::Context;
use crate::env::Env;
use crate::error::{Error, Result};

/// Rewrite a shorthand head into the explicit form and evaluate it.
pub(crate) fn eval_sugar(sugar: &Sugar, form: &Value, env: &Env, ctx: &Context) -> Result<Value> {
    let items = list_items(form);
    let args = &items[1..];
    match sugar {
        Sugar::Property(field) => {
            let [target] = args else {
                return Err(Error::syntax(".-", format!("(.-{} obj) takes one argument", field)));
            };
            let receiver = eval(target, env, ctx)?;
            property(&receiver, field, form)
        }
        Sugar::Method(method) => {
            let Some((target, rest)) = args.split_first() else {
                return Err(Error::syntax(".", format!("(.{} obj ...) requires a receiver", method)));
            };
            let receiver = eval(target, env, ctx)?;
            let call_args = eval_args(rest, env, ctx)?;
            with_frame(form, env, ctx, || call_method(&receiver, method, &call_args, form, ctx))
        }
        Sugar::Construct(ctor) => {
            let ctor = eval(&Value::Symbol(ctor.clone()), env, ctx)?;
            let call_args = eval_args(args, env, ctx)?;
            with_frame(form, env, ctx, || instantiate(&ctor, &call_args, form, ctx))
        }
    }
}

/// Field name written as a symbol, string or keyword.
fn member_name(form: &'static str, value: &Value) -> Result<String> {
    match value {
        Value::Symbol(sym) => Ok(sym.name().to_string()),
        Value::String(s) => Ok(s.to_string()),
        Value::Keyword(kw) => Ok(kw.name().to_string()),
        other => Err(Error::syntax(
            form,
            format!("member name must be a symbol, got {}", other.type_name()),
        )),
    }
}

/// (.- obj prop)
pub(crate) fn eval_property_get(args: &[Value], form: &Value, env: &Env, ctx: &Context) -> Result<Value> {
    let [target, prop] = args else {
        return Err(Error::syntax(".-", "requires an object and a property name"));
    };
    let name = member_name(".-", prop)?;
    let receiver = eval(target, env, ctx)?;
    property(&receiver, &name, form)
}

fn property(receiver: &Value, name: &str, form: &Value) -> Result<Value> {
    match receiver {
        Value::Nil => Err(Error::EvalError(format!(
            "Cannot read property '{}' of nil in {}",
            name, form
        ))),
        Value::Object(obj) => Ok(obj
            .get(name)
            .or_else(|| obj.method(name))
            .unwrap_or(Value::Nil)),
        Value::Map(map) => Ok(map
            .get(&Value::Keyword(Keyword::new(name)))
            .or_else(|| map.get(&Value::string(name)))
            .cloned()
            .unwrap_or(Value::Nil)),
        Value::String(s) if name == "length" => Ok(Value::int(s.chars().count() as i64)),
        Value::List(items, _) | Value::Vector(items) if name == "length" => {
            Ok(Value::int(items.len() as i64))
        }
        _ => Ok(Value::Nil),
    }
}

/// (.-set! obj prop value)
pub(crate) fn eval_property_set(args: &[Value], env: &Env, ctx: &Context) -> Result<Value> {
    let [target, prop, expr] = args else {
        return Err(Error::syntax(".-set!", "requires an object, a property name and a value"));
    };
    let name = member_name(".-set!", prop)?;
    let receiver = eval(target, env, ctx)?;
    let value = eval(expr, env, ctx)?;
    match receiver {
        Value::Object(obj) => {
            obj.set(&name, value.clone());
            Ok(value)
        }
        Value::Nil => Err(Error::EvalError(format!(
            "Cannot set property '{}' of nil in {}",
            name, target
        ))),
        other => Err(Error::type_error_in(".-set!", "object", other.type_name())),
    }
}

/// (. obj (method args...)), (. obj method) or (. obj method args...)
pub(crate) fn eval_method_call(args: &[Value], form: &Value, env: &Env, ctx: &Context) -> Result<Value> {
    let Some((target, rest)) = args.split_first() else {
        return Err(Error::syntax(".", "requires an object and a method"));
    };
    let (method, arg_forms) = match rest {
        [Value::List(call, _)] => {
            let call: Vec<Value> = call.iter().cloned().collect();
            let Some((name, call_args)) = call.split_first() else {
                return Err(Error::syntax(".", "method call form is empty"));
            };
            (member_name(".", name)?, call_args.to_vec())
        }
        [name, call_args @ ..] => (member_name(".", name)?, call_args.to_vec()),
        [] => return Err(Error::syntax(".", "requires a method name")),
    };
    let receiver = eval(target, env, ctx)?;
    let call_args = eval_args(&arg_forms, env, ctx)?;
    with_frame(form, env, ctx, || call_method(&receiver, &method, &call_args, form, ctx))
}

/// Invoke `method` on `receiver`. Type methods receive the instance first;
/// plain function-valued fields do not.
pub(crate) fn call_method(
    receiver: &Value,
    method: &str,
    args: &[Value],
    form: &Value,
    ctx: &Context,
) -> Result<Value> {
    match receiver {
        Value::Object(obj) => {
            if let Some(result) = intrinsic(obj, method, args)? {
                return Ok(result);
            }
            if let Some(func) = obj.method(method) {
                let mut full = Vec::with_capacity(args.len() + 1);
                full.push(receiver.clone());
                full.extend_from_slice(args);
                return apply(&func, &full, ctx);
            }
            match obj.get(method) {
                Some(func @ (Value::Fn(_) | Value::NativeFn(_))) => apply(&func, args, ctx),
                Some(other) => Err(Error::NotCallable(format!(
                    "property '{}' is {} in {}",
                    method, other.type_name(), form
                ))),
                None => Err(no_method(receiver, method, form)),
            }
        }
        Value::Map(map) => match map.get(&Value::Keyword(Keyword::new(method))) {
            Some(func) => apply(func, args, ctx),
            None => Err(no_method(receiver, method, form)),
        },
        Value::Nil => Err(Error::EvalError(format!(
            "Cannot call method '{}' on nil in {}",
            method, form
        ))),
        _ => Err(no_method(receiver, method, form)),
    }
}

fn no_method(receiver: &Value, method: &str, form: &Value) -> Error {
    Error::EvalError(format!(
        "No method '{}' on {} in {}",
        method,
        receiver.type_name(),
        form
    ))
}

/// The `types` and `isa?` methods every instance answers.
fn intrinsic(obj: &Object, method: &str, args: &[Value]) -> Result<Option<Value>> {
    match method {
        "types" if obj.type_def().is_some() => Ok(Some(Value::Set(
            obj.tags().into_iter().map(Value::Symbol).collect(),
        ))),
        "isa?" if obj.type_def().is_some() => {
            let [tag] = args else {
                return Err(Error::arity_named("isa?", 1, args.len()));
            };
            Ok(Some(Value::Bool(tag_of(tag).is_some_and(|tag| obj.isa(&tag)))))
        }
        _ => Ok(None),
    }
}

/// The tag a type, protocol or symbol stands for.
pub(crate) fn tag_of(value: &Value) -> Option<Symbol> {
    match value {
        Value::Type(def) => Some(def.name.clone()),
        Value::Protocol(protocol) => Some(protocol.name.clone()),
        Value::Symbol(sym) => Some(sym.clone()),
        _ => None,
    }
}

/// (new Ctor args...)
pub(crate) fn eval_new(args: &[Value], form: &Value, env: &Env, ctx: &Context) -> Result<Value> {
    let Some((ctor_form, arg_forms)) = args.split_first() else {
        return Err(Error::syntax("new", "requires a constructor"));
    };
    let ctor = eval(ctor_form, env, ctx)?;
    let call_args = eval_args(arg_forms, env, ctx)?;
    with_frame(form, env, ctx, || instantiate(&ctor, &call_args, form, ctx))
}

fn instantiate(ctor: &Value, args: &[Value], form: &Value, ctx: &Context) -> Result<Value> {
    match ctor {
        Value::Type(def) => construct(def, args),
        Value::Fn(_) | Value::NativeFn(_) => apply(ctor, args, ctx),
        other => Err(Error::NotCallable(format!(
            "{} is not a constructor in {}",
            other, form
        ))),
    }
}
