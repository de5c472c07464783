// sprig-core - Type and protocol built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Type and protocol checks: types, isa?, class, satisfies?, instance?, type

use sprig_reader::{Keyword, Value};

use crate::error::{Error, Result, check_arity};
use crate::eval::tag_of;

/// (types obj) - every type and protocol tag the instance satisfies
pub(crate) fn builtin_types(args: &[Value]) -> Result<Value> {
    check_arity("types", args, 1)?;
    match &args[0] {
        Value::Object(obj) => Ok(Value::Set(
            obj.tags().into_iter().map(Value::Symbol).collect(),
        )),
        Value::Type(def) => Ok(Value::Set(
            def.tags.iter().cloned().map(Value::Symbol).collect(),
        )),
        _ => Ok(Value::set(vec![])),
    }
}

/// (isa? obj tag) - tag may be a type, a protocol or a qualified symbol
pub(crate) fn builtin_isa_p(args: &[Value]) -> Result<Value> {
    check_arity("isa?", args, 2)?;
    let tag = tag_of(&args[1])
        .ok_or_else(|| Error::type_error_in("isa?", "type or protocol", args[1].type_name()))?;
    let isa = match &args[0] {
        Value::Object(obj) => obj.isa(&tag),
        Value::Type(def) => def.satisfies(&tag),
        _ => false,
    };
    Ok(Value::Bool(isa))
}

/// (satisfies? protocol obj)
pub(crate) fn builtin_satisfies_p(args: &[Value]) -> Result<Value> {
    check_arity("satisfies?", args, 2)?;
    let Value::Protocol(protocol) = &args[0] else {
        return Err(Error::type_error_in("satisfies?", "protocol", args[0].type_name()));
    };
    let satisfied = match &args[1] {
        Value::Object(obj) => obj.isa(&protocol.name),
        _ => false,
    };
    Ok(Value::Bool(satisfied))
}

/// (instance? Type obj)
pub(crate) fn builtin_instance_p(args: &[Value]) -> Result<Value> {
    check_arity("instance?", args, 2)?;
    let Value::Type(def) = &args[0] else {
        return Err(Error::type_error_in("instance?", "type", args[0].type_name()));
    };
    let instance = match &args[1] {
        Value::Object(obj) => obj.isa(&def.name),
        _ => false,
    };
    Ok(Value::Bool(instance))
}

/// (class obj) - the type an instance was built from, or nil
pub(crate) fn builtin_class(args: &[Value]) -> Result<Value> {
    check_arity("class", args, 1)?;
    Ok(match &args[0] {
        Value::Object(obj) => obj
            .type_def()
            .map(|def| Value::Type(def.clone()))
            .unwrap_or(Value::Nil),
        _ => Value::Nil,
    })
}

/// (type x) - the qualified type name of an instance, else a keyword
/// naming the kind of value
pub(crate) fn builtin_type(args: &[Value]) -> Result<Value> {
    check_arity("type", args, 1)?;
    Ok(match &args[0] {
        Value::Object(obj) => match obj.type_def() {
            Some(def) => Value::Symbol(def.name.clone()),
            None => Value::Keyword(Keyword::new("object")),
        },
        other => Value::Keyword(Keyword::new(other.type_name())),
    })
}
