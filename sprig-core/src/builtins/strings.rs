// sprig-core - String and symbol built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! String and naming functions: name, namespace, symbol, keyword, gensym,
//! subs, join, upper-case, lower-case

use sprig_reader::{Keyword, Symbol, Value};

use super::{require_int, require_str, to_seq};
use crate::context::Context;
use crate::error::{Error, Result, check_arity, check_arity_range};

/// (name x) - the name part of a symbol or keyword, or a string itself
pub(crate) fn builtin_name(args: &[Value]) -> Result<Value> {
    check_arity("name", args, 1)?;
    match &args[0] {
        Value::Symbol(sym) => Ok(Value::string(sym.name())),
        Value::Keyword(kw) => Ok(Value::string(kw.name())),
        Value::String(_) => Ok(args[0].clone()),
        other => Err(Error::type_error_in(
            "name",
            "symbol, keyword or string",
            other.type_name(),
        )),
    }
}

/// (namespace x) - the namespace part of a symbol or keyword, or nil
pub(crate) fn builtin_namespace(args: &[Value]) -> Result<Value> {
    check_arity("namespace", args, 1)?;
    let ns = match &args[0] {
        Value::Symbol(sym) => sym.namespace(),
        Value::Keyword(kw) => kw.namespace(),
        other => {
            return Err(Error::type_error_in(
                "namespace",
                "symbol or keyword",
                other.type_name(),
            ));
        }
    };
    Ok(ns.map(Value::string).unwrap_or(Value::Nil))
}

/// (symbol name) or (symbol ns name)
pub(crate) fn builtin_symbol(args: &[Value]) -> Result<Value> {
    check_arity_range("symbol", args, 1, 2)?;
    match args {
        [Value::Symbol(sym)] => Ok(Value::Symbol(sym.clone())),
        [Value::Keyword(kw)] => Ok(Value::Symbol(match kw.namespace() {
            Some(ns) => Symbol::qualified(ns, kw.name()),
            None => Symbol::new(kw.name()),
        })),
        [name] => Ok(Value::symbol(require_str("symbol", name)?)),
        [Value::Nil, name] => Ok(Value::Symbol(Symbol::new(require_str("symbol", name)?))),
        [ns, name] => Ok(Value::Symbol(Symbol::qualified(
            require_str("symbol", ns)?,
            require_str("symbol", name)?,
        ))),
        _ => Err(Error::arity_range("symbol", 1, 2, args.len())),
    }
}

/// (keyword name) or (keyword ns name)
pub(crate) fn builtin_keyword(args: &[Value]) -> Result<Value> {
    check_arity_range("keyword", args, 1, 2)?;
    match args {
        [Value::Keyword(kw)] => Ok(Value::Keyword(kw.clone())),
        [Value::Symbol(sym)] => Ok(Value::Keyword(match sym.namespace() {
            Some(ns) => Keyword::qualified(ns, sym.name()),
            None => Keyword::new(sym.name()),
        })),
        [name] => Ok(Value::keyword(require_str("keyword", name)?)),
        [Value::Nil, name] => Ok(Value::Keyword(Keyword::new(require_str("keyword", name)?))),
        [ns, name] => Ok(Value::Keyword(Keyword::qualified(
            require_str("keyword", ns)?,
            require_str("keyword", name)?,
        ))),
        _ => Err(Error::arity_range("keyword", 1, 2, args.len())),
    }
}

/// (gensym prefix?) - a fresh symbol for macro-generated bindings
pub(crate) fn builtin_gensym(ctx: &Context, args: &[Value]) -> Result<Value> {
    check_arity_range("gensym", args, 0, 1)?;
    let prefix = match args.first() {
        Some(Value::Symbol(sym)) => sym.name().to_string(),
        Some(other) => require_str("gensym", other)?.to_string(),
        None => "G".to_string(),
    };
    Ok(Value::Symbol(ctx.gensym(&prefix)))
}

/// (subs s start end?) - substring by character index
pub(crate) fn builtin_subs(args: &[Value]) -> Result<Value> {
    check_arity_range("subs", args, 2, 3)?;
    let s = require_str("subs", &args[0])?;
    let chars: Vec<char> = s.chars().collect();
    let start = require_int("subs", &args[1])?;
    let end = match args.get(2) {
        Some(end) => require_int("subs", end)?,
        None => chars.len() as i64,
    };
    let in_range = |i: i64| usize::try_from(i).ok().filter(|i| *i <= chars.len());
    match (in_range(start), in_range(end)) {
        (Some(start), Some(end)) if start <= end => {
            Ok(Value::from(chars[start..end].iter().collect::<String>()))
        }
        _ => Err(Error::IndexOutOfBounds {
            index: if in_range(start).is_none() { start } else { end },
            length: chars.len(),
        }),
    }
}

/// (join coll) or (join separator coll)
pub(crate) fn builtin_join(args: &[Value]) -> Result<Value> {
    check_arity_range("join", args, 1, 2)?;
    let (separator, coll) = match args {
        [coll] => (String::new(), coll),
        [separator, coll] => (separator.to_text(), coll),
        _ => return Err(Error::arity_range("join", 1, 2, args.len())),
    };
    let parts: Vec<String> = to_seq("join", coll)?.iter().map(Value::to_text).collect();
    Ok(Value::from(parts.join(&separator)))
}

pub(crate) fn builtin_upper_case(args: &[Value]) -> Result<Value> {
    check_arity("upper-case", args, 1)?;
    Ok(Value::from(require_str("upper-case", &args[0])?.to_uppercase()))
}

pub(crate) fn builtin_lower_case(args: &[Value]) -> Result<Value> {
    check_arity("lower-case", args, 1)?;
    Ok(Value::from(require_str("lower-case", &args[0])?.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_and_namespace() {
        let sym = Value::symbol("a.b/c");
        assert_eq!(builtin_name(&[sym.clone()]).unwrap(), Value::string("c"));
        assert_eq!(builtin_namespace(&[sym]).unwrap(), Value::string("a.b"));
        assert_eq!(builtin_namespace(&[Value::keyword("k")]).unwrap(), Value::Nil);
    }

    #[test]
    fn test_subs_counts_characters() {
        let s = Value::string("héllo");
        assert_eq!(
            builtin_subs(&[s.clone(), Value::int(1), Value::int(3)]).unwrap(),
            Value::string("él")
        );
        assert!(builtin_subs(&[s, Value::int(4), Value::int(9)]).is_err());
    }

    #[test]
    fn test_join() {
        let coll = Value::vector(vec![Value::int(1), Value::string("a"), Value::Nil]);
        assert_eq!(
            builtin_join(&[Value::string(", "), coll.clone()]).unwrap(),
            Value::string("1, a, ")
        );
        assert_eq!(builtin_join(&[coll]).unwrap(), Value::string("1a"));
    }

    #[test]
    fn test_keyword_from_parts() {
        assert_eq!(
            builtin_keyword(&[Value::string("ns"), Value::string("k")]).unwrap(),
            Value::keyword("ns/k")
        );
    }
}
