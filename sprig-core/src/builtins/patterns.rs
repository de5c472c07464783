// sprig-core - Regular expression built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Regular expression operations using Rust regex syntax.
//!
//! Note: patterns use the `regex` crate's syntax, so lookaround and
//! backreferences are not available.

use sprig_reader::{Pattern, Value};

use super::require_str;
use crate::error::{Error, Result, check_arity};

fn require_pattern(name: &str, value: &Value) -> Result<Pattern> {
    match value {
        Value::Regex(p) => Ok(p.clone()),
        Value::String(s) => compile(s),
        other => Err(Error::type_error_in(name, "regex", other.type_name())),
    }
}

fn compile(source: &str) -> Result<Pattern> {
    Pattern::new(source)
        .map_err(|e| Error::EvalError(format!("re-pattern: invalid regex pattern: {}", e)))
}

/// A match as a string, or a vector of the match and its groups when the
/// pattern has groups. Unmatched groups are nil.
fn match_value(captures: &regex::Captures<'_>) -> Value {
    if captures.len() == 1 {
        return captures
            .get(0)
            .map(|m| Value::string(m.as_str()))
            .unwrap_or(Value::Nil);
    }
    Value::vector(
        captures
            .iter()
            .map(|group| group.map(|m| Value::string(m.as_str())).unwrap_or(Value::Nil))
            .collect(),
    )
}

/// (re-pattern s) - compile a string into a regex
pub(crate) fn builtin_re_pattern(args: &[Value]) -> Result<Value> {
    check_arity("re-pattern", args, 1)?;
    match &args[0] {
        Value::String(s) => Ok(Value::Regex(compile(s)?)),
        Value::Regex(p) => Ok(Value::Regex(p.clone())),
        other => Err(Error::type_error_in(
            "re-pattern",
            "string or regex",
            other.type_name(),
        )),
    }
}

/// (re-find re s) - the first match, or nil
pub(crate) fn builtin_re_find(args: &[Value]) -> Result<Value> {
    check_arity("re-find", args, 2)?;
    let pattern = require_pattern("re-find", &args[0])?;
    let text = require_str("re-find", &args[1])?;
    Ok(pattern
        .regex()
        .captures(text)
        .map(|captures| match_value(&captures))
        .unwrap_or(Value::Nil))
}

/// (re-matches re s) - the match when it covers all of `s`, or nil
pub(crate) fn builtin_re_matches(args: &[Value]) -> Result<Value> {
    check_arity("re-matches", args, 2)?;
    let pattern = require_pattern("re-matches", &args[0])?;
    let text = require_str("re-matches", &args[1])?;
    // Non-capturing wrapper keeps group numbering
    let anchored = compile(&format!("^(?:{})$", pattern.as_str()))?;
    Ok(anchored
        .regex()
        .captures(text)
        .map(|captures| match_value(&captures))
        .unwrap_or(Value::Nil))
}
