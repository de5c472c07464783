// sprig-core - Printing built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Printing: pr-str, prn, print, println. `str` is a primitive operator.

use std::io::Write;

use sprig_reader::Value;

use crate::error::{Error, Result};

/// Readable representations joined by spaces.
fn readable(args: &[Value]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display text joined by spaces.
fn display(args: &[Value]) -> String {
    args.iter().map(Value::to_text).collect::<Vec<_>>().join(" ")
}

fn emit(text: &str, newline: bool) -> Result<Value> {
    let mut out = std::io::stdout().lock();
    let written = if newline {
        writeln!(out, "{}", text)
    } else {
        write!(out, "{}", text).and_then(|()| out.flush())
    };
    written.map_err(|e| Error::Io {
        path: "<stdout>".into(),
        message: e.to_string(),
    })?;
    Ok(Value::Nil)
}

/// (pr-str x ...) - readable text of the values
pub(crate) fn builtin_pr_str(args: &[Value]) -> Result<Value> {
    Ok(Value::from(readable(args)))
}

pub(crate) fn builtin_prn(args: &[Value]) -> Result<Value> {
    emit(&readable(args), true)
}

pub(crate) fn builtin_print(args: &[Value]) -> Result<Value> {
    emit(&display(args), false)
}

pub(crate) fn builtin_println(args: &[Value]) -> Result<Value> {
    emit(&display(args), true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pr_str_is_readable() {
        let args = vec![Value::string("a\"b"), Value::keyword("k"), Value::Nil];
        assert_eq!(
            builtin_pr_str(&args).unwrap(),
            Value::string("\"a\\\"b\" :k nil")
        );
    }

    #[test]
    fn test_display_joins_text() {
        assert_eq!(display(&[Value::string("a"), Value::int(1)]), "a 1");
    }
}
