// sprig-reader - JSON import
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Convert decoded JSON into sprig data without going through text.
//!
//! Arrays become lists and objects become keyword-keyed maps, so a JSON
//! document can be evaluated as code. Strings are classified by shape:
//! `"\"text\""` stays a string, `":name"` becomes a keyword and anything
//! else becomes a symbol.

use crate::symbol::{Keyword, Symbol};
use crate::value::Value;

pub fn read_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => read_json_string(s),
        serde_json::Value::Array(items) => Value::list(items.iter().map(read_json).collect()),
        serde_json::Value::Object(map) => Value::Map(
            map.iter()
                .map(|(k, v)| (Value::Keyword(Keyword::parse(k)), read_json(v)))
                .collect(),
        ),
    }
}

fn read_json_string(s: &str) -> Value {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        Value::string(&s[1..s.len() - 1])
    } else if let Some(rest) = s.strip_prefix("::") {
        Value::Keyword(Keyword::auto(rest))
    } else if let Some(rest) = s.strip_prefix(':').filter(|r| !r.is_empty()) {
        Value::Keyword(Keyword::parse(rest))
    } else if s.is_empty() {
        Value::string(s)
    } else {
        Value::Symbol(Symbol::parse(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_code_from_json() {
        let form = read_json(&json!(["+", 1, ["*", 2, 3]]));
        assert_eq!(form.to_string(), "(+ 1 (* 2 3))");
    }

    #[test]
    fn test_string_classification() {
        assert_eq!(read_json(&json!("\"hello\"")), Value::string("hello"));
        assert_eq!(read_json(&json!(":kw")), Value::keyword("kw"));
        assert_eq!(read_json(&json!("ns/sym")), Value::symbol("ns/sym"));
        assert_eq!(read_json(&json!("")), Value::string(""));
    }

    #[test]
    fn test_objects_get_keyword_keys() {
        let value = read_json(&json!({"a": true, "b": null}));
        assert_eq!(
            value,
            Value::map(vec![
                (Value::keyword("a"), Value::Bool(true)),
                (Value::keyword("b"), Value::Nil),
            ])
        );
    }
}
