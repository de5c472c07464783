// sprig-reader - Reader for sprig
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The reader: a forward-only stream of forms with one form of lookahead.
//!
//! One token grammar feeds two output dialects. [`Native`] builds sprig
//! [`Value`]s; [`Plain`] builds `serde_json::Value`s for configuration-style
//! data where symbols and keywords are just strings.

use std::fs;
use std::io;
use std::path::Path;
use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::lexer::{Lexer, Position, ReadError, Token};
use crate::symbol::{Keyword, Symbol};
use crate::value::{Pattern, Value};

/// The constructors a reader dispatches to.
pub trait Dialect {
    type Form: Clone;

    fn nil(&self) -> Self::Form;
    fn boolean(&self, b: bool) -> Self::Form;
    fn number(&self, n: f64) -> Self::Form;
    fn string(&self, s: String) -> Self::Form;
    fn symbol(&self, text: &str) -> Self::Form;
    fn keyword(&self, text: &str, auto: bool) -> Self::Form;
    fn regex(&self, pattern: &str) -> Result<Self::Form, String>;
    fn date(&self, text: &str) -> Result<Self::Form, String>;
    fn list(&self, items: Vec<Self::Form>, position: Position) -> Self::Form;
    fn vector(&self, items: Vec<Self::Form>) -> Self::Form;
    fn map(&self, entries: Vec<(Self::Form, Self::Form)>) -> Self::Form;
    fn set(&self, items: Vec<Self::Form>) -> Self::Form;
}

fn parse_date(text: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(text)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| format!("invalid #inst \"{}\": {}", text, e))
}

/// Builds sprig values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Native;

impl Dialect for Native {
    type Form = Value;

    fn nil(&self) -> Value {
        Value::Nil
    }

    fn boolean(&self, b: bool) -> Value {
        Value::Bool(b)
    }

    fn number(&self, n: f64) -> Value {
        Value::Number(n)
    }

    fn string(&self, s: String) -> Value {
        Value::from(s)
    }

    fn symbol(&self, text: &str) -> Value {
        Value::Symbol(Symbol::parse(text))
    }

    fn keyword(&self, text: &str, auto: bool) -> Value {
        if auto {
            Value::Keyword(Keyword::auto(text))
        } else {
            Value::Keyword(Keyword::parse(text))
        }
    }

    fn regex(&self, pattern: &str) -> Result<Value, String> {
        Pattern::new(pattern)
            .map(Value::Regex)
            .map_err(|e| e.to_string())
    }

    fn date(&self, text: &str) -> Result<Value, String> {
        parse_date(text).map(Value::Date)
    }

    fn list(&self, items: Vec<Value>, position: Position) -> Value {
        Value::List(items.into_iter().collect(), Some(Rc::new(position)))
    }

    fn vector(&self, items: Vec<Value>) -> Value {
        Value::vector(items)
    }

    fn map(&self, entries: Vec<(Value, Value)>) -> Value {
        Value::map(entries)
    }

    fn set(&self, items: Vec<Value>) -> Value {
        Value::set(items)
    }
}

/// Builds plain JSON data: sequences become arrays, maps become objects
/// keyed by key text, and symbols and keywords become their names.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl Plain {
    fn key_text(key: &serde_json::Value) -> String {
        match key {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl Dialect for Plain {
    type Form = serde_json::Value;

    fn nil(&self) -> serde_json::Value {
        serde_json::Value::Null
    }

    fn boolean(&self, b: bool) -> serde_json::Value {
        serde_json::Value::Bool(b)
    }

    fn number(&self, n: f64) -> serde_json::Value {
        if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
            serde_json::Value::from(n as i64)
        } else {
            serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null)
        }
    }

    fn string(&self, s: String) -> serde_json::Value {
        serde_json::Value::String(s)
    }

    fn symbol(&self, text: &str) -> serde_json::Value {
        serde_json::Value::String(text.to_string())
    }

    fn keyword(&self, text: &str, _auto: bool) -> serde_json::Value {
        serde_json::Value::String(text.to_string())
    }

    fn regex(&self, pattern: &str) -> Result<serde_json::Value, String> {
        Ok(serde_json::Value::String(pattern.to_string()))
    }

    fn date(&self, text: &str) -> Result<serde_json::Value, String> {
        parse_date(text).map(|d| serde_json::Value::String(d.to_rfc3339()))
    }

    fn list(&self, items: Vec<serde_json::Value>, _position: Position) -> serde_json::Value {
        serde_json::Value::Array(items)
    }

    fn vector(&self, items: Vec<serde_json::Value>) -> serde_json::Value {
        serde_json::Value::Array(items)
    }

    fn map(&self, entries: Vec<(serde_json::Value, serde_json::Value)>) -> serde_json::Value {
        serde_json::Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| (Plain::key_text(&k), v))
                .collect(),
        )
    }

    fn set(&self, items: Vec<serde_json::Value>) -> serde_json::Value {
        serde_json::Value::Array(items)
    }
}

type ReadResult<T> = Result<T, ReadError>;

/// A stream of forms read from one source.
///
/// After the first error the stream is finished: the error is returned once
/// and every later read yields end of input.
pub struct Reader<D: Dialect = Native> {
    lexer: Lexer,
    dialect: D,
    peeked: Option<ReadResult<Option<D::Form>>>,
    failed: bool,
}

impl Reader<Native> {
    /// A reader producing sprig values.
    pub fn new(text: &str, source: &str) -> Self {
        Reader::with_dialect(text, source, Native)
    }
}

impl<D: Dialect> Reader<D> {
    pub fn with_dialect(text: &str, source: &str, dialect: D) -> Self {
        Reader {
            lexer: Lexer::new(text, source),
            dialect,
            peeked: None,
            failed: false,
        }
    }

    /// The next form without consuming it.
    pub fn peek(&mut self) -> ReadResult<Option<&D::Form>> {
        let next = match self.peeked.take() {
            Some(next) => next,
            None => self.read_top(),
        };
        match self.peeked.insert(next) {
            Ok(form) => Ok(form.as_ref()),
            Err(e) => Err(e.clone()),
        }
    }

    /// Consume and return the next form; `None` at end of input.
    pub fn next_form(&mut self) -> ReadResult<Option<D::Form>> {
        match self.peeked.take() {
            Some(next) => next,
            None => self.read_top(),
        }
    }

    /// True when no forms remain. A pending read error is not end of input.
    pub fn eof(&mut self) -> bool {
        matches!(self.peek(), Ok(None))
    }

    #[must_use]
    pub fn source(&self) -> &str {
        self.lexer.source()
    }

    #[must_use]
    pub fn line(&self) -> usize {
        self.lexer.line()
    }

    #[must_use]
    pub fn column(&self) -> usize {
        self.lexer.column()
    }

    fn read_top(&mut self) -> ReadResult<Option<D::Form>> {
        if self.failed {
            return Ok(None);
        }
        let result = self.read_top_form();
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn read_top_form(&mut self) -> ReadResult<Option<D::Form>> {
        let (token, position) = self.lexer.next_token()?;
        match token {
            Token::Eof => Ok(None),
            token => self.read_form(token, position).map(Some),
        }
    }

    /// Read a form that must follow a prefix such as `'`.
    fn read_following(&mut self, what: &str, at: &Position) -> ReadResult<D::Form> {
        let (token, position) = self.lexer.next_token()?;
        match token {
            Token::Eof => Err(ReadError::new(format!("EOF after {}", what), at.clone())),
            token => self.read_form(token, position),
        }
    }

    fn read_form(&mut self, token: Token, position: Position) -> ReadResult<D::Form> {
        let d = &self.dialect;
        match token {
            Token::Nil => Ok(d.nil()),
            Token::Bool(b) => Ok(d.boolean(b)),
            Token::Number(n) => Ok(d.number(n)),
            Token::Str(s) => Ok(d.string(s)),
            Token::Char(c) => Ok(d.string(c.to_string())),
            Token::Symbol(text) => Ok(d.symbol(&text)),
            Token::Keyword { text, auto } => Ok(d.keyword(&text, auto)),
            Token::Regex(pattern) => d
                .regex(&pattern)
                .map_err(|e| ReadError::new(format!("invalid regex: {}", e), position)),
            Token::LParen => {
                let items = self.read_until(')', &position)?;
                Ok(self.dialect.list(items, position))
            }
            Token::LBracket => {
                let items = self.read_until(']', &position)?;
                Ok(self.dialect.vector(items))
            }
            Token::SetOpen => {
                let items = self.read_until('}', &position)?;
                Ok(self.dialect.set(items))
            }
            Token::LBrace => {
                let items = self.read_until('}', &position)?;
                if items.len() % 2 != 0 {
                    return Err(ReadError::new(
                        "map literal must contain an even number of forms",
                        position,
                    ));
                }
                let mut items = items.into_iter();
                let mut entries = Vec::new();
                while let (Some(k), Some(v)) = (items.next(), items.next()) {
                    entries.push((k, v));
                }
                Ok(self.dialect.map(entries))
            }
            Token::Quote => {
                let form = self.read_following("quote", &position)?;
                let quote = self.dialect.symbol("quote");
                Ok(self.dialect.list(vec![quote, form], position))
            }
            Token::Deref => {
                let form = self.read_following("deref", &position)?;
                let deref = self.dialect.symbol("deref");
                Ok(self.dialect.list(vec![deref, form], position))
            }
            Token::Tag(tag) => self.read_tagged(&tag, position),
            Token::RParen | Token::RBracket | Token::RBrace => Err(ReadError::new(
                format!("unmatched delimiter: {}", token.closer().unwrap_or('?')),
                position,
            )),
            Token::Eof => Err(ReadError::new("unexpected EOF", position)),
        }
    }

    fn read_tagged(&mut self, tag: &str, position: Position) -> ReadResult<D::Form> {
        if tag != "inst" {
            return Err(ReadError::new(
                format!("no reader function for tag #{}", tag),
                position,
            ));
        }
        let (token, at) = self.lexer.next_token()?;
        match token {
            Token::Str(text) => self
                .dialect
                .date(&text)
                .map_err(|message| ReadError::new(message, at)),
            _ => Err(ReadError::new("#inst requires a string", at)),
        }
    }

    /// Read forms until the closer matching the collection opened at `open`.
    fn read_until(&mut self, close: char, open: &Position) -> ReadResult<Vec<D::Form>> {
        let mut items = Vec::new();
        loop {
            let (token, position) = self.lexer.next_token()?;
            match token.closer() {
                Some(c) if c == close => return Ok(items),
                Some(c) => {
                    return Err(ReadError::new(
                        format!("mismatched delimiter: expected '{}' but found '{}'", close, c),
                        position,
                    ));
                }
                None if token == Token::Eof => {
                    return Err(ReadError::new(
                        format!(
                            "EOF while reading, expected '{}' to close the collection opened at line {}, column {}",
                            close, open.line, open.column
                        ),
                        position,
                    ));
                }
                None => items.push(self.read_form(token, position)?),
            }
        }
    }
}

impl<D: Dialect> Iterator for Reader<D> {
    type Item = ReadResult<D::Form>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_form().transpose()
    }
}

/// Open a reader over `text`, named `<string>` unless a source is given.
pub fn read_string(text: &str, source: Option<&str>) -> Reader {
    Reader::new(text, source.unwrap_or("<string>"))
}

/// Read every form in `text`.
pub fn read_all(text: &str, source: Option<&str>) -> ReadResult<Vec<Value>> {
    read_string(text, source).collect()
}

/// Read a single form; an empty source reads as nil.
pub fn read_one(text: &str) -> ReadResult<Value> {
    Ok(read_string(text, None).next_form()?.unwrap_or(Value::Nil))
}

/// Drop a leading `#!` line, keeping its newline so line numbers hold.
#[must_use]
pub fn strip_shebang(text: &str) -> &str {
    if text.starts_with("#!") {
        text.find('\n').map_or("", |i| &text[i..])
    } else {
        text
    }
}

/// Open a reader over a UTF-8 file, stripping any shebang line.
pub fn read_file(path: impl AsRef<Path>) -> io::Result<Reader> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    Ok(Reader::new(strip_shebang(&text), &path.display().to_string()))
}

/// Read every form in `text` with the plain-data dialect.
pub fn read_plain(text: &str) -> ReadResult<Vec<serde_json::Value>> {
    Reader::with_dialect(text, "<string>", Plain).collect()
}
