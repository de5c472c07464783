// sprig-reader - Value types for sprig
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The symbolic value model shared by the reader and the evaluator.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, SecondsFormat, Utc};
use im::{OrdMap, OrdSet, Vector};

use crate::callable::{Lambda, NativeFn};
use crate::lexer::Position;
use crate::object::{Atom, Object, ProtocolDef, TypeDef};
use crate::symbol::{Keyword, Symbol};

/// Metadata attached to variables.
pub type Meta = OrdMap<Value, Value>;

/// A compiled regular expression, compared by its source pattern.
#[derive(Clone)]
pub struct Pattern(Rc<regex::Regex>);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Ok(Pattern(Rc::new(regex::Regex::new(source)?)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[must_use]
    pub fn regex(&self) -> &regex::Regex {
        &self.0
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.as_str())
    }
}

/// A sprig value.
///
/// Lists carry the position they were read from, when they came from source
/// text; the position never takes part in equality or ordering.
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Date(DateTime<Utc>),
    Regex(Pattern),
    Symbol(Symbol),
    Keyword(Keyword),
    List(Vector<Value>, Option<Rc<Position>>),
    Vector(Vector<Value>),
    Map(OrdMap<Value, Value>),
    Set(OrdSet<Value>),
    Fn(Lambda),
    NativeFn(NativeFn),
    Atom(Atom),
    Type(Rc<TypeDef>),
    Protocol(Rc<ProtocolDef>),
    Object(Object),
    /// A reference to a registered namespace, by name.
    Namespace(Symbol),
}

impl Value {
    #[must_use]
    pub fn number(n: f64) -> Self {
        Value::Number(n)
    }

    /// Integral number; all numbers are stored as doubles.
    #[must_use]
    pub fn int(n: i64) -> Self {
        Value::Number(n as f64)
    }

    #[must_use]
    pub fn string(s: &str) -> Self {
        Value::String(Rc::from(s))
    }

    #[must_use]
    pub fn symbol(name: &str) -> Self {
        Value::Symbol(Symbol::parse(name))
    }

    #[must_use]
    pub fn keyword(name: &str) -> Self {
        Value::Keyword(Keyword::parse(name))
    }

    #[must_use]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(items.into_iter().collect(), None)
    }

    #[must_use]
    pub fn list_from(items: Vector<Value>) -> Self {
        Value::List(items, None)
    }

    #[must_use]
    pub fn vector(items: Vec<Value>) -> Self {
        Value::Vector(items.into_iter().collect())
    }

    #[must_use]
    pub fn map(pairs: Vec<(Value, Value)>) -> Self {
        Value::Map(pairs.into_iter().collect())
    }

    #[must_use]
    pub fn set(items: Vec<Value>) -> Self {
        Value::Set(items.into_iter().collect())
    }

    /// Everything except `nil` and `false` is truthy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Regex(_) => "regex",
            Value::Symbol(_) => "symbol",
            Value::Keyword(_) => "keyword",
            Value::List(..) => "list",
            Value::Vector(_) => "vector",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
            Value::Fn(_) | Value::NativeFn(_) => "fn",
            Value::Atom(_) => "atom",
            Value::Type(_) => "type",
            Value::Protocol(_) => "protocol",
            Value::Object(_) => "object",
            Value::Namespace(_) => "namespace",
        }
    }

    /// Source position of a list read from text.
    #[must_use]
    pub fn position(&self) -> Option<&Rc<Position>> {
        match self {
            Value::List(_, pos) => pos.as_ref(),
            _ => None,
        }
    }

    /// Elements of a list or vector.
    #[must_use]
    pub fn as_seq(&self) -> Option<&Vector<Value>> {
        match self {
            Value::List(items, _) | Value::Vector(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Value::Symbol(sym) => Some(sym),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// True when this is a list whose head is the unqualified symbol `name`.
    #[must_use]
    pub fn is_form(&self, name: &str) -> bool {
        match self {
            Value::List(items, _) => matches!(
                items.front(),
                Some(Value::Symbol(sym)) if !sym.is_qualified() && sym.name() == name
            ),
            _ => false,
        }
    }

    /// Text used by `str` and `print`: strings unquoted, nil empty.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Value::Nil => String::new(),
            Value::String(s) => s.to_string(),
            other => other.to_string(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Nil => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Date(_) => 4,
            Value::Regex(_) => 5,
            Value::Keyword(_) => 6,
            Value::Symbol(_) => 7,
            Value::List(..) | Value::Vector(_) => 8,
            Value::Map(_) => 9,
            Value::Set(_) => 10,
            Value::Fn(_) => 11,
            Value::NativeFn(_) => 12,
            Value::Atom(_) => 13,
            Value::Type(_) => 14,
            Value::Protocol(_) => 15,
            Value::Object(_) => 16,
            Value::Namespace(_) => 17,
        }
    }
}

/// Format a double the way the printer and `str` show numbers: integral
/// values without a fractional part.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "##NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "##Inf" } else { "##-Inf" }.to_string()
    } else if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\u{0b}' => f.write_str("\\v")?,
            '\u{08}' => f.write_str("\\b")?,
            '\u{0c}' => f.write_str("\\f")?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

fn write_seq<'a>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: impl Iterator<Item = &'a Value>,
    close: &str,
) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str(close)
}

pub(crate) fn write_map<'a>(
    f: &mut fmt::Formatter<'_>,
    entries: impl Iterator<Item = (&'a Value, &'a Value)>,
) -> fmt::Result {
    f.write_str("{")?;
    for (i, (k, v)) in entries.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{} {}", k, v)?;
    }
    f.write_str("}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => write_escaped(f, s),
            Value::Date(d) => write!(
                f,
                "#inst \"{}\"",
                d.to_rfc3339_opts(SecondsFormat::AutoSi, true)
            ),
            Value::Regex(p) => write!(f, "#\"{}\"", p.as_str()),
            Value::Symbol(sym) => write!(f, "{}", sym),
            Value::Keyword(kw) => write!(f, "{}", kw),
            Value::List(items, _) => write_seq(f, "(", items.iter(), ")"),
            Value::Vector(items) => write_seq(f, "[", items.iter(), "]"),
            Value::Map(map) => write_map(f, map.iter()),
            Value::Set(set) => write_seq(f, "#{", set.iter(), "}"),
            Value::Fn(lambda) => match lambda.name() {
                Some(name) => write!(f, "#<fn {}>", name),
                None => f.write_str("#<fn>"),
            },
            Value::NativeFn(native) => write!(f, "#<native-fn {}>", native.name()),
            Value::Atom(atom) => write!(f, "#<atom {}>", atom.get()),
            Value::Type(def) => write!(f, "#<type {}>", def.name),
            Value::Protocol(def) => write!(f, "#<protocol {}>", def.name),
            Value::Object(obj) => write!(f, "{}", obj),
            Value::Namespace(name) => write!(f, "#<namespace {}>", name),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

fn cmp_numbers(a: f64, b: f64) -> Ordering {
    if a == b { Ordering::Equal } else { a.total_cmp(&b) }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Nil, Value::Nil) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => cmp_numbers(*a, *b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Regex(a), Value::Regex(b)) => a.as_str().cmp(b.as_str()),
            (Value::Keyword(a), Value::Keyword(b)) => a.cmp(b),
            (Value::Symbol(a), Value::Symbol(b)) => a.cmp(b),
            // Lists and vectors with the same elements are equal
            (
                Value::List(a, _) | Value::Vector(a),
                Value::List(b, _) | Value::Vector(b),
            ) => a.iter().cmp(b.iter()),
            (Value::Map(a), Value::Map(b)) => a.iter().cmp(b.iter()),
            (Value::Set(a), Value::Set(b)) => a.iter().cmp(b.iter()),
            (Value::Fn(a), Value::Fn(b)) => a.addr().cmp(&b.addr()),
            (Value::NativeFn(a), Value::NativeFn(b)) => a.addr().cmp(&b.addr()),
            (Value::Atom(a), Value::Atom(b)) => a.addr().cmp(&b.addr()),
            (Value::Type(a), Value::Type(b)) => Rc::as_ptr(a).cmp(&Rc::as_ptr(b)),
            (Value::Protocol(a), Value::Protocol(b)) => Rc::as_ptr(a).cmp(&Rc::as_ptr(b)),
            (Value::Object(a), Value::Object(b)) => a.addr().cmp(&b.addr()),
            (Value::Namespace(a), Value::Namespace(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<Symbol> for Value {
    fn from(sym: Symbol) -> Self {
        Value::Symbol(sym)
    }
}

impl From<Keyword> for Value {
    fn from(kw: Keyword) -> Self {
        Value::Keyword(kw)
    }
}
