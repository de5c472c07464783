// sprig-core - Form classification
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Classification of forms into the categories the evaluator dispatches on.

use sprig_reader::{Keyword, Symbol, Value};

/// Fixed list heads interpreted structurally. These are never macro names,
/// even when a macro of the same name is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialForm {
    Quote,
    Def,
    Cond,
    If,
    Let,
    Fn,
    Do,
    Try,
    Throw,
    Loop,
    Recur,
    Set,
    DefType,
    DefProtocol,
    DefMacro,
    PropertyGet,
    PropertySet,
    MethodCall,
    New,
    Ns,
    Require,
    Use,
}

impl SpecialForm {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let form = match name {
            "quote" => SpecialForm::Quote,
            "def" => SpecialForm::Def,
            "cond" => SpecialForm::Cond,
            "if" => SpecialForm::If,
            "let" => SpecialForm::Let,
            "fn" | "lambda" => SpecialForm::Fn,
            "do" => SpecialForm::Do,
            "try" => SpecialForm::Try,
            "throw" => SpecialForm::Throw,
            "loop" => SpecialForm::Loop,
            "recur" => SpecialForm::Recur,
            "set!" => SpecialForm::Set,
            "deftype" => SpecialForm::DefType,
            "defprotocol" => SpecialForm::DefProtocol,
            "defmacro" => SpecialForm::DefMacro,
            ".-" => SpecialForm::PropertyGet,
            ".-set!" => SpecialForm::PropertySet,
            "." => SpecialForm::MethodCall,
            "new" => SpecialForm::New,
            "ns" => SpecialForm::Ns,
            "require" => SpecialForm::Require,
            "use" => SpecialForm::Use,
            _ => return None,
        };
        Some(form)
    }

    /// The head symbol as written, used in syntax errors.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SpecialForm::Quote => "quote",
            SpecialForm::Def => "def",
            SpecialForm::Cond => "cond",
            SpecialForm::If => "if",
            SpecialForm::Let => "let",
            SpecialForm::Fn => "fn",
            SpecialForm::Do => "do",
            SpecialForm::Try => "try",
            SpecialForm::Throw => "throw",
            SpecialForm::Loop => "loop",
            SpecialForm::Recur => "recur",
            SpecialForm::Set => "set!",
            SpecialForm::DefType => "deftype",
            SpecialForm::DefProtocol => "defprotocol",
            SpecialForm::DefMacro => "defmacro",
            SpecialForm::PropertyGet => ".-",
            SpecialForm::PropertySet => ".-set!",
            SpecialForm::MethodCall => ".",
            SpecialForm::New => "new",
            SpecialForm::Ns => "ns",
            SpecialForm::Require => "require",
            SpecialForm::Use => "use",
        }
    }
}

/// Interop shorthand spelled into a head symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sugar {
    /// `(.-field obj)`
    Property(String),
    /// `(.method obj args...)`
    Method(String),
    /// `(Ctor. args...)`
    Construct(Symbol),
}

impl Sugar {
    fn parse(sym: &Symbol) -> Option<Sugar> {
        let name = sym.name();
        if let Some(ns) = sym.namespace() {
            // Only constructors may be qualified: `(geo/Point. 1 2)`
            return name
                .strip_suffix('.')
                .filter(|ctor| !ctor.is_empty())
                .map(|ctor| Sugar::Construct(Symbol::qualified(ns, ctor)));
        }
        if name.len() < 2 || name == ".." {
            return None;
        }
        if let Some(field) = name.strip_prefix(".-") {
            Some(Sugar::Property(field.to_string()))
        } else if let Some(method) = name.strip_prefix('.') {
            Some(Sugar::Method(method.to_string()))
        } else {
            name.strip_suffix('.')
                .map(|ctor| Sugar::Construct(Symbol::parse(ctor)))
        }
    }
}

/// What a form is, decided once before dispatch.
#[derive(Debug)]
pub enum FormKind<'a> {
    SelfEvaluating,
    Keyword(&'a Keyword),
    Symbol(&'a Symbol),
    /// Vector, map or set literal
    Collection,
    Special(SpecialForm),
    Sugar(Sugar),
    Application,
}

#[must_use]
pub fn classify(form: &Value) -> FormKind<'_> {
    match form {
        Value::Keyword(kw) => FormKind::Keyword(kw),
        Value::Symbol(sym) => FormKind::Symbol(sym),
        Value::Vector(_) | Value::Map(_) | Value::Set(_) => FormKind::Collection,
        Value::List(items, _) => match items.front() {
            None => FormKind::SelfEvaluating,
            Some(Value::Symbol(head)) => {
                let special = if head.is_qualified() {
                    None
                } else {
                    SpecialForm::from_name(head.name())
                };
                if let Some(special) = special {
                    FormKind::Special(special)
                } else if let Some(sugar) = Sugar::parse(head) {
                    FormKind::Sugar(sugar)
                } else {
                    FormKind::Application
                }
            }
            Some(_) => FormKind::Application,
        },
        _ => FormKind::SelfEvaluating,
    }
}
