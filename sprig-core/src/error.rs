// sprig-core - Error types for the sprig evaluator
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Error types for sprig evaluation.

use std::fmt;

use sprig_reader::{Arity, ReadError, Symbol, Value};

/// Result type for sprig evaluation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during evaluation.
///
/// Every variant can be caught by a language-level `try`; see
/// [`Error::exception_type`] for the type each one is caught as.
#[derive(Debug, Clone)]
pub enum Error {
    /// A symbol that resolves to no variable
    UndefinedVariable(Symbol),
    /// Wrong number of arguments to a function
    ArityError {
        expected: AritySpec,
        got: usize,
        name: Option<String>,
    },
    /// Wrong type for an operation
    TypeError {
        expected: &'static str,
        got: &'static str,
        context: Option<String>,
    },
    /// Applied something that cannot be invoked; names the form
    NotCallable(String),
    /// Index out of bounds
    IndexOutOfBounds { index: i64, length: usize },
    /// Structurally invalid special form
    InvalidSyntax { form: &'static str, message: String },
    /// Failure in the reader
    Read(ReadError),
    /// General evaluation error
    EvalError(String),
    /// `recur` evaluated where no loop or fn can receive it
    RecurOutsideLoop,
    /// Value raised by `throw`
    Thrown(Value),
    /// File could not be read
    Io { path: String, message: String },
    /// Invariant violation inside the evaluator
    Internal(String),
}

/// Specification for expected arity.
#[derive(Debug, Clone)]
pub enum AritySpec {
    Exact(usize),
    AtLeast(usize),
    Range(usize, usize),
    /// The arities of a multi-arity lambda
    OneOf(Vec<Arity>),
}

impl From<Arity> for AritySpec {
    fn from(arity: Arity) -> Self {
        match arity {
            Arity::Exact(n) => AritySpec::Exact(n),
            Arity::AtLeast(n) => AritySpec::AtLeast(n),
        }
    }
}

impl fmt::Display for AritySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AritySpec::Exact(n) => write!(f, "{}", n),
            AritySpec::AtLeast(n) => write!(f, "at least {}", n),
            AritySpec::Range(min, max) => write!(f, "{} to {}", min, max),
            AritySpec::OneOf(arities) => {
                let parts: Vec<String> = arities.iter().map(|a| a.to_string()).collect();
                write!(f, "{}", parts.join(" or "))
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UndefinedVariable(sym) => {
                write!(f, "Undefined variable: {}", sym)
            }
            Error::ArityError {
                expected,
                got,
                name,
            } => {
                if let Some(name) = name {
                    write!(
                        f,
                        "Wrong number of arguments to '{}': expected {}, got {}",
                        name, expected, got
                    )
                } else {
                    write!(
                        f,
                        "Wrong number of arguments: expected {}, got {}",
                        expected, got
                    )
                }
            }
            Error::TypeError {
                expected,
                got,
                context,
            } => {
                if let Some(ctx) = context {
                    write!(f, "{}: expected {}, got {}", ctx, expected, got)
                } else {
                    write!(f, "Type error: expected {}, got {}", expected, got)
                }
            }
            Error::NotCallable(form) => {
                write!(f, "Not a function: {}", form)
            }
            Error::IndexOutOfBounds { index, length } => {
                write!(
                    f,
                    "Index {} out of bounds for collection of length {}",
                    index, length
                )
            }
            Error::InvalidSyntax { form, message } => {
                write!(f, "Invalid '{}' syntax: {}", form, message)
            }
            Error::Read(err) => {
                write!(f, "Read error: {}", err)
            }
            Error::EvalError(msg) => {
                write!(f, "{}", msg)
            }
            Error::RecurOutsideLoop => {
                write!(f, "recur can only be used in tail position inside loop or fn")
            }
            Error::Thrown(val) => {
                write!(f, "{}", thrown_message(val))
            }
            Error::Io { path, message } => {
                write!(f, "Could not read {}: {}", path, message)
            }
            Error::Internal(msg) => {
                write!(f, "Internal error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ReadError> for Error {
    fn from(err: ReadError) -> Self {
        Error::Read(err)
    }
}

/// The `message` field of a thrown exception object, or the value as text.
fn thrown_message(val: &Value) -> String {
    match val {
        Value::Object(obj) => match obj.get("message") {
            Some(message) => message.to_text(),
            None => val.to_string(),
        },
        other => other.to_text(),
    }
}

impl Error {
    /// Create an arity error for exact arity.
    pub fn arity(expected: usize, got: usize) -> Self {
        Error::ArityError {
            expected: AritySpec::Exact(expected),
            got,
            name: None,
        }
    }

    /// Create an arity error for exact arity with function name.
    pub fn arity_named(name: impl Into<String>, expected: usize, got: usize) -> Self {
        Error::ArityError {
            expected: AritySpec::Exact(expected),
            got,
            name: Some(name.into()),
        }
    }

    /// Create an arity error for minimum arity with function name.
    pub fn arity_at_least(name: impl Into<String>, expected: usize, got: usize) -> Self {
        Error::ArityError {
            expected: AritySpec::AtLeast(expected),
            got,
            name: Some(name.into()),
        }
    }

    /// Create an arity error for a bounded range with function name.
    pub fn arity_range(name: impl Into<String>, min: usize, max: usize, got: usize) -> Self {
        Error::ArityError {
            expected: AritySpec::Range(min, max),
            got,
            name: Some(name.into()),
        }
    }

    /// Create a type error.
    pub fn type_error(expected: &'static str, got: &'static str) -> Self {
        Error::TypeError {
            expected,
            got,
            context: None,
        }
    }

    /// Create a type error with context.
    pub fn type_error_in(
        context: impl Into<String>,
        expected: &'static str,
        got: &'static str,
    ) -> Self {
        Error::TypeError {
            expected,
            got,
            context: Some(context.into()),
        }
    }

    /// Create an invalid syntax error.
    pub fn syntax(form: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidSyntax {
            form,
            message: message.into(),
        }
    }

    /// Name of the built-in exception type this error is caught as.
    #[must_use]
    pub fn exception_type(&self) -> &'static str {
        match self {
            Error::UndefinedVariable(_) => "UndefinedVariableError",
            Error::ArityError { .. } => "ArityError",
            Error::TypeError { .. } | Error::IndexOutOfBounds { .. } => "TypeError",
            Error::NotCallable(_) => "InvocationError",
            Error::InvalidSyntax { .. } | Error::RecurOutsideLoop => "SyntaxError",
            Error::Read(_) => "ReadError",
            Error::EvalError(_) | Error::Thrown(_) | Error::Io { .. } | Error::Internal(_) => {
                "Error"
            }
        }
    }
}

/// Check that `args` has exactly `expected` elements.
pub fn check_arity(name: &str, args: &[Value], expected: usize) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(Error::arity_named(name, expected, args.len()))
    }
}

/// Check that `args` has between `min` and `max` elements.
pub fn check_arity_range(name: &str, args: &[Value], min: usize, max: usize) -> Result<()> {
    if (min..=max).contains(&args.len()) {
        Ok(())
    } else {
        Err(Error::arity_range(name, min, max, args.len()))
    }
}

/// Check that `args` has at least `min` elements.
pub fn check_arity_at_least(name: &str, args: &[Value], min: usize) -> Result<()> {
    if args.len() >= min {
        Ok(())
    } else {
        Err(Error::arity_at_least(name, min, args.len()))
    }
}
