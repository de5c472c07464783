// sprig-reader - Function values
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Lambdas (closures over an evaluator environment) and native functions.
//!
//! Both hold evaluator state behind `Rc<dyn Any>` so this crate does not
//! depend on the evaluator; `sprig-core` downcasts them back.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::symbol::Symbol;
use crate::value::Value;

/// The argument counts a body accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    /// A rest parameter makes the body accept this many or more.
    AtLeast(usize),
}

impl Arity {
    #[must_use]
    pub fn accepts(&self, argc: usize) -> bool {
        match self {
            Arity::Exact(n) => argc == *n,
            Arity::AtLeast(n) => argc >= *n,
        }
    }

    #[must_use]
    pub fn min(&self) -> usize {
        match self {
            Arity::Exact(n) | Arity::AtLeast(n) => *n,
        }
    }

    #[must_use]
    pub fn is_variadic(&self) -> bool {
        matches!(self, Arity::AtLeast(_))
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::AtLeast(n) => write!(f, "{}+", n),
        }
    }
}

/// One arity of a lambda: positional parameters, an optional rest
/// parameter, and the body expressions.
#[derive(Debug, Clone)]
pub struct FnBody {
    pub params: Vec<Symbol>,
    pub rest: Option<Symbol>,
    pub body: Vec<Value>,
}

impl FnBody {
    #[must_use]
    pub fn arity(&self) -> Arity {
        if self.rest.is_some() {
            Arity::AtLeast(self.params.len())
        } else {
            Arity::Exact(self.params.len())
        }
    }

    /// The parameter vector as written, e.g. `[a b & more]`.
    #[must_use]
    pub fn arglist(&self) -> Value {
        let mut items: Vec<Value> = self.params.iter().cloned().map(Value::Symbol).collect();
        if let Some(rest) = &self.rest {
            items.push(Value::symbol("&"));
            items.push(Value::Symbol(rest.clone()));
        }
        Value::vector(items)
    }
}

struct LambdaInner {
    /// Name used in diagnostics; set by `def`.
    name: Option<Symbol>,
    /// Name bound to the lambda itself inside its bodies (`(fn self-name [..] ..)`).
    self_name: Option<Symbol>,
    bodies: Vec<Rc<FnBody>>,
    env: Rc<dyn Any>,
}

/// A user-defined function capturing its defining environment.
#[derive(Clone)]
pub struct Lambda {
    inner: Rc<LambdaInner>,
}

impl Lambda {
    pub fn new(self_name: Option<Symbol>, bodies: Vec<FnBody>, env: Rc<dyn Any>) -> Self {
        Lambda {
            inner: Rc::new(LambdaInner {
                name: self_name.clone(),
                self_name,
                bodies: bodies.into_iter().map(Rc::new).collect(),
                env,
            }),
        }
    }

    /// A copy of this lambda reporting itself as `name`.
    #[must_use]
    pub fn with_name(&self, name: Symbol) -> Lambda {
        Lambda {
            inner: Rc::new(LambdaInner {
                name: Some(name),
                self_name: self.inner.self_name.clone(),
                bodies: self.inner.bodies.clone(),
                env: Rc::clone(&self.inner.env),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&Symbol> {
        self.inner.name.as_ref()
    }

    #[must_use]
    pub fn self_name(&self) -> Option<&Symbol> {
        self.inner.self_name.as_ref()
    }

    #[must_use]
    pub fn env(&self) -> &Rc<dyn Any> {
        &self.inner.env
    }

    #[must_use]
    pub fn bodies(&self) -> &[Rc<FnBody>] {
        &self.inner.bodies
    }

    /// Pick the body for `argc` arguments: an exact match first, otherwise
    /// the variadic body with the smallest minimum that still fits.
    #[must_use]
    pub fn select(&self, argc: usize) -> Option<&Rc<FnBody>> {
        let bodies = &self.inner.bodies;
        bodies
            .iter()
            .find(|b| b.arity() == Arity::Exact(argc))
            .or_else(|| {
                bodies
                    .iter()
                    .filter(|b| b.arity().is_variadic() && b.arity().accepts(argc))
                    .min_by_key(|b| b.arity().min())
            })
    }

    #[must_use]
    pub fn arities(&self) -> Vec<Arity> {
        self.inner.bodies.iter().map(|b| b.arity()).collect()
    }

    #[must_use]
    pub fn arglists(&self) -> Value {
        Value::list(self.inner.bodies.iter().map(|b| b.arglist()).collect())
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const () as usize
    }
}

impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lambda")
            .field("name", &self.inner.name)
            .field("arities", &self.arities())
            .finish()
    }
}

/// A function implemented in Rust.
#[derive(Clone)]
pub struct NativeFn {
    name: Rc<str>,
    func: Rc<dyn Any>,
}

impl NativeFn {
    pub fn new(name: &str, func: Rc<dyn Any>) -> Self {
        NativeFn {
            name: Rc::from(name),
            func,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn func(&self) -> &Rc<dyn Any> {
        &self.func
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.func) as *const () as usize
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFn({})", self.name)
    }
}
