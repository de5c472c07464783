// sprig-core - Environment for lexical scoping
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Lexical environments built from variable cells.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use sprig_reader::{Meta, Symbol, Value, Var};

use crate::error::{Error, Result};

/// A node in a lexical scope chain.
///
/// Each node maps plain names to [`Var`] cells and may have a parent.
/// Lookup walks from the node towards the root; definition always writes
/// into the node itself, shadowing any parent binding of the same name.
///
/// # Examples
///
/// ```
/// use sprig_core::Env;
/// use sprig_reader::Value;
///
/// let env = Env::new();
/// env.define("x", Value::int(1));
///
/// let child = env.extend();
/// child.define("x", Value::int(2));
///
/// assert_eq!(child.get("x").unwrap(), Value::int(2));
/// assert_eq!(env.get("x").unwrap(), Value::int(1));
/// ```
#[derive(Clone)]
pub struct Env {
    inner: Rc<EnvInner>,
}

struct EnvInner {
    vars: RefCell<HashMap<String, Var>>,
    parent: Option<Env>,
    /// Label used in stack traces; inherited by children
    scope: Option<Rc<str>>,
}

impl Env {
    /// Create a new root environment with no parent.
    pub fn new() -> Self {
        Env::root(None)
    }

    /// Create a root environment labelled `scope` in traces.
    pub fn named(scope: &str) -> Self {
        Env::root(Some(Rc::from(scope)))
    }

    fn root(scope: Option<Rc<str>>) -> Self {
        Env {
            inner: Rc::new(EnvInner {
                vars: RefCell::new(HashMap::new()),
                parent: None,
                scope,
            }),
        }
    }

    /// Create a child environment that falls back to this one.
    #[must_use]
    pub fn extend(&self) -> Self {
        Env {
            inner: Rc::new(EnvInner {
                vars: RefCell::new(HashMap::new()),
                parent: Some(self.clone()),
                scope: None,
            }),
        }
    }

    /// Create a child environment with its own trace label.
    #[must_use]
    pub fn extend_named(&self, scope: &str) -> Self {
        Env {
            inner: Rc::new(EnvInner {
                vars: RefCell::new(HashMap::new()),
                parent: Some(self.clone()),
                scope: Some(Rc::from(scope)),
            }),
        }
    }

    #[must_use]
    pub fn parent(&self) -> Option<&Env> {
        self.inner.parent.as_ref()
    }

    /// The nearest trace label in the chain.
    #[must_use]
    pub fn scope_name(&self) -> Option<Rc<str>> {
        let mut current = Some(self);
        while let Some(env) = current {
            if let Some(scope) = &env.inner.scope {
                return Some(Rc::clone(scope));
            }
            current = env.parent();
        }
        None
    }

    /// The nearest environment (this one included) that owns `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Env> {
        let mut current = Some(self);
        while let Some(env) = current {
            if env.inner.vars.borrow().contains_key(name) {
                return Some(env.clone());
            }
            current = env.parent();
        }
        None
    }

    /// The variable bound to `name` anywhere in the chain.
    #[must_use]
    pub fn var(&self, name: &str) -> Option<Var> {
        let mut current = Some(self);
        while let Some(env) = current {
            if let Some(var) = env.inner.vars.borrow().get(name) {
                return Some(var.clone());
            }
            current = env.parent();
        }
        None
    }

    /// The variable bound to `name` in this node only.
    #[must_use]
    pub fn local_var(&self, name: &str) -> Option<Var> {
        self.inner.vars.borrow().get(name).cloned()
    }

    /// Bind `name` to a fresh variable in this node, replacing any
    /// existing binding here.
    pub fn define(&self, name: &str, value: Value) -> Value {
        self.define_with_meta(name, value.clone(), Meta::new());
        value
    }

    /// Bind `name` to a fresh variable carrying `meta`.
    pub fn define_with_meta(&self, name: &str, value: Value, meta: Meta) -> Var {
        let var = Var::with_meta(Symbol::new(name), value, meta);
        self.bind(name, var.clone());
        var
    }

    /// Pre-declare `name` as nil so a definition can refer to itself.
    /// An existing binding in this node is left alone.
    pub fn declare(&self, name: &str) {
        if self.local_var(name).is_none() {
            self.define(name, Value::Nil);
        }
    }

    /// Bind `name` to an existing variable cell, sharing it.
    pub fn bind(&self, name: &str, var: Var) {
        self.inner.vars.borrow_mut().insert(name.to_string(), var);
    }

    /// The value bound to `name`, failing if nothing in the chain owns it.
    pub fn get(&self, name: &str) -> Result<Value> {
        self.var(name)
            .map(|var| var.get())
            .ok_or_else(|| Error::UndefinedVariable(Symbol::new(name)))
    }

    /// Assign to an existing binding wherever it lives in the chain.
    /// Never creates a binding.
    pub fn set(&self, name: &str, value: Value) -> Result<Value> {
        match self.var(name) {
            Some(var) => {
                var.set(value.clone());
                Ok(value)
            }
            None => Err(Error::UndefinedVariable(Symbol::new(name))),
        }
    }

    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Bindings of this node only, sorted by name.
    #[must_use]
    pub fn local_vars(&self) -> Vec<(String, Var)> {
        let mut vars: Vec<(String, Var)> = self
            .inner
            .vars
            .borrow()
            .iter()
            .map(|(name, var)| (name.clone(), var.clone()))
            .collect();
        vars.sort_by(|a, b| a.0.cmp(&b.0));
        vars
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Env) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Env")
            .field("scope", &self.inner.scope)
            .field("names", &self.inner.vars.borrow().keys().collect::<Vec<_>>())
            .field("has_parent", &self.inner.parent.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_get() {
        let env = Env::new();
        assert_eq!(env.define("x", Value::int(42)), Value::int(42));
        assert_eq!(env.get("x").unwrap(), Value::int(42));
    }

    #[test]
    fn test_undefined_variable() {
        let env = Env::new();
        assert!(matches!(env.get("x"), Err(Error::UndefinedVariable(_))));
        assert!(env.lookup("x").is_none());
    }

    #[test]
    fn test_lookup_returns_owner() {
        let parent = Env::new();
        parent.define("x", Value::int(1));
        let child = parent.extend();

        let owner = child.lookup("x").unwrap();
        assert!(owner.ptr_eq(&parent));
        assert!(child.lookup("y").is_none());
    }

    #[test]
    fn test_child_shadows_parent() {
        let parent = Env::new();
        parent.define("x", Value::int(1));

        let child = parent.extend();
        child.define("x", Value::int(2));

        assert_eq!(child.get("x").unwrap(), Value::int(2));
        assert_eq!(parent.get("x").unwrap(), Value::int(1));
    }

    #[test]
    fn test_set_in_parent() {
        let parent = Env::new();
        parent.define("x", Value::int(1));

        let child = parent.extend();
        child.set("x", Value::int(100)).unwrap();

        // Parent is updated, child gains no binding of its own
        assert_eq!(parent.get("x").unwrap(), Value::int(100));
        assert!(child.local_var("x").is_none());
    }

    #[test]
    fn test_set_never_creates() {
        let root = Env::new();
        let child = root.extend();
        assert!(child.set("fresh", Value::int(1)).is_err());
        assert!(!root.is_defined("fresh"));
    }

    #[test]
    fn test_declare_keeps_existing() {
        let env = Env::new();
        env.declare("f");
        assert_eq!(env.get("f").unwrap(), Value::Nil);
        env.define("g", Value::int(1));
        env.declare("g");
        assert_eq!(env.get("g").unwrap(), Value::int(1));
    }

    #[test]
    fn test_redefinition_replaces_cell() {
        let env = Env::new();
        env.define("x", Value::int(1));
        let before = env.local_var("x").unwrap();
        env.define("x", Value::int(2));
        assert_eq!(before.get(), Value::int(1));
        assert_eq!(env.get("x").unwrap(), Value::int(2));
    }

    #[test]
    fn test_scope_name_inherited() {
        let root = Env::named("user");
        let child = root.extend();
        assert_eq!(child.scope_name().as_deref(), Some("user"));
        let named = child.extend_named("fact");
        assert_eq!(named.extend().scope_name().as_deref(), Some("fact"));
    }
}
