// sprig-core - Namespace system for global bindings
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Namespaces and the registry that owns them.
//!
//! A namespace is a named root [`Env`] plus a record of where each of its
//! bindings came from. The [`NamespaceRegistry`] interns namespaces by name;
//! it is owned by a runtime's context, never global.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use sprig_reader::{Meta, Object, Symbol, Value, Var, keys, meta_key};

use crate::env::Env;

/// Name of the namespace holding the built-ins.
pub const DEFAULT_NS: &str = "sprig.core";

/// Namespace active when a runtime starts.
pub const USER_NS: &str = "user";

/// How a binding arrived in a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Created by `def` or [`Namespace::define`]
    Defined,
    /// An alias for another namespace
    Alias,
    /// Shared from another namespace by `refer`
    Referred,
    /// Copied from a host object
    Imported,
}

/// A named container of variables.
#[derive(Clone)]
pub struct Namespace {
    inner: Rc<NamespaceInner>,
}

struct NamespaceInner {
    name: Symbol,
    env: Env,
    origins: RefCell<HashMap<String, Origin>>,
    doc: RefCell<Option<String>>,
}

impl Namespace {
    fn new(name: Symbol) -> Self {
        Namespace {
            inner: Rc::new(NamespaceInner {
                env: Env::named(name.name()),
                name,
                origins: RefCell::new(HashMap::new()),
                doc: RefCell::new(None),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &Symbol {
        &self.inner.name
    }

    /// The namespace's own root scope.
    #[must_use]
    pub fn env(&self) -> &Env {
        &self.inner.env
    }

    #[must_use]
    pub fn doc(&self) -> Option<String> {
        self.inner.doc.borrow().clone()
    }

    pub fn set_doc(&self, doc: impl Into<String>) {
        *self.inner.doc.borrow_mut() = Some(doc.into());
    }

    fn qualify(&self, name: &str) -> Symbol {
        Symbol::qualified(self.inner.name.name(), name)
    }

    fn namespaced_meta(&self, mut meta: Meta) -> Meta {
        meta.insert(
            meta_key(keys::NAMESPACE),
            Value::Symbol(self.inner.name.clone()),
        );
        meta
    }

    fn record(&self, name: &str, origin: Origin) {
        self.inner
            .origins
            .borrow_mut()
            .insert(name.to_string(), origin);
    }

    /// Define `name` in this namespace, replacing any existing binding.
    pub fn define(&self, name: &str, value: Value, meta: Meta) -> Var {
        let var = Var::with_meta(self.qualify(name), value, self.namespaced_meta(meta));
        self.inner.env.bind(name, var.clone());
        self.record(name, Origin::Defined);
        var
    }

    /// Define `name` only if this namespace has no binding for it yet.
    pub fn intern(&self, name: &str, value: Value, meta: Meta) -> Var {
        match self.find_var(name) {
            Some(var) => var,
            None => self.define(name, value, meta),
        }
    }

    /// The variable bound to `name` in this namespace's own scope.
    #[must_use]
    pub fn find_var(&self, name: &str) -> Option<Var> {
        self.inner.env.local_var(name)
    }

    #[must_use]
    pub fn origin(&self, name: &str) -> Option<Origin> {
        self.inner.origins.borrow().get(name).copied()
    }

    /// Bind `alias` to `other` as a namespace reference tagged `ns-alias`.
    pub fn alias(&self, alias: &str, other: &Namespace) {
        let var = Var::with_meta(
            self.qualify(alias),
            Value::Namespace(other.name().clone()),
            sprig_reader::meta(&[(keys::NS_ALIAS, Value::Bool(true))]),
        );
        self.inner.env.bind(alias, var);
        self.record(alias, Origin::Alias);
    }

    /// The namespace `alias` refers to, if it is an alias.
    #[must_use]
    pub fn alias_target(&self, alias: &str) -> Option<Symbol> {
        if self.origin(alias) != Some(Origin::Alias) {
            return None;
        }
        match self.find_var(alias).map(|var| var.get()) {
            Some(Value::Namespace(target)) => Some(target),
            _ => None,
        }
    }

    /// Share `other`'s public variables whose names pass `filter`. The cells
    /// are shared, so `set!` through either namespace is seen by both.
    /// Returns the number of names referred.
    pub fn refer(&self, other: &Namespace, filter: impl Fn(&str) -> bool) -> usize {
        let mut count = 0;
        for (name, var) in other.publics() {
            if filter(&name) {
                self.inner.env.bind(&name, var);
                self.record(&name, Origin::Referred);
                count += 1;
            }
        }
        count
    }

    /// Copy every property of `host` in as a variable tagged `imported`.
    /// Names already bound here win. Returns the number imported.
    pub fn import_host(&self, host: &Object) -> usize {
        let mut count = 0;
        for (name, value) in host.entries() {
            if self.find_var(&name).is_some() {
                tracing::warn!(ns = %self.name(), name = %name, "host import skipped: already defined");
                continue;
            }
            let meta = sprig_reader::meta(&[(keys::IMPORTED, Value::Bool(true))]);
            let var = Var::with_meta(self.qualify(&name), value, self.namespaced_meta(meta));
            self.inner.env.bind(&name, var);
            self.record(&name, Origin::Imported);
            count += 1;
        }
        count
    }

    /// Project this namespace's public definitions into `root`, nesting one
    /// object per dotted segment of the name. Returns the innermost object.
    pub fn export(&self, root: &Object) -> Object {
        let mut target = root.clone();
        for segment in self.inner.name.name().split('.') {
            target = match target.get(segment) {
                Some(Value::Object(existing)) => existing,
                _ => {
                    let child = Object::new();
                    target.set(segment, Value::Object(child.clone()));
                    child
                }
            };
        }
        for (name, var) in self.publics() {
            target.set(&name, var.get());
        }
        target
    }

    /// Public definitions made in this namespace, sorted by name.
    #[must_use]
    pub fn publics(&self) -> Vec<(String, Var)> {
        self.interns()
            .into_iter()
            .filter(|(_, var)| !var.is_private())
            .collect()
    }

    /// Every definition made in this namespace, private ones included.
    #[must_use]
    pub fn interns(&self) -> Vec<(String, Var)> {
        let origins = self.inner.origins.borrow();
        self.inner
            .env
            .local_vars()
            .into_iter()
            .filter(|(name, _)| origins.get(name) == Some(&Origin::Defined))
            .collect()
    }
}

impl PartialEq for Namespace {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#<namespace {}>", self.inner.name)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Every namespace known to one runtime, keyed by name.
#[derive(Clone)]
pub struct NamespaceRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

struct RegistryInner {
    namespaces: HashMap<String, Namespace>,
    current: Namespace,
    default: Namespace,
    /// Canonical paths of loaded files, with the namespace each left current
    loaded: HashMap<PathBuf, String>,
    /// Directories searched by `require` after the requiring file's own
    load_paths: Vec<PathBuf>,
}

impl NamespaceRegistry {
    /// A registry holding the default namespace and `user`, with `user`
    /// current.
    pub fn new() -> Self {
        let default = Namespace::new(Symbol::new(DEFAULT_NS));
        let user = Namespace::new(Symbol::new(USER_NS));
        let mut namespaces = HashMap::new();
        namespaces.insert(DEFAULT_NS.to_string(), default.clone());
        namespaces.insert(USER_NS.to_string(), user.clone());
        NamespaceRegistry {
            inner: Rc::new(RefCell::new(RegistryInner {
                namespaces,
                current: user,
                default,
                loaded: HashMap::new(),
                load_paths: Vec::new(),
            })),
        }
    }

    /// The namespace called `name`, created on first use.
    pub fn intern(&self, name: &str) -> Namespace {
        if let Some(ns) = self.find(name) {
            return ns;
        }
        tracing::debug!(ns = name, "creating namespace");
        let ns = Namespace::new(Symbol::new(name));
        self.inner
            .borrow_mut()
            .namespaces
            .insert(name.to_string(), ns.clone());
        ns
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<Namespace> {
        self.inner.borrow().namespaces.get(name).cloned()
    }

    #[must_use]
    pub fn current(&self) -> Namespace {
        self.inner.borrow().current.clone()
    }

    pub fn set_current(&self, ns: &Namespace) {
        let mut inner = self.inner.borrow_mut();
        if inner.current != *ns {
            tracing::debug!(from = %inner.current.name(), to = %ns.name(), "switching namespace");
            inner.current = ns.clone();
        }
    }

    /// The namespace holding the built-ins.
    #[must_use]
    pub fn default_ns(&self) -> Namespace {
        self.inner.borrow().default.clone()
    }

    /// Record `path` as loaded into namespace `ns`. Returns false if it
    /// was already recorded.
    pub fn mark_loaded(&self, path: &Path, ns: &str) -> bool {
        self.inner
            .borrow_mut()
            .loaded
            .insert(path.to_path_buf(), ns.to_string())
            .is_none()
    }

    #[must_use]
    pub fn is_loaded(&self, path: &Path) -> bool {
        self.inner.borrow().loaded.contains_key(path)
    }

    /// The namespace a loaded file left current.
    #[must_use]
    pub fn loaded_ns(&self, path: &Path) -> Option<Namespace> {
        let name = self.inner.borrow().loaded.get(path).cloned()?;
        self.find(&name)
    }

    pub fn add_load_path(&self, path: impl Into<PathBuf>) {
        self.inner.borrow_mut().load_paths.push(path.into());
    }

    #[must_use]
    pub fn load_paths(&self) -> Vec<PathBuf> {
        self.inner.borrow().load_paths.clone()
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
