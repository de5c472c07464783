// sprig-reader - Types, protocols and host objects
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Record types, protocols, mutable host objects and atoms.
//!
//! A [`TypeDef`] owns an explicit method table and the set of tags it
//! satisfies. A [`ProtocolDef`] is a named bundle of methods, some with
//! default implementations, optionally composed from other protocols.
//! Mixing a protocol into a type copies its methods into the type's table
//! when the type is defined.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use im::OrdSet;

use crate::symbol::{Keyword, Symbol};
use crate::value::{Value, write_map};

/// Method name to function.
pub type MethodTable = BTreeMap<String, Value>;

// ============================================================================
// Types
// ============================================================================

/// A record type created by `deftype`.
#[derive(Debug, Clone)]
pub struct TypeDef {
    /// Namespace-qualified name, also the type's own tag.
    pub name: Symbol,
    pub fields: Vec<Symbol>,
    /// Constructor arguments that must be supplied; trailing fields past
    /// this count default to nil.
    pub required: usize,
    pub methods: MethodTable,
    /// Every type and protocol tag instances satisfy, including `name`.
    pub tags: OrdSet<Symbol>,
    pub doc: Option<String>,
}

impl TypeDef {
    /// A type with no methods whose only tag is its own name.
    pub fn new(name: Symbol, fields: Vec<Symbol>) -> Self {
        let required = fields.len();
        TypeDef {
            tags: OrdSet::unit(name.clone()),
            name,
            fields,
            required,
            methods: MethodTable::new(),
            doc: None,
        }
    }

    #[must_use]
    pub fn satisfies(&self, tag: &Symbol) -> bool {
        self.tags.contains(tag)
    }

    #[must_use]
    pub fn method(&self, name: &str) -> Option<&Value> {
        self.methods.get(name)
    }

    /// Install a protocol's methods and tags.
    pub fn mix_in(&mut self, protocol: &ProtocolDef) {
        protocol.mix_into(&mut self.methods);
        self.tags.extend(protocol.tags());
    }
}

// ============================================================================
// Protocols
// ============================================================================

/// A protocol method: its arglists and, if written with a body, a default
/// implementation taking `self` first.
#[derive(Debug, Clone)]
pub struct ProtocolMethod {
    pub name: String,
    pub arglists: Value,
    pub default: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct ProtocolDef {
    pub name: Symbol,
    pub doc: Option<String>,
    pub methods: Vec<ProtocolMethod>,
    pub composed: Vec<Rc<ProtocolDef>>,
}

impl ProtocolDef {
    /// This protocol's tag plus the tags of everything it composes.
    #[must_use]
    pub fn tags(&self) -> OrdSet<Symbol> {
        let mut tags = OrdSet::unit(self.name.clone());
        for inner in &self.composed {
            tags.extend(inner.tags());
        }
        tags
    }

    /// Install inherited methods first, then this protocol's own defaults,
    /// so a protocol overrides what it composes.
    pub fn mix_into(&self, table: &mut MethodTable) {
        for inner in &self.composed {
            inner.mix_into(table);
        }
        for method in &self.methods {
            if let Some(default) = &method.default {
                table.insert(method.name.clone(), default.clone());
            }
        }
    }

    /// Names of every method declared here or in composed protocols.
    #[must_use]
    pub fn method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .composed
            .iter()
            .flat_map(|inner| inner.method_names())
            .collect();
        for method in &self.methods {
            if !names.contains(&method.name) {
                names.push(method.name.clone());
            }
        }
        names
    }
}

// ============================================================================
// Objects
// ============================================================================

struct ObjectInner {
    type_def: Option<Rc<TypeDef>>,
    fields: RefCell<BTreeMap<String, Value>>,
}

/// A mutable record: an instance of a [`TypeDef`], or an untyped property
/// bag standing in for a host object.
#[derive(Clone)]
pub struct Object {
    inner: Rc<ObjectInner>,
}

impl Object {
    /// An empty untyped object.
    #[must_use]
    pub fn new() -> Self {
        Object {
            inner: Rc::new(ObjectInner {
                type_def: None,
                fields: RefCell::new(BTreeMap::new()),
            }),
        }
    }

    /// An instance of `type_def` with fields assigned positionally.
    #[must_use]
    pub fn instance(type_def: Rc<TypeDef>, values: Vec<Value>) -> Self {
        let mut values = values.into_iter();
        let fields = type_def
            .fields
            .iter()
            .map(|field| (field.name().to_string(), values.next().unwrap_or(Value::Nil)))
            .collect();
        Object {
            inner: Rc::new(ObjectInner {
                type_def: Some(type_def),
                fields: RefCell::new(fields),
            }),
        }
    }

    #[must_use]
    pub fn type_def(&self) -> Option<&Rc<TypeDef>> {
        self.inner.type_def.as_ref()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<Value> {
        self.inner.fields.borrow().get(field).cloned()
    }

    pub fn set(&self, field: &str, value: Value) {
        self.inner
            .fields
            .borrow_mut()
            .insert(field.to_string(), value);
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.inner.fields.borrow().contains_key(field)
    }

    /// Snapshot of every field, in key order.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.inner
            .fields
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Method from the instance's type, if any.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<Value> {
        self.type_def().and_then(|t| t.method(name).cloned())
    }

    /// Tags satisfied by this object; empty for untyped objects.
    #[must_use]
    pub fn tags(&self) -> OrdSet<Symbol> {
        self.type_def().map(|t| t.tags.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn isa(&self, tag: &Symbol) -> bool {
        self.type_def().is_some_and(|t| t.satisfies(tag))
    }

    /// Fields as a keyword-keyed map.
    #[must_use]
    pub fn to_map(&self) -> Value {
        Value::Map(
            self.inner
                .fields
                .borrow()
                .iter()
                .map(|(k, v)| (Value::Keyword(Keyword::new(k)), v.clone()))
                .collect(),
        )
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.inner) as usize
    }
}

impl Default for Object {
    fn default() -> Self {
        Object::new()
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.inner.fields.borrow();
        let entries: Vec<(Value, &Value)> = match self.type_def() {
            // Declared field order for instances
            Some(t) => t
                .fields
                .iter()
                .filter_map(|field| {
                    fields
                        .get(field.name())
                        .map(|v| (Value::Keyword(Keyword::new(field.name())), v))
                })
                .collect(),
            None => fields
                .iter()
                .map(|(k, v)| (Value::Keyword(Keyword::new(k)), v))
                .collect(),
        };
        match self.type_def() {
            Some(t) => write!(f, "#<{} ", t.name)?,
            None => f.write_str("#<object ")?,
        }
        write_map(f, entries.iter().map(|(k, v)| (k, *v)))?;
        f.write_str(">")
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// ============================================================================
// Atoms
// ============================================================================

/// A mutable reference cell.
#[derive(Clone)]
pub struct Atom(Rc<RefCell<Value>>);

impl Atom {
    pub fn new(value: Value) -> Self {
        Atom(Rc::new(RefCell::new(value)))
    }

    #[must_use]
    pub fn get(&self) -> Value {
        self.0.borrow().clone()
    }

    pub fn reset(&self, value: Value) -> Value {
        *self.0.borrow_mut() = value.clone();
        value
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({})", self.get())
    }
}
