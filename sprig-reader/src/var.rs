// sprig-reader - Variable cells
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Variables: mutable cells holding a value and a metadata map.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::symbol::{Keyword, Symbol};
use crate::value::{Meta, Value};

/// Well-known metadata keys.
pub mod keys {
    pub const NAME: &str = "name";
    pub const TAG: &str = "tag";
    pub const MACRO: &str = "macro?";
    pub const PRIVATE: &str = "private?";
    pub const DOC: &str = "doc";
    pub const ARGLISTS: &str = "arglists";
    pub const NAMESPACE: &str = "namespace";
    pub const NS_ALIAS: &str = "ns-alias";
    pub const IMPORTED: &str = "imported";
    pub const PROTOCOL: &str = "protocol?";
    pub const TYPE: &str = "type?";
}

/// The metadata key `:name`.
#[must_use]
pub fn meta_key(name: &str) -> Value {
    Value::Keyword(Keyword::new(name))
}

/// Build a metadata map from `(key, value)` pairs.
#[must_use]
pub fn meta(entries: &[(&str, Value)]) -> Meta {
    entries
        .iter()
        .map(|(k, v)| (meta_key(k), v.clone()))
        .collect()
}

struct VarCell {
    name: Symbol,
    value: RefCell<Value>,
    meta: RefCell<Meta>,
}

/// A named cell. Redefinition replaces the binding holding a `Var`; only
/// [`Var::set`] mutates the cell itself.
#[derive(Clone)]
pub struct Var {
    cell: Rc<VarCell>,
}

impl Var {
    pub fn new(name: Symbol, value: Value) -> Self {
        Var::with_meta(name, value, Meta::new())
    }

    pub fn with_meta(name: Symbol, value: Value, mut meta: Meta) -> Self {
        meta.insert(meta_key(keys::NAME), Value::Symbol(name.clone()));
        Var {
            cell: Rc::new(VarCell {
                name,
                value: RefCell::new(value),
                meta: RefCell::new(meta),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &Symbol {
        &self.cell.name
    }

    #[must_use]
    pub fn get(&self) -> Value {
        self.cell.value.borrow().clone()
    }

    pub fn set(&self, value: Value) {
        *self.cell.value.borrow_mut() = value;
    }

    #[must_use]
    pub fn meta(&self) -> Meta {
        self.cell.meta.borrow().clone()
    }

    #[must_use]
    pub fn meta_value(&self, key: &str) -> Option<Value> {
        self.cell.meta.borrow().get(&meta_key(key)).cloned()
    }

    pub fn set_meta_value(&self, key: &str, value: Value) {
        self.cell.meta.borrow_mut().insert(meta_key(key), value);
    }

    /// True when metadata `key` is present and truthy. `private?` style keys
    /// also accept the spelling without the question mark.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        let meta = self.cell.meta.borrow();
        let truthy = |k: &str| meta.get(&meta_key(k)).is_some_and(Value::is_truthy);
        truthy(key) || key.strip_suffix('?').is_some_and(truthy)
    }

    #[must_use]
    pub fn is_macro(&self) -> bool {
        self.flag(keys::MACRO)
    }

    #[must_use]
    pub fn is_private(&self) -> bool {
        self.flag(keys::PRIVATE)
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Var) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#'{}", self.cell.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_mutates_shared_cell() {
        let var = Var::new(Symbol::new("x"), Value::int(1));
        let alias = var.clone();
        alias.set(Value::int(2));
        assert_eq!(var.get(), Value::int(2));
        assert!(var.ptr_eq(&alias));
    }

    #[test]
    fn test_name_recorded_in_meta() {
        let var = Var::new(Symbol::qualified("user", "x"), Value::Nil);
        assert_eq!(var.meta_value(keys::NAME), Some(Value::symbol("user/x")));
    }

    #[test]
    fn test_flags() {
        let var = Var::with_meta(
            Symbol::new("m"),
            Value::Nil,
            meta(&[(keys::MACRO, Value::Bool(true)), ("private", Value::Bool(true))]),
        );
        assert!(var.is_macro());
        assert!(var.is_private());
        assert!(!var.flag(keys::TYPE));
    }
}
