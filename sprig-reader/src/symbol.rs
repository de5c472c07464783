// sprig-reader - Interned symbols and keywords
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Symbols and keywords, both optionally namespaced.
//!
//! # Interning
//!
//! Both kinds of identifier share one global interner keyed by
//! `(kind, namespace, name)`. Two identifiers with the same parts share the
//! same allocation, so equality and hashing are pointer operations.
//!
//! Interned names are never freed. Programs that call `gensym` in a hot
//! loop will grow the interner; everything else reuses a bounded set.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Kind {
    Symbol,
    Keyword,
    /// `::name`, qualified later against the current namespace.
    AutoKeyword,
}

#[derive(Debug)]
struct Ident {
    kind: Kind,
    namespace: Option<Arc<str>>,
    name: Arc<str>,
}

type InternKey = (Kind, Option<Arc<str>>, Arc<str>);

#[derive(Default)]
struct Interner {
    idents: HashMap<InternKey, Arc<Ident>>,
    strings: HashMap<String, Arc<str>>,
}

impl Interner {
    fn string(&mut self, s: &str) -> Arc<str> {
        if let Some(existing) = self.strings.get(s) {
            return Arc::clone(existing);
        }
        let interned: Arc<str> = Arc::from(s);
        self.strings.insert(s.to_string(), Arc::clone(&interned));
        interned
    }

    fn ident(&mut self, kind: Kind, namespace: Option<&str>, name: &str) -> Arc<Ident> {
        let ns = namespace.map(|s| self.string(s));
        let name = self.string(name);
        let key = (kind, ns.clone(), name.clone());
        Arc::clone(self.idents.entry(key).or_insert_with(|| {
            Arc::new(Ident {
                kind,
                namespace: ns,
                name,
            })
        }))
    }
}

static INTERNER: OnceLock<Mutex<Interner>> = OnceLock::new();

fn intern(kind: Kind, namespace: Option<&str>, name: &str) -> Arc<Ident> {
    // A poisoned lock still guards a consistent map: insertion is the only
    // mutation and it cannot be observed half-done.
    INTERNER
        .get_or_init(|| Mutex::new(Interner::default()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .ident(kind, namespace, name)
}

/// Split `ns/name` on its single slash. `/` on its own, or text with the
/// slash at either end, stays unqualified.
fn split_qualified(text: &str) -> (Option<&str>, &str) {
    match text.find('/') {
        Some(pos) if pos > 0 && pos + 1 < text.len() && !text[pos + 1..].contains('/') => {
            (Some(&text[..pos]), &text[pos + 1..])
        }
        _ => (None, text),
    }
}

fn compare(a: &Ident, b: &Ident) -> Ordering {
    a.namespace
        .as_deref()
        .cmp(&b.namespace.as_deref())
        .then_with(|| a.name.cmp(&b.name))
}

// ============================================================================
// Symbol
// ============================================================================

/// An identifier with an optional namespace component.
#[derive(Clone)]
pub struct Symbol {
    inner: Arc<Ident>,
}

impl Symbol {
    /// Create an unqualified symbol.
    pub fn new(name: &str) -> Self {
        Symbol {
            inner: intern(Kind::Symbol, None, name),
        }
    }

    /// Create a namespace-qualified symbol.
    pub fn qualified(namespace: &str, name: &str) -> Self {
        Symbol {
            inner: intern(Kind::Symbol, Some(namespace), name),
        }
    }

    /// Parse `name` or `ns/name`.
    pub fn parse(text: &str) -> Self {
        match split_qualified(text) {
            (Some(ns), name) => Symbol::qualified(ns, name),
            (None, name) => Symbol::new(name),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.inner.namespace.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[must_use]
    pub fn is_qualified(&self) -> bool {
        self.inner.namespace.is_some()
    }

    /// This symbol with its namespace dropped.
    #[must_use]
    pub fn unqualified(&self) -> Symbol {
        if self.is_qualified() {
            Symbol::new(self.name())
        } else {
            self.clone()
        }
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(&self.inner, &other.inner)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace() {
            Some(ns) => write!(f, "{}/{}", ns, self.name()),
            None => write!(f, "{}", self.name()),
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self)
    }
}

// ============================================================================
// Keyword
// ============================================================================

/// A self-evaluating identifier written with a leading colon.
///
/// `::name` is read as an *auto-resolving* keyword: the reader only marks it,
/// and the evaluator qualifies it against the current namespace.
#[derive(Clone)]
pub struct Keyword {
    inner: Arc<Ident>,
}

impl Keyword {
    pub fn new(name: &str) -> Self {
        Keyword {
            inner: intern(Kind::Keyword, None, name),
        }
    }

    pub fn qualified(namespace: &str, name: &str) -> Self {
        Keyword {
            inner: intern(Kind::Keyword, Some(namespace), name),
        }
    }

    /// Parse the text after the colon(s): `name` or `ns/name`.
    pub fn parse(text: &str) -> Self {
        match split_qualified(text) {
            (Some(ns), name) => Keyword::qualified(ns, name),
            (None, name) => Keyword::new(name),
        }
    }

    /// A `::name` keyword awaiting namespace resolution.
    pub fn auto(name: &str) -> Self {
        Keyword {
            inner: intern(Kind::AutoKeyword, None, name),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.inner.namespace.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[must_use]
    pub fn is_auto(&self) -> bool {
        self.inner.kind == Kind::AutoKeyword
    }

    /// Qualify an auto-resolving keyword against `namespace`. Other keywords
    /// are returned unchanged.
    #[must_use]
    pub fn resolve_in(&self, namespace: &str) -> Keyword {
        if self.is_auto() {
            Keyword::qualified(namespace, self.name())
        } else {
            self.clone()
        }
    }
}

impl PartialEq for Keyword {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Keyword {}

impl Hash for Keyword {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

impl PartialOrd for Keyword {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Keyword {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(&self.inner, &other.inner).then_with(|| self.is_auto().cmp(&other.is_auto()))
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_auto() {
            return write!(f, "::{}", self.name());
        }
        match self.namespace() {
            Some(ns) => write!(f, ":{}/{}", ns, self.name()),
            None => write!(f, ":{}", self.name()),
        }
    }
}

impl fmt::Debug for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keyword({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_interning() {
        let a = Symbol::new("foo");
        let b = Symbol::new("foo");
        assert_eq!(a, b);
        assert!(Arc::ptr_eq(&a.inner, &b.inner));
        assert_ne!(Symbol::new("foo"), Symbol::qualified("user", "foo"));
    }

    #[test]
    fn test_symbol_parse() {
        let s = Symbol::parse("ns.a/x");
        assert_eq!(s.namespace(), Some("ns.a"));
        assert_eq!(s.name(), "x");

        let div = Symbol::parse("/");
        assert_eq!(div.namespace(), None);
        assert_eq!(div.name(), "/");

        let odd = Symbol::parse("a/b/c");
        assert_eq!(odd.namespace(), None);
        assert_eq!(odd.name(), "a/b/c");
    }

    #[test]
    fn test_symbol_and_keyword_are_distinct() {
        let sym = Symbol::new("same");
        let kw = Keyword::new("same");
        assert!(!Arc::ptr_eq(&sym.inner, &kw.inner));
    }

    #[test]
    fn test_auto_keyword() {
        let kw = Keyword::auto("local");
        assert!(kw.is_auto());
        assert_eq!(kw.to_string(), "::local");
        assert_ne!(kw, Keyword::new("local"));
        assert_eq!(kw.resolve_in("my.ns"), Keyword::qualified("my.ns", "local"));
        assert_eq!(kw.resolve_in("my.ns").to_string(), ":my.ns/local");
    }

    #[test]
    fn test_ordering() {
        let mut syms = vec![Symbol::new("b"), Symbol::new("a"), Symbol::qualified("z", "a")];
        syms.sort();
        assert_eq!(syms[0], Symbol::new("a"));
        assert_eq!(syms[1], Symbol::new("b"));
    }
}
