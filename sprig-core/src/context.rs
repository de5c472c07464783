// sprig-core - Evaluation context
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Per-runtime evaluation state threaded through the evaluator.
//!
//! A [`Context`] owns the namespace registry, the diagnostic call stack, the
//! name of the source being evaluated and the recursion depth counter.
//! Nothing here is global, so independent runtimes can coexist.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use sprig_reader::{Position, Symbol, TypeDef, Value, Vector};

use crate::error::{Error, Result};
use crate::namespace::{DEFAULT_NS, NamespaceRegistry};

/// Default limit on nested evaluation.
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// Default bytes of native stack evaluation may use below its outermost
/// entry. Leaves headroom on a 2 MiB thread, the smallest default stack.
pub const DEFAULT_MAX_STACK: usize = 1536 * 1024;

/// Longest rendering of an expression kept in a trace line.
const FRAME_TEXT_LIMIT: usize = 72;

// ============================================================================
// Call stack
// ============================================================================

/// One application on the diagnostic call stack. Line and column are zero
/// when the expression was not read from text.
#[derive(Debug, Clone)]
pub struct Frame {
    pub expression: Value,
    pub source: Rc<str>,
    pub line: usize,
    pub column: usize,
    /// Name of the enclosing function or namespace
    pub scope: Option<Rc<str>>,
}

impl Frame {
    /// A frame for `expression`, positioned from the reader when it can be
    /// and otherwise attributed to `source`.
    pub fn new(expression: &Value, source: Rc<str>, scope: Option<Rc<str>>) -> Self {
        match expression.position() {
            Some(pos) => Frame::at(expression, pos, scope),
            None => Frame {
                expression: expression.clone(),
                source,
                line: 0,
                column: 0,
                scope,
            },
        }
    }

    fn at(expression: &Value, pos: &Position, scope: Option<Rc<str>>) -> Self {
        Frame {
            expression: expression.clone(),
            source: Rc::clone(&pos.source),
            line: pos.line,
            column: pos.column,
            scope,
        }
    }

    /// Placeholder reported when an error escapes with no frames at all.
    #[must_use]
    pub fn unknown() -> Self {
        Frame {
            expression: Value::symbol("<unknown>"),
            source: Rc::from("<unknown>"),
            line: 0,
            column: 0,
            scope: None,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = self.expression.to_string();
        if text.chars().count() > FRAME_TEXT_LIMIT {
            text = text.chars().take(FRAME_TEXT_LIMIT).collect::<String>() + "...";
        }
        write!(f, "at {}", text)?;
        if let Some(scope) = &self.scope {
            write!(f, " in {}", scope)?;
        }
        if self.line == 0 {
            write!(f, " ({})", self.source)
        } else {
            write!(f, " ({}:{}:{})", self.source, self.line, self.column)
        }
    }
}

/// A snapshot of the call stack taken where an error was raised.
#[derive(Debug, Clone)]
pub struct StackTrace {
    frames: Vec<Frame>,
}

impl StackTrace {
    /// Frames from the outermost call to the innermost.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in self.frames.iter().rev() {
            writeln!(f, "    {}", frame)?;
        }
        Ok(())
    }
}

// ============================================================================
// Built-in exception types
// ============================================================================

/// Names of the exception types every runtime defines in `sprig.core`.
pub const ERROR_TYPE_NAMES: [&str; 7] = [
    "Error",
    "UndefinedVariableError",
    "ArityError",
    "InvocationError",
    "SyntaxError",
    "ReadError",
    "TypeError",
];

fn error_types() -> Vec<Rc<TypeDef>> {
    let root = Symbol::qualified(DEFAULT_NS, "Error");
    ERROR_TYPE_NAMES
        .iter()
        .map(|name| {
            let mut def = TypeDef::new(
                Symbol::qualified(DEFAULT_NS, name),
                vec![Symbol::new("message"), Symbol::new("data")],
            );
            def.required = 1;
            def.tags.insert(root.clone());
            Rc::new(def)
        })
        .collect()
}

// ============================================================================
// Context
// ============================================================================

/// Mutable state of one runtime's evaluation.
pub struct Context {
    registry: NamespaceRegistry,
    stack: RefCell<Vector<Frame>>,
    /// Stack captured by the first error of the current top-level form
    fault: RefCell<Option<Vector<Frame>>>,
    source: RefCell<Rc<str>>,
    depth: Cell<usize>,
    max_depth: Cell<usize>,
    /// Stack address of the outermost evaluation entry
    stack_base: Cell<usize>,
    max_stack: Cell<usize>,
    error_types: Vec<Rc<TypeDef>>,
    gensym_counter: Cell<u64>,
}

impl Context {
    pub fn new(registry: NamespaceRegistry) -> Self {
        Context {
            registry,
            stack: RefCell::new(Vector::new()),
            fault: RefCell::new(None),
            source: RefCell::new(Rc::from("<string>")),
            depth: Cell::new(0),
            max_depth: Cell::new(DEFAULT_MAX_DEPTH),
            stack_base: Cell::new(0),
            max_stack: Cell::new(DEFAULT_MAX_STACK),
            error_types: error_types(),
            gensym_counter: Cell::new(0),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &NamespaceRegistry {
        &self.registry
    }

    // --- call stack -------------------------------------------------------

    pub fn push_frame(&self, frame: Frame) {
        self.stack.borrow_mut().push_back(frame);
    }

    pub fn pop_frame(&self) {
        self.stack.borrow_mut().pop_back();
    }

    #[must_use]
    pub fn stack_depth(&self) -> usize {
        self.stack.borrow().len()
    }

    /// Remember the current stack as the site of an error, unless an inner
    /// frame already did.
    pub fn record_fault(&self) {
        let mut fault = self.fault.borrow_mut();
        if fault.is_none() {
            *fault = Some(self.stack.borrow().clone());
        }
    }

    /// Forget a recorded fault, after `catch` handled it.
    pub fn clear_fault(&self) {
        *self.fault.borrow_mut() = None;
    }

    /// The trace of the last uncaught error, padded with an unknown frame
    /// when no application was on the stack.
    #[must_use]
    pub fn last_trace(&self) -> StackTrace {
        let frames = self
            .fault
            .borrow()
            .clone()
            .unwrap_or_else(|| self.stack.borrow().clone());
        let mut frames: Vec<Frame> = frames.into_iter().collect();
        if frames.is_empty() {
            frames.push(Frame::unknown());
        }
        StackTrace { frames }
    }

    // --- recursion depth --------------------------------------------------

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth.get()
    }

    pub fn set_max_depth(&self, depth: usize) {
        self.max_depth.set(depth);
    }

    #[must_use]
    pub fn max_stack(&self) -> usize {
        self.max_stack.get()
    }

    /// Bytes of native stack evaluation may use. Must stay below the stack
    /// size of the thread evaluating.
    pub fn set_max_stack(&self, bytes: usize) {
        self.max_stack.set(bytes);
    }

    /// Count one level of nested evaluation, failing past the depth limit
    /// or once the native stack used since the outermost level exceeds its
    /// budget. The level is released when the guard drops.
    pub fn enter(&self) -> Result<DepthGuard<'_>> {
        let depth = self.depth.get() + 1;
        if depth > self.max_depth.get() {
            return Err(Error::EvalError(format!(
                "Stack overflow: maximum recursion depth ({}) exceeded",
                self.max_depth.get()
            )));
        }
        let marker = 0u8;
        let here = std::ptr::addr_of!(marker) as usize;
        if depth == 1 {
            self.stack_base.set(here);
        } else if self.stack_base.get().abs_diff(here) > self.max_stack.get() {
            return Err(Error::EvalError(format!(
                "Stack overflow: native stack budget ({} bytes) exceeded at depth {}",
                self.max_stack.get(),
                depth
            )));
        }
        self.depth.set(depth);
        Ok(DepthGuard { depth: &self.depth })
    }

    // --- current source ---------------------------------------------------

    #[must_use]
    pub fn source(&self) -> Rc<str> {
        Rc::clone(&self.source.borrow())
    }

    /// Switch the current source name, returning the previous one.
    pub fn set_source(&self, source: &str) -> Rc<str> {
        self.source.replace(Rc::from(source))
    }

    // --- misc -------------------------------------------------------------

    /// A built-in exception type by unqualified name.
    #[must_use]
    pub fn error_type(&self, name: &str) -> Option<Rc<TypeDef>> {
        self.error_types
            .iter()
            .find(|def| def.name.name() == name)
            .cloned()
    }

    #[must_use]
    pub fn error_types(&self) -> &[Rc<TypeDef>] {
        &self.error_types
    }

    /// A fresh symbol that cannot clash with user names.
    pub fn gensym(&self, prefix: &str) -> Symbol {
        let n = self.gensym_counter.get() + 1;
        self.gensym_counter.set(n);
        Symbol::new(&format!("{}__{}__auto__", prefix, n))
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(NamespaceRegistry::new())
    }
}

/// Releases one level of evaluation depth on drop.
pub struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}
