// sprig-core - Tree-walking evaluator
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Tree-walking evaluator for sprig forms.
//!
//! Every form is macro-expanded to a fixpoint, classified once into a
//! [`FormKind`], then dispatched. Forms in tail position are evaluated by
//! [`eval_tail`], which may hand back an [`Outcome::TailCall`] produced by
//! `recur`; the enclosing `loop` or lambda invocation rebinds and runs its
//! body again instead of growing the host stack. Every other position goes
//! through [`eval`], where a stray tail call is an error.

pub mod apply;
mod control;
mod definitions;
pub mod exceptions;
pub mod forms;
mod interop;
mod namespaces;
mod protocols;
mod types;

pub use apply::{NativeImpl, apply, make_native};
pub use exceptions::to_exception;
pub use forms::{FormKind, SpecialForm, Sugar, classify};
pub(crate) use interop::tag_of;
pub use namespaces::load_file;

use std::borrow::Cow;

use sprig_reader::{Keyword, Reader, Symbol, Value, Var};

use crate::context::Context;
use crate::env::Env;
use crate::error::{Error, Result};

/// Result of evaluating a form in tail position.
#[derive(Debug)]
pub enum Outcome {
    Value(Value),
    /// Arguments of a `recur` waiting for the nearest loop or lambda
    TailCall(Vec<Value>),
}

impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        Outcome::Value(value)
    }
}

/// Evaluate `form` in `env`.
pub fn eval(form: &Value, env: &Env, ctx: &Context) -> Result<Value> {
    match eval_tail(form, env, ctx)? {
        Outcome::Value(value) => Ok(value),
        Outcome::TailCall(_) => Err(Error::RecurOutsideLoop),
    }
}

/// Evaluate `form` in tail position.
pub(crate) fn eval_tail(form: &Value, env: &Env, ctx: &Context) -> Result<Outcome> {
    let _guard = ctx.enter()?;
    let form = macroexpand_all(form, env, ctx)?;
    let form = form.as_ref();

    match classify(form) {
        FormKind::SelfEvaluating => Ok(form.clone().into()),
        FormKind::Keyword(kw) => Ok(eval_keyword(kw, ctx).into()),
        FormKind::Symbol(sym) => eval_symbol(sym, env, ctx).map(Outcome::Value),
        FormKind::Collection => eval_collection(form, env, ctx).map(Outcome::Value),
        FormKind::Special(special) => eval_special(special, form, env, ctx),
        FormKind::Sugar(sugar) => interop::eval_sugar(&sugar, form, env, ctx).map(Outcome::Value),
        FormKind::Application => apply::eval_application(form, env, ctx).map(Outcome::Value),
    }
}

/// Evaluate a body: every expression but the last for effect, the last in
/// tail position. An empty body yields nil.
pub(crate) fn eval_body(body: &[Value], env: &Env, ctx: &Context) -> Result<Outcome> {
    let Some((last, init)) = body.split_last() else {
        return Ok(Value::Nil.into());
    };
    for expr in init {
        eval(expr, env, ctx)?;
    }
    eval_tail(last, env, ctx)
}

/// Evaluate a body outside tail position.
pub(crate) fn eval_do(body: &[Value], env: &Env, ctx: &Context) -> Result<Value> {
    let mut result = Value::Nil;
    for expr in body {
        result = eval(expr, env, ctx)?;
    }
    Ok(result)
}

fn eval_special(special: SpecialForm, form: &Value, env: &Env, ctx: &Context) -> Result<Outcome> {
    let items = list_items(form);
    let args = &items[1..];
    match special {
        SpecialForm::Quote => control::eval_quote(args).map(Outcome::Value),
        SpecialForm::Def => definitions::eval_def(args, env, ctx).map(Outcome::Value),
        SpecialForm::Cond => control::eval_cond(args, env, ctx),
        SpecialForm::If => control::eval_if(args, env, ctx),
        SpecialForm::Let => control::eval_let(args, env, ctx),
        SpecialForm::Fn => definitions::eval_fn(args, env).map(Outcome::Value),
        SpecialForm::Do => control::eval_block(args, env, ctx),
        SpecialForm::Try => exceptions::eval_try(args, env, ctx).map(Outcome::Value),
        SpecialForm::Throw => exceptions::eval_throw(args, env, ctx).map(Outcome::Value),
        SpecialForm::Loop => control::eval_loop(args, env, ctx),
        SpecialForm::Recur => control::eval_recur(args, env, ctx),
        SpecialForm::Set => definitions::eval_set(args, env, ctx).map(Outcome::Value),
        SpecialForm::DefType => types::eval_deftype(args, env, ctx).map(Outcome::Value),
        SpecialForm::DefProtocol => protocols::eval_defprotocol(args, env, ctx).map(Outcome::Value),
        SpecialForm::DefMacro => definitions::eval_defmacro(args, env, ctx).map(Outcome::Value),
        SpecialForm::PropertyGet => interop::eval_property_get(args, form, env, ctx).map(Outcome::Value),
        SpecialForm::PropertySet => interop::eval_property_set(args, env, ctx).map(Outcome::Value),
        SpecialForm::MethodCall => interop::eval_method_call(args, form, env, ctx).map(Outcome::Value),
        SpecialForm::New => interop::eval_new(args, form, env, ctx).map(Outcome::Value),
        SpecialForm::Ns => namespaces::eval_ns(args, form, env, ctx).map(Outcome::Value),
        SpecialForm::Require => namespaces::eval_require(args, form, env, ctx).map(Outcome::Value),
        SpecialForm::Use => namespaces::eval_use(args, form, env, ctx).map(Outcome::Value),
    }
}

/// Elements of a list form as a vector, head included.
pub(crate) fn list_items(form: &Value) -> Vec<Value> {
    match form {
        Value::List(items, _) => items.iter().cloned().collect(),
        _ => Vec::new(),
    }
}

// ============================================================================
// Atoms
// ============================================================================

/// `::name` is qualified against the current namespace; other keywords are
/// returned as they are.
fn eval_keyword(kw: &Keyword, ctx: &Context) -> Value {
    if kw.is_auto() {
        let ns = ctx.registry().current();
        Value::Keyword(kw.resolve_in(ns.name().name()))
    } else {
        Value::Keyword(kw.clone())
    }
}

fn eval_symbol(sym: &Symbol, env: &Env, ctx: &Context) -> Result<Value> {
    if !sym.is_qualified() && !env.is_defined(sym.name()) {
        match sym.name() {
            "*ns*" => return Ok(Value::Symbol(ctx.registry().current().name().clone())),
            "*file*" => return Ok(Value::String(ctx.source())),
            _ => {}
        }
    }
    let var = lookup_var(sym, env, ctx)?;
    if var.is_macro() {
        return Err(Error::EvalError(format!(
            "Can't take value of a macro: {}",
            sym
        )));
    }
    Ok(var.get())
}

fn eval_collection(form: &Value, env: &Env, ctx: &Context) -> Result<Value> {
    match form {
        Value::Vector(items) => {
            let items = items
                .iter()
                .map(|item| eval(item, env, ctx))
                .collect::<Result<_>>()?;
            Ok(Value::Vector(items))
        }
        Value::Map(entries) => {
            let mut map = sprig_reader::OrdMap::new();
            for (k, v) in entries {
                map.insert(eval(k, env, ctx)?, eval(v, env, ctx)?);
            }
            Ok(Value::Map(map))
        }
        Value::Set(items) => {
            let items = items
                .iter()
                .map(|item| eval(item, env, ctx))
                .collect::<Result<_>>()?;
            Ok(Value::Set(items))
        }
        other => Ok(other.clone()),
    }
}

// ============================================================================
// Symbol resolution
// ============================================================================

/// Find the variable `sym` names without failing.
///
/// Unqualified symbols walk the lexical chain, then the current namespace,
/// then the default namespace. Qualified symbols skip the lexical chain and
/// look inside the named namespace or the namespace an alias points to.
pub(crate) fn find_var(sym: &Symbol, env: &Env, ctx: &Context) -> Option<Var> {
    let registry = ctx.registry();
    match sym.namespace() {
        None => env
            .var(sym.name())
            .or_else(|| registry.current().find_var(sym.name()))
            .or_else(|| registry.default_ns().find_var(sym.name())),
        Some(ns_name) => {
            let ns = resolve_namespace(ns_name, env, ctx)?;
            ns.find_var(sym.name())
        }
    }
}

/// Like [`find_var`], but failing with the reason the symbol cannot be used.
pub(crate) fn lookup_var(sym: &Symbol, env: &Env, ctx: &Context) -> Result<Var> {
    if let Some(ns_name) = sym.namespace() {
        let ns = resolve_namespace(ns_name, env, ctx)
            .ok_or_else(|| Error::EvalError(format!("No such namespace: {}", ns_name)))?;
        let var = ns
            .find_var(sym.name())
            .ok_or_else(|| Error::UndefinedVariable(sym.clone()))?;
        if var.is_private() && ns != ctx.registry().current() {
            return Err(Error::EvalError(format!("{} is not public", sym)));
        }
        return Ok(var);
    }
    find_var(sym, env, ctx).ok_or_else(|| Error::UndefinedVariable(sym.clone()))
}

/// A namespace by alias (lexical first, then the current namespace's own)
/// or by its registered name.
fn resolve_namespace(name: &str, env: &Env, ctx: &Context) -> Option<crate::Namespace> {
    let registry = ctx.registry();
    let aliased = match env.var(name).map(|var| var.get()) {
        Some(Value::Namespace(target)) => Some(target),
        _ => registry.current().alias_target(name),
    };
    match aliased {
        Some(target) => registry.find(target.name()),
        None => registry.find(name),
    }
}

// ============================================================================
// Macro expansion
// ============================================================================

/// The macro variable a form's head names, if any. Special forms and
/// interop sugar are never macro calls.
fn macro_var(form: &Value, env: &Env, ctx: &Context) -> Option<Var> {
    if !matches!(classify(form), FormKind::Application) {
        return None;
    }
    let Value::List(items, _) = form else {
        return None;
    };
    let Some(Value::Symbol(head)) = items.front() else {
        return None;
    };
    find_var(head, env, ctx).filter(Var::is_macro)
}

/// Expand `form` once if its head names a macro.
pub fn macroexpand_1(form: &Value, env: &Env, ctx: &Context) -> Result<Option<Value>> {
    let Some(var) = macro_var(form, env, ctx) else {
        return Ok(None);
    };
    let items = list_items(form);
    tracing::debug!(name = %var.name(), "expanding macro");
    let expanded = apply(&var.get(), &items[1..], ctx)?;
    Ok(Some(expanded))
}

/// Expand `form` until its head no longer names a macro.
pub fn macroexpand(form: &Value, env: &Env, ctx: &Context) -> Result<Value> {
    Ok(macroexpand_all(form, env, ctx)?.into_owned())
}

fn macroexpand_all<'a>(form: &'a Value, env: &Env, ctx: &Context) -> Result<Cow<'a, Value>> {
    let mut current = Cow::Borrowed(form);
    while let Some(expanded) = macroexpand_1(&current, env, ctx)? {
        current = Cow::Owned(expanded);
    }
    Ok(current)
}

// ============================================================================
// Streams
// ============================================================================

/// Read and evaluate every form of `reader`, returning the last value.
///
/// Without an explicit environment each form is evaluated in the scope of
/// whichever namespace is current when it is reached, so `ns` and `in-ns`
/// take effect for the forms after them. The first uncaught error halts the
/// stream.
pub fn evaluate_stream(reader: &mut Reader, env: Option<&Env>, ctx: &Context) -> Result<Value> {
    let top_level = ctx.stack_depth() == 0;
    let mut last = Value::Nil;
    loop {
        if top_level {
            ctx.clear_fault();
        }
        let form = match reader.next_form() {
            Ok(Some(form)) => form,
            Ok(None) => return Ok(last),
            Err(err) => return Err(halt(Error::Read(err), top_level)),
        };
        let scope = match env {
            Some(env) => env.clone(),
            None => ctx.registry().current().env().clone(),
        };
        match eval(&form, &scope, ctx) {
            Ok(value) => last = value,
            Err(err) => return Err(halt(err, top_level)),
        }
    }
}

fn halt(err: Error, top_level: bool) -> Error {
    if top_level {
        tracing::error!(error = %err, "evaluation halted");
    }
    err
}
