// sprig-core - Namespace special forms
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Namespace special forms: ns, require, use. Also file loading.
//!
//! `require` maps a dotted namespace symbol to a relative path (`a.b.c`
//! becomes `a/b/c.sprig`) and searches the requiring file's directory (or
//! the working directory), then each load path. A file is loaded at most
//! once per runtime.

use std::path::{Path, PathBuf};

use sprig_reader::{Symbol, Value, read_file};

use super::apply::with_frame;
use super::evaluate_stream;
use crate::context::Context;
use crate::env::Env;
use crate::error::{Error, Result};
use crate::namespace::Namespace;

/// Extension of sprig source files.
pub const SOURCE_EXTENSION: &str = "sprig";

/// What a require spec loads.
#[derive(Debug, Clone)]
enum Target {
    Namespace(Symbol),
    Path(String),
}

#[derive(Debug, Clone)]
enum Refer {
    All,
    Only(Vec<String>),
}

/// A parsed require spec: `sym`, `"path"` or `[sym :as a :refer [...]]`.
#[derive(Debug, Clone)]
struct RequireSpec {
    target: Target,
    alias: Option<String>,
    refer: Option<Refer>,
}

/// (ns name doc? (:require spec...)* (:use spec...)*)
pub(crate) fn eval_ns(args: &[Value], form: &Value, env: &Env, ctx: &Context) -> Result<Value> {
    let Some(Value::Symbol(name)) = args.first() else {
        return Err(Error::syntax("ns", "requires a symbol name"));
    };
    let registry = ctx.registry();
    let ns = registry.intern(&name.to_string());
    registry.set_current(&ns);

    let mut clauses = &args[1..];
    if let Some(Value::String(doc)) = clauses.first() {
        ns.set_doc(doc.to_string());
        clauses = &clauses[1..];
    }
    for clause in clauses {
        let items = super::list_items(clause);
        let Some((Value::Keyword(kind), specs)) = items.split_first() else {
            return Err(Error::syntax(
                "ns",
                format!("expected (:require ...) or (:use ...), got {}", clause),
            ));
        };
        match kind.name() {
            "require" => require_all(specs, false, form, env, ctx)?,
            "use" => require_all(specs, true, form, env, ctx)?,
            other => {
                return Err(Error::syntax("ns", format!("unknown clause :{}", other)));
            }
        }
    }
    Ok(Value::Nil)
}

/// (require spec...)
pub(crate) fn eval_require(args: &[Value], form: &Value, env: &Env, ctx: &Context) -> Result<Value> {
    if args.is_empty() {
        return Err(Error::syntax("require", "requires at least 1 argument"));
    }
    require_all(args, false, form, env, ctx)?;
    Ok(Value::Nil)
}

/// (use spec...) - require, then refer every public name
pub(crate) fn eval_use(args: &[Value], form: &Value, env: &Env, ctx: &Context) -> Result<Value> {
    if args.is_empty() {
        return Err(Error::syntax("use", "requires at least 1 argument"));
    }
    require_all(args, true, form, env, ctx)?;
    Ok(Value::Nil)
}

fn require_all(specs: &[Value], refer_all: bool, form: &Value, env: &Env, ctx: &Context) -> Result<()> {
    for spec in specs {
        let mut spec = parse_spec(spec)?;
        if refer_all {
            spec.refer = Some(Refer::All);
        }
        with_frame(form, env, ctx, || require(&spec, ctx))?;
    }
    Ok(())
}

fn unquote(value: &Value) -> &Value {
    match value {
        Value::List(items, _) if items.len() == 2 && value.is_form("quote") => &items[1],
        other => other,
    }
}

fn parse_spec(value: &Value) -> Result<RequireSpec> {
    let plain = |target| RequireSpec {
        target,
        alias: None,
        refer: None,
    };
    match unquote(value) {
        Value::Symbol(sym) => Ok(plain(Target::Namespace(sym.clone()))),
        Value::String(path) => Ok(plain(Target::Path(path.to_string()))),
        Value::Vector(items) => {
            let items: Vec<Value> = items.iter().cloned().collect();
            let mut spec = match items.first() {
                Some(Value::Symbol(sym)) => plain(Target::Namespace(sym.clone())),
                Some(Value::String(path)) => plain(Target::Path(path.to_string())),
                _ => return Err(Error::syntax("require", "spec must start with a namespace")),
            };
            for option in items[1..].chunks(2) {
                match option {
                    [Value::Keyword(kw), Value::Symbol(alias)] if kw.name() == "as" => {
                        spec.alias = Some(alias.name().to_string());
                    }
                    [Value::Keyword(kw), Value::Keyword(all)]
                        if kw.name() == "refer" && all.name() == "all" =>
                    {
                        spec.refer = Some(Refer::All);
                    }
                    [Value::Keyword(kw), Value::Vector(names)] if kw.name() == "refer" => {
                        let names = names
                            .iter()
                            .map(|name| match name {
                                Value::Symbol(sym) => Ok(sym.name().to_string()),
                                other => Err(Error::syntax(
                                    "require",
                                    format!(":refer names must be symbols, got {}", other),
                                )),
                            })
                            .collect::<Result<Vec<_>>>()?;
                        spec.refer = Some(Refer::Only(names));
                    }
                    other => {
                        return Err(Error::syntax(
                            "require",
                            format!("unknown option {}", Value::vector(other.to_vec())),
                        ));
                    }
                }
            }
            Ok(spec)
        }
        other => Err(Error::syntax(
            "require",
            format!("expected a symbol, string or vector spec, got {}", other),
        )),
    }
}

fn require(spec: &RequireSpec, ctx: &Context) -> Result<()> {
    let registry = ctx.registry();
    let relative = match &spec.target {
        Target::Namespace(sym) => {
            PathBuf::from(sym.to_string().replace('.', "/")).with_extension(SOURCE_EXTENSION)
        }
        Target::Path(path) => {
            let path = PathBuf::from(path);
            if path.extension().is_some() {
                path
            } else {
                path.with_extension(SOURCE_EXTENSION)
            }
        }
    };

    let target = match find_source(&relative, ctx) {
        Some(path) => match registry.loaded_ns(&path) {
            Some(ns) => ns,
            None => load(&path, ctx)?.1,
        },
        None => match &spec.target {
            Target::Namespace(sym) => registry.find(&sym.to_string()).ok_or_else(|| Error::Io {
                path: relative.display().to_string(),
                message: format!("no source for namespace {} on the load path", sym),
            })?,
            Target::Path(_) => {
                return Err(Error::Io {
                    path: relative.display().to_string(),
                    message: "file not found".to_string(),
                });
            }
        },
    };
    // A namespace spec names the namespace to bind, whatever the file did
    let target = match &spec.target {
        Target::Namespace(sym) => registry.find(&sym.to_string()).unwrap_or(target),
        Target::Path(_) => target,
    };

    let current = registry.current();
    if let Some(alias) = &spec.alias {
        current.alias(alias, &target);
    }
    match &spec.refer {
        Some(Refer::All) => {
            current.refer(&target, |_| true);
        }
        Some(Refer::Only(names)) => refer_only(&current, &target, names)?,
        None => {}
    }
    Ok(())
}

fn refer_only(current: &Namespace, target: &Namespace, names: &[String]) -> Result<()> {
    for name in names {
        match target.find_var(name) {
            Some(var) if var.is_private() => {
                return Err(Error::EvalError(format!(
                    "{}/{} is not public",
                    target.name(),
                    name
                )));
            }
            Some(_) => {}
            None => {
                return Err(Error::UndefinedVariable(Symbol::qualified(
                    target.name().name(),
                    name,
                )));
            }
        }
    }
    current.refer(target, |name| names.iter().any(|n| n == name));
    Ok(())
}

/// Canonical path of the first existing candidate for `relative`.
fn find_source(relative: &Path, ctx: &Context) -> Option<PathBuf> {
    if relative.is_absolute() {
        return relative.canonicalize().ok();
    }
    let source = ctx.source();
    let source = Path::new(&*source);
    let base = if source.is_file() {
        source.parent().map(Path::to_path_buf)
    } else {
        std::env::current_dir().ok()
    };
    base.into_iter()
        .chain(ctx.registry().load_paths())
        .map(|dir| dir.join(relative))
        .find(|candidate| candidate.is_file())
        .and_then(|found| found.canonicalize().ok())
}

/// Load `path` once per runtime; later calls return nil without
/// evaluating the file again.
pub fn load_file(path: &Path, ctx: &Context) -> Result<Value> {
    let canonical = path.canonicalize().map_err(|e| Error::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    if ctx.registry().is_loaded(&canonical) {
        return Ok(Value::Nil);
    }
    load(&canonical, ctx).map(|(value, _)| value)
}

/// Evaluate every form of the file at `path` with the current namespace
/// and source restored afterwards. Returns the last value and the
/// namespace the file left current.
fn load(path: &Path, ctx: &Context) -> Result<(Value, Namespace)> {
    let display_path = path.display().to_string();
    let mut reader = read_file(path).map_err(|e| Error::Io {
        path: display_path.clone(),
        message: e.to_string(),
    })?;
    tracing::debug!(path = %display_path, "loading file");

    let registry = ctx.registry();
    let previous_ns = registry.current();
    registry.mark_loaded(path, previous_ns.name().name());
    let previous_source = ctx.set_source(&display_path);

    let result = evaluate_stream(&mut reader, None, ctx);

    let loaded_ns = registry.current();
    registry.mark_loaded(path, loaded_ns.name().name());
    ctx.set_source(&previous_source);
    registry.set_current(&previous_ns);
    result.map(|value| (value, loaded_ns))
}
