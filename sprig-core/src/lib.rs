// sprig-core - Evaluator, environments and namespaces for sprig
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # sprig-core
//!
//! Tree-walking evaluator for sprig forms, with lexical environments, a
//! namespace registry and the built-ins of `sprig.core`. A [`Runtime`]
//! owns one independent evaluation context.

pub mod builtins;
pub mod context;
pub mod env;
pub mod error;
pub mod eval;
pub mod host;
pub mod namespace;

use std::path::{Path, PathBuf};

pub use builtins::register_builtins;
pub use context::{Context, Frame, StackTrace};
pub use env::Env;
pub use error::{Error, Result};
pub use eval::{apply, eval, evaluate_stream, macroexpand, macroexpand_1, make_native, to_exception};
pub use namespace::{DEFAULT_NS, Namespace, NamespaceRegistry, USER_NS};

// Re-export reader types for convenience
pub use sprig_reader::{Keyword, Object, Reader, Symbol, Value};

use sprig_reader::{read_file, read_json, read_string};

/// Bootstrap macros evaluated into `sprig.core`.
const PRELUDE: &str = include_str!("prelude.sprig");

/// Environment variable listing extra `require` directories.
pub const PATH_VAR: &str = "SPRIG_PATH";

/// How a [`Runtime`] is set up.
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    /// Deepest nesting of evaluation before an error is raised.
    pub max_depth: usize,
    /// Bytes of native stack evaluation may use; keep it below the stack
    /// size of the thread the runtime evaluates on.
    pub max_stack: usize,
    /// Directories searched by `require` after the requiring file's own.
    pub load_paths: Vec<PathBuf>,
    /// Evaluate the bootstrap macros.
    pub prelude: bool,
    /// Populate the `host` namespace from the process.
    pub host_globals: bool,
    /// Arguments exposed as `host/args`.
    pub args: Vec<String>,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            max_depth: context::DEFAULT_MAX_DEPTH,
            max_stack: context::DEFAULT_MAX_STACK,
            load_paths: Vec::new(),
            prelude: true,
            host_globals: true,
            args: Vec::new(),
        }
    }
}

impl RuntimeOptions {
    /// Defaults plus the load paths named by `SPRIG_PATH`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Some(paths) = std::env::var_os(PATH_VAR) {
            options.load_paths.extend(
                std::env::split_paths(&paths).filter(|path| !path.as_os_str().is_empty()),
            );
        }
        options
    }
}

/// An independent sprig runtime: a namespace registry plus the evaluation
/// context around it.
pub struct Runtime {
    ctx: Context,
}

impl Runtime {
    /// A runtime with default options.
    pub fn new() -> Result<Self> {
        Self::with_options(RuntimeOptions::default())
    }

    pub fn with_options(options: RuntimeOptions) -> Result<Self> {
        let registry = NamespaceRegistry::new();
        for path in &options.load_paths {
            registry.add_load_path(path.clone());
        }
        let ctx = Context::new(registry);
        ctx.set_max_depth(options.max_depth);
        ctx.set_max_stack(options.max_stack);
        register_builtins(&ctx);

        let runtime = Runtime { ctx };
        if options.prelude {
            runtime.load_prelude()?;
        }
        if options.host_globals {
            host::install_host(runtime.ctx.registry(), &host::host_globals(&options.args));
        }
        Ok(runtime)
    }

    fn load_prelude(&self) -> Result<()> {
        let registry = self.ctx.registry();
        let previous = registry.current();
        registry.set_current(&registry.default_ns());
        let source = self.ctx.set_source("<prelude>");

        let mut reader = read_string(PRELUDE, Some("<prelude>"));
        let result = evaluate_stream(&mut reader, None, &self.ctx);

        self.ctx.set_source(&source);
        registry.set_current(&previous);
        result.map(|_| ())
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    #[must_use]
    pub fn registry(&self) -> &NamespaceRegistry {
        self.ctx.registry()
    }

    /// The namespace new top-level forms are evaluated in.
    #[must_use]
    pub fn current_ns(&self) -> Namespace {
        self.ctx.registry().current()
    }

    /// Evaluate one form in the current namespace.
    pub fn eval(&self, form: &Value) -> Result<Value> {
        let env = self.current_ns().env().clone();
        self.eval_in(form, &env)
    }

    /// Evaluate one form in `env`.
    pub fn eval_in(&self, form: &Value, env: &Env) -> Result<Value> {
        self.ctx.clear_fault();
        eval::eval(form, env, &self.ctx)
    }

    /// Read and evaluate every form of `source`, returning the last value.
    pub fn eval_str(&self, source: &str) -> Result<Value> {
        let mut reader = read_string(source, Some("<string>"));
        self.eval_stream(&mut reader)
    }

    /// Evaluate every form of `reader` in whichever namespace is current.
    pub fn eval_stream(&self, reader: &mut Reader) -> Result<Value> {
        evaluate_stream(reader, None, &self.ctx)
    }

    /// Evaluate a file as a script. Unlike `load-file`, the file is run
    /// even when it has been loaded before.
    pub fn run_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let mut reader = read_file(path).map_err(|e| Error::Io {
            path: display.clone(),
            message: e.to_string(),
        })?;
        let previous = self.ctx.set_source(&display);
        let result = self.eval_stream(&mut reader);
        self.ctx.set_source(&previous);
        result
    }

    /// Load a file once per runtime, as `load-file` does.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        eval::load_file(path.as_ref(), &self.ctx)
    }

    /// Evaluate host data decoded from JSON, treating it as code.
    pub fn eval_json(&self, json: &serde_json::Value) -> Result<Value> {
        self.eval(&read_json(json))
    }

    /// Call trace of the most recent uncaught error.
    #[must_use]
    pub fn last_trace(&self) -> StackTrace {
        self.ctx.last_trace()
    }

    /// Import the properties of `host` into the namespace `name`.
    pub fn import_host_module(&self, name: &str, host: &Object) -> Namespace {
        let ns = self.registry().intern(name);
        ns.import_host(host);
        ns
    }

    /// Project the public definitions of namespace `name` into `root`.
    #[must_use]
    pub fn export(&self, name: &str, root: &Object) -> Option<Object> {
        self.registry().find(name).map(|ns| ns.export(root))
    }
}
