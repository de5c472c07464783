// sprig-core - Function application
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Function application: argument evaluation, call frames, and invocation
//! of every callable kind of value.

use std::any::Any;
use std::rc::Rc;

use sprig_reader::{Lambda, NativeFn, Object, TypeDef, Value};

use super::{Outcome, eval, eval_body, list_items};
use crate::builtins::Primitive;
use crate::context::{Context, Frame};
use crate::env::Env;
use crate::error::{AritySpec, Error, Result};

/// Type alias for native function signature.
pub type NativeImpl = dyn Fn(&Context, &[Value]) -> Result<Value>;

/// `(operator arg...)`: evaluate the arguments left to right, then apply.
pub(crate) fn eval_application(form: &Value, env: &Env, ctx: &Context) -> Result<Value> {
    let items = list_items(form);
    let (head, arg_forms) = items
        .split_first()
        .ok_or_else(|| Error::Internal("empty application".into()))?;

    if let Some(primitive) = primitive_operator(head, env, ctx) {
        let args = eval_args(arg_forms, env, ctx)?;
        return with_frame(form, env, ctx, || primitive.apply(&args));
    }

    let func = eval(head, env, ctx)?;
    let args = eval_args(arg_forms, env, ctx)?;
    with_frame(form, env, ctx, || match apply(&func, &args, ctx) {
        Err(Error::NotCallable(what)) => Err(Error::NotCallable(format!("{} in {}", what, form))),
        other => other,
    })
}

/// A primitive operator named by `head`, unless user code rebinds the name.
fn primitive_operator(head: &Value, env: &Env, ctx: &Context) -> Option<Primitive> {
    let Value::Symbol(sym) = head else {
        return None;
    };
    if sym.is_qualified() {
        return None;
    }
    let primitive = Primitive::from_name(sym.name())?;
    let shadowed = env.is_defined(sym.name())
        || ctx.registry().current().find_var(sym.name()).is_some();
    (!shadowed).then_some(primitive)
}

pub(crate) fn eval_args(forms: &[Value], env: &Env, ctx: &Context) -> Result<Vec<Value>> {
    forms.iter().map(|form| eval(form, env, ctx)).collect()
}

/// Run `call` with `form` on the call stack. An error leaving the frame
/// records the stack for the trace.
pub(crate) fn with_frame<T>(
    form: &Value,
    env: &Env,
    ctx: &Context,
    call: impl FnOnce() -> Result<T>,
) -> Result<T> {
    ctx.push_frame(Frame::new(form, ctx.source(), env.scope_name()));
    let result = call();
    if result.is_err() {
        ctx.record_fault();
    }
    ctx.pop_frame();
    result
}

/// Apply a callable value to already evaluated arguments.
pub fn apply(func: &Value, args: &[Value], ctx: &Context) -> Result<Value> {
    match func {
        Value::Fn(lambda) => apply_lambda(lambda, args.to_vec(), ctx),
        Value::NativeFn(native) => apply_native(native, args, ctx),
        Value::Keyword(kw) => {
            // (:key coll) => (get coll :key)
            check_getter_arity(&kw.to_string(), args)?;
            let found = match &args[0] {
                Value::Map(map) => map.get(func).cloned(),
                Value::Object(obj) => obj.get(kw.name()),
                _ => None,
            };
            Ok(found.unwrap_or_else(|| default_arg(args)))
        }
        Value::Symbol(sym) => {
            // ('key map) => (get map 'key)
            check_getter_arity(&sym.to_string(), args)?;
            let found = match &args[0] {
                Value::Map(map) => map.get(func).cloned(),
                _ => None,
            };
            Ok(found.unwrap_or_else(|| default_arg(args)))
        }
        Value::Map(map) => {
            check_getter_arity("map", args)?;
            Ok(map.get(&args[0]).cloned().unwrap_or_else(|| default_arg(args)))
        }
        Value::Set(set) => {
            check_getter_arity("set", args)?;
            if set.contains(&args[0]) {
                Ok(args[0].clone())
            } else {
                Ok(default_arg(args))
            }
        }
        Value::Vector(items) => {
            check_getter_arity("vector", args)?;
            let index = args[0]
                .as_number()
                .ok_or_else(|| Error::type_error_in("vector lookup", "number", args[0].type_name()))?;
            match items.get(index as usize) {
                Some(item) if index >= 0.0 && index.fract() == 0.0 => Ok(item.clone()),
                _ if args.len() == 2 => Ok(args[1].clone()),
                _ => Err(Error::IndexOutOfBounds {
                    index: index as i64,
                    length: items.len(),
                }),
            }
        }
        Value::Type(def) => construct(def, args),
        other => Err(Error::NotCallable(format!(
            "{} (a {})",
            other,
            other.type_name()
        ))),
    }
}

fn check_getter_arity(name: &str, args: &[Value]) -> Result<()> {
    if args.len() == 1 || args.len() == 2 {
        Ok(())
    } else {
        Err(Error::arity_range(name, 1, 2, args.len()))
    }
}

fn default_arg(args: &[Value]) -> Value {
    args.get(1).cloned().unwrap_or(Value::Nil)
}

/// Apply a user-defined function, re-running it for each `recur`.
pub(crate) fn apply_lambda(lambda: &Lambda, mut args: Vec<Value>, ctx: &Context) -> Result<Value> {
    let captured = lambda
        .env()
        .downcast_ref::<Env>()
        .ok_or_else(|| Error::Internal("Function environment has invalid type".into()))?;
    let _guard = ctx.enter()?;
    let label = lambda.name().map(|name| name.to_string());

    loop {
        let body = lambda.select(args.len()).ok_or_else(|| {
            let arities = lambda.arities();
            Error::ArityError {
                expected: match arities.as_slice() {
                    [single] => AritySpec::from(*single),
                    _ => AritySpec::OneOf(arities),
                },
                got: args.len(),
                name: Some(label.clone().unwrap_or_else(|| "fn".to_string())),
            }
        })?;
        tracing::trace!(name = label.as_deref().unwrap_or("fn"), argc = args.len(), "applying lambda");

        let fn_env = match &label {
            Some(label) => captured.extend_named(label),
            None => captured.extend(),
        };
        if let Some(self_name) = lambda.self_name() {
            fn_env.define(self_name.name(), Value::Fn(lambda.clone()));
        }
        for (param, arg) in body.params.iter().zip(&args) {
            fn_env.define(param.name(), arg.clone());
        }
        if let Some(rest) = &body.rest {
            let rest_args = args.get(body.params.len()..).unwrap_or_default().to_vec();
            fn_env.define(rest.name(), Value::list(rest_args));
        }

        match eval_body(&body.body, &fn_env, ctx)? {
            Outcome::Value(value) => return Ok(value),
            Outcome::TailCall(next) => args = next,
        }
    }
}

/// Apply a native function.
pub(crate) fn apply_native(func: &NativeFn, args: &[Value], ctx: &Context) -> Result<Value> {
    let f = func
        .func()
        .downcast_ref::<Rc<NativeImpl>>()
        .ok_or_else(|| Error::Internal("Native function has invalid type".into()))?;
    f(ctx, args)
}

/// Create a native function value.
pub fn make_native(
    name: &str,
    func: impl Fn(&Context, &[Value]) -> Result<Value> + 'static,
) -> Value {
    let func_rc: Rc<NativeImpl> = Rc::new(func);
    let func_any: Rc<dyn Any> = Rc::new(func_rc);
    Value::NativeFn(NativeFn::new(name, func_any))
}

/// Instantiate a record type from positional field values.
pub(crate) fn construct(def: &Rc<TypeDef>, args: &[Value]) -> Result<Value> {
    let fields = def.fields.len();
    if args.len() < def.required || args.len() > fields {
        return Err(if def.required == fields {
            Error::arity_named(def.name.to_string(), fields, args.len())
        } else {
            Error::arity_range(def.name.to_string(), def.required, fields, args.len())
        });
    }
    Ok(Value::Object(Object::instance(Rc::clone(def), args.to_vec())))
}
