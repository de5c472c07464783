// sprig-core - Higher-order built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Higher-order functions: apply, map, filter, reduce

use sprig_reader::Value;

use super::to_seq;
use crate::context::Context;
use crate::error::{Error, Result, check_arity, check_arity_at_least, check_arity_range};
use crate::eval::apply;

/// (apply f arg... coll) - call `f` with `arg...` followed by the elements
/// of `coll`
pub(crate) fn builtin_apply(ctx: &Context, args: &[Value]) -> Result<Value> {
    check_arity_at_least("apply", args, 2)?;
    let Some((coll, fixed)) = args[1..].split_last() else {
        return Err(Error::arity_at_least("apply", 2, args.len()));
    };
    let mut call_args = fixed.to_vec();
    call_args.extend(to_seq("apply", coll)?);
    apply(&args[0], &call_args, ctx)
}

/// (map f coll...) - stops at the shortest collection
pub(crate) fn builtin_map(ctx: &Context, args: &[Value]) -> Result<Value> {
    check_arity_at_least("map", args, 2)?;
    let func = &args[0];
    let colls = args[1..]
        .iter()
        .map(|coll| to_seq("map", coll))
        .collect::<Result<Vec<_>>>()?;
    let len = colls.iter().map(Vec::len).min().unwrap_or(0);

    let mut result = Vec::with_capacity(len);
    for i in 0..len {
        let call_args: Vec<Value> = colls.iter().map(|c| c[i].clone()).collect();
        result.push(apply(func, &call_args, ctx)?);
    }
    Ok(Value::list(result))
}

/// (filter pred coll) - elements where (pred elem) is truthy
pub(crate) fn builtin_filter(ctx: &Context, args: &[Value]) -> Result<Value> {
    check_arity("filter", args, 2)?;
    let pred = &args[0];
    let mut result = Vec::new();
    for item in to_seq("filter", &args[1])? {
        if apply(pred, std::slice::from_ref(&item), ctx)?.is_truthy() {
            result.push(item);
        }
    }
    Ok(Value::list(result))
}

/// (reduce f coll) or (reduce f init coll)
pub(crate) fn builtin_reduce(ctx: &Context, args: &[Value]) -> Result<Value> {
    check_arity_range("reduce", args, 2, 3)?;
    let func = &args[0];
    let (init, items) = if args.len() == 3 {
        (Some(args[1].clone()), to_seq("reduce", &args[2])?)
    } else {
        (None, to_seq("reduce", &args[1])?)
    };
    let mut items = items.into_iter();
    let mut acc = match init.or_else(|| items.next()) {
        Some(acc) => acc,
        // (reduce f []) calls f with no arguments
        None => return apply(func, &[], ctx),
    };
    for item in items {
        acc = apply(func, &[acc, item], ctx)?;
    }
    Ok(acc)
}
