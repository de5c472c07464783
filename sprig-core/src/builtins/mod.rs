// sprig-core - Built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Built-in functions of the default namespace `sprig.core`.

mod arithmetic;
mod atoms;
mod collections;
mod comparison;
mod datetime;
mod higher_order;
mod io;
mod patterns;
mod predicates;
mod strings;
mod system;
mod type_checks;

pub use arithmetic::Primitive;

use sprig_reader::{Meta, Value, keys, meta};

use crate::context::Context;
use crate::error::{Error, Result};
use crate::eval::make_native;
use crate::namespace::Namespace;

use arithmetic::{builtin_abs, builtin_dec, builtin_inc, builtin_max, builtin_min};
use atoms::{builtin_atom, builtin_atom_p, builtin_deref, builtin_reset, builtin_swap};
use collections::{
    builtin_assoc, builtin_concat, builtin_conj, builtin_cons, builtin_contains_p, builtin_count,
    builtin_dissoc, builtin_first, builtin_get, builtin_hash_map, builtin_hash_set, builtin_into,
    builtin_keys, builtin_last, builtin_list, builtin_next, builtin_nth, builtin_range,
    builtin_rest, builtin_reverse, builtin_second, builtin_seq, builtin_vals, builtin_vec,
    builtin_vector,
};
use comparison::{
    builtin_eq, builtin_ge, builtin_gt, builtin_identical_p, builtin_le, builtin_lt,
    builtin_not_eq,
};
use datetime::{builtin_inst_ms, builtin_now};
use higher_order::{builtin_apply, builtin_filter, builtin_map, builtin_reduce};
use io::{builtin_pr_str, builtin_print, builtin_println, builtin_prn};
use predicates::{
    builtin_coll_p, builtin_date_p, builtin_empty_p, builtin_even_p, builtin_false_p,
    builtin_fn_p, builtin_keyword_p, builtin_list_p, builtin_map_p, builtin_neg_p, builtin_nil_p,
    builtin_number_p, builtin_odd_p, builtin_pos_p, builtin_regex_p, builtin_seq_p,
    builtin_set_p, builtin_some_p, builtin_string_p, builtin_symbol_p, builtin_true_p,
    builtin_vector_p, builtin_zero_p,
};
use patterns::{builtin_re_find, builtin_re_matches, builtin_re_pattern};
use strings::{
    builtin_gensym, builtin_join, builtin_keyword, builtin_lower_case, builtin_name,
    builtin_namespace, builtin_subs, builtin_symbol, builtin_upper_case,
};
use system::{
    builtin_eval, builtin_in_ns, builtin_load_file, builtin_macroexpand, builtin_macroexpand_1,
    builtin_read_string,
};
use type_checks::{
    builtin_class, builtin_instance_p, builtin_isa_p, builtin_satisfies_p, builtin_type,
    builtin_types,
};

type Builtin = fn(&[Value]) -> Result<Value>;
type ContextBuiltin = fn(&Context, &[Value]) -> Result<Value>;

fn define(ns: &Namespace, name: &str, func: Builtin) {
    ns.define(name, make_native(name, move |_, args| func(args)), Meta::new());
}

fn define_with_context(ns: &Namespace, name: &str, func: ContextBuiltin) {
    ns.define(name, make_native(name, func), Meta::new());
}

/// Register every built-in function, and the built-in error types, in the
/// default namespace of `ctx`.
pub fn register_builtins(ctx: &Context) {
    let ns = ctx.registry().default_ns();

    // Primitive operators, usable as values too
    for primitive in Primitive::ALL {
        ns.define(
            primitive.name(),
            make_native(primitive.name(), move |_, args| primitive.apply(args)),
            Meta::new(),
        );
    }

    // Arithmetic
    define(&ns, "inc", builtin_inc);
    define(&ns, "dec", builtin_dec);
    define(&ns, "max", builtin_max);
    define(&ns, "min", builtin_min);
    define(&ns, "abs", builtin_abs);

    // Comparison
    define(&ns, "=", builtin_eq);
    define(&ns, "not=", builtin_not_eq);
    define(&ns, "<", builtin_lt);
    define(&ns, ">", builtin_gt);
    define(&ns, "<=", builtin_le);
    define(&ns, ">=", builtin_ge);
    define(&ns, "identical?", builtin_identical_p);

    // Predicates
    define(&ns, "nil?", builtin_nil_p);
    define(&ns, "some?", builtin_some_p);
    define(&ns, "true?", builtin_true_p);
    define(&ns, "false?", builtin_false_p);
    define(&ns, "number?", builtin_number_p);
    define(&ns, "string?", builtin_string_p);
    define(&ns, "symbol?", builtin_symbol_p);
    define(&ns, "keyword?", builtin_keyword_p);
    define(&ns, "list?", builtin_list_p);
    define(&ns, "vector?", builtin_vector_p);
    define(&ns, "map?", builtin_map_p);
    define(&ns, "set?", builtin_set_p);
    define(&ns, "coll?", builtin_coll_p);
    define(&ns, "seq?", builtin_seq_p);
    define(&ns, "fn?", builtin_fn_p);
    define(&ns, "empty?", builtin_empty_p);
    define(&ns, "regex?", builtin_regex_p);
    define(&ns, "date?", builtin_date_p);
    define(&ns, "zero?", builtin_zero_p);
    define(&ns, "pos?", builtin_pos_p);
    define(&ns, "neg?", builtin_neg_p);
    define(&ns, "even?", builtin_even_p);
    define(&ns, "odd?", builtin_odd_p);

    // Collections
    define(&ns, "list", builtin_list);
    define(&ns, "vector", builtin_vector);
    define(&ns, "hash-map", builtin_hash_map);
    define(&ns, "hash-set", builtin_hash_set);
    define(&ns, "vec", builtin_vec);
    define(&ns, "first", builtin_first);
    define(&ns, "second", builtin_second);
    define(&ns, "rest", builtin_rest);
    define(&ns, "next", builtin_next);
    define(&ns, "last", builtin_last);
    define(&ns, "cons", builtin_cons);
    define(&ns, "conj", builtin_conj);
    define(&ns, "concat", builtin_concat);
    define(&ns, "count", builtin_count);
    define(&ns, "nth", builtin_nth);
    define(&ns, "get", builtin_get);
    define(&ns, "assoc", builtin_assoc);
    define(&ns, "dissoc", builtin_dissoc);
    define(&ns, "keys", builtin_keys);
    define(&ns, "vals", builtin_vals);
    define(&ns, "contains?", builtin_contains_p);
    define(&ns, "reverse", builtin_reverse);
    define(&ns, "range", builtin_range);
    define(&ns, "seq", builtin_seq);
    define(&ns, "into", builtin_into);

    // Higher-order
    define_with_context(&ns, "apply", builtin_apply);
    define_with_context(&ns, "map", builtin_map);
    define_with_context(&ns, "filter", builtin_filter);
    define_with_context(&ns, "reduce", builtin_reduce);

    // Strings and symbols
    define(&ns, "name", builtin_name);
    define(&ns, "namespace", builtin_namespace);
    define(&ns, "symbol", builtin_symbol);
    define(&ns, "keyword", builtin_keyword);
    define_with_context(&ns, "gensym", builtin_gensym);
    define(&ns, "subs", builtin_subs);
    define(&ns, "join", builtin_join);
    define(&ns, "upper-case", builtin_upper_case);
    define(&ns, "lower-case", builtin_lower_case);

    // Printing
    define(&ns, "pr-str", builtin_pr_str);
    define(&ns, "prn", builtin_prn);
    define(&ns, "println", builtin_println);
    define(&ns, "print", builtin_print);

    // Types and protocols
    define(&ns, "types", builtin_types);
    define(&ns, "isa?", builtin_isa_p);
    define(&ns, "class", builtin_class);
    define(&ns, "satisfies?", builtin_satisfies_p);
    define(&ns, "instance?", builtin_instance_p);
    define(&ns, "type", builtin_type);

    // Atoms
    define(&ns, "atom", builtin_atom);
    define(&ns, "atom?", builtin_atom_p);
    define(&ns, "deref", builtin_deref);
    define(&ns, "reset!", builtin_reset);
    define_with_context(&ns, "swap!", builtin_swap);

    // Regex and dates
    define(&ns, "re-pattern", builtin_re_pattern);
    define(&ns, "re-find", builtin_re_find);
    define(&ns, "re-matches", builtin_re_matches);
    define(&ns, "now", builtin_now);
    define(&ns, "inst-ms", builtin_inst_ms);

    // Evaluation
    define_with_context(&ns, "macroexpand", builtin_macroexpand);
    define_with_context(&ns, "macroexpand-1", builtin_macroexpand_1);
    define_with_context(&ns, "eval", builtin_eval);
    define(&ns, "read-string", builtin_read_string);
    define_with_context(&ns, "in-ns", builtin_in_ns);
    define_with_context(&ns, "load-file", builtin_load_file);

    // Error types
    for def in ctx.error_types() {
        ns.define(
            def.name.name(),
            Value::Type(def.clone()),
            meta(&[(keys::TYPE, Value::Bool(true))]),
        );
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// A number argument of `name`.
pub(crate) fn require_number(name: &str, value: &Value) -> Result<f64> {
    value
        .as_number()
        .ok_or_else(|| Error::type_error_in(name, "number", value.type_name()))
}

/// An integral number argument of `name`.
pub(crate) fn require_int(name: &str, value: &Value) -> Result<i64> {
    let n = require_number(name, value)?;
    if n.fract() == 0.0 && n.is_finite() {
        Ok(n as i64)
    } else {
        Err(Error::type_error_in(name, "integer", "number"))
    }
}

/// A string argument of `name`.
pub(crate) fn require_str<'a>(name: &str, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| Error::type_error_in(name, "string", value.type_name()))
}

/// Elements of a seqable value. Maps yield `[key value]` vectors and
/// strings yield one-character strings.
pub(crate) fn to_seq(name: &str, value: &Value) -> Result<Vec<Value>> {
    match value {
        Value::Nil => Ok(Vec::new()),
        Value::List(items, _) | Value::Vector(items) => Ok(items.iter().cloned().collect()),
        Value::Set(items) => Ok(items.iter().cloned().collect()),
        Value::Map(map) => Ok(map
            .iter()
            .map(|(k, v)| Value::vector(vec![k.clone(), v.clone()]))
            .collect()),
        Value::String(s) => Ok(s.chars().map(|c| Value::string(&c.to_string())).collect()),
        other => Err(Error::type_error_in(name, "seqable", other.type_name())),
    }
}
