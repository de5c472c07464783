// sprig-core - Collection built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Collection constructors, accessors and sequence operations.
//!
//! Every sequence operation returns a list; collections are persistent, so
//! `conj`, `assoc` and `dissoc` return new values and never mutate.

use sprig_reader::{Keyword, OrdMap, Value, Vector};

use super::{require_int, require_number, to_seq};
use crate::error::{Error, Result, check_arity, check_arity_at_least, check_arity_range};

// ============================================================================
// Constructors
// ============================================================================

pub(crate) fn builtin_list(args: &[Value]) -> Result<Value> {
    Ok(Value::list(args.to_vec()))
}

pub(crate) fn builtin_vector(args: &[Value]) -> Result<Value> {
    Ok(Value::vector(args.to_vec()))
}

/// (hash-map k v ...)
pub(crate) fn builtin_hash_map(args: &[Value]) -> Result<Value> {
    if args.len() % 2 != 0 {
        return Err(Error::EvalError(
            "hash-map requires an even number of arguments".into(),
        ));
    }
    Ok(Value::Map(
        args.chunks(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect(),
    ))
}

pub(crate) fn builtin_hash_set(args: &[Value]) -> Result<Value> {
    Ok(Value::set(args.to_vec()))
}

/// (vec coll)
pub(crate) fn builtin_vec(args: &[Value]) -> Result<Value> {
    check_arity("vec", args, 1)?;
    Ok(Value::vector(to_seq("vec", &args[0])?))
}

// ============================================================================
// Access
// ============================================================================

pub(crate) fn builtin_first(args: &[Value]) -> Result<Value> {
    check_arity("first", args, 1)?;
    Ok(to_seq("first", &args[0])?
        .into_iter()
        .next()
        .unwrap_or(Value::Nil))
}

pub(crate) fn builtin_second(args: &[Value]) -> Result<Value> {
    check_arity("second", args, 1)?;
    Ok(to_seq("second", &args[0])?
        .into_iter()
        .nth(1)
        .unwrap_or(Value::Nil))
}

/// (rest coll) - everything after the first element, `()` when empty
pub(crate) fn builtin_rest(args: &[Value]) -> Result<Value> {
    check_arity("rest", args, 1)?;
    let items = to_seq("rest", &args[0])?;
    Ok(Value::list(items.into_iter().skip(1).collect()))
}

/// (next coll) - like `rest`, but nil when nothing follows
pub(crate) fn builtin_next(args: &[Value]) -> Result<Value> {
    check_arity("next", args, 1)?;
    let items = to_seq("next", &args[0])?;
    if items.len() <= 1 {
        Ok(Value::Nil)
    } else {
        Ok(Value::list(items.into_iter().skip(1).collect()))
    }
}

pub(crate) fn builtin_last(args: &[Value]) -> Result<Value> {
    check_arity("last", args, 1)?;
    Ok(to_seq("last", &args[0])?.pop().unwrap_or(Value::Nil))
}

pub(crate) fn builtin_count(args: &[Value]) -> Result<Value> {
    check_arity("count", args, 1)?;
    let n = match &args[0] {
        Value::Nil => 0,
        Value::String(s) => s.chars().count(),
        Value::List(items, _) | Value::Vector(items) => items.len(),
        Value::Map(map) => map.len(),
        Value::Set(set) => set.len(),
        Value::Object(obj) => obj.entries().len(),
        other => return Err(Error::type_error_in("count", "collection", other.type_name())),
    };
    Ok(Value::int(n as i64))
}

/// (nth coll index default?)
pub(crate) fn builtin_nth(args: &[Value]) -> Result<Value> {
    check_arity_range("nth", args, 2, 3)?;
    let index = require_int("nth", &args[1])?;
    let items = match &args[0] {
        Value::List(..) | Value::Vector(_) | Value::String(_) | Value::Nil => {
            to_seq("nth", &args[0])?
        }
        other => return Err(Error::type_error_in("nth", "sequential", other.type_name())),
    };
    let found = usize::try_from(index).ok().and_then(|i| items.get(i).cloned());
    match (found, args.get(2)) {
        (Some(item), _) => Ok(item),
        (None, Some(default)) => Ok(default.clone()),
        (None, None) => Err(Error::IndexOutOfBounds {
            index,
            length: items.len(),
        }),
    }
}

/// (get coll key default?)
pub(crate) fn builtin_get(args: &[Value]) -> Result<Value> {
    check_arity_range("get", args, 2, 3)?;
    let key = &args[1];
    let found = match &args[0] {
        Value::Map(map) => map.get(key).cloned(),
        Value::Set(set) => set.contains(key).then(|| key.clone()),
        Value::Vector(items) => key
            .as_number()
            .filter(|n| *n >= 0.0 && n.fract() == 0.0)
            .and_then(|n| items.get(n as usize).cloned()),
        Value::Object(obj) => match key {
            Value::Keyword(kw) => obj.get(kw.name()),
            Value::String(s) => obj.get(s),
            _ => None,
        },
        _ => None,
    };
    Ok(found.unwrap_or_else(|| args.get(2).cloned().unwrap_or(Value::Nil)))
}

/// (contains? coll key) - key membership, index range for vectors
pub(crate) fn builtin_contains_p(args: &[Value]) -> Result<Value> {
    check_arity("contains?", args, 2)?;
    let key = &args[1];
    let found = match &args[0] {
        Value::Nil => false,
        Value::Map(map) => map.contains_key(key),
        Value::Set(set) => set.contains(key),
        Value::Vector(items) => key
            .as_number()
            .is_some_and(|n| n >= 0.0 && n.fract() == 0.0 && (n as usize) < items.len()),
        Value::Object(obj) => match key {
            Value::Keyword(kw) => obj.has(kw.name()),
            Value::String(s) => obj.has(s),
            _ => false,
        },
        other => {
            return Err(Error::type_error_in(
                "contains?",
                "associative collection",
                other.type_name(),
            ));
        }
    };
    Ok(Value::Bool(found))
}

pub(crate) fn builtin_keys(args: &[Value]) -> Result<Value> {
    check_arity("keys", args, 1)?;
    match &args[0] {
        Value::Nil => Ok(Value::Nil),
        Value::Map(map) if map.is_empty() => Ok(Value::Nil),
        Value::Map(map) => Ok(Value::list(map.keys().cloned().collect())),
        Value::Object(obj) => Ok(Value::list(
            obj.entries()
                .into_iter()
                .map(|(k, _)| Value::Keyword(Keyword::new(&k)))
                .collect(),
        )),
        other => Err(Error::type_error_in("keys", "map", other.type_name())),
    }
}

pub(crate) fn builtin_vals(args: &[Value]) -> Result<Value> {
    check_arity("vals", args, 1)?;
    match &args[0] {
        Value::Nil => Ok(Value::Nil),
        Value::Map(map) if map.is_empty() => Ok(Value::Nil),
        Value::Map(map) => Ok(Value::list(map.values().cloned().collect())),
        Value::Object(obj) => Ok(Value::list(
            obj.entries().into_iter().map(|(_, v)| v).collect(),
        )),
        other => Err(Error::type_error_in("vals", "map", other.type_name())),
    }
}

// ============================================================================
// Persistent updates
// ============================================================================

/// (cons x coll) - `x` in front of the elements of `coll`
pub(crate) fn builtin_cons(args: &[Value]) -> Result<Value> {
    check_arity("cons", args, 2)?;
    let mut items: Vector<Value> = to_seq("cons", &args[1])?.into_iter().collect();
    items.push_front(args[0].clone());
    Ok(Value::list_from(items))
}

/// (conj coll x ...) - add where the collection adds cheaply
pub(crate) fn builtin_conj(args: &[Value]) -> Result<Value> {
    check_arity_at_least("conj", args, 1)?;
    let (coll, items) = (&args[0], &args[1..]);
    conj_all(coll, items)
}

pub(crate) fn conj_all(coll: &Value, items: &[Value]) -> Result<Value> {
    match coll {
        Value::Nil => {
            let mut list = Vector::new();
            for item in items {
                list.push_front(item.clone());
            }
            Ok(Value::list_from(list))
        }
        Value::List(list, _) => {
            let mut list = list.clone();
            for item in items {
                list.push_front(item.clone());
            }
            Ok(Value::list_from(list))
        }
        Value::Vector(vector) => {
            let mut vector = vector.clone();
            vector.extend(items.iter().cloned());
            Ok(Value::Vector(vector))
        }
        Value::Set(set) => {
            let mut set = set.clone();
            set.extend(items.iter().cloned());
            Ok(Value::Set(set))
        }
        Value::Map(map) => {
            let mut map = map.clone();
            for item in items {
                match item {
                    Value::Vector(pair) if pair.len() == 2 => {
                        map.insert(pair[0].clone(), pair[1].clone());
                    }
                    Value::Map(other) => map.extend(other.clone()),
                    other => {
                        return Err(Error::type_error_in(
                            "conj",
                            "map entry or map",
                            other.type_name(),
                        ));
                    }
                }
            }
            Ok(Value::Map(map))
        }
        other => Err(Error::type_error_in("conj", "collection", other.type_name())),
    }
}

/// (concat coll ...)
pub(crate) fn builtin_concat(args: &[Value]) -> Result<Value> {
    let mut items = Vec::new();
    for coll in args {
        items.extend(to_seq("concat", coll)?);
    }
    Ok(Value::list(items))
}

/// (assoc coll k v ...)
pub(crate) fn builtin_assoc(args: &[Value]) -> Result<Value> {
    check_arity_at_least("assoc", args, 3)?;
    if args.len() % 2 != 1 {
        return Err(Error::EvalError(
            "assoc requires key/value pairs after the collection".into(),
        ));
    }
    let pairs = args[1..].chunks(2);
    match &args[0] {
        Value::Nil | Value::Map(_) => {
            let mut map = match &args[0] {
                Value::Map(map) => map.clone(),
                _ => OrdMap::new(),
            };
            for pair in pairs {
                map.insert(pair[0].clone(), pair[1].clone());
            }
            Ok(Value::Map(map))
        }
        Value::Vector(items) => {
            let mut items = items.clone();
            for pair in pairs {
                let index = require_int("assoc", &pair[0])?;
                match usize::try_from(index) {
                    Ok(i) if i < items.len() => {
                        items.set(i, pair[1].clone());
                    }
                    Ok(i) if i == items.len() => items.push_back(pair[1].clone()),
                    _ => {
                        return Err(Error::IndexOutOfBounds {
                            index,
                            length: items.len(),
                        });
                    }
                }
            }
            Ok(Value::Vector(items))
        }
        other => Err(Error::type_error_in("assoc", "map or vector", other.type_name())),
    }
}

/// (dissoc map k ...)
pub(crate) fn builtin_dissoc(args: &[Value]) -> Result<Value> {
    check_arity_at_least("dissoc", args, 1)?;
    match &args[0] {
        Value::Nil => Ok(Value::Nil),
        Value::Map(map) => {
            let mut map = map.clone();
            for key in &args[1..] {
                map.remove(key);
            }
            Ok(Value::Map(map))
        }
        other => Err(Error::type_error_in("dissoc", "map", other.type_name())),
    }
}

/// (into to from) - conj every element of `from` onto `to`
pub(crate) fn builtin_into(args: &[Value]) -> Result<Value> {
    check_arity("into", args, 2)?;
    conj_all(&args[0], &to_seq("into", &args[1])?)
}

// ============================================================================
// Sequences
// ============================================================================

pub(crate) fn builtin_reverse(args: &[Value]) -> Result<Value> {
    check_arity("reverse", args, 1)?;
    let mut items = to_seq("reverse", &args[0])?;
    items.reverse();
    Ok(Value::list(items))
}

/// (seq coll) - elements as a list, nil when empty
pub(crate) fn builtin_seq(args: &[Value]) -> Result<Value> {
    check_arity("seq", args, 1)?;
    let items = to_seq("seq", &args[0])?;
    if items.is_empty() {
        Ok(Value::Nil)
    } else {
        Ok(Value::list(items))
    }
}

/// (range end), (range start end) or (range start end step)
pub(crate) fn builtin_range(args: &[Value]) -> Result<Value> {
    check_arity_range("range", args, 1, 3)?;
    let nums = args
        .iter()
        .map(|arg| require_number("range", arg))
        .collect::<Result<Vec<_>>>()?;
    let (start, end, step) = match nums.as_slice() {
        [end] => (0.0, *end, 1.0),
        [start, end] => (*start, *end, 1.0),
        [start, end, step] => (*start, *end, *step),
        _ => return Err(Error::arity_range("range", 1, 3, nums.len())),
    };
    if step == 0.0 {
        return Err(Error::EvalError("range: step must not be zero".into()));
    }
    let mut items = Vec::new();
    let mut n = start;
    while (step > 0.0 && n < end) || (step < 0.0 && n > end) {
        items.push(Value::number(n));
        n += step;
    }
    Ok(Value::list(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(ns: &[i64]) -> Vec<Value> {
        ns.iter().copied().map(Value::int).collect()
    }

    #[test]
    fn test_conj_adds_where_cheap() {
        let list = Value::list(ints(&[1, 2]));
        assert_eq!(
            builtin_conj(&[list, Value::int(0)]).unwrap(),
            Value::list(ints(&[0, 1, 2]))
        );
        let vector = Value::vector(ints(&[1, 2]));
        assert_eq!(
            builtin_conj(&[vector, Value::int(3)]).unwrap(),
            Value::vector(ints(&[1, 2, 3]))
        );
    }

    #[test]
    fn test_rest_and_next_on_short_seqs() {
        let one = Value::vector(ints(&[1]));
        assert_eq!(builtin_rest(&[one.clone()]).unwrap(), Value::list(vec![]));
        assert_eq!(builtin_next(&[one]).unwrap(), Value::Nil);
        assert_eq!(builtin_first(&[Value::Nil]).unwrap(), Value::Nil);
    }

    #[test]
    fn test_nth_out_of_bounds() {
        let v = Value::vector(ints(&[1, 2]));
        assert!(matches!(
            builtin_nth(&[v.clone(), Value::int(5)]),
            Err(Error::IndexOutOfBounds { index: 5, length: 2 })
        ));
        assert_eq!(
            builtin_nth(&[v, Value::int(5), Value::keyword("none")]).unwrap(),
            Value::keyword("none")
        );
    }

    #[test]
    fn test_assoc_vector_append_at_end() {
        let v = Value::vector(ints(&[1]));
        assert_eq!(
            builtin_assoc(&[v, Value::int(1), Value::int(2)]).unwrap(),
            Value::vector(ints(&[1, 2]))
        );
    }

    #[test]
    fn test_range() {
        assert_eq!(builtin_range(&ints(&[3])).unwrap(), Value::list(ints(&[0, 1, 2])));
        assert_eq!(
            builtin_range(&ints(&[5, 0, -2])).unwrap(),
            Value::list(ints(&[5, 3, 1]))
        );
        assert!(builtin_range(&ints(&[0, 5, 0])).is_err());
    }

    #[test]
    fn test_into_map_from_pairs() {
        let pairs = Value::list(vec![Value::vector(vec![Value::keyword("a"), Value::int(1)])]);
        let map = builtin_into(&[Value::map(vec![]), pairs]).unwrap();
        assert_eq!(map, Value::map(vec![(Value::keyword("a"), Value::int(1))]));
    }
}
