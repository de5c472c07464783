// sprig-reader - Reader and value model for the sprig language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # sprig-reader
//!
//! Lexer, reader and printer for sprig, plus the value model the evaluator
//! works on. Source text becomes [`Value`] forms through a [`Reader`].

pub mod callable;
pub mod json;
pub mod lexer;
pub mod object;
pub mod reader;
pub mod symbol;
pub mod value;
pub mod var;

pub use callable::{Arity, FnBody, Lambda, NativeFn};
pub use im::{OrdMap, OrdSet, Vector};
pub use json::read_json;
pub use lexer::{Lexer, Position, ReadError, Token};
pub use object::{Atom, MethodTable, Object, ProtocolDef, ProtocolMethod, TypeDef};
pub use reader::{
    Dialect, Native, Plain, Reader, read_all, read_file, read_one, read_plain, read_string,
    strip_shebang,
};
pub use symbol::{Keyword, Symbol};
pub use value::{Meta, Pattern, Value, format_number};
pub use var::{Var, keys, meta, meta_key};
