// sprig-core - Date built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Dates: now, inst-ms

use chrono::Utc;
use sprig_reader::Value;

use crate::error::{Error, Result, check_arity};

/// (now) - the current instant
pub(crate) fn builtin_now(args: &[Value]) -> Result<Value> {
    check_arity("now", args, 0)?;
    Ok(Value::Date(Utc::now()))
}

/// (inst-ms date) - milliseconds since the Unix epoch
pub(crate) fn builtin_inst_ms(args: &[Value]) -> Result<Value> {
    check_arity("inst-ms", args, 1)?;
    match &args[0] {
        Value::Date(date) => Ok(Value::int(date.timestamp_millis())),
        other => Err(Error::type_error_in("inst-ms", "date", other.type_name())),
    }
}
