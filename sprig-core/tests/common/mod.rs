// sprig-core - Shared test utilities
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Shared test utilities for sprig-core integration tests.
//!
//! # Usage
//!
//! In your test file, add:
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Available Helpers
//!
//! - [`eval_str`] - Evaluate source in a fresh runtime
//! - [`eval_all`] - Evaluate several sources in one runtime, in order
//! - [`eval_with`] - Evaluate source in an existing runtime
//! - [`new_runtime`] - Create a runtime without host globals
//!
//! # Macros
//!
//! - [`assert_eval!`] - Assert that evaluation produces the expected value
//! - [`assert_eval_err!`] - Assert that evaluation produces an error
//! - [`assert_eval_err_contains!`] - Assert that the error message contains
//!   a substring

#![allow(unused_imports)]

pub use sprig_core::{Error, Runtime, RuntimeOptions, Value};

/// Options used by every test runtime: the prelude, no host globals.
#[must_use]
pub fn test_options() -> RuntimeOptions {
    RuntimeOptions {
        host_globals: false,
        ..RuntimeOptions::default()
    }
}

/// Create a fresh runtime with the prelude loaded.
///
/// # Panics
///
/// Panics if the runtime fails to start (should never happen).
#[must_use]
pub fn new_runtime() -> Runtime {
    Runtime::with_options(test_options()).expect("Failed to start runtime")
}

/// Evaluate every form of `s` in a fresh runtime, returning the last value.
///
/// Errors are returned as their display text so tests can match on them.
#[must_use]
pub fn eval_str(s: &str) -> Result<Value, String> {
    eval_with(&new_runtime(), s)
}

/// Evaluate `s` in an existing runtime.
#[must_use]
pub fn eval_with(runtime: &Runtime, s: &str) -> Result<Value, String> {
    runtime.eval_str(s).map_err(|e| e.to_string())
}

/// Evaluate several sources in one runtime, returning the last result.
///
/// This is useful when definitions must be set up before the final
/// expression.
#[must_use]
#[allow(dead_code)]
pub fn eval_all(sources: &[&str]) -> Result<Value, String> {
    let runtime = new_runtime();
    let mut result = Value::Nil;
    for s in sources {
        result = eval_with(&runtime, s)?;
    }
    Ok(result)
}

/// Parse a sprig literal as the expected value of an assertion.
///
/// # Panics
///
/// Panics if `s` is not readable.
#[must_use]
#[allow(dead_code)]
pub fn read(s: &str) -> Value {
    sprig_reader::read_one(s).expect("Failed to read expected value")
}

/// Assert that evaluating `input` produces the expected value.
///
/// # Example
///
/// ```ignore
/// assert_eval!("(+ 1 2)", Value::int(3));
/// ```
#[macro_export]
macro_rules! assert_eval {
    ($input:expr, $expected:expr) => {
        let result = $crate::common::eval_str($input);
        assert!(
            result.is_ok(),
            "Failed to evaluate '{}': {:?}",
            $input,
            result.err()
        );
        assert_eq!(
            result.unwrap(),
            $expected,
            "Evaluation of '{}' did not match expected",
            $input
        );
    };
}

/// Assert that evaluating `input` produces an error.
///
/// # Example
///
/// ```ignore
/// assert_eval_err!("(+ 1 :not-a-number)");
/// ```
#[macro_export]
macro_rules! assert_eval_err {
    ($input:expr) => {
        let result = $crate::common::eval_str($input);
        assert!(
            result.is_err(),
            "Expected error for '{}' but got {:?}",
            $input,
            result.ok()
        );
    };
}

/// Assert that evaluating `input` fails with a message containing `needle`.
///
/// # Example
///
/// ```ignore
/// assert_eval_err_contains!("(undefined-fn)", "Undefined variable");
/// ```
#[macro_export]
macro_rules! assert_eval_err_contains {
    ($input:expr, $needle:expr) => {
        match $crate::common::eval_str($input) {
            Ok(value) => panic!("Expected error for '{}' but got {:?}", $input, value),
            Err(message) => assert!(
                message.contains($needle),
                "Error for '{}' was '{}', expected it to contain '{}'",
                $input,
                message,
                $needle
            ),
        }
    };
}
