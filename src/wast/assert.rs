//! Pass/fail bookkeeping for spec-test assertions.
//!
//! Each `assert_*` method takes the already-evaluated result of an
//! invocation, counts it as run, and counts it as passed if it matches the
//! expectation. Failures are logged at `error` level with the assertion name
//! and are never fatal, so a whole script runs to the end and the caller
//! decides what to do with [`AssertionTally::all_passed`].

use super::values::{is_arithmetic_nan_f32, is_arithmetic_nan_f64, is_canonical_nan_f32, is_canonical_nan_f64};
use crate::runtime::{Trap, TrapResult, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssertionTally {
    run: u32,
    passed: u32,
}

impl AssertionTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(&self) -> u32 {
        self.run
    }

    pub fn passed(&self) -> u32 {
        self.passed
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.run
    }

    fn record(&mut self, ok: bool) -> bool {
        self.run += 1;
        if ok {
            self.passed += 1;
        }
        ok
    }

    /// Expect any trap
    pub fn assert_trap<T: fmt::Debug>(&mut self, name: &str, result: TrapResult<T>) -> bool {
        match result {
            Err(trap) => {
                tracing::trace!(name, %trap, "trapped as expected");
                self.record(true)
            }
            Ok(value) => {
                tracing::error!(name, ?value, "expected {name} to trap");
                self.record(false)
            }
        }
    }

    /// Expect an exhaustion trap; any other trap is a failure
    pub fn assert_exhaustion<T: fmt::Debug>(&mut self, name: &str, result: TrapResult<T>) -> bool {
        match result {
            Err(trap) if trap.is_exhaustion() => self.record(true),
            Err(trap) => {
                tracing::error!(name, %trap, "expected {name} to trap due to exhaustion");
                self.record(false)
            }
            Ok(value) => {
                tracing::error!(name, ?value, "expected {name} to trap");
                self.record(false)
            }
        }
    }

    /// Expect no trap, ignoring any returned values
    pub fn assert_return<T>(&mut self, name: &str, result: TrapResult<T>) -> bool {
        match result {
            Ok(_) => self.record(true),
            Err(trap) => self.trapped(name, &trap),
        }
    }

    /// Expect exactly `expected`, comparing floats bit for bit
    pub fn assert_return_value(&mut self, name: &str, result: TrapResult<Value>, expected: Value) -> bool {
        match result {
            Ok(value) if value == expected => self.record(true),
            Ok(value) => {
                tracing::error!(name, "in {name}: expected {expected}, got {value}");
                self.record(false)
            }
            Err(trap) => self.trapped(name, &trap),
        }
    }

    /// Expect a canonical NaN of either float type
    pub fn assert_return_canonical_nan(&mut self, name: &str, result: TrapResult<Value>) -> bool {
        self.assert_nan(name, result, "canonical", is_canonical_nan_f32, is_canonical_nan_f64)
    }

    /// Expect an arithmetic (quiet) NaN of either float type
    pub fn assert_return_arithmetic_nan(&mut self, name: &str, result: TrapResult<Value>) -> bool {
        self.assert_nan(name, result, "arithmetic", is_arithmetic_nan_f32, is_arithmetic_nan_f64)
    }

    fn assert_nan(
        &mut self,
        name: &str,
        result: TrapResult<Value>,
        nan: &str,
        check_f32: fn(f32) -> bool,
        check_f64: fn(f64) -> bool,
    ) -> bool {
        let value = match result {
            Ok(value) => value,
            Err(trap) => return self.trapped(name, &trap),
        };
        let ok = match value {
            Value::F32(x) => check_f32(x),
            Value::F64(x) => check_f64(x),
            Value::I32(_) | Value::I64(_) => false,
        };
        if !ok {
            tracing::error!(name, "in {name}: expected {nan} nan, got {value}");
        }
        self.record(ok)
    }

    fn trapped(&mut self, name: &str, trap: &Trap) -> bool {
        tracing::error!(name, %trap, "{name} trapped");
        self.record(false)
    }
}

impl fmt::Display for AssertionTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} tests passed.", self.passed, self.run)
    }
}
