//! Support for running WebAssembly spec test scripts against translated
//! modules.
//!
//! A `.wast` script translated to Rust registers the `spectest` host module,
//! instantiates its modules against a shared [`ModuleRegistry`], and checks
//! each command's result with an [`AssertionTally`]. Float results are
//! compared by bit pattern, and NaN results are classified with the
//! predicates in [`values`].
//!
//! # Example
//!
//! ```
//! use wasm_rt::runtime::{ops, ModuleRegistry, Value};
//! use wasm_rt::wast::{register_spectest, AssertionTally};
//!
//! let mut registry = ModuleRegistry::new();
//! register_spectest(&mut registry, "spectest").unwrap();
//!
//! let mut tally = AssertionTally::new();
//! tally.assert_trap("div_s", ops::i32_div_s(1, 0));
//! tally.assert_return_value("div_s", ops::i32_div_s(7, 2).map(Value::I32), Value::I32(3));
//! tally.assert_return_canonical_nan("min", Ok(Value::F32(ops::f32_min(f32::NAN, 1.0))));
//! assert!(tally.all_passed());
//! ```
//!
//! [`ModuleRegistry`]: crate::runtime::ModuleRegistry

pub mod assert;
pub mod spectest;
pub mod values;

pub use assert::AssertionTally;
pub use spectest::{register_spectest, SPECTEST_MODULE};
pub use values::*;
