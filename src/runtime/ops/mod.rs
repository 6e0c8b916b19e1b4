//! Numeric primitives called by compiled module code
//!
//! Every function here is pure. The ones that can trap return
//! [`TrapResult`](crate::runtime::TrapResult) and raise the trap at the point
//! of violation; the rest return their result directly.
//!
//! Integer operands are taken as the signed Rust types that hold WebAssembly
//! `i32`/`i64` values. Unsigned operations reinterpret the bits.

pub mod bitwise;
pub mod conversion;
pub mod numeric;

pub use bitwise::*;
pub use conversion::*;
pub use numeric::*;
