//! Integer division and NaN-exact float operations
//!
//! - Signed and unsigned division/remainder with WebAssembly trap rules
//! - `min`, `max`, `floor`, `ceil`, `trunc`, `nearest`, `abs`, `neg`,
//!   `copysign` for f32 and f64
//!
//! Host float routines make no promise about the NaN they return. Every float
//! operation here that can see a NaN input returns that NaN's payload with the
//! quiet bit set, so a canonical NaN in gives a canonical NaN out and any NaN
//! in gives an arithmetic NaN out. `abs`, `neg` and `copysign` are pure bit
//! operations on the sign and leave payloads untouched.

use crate::runtime::{Trap, TrapResult};

const F32_SIGN: u32 = 0x8000_0000;
const F32_QUIET: u32 = 0x0040_0000;
const F64_SIGN: u64 = 0x8000_0000_0000_0000;
const F64_QUIET: u64 = 0x0008_0000_0000_0000;

// ============================================================================
// Integer Division
// ============================================================================

/// i32.div_s
///
/// Traps on division by zero, and on `i32::MIN / -1` whose result 2^31 does
/// not fit in i32.
pub fn i32_div_s(a: i32, b: i32) -> TrapResult<i32> {
    if b == 0 {
        return Err(Trap::DivideByZero);
    }
    if a == i32::MIN && b == -1 {
        return Err(Trap::IntOverflow);
    }
    Ok(a / b)
}

/// i64.div_s
pub fn i64_div_s(a: i64, b: i64) -> TrapResult<i64> {
    if b == 0 {
        return Err(Trap::DivideByZero);
    }
    if a == i64::MIN && b == -1 {
        return Err(Trap::IntOverflow);
    }
    Ok(a / b)
}

/// i32.rem_s
///
/// `i32::MIN % -1` is 0: the remainder is representable even though the
/// quotient is not.
pub fn i32_rem_s(a: i32, b: i32) -> TrapResult<i32> {
    if b == 0 {
        return Err(Trap::DivideByZero);
    }
    Ok(a.wrapping_rem(b))
}

/// i64.rem_s
pub fn i64_rem_s(a: i64, b: i64) -> TrapResult<i64> {
    if b == 0 {
        return Err(Trap::DivideByZero);
    }
    Ok(a.wrapping_rem(b))
}

/// i32.div_u
pub fn i32_div_u(a: i32, b: i32) -> TrapResult<i32> {
    match (a as u32).checked_div(b as u32) {
        Some(q) => Ok(q as i32),
        None => Err(Trap::DivideByZero),
    }
}

/// i64.div_u
pub fn i64_div_u(a: i64, b: i64) -> TrapResult<i64> {
    match (a as u64).checked_div(b as u64) {
        Some(q) => Ok(q as i64),
        None => Err(Trap::DivideByZero),
    }
}

/// i32.rem_u
pub fn i32_rem_u(a: i32, b: i32) -> TrapResult<i32> {
    match (a as u32).checked_rem(b as u32) {
        Some(r) => Ok(r as i32),
        None => Err(Trap::DivideByZero),
    }
}

/// i64.rem_u
pub fn i64_rem_u(a: i64, b: i64) -> TrapResult<i64> {
    match (a as u64).checked_rem(b as u64) {
        Some(r) => Ok(r as i64),
        None => Err(Trap::DivideByZero),
    }
}

// ============================================================================
// f32
// ============================================================================

#[inline]
fn quiet_f32(x: f32) -> f32 {
    f32::from_bits(x.to_bits() | F32_QUIET)
}

/// f32.min
///
/// NaN if either operand is NaN; -0.0 is less than +0.0.
pub fn f32_min(a: f32, b: f32) -> f32 {
    if a.is_nan() {
        quiet_f32(a)
    } else if b.is_nan() {
        quiet_f32(b)
    } else if a == b {
        // Only differs for signed zeros
        if a.is_sign_negative() {
            a
        } else {
            b
        }
    } else {
        a.min(b)
    }
}

/// f32.max
///
/// NaN if either operand is NaN; +0.0 is greater than -0.0.
pub fn f32_max(a: f32, b: f32) -> f32 {
    if a.is_nan() {
        quiet_f32(a)
    } else if b.is_nan() {
        quiet_f32(b)
    } else if a == b {
        if a.is_sign_positive() {
            a
        } else {
            b
        }
    } else {
        a.max(b)
    }
}

pub fn f32_floor(x: f32) -> f32 {
    if x.is_nan() {
        quiet_f32(x)
    } else {
        x.floor()
    }
}

pub fn f32_ceil(x: f32) -> f32 {
    if x.is_nan() {
        quiet_f32(x)
    } else {
        x.ceil()
    }
}

pub fn f32_trunc(x: f32) -> f32 {
    if x.is_nan() {
        quiet_f32(x)
    } else {
        x.trunc()
    }
}

/// f32.nearest - round half to even
pub fn f32_nearest(x: f32) -> f32 {
    if x.is_nan() {
        quiet_f32(x)
    } else {
        x.round_ties_even()
    }
}

/// f32.abs - clears the sign bit only, NaN payload included
pub fn f32_abs(x: f32) -> f32 {
    f32::from_bits(x.to_bits() & !F32_SIGN)
}

/// f32.neg - flips the sign bit only
pub fn f32_neg(x: f32) -> f32 {
    f32::from_bits(x.to_bits() ^ F32_SIGN)
}

/// f32.copysign
pub fn f32_copysign(a: f32, b: f32) -> f32 {
    f32::from_bits((a.to_bits() & !F32_SIGN) | (b.to_bits() & F32_SIGN))
}

// ============================================================================
// f64
// ============================================================================

#[inline]
fn quiet_f64(x: f64) -> f64 {
    f64::from_bits(x.to_bits() | F64_QUIET)
}

/// f64.min
pub fn f64_min(a: f64, b: f64) -> f64 {
    if a.is_nan() {
        quiet_f64(a)
    } else if b.is_nan() {
        quiet_f64(b)
    } else if a == b {
        if a.is_sign_negative() {
            a
        } else {
            b
        }
    } else {
        a.min(b)
    }
}

/// f64.max
pub fn f64_max(a: f64, b: f64) -> f64 {
    if a.is_nan() {
        quiet_f64(a)
    } else if b.is_nan() {
        quiet_f64(b)
    } else if a == b {
        if a.is_sign_positive() {
            a
        } else {
            b
        }
    } else {
        a.max(b)
    }
}

pub fn f64_floor(x: f64) -> f64 {
    if x.is_nan() {
        quiet_f64(x)
    } else {
        x.floor()
    }
}

pub fn f64_ceil(x: f64) -> f64 {
    if x.is_nan() {
        quiet_f64(x)
    } else {
        x.ceil()
    }
}

pub fn f64_trunc(x: f64) -> f64 {
    if x.is_nan() {
        quiet_f64(x)
    } else {
        x.trunc()
    }
}

pub fn f64_nearest(x: f64) -> f64 {
    if x.is_nan() {
        quiet_f64(x)
    } else {
        x.round_ties_even()
    }
}

pub fn f64_abs(x: f64) -> f64 {
    f64::from_bits(x.to_bits() & !F64_SIGN)
}

pub fn f64_neg(x: f64) -> f64 {
    f64::from_bits(x.to_bits() ^ F64_SIGN)
}

pub fn f64_copysign(a: f64, b: f64) -> f64 {
    f64::from_bits((a.to_bits() & !F64_SIGN) | (b.to_bits() & F64_SIGN))
}
