//! Float/integer conversions
//!
//! Trapping truncations check the source against the exact integer range
//! boundaries, written as float literals that are exactly representable
//! (powers of two, or 2^31 + 1 for f64 which has the precision). A value
//! passes if its truncation fits, so `-2147483648.9f64` is accepted for
//! i32 while `-2147483649.0` is not.

use crate::runtime::{Trap, TrapResult};

// ============================================================================
// Float to Integer Conversions (Trapping)
// ============================================================================

/// i32.trunc_f32_s
pub fn i32_trunc_f32_s(x: f32) -> TrapResult<i32> {
    if x.is_nan() {
        return Err(Trap::InvalidConversion);
    }
    if !(x >= -2147483648.0 && x < 2147483648.0) {
        return Err(Trap::IntOverflow);
    }
    Ok(x as i32)
}

/// i32.trunc_f32_u
pub fn i32_trunc_f32_u(x: f32) -> TrapResult<i32> {
    if x.is_nan() {
        return Err(Trap::InvalidConversion);
    }
    if !(x > -1.0 && x < 4294967296.0) {
        return Err(Trap::IntOverflow);
    }
    Ok(x as u32 as i32)
}

/// i32.trunc_f64_s
pub fn i32_trunc_f64_s(x: f64) -> TrapResult<i32> {
    if x.is_nan() {
        return Err(Trap::InvalidConversion);
    }
    if !(x > -2147483649.0 && x < 2147483648.0) {
        return Err(Trap::IntOverflow);
    }
    Ok(x as i32)
}

/// i32.trunc_f64_u
pub fn i32_trunc_f64_u(x: f64) -> TrapResult<i32> {
    if x.is_nan() {
        return Err(Trap::InvalidConversion);
    }
    if !(x > -1.0 && x < 4294967296.0) {
        return Err(Trap::IntOverflow);
    }
    Ok(x as u32 as i32)
}

/// i64.trunc_f32_s
pub fn i64_trunc_f32_s(x: f32) -> TrapResult<i64> {
    if x.is_nan() {
        return Err(Trap::InvalidConversion);
    }
    if !(x >= -9223372036854775808.0 && x < 9223372036854775808.0) {
        return Err(Trap::IntOverflow);
    }
    Ok(x as i64)
}

/// i64.trunc_f32_u
pub fn i64_trunc_f32_u(x: f32) -> TrapResult<i64> {
    if x.is_nan() {
        return Err(Trap::InvalidConversion);
    }
    if !(x > -1.0 && x < 18446744073709551616.0) {
        return Err(Trap::IntOverflow);
    }
    Ok(x as u64 as i64)
}

/// i64.trunc_f64_s
pub fn i64_trunc_f64_s(x: f64) -> TrapResult<i64> {
    if x.is_nan() {
        return Err(Trap::InvalidConversion);
    }
    if !(x >= -9223372036854775808.0 && x < 9223372036854775808.0) {
        return Err(Trap::IntOverflow);
    }
    Ok(x as i64)
}

/// i64.trunc_f64_u
pub fn i64_trunc_f64_u(x: f64) -> TrapResult<i64> {
    if x.is_nan() {
        return Err(Trap::InvalidConversion);
    }
    if !(x > -1.0 && x < 18446744073709551616.0) {
        return Err(Trap::IntOverflow);
    }
    Ok(x as u64 as i64)
}

// ============================================================================
// Saturating Truncation (Non-trapping)
// ============================================================================

/// i32.trunc_sat_f32_s
pub fn i32_trunc_sat_f32_s(x: f32) -> i32 {
    if x.is_nan() {
        0
    } else if x <= -2147483648.0 {
        i32::MIN
    } else if x >= 2147483648.0 {
        i32::MAX
    } else {
        x as i32
    }
}

/// i32.trunc_sat_f32_u
pub fn i32_trunc_sat_f32_u(x: f32) -> i32 {
    if x.is_nan() || x <= -1.0 {
        0
    } else if x >= 4294967296.0 {
        u32::MAX as i32
    } else {
        x as u32 as i32
    }
}

/// i32.trunc_sat_f64_s
pub fn i32_trunc_sat_f64_s(x: f64) -> i32 {
    if x.is_nan() {
        0
    } else if x <= -2147483648.0 {
        i32::MIN
    } else if x >= 2147483647.0 {
        i32::MAX
    } else {
        x as i32
    }
}

/// i32.trunc_sat_f64_u
pub fn i32_trunc_sat_f64_u(x: f64) -> i32 {
    if x.is_nan() || x <= -1.0 {
        0
    } else if x >= 4294967295.0 {
        u32::MAX as i32
    } else {
        x as u32 as i32
    }
}

/// i64.trunc_sat_f32_s
pub fn i64_trunc_sat_f32_s(x: f32) -> i64 {
    if x.is_nan() {
        0
    } else if x <= -9223372036854775808.0 {
        i64::MIN
    } else if x >= 9223372036854775808.0 {
        i64::MAX
    } else {
        x as i64
    }
}

/// i64.trunc_sat_f32_u
pub fn i64_trunc_sat_f32_u(x: f32) -> i64 {
    if x.is_nan() || x <= -1.0 {
        0
    } else if x >= 18446744073709551616.0 {
        u64::MAX as i64
    } else {
        x as u64 as i64
    }
}

/// i64.trunc_sat_f64_s
pub fn i64_trunc_sat_f64_s(x: f64) -> i64 {
    if x.is_nan() {
        0
    } else if x <= -9223372036854775808.0 {
        i64::MIN
    } else if x >= 9223372036854775808.0 {
        i64::MAX
    } else {
        x as i64
    }
}

/// i64.trunc_sat_f64_u
pub fn i64_trunc_sat_f64_u(x: f64) -> i64 {
    if x.is_nan() || x <= -1.0 {
        0
    } else if x >= 18446744073709551616.0 {
        u64::MAX as i64
    } else {
        x as u64 as i64
    }
}

// ============================================================================
// Unsigned Integer to Float Conversions
// ============================================================================

/// f32.convert_i32_u, via an exact i64 intermediate
pub fn f32_convert_i32_u(x: i32) -> f32 {
    (x as u32 as i64) as f32
}

/// f64.convert_i32_u, via an exact i64 intermediate
pub fn f64_convert_i32_u(x: i32) -> f64 {
    (x as u32 as i64) as f64
}

/// f32.convert_i64_u
///
/// Values below 2^63 convert as signed. Above that the exponent is fixed
/// (2^63 <= v < 2^64), so the float is assembled by hand: drop the implicit
/// leading bit, keep 23 mantissa bits plus one round bit, and round. A
/// carry out of the mantissa bumps the exponent, which is the right answer
/// for values that round up to 2^64.
pub fn f32_convert_i64_u(x: i64) -> f32 {
    let v = x as u64;
    if v >> 63 == 0 {
        return x as f32;
    }

    // 23 mantissa bits and the round bit
    let b = ((v << 1) >> 40) as u32;
    // Round bit set and every bit below it clear
    let halfway = v & 0xFF_FFFF_FFFF == 0x80_0000_0000;
    let round_up = if halfway { (b >> 1) & 1 } else { b & 1 };
    f32::from_bits(((b >> 1) | 0x5F00_0000) + round_up)
}

/// f64.convert_i64_u
///
/// Same construction as [`f32_convert_i64_u`] with 52 mantissa bits.
pub fn f64_convert_i64_u(x: i64) -> f64 {
    let v = x as u64;
    if v >> 63 == 0 {
        return x as f64;
    }

    let b = (v << 1) >> 11;
    let halfway = v & 0x7FF == 0x400;
    let round_up = if halfway { (b >> 1) & 1 } else { b & 1 };
    f64::from_bits(((b >> 1) | 0x43E0_0000_0000_0000) + round_up)
}
