//! NaN classification and bit-exact float comparison for `.wast` assertions.
//!
//! `assert_return` compares floats by bit pattern, so `0.0` and `-0.0` differ
//! and two NaNs are equal only if their payloads match. The NaN result
//! assertions accept any sign bit: `nan:canonical` requires the canonical
//! payload, `nan:arithmetic` any payload with the quiet bit set.

/// Canonical NaN: quiet bit set, rest of the payload clear, either sign
pub fn is_canonical_nan_f32(x: f32) -> bool {
    (x.to_bits() & 0x7fff_ffff) == 0x7fc0_0000
}

/// Arithmetic NaN: exponent all ones and quiet bit set, either sign
pub fn is_arithmetic_nan_f32(x: f32) -> bool {
    (x.to_bits() & 0x7fc0_0000) == 0x7fc0_0000
}

pub fn is_canonical_nan_f64(x: f64) -> bool {
    (x.to_bits() & 0x7fff_ffff_ffff_ffff) == 0x7ff8_0000_0000_0000
}

pub fn is_arithmetic_nan_f64(x: f64) -> bool {
    (x.to_bits() & 0x7ff8_0000_0000_0000) == 0x7ff8_0000_0000_0000
}

/// Build an f32 with an all-ones exponent and the given payload bits.
///
/// Used for `nan:0x...` literals. A zero payload gives infinity.
pub fn make_nan_f32(payload: u32) -> f32 {
    f32::from_bits(payload | 0x7f80_0000)
}

/// See [`make_nan_f32`].
pub fn make_nan_f64(payload: u64) -> f64 {
    f64::from_bits(payload | 0x7ff0_0000_0000_0000)
}

/// Bit-exact equality
pub fn is_equal_f32(x: f32, y: f32) -> bool {
    x.to_bits() == y.to_bits()
}

/// Bit-exact equality
pub fn is_equal_f64(x: f64, y: f64) -> bool {
    x.to_bits() == y.to_bits()
}
