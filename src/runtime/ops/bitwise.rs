//! Bit rotations
//!
//! The rotate count is taken modulo the operand width, so any i32/i64 count
//! is valid, including negative ones.

/// i32.rotl
pub fn i32_rotl(x: i32, count: i32) -> i32 {
    (x as u32).rotate_left(count as u32 & 31) as i32
}

/// i32.rotr
pub fn i32_rotr(x: i32, count: i32) -> i32 {
    (x as u32).rotate_right(count as u32 & 31) as i32
}

/// i64.rotl
pub fn i64_rotl(x: i64, count: i64) -> i64 {
    (x as u64).rotate_left((count & 63) as u32) as i64
}

/// i64.rotr
pub fn i64_rotr(x: i64, count: i64) -> i64 {
    (x as u64).rotate_right((count & 63) as u32) as i64
}
