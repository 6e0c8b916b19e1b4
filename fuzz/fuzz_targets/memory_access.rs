#![no_main]

use libfuzzer_sys::fuzz_target;

use wasm_rt::runtime::{Memory, Trap, TrapKind};

// Drives a one-page memory (growable to four) with a stream of operations
// decoded from the input. No access may panic, every failure must be a Range
// trap, and an access must succeed exactly when position + offset + width
// fits in the current size.
fuzz_target!(|data: &[u8]| {
    let mut memory = match Memory::allocate(1, 4) {
        Ok(m) => m,
        Err(_) => return,
    };

    for chunk in data.chunks_exact(9) {
        let op = chunk[0];
        let position = u32::from_le_bytes([chunk[1], chunk[2], chunk[3], chunk[4]]);
        let offset = u32::from_le_bytes([chunk[5], chunk[6], chunk[7], chunk[8]]);

        let (width, result): (u64, Result<(), Trap>) = match op % 8 {
            0 => (4, memory.i32_load_at(position, offset).map(drop)),
            1 => (8, memory.i64_load_at(position, offset).map(drop)),
            2 => (1, memory.i32_load8_s_at(position, offset).map(drop)),
            3 => (2, memory.i64_load16_u_at(position, offset).map(drop)),
            4 => (4, memory.i32_store_at(position, offset, position as i32)),
            5 => (8, memory.f64_store_at(position, offset, f64::from_bits(offset as u64))),
            6 => (1, memory.i64_store8_at(position, offset, -1)),
            _ => {
                let before = memory.size();
                let grown = memory.grow((position % 3) as i32);
                assert!(grown == -1 || grown == before as i32);
                continue;
            }
        };

        let end = position as u64 + offset as u64 + width;
        let in_bounds = position as u64 + offset as u64 <= u32::MAX as u64 && end <= memory.byte_len() as u64;
        match result {
            Ok(()) => assert!(in_bounds),
            Err(trap) => {
                assert!(!in_bounds);
                assert_eq!(trap.kind(), TrapKind::Range);
            }
        }
    }
});
