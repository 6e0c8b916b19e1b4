//! WebAssembly linear memory implementation
//!
//! Linear memory is a zero-initialised byte buffer sized in whole pages.
//! Compiled code addresses it with a 32-bit `position` plus a 32-bit static
//! `offset`; both are unsigned and their sum is computed in 64 bits so that
//! an access like `position = 0xFFFF_FFFF, offset = 1` traps instead of
//! wrapping around to address zero.
//!
//! Memory layout follows the WebAssembly specification:
//! - Page size: 64KB (65,536 bytes)
//! - Address space: 32-bit (max 65,536 pages, 4GB)
//! - Byte order: little-endian for every multi-byte access
//! - Out-of-bounds access: traps with [`Trap::Range`]
//!
//! Growth reallocates the buffer, so callers must not hold slices into a
//! memory across a call to [`Memory::grow`]. Shared memories are handed out
//! as [`SharedMemory`] and re-borrowed for each access.

use super::{LinkError, RangeCause, Trap, TrapResult};
use byteorder::{ByteOrder, LittleEndian};
use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

/// WebAssembly page size in bytes (64KB)
pub const PAGE_SIZE: usize = 65536;

/// Maximum number of pages (2^16 = 64K pages = 4GB total)
pub const MAX_PAGES: u32 = 65536;

/// Maximum memory size in bytes (4GB)
pub const MAX_MEMORY_SIZE: usize = MAX_PAGES as usize * PAGE_SIZE;

/// Memory shared between an exporting and an importing module.
///
/// Uses Rc<RefCell<>> since a memory is only ever touched from the thread
/// running the owning module. Both modules see every write.
pub type SharedMemory = Rc<RefCell<Memory>>;

/// A WebAssembly linear memory instance
#[derive(Debug)]
pub struct Memory {
    /// Buffer length is always a multiple of PAGE_SIZE
    data: Vec<u8>,

    /// Growth ceiling fixed at allocation, never above MAX_PAGES
    max_pages: u32,
}

impl Memory {
    /// Allocate a zero-filled memory of `initial_pages` pages
    ///
    /// # Errors
    /// - `max_pages` exceeds the 65536 page ceiling
    /// - `initial_pages` exceeds `max_pages`
    /// - the host refuses the initial allocation
    pub fn allocate(initial_pages: u32, max_pages: u32) -> Result<Self, LinkError> {
        if max_pages > MAX_PAGES {
            return Err(LinkError::InvalidLimits(format!(
                "Maximum size {max_pages} pages exceeds system maximum {MAX_PAGES} pages"
            )));
        }
        if initial_pages > max_pages {
            return Err(LinkError::InvalidLimits(format!(
                "Initial size {initial_pages} pages exceeds specified maximum {max_pages} pages"
            )));
        }

        let len = initial_pages as usize * PAGE_SIZE;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| {
            LinkError::InvalidLimits(format!("Initial size {initial_pages} pages could not be allocated"))
        })?;
        data.resize(len, 0);

        Ok(Memory { data, max_pages })
    }

    /// Wrap this memory for sharing through the module registry
    pub fn into_shared(self) -> SharedMemory {
        Rc::new(RefCell::new(self))
    }

    /// Current size in pages
    pub fn size(&self) -> u32 {
        (self.data.len() / PAGE_SIZE) as u32
    }

    /// Maximum size in pages
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Current size in bytes
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Grow memory by `additional_pages`
    ///
    /// Returns the previous size in pages, or -1 (without trapping) if the
    /// request is negative, larger than the address space, or would exceed
    /// the maximum. The old contents are kept and the new pages read as zero.
    ///
    /// Not safe to call while anything else holds a view into this memory.
    pub fn grow(&mut self, additional_pages: i32) -> i32 {
        let old_pages = self.size();

        if additional_pages < 0 || additional_pages as u32 > MAX_PAGES {
            tracing::trace!(additional_pages, "memory.grow rejected: delta out of range");
            return -1;
        }
        let new_pages = old_pages + additional_pages as u32;
        if new_pages > self.max_pages || new_pages > MAX_PAGES {
            tracing::trace!(
                old_pages,
                additional_pages,
                max_pages = self.max_pages,
                "memory.grow rejected: exceeds maximum"
            );
            return -1;
        }

        let new_len = new_pages as usize * PAGE_SIZE;
        if self.data.try_reserve_exact(new_len - self.data.len()).is_err() {
            tracing::debug!(new_pages, "memory.grow failed: allocation refused");
            return -1;
        }
        self.data.resize(new_len, 0);

        tracing::debug!(old_pages, new_pages, "memory grown");
        old_pages as i32
    }

    /// Write data-segment bytes starting at `offset`
    ///
    /// Used at instantiation time; the offset has already been validated by
    /// the caller, but a bad one still traps rather than panicking.
    pub fn put(&mut self, offset: u32, bytes: &[u8]) -> TrapResult<()> {
        let range = self.span(offset, 0, bytes.len())?;
        self.data[range].copy_from_slice(bytes);
        Ok(())
    }

    /// Compute the byte range touched by an access of `width` bytes
    ///
    /// This is the single bounds check every access goes through. The sum
    /// `position + offset` is formed in 64 bits and must itself fit in 32
    /// bits before the span is checked against the buffer.
    #[inline]
    fn span(&self, position: u32, offset: u32, width: usize) -> TrapResult<Range<usize>> {
        let address = position as u64 + offset as u64;
        if address > u32::MAX as u64 {
            return Err(Trap::Range(RangeCause::AddressOverflow { position, offset }));
        }

        let start = address as usize;
        match start.checked_add(width) {
            Some(end) if end <= self.data.len() => Ok(start..end),
            _ => Err(Trap::Range(RangeCause::OutOfBounds {
                address,
                width,
                len: self.data.len(),
            })),
        }
    }

    #[inline]
    fn bytes(&self, position: u32, offset: u32, width: usize) -> TrapResult<&[u8]> {
        let range = self.span(position, offset, width)?;
        Ok(&self.data[range])
    }

    #[inline]
    fn bytes_mut(&mut self, position: u32, offset: u32, width: usize) -> TrapResult<&mut [u8]> {
        let range = self.span(position, offset, width)?;
        Ok(&mut self.data[range])
    }

    // ------------------------------------------------------------------
    // Loads
    // ------------------------------------------------------------------

    pub fn i32_load_at(&self, position: u32, offset: u32) -> TrapResult<i32> {
        Ok(LittleEndian::read_i32(self.bytes(position, offset, 4)?))
    }

    pub fn i64_load_at(&self, position: u32, offset: u32) -> TrapResult<i64> {
        Ok(LittleEndian::read_i64(self.bytes(position, offset, 8)?))
    }

    /// Load an f32, preserving the exact bit pattern (including NaN payloads)
    pub fn f32_load_at(&self, position: u32, offset: u32) -> TrapResult<f32> {
        Ok(f32::from_bits(LittleEndian::read_u32(self.bytes(position, offset, 4)?)))
    }

    /// Load an f64, preserving the exact bit pattern (including NaN payloads)
    pub fn f64_load_at(&self, position: u32, offset: u32) -> TrapResult<f64> {
        Ok(f64::from_bits(LittleEndian::read_u64(self.bytes(position, offset, 8)?)))
    }

    pub fn i32_load8_s_at(&self, position: u32, offset: u32) -> TrapResult<i32> {
        Ok(self.bytes(position, offset, 1)?[0] as i8 as i32)
    }

    pub fn i32_load8_u_at(&self, position: u32, offset: u32) -> TrapResult<i32> {
        Ok(self.bytes(position, offset, 1)?[0] as i32)
    }

    pub fn i32_load16_s_at(&self, position: u32, offset: u32) -> TrapResult<i32> {
        Ok(LittleEndian::read_i16(self.bytes(position, offset, 2)?) as i32)
    }

    pub fn i32_load16_u_at(&self, position: u32, offset: u32) -> TrapResult<i32> {
        Ok(LittleEndian::read_u16(self.bytes(position, offset, 2)?) as i32)
    }

    pub fn i64_load8_s_at(&self, position: u32, offset: u32) -> TrapResult<i64> {
        Ok(self.bytes(position, offset, 1)?[0] as i8 as i64)
    }

    pub fn i64_load8_u_at(&self, position: u32, offset: u32) -> TrapResult<i64> {
        Ok(self.bytes(position, offset, 1)?[0] as i64)
    }

    pub fn i64_load16_s_at(&self, position: u32, offset: u32) -> TrapResult<i64> {
        Ok(LittleEndian::read_i16(self.bytes(position, offset, 2)?) as i64)
    }

    pub fn i64_load16_u_at(&self, position: u32, offset: u32) -> TrapResult<i64> {
        Ok(LittleEndian::read_u16(self.bytes(position, offset, 2)?) as i64)
    }

    pub fn i64_load32_s_at(&self, position: u32, offset: u32) -> TrapResult<i64> {
        Ok(LittleEndian::read_i32(self.bytes(position, offset, 4)?) as i64)
    }

    pub fn i64_load32_u_at(&self, position: u32, offset: u32) -> TrapResult<i64> {
        Ok(LittleEndian::read_u32(self.bytes(position, offset, 4)?) as i64)
    }

    // ------------------------------------------------------------------
    // Stores
    // ------------------------------------------------------------------

    pub fn i32_store_at(&mut self, position: u32, offset: u32, value: i32) -> TrapResult<()> {
        LittleEndian::write_i32(self.bytes_mut(position, offset, 4)?, value);
        Ok(())
    }

    pub fn i64_store_at(&mut self, position: u32, offset: u32, value: i64) -> TrapResult<()> {
        LittleEndian::write_i64(self.bytes_mut(position, offset, 8)?, value);
        Ok(())
    }

    pub fn f32_store_at(&mut self, position: u32, offset: u32, value: f32) -> TrapResult<()> {
        LittleEndian::write_u32(self.bytes_mut(position, offset, 4)?, value.to_bits());
        Ok(())
    }

    pub fn f64_store_at(&mut self, position: u32, offset: u32, value: f64) -> TrapResult<()> {
        LittleEndian::write_u64(self.bytes_mut(position, offset, 8)?, value.to_bits());
        Ok(())
    }

    pub fn i32_store8_at(&mut self, position: u32, offset: u32, value: i32) -> TrapResult<()> {
        self.bytes_mut(position, offset, 1)?[0] = value as u8;
        Ok(())
    }

    pub fn i32_store16_at(&mut self, position: u32, offset: u32, value: i32) -> TrapResult<()> {
        LittleEndian::write_u16(self.bytes_mut(position, offset, 2)?, value as u16);
        Ok(())
    }

    pub fn i64_store8_at(&mut self, position: u32, offset: u32, value: i64) -> TrapResult<()> {
        self.bytes_mut(position, offset, 1)?[0] = value as u8;
        Ok(())
    }

    pub fn i64_store16_at(&mut self, position: u32, offset: u32, value: i64) -> TrapResult<()> {
        LittleEndian::write_u16(self.bytes_mut(position, offset, 2)?, value as u16);
        Ok(())
    }

    pub fn i64_store32_at(&mut self, position: u32, offset: u32, value: i64) -> TrapResult<()> {
        LittleEndian::write_u32(self.bytes_mut(position, offset, 4)?, value as u32);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Bulk access
    // ------------------------------------------------------------------

    /// Read a slice of bytes from memory
    pub fn read_bytes(&self, position: u32, len: usize) -> TrapResult<Vec<u8>> {
        Ok(self.bytes(position, 0, len)?.to_vec())
    }

    /// Write a slice of bytes to memory
    pub fn write_bytes(&mut self, position: u32, bytes: &[u8]) -> TrapResult<()> {
        self.bytes_mut(position, 0, bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    /// `memory.fill`: set `len` bytes starting at `dst` to `value`
    pub fn fill(&mut self, dst: u32, value: u8, len: u32) -> TrapResult<()> {
        self.bytes_mut(dst, 0, len as usize)?.fill(value);
        Ok(())
    }

    /// `memory.copy`: memmove semantics, both ranges checked before copying
    pub fn copy_within(&mut self, dst: u32, src: u32, len: u32) -> TrapResult<()> {
        let src = self.span(src, 0, len as usize)?;
        let dst = self.span(dst, 0, len as usize)?;
        self.data.copy_within(src, dst.start);
        Ok(())
    }
}

/// Offset-less forms, equivalent to the `_at` form with a zero offset
macro_rules! offsetless {
    ($(load $name:ident => $at:ident -> $ty:ty;)* $(store $sname:ident => $sat:ident($vty:ty);)*) => {
        impl Memory {
            $(
                #[inline]
                pub fn $name(&self, position: u32) -> TrapResult<$ty> {
                    self.$at(position, 0)
                }
            )*
            $(
                #[inline]
                pub fn $sname(&mut self, position: u32, value: $vty) -> TrapResult<()> {
                    self.$sat(position, 0, value)
                }
            )*
        }
    };
}

offsetless! {
    load i32_load => i32_load_at -> i32;
    load i64_load => i64_load_at -> i64;
    load f32_load => f32_load_at -> f32;
    load f64_load => f64_load_at -> f64;
    load i32_load8_s => i32_load8_s_at -> i32;
    load i32_load8_u => i32_load8_u_at -> i32;
    load i32_load16_s => i32_load16_s_at -> i32;
    load i32_load16_u => i32_load16_u_at -> i32;
    load i64_load8_s => i64_load8_s_at -> i64;
    load i64_load8_u => i64_load8_u_at -> i64;
    load i64_load16_s => i64_load16_s_at -> i64;
    load i64_load16_u => i64_load16_u_at -> i64;
    load i64_load32_s => i64_load32_s_at -> i64;
    load i64_load32_u => i64_load32_u_at -> i64;
    store i32_store => i32_store_at(i32);
    store i64_store => i64_store_at(i64);
    store f32_store => f32_store_at(f32);
    store f64_store => f64_store_at(f64);
    store i32_store8 => i32_store8_at(i32);
    store i32_store16 => i32_store16_at(i32);
    store i64_store8 => i64_store8_at(i64);
    store i64_store16 => i64_store16_at(i64);
    store i64_store32 => i64_store32_at(i64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::rstest;

    const PAGE: u32 = PAGE_SIZE as u32;

    fn is_range(result: TrapResult<impl std::fmt::Debug>) -> bool {
        matches!(result, Err(Trap::Range(_)))
    }

    #[test]
    fn test_memory_creation() {
        let mem = Memory::allocate(1, 10).unwrap();
        assert_eq!(mem.size(), 1);
        assert_eq!(mem.byte_len(), PAGE_SIZE);
        assert_eq!(mem.max_pages(), 10);

        let mem = Memory::allocate(0, 0).unwrap();
        assert_eq!(mem.size(), 0);
        assert!(is_range(mem.i32_load8_u(0)));
    }

    #[test]
    fn test_memory_creation_errors() {
        // Initial exceeds max
        assert!(matches!(Memory::allocate(10, 5), Err(LinkError::InvalidLimits(_))));

        // Max exceeds system max
        assert!(matches!(
            Memory::allocate(1, MAX_PAGES + 1),
            Err(LinkError::InvalidLimits(_))
        ));
    }

    #[test]
    fn test_memory_grow() {
        let mut mem = Memory::allocate(1, 10).unwrap();

        assert_eq!(mem.grow(2), 1); // Returns previous size
        assert_eq!(mem.size(), 3);
        assert_eq!(mem.byte_len(), 3 * PAGE_SIZE);

        assert_eq!(mem.grow(0), 3);
        assert_eq!(mem.grow(7), 3);
        assert_eq!(mem.size(), 10);

        // Attempt to grow beyond max
        assert_eq!(mem.grow(1), -1);
        assert_eq!(mem.size(), 10);
    }

    #[rstest]
    #[case(-1)]
    #[case(i32::MIN)]
    #[case(65537)]
    #[case(i32::MAX)]
    fn test_memory_grow_rejects_delta(#[case] delta: i32) {
        let mut mem = Memory::allocate(1, MAX_PAGES).unwrap();
        mem.i32_store(0, 0x1234).unwrap();

        assert_eq!(mem.grow(delta), -1);
        assert_eq!(mem.size(), 1);
        assert_eq!(mem.i32_load(0).unwrap(), 0x1234);
    }

    #[test]
    fn test_memory_grow_absolute_ceiling() {
        let mut mem = Memory::allocate(1, MAX_PAGES).unwrap();
        // 1 + 65536 is over the 4GB ceiling even though the delta alone is not
        assert_eq!(mem.grow(MAX_PAGES as i32), -1);
        assert_eq!(mem.size(), 1);
    }

    #[test]
    fn test_grow_preserves_and_zeroes() {
        let mut mem = Memory::allocate(1, 4).unwrap();
        mem.i32_store(0, 0xDEADBEEFu32 as i32).unwrap();
        mem.i64_store(PAGE - 8, -1).unwrap();

        assert_eq!(mem.grow(1), 1);

        assert_eq!(mem.i32_load(0).unwrap(), 0xDEADBEEFu32 as i32);
        assert_eq!(mem.i64_load(PAGE - 8).unwrap(), -1);
        let new_page = mem.read_bytes(PAGE, PAGE_SIZE).unwrap();
        assert!(new_page.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_zero_initialisation() {
        let mem = Memory::allocate(2, 2).unwrap();
        for i in 0..100 {
            assert_eq!(mem.i32_load8_u(i).unwrap(), 0);
        }
        assert_eq!(mem.i32_load8_u(2 * PAGE - 1).unwrap(), 0);
    }

    #[test]
    fn test_allocation_is_sized_to_initial_pages() {
        // (memory 0 65536) reserves nothing up front
        let mem = Memory::allocate(0, MAX_PAGES).unwrap();
        assert_eq!(mem.byte_len(), 0);
        assert_eq!(mem.max_pages(), MAX_PAGES);

        let mem = Memory::allocate(16, MAX_PAGES).unwrap();
        assert_eq!(mem.size(), 16);
        assert_eq!(mem.byte_len(), 16 * PAGE_SIZE);
        assert_eq!(mem.i64_load(16 * PAGE - 8).unwrap(), 0);
        assert!(is_range(mem.i32_load8_u(16 * PAGE)));
    }

    #[test]
    fn test_little_endian_layout() {
        let mut mem = Memory::allocate(1, 1).unwrap();

        mem.i32_store(100, 0x12345678).unwrap();
        assert_eq!(mem.read_bytes(100, 4).unwrap(), vec![0x78, 0x56, 0x34, 0x12]);

        mem.i64_store(200, 0x0102030405060708).unwrap();
        assert_eq!(
            mem.read_bytes(200, 8).unwrap(),
            vec![0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]
        );

        mem.write_bytes(300, &[0x00, 0x00, 0x80, 0x3f]).unwrap();
        assert_eq!(mem.f32_load(300).unwrap(), 1.0);
    }

    #[test]
    fn test_sign_and_zero_extension() {
        let mut mem = Memory::allocate(1, 1).unwrap();
        mem.write_bytes(0, &[0xFF, 0xFF, 0xFF, 0xFF]).unwrap();

        assert_eq!(mem.i32_load8_s(0).unwrap(), -1);
        assert_eq!(mem.i32_load8_u(0).unwrap(), 0xFF);
        assert_eq!(mem.i32_load16_s(0).unwrap(), -1);
        assert_eq!(mem.i32_load16_u(0).unwrap(), 0xFFFF);
        assert_eq!(mem.i64_load8_s(0).unwrap(), -1);
        assert_eq!(mem.i64_load8_u(0).unwrap(), 0xFF);
        assert_eq!(mem.i64_load16_s(0).unwrap(), -1);
        assert_eq!(mem.i64_load16_u(0).unwrap(), 0xFFFF);
        assert_eq!(mem.i64_load32_s(0).unwrap(), -1);
        assert_eq!(mem.i64_load32_u(0).unwrap(), 0xFFFF_FFFF);
    }

    #[test]
    fn test_narrow_stores_truncate() {
        let mut mem = Memory::allocate(1, 1).unwrap();
        mem.i64_store(0, 0).unwrap();

        mem.i32_store8(0, 0x1234_5678).unwrap();
        assert_eq!(mem.i64_load(0).unwrap(), 0x78);

        mem.i32_store16(0, 0x1234_5678).unwrap();
        assert_eq!(mem.i64_load(0).unwrap(), 0x5678);

        mem.i64_store32(0, 0x1122_3344_5566_7788).unwrap();
        assert_eq!(mem.i64_load(0).unwrap(), 0x5566_7788);

        mem.i64_store16(4, -1).unwrap();
        mem.i64_store8(6, 0x7F).unwrap();
        assert_eq!(mem.i64_load(0).unwrap(), 0x007F_FFFF_5566_7788);
    }

    #[test]
    fn test_float_bits_preserved() {
        let mut mem = Memory::allocate(1, 1).unwrap();

        let nan32 = f32::from_bits(0xFFA0_0001);
        mem.f32_store(0, nan32).unwrap();
        assert_eq!(mem.f32_load(0).unwrap().to_bits(), 0xFFA0_0001);

        let nan64 = f64::from_bits(0x7FF4_0000_0000_0001);
        mem.f64_store(8, nan64).unwrap();
        assert_eq!(mem.f64_load(8).unwrap().to_bits(), 0x7FF4_0000_0000_0001);

        mem.f64_store(16, -0.0).unwrap();
        assert!(mem.f64_load(16).unwrap().is_sign_negative());
    }

    #[test]
    fn test_offset_is_added() {
        let mut mem = Memory::allocate(1, 1).unwrap();
        mem.i32_store_at(10, 6, 99).unwrap();
        assert_eq!(mem.i32_load(16).unwrap(), 99);
        assert_eq!(mem.i32_load_at(0, 16).unwrap(), 99);
        assert_eq!(mem.i32_load_at(16, 0).unwrap(), 99);
    }

    #[rstest]
    #[case(PAGE - 1, 0, 1, true)]
    #[case(PAGE, 0, 1, false)]
    #[case(PAGE - 4, 0, 4, true)]
    #[case(PAGE - 3, 0, 4, false)]
    #[case(PAGE - 8, 0, 8, true)]
    #[case(PAGE - 7, 0, 8, false)]
    #[case(PAGE - 9, 1, 8, true)]
    #[case(PAGE - 8, 1, 8, false)]
    fn test_bounds_at_buffer_end(
        #[case] position: u32,
        #[case] offset: u32,
        #[case] width: usize,
        #[case] ok: bool,
    ) {
        let mut mem = Memory::allocate(1, 1).unwrap();
        let (load, store) = match width {
            1 => (
                mem.i32_load8_u_at(position, offset).map(|_| ()),
                mem.i32_store8_at(position, offset, 1),
            ),
            4 => (
                mem.i32_load_at(position, offset).map(|_| ()),
                mem.i32_store_at(position, offset, 1),
            ),
            _ => (
                mem.i64_load_at(position, offset).map(|_| ()),
                mem.i64_store_at(position, offset, 1),
            ),
        };
        assert_eq!(load.is_ok(), ok);
        assert_eq!(store.is_ok(), ok);
    }

    #[rstest]
    #[case(u32::MAX, 1)]
    #[case(1, u32::MAX)]
    #[case(u32::MAX, u32::MAX)]
    #[case(0x8000_0000, 0x8000_0000)]
    fn test_address_overflow_traps(#[case] position: u32, #[case] offset: u32) {
        let mut mem = Memory::allocate(1, 1).unwrap();

        let err = mem.i32_load8_u_at(position, offset).unwrap_err();
        assert_eq!(err, Trap::Range(RangeCause::AddressOverflow { position, offset }));
        assert!(is_range(mem.i64_store_at(position, offset, 0)));
        assert!(is_range(mem.f64_load_at(position, offset)));
    }

    #[test]
    fn test_out_of_bounds_cause() {
        let mem = Memory::allocate(1, 1).unwrap();
        assert_eq!(
            mem.i32_load(PAGE - 2).unwrap_err(),
            Trap::Range(RangeCause::OutOfBounds {
                address: (PAGE - 2) as u64,
                width: 4,
                len: PAGE_SIZE,
            })
        );
    }

    #[test]
    fn test_random_round_trips() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut mem = Memory::allocate(1, 1).unwrap();

        for _ in 0..1000 {
            let offset = rng.gen_range(0..64u32);
            let position = rng.gen_range(0..PAGE - 8 - offset);
            let v: i64 = rng.gen();

            mem.i64_store_at(position, offset, v).unwrap();
            assert_eq!(mem.i64_load_at(position, offset).unwrap(), v);

            mem.i32_store16_at(position, offset, v as i32).unwrap();
            assert_eq!(mem.i32_load16_s_at(position, offset).unwrap(), v as i16 as i32);
            assert_eq!(mem.i32_load16_u_at(position, offset).unwrap(), v as u16 as i32);

            mem.i64_store32_at(position, offset, v).unwrap();
            assert_eq!(mem.i64_load32_s_at(position, offset).unwrap(), v as i32 as i64);
            assert_eq!(mem.i64_load32_u_at(position, offset).unwrap(), v as u32 as i64);
        }
    }

    #[test]
    fn test_put() {
        let mut mem = Memory::allocate(1, 1).unwrap();
        mem.put(1024, b"hello").unwrap();
        assert_eq!(mem.read_bytes(1024, 5).unwrap(), b"hello".to_vec());

        // Odd-length segments are copied in full
        mem.put(0, &[1, 2, 3]).unwrap();
        assert_eq!(mem.read_bytes(0, 4).unwrap(), vec![1, 2, 3, 0]);

        assert!(is_range(mem.put(PAGE - 2, &[1, 2, 3])));
    }

    #[test]
    fn test_bulk_operations() {
        let mut mem = Memory::allocate(1, 1).unwrap();

        mem.fill(10, 0xAB, 4).unwrap();
        assert_eq!(mem.read_bytes(9, 6).unwrap(), vec![0, 0xAB, 0xAB, 0xAB, 0xAB, 0]);

        // Overlapping copy behaves like memmove
        mem.write_bytes(0, &[1, 2, 3, 4, 5]).unwrap();
        mem.copy_within(1, 0, 4).unwrap();
        assert_eq!(mem.read_bytes(0, 5).unwrap(), vec![1, 1, 2, 3, 4]);

        assert!(is_range(mem.fill(PAGE - 1, 0, 2)));
        assert!(is_range(mem.copy_within(0, PAGE - 1, 2)));
        assert!(is_range(mem.copy_within(PAGE - 1, 0, 2)));

        // Zero-length at the very end is allowed
        mem.fill(PAGE, 0, 0).unwrap();
    }

    #[test]
    fn test_shared_memory_aliases() {
        let shared = Memory::allocate(1, 2).unwrap().into_shared();
        let other = Rc::clone(&shared);

        shared.borrow_mut().i32_store(8, 77).unwrap();
        assert_eq!(other.borrow().i32_load(8).unwrap(), 77);

        assert_eq!(other.borrow_mut().grow(1), 1);
        assert_eq!(shared.borrow().size(), 2);
    }
}
