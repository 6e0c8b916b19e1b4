//! WebAssembly table implementation
//!
//! Tables hold the targets of indirect calls. Each slot is either empty or a
//! [`TableElement`]: a function paired with the interned id of its signature.
//!
//! ## Security Considerations
//!
//! The type check in `call_indirect` is what stops a guest from calling a
//! function through a slot of the wrong signature. It compares interned
//! [`SignatureId`]s, which is sound across modules because every module
//! interns through the same table.
//!
//! ## Usage
//!
//! ```rust
//! use wasm_rt::runtime::{register_signature, Func, Table, TableElement, Value, ValueType};
//!
//! let sig = register_signature(0, 1, &[ValueType::I32]);
//! let mut table = Table::allocate(4, 8).unwrap();
//! table
//!     .set(2, TableElement::new(sig, Func::new("answer", |_| Ok(vec![Value::I32(42)]))))
//!     .unwrap();
//!
//! let f = table.call_indirect(sig, 2).unwrap();
//! assert_eq!(f.call(&[]).unwrap(), vec![Value::I32(42)]);
//! ```

use super::{CallIndirectCause, Func, LinkError, RangeCause, SignatureId, Trap, TrapResult};
use std::cell::RefCell;
use std::rc::Rc;

/// Largest table this runtime will allocate or grow to
pub const MAX_TABLE_SIZE: u32 = 10_000_000;

/// Table shared between an exporting and an importing module.
///
/// Uses Rc<RefCell<>> for the same reason as [`super::SharedMemory`].
pub type SharedTable = Rc<RefCell<Table>>;

/// A populated table slot
#[derive(Debug, Clone)]
pub struct TableElement {
    pub signature: SignatureId,
    pub func: Func,
}

impl TableElement {
    pub fn new(signature: SignatureId, func: Func) -> Self {
        TableElement { signature, func }
    }
}

/// A WebAssembly funcref table
#[derive(Debug)]
pub struct Table {
    /// None marks an empty slot
    elements: Vec<Option<TableElement>>,

    max_length: u32,
}

impl Table {
    /// Allocate a table of `length` empty slots
    ///
    /// `max_length` is kept as declared; any value is valid. Growth is
    /// additionally capped at [`MAX_TABLE_SIZE`].
    ///
    /// # Errors
    /// Returns `InvalidLimits` if `length > max_length`, or if `length` is
    /// above [`MAX_TABLE_SIZE`] or cannot be allocated.
    pub fn allocate(length: u32, max_length: u32) -> Result<Self, LinkError> {
        if length > max_length {
            return Err(LinkError::InvalidLimits(format!(
                "Initial table size {length} exceeds specified maximum {max_length}"
            )));
        }
        if length > MAX_TABLE_SIZE {
            return Err(LinkError::InvalidLimits(format!(
                "Initial table size {length} exceeds system maximum {MAX_TABLE_SIZE}"
            )));
        }

        let mut elements = Vec::new();
        if elements.try_reserve_exact(length as usize).is_err() {
            return Err(LinkError::InvalidLimits(format!(
                "Initial table size {length} could not be allocated"
            )));
        }
        elements.resize(length as usize, None);

        Ok(Table { elements, max_length })
    }

    /// Wrap this table for sharing through the module registry
    pub fn into_shared(self) -> SharedTable {
        Rc::new(RefCell::new(self))
    }

    /// Get the current table size (number of slots)
    pub fn size(&self) -> u32 {
        self.elements.len() as u32
    }

    /// Declared maximum, which may exceed what `grow` will reach
    pub fn max_length(&self) -> u32 {
        self.max_length
    }

    fn index_error(&self, index: u32) -> Trap {
        Trap::Range(RangeCause::TableIndex {
            index,
            len: self.size(),
        })
    }

    /// Get the slot at `index`; `Ok(None)` for an empty slot
    ///
    /// # Errors
    ///
    /// Returns a `Range` trap if the index is out of bounds.
    pub fn get(&self, index: u32) -> TrapResult<Option<&TableElement>> {
        self.elements
            .get(index as usize)
            .map(Option::as_ref)
            .ok_or_else(|| self.index_error(index))
    }

    /// Store `element` at `index`
    ///
    /// # Errors
    ///
    /// Returns a `Range` trap if the index is out of bounds.
    pub fn set(&mut self, index: u32, element: TableElement) -> TrapResult<()> {
        self.replace(index, Some(element))
    }

    /// Empty the slot at `index`
    pub fn clear(&mut self, index: u32) -> TrapResult<()> {
        self.replace(index, None)
    }

    fn replace(&mut self, index: u32, element: Option<TableElement>) -> TrapResult<()> {
        let len = self.size();
        let slot = self
            .elements
            .get_mut(index as usize)
            .ok_or(Trap::Range(RangeCause::TableIndex { index, len }))?;
        *slot = element;
        Ok(())
    }

    /// Write an element segment starting at `offset`
    ///
    /// The whole range is checked before any slot is written.
    pub fn init(&mut self, offset: u32, elements: &[TableElement]) -> TrapResult<()> {
        let start = offset as usize;
        let end = start + elements.len();
        if end > self.elements.len() {
            return Err(self.index_error(u32::try_from(end - 1).unwrap_or(u32::MAX)));
        }
        for (slot, element) in self.elements[start..end].iter_mut().zip(elements) {
            *slot = Some(element.clone());
        }
        Ok(())
    }

    /// Grow the table by `delta` slots, filling them with `init`
    ///
    /// Returns the old size, or -1 if the new size would exceed the declared
    /// maximum or [`MAX_TABLE_SIZE`], or the slots cannot be allocated.
    pub fn grow(&mut self, delta: u32, init: Option<TableElement>) -> i32 {
        let old_size = self.size();
        let limit = self.max_length.min(MAX_TABLE_SIZE);

        let new_size = match old_size.checked_add(delta) {
            Some(size) if size <= limit => size,
            _ => {
                tracing::trace!(old_size, delta, limit, "table.grow rejected");
                return -1;
            }
        };

        if self.elements.try_reserve_exact(delta as usize).is_err() {
            tracing::debug!(new_size, "table.grow failed: allocation refused");
            return -1;
        }
        self.elements.resize(new_size as usize, init);
        tracing::debug!(old_size, new_size, "table grown");
        old_size as i32
    }

    /// Resolve the target of an indirect call
    ///
    /// The slot is bounds-checked first, then checked for emptiness, then its
    /// signature is compared with `signature`. Every failure is a
    /// `CallIndirect` trap; the cause records which check failed. On success
    /// the function is returned for the caller to invoke with its arguments.
    pub fn call_indirect(&self, signature: SignatureId, index: u32) -> TrapResult<Func> {
        let slot = self.elements.get(index as usize).ok_or(Trap::CallIndirect(
            CallIndirectCause::OutOfBounds {
                index,
                len: self.size(),
            },
        ))?;
        let element = slot
            .as_ref()
            .ok_or(Trap::CallIndirect(CallIndirectCause::EmptySlot { index }))?;

        if element.signature != signature {
            return Err(Trap::CallIndirect(CallIndirectCause::SignatureMismatch {
                expected: signature,
                actual: element.signature,
            }));
        }
        Ok(element.func.clone())
    }
}
