//! WebAssembly runtime support
//!
//! This module provides what compiled WebAssembly code links against: linear
//! memory, indirect-call tables, the module registry used to resolve imports,
//! signature interning, and the trapping numeric primitives.

pub mod func;
pub mod memory;
pub mod ops;
pub mod registry;
pub mod signature;
pub mod table;
pub mod value;

pub use func::Func;
pub use memory::{Memory, SharedMemory};
pub use registry::{Export, ExternKind, GlobalRef, ModuleRegistry};
pub use signature::{global_signatures, register_signature, SignatureId, SignatureInterner};
pub use table::{SharedTable, Table, TableElement};
pub use value::{Value, ValueType};

use std::fmt;

/// Result of any operation that may trap
pub type TrapResult<T> = Result<T, Trap>;

/// Why a memory access trapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeCause {
    /// `position + offset` does not fit in the 32-bit address space
    AddressOverflow { position: u32, offset: u32 },
    /// The accessed span runs past the end of the buffer
    OutOfBounds { address: u64, width: usize, len: usize },
    /// Table get/set outside the current table length
    TableIndex { index: u32, len: u32 },
}

impl fmt::Display for RangeCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeCause::AddressOverflow { position, offset } => write!(
                f,
                "out of bounds memory access: address {position:#x} + offset {offset:#x} overflows 32 bits"
            ),
            RangeCause::OutOfBounds { address, width, len } => write!(
                f,
                "out of bounds memory access: {width} bytes at {address:#x}, memory is {len} bytes"
            ),
            RangeCause::TableIndex { index, len } => {
                write!(f, "out of bounds table access: index {index}, table size {len}")
            }
        }
    }
}

/// Why an indirect call trapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallIndirectCause {
    /// Index past the end of the table
    OutOfBounds { index: u32, len: u32 },
    /// Slot exists but holds no function
    EmptySlot { index: u32 },
    /// Slot signature differs from the call site's
    SignatureMismatch { expected: SignatureId, actual: SignatureId },
}

impl fmt::Display for CallIndirectCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallIndirectCause::OutOfBounds { index, len } => {
                write!(f, "undefined element: index {index}, table size {len}")
            }
            CallIndirectCause::EmptySlot { index } => write!(f, "uninitialized element {index}"),
            CallIndirectCause::SignatureMismatch { expected, actual } => write!(
                f,
                "indirect call type mismatch: expected signature {}, found {}",
                expected.0, actual.0
            ),
        }
    }
}

/// A WebAssembly trap
///
/// Every fallible primitive returns this immediately at the point of violation.
/// Hosts catch it at whatever boundary they install and map [`Trap::kind`] to
/// their own status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Trap {
    #[error("{0}")]
    Range(RangeCause),
    #[error("unreachable executed")]
    Unreachable,
    #[error("{0}")]
    CallIndirect(CallIndirectCause),
    #[error("integer divide by zero")]
    DivideByZero,
    #[error("integer overflow")]
    IntOverflow,
    #[error("invalid conversion to integer")]
    InvalidConversion,
    #[error("call stack exhausted")]
    Exhaustion,
}

/// Field-less discriminant of [`Trap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrapKind {
    Range,
    Unreachable,
    CallIndirect,
    DivideByZero,
    IntOverflow,
    InvalidConversion,
    Exhaustion,
}

impl Trap {
    pub fn kind(&self) -> TrapKind {
        match self {
            Trap::Range(_) => TrapKind::Range,
            Trap::Unreachable => TrapKind::Unreachable,
            Trap::CallIndirect(_) => TrapKind::CallIndirect,
            Trap::DivideByZero => TrapKind::DivideByZero,
            Trap::IntOverflow => TrapKind::IntOverflow,
            Trap::InvalidConversion => TrapKind::InvalidConversion,
            Trap::Exhaustion => TrapKind::Exhaustion,
        }
    }

    /// Resource exhaustion is reported separately from logic traps
    pub fn is_exhaustion(&self) -> bool {
        matches!(self, Trap::Exhaustion)
    }
}

/// Errors raised while instantiating and linking modules
///
/// These are not traps: they happen before any guest code runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("unknown import: {module}.{field}")]
    UnknownImport { module: String, field: String },
    #[error("incompatible import type for {module}.{field}: expected {expected}, got {actual}")]
    KindMismatch {
        module: String,
        field: String,
        expected: ExternKind,
        actual: ExternKind,
    },
    #[error("global type mismatch: expected {expected}, got {actual}")]
    GlobalTypeMismatch { expected: ValueType, actual: ValueType },
    #[error("invalid limits: {0}")]
    InvalidLimits(String),
}
