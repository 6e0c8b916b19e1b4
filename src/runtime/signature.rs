//! Function signature interning
//!
//! Indirect calls compare a table slot's signature with the call site's by
//! integer id. Modules compiled separately must agree on those ids, so every
//! `(result count, param types ++ result types)` shape is interned into one
//! table that hands out dense ids in first-seen order.
//!
//! The process-wide interner behind [`register_signature`] is the only piece
//! of global mutable state in the runtime. It lives for the whole process
//! and is guarded by a single mutex; ids are never reassigned or freed.
//! Hosts that want isolated id spaces (tests, embedders running several
//! unrelated stores) can own a [`SignatureInterner`] directly.

use super::ValueType;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Interned signature id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignatureId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Shape {
    num_results: usize,
    types: Vec<ValueType>,
}

/// A lock-guarded map from signature shape to id
#[derive(Debug, Default)]
pub struct SignatureInterner {
    ids: Mutex<HashMap<Shape, SignatureId>>,
}

impl SignatureInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a signature given as `types = params ++ results`
    ///
    /// # Panics
    /// If `types.len() != num_params + num_results`. This is a code
    /// generator bug, not a guest-reachable condition.
    pub fn register(&self, num_params: usize, num_results: usize, types: &[ValueType]) -> SignatureId {
        assert_eq!(
            num_params + num_results,
            types.len(),
            "signature type list does not match its arity"
        );

        let shape = Shape {
            num_results,
            types: types.to_vec(),
        };

        // A poisoned lock still holds a consistent map: inserts are atomic
        let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        let next = SignatureId(ids.len() as u32);
        *ids.entry(shape).or_insert_with(|| {
            tracing::debug!(id = next.0, num_params, num_results, "interned new signature");
            next
        })
    }

    /// Intern a signature from separate parameter and result lists
    pub fn register_func_type(&self, params: &[ValueType], results: &[ValueType]) -> SignatureId {
        let types: Vec<ValueType> = params.iter().chain(results).copied().collect();
        self.register(params.len(), results.len(), &types)
    }

    /// Number of distinct shapes seen so far
    pub fn len(&self) -> usize {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static GLOBAL_SIGNATURES: Lazy<SignatureInterner> = Lazy::new(SignatureInterner::new);

/// The process-wide interner shared by every module in the process
pub fn global_signatures() -> &'static SignatureInterner {
    &GLOBAL_SIGNATURES
}

/// Intern a signature in the process-wide table
///
/// Idempotent: the same shape always yields the same id.
pub fn register_signature(num_params: usize, num_results: usize, types: &[ValueType]) -> SignatureId {
    GLOBAL_SIGNATURES.register(num_params, num_results, types)
}
