//! Runtime support for WebAssembly modules translated to Rust source.
//!
//! A translator turns each WebAssembly module into Rust code that calls into
//! this crate for everything the host language does not give it directly:
//! bounds-checked little-endian linear memory, funcref tables with
//! type-checked indirect calls, trapping and NaN-exact numeric primitives,
//! interned function signatures, and a registry that links the exports of one
//! module to the imports of another.
//!
//! # Modules
//!
//! - [`runtime`] -- Memory, tables, the module registry, signatures, and the
//!   [`runtime::Trap`] taxonomy.
//! - [`runtime::ops`] -- Numeric primitives with WebAssembly semantics.
//! - [`wast`] -- NaN predicates, the `spectest` host module, and an assertion
//!   tally for running the official spec test scripts.
//!
//! # Example
//!
//! One module exports a memory and a function; another imports both and
//! calls the function through its own table:
//!
//! ```
//! use wasm_rt::runtime::{register_signature, Func, Memory, ModuleRegistry, Table, TableElement, Value, ValueType};
//!
//! let mut registry = ModuleRegistry::new();
//! let memory = Memory::allocate(1, 2).unwrap().into_shared();
//! registry.export_memory("lib", "memory", memory.clone());
//!
//! let load = {
//!     let memory = memory.clone();
//!     Func::new("lib.load", move |args| {
//!         let pos = args[0].as_i32().unwrap_or(0) as u32;
//!         Ok(vec![Value::I32(memory.borrow().i32_load(pos)?)])
//!     })
//! };
//! registry.export_function("lib", "load", load);
//!
//! // The importing module
//! let imported = registry.import_memory("lib", "memory").unwrap();
//! imported.borrow_mut().i32_store(8, 0x1234).unwrap();
//!
//! let sig = register_signature(1, 1, &[ValueType::I32, ValueType::I32]);
//! let mut table = Table::allocate(1, 1).unwrap();
//! table.set(0, TableElement::new(sig, registry.import_function("lib", "load").unwrap())).unwrap();
//!
//! let f = table.call_indirect(sig, 0).unwrap();
//! assert_eq!(f.call(&[Value::I32(8)]).unwrap(), vec![Value::I32(0x1234)]);
//! ```

pub mod runtime;
pub mod wast;
