//! Module registry: run-time linking between separately compiled modules
//!
//! A module instance exports its functions, tables, memories and globals
//! under `(module name, field name)` keys. Modules instantiated later
//! resolve their imports from the same registry, asking for the kind of item
//! they statically expect; a missing key or a kind mismatch is a
//! [`LinkError`] rather than a trap.
//!
//! Tables, memories and mutable globals are exported by shared handle, so the
//! exporting and importing modules observe each other's writes. Constants
//! (immutable globals) are exported by value.

use super::{Func, LinkError, SharedMemory, SharedTable, Value, ValueType};
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// What kind of item an export is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternKind {
    Function,
    Table,
    Memory,
    Global,
    Constant,
}

impl fmt::Display for ExternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExternKind::Function => "function",
            ExternKind::Table => "table",
            ExternKind::Memory => "memory",
            ExternKind::Global => "global",
            ExternKind::Constant => "constant",
        };
        f.write_str(name)
    }
}

/// Read/write handle to a mutable global
///
/// Uses Rc<Cell<>> since Value is Copy. When module A exports a mutable
/// global and module B imports it, both hold the same cell.
#[derive(Debug, Clone)]
pub struct GlobalRef {
    cell: Rc<Cell<Value>>,
}

impl GlobalRef {
    pub fn new(value: Value) -> Self {
        GlobalRef {
            cell: Rc::new(Cell::new(value)),
        }
    }

    pub fn get(&self) -> Value {
        self.cell.get()
    }

    pub fn typ(&self) -> ValueType {
        self.cell.get().typ()
    }

    /// Replace the value; the type of a global never changes
    pub fn set(&self, value: Value) -> Result<(), LinkError> {
        self.check(value.typ())?;
        self.cell.set(value);
        Ok(())
    }

    /// Check the global has the type the importer declared
    pub fn expect_type(self, expected: ValueType) -> Result<Self, LinkError> {
        self.check(expected)?;
        Ok(self)
    }

    fn check(&self, typ: ValueType) -> Result<(), LinkError> {
        if typ != self.typ() {
            return Err(LinkError::GlobalTypeMismatch {
                expected: self.typ(),
                actual: typ,
            });
        }
        Ok(())
    }

    /// Whether two handles alias the same global
    pub fn ptr_eq(a: &GlobalRef, b: &GlobalRef) -> bool {
        Rc::ptr_eq(&a.cell, &b.cell)
    }
}

/// One exported item
#[derive(Debug, Clone)]
pub enum Export {
    Function(Func),
    Table(SharedTable),
    Memory(SharedMemory),
    Global(GlobalRef),
    Constant(Value),
}

impl Export {
    pub fn kind(&self) -> ExternKind {
        match self {
            Export::Function(_) => ExternKind::Function,
            Export::Table(_) => ExternKind::Table,
            Export::Memory(_) => ExternKind::Memory,
            Export::Global(_) => ExternKind::Global,
            Export::Constant(_) => ExternKind::Constant,
        }
    }
}

/// Exports of every instantiated module, keyed by (module, field)
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    exports: HashMap<(String, String), Export>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an export, replacing any earlier export under the same key
    pub fn export(&mut self, module: impl Into<String>, field: impl Into<String>, item: Export) {
        let key = (module.into(), field.into());
        tracing::debug!(module = %key.0, field = %key.1, kind = %item.kind(), "export");
        self.exports.insert(key, item);
    }

    pub fn export_function(&mut self, module: impl Into<String>, field: impl Into<String>, func: Func) {
        self.export(module, field, Export::Function(func));
    }

    pub fn export_table(&mut self, module: impl Into<String>, field: impl Into<String>, table: SharedTable) {
        self.export(module, field, Export::Table(table));
    }

    pub fn export_memory(&mut self, module: impl Into<String>, field: impl Into<String>, memory: SharedMemory) {
        self.export(module, field, Export::Memory(memory));
    }

    pub fn export_global(&mut self, module: impl Into<String>, field: impl Into<String>, global: GlobalRef) {
        self.export(module, field, Export::Global(global));
    }

    pub fn export_constant(&mut self, module: impl Into<String>, field: impl Into<String>, value: Value) {
        self.export(module, field, Export::Constant(value));
    }

    /// Look up an export of any kind
    ///
    /// # Errors
    /// Returns `UnknownImport` if nothing is exported under the key
    pub fn import(&self, module: &str, field: &str) -> Result<&Export, LinkError> {
        let item = self
            .exports
            .get(&(module.to_string(), field.to_string()))
            .ok_or_else(|| LinkError::UnknownImport {
                module: module.to_string(),
                field: field.to_string(),
            })?;
        tracing::trace!(module, field, kind = %item.kind(), "import");
        Ok(item)
    }

    fn mismatch(module: &str, field: &str, expected: ExternKind, actual: &Export) -> LinkError {
        LinkError::KindMismatch {
            module: module.to_string(),
            field: field.to_string(),
            expected,
            actual: actual.kind(),
        }
    }

    pub fn import_function(&self, module: &str, field: &str) -> Result<Func, LinkError> {
        match self.import(module, field)? {
            Export::Function(func) => Ok(func.clone()),
            other => Err(Self::mismatch(module, field, ExternKind::Function, other)),
        }
    }

    pub fn import_table(&self, module: &str, field: &str) -> Result<SharedTable, LinkError> {
        match self.import(module, field)? {
            Export::Table(table) => Ok(Rc::clone(table)),
            other => Err(Self::mismatch(module, field, ExternKind::Table, other)),
        }
    }

    pub fn import_memory(&self, module: &str, field: &str) -> Result<SharedMemory, LinkError> {
        match self.import(module, field)? {
            Export::Memory(memory) => Ok(Rc::clone(memory)),
            other => Err(Self::mismatch(module, field, ExternKind::Memory, other)),
        }
    }

    /// Import a mutable global as a read/write handle
    pub fn import_global(&self, module: &str, field: &str) -> Result<GlobalRef, LinkError> {
        match self.import(module, field)? {
            Export::Global(global) => Ok(global.clone()),
            other => Err(Self::mismatch(module, field, ExternKind::Global, other)),
        }
    }

    /// Import an immutable global by value
    pub fn import_constant(&self, module: &str, field: &str) -> Result<Value, LinkError> {
        match self.import(module, field)? {
            Export::Constant(value) => Ok(*value),
            other => Err(Self::mismatch(module, field, ExternKind::Constant, other)),
        }
    }

    pub fn contains(&self, module: &str, field: &str) -> bool {
        self.exports.contains_key(&(module.to_string(), field.to_string()))
    }

    /// Make every export of `from` also visible under the module name `alias`
    ///
    /// Handles are shared, not copied: the aliased memory is the same memory.
    /// Returns the number of items re-exported.
    pub fn register_module(&mut self, alias: &str, from: &str) -> usize {
        let aliased: Vec<(String, Export)> = self
            .exports
            .iter()
            .filter(|((module, _), _)| module == from)
            .map(|((_, field), item)| (field.clone(), item.clone()))
            .collect();

        let count = aliased.len();
        for (field, item) in aliased {
            self.exports.insert((alias.to_string(), field), item);
        }
        tracing::debug!(alias, from, count, "registered module alias");
        count
    }
}
