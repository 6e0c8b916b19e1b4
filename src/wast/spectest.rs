//! Standard spectest host module for the WebAssembly spec test suite.
//!
//! The spectest module provides the standard host imports that `.wast` spec
//! tests expect: print functions that log their arguments, globals
//! initialised to 666, a memory (1 page min, 2 max), and a funcref table
//! (10 min, 20 max).

use crate::runtime::{Func, GlobalRef, LinkError, Memory, ModuleRegistry, Table, Value};

/// Module name the spec suite imports from
pub const SPECTEST_MODULE: &str = "spectest";

fn print_func(module: &str, field: &'static str) -> Func {
    Func::new(format!("{module}.{field}"), move |args: &[Value]| {
        let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
        tracing::info!(target: "spectest", "{field}({})", rendered.join(" "));
        Ok(vec![])
    })
}

/// Export the spectest items into `registry` under `module`
///
/// Allocates a fresh memory and table on every call, so two registrations
/// do not share state.
pub fn register_spectest(registry: &mut ModuleRegistry, module: &str) -> Result<(), LinkError> {
    for field in [
        "print",
        "print_i32",
        "print_i64",
        "print_f32",
        "print_f64",
        "print_i32_f32",
        "print_f64_f64",
    ] {
        registry.export_function(module, field, print_func(module, field));
    }

    registry.export_table(module, "table", Table::allocate(10, 20)?.into_shared());
    registry.export_memory(module, "memory", Memory::allocate(1, 2)?.into_shared());

    registry.export_global(module, "global_i32", GlobalRef::new(Value::I32(666)));
    registry.export_global(module, "global_i64", GlobalRef::new(Value::I64(666)));
    registry.export_global(module, "global_f32", GlobalRef::new(Value::F32(666.0)));
    registry.export_global(module, "global_f64", GlobalRef::new(Value::F64(666.0)));

    tracing::debug!(module, "registered spectest host module");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ExternKind, ValueType};

    #[test]
    fn test_spectest_exports() {
        let mut registry = ModuleRegistry::new();
        register_spectest(&mut registry, SPECTEST_MODULE).unwrap();

        let print = registry.import_function("spectest", "print_i32_f32").unwrap();
        assert!(print.call(&[Value::I32(1), Value::F32(2.5)]).unwrap().is_empty());
        assert_eq!(print.name(), "spectest.print_i32_f32");

        let table = registry.import_table("spectest", "table").unwrap();
        assert_eq!(table.borrow().size(), 10);
        assert_eq!(table.borrow().max_length(), 20);

        let memory = registry.import_memory("spectest", "memory").unwrap();
        assert_eq!(memory.borrow().size(), 1);
        assert_eq!(memory.borrow().max_pages(), 2);

        let g = registry.import_global("spectest", "global_f64").unwrap();
        assert_eq!(g.typ(), ValueType::F64);
        assert_eq!(g.get(), Value::F64(666.0));
        assert_eq!(registry.import_global("spectest", "global_i32").unwrap().get(), Value::I32(666));
    }

    #[test]
    fn test_spectest_kinds_are_checked() {
        let mut registry = ModuleRegistry::new();
        register_spectest(&mut registry, "host").unwrap();

        assert!(!registry.contains("spectest", "print"));
        assert_eq!(registry.import("host", "memory").unwrap().kind(), ExternKind::Memory);
        assert!(matches!(
            registry.import_memory("host", "table"),
            Err(LinkError::KindMismatch { .. })
        ));
    }
}
