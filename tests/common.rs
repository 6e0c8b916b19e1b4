//! Hand-written stand-ins for translated modules, shared between integration tests
#![allow(dead_code)]

use wasm_rt::runtime::{
    ops, register_signature, Func, GlobalRef, LinkError, Memory, ModuleRegistry, SharedMemory, SharedTable,
    SignatureId, Table, TableElement, TrapResult, Value, ValueType,
};

/// `(i32) -> i32`
pub fn sig_i32_i32() -> SignatureId {
    register_signature(1, 1, &[ValueType::I32, ValueType::I32])
}

/// `(i32, i32) -> i32`
pub fn sig_i32_i32_i32() -> SignatureId {
    register_signature(2, 1, &[ValueType::I32, ValueType::I32, ValueType::I32])
}

pub fn arg_i32(args: &[Value], index: usize) -> i32 {
    args.get(index).and_then(Value::as_i32).unwrap_or_default()
}

/// Exports a memory, a table of arithmetic functions, a mutable counter
/// global and a constant, like the output of translating:
///
/// ```text
/// (module
///   (memory (export "memory") 1 4)
///   (table (export "table") 4 8 funcref)
///   (global (export "counter") (mut i32) (i32.const 0))
///   (global (export "answer") i32 (i32.const 42))
///   (func (export "div") (param i32 i32) (result i32) ...)
///   (func (export "store") (param i32 i32) ...)
///   (elem (i32.const 0) $double $div))
/// ```
pub struct Producer {
    pub memory: SharedMemory,
    pub table: SharedTable,
    pub counter: GlobalRef,
}

impl Producer {
    pub fn instantiate(registry: &mut ModuleRegistry, name: &str) -> Result<Self, LinkError> {
        let memory = Memory::allocate(1, 4)?.into_shared();
        let table = Table::allocate(4, 8)?.into_shared();
        let counter = GlobalRef::new(Value::I32(0));

        let div = {
            let counter = counter.clone();
            Func::new(format!("{name}.div"), move |args| {
                bump(&counter);
                Ok(vec![Value::I32(ops::i32_div_s(arg_i32(args, 0), arg_i32(args, 1))?)])
            })
        };
        let double = Func::new(format!("{name}.double"), |args| {
            Ok(vec![Value::I32(arg_i32(args, 0).wrapping_mul(2))])
        });
        let store = {
            let memory = memory.clone();
            Func::new(format!("{name}.store"), move |args| {
                memory
                    .borrow_mut()
                    .i32_store(arg_i32(args, 0) as u32, arg_i32(args, 1))?;
                Ok(vec![])
            })
        };

        table.borrow_mut().init(
            0,
            &[
                TableElement::new(sig_i32_i32(), double),
                TableElement::new(sig_i32_i32_i32(), div.clone()),
            ],
        )
        .expect("element segment fits the table");

        registry.export_memory(name, "memory", memory.clone());
        registry.export_table(name, "table", table.clone());
        registry.export_global(name, "counter", counter.clone());
        registry.export_constant(name, "answer", Value::I32(42));
        registry.export_function(name, "div", div);
        registry.export_function(name, "store", store);

        Ok(Producer { memory, table, counter })
    }
}

fn bump(counter: &GlobalRef) {
    let next = counter.get().as_i32().unwrap_or_default() + 1;
    let _ = counter.set(Value::I32(next));
}

/// Imports everything `Producer` exports and calls through the shared table
pub struct Consumer {
    pub memory: SharedMemory,
    pub table: SharedTable,
    pub counter: GlobalRef,
    pub answer: Value,
    pub div: Func,
}

impl Consumer {
    pub fn instantiate(registry: &ModuleRegistry, from: &str) -> Result<Self, LinkError> {
        Ok(Consumer {
            memory: registry.import_memory(from, "memory")?,
            table: registry.import_table(from, "table")?,
            counter: registry.import_global(from, "counter")?.expect_type(ValueType::I32)?,
            answer: registry.import_constant(from, "answer")?,
            div: registry.import_function(from, "div")?,
        })
    }

    /// `call_indirect (type $sig) (local.get $index)`
    pub fn call_indirect(&self, sig: SignatureId, index: u32, args: &[Value]) -> TrapResult<Vec<Value>> {
        let f = self.table.borrow().call_indirect(sig, index)?;
        f.call(args)
    }
}
