//! Callable references stored in tables and passed through the registry

use super::{TrapResult, Value};
use std::fmt;
use std::rc::Rc;

type FuncImpl = dyn Fn(&[Value]) -> TrapResult<Vec<Value>>;

/// A reference-counted function: either compiled module code or a host
/// intrinsic. Cloning shares the same underlying closure.
#[derive(Clone)]
pub struct Func {
    name: Rc<str>,
    inner: Rc<FuncImpl>,
}

impl Func {
    pub fn new<F>(name: impl Into<Rc<str>>, f: F) -> Self
    where
        F: Fn(&[Value]) -> TrapResult<Vec<Value>> + 'static,
    {
        Func {
            name: name.into(),
            inner: Rc::new(f),
        }
    }

    /// Debug name, usually `module.field` of the defining export
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke with already-evaluated arguments
    pub fn call(&self, args: &[Value]) -> TrapResult<Vec<Value>> {
        (self.inner)(args)
    }

    /// Whether two handles refer to the same closure
    pub fn ptr_eq(a: &Func, b: &Func) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Func").field("name", &self.name).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Trap;

    #[test]
    fn test_call() {
        let add = Func::new("math.add", |args| {
            let a = args[0].as_i32().unwrap_or(0);
            let b = args[1].as_i32().unwrap_or(0);
            Ok(vec![Value::I32(a.wrapping_add(b))])
        });
        assert_eq!(add.name(), "math.add");
        assert_eq!(add.call(&[Value::I32(2), Value::I32(3)]).unwrap(), vec![Value::I32(5)]);
    }

    #[test]
    fn test_traps_propagate() {
        let f = Func::new("f", |_| Err(Trap::Unreachable));
        assert_eq!(f.call(&[]), Err(Trap::Unreachable));
    }

    #[test]
    fn test_clone_shares_closure() {
        let f = Func::new("f", |_| Ok(vec![]));
        let g = f.clone();
        let h = Func::new("f", |_| Ok(vec![]));
        assert!(Func::ptr_eq(&f, &g));
        assert!(!Func::ptr_eq(&f, &h));
    }
}
