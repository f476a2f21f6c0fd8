//! The code-generation boundary.
//!
//! The front end stops at a resolved [`Module`]; turning its tables and
//! startup list into runnable code is the job of a [`Backend`]. The trait
//! keeps that seam narrow: a backend receives the resolved module and
//! returns a zero-argument callable producing an integer status, which
//! [`Module::execute`](crate::module::Module::execute) runs.
//!
//! Only the boundary lives here. A real machine-code or JIT backend
//! implements [`Backend`] in its own crate; the built-in [`NullBackend`]
//! lowers every module to a success thunk so the front end is usable (and
//! testable) on its own.

use crate::module::Module;

/// The callable a backend produces for one module: runs the module's
/// initialization code and returns its status.
pub type InitFn = Box<dyn Fn() -> i32>;

/// A code-generation backend.
pub trait Backend {
    /// Lowers a resolved module to its initialization callable.
    fn lower(&self, module: &Module) -> InitFn;
}

/// A backend that generates nothing.
///
/// Every module lowers to a thunk returning 0, so a pipeline using this
/// backend validates and resolves source without executing it.
pub struct NullBackend;

impl Backend for NullBackend {
    fn lower(&self, module: &Module) -> InitFn {
        log::debug!("null backend lowering module {}", module.name());
        Box::new(|| 0)
    }
}
