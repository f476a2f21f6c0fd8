//! Symbol tables and the type model for Basil modules.
//!
//! This module defines the data the module system collects and resolves:
//!
//! - [`types`](self) - declared types: numbers, structures, and the lazy
//!   [`TypeRef`] that binds a name to a [`TypeInfo`] during resolution
//! - [`scope`](self) - lexical scopes of [`VariableInfo`]s with
//!   parent-chain lookup
//! - [`error`](self) - the [`ResolutionError`] taxonomy
//!
//! Declaration collection and the resolution passes themselves live in
//! [`crate::module`].

mod error;
mod scope;
mod types;

pub use error::ResolutionError;
pub use scope::{ScopeId, ScopeSet, VariableInfo};
pub use types::{
    FieldInfo, FunctionInfo, NumberInfo, ParameterInfo, StructureInfo, SubInfo, TypeExtra,
    TypeInfo, TypeRef, Visibility,
};
