//! Resolution error types.
//!
//! Raised while a module collects its declarations (pass 1) or binds its
//! type references (pass 2). All of these abort the compilation of the
//! current module.

use thiserror::Error;

use crate::module::LoadError;
use crate::source::Location;

/// An error produced during module construction.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// A name was declared twice in the same module table or scope.
    #[error("{location}: duplicate definition for {kind} \"{name}\"")]
    DuplicateDefinition {
        /// What kind of object was duplicated ("sub", "function", ...).
        kind: &'static str,
        /// The duplicated name.
        name: String,
        /// Where the second declaration was found.
        location: Location,
    },

    /// A type name that nothing in scope defines.
    #[error("{location}: unresolved type reference \"{name}\"")]
    UnresolvedType {
        /// The unresolvable name.
        name: String,
        /// Where the reference was made.
        location: Location,
    },

    /// The same submodule was loaded twice by one module.
    #[error("{location}: module \"{name}\" is already loaded")]
    DuplicateLoad {
        /// The submodule name (or alias) registered twice.
        name: String,
        /// Where the second load was found.
        location: Location,
    },

    /// A structure whose fields contain the structure itself.
    #[error("{location}: structure \"{name}\" recursively contains itself")]
    RecursiveStructure {
        /// The structure's name.
        name: String,
        /// The field reference that closed the cycle.
        location: Location,
    },

    /// A `load` statement whose target could not be loaded.
    #[error("{location}: could not load module \"{name}\"")]
    LoadFailed {
        /// The requested module name.
        name: String,
        /// Where the load was requested.
        location: Location,
        /// Why the load failed.
        #[source]
        source: Box<LoadError>,
    },
}

impl ResolutionError {
    /// The location the error was raised at.
    pub fn location(&self) -> &Location {
        match self {
            ResolutionError::DuplicateDefinition { location, .. }
            | ResolutionError::UnresolvedType { location, .. }
            | ResolutionError::DuplicateLoad { location, .. }
            | ResolutionError::RecursiveStructure { location, .. }
            | ResolutionError::LoadFailed { location, .. } => location,
        }
    }
}
