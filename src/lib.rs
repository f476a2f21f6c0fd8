//! # Basil
//!
//! A compiler front end for the Basil BASIC-like language: it turns
//! source text into validated, symbol-resolved modules ready for code
//! generation.
//!
//! ## Architecture
//!
//! The front end is a single synchronous pipeline:
//!
//! ```text
//! Source (.bas) → TokenStream → Parser → AST → Module (collect, resolve) → Backend
//! ```
//!
//! Each phase is implemented as a separate module:
//!
//! - [`source`] - source locations and byte-offset mapping
//! - [`lexer`] - the lazy, memoizing [`TokenStream`](lexer::TokenStream)
//!   with its mark/commit/cancel lookahead protocol
//! - [`parser`] - recursive descent statements + precedence-climbing
//!   expressions, fail-fast
//! - [`ast`] - the statement/expression tree definitions
//! - [`semantic`] - symbol tables, scopes, and the type model
//! - [`module`] - modules, the three-pass construction pipeline, and the
//!   caching [`Loader`](module::Loader)
//! - [`codegen`] - the backend boundary ([`Backend`](codegen::Backend))
//!
//! ## Example
//!
//! ```
//! use basil::lexer::TokenStream;
//! use basil::parser::parse_program;
//!
//! let source = "
//!     var greeting as i32 = 1 + 2 * 3
//!     structure point
//!         x as i32
//!         y as i32
//!     end structure
//! ";
//!
//! let mut stream = TokenStream::new(source);
//! let program = parse_program(&mut stream).expect("parse error");
//!
//! assert_eq!(program.len(), 2);
//! ```

pub mod ast;
pub mod codegen;
pub mod lexer;
pub mod module;
pub mod parser;
pub mod semantic;
pub mod source;

/// Re-export commonly used types for convenience.
pub mod prelude {
    pub use crate::ast::{Expr, ExprKind, Statement, StatementKind, StatementList};
    pub use crate::codegen::{Backend, InitFn, NullBackend};
    pub use crate::lexer::{LexError, Token, TokenKind, TokenStream};
    pub use crate::module::{ConfigError, LoadError, Loader, Module};
    pub use crate::parser::{parse_program, Parser, SyntaxError};
    pub use crate::semantic::{ResolutionError, TypeInfo, TypeRef, VariableInfo, Visibility};
    pub use crate::source::Location;
}
