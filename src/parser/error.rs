//! Parser error types.
//!
//! A syntax error names the token (or token set) that was expected and the
//! token actually found, with its text when it has any. Parsing is
//! fail-fast: the first error aborts the whole parse, so there is exactly
//! one error per failed compilation unit.

use thiserror::Error;

use crate::lexer::{LexError, Token};
use crate::source::Location;

/// An error produced while parsing a token stream into an AST.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// The next token matched no expected production.
    #[error("{}: expected {expected} but found {found} instead", .found.location)]
    UnexpectedToken {
        /// Description of the expected token or token set.
        expected: String,
        /// The token actually found.
        found: Token,
    },

    /// The lexer failed underneath the parser.
    #[error(transparent)]
    Lex(#[from] LexError),
}

impl SyntaxError {
    /// Creates an "expected X but found Y" error.
    pub fn unexpected(expected: impl Into<String>, found: Token) -> Self {
        SyntaxError::UnexpectedToken {
            expected: expected.into(),
            found,
        }
    }

    /// The location the error was raised at.
    pub fn location(&self) -> &Location {
        match self {
            SyntaxError::UnexpectedToken { found, .. } => &found.location,
            SyntaxError::Lex(error) => error.location(),
        }
    }
}
