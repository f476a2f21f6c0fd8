//! Lexer error types.
//!
//! Malformed input is reported at the point of malformation rather than
//! surfacing later as a confusing "unexpected token" parse error.

use thiserror::Error;

use crate::source::Location;

/// An error produced while turning source text into tokens.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    /// A string literal with no closing quote.
    #[error("{location}: unterminated string literal")]
    UnterminatedString {
        /// Location of the opening quote.
        location: Location,
    },

    /// A character that cannot start any token.
    #[error("{location}: unexpected character {character:?}")]
    UnexpectedCharacter {
        /// The offending character.
        character: char,
        /// Where it was found.
        location: Location,
    },
}

impl LexError {
    /// The location the error was raised at.
    pub fn location(&self) -> &Location {
        match self {
            LexError::UnterminatedString { location } => location,
            LexError::UnexpectedCharacter { location, .. } => location,
        }
    }
}
