//! Lexical analysis for Basil.
//!
//! This module turns source text into a [`TokenStream`]: a lazily extended,
//! memoizing sequence of classified tokens with a checkpoint protocol the
//! parser uses for backtracking.
//!
//! ## The lookahead protocol
//!
//! The stream keeps a stack of read cursors. [`TokenStream::mark`] pushes a
//! copy of the current position, [`TokenStream::commit`] pops it and makes
//! its position authoritative, and [`TokenStream::cancel`] pops it and
//! restores the previous position. Marks nest freely, so the parser can try
//! an interpretation (`else` vs. `else if`, optional tokens) and undo it at
//! zero re-lexing cost: once a token has been materialized at an index it
//! is never lexed again.
//!
//! ## Example
//!
//! ```
//! use basil::lexer::{TokenKind, TokenStream};
//!
//! let mut stream = TokenStream::new("var x as i32");
//!
//! stream.mark();
//! assert_eq!(stream.next().unwrap().kind, TokenKind::KeywordVar);
//! stream.cancel();
//!
//! // The speculative read left no trace.
//! assert_eq!(stream.next().unwrap().kind, TokenKind::KeywordVar);
//! ```

mod error;
mod token;

pub use error::LexError;
pub use token::{describe_set, Token, TokenKind};

use logos::Logos;
use std::path::PathBuf;

use crate::source::SourceMap;

/// A lazy, memoizing token stream with speculative lookahead.
///
/// Tokens are produced on demand by a `logos`-generated lexer and cached in
/// a backing buffer; the cursor stack on top of that buffer implements the
/// mark/commit/cancel protocol. Reads never run past the end of input: the
/// terminal [`TokenKind::Eof`] token is returned for every read at or past
/// the end.
pub struct TokenStream<'src> {
    /// The underlying logos lexer, consumed incrementally.
    lexer: logos::Lexer<'src, TokenKind>,
    /// Byte offset to line/column translation for this file.
    map: SourceMap,
    /// All tokens materialized so far; ends with `Eof` once exhausted.
    tokens: Vec<Token>,
    /// Read cursor stack. Invariant: never empty; the top is the current
    /// position, entries below are pending checkpoints.
    cursors: Vec<usize>,
}

impl<'src> TokenStream<'src> {
    /// Creates a stream over anonymous source text (no file path).
    pub fn new(source: &'src str) -> Self {
        Self::with_path(source, PathBuf::new())
    }

    /// Creates a stream over the contents of the named file.
    pub fn with_path(source: &'src str, path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        Self {
            lexer: TokenKind::lexer(source),
            map: SourceMap::new(path, source),
            tokens: Vec::new(),
            cursors: vec![0],
        }
    }

    // ==================== Checkpoint protocol ====================

    /// Pushes a checkpoint at the current read position.
    pub fn mark(&mut self) {
        let current = self.position();
        self.cursors.push(current);
    }

    /// Pops the innermost checkpoint and keeps its advancement.
    ///
    /// # Panics
    ///
    /// Panics if no checkpoint is active; that is a parser logic error.
    pub fn commit(&mut self) {
        assert!(self.in_lookahead(), "commit without a matching mark");

        let position = self.cursors.pop().unwrap();
        *self.cursors.last_mut().unwrap() = position;
    }

    /// Pops the innermost checkpoint and discards its advancement,
    /// restoring the position the matching [`TokenStream::mark`] saw.
    ///
    /// # Panics
    ///
    /// Panics if no checkpoint is active; that is a parser logic error.
    pub fn cancel(&mut self) {
        assert!(self.in_lookahead(), "cancel without a matching mark");
        self.cursors.pop();
    }

    /// Returns true while at least one checkpoint is pending.
    pub fn in_lookahead(&self) -> bool {
        self.cursors.len() > 1
    }

    // ==================== Reading ====================

    /// Returns the token at the current position without advancing.
    pub fn peek(&mut self) -> Result<Token, LexError> {
        let index = self.position();
        self.materialize(index)?;

        // Clamp to the terminal Eof token so reads never run past the end.
        let index = index.min(self.tokens.len() - 1);
        Ok(self.tokens[index].clone())
    }

    /// Returns the kind of the token at the current position.
    pub fn peek_kind(&mut self) -> Result<TokenKind, LexError> {
        Ok(self.peek()?.kind)
    }

    /// Returns the token at the current position and advances past it.
    ///
    /// Reading the terminal `Eof` token does not advance further.
    pub fn next(&mut self) -> Result<Token, LexError> {
        let token = self.peek()?;

        if token.kind != TokenKind::Eof {
            *self.cursors.last_mut().unwrap() += 1;
        }

        Ok(token)
    }

    fn position(&self) -> usize {
        *self.cursors.last().expect("cursor stack is never empty")
    }

    /// Extends the backing buffer until `index` is available or the input
    /// is exhausted. Already-materialized tokens are never re-lexed.
    fn materialize(&mut self, index: usize) -> Result<(), LexError> {
        while self.tokens.len() <= index {
            if matches!(self.tokens.last(), Some(token) if token.kind == TokenKind::Eof) {
                return Ok(());
            }

            let token = match self.lexer.next() {
                Some(Ok(kind)) => {
                    let span = self.lexer.span();
                    let location = self.map.location(span.start);
                    let text = if kind.carries_text() {
                        let slice = self.lexer.slice();
                        if kind == TokenKind::LiteralString {
                            // Strip the surrounding quotes; the content is
                            // carried raw.
                            slice[1..slice.len() - 1].to_string()
                        } else {
                            slice.to_string()
                        }
                    } else {
                        String::new()
                    };

                    Token::new(kind, text, location)
                }
                Some(Err(())) => {
                    let span = self.lexer.span();
                    let location = self.map.location(span.start);
                    let slice = self.lexer.slice();

                    return Err(if slice.starts_with('"') {
                        LexError::UnterminatedString { location }
                    } else {
                        LexError::UnexpectedCharacter {
                            character: slice.chars().next().unwrap_or('\0'),
                            location,
                        }
                    });
                }
                None => {
                    let location = self.map.location(self.lexer.span().end);
                    Token::new(TokenKind::Eof, "", location)
                }
            };

            self.tokens.push(token);
        }

        Ok(())
    }
}
