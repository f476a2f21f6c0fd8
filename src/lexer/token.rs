//! Token definitions for the Basil lexer.
//!
//! This module defines the closed set of tokens recognized by the language:
//! - Keywords (`do`, `for`, `sub`, `structure`, etc.) — exact lowercase match
//! - Symbols (`(`, `)`, `[`, `]`, `=`, `==`, `<>`, etc.)
//! - Literals (integer, float, string)
//! - Identifiers
//! - A terminal end-of-file token
//!
//! ## Design Notes
//!
//! We use the `logos` crate for lexical analysis. Logos generates a fast,
//! table-driven lexer from token definitions using procedural macros.
//!
//! Two quirks of the language are worth calling out:
//!
//! - A `+` or `-` immediately followed by a digit starts a numeric literal,
//!   and a numeric literal greedily consumes digits and `+ - e E .`. So
//!   `1+2` is a *single* integer literal while `1 + 2` is three tokens.
//! - A literal containing a `.` is a float; anything else (including
//!   `1e5`) is an integer. Literals carry raw text only — numeric value
//!   parsing belongs to the backend.

use logos::Logos;
use std::cmp::Ordering;
use std::fmt;

use crate::source::Location;

/// All token types in the Basil language.
///
/// The `Eof` variant is never produced by the lexer itself; the token
/// stream synthesizes it when the input is exhausted and re-returns it on
/// every subsequent read.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"#[^\n]*")]
pub enum TokenKind {
    // ==================== Keywords ====================
    #[token("and")]
    KeywordAnd,

    #[token("as")]
    KeywordAs,

    #[token("case")]
    KeywordCase,

    #[token("do")]
    KeywordDo,

    #[token("else")]
    KeywordElse,

    #[token("end")]
    KeywordEnd,

    #[token("for")]
    KeywordFor,

    #[token("function")]
    KeywordFunction,

    #[token("if")]
    KeywordIf,

    #[token("load")]
    KeywordLoad,

    #[token("loop")]
    KeywordLoop,

    /// Reserved; not currently used by any statement form.
    #[token("next")]
    KeywordNext,

    #[token("not")]
    KeywordNot,

    #[token("or")]
    KeywordOr,

    #[token("select")]
    KeywordSelect,

    #[token("step")]
    KeywordStep,

    #[token("structure")]
    KeywordStructure,

    #[token("sub")]
    KeywordSub,

    #[token("then")]
    KeywordThen,

    #[token("to")]
    KeywordTo,

    #[token("until")]
    KeywordUntil,

    #[token("var")]
    KeywordVar,

    #[token("while")]
    KeywordWhile,

    // ==================== Symbols ====================
    #[token("(")]
    OpenBracket,

    #[token(")")]
    CloseBracket,

    #[token("[")]
    OpenSquare,

    #[token("]")]
    CloseSquare,

    /// `=` — assignment.
    #[token("=")]
    Assign,

    /// `==` — equality comparison.
    #[token("==")]
    Equal,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Times,

    #[token("/")]
    Divide,

    #[token("<")]
    LessThan,

    #[token(">")]
    GreaterThan,

    /// `<>` — inequality comparison.
    #[token("<>")]
    NotEqual,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    // ==================== Literals ====================
    /// Integer literal: a digit (or sign-then-digit) followed by a maximal
    /// munch of digits, signs, and exponent letters — but no `.`.
    #[regex(r"[+-]?[0-9][0-9eE+-]*")]
    LiteralInt,

    /// Float literal: like [`TokenKind::LiteralInt`] but containing at
    /// least one `.`.
    #[regex(r"[+-]?[0-9][0-9eE+-]*\.[0-9eE.+-]*")]
    LiteralFloat,

    /// String literal: raw characters between double quotes. A backslash
    /// escapes the following character; escapes are carried through raw.
    #[regex(r#""([^"\\]|\\.)*""#)]
    LiteralString,

    // ==================== Identifiers ====================
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    // ==================== End of input ====================
    /// Synthesized by the token stream once the source is exhausted.
    Eof,
}

impl TokenKind {
    /// Returns true for kinds whose token text is meaningful (identifiers
    /// and literals). Keywords and symbols carry empty text.
    pub fn carries_text(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::LiteralInt
                | TokenKind::LiteralFloat
                | TokenKind::LiteralString
        )
    }

    /// A human-readable description of the token kind, used in syntax
    /// error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::KeywordAnd => "the keyword and",
            TokenKind::KeywordAs => "the keyword as",
            TokenKind::KeywordCase => "the keyword case",
            TokenKind::KeywordDo => "the keyword do",
            TokenKind::KeywordElse => "the keyword else",
            TokenKind::KeywordEnd => "the keyword end",
            TokenKind::KeywordFor => "the keyword for",
            TokenKind::KeywordFunction => "the keyword function",
            TokenKind::KeywordIf => "the keyword if",
            TokenKind::KeywordLoad => "the keyword load",
            TokenKind::KeywordLoop => "the keyword loop",
            TokenKind::KeywordNext => "the keyword next",
            TokenKind::KeywordNot => "the keyword not",
            TokenKind::KeywordOr => "the keyword or",
            TokenKind::KeywordSelect => "the keyword select",
            TokenKind::KeywordStep => "the keyword step",
            TokenKind::KeywordStructure => "the keyword structure",
            TokenKind::KeywordSub => "the keyword sub",
            TokenKind::KeywordThen => "the keyword then",
            TokenKind::KeywordTo => "the keyword to",
            TokenKind::KeywordUntil => "the keyword until",
            TokenKind::KeywordVar => "the keyword var",
            TokenKind::KeywordWhile => "the keyword while",
            TokenKind::OpenBracket => "the symbol (",
            TokenKind::CloseBracket => "the symbol )",
            TokenKind::OpenSquare => "the symbol [",
            TokenKind::CloseSquare => "the symbol ]",
            TokenKind::Assign => "the symbol =",
            TokenKind::Equal => "the symbol ==",
            TokenKind::Plus => "the symbol +",
            TokenKind::Minus => "the symbol -",
            TokenKind::Times => "the symbol *",
            TokenKind::Divide => "the symbol /",
            TokenKind::LessThan => "the symbol <",
            TokenKind::GreaterThan => "the symbol >",
            TokenKind::NotEqual => "the symbol <>",
            TokenKind::Comma => "the symbol ,",
            TokenKind::Dot => "the symbol .",
            TokenKind::LiteralInt => "a literal integer value",
            TokenKind::LiteralFloat => "a literal floating point value",
            TokenKind::LiteralString => "a literal string value",
            TokenKind::Identifier => "an identifier",
            TokenKind::Eof => "the end of the file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Formats a set of token kinds as "a, b or c" for error messages.
pub fn describe_set(kinds: &[TokenKind]) -> String {
    let mut out = String::new();

    for (index, kind) in kinds.iter().enumerate() {
        out.push_str(kind.describe());

        match kinds.len() - index {
            1 => {}
            2 => out.push_str(" or "),
            _ => out.push_str(", "),
        }
    }

    out
}

/// A token with its classification, text, and source location.
///
/// Tokens are value types. Equality and ordering compare the kind and then
/// the text; the location is ignored so that tokens from different files
/// still compare equal.
#[derive(Debug, Clone)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// Token content for identifiers and literals; empty otherwise.
    pub text: String,
    /// Where the token starts in the source.
    pub location: Location,
}

impl Token {
    /// Creates a new token.
    pub fn new(kind: TokenKind, text: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            text: text.into(),
            location,
        }
    }

    /// Creates a synthesized identifier token with no source location.
    ///
    /// Used for declarations the compiler injects (e.g. the implicit
    /// module variables).
    pub fn identifier(name: impl Into<String>) -> Self {
        Self::new(TokenKind::Identifier, name, Location::default())
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.text == other.text
    }
}

impl Eq for Token {}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind
            .cmp(&other.kind)
            .then_with(|| self.text.cmp(&other.text))
    }
}

impl PartialEq<TokenKind> for Token {
    fn eq(&self, other: &TokenKind) -> bool {
        self.kind == *other
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if !self.text.is_empty() {
            write!(f, " \"{}\"", self.text)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to collect all token kinds from source.
    fn lex_all(source: &str) -> Vec<TokenKind> {
        TokenKind::lexer(source).filter_map(|r| r.ok()).collect()
    }

    #[test]
    fn test_keywords() {
        assert_eq!(lex_all("do"), vec![TokenKind::KeywordDo]);
        assert_eq!(lex_all("structure"), vec![TokenKind::KeywordStructure]);
        assert_eq!(
            lex_all("end sub"),
            vec![TokenKind::KeywordEnd, TokenKind::KeywordSub]
        );
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        // Only lowercase spellings are keywords.
        assert_eq!(lex_all("DO"), vec![TokenKind::Identifier]);
        assert_eq!(lex_all("If"), vec![TokenKind::Identifier]);
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        assert_eq!(lex_all("dont"), vec![TokenKind::Identifier]);
        assert_eq!(lex_all("format"), vec![TokenKind::Identifier]);
    }

    #[test]
    fn test_symbol_merges() {
        assert_eq!(lex_all("="), vec![TokenKind::Assign]);
        assert_eq!(lex_all("=="), vec![TokenKind::Equal]);
        assert_eq!(lex_all("<"), vec![TokenKind::LessThan]);
        assert_eq!(lex_all("<>"), vec![TokenKind::NotEqual]);
        assert_eq!(
            lex_all("< >"),
            vec![TokenKind::LessThan, TokenKind::GreaterThan]
        );
    }

    #[test]
    fn test_spaced_arithmetic() {
        assert_eq!(
            lex_all("1 + 2 * 3"),
            vec![
                TokenKind::LiteralInt,
                TokenKind::Plus,
                TokenKind::LiteralInt,
                TokenKind::Times,
                TokenKind::LiteralInt,
            ]
        );
    }

    #[test]
    fn test_signed_number_munch() {
        // A sign directly followed by a digit belongs to the literal.
        assert_eq!(lex_all("1+2"), vec![TokenKind::LiteralInt]);
        assert_eq!(
            lex_all("x -5"),
            vec![TokenKind::Identifier, TokenKind::LiteralInt]
        );
        assert_eq!(
            lex_all("x - 5"),
            vec![
                TokenKind::Identifier,
                TokenKind::Minus,
                TokenKind::LiteralInt
            ]
        );
    }

    #[test]
    fn test_float_classification() {
        assert_eq!(lex_all("3.14"), vec![TokenKind::LiteralFloat]);
        assert_eq!(lex_all("5."), vec![TokenKind::LiteralFloat]);
        assert_eq!(lex_all("1.5e10"), vec![TokenKind::LiteralFloat]);
        // No dot means integer, exponent or not.
        assert_eq!(lex_all("1e5"), vec![TokenKind::LiteralInt]);
        // A leading dot is the dot symbol, not a number.
        assert_eq!(lex_all(".5"), vec![TokenKind::Dot, TokenKind::LiteralInt]);
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(lex_all(r#""hello there""#), vec![TokenKind::LiteralString]);
        assert_eq!(
            lex_all(r#""with \" escape""#),
            vec![TokenKind::LiteralString]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            lex_all("x # trailing comment\ny"),
            vec![TokenKind::Identifier, TokenKind::Identifier]
        );
        assert_eq!(lex_all("# only a comment"), vec![]);
    }

    #[test]
    fn test_token_equality_ignores_location() {
        let map = crate::source::SourceMap::new("a.bas", "foo\nfoo");
        let first = Token::new(TokenKind::Identifier, "foo", map.location(0));
        let second = Token::new(TokenKind::Identifier, "foo", map.location(4));

        assert_eq!(first, second);
    }

    #[test]
    fn test_token_ordering_by_kind_then_text() {
        let a = Token::identifier("alpha");
        let b = Token::identifier("beta");

        assert!(a < b);
        assert_eq!(a.cmp(&a), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_describe_set_formatting() {
        let set = [
            TokenKind::KeywordDo,
            TokenKind::KeywordFor,
            TokenKind::Identifier,
        ];

        assert_eq!(
            describe_set(&set),
            "the keyword do, the keyword for or an identifier"
        );
        assert_eq!(describe_set(&set[..1]), "the keyword do");
    }
}
