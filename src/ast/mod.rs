//! Abstract Syntax Tree (AST) definitions for Basil.
//!
//! The AST represents the structure of a program after parsing. Each node
//! corresponds to a syntactic construct and carries the [`Location`] it was
//! parsed at.
//!
//! # Design Decisions
//!
//! - **Tagged unions**: expressions and statements are closed `enum`s with
//!   exhaustive `match` dispatch, so adding or removing a node kind is a
//!   compile-time checked change.
//! - **Strict trees**: every subexpression and substatement is owned by
//!   exactly one parent (`Box`/`Vec`, no sharing, no cycles).
//! - **Owned nodes**: the AST owns its token text and can outlive the
//!   source buffer it was parsed from.
//!
//! [`Location`]: crate::source::Location

mod expr;
mod stmt;

pub use expr::{Expr, ExprKind};
pub use stmt::{
    ConditionalBlock, FunctionDeclaration, Statement, StatementKind, SubDeclaration,
    VariableDeclaration,
};

/// A sequence of statements in source order.
///
/// Order is semantically significant — it is both declaration order and
/// execution order — and is preserved through every compilation stage.
pub type StatementList = Vec<Statement>;
