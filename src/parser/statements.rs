//! Statement dispatch and simple statements.
//!
//! The next token's kind selects one of eleven statement rules; an
//! unrecognized leading token is a syntax error naming the full set of
//! valid statement leaders.

use crate::ast::{Statement, StatementKind, VariableDeclaration};
use crate::lexer::{describe_set, Token, TokenKind};

use super::{Parser, SyntaxError};

/// Tokens that may begin a statement, in dispatch order.
const STATEMENT_STARTERS: &[TokenKind] = &[
    TokenKind::KeywordDo,
    TokenKind::KeywordFor,
    TokenKind::KeywordSub,
    TokenKind::KeywordFunction,
    TokenKind::KeywordIf,
    TokenKind::KeywordLoad,
    TokenKind::KeywordLoop,
    TokenKind::KeywordSelect,
    TokenKind::KeywordStructure,
    TokenKind::KeywordVar,
    TokenKind::Identifier,
];

impl<'a, 'src> Parser<'a, 'src> {
    /// Parses a single statement, dispatching on its leading token.
    pub fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        let leading = self.stream().next()?;

        match leading.kind {
            TokenKind::KeywordDo => self.parse_do_statement(leading),
            TokenKind::KeywordFor => self.parse_for_statement(leading),
            TokenKind::KeywordSub => self.parse_sub_statement(leading),
            TokenKind::KeywordFunction => self.parse_function_statement(leading),
            TokenKind::KeywordIf => self.parse_if_statement(leading),
            TokenKind::KeywordLoad => self.parse_load_statement(leading),
            TokenKind::KeywordLoop => self.parse_loop_statement(leading),
            TokenKind::KeywordSelect => self.parse_select_statement(leading),
            TokenKind::KeywordStructure => self.parse_structure_statement(leading),
            TokenKind::KeywordVar => self.parse_variable_statement(leading),
            TokenKind::Identifier => self.parse_identifier_statement(leading),
            _ => Err(SyntaxError::unexpected(
                describe_set(STATEMENT_STARTERS),
                leading,
            )),
        }
    }

    /// `var name as type [= initializer]`
    fn parse_variable_statement(&mut self, var_token: Token) -> Result<Statement, SyntaxError> {
        let declaration = self.parse_variable_declaration(Some(&var_token))?;
        let location = declaration.location.clone();

        Ok(Statement::new(
            StatementKind::Variable(declaration),
            location,
        ))
    }

    /// Parses one `name as type [= expr]` declaration.
    ///
    /// When parsing a `var` statement the `var` keyword leads and provides
    /// the declaration's location; in parameter lists and structure bodies
    /// the name itself leads.
    pub(super) fn parse_variable_declaration(
        &mut self,
        var_token: Option<&Token>,
    ) -> Result<VariableDeclaration, SyntaxError> {
        let name = self.expect_identifier()?;
        let location = var_token
            .map(|token| token.location.clone())
            .unwrap_or_else(|| name.location.clone());

        self.expect(TokenKind::KeywordAs)?;
        let type_name = self.expect_identifier()?;

        let initializer = if self.found(TokenKind::Assign)? {
            Some(self.parse_expression()?)
        } else {
            None
        };

        Ok(VariableDeclaration {
            name,
            type_name,
            initializer,
            location,
        })
    }

    /// `load module [as alias]`
    fn parse_load_statement(&mut self, load_token: Token) -> Result<Statement, SyntaxError> {
        let module = self.expect_identifier()?;

        let alias = if self.found(TokenKind::KeywordAs)? {
            Some(self.expect_identifier()?)
        } else {
            None
        };

        Ok(Statement::new(
            StatementKind::Load { module, alias },
            load_token.location,
        ))
    }

    /// A statement led by a bare identifier: `name = expr` assigns,
    /// `name(args)` calls a sub.
    fn parse_identifier_statement(&mut self, name: Token) -> Result<Statement, SyntaxError> {
        let next = self.expect_one_of(&[TokenKind::OpenBracket, TokenKind::Assign])?;
        let location = name.location.clone();

        if next.kind == TokenKind::Assign {
            let value = self.parse_expression()?;

            return Ok(Statement::new(
                StatementKind::Assignment { name, value },
                location,
            ));
        }

        let arguments = self.parse_argument_list()?;
        self.expect(TokenKind::CloseBracket)?;

        Ok(Statement::new(
            StatementKind::SubCall { name, arguments },
            location,
        ))
    }
}
