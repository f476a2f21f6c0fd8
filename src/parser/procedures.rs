//! Procedure and structure declaration parsing.
//!
//! Handles `sub`, `function`, and `structure` declarations, and the
//! `name as type [= expr]` parameter lists they share. Sub and function
//! parameter lists are comma-delimited and may be empty; structure bodies
//! use no delimiter and end at the `end` keyword.

use crate::ast::{
    FunctionDeclaration, Statement, StatementKind, SubDeclaration, VariableDeclaration,
};
use crate::lexer::{Token, TokenKind};

use super::{Parser, SyntaxError};

impl<'a, 'src> Parser<'a, 'src> {
    /// `sub name(params) ... end sub`
    pub(super) fn parse_sub_statement(
        &mut self,
        sub_token: Token,
    ) -> Result<Statement, SyntaxError> {
        let name = self.expect_identifier()?;

        self.expect(TokenKind::OpenBracket)?;
        let parameters = self.parse_parameter_declarations()?;
        self.expect(TokenKind::CloseBracket)?;

        let body = self.parse_block_body(&sub_token)?;

        Ok(Statement::new(
            StatementKind::Sub(SubDeclaration {
                name,
                parameters,
                body,
            }),
            sub_token.location,
        ))
    }

    /// `function name(params) as type ... end function`
    pub(super) fn parse_function_statement(
        &mut self,
        function_token: Token,
    ) -> Result<Statement, SyntaxError> {
        let name = self.expect_identifier()?;

        self.expect(TokenKind::OpenBracket)?;
        let parameters = self.parse_parameter_declarations()?;
        self.expect(TokenKind::CloseBracket)?;

        self.expect(TokenKind::KeywordAs)?;
        let return_type = self.expect_identifier()?;

        let body = self.parse_block_body(&function_token)?;

        Ok(Statement::new(
            StatementKind::Function(FunctionDeclaration {
                name,
                parameters,
                return_type,
                body,
            }),
            function_token.location,
        ))
    }

    /// `structure name <member declarations> end structure`
    pub(super) fn parse_structure_statement(
        &mut self,
        structure_token: Token,
    ) -> Result<Statement, SyntaxError> {
        let name = self.expect_identifier()?;

        let mut members = Vec::new();
        while !matches!(
            self.stream().peek_kind()?,
            TokenKind::KeywordEnd | TokenKind::Eof
        ) {
            members.push(self.parse_variable_declaration(None)?);
        }

        self.expect_end_for(&structure_token)?;

        Ok(Statement::new(
            StatementKind::Structure { name, members },
            structure_token.location,
        ))
    }

    /// Parses a comma-delimited parameter list, stopping before the
    /// closing bracket. An immediate `)` yields an empty list.
    fn parse_parameter_declarations(&mut self) -> Result<Vec<VariableDeclaration>, SyntaxError> {
        let mut parameters = Vec::new();

        if self.stream().peek_kind()? == TokenKind::CloseBracket {
            return Ok(parameters);
        }

        loop {
            parameters.push(self.parse_variable_declaration(None)?);

            if !self.found(TokenKind::Comma)? {
                return Ok(parameters);
            }
        }
    }
}
