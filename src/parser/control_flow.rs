//! Control flow statement parsing.
//!
//! Handles the block statements: `do`, `for`, `if`, `loop`, and `select`.
//! Every block closes with `end <opening keyword>`; a mismatched terminator
//! is a syntax error naming the keyword that opened the block. The `else
//! if` and `case` arms are recognized with speculative lookahead on the
//! token stream.

use crate::ast::{ConditionalBlock, Statement, StatementKind};
use crate::lexer::{Token, TokenKind};

use super::{Parser, SyntaxError};

impl<'a, 'src> Parser<'a, 'src> {
    /// Parses statements until `end`, then consumes the `end <keyword>`
    /// terminator matching the opening token.
    pub(super) fn parse_block_body(&mut self, open: &Token) -> Result<Vec<Statement>, SyntaxError> {
        let mut body = Vec::new();

        while !matches!(
            self.stream().peek_kind()?,
            TokenKind::KeywordEnd | TokenKind::Eof
        ) {
            body.push(self.parse_statement()?);
        }

        self.expect_end_for(open)?;

        Ok(body)
    }

    /// `do while|until test ... end do`
    pub(super) fn parse_do_statement(&mut self, do_token: Token) -> Result<Statement, SyntaxError> {
        let terminator = self.expect_one_of(&[TokenKind::KeywordWhile, TokenKind::KeywordUntil])?;
        let test = self.parse_expression()?;
        let body = self.parse_block_body(&do_token)?;

        Ok(Statement::new(
            StatementKind::Do {
                terminator,
                test,
                body,
            },
            do_token.location,
        ))
    }

    /// `for index = start to end [step expr] ... end for`
    pub(super) fn parse_for_statement(
        &mut self,
        for_token: Token,
    ) -> Result<Statement, SyntaxError> {
        let index = self.expect_identifier()?;
        self.expect(TokenKind::Assign)?;
        let start = self.parse_expression()?;
        self.expect(TokenKind::KeywordTo)?;
        let end = self.parse_expression()?;

        let step = if self.found(TokenKind::KeywordStep)? {
            Some(self.parse_expression()?)
        } else {
            None
        };

        let body = self.parse_block_body(&for_token)?;

        Ok(Statement::new(
            StatementKind::For {
                index,
                start,
                end,
                step,
                body,
            },
            for_token.location,
        ))
    }

    /// `loop ... end loop`
    pub(super) fn parse_loop_statement(
        &mut self,
        loop_token: Token,
    ) -> Result<Statement, SyntaxError> {
        let body = self.parse_block_body(&loop_token)?;

        Ok(Statement::new(
            StatementKind::Loop { body },
            loop_token.location,
        ))
    }

    /// `if test then ... [else if test then ...]* [else ...] end if`
    pub(super) fn parse_if_statement(&mut self, if_token: Token) -> Result<Statement, SyntaxError> {
        let main = self.parse_if_arm()?;

        let mut else_ifs = Vec::new();
        while self.found_else_if()? {
            else_ifs.push(self.parse_if_arm()?);
        }

        let else_body = if self.found(TokenKind::KeywordElse)? {
            self.parse_if_arm_body()?
        } else {
            Vec::new()
        };

        self.expect_end_for(&if_token)?;

        Ok(Statement::new(
            StatementKind::If {
                main,
                else_ifs,
                else_body,
            },
            if_token.location,
        ))
    }

    /// One `test then <body>` arm of an `if` chain.
    fn parse_if_arm(&mut self) -> Result<ConditionalBlock, SyntaxError> {
        let test = self.parse_expression()?;
        self.expect(TokenKind::KeywordThen)?;
        let body = self.parse_if_arm_body()?;

        Ok(ConditionalBlock { test, body })
    }

    /// Statements up to the next `end`, `else`, or end of file.
    fn parse_if_arm_body(&mut self) -> Result<Vec<Statement>, SyntaxError> {
        let mut body = Vec::new();

        while !matches!(
            self.stream().peek_kind()?,
            TokenKind::KeywordEnd | TokenKind::KeywordElse | TokenKind::Eof
        ) {
            body.push(self.parse_statement()?);
        }

        Ok(body)
    }

    /// Speculatively reads two tokens to distinguish `else if` from a
    /// plain `else`, committing only when both match.
    fn found_else_if(&mut self) -> Result<bool, SyntaxError> {
        self.stream().mark();

        let else_token = self.stream().next()?;
        let if_token = self.stream().next()?;

        if else_token.kind == TokenKind::KeywordElse && if_token.kind == TokenKind::KeywordIf {
            self.stream().commit();
            Ok(true)
        } else {
            self.stream().cancel();
            Ok(false)
        }
    }

    /// `select test case expr ... [else ...] end select`
    pub(super) fn parse_select_statement(
        &mut self,
        select_token: Token,
    ) -> Result<Statement, SyntaxError> {
        let test = self.parse_expression()?;

        let mut cases = Vec::new();
        while self.found(TokenKind::KeywordCase)? {
            let test = self.parse_expression()?;
            let body = self.parse_case_body()?;
            cases.push(ConditionalBlock { test, body });
        }

        let default = if self.found(TokenKind::KeywordElse)? {
            self.parse_case_body()?
        } else {
            Vec::new()
        };

        self.expect_end_for(&select_token)?;

        Ok(Statement::new(
            StatementKind::Select {
                test,
                cases,
                default,
            },
            select_token.location,
        ))
    }

    /// Statements up to the next `case`, `else`, `end`, or end of file.
    fn parse_case_body(&mut self) -> Result<Vec<Statement>, SyntaxError> {
        let mut body = Vec::new();

        while !matches!(
            self.stream().peek_kind()?,
            TokenKind::KeywordEnd
                | TokenKind::KeywordElse
                | TokenKind::KeywordCase
                | TokenKind::Eof
        ) {
            body.push(self.parse_statement()?);
        }

        Ok(body)
    }
}
