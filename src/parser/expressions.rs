//! Expression parsing by precedence climbing.
//!
//! A prefix term is parsed first (literal, name, subscript, call, or
//! parenthesized group), then infix operators are folded in while their
//! precedence exceeds the caller's minimum. Operators of equal precedence
//! therefore associate to the left.
//!
//! # Precedence Levels (lowest to highest)
//!
//! 1. Conditional: `and`, `or`, `not`
//! 2. Equality: `==`, `<>`, `<`, `>`
//! 3. Sum: `+`, `-`
//! 4. Product: `*`, `/`

use crate::ast::{Expr, ExprKind};
use crate::lexer::{describe_set, Token, TokenKind};

use super::{Parser, Precedence, SyntaxError};

/// Tokens that may begin an expression.
const EXPRESSION_STARTERS: &[TokenKind] = &[
    TokenKind::LiteralInt,
    TokenKind::LiteralFloat,
    TokenKind::LiteralString,
    TokenKind::Identifier,
    TokenKind::OpenBracket,
    TokenKind::KeywordNot,
];

impl<'a, 'src> Parser<'a, 'src> {
    /// Parses a full expression.
    pub fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_precedence(Precedence::None)
    }

    /// Parses an expression whose infix operators all bind tighter than
    /// `minimum`.
    pub(super) fn parse_precedence(&mut self, minimum: Precedence) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_prefix_term()?;

        loop {
            let precedence = Precedence::of_infix(self.stream().peek_kind()?);
            if precedence <= minimum {
                return Ok(left);
            }

            let operator = self.stream().next()?;
            let right = self.parse_precedence(precedence)?;
            let location = left.location.clone();

            left = Expr::new(
                ExprKind::Binary {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                location,
            );
        }
    }

    /// Parses a prefix term: a literal, a name (bare, subscripted, or
    /// called), a parenthesized group, or a `not` application.
    fn parse_prefix_term(&mut self) -> Result<Expr, SyntaxError> {
        let token = self.stream().next()?;

        match token.kind {
            TokenKind::LiteralInt | TokenKind::LiteralFloat | TokenKind::LiteralString => {
                let location = token.location.clone();
                Ok(Expr::new(ExprKind::Literal(token), location))
            }
            TokenKind::Identifier => self.parse_name_expression(token),
            TokenKind::OpenBracket => {
                let inner = self.parse_expression()?;
                self.expect(TokenKind::CloseBracket)?;
                Ok(inner)
            }
            TokenKind::KeywordNot => {
                let operand = self.parse_precedence(Precedence::Conditional)?;
                let location = token.location.clone();

                Ok(Expr::new(
                    ExprKind::Prefix {
                        operator: token,
                        operand: Box::new(operand),
                    },
                    location,
                ))
            }
            _ => Err(SyntaxError::unexpected(
                describe_set(EXPRESSION_STARTERS),
                token,
            )),
        }
    }

    /// Parses the continuation of a name: `name(args)` is a call,
    /// `name[subscript]` is an array read, a bare name is a variable read.
    fn parse_name_expression(&mut self, name: Token) -> Result<Expr, SyntaxError> {
        let location = name.location.clone();

        if self.stream().peek_kind()? == TokenKind::OpenBracket {
            self.stream().next()?;
            let arguments = self.parse_argument_list()?;
            self.expect(TokenKind::CloseBracket)?;

            return Ok(Expr::new(
                ExprKind::FunctionCall { name, arguments },
                location,
            ));
        }

        let subscript = if self.found(TokenKind::OpenSquare)? {
            let subscript = self.parse_expression()?;
            self.expect(TokenKind::CloseSquare)?;
            Some(Box::new(subscript))
        } else {
            None
        };

        Ok(Expr::new(
            ExprKind::VariableRead { name, subscript },
            location,
        ))
    }

    /// Parses a comma-separated argument list, stopping before the closing
    /// bracket. An immediate `)` yields an empty list.
    pub(super) fn parse_argument_list(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut arguments = Vec::new();

        if self.stream().peek_kind()? == TokenKind::CloseBracket {
            return Ok(arguments);
        }

        loop {
            arguments.push(self.parse_expression()?);

            if !self.found(TokenKind::Comma)? {
                return Ok(arguments);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenStream;

    fn parse_expr(source: &str) -> Expr {
        let mut stream = TokenStream::new(source);
        Parser::new(&mut stream).parse_expression().unwrap()
    }

    /// Renders an expression as a fully parenthesized string for shape
    /// assertions.
    fn shape(expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Literal(token) => token.text.clone(),
            ExprKind::VariableRead { name, subscript } => match subscript {
                Some(subscript) => format!("{}[{}]", name.text, shape(subscript)),
                None => name.text.clone(),
            },
            ExprKind::Prefix { operator, operand } => {
                format!("({} {})", operator.kind.describe(), shape(operand))
            }
            ExprKind::Binary {
                operator,
                left,
                right,
            } => {
                let symbol = match operator.kind {
                    TokenKind::Plus => "+",
                    TokenKind::Minus => "-",
                    TokenKind::Times => "*",
                    TokenKind::Divide => "/",
                    TokenKind::Equal => "==",
                    TokenKind::NotEqual => "<>",
                    TokenKind::LessThan => "<",
                    TokenKind::GreaterThan => ">",
                    TokenKind::KeywordAnd => "and",
                    TokenKind::KeywordOr => "or",
                    other => other.describe(),
                };
                format!("({} {} {})", shape(left), symbol, shape(right))
            }
            ExprKind::Postfix { operand, operator } => {
                format!("({} {})", shape(operand), operator.kind.describe())
            }
            ExprKind::FunctionCall { name, arguments } => {
                let arguments: Vec<String> = arguments.iter().map(shape).collect();
                format!("{}({})", name.text, arguments.join(", "))
            }
        }
    }

    #[test]
    fn test_product_binds_tighter_than_sum() {
        assert_eq!(shape(&parse_expr("1 + 2 * 3")), "(1 + (2 * 3))");
        assert_eq!(shape(&parse_expr("1 * 2 + 3")), "((1 * 2) + 3)");
    }

    #[test]
    fn test_equal_precedence_is_left_associative() {
        assert_eq!(shape(&parse_expr("1 - 2 - 3")), "((1 - 2) - 3)");
        assert_eq!(shape(&parse_expr("8 / 4 / 2")), "((8 / 4) / 2)");
    }

    #[test]
    fn test_grouping_overrides_precedence() {
        assert_eq!(shape(&parse_expr("(1 + 2) * 3")), "((1 + 2) * 3)");
    }

    #[test]
    fn test_comparison_and_conditional_levels() {
        assert_eq!(
            shape(&parse_expr("a < b and c > d")),
            "((a < b) and (c > d))"
        );
        assert_eq!(shape(&parse_expr("a == b or c <> d")), "((a == b) or (c <> d))");
    }

    #[test]
    fn test_not_as_prefix() {
        assert_eq!(
            shape(&parse_expr("not a == b")),
            "(the keyword not (a == b))"
        );
    }

    #[test]
    fn test_subscript_read() {
        assert_eq!(shape(&parse_expr("values[i + 1]")), "values[(i + 1)]");
    }

    #[test]
    fn test_function_call_arguments() {
        assert_eq!(shape(&parse_expr("max(a, b + 1, 3)")), "max(a, (b + 1), 3)");
        assert_eq!(shape(&parse_expr("now()")), "now()");
    }

    #[test]
    fn test_string_literal_term() {
        let expr = parse_expr(r#""hello""#);
        assert!(matches!(
            &expr.kind,
            ExprKind::Literal(token) if token.kind == TokenKind::LiteralString
        ));
    }

    #[test]
    fn test_missing_term_is_an_error() {
        let mut stream = TokenStream::new("1 + ,");
        let error = Parser::new(&mut stream).parse_expression().unwrap_err();

        assert!(error.to_string().contains("a literal integer value"));
        assert!(error.to_string().contains("found the symbol ,"));
    }

    #[test]
    fn test_unclosed_group_is_an_error() {
        let mut stream = TokenStream::new("(1 + 2");
        let error = Parser::new(&mut stream).parse_expression().unwrap_err();

        assert!(error.to_string().contains("the symbol )"));
    }
}
