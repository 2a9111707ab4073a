//! The main parser implementation.

use tracing::{debug, trace};

use super::precedence::{Precedence, infix_operator};
use super::{ParseError, ParseErrorKind};
use crate::ast::*;
use crate::lexer::{Lexer, Token, TokenBuffer, TokenKind, TokenSource};

/// A recursive descent parser for koa contracts.
///
/// Statements are parsed by recursive descent, expressions by precedence
/// climbing. Any [`TokenSource`] can feed the parser; by default it reads
/// from a [`Lexer`] running on its own thread.
pub struct Parser<S: TokenSource = Lexer> {
    tokens: TokenBuffer<S>,
}

impl Parser<Lexer> {
    /// Creates a parser that lexes `source` concurrently.
    pub fn new(source: &str) -> Self {
        Self::from_buffer(TokenBuffer::new(Lexer::new(source)))
    }

    /// Like [`new`](Self::new) with a custom token queue capacity.
    pub fn with_capacity(source: &str, capacity: usize) -> Self {
        Self::from_buffer(TokenBuffer::new(Lexer::with_capacity(source, capacity)))
    }
}

impl<S: TokenSource> Parser<S> {
    /// Creates a parser over an existing token buffer.
    pub fn from_buffer(tokens: TokenBuffer<S>) -> Self {
        Self { tokens }
    }

    /// Parses a whole contract. Nothing but whitespace may follow its
    /// closing brace.
    pub fn parse_contract(&mut self) -> Result<Contract, ParseError> {
        self.expect(TokenKind::Contract)?;
        self.expect(TokenKind::LBrace)?;

        let mut functions = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            functions.push(self.parse_function()?);
        }

        self.expect(TokenKind::RBrace)?;
        self.expect(TokenKind::Eos)?;

        debug!(functions = functions.len(), "parsed contract");
        Ok(Contract { functions })
    }

    /// Parses `func name(params) type { ... }`.
    pub fn parse_function(&mut self) -> Result<FunctionLiteral, ParseError> {
        self.expect(TokenKind::Func)?;
        let name = self.expect_identifier()?;

        self.expect(TokenKind::LParen)?;
        let parameters = self.parse_parameters()?;
        self.expect(TokenKind::RParen)?;

        let return_type = if self.current_kind().is_type() {
            self.parse_type()?
        } else {
            DataStructure::Void
        };

        let body = self.parse_block()?;

        trace!(function = %name, params = parameters.len(), "parsed function");
        Ok(FunctionLiteral {
            name,
            parameters,
            return_type,
            body,
        })
    }

    fn parse_parameters(&mut self) -> Result<Vec<ParameterLiteral>, ParseError> {
        let mut parameters = Vec::new();
        if self.check(TokenKind::RParen) {
            return Ok(parameters);
        }

        loop {
            let identifier = self.expect_identifier()?;
            let ty = self.parse_type()?;
            parameters.push(ParameterLiteral { identifier, ty });

            if !self.check(TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        Ok(parameters)
    }

    fn parse_type(&mut self) -> Result<DataStructure, ParseError> {
        let ty = match self.current_kind() {
            TokenKind::IntType => DataStructure::Int,
            TokenKind::StringType => DataStructure::String,
            TokenKind::BoolType => DataStructure::Bool,
            _ => return Err(self.unexpected("type")),
        };
        self.advance();
        Ok(ty)
    }

    /// Parses `{ statement* }`.
    pub fn parse_block(&mut self) -> Result<BlockStatement, ParseError> {
        self.expect(TokenKind::LBrace)?;

        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        self.expect(TokenKind::RBrace)?;
        Ok(BlockStatement { statements })
    }

    /// Parses a single statement.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        match self.current_kind() {
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::If => self.parse_if_statement(),
            kind if kind.is_type() => self.parse_assign_statement(),
            _ => {
                let expr = self.parse_expression(Precedence::Lowest)?;
                Ok(Statement::Expression(ExpressionStatement { expr }))
            }
        }
    }

    fn parse_return_statement(&mut self) -> Result<Statement, ParseError> {
        self.advance(); // consume 'return'

        let return_value = if self.check(TokenKind::RBrace) {
            None
        } else {
            Some(self.parse_expression(Precedence::Lowest)?)
        };

        Ok(Statement::Return(ReturnStatement { return_value }))
    }

    fn parse_assign_statement(&mut self) -> Result<Statement, ParseError> {
        let ty = self.parse_type()?;
        let variable = self.expect_identifier()?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expression(Precedence::Lowest)?;

        Ok(Statement::Assign(AssignStatement {
            ty,
            variable,
            value,
        }))
    }

    fn parse_if_statement(&mut self) -> Result<Statement, ParseError> {
        self.advance(); // consume 'if'

        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::RParen)?;

        let consequence = self.parse_block()?;

        let alternative = if self.check(TokenKind::Else) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Statement::If(IfStatement {
            condition,
            consequence,
            alternative,
        }))
    }

    /// Parses an expression whose operators all bind tighter than
    /// `precedence`.
    pub fn parse_expression(&mut self, precedence: Precedence) -> Result<Expression, ParseError> {
        let mut left = self.parse_prefix()?;

        loop {
            let kind = self.current_kind();
            let next = Precedence::of(kind);
            if next <= precedence {
                break;
            }
            let Some(operator) = infix_operator(kind) else {
                break;
            };
            self.advance();

            let right = self.parse_expression(next)?;
            left = Expression::Infix(InfixExpression {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expression, ParseError> {
        let token = self.tokens.current().clone();

        let expr = match token.kind {
            TokenKind::Ident => Expression::Identifier(Identifier::new(token.literal)),
            TokenKind::Int => {
                let value = token
                    .literal
                    .parse::<i64>()
                    .map_err(|_| error_at(&token, ParseErrorKind::InvalidInteger(token.literal.clone())))?;
                Expression::IntegerLiteral(IntegerLiteral { value })
            }
            TokenKind::String => Expression::StringLiteral(StringLiteral {
                value: unquote(&token.literal),
            }),
            TokenKind::True | TokenKind::False => Expression::BooleanLiteral(BooleanLiteral {
                value: token.kind == TokenKind::True,
            }),
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression(Precedence::Lowest)?;
                self.expect(TokenKind::RParen)?;
                return Ok(expr);
            }
            TokenKind::Minus | TokenKind::Bang => {
                self.advance();
                let operator = if token.kind == TokenKind::Minus {
                    Operator::Minus
                } else {
                    Operator::Bang
                };
                let right = self.parse_expression(Precedence::Prefix)?;
                return Ok(Expression::Prefix(PrefixExpression {
                    operator,
                    right: Box::new(right),
                }));
            }
            _ => return Err(self.unexpected("expression")),
        };

        self.advance();
        Ok(expr)
    }

    // ========================================================================
    // Token helpers
    // ========================================================================

    fn current_kind(&mut self) -> TokenKind {
        self.tokens.current().kind
    }

    fn advance(&mut self) -> Token {
        self.tokens.next()
    }

    fn check(&mut self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn is_at_end(&mut self) -> bool {
        self.check(TokenKind::Eos)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    fn expect_identifier(&mut self) -> Result<Identifier, ParseError> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(Identifier::new(token.literal))
    }

    /// Error for the current token. Illegal tokens get their own kind.
    fn unexpected(&mut self, expected: &str) -> ParseError {
        let token = self.tokens.current();
        let kind = match token.kind {
            TokenKind::Illegal => ParseErrorKind::Illegal(token.literal.clone()),
            _ => ParseErrorKind::Unexpected {
                expected: expected.to_string(),
                found: token.to_string(),
            },
        };
        error_at(token, kind)
    }
}

fn error_at(token: &Token, kind: ParseErrorKind) -> ParseError {
    ParseError {
        kind,
        line: token.line,
        position: token.position,
    }
}

/// Strips the quotes from a string token and resolves its escapes.
fn unquote(literal: &str) -> String {
    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(literal);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"hello\""), "hello");
        assert_eq!(unquote("\"a\\\"b\""), "a\"b");
        assert_eq!(unquote("\"tab\\tnew\\n\""), "tab\tnew\n");
        assert_eq!(unquote("\"\\\\\""), "\\");
        assert_eq!(unquote("\"\""), "");
    }
}
