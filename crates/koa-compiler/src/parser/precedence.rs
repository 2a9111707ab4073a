//! Operator precedence.

use crate::ast::Operator;
use crate::lexer::TokenKind;

/// Binding power of an operator. Higher binds tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// Not an operator
    Lowest = 0,
    /// `||`
    LogicalOr = 1,
    /// `&&`
    LogicalAnd = 2,
    /// `==` `!=`
    Equals = 3,
    /// `<` `>` `<=` `>=`
    LessGreater = 4,
    /// `+` `-`
    Sum = 5,
    /// `*` `/` `%`
    Product = 6,
    /// `-x` `!x`
    Prefix = 7,
}

impl Precedence {
    /// Precedence of `kind` in infix position.
    pub fn of(kind: TokenKind) -> Precedence {
        match kind {
            TokenKind::Lor => Precedence::LogicalOr,
            TokenKind::Land => Precedence::LogicalAnd,
            TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => {
                Precedence::LessGreater
            }
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Asterisk | TokenKind::Slash | TokenKind::Mod => Precedence::Product,
            _ => Precedence::Lowest,
        }
    }
}

/// The infix operator spelled by `kind`.
pub fn infix_operator(kind: TokenKind) -> Option<Operator> {
    let op = match kind {
        TokenKind::Plus => Operator::Plus,
        TokenKind::Minus => Operator::Minus,
        TokenKind::Asterisk => Operator::Asterisk,
        TokenKind::Slash => Operator::Slash,
        TokenKind::Mod => Operator::Mod,
        TokenKind::Lt => Operator::Lt,
        TokenKind::Gt => Operator::Gt,
        TokenKind::LtEq => Operator::LtEq,
        TokenKind::GtEq => Operator::GtEq,
        TokenKind::Eq => Operator::Eq,
        TokenKind::NotEq => Operator::NotEq,
        TokenKind::Land => Operator::Land,
        TokenKind::Lor => Operator::Lor,
        _ => return None,
    };
    Some(op)
}
