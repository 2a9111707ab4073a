//! Token definitions for the koa lexer.

use std::fmt;

/// A token produced by the lexer.
///
/// The literal is the exact source slice the token was cut from, so string
/// tokens keep their surrounding quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The source text of the token
    pub literal: String,
    /// Byte offset of the first character of the token
    pub position: usize,
    /// 1-based line the token starts on
    pub line: usize,
}

impl Token {
    /// Creates a new token.
    pub fn new(kind: TokenKind, literal: impl Into<String>, position: usize, line: usize) -> Self {
        Self {
            kind,
            literal: literal.into(),
            position,
            line,
        }
    }

    /// Creates the end-of-input token at the given location.
    pub fn eos(position: usize, line: usize) -> Self {
        Self::new(TokenKind::Eos, "", position, line)
    }

    /// Returns true if this token marks the end of input.
    pub fn is_eos(&self) -> bool {
        self.kind == TokenKind::Eos
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eos => write!(f, "end of input"),
            _ => write!(f, "{} '{}'", self.kind, self.literal),
        }
    }
}

/// The different kinds of tokens in koa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A character sequence no rule accepts
    Illegal,
    /// End of input
    Eos,

    // Identifiers and literals
    /// Identifier
    Ident,
    /// Integer literal
    Int,
    /// String literal, quotes included in the literal
    String,

    // Keywords
    /// contract
    Contract,
    /// func
    Func,
    /// int
    IntType,
    /// string
    StringType,
    /// bool
    BoolType,
    /// true
    True,
    /// false
    False,
    /// if
    If,
    /// else
    Else,
    /// return
    Return,

    // Operators
    /// =
    Assign,
    /// +
    Plus,
    /// -
    Minus,
    /// !
    Bang,
    /// *
    Asterisk,
    /// /
    Slash,
    /// %
    Mod,
    /// <
    Lt,
    /// >
    Gt,
    /// ==
    Eq,
    /// !=
    NotEq,
    /// <=
    LtEq,
    /// >=
    GtEq,
    /// &&
    Land,
    /// ||
    Lor,

    // Delimiters
    /// ,
    Comma,
    /// (
    LParen,
    /// )
    RParen,
    /// {
    LBrace,
    /// }
    RBrace,
}

impl TokenKind {
    /// Looks up the keyword spelled by `ident`, if any.
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        let kind = match ident {
            "contract" => TokenKind::Contract,
            "func" => TokenKind::Func,
            "int" => TokenKind::IntType,
            "string" => TokenKind::StringType,
            "bool" => TokenKind::BoolType,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "return" => TokenKind::Return,
            _ => return None,
        };
        Some(kind)
    }

    /// Returns true for the keywords naming a data type.
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            TokenKind::IntType | TokenKind::StringType | TokenKind::BoolType
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eos => "EOS",
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::String => "STRING",
            TokenKind::Contract => "contract",
            TokenKind::Func => "func",
            TokenKind::IntType => "int",
            TokenKind::StringType => "string",
            TokenKind::BoolType => "bool",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::Return => "return",
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Bang => "!",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Mod => "%",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::Land => "&&",
            TokenKind::Lor => "||",
            TokenKind::Comma => ",",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
        };
        f.write_str(name)
    }
}
