//! Parser for koa source code.
//!
//! Transforms a stream of tokens into an Abstract Syntax Tree (AST).
//!
//! ## Structure
//!
//! - `parser` - Recursive descent for declarations and statements,
//!   precedence climbing for expressions
//! - `precedence` - Binding power of each infix operator
//!
//! ## Usage
//!
//! ```rust
//! use koa_compiler::parser::Parser;
//!
//! let mut parser = Parser::new("contract { func f(a int) int { return a } }");
//! let contract = parser.parse_contract().expect("Should parse");
//! assert_eq!(contract.functions[0].to_string(), "func f(a int) int { return a }");
//! ```

#[allow(clippy::module_inception)]
mod parser;
mod precedence;

#[cfg(test)]
mod tests;

pub use parser::Parser;
pub use precedence::Precedence;

use thiserror::Error;

/// A syntax error at a source location.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}, position {position}: {kind}")]
pub struct ParseError {
    /// What went wrong
    pub kind: ParseErrorKind,
    /// 1-based line of the offending token
    pub line: usize,
    /// Byte offset of the offending token
    pub position: usize,
}

/// The kinds of syntax error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A token the grammar does not allow here
    #[error("expected {expected}, found {found}")]
    Unexpected {
        /// What the grammar allows here
        expected: String,
        /// The token actually read
        found: String,
    },

    /// A character sequence the lexer could not classify
    #[error("illegal token '{0}'")]
    Illegal(String),

    /// An integer literal too large for 64 bits
    #[error("invalid integer literal '{0}'")]
    InvalidInteger(String),
}
