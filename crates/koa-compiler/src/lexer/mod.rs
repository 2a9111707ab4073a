//! Lexical analysis (tokenization) for koa source code.
//!
//! ## Structure
//!
//! - `token.rs` - `Token` and `TokenKind` definitions
//! - `state.rs` - the state-function machine and its trampoline
//! - `lexer.rs` - `Lexer`, which runs the machine on a background thread
//! - `buffer.rs` - `TokenBuffer`, the parser's lookahead window
//!
//! ## Usage
//!
//! ```rust
//! use koa_compiler::lexer::{Lexer, TokenBuffer, TokenKind};
//!
//! let mut tokens = TokenBuffer::new(Lexer::new("func add(a int) int {}"));
//!
//! assert_eq!(tokens.current().kind, TokenKind::Func);
//! assert_eq!(tokens.peek().literal, "add");
//! ```

mod buffer;
#[allow(clippy::module_inception)]
mod lexer;
mod state;
mod token;

pub use buffer::TokenBuffer;
pub use lexer::{DEFAULT_QUEUE_CAPACITY, Lexer, TokenSource};
pub use state::{Emitter, State, StateFn, run, tokenize};
pub use token::{Token, TokenKind};
