//! Lookahead buffer between the lexer and the parser.

use std::collections::VecDeque;

use super::{Token, TokenSource};

/// Gives the parser `current`/`peek`/`next` over any [`TokenSource`].
///
/// Tokens are pulled lazily. Once the source has produced its EOS token the
/// buffer stops pulling and repeats that token.
pub struct TokenBuffer<S: TokenSource> {
    source: S,
    lookahead: VecDeque<Token>,
    eos: Option<Token>,
}

impl<S: TokenSource> TokenBuffer<S> {
    /// Wraps a token source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            lookahead: VecDeque::with_capacity(4),
            eos: None,
        }
    }

    /// The token the parser is looking at.
    pub fn current(&mut self) -> &Token {
        self.peek_nth(0)
    }

    /// The token after [`current`](Self::current).
    pub fn peek(&mut self) -> &Token {
        self.peek_nth(1)
    }

    /// The `n`-th token ahead, `0` being the current one.
    pub fn peek_nth(&mut self, n: usize) -> &Token {
        while self.lookahead.len() <= n {
            let token = self.pull();
            self.lookahead.push_back(token);
        }
        &self.lookahead[n]
    }

    /// Consumes and returns the current token.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Token {
        match self.lookahead.pop_front() {
            Some(token) => token,
            None => self.pull(),
        }
    }

    fn pull(&mut self) -> Token {
        if let Some(eos) = &self.eos {
            return eos.clone();
        }
        let token = self.source.next_token();
        if token.is_eos() {
            self.eos = Some(token.clone());
        }
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{tokenize, Lexer, TokenKind};

    #[test]
    fn test_current_and_peek_do_not_consume() {
        let mut buf = TokenBuffer::new(tokenize("a = 1").into_iter());
        assert_eq!(buf.current().literal, "a");
        assert_eq!(buf.peek().literal, "=");
        assert_eq!(buf.peek().literal, "=");
        assert_eq!(buf.current().literal, "a");
    }

    #[test]
    fn test_next_never_repeats() {
        let mut buf = TokenBuffer::new(Lexer::new("a = 1"));
        assert_eq!(buf.next().literal, "a");
        assert_eq!(buf.current().literal, "=");
        assert_eq!(buf.next().literal, "=");
        assert_eq!(buf.next().literal, "1");
        assert!(buf.next().is_eos());
    }

    #[test]
    fn test_peek_past_end() {
        let mut buf = TokenBuffer::new(Lexer::new("x"));
        assert_eq!(buf.peek_nth(5).kind, TokenKind::Eos);
        assert_eq!(buf.next().literal, "x");
        assert!(buf.next().is_eos());
        assert!(buf.current().is_eos());
    }
}
