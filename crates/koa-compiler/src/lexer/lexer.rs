//! The concurrent lexer.
//!
//! The state machine runs on its own thread and pushes tokens into a bounded
//! channel, so it can run a couple of tokens ahead of the parser without
//! buffering the whole input. Dropping the [`Lexer`] disconnects the channel,
//! which stops the producer at its next emit, and then joins the thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, trace, warn};

use super::state::{self, Emitter};
use super::Token;

/// Default capacity of the token queue between lexer and parser.
pub const DEFAULT_QUEUE_CAPACITY: usize = 2;

/// Anything the parser can pull tokens from.
///
/// After the end of input has been reached every call returns an EOS token.
pub trait TokenSource {
    /// Returns the next token, blocking until one is available.
    fn next_token(&mut self) -> Token;
}

impl TokenSource for std::vec::IntoIter<Token> {
    fn next_token(&mut self) -> Token {
        self.next().unwrap_or_else(|| Token::eos(0, 0))
    }
}

struct ChannelEmitter {
    sender: Sender<Token>,
}

impl Emitter for ChannelEmitter {
    fn emit(&mut self, token: Token) -> bool {
        trace!(kind = %token.kind, literal = %token.literal, "emit");
        self.sender.send(token).is_ok()
    }
}

/// Tokenizes source text on a background thread.
pub struct Lexer {
    receiver: Option<Receiver<Token>>,
    handle: Option<JoinHandle<()>>,
    eos: Option<Token>,
    last: (usize, usize),
    done: bool,
}

impl Lexer {
    /// Starts lexing `input` with the default queue capacity.
    pub fn new(input: impl Into<String>) -> Self {
        Self::with_capacity(input, DEFAULT_QUEUE_CAPACITY)
    }

    /// Starts lexing `input` with a queue holding at most `capacity` tokens.
    pub fn with_capacity(input: impl Into<String>, capacity: usize) -> Self {
        let input: Arc<str> = Arc::from(input.into());
        let (sender, receiver) = channel::bounded(capacity);

        let source = Arc::clone(&input);
        let producer = sender.clone();
        let spawned = thread::Builder::new()
            .name("koa-lexer".into())
            .spawn(move || {
                debug!(len = source.len(), "lexer started");
                state::run(&source, &mut ChannelEmitter { sender: producer });
                debug!("lexer finished");
            });
        drop(sender);

        match spawned {
            Ok(handle) => Self {
                receiver: Some(receiver),
                handle: Some(handle),
                eos: None,
                last: (0, 1),
                done: false,
            },
            Err(err) => {
                // No thread available: lex everything up front instead.
                warn!(%err, "could not spawn lexer thread, lexing eagerly");
                let (sender, receiver) = channel::unbounded();
                state::run(&input, &mut ChannelEmitter { sender });
                Self {
                    receiver: Some(receiver),
                    handle: None,
                    eos: None,
                    last: (0, 1),
                    done: false,
                }
            }
        }
    }
}

impl TokenSource for Lexer {
    fn next_token(&mut self) -> Token {
        if let Some(eos) = &self.eos {
            return eos.clone();
        }

        let received = self.receiver.as_ref().and_then(|rx| rx.recv().ok());
        let token = match received {
            Some(token) => token,
            // The producer went away without an EOS; synthesize one.
            None => Token::eos(self.last.0, self.last.1),
        };

        self.last = (token.position + token.literal.len(), token.line);
        if token.is_eos() {
            self.eos = Some(token.clone());
        }
        token
    }
}

impl Iterator for Lexer {
    type Item = Token;

    /// Yields every token up to and including the EOS token.
    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        let token = self.next_token();
        self.done = token.is_eos();
        Some(token)
    }
}

impl Drop for Lexer {
    fn drop(&mut self) {
        self.receiver.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("lexer thread panicked");
            }
        }
    }
}

impl std::fmt::Debug for Lexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("finished", &self.eos.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{tokenize, TokenKind};

    #[test]
    fn test_lexer_matches_synchronous_tokenize() {
        let src = "contract { func f(a int) int { return a + 1 } }";
        let concurrent: Vec<Token> = Lexer::new(src).collect();
        assert_eq!(concurrent, tokenize(src));
    }

    #[test]
    fn test_next_token_after_eos_keeps_returning_eos() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().kind, TokenKind::Ident);
        for _ in 0..3 {
            let token = lexer.next_token();
            assert!(token.is_eos());
            assert_eq!(token.position, 1);
        }
    }

    #[test]
    fn test_drop_before_draining_does_not_hang() {
        let src = "a ".repeat(10_000);
        let mut lexer = Lexer::with_capacity(src, 1);
        assert_eq!(lexer.next_token().literal, "a");
        drop(lexer);
    }

    #[test]
    fn test_rendezvous_queue() {
        let tokens: Vec<Token> = Lexer::with_capacity("1 2 3", 0).collect();
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn test_vec_source() {
        let mut source = tokenize("a").into_iter();
        assert_eq!(source.next_token().literal, "a");
        assert!(source.next_token().is_eos());
        assert!(source.next_token().is_eos());
    }
}
