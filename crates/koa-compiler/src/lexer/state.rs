//! The lexing state machine.
//!
//! Every lexical rule is a state function: it looks at the window between
//! `start` and `pos`, emits zero or more tokens and hands back the state to
//! run next. [`run`] is the trampoline that keeps calling whatever state came
//! back until one returns `None`.
//!
//! ```text
//! default ──digit──▶ number ──▶ default
//!    │ ──letter──▶ identifier ──▶ default
//!    │ ──'"'────▶ string ──▶ default
//!    └──EOF─────▶ (emit EOS, stop)
//! ```

use unicode_xid::UnicodeXID;

use super::{Token, TokenKind};

/// Receives tokens as the state machine cuts them.
pub trait Emitter {
    /// Hands a token to the consumer. Returns `false` once the consumer is
    /// gone, which stops the state machine.
    fn emit(&mut self, token: Token) -> bool;
}

impl Emitter for Vec<Token> {
    fn emit(&mut self, token: Token) -> bool {
        self.push(token);
        true
    }
}

/// A state function: scans from the current state and returns the next one.
#[derive(Clone, Copy)]
pub struct StateFn(pub fn(&mut State<'_>, &mut dyn Emitter) -> Option<StateFn>);

impl std::fmt::Debug for StateFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StateFn")
    }
}

/// Scanner position over the input.
///
/// Invariant: `start <= pos <= input.len()`, both on char boundaries.
#[derive(Debug)]
pub struct State<'a> {
    input: &'a str,
    start: usize,
    pos: usize,
    line: usize,
    start_line: usize,
}

impl<'a> State<'a> {
    /// Creates a state positioned at the beginning of `input`.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            start: 0,
            pos: 0,
            line: 1,
            start_line: 1,
        }
    }

    /// Start of the token being scanned.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Scan cursor.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Current line.
    pub fn line(&self) -> usize {
        self.line
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.advance();
        }
    }

    /// Drops the scanned window without producing a token.
    fn ignore(&mut self) {
        self.start = self.pos;
        self.start_line = self.line;
    }

    /// Cuts `input[start..pos]` into a token and moves `start` up to `pos`.
    pub fn cut(&mut self, kind: TokenKind) -> Token {
        let token = Token::new(
            kind,
            &self.input[self.start..self.pos],
            self.start,
            self.start_line,
        );
        self.ignore();
        token
    }

    /// Cuts a token and emits it. `None` means the consumer hung up.
    fn emit(&mut self, kind: TokenKind, emitter: &mut dyn Emitter) -> Option<()> {
        let token = self.cut(kind);
        emitter.emit(token).then_some(())
    }
}

/// Runs the state machine over `input` until the input is exhausted or the
/// emitter refuses a token.
pub fn run(input: &str, emitter: &mut dyn Emitter) {
    let mut state = State::new(input);
    let mut next = Some(StateFn(lex_default));

    while let Some(StateFn(state_fn)) = next {
        next = state_fn(&mut state, emitter);
    }
}

/// Lexes `input` on the calling thread and returns every token, the trailing
/// EOS included.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    run(input, &mut tokens);
    tokens
}

/// Entry state: skips whitespace and dispatches on the next character.
pub fn lex_default(s: &mut State<'_>, e: &mut dyn Emitter) -> Option<StateFn> {
    s.advance_while(char::is_whitespace);
    s.ignore();

    let Some(ch) = s.peek() else {
        s.emit(TokenKind::Eos, e)?;
        return None;
    };

    match ch {
        '0'..='9' => Some(StateFn(lex_number)),
        '"' => Some(StateFn(lex_string)),
        _ if is_id_start(ch) => Some(StateFn(lex_identifier)),
        _ => Some(StateFn(lex_operator)),
    }
}

/// Consumes a maximal run of digits.
pub fn lex_number(s: &mut State<'_>, e: &mut dyn Emitter) -> Option<StateFn> {
    s.advance_while(|c| c.is_ascii_digit());
    s.emit(TokenKind::Int, e)?;
    Some(StateFn(lex_default))
}

/// Identifiers and keywords.
pub fn lex_identifier(s: &mut State<'_>, e: &mut dyn Emitter) -> Option<StateFn> {
    s.advance();
    s.advance_while(is_id_continue);

    let kind = TokenKind::keyword(&s.input[s.start..s.pos]).unwrap_or(TokenKind::Ident);
    s.emit(kind, e)?;
    Some(StateFn(lex_default))
}

/// A double-quoted string. Backslash escapes the following character.
/// Without a closing quote the rest of the input becomes one illegal token.
pub fn lex_string(s: &mut State<'_>, e: &mut dyn Emitter) -> Option<StateFn> {
    s.advance();

    loop {
        match s.advance() {
            Some('"') => {
                s.emit(TokenKind::String, e)?;
                break;
            }
            Some('\\') => {
                s.advance();
            }
            Some(_) => {}
            None => {
                s.emit(TokenKind::Illegal, e)?;
                break;
            }
        }
    }

    Some(StateFn(lex_default))
}

/// Operators and delimiters. Anything unrecognised is consumed as a single
/// illegal character so scanning always moves forward.
pub fn lex_operator(s: &mut State<'_>, e: &mut dyn Emitter) -> Option<StateFn> {
    let Some(ch) = s.advance() else {
        return Some(StateFn(lex_default));
    };

    let kind = match (ch, s.peek()) {
        ('=', Some('=')) => two(s, TokenKind::Eq),
        ('!', Some('=')) => two(s, TokenKind::NotEq),
        ('<', Some('=')) => two(s, TokenKind::LtEq),
        ('>', Some('=')) => two(s, TokenKind::GtEq),
        ('&', Some('&')) => two(s, TokenKind::Land),
        ('|', Some('|')) => two(s, TokenKind::Lor),
        ('=', _) => TokenKind::Assign,
        ('+', _) => TokenKind::Plus,
        ('-', _) => TokenKind::Minus,
        ('!', _) => TokenKind::Bang,
        ('*', _) => TokenKind::Asterisk,
        ('/', _) => TokenKind::Slash,
        ('%', _) => TokenKind::Mod,
        ('<', _) => TokenKind::Lt,
        ('>', _) => TokenKind::Gt,
        (',', _) => TokenKind::Comma,
        ('(', _) => TokenKind::LParen,
        (')', _) => TokenKind::RParen,
        ('{', _) => TokenKind::LBrace,
        ('}', _) => TokenKind::RBrace,
        _ => TokenKind::Illegal,
    };

    s.emit(kind, e)?;
    Some(StateFn(lex_default))
}

fn two(s: &mut State<'_>, kind: TokenKind) -> TokenKind {
    s.advance();
    kind
}

fn is_id_start(ch: char) -> bool {
    ch == '_' || UnicodeXID::is_xid_start(ch)
}

fn is_id_continue(ch: char) -> bool {
    ch == '_' || UnicodeXID::is_xid_continue(ch)
}
