//! The anode lexer.
//!
//! Characters come in through the [`SourceReader`], tokens go out through
//! [`Lexer::next_token`]/[`Lexer::peek_token`] with an unbounded token
//! look-ahead buffer. Whitespace and comments (nesting `(# … #)` blocks,
//! `#` to end of line) are discarded between tokens. Unrecognized
//! characters produce an `UnexpectedCharacter` diagnostic and an
//! `Unexpected` token so parsing can continue.

mod comment;
mod identifier;
mod number;
mod operator;

use std::collections::VecDeque;

use anodec_util::{ErrorKind, ErrorStream, Name, SourceLocation, SourceSpan};

use crate::reader::SourceReader;
use crate::token::{Token, TokenKind};

/// The lexer.
pub struct Lexer<'a, 'e> {
    pub(crate) reader: SourceReader<'a>,
    pub(crate) errors: &'e mut ErrorStream,
    /// Token look-ahead buffer.
    lookahead: VecDeque<Token>,
    /// Location where the current token started.
    pub(crate) token_start: SourceLocation,
}

impl<'a, 'e> Lexer<'a, 'e> {
    pub fn new(input_name: Name, source: &'a str, errors: &'e mut ErrorStream) -> Self {
        Self {
            reader: SourceReader::new(input_name, source),
            errors,
            lookahead: VecDeque::new(),
            token_start: SourceLocation::new(1, 1),
        }
    }

    /// Name of the input being lexed.
    pub fn input_name(&self) -> Name {
        self.reader.input_name()
    }

    /// The error stream diagnostics are reported to. The parser shares it.
    pub fn errors(&mut self) -> &mut ErrorStream {
        self.errors
    }

    /// Consume and return the next token. Returns `EndOfInput` forever once
    /// the source is exhausted.
    pub fn next_token(&mut self) -> Token {
        if let Some(token) = self.lookahead.pop_front() {
            return token;
        }
        self.extract_token()
    }

    /// The next token, without consuming it.
    pub fn peek_token(&mut self) -> Token {
        self.peek_token_n(0)
    }

    /// Look ahead `n` tokens past the next one.
    pub fn peek_token_n(&mut self, n: usize) -> Token {
        while self.lookahead.len() <= n {
            let token = self.extract_token();
            self.lookahead.push_back(token);
        }
        self.lookahead[n]
    }

    /// True once the next token is `EndOfInput`.
    pub fn eof(&mut self) -> bool {
        self.peek_token().kind == TokenKind::EndOfInput
    }

    pub(crate) fn mark_token_start(&mut self) {
        self.token_start = self.reader.location();
    }

    /// Span from the marked token start to the current reader position.
    pub(crate) fn span_for_current_token(&self) -> SourceSpan {
        SourceSpan::new(
            self.reader.input_name(),
            self.token_start,
            self.reader.location(),
        )
    }

    pub(crate) fn token(&self, kind: TokenKind, text: &str) -> Token {
        Token::new(kind, self.span_for_current_token(), Name::intern(text))
    }

    fn extract_token(&mut self) -> Token {
        self.discard_trivia();
        self.mark_token_start();

        if self.reader.eof() {
            return self.token(TokenKind::EndOfInput, "<EOF>");
        }

        let c = self.reader.peek().unwrap();

        // A '-' immediately followed by a digit starts a signed literal.
        if c == '-' && matches!(self.reader.peek_n(1), Some(d) if d.is_ascii_digit()) {
            return self.extract_number();
        }

        for (text, kind) in operator::candidates(c) {
            if self.reader.match_str(text) {
                return self.token(*kind, text);
            }
        }

        if identifier::is_identifier_start(c) {
            return self.extract_identifier_or_keyword();
        }

        if c.is_ascii_digit() {
            return self.extract_number();
        }

        self.reader.next();
        let span = self.span_for_current_token();
        self.errors.error(
            ErrorKind::UnexpectedCharacter,
            span,
            format!("Invalid character '{}' (0x{:X})", c, c as u32),
        );
        self.token(TokenKind::Unexpected, &c.to_string())
    }
}
