//! Lexer implementation using logos

mod token;

pub use token::{Token, TokenKind};

use crate::ast::Span;
use logos::Logos;

/// Pull-based lexer over a source string.
///
/// Never fails: characters outside the language become [`TokenKind::Illegal`]
/// tokens, and once the input is exhausted every call yields an
/// [`TokenKind::Eof`] token.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    end: usize,
    exhausted: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            end: source.len(),
            exhausted: false,
        }
    }

    /// Advance and return the next token
    pub fn next_token(&mut self) -> Token {
        if self.exhausted {
            return self.eof();
        }

        let Some(result) = self.inner.next() else {
            self.exhausted = true;
            return self.eof();
        };

        let span = Span::from(self.inner.span());
        let slice = self.inner.slice();
        match result {
            Ok(TokenKind::String) => Token::new(TokenKind::String, string_contents(slice), span),
            Ok(kind) => Token::new(kind, slice, span),
            Err(()) => Token::new(TokenKind::Illegal, slice, span),
        }
    }

    fn eof(&self) -> Token {
        Token::new(TokenKind::Eof, "", Span::new(self.end, self.end))
    }
}

/// Strip the delimiting quotes; the closing one may be missing
fn string_contents(slice: &str) -> &str {
    let inner = &slice[1..];
    inner.strip_suffix('"').unwrap_or(inner)
}

/// Tokenize source code, up to and including the first end-of-input token
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let done = token.is(TokenKind::Eof);
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}
