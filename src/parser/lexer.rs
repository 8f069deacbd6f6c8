//! Logos-based lexer for grammar files
//!
//! Fast tokenization using the logos crate. Whitespace and comments are
//! skipped; the first character that starts no token aborts with a
//! [`TokenizeError`].

use std::fmt;

use logos::Logos;
use text_size::TextSize;

use crate::base::{LineIndex, Range};
use crate::error::TokenizeError;

/// A token with its kind, text, and position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub range: Range,
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    index: LineIndex<'a>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(input),
            index: LineIndex::new(input),
            finished: false,
        }
    }

    fn range(&self) -> Range {
        let span = self.inner.span();
        self.index
            .range(TextSize::new(span.start as u32), TextSize::new(span.end as u32))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, TokenizeError>;

    /// Yields every token followed by a single [`TokenKind::Eof`].
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let Some(result) = self.inner.next() else {
            self.finished = true;
            let end = TextSize::of(self.inner.source());
            let position = self.index.position(end);
            return Some(Ok(Token {
                kind: TokenKind::Eof,
                text: "",
                range: Range::new(position, position),
            }));
        };
        let range = self.range();
        match result {
            Ok(kind) => Some(Ok(Token {
                kind,
                text: self.inner.slice(),
                range,
            })),
            Err(()) => {
                self.finished = true;
                Some(Err(TokenizeError {
                    text: self.inner.slice().to_string(),
                    position: range.start,
                }))
            }
        }
    }
}

/// Tokenize an entire string into a Vec ending with [`TokenKind::Eof`]
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, TokenizeError> {
    Lexer::new(input).collect()
}

/// Token kinds of the grammar language
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum TokenKind {
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*")]
    Ident,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION (must come before single-char)
    // =========================================================================
    #[token("...")]
    Ellipsis,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token("|")]
    Pipe,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("?")]
    Question,

    /// End of input; produced by [`Lexer`], never matched by logos
    Eof,
}

impl TokenKind {
    /// Human-readable description used in parse errors
    pub fn describe(self) -> &'static str {
        match self {
            Self::Ident => "identifier",
            Self::Ellipsis => "'...'",
            Self::Colon => "':'",
            Self::Semicolon => "';'",
            Self::Pipe => "'|'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::Lt => "'<'",
            Self::Gt => "'>'",
            Self::Comma => "','",
            Self::Dot => "'.'",
            Self::Star => "'*'",
            Self::Plus => "'+'",
            Self::Question => "'?'",
            Self::Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}
