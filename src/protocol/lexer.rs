use std::collections::HashMap;
use std::fmt;

use crate::collections::{StringPool, Symbol};
use crate::common::hashmap;
use crate::protocol::input_source::{
    InputSource,
    InputSpan,
    ParseError,
    ParseErrorKind,
};

/// The kind of a token, including the payload of variable-length tokens.
/// Identifiers and string literals are interned while lexing, so everything
/// downstream only ever sees `Symbol`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    // Keywords
    Let,
    Print,
    TypeOf,
    // Variable-character tokens
    Ident(Symbol),
    Integer(i32),
    String(Symbol),     // contents without the surrounding `"`
    // Punctuation (single character)
    OpenParen,          // (
    CloseParen,         // )
    Comma,              // ,
    Colon,              // :
    Equal,              // =
    SemiColon,          // ;
    // Special marker for the end of the input, returned indefinitely
    Eof,
}

impl TokenKind {
    /// Human readable description, used in "expected X, got Y" messages
    pub(crate) fn describe(&self) -> &'static str {
        use TokenKind as TK;
        match self {
            TK::Let => "'let'",
            TK::Print => "'print'",
            TK::TypeOf => "'typeof'",
            TK::Ident(_) => "a symbol",
            TK::Integer(_) => "an integer literal",
            TK::String(_) => "a string literal",
            TK::OpenParen => "'('",
            TK::CloseParen => "')'",
            TK::Comma => "','",
            TK::Colon => "':'",
            TK::Equal => "'='",
            TK::SemiColon => "';'",
            TK::Eof => "end of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

lazy_static::lazy_static! {
    static ref KEYWORDS: HashMap<&'static [u8], TokenKind> = hashmap!{
        b"let" as &'static [u8] => TokenKind::Let,
        b"print" as &'static [u8] => TokenKind::Print,
        b"typeof" as &'static [u8] => TokenKind::TypeOf,
    };
}

/// Represents a single token at a particular position.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub span: InputSpan,
}

/// Lazy tokenizer: the parser asks for one token at a time, so a lexical
/// error further down the file is only reported once the parser reaches it.
pub(crate) struct Lexer {
    // Set once the end of the input was reached, afterwards only `Eof`
    // tokens are produced.
    exhausted: bool,
}

impl Lexer {
    pub(crate) fn new() -> Self {
        Self{ exhausted: false }
    }

    pub(crate) fn next_token(&mut self, source: &mut InputSource, pool: &mut StringPool) -> Result<Token, ParseError> {
        if !self.exhausted {
            self.skip_whitespace_and_comments(source);
        }

        let begin = source.pos();
        let first_char = match source.next() {
            Some(c) => c,
            None => {
                self.exhausted = true;
                return Ok(Token{ kind: TokenKind::Eof, span: InputSpan::from_positions(begin, begin) });
            }
        };

        let kind = if is_identifier_start(first_char) {
            self.consume_identifier(source, pool)
        } else if is_integer_literal_start(first_char) {
            self.consume_integer(source)?
        } else if is_string_literal_start(first_char) {
            self.consume_string_literal(source, pool)?
        } else if let Some(kind) = punctuation(first_char) {
            source.consume();
            kind
        } else {
            let message = if first_char.is_ascii_graphic() {
                format!("unexpected character '{}'", first_char as char)
            } else {
                format!("unexpected character (byte 0x{:02X})", first_char)
            };
            return Err(ParseError::new_error_str_at_pos(
                ParseErrorKind::Lexical, source, begin, &message
            ));
        };

        Ok(Token{ kind, span: InputSpan::from_positions(begin, source.pos()) })
    }

    fn skip_whitespace_and_comments(&mut self, source: &mut InputSource) {
        while let Some(c) = source.next() {
            if is_whitespace(c) {
                source.consume();
            } else if c == b'/' && source.lookahead(1) == Some(b'/') {
                // Line comment, ends at (and excluding) the newline
                while let Some(c) = source.next() {
                    if c == b'\n' {
                        break;
                    }
                    source.consume();
                }
            } else {
                break;
            }
        }
    }

    fn consume_identifier(&mut self, source: &mut InputSource, pool: &mut StringPool) -> TokenKind {
        let begin = source.pos();
        source.consume();
        while let Some(c) = source.next() {
            if !is_identifier_remaining(c) {
                break;
            }
            source.consume();
        }

        let ident = source.section_at_pos(begin, source.pos());
        match KEYWORDS.get(ident) {
            Some(keyword) => *keyword,
            None => TokenKind::Ident(pool.intern_bytes(ident)),
        }
    }

    fn consume_integer(&mut self, source: &mut InputSource) -> Result<TokenKind, ParseError> {
        let begin = source.pos();
        while let Some(c) = source.next() {
            if !c.is_ascii_digit() {
                break;
            }
            source.consume();
        }

        let end = source.pos();
        let digits = source.section_at_pos(begin, end);
        // Only ASCII digits were consumed, so this is valid UTF-8
        let parsed = std::str::from_utf8(digits).ok().and_then(|v| v.parse::<i32>().ok());
        match parsed {
            Some(value) => Ok(TokenKind::Integer(value)),
            None => Err(ParseError::new_error_at_span(
                ParseErrorKind::Lexical, source, InputSpan::from_positions(begin, end),
                String::from("integer literal does not fit in a 32-bit signed integer")
            )),
        }
    }

    fn consume_string_literal(&mut self, source: &mut InputSource, pool: &mut StringPool) -> Result<TokenKind, ParseError> {
        let begin = source.pos();

        // Consume the leading double quote
        debug_assert!(source.next() == Some(b'"'));
        source.consume();

        let contents_begin = source.pos();
        loop {
            match source.next() {
                Some(b'"') => break,
                Some(_) => source.consume(),
                None => {
                    return Err(ParseError::new_error_str_at_pos(
                        ParseErrorKind::Lexical, source, begin, "encountered unterminated string literal"
                    ));
                }
            }
        }
        let contents_end = source.pos();
        source.consume(); // trailing double quote

        let contents = source.section_at_pos(contents_begin, contents_end);
        Ok(TokenKind::String(pool.intern_bytes(contents)))
    }
}

fn punctuation(c: u8) -> Option<TokenKind> {
    match c {
        b'(' => Some(TokenKind::OpenParen),
        b')' => Some(TokenKind::CloseParen),
        b',' => Some(TokenKind::Comma),
        b':' => Some(TokenKind::Colon),
        b'=' => Some(TokenKind::Equal),
        b';' => Some(TokenKind::SemiColon),
        _ => None,
    }
}

#[inline]
fn is_whitespace(c: u8) -> bool {
    c.is_ascii_whitespace()
}

#[inline]
fn is_identifier_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

#[inline]
fn is_identifier_remaining(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

#[inline]
fn is_integer_literal_start(c: u8) -> bool {
    c.is_ascii_digit()
}

#[inline]
fn is_string_literal_start(c: u8) -> bool {
    c == b'"'
}
