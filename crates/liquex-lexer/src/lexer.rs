//! Hand-written scanner for the expression language.
//!
//! The scanner is a deterministic state machine over bytes. Each call to
//! [`Iterator::next`] classifies the first byte of the next lexeme and runs
//! the matching sub-scanner, which always consumes the longest token that
//! starts there. The only state carried between tokens is whether the last
//! token permits a `.name` property continuation.
//!
//! - Whitespace between tokens is skipped.
//! - String literals are taken verbatim; backslashes are not escapes.
//! - Errors are fatal: an error token ends the stream.

use liquex_types::Span;

use crate::token::{LexError, Token, TokenKind};

/// Character classes driving the first transition out of the start state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Whitespace,
    Digit,
    NameStart,
    Quote,
    Symbol,
    Control,
    NonAscii,
}

fn classify(byte: u8) -> CharClass {
    match byte {
        b' ' | b'\t' | b'\n' | b'\r' | 0x0c => CharClass::Whitespace,
        b'0'..=b'9' => CharClass::Digit,
        b'a'..=b'z' | b'A'..=b'Z' | b'_' => CharClass::NameStart,
        b'"' | b'\'' => CharClass::Quote,
        0x00..=0x1f | 0x7f => CharClass::Control,
        0x80..=0xff => CharClass::NonAscii,
        _ => CharClass::Symbol,
    }
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Scanner position at the start of a lexeme.
#[derive(Debug, Clone, Copy)]
struct Mark {
    pos: usize,
    line: u32,
    col: u32,
}

/// Lazy token stream over one expression source.
///
/// The stream ends after [`TokenKind::Eof`] or the first
/// [`TokenKind::Error`]. It cannot be rewound; tokenizing again requires
/// a new `Lexer`.
pub struct Lexer<'src> {
    source: &'src str,
    bytes: &'src [u8],
    pos: usize,
    /// Current line (1-based).
    line: u32,
    /// Current column in characters (1-based).
    col: u32,
    /// Whether the previous token allows a following `.name` property.
    property_allowed: bool,
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            property_allowed: false,
            finished: false,
        }
    }

    /// Scan all of `source`. The result always ends with an `Eof` or an
    /// `Error` token.
    pub fn tokenize(source: &'src str) -> Vec<Token> {
        Lexer::new(source).collect()
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    // ─────────────────────────────────────────────────────────────
    // Byte-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.col = 1;
        } else if byte & 0xc0 != 0x80 {
            // UTF-8 continuation bytes do not start a new column.
            self.col += 1;
        }
        Some(byte)
    }

    fn advance_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.advance();
        }
    }

    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            col: self.col,
        }
    }

    fn span_from(&self, mark: Mark) -> Span {
        Span::new(
            mark.pos as u32,
            (self.pos - mark.pos) as u32,
            mark.line,
            mark.col,
        )
    }

    fn text_from(&self, mark: Mark) -> &'src str {
        &self.source[mark.pos..self.pos]
    }

    fn token(&self, kind: TokenKind, mark: Mark) -> Token {
        Token::new(kind, self.span_from(mark))
    }

    // ─────────────────────────────────────────────────────────────
    // Start state
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Token {
        self.advance_while(|b| classify(b) == CharClass::Whitespace);

        let mark = self.mark();
        let Some(byte) = self.peek() else {
            return Token::new(TokenKind::Eof, self.span_from(mark));
        };

        match classify(byte) {
            CharClass::Digit => self.scan_number(mark),
            CharClass::NameStart => self.scan_name(mark),
            CharClass::Quote => self.scan_string(mark, byte),
            CharClass::Symbol => self.scan_symbol(mark, byte),
            CharClass::NonAscii => {
                let ch = self.source[self.pos..].chars().next().unwrap_or('\u{fffd}');
                for _ in 0..ch.len_utf8() {
                    self.advance();
                }
                self.token(TokenKind::Char(ch), mark)
            }
            CharClass::Control => {
                self.advance();
                let ch = char::from(byte);
                self.token(TokenKind::Error(LexError::UnexpectedCharacter(ch)), mark)
            }
            CharClass::Whitespace => unreachable!("whitespace skipped above"),
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Operators & punctuation
    // ─────────────────────────────────────────────────────────────

    fn scan_symbol(&mut self, mark: Mark, byte: u8) -> Token {
        if byte == b'-' && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            return self.scan_number(mark);
        }
        if byte == b'.' {
            return self.scan_dot(mark);
        }

        self.advance();
        let next = self.peek();
        let kind = match (byte, next) {
            (b'=', Some(b'=')) => self.finish_pair(TokenKind::EqEq),
            (b'!', Some(b'=')) => self.finish_pair(TokenKind::NotEq),
            (b'<', Some(b'=')) => self.finish_pair(TokenKind::LessEq),
            (b'<', Some(b'>')) => self.finish_pair(TokenKind::NotEq),
            (b'>', Some(b'=')) => self.finish_pair(TokenKind::GreaterEq),
            (b'<', _) => TokenKind::Less,
            (b'>', _) => TokenKind::Greater,
            (b'(', _) => TokenKind::LParen,
            (b')', _) => TokenKind::RParen,
            (b',', _) => TokenKind::Comma,
            (b'[', _) => TokenKind::LBracket,
            (b']', _) => TokenKind::RBracket,
            _ => TokenKind::Char(char::from(byte)),
        };
        self.token(kind, mark)
    }

    /// Consume the second byte of a two-byte operator.
    fn finish_pair(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// `..`, `.name` or a lone `.`.
    fn scan_dot(&mut self, mark: Mark) -> Token {
        self.advance();
        match self.peek() {
            Some(b'.') => {
                self.advance();
                self.token(TokenKind::DotDot, mark)
            }
            Some(b) if self.property_allowed && classify(b) == CharClass::NameStart => {
                let name_start = self.pos;
                self.advance_while(is_name_byte);
                let name = self.source[name_start..self.pos].to_string();
                self.token(TokenKind::Property(name), mark)
            }
            _ => self.token(TokenKind::Dot, mark),
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Number literals
    // ─────────────────────────────────────────────────────────────

    fn scan_number(&mut self, mark: Mark) -> Token {
        if self.peek() == Some(b'-') {
            self.advance();
        }
        self.advance_while(|b| b.is_ascii_digit());

        let mut is_float = false;
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            is_float = true;
            self.advance();
            self.advance_while(|b| b.is_ascii_digit());

            if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
                self.advance();
                self.advance_while(|b| b.is_ascii_digit());
                return self.token(TokenKind::Error(LexError::MalformedNumber), mark);
            }
        }

        if self.peek().is_some_and(|b| classify(b) == CharClass::NameStart) {
            self.advance_while(is_name_byte);
            return self.token(TokenKind::Error(LexError::MalformedNumber), mark);
        }

        let text = self.text_from(mark);
        let kind = if is_float {
            match text.parse::<f64>() {
                Ok(n) if n.is_finite() => TokenKind::FloatLit(n),
                _ => TokenKind::Error(LexError::NumericOverflow),
            }
        } else {
            // The text is an optionally signed digit run, so overflow is
            // the only way parsing can fail.
            match text.parse::<i64>() {
                Ok(n) => TokenKind::IntLit(n),
                Err(_) => TokenKind::Error(LexError::NumericOverflow),
            }
        };
        self.token(kind, mark)
    }

    // ─────────────────────────────────────────────────────────────
    // Identifiers & keywords
    // ─────────────────────────────────────────────────────────────

    fn scan_name(&mut self, mark: Mark) -> Token {
        self.advance_while(is_name_byte);
        let text = self.text_from(mark);
        let kind =
            TokenKind::from_keyword(text).unwrap_or_else(|| TokenKind::Identifier(text.to_string()));
        self.token(kind, mark)
    }

    // ─────────────────────────────────────────────────────────────
    // String literals
    // ─────────────────────────────────────────────────────────────

    /// Scan a string delimited by `quote`. The literal ends at the first
    /// matching quote; nothing inside is unescaped.
    fn scan_string(&mut self, mark: Mark, quote: u8) -> Token {
        self.advance();
        let body_start = self.pos;
        loop {
            match self.peek() {
                None => {
                    return self.token(TokenKind::Error(LexError::UnterminatedString), mark);
                }
                Some(b) if b == quote => {
                    let body = self.source[body_start..self.pos].to_string();
                    self.advance();
                    return self.token(TokenKind::StringLit(body), mark);
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.scan_token();
        self.finished = token.is_terminal();
        self.property_allowed = token.kind.permits_property();
        Some(token)
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}
