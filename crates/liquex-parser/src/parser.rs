//! Core parser infrastructure: token cursor, error reporting, helpers.

use liquex_lexer::{Lexer, Token, TokenKind};
use liquex_types::ast::{Expr, Ident};
use liquex_types::{CompileError, CompileResult, ErrorCode, SourceText, Span};

/// Maximum depth of the expression tree. Parentheses, index brackets,
/// arguments and every link of a property, filter or operator chain each
/// add a level.
pub const MAX_NESTING_DEPTH: u32 = 64;

/// The expression builder.
///
/// Pulls tokens from a [`Lexer`] one at a time, keeping a single token of
/// lookahead. There is no error recovery: the first lex or parse error
/// aborts the build.
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    /// The token under the cursor.
    current: Token,
    /// Span of the most recently consumed token.
    previous_span: Span,
    /// Current sub-expression nesting depth.
    pub(crate) depth: u32,
}

impl<'src> Parser<'src> {
    /// Create a parser over `source`.
    pub fn new(source: &'src str) -> Self {
        Self::from_lexer(Lexer::new(source))
    }

    /// Create a parser that pulls from an existing lexer.
    pub fn from_lexer(mut lexer: Lexer<'src>) -> Self {
        let current = match lexer.next() {
            Some(token) => token,
            None => Token::new(TokenKind::Eof, end_of_input(lexer.source())),
        };
        Self {
            lexer,
            previous_span: Span::point(current.span.offset, current.span.line, current.span.col),
            current,
            depth: 0,
        }
    }

    /// Parse one complete expression. All input must be consumed.
    pub fn parse(mut self) -> CompileResult<Expr> {
        let source = self.lexer.source();
        self.parse_complete()
            .map_err(|err| err.with_source(&SourceText::new(source)))
    }

    fn parse_complete(&mut self) -> CompileResult<Expr> {
        let expr = self.parse_expression()?;
        match self.peek_kind() {
            TokenKind::Eof => Ok(expr),
            TokenKind::RParen | TokenKind::RBracket => Err(self.error_at_current(
                ErrorCode::UNMATCHED_DELIMITER,
                format!("unmatched '{}'", self.peek_kind()),
            )),
            _ => Err(self.error_expecting(
                ErrorCode::TRAILING_INPUT,
                format!("unexpected '{}' after expression", self.peek_kind()),
                ["end of input"],
            )),
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the kind of the current token.
    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.current.kind
    }

    /// Advance the cursor by one and return the consumed token.
    ///
    /// Once the cursor reaches `Eof` or an error token it stays there.
    pub(crate) fn advance(&mut self) -> Token {
        let next = if self.current.is_terminal() {
            self.current.clone()
        } else {
            let end = self.current.span.end();
            self.lexer.next().unwrap_or_else(|| {
                Token::new(
                    TokenKind::Eof,
                    Span::point(end, self.current.span.line, self.current.span.col),
                )
            })
        };
        let token = std::mem::replace(&mut self.current, next);
        self.previous_span = token.span;
        token
    }

    /// Returns the previously consumed token's span.
    pub(crate) fn previous_span(&self) -> Span {
        self.previous_span
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.current.span
    }

    /// Check if the current token matches the given kind exactly.
    pub(crate) fn check_exact(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check_exact(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect the closing delimiter of a group opened at `open`.
    ///
    /// Running out of input reports an unmatched delimiter; any other token
    /// is reported as unexpected.
    pub(crate) fn expect_closing(&mut self, close: &TokenKind, open: Span) -> CompileResult<Span> {
        if self.check_exact(close) {
            return Ok(self.advance().span);
        }
        let (code, message) = if self.check_exact(&TokenKind::Eof) {
            let opener = match close {
                TokenKind::RBracket => '[',
                _ => '(',
            };
            (
                ErrorCode::UNMATCHED_DELIMITER,
                format!("unclosed '{opener}' opened at {open}"),
            )
        } else {
            (
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{close}', got '{}'", self.peek_kind()),
            )
        };
        Err(self.error_expecting(code, message, [close.to_string()]))
    }

    /// Expect an identifier token. Returns the name and span.
    pub(crate) fn expect_identifier(&mut self, what: &str) -> CompileResult<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Ok(Ident::new(name, span))
            }
            other => Err(self.error_expecting(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected {what}, got '{other}'"),
                [what],
            )),
        }
    }

    /// Expect a name after a spaced `.`. Keywords are accepted as names
    /// here, so `list . first` and `obj . in` both read as properties.
    pub(crate) fn expect_member_name(&mut self) -> CompileResult<Ident> {
        let kind = self.peek_kind().clone();
        match &kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                let span = self.advance().span;
                Ok(Ident::new(name, span))
            }
            _ if kind.is_keyword() => {
                let span = self.advance().span;
                Ok(Ident::new(kind.to_string(), span))
            }
            _ => Err(self.error_expecting(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected property name after '.', got '{kind}'"),
                ["property name"],
            )),
        }
    }

    // ── Nesting ───────────────────────────────────────────────────────────────

    /// Add one level of tree depth, failing past [`MAX_NESTING_DEPTH`].
    pub(crate) fn enter_nesting(&mut self) -> CompileResult<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error_at(
                ErrorCode::NESTING_TOO_DEEP,
                format!("maximum expression nesting depth is {MAX_NESTING_DEPTH}"),
                self.current_span(),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    /// Release `levels` levels taken with [`enter_nesting`](Self::enter_nesting).
    pub(crate) fn exit_nesting(&mut self, levels: u32) {
        self.depth -= levels;
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    /// Build an error at the current token.
    ///
    /// If the current token is a lex error, that error is reported instead,
    /// so lex failures surface unchanged whichever rule hits them first.
    pub(crate) fn error_at_current(&self, code: ErrorCode, message: impl Into<String>) -> CompileError {
        match &self.current.kind {
            TokenKind::Error(lex) => CompileError::new(lex.code(), lex.to_string(), self.current.span),
            _ => CompileError::new(code, message, self.current.span),
        }
    }

    /// Like [`error_at_current`](Self::error_at_current), listing the
    /// tokens that would have been accepted. A lex error reported in its
    /// place carries no expected set.
    pub(crate) fn error_expecting<I, S>(&self, code: ErrorCode, message: impl Into<String>, expected: I) -> CompileError
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let err = self.error_at_current(code, message);
        if matches!(self.current.kind, TokenKind::Error(_)) {
            err
        } else {
            err.with_expected(expected)
        }
    }

    /// Build an error at an explicit span.
    pub(crate) fn error_at(&self, code: ErrorCode, message: impl Into<String>, span: Span) -> CompileError {
        CompileError::new(code, message, span)
    }
}

/// Zero-width span just past the end of `source`.
fn end_of_input(source: &str) -> Span {
    let line = source.matches('\n').count() as u32 + 1;
    let last_line = source.rsplit('\n').next().unwrap_or("");
    let col = last_line.chars().count() as u32 + 1;
    Span::point(source.len() as u32, line, col)
}
