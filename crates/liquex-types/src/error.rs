use crate::{SourceText, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compile stage an error belongs to, determined by code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Lex,
    Parse,
}

/// Numeric compile error code (E100–E199).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Lex errors (E100–E149) ──
    pub const UNEXPECTED_CHARACTER: Self = Self(100);
    pub const UNTERMINATED_STRING: Self = Self(101);
    pub const NUMERIC_OVERFLOW: Self = Self(102);
    pub const MALFORMED_NUMBER: Self = Self(103);

    // ── Parse errors (E150–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(150);
    pub const UNMATCHED_DELIMITER: Self = Self(151);
    pub const TRAILING_INPUT: Self = Self(152);
    pub const STATEMENT_KEYWORD: Self = Self(153);
    pub const NESTING_TOO_DEEP: Self = Self(154);

    pub fn category(self) -> ErrorCategory {
        if self.0 < 150 {
            ErrorCategory::Lex
        } else {
            ErrorCategory::Parse
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex => f.write_str("lex"),
            Self::Parse => f.write_str("parse"),
        }
    }
}

/// A lex or parse failure. Compilation is all-or-nothing, so at most one
/// of these is produced per expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileError {
    pub code: ErrorCode,
    pub category: ErrorCategory,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The source line containing `span`, for display.
    pub source_line: String,
    /// Token descriptions that would have been accepted at `span`.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub expected: Vec<String>,
}

impl CompileError {
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            category: code.category(),
            message: message.into(),
            span,
            source_line: String::new(),
            expected: Vec::new(),
        }
    }

    pub fn with_expected<I, S>(mut self, expected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected = expected.into_iter().map(Into::into).collect();
        self
    }

    /// Fill in `source_line` from the expression source.
    pub fn with_source(mut self, source: &SourceText) -> Self {
        self.source_line = source.line(self.span.line).unwrap_or("").to_string();
        self
    }

    pub fn is_lex_error(&self) -> bool {
        self.category == ErrorCategory::Lex
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.span, self.code, self.category, self.message
        )?;
        if !self.expected.is_empty() {
            write!(f, " (expected {})", self.expected.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileError {}
