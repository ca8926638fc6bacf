//! Token types for the liquex scanner.
//!
//! Defines [`TokenKind`] covering every lexeme of the expression language
//! and [`Token`], which pairs a kind with a source [`Span`].

use liquex_types::{ErrorCode, Span};
use std::fmt;

/// Words the scanner never reports as identifiers.
///
/// `cycle`, `loop`, `when` and `assign` introduce tag statements; they are
/// scanned here so the tag compiler can share the tokenizer, but they are
/// not valid inside an expression.
pub const KEYWORDS: &[&str] = &[
    "and", "or", "contains", "in", "cycle", "loop", "when", "assign", "true", "false", "nil",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// `true` for end-of-input and error tokens, after which the scanner
    /// produces nothing more.
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, TokenKind::Eof | TokenKind::Error(_))
    }
}

// ─────────────────────────────────────────────────────────────────────
// Lex errors
// ─────────────────────────────────────────────────────────────────────

/// A malformed lexeme. Carried by [`TokenKind::Error`]; always fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexError {
    /// A control character outside a string literal.
    UnexpectedCharacter(char),
    /// A string literal with no closing quote.
    UnterminatedString,
    /// An integer outside the i64 range, or a float that overflows f64.
    NumericOverflow,
    /// Digits running straight into a name, or a second decimal point.
    MalformedNumber,
}

impl LexError {
    pub fn code(self) -> ErrorCode {
        match self {
            Self::UnexpectedCharacter(_) => ErrorCode::UNEXPECTED_CHARACTER,
            Self::UnterminatedString => ErrorCode::UNTERMINATED_STRING,
            Self::NumericOverflow => ErrorCode::NUMERIC_OVERFLOW,
            Self::MalformedNumber => ErrorCode::MALFORMED_NUMBER,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter(ch) => write!(f, "unexpected character {ch:?}"),
            Self::UnterminatedString => f.write_str("unterminated string literal"),
            Self::NumericOverflow => f.write_str("numeric literal out of range"),
            Self::MalformedNumber => f.write_str("malformed numeric literal"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────

    /// `42`, `-7`
    IntLit(i64),
    /// `3.14`, `-0.5`
    FloatLit(f64),
    /// `"text"` or `'text'`, contents verbatim
    StringLit(String),
    /// `true`
    True,
    /// `false`
    False,
    /// `nil`
    Nil,

    // ── Names ────────────────────────────────────────────────

    /// `product`, `_index`
    Identifier(String),
    /// `.title`, only directly after a value-like token
    Property(String),

    // ── Keywords ─────────────────────────────────────────────

    /// `and`
    And,
    /// `or`
    Or,
    /// `contains`
    Contains,
    /// `in`
    In,
    /// `cycle`
    Cycle,
    /// `loop`
    Loop,
    /// `when`
    When,
    /// `assign`
    Assign,

    // ── Operators ────────────────────────────────────────────

    /// `==`
    EqEq,
    /// `!=` or `<>`
    NotEq,
    /// `>=`
    GreaterEq,
    /// `<=`
    LessEq,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `..`
    DotDot,

    // ── Punctuation ──────────────────────────────────────────

    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `.` not followed by a property name
    Dot,
    /// Any other character: `|`, `:`, `=`, ...
    Char(char),

    // ── Special ──────────────────────────────────────────────

    Error(LexError),
    Eof,
}

impl TokenKind {
    /// Look up a keyword or keyword-literal by its exact text.
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        Some(match s {
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "contains" => TokenKind::Contains,
            "in" => TokenKind::In,
            "cycle" => TokenKind::Cycle,
            "loop" => TokenKind::Loop,
            "when" => TokenKind::When,
            "assign" => TokenKind::Assign,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "nil" => TokenKind::Nil,
            _ => return None,
        })
    }

    /// Whether a `.name` directly after this token is a property segment.
    pub fn permits_property(&self) -> bool {
        matches!(
            self,
            TokenKind::Identifier(_)
                | TokenKind::Property(_)
                | TokenKind::StringLit(_)
                | TokenKind::RParen
                | TokenKind::RBracket
        )
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::And
                | TokenKind::Or
                | TokenKind::Contains
                | TokenKind::In
                | TokenKind::Cycle
                | TokenKind::Loop
                | TokenKind::When
                | TokenKind::Assign
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Nil
        )
    }

    /// Keywords that start a tag statement rather than an expression.
    pub fn is_statement_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Cycle | TokenKind::Loop | TokenKind::When | TokenKind::Assign
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::IntLit(n) => write!(f, "{n}"),
            TokenKind::FloatLit(n) => write!(f, "{n:?}"),
            TokenKind::StringLit(s) => write!(f, "\"{s}\""),
            TokenKind::True => f.write_str("true"),
            TokenKind::False => f.write_str("false"),
            TokenKind::Nil => f.write_str("nil"),
            TokenKind::Identifier(s) => f.write_str(s),
            TokenKind::Property(s) => write!(f, ".{s}"),
            TokenKind::And => f.write_str("and"),
            TokenKind::Or => f.write_str("or"),
            TokenKind::Contains => f.write_str("contains"),
            TokenKind::In => f.write_str("in"),
            TokenKind::Cycle => f.write_str("cycle"),
            TokenKind::Loop => f.write_str("loop"),
            TokenKind::When => f.write_str("when"),
            TokenKind::Assign => f.write_str("assign"),
            TokenKind::EqEq => f.write_str("=="),
            TokenKind::NotEq => f.write_str("!="),
            TokenKind::GreaterEq => f.write_str(">="),
            TokenKind::LessEq => f.write_str("<="),
            TokenKind::Less => f.write_str("<"),
            TokenKind::Greater => f.write_str(">"),
            TokenKind::DotDot => f.write_str(".."),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::LBracket => f.write_str("["),
            TokenKind::RBracket => f.write_str("]"),
            TokenKind::Dot => f.write_str("."),
            TokenKind::Char(c) => write!(f, "{c}"),
            TokenKind::Error(e) => write!(f, "<{e}>"),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}
