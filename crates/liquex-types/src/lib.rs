//! Shared types for the liquex expression engine.
//!
//! This crate defines the expression tree, source spans and compile error
//! types used by the lexer, parser and evaluator crates.

mod error;
mod span;
pub mod ast;

pub use error::{CompileError, ErrorCategory, ErrorCode};
pub use span::{SourceText, Span};

/// Result type used by the compile stages (lexing and parsing).
pub type CompileResult<T> = std::result::Result<T, CompileError>;
