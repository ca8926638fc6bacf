//! liquex scanner: converts expression source text into a token stream.

pub mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::{LexError, Token, TokenKind, KEYWORDS};
