//! liquex parser: builds an expression tree from the token stream.

mod parse_expr;
mod parser;

pub use parser::{Parser, MAX_NESTING_DEPTH};

use liquex_types::ast::Expr;
use liquex_types::CompileResult;

/// Parse a complete expression source.
pub fn parse(source: &str) -> CompileResult<Expr> {
    Parser::new(source).parse()
}
