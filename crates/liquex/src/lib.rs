//! liquex: Liquid-style template expressions.
//!
//! ```text
//! Source → Lexer → Parser → Expression tree → Evaluator(Context) → Value
//! ```
//!
//! An [`Expression`] is compiled once and can then be evaluated any number
//! of times, from any thread, each time against its own [`Context`].
//!
//! ```
//! use liquex::{compile, RenderContext};
//!
//! let expr = compile("product.title | append: '!'").unwrap();
//! let ctx = RenderContext::from_json(serde_json::json!({"product": {"title": "Hat"}}));
//! assert_eq!(expr.evaluate(&ctx).unwrap().to_display(), "Hat!");
//! ```

mod cache;
mod expression;

pub use cache::ExpressionCache;
pub use expression::{compile, evaluate, evaluate_str, Error, Expression};

pub use liquex_eval::{
    standard_filters, Context, EvalConfig, EvalError, EvalResult, Evaluator, FilterError,
    FilterFailure, FilterRegistry, RenderContext,
};
pub use liquex_lexer::{Lexer, Token, TokenKind};
pub use liquex_types::ast;
pub use liquex_types::{CompileError, CompileResult, ErrorCategory, ErrorCode, Span};
pub use liquex_value::{
    AccessError, Capabilities, Describe, Described, FieldDescriptor, HostObject, Mapping,
    MethodDescriptor, ParamType, TypeDescriptor, Value, ValueRange,
};
