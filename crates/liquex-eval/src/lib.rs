//! liquex tree-walking evaluator.
//!
//! Walks an expression tree against a [`Context`], which supplies variable
//! bindings and filter dispatch. [`RenderContext`] is the stock context: a
//! scoped binding environment, a [`FilterRegistry`] and an [`EvalConfig`].

mod config;
mod context;
mod env;
mod error;
mod evaluator;
pub mod filters;

pub use config::EvalConfig;
pub use context::{Context, RenderContext};
pub use env::Environment;
pub use error::{EvalError, EvalResult, FilterError, FilterFailure};
pub use evaluator::Evaluator;
pub use filters::{standard_filters, FilterFn, FilterRegistry};
