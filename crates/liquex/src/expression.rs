//! Compiled expressions and the compile/evaluate entry points.

use std::fmt;
use std::sync::Arc;

use liquex_eval::{Context, EvalError, EvalResult, Evaluator};
use liquex_types::ast::Expr;
use liquex_types::{CompileError, CompileResult};
use liquex_value::Value;
use thiserror::Error;

/// A compiled expression: its source text and immutable tree.
///
/// Cloning is cheap and clones share the tree.
#[derive(Debug, Clone)]
pub struct Expression {
    source: Arc<str>,
    root: Arc<Expr>,
}

impl Expression {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &Expr {
        &self.root
    }

    /// Evaluate against `ctx`.
    pub fn evaluate(&self, ctx: &dyn Context) -> EvalResult<Value> {
        Evaluator::new(ctx).eval(&self.root)
    }

    /// Evaluate against `ctx` and render the result as template text.
    pub fn render(&self, ctx: &dyn Context) -> EvalResult<String> {
        self.evaluate(ctx).map(|value| value.to_display())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Compile expression source text.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn compile(source: &str) -> CompileResult<Expression> {
    let root = liquex_parser::parse(source).inspect_err(|err| {
        tracing::debug!(error = %err, "compile failed");
    })?;
    Ok(Expression {
        source: Arc::from(source),
        root: Arc::new(root),
    })
}

/// Evaluate a compiled expression against `ctx`.
pub fn evaluate(expr: &Expression, ctx: &dyn Context) -> EvalResult<Value> {
    expr.evaluate(ctx)
}

/// Either stage failing, for callers that compile and evaluate in one step.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Compile `source` and evaluate it once against `ctx`.
pub fn evaluate_str(source: &str, ctx: &dyn Context) -> Result<Value, Error> {
    Ok(compile(source)?.evaluate(ctx)?)
}
