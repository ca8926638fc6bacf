//! Runtime error types for the liquex evaluator.

use thiserror::Error;

/// Why a filter could not produce a value.
#[derive(Debug, Error)]
pub enum FilterFailure {
    /// No filter is registered under the requested name.
    #[error("unknown filter")]
    UnknownFilter,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("expected {expected} arguments, got {got}")]
    Arity { expected: usize, got: usize },

    /// Failure raised by an application-defined filter.
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl FilterFailure {
    pub fn custom(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Custom(err.into())
    }
}

/// A filter failure, tagged with the filter's name.
#[derive(Debug, Error)]
#[error("filter '{filter_name}' failed: {cause}")]
pub struct FilterError {
    pub filter_name: String,
    #[source]
    pub cause: FilterFailure,
}

/// Evaluation error. Any of these aborts the evaluation.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Unbound identifier under strict variables.
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Host method arguments that do not fit the declared parameters,
    /// under strict method arguments.
    #[error("method '{method}': {reason}")]
    ArgumentMismatch { method: String, reason: String },
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;
