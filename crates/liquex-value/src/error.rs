use thiserror::Error;

/// Failure to read through a value: property, index or method access.
///
/// The evaluator degrades these to nil; they only escape it when strict
/// method arguments are enabled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("{type_name} has no property '{name}'")]
    NoSuchProperty { type_name: String, name: String },

    #[error("{type_name} has no method '{name}'")]
    NoSuchMethod { type_name: String, name: String },

    #[error("{type_name} cannot be indexed by {index}")]
    NotIndexable { type_name: String, index: String },

    #[error("method '{method}': {reason}")]
    ArgumentMismatch { method: String, reason: String },
}

/// Result type for value access operations.
pub type AccessResult<T> = Result<T, AccessError>;
