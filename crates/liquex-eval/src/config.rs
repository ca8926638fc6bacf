use serde::{Deserialize, Serialize};

/// Evaluation options read by [`RenderContext`](crate::RenderContext).
///
/// Both options default to off, which gives lenient Liquid behaviour:
/// unknown variables and mismatched method arguments evaluate to nil.
///
/// ```
/// let config = liquex_eval::EvalConfig::from_json(r#"{"strict_variables": true}"#).unwrap();
/// assert!(config.strict_variables);
/// assert!(!config.strict_method_arguments);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Fail on identifiers that are not bound.
    pub strict_variables: bool,
    /// Fail on host method calls whose arguments do not fit.
    pub strict_method_arguments: bool,
}

impl EvalConfig {
    /// Both options on.
    pub fn strict() -> Self {
        Self {
            strict_variables: true,
            strict_method_arguments: true,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
