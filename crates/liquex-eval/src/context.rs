//! The evaluation context: bindings and filter dispatch.

use std::borrow::Cow;
use std::sync::{Arc, OnceLock};

use liquex_value::{Mapping, Value};

use crate::config::EvalConfig;
use crate::env::Environment;
use crate::error::FilterFailure;
use crate::filters::{standard_filters, FilterRegistry};

/// What an expression can see while it is evaluated.
///
/// A context is used by one evaluation at a time and need not be `Sync`.
pub trait Context {
    /// The value bound to `name`, if any.
    fn lookup(&self, name: &str) -> Option<Value>;

    /// Whether an unbound identifier is an error rather than nil.
    fn strict_variables(&self) -> bool {
        false
    }

    /// Whether mismatched host method arguments are an error rather than
    /// nil.
    fn strict_method_arguments(&self) -> bool {
        false
    }

    /// Apply the filter `name` to `input` with already evaluated `args`.
    fn apply_filter(&self, name: &str, input: Value, args: Vec<Value>) -> Result<Value, FilterFailure>;

    /// Every binding visible to the expression.
    fn bindings(&self) -> Cow<'_, Mapping>;
}

/// The stock [`Context`]: scoped bindings, a shared filter registry and an
/// [`EvalConfig`].
#[derive(Debug, Clone)]
pub struct RenderContext {
    env: Environment,
    filters: Arc<FilterRegistry>,
    config: EvalConfig,
}

impl RenderContext {
    /// A context over `bindings` with the standard filters and lenient
    /// configuration.
    pub fn new(bindings: Mapping) -> Self {
        Self::with_filters(bindings, shared_standard_filters())
    }

    pub fn with_filters(bindings: Mapping, filters: Arc<FilterRegistry>) -> Self {
        Self {
            env: Environment::new(bindings),
            filters,
            config: EvalConfig::default(),
        }
    }

    /// Bindings from a JSON object. Any other JSON value gives no bindings.
    pub fn from_json(json: serde_json::Value) -> Self {
        let bindings = match Value::from(json) {
            Value::Mapping(map) => map,
            _ => Mapping::new(),
        };
        Self::new(bindings)
    }

    pub fn with_config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> EvalConfig {
        self.config
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    /// Bind `name` in the innermost scope.
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.env.define(name, value.into());
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(Mapping::new())
    }
}

impl Context for RenderContext {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.env.get(name).cloned()
    }

    fn strict_variables(&self) -> bool {
        self.config.strict_variables
    }

    fn strict_method_arguments(&self) -> bool {
        self.config.strict_method_arguments
    }

    fn apply_filter(&self, name: &str, input: Value, args: Vec<Value>) -> Result<Value, FilterFailure> {
        self.filters.apply(name, &input, &args)
    }

    fn bindings(&self) -> Cow<'_, Mapping> {
        self.env.flatten()
    }
}

/// The standard registry, built once and shared by every default context.
fn shared_standard_filters() -> Arc<FilterRegistry> {
    static STANDARD: OnceLock<Arc<FilterRegistry>> = OnceLock::new();
    Arc::clone(STANDARD.get_or_init(|| Arc::new(standard_filters())))
}
