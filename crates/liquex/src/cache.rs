use std::collections::HashMap;

use liquex_types::CompileResult;
use parking_lot::RwLock;

use crate::expression::{compile, Expression};

/// Compiled expressions keyed by source text, shareable across threads.
///
/// Only successful compilations are stored; a source that fails to
/// compile is compiled again on the next request.
#[derive(Debug, Default)]
pub struct ExpressionCache {
    entries: RwLock<HashMap<String, Expression>>,
}

impl ExpressionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached expression for `source`, compiling and storing it on a
    /// miss.
    pub fn get_or_compile(&self, source: &str) -> CompileResult<Expression> {
        if let Some(expr) = self.entries.read().get(source) {
            return Ok(expr.clone());
        }
        let compiled = compile(source)?;
        // Another thread may have stored the same source meanwhile; the
        // first entry wins.
        let mut entries = self.entries.write();
        Ok(entries
            .entry(source.to_string())
            .or_insert(compiled)
            .clone())
    }

    pub fn get(&self, source: &str) -> Option<Expression> {
        self.entries.read().get(source).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
