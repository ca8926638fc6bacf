//! Scoped binding environment for render contexts.

use liquex_value::{Mapping, Value};
use std::borrow::Cow;

/// Scoped variable bindings with push/pop semantics.
///
/// The outermost scope holds the render bindings; a tag layer pushes inner
/// scopes for loop variables and the like. Lookups search from the
/// innermost scope outward.
#[derive(Debug, Clone)]
pub struct Environment {
    scopes: Vec<Mapping>,
}

impl Environment {
    /// Create an environment whose global scope is `bindings`.
    pub fn new(bindings: Mapping) -> Self {
        Self {
            scopes: vec![bindings],
        }
    }

    /// Push a new, empty scope.
    pub fn push_scope(&mut self) {
        self.scopes.push(Mapping::new());
    }

    /// Pop the innermost scope. The global scope is never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Define a variable in the current (innermost) scope.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), value);
        }
    }

    /// Look up a variable, searching from innermost to outermost scope.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Update a variable in the first scope where it exists.
    /// Returns `true` if found and updated, `false` if not found.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        match self.scopes.iter_mut().rev().find(|scope| scope.contains_key(name)) {
            Some(scope) => {
                scope.insert(name.to_string(), value);
                true
            }
            None => false,
        }
    }

    /// All visible bindings, inner scopes shadowing outer ones. Borrowed
    /// when only the global scope exists.
    pub fn flatten(&self) -> Cow<'_, Mapping> {
        match self.scopes.as_slice() {
            [global] => Cow::Borrowed(global),
            scopes => {
                let mut merged = Mapping::new();
                for scope in scopes {
                    merged.extend(scope.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                Cow::Owned(merged)
            }
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(Mapping::new())
    }
}
