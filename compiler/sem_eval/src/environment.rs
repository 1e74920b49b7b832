//! Variable scopes for the interpreter.
//!
//! Uses a scope stack: a block pushes a scope seeded from the enclosing
//! ones and pops it on exit, so its assignments never leak outward. Every
//! function call and closure body gets a fresh environment; nothing is
//! captured implicitly.

use rustc_hash::FxHashMap;

use crate::value::Value;

pub struct Environment {
    /// Innermost scope last; never empty.
    scopes: Vec<FxHashMap<String, Value>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            scopes: vec![FxHashMap::default()],
        }
    }

    /// An environment whose outermost scope holds `bindings`.
    pub fn with_bindings(bindings: impl IntoIterator<Item = (String, Value)>) -> Self {
        Environment {
            scopes: vec![bindings.into_iter().collect()],
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    #[inline]
    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Pop the innermost scope; the outermost one stays.
    #[inline]
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    #[inline]
    pub fn define(&mut self, name: &str, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }

    #[inline]
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
