//! Interpreter options and optimized overrides of library functions.
//!
//! A library may ship semlang functions whose bodies are correct but slow.
//! An [`OptimizedFunctions`] table maps such a function to a native
//! implementation with the same behavior, used in place of the body when
//! [`InterpreterOptions::use_library_optimizations`] is on.

use std::fmt;

use rustc_hash::FxHashMap;
use sem_ir::ResolvedEntityRef;

use crate::natives::NativeFn;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InterpreterOptions {
    /// Consult [`OptimizedFunctions`] before interpreting a function body.
    pub use_library_optimizations: bool,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            use_library_optimizations: true,
        }
    }
}

/// Native overrides keyed by the module function they replace.
#[derive(Clone, Default)]
pub struct OptimizedFunctions {
    functions: FxHashMap<ResolvedEntityRef, NativeFn>,
}

impl OptimizedFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `function`'s body with `implementation`. Returns the
    /// previous override, if any.
    pub fn register(
        &mut self,
        function: ResolvedEntityRef,
        implementation: NativeFn,
    ) -> Option<NativeFn> {
        self.functions.insert(function, implementation)
    }

    pub fn get(&self, function: &ResolvedEntityRef) -> Option<NativeFn> {
        self.functions.get(function).copied()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for OptimizedFunctions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.functions.keys().map(ToString::to_string).collect();
        names.sort();
        f.debug_struct("OptimizedFunctions")
            .field("functions", &names)
            .finish()
    }
}
