//! Diagnostics sink for one validation run.
//!
//! Features:
//! - Separate error and warning lists, in emission order
//! - Deduplication of identical diagnostics
//! - Optional error limit
//! - `ErrorGuaranteed` proof that errors were emitted

use rustc_hash::FxHashSet;

use crate::{Diagnostic, ErrorGuaranteed};

/// Configuration for diagnostic collection.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept (0 = unlimited). Errors past the limit
    /// still fail validation but are not recorded.
    pub error_limit: usize,
    /// Drop a diagnostic identical to one already recorded.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: true,
        }
    }
}

/// Append-only accumulator for errors and warnings.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticSink {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
    /// Errors emitted, including ones dropped by the limit or dedup.
    error_count: usize,
    seen: FxHashSet<Diagnostic>,
    config: DiagnosticConfig,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticSink {
            config,
            ..Self::default()
        }
    }

    /// Record an error and get proof it was emitted.
    pub fn emit_error(&mut self, diagnostic: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diagnostic.is_error());
        self.error_count += 1;
        if !self.limit_reached() && self.is_new(&diagnostic) {
            self.errors.push(diagnostic);
        }
        ErrorGuaranteed::new()
    }

    pub fn emit_warning(&mut self, diagnostic: Diagnostic) {
        if self.is_new(&diagnostic) {
            self.warnings.push(diagnostic);
        }
    }

    /// Record a diagnostic according to its severity.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            let _ = self.emit_error(diagnostic);
        } else {
            self.emit_warning(diagnostic);
        }
    }

    fn is_new(&mut self, diagnostic: &Diagnostic) -> bool {
        !self.config.deduplicate || self.seen.insert(diagnostic.clone())
    }

    /// Check if the error limit has been reached.
    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.errors.len() >= self.config.error_limit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// `Some` once any error has been emitted.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Consume the sink, returning `(errors, warnings)`.
    pub fn into_parts(self) -> (Vec<Diagnostic>, Vec<Diagnostic>) {
        (self.errors, self.warnings)
    }
}

#[cfg(test)]
mod tests;
