//! Diagnostics for validation.
//!
//! Every semantic problem found while validating a module becomes a
//! [`Diagnostic`] carrying an [`ErrorCode`], a message, and labelled source
//! locations. Diagnostics are appended to a [`DiagnosticSink`] that is
//! threaded by `&mut` through the validator, so a validation run owns all
//! of its mutable state.
//!
//! # Error Guarantees
//!
//! [`ErrorGuaranteed`] can only be obtained by emitting an error into a
//! sink. Validator functions return `Result<T, ErrorGuaranteed>` so a
//! failed subtree always has a reported cause, and ancestors propagate the
//! failure with `?` without reporting it again.

mod diagnostic;
mod error_code;
mod guarantee;
mod sink;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use sink::{DiagnosticConfig, DiagnosticSink};
