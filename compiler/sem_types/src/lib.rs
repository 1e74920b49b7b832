//! Validation for semlang modules.
//!
//! Turns a parsed [`RawContext`](sem_ir::ast::RawContext) into a
//! [`ValidatedModule`]: every name resolved to exactly one entity, every
//! expression typed, every generic call's type parameters chosen, and the
//! reference discipline checked.
//!
//! # Components
//!
//! - [`natives`]: declarations of the native library `semlang:lang`.
//! - [`resolver`]: the type and function namespaces visible from a module.
//! - [`literal`]: literal validators for types with a literal form.
//! - `check`: the validator passes (declarations, headers, bodies), the
//!   expression and block rules, and type-parameter inference.
//!
//! # Error Guarantees
//!
//! Every validation step returns `Result<T, ErrorGuaranteed>`; a failure
//! always comes with a diagnostic in the run's sink, so validating a
//! module either yields the module or at least one error, never neither.

mod check;
pub mod literal;
mod lookup;
mod module;
pub mod natives;
pub mod resolver;

pub use check::{fake0_version, validate_module, validate_module_with_config};
pub use literal::LiteralValidator;
pub use lookup::{EntityLookup, TypeHeader};
pub use module::{ValidatedModule, ValidationResult};
pub use resolver::{EntityResolution, EntityResolver, FunctionLikeType, ResolutionError};

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
