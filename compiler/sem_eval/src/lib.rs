//! Interpreter for validated semlang modules.
//!
//! Takes a [`ValidatedModule`](sem_types::ValidatedModule) from
//! `sem_types` and evaluates its functions directly on the typed tree.
//!
//! # Components
//!
//! - [`Interpreter`]: entity dispatch, blocks, expressions and function
//!   bindings; literal decoding lives with it in `literal`.
//! - [`natives`]: implementations of the native library, keyed by the
//!   ids `sem_types::natives` declares.
//! - [`Value`]: runtime values.
//! - [`run_tests`]: the `@Test` runner.
//!
//! # Errors
//!
//! A program's own failures are `Try` failure values. An [`EvalError`]
//! reports something a validated module should not do at runtime:
//! `Try.assume` on a failure, or a malformed `@Test` literal.

mod environment;
mod errors;
mod interpreter;
mod literal;
pub mod natives;
mod optimized;
mod testing;
mod value;

use std::sync::Once;

pub use environment::Environment;
pub use errors::{EvalBacktrace, EvalError, EvalErrorKind, EvalResult};
pub use interpreter::Interpreter;
pub use optimized::{InterpreterOptions, OptimizedFunctions};
pub use testing::{run_tests, TestCaseResult, TestOutcome, TestReport, TestRunnerOptions};
pub use value::{BindingTarget, FunctionBinding, Slots, Value};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset, and only installs once per
/// process.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            use tracing_subscriber::{fmt, prelude::*, EnvFilter};
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

#[cfg(test)]
mod test_helpers;
