//! Stack growth for deep recursive descents.
//!
//! Both the validator and the interpreter walk nested trees with plain
//! recursion: blocks inside if/then arms, inline functions inside call
//! arguments, user functions calling user functions. A deep enough program
//! would overflow the native stack, so each recursive step runs inside
//! [`ensure_sufficient_stack`], which grows the stack on demand.
//!
//! On `wasm32` the call is a passthrough.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated stack segment.
const GROWTH: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, GROWTH, f)
}

/// Run `f` directly; the wasm runtime manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
