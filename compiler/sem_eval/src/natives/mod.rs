//! Implementations of the native library `semlang:lang`.
//!
//! Signatures live in `sem_types::natives`; this module maps each native
//! function id to a Rust function. The set is fixed, so dispatch is a
//! static table rather than a trait.

mod collections;
mod numeric;
mod tries;

use std::fmt;
use std::sync::OnceLock;

use num_bigint::BigUint;
use rustc_hash::FxHashMap;
use sem_ir::EntityId;

use crate::errors::{arity_mismatch, type_mismatch, EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::Value;

/// A native function. The interpreter is passed through for natives that
/// call function bindings.
pub type NativeFn = fn(&Interpreter, Vec<Value>) -> EvalResult;

/// Every native function with an implementation, by id.
pub const NATIVE_FUNCTIONS: &[(&str, NativeFn)] = &[
    // Boolean
    ("Boolean.and", numeric::boolean_and),
    ("Boolean.not", numeric::boolean_not),
    ("Boolean.or", numeric::boolean_or),
    // Data
    ("Data.equals", data_equals),
    // Integer
    ("Integer.dividedBy", numeric::integer_divided_by),
    ("Integer.equals", numeric::integer_equals),
    ("Integer.greaterThan", numeric::integer_greater_than),
    ("Integer.lessThan", numeric::integer_less_than),
    ("Integer.minus", numeric::integer_minus),
    ("Integer.modulo", numeric::integer_modulo),
    ("Integer.plus", numeric::integer_plus),
    ("Integer.times", numeric::integer_times),
    // List
    ("List.append", collections::list_append),
    ("List.appendFront", collections::list_append_front),
    ("List.concatenate", collections::list_concatenate),
    ("List.filter", collections::list_filter),
    ("List.flatMap", collections::list_flat_map),
    ("List.get", collections::list_get),
    ("List.last", collections::list_last),
    ("List.map", collections::list_map),
    ("List.reduce", collections::list_reduce),
    ("List.size", collections::list_size),
    ("List.subList", collections::list_sub_list),
    // ListBuilder
    ("ListBuilder.append", collections::list_builder_append),
    ("ListBuilder.appendAll", collections::list_builder_append_all),
    ("ListBuilder.build", collections::list_builder_build),
    ("ListBuilder.create", collections::list_builder_create),
    // Natural
    ("Natural", numeric::natural),
    ("Natural.dividedBy", numeric::natural_divided_by),
    ("Natural.equals", numeric::natural_equals),
    ("Natural.lessThan", numeric::natural_less_than),
    ("Natural.max", numeric::natural_max),
    ("Natural.plus", numeric::natural_plus),
    ("Natural.times", numeric::natural_times),
    ("Natural.toInteger", numeric::natural_to_integer),
    // Sequence
    ("Sequence.first", collections::sequence_first),
    ("Sequence.get", collections::sequence_get),
    // Try
    ("Try.assume", tries::try_assume),
    ("Try.failure", tries::try_failure),
    ("Try.flatMap", tries::try_flat_map),
    ("Try.isSuccess", tries::try_is_success),
    ("Try.map", tries::try_map),
    ("Try.orElse", tries::try_or_else),
    ("Try.success", tries::try_success),
    // Unicode.String
    ("Unicode.String.length", string_length),
];

fn registry() -> &'static FxHashMap<EntityId, NativeFn> {
    static REGISTRY: OnceLock<FxHashMap<EntityId, NativeFn>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        NATIVE_FUNCTIONS
            .iter()
            .map(|(id, native)| (EntityId::of(id), *native))
            .collect()
    })
}

pub(crate) fn native_function(id: &EntityId) -> Option<NativeFn> {
    registry().get(id).copied()
}

/// Destructure an argument list of a known length.
pub(crate) fn take_arguments<const N: usize>(
    name: impl fmt::Display,
    arguments: Vec<Value>,
) -> Result<[Value; N], EvalError> {
    let got = arguments.len();
    <[Value; N]>::try_from(arguments).map_err(|_| arity_mismatch(name, N, got))
}

pub(crate) fn natural_from_len(len: usize) -> Value {
    Value::Natural(BigUint::from(len))
}

fn data_equals(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [left, right] = take_arguments("Data.equals", arguments)?;
    Ok(Value::Boolean(left == right))
}

/// Length in Unicode code points.
fn string_length(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [text] = take_arguments("Unicode.String.length", arguments)?;
    match text {
        Value::String(text) => Ok(natural_from_len(text.chars().count())),
        other => Err(type_mismatch("Unicode.String", &other)),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
