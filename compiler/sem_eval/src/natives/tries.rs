//! Try natives.

use super::take_arguments;
use crate::errors::{assumed_failure, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::Value;

pub(super) fn try_success(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [value] = take_arguments("Try.success", arguments)?;
    Ok(Value::success(value))
}

pub(super) fn try_failure(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [] = take_arguments("Try.failure", arguments)?;
    Ok(Value::failure())
}

/// Unwraps a success. A failure here is a runtime error.
pub(super) fn try_assume(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [value] = take_arguments("Try.assume", arguments)?;
    value.into_try()?.ok_or_else(assumed_failure)
}

pub(super) fn try_is_success(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [value] = take_arguments("Try.isSuccess", arguments)?;
    Ok(Value::Boolean(value.into_try()?.is_some()))
}

pub(super) fn try_map(interpreter: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [value, function] = take_arguments("Try.map", arguments)?;
    let function = function.into_binding()?;
    match value.into_try()? {
        Some(inner) => Ok(Value::success(
            interpreter.apply_binding(&function, vec![inner])?,
        )),
        None => Ok(Value::failure()),
    }
}

pub(super) fn try_flat_map(interpreter: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [value, function] = take_arguments("Try.flatMap", arguments)?;
    let function = function.into_binding()?;
    match value.into_try()? {
        Some(inner) => interpreter.apply_binding(&function, vec![inner]),
        None => Ok(Value::failure()),
    }
}

pub(super) fn try_or_else(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [value, fallback] = take_arguments("Try.orElse", arguments)?;
    Ok(value.into_try()?.unwrap_or(fallback))
}
