//! Boolean, Integer and Natural natives.
//!
//! Integers and Naturals have arbitrary precision, so arithmetic never
//! overflows. Division by zero is an ordinary `Try` failure.

use num_bigint::{BigInt, BigUint};
use num_traits::{Signed, Zero};

use super::take_arguments;
use crate::errors::{EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::Value;

fn booleans(name: &str, arguments: Vec<Value>) -> Result<(bool, bool), EvalError> {
    let [a, b] = take_arguments(name, arguments)?;
    Ok((a.as_boolean()?, b.as_boolean()?))
}

fn integers(name: &str, arguments: Vec<Value>) -> Result<(BigInt, BigInt), EvalError> {
    let [a, b] = take_arguments(name, arguments)?;
    Ok((a.as_integer()?.clone(), b.as_integer()?.clone()))
}

fn naturals(name: &str, arguments: Vec<Value>) -> Result<(BigUint, BigUint), EvalError> {
    let [a, b] = take_arguments(name, arguments)?;
    Ok((a.as_natural()?.clone(), b.as_natural()?.clone()))
}

// Boolean

pub(super) fn boolean_not(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [value] = take_arguments("Boolean.not", arguments)?;
    Ok(Value::Boolean(!value.as_boolean()?))
}

pub(super) fn boolean_and(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let (a, b) = booleans("Boolean.and", arguments)?;
    Ok(Value::Boolean(a && b))
}

pub(super) fn boolean_or(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let (a, b) = booleans("Boolean.or", arguments)?;
    Ok(Value::Boolean(a || b))
}

// Integer

pub(super) fn integer_plus(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let (a, b) = integers("Integer.plus", arguments)?;
    Ok(Value::Integer(a + b))
}

pub(super) fn integer_minus(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let (a, b) = integers("Integer.minus", arguments)?;
    Ok(Value::Integer(a - b))
}

pub(super) fn integer_times(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let (a, b) = integers("Integer.times", arguments)?;
    Ok(Value::Integer(a * b))
}

/// Truncating division; failure on a zero divisor.
pub(super) fn integer_divided_by(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let (a, b) = integers("Integer.dividedBy", arguments)?;
    if b.is_zero() {
        return Ok(Value::failure());
    }
    Ok(Value::success(Value::Integer(a / b)))
}

/// Euclidean remainder; failure unless the divisor is positive.
pub(super) fn integer_modulo(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let (a, b) = integers("Integer.modulo", arguments)?;
    if !b.is_positive() {
        return Ok(Value::failure());
    }
    let remainder = a % &b;
    let remainder = if remainder.is_negative() {
        remainder + b
    } else {
        remainder
    };
    Ok(Value::success(Value::Integer(remainder)))
}

pub(super) fn integer_equals(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let (a, b) = integers("Integer.equals", arguments)?;
    Ok(Value::Boolean(a == b))
}

pub(super) fn integer_less_than(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let (a, b) = integers("Integer.lessThan", arguments)?;
    Ok(Value::Boolean(a < b))
}

pub(super) fn integer_greater_than(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let (a, b) = integers("Integer.greaterThan", arguments)?;
    Ok(Value::Boolean(a > b))
}

// Natural

/// `Natural(Integer)`: failure on negatives.
pub(super) fn natural(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [value] = take_arguments("Natural", arguments)?;
    Ok(match value.as_integer()?.to_biguint() {
        Some(natural) => Value::success(Value::Natural(natural)),
        None => Value::failure(),
    })
}

pub(super) fn natural_to_integer(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [value] = take_arguments("Natural.toInteger", arguments)?;
    Ok(Value::Integer(BigInt::from(value.as_natural()?.clone())))
}

pub(super) fn natural_plus(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let (a, b) = naturals("Natural.plus", arguments)?;
    Ok(Value::Natural(a + b))
}

pub(super) fn natural_times(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let (a, b) = naturals("Natural.times", arguments)?;
    Ok(Value::Natural(a * b))
}

pub(super) fn natural_divided_by(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let (a, b) = naturals("Natural.dividedBy", arguments)?;
    if b.is_zero() {
        return Ok(Value::failure());
    }
    Ok(Value::success(Value::Natural(a / b)))
}

pub(super) fn natural_equals(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let (a, b) = naturals("Natural.equals", arguments)?;
    Ok(Value::Boolean(a == b))
}

pub(super) fn natural_less_than(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let (a, b) = naturals("Natural.lessThan", arguments)?;
    Ok(Value::Boolean(a < b))
}

/// Failure on an empty list.
pub(super) fn natural_max(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [list] = take_arguments("Natural.max", arguments)?;
    let mut max: Option<BigUint> = None;
    for item in list.into_list()? {
        let item = item.as_natural()?;
        max = match max {
            Some(current) if current >= *item => Some(current),
            _ => Some(item.clone()),
        };
    }
    Ok(max.map_or_else(Value::failure, |max| Value::success(Value::Natural(max))))
}
