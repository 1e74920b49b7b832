//! List, ListBuilder and Sequence natives.

use std::cell::RefCell;

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use super::{natural_from_len, take_arguments};
use crate::errors::{type_mismatch, undefined_member, EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{FunctionBinding, Value};

fn list_and_function(
    name: &str,
    arguments: Vec<Value>,
) -> Result<(Vec<Value>, FunctionBinding), EvalError> {
    let [list, function] = take_arguments(name, arguments)?;
    Ok((list.into_list()?, function.into_binding()?))
}

/// A `Natural` argument used as an index; `None` when it cannot address
/// any list.
fn index(value: &Value) -> Result<Option<usize>, EvalError> {
    Ok(value.as_natural()?.to_usize())
}

// List

pub(super) fn list_append(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [list, item] = take_arguments("List.append", arguments)?;
    let mut list = list.into_list()?;
    list.push(item);
    Ok(Value::List(list))
}

pub(super) fn list_append_front(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [list, item] = take_arguments("List.appendFront", arguments)?;
    let mut list = list.into_list()?;
    list.insert(0, item);
    Ok(Value::List(list))
}

pub(super) fn list_concatenate(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [lists] = take_arguments("List.concatenate", arguments)?;
    let mut result = Vec::new();
    for list in lists.into_list()? {
        result.extend(list.into_list()?);
    }
    Ok(Value::List(result))
}

/// Items `start..end`; failure if `start > end` or `end` is past the end.
pub(super) fn list_sub_list(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [list, start, end] = take_arguments("List.subList", arguments)?;
    let list = list.into_list()?;
    let (Some(start), Some(end)) = (index(&start)?, index(&end)?) else {
        return Ok(Value::failure());
    };
    Ok(match list.get(start..end) {
        Some(items) => Value::success(Value::List(items.to_vec())),
        None => Value::failure(),
    })
}

pub(super) fn list_map(interpreter: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let (list, function) = list_and_function("List.map", arguments)?;
    let mapped = list
        .into_iter()
        .map(|item| interpreter.apply_binding(&function, vec![item]))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::List(mapped))
}

pub(super) fn list_flat_map(interpreter: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let (list, function) = list_and_function("List.flatMap", arguments)?;
    let mut result = Vec::new();
    for item in list {
        result.extend(interpreter.apply_binding(&function, vec![item])?.into_list()?);
    }
    Ok(Value::List(result))
}

pub(super) fn list_filter(interpreter: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let (list, predicate) = list_and_function("List.filter", arguments)?;
    let mut kept = Vec::new();
    for item in list {
        if interpreter
            .apply_binding(&predicate, vec![item.clone()])?
            .as_boolean()?
        {
            kept.push(item);
        }
    }
    Ok(Value::List(kept))
}

/// Left fold: `reducer(accumulator, item)` for each item in order.
pub(super) fn list_reduce(interpreter: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [list, initial, reducer] = take_arguments("List.reduce", arguments)?;
    let reducer = reducer.into_binding()?;
    list.into_list()?
        .into_iter()
        .try_fold(initial, |accumulator, item| {
            interpreter.apply_binding(&reducer, vec![accumulator, item])
        })
}

pub(super) fn list_size(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [list] = take_arguments("List.size", arguments)?;
    Ok(natural_from_len(list.into_list()?.len()))
}

pub(super) fn list_get(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [list, position] = take_arguments("List.get", arguments)?;
    let list = list.into_list()?;
    let item = index(&position)?.and_then(|i| list.into_iter().nth(i));
    Ok(item.map_or_else(Value::failure, Value::success))
}

pub(super) fn list_last(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [list] = take_arguments("List.last", arguments)?;
    Ok(list
        .into_list()?
        .pop()
        .map_or_else(Value::failure, Value::success))
}

// ListBuilder

fn builder_buffer(value: &Value) -> Result<&RefCell<Vec<Value>>, EvalError> {
    match value {
        Value::ListBuilder(buffer) => Ok(buffer.as_ref()),
        other => Err(type_mismatch("ListBuilder", other)),
    }
}

pub(super) fn list_builder_create(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [] = take_arguments("ListBuilder.create", arguments)?;
    Ok(Value::new_list_builder())
}

/// Appends in place and returns the same builder.
pub(super) fn list_builder_append(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [builder, item] = take_arguments("ListBuilder.append", arguments)?;
    builder_buffer(&builder)?.borrow_mut().push(item);
    Ok(builder)
}

pub(super) fn list_builder_append_all(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [builder, items] = take_arguments("ListBuilder.appendAll", arguments)?;
    let items = items.into_list()?;
    builder_buffer(&builder)?.borrow_mut().extend(items);
    Ok(builder)
}

pub(super) fn list_builder_build(_: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [builder] = take_arguments("ListBuilder.build", arguments)?;
    let items = builder_buffer(&builder)?.borrow().clone();
    Ok(Value::List(items))
}

// Sequence

fn sequence_parts(sequence: &Value) -> Result<(Value, FunctionBinding), EvalError> {
    let Value::Struct { members, .. } = sequence else {
        return Err(type_mismatch("Sequence", sequence));
    };
    let [base, successor] = members.as_slice() else {
        return Err(undefined_member("successor", sequence));
    };
    Ok((base.clone(), successor.clone().into_binding()?))
}

/// The element after `n` applications of the successor.
pub(super) fn sequence_get(interpreter: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [sequence, n] = take_arguments("Sequence.get", arguments)?;
    let (mut value, successor) = sequence_parts(&sequence)?;
    let mut remaining = n.as_natural()?.clone();
    while !remaining.is_zero() {
        value = interpreter.apply_binding(&successor, vec![value])?;
        remaining -= BigUint::from(1u8);
    }
    Ok(value)
}

/// The first element satisfying the predicate. Does not return if no
/// element does.
pub(super) fn sequence_first(interpreter: &Interpreter, arguments: Vec<Value>) -> EvalResult {
    let [sequence, predicate] = take_arguments("Sequence.first", arguments)?;
    let (mut value, successor) = sequence_parts(&sequence)?;
    let predicate = predicate.into_binding()?;
    loop {
        if interpreter
            .apply_binding(&predicate, vec![value.clone()])?
            .as_boolean()?
        {
            return Ok(value);
        }
        value = interpreter.apply_binding(&successor, vec![value])?;
    }
}
