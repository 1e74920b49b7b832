use super::*;

use pretty_assertions::assert_eq;
use sem_ir::ast::RawContext;
use sem_ir::{ModuleName, ResolvedEntityRef};
use sem_types::natives::{native_library, native_module_id};
use sem_types::validate_module;

use crate::errors::EvalErrorKind;
use crate::value::{BindingTarget, FunctionBinding};

fn interpreter() -> Interpreter {
    let name = ModuleName::new("test", "natives").unwrap();
    let module = validate_module(&RawContext::default(), &name, &[])
        .into_module()
        .unwrap();
    Interpreter::new(module)
}

fn call(name: &str, arguments: Vec<Value>) -> EvalResult {
    let native = native_function(&EntityId::of(name)).unwrap();
    native(&interpreter(), arguments)
}

fn native_ref(name: &str) -> ResolvedEntityRef {
    ResolvedEntityRef::new(native_module_id(), EntityId::of(name))
}

/// A native with its leading arguments fixed and the rest open.
fn bound(name: &str, fixed: Vec<Value>, open: usize) -> Value {
    let slots = fixed
        .into_iter()
        .map(Some)
        .chain(std::iter::repeat_with(|| None).take(open))
        .collect();
    Value::binding(FunctionBinding::new(
        BindingTarget::Named(native_ref(name)),
        slots,
        Vec::new(),
    ))
}

fn integers(values: &[i64]) -> Value {
    Value::List(values.iter().copied().map(Value::integer).collect())
}

fn naturals(values: &[u64]) -> Value {
    Value::List(values.iter().copied().map(Value::natural).collect())
}

#[test]
fn test_every_declared_native_is_implemented() {
    let mut declared: Vec<String> = native_library()
        .functions
        .keys()
        .map(ToString::to_string)
        .collect();
    declared.sort();
    let mut implemented: Vec<String> = NATIVE_FUNCTIONS
        .iter()
        .map(|(id, _)| (*id).to_string())
        .collect();
    implemented.sort();
    assert_eq!(implemented, declared);
}

fn big(text: &str) -> Value {
    Value::Integer(text.parse().unwrap())
}

#[test]
fn test_integer_arithmetic_does_not_overflow() {
    assert_eq!(
        call("Integer.plus", vec![Value::integer(i64::MAX), Value::integer(1)]).unwrap(),
        big("9223372036854775808")
    );
    assert_eq!(
        call("Integer.times", vec![big("-10000000000000000000"), big("10000000000000000000")])
            .unwrap(),
        big("-100000000000000000000000000000000000000")
    );
    assert_eq!(
        call("Integer.minus", vec![Value::integer(i64::MIN), Value::integer(1)]).unwrap(),
        big("-9223372036854775809")
    );
}

#[test]
fn test_integer_division() {
    let divide = |a, b| call("Integer.dividedBy", vec![Value::integer(a), Value::integer(b)]);
    assert_eq!(divide(-7, 2).unwrap(), Value::success(Value::integer(-3)));
    assert_eq!(divide(1, 0).unwrap(), Value::failure());
    assert_eq!(
        divide(i64::MIN, -1).unwrap(),
        Value::success(big("9223372036854775808"))
    );
}

#[test]
fn test_integer_modulo_is_euclidean() {
    let modulo = |a, b| call("Integer.modulo", vec![Value::integer(a), Value::integer(b)]);
    assert_eq!(modulo(-7, 3).unwrap(), Value::success(Value::integer(2)));
    assert_eq!(modulo(7, 3).unwrap(), Value::success(Value::integer(1)));
    assert_eq!(modulo(7, 0).unwrap(), Value::failure());
    assert_eq!(modulo(7, -3).unwrap(), Value::failure());
}

#[test]
fn test_natural_from_integer() {
    assert_eq!(
        call("Natural", vec![Value::integer(5)]).unwrap(),
        Value::success(Value::natural(5))
    );
    assert_eq!(call("Natural", vec![Value::integer(-1)]).unwrap(), Value::failure());
}

#[test]
fn test_natural_max() {
    assert_eq!(
        call("Natural.max", vec![naturals(&[3, 9, 4])]).unwrap(),
        Value::success(Value::natural(9))
    );
    assert_eq!(call("Natural.max", vec![naturals(&[])]).unwrap(), Value::failure());
}

#[test]
fn test_natural_to_integer_keeps_large_values() {
    assert_eq!(
        call("Natural.toInteger", vec![Value::natural(u64::MAX)]).unwrap(),
        big("18446744073709551615")
    );
    assert_eq!(
        call("Natural.toInteger", vec![Value::natural(7)]).unwrap(),
        Value::integer(7)
    );
}

#[test]
fn test_sub_list_bounds() {
    let sub_list = |start, end| {
        call(
            "List.subList",
            vec![integers(&[1, 2, 3]), Value::natural(start), Value::natural(end)],
        )
        .unwrap()
    };
    assert_eq!(sub_list(1, 3), Value::success(integers(&[2, 3])));
    assert_eq!(sub_list(2, 2), Value::success(integers(&[])));
    assert_eq!(sub_list(2, 1), Value::failure());
    assert_eq!(sub_list(0, 4), Value::failure());
}

#[test]
fn test_list_get_and_last() {
    let list = integers(&[4, 5]);
    assert_eq!(
        call("List.get", vec![list.clone(), Value::natural(1)]).unwrap(),
        Value::success(Value::integer(5))
    );
    assert_eq!(
        call("List.get", vec![list.clone(), Value::natural(2)]).unwrap(),
        Value::failure()
    );
    assert_eq!(
        call("List.last", vec![list]).unwrap(),
        Value::success(Value::integer(5))
    );
    assert_eq!(call("List.last", vec![integers(&[])]).unwrap(), Value::failure());
}

#[test]
fn test_list_map_with_partial_binding() {
    let add_ten = bound("Integer.plus", vec![Value::integer(10)], 1);
    assert_eq!(
        call("List.map", vec![integers(&[1, 2]), add_ten]).unwrap(),
        integers(&[11, 12])
    );
}

#[test]
fn test_list_filter_and_flat_map() {
    let positive = bound("Integer.lessThan", vec![Value::integer(0)], 1);
    assert_eq!(
        call("List.filter", vec![integers(&[-1, 2, 0, 3]), positive]).unwrap(),
        integers(&[2, 3])
    );

    let after_zero = bound("List.append", vec![integers(&[0])], 1);
    assert_eq!(
        call("List.flatMap", vec![integers(&[1, 2]), after_zero]).unwrap(),
        integers(&[0, 1, 0, 2])
    );
}

#[test]
fn test_list_reduce_folds_left() {
    let minus = bound("Integer.minus", vec![], 2);
    assert_eq!(
        call("List.reduce", vec![integers(&[1, 2, 3]), Value::integer(0), minus]).unwrap(),
        Value::integer(-6)
    );
}

#[test]
fn test_list_concatenate() {
    let lists = Value::List(vec![integers(&[1]), integers(&[]), integers(&[2, 3])]);
    assert_eq!(
        call("List.concatenate", vec![lists]).unwrap(),
        integers(&[1, 2, 3])
    );
}

#[test]
fn test_list_builder_appends_in_place() {
    let builder = call("ListBuilder.create", Vec::new()).unwrap();
    let returned = call("ListBuilder.append", vec![builder.clone(), Value::integer(1)]).unwrap();
    assert_eq!(returned, builder);
    call("ListBuilder.appendAll", vec![returned, integers(&[2, 3])]).unwrap();
    assert_eq!(
        call("ListBuilder.build", vec![builder]).unwrap(),
        integers(&[1, 2, 3])
    );
}

#[test]
fn test_sequence_get_and_first() {
    let interpreter = interpreter();
    let sequence = interpreter
        .evaluate(
            &native_ref("Sequence"),
            vec![
                Value::integer(1),
                bound("Integer.times", vec![Value::integer(2)], 1),
            ],
        )
        .unwrap();
    assert_eq!(
        call("Sequence.get", vec![sequence.clone(), Value::natural(4)]).unwrap(),
        Value::integer(16)
    );
    let over_hundred = bound("Integer.lessThan", vec![Value::integer(100)], 1);
    assert_eq!(
        call("Sequence.first", vec![sequence, over_hundred]).unwrap(),
        Value::integer(128)
    );
}

#[test]
fn test_try_natives() {
    let success = Value::success(Value::integer(3));
    assert_eq!(
        call("Try.orElse", vec![Value::failure(), Value::integer(9)]).unwrap(),
        Value::integer(9)
    );
    assert_eq!(
        call("Try.map", vec![success.clone(), bound("Integer.times", vec![Value::integer(2)], 1)])
            .unwrap(),
        Value::success(Value::integer(6))
    );
    assert_eq!(
        call("Try.flatMap", vec![success, bound("Natural", vec![], 1)]).unwrap(),
        Value::success(Value::natural(3))
    );
    assert_eq!(
        call("Try.assume", vec![Value::failure()]).unwrap_err().kind,
        EvalErrorKind::AssumedFailure
    );
}

#[test]
fn test_data_equals_is_structural() {
    assert_eq!(
        call("Data.equals", vec![integers(&[1, 2]), integers(&[1, 2])]).unwrap(),
        Value::Boolean(true)
    );
    assert_eq!(
        call("Data.equals", vec![integers(&[1]), integers(&[2])]).unwrap(),
        Value::Boolean(false)
    );
}

#[test]
fn test_string_length_counts_code_points() {
    assert_eq!(
        call("Unicode.String.length", vec![Value::String("héllo".to_string())]).unwrap(),
        Value::natural(5)
    );
}

#[test]
fn test_wrong_argument_count() {
    let error = call("Boolean.not", Vec::new()).unwrap_err();
    assert_eq!(
        error.kind,
        EvalErrorKind::ArityMismatch {
            name: "Boolean.not".to_string(),
            expected: 1,
            got: 0
        }
    );
}
