use super::*;

use pretty_assertions::assert_eq;
use sem_ir::ast::{
    Block, Expression, Function, RawContext, Statement, UnvalidatedInterface, UnvalidatedMember,
    UnvalidatedMethod, UnvalidatedOption, UnvalidatedStruct, UnvalidatedUnion,
};
use sem_ir::UnvalidatedType;

use crate::errors::EvalErrorKind;
use crate::test_helpers::{arg, functions, interpreter_for, main_returning, run};

fn double() -> Function {
    Function::new(
        "double",
        vec![arg("x", UnvalidatedType::Integer)],
        UnvalidatedType::Integer,
        Block::of(Expression::call(
            "Integer.plus",
            vec![Expression::var("x"), Expression::var("x")],
        )),
    )
}

#[test]
fn test_calls_user_function() {
    let context = functions(vec![
        double(),
        main_returning(
            UnvalidatedType::Integer,
            vec![Statement::bare(Expression::call(
                "double",
                vec![Expression::integer("21")],
            ))],
        ),
    ]);
    assert_eq!(run(&context, "main", Vec::new()).unwrap(), Value::integer(42));
    assert_eq!(
        run(&context, "double", vec![Value::integer(-4)]).unwrap(),
        Value::integer(-8)
    );
}

#[test]
fn test_if_then_takes_one_branch() {
    let sign = Function::new(
        "sign",
        vec![arg("x", UnvalidatedType::Integer)],
        UnvalidatedType::Integer,
        Block::of(Expression::if_then(
            Expression::call(
                "Integer.lessThan",
                vec![Expression::var("x"), Expression::integer("0")],
            ),
            Block::of(Expression::integer("-1")),
            Block::of(Expression::integer("1")),
        )),
    );
    let interpreter = interpreter_for(&functions(vec![sign]));
    let sign_of = |x| {
        interpreter
            .interpret(&EntityId::of("sign"), vec![Value::integer(x)])
            .unwrap()
    };
    assert_eq!(sign_of(-5), Value::integer(-1));
    assert_eq!(sign_of(5), Value::integer(1));
}

#[test]
fn test_closure_sees_captured_values() {
    let add_a = Expression::inline_function(
        vec![arg("x", UnvalidatedType::Integer)],
        UnvalidatedType::Integer,
        Block::of(Expression::call(
            "Integer.plus",
            vec![Expression::var("a"), Expression::var("x")],
        )),
    );
    let context = functions(vec![main_returning(
        UnvalidatedType::Integer,
        vec![
            Statement::assign("a", Expression::integer("40")),
            Statement::assign("f", add_a),
            Statement::bare(Expression::call_expression(
                Expression::var("f"),
                vec![Expression::integer("2")],
            )),
        ],
    )]);
    assert_eq!(run(&context, "main", Vec::new()).unwrap(), Value::integer(42));
}

#[test]
fn test_bindings_fill_open_slots_in_order() {
    let context = functions(vec![main_returning(
        UnvalidatedType::Integer,
        vec![
            Statement::assign("minus", Expression::bind("Integer.minus", vec![None, None])),
            Statement::assign(
                "fromTen",
                Expression::bind_expression(
                    Expression::var("minus"),
                    vec![Some(Expression::integer("10")), None],
                ),
            ),
            Statement::bare(Expression::call_expression(
                Expression::var("fromTen"),
                vec![Expression::integer("3")],
            )),
        ],
    )]);
    assert_eq!(run(&context, "main", Vec::new()).unwrap(), Value::integer(7));
}

fn positive_context() -> RawContext {
    RawContext {
        structs: vec![UnvalidatedStruct::new(
            "Positive",
            vec![UnvalidatedMember::new("value", UnvalidatedType::Integer)],
        )
        .with_requires(Block::of(Expression::call(
            "Integer.greaterThan",
            vec![Expression::var("value"), Expression::integer("0")],
        )))],
        functions: vec![
            Function::new(
                "make",
                vec![arg("x", UnvalidatedType::Integer)],
                UnvalidatedType::try_of(UnvalidatedType::named("Positive")),
                Block::of(Expression::call("Positive", vec![Expression::var("x")])),
            ),
            Function::new(
                "valueOf",
                vec![arg("p", UnvalidatedType::named("Positive"))],
                UnvalidatedType::Integer,
                Block::of(Expression::follow(Expression::var("p"), "value")),
            ),
        ],
        ..RawContext::default()
    }
}

#[test]
fn test_requires_block_guards_construction() {
    let interpreter = interpreter_for(&positive_context());
    let make = |x| {
        interpreter
            .interpret(&EntityId::of("make"), vec![Value::integer(x)])
            .unwrap()
    };
    let made = make(5);
    assert_eq!(made.to_string(), "success(Positive(5))");
    assert_eq!(make(0), Value::failure());

    let positive = made.into_try().unwrap().unwrap();
    assert_eq!(
        interpreter
            .interpret(&EntityId::of("valueOf"), vec![positive])
            .unwrap(),
        Value::integer(5)
    );
}

#[test]
fn test_union_when_applies_matching_handler() {
    let answer = UnvalidatedUnion::new(
        "Answer",
        vec![
            UnvalidatedOption::new("Yes", None),
            UnvalidatedOption::new("Maybe", Some(UnvalidatedType::Natural)),
        ],
    );
    let on_yes = Expression::inline_function(
        Vec::new(),
        UnvalidatedType::Natural,
        Block::of(Expression::literal(UnvalidatedType::Natural, "100")),
    );
    let on_maybe = Expression::inline_function(
        vec![arg("percent", UnvalidatedType::Natural)],
        UnvalidatedType::Natural,
        Block::of(Expression::var("percent")),
    );
    let score = Function::new(
        "score",
        vec![arg("answer", UnvalidatedType::named("Answer"))],
        UnvalidatedType::Natural,
        Block::of(Expression::call(
            "Answer.when",
            vec![Expression::var("answer"), on_yes, on_maybe],
        )),
    );
    let interpreter = interpreter_for(&RawContext {
        unions: vec![answer],
        functions: vec![score],
        ..RawContext::default()
    });

    let yes = interpreter
        .interpret(&EntityId::of("Answer.Yes"), Vec::new())
        .unwrap();
    let maybe = interpreter
        .interpret(&EntityId::of("Answer.Maybe"), vec![Value::natural(50)])
        .unwrap();
    assert_eq!(maybe.to_string(), "Answer.Maybe(50)");

    let score = |answer| {
        interpreter
            .interpret(&EntityId::of("score"), vec![answer])
            .unwrap()
    };
    assert_eq!(score(yes), Value::natural(100));
    assert_eq!(score(maybe), Value::natural(50));
}

#[test]
fn test_interface_methods_receive_the_data_value() {
    let area = Expression::inline_function(
        vec![arg("size", UnvalidatedType::Integer)],
        UnvalidatedType::Integer,
        Block::of(Expression::call(
            "Integer.times",
            vec![Expression::var("size"), Expression::var("size")],
        )),
    );
    let context = RawContext {
        interfaces: vec![UnvalidatedInterface::new(
            "Shape",
            vec![UnvalidatedMethod::new("area", Vec::new(), UnvalidatedType::Integer)],
        )],
        functions: vec![main_returning(
            UnvalidatedType::Integer,
            vec![
                Statement::assign(
                    "shape",
                    Expression::call(
                        "Shape",
                        vec![
                            Expression::integer("3"),
                            Expression::call("Shape.Adapter", vec![area]),
                        ],
                    ),
                ),
                Statement::bare(Expression::call_expression(
                    Expression::follow(Expression::var("shape"), "area"),
                    Vec::new(),
                )),
            ],
        )],
        ..RawContext::default()
    };
    assert_eq!(run(&context, "main", Vec::new()).unwrap(), Value::integer(9));
}

#[test]
fn test_error_backtrace_lists_entities_innermost_first() {
    let boom = Function::new(
        "boom",
        Vec::new(),
        UnvalidatedType::Integer,
        Block::of(Expression::call(
            "Try.assume",
            vec![Expression::call_with(
                "Try.failure",
                vec![UnvalidatedType::Integer],
                Vec::new(),
            )],
        )),
    );
    let context = functions(vec![
        boom,
        main_returning(
            UnvalidatedType::Integer,
            vec![Statement::bare(Expression::call("boom", Vec::new()))],
        ),
    ]);
    let error = run(&context, "main", Vec::new()).unwrap_err();
    assert_eq!(error.kind, EvalErrorKind::AssumedFailure);

    let frames = error.backtrace.frames();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0], "semlang:lang:0:Try.assume");
    assert!(frames[1].ends_with(":boom"));
    assert!(frames[2].ends_with(":main"));
}

fn always_zero(_: &Interpreter, _: Vec<Value>) -> EvalResult {
    Ok(Value::integer(0))
}

#[test]
fn test_optimized_override_replaces_body() {
    let module = crate::test_helpers::validated(&functions(vec![double()]));
    let mut optimized = OptimizedFunctions::new();
    optimized.register(
        ResolvedEntityRef::new(module.id.clone(), EntityId::of("double")),
        always_zero,
    );
    let id = EntityId::of("double");

    let enabled = Interpreter::with_options(
        Arc::clone(&module),
        InterpreterOptions::default(),
        optimized.clone(),
    );
    assert_eq!(
        enabled.interpret(&id, vec![Value::integer(4)]).unwrap(),
        Value::integer(0)
    );

    let disabled = Interpreter::with_options(
        module,
        InterpreterOptions {
            use_library_optimizations: false,
        },
        optimized,
    );
    assert_eq!(
        disabled.interpret(&id, vec![Value::integer(4)]).unwrap(),
        Value::integer(8)
    );
}

#[test]
fn test_deep_recursion_grows_the_stack() {
    let count_down = Function::new(
        "countDown",
        vec![arg("n", UnvalidatedType::Integer)],
        UnvalidatedType::Integer,
        Block::of(Expression::if_then(
            Expression::call(
                "Integer.equals",
                vec![Expression::var("n"), Expression::integer("0")],
            ),
            Block::of(Expression::integer("0")),
            Block::of(Expression::call(
                "countDown",
                vec![Expression::call(
                    "Integer.minus",
                    vec![Expression::var("n"), Expression::integer("1")],
                )],
            )),
        )),
    );
    let result = run(
        &functions(vec![count_down]),
        "countDown",
        vec![Value::integer(20_000)],
    );
    assert_eq!(result.unwrap(), Value::integer(0));
}

#[test]
fn test_unknown_entity_and_wrong_arity() {
    let interpreter = interpreter_for(&functions(vec![double()]));
    let missing = interpreter
        .interpret(&EntityId::of("missing"), Vec::new())
        .unwrap_err();
    assert!(matches!(missing.kind, EvalErrorKind::UndefinedEntity { .. }));

    let arity = interpreter
        .interpret(&EntityId::of("double"), Vec::new())
        .unwrap_err();
    assert!(matches!(
        arity.kind,
        EvalErrorKind::ArityMismatch {
            expected: 1,
            got: 0,
            ..
        }
    ));
}
