use super::*;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use sem_diagnostic::ErrorCode;
use sem_ir::ast::{
    Annotation, Block, Expression, Function, RawContext, Statement, UnvalidatedArgument,
    UnvalidatedInterface, UnvalidatedMember, UnvalidatedMethod, UnvalidatedOption,
    UnvalidatedStruct, UnvalidatedUnion,
};
use sem_ir::typed::{TypedExprKind, ValidatedStatement};
use sem_ir::{
    EntityId, EntityRef, FunctionType, Location, ModuleName, ModuleRef, Span, Type, TypeParameter,
    UnvalidatedType,
};

// ============================================================================
// Helpers
// ============================================================================

fn module_name(module: &str) -> ModuleName {
    ModuleName::new("example", module).unwrap()
}

fn validate(context: &RawContext) -> ValidationResult {
    validate_module(context, &module_name("app"), &[])
}

fn codes(result: &ValidationResult) -> Vec<ErrorCode> {
    result.errors().iter().map(|d| d.code).collect()
}

fn functions(functions: Vec<Function>) -> RawContext {
    RawContext {
        functions,
        ..RawContext::default()
    }
}

fn main_returning(return_type: UnvalidatedType, statements: Vec<Statement>) -> Function {
    Function::new("main", Vec::new(), return_type, Block::new(statements))
}

fn arg(name: &str, ty: UnvalidatedType) -> UnvalidatedArgument {
    UnvalidatedArgument::new(name, ty)
}

fn identity() -> Function {
    Function::new(
        "id",
        vec![arg("value", UnvalidatedType::named("T"))],
        UnvalidatedType::named("T"),
        Block::of(Expression::var("value")),
    )
    .with_type_parameters(vec![TypeParameter::unconstrained("T")])
}

fn builder_of_integers() -> Expression {
    Expression::call_with("ListBuilder.create", vec![UnvalidatedType::Integer], Vec::new())
}

fn body_of<'a>(module: &'a ValidatedModule, id: &str) -> &'a sem_ir::typed::TypedBlock {
    &module.functions[&EntityId::of(id)].block
}

// ============================================================================
// Generic calls
// ============================================================================

#[test]
fn test_infers_identity_type_parameter() {
    let context = functions(vec![
        identity(),
        main_returning(
            UnvalidatedType::Integer,
            vec![Statement::bare(Expression::call(
                "id",
                vec![Expression::integer("5")],
            ))],
        ),
    ]);
    let result = validate(&context);
    let module = result.module().unwrap();

    match &body_of(module, "main").last_statement.kind {
        TypedExprKind::NamedFunctionCall {
            chosen_parameters,
            resolved_ref,
            ..
        } => {
            assert_eq!(chosen_parameters, &vec![Type::Integer]);
            assert_eq!(resolved_ref.module, module.id);
        }
        other => panic!("expected a named call, got {other:?}"),
    }
}

#[test]
fn test_explicit_parameter_conflicting_with_argument() {
    let context = functions(vec![
        identity(),
        main_returning(
            UnvalidatedType::Boolean,
            vec![Statement::bare(Expression::call_with(
                "id",
                vec![UnvalidatedType::Boolean],
                vec![Expression::integer("5")],
            ))],
        ),
    ]);
    assert_eq!(codes(&validate(&context)), vec![ErrorCode::E3003]);
}

#[test]
fn test_too_many_type_arguments() {
    let context = functions(vec![
        identity(),
        main_returning(
            UnvalidatedType::Integer,
            vec![Statement::bare(Expression::call_with(
                "id",
                vec![UnvalidatedType::Integer, UnvalidatedType::Integer],
                vec![Expression::integer("5")],
            ))],
        ),
    ]);
    assert_eq!(codes(&validate(&context)), vec![ErrorCode::E4001]);
}

#[test]
fn test_uninferable_call_needs_explicit_parameter() {
    let context = functions(vec![main_returning(
        UnvalidatedType::Boolean,
        vec![Statement::bare(Expression::call(
            "Try.isSuccess",
            vec![Expression::call("Try.failure", Vec::new())],
        ))],
    )]);
    assert_eq!(codes(&validate(&context)), vec![ErrorCode::E4002]);
}

#[test]
fn test_data_typeclass_rejects_functions() {
    let function_type =
        UnvalidatedType::function(vec![UnvalidatedType::Integer], UnvalidatedType::Integer);
    let context = functions(vec![Function::new(
        "compare",
        vec![arg("f", function_type)],
        UnvalidatedType::Boolean,
        Block::of(Expression::call(
            "Data.equals",
            vec![Expression::var("f"), Expression::var("f")],
        )),
    )]);
    assert_eq!(codes(&validate(&context)), vec![ErrorCode::E4003]);
}

#[test]
fn test_reference_type_cannot_be_a_type_argument() {
    let context = functions(vec![main_returning(
        UnvalidatedType::Boolean,
        vec![Statement::bare(Expression::call(
            "Try.isSuccess",
            vec![Expression::call("Try.success", vec![builder_of_integers()])],
        ))],
    )]);
    assert!(codes(&validate(&context)).contains(&ErrorCode::E4004));
}

// ============================================================================
// Bindings
// ============================================================================

#[test]
fn test_partial_binding_drops_bound_slot() {
    let context = functions(vec![main_returning(
        UnvalidatedType::Integer,
        vec![
            Statement::assign(
                "increment",
                Expression::bind("Integer.plus", vec![Some(Expression::integer("1")), None]),
            ),
            Statement::bare(Expression::call_expression(
                Expression::var("increment"),
                vec![Expression::integer("2")],
            )),
        ],
    )]);
    let result = validate(&context);
    let module = result.module().unwrap();

    match &body_of(module, "main").statements[0] {
        ValidatedStatement::Assignment { ty, .. } => assert_eq!(
            ty,
            &Type::Function(FunctionType::create(
                false,
                Vec::new(),
                vec![Type::Integer],
                Type::Integer
            ))
        ),
        other => panic!("expected an assignment, got {other:?}"),
    }
}

#[test]
fn test_binding_that_needs_an_unchosen_parameter() {
    let double = Expression::inline_function(
        vec![arg("x", UnvalidatedType::Integer)],
        UnvalidatedType::Integer,
        Block::of(Expression::var("x")),
    );
    let context = functions(vec![main_returning(
        UnvalidatedType::Boolean,
        vec![
            Statement::assign(
                "mapper",
                Expression::bind_with("List.map", vec![None, None], vec![None, Some(double)]),
            ),
            Statement::bare(Expression::boolean(true)),
        ],
    )]);
    assert_eq!(codes(&validate(&context)), vec![ErrorCode::E3015]);
}

// ============================================================================
// Declarations and resolution
// ============================================================================

#[test]
fn test_duplicate_ids_report_every_site() {
    let first = Location::new("app.sem", Span::new(0, 5));
    let second = Location::new("app.sem", Span::new(40, 45));
    let constant = |at: &Location| {
        Function::new(
            "twice",
            Vec::new(),
            UnvalidatedType::Integer,
            Block::of(Expression::integer("1")),
        )
        .at(at.clone())
    };
    let context = functions(vec![constant(&first), constant(&second)]);
    let result = validate(&context);

    let sites: Vec<Option<&Location>> = result
        .errors()
        .iter()
        .filter(|d| d.code == ErrorCode::E2001)
        .map(sem_diagnostic::Diagnostic::location)
        .collect();
    assert_eq!(sites, vec![Some(&first), Some(&second)]);
}

#[test]
fn test_calling_a_duplicated_id() {
    let constant = || {
        Function::new(
            "twice",
            Vec::new(),
            UnvalidatedType::Integer,
            Block::of(Expression::integer("1")),
        )
    };
    let context = functions(vec![
        constant(),
        constant(),
        main_returning(
            UnvalidatedType::Integer,
            vec![Statement::bare(Expression::call("twice", Vec::new()))],
        ),
    ]);
    let codes = codes(&validate(&context));
    assert!(codes.contains(&ErrorCode::E1003));
    assert!(!codes.contains(&ErrorCode::E1001));
}

fn exporting_helper(module: &str, exported: bool) -> Arc<ValidatedModule> {
    let mut helper = Function::new(
        "helper",
        Vec::new(),
        UnvalidatedType::Integer,
        Block::of(Expression::integer("7")),
    );
    if exported {
        helper = helper.with_annotation(Annotation::export());
    }
    validate_module(&functions(vec![helper]), &module_name(module), &[])
        .into_module()
        .unwrap()
}

#[test]
fn test_same_export_from_two_dependencies_is_ambiguous() {
    let dependencies = [exporting_helper("alpha", true), exporting_helper("beta", true)];
    let unqualified = functions(vec![main_returning(
        UnvalidatedType::Integer,
        vec![Statement::bare(Expression::call("helper", Vec::new()))],
    )]);
    let result = validate_module(&unqualified, &module_name("app"), &dependencies);
    assert_eq!(codes(&result), vec![ErrorCode::E1002]);

    let qualified = functions(vec![main_returning(
        UnvalidatedType::Integer,
        vec![Statement::bare(Expression::NamedFunctionCall {
            function_ref: EntityRef::new(
                Some(ModuleRef::new(None, "alpha", None).unwrap()),
                EntityId::of("helper"),
            ),
            arguments: Vec::new(),
            chosen_parameters: Vec::new(),
            location: None,
        })],
    )]);
    let result = validate_module(&qualified, &module_name("app"), &dependencies);
    let module = result.module().unwrap();
    assert_eq!(module.upstream.len(), 2);
}

#[test]
fn test_unexported_entities_are_invisible() {
    let dependencies = [exporting_helper("alpha", false)];
    let context = functions(vec![main_returning(
        UnvalidatedType::Integer,
        vec![Statement::bare(Expression::call("helper", Vec::new()))],
    )]);
    let result = validate_module(&context, &module_name("app"), &dependencies);
    assert_eq!(codes(&result), vec![ErrorCode::E1001]);
}

#[test]
fn test_local_duplicate_hides_upstream_export() {
    let dependencies = [exporting_helper("alpha", true)];
    let local_helper = || {
        Function::new(
            "helper",
            Vec::new(),
            UnvalidatedType::Integer,
            Block::of(Expression::integer("1")),
        )
    };
    let calling = |function_ref: EntityRef| {
        functions(vec![
            local_helper(),
            local_helper(),
            main_returning(
                UnvalidatedType::Integer,
                vec![Statement::bare(Expression::NamedFunctionCall {
                    function_ref,
                    arguments: Vec::new(),
                    chosen_parameters: Vec::new(),
                    location: None,
                })],
            ),
        ])
    };

    let unqualified = calling(EntityRef::of("helper"));
    let codes_found = codes(&validate_module(&unqualified, &module_name("app"), &dependencies));
    let duplicates = codes_found.iter().filter(|c| **c == ErrorCode::E2001).count();
    assert_eq!(duplicates, 2);
    assert!(codes_found.contains(&ErrorCode::E1003), "{codes_found:?}");

    let qualified = calling(EntityRef::new(
        Some(ModuleRef::new(None, "alpha", None).unwrap()),
        EntityId::of("helper"),
    ));
    let codes_found = codes(&validate_module(&qualified, &module_name("app"), &dependencies));
    assert!(!codes_found.contains(&ErrorCode::E1003), "{codes_found:?}");
}

#[test]
fn test_unlocated_duplicates_are_each_reported() {
    let constant = || {
        Function::new(
            "twice",
            Vec::new(),
            UnvalidatedType::Integer,
            Block::of(Expression::integer("1")),
        )
    };
    let context = functions(vec![constant(), constant()]);
    let messages: Vec<String> = validate(&context)
        .errors()
        .iter()
        .filter(|d| d.code == ErrorCode::E2001)
        .map(ToString::to_string)
        .collect();
    assert_eq!(messages.len(), 2, "{messages:?}");
}

#[test]
fn test_module_version_is_deterministic() {
    let context = functions(vec![identity()]);
    let first = validate(&context).into_module().unwrap();
    let second = validate(&context).into_module().unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.id.fake0_version, fake0_version(&context, &[]));

    let other = functions(vec![
        identity(),
        main_returning(
            UnvalidatedType::Integer,
            vec![Statement::bare(Expression::integer("1"))],
        ),
    ]);
    assert_ne!(first.id, validate(&other).into_module().unwrap().id);
}

// ============================================================================
// Types
// ============================================================================

#[test]
fn test_named_type_arity() {
    let context = functions(vec![Function::new(
        "first",
        vec![arg(
            "sequence",
            UnvalidatedType::named_with(
                "Sequence",
                vec![UnvalidatedType::Integer, UnvalidatedType::Integer],
            ),
        )],
        UnvalidatedType::Integer,
        Block::of(Expression::integer("1")),
    )]);
    assert_eq!(codes(&validate(&context)), vec![ErrorCode::E2005]);
}

#[test]
fn test_reference_marker_must_match() {
    let context = functions(vec![Function::new(
        "fill",
        vec![arg(
            "builder",
            UnvalidatedType::named_with("ListBuilder", vec![UnvalidatedType::Integer]),
        )],
        UnvalidatedType::Integer,
        Block::of(Expression::integer("1")),
    )]);
    assert_eq!(codes(&validate(&context)), vec![ErrorCode::E2004]);
}

#[test]
fn test_struct_members_must_be_value_types() {
    let context = RawContext {
        structs: vec![UnvalidatedStruct::new(
            "Holder",
            vec![UnvalidatedMember::new(
                "builder",
                UnvalidatedType::reference("ListBuilder", vec![UnvalidatedType::Integer]),
            )],
        )],
        ..RawContext::default()
    };
    assert_eq!(codes(&validate(&context)), vec![ErrorCode::E2003]);
}

#[test]
fn test_requires_block_must_be_boolean() {
    let context = RawContext {
        structs: vec![UnvalidatedStruct::new(
            "Positive",
            vec![UnvalidatedMember::new("value", UnvalidatedType::Integer)],
        )
        .with_requires(Block::of(Expression::var("value")))],
        ..RawContext::default()
    };
    assert_eq!(codes(&validate(&context)), vec![ErrorCode::E2006]);
}

#[test]
fn test_constructor_with_requires_returns_try() {
    let context = RawContext {
        structs: vec![UnvalidatedStruct::new(
            "Positive",
            vec![UnvalidatedMember::new("value", UnvalidatedType::Integer)],
        )
        .with_requires(Block::of(Expression::call(
            "Integer.greaterThan",
            vec![Expression::var("value"), Expression::integer("0")],
        )))],
        functions: vec![main_returning(
            UnvalidatedType::try_of(UnvalidatedType::named("Positive")),
            vec![Statement::bare(Expression::call(
                "Positive",
                vec![Expression::integer("5")],
            ))],
        )],
        ..RawContext::default()
    };
    let result = validate(&context);
    assert!(result.is_success(), "{:?}", result.errors());
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_literal_of_single_member_struct() {
    let context = RawContext {
        structs: vec![UnvalidatedStruct::new(
            "Count",
            vec![UnvalidatedMember::new("value", UnvalidatedType::Natural)],
        )],
        functions: vec![main_returning(
            UnvalidatedType::named("Count"),
            vec![Statement::bare(Expression::literal(
                UnvalidatedType::named("Count"),
                "5",
            ))],
        )],
        ..RawContext::default()
    };
    assert!(validate(&context).is_success());
}

#[test]
fn test_invalid_natural_literal() {
    let context = functions(vec![main_returning(
        UnvalidatedType::Natural,
        vec![Statement::bare(Expression::literal(UnvalidatedType::Natural, "-1"))],
    )]);
    assert_eq!(codes(&validate(&context)), vec![ErrorCode::E3012]);
}

#[test]
fn test_literal_chain_cycle() {
    let context = RawContext {
        structs: vec![UnvalidatedStruct::new(
            "Loop",
            vec![UnvalidatedMember::new("value", UnvalidatedType::named("Loop"))],
        )],
        functions: vec![main_returning(
            UnvalidatedType::named("Loop"),
            vec![Statement::bare(Expression::literal(
                UnvalidatedType::named("Loop"),
                "1",
            ))],
        )],
        ..RawContext::default()
    };
    assert_eq!(codes(&validate(&context)), vec![ErrorCode::E3014]);
}

#[test]
fn test_type_without_literal_form() {
    let context = functions(vec![main_returning(
        UnvalidatedType::list(UnvalidatedType::Integer),
        vec![Statement::bare(Expression::literal(
            UnvalidatedType::list(UnvalidatedType::Integer),
            "[1]",
        ))],
    )]);
    assert_eq!(codes(&validate(&context)), vec![ErrorCode::E3013]);
}

// ============================================================================
// Blocks and references
// ============================================================================

#[test]
fn test_unknown_variable() {
    let context = functions(vec![main_returning(
        UnvalidatedType::Integer,
        vec![Statement::bare(Expression::var("missing"))],
    )]);
    assert_eq!(codes(&validate(&context)), vec![ErrorCode::E3001]);
}

#[test]
fn test_variable_cannot_take_a_function_name() {
    let context = functions(vec![
        identity(),
        main_returning(
            UnvalidatedType::Integer,
            vec![
                Statement::assign("id", Expression::integer("1")),
                Statement::bare(Expression::var("id")),
            ],
        ),
    ]);
    assert_eq!(codes(&validate(&context)), vec![ErrorCode::E3002]);
}

#[test]
fn test_variable_cannot_take_a_type_name() {
    let point = UnvalidatedStruct::new(
        "Point",
        vec![UnvalidatedMember::new("x", UnvalidatedType::Integer)],
    );
    for name in ["Integer", "Natural", "Boolean", "Point", "Answer", "ListBuilder"] {
        let context = RawContext {
            structs: vec![point.clone()],
            unions: vec![answer_union()],
            functions: vec![main_returning(
                UnvalidatedType::Integer,
                vec![
                    Statement::assign(name, Expression::integer("1")),
                    Statement::bare(Expression::integer("2")),
                ],
            )],
            ..RawContext::default()
        };
        assert_eq!(codes(&validate(&context)), vec![ErrorCode::E3002], "{name}");
    }
}

#[test]
fn test_blocks_must_end_with_an_expression() {
    let empty = main_returning(UnvalidatedType::Integer, Vec::new());
    assert_eq!(codes(&validate(&functions(vec![empty]))), vec![ErrorCode::E3006]);

    let trailing = main_returning(
        UnvalidatedType::Integer,
        vec![Statement::assign("x", Expression::integer("1"))],
    );
    assert_eq!(codes(&validate(&functions(vec![trailing]))), vec![ErrorCode::E3006]);
}

#[test]
fn test_if_arms_must_agree() {
    let context = functions(vec![main_returning(
        UnvalidatedType::Integer,
        vec![Statement::bare(Expression::if_then(
            Expression::boolean(true),
            Block::of(Expression::integer("1")),
            Block::of(Expression::literal(UnvalidatedType::Natural, "1")),
        ))],
    )]);
    assert_eq!(codes(&validate(&context)), vec![ErrorCode::E3011]);
}

#[test]
fn test_fresh_reference_may_be_stored() {
    let context = functions(vec![main_returning(
        UnvalidatedType::list(UnvalidatedType::Integer),
        vec![
            Statement::assign("builder", builder_of_integers()),
            Statement::bare(Expression::call(
                "ListBuilder.append",
                vec![Expression::var("builder"), Expression::integer("1")],
            )),
            Statement::bare(Expression::call(
                "ListBuilder.build",
                vec![Expression::var("builder")],
            )),
        ],
    )]);
    let result = validate(&context);
    assert!(result.is_success(), "{:?}", result.errors());
}

#[test]
fn test_aliased_reference_cannot_be_stored() {
    let context = functions(vec![main_returning(
        UnvalidatedType::list(UnvalidatedType::Integer),
        vec![
            Statement::assign("builder", builder_of_integers()),
            Statement::assign("alias", Expression::var("builder")),
            Statement::bare(Expression::call(
                "ListBuilder.build",
                vec![Expression::var("alias")],
            )),
        ],
    )]);
    assert_eq!(codes(&validate(&context)), vec![ErrorCode::E3004]);
}

#[test]
fn test_one_referential_action_per_statement() {
    let context = functions(vec![main_returning(
        UnvalidatedType::list(UnvalidatedType::Integer),
        vec![
            Statement::assign("builder", builder_of_integers()),
            Statement::bare(Expression::call(
                "ListBuilder.build",
                vec![Expression::call(
                    "ListBuilder.append",
                    vec![Expression::var("builder"), Expression::integer("1")],
                )],
            )),
        ],
    )]);
    assert_eq!(codes(&validate(&context)), vec![ErrorCode::E3005]);
}

fn append_to_builder(value: &str) -> Expression {
    Expression::call(
        "ListBuilder.append",
        vec![Expression::var("builder"), Expression::integer(value)],
    )
}

fn built_size() -> Expression {
    Expression::call(
        "List.size",
        vec![Expression::call(
            "ListBuilder.build",
            vec![Expression::var("builder")],
        )],
    )
}

#[test]
fn test_if_then_counts_only_its_condition() {
    let branches = functions(vec![main_returning(
        UnvalidatedType::list(UnvalidatedType::Integer),
        vec![
            Statement::assign("builder", builder_of_integers()),
            Statement::bare(Expression::if_then(
                Expression::boolean(true),
                Block::of(append_to_builder("1")),
                Block::of(append_to_builder("2")),
            )),
            Statement::bare(Expression::call(
                "ListBuilder.build",
                vec![Expression::var("builder")],
            )),
        ],
    )]);
    let result = validate(&branches);
    assert!(result.is_success(), "{:?}", result.errors());

    let condition = functions(vec![main_returning(
        UnvalidatedType::Integer,
        vec![
            Statement::assign("builder", builder_of_integers()),
            Statement::bare(Expression::if_then(
                Expression::call("Natural.equals", vec![built_size(), built_size()]),
                Block::of(Expression::integer("1")),
                Block::of(Expression::integer("2")),
            )),
        ],
    )]);
    assert_eq!(codes(&validate(&condition)), vec![ErrorCode::E3005]);
}

#[test]
fn test_closure_capturing_a_reference_is_a_reference() {
    let closure = || {
        Expression::inline_function(
            Vec::new(),
            UnvalidatedType::Natural,
            Block::of(built_size()),
        )
    };
    let stored = functions(vec![main_returning(
        UnvalidatedType::Natural,
        vec![
            Statement::assign("builder", builder_of_integers()),
            Statement::assign("size", closure()),
            Statement::bare(Expression::call_expression(
                Expression::var("size"),
                Vec::new(),
            )),
        ],
    )]);
    let result = validate(&stored);
    let module = result.module().unwrap();
    match &body_of(module, "main").statements[1] {
        ValidatedStatement::Assignment { ty, .. } => assert!(ty.is_reference(), "{ty}"),
        other => panic!("expected an assignment, got {other:?}"),
    }

    let aliased = functions(vec![main_returning(
        UnvalidatedType::Natural,
        vec![
            Statement::assign("builder", builder_of_integers()),
            Statement::assign("size", closure()),
            Statement::assign("alias", Expression::var("size")),
            Statement::bare(Expression::call_expression(
                Expression::var("alias"),
                Vec::new(),
            )),
        ],
    )]);
    assert_eq!(codes(&validate(&aliased)), vec![ErrorCode::E3004]);
}

#[test]
fn test_binding_a_reference_value_is_a_reference() {
    let builder_type = || UnvalidatedType::reference("ListBuilder", vec![UnvalidatedType::Integer]);
    let append_one = Expression::inline_function(
        vec![arg("target", builder_type())],
        builder_type(),
        Block::of(Expression::call(
            "ListBuilder.append",
            vec![Expression::var("target"), Expression::integer("1")],
        )),
    );
    let context = functions(vec![main_returning(
        UnvalidatedType::Integer,
        vec![
            Statement::assign("builder", builder_of_integers()),
            Statement::assign("appendOne", append_one),
            Statement::assign(
                "bound",
                Expression::bind_expression(
                    Expression::var("appendOne"),
                    vec![Some(Expression::var("builder"))],
                ),
            ),
            Statement::bare(Expression::integer("1")),
        ],
    )]);
    assert_eq!(codes(&validate(&context)), vec![ErrorCode::E3004]);
}

#[test]
fn test_captures_follow_declaration_order() {
    let body = Expression::call(
        "Integer.plus",
        vec![
            Expression::var("b"),
            Expression::call("Integer.plus", vec![Expression::var("a"), Expression::var("x")]),
        ],
    );
    let context = functions(vec![main_returning(
        UnvalidatedType::Integer,
        vec![
            Statement::assign("a", Expression::integer("1")),
            Statement::assign("b", Expression::integer("2")),
            Statement::assign("unused", Expression::integer("3")),
            Statement::assign(
                "f",
                Expression::inline_function(
                    vec![arg("x", UnvalidatedType::Integer)],
                    UnvalidatedType::Integer,
                    Block::of(body),
                ),
            ),
            Statement::bare(Expression::call_expression(
                Expression::var("f"),
                vec![Expression::integer("4")],
            )),
        ],
    )]);
    let result = validate(&context);
    let module = result.module().unwrap();

    let ValidatedStatement::Assignment { expression, .. } = &body_of(module, "main").statements[3]
    else {
        panic!("expected an assignment");
    };
    let TypedExprKind::InlineFunction(inline) = &expression.kind else {
        panic!("expected an inline function");
    };
    let captured: Vec<&str> = inline.bound_vars.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(captured, vec!["a", "b"]);
}

// ============================================================================
// Unions and interfaces
// ============================================================================

fn answer_union() -> UnvalidatedUnion {
    UnvalidatedUnion::new(
        "Answer",
        vec![
            UnvalidatedOption::new("Yes", None),
            UnvalidatedOption::new("Maybe", Some(UnvalidatedType::Natural)),
        ],
    )
}

#[test]
fn test_union_when_chooses_output_type() {
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
    let context = RawContext {
        unions: vec![answer_union()],
        functions: vec![main_returning(
            UnvalidatedType::Natural,
            vec![Statement::bare(Expression::call(
                "Answer.when",
                vec![
                    Expression::call(
                        "Answer.Maybe",
                        vec![Expression::literal(UnvalidatedType::Natural, "50")],
                    ),
                    on_yes,
                    on_maybe,
                ],
            ))],
        )],
        ..RawContext::default()
    };
    let result = validate(&context);
    assert!(result.is_success(), "{:?}", result.errors());
}

#[test]
fn test_unions_cannot_be_followed() {
    let context = RawContext {
        unions: vec![answer_union()],
        functions: vec![main_returning(
            UnvalidatedType::Natural,
            vec![Statement::bare(Expression::follow(
                Expression::call("Answer.Yes", Vec::new()),
                "Maybe",
            ))],
        )],
        ..RawContext::default()
    };
    assert_eq!(codes(&validate(&context)), vec![ErrorCode::E3009]);
}

#[test]
fn test_union_option_named_when() {
    let context = RawContext {
        unions: vec![UnvalidatedUnion::new(
            "Clock",
            vec![UnvalidatedOption::new("when", None)],
        )],
        ..RawContext::default()
    };
    assert!(codes(&validate(&context)).contains(&ErrorCode::E2008));
}

fn shape_context(method: &str) -> RawContext {
    let area = Expression::inline_function(
        vec![arg("size", UnvalidatedType::Integer)],
        UnvalidatedType::Integer,
        Block::of(Expression::call(
            "Integer.times",
            vec![Expression::var("size"), Expression::var("size")],
        )),
    );
    RawContext {
        interfaces: vec![UnvalidatedInterface::new(
            "Shape",
            vec![UnvalidatedMethod::new(
                "area",
                Vec::new(),
                UnvalidatedType::Integer,
            )],
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
                    Expression::follow(Expression::var("shape"), method),
                    Vec::new(),
                )),
            ],
        )],
        ..RawContext::default()
    }
}

#[test]
fn test_interface_instance_methods() {
    let result = validate(&shape_context("area"));
    let module = result.module().unwrap();
    assert!(module
        .interfaces_by_adapter_id
        .contains_key(&EntityId::of("Shape.Adapter")));
}

#[test]
fn test_unknown_interface_method() {
    assert_eq!(
        codes(&validate(&shape_context("perimeter"))),
        vec![ErrorCode::E3010]
    );
}

// ============================================================================
// Annotations
// ============================================================================

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
fn test_unknown_annotation_is_a_warning() {
    let deprecated = Annotation {
        name: EntityId::of("Deprecated"),
        values: Vec::new(),
    };
    let result = validate(&functions(vec![double().with_annotation(deprecated)]));
    assert!(result.is_success());
    let warnings: Vec<ErrorCode> = result.warnings().iter().map(|d| d.code).collect();
    assert_eq!(warnings, vec![ErrorCode::W1001]);
}

#[test]
fn test_test_annotations() {
    let valid = double().with_annotation(Annotation::test(&["2"], "4"));
    let result = validate(&functions(vec![valid]));
    let module = result.module().unwrap();
    assert_eq!(module.test_functions().len(), 1);

    let wrong_count = double().with_annotation(Annotation::test(&["2", "3"], "4"));
    assert_eq!(
        codes(&validate(&functions(vec![wrong_count]))),
        vec![ErrorCode::E2009]
    );

    let on_struct = RawContext {
        structs: vec![UnvalidatedStruct::new(
            "Point",
            vec![UnvalidatedMember::new("x", UnvalidatedType::Integer)],
        )
        .with_annotation(Annotation::test(&[], "1"))],
        ..RawContext::default()
    };
    assert_eq!(codes(&validate(&on_struct)), vec![ErrorCode::E2009]);
}

#[test]
fn test_export_annotation_marks_entity() {
    let result = validate(&functions(vec![double().with_annotation(Annotation::export())]));
    let module = result.module().unwrap();
    assert!(module.is_exported(&EntityId::of("double")));
}
