use super::*;
use pretty_assertions::assert_eq;
use sem_ir::TypeParameter;

fn identity() -> FunctionType {
    FunctionType::create(
        false,
        vec![TypeParameter::unconstrained("T")],
        vec![Type::InternalParameter(0)],
        Type::InternalParameter(0),
    )
}

/// `<T, U>(List<T>, (T) -> U) -> List<U>`
fn list_map() -> FunctionType {
    FunctionType::create(
        false,
        vec![
            TypeParameter::unconstrained("T"),
            TypeParameter::unconstrained("U"),
        ],
        vec![
            Type::list_of(Type::InternalParameter(0)),
            Type::Function(FunctionType::create(
                false,
                Vec::new(),
                vec![Type::InternalParameter(0)],
                Type::InternalParameter(1),
            )),
        ],
        Type::list_of(Type::InternalParameter(1)),
    )
}

#[test]
fn test_infers_from_bare_argument() {
    let chosen = infer_type_parameters(&identity(), &[], &[Some(Type::Integer)]);
    assert_eq!(chosen, Ok(vec![Some(Type::Integer)]));
}

#[test]
fn test_full_explicit_list_is_used_as_given() {
    // The caller compares argument types afterwards and rejects id<Boolean>(5).
    let chosen = infer_type_parameters(&identity(), &[Some(Type::Boolean)], &[Some(Type::Integer)]);
    assert_eq!(chosen, Ok(vec![Some(Type::Boolean)]));
}

#[test]
fn test_infers_through_function_argument() {
    let mapper = Type::Function(FunctionType::create(
        false,
        Vec::new(),
        vec![Type::Natural],
        Type::Boolean,
    ));
    let chosen = infer_type_parameters(
        &list_map(),
        &[],
        &[Some(Type::list_of(Type::Natural)), Some(mapper)],
    );
    assert_eq!(chosen, Ok(vec![Some(Type::Natural), Some(Type::Boolean)]));
}

#[test]
fn test_open_slot_falls_back_to_explicit() {
    let chosen = infer_type_parameters(
        &list_map(),
        &[Some(Type::Integer)],
        &[Some(Type::list_of(Type::Natural)), None],
    );
    assert_eq!(chosen, Ok(vec![Some(Type::Natural), Some(Type::Integer)]));
}

#[test]
fn test_undecided_parameter() {
    let failure = FunctionType::create(
        false,
        vec![TypeParameter::unconstrained("T")],
        Vec::new(),
        Type::try_of(Type::InternalParameter(0)),
    );
    assert_eq!(
        infer_type_parameters(&failure, &[], &[]),
        Err(InferenceFailure::Undecided {
            parameter: "T".to_string()
        })
    );
}

#[test]
fn test_too_many_explicit() {
    assert_eq!(
        infer_type_parameters(&identity(), &[Some(Type::Integer), Some(Type::Boolean)], &[]),
        Err(InferenceFailure::TooManyExplicit {
            expected: 1,
            provided: 2
        })
    );
}

#[test]
fn test_unconsumed_explicit() {
    // Both parameters are revealed by arguments, so the one explicit type is left over.
    let mapper = Type::Function(FunctionType::create(
        false,
        Vec::new(),
        vec![Type::Natural],
        Type::Boolean,
    ));
    assert_eq!(
        infer_type_parameters(
            &list_map(),
            &[Some(Type::Integer)],
            &[Some(Type::list_of(Type::Natural)), Some(mapper)],
        ),
        Err(InferenceFailure::Unconsumed { leftover: 1 })
    );
}

#[test]
fn test_nested_parameterized_function_shifts_indices() {
    // <T>(<U>(U, T) -> T) -> T: inside the argument, T is index 1.
    let declared = FunctionType::create(
        false,
        vec![TypeParameter::unconstrained("T")],
        vec![Type::Function(FunctionType::create(
            false,
            vec![TypeParameter::unconstrained("U")],
            vec![Type::InternalParameter(0), Type::InternalParameter(1)],
            Type::InternalParameter(1),
        ))],
        Type::InternalParameter(0),
    );
    let actual = Type::Function(FunctionType::create(
        false,
        Vec::new(),
        vec![Type::Boolean, Type::Integer],
        Type::Integer,
    ));
    assert_eq!(
        infer_type_parameters(&declared, &[], &[Some(actual)]),
        Ok(vec![Some(Type::Integer)])
    );
}
