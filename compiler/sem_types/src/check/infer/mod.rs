//! Type-parameter inference.
//!
//! For each of a function type's own parameters, the first argument
//! position whose supplied type reveals it wins; positions are tried in
//! argument order, depth-first through list, `Try`, named-type, and
//! function-type structure. Parameters no argument reveals take the next
//! explicit type argument, left to right.

use sem_ir::{FunctionType, Type};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum InferenceFailure {
    /// More explicit type arguments than the function has parameters.
    TooManyExplicit { expected: usize, provided: usize },
    /// Neither an argument nor an explicit type argument decides it.
    Undecided { parameter: String },
    /// Explicit type arguments left over after every parameter was decided.
    Unconsumed { leftover: usize },
}

/// Choose a type for each of `function_type`'s own parameters.
///
/// `supplied[i]` is the type of the value given for argument `i`, or
/// `None` for an open binding slot. When exactly as many explicit type
/// arguments as parameters are given they are used as-is, and may leave
/// entries open (`None`) for a partial binding.
pub(crate) fn infer_type_parameters(
    function_type: &FunctionType,
    explicit: &[Option<Type>],
    supplied: &[Option<Type>],
) -> Result<Vec<Option<Type>>, InferenceFailure> {
    let type_parameters = function_type.type_parameters();
    if explicit.len() == type_parameters.len() {
        return Ok(explicit.to_vec());
    }
    if explicit.len() > type_parameters.len() {
        return Err(InferenceFailure::TooManyExplicit {
            expected: type_parameters.len(),
            provided: explicit.len(),
        });
    }

    let mut remaining_explicit = explicit.iter();
    let mut chosen = Vec::with_capacity(type_parameters.len());
    for (index, parameter) in type_parameters.iter().enumerate() {
        let inferred = function_type
            .arg_types()
            .iter()
            .zip(supplied)
            .find_map(|(declared, actual)| reveal(declared, actual.as_ref()?, index));
        match inferred {
            Some(ty) => chosen.push(Some(ty)),
            None => match remaining_explicit.next() {
                Some(Some(ty)) => chosen.push(Some(ty.clone())),
                Some(None) | None => {
                    return Err(InferenceFailure::Undecided {
                        parameter: parameter.name.clone(),
                    });
                }
            },
        }
    }

    let leftover = remaining_explicit.count();
    if leftover > 0 {
        return Err(InferenceFailure::Unconsumed { leftover });
    }
    Ok(chosen)
}

/// The part of `actual` standing where `declared` mentions parameter
/// `index`, if any.
///
/// Inside a parameterized function type the index space is that type's
/// own parameters followed by the enclosing ones, so the sought index
/// shifts by its parameter count.
fn reveal(declared: &Type, actual: &Type, index: usize) -> Option<Type> {
    match (declared, actual) {
        (Type::InternalParameter(i), _) if *i == index => Some(actual.clone()),
        (Type::List(declared), Type::List(actual)) | (Type::Try(declared), Type::Try(actual)) => {
            reveal(declared, actual, index)
        }
        (Type::Named(declared), Type::Named(actual)) if declared.reference == actual.reference => {
            declared
                .parameters
                .iter()
                .zip(&actual.parameters)
                .find_map(|(d, a)| reveal(d, a, index))
        }
        (Type::Function(declared), Type::Function(actual)) => {
            let index = index + declared.type_parameters().len();
            let actual = actual.default_grounding();
            declared
                .arg_types()
                .iter()
                .zip(actual.arg_types())
                .find_map(|(d, a)| reveal(d, a, index))
                .or_else(|| reveal(declared.output_type(), actual.output_type(), index))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests;
