//! Function types and the grounding/rebinding operations on them.

use std::fmt;

use super::{write_list, Type, TypeParameter};

/// The type of a function value.
///
/// A `Parameterized` function type carries its own type parameters, which
/// its argument and output types refer to through
/// [`Type::InternalParameter`]. [`FunctionType::create`] never produces a
/// `Parameterized` value with an empty parameter list.
#[derive(Clone, Debug)]
pub enum FunctionType {
    Ground {
        is_reference: bool,
        arg_types: Vec<Type>,
        output_type: Box<Type>,
    },
    Parameterized {
        is_reference: bool,
        type_parameters: Vec<TypeParameter>,
        arg_types: Vec<Type>,
        output_type: Box<Type>,
    },
}

impl FunctionType {
    pub fn create(
        is_reference: bool,
        type_parameters: Vec<TypeParameter>,
        arg_types: Vec<Type>,
        output_type: Type,
    ) -> FunctionType {
        if type_parameters.is_empty() {
            FunctionType::Ground {
                is_reference,
                arg_types,
                output_type: Box::new(output_type),
            }
        } else {
            FunctionType::Parameterized {
                is_reference,
                type_parameters,
                arg_types,
                output_type: Box::new(output_type),
            }
        }
    }

    /// The type of a declared signature whose argument and output types
    /// refer to `type_parameters` by name.
    pub fn from_declaration(
        type_parameters: &[TypeParameter],
        arg_types: &[Type],
        output_type: &Type,
    ) -> FunctionType {
        let names: Vec<String> = type_parameters.iter().map(|p| p.name.clone()).collect();
        FunctionType::create(
            false,
            type_parameters.to_vec(),
            arg_types
                .iter()
                .map(|t| t.internalize_parameters(&names, 0))
                .collect(),
            output_type.internalize_parameters(&names, 0),
        )
    }

    pub fn is_reference(&self) -> bool {
        match self {
            FunctionType::Ground { is_reference, .. }
            | FunctionType::Parameterized { is_reference, .. } => *is_reference,
        }
    }

    pub fn arg_types(&self) -> &[Type] {
        match self {
            FunctionType::Ground { arg_types, .. }
            | FunctionType::Parameterized { arg_types, .. } => arg_types,
        }
    }

    pub fn output_type(&self) -> &Type {
        match self {
            FunctionType::Ground { output_type, .. }
            | FunctionType::Parameterized { output_type, .. } => output_type,
        }
    }

    pub fn type_parameters(&self) -> &[TypeParameter] {
        match self {
            FunctionType::Ground { .. } => &[],
            FunctionType::Parameterized {
                type_parameters, ..
            } => type_parameters,
        }
    }

    pub fn num_arguments(&self) -> usize {
        self.arg_types().len()
    }

    /// Substitute the chosen types for this type's own parameters.
    pub fn ground_with_type_parameters(&self, chosen: &[Type]) -> FunctionType {
        match self {
            FunctionType::Ground { .. } => self.clone(),
            FunctionType::Parameterized {
                is_reference,
                arg_types,
                output_type,
                ..
            } => {
                let chosen: Vec<Option<Type>> = chosen.iter().cloned().map(Some).collect();
                FunctionType::Ground {
                    is_reference: *is_reference,
                    arg_types: arg_types
                        .iter()
                        .map(|t| t.substitute_internal(&chosen))
                        .collect(),
                    output_type: Box::new(output_type.substitute_internal(&chosen)),
                }
            }
        }
    }

    /// Ground every own parameter with a named parameter of the same name.
    pub fn default_grounding(&self) -> FunctionType {
        let chosen: Vec<Type> = self
            .type_parameters()
            .iter()
            .map(|p| Type::Parameter(p.clone()))
            .collect();
        self.ground_with_type_parameters(&chosen)
    }

    /// Fix some of this type's own parameters, keeping the unbound ones.
    pub fn rebind_type_parameters(&self, bound: &[Option<Type>]) -> FunctionType {
        match self {
            FunctionType::Ground { .. } => self.clone(),
            FunctionType::Parameterized {
                is_reference,
                type_parameters,
                arg_types,
                output_type,
            } => {
                let remaining = type_parameters
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| !matches!(bound.get(*i), Some(Some(_))))
                    .map(|(_, p)| p.clone())
                    .collect();
                FunctionType::create(
                    *is_reference,
                    remaining,
                    arg_types
                        .iter()
                        .map(|t| t.substitute_internal(bound))
                        .collect(),
                    output_type.substitute_internal(bound),
                )
            }
        }
    }

    /// Drop the argument slots filled by a partial binding.
    ///
    /// Binding a reference-typed value makes the resulting function a
    /// reference as well.
    pub fn rebind_arguments(&self, bindings: &[Option<Type>]) -> FunctionType {
        let will_be_reference = self.is_reference()
            || bindings
                .iter()
                .flatten()
                .any(Type::is_reference);
        let remaining_args = self
            .arg_types()
            .iter()
            .enumerate()
            .filter(|(i, _)| !matches!(bindings.get(*i), Some(Some(_))))
            .map(|(_, t)| t.clone())
            .collect();
        FunctionType::create(
            will_be_reference,
            self.type_parameters().to_vec(),
            remaining_args,
            self.output_type().clone(),
        )
    }

    /// Argument types a binding can be checked against directly; `None`
    /// where the type still depends on an unbound own parameter.
    pub fn bindable_argument_types(&self) -> Vec<Option<Type>> {
        match self {
            FunctionType::Ground { arg_types, .. } => arg_types.iter().cloned().map(Some).collect(),
            FunctionType::Parameterized { arg_types, .. } => arg_types
                .iter()
                .map(|t| t.is_bindable().then(|| t.clone()))
                .collect(),
        }
    }

    pub(crate) fn is_bindable_within(&self, allowed_indices: usize) -> bool {
        let allowed = allowed_indices + self.type_parameters().len();
        self.arg_types()
            .iter()
            .all(|t| t.is_bindable_within(allowed))
            && self.output_type().is_bindable_within(allowed)
    }

    pub(crate) fn substitute_internal(&self, chosen: &[Option<Type>]) -> FunctionType {
        match self {
            FunctionType::Ground { .. } => self.map_types(|t| t.substitute_internal(chosen)),
            FunctionType::Parameterized {
                type_parameters, ..
            } => {
                let mut adjusted: Vec<Option<Type>> = vec![None; type_parameters.len()];
                adjusted.extend(chosen.iter().cloned());
                self.map_types(|t| t.substitute_internal(&adjusted))
            }
        }
    }

    pub(crate) fn internalize_parameters(&self, names: &[String], offset: usize) -> FunctionType {
        let offset = offset + self.type_parameters().len();
        self.map_types(|t| t.internalize_parameters(names, offset))
    }

    /// Rebuild with `f` applied to every argument and output type.
    pub(crate) fn map_types(&self, mut f: impl FnMut(&Type) -> Type) -> FunctionType {
        match self {
            FunctionType::Ground {
                is_reference,
                arg_types,
                output_type,
            } => FunctionType::Ground {
                is_reference: *is_reference,
                arg_types: arg_types.iter().map(&mut f).collect(),
                output_type: Box::new(f(&**output_type)),
            },
            FunctionType::Parameterized {
                is_reference,
                type_parameters,
                arg_types,
                output_type,
            } => FunctionType::Parameterized {
                is_reference: *is_reference,
                type_parameters: type_parameters.clone(),
                arg_types: arg_types.iter().map(&mut f).collect(),
                output_type: Box::new(f(&**output_type)),
            },
        }
    }
}

/// Parameter names are not significant; only their typeclasses are.
impl PartialEq for FunctionType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                FunctionType::Ground {
                    is_reference: r1,
                    arg_types: a1,
                    output_type: o1,
                },
                FunctionType::Ground {
                    is_reference: r2,
                    arg_types: a2,
                    output_type: o2,
                },
            ) => r1 == r2 && a1 == a2 && o1 == o2,
            (
                FunctionType::Parameterized {
                    is_reference: r1,
                    type_parameters: p1,
                    arg_types: a1,
                    output_type: o1,
                },
                FunctionType::Parameterized {
                    is_reference: r2,
                    type_parameters: p2,
                    arg_types: a2,
                    output_type: o2,
                },
            ) => {
                r1 == r2
                    && p1.len() == p2.len()
                    && p1
                        .iter()
                        .zip(p2)
                        .all(|(x, y)| x.type_class == y.type_class)
                    && a1 == a2
                    && o1 == o2
            }
            _ => false,
        }
    }
}

impl Eq for FunctionType {}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_reference() {
            f.write_str("&")?;
        }
        let type_parameters = self.type_parameters();
        if !type_parameters.is_empty() {
            f.write_str("<")?;
            write_list(f, type_parameters)?;
            f.write_str(">")?;
        }
        f.write_str("(")?;
        write_list(f, self.arg_types())?;
        write!(f, ") -> {}", self.output_type())
    }
}
