//! The type algebra.
//!
//! [`Type`] is the closed set of validated type shapes. Two kinds of type
//! variable exist:
//!
//! - [`Type::Parameter`]: a named parameter of an enclosing declaration
//!   (struct, interface, union, or function being declared).
//! - [`Type::InternalParameter`]: a de Bruijn style index into the
//!   parameter list of the nearest parameterized [`FunctionType`]. When
//!   parameterized function types nest, the index space of the inner type
//!   is its own parameters followed by the enclosing ones.
//!
//! The operations here are pure and total. Callers check arity and kinds
//! before calling.

mod function;
mod unvalidated;

use std::fmt;

use rustc_hash::FxHashMap;

use crate::ids::{EntityRef, ResolvedEntityRef};

pub use function::FunctionType;
pub use unvalidated::UnvalidatedType;

/// Constraint on a type parameter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeClass {
    /// The chosen type must be a composable value type: no functions,
    /// interfaces, or reference types anywhere inside it.
    Data,
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeClass::Data => f.write_str("Data"),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeParameter {
    pub name: String,
    pub type_class: Option<TypeClass>,
}

impl TypeParameter {
    pub fn new(name: impl Into<String>, type_class: Option<TypeClass>) -> Self {
        TypeParameter {
            name: name.into(),
            type_class,
        }
    }

    /// An unconstrained parameter.
    pub fn unconstrained(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }
}

/// Map a declaration's parameter names to the arguments of one use.
pub fn parameter_map(
    type_parameters: &[TypeParameter],
    arguments: &[Type],
) -> FxHashMap<String, Type> {
    type_parameters
        .iter()
        .zip(arguments)
        .map(|(parameter, argument)| (parameter.name.clone(), argument.clone()))
        .collect()
}

impl fmt::Display for TypeParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.type_class {
            Some(class) => write!(f, "{}: {class}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A resolved named type: struct, interface, union, or opaque native type.
#[derive(Clone, Debug)]
pub struct NamedType {
    pub reference: ResolvedEntityRef,
    /// The reference as written in source; kept for display only.
    pub original_ref: EntityRef,
    pub is_reference: bool,
    pub parameters: Vec<Type>,
}

impl PartialEq for NamedType {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
            && self.is_reference == other.is_reference
            && self.parameters == other.parameters
    }
}

impl Eq for NamedType {}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Type {
    Integer,
    Natural,
    Boolean,
    List(Box<Type>),
    Try(Box<Type>),
    Function(FunctionType),
    Named(NamedType),
    Parameter(TypeParameter),
    InternalParameter(usize),
}

impl Type {
    pub fn list_of(element: Type) -> Type {
        Type::List(Box::new(element))
    }

    pub fn try_of(inner: Type) -> Type {
        Type::Try(Box::new(inner))
    }

    /// Whether values of this type may be mutably aliased.
    ///
    /// Parameters are never references: reference types cannot be chosen
    /// as type arguments.
    pub fn is_reference(&self) -> bool {
        match self {
            Type::Function(function) => function.is_reference(),
            Type::Named(named) => named.is_reference,
            Type::Integer
            | Type::Natural
            | Type::Boolean
            | Type::List(_)
            | Type::Try(_)
            | Type::Parameter(_)
            | Type::InternalParameter(_) => false,
        }
    }

    /// Replace named parameters of an enclosing declaration.
    #[must_use]
    pub fn substitute_parameters(&self, replacements: &FxHashMap<String, Type>) -> Type {
        self.map_leaves(&mut |leaf| match leaf {
            Type::Parameter(parameter) => replacements.get(&parameter.name).cloned(),
            _ => None,
        })
    }

    /// Replace internal parameters by index.
    ///
    /// `chosen[i]` replaces `InternalParameter(i)`. Indices left open (`None`)
    /// are renumbered to their position among the open indices, so the
    /// result fits a function type that keeps only the open parameters.
    #[must_use]
    pub fn substitute_internal(&self, chosen: &[Option<Type>]) -> Type {
        match self {
            Type::InternalParameter(index) => match chosen.get(*index) {
                Some(Some(replacement)) => replacement.clone(),
                Some(None) => {
                    let open_before = chosen[..*index].iter().filter(|c| c.is_none()).count();
                    Type::InternalParameter(open_before)
                }
                None => {
                    let bound = chosen.iter().filter(|c| c.is_some()).count();
                    Type::InternalParameter(index - bound)
                }
            },
            Type::Integer | Type::Natural | Type::Boolean | Type::Parameter(_) => self.clone(),
            Type::List(element) => Type::list_of(element.substitute_internal(chosen)),
            Type::Try(inner) => Type::try_of(inner.substitute_internal(chosen)),
            Type::Named(named) => Type::Named(NamedType {
                parameters: named
                    .parameters
                    .iter()
                    .map(|p| p.substitute_internal(chosen))
                    .collect(),
                ..named.clone()
            }),
            Type::Function(function) => Type::Function(function.substitute_internal(chosen)),
        }
    }

    /// Turn named parameters listed in `names` into internal indices.
    ///
    /// Used when a declaration's signature becomes a parameterized function
    /// type: `names[i]` becomes `InternalParameter(offset + i)`.
    #[must_use]
    pub fn internalize_parameters(&self, names: &[String], offset: usize) -> Type {
        match self {
            Type::Parameter(parameter) => match names.iter().position(|n| *n == parameter.name) {
                Some(index) => Type::InternalParameter(offset + index),
                None => self.clone(),
            },
            Type::Integer | Type::Natural | Type::Boolean | Type::InternalParameter(_) => {
                self.clone()
            }
            Type::List(element) => Type::list_of(element.internalize_parameters(names, offset)),
            Type::Try(inner) => Type::try_of(inner.internalize_parameters(names, offset)),
            Type::Named(named) => Type::Named(NamedType {
                parameters: named
                    .parameters
                    .iter()
                    .map(|p| p.internalize_parameters(names, offset))
                    .collect(),
                ..named.clone()
            }),
            Type::Function(function) => {
                Type::Function(function.internalize_parameters(names, offset))
            }
        }
    }

    /// Whether a value of this type can be bound without first choosing the
    /// enclosing function type's own parameters.
    pub fn is_bindable(&self) -> bool {
        self.is_bindable_within(0)
    }

    pub(crate) fn is_bindable_within(&self, allowed_indices: usize) -> bool {
        match self {
            Type::InternalParameter(index) => *index < allowed_indices,
            Type::Integer | Type::Natural | Type::Boolean | Type::Parameter(_) => true,
            Type::List(inner) | Type::Try(inner) => inner.is_bindable_within(allowed_indices),
            Type::Named(named) => named
                .parameters
                .iter()
                .all(|p| p.is_bindable_within(allowed_indices)),
            Type::Function(function) => function.is_bindable_within(allowed_indices),
        }
    }

    fn map_leaves(&self, f: &mut impl FnMut(&Type) -> Option<Type>) -> Type {
        if let Some(replacement) = f(self) {
            return replacement;
        }
        match self {
            Type::Integer
            | Type::Natural
            | Type::Boolean
            | Type::Parameter(_)
            | Type::InternalParameter(_) => self.clone(),
            Type::List(element) => Type::list_of(element.map_leaves(f)),
            Type::Try(inner) => Type::try_of(inner.map_leaves(f)),
            Type::Named(named) => Type::Named(NamedType {
                parameters: named.parameters.iter().map(|p| p.map_leaves(f)).collect(),
                ..named.clone()
            }),
            Type::Function(function) => Type::Function(function.map_types(|t| t.map_leaves(f))),
        }
    }
}

pub(crate) fn write_list<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Integer => f.write_str("Integer"),
            Type::Natural => f.write_str("Natural"),
            Type::Boolean => f.write_str("Boolean"),
            Type::List(element) => write!(f, "List<{element}>"),
            Type::Try(inner) => write!(f, "Try<{inner}>"),
            Type::Function(function) => write!(f, "{function}"),
            Type::Named(named) => {
                if named.is_reference {
                    f.write_str("&")?;
                }
                write!(f, "{}", named.original_ref)?;
                if !named.parameters.is_empty() {
                    f.write_str("<")?;
                    write_list(f, &named.parameters)?;
                    f.write_str(">")?;
                }
                Ok(())
            }
            Type::Parameter(parameter) => f.write_str(&parameter.name),
            Type::InternalParameter(index) => write!(f, "_{index}"),
        }
    }
}
