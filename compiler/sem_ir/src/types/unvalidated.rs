//! Types as written in source, before resolution.

use std::fmt;

use super::{write_list, TypeParameter};
use crate::ids::EntityRef;
use crate::span::Location;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum UnvalidatedType {
    Integer,
    Natural,
    Boolean,
    List(Box<UnvalidatedType>),
    Try(Box<UnvalidatedType>),
    Function {
        is_reference: bool,
        type_parameters: Vec<TypeParameter>,
        arg_types: Vec<UnvalidatedType>,
        output_type: Box<UnvalidatedType>,
        location: Option<Location>,
    },
    /// A named type, or a bare type parameter name.
    Named {
        reference: EntityRef,
        /// Whether the source marked the type with `&`.
        is_reference: bool,
        parameters: Vec<UnvalidatedType>,
        location: Option<Location>,
    },
}

impl UnvalidatedType {
    pub fn named(dotted: &str) -> Self {
        Self::named_with(dotted, Vec::new())
    }

    pub fn named_with(dotted: &str, parameters: Vec<UnvalidatedType>) -> Self {
        UnvalidatedType::Named {
            reference: EntityRef::of(dotted),
            is_reference: false,
            parameters,
            location: None,
        }
    }

    /// A named type marked with `&`.
    pub fn reference(dotted: &str, parameters: Vec<UnvalidatedType>) -> Self {
        UnvalidatedType::Named {
            reference: EntityRef::of(dotted),
            is_reference: true,
            parameters,
            location: None,
        }
    }

    pub fn list(element: UnvalidatedType) -> Self {
        UnvalidatedType::List(Box::new(element))
    }

    pub fn try_of(inner: UnvalidatedType) -> Self {
        UnvalidatedType::Try(Box::new(inner))
    }

    pub fn function(arg_types: Vec<UnvalidatedType>, output_type: UnvalidatedType) -> Self {
        UnvalidatedType::Function {
            is_reference: false,
            type_parameters: Vec::new(),
            arg_types,
            output_type: Box::new(output_type),
            location: None,
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            UnvalidatedType::Function { location, .. } | UnvalidatedType::Named { location, .. } => {
                location.as_ref()
            }
            _ => None,
        }
    }
}

impl fmt::Display for UnvalidatedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnvalidatedType::Integer => f.write_str("Integer"),
            UnvalidatedType::Natural => f.write_str("Natural"),
            UnvalidatedType::Boolean => f.write_str("Boolean"),
            UnvalidatedType::List(element) => write!(f, "List<{element}>"),
            UnvalidatedType::Try(inner) => write!(f, "Try<{inner}>"),
            UnvalidatedType::Function {
                is_reference,
                type_parameters,
                arg_types,
                output_type,
                ..
            } => {
                if *is_reference {
                    f.write_str("&")?;
                }
                if !type_parameters.is_empty() {
                    f.write_str("<")?;
                    write_list(f, type_parameters)?;
                    f.write_str(">")?;
                }
                f.write_str("(")?;
                write_list(f, arg_types)?;
                write!(f, ") -> {output_type}")
            }
            UnvalidatedType::Named {
                reference,
                is_reference,
                parameters,
                ..
            } => {
                if *is_reference {
                    f.write_str("&")?;
                }
                write!(f, "{reference}")?;
                if !parameters.is_empty() {
                    f.write_str("<")?;
                    write_list(f, parameters)?;
                    f.write_str(">")?;
                }
                Ok(())
            }
        }
    }
}
