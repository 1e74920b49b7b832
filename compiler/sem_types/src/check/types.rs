//! Type expressions: validation and the `Data` typeclass check.

use rustc_hash::FxHashSet;
use sem_diagnostic::ErrorCode;
use sem_ir::types::parameter_map;
use sem_ir::{
    FunctionType, Location, NamedType, ResolvedEntityRef, Type, TypeClass,
    UnvalidatedType,
};
use sem_stack::ensure_sufficient_stack;

use super::{Checked, ModuleChecker};

impl ModuleChecker<'_> {
    /// Validate a type written where `self.type_parameters` are in scope.
    pub(crate) fn validate_type(&mut self, ty: &UnvalidatedType) -> Checked<Type> {
        self.validate_type_within(ty, &[])
    }

    /// `internal` lists the parameters of enclosing function types,
    /// innermost first; a name found there becomes its index.
    fn validate_type_within(&mut self, ty: &UnvalidatedType, internal: &[String]) -> Checked<Type> {
        ensure_sufficient_stack(|| match ty {
            UnvalidatedType::Integer => Ok(Type::Integer),
            UnvalidatedType::Natural => Ok(Type::Natural),
            UnvalidatedType::Boolean => Ok(Type::Boolean),
            UnvalidatedType::List(element) => {
                let element = self.validate_type_within(element, internal)?;
                self.require_value_type(&element, None, "a list element")?;
                Ok(Type::list_of(element))
            }
            UnvalidatedType::Try(inner) => {
                let inner = self.validate_type_within(inner, internal)?;
                self.require_value_type(&inner, None, "a Try value")?;
                Ok(Type::try_of(inner))
            }
            UnvalidatedType::Function {
                is_reference,
                type_parameters,
                arg_types,
                output_type,
                location,
            } => {
                let mut names: Vec<String> =
                    type_parameters.iter().map(|p| p.name.clone()).collect();
                if let Some(duplicate) = first_repeated(&names) {
                    return Err(self.error(
                        ErrorCode::E2002,
                        location.as_ref(),
                        format!("duplicate type parameter '{duplicate}' in function type"),
                    ));
                }
                names.extend(internal.iter().cloned());

                let arg_types = arg_types
                    .iter()
                    .map(|arg| self.validate_type_within(arg, &names))
                    .collect::<Checked<Vec<_>>>()?;
                let output_type = self.validate_type_within(output_type, &names)?;
                Ok(Type::Function(FunctionType::create(
                    *is_reference,
                    type_parameters.clone(),
                    arg_types,
                    output_type,
                )))
            }
            UnvalidatedType::Named {
                reference,
                is_reference,
                parameters,
                location,
            } => {
                let location = location.as_ref();
                if parameters.is_empty() && reference.module_ref.is_none() {
                    if let Some(name) = reference.id.single_segment() {
                        if let Some(index) = internal.iter().position(|n| n == name) {
                            return Ok(Type::InternalParameter(index));
                        }
                        if let Some(parameter) =
                            self.type_parameters.iter().find(|p| p.name == name).cloned()
                        {
                            return Ok(Type::Parameter(parameter));
                        }
                    }
                }

                let resolution = self.resolve_type(reference, location)?;
                let Some(header) = self.type_header(&resolution) else {
                    return Err(self.already_reported(|| {
                        format!("type '{reference}' has no valid declaration")
                    }));
                };

                if *is_reference && !header.is_reference {
                    return Err(self.error(
                        ErrorCode::E2004,
                        location,
                        format!("'{reference}' is not a reference type; remove the '&'"),
                    ));
                }
                if !*is_reference && header.is_reference {
                    return Err(self.error(
                        ErrorCode::E2004,
                        location,
                        format!("'{reference}' is a reference type and must be written '&{reference}'"),
                    ));
                }
                if parameters.len() != header.type_parameters.len() {
                    return Err(self.error(
                        ErrorCode::E2005,
                        location,
                        format!(
                            "'{reference}' takes {} type argument(s) but {} were given",
                            header.type_parameters.len(),
                            parameters.len()
                        ),
                    ));
                }

                let mut validated = Vec::with_capacity(parameters.len());
                for parameter in parameters {
                    let parameter = self.validate_type_within(parameter, internal)?;
                    self.require_value_type(&parameter, location, "a type argument")?;
                    validated.push(parameter);
                }
                Ok(Type::Named(NamedType {
                    reference: resolution.entity_ref,
                    original_ref: reference.clone(),
                    is_reference: header.is_reference,
                    parameters: validated,
                }))
            }
        })
    }

    /// Reject a reference type where only value types may appear.
    pub(crate) fn require_value_type(
        &mut self,
        ty: &Type,
        location: Option<&Location>,
        role: &str,
    ) -> Checked<()> {
        if ty.is_reference() {
            return Err(self.error(
                ErrorCode::E2003,
                location,
                format!("reference type {ty} cannot be used as {role}"),
            ));
        }
        Ok(())
    }

    // ========================================================================
    // Data typeclass
    // ========================================================================

    /// Whether values of `ty` are plain data: no functions, interfaces, or
    /// references anywhere inside.
    pub(crate) fn is_data_type(&self, ty: &Type) -> bool {
        self.is_data_type_guarded(ty, &mut FxHashSet::default())
    }

    fn is_data_type_guarded(&self, ty: &Type, visiting: &mut FxHashSet<ResolvedEntityRef>) -> bool {
        match ty {
            Type::Integer | Type::Natural | Type::Boolean => true,
            Type::List(inner) | Type::Try(inner) => self.is_data_type_guarded(inner, visiting),
            Type::Function(_) | Type::InternalParameter(_) => false,
            Type::Parameter(parameter) => parameter.type_class == Some(TypeClass::Data),
            Type::Named(named) => {
                if named.is_reference {
                    return false;
                }
                let Some(definitions) = self.definitions(&named.reference.module) else {
                    return false;
                };
                let id = &named.reference.id;
                if let Some(opaque) = definitions.opaque_def(id) {
                    return !opaque.is_reference
                        && named
                            .parameters
                            .iter()
                            .all(|p| self.is_data_type_guarded(p, visiting));
                }
                // A type met again while checking itself adds no new members.
                if !visiting.insert(named.reference.clone()) {
                    return true;
                }
                let result = if let Some(declaration) = definitions.struct_def(id) {
                    let replacements =
                        parameter_map(&declaration.type_parameters, &named.parameters);
                    declaration.members.iter().all(|member| {
                        self.is_data_type_guarded(
                            &member.ty.substitute_parameters(&replacements),
                            visiting,
                        )
                    })
                } else if let Some(union) = definitions.union_def(id) {
                    let replacements = parameter_map(&union.type_parameters, &named.parameters);
                    union.options.iter().all(|option| {
                        option.ty.as_ref().map_or(true, |ty| {
                            self.is_data_type_guarded(
                                &ty.substitute_parameters(&replacements),
                                visiting,
                            )
                        })
                    })
                } else {
                    false
                };
                visiting.remove(&named.reference);
                result
            }
        }
    }
}

pub(crate) fn first_repeated(names: &[String]) -> Option<&str> {
    names
        .iter()
        .enumerate()
        .find(|(i, name)| names[..*i].contains(name))
        .map(|(_, name)| name.as_str())
}
