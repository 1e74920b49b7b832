//! Calls and partial bindings, named or through a function-typed
//! expression.

use sem_diagnostic::ErrorCode;
use sem_ir::ast::Expression;
use sem_ir::typed::{AliasType, TypedExprKind, TypedExpression};
use sem_ir::{EntityRef, FunctionType, Location, Type, TypeClass, UnvalidatedType};

use super::expr::VariableScope;
use super::infer::{infer_type_parameters, InferenceFailure};
use super::{Checked, ModuleChecker};

impl ModuleChecker<'_> {
    // ========================================================================
    // Calls
    // ========================================================================

    pub(super) fn validate_named_call(
        &mut self,
        function_ref: &EntityRef,
        arguments: &[Expression],
        chosen_parameters: &[UnvalidatedType],
        scope: &VariableScope,
        location: Option<&Location>,
    ) -> Checked<TypedExpression> {
        let resolution = self.resolve_function(function_ref, location)?;
        let function_type = self.named_function_type(function_ref, &resolution)?;
        let explicit = self.validate_chosen_parameters(chosen_parameters)?;
        let arguments = self.validate_all(arguments, scope)?;

        let callee = function_ref.to_string();
        let (chosen, ground) =
            self.ground_call(&function_type, &explicit, &arguments, &callee, location)?;
        Ok(TypedExpression::new(
            ground.output_type().clone(),
            AliasType::NotAliased,
            TypedExprKind::NamedFunctionCall {
                function_ref: function_ref.clone(),
                resolved_ref: resolution.entity_ref,
                arguments,
                chosen_parameters: chosen,
            },
        ))
    }

    pub(super) fn validate_expression_call(
        &mut self,
        function: &Expression,
        arguments: &[Expression],
        chosen_parameters: &[UnvalidatedType],
        scope: &VariableScope,
        location: Option<&Location>,
    ) -> Checked<TypedExpression> {
        let function = self.validate_expression(function, scope)?;
        let function_type = self.expect_function_type(&function, location)?;
        let explicit = self.validate_chosen_parameters(chosen_parameters)?;
        let arguments = self.validate_all(arguments, scope)?;

        let (chosen, ground) =
            self.ground_call(&function_type, &explicit, &arguments, "function expression", location)?;
        Ok(TypedExpression::new(
            ground.output_type().clone(),
            AliasType::NotAliased,
            TypedExprKind::ExpressionFunctionCall {
                function: Box::new(function),
                arguments,
                chosen_parameters: chosen,
            },
        ))
    }

    /// Check arity, choose type parameters, and compare argument types
    /// exactly against the grounded signature.
    fn ground_call(
        &mut self,
        function_type: &FunctionType,
        explicit: &[Option<Type>],
        arguments: &[TypedExpression],
        callee: &str,
        location: Option<&Location>,
    ) -> Checked<(Vec<Type>, FunctionType)> {
        if arguments.len() != function_type.num_arguments() {
            return Err(self.error(
                ErrorCode::E3007,
                location,
                format!(
                    "{callee} expects {} argument(s) but {} were given",
                    function_type.num_arguments(),
                    arguments.len()
                ),
            ));
        }

        let supplied: Vec<Option<Type>> = arguments.iter().map(|a| Some(a.ty.clone())).collect();
        let chosen = self.choose_type_parameters(function_type, explicit, &supplied, callee, location)?;
        let Some(chosen) = chosen.into_iter().collect::<Option<Vec<Type>>>() else {
            return Err(self.error(
                ErrorCode::E4002,
                location,
                format!("every type parameter of {callee} must be chosen for a call"),
            ));
        };

        let ground = function_type.ground_with_type_parameters(&chosen);
        for (position, (argument, expected)) in arguments.iter().zip(ground.arg_types()).enumerate() {
            if argument.ty != *expected {
                return Err(self.error(
                    ErrorCode::E3003,
                    location,
                    format!(
                        "argument {} of {callee} has type {} but {expected} is expected",
                        position + 1,
                        argument.ty
                    ),
                ));
            }
        }
        Ok((chosen, ground))
    }

    // ========================================================================
    // Bindings
    // ========================================================================

    pub(super) fn validate_named_binding(
        &mut self,
        function_ref: &EntityRef,
        bindings: &[Option<Expression>],
        chosen_parameters: &[Option<UnvalidatedType>],
        scope: &VariableScope,
        location: Option<&Location>,
    ) -> Checked<TypedExpression> {
        let resolution = self.resolve_function(function_ref, location)?;
        let function_type = self.named_function_type(function_ref, &resolution)?;
        let explicit = self.validate_optional_parameters(chosen_parameters)?;
        let bindings = self.validate_bindings(bindings, scope)?;

        let callee = function_ref.to_string();
        let (chosen, bound) = self.bind(&function_type, &explicit, &bindings, &callee, location)?;
        Ok(TypedExpression::new(
            Type::Function(bound),
            AliasType::NotAliased,
            TypedExprKind::NamedFunctionBinding {
                function_ref: function_ref.clone(),
                resolved_ref: resolution.entity_ref,
                bindings,
                chosen_parameters: chosen,
            },
        ))
    }

    pub(super) fn validate_expression_binding(
        &mut self,
        function: &Expression,
        bindings: &[Option<Expression>],
        chosen_parameters: &[Option<UnvalidatedType>],
        scope: &VariableScope,
        location: Option<&Location>,
    ) -> Checked<TypedExpression> {
        let function = self.validate_expression(function, scope)?;
        let function_type = self.expect_function_type(&function, location)?;
        let explicit = self.validate_optional_parameters(chosen_parameters)?;
        let bindings = self.validate_bindings(bindings, scope)?;

        let (chosen, bound) =
            self.bind(&function_type, &explicit, &bindings, "function expression", location)?;
        let alias_type = function.alias_type;
        Ok(TypedExpression::new(
            Type::Function(bound),
            alias_type,
            TypedExprKind::ExpressionFunctionBinding {
                function: Box::new(function),
                bindings,
                chosen_parameters: chosen,
            },
        ))
    }

    /// Choose type parameters from the bound slots, check each bound value
    /// against its slot, and drop the bound slots from the type.
    fn bind(
        &mut self,
        function_type: &FunctionType,
        explicit: &[Option<Type>],
        bindings: &[Option<TypedExpression>],
        callee: &str,
        location: Option<&Location>,
    ) -> Checked<(Vec<Option<Type>>, FunctionType)> {
        if bindings.len() != function_type.num_arguments() {
            return Err(self.error(
                ErrorCode::E3007,
                location,
                format!(
                    "{callee} takes {} argument(s) but {} binding slot(s) were given",
                    function_type.num_arguments(),
                    bindings.len()
                ),
            ));
        }

        let supplied: Vec<Option<Type>> = bindings
            .iter()
            .map(|b| b.as_ref().map(|b| b.ty.clone()))
            .collect();
        let chosen = self.choose_type_parameters(function_type, explicit, &supplied, callee, location)?;
        let rebound = function_type.rebind_type_parameters(&chosen);

        for (position, (binding, expected)) in bindings
            .iter()
            .zip(rebound.bindable_argument_types())
            .enumerate()
        {
            let Some(binding) = binding else {
                continue;
            };
            match expected {
                Some(expected) if binding.ty == expected => {}
                Some(expected) => {
                    return Err(self.error(
                        ErrorCode::E3003,
                        location,
                        format!(
                            "binding {} of {callee} has type {} but {expected} is expected",
                            position + 1,
                            binding.ty
                        ),
                    ));
                }
                None => {
                    return Err(self.error(
                        ErrorCode::E3015,
                        location,
                        format!(
                            "argument {} of {callee} depends on a type parameter that is not chosen",
                            position + 1
                        ),
                    ));
                }
            }
        }

        Ok((chosen, rebound.rebind_arguments(&supplied)))
    }

    // ========================================================================
    // Shared pieces
    // ========================================================================

    fn named_function_type(
        &mut self,
        function_ref: &EntityRef,
        resolution: &crate::resolver::EntityResolution,
    ) -> Checked<FunctionType> {
        match self.signature(resolution) {
            Some(signature) => Ok(signature.function_type()),
            None => Err(self.already_reported(|| {
                format!("'{function_ref}' has no valid declaration")
            })),
        }
    }

    fn expect_function_type(
        &mut self,
        function: &TypedExpression,
        location: Option<&Location>,
    ) -> Checked<FunctionType> {
        match &function.ty {
            Type::Function(function_type) => Ok(function_type.clone()),
            other => Err(self.error(
                ErrorCode::E3008,
                location,
                format!("an expression of type {other} cannot be called or bound"),
            )),
        }
    }

    fn validate_all(
        &mut self,
        expressions: &[Expression],
        scope: &VariableScope,
    ) -> Checked<Vec<TypedExpression>> {
        expressions
            .iter()
            .map(|e| self.validate_expression(e, scope))
            .collect()
    }

    fn validate_bindings(
        &mut self,
        bindings: &[Option<Expression>],
        scope: &VariableScope,
    ) -> Checked<Vec<Option<TypedExpression>>> {
        bindings
            .iter()
            .map(|binding| {
                binding
                    .as_ref()
                    .map(|e| self.validate_expression(e, scope))
                    .transpose()
            })
            .collect()
    }

    fn validate_chosen_parameters(
        &mut self,
        chosen: &[UnvalidatedType],
    ) -> Checked<Vec<Option<Type>>> {
        chosen
            .iter()
            .map(|ty| self.validate_type(ty).map(Some))
            .collect()
    }

    fn validate_optional_parameters(
        &mut self,
        chosen: &[Option<UnvalidatedType>],
    ) -> Checked<Vec<Option<Type>>> {
        chosen
            .iter()
            .map(|ty| ty.as_ref().map(|ty| self.validate_type(ty)).transpose())
            .collect()
    }

    /// Run inference and check every chosen type against its parameter.
    fn choose_type_parameters(
        &mut self,
        function_type: &FunctionType,
        explicit: &[Option<Type>],
        supplied: &[Option<Type>],
        callee: &str,
        location: Option<&Location>,
    ) -> Checked<Vec<Option<Type>>> {
        let chosen = match infer_type_parameters(function_type, explicit, supplied) {
            Ok(chosen) => chosen,
            Err(InferenceFailure::TooManyExplicit { expected, provided }) => {
                return Err(self.error(
                    ErrorCode::E4001,
                    location,
                    format!("{callee} takes {expected} type parameter(s) but {provided} were given"),
                ));
            }
            Err(InferenceFailure::Undecided { parameter }) => {
                return Err(self.error(
                    ErrorCode::E4002,
                    location,
                    format!("could not infer type parameter {parameter} of {callee}; give it explicitly"),
                ));
            }
            Err(InferenceFailure::Unconsumed { leftover }) => {
                return Err(self.error(
                    ErrorCode::E4001,
                    location,
                    format!("{leftover} explicit type parameter(s) of {callee} were not needed"),
                ));
            }
        };

        let mut result = Ok(());
        for (parameter, chosen) in function_type.type_parameters().iter().zip(&chosen) {
            let Some(ty) = chosen else {
                continue;
            };
            if ty.is_reference() {
                result = Err(self.error(
                    ErrorCode::E4004,
                    location,
                    format!(
                        "reference type {ty} cannot be chosen for type parameter {} of {callee}",
                        parameter.name
                    ),
                ));
            } else if parameter.type_class == Some(TypeClass::Data) && !self.is_data_type(ty) {
                result = Err(self.error(
                    ErrorCode::E4003,
                    location,
                    format!(
                        "{ty} is not a Data type, as type parameter {} of {callee} requires",
                        parameter.name
                    ),
                ));
            }
        }
        result.map(|()| chosen)
    }
}
