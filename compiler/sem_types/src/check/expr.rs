//! Blocks and expressions.
//!
//! Every expression gets a concrete type and an alias classification.
//! Blocks enforce the scoping rules (no reassignment, no shadowing of
//! entities or keywords) and the reference discipline: a possibly aliased
//! reference may not be stored in a variable, and a statement may perform
//! at most one referential action.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use sem_diagnostic::ErrorCode;
use sem_ir::ast::{Block, Expression, Statement, UnvalidatedArgument};
use sem_ir::typed::{
    AliasType, Argument, InlineFunctionDef, TypedBlock, TypedExprKind, TypedExpression,
    ValidatedStatement,
};
use sem_ir::types::parameter_map;
use sem_ir::{EntityId, FunctionType, Location, NamedType, Type, UnvalidatedType};
use sem_stack::ensure_sufficient_stack;

use super::literals::LiteralChainError;
use super::types::first_repeated;
use super::{Checked, ModuleChecker};

/// Keywords and primitive type names; never valid variable names.
const RESERVED_NAMES: &[&str] = &[
    "Integer",
    "Natural",
    "Boolean",
    "function",
    "let",
    "if",
    "else",
    "struct",
    "requires",
    "interface",
    "union",
];

/// Variables visible at one point of a block, in declaration order.
#[derive(Clone, Debug, Default)]
pub(crate) struct VariableScope {
    variables: Vec<Argument>,
}

impl VariableScope {
    pub(crate) fn of(arguments: &[Argument]) -> Self {
        VariableScope {
            variables: arguments.to_vec(),
        }
    }

    fn get(&self, name: &str) -> Option<&Type> {
        self.variables
            .iter()
            .rev()
            .find(|v| v.name == name)
            .map(|v| &v.ty)
    }

    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn push(&mut self, name: &str, ty: Type) {
        self.variables.push(Argument::new(name, ty));
    }
}

impl ModuleChecker<'_> {
    // ========================================================================
    // Blocks and statements
    // ========================================================================

    pub(crate) fn validate_block(
        &mut self,
        block: &Block,
        scope: &VariableScope,
    ) -> Checked<TypedBlock> {
        let Some((last, rest)) = block.statements.split_last() else {
            return Err(self.error(
                ErrorCode::E3006,
                block.location.as_ref(),
                "a block must end with an expression",
            ));
        };

        let mut scope = scope.clone();
        let mut statements = Vec::with_capacity(rest.len());
        for statement in rest {
            statements.push(self.validate_statement(statement, &mut scope)?);
        }
        match self.validate_statement(last, &mut scope)? {
            ValidatedStatement::Bare(expression) => Ok(TypedBlock::new(statements, expression)),
            ValidatedStatement::Assignment { name, .. } => Err(self.error(
                ErrorCode::E3006,
                last.location(),
                format!("a block cannot end with an assignment (to '{name}')"),
            )),
        }
    }

    fn validate_statement(
        &mut self,
        statement: &Statement,
        scope: &mut VariableScope,
    ) -> Checked<ValidatedStatement> {
        match statement {
            Statement::Assignment {
                name,
                ty,
                expression,
                location,
            } => {
                let location = location.as_ref();
                if scope.contains(name) {
                    self.error(
                        ErrorCode::E3002,
                        location,
                        format!("variable '{name}' is already defined in this scope"),
                    );
                }
                if self.is_reserved_name(name) {
                    self.error(
                        ErrorCode::E3002,
                        location,
                        format!("'{name}' is a keyword or names an entity and cannot be a variable"),
                    );
                }

                let typed = self.validate_expression(expression, scope)?;
                if let Some(declared) = ty {
                    let declared = self.validate_type(declared)?;
                    if declared != typed.ty {
                        return Err(self.error(
                            ErrorCode::E3003,
                            location,
                            format!(
                                "variable '{name}' is declared as {declared} but its value has type {}",
                                typed.ty
                            ),
                        ));
                    }
                }
                if typed.ty.is_reference() && typed.alias_type == AliasType::PossiblyAliased {
                    self.error(
                        ErrorCode::E3004,
                        location,
                        format!(
                            "'{name}' would hold a reference of type {} that may already be aliased",
                            typed.ty
                        ),
                    );
                }
                self.check_referential_actions(&typed, location);

                scope.push(name, typed.ty.clone());
                Ok(ValidatedStatement::Assignment {
                    name: name.clone(),
                    ty: typed.ty.clone(),
                    expression: typed,
                })
            }
            Statement::Bare { expression } => {
                let typed = self.validate_expression(expression, scope)?;
                self.check_referential_actions(&typed, expression.location());
                Ok(ValidatedStatement::Bare(typed))
            }
        }
    }

    fn is_reserved_name(&self, name: &str) -> bool {
        let id = EntityId::of(name);
        RESERVED_NAMES.contains(&name)
            || self.resolver.is_function_name(&id)
            || self.resolver.is_type_name(&id)
    }

    fn check_referential_actions(&mut self, expression: &TypedExpression, location: Option<&Location>) {
        let count = count_referential_actions(expression);
        if count > 1 {
            self.error(
                ErrorCode::E3005,
                location,
                format!("a statement may perform at most one referential action, found {count}"),
            );
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub(crate) fn validate_expression(
        &mut self,
        expression: &Expression,
        scope: &VariableScope,
    ) -> Checked<TypedExpression> {
        ensure_sufficient_stack(|| self.validate_expression_inner(expression, scope))
    }

    fn validate_expression_inner(
        &mut self,
        expression: &Expression,
        scope: &VariableScope,
    ) -> Checked<TypedExpression> {
        let location = expression.location();
        match expression {
            Expression::Variable { name, .. } => match scope.get(name) {
                Some(ty) => Ok(TypedExpression::new(
                    ty.clone(),
                    AliasType::PossiblyAliased,
                    TypedExprKind::Variable { name: name.clone() },
                )),
                None => Err(self.error(
                    ErrorCode::E3001,
                    location,
                    format!("unknown variable '{name}'"),
                )),
            },
            Expression::Literal { ty, literal, .. } => self.validate_literal(ty, literal, location),
            Expression::ListLiteral {
                contents,
                chosen_parameter,
                ..
            } => self.validate_list_literal(contents, chosen_parameter, scope, location),
            Expression::Follow {
                structure, name, ..
            } => self.validate_follow(structure, name, scope, location),
            Expression::NamedFunctionCall {
                function_ref,
                arguments,
                chosen_parameters,
                ..
            } => self.validate_named_call(function_ref, arguments, chosen_parameters, scope, location),
            Expression::ExpressionFunctionCall {
                function,
                arguments,
                chosen_parameters,
                ..
            } => self.validate_expression_call(function, arguments, chosen_parameters, scope, location),
            Expression::NamedFunctionBinding {
                function_ref,
                bindings,
                chosen_parameters,
                ..
            } => self.validate_named_binding(function_ref, bindings, chosen_parameters, scope, location),
            Expression::ExpressionFunctionBinding {
                function,
                bindings,
                chosen_parameters,
                ..
            } => self.validate_expression_binding(function, bindings, chosen_parameters, scope, location),
            Expression::IfThen {
                condition,
                then_block,
                else_block,
                ..
            } => self.validate_if_then(condition, then_block, else_block, scope, location),
            Expression::InlineFunction {
                arguments,
                return_type,
                block,
                ..
            } => self.validate_inline_function(arguments, return_type, block, scope, location),
        }
    }

    fn validate_literal(
        &mut self,
        ty: &UnvalidatedType,
        literal: &str,
        location: Option<&Location>,
    ) -> Checked<TypedExpression> {
        let ty = self.validate_type(ty)?;
        let validator = match self.literal_validator(&ty) {
            Ok(validator) => validator,
            Err(LiteralChainError::NoLiteralForm) => {
                return Err(self.error(
                    ErrorCode::E3013,
                    location,
                    format!("type {ty} has no literal form"),
                ));
            }
            Err(LiteralChainError::Cycle(reference)) => {
                return Err(self.error(
                    ErrorCode::E3014,
                    location,
                    format!("the literal form of {ty} loops back through {reference}"),
                ));
            }
        };
        if !validator.validate(literal) {
            return Err(self.error(
                ErrorCode::E3012,
                location,
                format!("\"{literal}\" is not a valid {} literal for type {ty}", validator.name()),
            ));
        }
        Ok(TypedExpression::new(
            ty,
            AliasType::NotAliased,
            TypedExprKind::Literal {
                literal: literal.to_string(),
            },
        ))
    }

    fn validate_list_literal(
        &mut self,
        contents: &[Expression],
        chosen_parameter: &UnvalidatedType,
        scope: &VariableScope,
        location: Option<&Location>,
    ) -> Checked<TypedExpression> {
        let element_type = self.validate_type(chosen_parameter)?;
        self.require_value_type(&element_type, location, "a list element")?;

        let mut items = Vec::with_capacity(contents.len());
        for item in contents {
            let typed = self.validate_expression(item, scope)?;
            if typed.ty != element_type {
                return Err(self.error(
                    ErrorCode::E3003,
                    item.location().or(location),
                    format!(
                        "list item has type {} but the list holds {element_type}",
                        typed.ty
                    ),
                ));
            }
            items.push(typed);
        }
        Ok(TypedExpression::new(
            Type::list_of(element_type.clone()),
            AliasType::NotAliased,
            TypedExprKind::ListLiteral {
                contents: items,
                chosen_parameter: element_type,
            },
        ))
    }

    fn validate_follow(
        &mut self,
        structure: &Expression,
        name: &str,
        scope: &VariableScope,
        location: Option<&Location>,
    ) -> Checked<TypedExpression> {
        let structure = self.validate_expression(structure, scope)?;
        let followed = match &structure.ty {
            Type::Named(named) => self.follow_type(named, name),
            _ => Followed::NotFollowable,
        };
        let ty = match followed {
            Followed::Found(ty) => ty,
            Followed::Unknown => {
                return Err(self.error(
                    ErrorCode::E3010,
                    location,
                    format!("type {} has no member named '{name}'", structure.ty),
                ));
            }
            Followed::NotFollowable => {
                return Err(self.error(
                    ErrorCode::E3009,
                    location,
                    format!("cannot follow '{name}' on a value of type {}", structure.ty),
                ));
            }
        };
        let alias_type = structure.alias_type;
        Ok(TypedExpression::new(
            ty,
            alias_type,
            TypedExprKind::Follow {
                structure: Box::new(structure),
                name: name.to_string(),
            },
        ))
    }

    /// The type of `name` on a value of a named type: a struct member (also
    /// adapter members), or an interface method.
    fn follow_type(&self, named: &NamedType, name: &str) -> Followed {
        let Some(definitions) = self.definitions(&named.reference.module) else {
            return Followed::NotFollowable;
        };
        let id = &named.reference.id;
        if let Some(declaration) = definitions.struct_def(id) {
            let replacements = parameter_map(&declaration.type_parameters, &named.parameters);
            return declaration
                .members
                .iter()
                .find(|m| m.name == name)
                .map_or(Followed::Unknown, |m| {
                    Followed::Found(m.ty.substitute_parameters(&replacements))
                });
        }
        if let Some(interface) = definitions.adapter_interface(id) {
            let adapter = interface.adapter_struct();
            let replacements = parameter_map(&adapter.type_parameters, &named.parameters);
            return adapter
                .members
                .iter()
                .find(|m| m.name == name)
                .map_or(Followed::Unknown, |m| {
                    Followed::Found(m.ty.substitute_parameters(&replacements))
                });
        }
        if let Some(interface) = definitions.interface_def(id) {
            let replacements = parameter_map(&interface.type_parameters, &named.parameters);
            return interface
                .methods
                .iter()
                .find(|m| m.name == name)
                .map_or(Followed::Unknown, |m| {
                    Followed::Found(
                        Type::Function(m.function_type()).substitute_parameters(&replacements),
                    )
                });
        }
        Followed::NotFollowable
    }

    fn validate_if_then(
        &mut self,
        condition: &Expression,
        then_block: &Block,
        else_block: &Block,
        scope: &VariableScope,
        location: Option<&Location>,
    ) -> Checked<TypedExpression> {
        let condition = self.validate_expression(condition, scope)?;
        if condition.ty != Type::Boolean {
            return Err(self.error(
                ErrorCode::E3003,
                location,
                format!("an if condition must be Boolean, found {}", condition.ty),
            ));
        }
        let then_block = self.validate_block(then_block, scope)?;
        let else_block = self.validate_block(else_block, scope)?;
        if then_block.ty != else_block.ty {
            return Err(self.error(
                ErrorCode::E3011,
                location,
                format!(
                    "if arms have different types: {} and {}",
                    then_block.ty, else_block.ty
                ),
            ));
        }
        Ok(TypedExpression::new(
            then_block.ty.clone(),
            then_block.alias_type().join(else_block.alias_type()),
            TypedExprKind::IfThen {
                condition: Box::new(condition),
                then_block: Box::new(then_block),
                else_block: Box::new(else_block),
            },
        ))
    }

    fn validate_inline_function(
        &mut self,
        arguments: &[UnvalidatedArgument],
        return_type: &UnvalidatedType,
        block: &Block,
        scope: &VariableScope,
        location: Option<&Location>,
    ) -> Checked<TypedExpression> {
        let names: Vec<String> = arguments.iter().map(|a| a.name.clone()).collect();
        if let Some(duplicate) = first_repeated(&names) {
            return Err(self.error(
                ErrorCode::E2002,
                location,
                format!("duplicate argument name '{duplicate}' in inline function"),
            ));
        }
        let mut shadowing = None;
        for argument in arguments {
            if scope.contains(&argument.name) {
                shadowing = Some(self.error(
                    ErrorCode::E3002,
                    argument.location.as_ref().or(location),
                    format!(
                        "inline function argument '{}' shadows a variable",
                        argument.name
                    ),
                ));
            }
        }
        if let Some(guarantee) = shadowing {
            return Err(guarantee);
        }

        let mut typed_arguments = Vec::with_capacity(arguments.len());
        for argument in arguments {
            let ty = self.validate_type(&argument.ty)?;
            typed_arguments.push(Argument::new(argument.name.clone(), ty));
        }
        let return_type = self.validate_type(return_type)?;

        let mut body_scope = scope.clone();
        for argument in &typed_arguments {
            body_scope.push(&argument.name, argument.ty.clone());
        }
        let block = self.validate_block(block, &body_scope)?;
        if block.ty != return_type {
            return Err(self.error(
                ErrorCode::E3003,
                location,
                format!(
                    "inline function body has type {} but declares {return_type}",
                    block.ty
                ),
            ));
        }

        let mut referenced = FxHashSet::default();
        collect_block_variables(&block, &mut referenced);
        let bound_vars = captured_variables(scope, &referenced);
        let is_reference = bound_vars.iter().any(|v| v.ty.is_reference());

        let ty = Type::Function(FunctionType::create(
            is_reference,
            Vec::new(),
            typed_arguments.iter().map(|a| a.ty.clone()).collect(),
            return_type.clone(),
        ));
        Ok(TypedExpression::new(
            ty,
            AliasType::NotAliased,
            TypedExprKind::InlineFunction(Arc::new(InlineFunctionDef {
                arguments: typed_arguments,
                bound_vars,
                return_type,
                block,
            })),
        ))
    }
}

enum Followed {
    Found(Type),
    Unknown,
    NotFollowable,
}

/// Enclosing variables referenced by a body, in the enclosing scope's
/// declaration order.
fn captured_variables(scope: &VariableScope, referenced: &FxHashSet<String>) -> Vec<Argument> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    scope
        .variables
        .iter()
        .filter(|v| referenced.contains(&v.name) && seen.insert(v.name.as_str()))
        .cloned()
        .collect()
}

fn collect_block_variables(block: &TypedBlock, names: &mut FxHashSet<String>) {
    for statement in &block.statements {
        match statement {
            ValidatedStatement::Assignment { expression, .. }
            | ValidatedStatement::Bare(expression) => collect_variables(expression, names),
        }
    }
    collect_variables(&block.last_statement, names);
}

fn collect_variables(expression: &TypedExpression, names: &mut FxHashSet<String>) {
    ensure_sufficient_stack(|| match &expression.kind {
        TypedExprKind::Variable { name } => {
            names.insert(name.clone());
        }
        TypedExprKind::Literal { .. } => {}
        TypedExprKind::ListLiteral { contents, .. } => {
            for item in contents {
                collect_variables(item, names);
            }
        }
        TypedExprKind::Follow { structure, .. } => collect_variables(structure, names),
        TypedExprKind::NamedFunctionCall { arguments, .. } => {
            for argument in arguments {
                collect_variables(argument, names);
            }
        }
        TypedExprKind::ExpressionFunctionCall {
            function,
            arguments,
            ..
        } => {
            collect_variables(function, names);
            for argument in arguments {
                collect_variables(argument, names);
            }
        }
        TypedExprKind::NamedFunctionBinding { bindings, .. } => {
            for binding in bindings.iter().flatten() {
                collect_variables(binding, names);
            }
        }
        TypedExprKind::ExpressionFunctionBinding {
            function, bindings, ..
        } => {
            collect_variables(function, names);
            for binding in bindings.iter().flatten() {
                collect_variables(binding, names);
            }
        }
        TypedExprKind::IfThen {
            condition,
            then_block,
            else_block,
        } => {
            collect_variables(condition, names);
            collect_block_variables(then_block, names);
            collect_block_variables(else_block, names);
        }
        TypedExprKind::InlineFunction(inline) => {
            names.extend(inline.bound_vars.iter().map(|v| v.name.clone()));
        }
    });
}

/// Referential actions performed directly by one statement's expression.
///
/// A call counts when its result or any argument is a reference. If/then
/// counts only its condition; follows, bindings of named functions, and
/// inline functions count nothing.
pub(crate) fn count_referential_actions(expression: &TypedExpression) -> usize {
    match &expression.kind {
        TypedExprKind::Variable { .. }
        | TypedExprKind::Literal { .. }
        | TypedExprKind::Follow { .. }
        | TypedExprKind::NamedFunctionBinding { .. }
        | TypedExprKind::InlineFunction(_) => 0,
        TypedExprKind::IfThen { condition, .. } => count_referential_actions(condition),
        TypedExprKind::NamedFunctionCall { arguments, .. } => {
            call_actions(&expression.ty, arguments)
        }
        TypedExprKind::ExpressionFunctionCall {
            function,
            arguments,
            ..
        } => count_referential_actions(function) + call_actions(&expression.ty, arguments),
        TypedExprKind::ListLiteral { contents, .. } => {
            contents.iter().map(count_referential_actions).sum()
        }
        TypedExprKind::ExpressionFunctionBinding { function, .. } => {
            count_referential_actions(function)
        }
    }
}

fn call_actions(ty: &Type, arguments: &[TypedExpression]) -> usize {
    let own = ty.is_reference() || arguments.iter().any(|a| a.ty.is_reference());
    usize::from(own)
        + arguments
            .iter()
            .map(count_referential_actions)
            .sum::<usize>()
}
