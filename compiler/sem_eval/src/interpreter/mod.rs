//! Tree-walking interpreter for validated modules.
//!
//! # Architecture
//!
//! Evaluation recurses along the typed tree; the host call stack is the
//! interpreter's only control state. [`Interpreter::evaluate`] dispatches a
//! resolved entity by what it is:
//!
//! ```text
//! evaluate(entity, arguments)
//!     ├── native module ──> native struct constructor | native function
//!     ├── function ───────> optimized override (if enabled) | body block
//!     ├── struct ─────────> Struct, or Try when it has a requires block
//!     ├── interface ──────> instance from data value + adapter
//!     ├── adapter ────────> adapter struct from method bindings
//!     └── union option ───> Union value | Union.when dispatch
//! ```
//!
//! Every recursive step runs under `ensure_sufficient_stack`, and errors
//! leaving an entity record it in their backtrace.

use std::sync::Arc;

use sem_ir::typed::{
    InlineFunctionDef, Interface, Struct, TypedBlock, TypedExprKind, TypedExpression, Union,
    ValidatedFunction, ValidatedStatement,
};
use sem_ir::{EntityId, ResolvedEntityRef};
use sem_stack::ensure_sufficient_stack;
use sem_types::natives::{is_native_module, native_library};
use sem_types::ValidatedModule;

use crate::environment::Environment;
use crate::errors::{
    arity_mismatch, missing_native, not_callable, type_mismatch, undefined_entity,
    undefined_member, undefined_variable, EvalError, EvalResult,
};
use crate::natives::{native_function, take_arguments};
use crate::optimized::{InterpreterOptions, OptimizedFunctions};
use crate::value::{BindingTarget, FunctionBinding, Slots, Value};

/// Interpreter for one validated module and everything upstream of it.
///
/// Holds no per-call state, so one interpreter can serve concurrent calls
/// from several threads.
pub struct Interpreter {
    module: Arc<ValidatedModule>,
    options: InterpreterOptions,
    optimized: OptimizedFunctions,
}

impl Interpreter {
    pub fn new(module: Arc<ValidatedModule>) -> Self {
        Self::with_options(module, InterpreterOptions::default(), OptimizedFunctions::new())
    }

    pub fn with_options(
        module: Arc<ValidatedModule>,
        options: InterpreterOptions,
        optimized: OptimizedFunctions,
    ) -> Self {
        Interpreter {
            module,
            options,
            optimized,
        }
    }

    pub fn module(&self) -> &Arc<ValidatedModule> {
        &self.module
    }

    /// Call a function-like entity of the main module by id.
    #[tracing::instrument(level = "debug", skip_all, fields(entity = %id))]
    pub fn interpret(&self, id: &EntityId, arguments: Vec<Value>) -> EvalResult {
        let target = ResolvedEntityRef::new(self.module.id.clone(), id.clone());
        let result = self.evaluate(&target, arguments);
        if let Err(error) = &result {
            tracing::debug!(error = %error.message, "interpretation failed");
        }
        result
    }

    /// Evaluate a resolved function-like entity with the given arguments.
    pub fn evaluate(&self, target: &ResolvedEntityRef, arguments: Vec<Value>) -> EvalResult {
        ensure_sufficient_stack(|| self.evaluate_entity(target, arguments))
            .map_err(|error| error.in_frame(target))
    }

    fn evaluate_entity(&self, target: &ResolvedEntityRef, arguments: Vec<Value>) -> EvalResult {
        tracing::trace!(%target, arguments = arguments.len(), "evaluate");
        if is_native_module(&target.module) {
            return self.evaluate_native(target, arguments);
        }

        let Some(module) = self.module.module(&target.module) else {
            return Err(undefined_entity(target));
        };
        let id = &target.id;
        if let Some(function) = module.functions.get(id) {
            if self.options.use_library_optimizations {
                if let Some(optimized) = self.optimized.get(target) {
                    tracing::trace!(%target, "optimized override");
                    return optimized(self, arguments);
                }
            }
            return self.call_function(function, arguments);
        }
        if let Some(def) = module.structs.get(id) {
            return self.construct_struct(def, arguments);
        }
        if let Some(def) = module.interfaces.get(id) {
            return self.construct_instance(def, arguments);
        }
        if let Some(def) = module.adapters.get(id) {
            check_arity(id, def.members.len(), arguments.len())?;
            return Ok(Value::Struct {
                def: Arc::clone(def),
                members: arguments,
            });
        }
        if let Some(def) = id.parent().and_then(|parent| module.unions.get(&parent)) {
            return self.evaluate_union_function(def, id.last_segment(), arguments);
        }
        Err(undefined_entity(target))
    }

    fn evaluate_native(&self, target: &ResolvedEntityRef, arguments: Vec<Value>) -> EvalResult {
        if let Some(def) = native_library().structs.get(&target.id) {
            return self.construct_struct(def, arguments);
        }
        match native_function(&target.id) {
            Some(native) => native(self, arguments),
            None => Err(missing_native(target)),
        }
    }

    // ========================================================================
    // Entities
    // ========================================================================

    fn call_function(&self, function: &ValidatedFunction, arguments: Vec<Value>) -> EvalResult {
        check_arity(&function.id, function.arguments.len(), arguments.len())?;
        let names = function.arguments.iter().map(|a| a.name.clone());
        let mut env = Environment::with_bindings(names.zip(arguments));
        self.evaluate_block(&function.block, &mut env)
    }

    pub(crate) fn construct_struct(&self, def: &Arc<Struct>, arguments: Vec<Value>) -> EvalResult {
        check_arity(&def.id, def.members.len(), arguments.len())?;
        let Some(requires) = &def.requires else {
            return Ok(Value::Struct {
                def: Arc::clone(def),
                members: arguments,
            });
        };
        let satisfied = self.satisfies(def, requires, &arguments)?;
        let value = Value::Struct {
            def: Arc::clone(def),
            members: arguments,
        };
        Ok(if satisfied {
            Value::success(value)
        } else {
            Value::failure()
        })
    }

    /// Evaluate a `requires` block with the members bound by name.
    pub(crate) fn satisfies(
        &self,
        def: &Struct,
        requires: &TypedBlock,
        members: &[Value],
    ) -> Result<bool, EvalError> {
        let names = def.members.iter().map(|m| m.name.clone());
        let mut env = Environment::with_bindings(names.zip(members.iter().cloned()));
        self.evaluate_block(requires, &mut env)?.as_boolean()
    }

    /// Fix the first open slot of every adapter method to the data value.
    fn construct_instance(&self, def: &Arc<Interface>, arguments: Vec<Value>) -> EvalResult {
        let [data, adapter] = take_arguments(&def.id, arguments)?;
        let Value::Struct { members, .. } = adapter else {
            return Err(type_mismatch("adapter", &adapter));
        };
        let methods = members
            .into_iter()
            .map(|member| {
                let mut binding = member.into_binding()?;
                match binding.slots.iter_mut().find(|slot| slot.is_none()) {
                    Some(slot) => {
                        *slot = Some(data.clone());
                        Ok(binding)
                    }
                    None => Err(arity_mismatch("adapter method", 1, 0)),
                }
            })
            .collect::<Result<Vec<_>, EvalError>>()?;
        Ok(Value::Instance {
            def: Arc::clone(def),
            methods,
        })
    }

    fn evaluate_union_function(
        &self,
        def: &Arc<Union>,
        name: &str,
        arguments: Vec<Value>,
    ) -> EvalResult {
        if name == "when" {
            return self.evaluate_when(def, arguments);
        }
        let Some((option, declared)) = def
            .option_index(name)
            .and_then(|index| def.options.get(index).map(|o| (index, o)))
        else {
            return Err(undefined_entity(def.id.child(name)));
        };
        check_arity(
            &def.id.child(name),
            usize::from(declared.ty.is_some()),
            arguments.len(),
        )?;
        Ok(Value::Union {
            def: Arc::clone(def),
            option,
            value: arguments.into_iter().next().map(Box::new),
        })
    }

    /// Apply the handler matching the union value's option.
    fn evaluate_when(&self, def: &Arc<Union>, arguments: Vec<Value>) -> EvalResult {
        check_arity(&def.when_id(), def.options.len() + 1, arguments.len())?;
        let mut arguments = arguments.into_iter();
        let Some(Value::Union { option, value, .. }) = arguments.next() else {
            return Err(undefined_entity(def.when_id()));
        };
        let Some(handler) = arguments.nth(option) else {
            return Err(arity_mismatch(def.when_id(), def.options.len() + 1, option));
        };
        let handler = handler.into_binding()?;
        let handler_arguments = value.map(|value| vec![*value]).unwrap_or_default();
        self.apply_binding(&handler, handler_arguments)
    }

    // ========================================================================
    // Function bindings
    // ========================================================================

    /// Fill a binding's open slots with `arguments` and call its target.
    pub fn apply_binding(&self, binding: &FunctionBinding, arguments: Vec<Value>) -> EvalResult {
        let supplied = arguments.len();
        let filled = binding
            .fill(arguments.into_iter().map(Some).collect())
            .ok_or_else(|| arity_mismatch("function binding", binding.open_slots(), supplied))?;
        let target = filled.target.clone();
        let Some(arguments) = filled.into_arguments() else {
            return Err(arity_mismatch("function binding", supplied, 0));
        };
        match target {
            BindingTarget::Named(target) => self.evaluate(&target, arguments),
            BindingTarget::Inline(def) => self.call_inline(&def, arguments),
        }
    }

    /// Explicit arguments come first, captured values after them.
    fn call_inline(&self, def: &InlineFunctionDef, arguments: Vec<Value>) -> EvalResult {
        let expected = def.arguments.len() + def.bound_vars.len();
        check_arity("inline function", expected, arguments.len())?;
        let names = def
            .arguments
            .iter()
            .chain(&def.bound_vars)
            .map(|a| a.name.clone());
        let mut env = Environment::with_bindings(names.zip(arguments));
        self.evaluate_block(&def.block, &mut env)
    }

    // ========================================================================
    // Blocks and expressions
    // ========================================================================

    fn evaluate_block(&self, block: &TypedBlock, env: &mut Environment) -> EvalResult {
        env.push_scope();
        let result = self.evaluate_statements(block, env);
        env.pop_scope();
        result
    }

    fn evaluate_statements(&self, block: &TypedBlock, env: &mut Environment) -> EvalResult {
        for statement in &block.statements {
            match statement {
                ValidatedStatement::Assignment {
                    name, expression, ..
                } => {
                    let value = self.evaluate_expression(expression, env)?;
                    env.define(name, value);
                }
                ValidatedStatement::Bare(expression) => {
                    self.evaluate_expression(expression, env)?;
                }
            }
        }
        self.evaluate_expression(&block.last_statement, env)
    }

    fn evaluate_expression(&self, expression: &TypedExpression, env: &mut Environment) -> EvalResult {
        ensure_sufficient_stack(|| self.evaluate_expression_inner(expression, env))
    }

    fn evaluate_expression_inner(
        &self,
        expression: &TypedExpression,
        env: &mut Environment,
    ) -> EvalResult {
        match &expression.kind {
            TypedExprKind::Variable { name } => {
                env.lookup(name).cloned().ok_or_else(|| undefined_variable(name))
            }
            TypedExprKind::Literal { literal } => self.evaluate_literal(&expression.ty, literal),
            TypedExprKind::ListLiteral { contents, .. } => {
                Ok(Value::List(self.evaluate_all(contents, env)?))
            }
            TypedExprKind::Follow { structure, name } => {
                let value = self.evaluate_expression(structure, env)?;
                follow(&value, name)
            }
            TypedExprKind::NamedFunctionCall {
                resolved_ref,
                arguments,
                ..
            } => {
                let arguments = self.evaluate_all(arguments, env)?;
                self.evaluate(resolved_ref, arguments)
            }
            TypedExprKind::ExpressionFunctionCall {
                function,
                arguments,
                ..
            } => {
                let function = self.evaluate_expression(function, env)?;
                let Value::Binding(binding) = function else {
                    return Err(not_callable(&function));
                };
                let arguments = self.evaluate_all(arguments, env)?;
                self.apply_binding(&binding, arguments)
            }
            TypedExprKind::NamedFunctionBinding {
                resolved_ref,
                bindings,
                chosen_parameters,
                ..
            } => {
                let slots: Slots = self.evaluate_slots(bindings, env)?.into_iter().collect();
                Ok(Value::binding(FunctionBinding::new(
                    BindingTarget::Named(resolved_ref.clone()),
                    slots,
                    chosen_parameters.clone(),
                )))
            }
            TypedExprKind::ExpressionFunctionBinding {
                function, bindings, ..
            } => {
                let function = self.evaluate_expression(function, env)?;
                let Value::Binding(binding) = function else {
                    return Err(not_callable(&function));
                };
                let values = self.evaluate_slots(bindings, env)?;
                let supplied = values.len();
                binding
                    .fill(values)
                    .map(Value::binding)
                    .ok_or_else(|| arity_mismatch("function binding", binding.open_slots(), supplied))
            }
            TypedExprKind::IfThen {
                condition,
                then_block,
                else_block,
            } => {
                if self.evaluate_expression(condition, env)?.as_boolean()? {
                    self.evaluate_block(then_block, env)
                } else {
                    self.evaluate_block(else_block, env)
                }
            }
            TypedExprKind::InlineFunction(def) => {
                let mut slots: Slots = def.arguments.iter().map(|_| None).collect();
                for captured in &def.bound_vars {
                    let value = env
                        .lookup(&captured.name)
                        .cloned()
                        .ok_or_else(|| undefined_variable(&captured.name))?;
                    slots.push(Some(value));
                }
                Ok(Value::binding(FunctionBinding::new(
                    BindingTarget::Inline(Arc::clone(def)),
                    slots,
                    Vec::new(),
                )))
            }
        }
    }

    fn evaluate_all(
        &self,
        expressions: &[TypedExpression],
        env: &mut Environment,
    ) -> Result<Vec<Value>, EvalError> {
        expressions
            .iter()
            .map(|expression| self.evaluate_expression(expression, env))
            .collect()
    }

    fn evaluate_slots(
        &self,
        bindings: &[Option<TypedExpression>],
        env: &mut Environment,
    ) -> Result<Vec<Option<Value>>, EvalError> {
        bindings
            .iter()
            .map(|binding| {
                binding
                    .as_ref()
                    .map(|expression| self.evaluate_expression(expression, env))
                    .transpose()
            })
            .collect()
    }

    /// The struct definition behind a named type, native or declared.
    pub(crate) fn struct_def(&self, reference: &ResolvedEntityRef) -> Option<Arc<Struct>> {
        if is_native_module(&reference.module) {
            return native_library().structs.get(&reference.id).cloned();
        }
        self.module
            .module(&reference.module)?
            .structs
            .get(&reference.id)
            .cloned()
    }
}

/// `structure.name` on a struct (member) or interface instance (method).
fn follow(value: &Value, name: &str) -> EvalResult {
    let found = match value {
        Value::Struct { def, members } => def
            .member_index(name)
            .and_then(|index| members.get(index))
            .cloned(),
        Value::Instance { def, methods } => def
            .method_index(name)
            .and_then(|index| methods.get(index))
            .cloned()
            .map(Value::binding),
        _ => None,
    };
    found.ok_or_else(|| undefined_member(name, value))
}

fn check_arity(
    name: impl std::fmt::Display,
    expected: usize,
    got: usize,
) -> Result<(), EvalError> {
    if expected == got {
        Ok(())
    } else {
        Err(arity_mismatch(name, expected, got))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
