//! Builders for validating small programs in interpreter tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use sem_ir::ast::{Block, Function, RawContext, Statement, UnvalidatedArgument};
use sem_ir::{EntityId, ModuleName, UnvalidatedType};
use sem_types::{validate_module, ValidatedModule};

use crate::{EvalResult, Interpreter, Value};

pub(crate) fn module_name(module: &str) -> ModuleName {
    ModuleName::new("example", module).unwrap()
}

/// Validate `context` as module `example:<module>`; panics listing the
/// errors if validation fails.
pub(crate) fn validated_as(
    module: &str,
    context: &RawContext,
    dependencies: &[Arc<ValidatedModule>],
) -> Arc<ValidatedModule> {
    validate_module(context, &module_name(module), dependencies)
        .into_module()
        .unwrap_or_else(|errors| panic!("validation failed: {errors:#?}"))
}

pub(crate) fn validated(context: &RawContext) -> Arc<ValidatedModule> {
    validated_as("app", context, &[])
}

pub(crate) fn interpreter_for(context: &RawContext) -> Interpreter {
    Interpreter::new(validated(context))
}

/// Validate `context` and call `function` with `arguments`.
pub(crate) fn run(context: &RawContext, function: &str, arguments: Vec<Value>) -> EvalResult {
    interpreter_for(context).interpret(&EntityId::of(function), arguments)
}

pub(crate) fn functions(functions: Vec<Function>) -> RawContext {
    RawContext {
        functions,
        ..RawContext::default()
    }
}

pub(crate) fn main_returning(return_type: UnvalidatedType, statements: Vec<Statement>) -> Function {
    Function::new("main", Vec::new(), return_type, Block::new(statements))
}

pub(crate) fn arg(name: &str, ty: UnvalidatedType) -> UnvalidatedArgument {
    UnvalidatedArgument::new(name, ty)
}
