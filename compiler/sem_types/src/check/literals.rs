//! Which literal validator applies to a type.
//!
//! Primitives and `Unicode.String` have literal forms of their own. A
//! struct with exactly one member borrows the form of that member's type,
//! so `struct Age { value: Natural }` accepts `"42"`.

use rustc_hash::FxHashSet;
use sem_ir::types::parameter_map;
use sem_ir::{EntityId, ResolvedEntityRef, Type};

use super::ModuleChecker;
use crate::literal::LiteralValidator;
use crate::natives::is_native_module;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum LiteralChainError {
    NoLiteralForm,
    Cycle(ResolvedEntityRef),
}

impl ModuleChecker<'_> {
    pub(crate) fn literal_validator(&self, ty: &Type) -> Result<LiteralValidator, LiteralChainError> {
        let mut current = ty.clone();
        let mut seen: FxHashSet<ResolvedEntityRef> = FxHashSet::default();
        loop {
            let named = match &current {
                Type::Integer => return Ok(LiteralValidator::Integer),
                Type::Natural => return Ok(LiteralValidator::Natural),
                Type::Boolean => return Ok(LiteralValidator::Boolean),
                Type::Named(named) => named,
                _ => return Err(LiteralChainError::NoLiteralForm),
            };
            if is_native_module(&named.reference.module)
                && named.reference.id == EntityId::of("Unicode.String")
            {
                return Ok(LiteralValidator::String);
            }
            let declaration = self
                .definitions(&named.reference.module)
                .and_then(|definitions| definitions.struct_def(&named.reference.id))
                .ok_or(LiteralChainError::NoLiteralForm)?;
            let [member] = declaration.members.as_slice() else {
                return Err(LiteralChainError::NoLiteralForm);
            };
            if !seen.insert(named.reference.clone()) {
                return Err(LiteralChainError::Cycle(named.reference.clone()));
            }
            let replacements = parameter_map(&declaration.type_parameters, &named.parameters);
            current = member.ty.substitute_parameters(&replacements);
        }
    }
}
