//! Sem IR - data model shared by the validator and the interpreter
//!
//! This crate contains:
//! - Entity ids, module identities and references
//! - Spans and locations for diagnostics
//! - The type algebra (`Type`, `FunctionType`) and its substitution,
//!   grounding, and rebinding operations
//! - The unchecked tree produced by a parser (`ast`)
//! - The typed tree and validated entities produced by the validator (`typed`)
//!
//! Nothing here performs resolution or checking; see `sem_types`.

pub mod ast;
pub mod ids;
mod span;
pub mod typed;
pub mod types;

pub use ids::{
    EntityId, EntityRef, IdError, ModuleName, ModuleRef, ModuleUniqueId, ResolvedEntityRef,
};
pub use span::{Location, Span};
pub use types::{FunctionType, NamedType, Type, TypeClass, TypeParameter, UnvalidatedType};
