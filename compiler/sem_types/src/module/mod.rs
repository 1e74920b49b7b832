//! Validated modules and the result of validating one.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use sem_diagnostic::Diagnostic;
use sem_ir::typed::{Interface, OpaqueType, Struct, TypeSignature, Union, ValidatedFunction};
use sem_ir::{EntityId, ModuleUniqueId};

use crate::lookup::EntityLookup;
use crate::natives::{is_native_module, native_library};

/// A module whose every entity passed validation.
///
/// Immutable once built and shared through `Arc` by every module that
/// depends on it.
#[derive(Debug)]
pub struct ValidatedModule {
    pub id: ModuleUniqueId,
    pub functions: FxHashMap<EntityId, Arc<ValidatedFunction>>,
    pub structs: FxHashMap<EntityId, Arc<Struct>>,
    pub interfaces: FxHashMap<EntityId, Arc<Interface>>,
    pub unions: FxHashMap<EntityId, Arc<Union>>,
    /// Adapter structs keyed by adapter id.
    pub adapters: FxHashMap<EntityId, Arc<Struct>>,
    pub interfaces_by_adapter_id: FxHashMap<EntityId, Arc<Interface>>,
    /// Ids of entities annotated `@Export`.
    pub exported: FxHashSet<EntityId>,
    /// Every module this one depends on, directly or transitively.
    pub upstream: FxHashMap<ModuleUniqueId, Arc<ValidatedModule>>,
}

impl ValidatedModule {
    /// This module or any module it depends on, directly or transitively.
    pub fn module(&self, id: &ModuleUniqueId) -> Option<&ValidatedModule> {
        if *id == self.id {
            return Some(self);
        }
        match self.upstream.get(id) {
            Some(direct) => Some(direct.as_ref()),
            None => self.upstream.values().find_map(|upstream| upstream.module(id)),
        }
    }

    /// Definitions of `id`, including the native library.
    pub fn definitions(&self, id: &ModuleUniqueId) -> Option<&dyn EntityLookup> {
        if is_native_module(id) {
            Some(native_library())
        } else {
            self.module(id).map(|module| module as &dyn EntityLookup)
        }
    }

    pub fn is_exported(&self, id: &EntityId) -> bool {
        self.exported.contains(id)
    }

    /// Functions carrying a `@Test` annotation, ordered by id.
    pub fn test_functions(&self) -> Vec<&Arc<ValidatedFunction>> {
        let mut tests: Vec<&Arc<ValidatedFunction>> = self
            .functions
            .values()
            .filter(|f| f.annotations.iter().any(|a| a.name.segments() == ["Test"]))
            .collect();
        tests.sort_by(|a, b| a.id.cmp(&b.id));
        tests
    }
}

impl EntityLookup for ValidatedModule {
    fn struct_def(&self, id: &EntityId) -> Option<&Struct> {
        self.structs.get(id).map(Arc::as_ref)
    }

    fn interface_def(&self, id: &EntityId) -> Option<&Interface> {
        self.interfaces.get(id).map(Arc::as_ref)
    }

    fn adapter_interface(&self, adapter_id: &EntityId) -> Option<&Interface> {
        self.interfaces_by_adapter_id.get(adapter_id).map(Arc::as_ref)
    }

    fn union_def(&self, id: &EntityId) -> Option<&Union> {
        self.unions.get(id).map(Arc::as_ref)
    }

    fn opaque_def(&self, _id: &EntityId) -> Option<&OpaqueType> {
        None
    }

    fn function_signature(&self, id: &EntityId) -> Option<TypeSignature> {
        self.functions.get(id).map(|f| f.signature())
    }
}

impl EntityLookup for crate::natives::NativeLibrary {
    fn struct_def(&self, id: &EntityId) -> Option<&Struct> {
        self.structs.get(id).map(Arc::as_ref)
    }

    fn interface_def(&self, _id: &EntityId) -> Option<&Interface> {
        None
    }

    fn adapter_interface(&self, _adapter_id: &EntityId) -> Option<&Interface> {
        None
    }

    fn union_def(&self, _id: &EntityId) -> Option<&Union> {
        None
    }

    fn opaque_def(&self, id: &EntityId) -> Option<&OpaqueType> {
        self.opaque_types.get(id)
    }

    fn function_signature(&self, id: &EntityId) -> Option<TypeSignature> {
        self.functions.get(id).cloned()
    }
}

/// Outcome of validating one module.
#[derive(Debug)]
pub enum ValidationResult {
    Success {
        module: Arc<ValidatedModule>,
        warnings: Vec<Diagnostic>,
    },
    Failure {
        errors: Vec<Diagnostic>,
        warnings: Vec<Diagnostic>,
    },
}

impl ValidationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ValidationResult::Success { .. })
    }

    pub fn module(&self) -> Option<&Arc<ValidatedModule>> {
        match self {
            ValidationResult::Success { module, .. } => Some(module),
            ValidationResult::Failure { .. } => None,
        }
    }

    pub fn errors(&self) -> &[Diagnostic] {
        match self {
            ValidationResult::Success { .. } => &[],
            ValidationResult::Failure { errors, .. } => errors,
        }
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        match self {
            ValidationResult::Success { warnings, .. }
            | ValidationResult::Failure { warnings, .. } => warnings,
        }
    }

    /// The module, or the errors that prevented it.
    pub fn into_module(self) -> Result<Arc<ValidatedModule>, Vec<Diagnostic>> {
        match self {
            ValidationResult::Success { module, .. } => Ok(module),
            ValidationResult::Failure { errors, .. } => Err(errors),
        }
    }
}
