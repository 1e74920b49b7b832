//! Entity resolution.
//!
//! An [`EntityResolver`] knows every entity visible from one module: the
//! native library, the module's own declarations (minus duplicated ids),
//! and whatever its direct dependencies export. Types and functions live
//! in separate namespaces; a struct occupies both, since its name is also
//! its constructor.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use sem_diagnostic::ErrorCode;
use sem_ir::ast::RawContext;
use sem_ir::{EntityId, EntityRef, ModuleUniqueId, ResolvedEntityRef};
use thiserror::Error;

use crate::module::ValidatedModule;
use crate::natives::NativeLibrary;

/// What sort of callable (or type) a resolved entity is.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FunctionLikeType {
    NativeFunction,
    Function,
    /// A struct's type, and the function that constructs it.
    StructConstructor,
    /// An interface's type, and the function building an instance from a
    /// data value and an adapter.
    InstanceConstructor,
    /// An interface's adapter type and its constructor.
    AdapterConstructor,
    UnionType,
    UnionOptionConstructor,
    UnionWhenFunction,
    /// A native type with no visible structure.
    OpaqueType,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct EntityResolution {
    pub entity_ref: ResolvedEntityRef,
    pub kind: FunctionLikeType,
    pub is_reference: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Namespace {
    Type,
    Function,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Type => f.write_str("type"),
            Namespace::Function => f.write_str("function"),
        }
    }
}

fn join_refs(refs: &[ResolvedEntityRef]) -> String {
    refs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("unknown {namespace} '{reference}'")]
    NotFound {
        reference: EntityRef,
        namespace: Namespace,
    },
    #[error("'{reference}' is ambiguous; it could be any of: {}", join_refs(.candidates))]
    Ambiguous {
        reference: EntityRef,
        candidates: Vec<ResolvedEntityRef>,
    },
    #[error("'{reference}' refers to an id declared more than once in this module")]
    Duplicate { reference: EntityRef },
}

impl ResolutionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ResolutionError::NotFound { .. } => ErrorCode::E1001,
            ResolutionError::Ambiguous { .. } => ErrorCode::E1002,
            ResolutionError::Duplicate { .. } => ErrorCode::E1003,
        }
    }
}

type Entries = FxHashMap<EntityId, Vec<EntityResolution>>;

#[derive(Clone, Debug, Default)]
pub struct EntityResolver {
    types: Entries,
    functions: Entries,
    duplicate_ids: FxHashSet<EntityId>,
    local_module: Option<ModuleUniqueId>,
}

impl EntityResolver {
    /// Build the resolver for a module about to be validated.
    pub fn for_module(
        module: &ModuleUniqueId,
        context: &RawContext,
        duplicate_ids: FxHashSet<EntityId>,
        natives: &NativeLibrary,
        dependencies: &[&ValidatedModule],
    ) -> Self {
        let mut resolver = EntityResolver {
            duplicate_ids,
            local_module: Some(module.clone()),
            ..EntityResolver::default()
        };
        resolver.add_native_library(natives);
        for dependency in dependencies {
            resolver.add_exports(dependency);
        }
        resolver.add_local_declarations(module, context);
        resolver
    }

    fn add_native_library(&mut self, natives: &NativeLibrary) {
        for id in natives.functions.keys() {
            self.register_function(&natives.module_id, id, FunctionLikeType::NativeFunction);
        }
        for id in natives.structs.keys() {
            self.register_struct(&natives.module_id, id);
        }
        for opaque in natives.opaque_types.values() {
            self.insert_type(
                &opaque.id,
                EntityResolution {
                    entity_ref: opaque.resolved_ref(),
                    kind: FunctionLikeType::OpaqueType,
                    is_reference: opaque.is_reference,
                },
            );
        }
    }

    fn add_exports(&mut self, module: &ValidatedModule) {
        for id in &module.exported {
            if module.functions.contains_key(id) {
                self.register_function(&module.id, id, FunctionLikeType::Function);
            } else if module.structs.contains_key(id) {
                self.register_struct(&module.id, id);
            } else if module.interfaces.contains_key(id) {
                self.register_interface(&module.id, id);
            } else if let Some(union) = module.unions.get(id) {
                let options: Vec<&str> = union.options.iter().map(|o| o.name.as_str()).collect();
                self.register_union(&module.id, id, &options);
            }
        }
    }

    fn add_local_declarations(&mut self, module: &ModuleUniqueId, context: &RawContext) {
        for function in &context.functions {
            if !self.duplicate_ids.contains(&function.id) {
                self.register_function(module, &function.id, FunctionLikeType::Function);
            }
        }
        for declaration in &context.structs {
            if !self.duplicate_ids.contains(&declaration.id) {
                self.register_struct(module, &declaration.id);
            }
        }
        for interface in &context.interfaces {
            if !self.duplicate_ids.contains(&interface.id) {
                self.register_interface(module, &interface.id);
            }
        }
        for union in &context.unions {
            if !self.duplicate_ids.contains(&union.id) {
                let options: Vec<&str> = union.options.iter().map(|o| o.name.as_str()).collect();
                self.register_union(module, &union.id, &options);
            }
        }
    }

    fn register_function(&mut self, module: &ModuleUniqueId, id: &EntityId, kind: FunctionLikeType) {
        self.insert_function(id, resolution(module, id, kind));
    }

    fn register_struct(&mut self, module: &ModuleUniqueId, id: &EntityId) {
        let entry = resolution(module, id, FunctionLikeType::StructConstructor);
        self.insert_type(id, entry.clone());
        self.insert_function(id, entry);
    }

    fn register_interface(&mut self, module: &ModuleUniqueId, id: &EntityId) {
        let instance = resolution(module, id, FunctionLikeType::InstanceConstructor);
        self.insert_type(id, instance.clone());
        self.insert_function(id, instance);

        let adapter_id = id.child("Adapter");
        let adapter = resolution(module, &adapter_id, FunctionLikeType::AdapterConstructor);
        self.insert_type(&adapter_id, adapter.clone());
        self.insert_function(&adapter_id, adapter);
    }

    fn register_union(&mut self, module: &ModuleUniqueId, id: &EntityId, options: &[&str]) {
        self.insert_type(id, resolution(module, id, FunctionLikeType::UnionType));
        for option in options {
            let option_id = id.child(option);
            self.insert_function(
                &option_id,
                resolution(module, &option_id, FunctionLikeType::UnionOptionConstructor),
            );
        }
        let when_id = id.child("when");
        self.insert_function(
            &when_id,
            resolution(module, &when_id, FunctionLikeType::UnionWhenFunction),
        );
    }

    fn insert_type(&mut self, id: &EntityId, entry: EntityResolution) {
        self.types.entry(id.clone()).or_default().push(entry);
    }

    fn insert_function(&mut self, id: &EntityId, entry: EntityResolution) {
        self.functions.entry(id.clone()).or_default().push(entry);
    }

    pub fn resolve_type(&self, reference: &EntityRef) -> Result<&EntityResolution, ResolutionError> {
        self.resolve(&self.types, Namespace::Type, reference)
    }

    pub fn resolve_function(
        &self,
        reference: &EntityRef,
    ) -> Result<&EntityResolution, ResolutionError> {
        self.resolve(&self.functions, Namespace::Function, reference)
    }

    /// Whether any visible entity in the function namespace has this id.
    pub fn is_function_name(&self, id: &EntityId) -> bool {
        self.functions.contains_key(id) || self.duplicate_ids.contains(id)
    }

    /// Whether any visible entity in the type namespace has this id.
    pub fn is_type_name(&self, id: &EntityId) -> bool {
        self.types.contains_key(id) || self.duplicate_ids.contains(id)
    }

    /// A duplicated local id is an error wherever it is used, unless the
    /// reference's module qualifier rules out the local module.
    fn refers_to_duplicate(&self, reference: &EntityRef) -> bool {
        if !self.duplicate_ids.contains(&reference.id) {
            return false;
        }
        match (&reference.module_ref, &self.local_module) {
            (Some(module_ref), Some(local)) => module_ref.matches(local),
            _ => true,
        }
    }

    fn resolve<'a>(
        &'a self,
        entries: &'a Entries,
        namespace: Namespace,
        reference: &EntityRef,
    ) -> Result<&'a EntityResolution, ResolutionError> {
        if self.refers_to_duplicate(reference) {
            return Err(ResolutionError::Duplicate {
                reference: reference.clone(),
            });
        }
        let candidates: Vec<&EntityResolution> = entries
            .get(&reference.id)
            .into_iter()
            .flatten()
            .filter(|entry| {
                reference
                    .module_ref
                    .as_ref()
                    .map_or(true, |module_ref| module_ref.matches(&entry.entity_ref.module))
            })
            .collect();

        match candidates.as_slice() {
            [only] => Ok(only),
            [] => Err(ResolutionError::NotFound {
                reference: reference.clone(),
                namespace,
            }),
            many => {
                let mut candidates: Vec<ResolvedEntityRef> =
                    many.iter().map(|entry| entry.entity_ref.clone()).collect();
                candidates.sort();
                Err(ResolutionError::Ambiguous {
                    reference: reference.clone(),
                    candidates,
                })
            }
        }
    }
}

fn resolution(module: &ModuleUniqueId, id: &EntityId, kind: FunctionLikeType) -> EntityResolution {
    EntityResolution {
        entity_ref: ResolvedEntityRef::new(module.clone(), id.clone()),
        kind,
        is_reference: false,
    }
}
