//! Module-level validator.
//!
//! The `ModuleChecker` turns one module's [`RawContext`] into a
//! [`ValidatedModule`], or into the errors explaining why it cannot.
//!
//! # Architecture
//!
//! Validation follows a multi-pass approach:
//!
//! ```text
//! Pass 0: Declarations
//!   - Collect every id each declaration contributes
//!   - Report duplicated ids, which are then left out of resolution
//!   - Record type headers (parameters) of local named types
//!
//! Pass 1: Headers
//!   - Validate struct members, interface methods, union options
//!   - Validate function signatures
//!   - Enables forward references and mutual recursion
//!
//! Pass 2: Bodies
//!   - Struct requires blocks, function bodies
//!   - Annotations (@Export, @Test)
//! ```
//!
//! Every failing `Checked` value was produced by emitting an error into the
//! checker's sink. A module with any error is never produced.

mod api;
mod bodies;
mod calls;
mod declarations;
mod expr;
mod infer;
mod literals;
mod signatures;
mod types;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use sem_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode, ErrorGuaranteed};
use sem_ir::typed::TypeSignature;
use sem_ir::{EntityId, EntityRef, Location, ModuleUniqueId, TypeParameter};

use crate::lookup::{EntityLookup, TypeHeader};
use crate::module::ValidatedModule;
use crate::natives::{is_native_module, native_library};
use crate::resolver::{EntityResolution, EntityResolver, ResolutionError};

pub use api::{fake0_version, validate_module, validate_module_with_config};
pub(crate) use bodies::{assemble_module, validate_bodies};
pub(crate) use declarations::collect_declarations;
pub(crate) use signatures::{validate_headers, LocalDeclarations};

/// Result of a validation step; the error proves a diagnostic exists.
pub(crate) type Checked<T> = Result<T, ErrorGuaranteed>;

/// Module-level validator state.
///
/// ```text
/// ModuleChecker
/// ├── Identity
/// │   └── module_id: ModuleUniqueId
/// │
/// ├── Visibility
/// │   ├── resolver: EntityResolver    (natives, local, exported upstream)
/// │   └── upstream: transitive dependencies by id
/// │
/// ├── Local Declarations
/// │   ├── local_types: headers from pass 0
/// │   └── local: LocalDeclarations    (filled by pass 1)
/// │
/// ├── Scope Context
/// │   └── type_parameters: parameters of the declaration being checked
/// │
/// └── Diagnostics
///     └── sink: DiagnosticSink
/// ```
pub(crate) struct ModuleChecker<'a> {
    pub(crate) module_id: ModuleUniqueId,
    pub(crate) resolver: EntityResolver,
    pub(crate) upstream: &'a FxHashMap<ModuleUniqueId, Arc<ValidatedModule>>,
    pub(crate) local_types: FxHashMap<EntityId, TypeHeader>,
    pub(crate) local: LocalDeclarations,
    pub(crate) type_parameters: Vec<TypeParameter>,
    pub(crate) sink: DiagnosticSink,
}

impl<'a> ModuleChecker<'a> {
    pub(crate) fn new(
        module_id: ModuleUniqueId,
        resolver: EntityResolver,
        upstream: &'a FxHashMap<ModuleUniqueId, Arc<ValidatedModule>>,
        local_types: FxHashMap<EntityId, TypeHeader>,
        sink: DiagnosticSink,
    ) -> Self {
        ModuleChecker {
            module_id,
            resolver,
            upstream,
            local_types,
            local: LocalDeclarations::default(),
            type_parameters: Vec::new(),
            sink,
        }
    }

    pub(crate) fn into_sink(self) -> DiagnosticSink {
        self.sink
    }

    // ========================================================================
    // Definitions
    // ========================================================================

    /// Definitions owned by `module`, which may be this module.
    pub(crate) fn definitions(&self, module: &ModuleUniqueId) -> Option<&dyn EntityLookup> {
        if is_native_module(module) {
            Some(native_library())
        } else if *module == self.module_id {
            Some(&self.local)
        } else {
            self.upstream
                .get(module)
                .map(|m| m.as_ref() as &dyn EntityLookup)
        }
    }

    pub(crate) fn signature(&self, resolution: &EntityResolution) -> Option<TypeSignature> {
        self.definitions(&resolution.entity_ref.module)?
            .signature(resolution.kind, &resolution.entity_ref.id)
    }

    pub(crate) fn type_header(&self, resolution: &EntityResolution) -> Option<TypeHeader> {
        let id = &resolution.entity_ref.id;
        if resolution.entity_ref.module == self.module_id {
            return self.local_types.get(id).cloned();
        }
        self.definitions(&resolution.entity_ref.module)?
            .type_header(resolution.kind, id)
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    pub(crate) fn error(
        &mut self,
        code: ErrorCode,
        location: Option<&Location>,
        message: impl Into<String>,
    ) -> ErrorGuaranteed {
        let message = message.into();
        tracing::trace!(%code, %message, "validation error");
        self.sink.emit_error(
            Diagnostic::error(code)
                .with_message(message)
                .with_label(location, "here"),
        )
    }

    pub(crate) fn warning(
        &mut self,
        code: ErrorCode,
        location: Option<&Location>,
        message: impl Into<String>,
    ) {
        self.sink.emit_warning(
            Diagnostic::warning(code)
                .with_message(message)
                .with_label(location, "here"),
        );
    }

    /// For lookups of entities whose declarations already failed: the
    /// failure was reported then.
    pub(crate) fn already_reported(&mut self, what: impl FnOnce() -> String) -> ErrorGuaranteed {
        match self.sink.has_errors() {
            Some(guarantee) => guarantee,
            None => {
                let message = what();
                self.error(ErrorCode::E1001, None, message)
            }
        }
    }

    fn resolution_error(&mut self, error: &ResolutionError, location: Option<&Location>) -> ErrorGuaranteed {
        self.error(error.code(), location, error.to_string())
    }

    pub(crate) fn resolve_type(
        &mut self,
        reference: &EntityRef,
        location: Option<&Location>,
    ) -> Checked<EntityResolution> {
        match self.resolver.resolve_type(reference) {
            Ok(resolution) => Ok(resolution.clone()),
            Err(error) => Err(self.resolution_error(&error, location)),
        }
    }

    pub(crate) fn resolve_function(
        &mut self,
        reference: &EntityRef,
        location: Option<&Location>,
    ) -> Checked<EntityResolution> {
        match self.resolver.resolve_function(reference) {
            Ok(resolution) => Ok(resolution.clone()),
            Err(error) => Err(self.resolution_error(&error, location)),
        }
    }

    /// Report every repeated name; `what` names the kind of thing listed.
    pub(crate) fn check_unique_names<'n>(
        &mut self,
        names: impl IntoIterator<Item = &'n str>,
        what: &str,
        owner: &EntityId,
        location: Option<&Location>,
    ) -> Checked<()> {
        let mut seen: Vec<&str> = Vec::new();
        let mut result = Ok(());
        for name in names {
            if seen.contains(&name) {
                result = Err(self.error(
                    ErrorCode::E2002,
                    location,
                    format!("duplicate {what} name '{name}' in {owner}"),
                ));
            } else {
                seen.push(name);
            }
        }
        result
    }
}
