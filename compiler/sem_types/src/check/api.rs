//! Public API for module validation.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHasher};
use sem_diagnostic::{DiagnosticConfig, DiagnosticSink};
use sem_ir::ast::RawContext;
use sem_ir::{ModuleName, ModuleUniqueId};

use super::{assemble_module, collect_declarations, validate_bodies, validate_headers, ModuleChecker};
use crate::module::{ValidatedModule, ValidationResult};
use crate::natives::native_library;
use crate::resolver::EntityResolver;

/// Validate a module with the default diagnostic configuration.
///
/// # Example
///
/// ```ignore
/// let result = validate_module(&context, &ModuleName::new("example", "app")?, &[]);
/// match result {
///     ValidationResult::Success { module, .. } => interpret(module),
///     ValidationResult::Failure { errors, .. } => report(errors),
/// }
/// ```
pub fn validate_module(
    context: &RawContext,
    module_name: &ModuleName,
    dependencies: &[Arc<ValidatedModule>],
) -> ValidationResult {
    validate_module_with_config(context, module_name, dependencies, DiagnosticConfig::default())
}

/// Validate a module against its direct dependencies.
///
/// Only entities the dependencies export are visible; their own upstream
/// modules are carried along so the interpreter can reach everything the
/// dependencies call.
#[tracing::instrument(level = "debug", skip_all, fields(module = %module_name))]
pub fn validate_module_with_config(
    context: &RawContext,
    module_name: &ModuleName,
    dependencies: &[Arc<ValidatedModule>],
    config: DiagnosticConfig,
) -> ValidationResult {
    let module_id = ModuleUniqueId::new(module_name.clone(), fake0_version(context, dependencies));
    let upstream = collect_upstream(dependencies);
    let mut sink = DiagnosticSink::with_config(config);

    let declarations = collect_declarations(&module_id, context, &mut sink);
    let direct: Vec<&ValidatedModule> = dependencies.iter().map(Arc::as_ref).collect();
    let resolver = EntityResolver::for_module(
        &module_id,
        context,
        declarations.duplicate_ids.clone(),
        native_library(),
        &direct,
    );

    let mut checker = ModuleChecker::new(
        module_id,
        resolver,
        &upstream,
        declarations.local_types,
        sink,
    );
    validate_headers(&mut checker, context, &declarations.duplicate_ids);
    let bodies = validate_bodies(&mut checker, context, &declarations.duplicate_ids);

    if checker.sink.has_errors().is_some() {
        let (errors, warnings) = checker.into_sink().into_parts();
        tracing::debug!(errors = errors.len(), "validation failed");
        return ValidationResult::Failure { errors, warnings };
    }

    let (module, sink) = assemble_module(checker, bodies);
    let (_, warnings) = sink.into_parts();
    tracing::debug!(
        module = %module.id,
        functions = module.functions.len(),
        "validation succeeded"
    );
    ValidationResult::Success {
        module: Arc::new(module),
        warnings,
    }
}

/// Direct dependencies plus everything upstream of them.
fn collect_upstream(
    dependencies: &[Arc<ValidatedModule>],
) -> FxHashMap<ModuleUniqueId, Arc<ValidatedModule>> {
    let mut upstream = FxHashMap::default();
    for dependency in dependencies {
        for (id, module) in &dependency.upstream {
            upstream.insert(id.clone(), Arc::clone(module));
        }
        upstream.insert(dependency.id.clone(), Arc::clone(dependency));
    }
    upstream
}

/// Deterministic version derived from the module's contents and the
/// identities of its dependencies.
pub fn fake0_version(context: &RawContext, dependencies: &[Arc<ValidatedModule>]) -> String {
    let mut hasher = FxHasher::default();
    context.hash(&mut hasher);
    let mut dependency_ids: Vec<&ModuleUniqueId> = dependencies.iter().map(|d| &d.id).collect();
    dependency_ids.sort();
    dependency_ids.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
