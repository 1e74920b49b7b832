//! Pass 2: bodies and annotations, then assembly of the validated module.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use sem_diagnostic::{DiagnosticSink, ErrorCode};
use sem_ir::ast::{Annotation, AnnotationArgument, RawContext};
use sem_ir::typed::{Argument, TypedBlock, ValidatedFunction};
use sem_ir::{EntityId, Location, Type};

use super::expr::VariableScope;
use super::signatures::FunctionHeader;
use super::ModuleChecker;
use crate::module::ValidatedModule;

/// Bodies that validated in pass 2.
#[derive(Debug, Default)]
pub(crate) struct Bodies {
    functions: Vec<ValidatedFunction>,
    requires: FxHashMap<EntityId, TypedBlock>,
}

// ============================================================================
// Pass 2: Bodies
// ============================================================================

#[tracing::instrument(level = "debug", skip_all)]
pub(crate) fn validate_bodies(
    checker: &mut ModuleChecker<'_>,
    context: &RawContext,
    duplicate_ids: &FxHashSet<EntityId>,
) -> Bodies {
    let mut bodies = Bodies::default();

    for declaration in context.structs.iter().filter(|s| !duplicate_ids.contains(&s.id)) {
        let location = declaration.id_location.as_ref();
        check_annotations(checker, &declaration.annotations, &declaration.id, location, None);
        let (Some(requires), Some(header)) = (
            &declaration.requires,
            checker.local.structs.get(&declaration.id).cloned(),
        ) else {
            continue;
        };

        checker.type_parameters.clone_from(&header.type_parameters);
        let members: Vec<Argument> = header
            .members
            .iter()
            .map(|m| Argument::new(m.name.clone(), m.ty.clone()))
            .collect();
        let Ok(block) = checker.validate_block(requires, &VariableScope::of(&members)) else {
            continue;
        };
        if block.ty == Type::Boolean {
            bodies.requires.insert(declaration.id.clone(), block);
        } else {
            checker.error(
                ErrorCode::E2006,
                requires.location.as_ref().or(location),
                format!(
                    "the requires block of {} must be Boolean, found {}",
                    declaration.id, block.ty
                ),
            );
        }
    }

    for interface in context
        .interfaces
        .iter()
        .filter(|i| !duplicate_ids.contains(&i.id))
    {
        let location = interface.id_location.as_ref();
        check_annotations(checker, &interface.annotations, &interface.id, location, None);
    }
    for union in context.unions.iter().filter(|u| !duplicate_ids.contains(&u.id)) {
        let location = union.id_location.as_ref();
        check_annotations(checker, &union.annotations, &union.id, location, None);
    }

    for function in context
        .functions
        .iter()
        .filter(|f| !duplicate_ids.contains(&f.id))
    {
        let location = function.id_location.as_ref();
        let Some(header) = checker.local.functions.get(&function.id).cloned() else {
            continue;
        };
        check_annotations(checker, &function.annotations, &function.id, location, Some(&header));

        checker.type_parameters.clone_from(&header.type_parameters);
        let Ok(block) = checker.validate_block(&function.block, &VariableScope::of(&header.arguments))
        else {
            continue;
        };
        if block.ty != header.return_type {
            checker.error(
                ErrorCode::E2007,
                location,
                format!(
                    "{} declares return type {} but its body has type {}",
                    function.id, header.return_type, block.ty
                ),
            );
            continue;
        }
        bodies.functions.push(ValidatedFunction {
            id: function.id.clone(),
            module: checker.module_id.clone(),
            type_parameters: header.type_parameters,
            arguments: header.arguments,
            return_type: header.return_type,
            block,
            annotations: function.annotations.clone(),
        });
    }

    tracing::debug!(
        functions = bodies.functions.len(),
        requires = bodies.requires.len(),
        "bodies validated"
    );
    bodies
}

fn check_annotations(
    checker: &mut ModuleChecker<'_>,
    annotations: &[Annotation],
    owner: &EntityId,
    location: Option<&Location>,
    function: Option<&FunctionHeader>,
) {
    for annotation in annotations {
        match annotation.name.single_segment() {
            Some("Export") => {}
            Some("Test") => check_test_annotation(checker, annotation, owner, location, function),
            _ => checker.warning(
                ErrorCode::W1001,
                location,
                format!("unknown annotation @{} on {owner}", annotation.name),
            ),
        }
    }
}

/// `@Test([argument literals...], expected literal)` on a non-generic function.
fn check_test_annotation(
    checker: &mut ModuleChecker<'_>,
    annotation: &Annotation,
    owner: &EntityId,
    location: Option<&Location>,
    function: Option<&FunctionHeader>,
) {
    let Some(function) = function else {
        checker.error(
            ErrorCode::E2009,
            location,
            format!("@Test can only annotate functions, not {owner}"),
        );
        return;
    };
    if !function.type_parameters.is_empty() {
        checker.error(
            ErrorCode::E2009,
            location,
            format!("@Test cannot annotate {owner}, which has type parameters"),
        );
        return;
    }
    let problem = match annotation.values.as_slice() {
        [AnnotationArgument::List(arguments), AnnotationArgument::Literal(_)] => {
            if arguments.len() != function.arguments.len() {
                Some(format!(
                    "@Test on {owner} gives {} argument(s) but the function takes {}",
                    arguments.len(),
                    function.arguments.len()
                ))
            } else if arguments
                .iter()
                .any(|a| !matches!(a, AnnotationArgument::Literal(_)))
            {
                Some(format!("@Test arguments of {owner} must be literals"))
            } else {
                None
            }
        }
        _ => Some(format!(
            "@Test on {owner} must have the form @Test([arguments...], expected)"
        )),
    };
    if let Some(message) = problem {
        checker.error(ErrorCode::E2009, location, message);
    }
}

// ============================================================================
// Assembly
// ============================================================================

fn is_exported(annotations: &[Annotation]) -> bool {
    annotations
        .iter()
        .any(|a| a.name.single_segment() == Some("Export"))
}

/// Build the module from an error-free run.
pub(crate) fn assemble_module(
    checker: ModuleChecker<'_>,
    bodies: Bodies,
) -> (ValidatedModule, DiagnosticSink) {
    let ModuleChecker {
        module_id,
        upstream,
        local,
        sink,
        ..
    } = checker;
    let mut requires = bodies.requires;
    let mut exported = FxHashSet::default();

    let mut structs = FxHashMap::default();
    for (id, mut declaration) in local.structs {
        declaration.requires = requires.remove(&id);
        if is_exported(&declaration.annotations) {
            exported.insert(id.clone());
        }
        structs.insert(id, Arc::new(declaration));
    }

    let mut interfaces = FxHashMap::default();
    let mut adapters = FxHashMap::default();
    let mut interfaces_by_adapter_id = FxHashMap::default();
    for (id, interface) in local.interfaces {
        if is_exported(&interface.annotations) {
            exported.insert(id.clone());
        }
        let interface = Arc::new(interface);
        adapters.insert(interface.adapter_id(), Arc::new(interface.adapter_struct()));
        interfaces_by_adapter_id.insert(interface.adapter_id(), Arc::clone(&interface));
        interfaces.insert(id, interface);
    }

    let mut unions = FxHashMap::default();
    for (id, union) in local.unions {
        if is_exported(&union.annotations) {
            exported.insert(id.clone());
        }
        unions.insert(id, Arc::new(union));
    }

    let mut functions = FxHashMap::default();
    for function in bodies.functions {
        if is_exported(&function.annotations) {
            exported.insert(function.id.clone());
        }
        functions.insert(function.id.clone(), Arc::new(function));
    }

    let module = ValidatedModule {
        id: module_id,
        functions,
        structs,
        interfaces,
        unions,
        adapters,
        interfaces_by_adapter_id,
        exported,
        upstream: upstream.clone(),
    };
    (module, sink)
}
