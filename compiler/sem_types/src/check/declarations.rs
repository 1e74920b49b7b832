//! Pass 0: declarations.
//!
//! Gathers every id the module's declarations contribute, reports ids
//! declared more than once, and records the headers of local named types
//! so type expressions can be checked before any declaration is.

use rustc_hash::{FxHashMap, FxHashSet};
use sem_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use sem_ir::ast::RawContext;
use sem_ir::typed::Interface;
use sem_ir::{EntityId, Location, ModuleUniqueId, TypeParameter};

use crate::lookup::TypeHeader;

/// How many declarations claimed an id, and where.
enum Entry<T> {
    Unique(T),
    Duplicate(Vec<T>),
}

impl<T> Entry<T> {
    fn push(self, site: T) -> Entry<T> {
        match self {
            Entry::Unique(first) => Entry::Duplicate(vec![first, site]),
            Entry::Duplicate(mut sites) => {
                sites.push(site);
                Entry::Duplicate(sites)
            }
        }
    }
}

pub(crate) struct Declarations {
    pub(crate) duplicate_ids: FxHashSet<EntityId>,
    pub(crate) local_types: FxHashMap<EntityId, TypeHeader>,
}

// ============================================================================
// Pass 0: Declarations
// ============================================================================

#[tracing::instrument(level = "debug", skip_all, fields(
    functions = context.functions.len(),
    structs = context.structs.len(),
    interfaces = context.interfaces.len(),
    unions = context.unions.len(),
))]
pub(crate) fn collect_declarations(
    module_id: &ModuleUniqueId,
    context: &RawContext,
    sink: &mut DiagnosticSink,
) -> Declarations {
    let mut claims: Vec<(EntityId, Option<Location>)> = Vec::new();
    for function in &context.functions {
        claims.push((function.id.clone(), function.id_location.clone()));
    }
    for declaration in &context.structs {
        claims.push((declaration.id.clone(), declaration.id_location.clone()));
    }
    for interface in &context.interfaces {
        claims.push((interface.id.clone(), interface.id_location.clone()));
        claims.push((interface.id.child("Adapter"), interface.id_location.clone()));
    }
    for union in &context.unions {
        claims.push((union.id.clone(), union.id_location.clone()));
        for option in &union.options {
            claims.push((union.id.child(&option.name), option.location.clone()));
        }
        claims.push((union.id.child("when"), union.id_location.clone()));
    }

    // Keep first-claim order so errors come out in source order.
    let mut order: Vec<EntityId> = Vec::new();
    let mut entries: FxHashMap<EntityId, Entry<Option<Location>>> = FxHashMap::default();
    for (id, location) in claims {
        let entry = match entries.remove(&id) {
            Some(entry) => entry.push(location),
            None => {
                order.push(id.clone());
                Entry::Unique(location)
            }
        };
        entries.insert(id, entry);
    }

    let mut duplicate_ids = FxHashSet::default();
    for id in order {
        if let Some(Entry::Duplicate(sites)) = entries.remove(&id) {
            tracing::debug!(%id, count = sites.len(), "duplicate id");
            // The per-site note keeps unlocated sites distinct under dedup.
            for (index, site) in sites.iter().enumerate() {
                sink.emit_error(
                    Diagnostic::error(ErrorCode::E2001)
                        .with_message(format!("duplicate id '{id}'"))
                        .with_label(site.as_ref(), "declared here")
                        .with_note(format!(
                            "declaration {} of {} for '{id}'",
                            index + 1,
                            sites.len()
                        )),
                );
            }
            duplicate_ids.insert(id);
        }
    }

    let local_types = local_type_headers(module_id, context, &duplicate_ids);
    Declarations {
        duplicate_ids,
        local_types,
    }
}

fn local_type_headers(
    module_id: &ModuleUniqueId,
    context: &RawContext,
    duplicate_ids: &FxHashSet<EntityId>,
) -> FxHashMap<EntityId, TypeHeader> {
    let value_type = |type_parameters: &[TypeParameter]| TypeHeader {
        type_parameters: type_parameters.to_vec(),
        is_reference: false,
    };

    let mut headers = FxHashMap::default();
    for declaration in &context.structs {
        headers.insert(
            declaration.id.clone(),
            value_type(&declaration.type_parameters),
        );
    }
    for interface in &context.interfaces {
        headers.insert(interface.id.clone(), value_type(&interface.type_parameters));
        let shell = Interface {
            id: interface.id.clone(),
            module: module_id.clone(),
            type_parameters: interface.type_parameters.clone(),
            methods: Vec::new(),
            annotations: Vec::new(),
        };
        headers.insert(
            shell.adapter_id(),
            value_type(&shell.adapter_struct().type_parameters),
        );
    }
    for union in &context.unions {
        headers.insert(union.id.clone(), value_type(&union.type_parameters));
    }
    headers.retain(|id, _| !duplicate_ids.contains(id));
    headers
}
