//! Pass 1: declaration headers.
//!
//! Validates everything a declaration exposes to the rest of the module
//! without looking at any block: struct members, interface methods, union
//! options, and function signatures. After this pass every local entity
//! can be called or named from any body, in any order.

use rustc_hash::{FxHashMap, FxHashSet};
use sem_diagnostic::ErrorCode;
use sem_ir::ast::{
    Function, RawContext, UnvalidatedArgument, UnvalidatedInterface, UnvalidatedStruct,
    UnvalidatedUnion,
};
use sem_ir::typed::{
    Argument, Interface, Member, Method, OpaqueType, Struct, TypeSignature, Union, UnionOption,
};
use sem_ir::{EntityId, Location, Type, TypeParameter};

use super::{Checked, ModuleChecker};
use crate::lookup::{declared_signature, EntityLookup};
use crate::resolver::FunctionLikeType;

/// A function whose signature validated; its body is checked in pass 2.
#[derive(Clone, Debug)]
pub(crate) struct FunctionHeader {
    pub(crate) type_parameters: Vec<TypeParameter>,
    pub(crate) arguments: Vec<Argument>,
    pub(crate) return_type: Type,
}

/// Headers of the module being validated.
///
/// Structs here carry no `requires` block yet; `with_requires` records
/// which ones have one so their constructors already return `Try`.
#[derive(Debug, Default)]
pub(crate) struct LocalDeclarations {
    pub(crate) functions: FxHashMap<EntityId, FunctionHeader>,
    pub(crate) structs: FxHashMap<EntityId, Struct>,
    pub(crate) with_requires: FxHashSet<EntityId>,
    pub(crate) interfaces: FxHashMap<EntityId, Interface>,
    pub(crate) adapter_owners: FxHashMap<EntityId, EntityId>,
    pub(crate) unions: FxHashMap<EntityId, Union>,
}

impl EntityLookup for LocalDeclarations {
    fn struct_def(&self, id: &EntityId) -> Option<&Struct> {
        self.structs.get(id)
    }

    fn interface_def(&self, id: &EntityId) -> Option<&Interface> {
        self.interfaces.get(id)
    }

    fn adapter_interface(&self, adapter_id: &EntityId) -> Option<&Interface> {
        self.interfaces.get(self.adapter_owners.get(adapter_id)?)
    }

    fn union_def(&self, id: &EntityId) -> Option<&Union> {
        self.unions.get(id)
    }

    fn opaque_def(&self, _id: &EntityId) -> Option<&OpaqueType> {
        None
    }

    fn function_signature(&self, id: &EntityId) -> Option<TypeSignature> {
        let header = self.functions.get(id)?;
        Some(TypeSignature::new(
            id.clone(),
            header.type_parameters.clone(),
            header.arguments.iter().map(|a| a.ty.clone()).collect(),
            header.return_type.clone(),
        ))
    }

    fn signature(&self, kind: FunctionLikeType, id: &EntityId) -> Option<TypeSignature> {
        let mut signature = declared_signature(self, kind, id)?;
        if kind == FunctionLikeType::StructConstructor && self.with_requires.contains(id) {
            signature.output_type = Type::try_of(signature.output_type);
        }
        Some(signature)
    }
}

// ============================================================================
// Pass 1: Headers
// ============================================================================

#[tracing::instrument(level = "debug", skip_all)]
pub(crate) fn validate_headers(
    checker: &mut ModuleChecker<'_>,
    context: &RawContext,
    duplicate_ids: &FxHashSet<EntityId>,
) {
    let mut local = LocalDeclarations::default();

    for declaration in context.structs.iter().filter(|s| !duplicate_ids.contains(&s.id)) {
        if let Ok(validated) = validate_struct_header(checker, declaration) {
            if declaration.requires.is_some() {
                local.with_requires.insert(validated.id.clone());
            }
            local.structs.insert(validated.id.clone(), validated);
        }
    }
    for interface in context
        .interfaces
        .iter()
        .filter(|i| !duplicate_ids.contains(&i.id))
    {
        if let Ok(validated) = validate_interface(checker, interface) {
            local
                .adapter_owners
                .insert(validated.adapter_id(), validated.id.clone());
            local.interfaces.insert(validated.id.clone(), validated);
        }
    }
    for union in context.unions.iter().filter(|u| !duplicate_ids.contains(&u.id)) {
        if let Ok(validated) = validate_union(checker, union) {
            local.unions.insert(validated.id.clone(), validated);
        }
    }
    for function in context
        .functions
        .iter()
        .filter(|f| !duplicate_ids.contains(&f.id))
    {
        if let Ok(header) = validate_function_header(checker, function) {
            local.functions.insert(function.id.clone(), header);
        }
    }

    tracing::debug!(
        structs = local.structs.len(),
        interfaces = local.interfaces.len(),
        unions = local.unions.len(),
        functions = local.functions.len(),
        "headers validated"
    );
    checker.type_parameters.clear();
    checker.local = local;
}

fn check_type_parameters(
    checker: &mut ModuleChecker<'_>,
    type_parameters: &[TypeParameter],
    owner: &EntityId,
    location: Option<&Location>,
) -> Checked<()> {
    checker.check_unique_names(
        type_parameters.iter().map(|p| p.name.as_str()),
        "type parameter",
        owner,
        location,
    )
}

pub(crate) fn validate_arguments(
    checker: &mut ModuleChecker<'_>,
    arguments: &[UnvalidatedArgument],
    owner: &EntityId,
    location: Option<&Location>,
) -> Checked<Vec<Argument>> {
    checker.check_unique_names(arguments.iter().map(|a| a.name.as_str()), "argument", owner, location)?;
    arguments
        .iter()
        .map(|argument| {
            let ty = checker.validate_type(&argument.ty)?;
            Ok(Argument::new(argument.name.clone(), ty))
        })
        .collect()
}

fn validate_struct_header(
    checker: &mut ModuleChecker<'_>,
    declaration: &UnvalidatedStruct,
) -> Checked<Struct> {
    let location = declaration.id_location.as_ref();
    check_type_parameters(checker, &declaration.type_parameters, &declaration.id, location)?;
    checker.check_unique_names(
        declaration.members.iter().map(|m| m.name.as_str()),
        "member",
        &declaration.id,
        location,
    )?;

    checker.type_parameters.clone_from(&declaration.type_parameters);
    let mut members = Vec::with_capacity(declaration.members.len());
    for member in &declaration.members {
        let ty = checker.validate_type(&member.ty)?;
        if ty.is_reference() {
            return Err(checker.error(
                ErrorCode::E2003,
                location,
                format!(
                    "member '{}' of struct {} has reference type {ty}",
                    member.name, declaration.id
                ),
            ));
        }
        members.push(Member {
            name: member.name.clone(),
            ty,
        });
    }

    Ok(Struct {
        id: declaration.id.clone(),
        module: checker.module_id.clone(),
        type_parameters: declaration.type_parameters.clone(),
        members,
        requires: None,
        annotations: declaration.annotations.clone(),
    })
}

fn validate_interface(
    checker: &mut ModuleChecker<'_>,
    interface: &UnvalidatedInterface,
) -> Checked<Interface> {
    let location = interface.id_location.as_ref();
    check_type_parameters(checker, &interface.type_parameters, &interface.id, location)?;
    checker.check_unique_names(
        interface.methods.iter().map(|m| m.name.as_str()),
        "method",
        &interface.id,
        location,
    )?;

    let mut methods = Vec::with_capacity(interface.methods.len());
    for method in &interface.methods {
        let mut in_scope = interface.type_parameters.clone();
        in_scope.extend(method.type_parameters.iter().cloned());
        check_type_parameters(checker, &in_scope, &interface.id, location)?;
        checker.type_parameters = in_scope;

        let arguments = validate_arguments(checker, &method.arguments, &interface.id, location)?;
        let return_type = checker.validate_type(&method.return_type)?;
        methods.push(Method {
            name: method.name.clone(),
            type_parameters: method.type_parameters.clone(),
            arguments,
            return_type,
        });
    }

    Ok(Interface {
        id: interface.id.clone(),
        module: checker.module_id.clone(),
        type_parameters: interface.type_parameters.clone(),
        methods,
        annotations: interface.annotations.clone(),
    })
}

fn validate_union(checker: &mut ModuleChecker<'_>, union: &UnvalidatedUnion) -> Checked<Union> {
    let location = union.id_location.as_ref();
    check_type_parameters(checker, &union.type_parameters, &union.id, location)?;
    if union.options.is_empty() {
        return Err(checker.error(
            ErrorCode::E2008,
            location,
            format!("union {} has no options", union.id),
        ));
    }
    checker.check_unique_names(
        union.options.iter().map(|o| o.name.as_str()),
        "option",
        &union.id,
        location,
    )?;

    checker.type_parameters.clone_from(&union.type_parameters);
    let mut options = Vec::with_capacity(union.options.len());
    for option in &union.options {
        let option_location = option.location.as_ref().or(location);
        if option.name == "when" {
            return Err(checker.error(
                ErrorCode::E2008,
                option_location,
                format!("union {} cannot have an option named 'when'", union.id),
            ));
        }
        let ty = match &option.ty {
            Some(ty) => {
                let ty = checker.validate_type(ty)?;
                checker.require_value_type(&ty, option_location, "a union option")?;
                Some(ty)
            }
            None => None,
        };
        options.push(UnionOption {
            name: option.name.clone(),
            ty,
        });
    }

    Ok(Union {
        id: union.id.clone(),
        module: checker.module_id.clone(),
        type_parameters: union.type_parameters.clone(),
        options,
        annotations: union.annotations.clone(),
    })
}

fn validate_function_header(
    checker: &mut ModuleChecker<'_>,
    function: &Function,
) -> Checked<FunctionHeader> {
    let location = function.id_location.as_ref();
    check_type_parameters(checker, &function.type_parameters, &function.id, location)?;
    checker.type_parameters.clone_from(&function.type_parameters);
    let arguments = validate_arguments(checker, &function.arguments, &function.id, location)?;
    let return_type = checker.validate_type(&function.return_type)?;
    Ok(FunctionHeader {
        type_parameters: function.type_parameters.clone(),
        arguments,
        return_type,
    })
}
