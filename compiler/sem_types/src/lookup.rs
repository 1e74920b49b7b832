//! Definition lookup for one module's entities.

use sem_ir::typed::{Interface, OpaqueType, Struct, TypeSignature, Union};
use sem_ir::{EntityId, TypeParameter};

use crate::resolver::FunctionLikeType;

/// Definitions owned by a single module, or by the native library.
///
/// Implemented by validated modules, the native library, and the
/// declaration headers of the module currently being validated.
pub trait EntityLookup {
    fn struct_def(&self, id: &EntityId) -> Option<&Struct>;
    fn interface_def(&self, id: &EntityId) -> Option<&Interface>;
    /// The interface whose adapter has this id.
    fn adapter_interface(&self, adapter_id: &EntityId) -> Option<&Interface>;
    fn union_def(&self, id: &EntityId) -> Option<&Union>;
    fn opaque_def(&self, id: &EntityId) -> Option<&OpaqueType>;
    /// Signature of a plain (user or native) function.
    fn function_signature(&self, id: &EntityId) -> Option<TypeSignature>;

    /// Signature of anything callable in the function namespace.
    fn signature(&self, kind: FunctionLikeType, id: &EntityId) -> Option<TypeSignature> {
        declared_signature(self, kind, id)
    }

    /// Type parameters and reference-ness of a named type.
    fn type_header(&self, kind: FunctionLikeType, id: &EntityId) -> Option<TypeHeader> {
        let (type_parameters, is_reference) = match kind {
            FunctionLikeType::StructConstructor => {
                (self.struct_def(id)?.type_parameters.clone(), false)
            }
            FunctionLikeType::InstanceConstructor => {
                (self.interface_def(id)?.type_parameters.clone(), false)
            }
            FunctionLikeType::AdapterConstructor => (
                self.adapter_interface(id)?.adapter_struct().type_parameters,
                false,
            ),
            FunctionLikeType::UnionType => (self.union_def(id)?.type_parameters.clone(), false),
            FunctionLikeType::OpaqueType => {
                let opaque = self.opaque_def(id)?;
                (opaque.type_parameters.clone(), opaque.is_reference)
            }
            FunctionLikeType::NativeFunction
            | FunctionLikeType::Function
            | FunctionLikeType::UnionOptionConstructor
            | FunctionLikeType::UnionWhenFunction => return None,
        };
        Some(TypeHeader {
            type_parameters,
            is_reference,
        })
    }
}

/// What a use of a named type needs to know about its declaration.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TypeHeader {
    pub type_parameters: Vec<TypeParameter>,
    pub is_reference: bool,
}

/// Signatures derived from definitions, shared by every [`EntityLookup`].
pub(crate) fn declared_signature<L: EntityLookup + ?Sized>(
    lookup: &L,
    kind: FunctionLikeType,
    id: &EntityId,
) -> Option<TypeSignature> {
    match kind {
        FunctionLikeType::NativeFunction | FunctionLikeType::Function => {
            lookup.function_signature(id)
        }
        FunctionLikeType::StructConstructor => Some(lookup.struct_def(id)?.constructor_signature()),
        FunctionLikeType::InstanceConstructor => {
            Some(lookup.interface_def(id)?.instance_constructor_signature())
        }
        FunctionLikeType::AdapterConstructor => {
            Some(lookup.adapter_interface(id)?.adapter_constructor_signature())
        }
        FunctionLikeType::UnionOptionConstructor => {
            let union = lookup.union_def(&id.parent()?)?;
            let option = union.options.get(union.option_index(id.last_segment())?)?;
            Some(union.option_constructor_signature(option))
        }
        FunctionLikeType::UnionWhenFunction => Some(lookup.union_def(&id.parent()?)?.when_signature()),
        FunctionLikeType::UnionType | FunctionLikeType::OpaqueType => None,
    }
}
