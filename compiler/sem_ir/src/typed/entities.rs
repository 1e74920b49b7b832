//! Validated top-level entities and the signatures they contribute to the
//! function namespace.

use crate::ast::Annotation;
use crate::ids::{EntityId, ModuleUniqueId, ResolvedEntityRef};
use crate::types::{FunctionType, NamedType, Type, TypeParameter};

use super::TypedBlock;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Argument {
    pub name: String,
    pub ty: Type,
}

impl Argument {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Argument {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Member {
    pub name: String,
    pub ty: Type,
}

/// A callable signature whose types refer to `type_parameters` by name.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TypeSignature {
    pub id: EntityId,
    pub type_parameters: Vec<TypeParameter>,
    pub argument_types: Vec<Type>,
    pub output_type: Type,
}

impl TypeSignature {
    pub fn new(
        id: EntityId,
        type_parameters: Vec<TypeParameter>,
        argument_types: Vec<Type>,
        output_type: Type,
    ) -> Self {
        TypeSignature {
            id,
            type_parameters,
            argument_types,
            output_type,
        }
    }

    pub fn function_type(&self) -> FunctionType {
        FunctionType::from_declaration(
            &self.type_parameters,
            &self.argument_types,
            &self.output_type,
        )
    }
}

fn declared_type(
    module: &ModuleUniqueId,
    id: &EntityId,
    type_parameters: &[TypeParameter],
    is_reference: bool,
) -> Type {
    Type::Named(NamedType {
        reference: ResolvedEntityRef::new(module.clone(), id.clone()),
        original_ref: id.to_entity_ref(),
        is_reference,
        parameters: type_parameters
            .iter()
            .cloned()
            .map(Type::Parameter)
            .collect(),
    })
}

/// `base`, then `base2`, `base3`, ... until unused.
fn unused_parameter_name(base: &str, taken: &[TypeParameter]) -> String {
    if taken.iter().all(|p| p.name != base) {
        return base.to_string();
    }
    (2..)
        .map(|i| format!("{base}{i}"))
        .find(|candidate| taken.iter().all(|p| p.name != *candidate))
        .unwrap_or_else(|| base.to_string())
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Struct {
    pub id: EntityId,
    pub module: ModuleUniqueId,
    pub type_parameters: Vec<TypeParameter>,
    pub members: Vec<Member>,
    /// Must evaluate to `Boolean`; when present, construction yields `Try`.
    pub requires: Option<TypedBlock>,
    pub annotations: Vec<Annotation>,
}

impl Struct {
    pub fn resolved_ref(&self) -> ResolvedEntityRef {
        ResolvedEntityRef::new(self.module.clone(), self.id.clone())
    }

    /// The struct's type applied to its own parameters.
    pub fn named_type(&self) -> Type {
        declared_type(&self.module, &self.id, &self.type_parameters, false)
    }

    pub fn member_index(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name == name)
    }

    pub fn constructor_signature(&self) -> TypeSignature {
        let output_type = if self.requires.is_some() {
            Type::try_of(self.named_type())
        } else {
            self.named_type()
        };
        TypeSignature::new(
            self.id.clone(),
            self.type_parameters.clone(),
            self.members.iter().map(|m| m.ty.clone()).collect(),
            output_type,
        )
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Method {
    pub name: String,
    pub type_parameters: Vec<TypeParameter>,
    pub arguments: Vec<Argument>,
    pub return_type: Type,
}

impl Method {
    /// The method's type as seen on an interface instance.
    pub fn function_type(&self) -> FunctionType {
        let arg_types: Vec<Type> = self.arguments.iter().map(|a| a.ty.clone()).collect();
        FunctionType::from_declaration(&self.type_parameters, &arg_types, &self.return_type)
    }

    /// The method's type inside the adapter struct, taking the data value
    /// as an extra first argument.
    pub fn adapter_member_type(&self, data_type: &Type) -> Type {
        let arg_types: Vec<Type> = std::iter::once(data_type.clone())
            .chain(self.arguments.iter().map(|a| a.ty.clone()))
            .collect();
        Type::Function(FunctionType::from_declaration(
            &self.type_parameters,
            &arg_types,
            &self.return_type,
        ))
    }
}

/// An interface and its derived adapter struct.
///
/// An instance is built from a data value plus an adapter whose members
/// implement each method with the data value as an extra first argument.
/// The adapter's type parameters are the data parameter followed by the
/// interface's own.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Interface {
    pub id: EntityId,
    pub module: ModuleUniqueId,
    pub type_parameters: Vec<TypeParameter>,
    pub methods: Vec<Method>,
    pub annotations: Vec<Annotation>,
}

impl Interface {
    pub fn resolved_ref(&self) -> ResolvedEntityRef {
        ResolvedEntityRef::new(self.module.clone(), self.id.clone())
    }

    pub fn adapter_id(&self) -> EntityId {
        self.id.child("Adapter")
    }

    pub fn adapter_ref(&self) -> ResolvedEntityRef {
        ResolvedEntityRef::new(self.module.clone(), self.adapter_id())
    }

    pub fn named_type(&self) -> Type {
        declared_type(&self.module, &self.id, &self.type_parameters, false)
    }

    pub fn method_index(&self, name: &str) -> Option<usize> {
        self.methods.iter().position(|m| m.name == name)
    }

    /// `A`, or `A2`, `A3`, ... when the interface already uses `A`.
    pub fn data_type_parameter(&self) -> TypeParameter {
        TypeParameter::unconstrained(unused_parameter_name("A", &self.type_parameters))
    }

    fn adapter_type_parameters(&self) -> Vec<TypeParameter> {
        std::iter::once(self.data_type_parameter())
            .chain(self.type_parameters.iter().cloned())
            .collect()
    }

    pub fn adapter_struct(&self) -> Struct {
        let data_type = Type::Parameter(self.data_type_parameter());
        Struct {
            id: self.adapter_id(),
            module: self.module.clone(),
            type_parameters: self.adapter_type_parameters(),
            members: self
                .methods
                .iter()
                .map(|method| Member {
                    name: method.name.clone(),
                    ty: method.adapter_member_type(&data_type),
                })
                .collect(),
            requires: None,
            annotations: Vec::new(),
        }
    }

    /// `<A, params>(A, Adapter<A, params>) -> Interface<params>`
    pub fn instance_constructor_signature(&self) -> TypeSignature {
        let all_parameters = self.adapter_type_parameters();
        let adapter_type = declared_type(&self.module, &self.adapter_id(), &all_parameters, false);
        TypeSignature::new(
            self.id.clone(),
            all_parameters,
            vec![Type::Parameter(self.data_type_parameter()), adapter_type],
            self.named_type(),
        )
    }

    /// `<A, params>(method implementations...) -> Adapter<A, params>`
    pub fn adapter_constructor_signature(&self) -> TypeSignature {
        let adapter = self.adapter_struct();
        let output_type = adapter.named_type();
        TypeSignature::new(
            adapter.id,
            adapter.type_parameters,
            adapter.members.into_iter().map(|m| m.ty).collect(),
            output_type,
        )
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct UnionOption {
    pub name: String,
    pub ty: Option<Type>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Union {
    pub id: EntityId,
    pub module: ModuleUniqueId,
    pub type_parameters: Vec<TypeParameter>,
    pub options: Vec<UnionOption>,
    pub annotations: Vec<Annotation>,
}

impl Union {
    pub fn resolved_ref(&self) -> ResolvedEntityRef {
        ResolvedEntityRef::new(self.module.clone(), self.id.clone())
    }

    pub fn named_type(&self) -> Type {
        declared_type(&self.module, &self.id, &self.type_parameters, false)
    }

    pub fn option_index(&self, name: &str) -> Option<usize> {
        self.options.iter().position(|o| o.name == name)
    }

    pub fn when_id(&self) -> EntityId {
        self.id.child("when")
    }

    /// `Union.option`: takes the option's value, if it has one.
    pub fn option_constructor_signature(&self, option: &UnionOption) -> TypeSignature {
        TypeSignature::new(
            self.id.child(&option.name),
            self.type_parameters.clone(),
            option.ty.iter().cloned().collect(),
            self.named_type(),
        )
    }

    /// `Union.when`: the union value plus one function per option, all
    /// producing a common output type chosen by an extra type parameter.
    pub fn when_signature(&self) -> TypeSignature {
        let output = TypeParameter::unconstrained(unused_parameter_name(
            "Result",
            &self.type_parameters,
        ));
        let output_type = Type::Parameter(output.clone());
        let mut type_parameters = self.type_parameters.clone();
        type_parameters.push(output);

        let mut argument_types = vec![self.named_type()];
        argument_types.extend(self.options.iter().map(|option| {
            Type::Function(FunctionType::create(
                false,
                Vec::new(),
                option.ty.iter().cloned().collect(),
                output_type.clone(),
            ))
        }));
        TypeSignature::new(self.when_id(), type_parameters, argument_types, output_type)
    }
}

/// A native named type that is neither a struct nor an interface.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OpaqueType {
    pub id: EntityId,
    pub module: ModuleUniqueId,
    pub type_parameters: Vec<TypeParameter>,
    pub is_reference: bool,
}

impl OpaqueType {
    pub fn resolved_ref(&self) -> ResolvedEntityRef {
        ResolvedEntityRef::new(self.module.clone(), self.id.clone())
    }

    pub fn named_type(&self) -> Type {
        declared_type(
            &self.module,
            &self.id,
            &self.type_parameters,
            self.is_reference,
        )
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ValidatedFunction {
    pub id: EntityId,
    pub module: ModuleUniqueId,
    pub type_parameters: Vec<TypeParameter>,
    pub arguments: Vec<Argument>,
    pub return_type: Type,
    pub block: TypedBlock,
    pub annotations: Vec<Annotation>,
}

impl ValidatedFunction {
    pub fn resolved_ref(&self) -> ResolvedEntityRef {
        ResolvedEntityRef::new(self.module.clone(), self.id.clone())
    }

    pub fn signature(&self) -> TypeSignature {
        TypeSignature::new(
            self.id.clone(),
            self.type_parameters.clone(),
            self.arguments.iter().map(|a| a.ty.clone()).collect(),
            self.return_type.clone(),
        )
    }

    pub fn function_type(&self) -> FunctionType {
        self.signature().function_type()
    }
}
