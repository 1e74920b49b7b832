//! The native library: module `semlang:lang`, version `0`.
//!
//! Declares the signatures of every native function, the native struct
//! `Sequence`, and the opaque types `ListBuilder` and `Unicode.String`.
//! Implementations live in the interpreter and are keyed by the same ids.

use std::sync::{Arc, OnceLock};

use rustc_hash::FxHashMap;
use sem_ir::typed::{Member, OpaqueType, Struct, TypeSignature};
use sem_ir::{EntityId, FunctionType, ModuleName, ModuleUniqueId, Type, TypeClass, TypeParameter};

pub const NATIVE_GROUP: &str = "semlang";
pub const NATIVE_MODULE: &str = "lang";
pub const NATIVE_VERSION: &str = "0";

pub fn native_module_id() -> ModuleUniqueId {
    ModuleUniqueId::new(
        ModuleName {
            group: NATIVE_GROUP.to_string(),
            module: NATIVE_MODULE.to_string(),
        },
        NATIVE_VERSION,
    )
}

pub fn is_native_module(id: &ModuleUniqueId) -> bool {
    id.name.group == NATIVE_GROUP
        && id.name.module == NATIVE_MODULE
        && id.fake0_version == NATIVE_VERSION
}

/// Everything the native module declares.
#[derive(Debug)]
pub struct NativeLibrary {
    pub module_id: ModuleUniqueId,
    pub functions: FxHashMap<EntityId, TypeSignature>,
    pub structs: FxHashMap<EntityId, Arc<Struct>>,
    pub opaque_types: FxHashMap<EntityId, OpaqueType>,
}

pub fn native_library() -> &'static NativeLibrary {
    static LIBRARY: OnceLock<NativeLibrary> = OnceLock::new();
    LIBRARY.get_or_init(NativeLibrary::build)
}

fn param(name: &str) -> Type {
    Type::Parameter(TypeParameter::unconstrained(name))
}

fn function(args: Vec<Type>, output: Type) -> Type {
    Type::Function(FunctionType::create(false, Vec::new(), args, output))
}

impl NativeLibrary {
    fn build() -> Self {
        let module_id = native_module_id();
        let mut library = NativeLibrary {
            module_id: module_id.clone(),
            functions: FxHashMap::default(),
            structs: FxHashMap::default(),
            opaque_types: FxHashMap::default(),
        };

        let list_builder = OpaqueType {
            id: EntityId::of("ListBuilder"),
            module: module_id.clone(),
            type_parameters: vec![TypeParameter::unconstrained("T")],
            is_reference: true,
        };
        let string = OpaqueType {
            id: EntityId::of("Unicode.String"),
            module: module_id.clone(),
            type_parameters: Vec::new(),
            is_reference: false,
        };
        let sequence = Struct {
            id: EntityId::of("Sequence"),
            module: module_id,
            type_parameters: vec![TypeParameter::unconstrained("T")],
            members: vec![
                Member {
                    name: "base".to_string(),
                    ty: param("T"),
                },
                Member {
                    name: "successor".to_string(),
                    ty: function(vec![param("T")], param("T")),
                },
            ],
            requires: None,
            annotations: Vec::new(),
        };

        library.add_boolean_functions();
        library.add_integer_functions();
        library.add_natural_functions();
        library.add_list_functions();
        library.add_try_functions();
        library.add_sequence_functions(sequence.named_type());
        library.add_list_builder_functions(&list_builder);
        library.add(
            "Data.equals",
            &[("T", Some(TypeClass::Data))],
            vec![param("T"), param("T")],
            Type::Boolean,
        );
        library.add(
            "Unicode.String.length",
            &[],
            vec![string.named_type()],
            Type::Natural,
        );

        library
            .structs
            .insert(sequence.id.clone(), Arc::new(sequence));
        library
            .opaque_types
            .insert(list_builder.id.clone(), list_builder);
        library.opaque_types.insert(string.id.clone(), string);
        library
    }

    fn add(
        &mut self,
        id: &str,
        type_parameters: &[(&str, Option<TypeClass>)],
        argument_types: Vec<Type>,
        output_type: Type,
    ) {
        let id = EntityId::of(id);
        let type_parameters = type_parameters
            .iter()
            .map(|(name, class)| TypeParameter::new(*name, *class))
            .collect();
        self.functions.insert(
            id.clone(),
            TypeSignature::new(id, type_parameters, argument_types, output_type),
        );
    }

    fn add_boolean_functions(&mut self) {
        self.add("Boolean.not", &[], vec![Type::Boolean], Type::Boolean);
        for name in ["Boolean.and", "Boolean.or"] {
            self.add(name, &[], vec![Type::Boolean, Type::Boolean], Type::Boolean);
        }
    }

    fn add_integer_functions(&mut self) {
        let pair = || vec![Type::Integer, Type::Integer];
        for name in ["Integer.plus", "Integer.minus", "Integer.times"] {
            self.add(name, &[], pair(), Type::Integer);
        }
        for name in ["Integer.dividedBy", "Integer.modulo"] {
            self.add(name, &[], pair(), Type::try_of(Type::Integer));
        }
        for name in ["Integer.equals", "Integer.lessThan", "Integer.greaterThan"] {
            self.add(name, &[], pair(), Type::Boolean);
        }
    }

    fn add_natural_functions(&mut self) {
        let pair = || vec![Type::Natural, Type::Natural];
        self.add(
            "Natural",
            &[],
            vec![Type::Integer],
            Type::try_of(Type::Natural),
        );
        self.add("Natural.toInteger", &[], vec![Type::Natural], Type::Integer);
        for name in ["Natural.plus", "Natural.times"] {
            self.add(name, &[], pair(), Type::Natural);
        }
        self.add("Natural.dividedBy", &[], pair(), Type::try_of(Type::Natural));
        for name in ["Natural.equals", "Natural.lessThan"] {
            self.add(name, &[], pair(), Type::Boolean);
        }
        self.add(
            "Natural.max",
            &[],
            vec![Type::list_of(Type::Natural)],
            Type::try_of(Type::Natural),
        );
    }

    fn add_list_functions(&mut self) {
        let t = || param("T");
        let u = || param("U");
        let list_t = || Type::list_of(param("T"));
        let list_u = || Type::list_of(param("U"));
        let tu: &[(&str, Option<TypeClass>)] = &[("T", None), ("U", None)];

        self.add("List.append", &[("T", None)], vec![list_t(), t()], list_t());
        self.add("List.appendFront", &[("T", None)], vec![list_t(), t()], list_t());
        self.add(
            "List.concatenate",
            &[("T", None)],
            vec![Type::list_of(list_t())],
            list_t(),
        );
        self.add(
            "List.subList",
            &[("T", None)],
            vec![list_t(), Type::Natural, Type::Natural],
            Type::try_of(list_t()),
        );
        self.add("List.map", tu, vec![list_t(), function(vec![t()], u())], list_u());
        self.add(
            "List.flatMap",
            tu,
            vec![list_t(), function(vec![t()], list_u())],
            list_u(),
        );
        self.add(
            "List.filter",
            &[("T", None)],
            vec![list_t(), function(vec![t()], Type::Boolean)],
            list_t(),
        );
        self.add(
            "List.reduce",
            tu,
            vec![list_t(), u(), function(vec![u(), t()], u())],
            u(),
        );
        self.add("List.size", &[("T", None)], vec![list_t()], Type::Natural);
        self.add(
            "List.get",
            &[("T", None)],
            vec![list_t(), Type::Natural],
            Type::try_of(t()),
        );
        self.add("List.last", &[("T", None)], vec![list_t()], Type::try_of(t()));
    }

    fn add_try_functions(&mut self) {
        let t = || param("T");
        let u = || param("U");
        let try_t = || Type::try_of(param("T"));
        let try_u = || Type::try_of(param("U"));
        let tu: &[(&str, Option<TypeClass>)] = &[("T", None), ("U", None)];

        self.add("Try.success", &[("T", None)], vec![t()], try_t());
        self.add("Try.failure", &[("T", None)], Vec::new(), try_t());
        self.add("Try.assume", &[("T", None)], vec![try_t()], t());
        self.add("Try.isSuccess", &[("T", None)], vec![try_t()], Type::Boolean);
        self.add("Try.map", tu, vec![try_t(), function(vec![t()], u())], try_u());
        self.add(
            "Try.flatMap",
            tu,
            vec![try_t(), function(vec![t()], try_u())],
            try_u(),
        );
        self.add("Try.orElse", &[("T", None)], vec![try_t(), t()], t());
    }

    fn add_sequence_functions(&mut self, sequence_type: Type) {
        self.add(
            "Sequence.get",
            &[("T", None)],
            vec![sequence_type.clone(), Type::Natural],
            param("T"),
        );
        self.add(
            "Sequence.first",
            &[("T", None)],
            vec![sequence_type, function(vec![param("T")], Type::Boolean)],
            param("T"),
        );
    }

    fn add_list_builder_functions(&mut self, list_builder: &OpaqueType) {
        let builder = list_builder.named_type();
        self.add("ListBuilder.create", &[("T", None)], Vec::new(), builder.clone());
        self.add(
            "ListBuilder.append",
            &[("T", None)],
            vec![builder.clone(), param("T")],
            builder.clone(),
        );
        self.add(
            "ListBuilder.appendAll",
            &[("T", None)],
            vec![builder.clone(), Type::list_of(param("T"))],
            builder.clone(),
        );
        self.add(
            "ListBuilder.build",
            &[("T", None)],
            vec![builder],
            Type::list_of(param("T")),
        );
    }

    pub fn string_type(&self) -> Option<Type> {
        self.opaque_types
            .get(&EntityId::of("Unicode.String"))
            .map(OpaqueType::named_type)
    }
}
