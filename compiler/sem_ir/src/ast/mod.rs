//! The unchecked syntax tree handed over by the parser.
//!
//! Every node mirrors source structure; nothing here is resolved or typed.
//! The constructor helpers build nodes without locations, for embedders
//! that synthesize programs and for tests.

use crate::ids::{EntityId, EntityRef};
use crate::span::Location;
use crate::types::{TypeParameter, UnvalidatedType};

/// An argument of a function, method, or inline function.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct UnvalidatedArgument {
    pub name: String,
    pub ty: UnvalidatedType,
    pub location: Option<Location>,
}

impl UnvalidatedArgument {
    pub fn new(name: impl Into<String>, ty: UnvalidatedType) -> Self {
        UnvalidatedArgument {
            name: name.into(),
            ty,
            location: None,
        }
    }
}

/// Argument of an annotation: a literal or a bracketed list.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum AnnotationArgument {
    Literal(String),
    List(Vec<AnnotationArgument>),
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Annotation {
    pub name: EntityId,
    pub values: Vec<AnnotationArgument>,
}

impl Annotation {
    pub fn export() -> Self {
        Annotation {
            name: EntityId::of("Export"),
            values: Vec::new(),
        }
    }

    /// `@Test([args...], expected)`
    pub fn test(args: &[&str], expected: &str) -> Self {
        Annotation {
            name: EntityId::of("Test"),
            values: vec![
                AnnotationArgument::List(
                    args.iter()
                        .map(|a| AnnotationArgument::Literal((*a).to_string()))
                        .collect(),
                ),
                AnnotationArgument::Literal(expected.to_string()),
            ],
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Expression {
    Variable {
        name: String,
        location: Option<Location>,
    },
    Literal {
        ty: UnvalidatedType,
        literal: String,
        location: Option<Location>,
    },
    ListLiteral {
        contents: Vec<Expression>,
        chosen_parameter: UnvalidatedType,
        location: Option<Location>,
    },
    /// Member access on a struct, or method access on an interface value.
    Follow {
        structure: Box<Expression>,
        name: String,
        location: Option<Location>,
    },
    NamedFunctionCall {
        function_ref: EntityRef,
        arguments: Vec<Expression>,
        chosen_parameters: Vec<UnvalidatedType>,
        location: Option<Location>,
    },
    ExpressionFunctionCall {
        function: Box<Expression>,
        arguments: Vec<Expression>,
        chosen_parameters: Vec<UnvalidatedType>,
        location: Option<Location>,
    },
    /// Partial application; `None` slots stay open.
    NamedFunctionBinding {
        function_ref: EntityRef,
        bindings: Vec<Option<Expression>>,
        chosen_parameters: Vec<Option<UnvalidatedType>>,
        location: Option<Location>,
    },
    ExpressionFunctionBinding {
        function: Box<Expression>,
        bindings: Vec<Option<Expression>>,
        chosen_parameters: Vec<Option<UnvalidatedType>>,
        location: Option<Location>,
    },
    IfThen {
        condition: Box<Expression>,
        then_block: Block,
        else_block: Block,
        location: Option<Location>,
    },
    /// A closure literal.
    InlineFunction {
        arguments: Vec<UnvalidatedArgument>,
        return_type: UnvalidatedType,
        block: Block,
        location: Option<Location>,
    },
}

impl Expression {
    pub fn var(name: &str) -> Self {
        Expression::Variable {
            name: name.to_string(),
            location: None,
        }
    }

    pub fn literal(ty: UnvalidatedType, literal: &str) -> Self {
        Expression::Literal {
            ty,
            literal: literal.to_string(),
            location: None,
        }
    }

    pub fn integer(literal: &str) -> Self {
        Self::literal(UnvalidatedType::Integer, literal)
    }

    pub fn boolean(value: bool) -> Self {
        Self::literal(UnvalidatedType::Boolean, if value { "true" } else { "false" })
    }

    pub fn list(chosen_parameter: UnvalidatedType, contents: Vec<Expression>) -> Self {
        Expression::ListLiteral {
            contents,
            chosen_parameter,
            location: None,
        }
    }

    pub fn follow(structure: Expression, name: &str) -> Self {
        Expression::Follow {
            structure: Box::new(structure),
            name: name.to_string(),
            location: None,
        }
    }

    pub fn call(function: &str, arguments: Vec<Expression>) -> Self {
        Self::call_with(function, Vec::new(), arguments)
    }

    pub fn call_with(
        function: &str,
        chosen_parameters: Vec<UnvalidatedType>,
        arguments: Vec<Expression>,
    ) -> Self {
        Expression::NamedFunctionCall {
            function_ref: EntityRef::of(function),
            arguments,
            chosen_parameters,
            location: None,
        }
    }

    pub fn call_expression(function: Expression, arguments: Vec<Expression>) -> Self {
        Expression::ExpressionFunctionCall {
            function: Box::new(function),
            arguments,
            chosen_parameters: Vec::new(),
            location: None,
        }
    }

    pub fn bind(function: &str, bindings: Vec<Option<Expression>>) -> Self {
        Self::bind_with(function, Vec::new(), bindings)
    }

    pub fn bind_with(
        function: &str,
        chosen_parameters: Vec<Option<UnvalidatedType>>,
        bindings: Vec<Option<Expression>>,
    ) -> Self {
        Expression::NamedFunctionBinding {
            function_ref: EntityRef::of(function),
            bindings,
            chosen_parameters,
            location: None,
        }
    }

    pub fn bind_expression(function: Expression, bindings: Vec<Option<Expression>>) -> Self {
        Expression::ExpressionFunctionBinding {
            function: Box::new(function),
            bindings,
            chosen_parameters: Vec::new(),
            location: None,
        }
    }

    pub fn if_then(condition: Expression, then_block: Block, else_block: Block) -> Self {
        Expression::IfThen {
            condition: Box::new(condition),
            then_block,
            else_block,
            location: None,
        }
    }

    pub fn inline_function(
        arguments: Vec<UnvalidatedArgument>,
        return_type: UnvalidatedType,
        block: Block,
    ) -> Self {
        Expression::InlineFunction {
            arguments,
            return_type,
            block,
            location: None,
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            Expression::Variable { location, .. }
            | Expression::Literal { location, .. }
            | Expression::ListLiteral { location, .. }
            | Expression::Follow { location, .. }
            | Expression::NamedFunctionCall { location, .. }
            | Expression::ExpressionFunctionCall { location, .. }
            | Expression::NamedFunctionBinding { location, .. }
            | Expression::ExpressionFunctionBinding { location, .. }
            | Expression::IfThen { location, .. }
            | Expression::InlineFunction { location, .. } => location.as_ref(),
        }
    }

    /// Attach a source location.
    #[must_use]
    pub fn at(mut self, at: Location) -> Self {
        match &mut self {
            Expression::Variable { location, .. }
            | Expression::Literal { location, .. }
            | Expression::ListLiteral { location, .. }
            | Expression::Follow { location, .. }
            | Expression::NamedFunctionCall { location, .. }
            | Expression::ExpressionFunctionCall { location, .. }
            | Expression::NamedFunctionBinding { location, .. }
            | Expression::ExpressionFunctionBinding { location, .. }
            | Expression::IfThen { location, .. }
            | Expression::InlineFunction { location, .. } => *location = Some(at),
        }
        self
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Statement {
    Assignment {
        name: String,
        ty: Option<UnvalidatedType>,
        expression: Expression,
        location: Option<Location>,
    },
    Bare {
        expression: Expression,
    },
}

impl Statement {
    pub fn assign(name: &str, expression: Expression) -> Self {
        Statement::Assignment {
            name: name.to_string(),
            ty: None,
            expression,
            location: None,
        }
    }

    pub fn assign_typed(name: &str, ty: UnvalidatedType, expression: Expression) -> Self {
        Statement::Assignment {
            name: name.to_string(),
            ty: Some(ty),
            expression,
            location: None,
        }
    }

    pub fn bare(expression: Expression) -> Self {
        Statement::Bare { expression }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            Statement::Assignment { location, .. } => location.as_ref(),
            Statement::Bare { expression } => expression.location(),
        }
    }
}

/// Statements of a block; the last one supplies the block's value.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub location: Option<Location>,
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Block {
            statements,
            location: None,
        }
    }

    /// A block consisting of a single expression.
    pub fn of(expression: Expression) -> Self {
        Self::new(vec![Statement::bare(expression)])
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Function {
    pub id: EntityId,
    pub type_parameters: Vec<TypeParameter>,
    pub arguments: Vec<UnvalidatedArgument>,
    pub return_type: UnvalidatedType,
    pub block: Block,
    pub annotations: Vec<Annotation>,
    pub id_location: Option<Location>,
}

impl Function {
    pub fn new(
        id: &str,
        arguments: Vec<UnvalidatedArgument>,
        return_type: UnvalidatedType,
        block: Block,
    ) -> Self {
        Function {
            id: EntityId::of(id),
            type_parameters: Vec::new(),
            arguments,
            return_type,
            block,
            annotations: Vec::new(),
            id_location: None,
        }
    }

    #[must_use]
    pub fn with_type_parameters(mut self, type_parameters: Vec<TypeParameter>) -> Self {
        self.type_parameters = type_parameters;
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.id_location = Some(location);
        self
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct UnvalidatedMember {
    pub name: String,
    pub ty: UnvalidatedType,
}

impl UnvalidatedMember {
    pub fn new(name: &str, ty: UnvalidatedType) -> Self {
        UnvalidatedMember {
            name: name.to_string(),
            ty,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct UnvalidatedStruct {
    pub id: EntityId,
    pub type_parameters: Vec<TypeParameter>,
    pub members: Vec<UnvalidatedMember>,
    pub requires: Option<Block>,
    pub annotations: Vec<Annotation>,
    pub id_location: Option<Location>,
}

impl UnvalidatedStruct {
    pub fn new(id: &str, members: Vec<UnvalidatedMember>) -> Self {
        UnvalidatedStruct {
            id: EntityId::of(id),
            type_parameters: Vec::new(),
            members,
            requires: None,
            annotations: Vec::new(),
            id_location: None,
        }
    }

    #[must_use]
    pub fn with_type_parameters(mut self, type_parameters: Vec<TypeParameter>) -> Self {
        self.type_parameters = type_parameters;
        self
    }

    #[must_use]
    pub fn with_requires(mut self, requires: Block) -> Self {
        self.requires = Some(requires);
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.id_location = Some(location);
        self
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct UnvalidatedMethod {
    pub name: String,
    pub type_parameters: Vec<TypeParameter>,
    pub arguments: Vec<UnvalidatedArgument>,
    pub return_type: UnvalidatedType,
}

impl UnvalidatedMethod {
    pub fn new(
        name: &str,
        arguments: Vec<UnvalidatedArgument>,
        return_type: UnvalidatedType,
    ) -> Self {
        UnvalidatedMethod {
            name: name.to_string(),
            type_parameters: Vec::new(),
            arguments,
            return_type,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct UnvalidatedInterface {
    pub id: EntityId,
    pub type_parameters: Vec<TypeParameter>,
    pub methods: Vec<UnvalidatedMethod>,
    pub annotations: Vec<Annotation>,
    pub id_location: Option<Location>,
}

impl UnvalidatedInterface {
    pub fn new(id: &str, methods: Vec<UnvalidatedMethod>) -> Self {
        UnvalidatedInterface {
            id: EntityId::of(id),
            type_parameters: Vec::new(),
            methods,
            annotations: Vec::new(),
            id_location: None,
        }
    }

    #[must_use]
    pub fn with_type_parameters(mut self, type_parameters: Vec<TypeParameter>) -> Self {
        self.type_parameters = type_parameters;
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct UnvalidatedOption {
    pub name: String,
    pub ty: Option<UnvalidatedType>,
    pub location: Option<Location>,
}

impl UnvalidatedOption {
    pub fn new(name: &str, ty: Option<UnvalidatedType>) -> Self {
        UnvalidatedOption {
            name: name.to_string(),
            ty,
            location: None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct UnvalidatedUnion {
    pub id: EntityId,
    pub type_parameters: Vec<TypeParameter>,
    pub options: Vec<UnvalidatedOption>,
    pub annotations: Vec<Annotation>,
    pub id_location: Option<Location>,
}

impl UnvalidatedUnion {
    pub fn new(id: &str, options: Vec<UnvalidatedOption>) -> Self {
        UnvalidatedUnion {
            id: EntityId::of(id),
            type_parameters: Vec::new(),
            options,
            annotations: Vec::new(),
            id_location: None,
        }
    }

    #[must_use]
    pub fn with_type_parameters(mut self, type_parameters: Vec<TypeParameter>) -> Self {
        self.type_parameters = type_parameters;
        self
    }
}

/// Everything the parser produced for one module.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct RawContext {
    pub functions: Vec<Function>,
    pub structs: Vec<UnvalidatedStruct>,
    pub interfaces: Vec<UnvalidatedInterface>,
    pub unions: Vec<UnvalidatedUnion>,
}
