//! The typed tree.
//!
//! Produced only by the validator. Every expression carries its resolved
//! [`Type`] and an [`AliasType`]; every named call or binding carries the
//! [`ResolvedEntityRef`] the interpreter dispatches on.

mod entities;

use std::sync::Arc;

use crate::ids::{EntityRef, ResolvedEntityRef};
use crate::types::Type;

pub use entities::{
    Argument, Interface, Member, Method, OpaqueType, Struct, TypeSignature, Union, UnionOption,
    ValidatedFunction,
};

/// Whether an expression's value may share identity with a live binding.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AliasType {
    NotAliased,
    PossiblyAliased,
}

impl AliasType {
    /// `NotAliased` only when both sides are.
    #[must_use]
    pub fn join(self, other: AliasType) -> AliasType {
        if self == AliasType::NotAliased && other == AliasType::NotAliased {
            AliasType::NotAliased
        } else {
            AliasType::PossiblyAliased
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TypedExpression {
    pub ty: Type,
    pub alias_type: AliasType,
    pub kind: TypedExprKind,
}

impl TypedExpression {
    pub fn new(ty: Type, alias_type: AliasType, kind: TypedExprKind) -> Self {
        TypedExpression {
            ty,
            alias_type,
            kind,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TypedExprKind {
    Variable {
        name: String,
    },
    /// The literal's target type is the expression's type.
    Literal {
        literal: String,
    },
    ListLiteral {
        contents: Vec<TypedExpression>,
        chosen_parameter: Type,
    },
    Follow {
        structure: Box<TypedExpression>,
        name: String,
    },
    NamedFunctionCall {
        function_ref: EntityRef,
        resolved_ref: ResolvedEntityRef,
        arguments: Vec<TypedExpression>,
        chosen_parameters: Vec<Type>,
    },
    ExpressionFunctionCall {
        function: Box<TypedExpression>,
        arguments: Vec<TypedExpression>,
        chosen_parameters: Vec<Type>,
    },
    NamedFunctionBinding {
        function_ref: EntityRef,
        resolved_ref: ResolvedEntityRef,
        bindings: Vec<Option<TypedExpression>>,
        chosen_parameters: Vec<Option<Type>>,
    },
    ExpressionFunctionBinding {
        function: Box<TypedExpression>,
        bindings: Vec<Option<TypedExpression>>,
        chosen_parameters: Vec<Option<Type>>,
    },
    IfThen {
        condition: Box<TypedExpression>,
        then_block: Box<TypedBlock>,
        else_block: Box<TypedBlock>,
    },
    InlineFunction(Arc<InlineFunctionDef>),
}

/// A validated closure literal.
///
/// `bound_vars` lists captured variables in the enclosing scope's
/// declaration order. A lifted free function takes them as trailing
/// arguments in exactly this order.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct InlineFunctionDef {
    pub arguments: Vec<Argument>,
    pub bound_vars: Vec<Argument>,
    pub return_type: Type,
    pub block: TypedBlock,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ValidatedStatement {
    Assignment {
        name: String,
        ty: Type,
        expression: TypedExpression,
    },
    Bare(TypedExpression),
}

/// A block whose value, type, and alias classification come from
/// `last_statement`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TypedBlock {
    pub ty: Type,
    pub statements: Vec<ValidatedStatement>,
    pub last_statement: TypedExpression,
}

impl TypedBlock {
    pub fn new(statements: Vec<ValidatedStatement>, last_statement: TypedExpression) -> Self {
        TypedBlock {
            ty: last_statement.ty.clone(),
            statements,
            last_statement,
        }
    }

    pub fn alias_type(&self) -> AliasType {
        self.last_statement.alias_type
    }
}
