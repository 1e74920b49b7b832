//! Runtime values.
//!
//! A [`Value`] is whatever an expression of a validated module evaluates
//! to. Integers and Naturals have arbitrary precision. Values are plain
//! data except for two cases:
//!
//! - [`Value::Binding`]: a function value, possibly partially applied.
//!   Open argument slots are `None` and are filled left to right when the
//!   binding is called or bound again.
//! - [`Value::ListBuilder`]: the only mutable value. Copies share the same
//!   buffer, so appending through one handle is visible through all of them.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use num_bigint::{BigInt, BigUint};
use sem_ir::typed::{InlineFunctionDef, Interface, Struct, Union};
use sem_ir::{ResolvedEntityRef, Type};
use smallvec::SmallVec;

use crate::errors::{type_mismatch, EvalError};

/// Argument slots of a function binding; `None` is an open slot.
pub type Slots = SmallVec<[Option<Value>; 4]>;

/// What a function binding calls once every slot is filled.
#[derive(Clone, Debug)]
pub enum BindingTarget {
    /// A function-like entity: native or user function, constructor,
    /// union option or `when`.
    Named(ResolvedEntityRef),
    /// A closure. Its slots are the explicit arguments followed by the
    /// captured variables, in capture order.
    Inline(Arc<InlineFunctionDef>),
}

impl PartialEq for BindingTarget {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (BindingTarget::Named(a), BindingTarget::Named(b)) => a == b,
            (BindingTarget::Inline(a), BindingTarget::Inline(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionBinding {
    pub target: BindingTarget,
    pub slots: Slots,
    pub chosen_parameters: Vec<Option<Type>>,
}

impl FunctionBinding {
    pub fn new(target: BindingTarget, slots: Slots, chosen_parameters: Vec<Option<Type>>) -> Self {
        FunctionBinding {
            target,
            slots,
            chosen_parameters,
        }
    }

    pub fn open_slots(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }

    /// Fill the open slots, left to right, with `values`; a `None` value
    /// keeps its slot open. Returns `None` when the counts differ.
    pub fn fill(&self, values: Vec<Option<Value>>) -> Option<FunctionBinding> {
        if values.len() != self.open_slots() {
            return None;
        }
        let mut values = values.into_iter();
        let slots = self
            .slots
            .iter()
            .map(|slot| match slot {
                Some(value) => Some(value.clone()),
                None => values.next().flatten(),
            })
            .collect();
        Some(FunctionBinding {
            target: self.target.clone(),
            slots,
            chosen_parameters: self.chosen_parameters.clone(),
        })
    }

    /// The argument list, if no slot is open.
    pub fn into_arguments(self) -> Option<Vec<Value>> {
        self.slots.into_iter().collect()
    }
}

#[derive(Clone, Debug)]
pub enum Value {
    Integer(BigInt),
    Natural(BigUint),
    Boolean(bool),
    List(Vec<Value>),
    /// `Some` is a success, `None` a failure.
    Try(Option<Box<Value>>),
    String(String),
    Struct {
        def: Arc<Struct>,
        members: Vec<Value>,
    },
    /// An interface instance. Each method binding already holds the data
    /// value in its first slot.
    Instance {
        def: Arc<Interface>,
        methods: Vec<FunctionBinding>,
    },
    Union {
        def: Arc<Union>,
        option: usize,
        value: Option<Box<Value>>,
    },
    Binding(Box<FunctionBinding>),
    ListBuilder(Rc<RefCell<Vec<Value>>>),
}

impl Value {
    pub fn integer(value: i64) -> Value {
        Value::Integer(BigInt::from(value))
    }

    pub fn natural(value: u64) -> Value {
        Value::Natural(BigUint::from(value))
    }

    pub fn binding(binding: FunctionBinding) -> Value {
        Value::Binding(Box::new(binding))
    }

    pub fn success(value: Value) -> Value {
        Value::Try(Some(Box::new(value)))
    }

    pub fn failure() -> Value {
        Value::Try(None)
    }

    pub fn new_list_builder() -> Value {
        Value::ListBuilder(Rc::new(RefCell::new(Vec::new())))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Natural(_) => "Natural",
            Value::Boolean(_) => "Boolean",
            Value::List(_) => "List",
            Value::Try(_) => "Try",
            Value::String(_) => "Unicode.String",
            Value::Struct { .. } => "struct",
            Value::Instance { .. } => "interface instance",
            Value::Union { .. } => "union",
            Value::Binding(_) => "function binding",
            Value::ListBuilder(_) => "ListBuilder",
        }
    }

    pub fn as_integer(&self) -> Result<&BigInt, EvalError> {
        match self {
            Value::Integer(value) => Ok(value),
            other => Err(type_mismatch("Integer", other)),
        }
    }

    pub fn as_natural(&self) -> Result<&BigUint, EvalError> {
        match self {
            Value::Natural(value) => Ok(value),
            other => Err(type_mismatch("Natural", other)),
        }
    }

    pub fn as_boolean(&self) -> Result<bool, EvalError> {
        match self {
            Value::Boolean(value) => Ok(*value),
            other => Err(type_mismatch("Boolean", other)),
        }
    }

    pub fn into_list(self) -> Result<Vec<Value>, EvalError> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(type_mismatch("List", &other)),
        }
    }

    pub fn into_try(self) -> Result<Option<Value>, EvalError> {
        match self {
            Value::Try(inner) => Ok(inner.map(|boxed| *boxed)),
            other => Err(type_mismatch("Try", &other)),
        }
    }

    pub fn into_binding(self) -> Result<FunctionBinding, EvalError> {
        match self {
            Value::Binding(binding) => Ok(*binding),
            other => Err(type_mismatch("function binding", &other)),
        }
    }
}

/// Structural equality. List builders compare by identity; closures by
/// definition and captured values.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Natural(a), Value::Natural(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Try(a), Value::Try(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (
                Value::Struct { def, members },
                Value::Struct {
                    def: other_def,
                    members: other_members,
                },
            ) => def.resolved_ref() == other_def.resolved_ref() && members == other_members,
            (
                Value::Instance { def, methods },
                Value::Instance {
                    def: other_def,
                    methods: other_methods,
                },
            ) => def.resolved_ref() == other_def.resolved_ref() && methods == other_methods,
            (
                Value::Union { def, option, value },
                Value::Union {
                    def: other_def,
                    option: other_option,
                    value: other_value,
                },
            ) => {
                def.resolved_ref() == other_def.resolved_ref()
                    && option == other_option
                    && value == other_value
            }
            (Value::Binding(a), Value::Binding(b)) => a == b,
            (Value::ListBuilder(a), Value::ListBuilder(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{value}"),
            Value::Natural(value) => write!(f, "{value}"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::List(items) => write_list(f, items),
            Value::Try(Some(inner)) => write!(f, "success({inner})"),
            Value::Try(None) => f.write_str("failure"),
            Value::String(text) => write!(f, "{text:?}"),
            Value::Struct { def, members } => {
                write!(f, "{}", def.id)?;
                f.write_str("(")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str(")")
            }
            Value::Instance { def, .. } => write!(f, "<{} instance>", def.id),
            Value::Union { def, option, value } => {
                let name = def.options.get(*option).map_or("?", |o| o.name.as_str());
                match value {
                    Some(value) => write!(f, "{}.{name}({value})", def.id),
                    None => write!(f, "{}.{name}", def.id),
                }
            }
            Value::Binding(binding) => match &binding.target {
                BindingTarget::Named(target) => write!(f, "<function {}>", target.id),
                BindingTarget::Inline(_) => f.write_str("<inline function>"),
            },
            Value::ListBuilder(buffer) => write!(f, "<ListBuilder of {}>", buffer.borrow().len()),
        }
    }
}
