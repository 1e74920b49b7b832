//! Runtime errors.
//!
//! The interpreter only runs validated modules, so an [`EvalError`] means a
//! broken internal invariant, or a native precondition that validation
//! cannot see: `Try.assume` on a failure or a malformed `@Test` literal. Failures a program is expected to handle are `Try`
//! failure values, never errors.
//!
//! Factory functions are the public way to build errors; they set both
//! `kind` and `message`.

use std::fmt;

use crate::value::Value;

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    TypeMismatch {
        expected: String,
        got: String,
    },
    UndefinedVariable {
        name: String,
    },
    UndefinedEntity {
        name: String,
    },
    UndefinedMember {
        member: String,
        type_name: String,
    },
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    NotCallable {
        type_name: String,
    },
    /// `Try.assume` was given a failure.
    AssumedFailure,
    /// A struct literal did not satisfy the struct's `requires` block.
    RequiresFailed {
        type_name: String,
        literal: String,
    },
    InvalidLiteral {
        literal: String,
        type_name: String,
        reason: String,
    },
    MissingNative {
        name: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::UndefinedVariable { name } => write!(f, "undefined variable: {name}"),
            Self::UndefinedEntity { name } => write!(f, "undefined entity: {name}"),
            Self::UndefinedMember { member, type_name } => {
                write!(f, "no member '{member}' on {type_name}")
            }
            Self::ArityMismatch {
                name,
                expected,
                got,
            } => write!(f, "{name} expects {expected} argument(s), got {got}"),
            Self::NotCallable { type_name } => write!(f, "{type_name} is not callable"),
            Self::AssumedFailure => f.write_str("Try.assume was called on a failure"),
            Self::RequiresFailed { type_name, literal } => write!(
                f,
                "literal \"{literal}\" does not satisfy the requires block of {type_name}"
            ),
            Self::InvalidLiteral {
                literal,
                type_name,
                reason,
            } => write!(f, "invalid {type_name} literal \"{literal}\": {reason}"),
            Self::MissingNative { name } => write!(f, "no native implementation for {name}"),
        }
    }
}

/// Entities being evaluated when an error occurred, innermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalBacktrace {
    frames: Vec<String>,
}

impl EvalBacktrace {
    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "stack backtrace:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            writeln!(f, "  {i}: {frame}")?;
        }
        Ok(())
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Equals `kind.to_string()`.
    pub message: String,
    pub backtrace: EvalBacktrace,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError {
            kind,
            message,
            backtrace: EvalBacktrace::default(),
        }
    }

    /// Record that the error passed out of evaluating `frame`.
    #[must_use]
    pub fn in_frame(mut self, frame: impl fmt::Display) -> Self {
        self.backtrace.frames.push(frame.to_string());
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if !self.backtrace.is_empty() {
            write!(f, "\n{}", self.backtrace)?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

#[cold]
pub fn type_mismatch(expected: &str, got: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.type_name().to_string(),
    })
}

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn undefined_entity(name: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedEntity {
        name: name.to_string(),
    })
}

#[cold]
pub fn undefined_member(member: &str, value: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedMember {
        member: member.to_string(),
        type_name: value.type_name().to_string(),
    })
}

#[cold]
pub fn arity_mismatch(name: impl fmt::Display, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    })
}

#[cold]
pub fn not_callable(value: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: value.type_name().to_string(),
    })
}

#[cold]
pub fn assumed_failure() -> EvalError {
    EvalError::from_kind(EvalErrorKind::AssumedFailure)
}

#[cold]
pub fn requires_failed(type_name: impl fmt::Display, literal: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::RequiresFailed {
        type_name: type_name.to_string(),
        literal: literal.to_string(),
    })
}

#[cold]
pub fn invalid_literal(literal: &str, type_name: impl fmt::Display, reason: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidLiteral {
        literal: literal.to_string(),
        type_name: type_name.to_string(),
        reason: reason.to_string(),
    })
}

#[cold]
pub fn missing_native(name: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingNative {
        name: name.to_string(),
    })
}
