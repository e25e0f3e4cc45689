//! Runtime errors for the interpreter

use super::value::{Object, ObjectType};
use crate::ast::{InfixOperator, PrefixOperator};
use thiserror::Error;

/// Runtime error during evaluation.
///
/// The `Display` text is the message users see, rendered as
/// `ERROR: <message>` once it becomes an [`Object::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),

    #[error("unknown operator: {operator}{operand}")]
    UnknownPrefixOperator {
        operator: PrefixOperator,
        operand: ObjectType,
    },

    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: ObjectType,
        operator: InfixOperator,
        right: ObjectType,
    },

    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: ObjectType,
        operator: InfixOperator,
        right: ObjectType,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("not a function: {0}")]
    NotAFunction(ObjectType),

    #[error("wrong number of arguments. got={got}, want={want}")]
    WrongArgumentCount { got: usize, want: usize },

    #[error("index operator not supported: {0}")]
    IndexNotSupported(ObjectType),

    #[error("unusable as hash key: {0}")]
    UnusableAsHashKey(ObjectType),

    #[error("argument to `{builtin}` not supported, got {got}")]
    UnsupportedArgument {
        builtin: &'static str,
        got: ObjectType,
    },

    #[error("argument to `{builtin}` must be {expected}, got {got}")]
    ArgumentTypeMismatch {
        builtin: &'static str,
        expected: ObjectType,
        got: ObjectType,
    },

    #[error("stack overflow: maximum call depth of {0} exceeded")]
    StackOverflow(usize),
}

impl RuntimeError {
    pub fn wrong_arguments(got: usize, want: usize) -> Self {
        Self::WrongArgumentCount { got, want }
    }

    pub fn expected_array(builtin: &'static str, got: &Object) -> Self {
        Self::ArgumentTypeMismatch {
            builtin,
            expected: ObjectType::Array,
            got: got.type_tag(),
        }
    }
}

impl From<RuntimeError> for Object {
    fn from(err: RuntimeError) -> Self {
        Object::Error(err.to_string())
    }
}

/// Result type for interpreter operations
pub type InterpResult<T> = Result<T, RuntimeError>;
