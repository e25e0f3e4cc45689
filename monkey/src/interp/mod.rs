//! Tree-walking interpreter
//!
//! Evaluates the AST directly. Runtime failures travel as
//! `Result<_, RuntimeError>` inside the evaluator and surface to callers as
//! first-class [`Object::Error`] values.

mod builtins;
mod env;
mod error;
mod eval;
mod value;

pub use builtins::BUILTINS;
pub use env::{EnvRef, Environment, new_enclosed_environment, new_environment};
pub use error::{InterpResult, RuntimeError};
pub use eval::{DEFAULT_MAX_DEPTH, Interpreter, Node, eval};
pub use value::{
    Builtin, BuiltinFn, FALSE, Function, HashKey, HashPair, NULL, Object, ObjectType, TRUE,
};
