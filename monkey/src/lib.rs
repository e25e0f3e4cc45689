//! Monkey language library
//!
//! Lexer, Pratt parser and tree-walking interpreter for the Monkey
//! language, plus the interactive session used by the `monkey` binary.

pub mod ast;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod repl;
mod stack;

pub use ast::Span;
pub use error::CompileError;
