//! Abstract Syntax Tree definitions
//!
//! Every node can report the literal of the token it starts from
//! (`token_literal`) and renders, through `Display`, a canonical source
//! reconstruction: expressions are fully parenthesized, so the rendering
//! re-parses to an equivalent tree.

mod expr;
mod span;

pub use expr::*;
pub use span::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A program is a sequence of statements
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn token_literal(&self) -> String {
        self.statements
            .first()
            .map(Statement::token_literal)
            .unwrap_or_default()
    }
}

/// Statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statement {
    /// `let <name> = <value>;`
    Let(LetStatement),
    /// `return [<value>];`
    Return(ReturnStatement),
    /// A bare expression, optionally followed by `;`
    Expression(Expression),
    /// `{ <statements> }`
    Block(BlockStatement),
}

impl Statement {
    pub fn token_literal(&self) -> String {
        match self {
            Statement::Let(_) => "let".to_string(),
            Statement::Return(_) => "return".to_string(),
            Statement::Expression(expr) => expr.token_literal(),
            Statement::Block(_) => "{".to_string(),
        }
    }
}

/// Let binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetStatement {
    pub name: Identifier,
    pub value: Expression,
}

/// Return statement; the value is optional
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
}

/// Brace-delimited statement list: function bodies and `if` arms
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

/// Write a statement sequence so that it re-parses: an expression statement
/// followed by another statement needs an explicit `;`.
fn write_statements(f: &mut fmt::Formatter<'_>, statements: &[Statement]) -> fmt::Result {
    for (i, stmt) in statements.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{stmt}")?;
        if i + 1 < statements.len() && matches!(stmt, Statement::Expression(_)) {
            f.write_str(";")?;
        }
    }
    Ok(())
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_statements(f, &self.statements)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let(stmt) => write!(f, "let {} = {};", stmt.name, stmt.value),
            Statement::Return(ReturnStatement { value: Some(value) }) => {
                write!(f, "return {value};")
            }
            Statement::Return(ReturnStatement { value: None }) => f.write_str("return;"),
            Statement::Expression(expr) => write!(f, "{expr}"),
            Statement::Block(block) => write!(f, "{block}"),
        }
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.statements.is_empty() {
            return f.write_str("{ }");
        }
        f.write_str("{ ")?;
        write_statements(f, &self.statements)?;
        f.write_str(" }")
    }
}
