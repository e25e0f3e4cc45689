//! Expression AST nodes

use super::BlockStatement;
use crate::stack::ensure_sufficient_stack;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expression {
    /// Variable reference
    Identifier(Identifier),
    /// Integer literal
    Integer(i64),
    /// `true` / `false`
    Boolean(bool),
    /// String literal, quotes stripped
    String(String),

    /// `<op><right>`
    Prefix {
        operator: PrefixOperator,
        right: Box<Expression>,
    },

    /// `<left> <op> <right>`
    Infix {
        left: Box<Expression>,
        operator: InfixOperator,
        right: Box<Expression>,
    },

    /// `if (<condition>) { ... } [else { ... }]`
    If {
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },

    /// `fn(<parameters>) { ... }`
    Function {
        parameters: Vec<Identifier>,
        body: BlockStatement,
    },

    /// `<function>(<arguments>)`
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },

    /// `[<elements>]`
    Array(Vec<Expression>),

    /// `{<key>: <value>, ...}`, pairs kept in source order
    Hash(Vec<(Expression, Expression)>),

    /// `<left>[<index>]`
    Index {
        left: Box<Expression>,
        index: Box<Expression>,
    },
}

impl Expression {
    /// Literal of the token this expression was parsed from
    pub fn token_literal(&self) -> String {
        match self {
            Expression::Identifier(ident) => ident.name.clone(),
            Expression::Integer(n) => n.to_string(),
            Expression::Boolean(b) => b.to_string(),
            Expression::String(s) => s.clone(),
            Expression::Prefix { operator, .. } => operator.to_string(),
            Expression::Infix { operator, .. } => operator.to_string(),
            Expression::If { .. } => "if".to_string(),
            Expression::Function { .. } => "fn".to_string(),
            Expression::Call { .. } => "(".to_string(),
            Expression::Array(_) | Expression::Index { .. } => "[".to_string(),
            Expression::Hash(_) => "{".to_string(),
        }
    }
}

/// Prefix (unary) operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrefixOperator {
    /// `!`
    Not,
    /// `-`
    Neg,
}

impl fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixOperator::Not => write!(f, "!"),
            PrefixOperator::Neg => write!(f, "-"),
        }
    }
}

/// Infix (binary) operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfixOperator {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Eq,
    NotEq,
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfixOperator::Add => write!(f, "+"),
            InfixOperator::Sub => write!(f, "-"),
            InfixOperator::Mul => write!(f, "*"),
            InfixOperator::Div => write!(f, "/"),
            InfixOperator::Lt => write!(f, "<"),
            InfixOperator::Gt => write!(f, ">"),
            InfixOperator::Eq => write!(f, "=="),
            InfixOperator::NotEq => write!(f, "!="),
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ensure_sufficient_stack(|| self.fmt_inner(f))
    }
}

impl Expression {
    fn fmt_inner(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{ident}"),
            Expression::Integer(n) => write!(f, "{n}"),
            Expression::Boolean(b) => write!(f, "{b}"),
            Expression::String(s) => write!(f, "\"{s}\""),
            Expression::Prefix { operator, right } => write!(f, "({operator}{right})"),
            Expression::Infix {
                left,
                operator,
                right,
            } => write!(f, "({left} {operator} {right})"),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if ({condition}) {consequence}")?;
                if let Some(alt) = alternative {
                    write!(f, " else {alt}")?;
                }
                Ok(())
            }
            Expression::Function { parameters, body } => {
                f.write_str("fn(")?;
                write_joined(f, parameters)?;
                write!(f, ") {body}")
            }
            Expression::Call {
                function,
                arguments,
            } => {
                write!(f, "{function}(")?;
                write_joined(f, arguments)?;
                f.write_str(")")
            }
            Expression::Array(elements) => {
                f.write_str("[")?;
                write_joined(f, elements)?;
                f.write_str("]")
            }
            Expression::Hash(pairs) => {
                f.write_str("{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Expression::Index { left, index } => write!(f, "({left}[{index}])"),
        }
    }
}

/// Move a boxed child out, leaving a leaf behind
fn take_child(child: &mut Expression) -> Expression {
    std::mem::replace(child, Expression::Integer(0))
}

// The derived drop glue recurses once per nesting level. Children are
// detached and released inside the grown stack instead.
impl Drop for Expression {
    fn drop(&mut self) {
        ensure_sufficient_stack(|| match self {
            Expression::Identifier(_)
            | Expression::Integer(_)
            | Expression::Boolean(_)
            | Expression::String(_) => {}
            Expression::Prefix { right, .. } => drop(take_child(right)),
            Expression::Infix { left, right, .. } | Expression::Index { left, index: right } => {
                drop(take_child(left));
                drop(take_child(right));
            }
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                drop(take_child(condition));
                drop(std::mem::take(&mut consequence.statements));
                drop(alternative.take());
            }
            Expression::Function { body, .. } => drop(std::mem::take(&mut body.statements)),
            Expression::Call {
                function,
                arguments,
            } => {
                drop(take_child(function));
                drop(std::mem::take(arguments));
            }
            Expression::Array(elements) => drop(std::mem::take(elements)),
            Expression::Hash(pairs) => drop(std::mem::take(pairs)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Statement;

    fn ident(name: &str) -> Expression {
        Expression::Identifier(Identifier::new(name))
    }

    #[test]
    fn test_infix_is_parenthesized() {
        let expr = Expression::Infix {
            left: Box::new(Expression::Integer(1)),
            operator: InfixOperator::Add,
            right: Box::new(Expression::Infix {
                left: Box::new(Expression::Integer(2)),
                operator: InfixOperator::Mul,
                right: Box::new(Expression::Integer(3)),
            }),
        };
        assert_eq!(expr.to_string(), "(1 + (2 * 3))");
        assert_eq!(expr.token_literal(), "+");
    }

    #[test]
    fn test_prefix_display() {
        let expr = Expression::Prefix {
            operator: PrefixOperator::Neg,
            right: Box::new(Expression::Integer(5)),
        };
        assert_eq!(expr.to_string(), "(-5)");
        assert_eq!(expr.token_literal(), "-");
    }

    #[test]
    fn test_string_literal_is_quoted() {
        let expr = Expression::String("hello world".to_string());
        assert_eq!(expr.to_string(), r#""hello world""#);
        assert_eq!(expr.token_literal(), "hello world");
    }

    #[test]
    fn test_if_else_display() {
        let expr = Expression::If {
            condition: Box::new(Expression::Infix {
                left: Box::new(ident("x")),
                operator: InfixOperator::Lt,
                right: Box::new(ident("y")),
            }),
            consequence: BlockStatement {
                statements: vec![Statement::Expression(ident("x"))],
            },
            alternative: Some(BlockStatement {
                statements: vec![Statement::Expression(ident("y"))],
            }),
        };
        insta::assert_snapshot!(expr.to_string(), @"if ((x < y)) { x } else { y }");
    }

    #[test]
    fn test_function_and_call_display() {
        let function = Expression::Function {
            parameters: vec![Identifier::new("x"), Identifier::new("y")],
            body: BlockStatement {
                statements: vec![Statement::Expression(Expression::Infix {
                    left: Box::new(ident("x")),
                    operator: InfixOperator::Add,
                    right: Box::new(ident("y")),
                })],
            },
        };
        assert_eq!(function.to_string(), "fn(x, y) { (x + y) }");
        assert_eq!(function.token_literal(), "fn");

        let call = Expression::Call {
            function: Box::new(function),
            arguments: vec![Expression::Integer(1), Expression::Integer(2)],
        };
        assert_eq!(call.to_string(), "fn(x, y) { (x + y) }(1, 2)");
    }

    #[test]
    fn test_collection_display() {
        let array = Expression::Array(vec![Expression::Integer(1), Expression::Boolean(true)]);
        assert_eq!(array.to_string(), "[1, true]");

        let hash = Expression::Hash(vec![
            (Expression::String("a".to_string()), Expression::Integer(1)),
            (Expression::Integer(2), Expression::Boolean(false)),
        ]);
        assert_eq!(hash.to_string(), r#"{"a": 1, 2: false}"#);
        assert_eq!(Expression::Hash(vec![]).to_string(), "{}");

        let index = Expression::Index {
            left: Box::new(ident("arr")),
            index: Box::new(Expression::Integer(0)),
        };
        assert_eq!(index.to_string(), "(arr[0])");
    }
}
