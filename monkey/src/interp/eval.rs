//! Tree-walking evaluator

use super::builtins::BUILTINS;
use super::env::{EnvRef, new_enclosed_environment};
use super::error::{InterpResult, RuntimeError};
use super::value::{Builtin, Function, HashPair, NULL, Object};
use crate::ast::{
    BlockStatement, Expression, InfixOperator, PrefixOperator, Program, Statement,
};
use crate::stack::ensure_sufficient_stack;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, trace};

/// Default bound on nested function applications
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// Anything `eval` accepts
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Program(&'a Program),
    Statement(&'a Statement),
    Expression(&'a Expression),
}

impl<'a> From<&'a Program> for Node<'a> {
    fn from(program: &'a Program) -> Self {
        Node::Program(program)
    }
}

impl<'a> From<&'a Statement> for Node<'a> {
    fn from(stmt: &'a Statement) -> Self {
        Node::Statement(stmt)
    }
}

impl<'a> From<&'a Expression> for Node<'a> {
    fn from(expr: &'a Expression) -> Self {
        Node::Expression(expr)
    }
}

/// The interpreter
pub struct Interpreter {
    /// Builtin functions
    builtins: HashMap<&'static str, Builtin>,
    /// Current call depth
    depth: usize,
    max_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Create a new interpreter
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    /// Create an interpreter that fails once calls nest deeper than `max_depth`
    pub fn with_max_depth(max_depth: usize) -> Self {
        let builtins = BUILTINS.iter().map(|b| (b.name, *b)).collect();
        Interpreter {
            builtins,
            depth: 0,
            max_depth,
        }
    }

    /// Evaluate a node in `env`. Runtime errors come back as
    /// [`Object::Error`].
    pub fn eval<'a>(&mut self, node: impl Into<Node<'a>>, env: &EnvRef) -> Object {
        let result = match node.into() {
            Node::Program(program) => self.eval_program(program, env),
            Node::Statement(stmt) => self.eval_statement(stmt, env),
            Node::Expression(expr) => self.eval_expression(expr, env),
        };
        result.unwrap_or_else(|err| {
            debug!(error = %err, "runtime error");
            Object::from(err)
        })
    }

    #[tracing::instrument(level = "debug", skip_all, fields(statements = program.statements.len()))]
    fn eval_program(&mut self, program: &Program, env: &EnvRef) -> InterpResult<Object> {
        let mut result = NULL;
        for stmt in &program.statements {
            result = self.eval_statement(stmt, env)?;
            if let Object::ReturnValue(value) = result {
                return Ok(*value);
            }
        }
        Ok(result)
    }

    /// Like a program, but a `return` keeps its wrapper so it can unwind
    /// through enclosing blocks
    fn eval_block(&mut self, block: &BlockStatement, env: &EnvRef) -> InterpResult<Object> {
        let mut result = NULL;
        for stmt in &block.statements {
            result = self.eval_statement(stmt, env)?;
            if matches!(result, Object::ReturnValue(_)) {
                break;
            }
        }
        Ok(result)
    }

    fn eval_statement(&mut self, stmt: &Statement, env: &EnvRef) -> InterpResult<Object> {
        match stmt {
            Statement::Let(let_stmt) => {
                let value = self.eval_expression(&let_stmt.value, env)?;
                env.borrow_mut().define(let_stmt.name.name.clone(), value);
                Ok(NULL)
            }
            Statement::Return(ret) => {
                let value = match &ret.value {
                    Some(expr) => self.eval_expression(expr, env)?,
                    None => NULL,
                };
                Ok(Object::ReturnValue(Box::new(value)))
            }
            Statement::Expression(expr) => self.eval_expression(expr, env),
            Statement::Block(block) => self.eval_block(block, env),
        }
    }

    /// Evaluate an expression with automatic stack growth for deep recursion
    fn eval_expression(&mut self, expr: &Expression, env: &EnvRef) -> InterpResult<Object> {
        ensure_sufficient_stack(|| self.eval_expression_inner(expr, env))
    }

    fn eval_expression_inner(&mut self, expr: &Expression, env: &EnvRef) -> InterpResult<Object> {
        match expr {
            Expression::Integer(n) => Ok(Object::Integer(*n)),
            Expression::Boolean(b) => Ok(Object::from_bool(*b)),
            Expression::String(s) => Ok(Object::string(s.as_str())),
            Expression::Identifier(ident) => self.eval_identifier(&ident.name, env),

            Expression::Prefix { operator, right } => {
                let right = self.eval_expression(right, env)?;
                eval_prefix(*operator, right)
            }

            Expression::Infix {
                left,
                operator,
                right,
            } => {
                let left = self.eval_expression(left, env)?;
                let right = self.eval_expression(right, env)?;
                eval_infix(*operator, left, right)
            }

            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                let condition = self.eval_expression(condition, env)?;
                if condition.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alt) = alternative {
                    self.eval_block(alt, env)
                } else {
                    Ok(NULL)
                }
            }

            Expression::Function { parameters, body } => {
                Ok(Object::Function(Rc::new(Function {
                    parameters: parameters.clone(),
                    body: body.clone(),
                    env: Rc::clone(env),
                })))
            }

            Expression::Call {
                function,
                arguments,
            } => {
                let function = self.eval_expression(function, env)?;
                let args = self.eval_expressions(arguments, env)?;
                self.apply_function(function, args)
            }

            Expression::Array(elements) => {
                let elements = self.eval_expressions(elements, env)?;
                Ok(Object::array(elements))
            }

            Expression::Index { left, index } => {
                let left = self.eval_expression(left, env)?;
                let index = self.eval_expression(index, env)?;
                eval_index(left, index)
            }

            Expression::Hash(pairs) => self.eval_hash_literal(pairs, env),
        }
    }

    fn eval_identifier(&self, name: &str, env: &EnvRef) -> InterpResult<Object> {
        if let Some(value) = env.borrow().get(name) {
            return Ok(value);
        }
        if let Some(builtin) = self.builtins.get(name) {
            return Ok(Object::Builtin(*builtin));
        }
        Err(RuntimeError::IdentifierNotFound(name.to_string()))
    }

    /// Evaluate left to right, stopping at the first error
    fn eval_expressions(
        &mut self,
        exprs: &[Expression],
        env: &EnvRef,
    ) -> InterpResult<Vec<Object>> {
        exprs
            .iter()
            .map(|expr| self.eval_expression(expr, env))
            .collect()
    }

    fn eval_hash_literal(
        &mut self,
        pairs: &[(Expression, Expression)],
        env: &EnvRef,
    ) -> InterpResult<Object> {
        let mut map = HashMap::with_capacity(pairs.len());
        for (key_expr, value_expr) in pairs {
            let key = self.eval_expression(key_expr, env)?;
            let hash_key = key
                .hash_key()
                .ok_or_else(|| RuntimeError::UnusableAsHashKey(key.type_tag()))?;
            let value = self.eval_expression(value_expr, env)?;
            map.insert(hash_key, HashPair { key, value });
        }
        Ok(Object::Hash(Rc::new(map)))
    }

    fn apply_function(&mut self, function: Object, args: Vec<Object>) -> InterpResult<Object> {
        match function {
            Object::Function(func) => self.call_function(&func, args),
            Object::Builtin(builtin) => {
                trace!(builtin = builtin.name, args = args.len(), "call builtin");
                (builtin.func)(&args)
            }
            other => Err(RuntimeError::NotAFunction(other.type_tag())),
        }
    }

    fn call_function(&mut self, func: &Function, args: Vec<Object>) -> InterpResult<Object> {
        // Check arity
        if func.parameters.len() != args.len() {
            return Err(RuntimeError::wrong_arguments(
                args.len(),
                func.parameters.len(),
            ));
        }

        // Check recursion depth
        if self.depth >= self.max_depth {
            return Err(RuntimeError::StackOverflow(self.max_depth));
        }
        self.depth += 1;
        trace!(depth = self.depth, params = func.parameters.len(), "apply function");

        let call_env = new_enclosed_environment(&func.env);
        {
            let mut scope = call_env.borrow_mut();
            for (param, arg) in func.parameters.iter().zip(args) {
                scope.define(param.name.clone(), arg);
            }
        }

        let result = self.eval_block(&func.body, &call_env);
        self.depth -= 1;
        Ok(result?.unwrap_return())
    }
}

fn eval_prefix(operator: PrefixOperator, right: Object) -> InterpResult<Object> {
    match (operator, right) {
        (PrefixOperator::Not, right) => Ok(Object::from_bool(!right.is_truthy())),
        (PrefixOperator::Neg, Object::Integer(n)) => Ok(Object::Integer(n.wrapping_neg())),
        (PrefixOperator::Neg, right) => Err(RuntimeError::UnknownPrefixOperator {
            operator,
            operand: right.type_tag(),
        }),
    }
}

fn eval_infix(operator: InfixOperator, left: Object, right: Object) -> InterpResult<Object> {
    match (&left, &right) {
        (Object::Integer(l), Object::Integer(r)) => eval_integer_infix(operator, *l, *r),
        (Object::String(l), Object::String(r)) => match operator {
            InfixOperator::Add => Ok(Object::string(format!("{l}{r}"))),
            _ => Err(RuntimeError::UnknownInfixOperator {
                left: left.type_tag(),
                operator,
                right: right.type_tag(),
            }),
        },
        _ => match operator {
            InfixOperator::Eq => Ok(Object::from_bool(left.is_identical(&right))),
            InfixOperator::NotEq => Ok(Object::from_bool(!left.is_identical(&right))),
            _ if left.type_tag() != right.type_tag() => Err(RuntimeError::TypeMismatch {
                left: left.type_tag(),
                operator,
                right: right.type_tag(),
            }),
            _ => Err(RuntimeError::UnknownInfixOperator {
                left: left.type_tag(),
                operator,
                right: right.type_tag(),
            }),
        },
    }
}

fn eval_integer_infix(operator: InfixOperator, l: i64, r: i64) -> InterpResult<Object> {
    let value = match operator {
        InfixOperator::Add => Object::Integer(l.wrapping_add(r)),
        InfixOperator::Sub => Object::Integer(l.wrapping_sub(r)),
        InfixOperator::Mul => Object::Integer(l.wrapping_mul(r)),
        InfixOperator::Div => {
            if r == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Object::Integer(l.wrapping_div(r))
        }
        InfixOperator::Lt => Object::from_bool(l < r),
        InfixOperator::Gt => Object::from_bool(l > r),
        InfixOperator::Eq => Object::from_bool(l == r),
        InfixOperator::NotEq => Object::from_bool(l != r),
    };
    Ok(value)
}

fn eval_index(left: Object, index: Object) -> InterpResult<Object> {
    match (&left, &index) {
        (Object::Array(elements), Object::Integer(i)) => Ok(usize::try_from(*i)
            .ok()
            .and_then(|i| elements.get(i))
            .cloned()
            .unwrap_or(NULL)),
        (Object::Hash(pairs), key) => {
            let hash_key = key
                .hash_key()
                .ok_or_else(|| RuntimeError::UnusableAsHashKey(key.type_tag()))?;
            Ok(pairs
                .get(&hash_key)
                .map(|pair| pair.value.clone())
                .unwrap_or(NULL))
        }
        _ => Err(RuntimeError::IndexNotSupported(left.type_tag())),
    }
}

/// Evaluate with a fresh [`Interpreter`] using the default depth limit
pub fn eval<'a>(node: impl Into<Node<'a>>, env: &EnvRef) -> Object {
    Interpreter::new().eval(node, env)
}
