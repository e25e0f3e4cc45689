//! Pratt (operator-precedence) parser
//!
//! The parser keeps two tokens of lookahead (`cur` and `peek`) and selects a
//! prefix or infix parse function from the category of the token at hand.
//! Errors do not stop parsing: each failure is recorded, the offending
//! statement is dropped, and parsing resumes at the next statement boundary.

use crate::ast::{
    BlockStatement, Expression, Identifier, InfixOperator, LetStatement, PrefixOperator, Program,
    ReturnStatement, Statement,
};
use crate::error::CompileError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::stack::ensure_sufficient_stack;
use tracing::trace;


/// Binding power, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    /// `==` `!=`
    Equals,
    /// `<` `>`
    LessGreater,
    /// `+` `-`
    Sum,
    /// `*` `/`
    Product,
    /// `-x` `!x`
    Prefix,
    /// `f(x)`
    Call,
    /// `a[i]`
    Index,
}

impl Precedence {
    fn of(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
            TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
            TokenKind::LParen => Precedence::Call,
            TokenKind::LBracket => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }
}

type PrefixParseFn<'src> = fn(&mut Parser<'src>) -> Option<Expression>;
type InfixParseFn<'src> = fn(&mut Parser<'src>, Expression) -> Option<Expression>;

/// Parser state
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    cur: Token,
    peek: Token,
    errors: Vec<CompileError>,
}

impl<'src> Parser<'src> {
    pub fn new(mut lexer: Lexer<'src>) -> Self {
        let cur = lexer.next_token();
        let peek = lexer.next_token();
        Parser {
            lexer,
            cur,
            peek,
            errors: Vec::new(),
        }
    }

    /// Syntax errors collected so far, in source order
    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<CompileError> {
        self.errors
    }

    /// Parse statements until end of input
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();
        while !self.cur_is(TokenKind::Eof) {
            match self.parse_statement() {
                Some(stmt) => program.statements.push(stmt),
                None => self.synchronize(),
            }
            self.next_token();
        }
        program
    }

    // ============ Token cursor ============

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.cur = std::mem::replace(&mut self.peek, next);
    }

    fn cur_is(&self, kind: TokenKind) -> bool {
        self.cur.is(kind)
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.is(kind)
    }

    /// Advance if the peek token has the expected category, else record an error
    fn expect_peek(&mut self, kind: TokenKind) -> Option<()> {
        if self.peek_is(kind) {
            self.next_token();
            Some(())
        } else {
            self.peek_error(kind);
            None
        }
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(self.peek.kind)
    }

    fn cur_precedence(&self) -> Precedence {
        Precedence::of(self.cur.kind)
    }

    /// Skip to the end of the broken statement. Stops on `;`, or on a `}`
    /// that closes the enclosing block so the block parser still sees it.
    fn synchronize(&mut self) {
        while !self.cur_is(TokenKind::Semicolon)
            && !self.cur_is(TokenKind::RBrace)
            && !self.cur_is(TokenKind::Eof)
        {
            self.next_token();
        }
    }

    // ============ Errors ============

    fn peek_error(&mut self, expected: TokenKind) {
        let message = format!(
            "expected next token to be {expected}, got {} instead",
            self.peek.kind
        );
        self.errors.push(CompileError::parser(message, self.peek.span));
    }

    fn no_prefix_parse_error(&mut self) {
        let message = format!("no prefix parse function for {} found", self.cur.kind);
        self.errors.push(CompileError::parser(message, self.cur.span));
    }

    // ============ Statements ============

    fn parse_statement(&mut self) -> Option<Statement> {
        trace!(token = %self.cur.kind, span = %self.cur.span, "parse_statement");
        match self.cur.kind {
            TokenKind::Let => self.parse_let_statement().map(Statement::Let),
            TokenKind::Return => self.parse_return_statement().map(Statement::Return),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<LetStatement> {
        self.expect_peek(TokenKind::Ident)?;
        let name = Identifier::new(self.cur.literal.clone());
        self.expect_peek(TokenKind::Assign)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(LetStatement { name, value })
    }

    fn parse_return_statement(&mut self) -> Option<ReturnStatement> {
        let bare = self.peek_is(TokenKind::Semicolon)
            || self.peek_is(TokenKind::RBrace)
            || self.peek_is(TokenKind::Eof);
        let value = if bare {
            None
        } else {
            self.next_token();
            Some(self.parse_expression(Precedence::Lowest)?)
        };
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(ReturnStatement { value })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Statement::Expression(expr))
    }

    /// Parse `{ ... }`; `cur` must be the opening brace
    fn parse_block_statement(&mut self) -> Option<BlockStatement> {
        let open = self.cur.span;
        let mut block = BlockStatement::default();
        self.next_token();

        while !self.cur_is(TokenKind::RBrace) && !self.cur_is(TokenKind::Eof) {
            match self.parse_statement() {
                Some(stmt) => block.statements.push(stmt),
                None => {
                    self.synchronize();
                    if self.cur_is(TokenKind::RBrace) {
                        break;
                    }
                }
            }
            self.next_token();
        }

        if self.cur_is(TokenKind::Eof) {
            let message = format!(
                "expected next token to be {}, got {} instead",
                TokenKind::RBrace,
                TokenKind::Eof
            );
            self.errors
                .push(CompileError::parser(message, open.merge(self.cur.span)));
            return None;
        }
        Some(block)
    }

    // ============ Expressions ============

    fn prefix_rule(kind: TokenKind) -> Option<PrefixParseFn<'src>> {
        let rule: PrefixParseFn<'src> = match kind {
            TokenKind::Ident => Self::parse_identifier,
            TokenKind::Int => Self::parse_integer_literal,
            TokenKind::String => Self::parse_string_literal,
            TokenKind::True | TokenKind::False => Self::parse_boolean,
            TokenKind::Bang | TokenKind::Minus => Self::parse_prefix_expression,
            TokenKind::LParen => Self::parse_grouped_expression,
            TokenKind::If => Self::parse_if_expression,
            TokenKind::Function => Self::parse_function_literal,
            TokenKind::LBracket => Self::parse_array_literal,
            TokenKind::LBrace => Self::parse_hash_literal,
            _ => return None,
        };
        Some(rule)
    }

    fn infix_rule(kind: TokenKind) -> Option<InfixParseFn<'src>> {
        let rule: InfixParseFn<'src> = match kind {
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Asterisk
            | TokenKind::Slash
            | TokenKind::Eq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::Gt => Self::parse_infix_expression,
            TokenKind::LParen => Self::parse_call_expression,
            TokenKind::LBracket => Self::parse_index_expression,
            _ => return None,
        };
        Some(rule)
    }

    /// Every nesting construct (grouping, prefix operators, blocks, literals)
    /// recurses through here, so this is where the stack is grown.
    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        ensure_sufficient_stack(|| self.parse_expression_inner(precedence))
    }

    fn parse_expression_inner(&mut self, precedence: Precedence) -> Option<Expression> {
        let Some(prefix) = Self::prefix_rule(self.cur.kind) else {
            self.no_prefix_parse_error();
            return None;
        };
        let mut left = prefix(self)?;

        while !self.peek_is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            let Some(infix) = Self::infix_rule(self.peek.kind) else {
                return Some(left);
            };
            self.next_token();
            left = infix(self, left)?;
        }

        Some(left)
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::Identifier(Identifier::new(
            self.cur.literal.clone(),
        )))
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        match self.cur.literal.parse::<i64>() {
            Ok(value) => Some(Expression::Integer(value)),
            Err(_) => {
                let message = format!("could not parse {:?} as integer", self.cur.literal);
                self.errors.push(CompileError::parser(message, self.cur.span));
                None
            }
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        Some(Expression::String(self.cur.literal.clone()))
    }

    fn parse_boolean(&mut self) -> Option<Expression> {
        Some(Expression::Boolean(self.cur_is(TokenKind::True)))
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let operator = match self.cur.kind {
            TokenKind::Bang => PrefixOperator::Not,
            _ => PrefixOperator::Neg,
        };
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix {
            operator,
            right: Box::new(right),
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let operator = infix_operator(self.cur.kind)?;
        let precedence = self.cur_precedence();
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Some(Expression::Infix {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;
        Some(expr)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        self.expect_peek(TokenKind::LParen)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;
        self.expect_peek(TokenKind::LBrace)?;
        let consequence = self.parse_block_statement()?;

        let alternative = if self.peek_is(TokenKind::Else) {
            self.next_token();
            self.expect_peek(TokenKind::LBrace)?;
            Some(self.parse_block_statement()?)
        } else {
            None
        };

        Some(Expression::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        self.expect_peek(TokenKind::LParen)?;
        let parameters = self.parse_function_parameters()?;
        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block_statement()?;
        Some(Expression::Function { parameters, body })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut parameters = Vec::new();
        if self.peek_is(TokenKind::RParen) {
            self.next_token();
            return Some(parameters);
        }

        self.expect_peek(TokenKind::Ident)?;
        parameters.push(Identifier::new(self.cur.literal.clone()));
        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            self.expect_peek(TokenKind::Ident)?;
            parameters.push(Identifier::new(self.cur.literal.clone()));
        }

        self.expect_peek(TokenKind::RParen)?;
        Some(parameters)
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let arguments = self.parse_expression_list(TokenKind::RParen)?;
        Some(Expression::Call {
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RBracket)?;
        Some(Expression::Index {
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        self.parse_expression_list(TokenKind::RBracket)
            .map(Expression::Array)
    }

    /// Comma-separated expressions up to `end`; `cur` is the opening delimiter
    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        let mut list = Vec::new();
        if self.peek_is(end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(end)?;
        Some(list)
    }

    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let mut pairs = Vec::new();
        while !self.peek_is(TokenKind::RBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect_peek(TokenKind::Colon)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if !self.peek_is(TokenKind::RBrace) {
                self.expect_peek(TokenKind::Comma)?;
            }
        }
        self.expect_peek(TokenKind::RBrace)?;
        Some(Expression::Hash(pairs))
    }
}

fn infix_operator(kind: TokenKind) -> Option<InfixOperator> {
    let op = match kind {
        TokenKind::Plus => InfixOperator::Add,
        TokenKind::Minus => InfixOperator::Sub,
        TokenKind::Asterisk => InfixOperator::Mul,
        TokenKind::Slash => InfixOperator::Div,
        TokenKind::Lt => InfixOperator::Lt,
        TokenKind::Gt => InfixOperator::Gt,
        TokenKind::Eq => InfixOperator::Eq,
        TokenKind::NotEq => InfixOperator::NotEq,
        _ => return None,
    };
    Some(op)
}

/// Parse source text; the program must not be evaluated unless the error
/// list is empty
pub fn parse(source: &str) -> (Program, Vec<CompileError>) {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();
    tracing::debug!(
        statements = program.statements.len(),
        errors = parser.errors().len(),
        "parsed program"
    );
    (program, parser.into_errors())
}
