//! Integration tests for the Monkey interpreter
//!
//! Exercises the full pipeline through the public API:
//! - Lexing and parsing source text
//! - Evaluation against a shared environment
//! - REPL sessions
//! - Property tests for rendering and determinism

use monkey::ast::Program;
use monkey::interp::{Interpreter, NULL, Object, eval, new_environment};
use monkey::lexer::{TokenKind, tokenize};
use monkey::parser::parse;
use monkey::repl::{Outcome, Session};
use proptest::prelude::*;

/// Helper to parse a program that must be free of syntax errors
fn parse_ok(source: &str) -> Program {
    let (program, errors) = parse(source);
    assert!(errors.is_empty(), "parser errors for {source:?}: {errors:?}");
    program
}

/// Helper to run a program in a fresh environment
fn run(source: &str) -> Object {
    eval(&parse_ok(source), &new_environment())
}

// ============================================
// Pipeline
// ============================================

#[test]
fn test_lex_let_statement() {
    let tokens: Vec<_> = tokenize("let x = 5;")
        .into_iter()
        .map(|t| (t.kind, t.literal))
        .collect();
    assert_eq!(
        tokens,
        vec![
            (TokenKind::Let, "let".to_string()),
            (TokenKind::Ident, "x".to_string()),
            (TokenKind::Assign, "=".to_string()),
            (TokenKind::Int, "5".to_string()),
            (TokenKind::Semicolon, ";".to_string()),
            (TokenKind::Eof, String::new()),
        ]
    );
}

#[test]
fn test_render_precedence() {
    assert_eq!(parse_ok("1 + 2 * 3;").to_string(), "(1 + (2 * 3))");
}

#[test]
fn test_let_and_arithmetic() {
    assert_eq!(run("let a = 5; a + a;"), Object::Integer(10));
}

#[test]
fn test_if_without_else_is_null() {
    assert_eq!(run("if (false) { 10 }"), NULL);
}

#[test]
fn test_immediate_call() {
    assert_eq!(run("fn(x) { x + 2; }(5);"), Object::Integer(7));
}

#[test]
fn test_closure_outlives_defining_call() {
    let source = "
        let makeCounter = fn(start) {
            let step = 3;
            fn(n) { start + n * step }
        };
        let counter = makeCounter(10);
        counter(2);";
    assert_eq!(run(source), Object::Integer(16));
}

#[test]
fn test_len_builtin() {
    assert_eq!(run(r#"len("hello")"#), Object::Integer(5));
    let err = run("len(1)");
    assert!(err.is_error());
    assert!(err.to_string().contains("INTEGER"));
}

#[test]
fn test_missing_elements_are_null() {
    assert_eq!(run("[1, 2, 3][10]"), NULL);
    assert_eq!(run(r#"{"a": 1}["b"]"#), NULL);
}

#[test]
fn test_env_persists_between_programs() {
    let env = new_environment();
    let mut interp = Interpreter::new();
    interp.eval(&parse_ok("let double = fn(x) { x * 2 };"), &env);
    assert_eq!(
        interp.eval(&parse_ok("double(21)"), &env),
        Object::Integer(42)
    );
}

#[test]
fn test_recursive_program() {
    let source = "
        let fact = fn(n) { if (n < 2) { return 1; } n * fact(n - 1) };
        let people = [{\"name\": \"Alice\", \"age\": 24}, {\"name\": \"Anna\", \"age\": 28}];
        fact(people[1][\"age\"] / 4);";
    assert_eq!(run(source), Object::Integer(5040));
}

#[test]
fn test_syntax_errors_are_collected() {
    let (_, errors) = parse("let = 1; let y 2; let z = 3;");
    let messages: Vec<_> = errors.iter().map(|e| e.message()).collect();
    assert_eq!(
        messages,
        vec![
            "expected next token to be IDENT, got = instead",
            "expected next token to be =, got INT instead",
        ]
    );
}

#[test]
fn test_ast_serializes_to_json() {
    let program = parse_ok("let x = -1;");
    let json = serde_json::to_value(&program).expect("serialize");
    assert!(json["statements"].is_array());
    let back: Program = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back, program);
}

#[test]
fn test_repl_session() {
    let mut session = Session::default();
    assert_eq!(session.eval_line("let xs = [1, 2, 3];"), Outcome::Silent);
    let Outcome::Value(value) = session.eval_line("push(xs, len(xs) + 1)") else {
        panic!("Expected a value");
    };
    assert_eq!(value.to_string(), "[1, 2, 3, 4]");
    assert!(matches!(session.eval_line("let = ;"), Outcome::ParseErrors(_)));
}

#[test]
fn test_deeply_nested_expressions_evaluate() {
    const DEEP: usize = 50_000;
    assert_eq!(
        run(&format!("{}1", "-".repeat(DEEP))),
        Object::Integer(1)
    );
    assert_eq!(
        run(&format!("{}7{}", "(".repeat(DEEP), ")".repeat(DEEP))),
        Object::Integer(7)
    );
    assert_eq!(
        run(&format!("{}true", "!".repeat(DEEP + 1))),
        Object::Boolean(false)
    );
}

#[test]
fn test_long_operator_chain_evaluates() {
    let source = vec!["1"; 50_000].join(" + ");
    let program = parse_ok(&source);
    assert!(program.to_string().starts_with("(((("));
    assert_eq!(
        eval(&program, &new_environment()),
        Object::Integer(50_000)
    );
}

// ============================================
// Property tests
// ============================================

fn arb_leaf() -> impl Strategy<Value = String> {
    prop_oneof![
        (0i64..1000).prop_map(|n| n.to_string()),
        Just("true".to_string()),
        Just("false".to_string()),
        "[a-z ]{0,6}".prop_map(|s| format!("\"{s}\"")),
    ]
}

fn arb_binop() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("+"),
        Just("-"),
        Just("*"),
        Just("/"),
        Just("<"),
        Just(">"),
        Just("=="),
        Just("!="),
    ]
}

/// Expressions without hashes, whose rendering order is unspecified
fn arb_expr() -> impl Strategy<Value = String> {
    arb_leaf().prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            (inner.clone(), arb_binop(), inner.clone())
                .prop_map(|(l, op, r)| format!("{l} {op} {r}")),
            (prop_oneof![Just("-"), Just("!")], inner.clone())
                .prop_map(|(op, e)| format!("{op}({e})")),
            (inner.clone(), inner.clone(), inner.clone())
                .prop_map(|(c, a, b)| format!("if ({c}) {{ {a} }} else {{ {b} }}")),
            prop::collection::vec(inner.clone(), 0..4)
                .prop_map(|elems| format!("[{}]", elems.join(", "))),
            (inner.clone(), 0i64..3).prop_map(|(e, i)| format!("[{e}, {e}][{i}]")),
            (inner.clone(), inner)
                .prop_map(|(body, arg)| format!("fn(x) {{ x; {body} }}({arg})")),
        ]
    })
}

fn arb_program() -> impl Strategy<Value = String> {
    (arb_expr(), arb_expr(), arb_expr())
        .prop_map(|(a, b, c)| format!("let a = {a}; let b = {b}; if (a) {{ b }} else {{ {c} }}"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn lexer_no_panic(input in ".{0,100}") {
        let tokens = tokenize(&input);
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn parser_no_panic(input in ".{0,100}") {
        let _ = parse(&input);
    }

    #[test]
    fn rendering_reparses_to_same_tree(source in arb_program()) {
        let program = parse_ok(&source);
        let rendered = program.to_string();
        let (reparsed, errors) = parse(&rendered);
        prop_assert!(errors.is_empty(), "{} -> {:?}", rendered, errors);
        prop_assert_eq!(&reparsed, &program);
        prop_assert_eq!(reparsed.to_string(), rendered);
    }

    #[test]
    fn rendering_preserves_result(source in arb_program()) {
        let program = parse_ok(&source);
        let rendered = parse_ok(&program.to_string());
        let original = eval(&program, &new_environment());
        let roundtrip = eval(&rendered, &new_environment());
        prop_assert_eq!(original.to_string(), roundtrip.to_string());
    }

    #[test]
    fn evaluation_is_deterministic(source in arb_program()) {
        let program = parse_ok(&source);
        let first = eval(&program, &new_environment());
        let second = eval(&program, &new_environment());
        prop_assert_eq!(first.to_string(), second.to_string());
    }
}
