//! Tests for the parser.

use super::*;
use crate::ast::{DataStructure, Statement};
use crate::lexer::{TokenBuffer, tokenize};

fn parse(src: &str) -> Result<crate::ast::Contract, ParseError> {
    Parser::new(src).parse_contract()
}

fn parse_ok(src: &str) -> crate::ast::Contract {
    parse(src).expect("Should parse")
}

/// Wraps statements in `contract { func <name>(<args>) <ret> { ... } }`,
/// one statement per line.
fn contract_with(name: &str, args: &str, ret: &str, stmts: &[&str]) -> String {
    let mut src = format!("contract {{\n    func {name}({args}) {ret} {{\n");
    for stmt in stmts {
        src.push_str("        ");
        src.push_str(stmt);
        src.push('\n');
    }
    src.push_str("    }\n}\n");
    src
}

fn single_statement(src: &str) -> Statement {
    let contract = parse_ok(src);
    assert_eq!(contract.functions.len(), 1);
    let body = &contract.functions[0].body;
    assert_eq!(body.statements.len(), 1, "body: {}", body);
    body.statements[0].clone()
}

fn parse_expr(expr: &str) -> String {
    let src = contract_with("f", "", "", &[expr]);
    match single_statement(&src) {
        Statement::Expression(stmt) => stmt.expr.to_string(),
        other => panic!("expected expression statement, got {other}"),
    }
}

#[test]
fn test_parse_empty_contract() {
    let contract = parse_ok("contract {}");
    assert!(contract.functions.is_empty());
    assert_eq!(contract.to_string(), "contract { }");
}

#[test]
fn test_parse_function_header() {
    let contract = parse_ok("contract { func add(a int, b string, c bool) int {} }");
    let function = &contract.functions[0];
    assert_eq!(function.name.value, "add");
    assert_eq!(function.return_type, DataStructure::Int);

    let params: Vec<_> = function
        .parameters
        .iter()
        .map(|p| (p.identifier.value.as_str(), p.ty))
        .collect();
    assert_eq!(
        params,
        vec![
            ("a", DataStructure::Int),
            ("b", DataStructure::String),
            ("c", DataStructure::Bool),
        ]
    );
}

#[test]
fn test_parse_missing_return_type_is_void() {
    let contract = parse_ok("contract { func f() {} }");
    assert_eq!(contract.functions[0].return_type, DataStructure::Void);
    assert!(contract.functions[0].parameters.is_empty());
}

#[test]
fn test_return_statement() {
    let cases = [
        ("", "", "return 1", "return 1"),
        ("a int", "int", "return a", "return a"),
        ("a int", "int", "return (\na)", "return a"),
        ("", "", "return", "return"),
    ];

    for (args, ret, stmt, expected) in cases {
        let src = contract_with("returnStatement", args, ret, &[stmt]);
        let parsed = single_statement(&src);
        assert!(matches!(parsed, Statement::Return(_)));
        assert_eq!(parsed.to_string(), expected, "source: {src}");
    }
}

#[test]
fn test_return_statement_in_two_functions() {
    let src = "contract {
        func returnStatement4(a int) int { return (
            a) }
        func returnStatement4_1(b int) int { return (
            b) }
    }";
    let contract = parse_ok(src);
    assert_eq!(contract.functions.len(), 2);
    assert_eq!(contract.functions[0].body.to_string(), "{ return a }");
    assert_eq!(contract.functions[1].body.to_string(), "{ return b }");
    assert_eq!(contract.functions[1].parameters[0].identifier.value, "b");
}

#[test]
fn test_assign_statement() {
    let cases = [
        ("int a = 1", DataStructure::Int, "a", "1"),
        ("string s = \"hello\"", DataStructure::String, "s", "\"hello\""),
        ("bool ok = true", DataStructure::Bool, "ok", "true"),
        ("int b = a + 2 * 3", DataStructure::Int, "b", "(a + (2 * 3))"),
    ];

    for (stmt, ty, variable, value) in cases {
        let src = contract_with("f", "", "", &[stmt]);
        match single_statement(&src) {
            Statement::Assign(assign) => {
                assert_eq!(assign.ty, ty);
                assert_eq!(assign.variable.value, variable);
                assert_eq!(assign.value.to_string(), value);
            }
            other => panic!("expected assign statement, got {other}"),
        }
    }
}

#[test]
fn test_if_statement() {
    let src = contract_with(
        "f",
        "a int",
        "int",
        &["if (a > 1) {", "return 1", "}"],
    );
    match single_statement(&src) {
        Statement::If(stmt) => {
            assert_eq!(stmt.condition.to_string(), "(a > 1)");
            assert_eq!(stmt.consequence.statements.len(), 1);
            assert!(stmt.alternative.is_none());
        }
        other => panic!("expected if statement, got {other}"),
    }
}

#[test]
fn test_if_else_statement() {
    let src = contract_with(
        "f",
        "a int",
        "int",
        &[
            "if (a == 1) {",
            "int b = 2",
            "return b",
            "} else {",
            "return 0",
            "}",
        ],
    );
    let stmt = single_statement(&src);
    assert_eq!(
        stmt.to_string(),
        "if ((a == 1)) { int b = 2; return b } else { return 0 }"
    );
}

#[test]
fn test_expression_precedence() {
    let cases = [
        ("a + b * c", "(a + (b * c))"),
        ("a - b - c", "((a - b) - c)"),
        ("a * b / c % d", "(((a * b) / c) % d)"),
        ("(a + b) * c", "((a + b) * c)"),
        ("-a * b", "((-a) * b)"),
        ("!true == false", "((!true) == false)"),
        ("a + b < c", "((a + b) < c)"),
        ("a < b == c > d", "((a < b) == (c > d))"),
        ("a <= b != c >= d", "((a <= b) != (c >= d))"),
        ("a || b && c", "(a || (b && c))"),
        ("a && b || c && d", "((a && b) || (c && d))"),
        ("--a", "(-(-a))"),
        ("\"x\" == \"y\"", "(\"x\" == \"y\")"),
    ];

    for (input, expected) in cases {
        assert_eq!(parse_expr(input), expected, "input: {input}");
    }
}

#[test]
fn test_statements_split_across_lines() {
    let src = contract_with("f", "", "", &["int a = 1", "int b = a", "a + b"]);
    let contract = parse_ok(&src);
    assert_eq!(
        contract.functions[0].body.to_string(),
        "{ int a = 1; int b = a; (a + b) }"
    );
}

#[test]
fn test_parse_from_collected_tokens() {
    let src = "contract { func f(a int) int { return a } }";
    let tokens = tokenize(src);
    let mut parser = Parser::from_buffer(TokenBuffer::new(tokens.into_iter()));
    let contract = parser.parse_contract().unwrap();
    assert_eq!(contract, parse_ok(src));
}

#[test]
fn test_parse_with_rendezvous_queue() {
    let src = contract_with("f", "a int", "int", &["return a + 1"]);
    let contract = Parser::with_capacity(&src, 0).parse_contract().unwrap();
    assert_eq!(contract.functions[0].body.to_string(), "{ return (a + 1) }");
}

#[test]
fn test_error_missing_brace() {
    let err = parse("contract { func f() {").unwrap_err();
    assert!(matches!(
        err.kind,
        ParseErrorKind::Unexpected { ref expected, .. } if expected == "}"
    ));
}

#[test]
fn test_error_reports_location() {
    let err = parse("contract {\n  func f() {\n    int = 1\n  }\n}").unwrap_err();
    assert_eq!(err.line, 3);
    assert_eq!(err.position, 32);
    assert_eq!(
        err.to_string(),
        "line 3, position 32: expected IDENT, found = '='"
    );
}

#[test]
fn test_error_illegal_token() {
    let err = parse("contract { func f() { int a = 1 @ 2 } }").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Illegal("@".into()));
    assert_eq!(err.line, 1);
    assert_eq!(err.position, 32);
}

#[test]
fn test_error_lone_ampersand() {
    let err = parse("contract { func f() { a & b } }").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Illegal("&".into()));
}

#[test]
fn test_error_trailing_input() {
    let err = parse("contract {} func").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::Unexpected { .. }));
    assert_eq!(err.position, 12);
}

#[test]
fn test_error_missing_contract_keyword() {
    assert!(parse("func f() {}").is_err());
    assert!(parse("").is_err());
}

#[test]
fn test_error_integer_overflow() {
    let err = parse("contract { func f() { 99999999999999999999 } }").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::InvalidInteger(_)));
}

#[test]
fn test_error_parameter_without_type() {
    assert!(parse("contract { func f(a) {} }").is_err());
    assert!(parse("contract { func f(a int,) {} }").is_err());
}
