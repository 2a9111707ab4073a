//! Tests for the bytecode compiler.

use super::*;
use crate::Error;
use crate::ast::Operator;
use crate::parser::Parser;
use crate::symbol::{Symbol, SymbolType};

fn compile_source(src: &str) -> Result<Bytecode, Error> {
    let mut parser = Parser::new(src);
    let contract = parser.parse_contract()?;
    Compiler::new().compile(&contract)
}

fn compile_ok(src: &str) -> Bytecode {
    compile_source(src).expect("Compilation should succeed")
}

/// Compiles a single function and returns its disassembly.
fn asm_of(function: &str) -> String {
    compile_ok(&format!("contract {{ {function} }}")).code.to_string()
}

/// Compiles a contract that must fail and returns its function errors.
fn function_errors(src: &str) -> Vec<FunctionError> {
    match compile_source(src) {
        Err(Error::Compile(errors)) => errors,
        other => panic!("expected compile errors, got {other:?}"),
    }
}

fn single_error(function: &str) -> CompileError {
    let mut errors = function_errors(&format!("contract {{ {function} }}"));
    assert_eq!(errors.len(), 1);
    errors.remove(0).error
}

#[test]
fn test_compiler_default() {
    let compiler = Compiler::default();
    assert!(!compiler.parallel);
}

#[test]
fn test_compile_empty_contract() {
    let bytecode = compile_ok("contract {}");
    assert!(bytecode.code.is_empty());
    assert!(bytecode.functions.is_empty());
}

#[test]
fn test_compile_empty_function() {
    assert_eq!(asm_of("func f() {}"), "[JUMPDEST RETURNING]");
}

#[test]
fn test_parameter_resolves_in_function_scope() {
    let contract = Parser::new("contract { func f(a int) int { return a } }")
        .parse_contract()
        .unwrap();
    let global = crate::symbol::declare_functions(&contract).unwrap();

    let f = global.read().resolve("f").unwrap();
    let a = f.scope().unwrap().read().resolve("a").unwrap();
    assert_eq!(a.symbol_type(), SymbolType::Integer);
    assert_eq!(a.to_string(), "a");
    assert_eq!(*a, Symbol::Integer(crate::ast::Identifier::new("a")));

    assert_eq!(
        asm_of("func f(a int) int { return a }"),
        "[JUMPDEST PUSH 00000000 LOADARGS RETURNING RETURNING]"
    );
}

#[test]
fn test_compile_literals() {
    assert_eq!(
        asm_of("func f() int { return 42 }"),
        "[JUMPDEST PUSH 0000002a RETURNING RETURNING]"
    );
    assert_eq!(
        asm_of("func f() bool { return true }"),
        "[JUMPDEST PUSH 00000001 RETURNING RETURNING]"
    );
    assert_eq!(
        asm_of("func f() string { return \"abcde\" }"),
        "[JUMPDEST PUSH 61626364 PUSH 65000000 RETURNING RETURNING]"
    );
}

#[test]
fn test_compile_locals() {
    assert_eq!(
        asm_of("func f() int { int a = 5 string b = \"ab\" return a }"),
        "[JUMPDEST \
         PUSH 00000005 PUSH 00000000 PUSH 00000004 MSTORE \
         PUSH 61620000 PUSH 00000004 PUSH 00000002 MSTORE \
         PUSH 00000000 PUSH 00000004 MLOAD \
         RETURNING RETURNING]"
    );
}

#[test]
fn test_compile_string_local_load() {
    assert_eq!(
        asm_of("func f() string { string s = \"hey\" return s }"),
        "[JUMPDEST PUSH 68657900 PUSH 00000000 PUSH 00000003 MSTORE \
         PUSH 00000000 PUSH 00000003 MLOAD RETURNING RETURNING]"
    );
}

#[test]
fn test_compile_arithmetic() {
    assert_eq!(
        asm_of("func f(a int, b int) int { return a + b * 2 }"),
        "[JUMPDEST PUSH 00000000 LOADARGS PUSH 00000001 LOADARGS PUSH 00000002 MUL ADD \
         RETURNING RETURNING]"
    );
}

#[test]
fn test_compile_comparisons() {
    let cases = [
        ("<", "LT"),
        (">", "GT"),
        ("==", "EQ"),
        ("<=", "GT NOT"),
        (">=", "LT NOT"),
        ("!=", "EQ NOT"),
    ];
    for (op, code) in cases {
        assert_eq!(
            asm_of(&format!("func f(a int, b int) bool {{ return a {op} b }}")),
            format!(
                "[JUMPDEST PUSH 00000000 LOADARGS PUSH 00000001 LOADARGS {code} \
                 RETURNING RETURNING]"
            ),
            "operator {op}"
        );
    }
}

#[test]
fn test_compile_logical_and_prefix() {
    assert_eq!(
        asm_of("func f(a bool, b bool) bool { return !a && b || false }"),
        "[JUMPDEST PUSH 00000000 LOADARGS NOT PUSH 00000001 LOADARGS AND PUSH 00000000 OR \
         RETURNING RETURNING]"
    );
    assert_eq!(
        asm_of("func f(a int) int { return -a }"),
        "[JUMPDEST PUSH 00000000 PUSH 00000000 LOADARGS SUB RETURNING RETURNING]"
    );
}

#[test]
fn test_expression_statement_pops() {
    assert_eq!(
        asm_of("func f(a int) { a + 1 }"),
        "[JUMPDEST PUSH 00000000 LOADARGS PUSH 00000001 ADD POP RETURNING]"
    );
}

#[test]
fn test_compile_if_backpatch() {
    let bytecode = compile_ok("contract { func f(a bool) int { if (a) { return 1 } return 0 } }");
    assert_eq!(
        bytecode.code.to_string(),
        "[JUMPDEST PUSH 00000000 LOADARGS NOT PUSH 00000014 JUMPI PUSH 00000001 RETURNING \
         JUMPDEST PUSH 00000000 RETURNING RETURNING]"
    );

    let raw = bytecode.to_raw_byte_code();
    assert_eq!(raw[0x14], OpCode::Jumpdest.as_byte());
}

#[test]
fn test_compile_if_else_backpatch() {
    let bytecode =
        compile_ok("contract { func f(a bool) int { if (a) { return 1 } else { return 2 } } }");
    assert_eq!(
        bytecode.code.to_string(),
        "[JUMPDEST PUSH 00000000 LOADARGS NOT PUSH 0000001a JUMPI PUSH 00000001 RETURNING \
         PUSH 00000021 JUMP JUMPDEST PUSH 00000002 RETURNING JUMPDEST RETURNING]"
    );

    let raw = bytecode.to_raw_byte_code();
    assert_eq!(raw[0x1a], OpCode::Jumpdest.as_byte());
    assert_eq!(raw[0x21], OpCode::Jumpdest.as_byte());
}

#[test]
fn test_no_placeholder_survives() {
    let bytecode = compile_ok(
        "contract { func f(a int) int {
            if (a > 1) {
                if (a > 2) { return 3 } else { return 2 }
            } else {
                return 1
            }
            return 0
        } }",
    );

    // every pushed jump target lands on a JUMPDEST
    let raw = bytecode.to_raw_byte_code();
    let units = &bytecode.code.asm_codes;
    for (i, code) in units.iter().enumerate() {
        if matches!(code.opcode(), Some(OpCode::Jump | OpCode::Jumpi)) {
            let target = bytecode.code.operand_at(i - 1).unwrap().to_u32() as usize;
            assert_eq!(raw[target], OpCode::Jumpdest.as_byte(), "jump at unit {i}");
        }
    }
}

#[test]
fn test_link_relocates_jumps() {
    let bytecode = compile_ok(
        "contract {
            func g() {}
            func f(a bool) int { if (a) { return 1 } return 0 }
        }",
    );

    assert_eq!(
        bytecode.functions,
        vec![
            FuncEntry {
                name: "g".into(),
                offset: 0,
            },
            FuncEntry {
                name: "f".into(),
                offset: 2,
            },
        ]
    );
    assert_eq!(bytecode.function_offset("f"), Some(2));

    // relative target 0x14 shifted by g's two bytes
    let raw = bytecode.to_raw_byte_code();
    assert_eq!(&raw[2 + 9..2 + 13], &[0, 0, 0, 0x16]);
    assert_eq!(raw[0x16], OpCode::Jumpdest.as_byte());
}

#[test]
fn test_link_empty() {
    let bytecode = link(Vec::new()).unwrap();
    assert!(bytecode.code.is_empty());
}

#[test]
fn test_disassemble_linked_code() {
    let bytecode = compile_ok(
        "contract {
            func g(x int) bool { return x >= 10 }
            func f(a bool) string { if (a) { return \"yes\" } else { return \"no\" } }
        }",
    );
    let decoded = Asm::disassemble(&bytecode.to_raw_byte_code()).unwrap();
    assert_eq!(decoded, bytecode.code);
}

#[test]
fn test_parallel_matches_sequential() {
    let src = "contract {
        func a(x int) int { int y = x * 2 return y }
        func b(x bool) int { if (x) { return 1 } else { return 2 } }
        func c() string { string s = \"hello world\" return s }
        func d(p int, q int) bool { return p != q }
    }";
    let contract = Parser::new(src).parse_contract().unwrap();
    let sequential = Compiler::new().compile(&contract).unwrap();
    let parallel = Compiler::new().with_parallel(true).compile(&contract).unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn test_functions_have_separate_memory() {
    let bytecode = compile_ok(
        "contract {
            func f() int { int a = 1 return a }
            func g() int { int b = 2 return b }
        }",
    );
    let text = bytecode.code.to_string();
    // both locals sit at offset 0 of their own function's memory
    assert_eq!(text.matches("PUSH 00000000 PUSH 00000004 MSTORE").count(), 2);
}

#[test]
fn test_error_undefined_symbol() {
    assert_eq!(
        single_error("func f() int { return x }"),
        CompileError::Undefined("x".into())
    );
}

#[test]
fn test_error_local_used_before_assignment() {
    assert_eq!(
        single_error("func f() int { int a = a return a }"),
        CompileError::Undefined("a".into())
    );
}

#[test]
fn test_error_type_mismatch_in_assignment() {
    assert_eq!(
        single_error("func f() { int a = \"text\" }"),
        CompileError::TypeMismatch {
            expected: DataStructure::Int,
            found: DataStructure::String,
        }
    );
}

#[test]
fn test_error_type_mismatch_in_operands() {
    assert!(matches!(
        single_error("func f(a int, b bool) int { return a + b }"),
        CompileError::TypeMismatch { .. }
    ));
    assert!(matches!(
        single_error("func f(a int) bool { return a == true }"),
        CompileError::TypeMismatch { .. }
    ));
}

#[test]
fn test_error_return_type() {
    assert_eq!(
        single_error("func f() { return 1 }"),
        CompileError::TypeMismatch {
            expected: DataStructure::Void,
            found: DataStructure::Int,
        }
    );
    assert_eq!(
        single_error("func f() int { return }"),
        CompileError::TypeMismatch {
            expected: DataStructure::Int,
            found: DataStructure::Void,
        }
    );
}

#[test]
fn test_error_if_condition_not_bool() {
    assert_eq!(
        single_error("func f(a int) { if (a) {} }"),
        CompileError::TypeMismatch {
            expected: DataStructure::Bool,
            found: DataStructure::Int,
        }
    );
}

#[test]
fn test_error_redefinition() {
    assert_eq!(
        single_error("func f() { int a = 1 int a = 2 }"),
        CompileError::Symbol(SymbolError::Redefined("a".into()))
    );
    assert_eq!(
        single_error("func f(a int) { int a = 1 }"),
        CompileError::Symbol(SymbolError::Redefined("a".into()))
    );
}

#[test]
fn test_error_function_is_not_a_value() {
    let errors = function_errors("contract { func g() {} func f() int { return g } }");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].function, "f");
    assert_eq!(errors[0].error, CompileError::NotAValue("g".into()));
}

#[test]
fn test_error_integer_overflow() {
    assert_eq!(
        single_error("func f() int { return 3000000000 }"),
        CompileError::IntegerOverflow(3_000_000_000)
    );
}

#[test]
fn test_errors_are_aggregated() {
    let errors = function_errors(
        "contract {
            func ok() int { return 1 }
            func bad1() int { return nope }
            func bad2() { int a = true }
        }",
    );
    let names: Vec<_> = errors.iter().map(|e| e.function.as_str()).collect();
    assert_eq!(names, vec!["bad1", "bad2"]);
    assert_eq!(errors[0].to_string(), "func bad1: undefined symbol 'nope'");
}

#[test]
fn test_duplicate_function_is_declaration_error() {
    assert!(matches!(
        compile_source("contract { func f() {} func f() {} }"),
        Err(Error::Symbol(SymbolError::Redefined(name))) if name == "f"
    ));
}

#[test]
fn test_prefix_operator_codes() {
    // `Bang` is only ever a prefix operator, but still maps to NOT
    let function = FunctionLiteral {
        name: crate::ast::Identifier::new("f"),
        parameters: Vec::new(),
        return_type: DataStructure::Bool,
        body: crate::ast::BlockStatement {
            statements: vec![crate::ast::Statement::Return(crate::ast::ReturnStatement {
                return_value: Some(crate::ast::Expression::prefix(Operator::Bang, false)),
            })],
        },
    };
    let contract = Contract {
        functions: vec![function],
    };
    let bytecode = Compiler::new().compile(&contract).unwrap();
    assert_eq!(
        bytecode.code.to_string(),
        "[JUMPDEST PUSH 00000000 NOT RETURNING RETURNING]"
    );
}

#[test]
fn test_string_equality_is_rejected() {
    assert_eq!(
        single_error("func f() bool { return \"abcde\" == \"abcdx\" }"),
        CompileError::UnsupportedOperator {
            operator: Operator::Eq,
            operand: DataStructure::String,
        }
    );
    assert_eq!(
        single_error("func f(a string, b string) bool { return a != b }"),
        CompileError::UnsupportedOperator {
            operator: Operator::NotEq,
            operand: DataStructure::String,
        }
    );
    assert_eq!(
        single_error("func f() bool { return \"a\" == \"a\" }").to_string(),
        "operator '==' is not defined for string"
    );
}

#[test]
fn test_string_expression_statement_pops_every_word() {
    assert_eq!(
        asm_of("func f() { \"abcdefgh\" }"),
        "[JUMPDEST PUSH 61626364 PUSH 65666768 POP POP RETURNING]"
    );
    assert_eq!(
        asm_of("func f() { \"\" }"),
        "[JUMPDEST PUSH 00000000 POP RETURNING]"
    );
    assert_eq!(
        asm_of("func f() { string s = \"abcdefghi\" s }"),
        "[JUMPDEST PUSH 61626364 PUSH 65666768 PUSH 69000000 \
         PUSH 00000000 PUSH 00000009 MSTORE \
         PUSH 00000000 PUSH 00000009 MLOAD POP POP POP RETURNING]"
    );
    assert_eq!(
        asm_of("func f(s string) { s }"),
        "[JUMPDEST PUSH 00000000 LOADARGS POP RETURNING]"
    );
}

#[test]
fn test_string_copy_keeps_source_size() {
    assert_eq!(
        asm_of("func f() string { string s = \"abcdefghi\" string t = s return t }"),
        "[JUMPDEST PUSH 61626364 PUSH 65666768 PUSH 69000000 \
         PUSH 00000000 PUSH 00000009 MSTORE \
         PUSH 00000000 PUSH 00000009 MLOAD \
         PUSH 00000009 PUSH 00000009 MSTORE \
         PUSH 00000009 PUSH 00000009 MLOAD RETURNING RETURNING]"
    );
}

#[test]
fn test_expression_statement_is_type_checked() {
    assert!(matches!(
        single_error("func f(a int) { a + true }"),
        CompileError::TypeMismatch { .. }
    ));
}

#[test]
fn test_branch_locals_end_with_the_branch() {
    assert_eq!(
        single_error("func f(c bool) int { if (c) { int x = 1 } return x }"),
        CompileError::Undefined("x".into())
    );
    assert_eq!(
        single_error("func f(c bool) int { if (c) {} else { int y = 1 } return y }"),
        CompileError::Undefined("y".into())
    );
}

#[test]
fn test_sibling_branches_may_reuse_names() {
    let text = asm_of(
        "func f(c bool) int {
            if (c) { int x = 1 return x } else { int x = 2 return x }
            return 0
        }",
    );
    // each branch gets its own slot
    assert!(text.contains("PUSH 00000001 PUSH 00000000 PUSH 00000004 MSTORE"));
    assert!(text.contains("PUSH 00000002 PUSH 00000004 PUSH 00000004 MSTORE"));
    assert!(text.contains("PUSH 00000004 PUSH 00000004 MLOAD RETURNING"));
}

#[test]
fn test_inner_local_shadows_outer() {
    let text = asm_of("func f(c bool) int { int x = 1 if (c) { int x = 2 } return x }");
    assert!(text.contains("PUSH 00000002 PUSH 00000004 PUSH 00000004 MSTORE"));
    assert!(text.ends_with("PUSH 00000000 PUSH 00000004 MLOAD RETURNING RETURNING]"));

    let text = asm_of("func f(a int) int { if (true) { int a = 7 return a } return a }");
    assert!(text.contains("PUSH 00000000 PUSH 00000004 MLOAD RETURNING"));
    assert!(text.ends_with("PUSH 00000000 LOADARGS RETURNING RETURNING]"));
}

#[test]
fn test_nested_blocks_see_enclosing_locals() {
    let text = asm_of(
        "func f(c bool) int {
            int total = 1
            if (c) { if (c) { int inner = total + 1 return inner } }
            return total
        }",
    );
    assert!(text.contains("PUSH 00000000 PUSH 00000004 MLOAD PUSH 00000001 ADD"));
}
