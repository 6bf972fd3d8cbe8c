//! Unit tests for the parser module.
//!
//! This module contains tests for parsing the language constructs including:
//! - Function and variable declarations
//! - Operator precedence and associativity
//! - Control flow statements
//! - Error recovery

use indoc::indoc;
use pretty_assertions::assert_eq;

use crate::{
    ast::{
        ast::{dump_functions, FunctionDecl},
        expressions::Expr,
        statements::Stmt,
        types::Type,
    },
    errors::{diagnostics::Diagnostics, errors::ErrorClass},
    lexer::lexer::tokenize,
};

use super::parser::parse;

fn parse_source(source: &str) -> (Vec<FunctionDecl>, bool, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let tokens = tokenize(source, Some("test.num".to_string()), &mut diagnostics);
    let (functions, incomplete) = parse(tokens, &mut diagnostics);
    (functions, incomplete, diagnostics)
}

fn dump_source(source: &str) -> String {
    let (functions, incomplete, diagnostics) = parse_source(source);
    assert!(!incomplete, "unexpected syntax errors: {:?}", diagnostics.messages());
    dump_functions(&functions)
}

#[test]
fn test_parse_function_declaration() {
    let (functions, incomplete, diagnostics) =
        parse_source("fn add(a: number, b: number): number { return a + b; }");

    assert!(!incomplete);
    assert!(diagnostics.is_empty());
    assert_eq!(functions.len(), 1);

    let add = &functions[0];
    assert_eq!(add.identifier, "add");
    assert_eq!(add.return_type, Type::Number);
    assert_eq!(add.params.len(), 2);
    assert_eq!(add.params[1].identifier, "b");
    assert!(matches!(add.body.statements[0], Stmt::Return(_)));
}

#[test]
fn test_parse_precedence() {
    let dump = dump_source("fn main(): void { 1 + 2 * 3; }");

    assert_eq!(
        dump,
        indoc! {"
            FunctionDecl: main:void
              Block
                BinaryOperator: '+'
                  NumberLiteral: '1'
                  BinaryOperator: '*'
                    NumberLiteral: '2'
                    NumberLiteral: '3'
        "}
    );
}

#[test]
fn test_parse_logical_precedence() {
    let dump = dump_source("fn main(): void { x = a || b && c == d < e; }");

    assert_eq!(
        dump,
        indoc! {"
            FunctionDecl: main:void
              Block
                Assignment
                  DeclRefExpr: x
                  BinaryOperator: '||'
                    DeclRefExpr: a
                    BinaryOperator: '&&'
                      DeclRefExpr: b
                      BinaryOperator: '=='
                        DeclRefExpr: c
                        BinaryOperator: '<'
                          DeclRefExpr: d
                          DeclRefExpr: e
        "}
    );
}

#[test]
fn test_parse_left_associativity() {
    let dump = dump_source("fn main(): void { 1 - 2 - 3; }");

    assert_eq!(
        dump,
        indoc! {"
            FunctionDecl: main:void
              Block
                BinaryOperator: '-'
                  BinaryOperator: '-'
                    NumberLiteral: '1'
                    NumberLiteral: '2'
                  NumberLiteral: '3'
        "}
    );
}

#[test]
fn test_parse_unary_and_calls() {
    let dump = dump_source("fn main(): void { -f(1, 2) * !(a == b); }");

    assert_eq!(
        dump,
        indoc! {"
            FunctionDecl: main:void
              Block
                BinaryOperator: '*'
                  UnaryOperator: '-'
                    CallExpr
                      DeclRefExpr: f
                      NumberLiteral: '1'
                      NumberLiteral: '2'
                  UnaryOperator: '!'
                    GroupingExpr
                      BinaryOperator: '=='
                        DeclRefExpr: a
                        DeclRefExpr: b
        "}
    );
}

#[test]
fn test_parse_declarations() {
    let dump = dump_source("fn main(): void { let x: number = 1; var y: number; y = x; }");

    assert_eq!(
        dump,
        indoc! {"
            FunctionDecl: main:void
              Block
                DeclStmt
                  VarDecl: let x:number
                    NumberLiteral: '1'
                DeclStmt
                  VarDecl: var y:number
                Assignment
                  DeclRefExpr: y
                  DeclRefExpr: x
        "}
    );
}

#[test]
fn test_parse_else_if_chain() {
    let dump = dump_source(indoc! {"
        fn f(x: number): number {
            if x < 0 { return 0; } else if x > 10 { return 10; } else { return x; }
        }
    "});

    assert_eq!(
        dump,
        indoc! {"
            FunctionDecl: f:number
              ParamDecl: x:number
              Block
                IfStmt
                  BinaryOperator: '<'
                    DeclRefExpr: x
                    NumberLiteral: '0'
                  Block
                    ReturnStmt
                      NumberLiteral: '0'
                  Block
                    IfStmt
                      BinaryOperator: '>'
                        DeclRefExpr: x
                        NumberLiteral: '10'
                      Block
                        ReturnStmt
                          NumberLiteral: '10'
                      Block
                        ReturnStmt
                          DeclRefExpr: x
        "}
    );
}

#[test]
fn test_parse_while_loop() {
    let dump = dump_source("fn main(): void { var i: number = 0; while i < 10 { i = i + 1; } }");

    assert_eq!(
        dump,
        indoc! {"
            FunctionDecl: main:void
              Block
                DeclStmt
                  VarDecl: var i:number
                    NumberLiteral: '0'
                WhileStmt
                  BinaryOperator: '<'
                    DeclRefExpr: i
                    NumberLiteral: '10'
                  Block
                    Assignment
                      DeclRefExpr: i
                      BinaryOperator: '+'
                        DeclRefExpr: i
                        NumberLiteral: '1'
        "}
    );
}

#[test]
fn test_parse_custom_type_is_kept() {
    let (functions, incomplete, _) = parse_source("fn f(s: string): void {}");

    assert!(!incomplete);
    assert_eq!(
        functions[0].params[0].param_type,
        Type::Custom("string".to_string())
    );
}

#[test]
fn test_recover_from_missing_expression() {
    let (functions, incomplete, diagnostics) =
        parse_source("fn main(): void { let x: number = ; x = 1; }");

    assert!(incomplete);
    assert_eq!(diagnostics.messages(), vec!["expected expression"]);

    let error = diagnostics.iter().next().unwrap();
    assert_eq!(error.get_error_class(), ErrorClass::Parse);
    assert_eq!(error.get_position().column, 35);

    assert_eq!(functions.len(), 1);
    let statements = &functions[0].body.statements;
    assert_eq!(statements.len(), 1);
    assert!(matches!(&statements[0], Stmt::Assignment(a) if a.variable.identifier == "x"));
}

#[test]
fn test_recover_reports_every_statement() {
    let (functions, incomplete, diagnostics) = parse_source(indoc! {"
        fn main(): void {
            1 +;
            foo(;
            if 1 { 2 }
        }

        fn other(): void {}
    "});

    assert!(incomplete);
    assert_eq!(
        diagnostics.messages(),
        vec![
            "expected expression",
            "expected expression",
            "expected ';' at the end of expression",
        ]
    );
    assert_eq!(functions.len(), 2);
    assert_eq!(functions[1].identifier, "other");
}

#[test]
fn test_missing_semicolon() {
    let (_, incomplete, diagnostics) = parse_source("fn main(): void { x }");

    assert!(incomplete);
    assert_eq!(
        diagnostics.messages(),
        vec!["expected ';' at the end of expression"]
    );
}

#[test]
fn test_top_level_statement() {
    let (functions, incomplete, diagnostics) =
        parse_source("let x: number = 1; fn main(): void {}");

    assert!(incomplete);
    assert_eq!(
        diagnostics.messages(),
        vec!["only function declarations are allowed on the top level"]
    );
    assert_eq!(functions.len(), 1);
    assert_eq!(functions[0].identifier, "main");
}

#[test]
fn test_unterminated_block() {
    let (functions, incomplete, diagnostics) = parse_source("fn a(): void { 1; fn b(): void {}");

    assert!(incomplete);
    assert_eq!(
        diagnostics.messages(),
        vec!["expected '}' at the end of a block"]
    );
    assert_eq!(functions.len(), 1);
    assert_eq!(functions[0].identifier, "b");
}

#[test]
fn test_invalid_assignment_target() {
    let (_, incomplete, diagnostics) = parse_source("fn main(): void { 1 = 2; f() = 3; }");

    assert!(incomplete);
    assert_eq!(
        diagnostics.messages(),
        vec![
            "expected variable on the LHS of an assignment",
            "expected variable on the LHS of an assignment",
        ]
    );
}

#[test]
fn test_function_header_errors() {
    let (_, _, diagnostics) = parse_source(indoc! {"
        fn (): void {}
        fn a: void {}
        fn b() void {}
        fn c(): {}
        fn d(): void
        fn e(1): void {}
        fn f(x number): void {}
    "});

    assert_eq!(
        diagnostics.messages(),
        vec![
            "expected identifier",
            "expected '('",
            "expected ':'",
            "expected type specifier",
            "expected function body",
            "expected parameter declaration",
            "expected ':'",
        ]
    );
}

#[test]
fn test_statement_errors() {
    let (_, _, diagnostics) = parse_source(indoc! {"
        fn main(): void {
            if 1 return;
            while 1 2;
            if 1 {} else 3;
            let : number;
            let x number;
            return 1
        }

        fn other(): void {
            let y: number = 1
        }
    "});

    assert_eq!(
        diagnostics.messages(),
        vec![
            "expected 'if' body",
            "expected 'while' body",
            "expected 'else' body",
            "expected identifier",
            "expected ':'",
            "expected ';' at the end of a return statement",
            "expected ';' after declaration",
        ]
    );
}

#[test]
fn test_unclosed_call_and_grouping() {
    let (_, _, diagnostics) = parse_source("fn main(): void { f(1 2); (1; }");

    assert_eq!(diagnostics.messages(), vec!["expected ')'", "expected ')'"]);
}

#[test]
fn test_call_callee_is_expression() {
    let (functions, _, _) = parse_source("fn main(): void { (f)(1); }");

    let Stmt::Expression(Expr::Call(call)) = &functions[0].body.statements[0] else {
        panic!("expected a call statement");
    };
    assert!(matches!(*call.callee, Expr::Grouping(_)));
    assert_eq!(call.arguments.len(), 1);
}
