//! Unit tests for the resolver and the flow-sensitive checks.

use indoc::indoc;
use pretty_assertions::assert_eq;

use crate::{
    errors::{diagnostics::Diagnostics, errors::ErrorClass},
    lexer::lexer::tokenize,
    parser::parser::parse,
};

use super::{
    resolved_ast::{DeclId, ResolvedProgram},
    resolver::resolve,
};

fn resolve_source(source: &str) -> (ResolvedProgram, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let tokens = tokenize(source, Some("test.num".to_string()), &mut diagnostics);
    let (functions, incomplete) = parse(tokens, &mut diagnostics);
    assert!(!incomplete, "unexpected syntax errors: {:?}", diagnostics.messages());

    let program = resolve(&functions, &mut diagnostics);
    (program, diagnostics)
}

fn resolution_messages(source: &str) -> Vec<String> {
    resolve_source(source).1.messages()
}

#[test]
fn test_resolved_dump_with_constants() {
    let (program, diagnostics) = resolve_source(indoc! {"
        fn main(): void {
            let x: number = 2 * 3;
            println(x + 1);
        }
    "});

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.messages());
    assert!(program.is_valid());
    assert_eq!(
        program.dump(),
        indoc! {"
            ResolvedFunctionDecl: main:void
              ResolvedBlock
                ResolvedDeclStmt
                  ResolvedVarDecl: let x:number
                    ResolvedBinaryOperator: '*'
                    | value: 6
                      ResolvedNumberLiteral: '2'
                      ResolvedNumberLiteral: '3'
                ResolvedCallExpr
                  ResolvedDeclRefExpr: println
                  ResolvedBinaryOperator: '+'
                  | value: 7
                    ResolvedDeclRefExpr: x
                    ResolvedNumberLiteral: '1'
        "}
    );
}

#[test]
fn test_partially_known_expressions_are_not_recorded() {
    let (program, diagnostics) = resolve_source(indoc! {"
        fn g(x: number): number {
            return x;
        }

        fn add1(x: number): number {
            return 1 + x;
        }

        fn h(y: number): number {
            let z: number = 2 * y;
            if 1 + z {
                return z;
            }
            return 1 + g(y);
        }
    "});

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.messages());
    let dump = program.dump();
    assert!(dump.contains("ResolvedBinaryOperator: '+'"), "{}", dump);
    assert!(!dump.contains("| value:"), "{}", dump);
}

#[test]
fn test_builtin_println_is_first() {
    let (program, _) = resolve_source("fn main(): void {}");

    let println = program.decls.function(DeclId(0));
    assert!(println.is_some_and(|println| println.is_builtin && println.identifier == "println"));
    assert_eq!(program.functions.len(), 1);
    assert!(program.find_function("main").is_some());
    assert!(program.find_function("println").is_none());
}

#[test]
fn test_forward_calls_resolve() {
    let (program, diagnostics) = resolve_source(indoc! {"
        fn main(): void { println(later(2)); }
        fn later(x: number): number { return x * 2; }
    "});

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.messages());
    assert!(program.is_valid());
}

#[test]
fn test_undeclared_symbol_keeps_other_functions() {
    let (program, diagnostics) = resolve_source(indoc! {"
        fn broken(): void { foo(); }
        fn fine(): number { return 1; }
    "});

    assert_eq!(diagnostics.messages(), vec!["symbol 'foo' not found"]);
    assert_eq!(
        diagnostics.iter().next().map(|error| error.get_error_class()),
        Some(ErrorClass::Resolution)
    );
    assert!(!program.is_valid());

    let (_, broken) = program.find_function("broken").unwrap();
    assert!(broken.body.is_none());
    let (_, fine) = program.find_function("fine").unwrap();
    assert!(fine.body.is_some());
}

#[test]
fn test_resolution_is_stateless() {
    let mut diagnostics = Diagnostics::new();
    let source = indoc! {"
        fn f(a: number): number {
            var i: number = 0;
            while i < a { i = i + 1; }
            return i;
        }
        fn main(): void { println(f(3)); }
    "};
    let tokens = tokenize(source, None, &mut diagnostics);
    let (functions, _) = parse(tokens, &mut diagnostics);

    let first = resolve(&functions, &mut diagnostics);
    let second = resolve(&functions, &mut diagnostics);

    assert!(diagnostics.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_expression_errors() {
    let messages = resolution_messages(indoc! {"
        fn f(a: number): number { return a; }
        fn main(): void {
            f;
            f(1, 2);
            f(println(1));
            1 + println(1);
            println(1) * 2;
            -println(1);
            var x: number = 1;
            x(1);
            (f)(1);
            foo();
            if println(1) {}
            a = 1;
        }
    "});

    assert_eq!(
        messages,
        vec![
            "expected to call function 'f'",
            "argument count mismatch in function call",
            "unexpected type of argument",
            "void expression cannot be used as RHS operand to binary operator",
            "void expression cannot be used as LHS operand to binary operator",
            "void expression cannot be used as an operand to unary operator",
            "calling non-function symbol 'x'",
            "expression cannot be called as a function",
            "symbol 'foo' not found",
            "expected number in condition",
            "symbol 'a' not found",
        ]
    );
}

#[test]
fn test_statement_errors() {
    let messages = resolution_messages(indoc! {"
        fn a(): number { return; }
        fn b(): void { return 1; }
        fn c(): number { return println(1); }
        fn d(x: number): void { x = 1; }
        fn e(): void { var y: number = println(1); }
        fn g(): void { var z: number; z = println(1); }
    "});

    assert_eq!(
        messages,
        vec![
            "expected a return value",
            "unexpected return value in void function",
            "unexpected return type",
            "parameters are immutable and cannot be assigned",
            "initializer type mismatch",
            "assigned value type doesn't match variable type",
        ]
    );
}

#[test]
fn test_invalid_types() {
    let messages = resolution_messages(indoc! {"
        fn f(s: string): void {}
        fn g(): void { var v: void; }
        fn h(): string {}
        fn k(n: void): void {}
    "});

    assert_eq!(
        messages,
        vec![
            "parameter 's' has invalid 'string' type",
            "function 'h' has invalid 'string' type",
            "parameter 'n' has invalid 'void' type",
            "variable 'v' has invalid 'void' type",
        ]
    );
}

#[test]
fn test_main_signature() {
    assert_eq!(
        resolution_messages("fn main(x: number): void {}"),
        vec!["'main' function is expected to take no arguments"]
    );
    assert_eq!(
        resolution_messages("fn main(): number { return 1; }"),
        vec!["'main' function is expected to have 'void' type"]
    );
}

#[test]
fn test_redeclarations() {
    let (program, diagnostics) = resolve_source(indoc! {"
        fn f(): void {}
        fn f(): void {}
        fn println(): void {}
        fn g(a: number, a: number): void {}
        fn h(): void { var x: number = 1; var x: number = 2; }
        fn k(x: number): void { var x: number = 1; if 1 { var x: number = 2; } }
    "});

    assert_eq!(
        diagnostics.messages(),
        vec![
            "redeclaration of 'f'",
            "redeclaration of 'println'",
            "redeclaration of 'a'",
            "redeclaration of 'x'",
        ]
    );

    let (_, k) = program.find_function("k").unwrap();
    assert!(k.body.is_some());
    assert_eq!(program.functions.len(), 3);
}

#[test]
fn test_unreachable_statement_warning() {
    let (program, diagnostics) = resolve_source(indoc! {"
        fn f(): number {
            return 1;
            println(2);
            println(3);
        }
    "});

    assert!(program.is_valid());
    assert_eq!(diagnostics.warning_count(), 1);
    assert_eq!(diagnostics.messages(), vec!["unreachable statement"]);

    let warning = diagnostics.iter().next().unwrap();
    assert!(warning.is_warning());
    assert_eq!(warning.get_position().line, 3);
}

#[test]
fn test_missing_return() {
    assert_eq!(
        resolution_messages("fn f(): number {}"),
        vec!["non-void function doesn't return a value"]
    );
    assert_eq!(
        resolution_messages("fn f(c: number): number { if c { return 1; } }"),
        vec!["non-void function doesn't return a value on every path"]
    );
    assert!(
        resolution_messages("fn f(c: number): number { if c { return 1; } else { return 2; } }")
            .is_empty()
    );
}

#[test]
fn test_missing_return_ignores_dead_edges() {
    assert!(resolution_messages("fn f(): number { if 1 { return 1; } }").is_empty());
    assert!(resolution_messages("fn f(): number { while 1 { return 1; } }").is_empty());
    assert_eq!(
        resolution_messages("fn f(): number { if 0 { return 1; } }"),
        vec!["non-void function doesn't return a value"]
    );
}

#[test]
fn test_immutable_mutation() {
    let (program, diagnostics) = resolve_source(indoc! {"
        fn main(): void {
            let x: number = 5;
            x = 6;
        }
    "});

    assert!(!program.is_valid());
    assert_eq!(diagnostics.messages(), vec!["'x' cannot be mutated"]);
    assert_eq!(
        diagnostics.iter().next().map(|error| error.get_error_class()),
        Some(ErrorClass::Flow)
    );

    assert!(resolution_messages("fn main(): void { var x: number = 5; x = 6; }").is_empty());
}

#[test]
fn test_deferred_let_initialization() {
    assert!(resolution_messages(indoc! {"
        fn f(c: number): void {
            let x: number;
            if c { x = 1; } else { x = 2; }
            println(x);
        }
    "})
    .is_empty());

    assert_eq!(
        resolution_messages(indoc! {"
            fn f(c: number): void {
                let x: number;
                if c { x = 1; }
                println(x);
            }
        "}),
        vec!["'x' is not initialized"]
    );
}

#[test]
fn test_let_assigned_in_loop() {
    assert_eq!(
        resolution_messages("fn f(): void { let x: number; while 1 { x = 1; } }"),
        vec!["'x' cannot be mutated"]
    );
}

#[test]
fn test_uninitialized_variable() {
    assert_eq!(
        resolution_messages("fn f(): number { var x: number; return x; }"),
        vec!["'x' is not initialized"]
    );
    assert!(resolution_messages("fn f(): number { var x: number = 0; return x; }").is_empty());
}

#[test]
fn test_flow_checks_both_run() {
    let (program, diagnostics) =
        resolve_source("fn f(c: number): number { var x: number; if c { return x; } }");

    assert_eq!(
        diagnostics.messages(),
        vec![
            "non-void function doesn't return a value on every path",
            "'x' is not initialized",
        ]
    );

    let (_, f) = program.find_function("f").unwrap();
    assert!(f.body.is_none());
}
