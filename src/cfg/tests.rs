use indoc::indoc;
use pretty_assertions::assert_eq;

use crate::{
    errors::diagnostics::Diagnostics, lexer::lexer::tokenize, parser::parser::parse,
    resolver::resolver::resolve,
};

use super::builder::CfgBuilder;

/// Dumps the CFG of the function `f` in `source`.
fn dump_cfg(source: &str) -> String {
    let mut diagnostics = Diagnostics::new();
    let tokens = tokenize(source, None, &mut diagnostics);
    let (functions, _) = parse(tokens, &mut diagnostics);
    let program = resolve(&functions, &mut diagnostics);
    assert!(program.is_valid(), "{:?}", diagnostics.messages());

    let (_, function) = program.find_function("f").unwrap();
    let body = function.body.as_ref().unwrap();
    let cfg = CfgBuilder::new(&program.decls).build(body);

    assert_eq!(cfg.exit, 0);
    assert_eq!(cfg.entry, cfg.len() - 1);
    cfg.dump()
}

#[test]
fn test_if_else_merges_into_successor() {
    let dump = dump_cfg(indoc! {"
        fn f(): void {
            var x: number = 1;
            if x { x = 2; } else { x = 3; }
            println(x);
        }
    "});

    assert_eq!(
        dump,
        indoc! {"
            [5 (entry)]
              preds:
              succs: 4

            [4]
              preds: 5
              succs: 2 3
              ResolvedNumberLiteral: '1'
              ResolvedDeclStmt
              ResolvedDeclRefExpr: x
              ResolvedIfStmt

            [3]
              preds: 4
              succs: 1
              ResolvedNumberLiteral: '2'
              ResolvedAssignment: x

            [2]
              preds: 4
              succs: 1
              ResolvedNumberLiteral: '3'
              ResolvedAssignment: x

            [1]
              preds: 2 3
              succs: 0
              ResolvedDeclRefExpr: x
              ResolvedCallExpr

            [0 (exit)]
              preds: 1
              succs:
        "}
    );
}

#[test]
fn test_constant_while_condition() {
    let dump = dump_cfg(indoc! {"
        fn f(): void {
            var i: number = 0;
            while 1 { i = i + 1; }
        }
    "});

    assert_eq!(
        dump,
        indoc! {"
            [5 (entry)]
              preds:
              succs: 4

            [4]
              preds: 5
              succs: 3
              ResolvedNumberLiteral: '0'
              ResolvedDeclStmt

            [3]
              preds: 1 4
              succs: 0(U) 2
              ResolvedNumberLiteral: '1'
              ResolvedWhileStmt

            [2]
              preds: 3
              succs: 1
              ResolvedDeclRefExpr: i
              ResolvedNumberLiteral: '1'
              ResolvedBinaryOperator: '+'
              ResolvedAssignment: i

            [1]
              preds: 2
              succs: 3

            [0 (exit)]
              preds: 3(U)
              succs:
        "}
    );
}

#[test]
fn test_returns_branch_to_exit() {
    let dump = dump_cfg(indoc! {"
        fn f(x: number): number {
            if x < 0 { return 0; }
            return x;
        }
    "});

    assert_eq!(
        dump,
        indoc! {"
            [4 (entry)]
              preds:
              succs: 3

            [3]
              preds: 4
              succs: 1 2
              ResolvedDeclRefExpr: x
              ResolvedNumberLiteral: '0'
              ResolvedBinaryOperator: '<'
              ResolvedIfStmt

            [2]
              preds: 3
              succs: 0
              ResolvedNumberLiteral: '0'
              ResolvedReturnStmt

            [1]
              preds: 3
              succs: 0
              ResolvedDeclRefExpr: x
              ResolvedReturnStmt

            [0 (exit)]
              preds: 1 2
              succs:
        "}
    );
}

#[test]
fn test_constant_if_marks_dead_branch() {
    let dump = dump_cfg("fn f(): number { if 0 { return 1; } else { return 2; } }");

    assert!(dump.contains("succs: 1 2(U)"), "{}", dump);
}

#[test]
fn test_empty_body() {
    assert_eq!(
        dump_cfg("fn f(): void {}"),
        indoc! {"
            [1 (entry)]
              preds:
              succs: 0

            [0 (exit)]
              preds: 1
              succs:
        "}
    );
}
