use indoc::indoc;
use pretty_assertions::assert_eq;

use crate::{
    errors::{diagnostics::Diagnostics, errors::ErrorImpl},
    ir::module::{InstructionKind, Module},
    lexer::lexer::tokenize,
    parser::parser::parse,
    resolver::resolver::resolve,
};

use super::codegen::{generate, USER_MAIN_SYMBOL};

fn generate_source(source: &str) -> Module {
    let mut diagnostics = Diagnostics::new();
    let tokens = tokenize(source, Some("test.num".to_string()), &mut diagnostics);
    let (functions, incomplete) = parse(tokens, &mut diagnostics);
    assert!(!incomplete, "{:?}", diagnostics.messages());

    let program = resolve(&functions, &mut diagnostics);
    assert!(!diagnostics.has_errors(), "{:?}", diagnostics.messages());

    let module = generate(&program, "test.num").unwrap();
    assert_well_formed(&module);
    module
}

fn function_text(module: &Module, name: &str) -> String {
    module.get_function(name).unwrap().to_string()
}

/// Every block ends in exactly one terminator and every block but the
/// entry is branched to.
fn assert_well_formed(module: &Module) {
    for function in &module.functions {
        for (id, block) in function.blocks() {
            let terminators = block
                .instructions
                .iter()
                .filter(|instruction| instruction.kind.is_terminator())
                .count();
            assert_eq!(terminators, 1, "{}: block {}", function.name, block.label);
            assert!(block.is_terminated(), "{}: block {}", function.name, block.label);

            if Some(id) != function.entry_block() {
                assert!(
                    !function.predecessors(id).is_empty(),
                    "{}: block {} is unreachable",
                    function.name,
                    block.label
                );
            }
        }
    }
}

#[test]
fn test_module_layout() {
    let module = generate_source(indoc! {"
        fn main(): void {
            println(1);
        }
    "});

    assert_eq!(
        module.to_string(),
        indoc! {"
            ; module '<translation_unit>'
            ; source 'test.num'
            ; entry @main

            fn println(double) -> void {
            entry:
              print %arg0
              ret void
            }

            fn __builtin_main() -> void {
            entry:
              print 1.0
              ret void
            }

            fn main() -> int {
            entry:
              call @__builtin_main()
              ret 0
            }
        "}
    );

    assert!(module.symbols["println"].is_builtin);
    assert!(!module.symbols[USER_MAIN_SYMBOL].is_builtin);
    assert_eq!(module.entry.as_deref(), Some("main"));
}

#[test]
fn test_no_entry_without_main() {
    let module = generate_source("fn f(): void {}");

    assert_eq!(module.entry, None);
    assert!(module.get_function("main").is_none());
    assert_eq!(
        module.functions.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
        vec!["println", "f"]
    );
}

#[test]
fn test_parameters_and_return_cell() {
    let module = generate_source(indoc! {"
        fn add(a: number, b: number): number {
            return a + b;
        }
    "});

    assert_eq!(
        function_text(&module, "add"),
        indoc! {"
            fn add(double, double) -> double {
            entry:
              %0 = alloca double ; retval
              %1 = alloca double ; a
              %2 = alloca double ; b
              store %arg0, %1
              store %arg1, %2
              %3 = load %1
              %4 = load %2
              %5 = fadd %3, %4
              store %5, %0
              br return
            return:
              %6 = load %0
              ret %6
            }
        "}
    );
}

#[test]
fn test_if_with_returns_shares_exit() {
    let module = generate_source(indoc! {"
        fn sign(x: number): number {
            if x < 0 {
                return -1;
            }
            return 1;
        }
    "});

    assert_eq!(
        function_text(&module, "sign"),
        indoc! {"
            fn sign(double) -> double {
            entry:
              %0 = alloca double ; retval
              %1 = alloca double ; x
              store %arg0, %1
              %2 = load %1
              %3 = fcmp olt %2, 0.0
              %4 = select %3, 1.0, 0.0
              %5 = fcmp one %4, 0.0
              br %5, if.true, if.exit
            if.true:
              store -1.0, %0
              br return
            if.exit:
              store 1.0, %0
              br return
            return:
              %6 = load %0
              ret %6
            }
        "}
    );

    let function = module.get_function("sign").unwrap();
    let returns = function
        .instructions()
        .filter(|instruction| matches!(instruction.kind, InstructionKind::Ret { .. }))
        .count();
    assert_eq!(returns, 1);
}

#[test]
fn test_if_else_both_returning_drops_exit() {
    let module = generate_source(indoc! {"
        fn pick(x: number): number {
            if x { return 1; } else { return 2; }
        }
    "});

    let function = module.get_function("pick").unwrap();
    assert_eq!(function.find_block("if.exit"), None);
    assert!(function.find_block("if.false").is_some());
    assert!(function.find_block("return").is_some());
}

#[test]
fn test_while_loop() {
    let module = generate_source(indoc! {"
        fn count(): void {
            var i: number = 0;
            while i < 3 {
                i = i + 1;
            }
            println(i);
        }
    "});

    assert_eq!(
        function_text(&module, "count"),
        indoc! {"
            fn count() -> void {
            entry:
              %0 = alloca double ; i
              store 0.0, %0
              br while.cond
            while.cond:
              %1 = load %0
              %2 = fcmp olt %1, 3.0
              %3 = select %2, 1.0, 0.0
              %4 = fcmp one %3, 0.0
              br %4, while.body, while.exit
            while.body:
              %5 = load %0
              %6 = fadd %5, 1.0
              store %6, %0
              br while.cond
            while.exit:
              %7 = load %0
              print %7
              ret void
            }
        "}
    );
}

#[test]
fn test_logical_and_merges_with_phi() {
    let module = generate_source(indoc! {"
        fn both(a: number, b: number): number {
            return a && b;
        }
    "});

    assert_eq!(
        function_text(&module, "both"),
        indoc! {"
            fn both(double, double) -> double {
            entry:
              %0 = alloca double ; retval
              %1 = alloca double ; a
              %2 = alloca double ; b
              store %arg0, %1
              store %arg1, %2
              %3 = load %1
              %4 = fcmp one %3, 0.0
              br %4, and.rhs, and.merge
            and.rhs:
              %5 = load %2
              %6 = fcmp one %5, 0.0
              br and.merge
            and.merge:
              %7 = phi [false, entry], [%6, and.rhs]
              %8 = select %7, 1.0, 0.0
              store %8, %0
              br return
            return:
              %9 = load %0
              ret %9
            }
        "}
    );
}

#[test]
fn test_nested_or_short_circuits_each_operand() {
    let module = generate_source(indoc! {"
        fn any(a: number, b: number, c: number): number {
            return a || b || c;
        }
    "});

    let text = function_text(&module, "any");
    assert!(text.contains("br %5, or.merge, or.lhs.false"), "{}", text);
    assert!(
        text.contains("phi [true, entry], [true, or.lhs.false], [%"),
        "{}",
        text
    );
}

#[test]
fn test_unary_operators() {
    let module = generate_source(indoc! {"
        fn f(x: number): number {
            return !-x;
        }
    "});

    let text = function_text(&module, "f");
    assert!(text.contains("= fneg %"), "{}", text);
    assert!(text.contains("= not %"), "{}", text);
}

#[test]
fn test_calls_use_symbols() {
    let module = generate_source(indoc! {"
        fn main(): void {
            println(twice(2));
        }

        fn twice(x: number): number {
            return x * 2;
        }
    "});

    let text = function_text(&module, USER_MAIN_SYMBOL);
    assert!(text.contains("%0 = call @twice(2.0)"), "{}", text);
    assert!(text.contains("print %0"), "{}", text);
}

#[test]
fn test_constants_are_folded() {
    let module = generate_source(indoc! {"
        fn main(): void {
            let x: number = 2 * 3 + 1;
            println(x);
        }
    "});

    let text = function_text(&module, USER_MAIN_SYMBOL);
    assert!(text.contains("store 7.0, %0"), "{}", text);
    assert!(text.contains("print 7.0"), "{}", text);
    assert!(!text.contains("fmul"), "{}", text);
}

#[test]
fn test_partially_known_expressions_are_computed() {
    let module = generate_source(indoc! {"
        fn g(): number {
            println(5);
            return 2;
        }

        fn add1(x: number): number {
            return 1 + x;
        }

        fn twice(y: number): number {
            return 2 * y;
        }

        fn h(): number {
            return 1 + g();
        }

        fn k(x: number): void {
            if 1 + x {
                println(1);
            }
        }
    "});

    let add1 = function_text(&module, "add1");
    assert!(add1.contains("fadd 1.0, %"), "{}", add1);
    assert!(!add1.contains("store 1.0,"), "{}", add1);

    let twice = function_text(&module, "twice");
    assert!(twice.contains("fmul 2.0, %"), "{}", twice);

    let h = function_text(&module, "h");
    assert!(h.contains("call @g()"), "{}", h);
    assert!(h.contains("fadd 1.0, %"), "{}", h);

    let k = function_text(&module, "k");
    assert!(k.contains("fadd 1.0, %"), "{}", k);
    assert!(!k.contains("fcmp one 1.0, 0.0"), "{}", k);
}

#[test]
fn test_code_after_return_is_skipped() {
    let module = generate_source(indoc! {"
        fn f(): number {
            return 1;
            println(2);
        }
    "});

    let function = module.get_function("f").unwrap();
    assert!(!function
        .instructions()
        .any(|instruction| matches!(instruction.kind, InstructionKind::Print { .. })));
}

#[test]
fn test_repeated_constructs_get_numbered_labels() {
    let module = generate_source(indoc! {"
        fn f(x: number): void {
            if x { println(1); }
            if x { println(2); }
        }
    "});

    let function = module.get_function("f").unwrap();
    assert!(function.find_block("if.true").is_some());
    assert!(function.find_block("if.true1").is_some());
    assert!(function.find_block("if.exit1").is_some());
}

#[test]
fn test_invalid_program_is_rejected() {
    let mut diagnostics = Diagnostics::new();
    let tokens = tokenize("fn f(): number {}", None, &mut diagnostics);
    let (functions, _) = parse(tokens, &mut diagnostics);
    let program = resolve(&functions, &mut diagnostics);

    let error = generate(&program, "test.num").unwrap_err();
    assert_eq!(error.get_internal_error(), &ErrorImpl::InvalidProgram);
}
