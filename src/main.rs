use std::{fs::read_to_string, path::PathBuf, process, time::Instant};

use clap::Parser;

use numlang::{
    ast::ast::dump_functions,
    cfg::builder::CfgBuilder,
    codegen::codegen::generate,
    errors::diagnostics::Diagnostics,
    lexer::lexer::tokenize,
    parser::parser::parse,
    render_error,
    resolver::{resolved_ast::ResolvedProgram, resolver::resolve},
};

#[derive(Parser)]
#[command(name = "numlang", about = "Compiles a numlang source file to basic-block IR")]
struct Cli {
    /// Source file to compile.
    file: PathBuf,

    /// Print the syntax tree and stop.
    #[arg(long)]
    ast_dump: bool,

    /// Print the resolved tree and stop.
    #[arg(long)]
    res_dump: bool,

    /// Print the control-flow graph of every function and stop.
    #[arg(long)]
    cfg_dump: bool,

    /// Print the generated IR.
    #[arg(long)]
    ir_dump: bool,

    /// Do not report phase timings.
    #[arg(long, short)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    let source = read_to_string(&cli.file).unwrap_or_else(|e| {
        eprintln!("error: cannot read '{}': {e}", cli.file.display());
        process::exit(1);
    });
    let file_name = cli
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| cli.file.to_string_lossy().into_owned());

    let mut diagnostics = Diagnostics::new();
    let start = Instant::now();

    let tokens = tokenize(&source, Some(file_name.clone()), &mut diagnostics);
    report_time(&cli, "Tokenized", start);

    let parse_start = Instant::now();
    let (functions, incomplete) = parse(tokens, &mut diagnostics);
    report_time(&cli, "Parsed", parse_start);

    if cli.ast_dump {
        print!("{}", dump_functions(&functions));
        exit_with_diagnostics(&diagnostics, &source);
    }

    let resolve_start = Instant::now();
    let program = resolve(&functions, &mut diagnostics);
    report_time(&cli, "Resolved", resolve_start);

    if cli.res_dump {
        print!("{}", program.dump());
        exit_with_diagnostics(&diagnostics, &source);
    }

    if cli.cfg_dump {
        dump_cfgs(&program);
        exit_with_diagnostics(&diagnostics, &source);
    }

    if incomplete || diagnostics.has_errors() || !program.is_valid() {
        print_diagnostics(&diagnostics, &source);
        process::exit(1);
    }

    let codegen_start = Instant::now();
    let module = match generate(&program, &file_name) {
        Ok(module) => module,
        Err(error) => {
            eprint!("{}", render_error(&error, &source));
            process::exit(1);
        }
    };
    report_time(&cli, "Generated IR", codegen_start);
    if !cli.quiet {
        println!("Total time for IR generation: {:?}", start.elapsed());
    }

    print_diagnostics(&diagnostics, &source);
    if cli.ir_dump {
        print!("{}", module);
    }
}

fn report_time(cli: &Cli, phase: &str, start: Instant) {
    if !cli.quiet {
        println!("{} in {:?}", phase, start.elapsed());
    }
}

fn dump_cfgs(program: &ResolvedProgram) {
    for id in &program.functions {
        let Some(function) = program.function(*id) else {
            continue;
        };
        let Some(body) = &function.body else {
            continue;
        };

        println!("{}:", function.identifier);
        println!("{}", CfgBuilder::new(&program.decls).build(body).dump());
    }
}

fn print_diagnostics(diagnostics: &Diagnostics, source: &str) {
    for error in diagnostics {
        eprint!("{}", render_error(error, source));
    }
}

/// Prints every diagnostic and exits, failing if any of them is an error.
fn exit_with_diagnostics(diagnostics: &Diagnostics, source: &str) -> ! {
    print_diagnostics(diagnostics, source);
    process::exit(if diagnostics.has_errors() { 1 } else { 0 });
}
