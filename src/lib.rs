#![allow(clippy::module_inception)]

use std::{fmt::Display, fmt::Write, rc::Rc};

use crate::{
    codegen::codegen::generate,
    errors::{
        diagnostics::Diagnostics,
        errors::{Error, ErrorTip},
    },
    ir::module::Module,
    lexer::lexer::tokenize,
    parser::parser::parse,
    resolver::{resolved_ast::ResolvedProgram, resolver::resolve},
};

pub mod ast;
pub mod cfg;
pub mod codegen;
pub mod const_eval;
pub mod errors;
pub mod ir;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod resolver;

/// A location in a source file. Lines and columns start at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub offset: u32,
    pub line: u32,
    pub column: u32,
    pub file: Rc<String>,
}

impl Position {
    pub fn new(offset: u32, line: u32, column: u32, file: Rc<String>) -> Self {
        Position {
            offset,
            line,
            column,
            file,
        }
    }

    pub fn null() -> Self {
        Position::new(0, 0, 0, Rc::new(String::from("<null>")))
    }

    /// Position attached to declarations that have no source text.
    pub fn builtin() -> Self {
        Position::new(0, 0, 0, Rc::new(String::from("<builtin>")))
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Finds the line containing `offset`.
///
/// Returns the 1-based line number, the line text and the offset of the
/// position inside that line, or `None` when the offset is past the end.
pub fn get_line_at_position(source: &str, offset: u32) -> Option<(usize, String, usize)> {
    let pos = offset as usize;
    let mut start = 0;

    for (index, line) in source.split_inclusive('\n').enumerate() {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            return Some((index + 1, line.to_string(), pos - start));
        }

        start = end;
    }

    None
}

/// Renders a diagnostic with the offending line and a caret under it.
///
/// ```text
/// error: expected ';' at the end of expression (found `}`)
/// -> main.num:3:9
///   |
/// 3 | let a = 1
///   | ---------^
/// ```
pub fn render_error(error: &Error, source: &str) -> String {
    let mut out = String::new();
    let position = error.get_position();

    match error.get_tip() {
        ErrorTip::None => {
            let _ = writeln!(out, "{}: {}", error.get_severity(), error.get_message());
        }
        tip => {
            let _ = writeln!(
                out,
                "{}: {} ({})",
                error.get_severity(),
                error.get_message(),
                tip
            );
        }
    }
    let _ = writeln!(out, "-> {}", position);

    let Some((line, line_text, line_pos)) = get_line_at_position(source, position.offset) else {
        return out;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    let _ = writeln!(out, "{:>padding$}", "|");
    let _ = writeln!(out, "{} | {}", line_string, line_text_removed.trim_end());

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;
    let _ = writeln!(out, "{:>padding$} {:->arrows$}", "|", "^");

    out
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let start = string.chars().take_while(|c| *c == ' ' || *c == '\t').count();
    (String::from(&string[start..]), start)
}

/// Runs every phase on `source` and lowers it to IR.
///
/// Diagnostics from all phases are collected into `diagnostics`; `None` is
/// returned as soon as a phase leaves errors behind.
pub fn compile(source: &str, file_name: &str, diagnostics: &mut Diagnostics) -> Option<Module> {
    let tokens = tokenize(source, Some(String::from(file_name)), diagnostics);
    let (functions, incomplete) = parse(tokens, diagnostics);
    let program = resolve(&functions, diagnostics);

    if incomplete || diagnostics.has_errors() || !program.is_valid() {
        return None;
    }

    lower(&program, file_name, diagnostics)
}

/// Generates IR for `program`, reporting a refusal into `diagnostics`.
fn lower(
    program: &ResolvedProgram,
    file_name: &str,
    diagnostics: &mut Diagnostics,
) -> Option<Module> {
    match generate(program, file_name) {
        Ok(module) => Some(module),
        Err(error) => {
            diagnostics.report(error);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        errors::{diagnostics::Diagnostics, errors::ErrorImpl},
        lexer::lexer::tokenize,
        parser::parser::parse,
        resolver::resolver::resolve,
        Position,
    };
    use std::rc::Rc;

    #[test]
    fn test_refused_program_is_reported() {
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize("fn f(): number {}", None, &mut diagnostics);
        let (functions, _) = parse(tokens, &mut diagnostics);
        let program = resolve(&functions, &mut diagnostics);
        assert!(!program.is_valid());

        let mut lowering = Diagnostics::new();
        assert!(super::lower(&program, "test.num", &mut lowering).is_none());
        assert!(lowering.has_errors());
        let error = lowering.iter().next().unwrap();
        assert_eq!(error.get_internal_error(), &ErrorImpl::InvalidProgram);
    }

    #[test]
    fn test_get_line_at_position() {
        let source = "Hello, world!\nfoo\n\nTesting { }\n";

        let (line_number, line, line_pos) = super::get_line_at_position(source, 10).unwrap();
        assert_eq!(line_number, 1);
        assert_eq!(line, "Hello, world!\n");
        assert_eq!(line_pos, 10);

        let (line_number, line, line_pos) = super::get_line_at_position(source, 27).unwrap();
        assert_eq!(line_number, 4);
        assert_eq!(line, "Testing { }\n");
        assert_eq!(line_pos, 8);

        assert!(super::get_line_at_position(source, 400).is_none());
    }

    #[test]
    fn test_render_error() {
        let source = "fn main(): void {\n    let a: number = #;\n}\n";
        let error = super::Error::new(
            ErrorImpl::UnrecognisedCharacter {
                character: String::from("#"),
            },
            Position::new(38, 2, 21, Rc::new(String::from("main.num"))),
        );

        let rendered = super::render_error(&error, source);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "error: unrecognised character '#'");
        assert_eq!(lines[1], "-> main.num:2:21");
        assert_eq!(lines[3], "2 | let a: number = #;");
        assert!(lines[4].ends_with("----------------^"));
    }
}
