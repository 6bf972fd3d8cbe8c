use std::fmt::Write;

use crate::Position;

use super::{expressions::Expr, statements::Block, types::Type};

/// Indentation used by the tree dumps, two spaces per level.
pub fn indent(level: usize) -> String {
    "  ".repeat(level)
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub identifier: String,
    pub position: Position,
    pub return_type: Type,
    pub params: Vec<ParamDecl>,
    pub body: Block,
}

impl FunctionDecl {
    pub fn dump(&self, level: usize, out: &mut String) {
        let _ = writeln!(
            out,
            "{}FunctionDecl: {}:{}",
            indent(level),
            self.identifier,
            self.return_type
        );

        for param in &self.params {
            param.dump(level + 1, out);
        }

        self.body.dump(level + 1, out);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub identifier: String,
    pub position: Position,
    pub param_type: Type,
}

impl ParamDecl {
    pub fn dump(&self, level: usize, out: &mut String) {
        let _ = writeln!(
            out,
            "{}ParamDecl: {}:{}",
            indent(level),
            self.identifier,
            self.param_type
        );
    }
}

/// A `let` (immutable) or `var` (mutable) declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub identifier: String,
    pub position: Position,
    pub var_type: Type,
    pub is_mutable: bool,
    pub initializer: Option<Expr>,
}

impl VarDecl {
    pub fn dump(&self, level: usize, out: &mut String) {
        let keyword = if self.is_mutable { "var" } else { "let" };
        let _ = writeln!(
            out,
            "{}VarDecl: {} {}:{}",
            indent(level),
            keyword,
            self.identifier,
            self.var_type
        );

        if let Some(initializer) = &self.initializer {
            initializer.dump(level + 1, out);
        }
    }
}

/// Renders the syntax tree of every function, in source order.
pub fn dump_functions(functions: &[FunctionDecl]) -> String {
    let mut out = String::new();
    for function in functions {
        function.dump(0, &mut out);
    }
    out
}
