use std::fmt::Write;

use crate::Position;

use super::{
    ast::{indent, VarDecl},
    expressions::{DeclRefExpr, Expr},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(Expr),
    If(IfStmt),
    While(WhileStmt),
    Decl(DeclStmt),
    Assignment(Assignment),
    Return(ReturnStmt),
}

impl Stmt {
    pub fn position(&self) -> &Position {
        match self {
            Stmt::Expression(expr) => expr.position(),
            Stmt::If(stmt) => &stmt.position,
            Stmt::While(stmt) => &stmt.position,
            Stmt::Decl(stmt) => &stmt.position,
            Stmt::Assignment(stmt) => &stmt.position,
            Stmt::Return(stmt) => &stmt.position,
        }
    }

    pub fn dump(&self, level: usize, out: &mut String) {
        match self {
            Stmt::Expression(expr) => expr.dump(level, out),
            Stmt::If(stmt) => {
                let _ = writeln!(out, "{}IfStmt", indent(level));
                stmt.condition.dump(level + 1, out);
                stmt.true_block.dump(level + 1, out);
                if let Some(false_block) = &stmt.false_block {
                    false_block.dump(level + 1, out);
                }
            }
            Stmt::While(stmt) => {
                let _ = writeln!(out, "{}WhileStmt", indent(level));
                stmt.condition.dump(level + 1, out);
                stmt.body.dump(level + 1, out);
            }
            Stmt::Decl(stmt) => {
                let _ = writeln!(out, "{}DeclStmt", indent(level));
                stmt.var_decl.dump(level + 1, out);
            }
            Stmt::Assignment(stmt) => {
                let _ = writeln!(out, "{}Assignment", indent(level));
                let _ = writeln!(
                    out,
                    "{}DeclRefExpr: {}",
                    indent(level + 1),
                    stmt.variable.identifier
                );
                stmt.value.dump(level + 1, out);
            }
            Stmt::Return(stmt) => {
                let _ = writeln!(out, "{}ReturnStmt", indent(level));
                if let Some(value) = &stmt.value {
                    value.dump(level + 1, out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub position: Position,
}

impl Block {
    pub fn dump(&self, level: usize, out: &mut String) {
        let _ = writeln!(out, "{}Block", indent(level));
        for stmt in &self.statements {
            stmt.dump(level + 1, out);
        }
    }
}

/// `else if` chains are stored as a false block holding a single `IfStmt`.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub true_block: Block,
    pub false_block: Option<Block>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclStmt {
    pub var_decl: VarDecl,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub variable: DeclRefExpr,
    pub value: Expr,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub position: Position,
}
