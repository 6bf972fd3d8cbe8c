use std::{collections::BTreeSet, fmt::Write};

use crate::resolver::resolved_ast::{ResolvedExpr, ResolvedStmt};

/// A node recorded in a basic block.
///
/// Control statements are recorded as a whole; every sub-expression that
/// gets evaluated is recorded on its own as well.
#[derive(Debug, Clone, Copy)]
pub enum CfgStmt<'a> {
    Stmt(&'a ResolvedStmt),
    Expr(&'a ResolvedExpr),
}

impl CfgStmt<'_> {
    pub fn label(&self) -> String {
        match self {
            CfgStmt::Expr(expr) => expr.label(),
            CfgStmt::Stmt(ResolvedStmt::Expression(expr)) => expr.label(),
            CfgStmt::Stmt(ResolvedStmt::If(_)) => String::from("ResolvedIfStmt"),
            CfgStmt::Stmt(ResolvedStmt::While(_)) => String::from("ResolvedWhileStmt"),
            CfgStmt::Stmt(ResolvedStmt::Decl(_)) => String::from("ResolvedDeclStmt"),
            CfgStmt::Stmt(ResolvedStmt::Assignment(assignment)) => {
                format!("ResolvedAssignment: {}", assignment.variable.identifier)
            }
            CfgStmt::Stmt(ResolvedStmt::Return(_)) => String::from("ResolvedReturnStmt"),
        }
    }

    pub fn is_return(&self) -> bool {
        matches!(self, CfgStmt::Stmt(ResolvedStmt::Return(_)))
    }
}

/// Edges are `(block, reachable)` pairs. An unreachable edge is one the
/// constant condition guarding it rules out.
#[derive(Debug, Clone, Default)]
pub struct BasicBlock<'a> {
    pub predecessors: BTreeSet<(usize, bool)>,
    pub successors: BTreeSet<(usize, bool)>,
    /// Stored last-to-first: the final element is evaluated first.
    pub statements: Vec<CfgStmt<'a>>,
}

#[derive(Debug, Clone, Default)]
pub struct Cfg<'a> {
    pub basic_blocks: Vec<BasicBlock<'a>>,
    pub entry: usize,
    pub exit: usize,
}

impl<'a> Cfg<'a> {
    pub fn insert_new_block(&mut self) -> usize {
        self.basic_blocks.push(BasicBlock::default());
        self.basic_blocks.len() - 1
    }

    pub fn insert_edge(&mut self, from: usize, to: usize, reachable: bool) {
        self.basic_blocks[from].successors.insert((to, reachable));
        self.basic_blocks[to].predecessors.insert((from, reachable));
    }

    pub fn insert_stmt(&mut self, stmt: CfgStmt<'a>, block: usize) {
        self.basic_blocks[block].statements.push(stmt);
    }

    pub fn len(&self) -> usize {
        self.basic_blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.basic_blocks.is_empty()
    }

    /// Renders the graph from the entry block down to the exit block.
    pub fn dump(&self) -> String {
        let mut out = String::new();

        for (index, block) in self.basic_blocks.iter().enumerate().rev() {
            if !out.is_empty() {
                let _ = writeln!(out);
            }

            let _ = write!(out, "[{}", index);
            if index == self.entry {
                let _ = write!(out, " (entry)");
            } else if index == self.exit {
                let _ = write!(out, " (exit)");
            }
            let _ = writeln!(out, "]");

            let _ = writeln!(out, "  preds:{}", format_edges(&block.predecessors));
            let _ = writeln!(out, "  succs:{}", format_edges(&block.successors));

            for stmt in block.statements.iter().rev() {
                let _ = writeln!(out, "  {}", stmt.label());
            }
        }

        out
    }
}

fn format_edges(edges: &BTreeSet<(usize, bool)>) -> String {
    edges
        .iter()
        .map(|(block, reachable)| {
            if *reachable {
                format!(" {}", block)
            } else {
                format!(" {}(U)", block)
            }
        })
        .collect()
}
