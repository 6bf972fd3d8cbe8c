//! The resolved tree.
//!
//! Every declaration lives exactly once in a [`DeclArena`] and is referred to
//! by its [`DeclId`]. Expressions carry their resolved type and a slot for
//! the constant value the resolver may record for them.

use std::{cell::Cell, fmt::Write, ops::Index};

use crate::{
    ast::{
        ast::indent,
        expressions::{BinaryOp, UnaryOp},
        types::Type,
    },
    Position,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedDecl {
    Function(ResolvedFunctionDecl),
    Param(ResolvedParamDecl),
    Var(ResolvedVarDecl),
}

impl ResolvedDecl {
    pub fn identifier(&self) -> &str {
        match self {
            ResolvedDecl::Function(decl) => &decl.identifier,
            ResolvedDecl::Param(decl) => &decl.identifier,
            ResolvedDecl::Var(decl) => &decl.identifier,
        }
    }

    pub fn position(&self) -> &Position {
        match self {
            ResolvedDecl::Function(decl) => &decl.position,
            ResolvedDecl::Param(decl) => &decl.position,
            ResolvedDecl::Var(decl) => &decl.position,
        }
    }

    /// The value type of a variable or parameter, or a function's return type.
    pub fn decl_type(&self) -> &Type {
        match self {
            ResolvedDecl::Function(decl) => &decl.return_type,
            ResolvedDecl::Param(decl) => &decl.param_type,
            ResolvedDecl::Var(decl) => &decl.var_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFunctionDecl {
    pub identifier: String,
    pub position: Position,
    pub return_type: Type,
    pub params: Vec<DeclId>,
    /// `None` for the builtins and for functions whose body failed to resolve.
    pub body: Option<ResolvedBlock>,
    pub is_builtin: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParamDecl {
    pub identifier: String,
    pub position: Position,
    pub param_type: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedVarDecl {
    pub identifier: String,
    pub position: Position,
    pub var_type: Type,
    pub is_mutable: bool,
    pub initializer: Option<ResolvedExpr>,
}

/// Owns every declaration of a program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeclArena {
    decls: Vec<ResolvedDecl>,
}

impl DeclArena {
    pub fn new() -> Self {
        DeclArena::default()
    }

    pub fn push(&mut self, decl: ResolvedDecl) -> DeclId {
        self.decls.push(decl);
        DeclId(self.decls.len() - 1)
    }

    pub fn get(&self, id: DeclId) -> Option<&ResolvedDecl> {
        self.decls.get(id.0)
    }

    pub fn get_mut(&mut self, id: DeclId) -> Option<&mut ResolvedDecl> {
        self.decls.get_mut(id.0)
    }

    pub fn function(&self, id: DeclId) -> Option<&ResolvedFunctionDecl> {
        match self.get(id) {
            Some(ResolvedDecl::Function(decl)) => Some(decl),
            _ => None,
        }
    }

    pub fn var(&self, id: DeclId) -> Option<&ResolvedVarDecl> {
        match self.get(id) {
            Some(ResolvedDecl::Var(decl)) => Some(decl),
            _ => None,
        }
    }

    pub fn param(&self, id: DeclId) -> Option<&ResolvedParamDecl> {
        match self.get(id) {
            Some(ResolvedDecl::Param(decl)) => Some(decl),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &ResolvedDecl)> {
        self.decls
            .iter()
            .enumerate()
            .map(|(index, decl)| (DeclId(index), decl))
    }
}

impl Index<DeclId> for DeclArena {
    type Output = ResolvedDecl;

    fn index(&self, id: DeclId) -> &Self::Output {
        &self.decls[id.0]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedExpr {
    pub kind: ResolvedExprKind,
    pub expr_type: Type,
    pub position: Position,
    constant_value: Cell<Option<f64>>,
}

impl ResolvedExpr {
    pub fn new(kind: ResolvedExprKind, expr_type: Type, position: Position) -> Self {
        ResolvedExpr {
            kind,
            expr_type,
            position,
            constant_value: Cell::new(None),
        }
    }

    pub fn get_constant_value(&self) -> Option<f64> {
        self.constant_value.get()
    }

    /// Records the folded value of this expression.
    ///
    /// Unknown values are not recorded and a recorded value is never replaced.
    pub fn set_constant_value(&self, value: Option<f64>) {
        if self.constant_value.get().is_none() {
            self.constant_value.set(value);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedExprKind {
    Number(ResolvedNumberLiteral),
    DeclRef(ResolvedDeclRefExpr),
    Call(ResolvedCallExpr),
    Grouping(ResolvedGroupingExpr),
    Binary(ResolvedBinaryOperator),
    Unary(ResolvedUnaryOperator),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNumberLiteral {
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDeclRefExpr {
    pub decl: DeclId,
    pub identifier: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCallExpr {
    pub callee: DeclId,
    pub arguments: Vec<ResolvedExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedGroupingExpr {
    pub expr: Box<ResolvedExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBinaryOperator {
    pub op: BinaryOp,
    pub lhs: Box<ResolvedExpr>,
    pub rhs: Box<ResolvedExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedUnaryOperator {
    pub op: UnaryOp,
    pub operand: Box<ResolvedExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedStmt {
    Expression(ResolvedExpr),
    If(ResolvedIfStmt),
    While(ResolvedWhileStmt),
    Decl(ResolvedDeclStmt),
    Assignment(ResolvedAssignment),
    Return(ResolvedReturnStmt),
}

impl ResolvedStmt {
    pub fn position(&self) -> &Position {
        match self {
            ResolvedStmt::Expression(expr) => &expr.position,
            ResolvedStmt::If(stmt) => &stmt.position,
            ResolvedStmt::While(stmt) => &stmt.position,
            ResolvedStmt::Decl(stmt) => &stmt.position,
            ResolvedStmt::Assignment(stmt) => &stmt.position,
            ResolvedStmt::Return(stmt) => &stmt.position,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBlock {
    pub statements: Vec<ResolvedStmt>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedIfStmt {
    pub condition: ResolvedExpr,
    pub true_block: ResolvedBlock,
    pub false_block: Option<ResolvedBlock>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWhileStmt {
    pub condition: ResolvedExpr,
    pub body: ResolvedBlock,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDeclStmt {
    pub var_decl: DeclId,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAssignment {
    pub variable: ResolvedDeclRefExpr,
    pub value: ResolvedExpr,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedReturnStmt {
    pub value: Option<ResolvedExpr>,
    pub position: Position,
}

/// The output of resolution.
///
/// `decls[0]` is always the builtin `println`. `functions` lists the user
/// functions whose signatures resolved, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProgram {
    pub decls: DeclArena,
    pub functions: Vec<DeclId>,
    pub(crate) valid: bool,
}

impl ResolvedProgram {
    /// True when every function resolved and passed the flow checks.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn function(&self, id: DeclId) -> Option<&ResolvedFunctionDecl> {
        self.decls.function(id)
    }

    pub fn find_function(&self, identifier: &str) -> Option<(DeclId, &ResolvedFunctionDecl)> {
        self.functions.iter().find_map(|id| {
            self.decls
                .function(*id)
                .filter(|function| function.identifier == identifier)
                .map(|function| (*id, function))
        })
    }

    /// Renders every user function with its resolved body.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for id in &self.functions {
            if let Some(function) = self.decls.function(*id) {
                dump_function(function, &self.decls, &mut out);
            }
        }
        out
    }
}

fn dump_function(function: &ResolvedFunctionDecl, decls: &DeclArena, out: &mut String) {
    let _ = writeln!(
        out,
        "ResolvedFunctionDecl: {}:{}",
        function.identifier, function.return_type
    );

    for param in &function.params {
        let decl = &decls[*param];
        let _ = writeln!(
            out,
            "{}ResolvedParamDecl: {}:{}",
            indent(1),
            decl.identifier(),
            decl.decl_type()
        );
    }

    if let Some(body) = &function.body {
        body.dump(decls, 1, out);
    }
}

impl ResolvedBlock {
    pub fn dump(&self, decls: &DeclArena, level: usize, out: &mut String) {
        let _ = writeln!(out, "{}ResolvedBlock", indent(level));
        for stmt in &self.statements {
            stmt.dump(decls, level + 1, out);
        }
    }
}

impl ResolvedStmt {
    pub fn dump(&self, decls: &DeclArena, level: usize, out: &mut String) {
        match self {
            ResolvedStmt::Expression(expr) => expr.dump(decls, level, out),
            ResolvedStmt::If(stmt) => {
                let _ = writeln!(out, "{}ResolvedIfStmt", indent(level));
                stmt.condition.dump(decls, level + 1, out);
                stmt.true_block.dump(decls, level + 1, out);
                if let Some(false_block) = &stmt.false_block {
                    false_block.dump(decls, level + 1, out);
                }
            }
            ResolvedStmt::While(stmt) => {
                let _ = writeln!(out, "{}ResolvedWhileStmt", indent(level));
                stmt.condition.dump(decls, level + 1, out);
                stmt.body.dump(decls, level + 1, out);
            }
            ResolvedStmt::Decl(stmt) => {
                let _ = writeln!(out, "{}ResolvedDeclStmt", indent(level));
                if let Some(var) = decls.var(stmt.var_decl) {
                    let keyword = if var.is_mutable { "var" } else { "let" };
                    let _ = writeln!(
                        out,
                        "{}ResolvedVarDecl: {} {}:{}",
                        indent(level + 1),
                        keyword,
                        var.identifier,
                        var.var_type
                    );
                    if let Some(initializer) = &var.initializer {
                        initializer.dump(decls, level + 2, out);
                    }
                }
            }
            ResolvedStmt::Assignment(stmt) => {
                let _ = writeln!(out, "{}ResolvedAssignment", indent(level));
                let _ = writeln!(
                    out,
                    "{}ResolvedDeclRefExpr: {}",
                    indent(level + 1),
                    stmt.variable.identifier
                );
                stmt.value.dump(decls, level + 1, out);
            }
            ResolvedStmt::Return(stmt) => {
                let _ = writeln!(out, "{}ResolvedReturnStmt", indent(level));
                if let Some(value) = &stmt.value {
                    value.dump(decls, level + 1, out);
                }
            }
        }
    }
}

impl ResolvedExpr {
    /// One-line description of this node, without its children.
    pub fn label(&self) -> String {
        match &self.kind {
            ResolvedExprKind::Number(literal) => format!("ResolvedNumberLiteral: '{}'", literal.value),
            ResolvedExprKind::DeclRef(decl_ref) => {
                format!("ResolvedDeclRefExpr: {}", decl_ref.identifier)
            }
            ResolvedExprKind::Call(_) => String::from("ResolvedCallExpr"),
            ResolvedExprKind::Grouping(_) => String::from("ResolvedGroupingExpr"),
            ResolvedExprKind::Binary(binary) => format!("ResolvedBinaryOperator: '{}'", binary.op),
            ResolvedExprKind::Unary(unary) => format!("ResolvedUnaryOperator: '{}'", unary.op),
        }
    }

    pub fn dump(&self, decls: &DeclArena, level: usize, out: &mut String) {
        let _ = writeln!(out, "{}{}", indent(level), self.label());
        if let Some(value) = self.get_constant_value() {
            let _ = writeln!(out, "{}| value: {}", indent(level), value);
        }

        match &self.kind {
            ResolvedExprKind::Number(_) | ResolvedExprKind::DeclRef(_) => {}
            ResolvedExprKind::Call(call) => {
                let _ = writeln!(
                    out,
                    "{}ResolvedDeclRefExpr: {}",
                    indent(level + 1),
                    decls[call.callee].identifier()
                );
                for argument in &call.arguments {
                    argument.dump(decls, level + 1, out);
                }
            }
            ResolvedExprKind::Grouping(grouping) => grouping.expr.dump(decls, level + 1, out),
            ResolvedExprKind::Binary(binary) => {
                binary.lhs.dump(decls, level + 1, out);
                binary.rhs.dump(decls, level + 1, out);
            }
            ResolvedExprKind::Unary(unary) => unary.operand.dump(decls, level + 1, out),
        }
    }
}
