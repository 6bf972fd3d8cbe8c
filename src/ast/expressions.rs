use std::fmt::{Display, Write};

use crate::{lexer::tokens::TokenKind, Position};

use super::ast::indent;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(NumberLiteral),
    DeclRef(DeclRefExpr),
    Call(CallExpr),
    Grouping(GroupingExpr),
    Binary(BinaryOperator),
    Unary(UnaryOperator),
}

impl Expr {
    pub fn position(&self) -> &Position {
        match self {
            Expr::Number(expr) => &expr.position,
            Expr::DeclRef(expr) => &expr.position,
            Expr::Call(expr) => &expr.position,
            Expr::Grouping(expr) => &expr.position,
            Expr::Binary(expr) => &expr.position,
            Expr::Unary(expr) => &expr.position,
        }
    }

    pub fn dump(&self, level: usize, out: &mut String) {
        match self {
            Expr::Number(expr) => {
                let _ = writeln!(out, "{}NumberLiteral: '{}'", indent(level), expr.value);
            }
            Expr::DeclRef(expr) => {
                let _ = writeln!(out, "{}DeclRefExpr: {}", indent(level), expr.identifier);
            }
            Expr::Call(expr) => {
                let _ = writeln!(out, "{}CallExpr", indent(level));
                expr.callee.dump(level + 1, out);
                for argument in &expr.arguments {
                    argument.dump(level + 1, out);
                }
            }
            Expr::Grouping(expr) => {
                let _ = writeln!(out, "{}GroupingExpr", indent(level));
                expr.expr.dump(level + 1, out);
            }
            Expr::Binary(expr) => {
                let _ = writeln!(out, "{}BinaryOperator: '{}'", indent(level), expr.op);
                expr.lhs.dump(level + 1, out);
                expr.rhs.dump(level + 1, out);
            }
            Expr::Unary(expr) => {
                let _ = writeln!(out, "{}UnaryOperator: '{}'", indent(level), expr.op);
                expr.operand.dump(level + 1, out);
            }
        }
    }
}

/// A number literal. The text is kept verbatim and converted during resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
    pub value: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclRefExpr {
    pub identifier: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupingExpr {
    pub expr: Box<Expr>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperator {
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub op: BinaryOp,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOperator {
    pub operand: Box<Expr>,
    pub op: UnaryOp,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Less,
    Greater,
    Equal,
    And,
    Or,
}

impl BinaryOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Dash => Some(BinaryOp::Sub),
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::Less => Some(BinaryOp::Less),
            TokenKind::Greater => Some(BinaryOp::Greater),
            TokenKind::Equals => Some(BinaryOp::Equal),
            TokenKind::And => Some(BinaryOp::And),
            TokenKind::Or => Some(BinaryOp::Or),
            _ => None,
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sym = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::Equal => "==",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        };
        write!(f, "{}", sym)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Dash => Some(UnaryOp::Neg),
            TokenKind::Not => Some(UnaryOp::Not),
            _ => None,
        }
    }
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}
