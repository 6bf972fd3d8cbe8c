use crate::{
    ast::expressions::{BinaryOp, UnaryOp},
    resolver::resolved_ast::{
        DeclArena, ResolvedBinaryOperator, ResolvedDeclRefExpr, ResolvedExpr, ResolvedExprKind,
        ResolvedUnaryOperator,
    },
};

/// Folds resolved expressions to numbers where possible.
///
/// `None` means the value is not known at compile time. Numbers are truthy
/// when they are not `0.0`.
pub struct ConstantEvaluator<'a> {
    decls: &'a DeclArena,
}

fn to_bool(value: Option<f64>) -> Option<bool> {
    value.map(|value| value != 0.0)
}

fn from_bool(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

impl<'a> ConstantEvaluator<'a> {
    pub fn new(decls: &'a DeclArena) -> Self {
        ConstantEvaluator { decls }
    }

    /// Evaluates `expr`.
    ///
    /// A value already recorded on the expression is returned as is. With
    /// `allow_side_effects` unset, a binary operator whose left operand is
    /// unknown is unknown as well.
    pub fn evaluate(&self, expr: &ResolvedExpr, allow_side_effects: bool) -> Option<f64> {
        if let Some(value) = expr.get_constant_value() {
            return Some(value);
        }

        match &expr.kind {
            ResolvedExprKind::Number(literal) => Some(literal.value),
            ResolvedExprKind::Grouping(grouping) => {
                self.evaluate(&grouping.expr, allow_side_effects)
            }
            ResolvedExprKind::Binary(binary) => {
                self.evaluate_binary_operator(binary, allow_side_effects)
            }
            ResolvedExprKind::Unary(unary) => {
                self.evaluate_unary_operator(unary, allow_side_effects)
            }
            ResolvedExprKind::DeclRef(decl_ref) => {
                self.evaluate_decl_ref_expr(decl_ref, allow_side_effects)
            }
            ResolvedExprKind::Call(_) => None,
        }
    }

    /// Folds `expr` only when nothing in it is computed at run time.
    ///
    /// Unlike [`evaluate`](Self::evaluate), an unknown operand is never
    /// replaced by a fallback value. A known left operand of `&&`/`||` may
    /// still decide the result on its own.
    pub fn fold(&self, expr: &ResolvedExpr) -> Option<f64> {
        if let Some(value) = expr.get_constant_value() {
            return Some(value);
        }

        match &expr.kind {
            ResolvedExprKind::Number(literal) => Some(literal.value),
            ResolvedExprKind::Grouping(grouping) => self.fold(&grouping.expr),
            ResolvedExprKind::Binary(binary) => self.fold_binary_operator(binary),
            ResolvedExprKind::Unary(unary) => {
                let operand = self.fold(&unary.operand)?;
                match unary.op {
                    UnaryOp::Not => Some(from_bool(operand == 0.0)),
                    UnaryOp::Neg => Some(-operand),
                }
            }
            ResolvedExprKind::DeclRef(decl_ref) => {
                let var = self.decls.var(decl_ref.decl)?;
                if var.is_mutable {
                    return None;
                }
                self.fold(var.initializer.as_ref()?)
            }
            ResolvedExprKind::Call(_) => None,
        }
    }

    fn fold_binary_operator(&self, binary: &ResolvedBinaryOperator) -> Option<f64> {
        let lhs = self.fold(&binary.lhs)?;

        match binary.op {
            BinaryOp::Or if lhs != 0.0 => return Some(1.0),
            BinaryOp::And if lhs == 0.0 => return Some(0.0),
            _ => {}
        }

        let rhs = self.fold(&binary.rhs)?;
        let value = match binary.op {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
            BinaryOp::Less => from_bool(lhs < rhs),
            BinaryOp::Greater => from_bool(lhs > rhs),
            BinaryOp::Equal => from_bool(lhs == rhs),
            BinaryOp::Or | BinaryOp::And => from_bool(rhs != 0.0),
        };

        Some(value)
    }

    fn evaluate_binary_operator(
        &self,
        binary: &ResolvedBinaryOperator,
        allow_side_effects: bool,
    ) -> Option<f64> {
        let lhs = self.evaluate(&binary.lhs, allow_side_effects);
        if lhs.is_none() && !allow_side_effects {
            return None;
        }

        match binary.op {
            BinaryOp::Or => {
                if to_bool(lhs) == Some(true) {
                    return Some(1.0);
                }

                let rhs = self.evaluate(&binary.rhs, allow_side_effects);
                if to_bool(rhs) == Some(true) {
                    return Some(1.0);
                }

                match (lhs, rhs) {
                    (Some(_), Some(_)) => Some(0.0),
                    _ => None,
                }
            }
            BinaryOp::And => {
                if to_bool(lhs) == Some(false) {
                    return Some(0.0);
                }

                let rhs = self.evaluate(&binary.rhs, allow_side_effects);
                if to_bool(rhs) == Some(false) {
                    return Some(0.0);
                }

                match (lhs, rhs) {
                    (Some(_), Some(_)) => Some(1.0),
                    _ => None,
                }
            }
            op => {
                let lhs = lhs?;
                let rhs = self.evaluate(&binary.rhs, allow_side_effects);

                match op {
                    BinaryOp::Add => Some(lhs + rhs.unwrap_or(0.0)),
                    BinaryOp::Sub => Some(lhs - rhs.unwrap_or(0.0)),
                    BinaryOp::Mul => Some(lhs * rhs?),
                    BinaryOp::Div => Some(lhs / rhs.unwrap_or(1.0)),
                    BinaryOp::Less => Some(from_bool(lhs < rhs?)),
                    BinaryOp::Greater => Some(from_bool(lhs > rhs?)),
                    BinaryOp::Equal => Some(from_bool(lhs == rhs?)),
                    BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
                }
            }
        }
    }

    fn evaluate_unary_operator(
        &self,
        unary: &ResolvedUnaryOperator,
        allow_side_effects: bool,
    ) -> Option<f64> {
        let operand = self.evaluate(&unary.operand, allow_side_effects)?;

        match unary.op {
            UnaryOp::Not => Some(from_bool(operand == 0.0)),
            UnaryOp::Neg => Some(-operand),
        }
    }

    /// Only immutable variables with an initializer fold to a value.
    fn evaluate_decl_ref_expr(
        &self,
        decl_ref: &ResolvedDeclRefExpr,
        allow_side_effects: bool,
    ) -> Option<f64> {
        let var = self.decls.var(decl_ref.decl)?;
        if var.is_mutable {
            return None;
        }

        let initializer = var.initializer.as_ref()?;
        self.evaluate(initializer, allow_side_effects)
    }
}
