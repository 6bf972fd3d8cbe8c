use crate::{
    ast::expressions::{BinaryOp, UnaryOp},
    ir::module::{ArithOp, BlockId, FloatPredicate, Value},
    resolver::resolved_ast::{
        ResolvedBinaryOperator, ResolvedCallExpr, ResolvedExpr, ResolvedExprKind,
        ResolvedUnaryOperator,
    },
};

use super::codegen::{ir_type, symbol_name, Codegen};

/// Generates `expression`, returning `None` only for calls to `void`
/// functions.
pub fn gen_expression(codegen: &mut Codegen, expression: &ResolvedExpr) -> Option<Value> {
    if let Some(value) = expression.get_constant_value() {
        return Some(Value::ConstNumber(value));
    }

    match &expression.kind {
        ResolvedExprKind::Number(literal) => Some(Value::ConstNumber(literal.value)),
        ResolvedExprKind::DeclRef(decl_ref) => {
            let alloca = codegen.alloca_of(decl_ref.decl);
            Some(codegen.builder.build_load(alloca))
        }
        ResolvedExprKind::Call(call) => gen_call_expr(codegen, call),
        ResolvedExprKind::Grouping(grouping) => gen_expression(codegen, &grouping.expr),
        ResolvedExprKind::Binary(binary) => Some(gen_binary_operator(codegen, binary)),
        ResolvedExprKind::Unary(unary) => Some(gen_unary_operator(codegen, unary)),
    }
}

/// Generates an expression that is used as a value.
pub fn gen_value(codegen: &mut Codegen, expression: &ResolvedExpr) -> Value {
    match gen_expression(codegen, expression) {
        Some(value) => value,
        None => unreachable!("void expression used as a value"),
    }
}

fn gen_call_expr(codegen: &mut Codegen, call: &ResolvedCallExpr) -> Option<Value> {
    let decls = codegen.decls;
    let Some(callee) = decls.function(call.callee) else {
        unreachable!("call to a declaration that is not a function");
    };

    let arguments: Vec<Value> = call
        .arguments
        .iter()
        .map(|argument| gen_value(codegen, argument))
        .collect();

    if callee.is_builtin {
        for argument in arguments {
            codegen.builder.build_print(argument);
        }
        return None;
    }

    codegen.builder.build_call(
        symbol_name(callee),
        arguments,
        ir_type(&callee.return_type),
    )
}

fn gen_unary_operator(codegen: &mut Codegen, unary: &ResolvedUnaryOperator) -> Value {
    let operand = gen_value(codegen, &unary.operand);

    match unary.op {
        UnaryOp::Neg => codegen.builder.build_float_neg(operand),
        UnaryOp::Not => {
            let operand = double_to_bool(codegen, operand);
            let negated = codegen.builder.build_not(operand);
            bool_to_double(codegen, negated)
        }
    }
}

fn gen_binary_operator(codegen: &mut Codegen, binary: &ResolvedBinaryOperator) -> Value {
    if matches!(binary.op, BinaryOp::And | BinaryOp::Or) {
        return gen_logical_operator(codegen, binary);
    }

    let lhs = gen_value(codegen, &binary.lhs);
    let rhs = gen_value(codegen, &binary.rhs);

    let predicate = match binary.op {
        BinaryOp::Add => return codegen.builder.build_arithmetic(ArithOp::FAdd, lhs, rhs),
        BinaryOp::Sub => return codegen.builder.build_arithmetic(ArithOp::FSub, lhs, rhs),
        BinaryOp::Mul => return codegen.builder.build_arithmetic(ArithOp::FMul, lhs, rhs),
        BinaryOp::Div => return codegen.builder.build_arithmetic(ArithOp::FDiv, lhs, rhs),
        BinaryOp::Less => FloatPredicate::Olt,
        BinaryOp::Greater => FloatPredicate::Ogt,
        BinaryOp::Equal => FloatPredicate::Oeq,
        BinaryOp::And | BinaryOp::Or => unreachable!(),
    };

    let compare = codegen.builder.build_float_compare(predicate, lhs, rhs);
    bool_to_double(codegen, compare)
}

/// `a || b` branches straight to the merge block when `a` holds and only
/// evaluates `b` otherwise; `&&` is the mirror image. The merge block
/// picks `b`'s truth value when control comes from `b` and the
/// short-circuit result from every other predecessor.
fn gen_logical_operator(codegen: &mut Codegen, binary: &ResolvedBinaryOperator) -> Value {
    let is_or = binary.op == BinaryOp::Or;

    let rhs_block = codegen
        .builder
        .create_basic_block(if is_or { "or.rhs" } else { "and.rhs" });
    let merge_block = codegen
        .builder
        .create_basic_block(if is_or { "or.merge" } else { "and.merge" });

    let (true_block, false_block) = if is_or {
        (merge_block, rhs_block)
    } else {
        (rhs_block, merge_block)
    };
    gen_conditional_branch(codegen, &binary.lhs, true_block, false_block);

    codegen.builder.insert_basic_block(rhs_block);
    codegen.builder.position_at_end(rhs_block);
    let rhs = gen_value(codegen, &binary.rhs);
    let rhs = double_to_bool(codegen, rhs);
    codegen.builder.build_unconditional_branch(merge_block);

    // The right-hand side may have left its own blocks behind.
    let Some(rhs_end) = codegen.builder.get_insert_block() else {
        unreachable!("expression cleared the insertion block");
    };

    codegen.builder.insert_basic_block(merge_block);
    codegen.builder.position_at_end(merge_block);

    let incoming = codegen
        .builder
        .function()
        .predecessors(merge_block)
        .into_iter()
        .map(|block| {
            if block == rhs_end {
                (rhs, block)
            } else {
                (Value::ConstBool(is_or), block)
            }
        })
        .collect();

    let phi = codegen.builder.build_phi(incoming);
    bool_to_double(codegen, phi)
}

/// Branches to `true_block` or `false_block` on the truth of `condition`,
/// splitting `&&` and `||` into one test per operand.
pub fn gen_conditional_branch(
    codegen: &mut Codegen,
    condition: &ResolvedExpr,
    true_block: BlockId,
    false_block: BlockId,
) {
    if let ResolvedExprKind::Binary(binary) = &condition.kind {
        match binary.op {
            BinaryOp::Or => {
                let next = codegen.builder.create_basic_block("or.lhs.false");
                gen_conditional_branch(codegen, &binary.lhs, true_block, next);

                codegen.builder.insert_basic_block(next);
                codegen.builder.position_at_end(next);
                gen_conditional_branch(codegen, &binary.rhs, true_block, false_block);
                return;
            }
            BinaryOp::And => {
                let next = codegen.builder.create_basic_block("and.lhs.true");
                gen_conditional_branch(codegen, &binary.lhs, next, false_block);

                codegen.builder.insert_basic_block(next);
                codegen.builder.position_at_end(next);
                gen_conditional_branch(codegen, &binary.rhs, true_block, false_block);
                return;
            }
            _ => {}
        }
    }

    let value = gen_value(codegen, condition);
    let value = double_to_bool(codegen, value);
    codegen
        .builder
        .build_conditional_branch(value, true_block, false_block);
}

pub fn double_to_bool(codegen: &mut Codegen, value: Value) -> Value {
    codegen
        .builder
        .build_float_compare(FloatPredicate::One, value, Value::ConstNumber(0.0))
}

pub fn bool_to_double(codegen: &mut Codegen, value: Value) -> Value {
    codegen
        .builder
        .build_select(value, Value::ConstNumber(1.0), Value::ConstNumber(0.0))
}
