use crate::resolver::resolved_ast::{
    ResolvedAssignment, ResolvedBlock, ResolvedDeclStmt, ResolvedIfStmt, ResolvedReturnStmt,
    ResolvedStmt, ResolvedWhileStmt,
};

use super::{
    codegen::Codegen,
    expr::{double_to_bool, gen_expression, gen_value},
};

/// Generates the statements of `block` until one of them ends control flow.
pub fn gen_block(codegen: &mut Codegen, block: &ResolvedBlock) {
    for statement in &block.statements {
        if codegen.builder.get_insert_block().is_none() {
            break;
        }

        gen_statement(codegen, statement);
    }
}

pub fn gen_statement(codegen: &mut Codegen, statement: &ResolvedStmt) {
    match statement {
        ResolvedStmt::Expression(expr) => {
            gen_expression(codegen, expr);
        }
        ResolvedStmt::If(if_stmt) => gen_if_stmt(codegen, if_stmt),
        ResolvedStmt::While(while_stmt) => gen_while_stmt(codegen, while_stmt),
        ResolvedStmt::Decl(decl_stmt) => gen_decl_stmt(codegen, decl_stmt),
        ResolvedStmt::Assignment(assignment) => gen_assignment(codegen, assignment),
        ResolvedStmt::Return(return_stmt) => gen_return_stmt(codegen, return_stmt),
    }
}

fn gen_if_stmt(codegen: &mut Codegen, if_stmt: &ResolvedIfStmt) {
    let true_block = codegen.builder.create_basic_block("if.true");
    let exit_block = codegen.builder.create_basic_block("if.exit");
    let else_block = match if_stmt.false_block {
        Some(_) => codegen.builder.create_basic_block("if.false"),
        None => exit_block,
    };

    let condition = gen_value(codegen, &if_stmt.condition);
    let condition = double_to_bool(codegen, condition);
    codegen
        .builder
        .build_conditional_branch(condition, true_block, else_block);

    codegen.builder.insert_basic_block(true_block);
    codegen.builder.position_at_end(true_block);
    gen_block(codegen, &if_stmt.true_block);
    if codegen.builder.get_insert_block().is_some() {
        codegen.builder.build_unconditional_branch(exit_block);
    }

    if let Some(false_block) = &if_stmt.false_block {
        codegen.builder.insert_basic_block(else_block);
        codegen.builder.position_at_end(else_block);
        gen_block(codegen, false_block);
        if codegen.builder.get_insert_block().is_some() {
            codegen.builder.build_unconditional_branch(exit_block);
        }
    }

    // Both branches returned.
    if !codegen.builder.has_predecessors(exit_block) {
        codegen.builder.clear_insertion_position();
        return;
    }

    codegen.builder.insert_basic_block(exit_block);
    codegen.builder.position_at_end(exit_block);
}

fn gen_while_stmt(codegen: &mut Codegen, while_stmt: &ResolvedWhileStmt) {
    let header = codegen.builder.create_basic_block("while.cond");
    let body = codegen.builder.create_basic_block("while.body");
    let exit = codegen.builder.create_basic_block("while.exit");

    codegen.builder.build_unconditional_branch(header);

    codegen.builder.insert_basic_block(header);
    codegen.builder.position_at_end(header);
    let condition = gen_value(codegen, &while_stmt.condition);
    let condition = double_to_bool(codegen, condition);
    codegen
        .builder
        .build_conditional_branch(condition, body, exit);

    codegen.builder.insert_basic_block(body);
    codegen.builder.position_at_end(body);
    gen_block(codegen, &while_stmt.body);
    if codegen.builder.get_insert_block().is_some() {
        codegen.builder.build_unconditional_branch(header);
    }

    codegen.builder.insert_basic_block(exit);
    codegen.builder.position_at_end(exit);
}

fn gen_decl_stmt(codegen: &mut Codegen, decl_stmt: &ResolvedDeclStmt) {
    let decls = codegen.decls;
    let Some(var) = decls.var(decl_stmt.var_decl) else {
        panic!("declaration statement does not declare a variable");
    };

    let alloca = codegen.builder.build_alloca(&var.identifier);
    if let Some(initializer) = &var.initializer {
        let value = gen_value(codegen, initializer);
        codegen.builder.build_store(value, alloca);
    }

    codegen.named_allocas.insert(decl_stmt.var_decl, alloca);
}

fn gen_assignment(codegen: &mut Codegen, assignment: &ResolvedAssignment) {
    let value = gen_value(codegen, &assignment.value);
    let alloca = codegen.alloca_of(assignment.variable.decl);
    codegen.builder.build_store(value, alloca);
}

fn gen_return_stmt(codegen: &mut Codegen, return_stmt: &ResolvedReturnStmt) {
    if let Some(value) = &return_stmt.value {
        let value = gen_value(codegen, value);
        let Some(ret_val) = codegen.ret_val else {
            panic!("value returned from a void function");
        };
        codegen.builder.build_store(value, ret_val);
    }

    codegen
        .builder
        .build_unconditional_branch(codegen.return_block);
    codegen.builder.clear_insertion_position();
}
