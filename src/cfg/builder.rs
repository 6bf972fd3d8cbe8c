use crate::{
    const_eval::evaluator::ConstantEvaluator,
    resolver::resolved_ast::{
        DeclArena, ResolvedBlock, ResolvedExpr, ResolvedExprKind, ResolvedIfStmt, ResolvedStmt,
        ResolvedWhileStmt,
    },
};

use super::cfg::{Cfg, CfgStmt};

/// Builds the control-flow graph of a function body.
///
/// The body is walked from its last statement to its first. Each insert
/// takes the block control continues into and returns the block that
/// control enters the inserted construct through, so blocks are created in
/// reverse: the exit block gets index 0 and the entry block the highest one.
pub struct CfgBuilder<'a> {
    decls: &'a DeclArena,
    evaluator: ConstantEvaluator<'a>,
    cfg: Cfg<'a>,
}

impl<'a> CfgBuilder<'a> {
    pub fn new(decls: &'a DeclArena) -> Self {
        CfgBuilder {
            decls,
            evaluator: ConstantEvaluator::new(decls),
            cfg: Cfg::default(),
        }
    }

    pub fn build(mut self, body: &'a ResolvedBlock) -> Cfg<'a> {
        self.cfg.exit = self.cfg.insert_new_block();

        let exit = self.cfg.exit;
        let body_block = self.insert_block(body, exit);

        self.cfg.entry = self.insert_new_block_before(body_block, true);
        self.cfg
    }

    fn insert_new_block_before(&mut self, block: usize, reachable: bool) -> usize {
        let new_block = self.cfg.insert_new_block();
        self.cfg.insert_edge(new_block, block, reachable);
        new_block
    }

    fn insert_block(&mut self, block: &'a ResolvedBlock, successor: usize) -> usize {
        let mut block_id = successor;
        let mut insert_new_block = true;

        for stmt in block.statements.iter().rev() {
            if insert_new_block && !is_terminator(stmt) {
                block_id = self.insert_new_block_before(block_id, true);
            }

            // A loop header has a back edge, so nothing else may share its block.
            insert_new_block = matches!(stmt, ResolvedStmt::While(_));
            block_id = self.insert_stmt(stmt, block_id);
        }

        block_id
    }

    fn insert_stmt(&mut self, stmt: &'a ResolvedStmt, block: usize) -> usize {
        match stmt {
            ResolvedStmt::If(if_stmt) => self.insert_if_stmt(stmt, if_stmt, block),
            ResolvedStmt::While(while_stmt) => self.insert_while_stmt(stmt, while_stmt, block),
            ResolvedStmt::Expression(expr) => self.insert_expr(expr, block),
            ResolvedStmt::Assignment(assignment) => {
                self.cfg.insert_stmt(CfgStmt::Stmt(stmt), block);
                self.insert_expr(&assignment.value, block)
            }
            ResolvedStmt::Return(return_stmt) => {
                let exit = self.cfg.exit;
                let block = self.insert_new_block_before(exit, true);

                self.cfg.insert_stmt(CfgStmt::Stmt(stmt), block);
                match &return_stmt.value {
                    Some(value) => self.insert_expr(value, block),
                    None => block,
                }
            }
            ResolvedStmt::Decl(decl_stmt) => {
                self.cfg.insert_stmt(CfgStmt::Stmt(stmt), block);

                let decls = self.decls;
                let initializer = decls
                    .var(decl_stmt.var_decl)
                    .and_then(|var| var.initializer.as_ref());
                match initializer {
                    Some(initializer) => self.insert_expr(initializer, block),
                    None => block,
                }
            }
        }
    }

    fn insert_if_stmt(
        &mut self,
        stmt: &'a ResolvedStmt,
        if_stmt: &'a ResolvedIfStmt,
        exit: usize,
    ) -> usize {
        let false_block = match &if_stmt.false_block {
            Some(false_block) => self.insert_block(false_block, exit),
            None => exit,
        };
        let true_block = self.insert_block(&if_stmt.true_block, exit);

        let entry = self.cfg.insert_new_block();
        let value = self.evaluator.evaluate(&if_stmt.condition, true);
        self.insert_conditional_edges(entry, true_block, false_block, value);

        self.cfg.insert_stmt(CfgStmt::Stmt(stmt), entry);
        self.insert_expr(&if_stmt.condition, entry)
    }

    fn insert_while_stmt(
        &mut self,
        stmt: &'a ResolvedStmt,
        while_stmt: &'a ResolvedWhileStmt,
        exit: usize,
    ) -> usize {
        let latch = self.cfg.insert_new_block();
        let body = self.insert_block(&while_stmt.body, latch);

        let header = self.cfg.insert_new_block();
        self.cfg.insert_edge(latch, header, true);

        let value = self.evaluator.evaluate(&while_stmt.condition, true);
        self.insert_conditional_edges(header, body, exit, value);

        self.cfg.insert_stmt(CfgStmt::Stmt(stmt), header);
        self.insert_expr(&while_stmt.condition, header);

        header
    }

    /// A branch is unreachable when the condition is known to send control
    /// the other way.
    fn insert_conditional_edges(
        &mut self,
        from: usize,
        true_block: usize,
        false_block: usize,
        condition: Option<f64>,
    ) {
        self.cfg.insert_edge(from, true_block, condition != Some(0.0));
        self.cfg
            .insert_edge(from, false_block, condition.unwrap_or(0.0) == 0.0);
    }

    fn insert_expr(&mut self, expr: &'a ResolvedExpr, block: usize) -> usize {
        self.cfg.insert_stmt(CfgStmt::Expr(expr), block);

        match &expr.kind {
            ResolvedExprKind::Call(call) => {
                for argument in call.arguments.iter().rev() {
                    self.insert_expr(argument, block);
                }
            }
            ResolvedExprKind::Grouping(grouping) => {
                self.insert_expr(&grouping.expr, block);
            }
            ResolvedExprKind::Binary(binary) => {
                self.insert_expr(&binary.rhs, block);
                self.insert_expr(&binary.lhs, block);
            }
            ResolvedExprKind::Unary(unary) => {
                self.insert_expr(&unary.operand, block);
            }
            ResolvedExprKind::Number(_) | ResolvedExprKind::DeclRef(_) => {}
        }

        block
    }
}

fn is_terminator(stmt: &ResolvedStmt) -> bool {
    matches!(
        stmt,
        ResolvedStmt::If(_) | ResolvedStmt::While(_) | ResolvedStmt::Return(_)
    )
}
