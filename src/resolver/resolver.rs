use std::collections::HashMap;

use crate::{
    ast::{
        ast::{FunctionDecl, ParamDecl},
        expressions::{BinaryOperator, CallExpr, DeclRefExpr, Expr, UnaryOperator},
        statements::{Assignment, Block, DeclStmt, IfStmt, ReturnStmt, Stmt, WhileStmt},
        types::Type,
    },
    cfg::builder::CfgBuilder,
    const_eval::evaluator::ConstantEvaluator,
    errors::{
        diagnostics::Diagnostics,
        errors::{Error, ErrorImpl},
    },
    Position,
};

use super::{
    flow::{check_return_on_all_paths, check_variable_initialization},
    resolved_ast::{
        DeclArena, DeclId, ResolvedAssignment, ResolvedBinaryOperator, ResolvedBlock,
        ResolvedCallExpr, ResolvedDecl, ResolvedDeclRefExpr, ResolvedDeclStmt, ResolvedExpr,
        ResolvedExprKind, ResolvedFunctionDecl, ResolvedGroupingExpr, ResolvedIfStmt,
        ResolvedNumberLiteral, ResolvedParamDecl, ResolvedProgram, ResolvedReturnStmt,
        ResolvedStmt, ResolvedUnaryOperator, ResolvedVarDecl, ResolvedWhileStmt,
    },
};

/// One level of the scope chain.
#[derive(Debug, Default)]
pub struct Scope {
    pub decl_lookup: HashMap<String, DeclId>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    pub fn get_decl(&self, identifier: &str) -> Option<DeclId> {
        self.decl_lookup.get(identifier).copied()
    }
}

/// State shared by every resolution step.
///
/// Each step returns `None` once it has reported why it failed, so callers
/// can give up on the enclosing construct with `?` and move on to the next
/// sibling.
pub struct Resolver<'d> {
    pub decls: DeclArena,
    pub scopes: Vec<Scope>,
    pub current_function: Option<DeclId>,
    diagnostics: &'d mut Diagnostics,
}

impl<'d> Resolver<'d> {
    pub fn new(diagnostics: &'d mut Diagnostics) -> Self {
        Resolver {
            decls: DeclArena::new(),
            scopes: vec![Scope::new()],
            current_function: None,
            diagnostics,
        }
    }

    /// Reports `error` and fails the current construct.
    pub fn report<T>(&mut self, error: Error) -> Option<T> {
        self.diagnostics.report(error);
        None
    }

    pub fn warn(&mut self, error_impl: ErrorImpl, position: Position) {
        self.diagnostics.report(Error::warning(error_impl, position));
    }

    /// Runs `f` inside a fresh scope. The scope is popped on every way out
    /// of `f`.
    pub fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.scopes.push(Scope::new());
        let result = f(self);
        self.scopes.pop();
        result
    }

    /// Looks `identifier` up from the innermost scope outwards.
    ///
    /// The second value is the depth of the scope it was found in, `0` being
    /// the innermost one.
    pub fn lookup_decl(&self, identifier: &str) -> Option<(DeclId, usize)> {
        self.scopes
            .iter()
            .rev()
            .enumerate()
            .find_map(|(depth, scope)| scope.get_decl(identifier).map(|id| (id, depth)))
    }

    /// Adds `id` to the innermost scope. Shadowing an outer declaration is
    /// fine, a second declaration in the same scope is not.
    pub fn insert_decl_to_current_scope(&mut self, id: DeclId) -> Option<()> {
        let identifier = self.decls[id].identifier().to_string();

        if let Some((_, 0)) = self.lookup_decl(&identifier) {
            let position = self.decls[id].position().clone();
            return self.report(Error::new(ErrorImpl::Redeclaration { identifier }, position));
        }

        match self.scopes.last_mut() {
            Some(scope) => {
                scope.decl_lookup.insert(identifier, id);
                Some(())
            }
            None => unreachable!("the global scope is never popped"),
        }
    }

    /// Records the value of `expr` on it when every operand is known.
    pub fn annotate_constant(&self, expr: &ResolvedExpr) {
        let value = ConstantEvaluator::new(&self.decls).fold(expr);
        expr.set_constant_value(value);
    }

    fn current_return_type(&self) -> Type {
        self.current_function
            .and_then(|id| self.decls.function(id))
            .map(|function| function.return_type.clone())
            .unwrap_or(Type::Void)
    }
}

/// Resolves every function of a parsed source file.
///
/// Signatures are registered first so bodies may call functions declared
/// further down. A function whose body fails to resolve or fails a flow
/// check keeps its signature but has no body.
pub fn resolve(functions: &[FunctionDecl], diagnostics: &mut Diagnostics) -> ResolvedProgram {
    let errors_before = diagnostics.error_count();

    let mut resolver = Resolver::new(diagnostics);
    let println = create_builtin_println(&mut resolver.decls);
    // The global scope is empty at this point.
    let _ = resolver.insert_decl_to_current_scope(println);

    let mut signatures = Vec::new();
    for function in functions {
        if let Some(id) = resolve_function_signature(&mut resolver, function) {
            signatures.push((id, function));
        }
    }

    for (id, function) in &signatures {
        let Some(body) = resolve_function_body(&mut resolver, *id, function) else {
            continue;
        };

        if !run_flow_sensitive_checks(&mut resolver, *id, &body) {
            continue;
        }

        if let Some(ResolvedDecl::Function(function)) = resolver.decls.get_mut(*id) {
            function.body = Some(body);
        }
    }

    let Resolver { decls, .. } = resolver;

    ResolvedProgram {
        decls,
        functions: signatures.into_iter().map(|(id, _)| id).collect(),
        valid: diagnostics.error_count() == errors_before,
    }
}

fn create_builtin_println(decls: &mut DeclArena) -> DeclId {
    let println = decls.push(ResolvedDecl::Function(ResolvedFunctionDecl {
        identifier: String::from("println"),
        position: Position::builtin(),
        return_type: Type::Void,
        params: Vec::new(),
        body: None,
        is_builtin: true,
    }));

    let param = decls.push(ResolvedDecl::Param(ResolvedParamDecl {
        identifier: String::from("n"),
        position: Position::builtin(),
        param_type: Type::Number,
    }));

    if let Some(ResolvedDecl::Function(function)) = decls.get_mut(println) {
        function.params.push(param);
    }

    println
}

/// `void` is only valid as a function return type.
fn resolve_type(
    resolver: &mut Resolver,
    parsed_type: &Type,
    subject: &'static str,
    identifier: &str,
    position: &Position,
    allow_void: bool,
) -> Option<Type> {
    match parsed_type {
        Type::Number => Some(Type::Number),
        Type::Void if allow_void => Some(Type::Void),
        Type::Void | Type::Custom(_) => resolver.report(Error::new(
            ErrorImpl::InvalidType {
                subject,
                identifier: identifier.to_string(),
                type_name: parsed_type.name().to_string(),
            },
            position.clone(),
        )),
    }
}

fn resolve_param_decl(resolver: &mut Resolver, param: &ParamDecl) -> Option<DeclId> {
    let param_type = resolve_type(
        resolver,
        &param.param_type,
        "parameter",
        &param.identifier,
        &param.position,
        false,
    )?;

    let id = resolver.decls.push(ResolvedDecl::Param(ResolvedParamDecl {
        identifier: param.identifier.clone(),
        position: param.position.clone(),
        param_type,
    }));
    resolver.insert_decl_to_current_scope(id)?;

    Some(id)
}

/// Resolves the parts of a function that callers rely on and registers the
/// function in the global scope.
pub fn resolve_function_signature(
    resolver: &mut Resolver,
    function: &FunctionDecl,
) -> Option<DeclId> {
    let return_type = resolve_type(
        resolver,
        &function.return_type,
        "function",
        &function.identifier,
        &function.position,
        true,
    )?;

    if function.identifier == "main" {
        if return_type != Type::Void {
            return resolver.report(Error::new(
                ErrorImpl::MainReturnType,
                function.position.clone(),
            ));
        }

        if !function.params.is_empty() {
            return resolver.report(Error::new(
                ErrorImpl::MainParameters,
                function.position.clone(),
            ));
        }
    }

    let params = resolver.with_scope(|resolver| {
        let mut params = Vec::new();
        let mut failed = false;

        for param in &function.params {
            match resolve_param_decl(resolver, param) {
                Some(id) => params.push(id),
                None => failed = true,
            }
        }

        (!failed).then_some(params)
    })?;

    let id = resolver.decls.push(ResolvedDecl::Function(ResolvedFunctionDecl {
        identifier: function.identifier.clone(),
        position: function.position.clone(),
        return_type,
        params,
        body: None,
        is_builtin: false,
    }));
    resolver.insert_decl_to_current_scope(id)?;

    Some(id)
}

fn resolve_function_body(
    resolver: &mut Resolver,
    id: DeclId,
    function: &FunctionDecl,
) -> Option<ResolvedBlock> {
    let params = resolver
        .decls
        .function(id)
        .map(|function| function.params.clone())
        .unwrap_or_default();

    resolver.current_function = Some(id);
    let body = resolver.with_scope(|resolver| {
        for param in params {
            resolver.insert_decl_to_current_scope(param)?;
        }

        resolve_block(resolver, &function.body)
    });
    resolver.current_function = None;

    body
}

/// Builds the CFG of a resolved body and runs the return coverage and the
/// initialization checks on it. Both checks always run.
fn run_flow_sensitive_checks(resolver: &mut Resolver, id: DeclId, body: &ResolvedBlock) -> bool {
    let Some(function) = resolver.decls.function(id) else {
        return false;
    };

    let cfg = CfgBuilder::new(&resolver.decls).build(body);

    let returns = check_return_on_all_paths(function, &cfg, resolver.diagnostics);
    let initialization = check_variable_initialization(&cfg, &resolver.decls, resolver.diagnostics);

    returns && initialization
}

pub fn resolve_block(resolver: &mut Resolver, block: &Block) -> Option<ResolvedBlock> {
    resolver.with_scope(|resolver| {
        let mut statements = Vec::new();
        let mut failed = false;
        let mut statements_after_return = 0;

        for stmt in &block.statements {
            match resolve_stmt(resolver, stmt) {
                Some(resolved) => statements.push(resolved),
                None => failed = true,
            }

            if failed {
                continue;
            }

            if statements_after_return == 1 {
                resolver.warn(ErrorImpl::UnreachableStatement, stmt.position().clone());
                statements_after_return += 1;
            }

            if matches!(stmt, Stmt::Return(_)) {
                statements_after_return += 1;
            }
        }

        if failed {
            return None;
        }

        Some(ResolvedBlock {
            statements,
            position: block.position.clone(),
        })
    })
}

pub fn resolve_stmt(resolver: &mut Resolver, stmt: &Stmt) -> Option<ResolvedStmt> {
    match stmt {
        Stmt::Expression(expr) => Some(ResolvedStmt::Expression(resolve_expr(resolver, expr)?)),
        Stmt::If(if_stmt) => Some(ResolvedStmt::If(resolve_if_stmt(resolver, if_stmt)?)),
        Stmt::While(while_stmt) => {
            Some(ResolvedStmt::While(resolve_while_stmt(resolver, while_stmt)?))
        }
        Stmt::Decl(decl_stmt) => Some(ResolvedStmt::Decl(resolve_decl_stmt(resolver, decl_stmt)?)),
        Stmt::Assignment(assignment) => Some(ResolvedStmt::Assignment(resolve_assignment(
            resolver, assignment,
        )?)),
        Stmt::Return(return_stmt) => {
            Some(ResolvedStmt::Return(resolve_return_stmt(resolver, return_stmt)?))
        }
    }
}

fn resolve_condition(resolver: &mut Resolver, condition: &Expr) -> Option<ResolvedExpr> {
    let condition = resolve_expr(resolver, condition)?;

    if condition.expr_type != Type::Number {
        return resolver.report(Error::new(
            ErrorImpl::ConditionNotNumber,
            condition.position.clone(),
        ));
    }

    resolver.annotate_constant(&condition);
    Some(condition)
}

fn resolve_if_stmt(resolver: &mut Resolver, if_stmt: &IfStmt) -> Option<ResolvedIfStmt> {
    let condition = resolve_condition(resolver, &if_stmt.condition)?;
    let true_block = resolve_block(resolver, &if_stmt.true_block)?;

    let false_block = match &if_stmt.false_block {
        Some(false_block) => Some(resolve_block(resolver, false_block)?),
        None => None,
    };

    Some(ResolvedIfStmt {
        condition,
        true_block,
        false_block,
        position: if_stmt.position.clone(),
    })
}

fn resolve_while_stmt(resolver: &mut Resolver, while_stmt: &WhileStmt) -> Option<ResolvedWhileStmt> {
    let condition = resolve_condition(resolver, &while_stmt.condition)?;
    let body = resolve_block(resolver, &while_stmt.body)?;

    Some(ResolvedWhileStmt {
        condition,
        body,
        position: while_stmt.position.clone(),
    })
}

fn resolve_decl_stmt(resolver: &mut Resolver, decl_stmt: &DeclStmt) -> Option<ResolvedDeclStmt> {
    let var_decl = &decl_stmt.var_decl;
    let var_type = resolve_type(
        resolver,
        &var_decl.var_type,
        "variable",
        &var_decl.identifier,
        &var_decl.position,
        false,
    )?;

    let initializer = match &var_decl.initializer {
        Some(initializer) => {
            let initializer = resolve_expr(resolver, initializer)?;

            if initializer.expr_type != var_type {
                return resolver.report(Error::new(
                    ErrorImpl::InitializerTypeMismatch {
                        expected: var_type.to_string(),
                        received: initializer.expr_type.to_string(),
                    },
                    initializer.position.clone(),
                ));
            }

            resolver.annotate_constant(&initializer);
            Some(initializer)
        }
        None => None,
    };

    let id = resolver.decls.push(ResolvedDecl::Var(ResolvedVarDecl {
        identifier: var_decl.identifier.clone(),
        position: var_decl.position.clone(),
        var_type,
        is_mutable: var_decl.is_mutable,
        initializer,
    }));
    resolver.insert_decl_to_current_scope(id)?;

    Some(ResolvedDeclStmt {
        var_decl: id,
        position: decl_stmt.position.clone(),
    })
}

fn resolve_assignment(
    resolver: &mut Resolver,
    assignment: &Assignment,
) -> Option<ResolvedAssignment> {
    let (variable, variable_type) = resolve_decl_ref_expr(resolver, &assignment.variable, false)?;

    if let Some(ResolvedDecl::Param(param)) = resolver.decls.get(variable.decl) {
        let identifier = param.identifier.clone();
        return resolver.report(Error::new(
            ErrorImpl::ParameterAssignment { identifier },
            assignment.position.clone(),
        ));
    }

    let value = resolve_expr(resolver, &assignment.value)?;

    if value.expr_type != variable_type {
        return resolver.report(Error::new(
            ErrorImpl::AssignmentTypeMismatch {
                expected: variable_type.to_string(),
                received: value.expr_type.to_string(),
            },
            assignment.position.clone(),
        ));
    }

    resolver.annotate_constant(&value);

    Some(ResolvedAssignment {
        variable,
        value,
        position: assignment.position.clone(),
    })
}

fn resolve_return_stmt(
    resolver: &mut Resolver,
    return_stmt: &ReturnStmt,
) -> Option<ResolvedReturnStmt> {
    let return_type = resolver.current_return_type();

    let value = match &return_stmt.value {
        None if return_type != Type::Void => {
            return resolver.report(Error::new(
                ErrorImpl::ExpectedReturnValue,
                return_stmt.position.clone(),
            ));
        }
        None => None,
        Some(_) if return_type == Type::Void => {
            return resolver.report(Error::new(
                ErrorImpl::UnexpectedReturnValue,
                return_stmt.position.clone(),
            ));
        }
        Some(value) => {
            let value = resolve_expr(resolver, value)?;

            if value.expr_type != return_type {
                return resolver.report(Error::new(
                    ErrorImpl::ReturnTypeMismatch {
                        expected: return_type.to_string(),
                        received: value.expr_type.to_string(),
                    },
                    value.position.clone(),
                ));
            }

            resolver.annotate_constant(&value);
            Some(value)
        }
    };

    Some(ResolvedReturnStmt {
        value,
        position: return_stmt.position.clone(),
    })
}

pub fn resolve_expr(resolver: &mut Resolver, expr: &Expr) -> Option<ResolvedExpr> {
    match expr {
        Expr::Number(literal) => {
            let Ok(value) = literal.value.parse::<f64>() else {
                return resolver.report(Error::new(
                    ErrorImpl::InvalidNumber {
                        literal: literal.value.clone(),
                    },
                    literal.position.clone(),
                ));
            };

            Some(ResolvedExpr::new(
                ResolvedExprKind::Number(ResolvedNumberLiteral { value }),
                Type::Number,
                literal.position.clone(),
            ))
        }
        Expr::DeclRef(decl_ref) => {
            let (resolved, expr_type) = resolve_decl_ref_expr(resolver, decl_ref, false)?;

            Some(ResolvedExpr::new(
                ResolvedExprKind::DeclRef(resolved),
                expr_type,
                decl_ref.position.clone(),
            ))
        }
        Expr::Call(call) => resolve_call_expr(resolver, call),
        Expr::Grouping(grouping) => {
            let inner = resolve_expr(resolver, &grouping.expr)?;
            let expr_type = inner.expr_type.clone();

            Some(ResolvedExpr::new(
                ResolvedExprKind::Grouping(ResolvedGroupingExpr {
                    expr: Box::new(inner),
                }),
                expr_type,
                grouping.position.clone(),
            ))
        }
        Expr::Binary(binary) => resolve_binary_operator(resolver, binary),
        Expr::Unary(unary) => resolve_unary_operator(resolver, unary),
    }
}

/// Resolves a reference to a declaration and returns it with its type.
///
/// Outside of callee position the reference must not name a function.
fn resolve_decl_ref_expr(
    resolver: &mut Resolver,
    decl_ref: &DeclRefExpr,
    is_callee: bool,
) -> Option<(ResolvedDeclRefExpr, Type)> {
    let Some((decl, _)) = resolver.lookup_decl(&decl_ref.identifier) else {
        return resolver.report(Error::new(
            ErrorImpl::SymbolNotFound {
                symbol: decl_ref.identifier.clone(),
            },
            decl_ref.position.clone(),
        ));
    };

    if !is_callee && matches!(resolver.decls[decl], ResolvedDecl::Function(_)) {
        return resolver.report(Error::new(
            ErrorImpl::ExpectedFunctionCall {
                identifier: decl_ref.identifier.clone(),
            },
            decl_ref.position.clone(),
        ));
    }

    let decl_type = resolver.decls[decl].decl_type().clone();

    Some((
        ResolvedDeclRefExpr {
            decl,
            identifier: decl_ref.identifier.clone(),
        },
        decl_type,
    ))
}

fn resolve_call_expr(resolver: &mut Resolver, call: &CallExpr) -> Option<ResolvedExpr> {
    let Expr::DeclRef(callee) = call.callee.as_ref() else {
        return resolver.report(Error::new(ErrorImpl::NotCallable, call.position.clone()));
    };

    let (callee, _) = resolve_decl_ref_expr(resolver, callee, true)?;

    let Some(function) = resolver.decls.function(callee.decl) else {
        return resolver.report(Error::new(
            ErrorImpl::CallingNonFunction {
                identifier: callee.identifier,
            },
            call.position.clone(),
        ));
    };

    let return_type = function.return_type.clone();
    let param_types = function
        .params
        .iter()
        .map(|param| resolver.decls[*param].decl_type().clone())
        .collect::<Vec<_>>();

    if call.arguments.len() != param_types.len() {
        return resolver.report(Error::new(
            ErrorImpl::ArgumentCountMismatch {
                expected: param_types.len(),
                received: call.arguments.len(),
            },
            call.position.clone(),
        ));
    }

    let mut arguments = Vec::with_capacity(call.arguments.len());
    for (argument, param_type) in call.arguments.iter().zip(param_types) {
        let argument = resolve_expr(resolver, argument)?;

        if argument.expr_type != param_type {
            return resolver.report(Error::new(
                ErrorImpl::ArgumentTypeMismatch {
                    expected: param_type.to_string(),
                    received: argument.expr_type.to_string(),
                },
                argument.position.clone(),
            ));
        }

        resolver.annotate_constant(&argument);
        arguments.push(argument);
    }

    Some(ResolvedExpr::new(
        ResolvedExprKind::Call(ResolvedCallExpr {
            callee: callee.decl,
            arguments,
        }),
        return_type,
        call.position.clone(),
    ))
}

fn resolve_binary_operator(
    resolver: &mut Resolver,
    binary: &BinaryOperator,
) -> Option<ResolvedExpr> {
    let lhs = resolve_expr(resolver, &binary.lhs)?;
    let rhs = resolve_expr(resolver, &binary.rhs)?;

    if lhs.expr_type.is_void() {
        return resolver.report(Error::new(
            ErrorImpl::VoidBinaryOperand { side: "LHS" },
            lhs.position.clone(),
        ));
    }

    if rhs.expr_type.is_void() {
        return resolver.report(Error::new(
            ErrorImpl::VoidBinaryOperand { side: "RHS" },
            rhs.position.clone(),
        ));
    }

    Some(ResolvedExpr::new(
        ResolvedExprKind::Binary(ResolvedBinaryOperator {
            op: binary.op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }),
        Type::Number,
        binary.position.clone(),
    ))
}

fn resolve_unary_operator(resolver: &mut Resolver, unary: &UnaryOperator) -> Option<ResolvedExpr> {
    let operand = resolve_expr(resolver, &unary.operand)?;

    if operand.expr_type.is_void() {
        return resolver.report(Error::new(
            ErrorImpl::VoidUnaryOperand,
            operand.position.clone(),
        ));
    }

    Some(ResolvedExpr::new(
        ResolvedExprKind::Unary(ResolvedUnaryOperator {
            op: unary.op,
            operand: Box::new(operand),
        }),
        Type::Number,
        unary.position.clone(),
    ))
}
