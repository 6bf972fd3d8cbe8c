//! Checks that need the control-flow graph of a function.
//!
//! Both checks report into the diagnostics they are given and return
//! `true` when the function passed.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    cfg::cfg::{Cfg, CfgStmt},
    errors::{
        diagnostics::Diagnostics,
        errors::{Error, ErrorImpl},
    },
};

use super::resolved_ast::{DeclArena, DeclId, ResolvedExprKind, ResolvedFunctionDecl, ResolvedStmt};

/// A non-void function must not be able to fall off its end.
///
/// Only reachable edges are followed. A block that starts with a `return`
/// ends the path it is on.
pub fn check_return_on_all_paths(
    function: &ResolvedFunctionDecl,
    cfg: &Cfg,
    diagnostics: &mut Diagnostics,
) -> bool {
    if function.return_type.is_void() {
        return true;
    }

    let mut return_count = 0;
    let mut exit_reached = false;

    let mut visited = BTreeSet::new();
    let mut worklist = vec![cfg.entry];

    while let Some(block) = worklist.pop() {
        if !visited.insert(block) {
            continue;
        }

        exit_reached |= block == cfg.exit;

        let basic_block = &cfg.basic_blocks[block];
        if basic_block
            .statements
            .first()
            .is_some_and(|stmt| stmt.is_return())
        {
            return_count += 1;
            continue;
        }

        for (successor, reachable) in &basic_block.successors {
            if *reachable {
                worklist.push(*successor);
            }
        }
    }

    if !exit_reached && return_count > 0 {
        return true;
    }

    let error = if return_count > 0 {
        ErrorImpl::MissingReturnOnSomePaths
    } else {
        ErrorImpl::MissingReturn
    };
    diagnostics.report(Error::new(error, function.position.clone()));

    false
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Bottom,
    Unassigned,
    Assigned,
    Top,
}

impl State {
    fn join(self, other: State) -> State {
        match (self, other) {
            (a, b) if a == b => a,
            (State::Bottom, other) | (other, State::Bottom) => other,
            _ => State::Top,
        }
    }
}

type Lattice = BTreeMap<DeclId, State>;

/// Variables must be assigned before they are read, and `let` variables
/// may only be assigned while they are still unassigned.
///
/// Block states are recomputed until none of them changes. Only the errors
/// found during the last pass are reported.
pub fn check_variable_initialization(
    cfg: &Cfg,
    decls: &DeclArena,
    diagnostics: &mut Diagnostics,
) -> bool {
    let mut lattices = vec![Lattice::new(); cfg.len()];
    let mut pending_errors = Vec::new();

    let mut changed = true;
    while changed {
        changed = false;
        pending_errors.clear();

        for block in (cfg.exit + 1..=cfg.entry).rev() {
            let basic_block = &cfg.basic_blocks[block];

            let mut current = Lattice::new();
            for (predecessor, _) in &basic_block.predecessors {
                for (decl, state) in &lattices[*predecessor] {
                    let entry = current.entry(*decl).or_default();
                    *entry = entry.join(*state);
                }
            }

            for stmt in basic_block.statements.iter().rev() {
                match stmt {
                    CfgStmt::Stmt(ResolvedStmt::Decl(decl_stmt)) => {
                        let initialized = decls
                            .var(decl_stmt.var_decl)
                            .is_some_and(|var| var.initializer.is_some());

                        let state = if initialized {
                            State::Assigned
                        } else {
                            State::Unassigned
                        };
                        current.insert(decl_stmt.var_decl, state);
                    }
                    CfgStmt::Stmt(ResolvedStmt::Assignment(assignment)) => {
                        let id = assignment.variable.decl;
                        let Some(var) = decls.var(id) else {
                            unreachable!("assignment to a non-variable survived resolution");
                        };

                        let state = current.entry(id).or_default();
                        if !var.is_mutable && *state != State::Unassigned {
                            pending_errors.push(Error::new(
                                ErrorImpl::ImmutableMutation {
                                    identifier: var.identifier.clone(),
                                },
                                assignment.position.clone(),
                            ));
                        }

                        *state = State::Assigned;
                    }
                    CfgStmt::Expr(expr) => {
                        let ResolvedExprKind::DeclRef(decl_ref) = &expr.kind else {
                            continue;
                        };
                        let Some(var) = decls.var(decl_ref.decl) else {
                            continue;
                        };

                        if *current.entry(decl_ref.decl).or_default() != State::Assigned {
                            pending_errors.push(Error::new(
                                ErrorImpl::UninitializedVariable {
                                    identifier: var.identifier.clone(),
                                },
                                expr.position.clone(),
                            ));
                        }
                    }
                    CfgStmt::Stmt(_) => {}
                }
            }

            if lattices[block] != current {
                lattices[block] = current;
                changed = true;
            }
        }
    }

    let passed = pending_errors.is_empty();
    for error in pending_errors {
        diagnostics.report(error);
    }

    passed
}
