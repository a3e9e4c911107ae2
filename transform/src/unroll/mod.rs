//! Loop unrolling.
//!
//! A single top-down walk classifies every `For` node and either keeps it,
//! marks it `Unrolled`, or replaces it with one copy of its body per
//! iteration. The walk continues inside each copy, so inner loops whose
//! extent became constant after substitution are considered too.
//!
//! # Architecture
//!
//! - `decision.rs`: annotation scopes, per-loop costs and decisions
//! - `duplicate.rs`: per-iteration body copies with fresh definitions
//!
//! Subtrees the walk leaves unchanged are returned as the same `Arc`.

pub mod decision;
pub mod duplicate;

use std::sync::Arc;

use tirx_ir::{ForKind, NameSupply, PrimFunc, Stmt};

use crate::config::UnrollConfig;
use crate::error::Result;

pub use decision::{Decision, Pragma, Scope, classify, unrolled_steps};
pub use duplicate::Duplicator;

/// Unroll loops in `func` according to `config`.
///
/// The returned function has the same signature. When nothing is unrolled,
/// its body is the input body (`Arc::ptr_eq`).
#[tracing::instrument(skip_all, fields(ast.initial = %func.body.tree()))]
pub fn unroll_loop(func: &PrimFunc, config: &UnrollConfig) -> Result<PrimFunc> {
    config.validate()?;
    let mut unroller = LoopUnroller::new(NameSupply::from_func(func));
    match unroller.visit(&func.body, Scope::from(config), 0)? {
        Some(body) => {
            tracing::debug!(ast.unrolled = %body.tree(), loops.unrolled = unroller.unrolled, "after unroll_loop");
            Ok(func.with_body(body))
        }
        None => Ok(func.clone()),
    }
}

/// [`unroll_loop`] over a bare statement.
#[tracing::instrument(skip_all, fields(ast.initial = %stmt.tree()))]
pub fn unroll_loop_stmt(stmt: &Arc<Stmt>, config: &UnrollConfig) -> Result<Arc<Stmt>> {
    config.validate()?;
    let mut unroller = LoopUnroller::new(NameSupply::from_stmt(stmt));
    let out = unroller.visit(stmt, Scope::from(config), 0)?;
    Ok(out.unwrap_or_else(|| stmt.clone()))
}

/// Walk state for one invocation.
struct LoopUnroller {
    names: NameSupply,
    unrolled: usize,
}

impl LoopUnroller {
    fn new(names: NameSupply) -> Self {
        Self { names, unrolled: 0 }
    }

    /// Rewrite `stmt`; `None` means unchanged.
    fn visit(&mut self, stmt: &Arc<Stmt>, scope: Scope, depth: i64) -> Result<Option<Arc<Stmt>>> {
        match &**stmt {
            Stmt::For { loop_var, min, extent, kind, body } => {
                let body_steps = unrolled_steps(body, &scope, depth.saturating_add(1));
                let decision = classify(loop_var, extent, *kind, &scope, depth, body_steps)?;
                let inner = depth.saturating_add(1);

                if decision.materializes(&scope)
                    && let Some(n) = decision.extent()
                {
                    self.unrolled += 1;
                    let copies = Duplicator::new(&mut self.names).copies(loop_var, min, n, body);
                    let mut walked = Vec::with_capacity(copies.len());
                    for copy in copies {
                        walked.push(self.visit(&copy, scope, inner)?.unwrap_or(copy));
                    }
                    let unrolled = if walked.len() == 1 { walked.swap_remove(0) } else { Stmt::seq(walked) };
                    return Ok(Some(unrolled));
                }

                let new_kind = match decision {
                    Decision::Auto { .. } => ForKind::Unrolled,
                    _ => *kind,
                };
                let new_body = self.visit(body, scope, inner)?;
                if new_kind == *kind && new_body.is_none() {
                    return Ok(None);
                }
                Ok(Some(Stmt::for_(loop_var, min.clone(), extent.clone(), new_kind, new_body.unwrap_or_else(|| body.clone()))))
            }
            Stmt::Attr { node, key, value, body } => match scope.apply_pragma(key, value) {
                Pragma::Applied(inner) => {
                    tracing::debug!(key = %key, value = %value, "entering unroll pragma scope");
                    let new_body = self.visit(body, inner, depth)?;
                    Ok(Some(new_body.unwrap_or_else(|| body.clone())))
                }
                pragma => {
                    if pragma == Pragma::Unrecognized {
                        tracing::warn!(key = %key, value = %value, "ignoring unroll pragma without a non-negative integer value");
                    }
                    let new_body = self.visit(body, scope, depth)?;
                    Ok(new_body.map(|body| Stmt::attr(node.clone(), key.clone(), value.clone(), body)))
                }
            },
            Stmt::Seq(items) => {
                let mut changed = false;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match self.visit(item, scope, depth)? {
                        Some(new) => {
                            changed = true;
                            out.push(new);
                        }
                        None => out.push(item.clone()),
                    }
                }
                Ok(changed.then(|| Stmt::seq(out)))
            }
            Stmt::Allocate { buffer, body } => {
                Ok(self.visit(body, scope, depth)?.map(|body| Stmt::allocate(buffer, body)))
            }
            Stmt::Let { var, value, body } => {
                Ok(self.visit(body, scope, depth)?.map(|body| Stmt::let_(var, value.clone(), body)))
            }
            Stmt::IfThenElse { cond, then_case, else_case } => {
                let new_then = self.visit(then_case, scope, depth)?;
                let new_else = match else_case {
                    Some(e) => self.visit(e, scope, depth)?,
                    None => None,
                };
                if new_then.is_none() && new_else.is_none() {
                    return Ok(None);
                }
                Ok(Some(Stmt::if_then_else(
                    cond.clone(),
                    new_then.unwrap_or_else(|| then_case.clone()),
                    new_else.or_else(|| else_case.clone()),
                )))
            }
            Stmt::BufferStore { .. } | Stmt::Evaluate(_) => Ok(None),
        }
    }
}
