//! Variable and buffer substitution.
//!
//! Substitution rewrites free occurrences only: a definition site (`For` loop
//! variable, `Let` variable) that rebinds a mapped variable shadows the mapping
//! for its scope. Buffers have unique identity, so a buffer mapping rewrites
//! every occurrence including the `Allocate` that declares it.
//!
//! Rewritten binary expressions are re-folded, so binding `i` to a constant
//! turns `i + 1` into a constant as well. Subtrees without any rewritten
//! occurrence are returned as the same `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::expr::{Expr, Indices};
use crate::stmt::Stmt;
use crate::types::AttrNode;
use crate::var::{Buffer, Var};

/// Replacement table for a substitution.
#[derive(Debug, Clone, Default)]
pub struct VarMap {
    vars: HashMap<Var, Expr>,
    buffers: HashMap<Buffer, Buffer>,
}

impl VarMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`VarMap::insert`].
    pub fn bind(mut self, var: &Var, value: impl Into<Expr>) -> Self {
        self.insert(var, value);
        self
    }

    pub fn insert(&mut self, var: &Var, value: impl Into<Expr>) -> Option<Expr> {
        self.vars.insert(var.clone(), value.into())
    }

    pub fn insert_buffer(&mut self, from: &Buffer, to: &Buffer) -> Option<Buffer> {
        self.buffers.insert(from.clone(), to.clone())
    }

    pub fn get(&self, var: &Var) -> Option<&Expr> {
        self.vars.get(var)
    }

    pub fn get_buffer(&self, buffer: &Buffer) -> Option<&Buffer> {
        self.buffers.get(buffer)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty() && self.buffers.is_empty()
    }
}

/// Hook deciding whether a definition site gets a new identity.
///
/// Returning `Some` from [`Rebind::var`] or [`Rebind::buffer`] replaces the
/// defined variable or allocated buffer, and every use of it in scope, with the
/// returned one.
pub trait Rebind {
    fn var(&mut self, _old: &Var) -> Option<Var> {
        None
    }

    fn buffer(&mut self, _old: &Buffer) -> Option<Buffer> {
        None
    }
}

/// Keeps every definition as it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepBindings;

impl Rebind for KeepBindings {}

/// Substitute free occurrences in an expression.
pub fn substitute_expr(expr: &Expr, map: &VarMap) -> Expr {
    Substituter::new(map.clone(), KeepBindings).expr(expr).unwrap_or_else(|| expr.clone())
}

/// Substitute free occurrences in a statement tree.
pub fn substitute_stmt(stmt: &Arc<Stmt>, map: &VarMap) -> Arc<Stmt> {
    if map.is_empty() {
        return stmt.clone();
    }
    Substituter::new(map.clone(), KeepBindings).stmt(stmt).unwrap_or_else(|| stmt.clone())
}

/// Tree rewriter applying a [`VarMap`] and a [`Rebind`] policy.
///
/// The `expr`/`stmt` methods return `None` when nothing changed.
pub struct Substituter<R> {
    map: VarMap,
    rebind: R,
}

impl<R: Rebind> Substituter<R> {
    pub fn new(map: VarMap, rebind: R) -> Self {
        Self { map, rebind }
    }

    pub fn expr(&mut self, expr: &Expr) -> Option<Expr> {
        match expr {
            Expr::Const { .. } => None,
            Expr::Var(v) => self.map.vars.get(v).cloned(),
            Expr::Binary { op, lhs, rhs } => {
                let (l, r) = (self.expr(lhs), self.expr(rhs));
                if l.is_none() && r.is_none() {
                    return None;
                }
                let l = l.unwrap_or_else(|| (**lhs).clone());
                let r = r.unwrap_or_else(|| (**rhs).clone());
                Some(Expr::fold(*op, l, r))
            }
            Expr::Load { buffer, indices } => {
                let new_buffer = self.map.buffers.get(buffer).cloned();
                let new_indices = self.indices(indices);
                if new_buffer.is_none() && new_indices.is_none() {
                    return None;
                }
                Some(Expr::Load {
                    buffer: new_buffer.unwrap_or_else(|| buffer.clone()),
                    indices: new_indices.map(Arc::from).unwrap_or_else(|| indices.clone()),
                })
            }
        }
    }

    fn indices(&mut self, indices: &[Expr]) -> Option<Vec<Expr>> {
        let rewritten: Vec<Option<Expr>> = indices.iter().map(|e| self.expr(e)).collect();
        if rewritten.iter().all(Option::is_none) {
            return None;
        }
        Some(rewritten.into_iter().zip(indices).map(|(new, old)| new.unwrap_or_else(|| old.clone())).collect())
    }

    pub fn stmt(&mut self, stmt: &Arc<Stmt>) -> Option<Arc<Stmt>> {
        match &**stmt {
            Stmt::For { loop_var, min, extent, kind, body } => {
                let new_min = self.expr(min);
                let new_extent = self.expr(extent);
                let (new_var, new_body) = self.with_var_scope(loop_var, |this| this.stmt(body));
                if new_min.is_none() && new_extent.is_none() && new_var.is_none() && new_body.is_none() {
                    return None;
                }
                Some(Arc::new(Stmt::For {
                    loop_var: new_var.unwrap_or_else(|| loop_var.clone()),
                    min: new_min.unwrap_or_else(|| min.clone()),
                    extent: new_extent.unwrap_or_else(|| extent.clone()),
                    kind: *kind,
                    body: new_body.unwrap_or_else(|| body.clone()),
                }))
            }
            Stmt::Let { var, value, body } => {
                let new_value = self.expr(value);
                let (new_var, new_body) = self.with_var_scope(var, |this| this.stmt(body));
                if new_value.is_none() && new_var.is_none() && new_body.is_none() {
                    return None;
                }
                Some(Arc::new(Stmt::Let {
                    var: new_var.unwrap_or_else(|| var.clone()),
                    value: new_value.unwrap_or_else(|| value.clone()),
                    body: new_body.unwrap_or_else(|| body.clone()),
                }))
            }
            Stmt::Allocate { buffer, body } => {
                let new_shape: Option<Vec<Expr>> = {
                    let rewritten: Vec<Option<Expr>> = buffer.shape().iter().map(|e| self.expr(e)).collect();
                    (!rewritten.iter().all(Option::is_none)).then(|| {
                        rewritten.into_iter().zip(buffer.shape()).map(|(n, o)| n.unwrap_or_else(|| o.clone())).collect()
                    })
                };
                let mut decl = self.map.buffers.get(buffer).cloned().or_else(|| self.rebind.buffer(buffer));
                if let Some(shape) = new_shape {
                    decl = Some(decl.as_ref().unwrap_or(buffer).with_shape(shape));
                }
                let Some(decl) = decl else {
                    return self.stmt(body).map(|body| Stmt::allocate(buffer, body));
                };
                let previous = self.map.buffers.insert(buffer.clone(), decl.clone());
                let new_body = self.stmt(body);
                match previous {
                    Some(prev) => self.map.buffers.insert(buffer.clone(), prev),
                    None => self.map.buffers.remove(buffer),
                };
                Some(Stmt::allocate(&decl, new_body.unwrap_or_else(|| body.clone())))
            }
            Stmt::BufferStore { buffer, indices, value } => {
                let new_buffer = self.map.buffers.get(buffer).cloned();
                let new_indices = self.indices(indices);
                let new_value = self.expr(value);
                if new_buffer.is_none() && new_indices.is_none() && new_value.is_none() {
                    return None;
                }
                Some(Arc::new(Stmt::BufferStore {
                    buffer: new_buffer.unwrap_or_else(|| buffer.clone()),
                    indices: new_indices.map(Indices::from_vec).unwrap_or_else(|| indices.clone()),
                    value: new_value.unwrap_or_else(|| value.clone()),
                }))
            }
            Stmt::Seq(items) => {
                let mut changed = false;
                let items: Vec<Arc<Stmt>> = items
                    .iter()
                    .map(|item| match self.stmt(item) {
                        Some(new) => {
                            changed = true;
                            new
                        }
                        None => item.clone(),
                    })
                    .collect();
                changed.then(|| Stmt::seq(items))
            }
            Stmt::Attr { node, key, value, body } => {
                let new_node = self.attr_node(node);
                let new_value = self.expr(value);
                let new_body = self.stmt(body);
                if new_node.is_none() && new_value.is_none() && new_body.is_none() {
                    return None;
                }
                Some(Arc::new(Stmt::Attr {
                    node: new_node.unwrap_or_else(|| node.clone()),
                    key: key.clone(),
                    value: new_value.unwrap_or_else(|| value.clone()),
                    body: new_body.unwrap_or_else(|| body.clone()),
                }))
            }
            Stmt::IfThenElse { cond, then_case, else_case } => {
                let new_cond = self.expr(cond);
                let new_then = self.stmt(then_case);
                let new_else = else_case.as_ref().and_then(|e| self.stmt(e));
                if new_cond.is_none() && new_then.is_none() && new_else.is_none() {
                    return None;
                }
                Some(Arc::new(Stmt::IfThenElse {
                    cond: new_cond.unwrap_or_else(|| cond.clone()),
                    then_case: new_then.unwrap_or_else(|| then_case.clone()),
                    else_case: new_else.or_else(|| else_case.clone()),
                }))
            }
            Stmt::Evaluate(value) => self.expr(value).map(|v| Arc::new(Stmt::Evaluate(v))),
        }
    }

    fn attr_node(&mut self, node: &AttrNode) -> Option<AttrNode> {
        match node {
            AttrNode::Var(v) => match self.map.vars.get(v) {
                Some(Expr::Var(new)) => Some(AttrNode::Var(new.clone())),
                _ => None,
            },
            AttrNode::Buffer(b) => self.map.buffers.get(b).cloned().map(AttrNode::Buffer),
            AttrNode::None | AttrNode::Int(_) => None,
        }
    }

    /// Run `f` with `var` defined: either rebound to a fresh variable or
    /// shadowing any mapping of it. The outer mapping is restored afterwards.
    fn with_var_scope<T>(&mut self, var: &Var, f: impl FnOnce(&mut Self) -> T) -> (Option<Var>, T) {
        let fresh = self.rebind.var(var);
        let previous = match &fresh {
            Some(new) => self.map.vars.insert(var.clone(), Expr::Var(new.clone())),
            None => {
                let shadowed = self.map.vars.remove(var);
                if shadowed.is_some() {
                    tracing::trace!(var = %var, "definition shadows substituted variable");
                }
                shadowed
            }
        };
        let out = f(self);
        match previous {
            Some(prev) => self.map.vars.insert(var.clone(), prev),
            None => self.map.vars.remove(var),
        };
        (fresh, out)
    }
}
