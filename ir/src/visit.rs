//! Read-only traversal of statement trees.

use crate::expr::Expr;
use crate::stmt::Stmt;
use crate::types::AttrNode;
use crate::var::{Buffer, Var};

/// Pre-order visitor. Override a method to intercept a node kind; call the
/// matching `walk_*` function to keep descending.
pub trait Visitor {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    /// Every occurrence of a variable, definitions included.
    fn visit_var(&mut self, _var: &Var) {}

    /// Every occurrence of a buffer, allocations included.
    fn visit_buffer(&mut self, _buffer: &Buffer) {}
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, expr: &Expr) {
    match expr {
        Expr::Const { .. } => {}
        Expr::Var(var) => v.visit_var(var),
        Expr::Binary { lhs, rhs, .. } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        Expr::Load { buffer, indices } => {
            v.visit_buffer(buffer);
            indices.iter().for_each(|i| v.visit_expr(i));
        }
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::For { loop_var, min, extent, body, .. } => {
            v.visit_var(loop_var);
            v.visit_expr(min);
            v.visit_expr(extent);
            v.visit_stmt(body);
        }
        Stmt::Allocate { buffer, body } => {
            v.visit_buffer(buffer);
            buffer.shape().iter().for_each(|e| v.visit_expr(e));
            v.visit_stmt(body);
        }
        Stmt::BufferStore { buffer, indices, value } => {
            v.visit_buffer(buffer);
            indices.iter().for_each(|i| v.visit_expr(i));
            v.visit_expr(value);
        }
        Stmt::Seq(items) => items.iter().for_each(|s| v.visit_stmt(s)),
        Stmt::Attr { node, value, body, .. } => {
            match node {
                AttrNode::Var(var) => v.visit_var(var),
                AttrNode::Buffer(buffer) => v.visit_buffer(buffer),
                AttrNode::None | AttrNode::Int(_) => {}
            }
            v.visit_expr(value);
            v.visit_stmt(body);
        }
        Stmt::Let { var, value, body } => {
            v.visit_var(var);
            v.visit_expr(value);
            v.visit_stmt(body);
        }
        Stmt::IfThenElse { cond, then_case, else_case } => {
            v.visit_expr(cond);
            v.visit_stmt(then_case);
            if let Some(else_case) = else_case {
                v.visit_stmt(else_case);
            }
        }
        Stmt::Evaluate(value) => v.visit_expr(value),
    }
}

struct PostOrder<F>(F);

impl<F: FnMut(&Stmt)> Visitor for PostOrder<F> {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
        (self.0)(stmt);
    }
}

/// Call `f` on every statement, children before parents.
pub fn post_order_visit(stmt: &Stmt, f: impl FnMut(&Stmt)) {
    PostOrder(f).visit_stmt(stmt);
}
