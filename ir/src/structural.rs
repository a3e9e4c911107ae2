//! Structural equality.
//!
//! Two trees are structurally equal when they have the same shape, the same
//! immediates and operators, and their variables correspond consistently.
//! Definition sites (loop and let variables, allocated buffers, function
//! parameters) are matched by binding position, so alpha-renamed trees
//! compare equal. Free variables must be the same object unless
//! [`Comparer::map_free_vars`] is enabled.

use std::collections::HashMap;
use std::sync::Arc;

use crate::expr::Expr;
use crate::function::PrimFunc;
use crate::stmt::Stmt;
use crate::types::AttrNode;
use crate::var::{Buffer, Var};

/// Location and reason of the first difference found.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("at {path}: {detail}")]
pub struct Mismatch {
    pub path: String,
    pub detail: String,
}

type CompareResult = Result<(), Mismatch>;

/// Trees that can be compared structurally.
pub trait Structural {
    fn compare(&self, other: &Self, cmp: &mut Comparer) -> CompareResult;
}

pub fn structural_equal<T: Structural + ?Sized>(lhs: &T, rhs: &T) -> bool {
    Comparer::new().equal(lhs, rhs)
}

pub fn first_mismatch<T: Structural + ?Sized>(lhs: &T, rhs: &T) -> Option<Mismatch> {
    Comparer::new().first_mismatch(lhs, rhs)
}

#[derive(Debug, Default)]
pub struct Comparer {
    map_free_vars: bool,
    vars: HashMap<Var, Var>,
    rev_vars: HashMap<Var, Var>,
    buffers: HashMap<Buffer, Buffer>,
    rev_buffers: HashMap<Buffer, Buffer>,
    path: Vec<String>,
}

impl Comparer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let free variables and buffers on both sides correspond by first use.
    pub fn map_free_vars(mut self, enabled: bool) -> Self {
        self.map_free_vars = enabled;
        self
    }

    pub fn first_mismatch<T: Structural + ?Sized>(mut self, lhs: &T, rhs: &T) -> Option<Mismatch> {
        lhs.compare(rhs, &mut self).err()
    }

    pub fn equal<T: Structural + ?Sized>(self, lhs: &T, rhs: &T) -> bool {
        self.first_mismatch(lhs, rhs).is_none()
    }

    fn fail(&self, detail: impl Into<String>) -> CompareResult {
        let path = if self.path.is_empty() { "<root>".to_string() } else { self.path.join(".") };
        Err(Mismatch { path, detail: detail.into() })
    }

    fn at(&mut self, segment: impl Into<String>, f: impl FnOnce(&mut Self) -> CompareResult) -> CompareResult {
        self.path.push(segment.into());
        let result = f(self);
        self.path.pop();
        result
    }

    // =========================================================================
    // Variables and buffers
    // =========================================================================

    fn define_var(&mut self, l: &Var, r: &Var) -> CompareResult {
        if l.dtype() != r.dtype() {
            return self.fail(format!("variable '{l}' is {} but '{r}' is {}", l.dtype(), r.dtype()));
        }
        self.vars.insert(l.clone(), r.clone());
        self.rev_vars.insert(r.clone(), l.clone());
        Ok(())
    }

    fn var_use(&mut self, l: &Var, r: &Var) -> CompareResult {
        match (self.vars.get(l).cloned(), self.rev_vars.get(r).cloned()) {
            (Some(mapped), _) if &mapped == r => Ok(()),
            (Some(mapped), _) => self.fail(format!("variable '{l}' is bound to '{mapped}', found '{r}'")),
            (None, Some(mapped)) => self.fail(format!("variable '{r}' is bound to '{mapped}', found '{l}'")),
            (None, None) if l == r => Ok(()),
            (None, None) if self.map_free_vars => self.define_var(l, r),
            (None, None) => self.fail(format!("free variables '{l}' and '{r}' differ")),
        }
    }

    fn define_buffer(&mut self, l: &Buffer, r: &Buffer) -> CompareResult {
        if l.dtype() != r.dtype() {
            return self.fail(format!("buffer '{l}' is {} but '{r}' is {}", l.dtype(), r.dtype()));
        }
        if l.scope() != r.scope() {
            return self.fail(format!("buffer '{l}' is in scope {} but '{r}' in {}", l.scope(), r.scope()));
        }
        if l.ndim() != r.ndim() {
            return self.fail(format!("buffer '{l}' has rank {} but '{r}' has {}", l.ndim(), r.ndim()));
        }
        for (i, (a, b)) in l.shape().iter().zip(r.shape()).enumerate() {
            self.at(format!("shape[{i}]"), |c| c.expr(a, b))?;
        }
        self.buffers.insert(l.clone(), r.clone());
        self.rev_buffers.insert(r.clone(), l.clone());
        Ok(())
    }

    fn buffer_use(&mut self, l: &Buffer, r: &Buffer) -> CompareResult {
        match (self.buffers.get(l).cloned(), self.rev_buffers.get(r).cloned()) {
            (Some(mapped), _) if &mapped == r => Ok(()),
            (Some(mapped), _) => self.fail(format!("buffer '{l}' is bound to '{mapped}', found '{r}'")),
            (None, Some(mapped)) => self.fail(format!("buffer '{r}' is bound to '{mapped}', found '{l}'")),
            (None, None) if l == r => Ok(()),
            (None, None) if self.map_free_vars => self.define_buffer(l, r),
            (None, None) => self.fail(format!("free buffers '{l}' and '{r}' differ")),
        }
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    fn expr(&mut self, l: &Expr, r: &Expr) -> CompareResult {
        match (l, r) {
            (Expr::Const { value: a, dtype: da }, Expr::Const { value: b, dtype: db }) => {
                if da != db || !a.bit_eq(b) {
                    return self.fail(format!("constant {l}: {da} differs from {r}: {db}"));
                }
                Ok(())
            }
            (Expr::Var(a), Expr::Var(b)) => self.var_use(a, b),
            (Expr::Binary { op: oa, lhs: la, rhs: ra }, Expr::Binary { op: ob, lhs: lb, rhs: rb }) => {
                if oa != ob {
                    return self.fail(format!("operator {oa} differs from {ob}"));
                }
                self.at("lhs", |c| c.expr(la, lb))?;
                self.at("rhs", |c| c.expr(ra, rb))
            }
            (Expr::Load { buffer: ba, indices: ia }, Expr::Load { buffer: bb, indices: ib }) => {
                self.buffer_use(ba, bb)?;
                self.indices(ia, ib)
            }
            _ => self.fail(format!("expression {l} differs from {r}")),
        }
    }

    fn indices(&mut self, l: &[Expr], r: &[Expr]) -> CompareResult {
        if l.len() != r.len() {
            return self.fail(format!("{} indices differ from {}", l.len(), r.len()));
        }
        for (i, (a, b)) in l.iter().zip(r).enumerate() {
            self.at(format!("indices[{i}]"), |c| c.expr(a, b))?;
        }
        Ok(())
    }

    fn stmt(&mut self, l: &Stmt, r: &Stmt) -> CompareResult {
        match (l, r) {
            (
                Stmt::For { loop_var: va, min: ma, extent: ea, kind: ka, body: ba },
                Stmt::For { loop_var: vb, min: mb, extent: eb, kind: kb, body: bb },
            ) => {
                if ka != kb {
                    return self.fail(format!("loop kind {ka} differs from {kb}"));
                }
                self.at("min", |c| c.expr(ma, mb))?;
                self.at("extent", |c| c.expr(ea, eb))?;
                self.define_var(va, vb)?;
                self.at("body", |c| c.stmt(ba, bb))
            }
            (Stmt::Allocate { buffer: a, body: ba }, Stmt::Allocate { buffer: b, body: bb }) => {
                self.define_buffer(a, b)?;
                self.at("body", |c| c.stmt(ba, bb))
            }
            (
                Stmt::BufferStore { buffer: a, indices: ia, value: va },
                Stmt::BufferStore { buffer: b, indices: ib, value: vb },
            ) => {
                self.buffer_use(a, b)?;
                self.indices(ia, ib)?;
                self.at("value", |c| c.expr(va, vb))
            }
            (Stmt::Seq(a), Stmt::Seq(b)) => {
                if a.len() != b.len() {
                    return self.fail(format!("sequence of {} differs from {}", a.len(), b.len()));
                }
                for (i, (x, y)) in a.iter().zip(b).enumerate() {
                    self.at(format!("[{i}]"), |c| c.stmt(x, y))?;
                }
                Ok(())
            }
            (
                Stmt::Attr { node: na, key: ka, value: va, body: ba },
                Stmt::Attr { node: nb, key: kb, value: vb, body: bb },
            ) => {
                if ka != kb {
                    return self.fail(format!("attribute key {ka} differs from {kb}"));
                }
                match (na, nb) {
                    (AttrNode::None, AttrNode::None) => {}
                    (AttrNode::Int(x), AttrNode::Int(y)) if x == y => {}
                    (AttrNode::Var(x), AttrNode::Var(y)) => self.var_use(x, y)?,
                    (AttrNode::Buffer(x), AttrNode::Buffer(y)) => self.buffer_use(x, y)?,
                    _ => return self.fail(format!("attribute {ka} is attached to different nodes")),
                }
                self.at("value", |c| c.expr(va, vb))?;
                self.at("body", |c| c.stmt(ba, bb))
            }
            (Stmt::Let { var: xa, value: va, body: ba }, Stmt::Let { var: xb, value: vb, body: bb }) => {
                self.at("value", |c| c.expr(va, vb))?;
                self.define_var(xa, xb)?;
                self.at("body", |c| c.stmt(ba, bb))
            }
            (
                Stmt::IfThenElse { cond: ca, then_case: ta, else_case: ea },
                Stmt::IfThenElse { cond: cb, then_case: tb, else_case: eb },
            ) => {
                self.at("cond", |c| c.expr(ca, cb))?;
                self.at("then", |c| c.stmt(ta, tb))?;
                match (ea, eb) {
                    (None, None) => Ok(()),
                    (Some(x), Some(y)) => self.at("else", |c| c.stmt(x, y)),
                    _ => self.fail("only one side has an else branch"),
                }
            }
            (Stmt::Evaluate(a), Stmt::Evaluate(b)) => self.at("value", |c| c.expr(a, b)),
            _ => self.fail(format!("{} differs from {}", l.kind_name(), r.kind_name())),
        }
    }
}

impl Structural for Expr {
    fn compare(&self, other: &Self, cmp: &mut Comparer) -> CompareResult {
        cmp.expr(self, other)
    }
}

impl Structural for Stmt {
    fn compare(&self, other: &Self, cmp: &mut Comparer) -> CompareResult {
        cmp.stmt(self, other)
    }
}

impl Structural for Arc<Stmt> {
    fn compare(&self, other: &Self, cmp: &mut Comparer) -> CompareResult {
        cmp.stmt(self, other)
    }
}

impl Structural for PrimFunc {
    fn compare(&self, other: &Self, cmp: &mut Comparer) -> CompareResult {
        if self.params.len() != other.params.len() {
            return cmp.fail(format!("{} params differ from {}", self.params.len(), other.params.len()));
        }
        if self.buffers.len() != other.buffers.len() {
            return cmp.fail(format!("{} buffers differ from {}", self.buffers.len(), other.buffers.len()));
        }
        for (a, b) in self.params.iter().zip(&other.params) {
            cmp.define_var(a, b)?;
        }
        for (a, b) in self.buffers.iter().zip(&other.buffers) {
            cmp.define_buffer(a, b)?;
        }
        cmp.at("body", |c| c.stmt(&self.body, &other.body))
    }
}
