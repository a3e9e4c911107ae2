//! Scoped construction of statement trees.
//!
//! ```rust,ignore
//! let a = Buffer::global("A", DType::Int32, &[8]);
//! let mut ib = IrBuilder::new();
//! ib.for_range("i", 0, 8, ForKind::Serial, |ib, i| ib.store(&a, [Expr::var(&i)], &i))?;
//! let body = ib.get();
//! ```

use std::sync::Arc;

use crate::error::Result;
use crate::expr::Expr;
use crate::stmt::Stmt;
use crate::types::{AttrNode, ForKind};
use crate::var::{Buffer, Var};

/// Builder collecting statements into nested scopes.
///
/// Each scoped method opens a frame, runs the closure, and wraps whatever it
/// emitted as the body of the new node. A frame holding one statement becomes
/// that statement; several become a [`Stmt::Seq`].
#[derive(Debug)]
pub struct IrBuilder {
    frames: Vec<Vec<Arc<Stmt>>>,
}

impl Default for IrBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IrBuilder {
    pub fn new() -> Self {
        Self { frames: vec![Vec::new()] }
    }

    pub fn emit(&mut self, stmt: Arc<Stmt>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.push(stmt);
        }
    }

    /// Checked store into the current scope.
    pub fn store(&mut self, buffer: &Buffer, indices: impl IntoIterator<Item = Expr>, value: impl Into<Expr>) -> Result<()> {
        let stmt = Stmt::store(buffer, indices, value)?;
        self.emit(stmt);
        Ok(())
    }

    pub fn evaluate(&mut self, value: impl Into<Expr>) {
        self.emit(Stmt::evaluate(value));
    }

    /// Loop over `[min, min + extent)` with a new `int32` variable named `name`.
    pub fn for_range(
        &mut self,
        name: &str,
        min: impl Into<Expr>,
        extent: impl Into<Expr>,
        kind: ForKind,
        f: impl FnOnce(&mut Self, Var) -> Result<()>,
    ) -> Result<()> {
        let var = Var::int32(name);
        let body = self.scoped(|ib| f(ib, var.clone()))?;
        self.emit(Stmt::for_(&var, min, extent, kind, body));
        Ok(())
    }

    /// Declare `buffer` for the statements emitted by `f`.
    pub fn allocate(&mut self, buffer: &Buffer, f: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        let body = self.scoped(f)?;
        self.emit(Stmt::allocate(buffer, body));
        Ok(())
    }

    /// Attach a key/value annotation to the statements emitted by `f`.
    pub fn scope_attr(
        &mut self,
        node: AttrNode,
        key: &str,
        value: impl Into<Expr>,
        f: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        let body = self.scoped(f)?;
        self.emit(Stmt::attr(node, key, value, body));
        Ok(())
    }

    /// Bind a new variable of `value`'s dtype for the statements emitted by `f`.
    pub fn let_(&mut self, name: &str, value: impl Into<Expr>, f: impl FnOnce(&mut Self, Var) -> Result<()>) -> Result<()> {
        let value = value.into();
        let var = Var::new(name, value.dtype());
        let body = self.scoped(|ib| f(ib, var.clone()))?;
        self.emit(Stmt::let_(&var, value, body));
        Ok(())
    }

    pub fn if_then(&mut self, cond: impl Into<Expr>, f: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        let then_case = self.scoped(f)?;
        self.emit(Stmt::if_then_else(cond, then_case, None));
        Ok(())
    }

    pub fn if_then_else(
        &mut self,
        cond: impl Into<Expr>,
        then_f: impl FnOnce(&mut Self) -> Result<()>,
        else_f: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        let then_case = self.scoped(then_f)?;
        let else_case = self.scoped(else_f)?;
        self.emit(Stmt::if_then_else(cond, then_case, Some(else_case)));
        Ok(())
    }

    /// The statement built so far.
    pub fn get(mut self) -> Arc<Stmt> {
        let root = self.frames.pop().unwrap_or_default();
        Self::wrap(root)
    }

    fn scoped(&mut self, f: impl FnOnce(&mut Self) -> Result<()>) -> Result<Arc<Stmt>> {
        self.frames.push(Vec::new());
        let result = f(self);
        let frame = self.frames.pop().unwrap_or_default();
        result.map(|()| Self::wrap(frame))
    }

    fn wrap(mut frame: Vec<Arc<Stmt>>) -> Arc<Stmt> {
        match frame.len() {
            1 => frame.remove(0),
            _ => Stmt::seq(frame),
        }
    }
}
