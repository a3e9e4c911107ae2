//! Body duplication for materialized loops.

use std::sync::Arc;

use tirx_ir::{Buffer, Expr, NameSupply, Rebind, Stmt, Substituter, Var, VarMap, substitute_stmt};

/// Gives every definition it is asked about a fresh name from the supply.
struct FreshBindings<'a>(&'a mut NameSupply);

impl Rebind for FreshBindings<'_> {
    fn var(&mut self, old: &Var) -> Option<Var> {
        Some(self.0.fresh_var(old))
    }

    fn buffer(&mut self, old: &Buffer) -> Option<Buffer> {
        Some(self.0.fresh_buffer(old))
    }
}

/// Produces the per-iteration copies of a loop body.
pub struct Duplicator<'a> {
    names: &'a mut NameSupply,
}

impl<'a> Duplicator<'a> {
    pub fn new(names: &'a mut NameSupply) -> Self {
        Self { names }
    }

    /// Copies of `body` for iterations `min, min + 1, ..., min + extent - 1`.
    ///
    /// A single iteration substitutes `loop_var` and keeps every definition as
    /// it is. With two or more, each copy also rebinds its allocated buffers,
    /// loop variables and let variables to fresh ones, so copies never share
    /// storage or binders. A non-positive extent yields no copies.
    pub fn copies(&mut self, loop_var: &Var, min: &Expr, extent: i64, body: &Arc<Stmt>) -> Vec<Arc<Stmt>> {
        match extent {
            ..=0 => Vec::new(),
            1 => vec![substitute_stmt(body, &VarMap::new().bind(loop_var, min.clone()))],
            _ => (0..extent)
                .map(|k| {
                    let map = VarMap::new().bind(loop_var, min.offset(k));
                    Substituter::new(map, FreshBindings(&mut *self.names)).stmt(body).unwrap_or_else(|| body.clone())
                })
                .collect(),
        }
    }
}
