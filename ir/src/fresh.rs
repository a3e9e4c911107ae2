//! Fresh names for rebound definitions.

use std::collections::{HashMap, HashSet};

use crate::function::PrimFunc;
use crate::stmt::Stmt;
use crate::var::{Buffer, Var};
use crate::visit::Visitor;

/// Generator of names unused in a given tree.
///
/// Seed it with every name of the input, then ask for `fresh("A")` to get
/// `A_1`, `A_2`, ... skipping anything already taken. Each supply is owned by
/// one rewrite; there is no process-wide counter.
#[derive(Debug, Clone, Default)]
pub struct NameSupply {
    taken: HashSet<String>,
    next_suffix: HashMap<String, usize>,
}

impl NameSupply {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply seeded with every variable and buffer name in `stmt`.
    pub fn from_stmt(stmt: &Stmt) -> Self {
        let mut supply = Self::new();
        NameCollector(&mut supply).visit_stmt(stmt);
        supply
    }

    /// Supply seeded with the signature and body names of `func`.
    pub fn from_func(func: &PrimFunc) -> Self {
        let mut supply = Self::from_stmt(&func.body);
        for param in &func.params {
            supply.reserve(param.name());
        }
        for buffer in &func.buffers {
            supply.reserve(buffer.name());
        }
        supply
    }

    /// Mark `name` as taken. Returns false if it already was.
    pub fn reserve(&mut self, name: &str) -> bool {
        self.taken.insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// A new name derived from `base`, reserved before returning.
    pub fn fresh(&mut self, base: &str) -> String {
        let counter = self.next_suffix.entry(base.to_string()).or_insert(1);
        loop {
            let candidate = format!("{base}_{counter}");
            *counter += 1;
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// A new variable named after `var`.
    pub fn fresh_var(&mut self, var: &Var) -> Var {
        var.with_name(self.fresh(var.name()))
    }

    /// A new buffer named after `buffer`, with the same dtype, shape and scope.
    pub fn fresh_buffer(&mut self, buffer: &Buffer) -> Buffer {
        buffer.with_name(self.fresh(buffer.name()))
    }
}

struct NameCollector<'a>(&'a mut NameSupply);

impl Visitor for NameCollector<'_> {
    fn visit_var(&mut self, var: &Var) {
        self.0.reserve(var.name());
    }

    fn visit_buffer(&mut self, buffer: &Buffer) {
        self.0.reserve(buffer.name());
    }
}
