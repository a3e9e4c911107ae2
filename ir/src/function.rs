//! Functions and modules.

use std::ops::Index;
use std::sync::Arc;

use crate::stmt::Stmt;
use crate::var::{Buffer, Var};

/// A function over scalar parameters and free (argument) buffers.
#[derive(Debug, Clone)]
pub struct PrimFunc {
    pub params: Vec<Var>,
    pub buffers: Vec<Buffer>,
    pub body: Arc<Stmt>,
}

impl PrimFunc {
    pub fn new(params: impl IntoIterator<Item = Var>, buffers: impl IntoIterator<Item = Buffer>, body: Arc<Stmt>) -> Self {
        Self { params: params.into_iter().collect(), buffers: buffers.into_iter().collect(), body }
    }

    /// Same signature, new body.
    pub fn with_body(&self, body: Arc<Stmt>) -> Self {
        Self { params: self.params.clone(), buffers: self.buffers.clone(), body }
    }
}

/// Named functions in insertion order.
#[derive(Debug, Clone, Default)]
pub struct IrModule {
    functions: Vec<(String, PrimFunc)>,
}

impl IrModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Module holding a single function.
    pub fn from_func(name: impl Into<String>, func: PrimFunc) -> Self {
        let mut module = Self::new();
        module.insert(name, func);
        module
    }

    /// Add or replace a function. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, func: PrimFunc) {
        let name = name.into();
        match self.functions.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = func,
            None => self.functions.push((name, func)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PrimFunc> {
        self.functions.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PrimFunc)> {
        self.functions.iter().map(|(n, f)| (n.as_str(), f))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Index<&str> for IrModule {
    type Output = PrimFunc;

    fn index(&self, name: &str) -> &PrimFunc {
        match self.get(name) {
            Some(func) => func,
            None => panic!("module has no function named '{name}'"),
        }
    }
}

impl FromIterator<(String, PrimFunc)> for IrModule {
    fn from_iter<I: IntoIterator<Item = (String, PrimFunc)>>(iter: I) -> Self {
        let mut module = Self::new();
        for (name, func) in iter {
            module.insert(name, func);
        }
        module
    }
}
