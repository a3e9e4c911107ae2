//! Statements.
//!
//! A statement tree is built from `Arc<Stmt>` nodes so that rewrites can share
//! every subtree they do not touch. Constructors return `Arc<Stmt>` directly.

use std::sync::Arc;

use snafu::ensure;

use crate::error::{IndexArityMismatchSnafu, Result, StoreDTypeMismatchSnafu};
use crate::expr::{Expr, Indices};
use crate::types::{AttrNode, ForKind};
use crate::var::{Buffer, Var};

/// Well-known attribute keys.
pub mod attr {
    /// Step budget for automatic unrolling inside the annotated scope.
    pub const PRAGMA_AUTO_UNROLL_MAX_STEP: &str = "pragma_auto_unroll_max_step";
    /// Depth limit for automatic unrolling inside the annotated scope.
    pub const PRAGMA_AUTO_UNROLL_MAX_DEPTH: &str = "pragma_auto_unroll_max_depth";
    /// Extent limit for automatic unrolling inside the annotated scope.
    pub const PRAGMA_AUTO_UNROLL_MAX_EXTENT: &str = "pragma_auto_unroll_max_extent";
    /// Non-zero: materialize unrolled copies; zero: only mark loops unrolled.
    pub const PRAGMA_UNROLL_EXPLICIT: &str = "pragma_unroll_explicit";
}

#[derive(Debug, Clone)]
pub enum Stmt {
    /// `for loop_var in [min, min + extent)`.
    For { loop_var: Var, min: Expr, extent: Expr, kind: ForKind, body: Arc<Stmt> },

    /// Declares `buffer` for the scope of `body`. Dtype, shape and scope come
    /// from the buffer handle.
    Allocate { buffer: Buffer, body: Arc<Stmt> },

    BufferStore { buffer: Buffer, indices: Indices, value: Expr },

    /// Ordered sequence; empty is a no-op.
    Seq(Vec<Arc<Stmt>>),

    /// Key/value annotation on `node`, scoped to `body`.
    Attr { node: AttrNode, key: String, value: Expr, body: Arc<Stmt> },

    Let { var: Var, value: Expr, body: Arc<Stmt> },

    IfThenElse { cond: Expr, then_case: Arc<Stmt>, else_case: Option<Arc<Stmt>> },

    Evaluate(Expr),
}

impl Stmt {
    pub fn for_(loop_var: &Var, min: impl Into<Expr>, extent: impl Into<Expr>, kind: ForKind, body: Arc<Stmt>) -> Arc<Self> {
        Arc::new(Self::For { loop_var: loop_var.clone(), min: min.into(), extent: extent.into(), kind, body })
    }

    /// `for loop_var in serial(0, extent)`.
    pub fn serial(loop_var: &Var, extent: impl Into<Expr>, body: Arc<Stmt>) -> Arc<Self> {
        Self::for_(loop_var, Expr::int(0), extent, ForKind::Serial, body)
    }

    pub fn allocate(buffer: &Buffer, body: Arc<Stmt>) -> Arc<Self> {
        Arc::new(Self::Allocate { buffer: buffer.clone(), body })
    }

    /// Checked store: one index per dimension, value of the buffer's dtype.
    ///
    /// An immediate value is cast to the element dtype first.
    pub fn store(buffer: &Buffer, indices: impl IntoIterator<Item = Expr>, value: impl Into<Expr>) -> Result<Arc<Self>> {
        let indices: Indices = indices.into_iter().collect();
        let mut value = value.into();
        if let Expr::Const { value: imm, .. } = &value
            && let Some(cast) = imm.cast(buffer.dtype())
        {
            value = Expr::Const { value: cast, dtype: buffer.dtype().clone() };
        }
        ensure!(
            indices.len() == buffer.ndim(),
            IndexArityMismatchSnafu { buffer: buffer.name(), expected: buffer.ndim(), actual: indices.len() }
        );
        let actual = value.dtype();
        ensure!(
            &actual == buffer.dtype(),
            StoreDTypeMismatchSnafu { buffer: buffer.name(), expected: buffer.dtype().clone(), actual }
        );
        Ok(Arc::new(Self::BufferStore { buffer: buffer.clone(), indices, value }))
    }

    pub fn seq(items: impl IntoIterator<Item = Arc<Stmt>>) -> Arc<Self> {
        Arc::new(Self::Seq(items.into_iter().collect()))
    }

    pub fn no_op() -> Arc<Self> {
        Arc::new(Self::Seq(Vec::new()))
    }

    pub fn attr(node: AttrNode, key: impl Into<String>, value: impl Into<Expr>, body: Arc<Stmt>) -> Arc<Self> {
        Arc::new(Self::Attr { node, key: key.into(), value: value.into(), body })
    }

    pub fn let_(var: &Var, value: impl Into<Expr>, body: Arc<Stmt>) -> Arc<Self> {
        Arc::new(Self::Let { var: var.clone(), value: value.into(), body })
    }

    pub fn if_then_else(cond: impl Into<Expr>, then_case: Arc<Stmt>, else_case: Option<Arc<Stmt>>) -> Arc<Self> {
        Arc::new(Self::IfThenElse { cond: cond.into(), then_case, else_case })
    }

    pub fn evaluate(value: impl Into<Expr>) -> Arc<Self> {
        Arc::new(Self::Evaluate(value.into()))
    }

    /// Direct child statements in source order.
    pub fn children(&self) -> Vec<&Arc<Stmt>> {
        match self {
            Self::For { body, .. } | Self::Allocate { body, .. } | Self::Attr { body, .. } | Self::Let { body, .. } => {
                vec![body]
            }
            Self::Seq(items) => items.iter().collect(),
            Self::IfThenElse { then_case, else_case, .. } => std::iter::once(then_case).chain(else_case).collect(),
            Self::BufferStore { .. } | Self::Evaluate(_) => Vec::new(),
        }
    }

    /// True for an empty sequence.
    pub fn is_no_op(&self) -> bool {
        matches!(self, Self::Seq(items) if items.is_empty())
    }

    /// Short variant name, used by tree rendering and mismatch reports.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::For { .. } => "For",
            Self::Allocate { .. } => "Allocate",
            Self::BufferStore { .. } => "BufferStore",
            Self::Seq(_) => "Seq",
            Self::Attr { .. } => "Attr",
            Self::Let { .. } => "Let",
            Self::IfThenElse { .. } => "IfThenElse",
            Self::Evaluate(_) => "Evaluate",
        }
    }
}
