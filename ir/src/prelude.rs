//! Common imports for building and rewriting statement trees.
//!
//! ```rust,ignore
//! use tirx_ir::prelude::*;
//! ```

pub use crate::builder::IrBuilder;
pub use crate::expr::Expr;
pub use crate::function::{IrModule, PrimFunc};
pub use crate::stmt::{Stmt, attr};
pub use crate::types::{AttrNode, BinaryOp, ConstValue, ForKind};
pub use crate::var::{Buffer, Var};

pub use tirx_dtype::DType;
