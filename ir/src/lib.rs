//! Tree-shaped intermediate representation for tensor programs.
//!
//! Programs are statement trees of loops, allocations and stores over scalar
//! expressions. Nodes are immutable and shared through `Arc`, so rewrites
//! build new trees and reuse every subtree they leave alone.
//!
//! # Module Organization
//!
//! - [`types`] - Constants, operators, loop kinds
//! - [`var`] - Variables and buffers (identity-compared handles)
//! - [`expr`] / [`stmt`] - The expression and statement trees
//! - [`function`] - `PrimFunc` and `IrModule`
//! - [`substitute`] - Free-variable substitution and definition rebinding
//! - [`fresh`] - Fresh-name supply
//! - [`structural`] - Structural equality up to renaming of bound variables
//! - [`printer`] / [`tree`] - Text and ASCII-tree rendering
//! - [`builder`] - Scoped `IrBuilder`

pub mod builder;
pub mod error;
pub mod expr;
pub mod fresh;
pub mod function;
pub mod prelude;
pub mod printer;
pub mod stmt;
pub mod structural;
pub mod substitute;
pub mod tree;
pub mod types;
pub mod var;
pub mod visit;


pub use builder::IrBuilder;
pub use error::{Error, Result};
pub use expr::{Expr, Indices};
pub use fresh::NameSupply;
pub use function::{IrModule, PrimFunc};
pub use stmt::{Stmt, attr};
pub use structural::{Comparer, Mismatch, Structural, first_mismatch, structural_equal};
pub use substitute::{KeepBindings, Rebind, Substituter, VarMap, substitute_expr, substitute_stmt};
pub use types::{AttrNode, BinaryOp, ConstValue, ForKind};
pub use var::{Buffer, Shape, Var};
pub use visit::{Visitor, post_order_visit};

pub use tirx_dtype::DType;
