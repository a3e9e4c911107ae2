//! Variables and buffer handles.
//!
//! Both are reference-counted handles with object identity: cloning a handle
//! yields the same variable, while two constructions with equal names are
//! distinct. Equality and hashing go through the allocation pointer.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use smallvec::SmallVec;
use tirx_dtype::DType;

use crate::expr::Expr;

/// Shape of a buffer, one extent expression per dimension.
pub type Shape = SmallVec<[Expr; 4]>;

#[derive(Debug)]
pub struct VarNode {
    pub name: String,
    pub dtype: DType,
}

/// A named, typed scalar variable.
#[derive(Clone)]
pub struct Var(Arc<VarNode>);

impl Var {
    pub fn new(name: impl Into<String>, dtype: DType) -> Self {
        Self(Arc::new(VarNode { name: name.into(), dtype }))
    }

    /// Shorthand for an `int32` variable, the usual loop-index type.
    pub fn int32(name: impl Into<String>) -> Self {
        Self::new(name, DType::Int32)
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn dtype(&self) -> &DType {
        &self.0.dtype
    }

    /// A distinct variable with the same dtype and a new name.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self::new(name, self.0.dtype.clone())
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Stable address used as an identity key.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for Var {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Var {}

impl Hash for Var {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.0.name, self.0.dtype)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

#[derive(Debug)]
pub struct BufferNode {
    pub name: String,
    pub dtype: DType,
    pub shape: Shape,
    pub scope: String,
}

/// A handle to a multi-dimensional buffer.
///
/// Buffers listed in a function signature are free; buffers introduced by
/// [`Stmt::Allocate`](crate::Stmt::Allocate) are bound to the allocation's body.
#[derive(Clone)]
pub struct Buffer(Arc<BufferNode>);

impl Buffer {
    pub fn new(name: impl Into<String>, dtype: DType, shape: impl IntoIterator<Item = Expr>, scope: impl Into<String>) -> Self {
        Self(Arc::new(BufferNode {
            name: name.into(),
            dtype,
            shape: shape.into_iter().collect(),
            scope: scope.into(),
        }))
    }

    /// Buffer in the `global` scope with constant extents.
    pub fn global(name: impl Into<String>, dtype: DType, shape: &[i64]) -> Self {
        Self::new(name, dtype, shape.iter().map(|&d| Expr::int(d)), "global")
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn dtype(&self) -> &DType {
        &self.0.dtype
    }

    pub fn shape(&self) -> &[Expr] {
        &self.0.shape
    }

    pub fn scope(&self) -> &str {
        &self.0.scope
    }

    pub fn ndim(&self) -> usize {
        self.0.shape.len()
    }

    /// A distinct buffer with the same dtype, shape and scope.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self::new(name, self.0.dtype.clone(), self.0.shape.iter().cloned(), self.0.scope.clone())
    }

    /// A distinct buffer with the same name, dtype and scope but a new shape.
    pub fn with_shape(&self, shape: impl IntoIterator<Item = Expr>) -> Self {
        Self::new(self.0.name.clone(), self.0.dtype.clone(), shape, self.0.scope.clone())
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for Buffer {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Buffer {}

impl Hash for Buffer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}{:?} @{}", self.0.name, self.0.dtype, self.0.shape.as_slice(), self.0.scope)
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}
