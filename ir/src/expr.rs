//! Scalar expressions.
//!
//! Expressions are immutable values. Binary construction goes through
//! [`Expr::binary`], which reconciles operand dtypes and folds integer
//! constants; nothing else is simplified (`x + 0` stays `x + 0`).

use std::sync::Arc;

use smallvec::SmallVec;
use snafu::ensure;
use tirx_dtype::{DType, HasDType};

use crate::error::{DTypeMismatchSnafu, IndexArityMismatchSnafu, Result};
use crate::types::{BinaryOp, ConstValue};
use crate::var::{Buffer, Var};

/// Index list of a store. Loads keep theirs behind an `Arc`, since an inline
/// list would make `Expr` contain itself.
pub type Indices = SmallVec<[Expr; 4]>;

#[derive(Debug, Clone)]
pub enum Expr {
    Const { value: ConstValue, dtype: DType },
    Var(Var),
    Binary { op: BinaryOp, lhs: Arc<Expr>, rhs: Arc<Expr> },
    Load { buffer: Buffer, indices: Arc<[Expr]> },
}

impl Expr {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Immediate of the given dtype. The value is cast to `dtype`.
    pub fn const_(value: ConstValue, dtype: DType) -> Self {
        let value = value.cast(&dtype).unwrap_or(value);
        Self::Const { value, dtype }
    }

    /// `int32` immediate. Values outside the `int32` range wrap.
    pub fn int(value: i64) -> Self {
        Self::const_(ConstValue::Int(value), DType::Int32)
    }

    /// Integer immediate with an explicit dtype.
    pub fn int_of(value: i64, dtype: DType) -> Self {
        Self::const_(ConstValue::Int(value), dtype)
    }

    pub fn bool_(value: bool) -> Self {
        Self::Const { value: ConstValue::Bool(value), dtype: DType::Bool }
    }

    pub fn var(var: &Var) -> Self {
        Self::Var(var.clone())
    }

    /// Checked binary construction.
    ///
    /// When the operand dtypes differ, an immediate operand is cast to the other
    /// operand's dtype. Two non-immediate operands must agree.
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Result<Self> {
        let (ldt, rdt) = (lhs.dtype(), rhs.dtype());
        if ldt == rdt {
            return Ok(Self::fold(op, lhs, rhs));
        }
        if let Expr::Const { value, .. } = &rhs
            && let Some(value) = value.cast(&ldt)
        {
            return Ok(Self::fold(op, lhs, Expr::Const { value, dtype: ldt }));
        }
        if let Expr::Const { value, .. } = &lhs
            && let Some(value) = value.cast(&rdt)
        {
            return Ok(Self::fold(op, Expr::Const { value, dtype: rdt }, rhs));
        }
        DTypeMismatchSnafu { op, lhs: ldt, rhs: rdt }.fail()
    }

    /// Build a binary node from dtype-compatible operands, folding integer
    /// immediates when the result is representable.
    pub(crate) fn fold(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        if let (Some(a), Some(b)) = (lhs.as_const_int(), rhs.as_const_int())
            && let Some(r) = op.eval_int(a, b)
        {
            if op.is_predicate() {
                return Self::bool_(r != 0);
            }
            let dtype = lhs.dtype();
            if let Some((lo, hi)) = dtype.scalar().and_then(|s| s.int_bounds())
                && (lo..=hi).contains(&r)
            {
                return Self::int_of(r, dtype);
            }
        }
        Self::Binary { op, lhs: Arc::new(lhs), rhs: Arc::new(rhs) }
    }

    /// `self + k` with `k` in `self`'s dtype, folded when `self` is an integer
    /// immediate. A zero offset returns `self` unchanged.
    pub fn offset(&self, k: i64) -> Self {
        if k == 0 {
            return self.clone();
        }
        Self::fold(BinaryOp::Add, self.clone(), Self::int_of(k, self.dtype()))
    }

    /// Checked load: one index per buffer dimension.
    pub fn load(buffer: &Buffer, indices: impl IntoIterator<Item = Expr>) -> Result<Self> {
        let indices: Arc<[Expr]> = indices.into_iter().collect();
        ensure!(
            indices.len() == buffer.ndim(),
            IndexArityMismatchSnafu { buffer: buffer.name(), expected: buffer.ndim(), actual: indices.len() }
        );
        Ok(Self::Load { buffer: buffer.clone(), indices })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn dtype(&self) -> DType {
        match self {
            Self::Const { dtype, .. } => dtype.clone(),
            Self::Var(v) => v.dtype().clone(),
            Self::Binary { op, .. } if op.is_predicate() => DType::Bool,
            Self::Binary { lhs, .. } => lhs.dtype(),
            Self::Load { buffer, .. } => buffer.dtype().clone(),
        }
    }

    /// The value of an integer immediate.
    pub fn as_const_int(&self) -> Option<i64> {
        match self {
            Self::Const { value, dtype } if dtype.is_int() => value.as_int(),
            _ => None,
        }
    }

    pub fn is_const(&self) -> bool {
        matches!(self, Self::Const { .. })
    }

    pub fn as_var(&self) -> Option<&Var> {
        match self {
            Self::Var(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! binary_ctors {
    ($($name:ident => $op:ident),* $(,)?) => {
        impl Expr {
            $(
                #[doc = concat!("Checked `", stringify!($op), "` (see [`Expr::binary`]).")]
                pub fn $name(&self, rhs: impl Into<Expr>) -> Result<Self> {
                    Self::binary(BinaryOp::$op, self.clone(), rhs.into())
                }
            )*
        }
    };
}

binary_ctors! {
    try_add => Add,
    try_sub => Sub,
    try_mul => Mul,
    try_floordiv => FloorDiv,
    try_floormod => FloorMod,
    try_min => Min,
    try_max => Max,
    try_lt => Lt,
    try_le => Le,
    try_eq => Eq,
    try_ne => Ne,
    try_and => And,
    try_or => Or,
}

macro_rules! impl_from_literal {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Expr {
                fn from(value: $ty) -> Self {
                    Expr::Const { value: ConstValue::$variant(value.into()), dtype: <$ty as HasDType>::dtype() }
                }
            }
        )*
    };
}

impl_from_literal! {
    i32 => Int,
    i64 => Int,
    u32 => UInt,
    f32 => Float,
    f64 => Float,
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Self::bool_(value)
    }
}

impl From<Var> for Expr {
    fn from(var: Var) -> Self {
        Self::Var(var)
    }
}

impl From<&Var> for Expr {
    fn from(var: &Var) -> Self {
        Self::Var(var.clone())
    }
}
