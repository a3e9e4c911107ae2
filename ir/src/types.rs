//! Type definitions shared by expressions and statements.
//!
//! This module contains the constant value representation, operator enums and
//! the loop-kind / annotation-node enums used by the statement tree.

use std::fmt;

use tirx_dtype::DType;

use crate::var::{Buffer, Var};

/// Constant value that can be stored in an immediate expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl ConstValue {
    /// Convert to the scalar type of `dtype`.
    ///
    /// Integer targets wrap to their width; floats truncate toward zero first.
    /// Returns `None` for vector and void targets.
    pub fn cast(&self, dtype: &DType) -> Option<Self> {
        let to = dtype.scalar()?;
        if to.is_bool() {
            return Some(ConstValue::Bool(self.is_nonzero()));
        }
        if to.is_float() {
            return Some(ConstValue::Float(self.to_f64()));
        }
        if !to.is_int() {
            return None;
        }
        let shift = 128 - 8 * to.bytes() as u32;
        let wide = self.to_wide();
        Some(if to.is_signed() {
            ConstValue::Int(((wide << shift) >> shift) as i64)
        } else {
            ConstValue::UInt((((wide as u128) << shift) >> shift) as u64)
        })
    }

    fn is_nonzero(&self) -> bool {
        match *self {
            ConstValue::Int(v) => v != 0,
            ConstValue::UInt(v) => v != 0,
            ConstValue::Float(v) => v != 0.0,
            ConstValue::Bool(v) => v,
        }
    }

    fn to_f64(&self) -> f64 {
        match *self {
            ConstValue::Int(v) => v as f64,
            ConstValue::UInt(v) => v as f64,
            ConstValue::Float(v) => v,
            ConstValue::Bool(v) => f64::from(u8::from(v)),
        }
    }

    fn to_wide(&self) -> i128 {
        match *self {
            ConstValue::Int(v) => i128::from(v),
            ConstValue::UInt(v) => i128::from(v),
            ConstValue::Float(v) => v as i128,
            ConstValue::Bool(v) => i128::from(v),
        }
    }

    /// Integer view of the constant, if it is an integer that fits in `i64`.
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            ConstValue::Int(v) => Some(v),
            ConstValue::UInt(v) => i64::try_from(v).ok(),
            ConstValue::Float(_) | ConstValue::Bool(_) => None,
        }
    }

    /// Bit-exact equality (floats compare by bit pattern, so `NaN == NaN`).
    pub fn bit_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConstValue::Float(a), ConstValue::Float(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::UInt(v) => write!(f, "{v}"),
            ConstValue::Float(v) => write!(f, "{v:?}"),
            ConstValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::Display, strum::IntoStaticStr, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    FloorDiv,
    FloorMod,
    Min,
    Max,
    Lt,
    Le,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    /// Infix symbol, or `None` for operators printed as calls (`min(a, b)`).
    pub const fn symbol(&self) -> Option<&'static str> {
        Some(match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::And => "&&",
            Self::Or => "||",
            Self::FloorDiv | Self::FloorMod | Self::Min | Self::Max => return None,
        })
    }

    /// Operators whose result is `bool` regardless of operand dtype.
    pub const fn is_predicate(&self) -> bool {
        matches!(self, Self::Lt | Self::Le | Self::Eq | Self::Ne | Self::And | Self::Or)
    }

    /// Evaluate on integer operands. `None` on overflow or division by zero.
    pub fn eval_int(&self, a: i64, b: i64) -> Option<i64> {
        Some(match self {
            Self::Add => a.checked_add(b)?,
            Self::Sub => a.checked_sub(b)?,
            Self::Mul => a.checked_mul(b)?,
            Self::FloorDiv => floor_div(a, b)?,
            Self::FloorMod => a.checked_sub(floor_div(a, b)?.checked_mul(b)?)?,
            Self::Min => a.min(b),
            Self::Max => a.max(b),
            Self::Lt => (a < b) as i64,
            Self::Le => (a <= b) as i64,
            Self::Eq => (a == b) as i64,
            Self::Ne => (a != b) as i64,
            Self::And => (a != 0 && b != 0) as i64,
            Self::Or => (a != 0 || b != 0) as i64,
        })
    }
}

fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) { Some(q - 1) } else { Some(q) }
}

/// How a loop's iterations are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(strum::Display, strum::IntoStaticStr, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ForKind {
    /// Sequential iterations; eligible for automatic unrolling.
    #[default]
    Serial,
    Parallel,
    Vectorized,
    /// Marked for unrolling regardless of size heuristics.
    Unrolled,
    ThreadBinding,
}

/// The object an attribute statement is attached to.
#[derive(Debug, Clone, Default)]
pub enum AttrNode {
    #[default]
    None,
    Int(i64),
    Var(Var),
    Buffer(Buffer),
}
