//! Script-style text form of the IR.
//!
//! ```text
//! for i in serial(0, 4):
//!   B = allocate(float32, [2], "local")
//!   B[0] = A[i]
//! ```

use std::fmt::{self, Display, Formatter};

use tirx_dtype::DType;

use crate::expr::Expr;
use crate::function::PrimFunc;
use crate::stmt::Stmt;
use crate::types::{AttrNode, BinaryOp};

const INDENT: &str = "  ";

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const { value, dtype } if matches!(*dtype, DType::Int32 | DType::Bool | DType::Float32) => {
                write!(f, "{value}")
            }
            Expr::Const { value, dtype } => write!(f, "{dtype}({value})"),
            Expr::Var(v) => write!(f, "{v}"),
            Expr::Binary { op, lhs, rhs } => match op.symbol() {
                Some(sym) => write!(f, "({lhs} {sym} {rhs})"),
                None => write!(f, "{}({lhs}, {rhs})", call_name(*op)),
            },
            Expr::Load { buffer, indices } => {
                write!(f, "{buffer}[")?;
                write_list(f, indices)?;
                f.write_str("]")
            }
        }
    }
}

fn call_name(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::FloorDiv => "floordiv",
        BinaryOp::FloorMod => "floormod",
        BinaryOp::Min => "min",
        BinaryOp::Max => "max",
        other => other.into(),
    }
}

fn write_list<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn pad(f: &mut Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    Ok(())
}

fn write_stmt(f: &mut Formatter<'_>, stmt: &Stmt, depth: usize) -> fmt::Result {
    match stmt {
        Stmt::For { loop_var, min, extent, kind, body } => {
            pad(f, depth)?;
            writeln!(f, "for {loop_var} in {kind}({min}, {extent}):")?;
            write_stmt(f, body, depth + 1)
        }
        Stmt::Allocate { buffer, body } => {
            pad(f, depth)?;
            write!(f, "{buffer} = allocate({}, [", buffer.dtype())?;
            write_list(f, buffer.shape())?;
            writeln!(f, "], \"{}\")", buffer.scope())?;
            write_stmt(f, body, depth)
        }
        Stmt::BufferStore { buffer, indices, value } => {
            pad(f, depth)?;
            write!(f, "{buffer}[")?;
            write_list(f, indices)?;
            writeln!(f, "] = {value}")
        }
        Stmt::Seq(items) if items.is_empty() => {
            pad(f, depth)?;
            writeln!(f, "pass")
        }
        Stmt::Seq(items) => items.iter().try_for_each(|item| write_stmt(f, item, depth)),
        Stmt::Attr { node, key, value, body } => {
            pad(f, depth)?;
            match node {
                AttrNode::None => writeln!(f, "with attr(\"{key}\", {value}):")?,
                AttrNode::Int(n) => writeln!(f, "with attr({n}, \"{key}\", {value}):")?,
                AttrNode::Var(v) => writeln!(f, "with attr({v}, \"{key}\", {value}):")?,
                AttrNode::Buffer(b) => writeln!(f, "with attr({b}, \"{key}\", {value}):")?,
            }
            write_stmt(f, body, depth + 1)
        }
        Stmt::Let { var, value, body } => {
            pad(f, depth)?;
            writeln!(f, "{var}: {} = {value}", var.dtype())?;
            write_stmt(f, body, depth)
        }
        Stmt::IfThenElse { cond, then_case, else_case } => {
            pad(f, depth)?;
            writeln!(f, "if {cond}:")?;
            write_stmt(f, then_case, depth + 1)?;
            if let Some(else_case) = else_case {
                pad(f, depth)?;
                writeln!(f, "else:")?;
                write_stmt(f, else_case, depth + 1)?;
            }
            Ok(())
        }
        Stmt::Evaluate(value) => {
            pad(f, depth)?;
            writeln!(f, "evaluate({value})")
        }
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_stmt(f, self, 0)
    }
}

impl Display for PrimFunc {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("prim_func(")?;
        let mut first = true;
        for param in &self.params {
            if !std::mem::take(&mut first) {
                f.write_str(", ")?;
            }
            write!(f, "{param}: {}", param.dtype())?;
        }
        for buffer in &self.buffers {
            if !std::mem::take(&mut first) {
                f.write_str(", ")?;
            }
            write!(f, "{buffer}: {}[", buffer.dtype())?;
            write_list(f, buffer.shape())?;
            f.write_str("]")?;
        }
        writeln!(f, "):")?;
        write_stmt(f, &self.body, 1)
    }
}
