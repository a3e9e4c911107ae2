//! Tests for structural equality and mismatch reporting.

use crate::{Buffer, Comparer, DType, Expr, ForKind, PrimFunc, Stmt, Var};
use crate::{first_mismatch, structural_equal};

fn copy_loop(name: &str, a: &Buffer, extent: i64) -> std::sync::Arc<Stmt> {
    let i = Var::int32(name);
    Stmt::serial(&i, extent, Stmt::store(a, [Expr::var(&i)], &i).unwrap())
}

#[test]
fn test_alpha_equivalent_loops() {
    let a = Buffer::global("A", DType::Int32, &[8]);
    assert!(structural_equal(&copy_loop("i", &a, 8), &copy_loop("k", &a, 8)));
}

#[test]
fn test_extent_mismatch_reports_path() {
    let a = Buffer::global("A", DType::Int32, &[8]);
    let m = first_mismatch(&copy_loop("i", &a, 8), &copy_loop("i", &a, 4)).unwrap();
    assert_eq!(m.path, "extent");
    assert!(m.detail.contains('8') && m.detail.contains('4'), "{m}");
}

#[test]
fn test_free_buffers_must_match() {
    let a = Buffer::global("A", DType::Int32, &[8]);
    let b = Buffer::global("A", DType::Int32, &[8]);
    let m = first_mismatch(&copy_loop("i", &a, 8), &copy_loop("i", &b, 8)).unwrap();
    assert_eq!(m.path, "body");
    assert!(Comparer::new().map_free_vars(true).equal(&copy_loop("i", &a, 8), &copy_loop("i", &b, 8)));
}

#[test]
fn test_kind_mismatch() {
    let i = Var::int32("i");
    let lhs = Stmt::for_(&i, 0, 4, ForKind::Serial, Stmt::evaluate(&i));
    let rhs = Stmt::for_(&i, 0, 4, ForKind::Unrolled, Stmt::evaluate(&i));
    let m = first_mismatch(&lhs, &rhs).unwrap();
    assert!(m.detail.contains("serial") && m.detail.contains("unrolled"), "{m}");
}

#[test]
fn test_allocations_match_by_position() {
    let b1 = Buffer::new("B", DType::Float32, [Expr::int(2)], "local");
    let b2 = Buffer::new("B_1", DType::Float32, [Expr::int(2)], "local");
    let lhs = Stmt::allocate(&b1, Stmt::store(&b1, [Expr::int(0)], 1.0f32).unwrap());
    let rhs = Stmt::allocate(&b2, Stmt::store(&b2, [Expr::int(0)], 1.0f32).unwrap());
    assert!(structural_equal(&lhs, &rhs));

    let other_scope = Buffer::new("B", DType::Float32, [Expr::int(2)], "shared");
    let rhs = Stmt::allocate(&other_scope, Stmt::store(&other_scope, [Expr::int(0)], 1.0f32).unwrap());
    assert!(!structural_equal(&lhs, &rhs));
}

#[test]
fn test_sequence_length_and_index() {
    let a = Buffer::global("A", DType::Int32, &[4]);
    let s0 = Stmt::store(&a, [Expr::int(0)], 0).unwrap();
    let s1 = Stmt::store(&a, [Expr::int(1)], 1).unwrap();
    let s1x = Stmt::store(&a, [Expr::int(1)], 2).unwrap();

    assert!(first_mismatch(&Stmt::seq([s0.clone()]), &Stmt::seq([s0.clone(), s1.clone()])).is_some());
    let m = first_mismatch(&Stmt::seq([s0.clone(), s1]), &Stmt::seq([s0, s1x])).unwrap();
    assert_eq!(m.path, "[1].value");
}

#[test]
fn test_prim_func_params_bind() {
    let n1 = Var::int32("n");
    let n2 = Var::int32("m");
    let a1 = Buffer::global("A", DType::Int32, &[16]);
    let a2 = Buffer::global("X", DType::Int32, &[16]);
    let f1 = PrimFunc::new([n1.clone()], [a1.clone()], Stmt::store(&a1, [Expr::int(0)], &n1).unwrap());
    let f2 = PrimFunc::new([n2.clone()], [a2.clone()], Stmt::store(&a2, [Expr::int(0)], &n2).unwrap());
    assert!(structural_equal(&f1, &f2));
}
