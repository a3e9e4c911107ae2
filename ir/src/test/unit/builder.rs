//! Tests for `IrBuilder` scoping.

use crate::{AttrNode, Buffer, DType, Error, Expr, ForKind, IrBuilder, Stmt, Var, attr, post_order_visit};

#[test]
fn test_nested_scopes() {
    let a = Buffer::global("A", DType::Int32, &[4, 4]);
    let mut ib = IrBuilder::new();
    ib.scope_attr(AttrNode::None, attr::PRAGMA_UNROLL_EXPLICIT, 0, |ib| {
        ib.for_range("i", 0, 4, ForKind::Serial, |ib, i| {
            ib.for_range("j", 0, 4, ForKind::Serial, |ib, j| ib.store(&a, [Expr::var(&i), Expr::var(&j)], &i))
        })
    })
    .unwrap();
    let stmt = ib.get();

    let Stmt::Attr { key, body, .. } = &*stmt else { panic!("expected attr:\n{stmt}") };
    assert_eq!(key, attr::PRAGMA_UNROLL_EXPLICIT);
    let Stmt::For { body, .. } = &**body else { panic!("expected loop") };
    assert!(matches!(&**body, Stmt::For { .. }), "single statement frames are not wrapped");
}

#[test]
fn test_multiple_statements_become_seq() {
    let a = Buffer::global("A", DType::Int32, &[2]);
    let mut ib = IrBuilder::new();
    ib.store(&a, [Expr::int(0)], 1).unwrap();
    ib.store(&a, [Expr::int(1)], 2).unwrap();
    let stmt = ib.get();
    assert!(matches!(&*stmt, Stmt::Seq(items) if items.len() == 2));
}

#[test]
fn test_allocate_and_let() {
    let b = Buffer::new("B", DType::Int32, [Expr::int(1)], "local");
    let mut ib = IrBuilder::new();
    ib.allocate(&b, |ib| ib.let_("x", Expr::int(5), |ib, x| ib.store(&b, [Expr::int(0)], &x))).unwrap();
    let stmt = ib.get();

    let mut kinds = Vec::new();
    post_order_visit(&stmt, |s| kinds.push(s.kind_name()));
    assert_eq!(kinds, ["BufferStore", "Let", "Allocate"]);
}

#[test]
fn test_error_propagates_from_scope() {
    let a = Buffer::global("A", DType::Float32, &[2]);
    let mut ib = IrBuilder::new();
    let n = Var::int32("n");
    let err = ib
        .for_range("i", 0, 2, ForKind::Serial, |ib, i| ib.store(&a, [Expr::var(&i)], Expr::int(1).try_add(&n)?))
        .unwrap_err();
    assert!(matches!(err, Error::StoreDTypeMismatch { .. }));
    assert!(ib.get().is_no_op(), "failed scope emits nothing");
}
