//! Tests for substitution: free occurrences, shadowing, refolding, sharing.

use std::sync::Arc;

use crate::{Buffer, DType, Expr, ForKind, KeepBindings, Rebind, Stmt, Substituter, Var, VarMap};
use crate::{structural_equal, substitute_expr, substitute_stmt};

#[test]
fn test_substitute_refolds() {
    let i = Var::int32("i");
    let e = Expr::var(&i).try_add(1).unwrap();
    let out = substitute_expr(&e, &VarMap::new().bind(&i, 4));
    assert_eq!(out.as_const_int(), Some(5));
}

#[test]
fn test_substitute_leaves_unmapped() {
    let i = Var::int32("i");
    let j = Var::int32("j");
    let a = Buffer::global("A", DType::Int32, &[8]);
    let body = Stmt::store(&a, [Expr::var(&j)], &j).unwrap();

    let out = substitute_stmt(&body, &VarMap::new().bind(&i, 3));
    assert!(Arc::ptr_eq(&out, &body), "unchanged tree must be shared");
}

#[test]
fn test_shadowing_loop_is_not_rewritten() {
    let i = Var::int32("i");
    let a = Buffer::global("A", DType::Int32, &[8]);
    // for i in 0..4: A[i] = i   -- rebinds i, so nothing inside is free
    let inner = Stmt::serial(&i, 4, Stmt::store(&a, [Expr::var(&i)], &i).unwrap());
    let outer_use = Stmt::store(&a, [Expr::int(0)], &i).unwrap();
    let tree = Stmt::seq([outer_use, inner.clone()]);

    let out = substitute_stmt(&tree, &VarMap::new().bind(&i, 7));
    let Stmt::Seq(items) = &*out else { panic!("expected seq:\n{out}") };
    let Stmt::BufferStore { value, .. } = &*items[0] else { panic!("expected store") };
    assert_eq!(value.as_const_int(), Some(7));
    assert!(Arc::ptr_eq(&items[1], &inner), "shadowing loop must be untouched");
}

#[test]
fn test_inner_extent_becomes_constant() {
    let i = Var::int32("i");
    let j = Var::int32("j");
    let a = Buffer::global("A", DType::Int32, &[8, 8]);
    let inner = Stmt::serial(
        &j,
        Expr::var(&i).try_add(1).unwrap(),
        Stmt::store(&a, [Expr::var(&i), Expr::var(&j)], 1).unwrap(),
    );

    let out = substitute_stmt(&inner, &VarMap::new().bind(&i, 2));
    let Stmt::For { extent, .. } = &*out else { panic!("expected loop:\n{out}") };
    assert_eq!(extent.as_const_int(), Some(3));
}

#[test]
fn test_buffer_map_rewrites_declaration_and_uses() {
    let b = Buffer::new("B", DType::Float32, [Expr::int(2)], "local");
    let b2 = b.with_name("B_1");
    let body = Stmt::allocate(&b, Stmt::store(&b, [Expr::int(0)], 1.0f32).unwrap());

    let mut map = VarMap::new();
    map.insert_buffer(&b, &b2);
    let out = substitute_stmt(&body, &map);
    let Stmt::Allocate { buffer, body } = &*out else { panic!("expected allocate") };
    assert_eq!(buffer, &b2);
    let Stmt::BufferStore { buffer, .. } = &**body else { panic!("expected store") };
    assert_eq!(buffer, &b2);
}

struct Renamer(usize);

impl Rebind for Renamer {
    fn var(&mut self, old: &Var) -> Option<Var> {
        self.0 += 1;
        Some(old.with_name(format!("{}_{}", old.name(), self.0)))
    }
}

#[test]
fn test_rebind_renames_definitions() {
    let i = Var::int32("i");
    let a = Buffer::global("A", DType::Int32, &[4]);
    let tree = Stmt::serial(&i, 4, Stmt::store(&a, [Expr::var(&i)], &i).unwrap());

    let mut sub = Substituter::new(VarMap::new(), Renamer(0));
    let out = sub.stmt(&tree).unwrap();
    let Stmt::For { loop_var, body, .. } = &*out else { panic!("expected loop") };
    assert_eq!(loop_var.name(), "i_1");
    assert_ne!(loop_var, &i);
    let Stmt::BufferStore { value, .. } = &**body else { panic!("expected store") };
    assert_eq!(value.as_var(), Some(loop_var));
    assert!(structural_equal(&out, &tree), "renaming keeps the structure");
}

#[test]
fn test_allocate_shape_follows_substitution() {
    let n = Var::int32("n");
    let b = Buffer::new("B", DType::Float32, [Expr::var(&n)], "local");
    let tree = Stmt::allocate(&b, Stmt::store(&b, [Expr::int(0)], 0.0f32).unwrap());

    let out = Substituter::new(VarMap::new().bind(&n, 16), KeepBindings).stmt(&tree).unwrap();
    let Stmt::Allocate { buffer, body } = &*out else { panic!("expected allocate") };
    assert_eq!(buffer.shape()[0].as_const_int(), Some(16));
    let Stmt::BufferStore { buffer: stored, .. } = &**body else { panic!("expected store") };
    assert_eq!(stored, buffer);
}

#[test]
fn test_loop_kind_kept() {
    let i = Var::int32("i");
    let n = Var::int32("n");
    let tree = Stmt::for_(&i, 0, &n, ForKind::Parallel, Stmt::evaluate(&i));
    let out = substitute_stmt(&tree, &VarMap::new().bind(&n, 8));
    let Stmt::For { kind, extent, .. } = &*out else { panic!("expected loop") };
    assert_eq!(*kind, ForKind::Parallel);
    assert_eq!(extent.as_const_int(), Some(8));
}

#[test]
fn test_load_indices_are_rewritten() {
    let i = Var::int32("i");
    let j = Var::int32("j");
    let a = Buffer::global("A", DType::Int32, &[8, 8]);
    let load = Expr::load(&a, [Expr::var(&i), Expr::var(&j).try_add(1).unwrap()]).unwrap();
    assert_eq!(load.to_string(), "A[i, (j + 1)]");

    let out = substitute_expr(&load, &VarMap::new().bind(&i, 3));
    assert_eq!(out.to_string(), "A[3, (j + 1)]");
    let expected = Expr::load(&a, [Expr::int(3), Expr::var(&j).try_add(1).unwrap()]).unwrap();
    assert!(structural_equal(&out, &expected));
}

#[test]
fn test_load_buffer_remap_shares_indices() {
    let i = Var::int32("i");
    let a = Buffer::global("A", DType::Int32, &[8]);
    let b = Buffer::global("B", DType::Int32, &[8]);
    let load = Expr::load(&a, [Expr::var(&i)]).unwrap();

    let mut map = VarMap::new();
    map.insert_buffer(&a, &b);
    let out = substitute_expr(&load, &map);
    let (Expr::Load { buffer, indices: new }, Expr::Load { indices: old, .. }) = (&out, &load) else {
        panic!("expected loads: {out}");
    };
    assert!(buffer.ptr_eq(&b));
    assert!(Arc::ptr_eq(new, old), "unchanged index list must be shared");
}
