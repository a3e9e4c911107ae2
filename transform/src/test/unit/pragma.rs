//! Tests for annotation-scoped overrides.

use std::sync::Arc;

use tirx_ir::{AttrNode, ForKind, Stmt, Var, attr};

use crate::UnrollConfig;
use crate::test::helpers::*;
use crate::unroll_loop_stmt;

fn kind_of(stmt: &Stmt) -> ForKind {
    match stmt {
        Stmt::For { kind, .. } => *kind,
        other => panic!("expected loop, got:\n{other}"),
    }
}

#[test]
fn test_pragma_scope_marks_only_annotated_nest() {
    let n = Var::int32("n");
    let a = int_buffer(64);
    let nest = unroll_example(&n, &a);
    let wrapped = Stmt::seq([
        Stmt::attr(AttrNode::None, attr::PRAGMA_AUTO_UNROLL_MAX_STEP, 16, nest.clone()),
        nest,
    ]);

    let config = UnrollConfig::builder().auto_max_depth(8).explicit_unroll(false).build();
    let out = unroll_loop_stmt(&wrapped, &config).unwrap();

    let Stmt::Seq(items) = &*out else { panic!("expected seq:\n{out}") };
    assert_eq!(kind_of(&items[0]), ForKind::Unrolled, "applied pragma is consumed");
    assert_ne!(kind_of(&items[1]), ForKind::Unrolled);
}

#[test]
fn test_pragma_does_not_leak_to_siblings() {
    let a = int_buffer(8);
    let body = Stmt::seq([
        Stmt::attr(AttrNode::None, attr::PRAGMA_AUTO_UNROLL_MAX_STEP, 4, index_loop(&a, 0, 4, ForKind::Serial)),
        index_loop(&a, 4, 4, ForKind::Serial),
    ]);
    let out = unroll_loop_stmt(&body, &UnrollConfig::default()).unwrap();

    let Stmt::Seq(items) = &*out else { panic!("expected seq:\n{out}") };
    assert_eq!(count_loops(&items[0]), 0, "{out}");
    assert_eq!(count_loops(&items[1]), 1, "{out}");
}

#[test]
fn test_nested_pragmas_compose() {
    let a = int_buffer(8);
    let inner = Stmt::attr(AttrNode::None, attr::PRAGMA_UNROLL_EXPLICIT, 0, index_loop(&a, 0, 4, ForKind::Serial));
    let body = Stmt::attr(AttrNode::None, attr::PRAGMA_AUTO_UNROLL_MAX_STEP, 8, inner);
    let out = unroll_loop_stmt(&body, &UnrollConfig::default()).unwrap();
    assert_eq!(kind_of(&out), ForKind::Unrolled);
}

#[test]
fn test_pragma_tightens_outer_config() {
    let a = int_buffer(8);
    let body = Stmt::attr(AttrNode::None, attr::PRAGMA_AUTO_UNROLL_MAX_EXTENT, 2, index_loop(&a, 0, 4, ForKind::Serial));
    let out = unroll_loop_stmt(&body, &step_config(16)).unwrap();
    assert_eq!(kind_of(&out), ForKind::Serial);
}

#[test]
fn test_pragma_keeps_enclosing_budget() {
    let a = int_buffer(64);
    let i = Var::int32("i");
    let annotated = Stmt::attr(AttrNode::None, attr::PRAGMA_AUTO_UNROLL_MAX_DEPTH, 1, index_loop(&a, 0, 2, ForKind::Serial));
    let body = Stmt::serial(&i, 2, annotated);
    // the annotated loop sits at depth 1, which the pragma no longer allows
    let out = unroll_loop_stmt(&body, &step_config(16)).unwrap();
    assert_eq!(count_loops(&out), 2, "{out}");
}

#[test]
fn test_invalid_pragma_is_passed_through() {
    let a = int_buffer(8);
    let body = Stmt::attr(AttrNode::None, attr::PRAGMA_AUTO_UNROLL_MAX_STEP, -1, index_loop(&a, 0, 4, ForKind::Serial));
    let out = unroll_loop_stmt(&body, &step_config(4)).unwrap();

    let Stmt::Attr { key, body, .. } = &*out else { panic!("expected attr:\n{out}") };
    assert_eq!(key, attr::PRAGMA_AUTO_UNROLL_MAX_STEP);
    assert_eq!(count_loops(body), 0, "outer config still applies:\n{out}");
}

#[test]
fn test_unrelated_attr_is_preserved() {
    let a = int_buffer(8);
    let annotated = Stmt::attr(AttrNode::Int(3), "pragma_import", 1, index_loop(&a, 0, 2, ForKind::Serial));
    let unchanged = unroll_loop_stmt(&annotated, &UnrollConfig::default()).unwrap();
    assert!(Arc::ptr_eq(&unchanged, &annotated));

    let out = unroll_loop_stmt(&annotated, &step_config(2)).unwrap();
    let Stmt::Attr { node, key, body, .. } = &*out else { panic!("expected attr:\n{out}") };
    assert_eq!(key, "pragma_import");
    assert!(matches!(node, AttrNode::Int(3)));
    assert_eq!(count_loops(body), 0);
}
