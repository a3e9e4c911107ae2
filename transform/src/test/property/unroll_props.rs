//! Property tests for loop unrolling.
//!
//! Unrolling must preserve the sequence of stores a loop nest performs.

use std::sync::Arc;

use proptest::prelude::*;

use tirx_ir::{Expr, ForKind, structural_equal};

use crate::test::helpers::*;
use crate::{UnrollConfig, unroll_loop_stmt};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A fully unrolled loop stores `min, min + 1, ..., min + extent - 1` in order.
    #[test]
    fn single_loop_iterations(min in -20i64..20, extent in 0i64..12) {
        let a = int_buffer(64);
        let out = unroll_loop_stmt(&index_loop(&a, Expr::int(min), Expr::int(extent), ForKind::Serial), &step_config(16)).unwrap();

        prop_assert_eq!(count_loops(&out), 0);
        let expected: Vec<Option<i64>> = (min..min + extent).map(Some).collect();
        prop_assert_eq!(stored_values(&out), expected);
    }

    /// A fully unrolled nest visits the flattened index space in row-major order.
    #[test]
    fn nest_iterations(extents in prop::collection::vec(0i64..4, 1..4)) {
        let a = int_buffer(64);
        let total: i64 = extents.iter().product();
        let out = unroll_loop_stmt(&serial_nest(&a, &extents), &step_config(64)).unwrap();

        prop_assert_eq!(count_loops(&out), 0);
        let expected: Vec<Option<i64>> = (0..total).map(Some).collect();
        prop_assert_eq!(stored_values(&out), expected);
    }

    /// Marking never changes the number of loops or the tree shape.
    #[test]
    fn mark_only_keeps_loops(extents in prop::collection::vec(1i64..4, 1..4), step in 0i64..16) {
        let a = int_buffer(64);
        let body = serial_nest(&a, &extents);
        let config = UnrollConfig::builder().auto_max_step(step).explicit_unroll(false).build();
        let out = unroll_loop_stmt(&body, &config).unwrap();

        prop_assert_eq!(count_loops(&out), extents.len());
        prop_assert_eq!(stores(&out).len(), 1);
    }

    /// Without an auto budget and forced loops, the input is returned as is.
    #[test]
    fn disabled_is_identity(extents in prop::collection::vec(0i64..6, 1..4)) {
        let a = int_buffer(64);
        let body = serial_nest(&a, &extents);
        let out = unroll_loop_stmt(&body, &UnrollConfig::default()).unwrap();
        prop_assert!(Arc::ptr_eq(&out, &body));
    }

    /// Running twice on the same input gives structurally equal results.
    #[test]
    fn deterministic(extents in prop::collection::vec(0i64..4, 1..4), step in 0i64..16, depth in 0i64..4) {
        let a = int_buffer(64);
        let body = serial_nest(&a, &extents);
        let config = UnrollConfig::builder().auto_max_step(step).auto_max_depth(depth).build();
        let first = unroll_loop_stmt(&body, &config).unwrap();
        let second = unroll_loop_stmt(&body, &config).unwrap();
        prop_assert!(structural_equal(&first, &second));
    }
}
