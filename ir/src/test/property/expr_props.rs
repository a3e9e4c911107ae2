//! Property tests for constant folding through substitution.

use proptest::prelude::*;

use crate::types::BinaryOp;
use crate::{Comparer, Expr, Var, VarMap, substitute_expr};

/// Integer expression over a single variable `x`.
#[derive(Debug, Clone)]
enum Term {
    X,
    Lit(i64),
    Bin(BinaryOp, Box<Term>, Box<Term>),
}

fn arb_term() -> impl Strategy<Value = Term> {
    let leaf = prop_oneof![Just(Term::X), (-8i64..8).prop_map(Term::Lit)];
    leaf.prop_recursive(4, 16, 2, |inner| {
        let ops = vec![BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul, BinaryOp::Min, BinaryOp::Max];
        (prop::sample::select(ops), inner.clone(), inner).prop_map(|(op, l, r)| Term::Bin(op, Box::new(l), Box::new(r)))
    })
}

fn build(term: &Term, x: &Var) -> Expr {
    match term {
        Term::X => Expr::var(x),
        Term::Lit(v) => Expr::int(*v),
        Term::Bin(op, l, r) => Expr::binary(*op, build(l, x), build(r, x)).unwrap(),
    }
}

/// Reference value, `None` when any intermediate leaves the int32 range.
fn eval(term: &Term, x: i64) -> Option<i64> {
    let value = match term {
        Term::X => x,
        Term::Lit(v) => *v,
        Term::Bin(op, l, r) => op.eval_int(eval(l, x)?, eval(r, x)?)?,
    };
    i32::try_from(value).ok().map(i64::from)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Binding `x` to a constant folds the whole expression to its value.
    #[test]
    fn substitution_folds_to_reference(term in arb_term(), x in -16i64..16) {
        let reference = eval(&term, x);
        prop_assume!(reference.is_some());

        let var = Var::int32("x");
        let folded = substitute_expr(&build(&term, &var), &VarMap::new().bind(&var, x));
        prop_assert_eq!(folded.as_const_int(), reference, "{}", folded);
    }

    /// Two builds over different free variables are equal once free variables may be mapped.
    #[test]
    fn rebuilt_terms_are_equal_up_to_free_vars(term in arb_term()) {
        let lhs = build(&term, &Var::int32("x"));
        let rhs = build(&term, &Var::int32("x"));
        prop_assert!(Comparer::new().map_free_vars(true).equal(&lhs, &rhs));
    }
}
