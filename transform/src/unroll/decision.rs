//! Per-loop unroll decisions.
//!
//! A decision depends on the loop itself, the effective configuration of the
//! enclosing annotation [`Scope`], the number of enclosing loops, and the
//! loop's own cost: its extent times the expanded size of its body. Siblings
//! and ancestors never share a step budget.

use tirx_ir::{Expr, ForKind, Stmt, Var, attr};

use crate::config::UnrollConfig;
use crate::error::{Result, UnsupportedUnrollTargetSnafu};

/// Effective configuration inside an annotation scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    pub auto_max_step: i64,
    pub auto_max_depth: i64,
    pub auto_max_extent: i64,
    pub explicit_unroll: bool,
}

impl From<&UnrollConfig> for Scope {
    fn from(config: &UnrollConfig) -> Self {
        Self {
            auto_max_step: config.auto_max_step,
            auto_max_depth: config.auto_max_depth,
            auto_max_extent: config.auto_max_extent,
            explicit_unroll: config.explicit_unroll,
        }
    }
}

/// Result of interpreting an attribute as an unroll pragma.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pragma {
    /// Not an unroll pragma key.
    Unrelated,
    /// A pragma key whose value is not a non-negative integer immediate.
    Unrecognized,
    /// The scope to use for the annotated body.
    Applied(Scope),
}

impl Scope {
    /// True when no loop can be auto-unrolled in this scope.
    pub fn auto_disabled(&self) -> bool {
        self.auto_max_step == 0
    }

    /// Interpret `key = value` as an override of this scope.
    pub fn apply_pragma(&self, key: &str, value: &Expr) -> Pragma {
        let field: fn(&mut Scope, i64) = match key {
            attr::PRAGMA_AUTO_UNROLL_MAX_STEP => |s, v| s.auto_max_step = v,
            attr::PRAGMA_AUTO_UNROLL_MAX_DEPTH => |s, v| s.auto_max_depth = v,
            attr::PRAGMA_AUTO_UNROLL_MAX_EXTENT => |s, v| s.auto_max_extent = v,
            attr::PRAGMA_UNROLL_EXPLICIT => |s, v| s.explicit_unroll = v != 0,
            _ => return Pragma::Unrelated,
        };
        match value.as_const_int() {
            Some(v) if v >= 0 => {
                let mut scope = *self;
                field(&mut scope, v);
                Pragma::Applied(scope)
            }
            _ => Pragma::Unrecognized,
        }
    }
}

/// What to do with one loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Serial loop within every budget.
    Auto { extent: i64 },
    /// `Unrolled` loop with constant extent; budgets do not apply.
    Force { extent: i64 },
    /// Single-iteration serial loop under `auto_max_extent == 1`; always materialized.
    Collapse { extent: i64 },
    Keep,
}

impl Decision {
    /// Constant trip count of an unrolled loop.
    pub fn extent(&self) -> Option<i64> {
        match *self {
            Decision::Auto { extent } | Decision::Force { extent } | Decision::Collapse { extent } => Some(extent),
            Decision::Keep => None,
        }
    }

    /// Whether the loop is replaced by copies of its body.
    pub fn materializes(&self, scope: &Scope) -> bool {
        match self {
            Decision::Auto { .. } | Decision::Force { .. } => scope.explicit_unroll,
            Decision::Collapse { .. } => true,
            Decision::Keep => false,
        }
    }
}

/// Classify a loop whose body executes `body_steps` statements once fully
/// expanded, nested inside `depth` enclosing loops.
///
/// Fails only for an `Unrolled` loop whose extent is not a constant.
pub fn classify(loop_var: &Var, extent: &Expr, kind: ForKind, scope: &Scope, depth: i64, body_steps: i64) -> Result<Decision> {
    let constant = extent.as_const_int();
    if kind == ForKind::Unrolled && constant.is_none() {
        return UnsupportedUnrollTargetSnafu { loop_var: loop_var.name(), extent: extent.to_string() }.fail();
    }
    let decision = decide(constant, kind, scope, depth, body_steps);

    tracing::trace!(
        loop_var = %loop_var,
        extent = %extent,
        depth,
        body_steps,
        decision = ?decision,
        "classified loop"
    );
    Ok(decision)
}

/// [`classify`] without the failure: a symbolic `Unrolled` loop is kept.
fn decide(extent: Option<i64>, kind: ForKind, scope: &Scope, depth: i64, body_steps: i64) -> Decision {
    match (kind, extent) {
        (ForKind::Unrolled, Some(e)) => Decision::Force { extent: e },
        (ForKind::Serial, Some(e)) if auto_eligible(e, scope, depth, body_steps) => Decision::Auto { extent: e },
        (ForKind::Serial, Some(e)) if scope.auto_max_extent == 1 && (0..=1).contains(&e) => {
            Decision::Collapse { extent: e }
        }
        _ => Decision::Keep,
    }
}

/// A loop's own cost is its extent times the expanded size of its body.
fn auto_eligible(extent: i64, scope: &Scope, depth: i64, body_steps: i64) -> bool {
    extent >= 0
        && !scope.auto_disabled()
        && depth < scope.auto_max_depth
        && extent <= scope.auto_max_extent
        && extent.checked_mul(body_steps).is_some_and(|cost| cost <= scope.auto_max_step)
}

/// Number of statements `stmt` executes once every loop inside it that would
/// be unrolled is expanded. Kept loops count their body once.
///
/// Loop extents are read as they are now; a loop whose extent only becomes
/// constant after an enclosing loop is unrolled counts as kept.
pub fn unrolled_steps(stmt: &Stmt, scope: &Scope, depth: i64) -> i64 {
    match stmt {
        Stmt::For { extent, kind, body, .. } => {
            let body_steps = unrolled_steps(body, scope, depth.saturating_add(1));
            match decide(extent.as_const_int(), *kind, scope, depth, body_steps).extent() {
                Some(e) => e.max(0).saturating_mul(body_steps),
                None => body_steps,
            }
        }
        Stmt::Attr { key, value, body, .. } => match scope.apply_pragma(key, value) {
            Pragma::Applied(inner) => unrolled_steps(body, &inner, depth),
            Pragma::Unrelated | Pragma::Unrecognized => unrolled_steps(body, scope, depth),
        },
        Stmt::Seq(items) => items.iter().fold(0i64, |acc, item| acc.saturating_add(unrolled_steps(item, scope, depth))),
        Stmt::Allocate { body, .. } | Stmt::Let { body, .. } => unrolled_steps(body, scope, depth),
        Stmt::IfThenElse { then_case, else_case, .. } => {
            let then_steps = unrolled_steps(then_case, scope, depth);
            let else_steps = else_case.as_ref().map_or(0, |e| unrolled_steps(e, scope, depth));
            then_steps.saturating_add(else_steps)
        }
        Stmt::BufferStore { .. } | Stmt::Evaluate(_) => 1,
    }
}
