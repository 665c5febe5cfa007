//! Course sequencing: the explicit `enforce_ordering` pair constraint and
//! the per-course prerequisite predicate (spec §4.2 "Ordering").

use cp_sat::builder::LinearExpr;

use crate::constraint::ConstraintTree;
use crate::model::context::ModelContext;
use crate::model::reify;

/// Forbids any assignment where `x[after, s_after]` and `x[before, s_before]`
/// with `s_after <= s_before` both hold (spec §4.2 "enforce_ordering", using
/// the course-level formulation spec §4.2 calls out as equivalent to the
/// section-pair phrasing). Operating on `x[c,s]` directly — rather than on
/// raw `z[r]` section variables outside the nearest semester — keeps this
/// from allocating decision variables for sections that have no linking
/// invariant back to course-level choice (spec §3 "Decision variables").
/// A completed `before` has no `x[before,s]` for `s >= 0` at all, so the
/// ordering is trivially satisfied and no constraint is emitted.
pub fn enforce_ordering(ctx: &mut ModelContext, before: &str, after: &str) {
    let last = ctx.last;
    for s_after in 0..=last {
        for s_before in s_after..=last {
            if let (Some(xa), Some(xb)) = (ctx.x_var(after, s_after), ctx.x_var(before, s_before)) {
                ctx.model
                    .add_le(LinearExpr::from(xa) + LinearExpr::from(xb), LinearExpr::from(1));
            }
        }
    }
}

/// `x[c,s] => prereq(s-1)` for every non-completed course with a
/// registered prerequisite predicate (spec §4.2 "Prerequisites"): a course
/// can only be taken in semester `s` if its prerequisite predicate, judged
/// one semester back, is already satisfied.
pub fn apply_prerequisites(ctx: &mut ModelContext, prerequisites: &std::collections::HashMap<String, ConstraintTree>) {
    for (course_id, tree) in prerequisites {
        if ctx.is_completed(course_id) || !ctx.catalog.has_course(course_id) {
            continue;
        }
        for s in 0..=ctx.last {
            let Some(taken) = ctx.x_var(course_id, s) else {
                continue;
            };
            let satisfied = reify::reify(ctx, tree, s - 1);
            if satisfied.is_const_true() {
                continue;
            }
            ctx.model
                .add_le(LinearExpr::from(taken), satisfied.to_linear());
        }
    }
}

/// The single top-level graduation predicate, evaluated at the final
/// semester (spec §4.2 "Graduation").
pub fn apply_graduation(ctx: &mut ModelContext, tree: &ConstraintTree) {
    let last = ctx.last;
    let satisfied = reify::reify(ctx, tree, last);
    if !satisfied.is_const_true() {
        ctx.model.add_ge(satisfied.to_linear(), LinearExpr::from(1));
    }
}
