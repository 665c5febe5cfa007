//! Per-semester course-load bounds (spec §4.2 "max/min/target courses per
//! semester"). These handlers only *record* overrides into
//! [`ModelContext::semester_bounds`] — the actual `sum x[c,s] in [min,max]`
//! constraints are emitted once, after every handler has run, by
//! [`emit_load_constraints`], so a later override always wins over the
//! default (spec §4.3 "Build order").

use cp_sat::builder::LinearExpr;

use crate::constraint::ConstraintKind;
use crate::model::context::ModelContext;

fn target_semesters(ctx: &ModelContext, semesters: &Option<Vec<String>>) -> Vec<i64> {
    match semesters {
        Some(names) => names
            .iter()
            .filter_map(|name| ctx.catalog.semesters.iter().position(|s| s == name))
            .map(|i| i as i64)
            .collect(),
        None => (0..=ctx.last).collect(),
    }
}

pub fn max_courses_per_semester(ctx: &mut ModelContext, k: u32, semesters: &Option<Vec<String>>) {
    for s in target_semesters(ctx, semesters) {
        let (lo, _) = ctx.semester_bounds[s as usize];
        ctx.semester_bounds[s as usize] = (lo, k as i64);
    }
}

pub fn min_courses_per_semester(ctx: &mut ModelContext, m: u32, semesters: &Option<Vec<String>>) {
    for s in target_semesters(ctx, semesters) {
        let (_, hi) = ctx.semester_bounds[s as usize];
        ctx.semester_bounds[s as usize] = (m as i64, hi);
    }
}

pub fn target_courses_per_semester(ctx: &mut ModelContext, k: u32, semesters: &Option<Vec<String>>) {
    for s in target_semesters(ctx, semesters) {
        ctx.semester_bounds[s as usize] = (k as i64, k as i64);
    }
}

/// Emits `min <= sum_c x[c,s] <= max` for every semester, using whatever
/// bounds the handlers settled on (spec §3 "Default load bound").
pub fn emit_load_constraints(ctx: &mut ModelContext) {
    for s in 0..=ctx.last {
        let (lo, hi) = ctx.semester_bounds[s as usize];
        let sum: LinearExpr = ctx
            .all_x_for_semester(s)
            .into_iter()
            .map(LinearExpr::from)
            .fold(LinearExpr::from(0), |acc, e| acc + e);
        if lo > 0 {
            ctx.model.add_ge(sum.clone(), LinearExpr::from(lo));
        }
        ctx.model.add_le(sum, LinearExpr::from(hi));
    }
}

pub fn apply(ctx: &mut ModelContext, kind: &ConstraintKind) -> bool {
    match kind {
        ConstraintKind::MaxCoursesPerSemester { k, semesters } => max_courses_per_semester(ctx, *k, semesters),
        ConstraintKind::MinCoursesPerSemester { m, semesters } => min_courses_per_semester(ctx, *m, semesters),
        ConstraintKind::TargetCoursesPerSemester { k, semesters } => {
            target_courses_per_semester(ctx, *k, semesters)
        }
        _ => return false,
    }
    true
}
