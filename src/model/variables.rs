//! Allocates the core decision variables and their linking invariants (spec
//! §4.3 "Core invariants 1-4"), before any constraint handler runs.

use cp_sat::builder::LinearExpr;

use crate::model::context::ModelContext;

/// Invariant 1: a course is taken in semester `s` iff exactly one of its
/// nearest-semester sections is chosen, zero sections chosen otherwise.
/// Invariant 2: each chosen section's course-level variable tracks it.
/// Invariant 3: conflicting sections cannot both be chosen.
/// Invariant 4: a non-completed course is taken in at most one semester.
pub fn apply_core_invariants(ctx: &mut ModelContext) {
    link_sections_to_courses(ctx);
    forbid_conflicts(ctx);
    at_most_one_semester(ctx);
}

/// `x[c, 0] == sum of z[r] for r in sections_of(c) in semester 0` (spec §3
/// "Linking invariant"). Only semester 0 carries section-level choices —
/// later semesters are course-level only (spec §4.3 "Completed courses").
/// A course offered again in a later semester must not pull those sections
/// into this sum: `z[r]` is only ever a decision variable for sections
/// offered in the nearest semester (spec §3 "Decision variables").
fn link_sections_to_courses(ctx: &mut ModelContext) {
    let courses: Vec<String> = ctx.catalog.course_ids.iter().cloned().collect();
    for course_id in &courses {
        if ctx.is_completed(course_id) {
            continue;
        }
        let rids: Vec<String> = ctx
            .catalog
            .sections_of(course_id)
            .iter()
            .filter(|rid| {
                ctx.catalog
                    .section(rid)
                    .map(|s| s.semester_index == 0)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        let Some(x0) = ctx.x_var(course_id, 0) else {
            continue;
        };
        let sum: LinearExpr = rids
            .iter()
            .map(|rid| LinearExpr::from(ctx.z_var(rid)))
            .fold(LinearExpr::from(0), |acc, e| acc + e);
        ctx.model.add_eq(LinearExpr::from(x0), sum);
    }
}

/// Every catalog-declared conflicting pair of sections may not both be
/// selected (spec §4.1 "Conflict computation").
fn forbid_conflicts(ctx: &mut ModelContext) {
    let pairs = ctx.catalog.conflicting_pairs().to_vec();
    for (a, b) in &pairs {
        let va = ctx.z_var(a);
        let vb = ctx.z_var(b);
        ctx.model
            .add_le(LinearExpr::from(va) + LinearExpr::from(vb), LinearExpr::from(1));
    }
}

/// `sum_s x[c,s] <= 1` for every non-completed course across the future
/// semesters (spec §3 "At-most-one-semester invariant").
fn at_most_one_semester(ctx: &mut ModelContext) {
    let courses: Vec<String> = ctx.catalog.course_ids.iter().cloned().collect();
    for course_id in &courses {
        if ctx.is_completed(course_id) {
            continue;
        }
        let sum: LinearExpr = (0..=ctx.last)
            .filter_map(|s| ctx.x_var(course_id, s))
            .map(LinearExpr::from)
            .fold(LinearExpr::from(0), |acc, e| acc + e);
        ctx.model.add_le(sum, LinearExpr::from(1));
    }
}
