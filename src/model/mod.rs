//! Model Builder (spec §4.3): turns a [`crate::catalog::CatalogIndex`] plus
//! the parsed constraint list into a fully-built `cp_sat` model. This is the
//! only component that touches the solver's model object directly — every
//! other component only ever sees [`ModelContext`] outputs (variable maps,
//! the objective) through this module's public entry point.

pub mod context;
mod degree;
mod freeday;
mod load;
mod objective_terms;
mod ordering;
mod reify;
mod selection;
mod time_filters;
mod variables;

use std::collections::HashSet;

use log::{debug, info};

use crate::catalog::CatalogIndex;
use crate::constraint::{Constraint, ConstraintKind};
use crate::contract::{CourseId, ScheduleRequest};
use crate::error::Result;

pub use context::ModelContext;

/// The built model handed to the Solver Driver (spec §4.4).
pub struct BuiltModel<'a> {
    pub ctx: ModelContext<'a>,
}

/// Runs every constraint handler over a freshly allocated [`ModelContext`]
/// in the fixed order the build pipeline requires: core invariants, then
/// every handler family (selection, time filters, load, degree, ordering,
/// free day, objective shaping), then the deferred load-bound constraints,
/// then prerequisites/graduation (spec §4.3 "Build order").
pub fn build<'a>(
    input: &ScheduleRequest,
    catalog: &'a CatalogIndex,
    completed: &'a HashSet<CourseId>,
    constraints: &[Constraint],
) -> Result<BuiltModel<'a>> {
    let mut ctx = ModelContext::new(
        catalog,
        completed,
        input.num_courses_per_semester,
        input.scale,
        input.tier_order.clone(),
    );

    variables::apply_core_invariants(&mut ctx);
    debug!(
        "core invariants applied: {} x-vars, {} z-vars",
        ctx.all_x().len(),
        ctx.all_z().len()
    );

    for constraint in constraints {
        dispatch(&mut ctx, constraint)?;
    }

    load::emit_load_constraints(&mut ctx);

    if !input.prerequisites.is_empty() {
        ordering::apply_prerequisites(&mut ctx, &input.prerequisites);
    }
    if let Some(grad) = &input.graduation {
        ordering::apply_graduation(&mut ctx, grad);
    }

    if !input.course_scores.is_empty() {
        objective_terms::apply_course_scores(&mut ctx, &input.course_scores)?;
    }
    default_bookmark_objective(&mut ctx, input);

    info!("model built; {} objective tiers active", ctx.objective.tier_order().len());
    Ok(BuiltModel { ctx })
}

/// Sends one parsed [`Constraint`] to the handler family that owns its
/// [`ConstraintKind`] (spec §4.2 dispatch table); each family's `apply`
/// reports whether it recognized the kind, so a kind with no owner is a
/// programming error rather than a silent no-op.
fn dispatch(ctx: &mut ModelContext, constraint: &Constraint) -> Result<()> {
    let kind = &constraint.kind;
    let mode = constraint.mode;
    let weight = constraint.weight;
    let tier = constraint.tier.as_str();

    if selection::apply(ctx, kind, mode, weight, tier)? {
        return Ok(());
    }
    if time_filters::apply(ctx, kind, mode, weight, tier)? {
        return Ok(());
    }
    if load::apply(ctx, kind) {
        return Ok(());
    }
    if degree::apply(ctx, kind, mode, weight, tier)? {
        return Ok(());
    }
    match kind {
        ConstraintKind::EnforceOrdering { before, after } => {
            ordering::enforce_ordering(ctx, before, after);
            return Ok(());
        }
        ConstraintKind::FreeDay { days, count } => {
            freeday::free_day(ctx, days, *count, mode, weight, tier)?;
            return Ok(());
        }
        _ => {}
    }
    if objective_terms::apply(ctx, kind)? {
        return Ok(());
    }
    unreachable!(
        "constraint {} kind {} has no handler; this is a dispatch-table bug",
        constraint.id,
        kind_name(kind)
    )
}

fn kind_name(kind: &ConstraintKind) -> &'static str {
    match kind {
        ConstraintKind::IncludeCourse { .. } => "include_course",
        ConstraintKind::ExcludeCourse { .. } => "exclude_course",
        ConstraintKind::IncludeSection { .. } => "include_section",
        ConstraintKind::ExcludeSection { .. } => "exclude_section",
        ConstraintKind::PinSections { .. } => "pin_sections",
        ConstraintKind::IncludeInstructor { .. } => "include_instructor",
        ConstraintKind::ExcludeInstructor { .. } => "exclude_instructor",
        ConstraintKind::SectionFilter { .. } => "section_filter",
        ConstraintKind::AllowedDays { .. } => "allowed_days",
        ConstraintKind::DisallowedDays { .. } => "disallowed_days",
        ConstraintKind::EarliestStart { .. } => "earliest_start",
        ConstraintKind::LatestEnd { .. } => "latest_end",
        ConstraintKind::BlockTimeWindow { .. } => "block_time_window",
        ConstraintKind::MaxCoursesPerSemester { .. } => "max_courses_per_semester",
        ConstraintKind::MinCoursesPerSemester { .. } => "min_courses_per_semester",
        ConstraintKind::TargetCoursesPerSemester { .. } => "target_courses_per_semester",
        ConstraintKind::RequireGroupCounts { .. } => "require_group_counts",
        ConstraintKind::HubTargets { .. } => "hub_targets",
        ConstraintKind::EnforceOrdering { .. } => "enforce_ordering",
        ConstraintKind::FreeDay { .. } => "free_day",
        ConstraintKind::BookmarkedBonus { .. } => "bookmarked_bonus",
        ConstraintKind::ProfessorRatingWeight { .. } => "professor_rating_weight",
        ConstraintKind::LexicographicPriority { .. } => "lexicographic_priority",
    }
}

/// When nothing in the request touches the objective at all, fall back to
/// rewarding bookmarked courses directly so the solver doesn't return an
/// arbitrary feasible schedule with no preference signal (spec §9
/// "default-bookmark-objective fallback").
fn default_bookmark_objective(ctx: &mut ModelContext, input: &ScheduleRequest) {
    if ctx.objective.has_terms() || input.bookmarks.is_empty() {
        return;
    }
    debug!("no objective terms present; defaulting to a bookmarks-only objective");
    let last = ctx.last;
    let bookmarks: Vec<String> = input.bookmarks.iter().cloned().collect();
    for cid in &bookmarks {
        let expr = ctx.merged_x(cid, last);
        if expr.is_const_false() {
            continue;
        }
        let v = ctx.model.new_bool_var();
        ctx.model
            .add_eq(cp_sat::builder::LinearExpr::from(v.clone()), expr.to_linear());
        let _ = ctx.objective.add_term("bookmarks", v, 1.0);
    }
}
