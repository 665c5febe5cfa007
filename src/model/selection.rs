//! Section/course/instructor inclusion and exclusion handlers (spec §4.2
//! "Selection filters").

use cp_sat::builder::LinearExpr;

use crate::constraint::{ConstraintKind, Mode};
use crate::error::Result;
use crate::model::context::ModelContext;

pub fn include_course(ctx: &mut ModelContext, course_ids: &[String]) {
    for cid in course_ids {
        if ctx.is_completed(cid) {
            continue;
        }
        let expr = ctx.merged_x(cid, ctx.last);
        ctx.model.add_ge(expr.to_linear(), LinearExpr::from(1));
    }
}

pub fn exclude_course(ctx: &mut ModelContext, course_ids: &[String]) {
    for cid in course_ids {
        for s in 0..=ctx.last {
            if let Some(v) = ctx.x_var(cid, s) {
                ctx.model.add_eq(LinearExpr::from(v), LinearExpr::from(0));
            }
        }
    }
}

pub fn include_section(ctx: &mut ModelContext, section_ids: &[String]) {
    for rid in section_ids {
        let v = ctx.z_var(rid);
        ctx.model.add_eq(LinearExpr::from(v), LinearExpr::from(1));
    }
}

pub fn exclude_section(ctx: &mut ModelContext, section_ids: &[String]) {
    for rid in section_ids {
        let v = ctx.z_var(rid);
        ctx.model.add_eq(LinearExpr::from(v), LinearExpr::from(0));
    }
}

/// A pinned section both forces that section in and forbids every other
/// section of the same course in the same semester (spec §4.2
/// "pin_sections").
pub fn pin_sections(ctx: &mut ModelContext, section_ids: &[String]) {
    for rid in section_ids {
        let Some(section) = ctx.catalog.section(rid) else {
            continue;
        };
        let course_id = section.course_id.clone();
        let semester_index = section.semester_index;
        let siblings: Vec<String> = ctx
            .catalog
            .sections_of(&course_id)
            .iter()
            .filter(|r| {
                r.as_str() != rid.as_str()
                    && ctx
                        .catalog
                        .section(r)
                        .map(|s| s.semester_index == semester_index)
                        .unwrap_or(false)
            })
            .cloned()
            .collect();
        let v = ctx.z_var(rid);
        ctx.model.add_eq(LinearExpr::from(v), LinearExpr::from(1));
        for sibling in &siblings {
            let sv = ctx.z_var(sibling);
            ctx.model.add_eq(LinearExpr::from(sv), LinearExpr::from(0));
        }
    }
}

fn instructor_sections(ctx: &ModelContext, instructor_ids: &[String]) -> Vec<String> {
    ctx.catalog
        .sections_in(0)
        .iter()
        .filter(|rid| {
            ctx.catalog
                .section(rid)
                .and_then(|s| s.instructor_id.as_deref())
                .map(|i| instructor_ids.iter().any(|want| want == i))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Hard: require at least one matching section. Soft: reward each matching
/// `z[r]` with `+weight` on `tier` instead of forcing one in (spec §4.2
/// "include_instructor ... soft +weight on each matching z[r]").
pub fn include_instructor(ctx: &mut ModelContext, instructor_ids: &[String], mode: Mode, weight: f64, tier: &str) -> Result<()> {
    let rids = instructor_sections(ctx, instructor_ids);
    match mode {
        Mode::Hard => {
            let sum: LinearExpr = rids
                .iter()
                .map(|rid| LinearExpr::from(ctx.z_var(rid)))
                .fold(LinearExpr::from(0), |acc, e| acc + e);
            if !rids.is_empty() {
                ctx.model.add_ge(sum, LinearExpr::from(1));
            }
        }
        Mode::Soft => {
            for rid in &rids {
                let v = ctx.z_var(rid);
                ctx.objective.add_term(tier, v, weight)?;
            }
        }
    }
    Ok(())
}

/// Hard: forbid every matching section. Soft: penalize each matching `z[r]`
/// by `-weight` on `tier` (spec §4.2 "exclude_instructor ... forbid or
/// penalize").
pub fn exclude_instructor(ctx: &mut ModelContext, instructor_ids: &[String], mode: Mode, weight: f64, tier: &str) -> Result<()> {
    let rids = instructor_sections(ctx, instructor_ids);
    match mode {
        Mode::Hard => {
            for rid in &rids {
                let v = ctx.z_var(rid);
                ctx.model.add_eq(LinearExpr::from(v), LinearExpr::from(0));
            }
        }
        Mode::Soft => {
            for rid in &rids {
                let v = ctx.z_var(rid);
                ctx.objective.add_term(tier, v, -weight)?;
            }
        }
    }
    Ok(())
}

/// Dispatch point used by the handler table for the selection family of
/// [`ConstraintKind`]s; returns `false` for kinds it does not own.
pub fn apply(ctx: &mut ModelContext, kind: &ConstraintKind, mode: Mode, weight: f64, tier: &str) -> Result<bool> {
    match kind {
        ConstraintKind::IncludeCourse { course_ids } => include_course(ctx, course_ids),
        ConstraintKind::ExcludeCourse { course_ids } => exclude_course(ctx, course_ids),
        ConstraintKind::IncludeSection { section_ids } => include_section(ctx, section_ids),
        ConstraintKind::ExcludeSection { section_ids } => exclude_section(ctx, section_ids),
        ConstraintKind::PinSections { section_ids } => pin_sections(ctx, section_ids),
        ConstraintKind::IncludeInstructor { instructor_ids } => include_instructor(ctx, instructor_ids, mode, weight, tier)?,
        ConstraintKind::ExcludeInstructor { instructor_ids } => exclude_instructor(ctx, instructor_ids, mode, weight, tier)?,
        _ => return Ok(false),
    }
    Ok(true)
}
