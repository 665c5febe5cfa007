//! Pure objective-shaping handlers: no new hard constraints, only weighted
//! terms folded into [`crate::objective::ObjectiveManager`] tiers (spec
//! §4.2 "Objective shaping").

use crate::constraint::ConstraintKind;
use crate::error::Result;
use crate::model::context::ModelContext;

/// A flat bonus for taking any of the listed courses (spec §4.2
/// "bookmarked_bonus").
pub fn bookmarked_bonus(ctx: &mut ModelContext, course_ids: &[String], bonus: f64) -> Result<()> {
    let last = ctx.last;
    for cid in course_ids {
        let expr = ctx.merged_x(cid, last);
        if expr.is_const_false() {
            continue;
        }
        add_linear_as_term(ctx, "bookmarks", expr, bonus)?;
    }
    Ok(())
}

/// Weights each semester-0 section by its rating premium above `threshold`,
/// leaving sections at or below `threshold` out of the sum entirely (spec
/// §4.2 "professor_rating_weight": `+(rating - threshold)*alpha`) — a
/// section exactly at `threshold` contributes nothing, and the term is
/// measured above the threshold rather than by the raw rating.
pub fn professor_rating_weight(ctx: &mut ModelContext, alpha: f64, threshold: f64) -> Result<()> {
    let rids: Vec<String> = ctx.catalog.sections_in(0).to_vec();
    for rid in rids {
        let Some(section) = ctx.catalog.section(&rid) else { continue };
        let Some(rating) = section.rating else { continue };
        if rating <= threshold {
            continue;
        }
        let v = ctx.z_var(&rid);
        ctx.objective.add_term("comfort", v, alpha * (rating - threshold))?;
    }
    Ok(())
}

/// Overrides the tier priority order wholesale (spec §4.2
/// "lexicographic_priority") — the last one seen in the constraint list
/// wins, matching flat-list evaluation order.
pub fn lexicographic_priority(ctx: &mut ModelContext, tiers: &[String]) {
    ctx.objective.set_tier_order(tiers.to_vec());
}

/// Folds each course's optional baseline `score` into the `comfort` tier,
/// once per course regardless of which explicit constraints are present
/// (spec §3 "Course.score").
pub fn apply_course_scores(ctx: &mut ModelContext, scores: &std::collections::HashMap<String, f64>) -> Result<()> {
    for (cid, score) in scores {
        if *score == 0.0 {
            continue;
        }
        if let Some(var) = ctx.x_var(cid, 0) {
            ctx.objective.add_term("comfort", var, *score)?;
        }
    }
    Ok(())
}

fn add_linear_as_term(ctx: &mut ModelContext, tier: &str, expr: crate::model::context::ReifExpr, weight: f64) -> Result<()> {
    use cp_sat::builder::LinearExpr;
    let v = ctx.model.new_bool_var();
    ctx.model.add_eq(LinearExpr::from(v.clone()), expr.to_linear());
    ctx.objective.add_term(tier, v, weight)
}

pub fn apply(ctx: &mut ModelContext, kind: &ConstraintKind) -> Result<bool> {
    match kind {
        ConstraintKind::BookmarkedBonus { course_ids, bonus } => {
            bookmarked_bonus(ctx, course_ids, *bonus)?;
        }
        ConstraintKind::ProfessorRatingWeight { alpha, threshold } => {
            professor_rating_weight(ctx, *alpha, *threshold)?;
        }
        ConstraintKind::LexicographicPriority { tiers } => {
            lexicographic_priority(ctx, tiers);
        }
        _ => return Ok(false),
    }
    Ok(true)
}
