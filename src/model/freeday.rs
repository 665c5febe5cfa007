//! "Keep at least N weekdays free" (spec §4.2 "free_day"), section-backed
//! so it only constrains semester 0 (spec §9).

use cp_sat::builder::LinearExpr;

use crate::constraint::Mode;
use crate::model::context::ModelContext;
use crate::time::Day;

pub fn free_day(ctx: &mut ModelContext, days: &[Day], count: u32, mode: Mode, weight: f64, tier: &str) -> crate::error::Result<()> {
    let rids = ctx.catalog.sections_in(0).to_vec();
    let mut free_vars = Vec::new();
    for day in days {
        let on_day: Vec<String> = rids
            .iter()
            .filter(|rid| {
                ctx.catalog
                    .section(rid)
                    .map(|s| s.slot.days.contains(day))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        let day_used = ctx.model.new_bool_var();
        if on_day.is_empty() {
            ctx.model.add_eq(LinearExpr::from(day_used.clone()), LinearExpr::from(0));
        } else {
            let sum: LinearExpr = on_day
                .iter()
                .map(|rid| LinearExpr::from(ctx.z_var(rid)))
                .fold(LinearExpr::from(0), |acc, e| acc + e);
            ctx.model.add_ge(sum.clone(), LinearExpr::from(day_used.clone()));
            for rid in &on_day {
                let v = ctx.z_var(rid);
                ctx.model.add_ge(LinearExpr::from(day_used.clone()), LinearExpr::from(v));
            }
        }
        let free = ctx.model.new_bool_var();
        ctx.model.add_eq(
            LinearExpr::from(free.clone()) + LinearExpr::from(day_used),
            LinearExpr::from(1),
        );
        free_vars.push(free);
    }

    match mode {
        Mode::Hard => {
            let sum: LinearExpr = free_vars
                .iter()
                .cloned()
                .map(LinearExpr::from)
                .fold(LinearExpr::from(0), |acc, e| acc + e);
            ctx.model.add_ge(sum, LinearExpr::from(count as i64));
        }
        Mode::Soft => {
            for v in free_vars {
                ctx.objective.add_term(tier, v, weight)?;
            }
        }
    }
    Ok(())
}
