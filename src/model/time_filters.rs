//! Section-shape and time-of-day filters (spec §4.2 "Time filters"). All of
//! these constrain `z[r]` directly over semester-0 sections — they have no
//! meaning for the section-less future semesters. Hard mode forbids a
//! matching section outright; soft mode instead penalizes choosing it,
//! folding a weighted term into the named objective tier (spec §4.2
//! "section_filter ... hard forbids matching sections, soft penalizes").

use cp_sat::builder::LinearExpr;

use crate::catalog::Section;
use crate::constraint::{ConstraintKind, Mode};
use crate::error::Result;
use crate::model::context::ModelContext;
use crate::time::Day;

fn forbid_section(ctx: &mut ModelContext, rid: &str) {
    let v = ctx.z_var(rid);
    ctx.model.add_eq(LinearExpr::from(v), LinearExpr::from(0));
}

fn semester0_sections(ctx: &ModelContext) -> Vec<String> {
    ctx.catalog.sections_in(0).to_vec()
}

/// Hard: forbid every section in `triggered`. Soft: penalize choosing one by
/// subtracting `weight` from `tier` for its `z[r]` (spec §4.2 "soft ...
/// penalizes").
fn forbid_or_penalize(ctx: &mut ModelContext, triggered: &[String], mode: Mode, weight: f64, tier: &str) -> Result<()> {
    match mode {
        Mode::Hard => {
            for rid in triggered {
                forbid_section(ctx, rid);
            }
        }
        Mode::Soft => {
            for rid in triggered {
                let v = ctx.z_var(rid);
                ctx.objective.add_term(tier, v, -weight)?;
            }
        }
    }
    Ok(())
}

pub fn section_filter(
    ctx: &mut ModelContext,
    days_any: &Option<Vec<Day>>,
    instructors_any: &Option<Vec<String>>,
    start_before: Option<u32>,
    end_after: Option<u32>,
    mode: Mode,
    weight: f64,
    tier: &str,
) -> Result<()> {
    let rids = semester0_sections(ctx);
    let triggered: Vec<String> = rids
        .into_iter()
        .filter(|rid| {
            ctx.catalog
                .section(rid)
                .map(|s| section_matches_filter(s, days_any, instructors_any, start_before, end_after))
                .unwrap_or(false)
        })
        .collect();
    forbid_or_penalize(ctx, &triggered, mode, weight, tier)
}

/// True iff the section falls on a day named in `days_any`, is taught by an
/// instructor named in `instructors_any`, starts before `start_before`, or
/// ends after `end_after` — the criteria `section_filter` forbids (spec
/// §4.2 "section_filter ... hard forbids matching sections"), matching the
/// same polarity as the degenerate forms (`disallowed_days`,
/// `earliest_start`, `latest_end`) below.
fn section_matches_filter(
    section: &Section,
    days_any: &Option<Vec<Day>>,
    instructors_any: &Option<Vec<String>>,
    start_before: Option<u32>,
    end_after: Option<u32>,
) -> bool {
    if let Some(days) = days_any {
        if section.slot.days.iter().any(|d| days.contains(d)) {
            return true;
        }
    }
    if let Some(instructors) = instructors_any {
        let matches = section
            .instructor_id
            .as_deref()
            .map(|i| instructors.iter().any(|want| want == i))
            .unwrap_or(false);
        if matches {
            return true;
        }
    }
    if let Some(before) = start_before {
        if section.slot.start_minute < before {
            return true;
        }
    }
    if let Some(after) = end_after {
        if section.slot.end_minute > after {
            return true;
        }
    }
    false
}

pub fn allowed_days(ctx: &mut ModelContext, days: &[Day], mode: Mode, weight: f64, tier: &str) -> Result<()> {
    let rids = semester0_sections(ctx);
    let triggered: Vec<String> = rids
        .into_iter()
        .filter(|rid| {
            ctx.catalog
                .section(rid)
                .map(|s| !s.slot.days.iter().all(|d| days.contains(d)))
                .unwrap_or(false)
        })
        .collect();
    forbid_or_penalize(ctx, &triggered, mode, weight, tier)
}

pub fn disallowed_days(ctx: &mut ModelContext, days: &[Day], mode: Mode, weight: f64, tier: &str) -> Result<()> {
    let rids = semester0_sections(ctx);
    let triggered: Vec<String> = rids
        .into_iter()
        .filter(|rid| {
            ctx.catalog
                .section(rid)
                .map(|s| s.slot.days.iter().any(|d| days.contains(d)))
                .unwrap_or(false)
        })
        .collect();
    forbid_or_penalize(ctx, &triggered, mode, weight, tier)
}

pub fn earliest_start(ctx: &mut ModelContext, minute: u32, mode: Mode, weight: f64, tier: &str) -> Result<()> {
    let rids = semester0_sections(ctx);
    let triggered: Vec<String> = rids
        .into_iter()
        .filter(|rid| {
            ctx.catalog
                .section(rid)
                .map(|s| s.slot.start_minute < minute)
                .unwrap_or(false)
        })
        .collect();
    forbid_or_penalize(ctx, &triggered, mode, weight, tier)
}

pub fn latest_end(ctx: &mut ModelContext, minute: u32, mode: Mode, weight: f64, tier: &str) -> Result<()> {
    let rids = semester0_sections(ctx);
    let triggered: Vec<String> = rids
        .into_iter()
        .filter(|rid| {
            ctx.catalog
                .section(rid)
                .map(|s| s.slot.end_minute > minute)
                .unwrap_or(false)
        })
        .collect();
    forbid_or_penalize(ctx, &triggered, mode, weight, tier)
}

/// Forbids (or, soft, penalizes) any section whose meeting overlaps a
/// blocked weekday/time window (spec §4.2 "block_time_window") — e.g.
/// reserving Tuesday/Thursday mornings for a commitment outside the
/// schedule.
pub fn block_time_window(
    ctx: &mut ModelContext,
    days: &[Day],
    start_minute: u32,
    end_minute: u32,
    mode: Mode,
    weight: f64,
    tier: &str,
) -> Result<()> {
    let rids = semester0_sections(ctx);
    let triggered: Vec<String> = rids
        .into_iter()
        .filter(|rid| {
            ctx.catalog
                .section(rid)
                .map(|s| {
                    let overlaps_day = s.slot.days.iter().any(|d| days.contains(d));
                    let overlaps_time = s.slot.start_minute < end_minute && start_minute < s.slot.end_minute;
                    overlaps_day && overlaps_time
                })
                .unwrap_or(false)
        })
        .collect();
    forbid_or_penalize(ctx, &triggered, mode, weight, tier)
}

pub fn apply(ctx: &mut ModelContext, kind: &ConstraintKind, mode: Mode, weight: f64, tier: &str) -> Result<bool> {
    match kind {
        ConstraintKind::SectionFilter {
            days_any,
            instructors_any,
            start_before,
            end_after,
        } => section_filter(ctx, days_any, instructors_any, *start_before, *end_after, mode, weight, tier)?,
        ConstraintKind::AllowedDays { days } => allowed_days(ctx, days, mode, weight, tier)?,
        ConstraintKind::DisallowedDays { days } => disallowed_days(ctx, days, mode, weight, tier)?,
        ConstraintKind::EarliestStart { minute } => earliest_start(ctx, *minute, mode, weight, tier)?,
        ConstraintKind::LatestEnd { minute } => latest_end(ctx, *minute, mode, weight, tier)?,
        ConstraintKind::BlockTimeWindow {
            days,
            start_minute,
            end_minute,
        } => block_time_window(ctx, days, *start_minute, *end_minute, mode, weight, tier)?,
        _ => return Ok(false),
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TimeSlot;

    fn section(days: &[Day], start: u32, end: u32, instructor: Option<&str>) -> Section {
        Section {
            rid: "r".to_string(),
            course_id: "X".to_string(),
            semester_index: 0,
            slot: TimeSlot::new(days.to_vec(), start, end).unwrap(),
            instructor_id: instructor.map(str::to_string),
            rating: None,
        }
    }

    /// `days_any: ["Fri"]` must match (and so forbid) a Friday section, the
    /// same polarity as `disallowed_days: ["Fri"]` — not keep only Friday
    /// sections, which was the prior, inverted behavior.
    #[test]
    fn days_any_matches_the_named_day_rather_than_its_complement() {
        let friday = section(&[Day::Fri], 600, 660, None);
        let tuesday = section(&[Day::Tue], 600, 660, None);
        assert!(section_matches_filter(&friday, &Some(vec![Day::Fri]), &None, None, None));
        assert!(!section_matches_filter(&tuesday, &Some(vec![Day::Fri]), &None, None, None));
    }

    #[test]
    fn instructors_any_matches_the_named_instructor() {
        let taught_by_kim = section(&[Day::Mon], 600, 660, Some("Kim"));
        let taught_by_lee = section(&[Day::Mon], 600, 660, Some("Lee"));
        let ids = vec!["Kim".to_string()];
        assert!(section_matches_filter(&taught_by_kim, &None, &Some(ids.clone()), None, None));
        assert!(!section_matches_filter(&taught_by_lee, &None, &Some(ids), None, None));
    }

    /// `start_before` forbids a section that starts earlier than the cutoff
    /// (the same polarity as `earliest_start`), not one that starts at or
    /// after it.
    #[test]
    fn start_before_matches_an_earlier_start() {
        let early = section(&[Day::Mon], 480, 540, None);
        let late = section(&[Day::Mon], 600, 660, None);
        assert!(section_matches_filter(&early, &None, &None, Some(540), None));
        assert!(!section_matches_filter(&late, &None, &None, Some(540), None));
    }

    /// `end_after` forbids a section that ends later than the cutoff (the
    /// same polarity as `latest_end`), not one that ends at or before it.
    #[test]
    fn end_after_matches_a_later_end() {
        let late = section(&[Day::Mon], 900, 990, None);
        let early = section(&[Day::Mon], 600, 660, None);
        assert!(section_matches_filter(&late, &None, &None, None, Some(960)));
        assert!(!section_matches_filter(&early, &None, &None, None, Some(960)));
    }

    #[test]
    fn no_criteria_present_never_matches() {
        let any = section(&[Day::Fri], 0, 10, None);
        assert!(!section_matches_filter(&any, &None, &None, None, None));
    }
}
