//! Pre-flight validation layer (spec §7): shape/reference checks that must
//! fail before any solver state is built, so a bad request never burns
//! model-construction or solve time.

use crate::catalog::CatalogIndex;
use crate::constraint::{Constraint, ConstraintKind};
use crate::contract::ScheduleRequest;
use crate::error::{Result, SolverError};

/// Conservative ceiling on `|x| + |z|` variables, protecting the service
/// from pathological requests (spec §5 "Resource policy").
const DEFAULT_VARIABLE_CEILING: usize = 200_000;

pub fn validate(input: &ScheduleRequest, catalog: &CatalogIndex, constraints: &[Constraint]) -> Result<()> {
    check_reference_integrity(input, catalog, constraints)?;
    check_model_size(catalog, input)?;
    Ok(())
}

/// Every constraint referencing a course/section/group/hub by id must
/// resolve — except counting predicates over groups/hubs, whose semantics
/// treat an absent or empty set as unsatisfiable rather than an error
/// (spec §7 "ReferenceError...degraded to a warning").
fn check_reference_integrity(input: &ScheduleRequest, catalog: &CatalogIndex, constraints: &[Constraint]) -> Result<()> {
    for c in constraints {
        match &c.kind {
            ConstraintKind::IncludeCourse { course_ids } | ConstraintKind::ExcludeCourse { course_ids } => {
                for cid in course_ids {
                    if !catalog.has_course(cid) && !input.completed_courses.contains(cid) {
                        return Err(SolverError::reference(Some(&c.id), "course", cid.clone()));
                    }
                }
            }
            ConstraintKind::IncludeSection { section_ids }
            | ConstraintKind::ExcludeSection { section_ids }
            | ConstraintKind::PinSections { section_ids } => {
                for rid in section_ids {
                    if catalog.section(rid).is_none() {
                        return Err(SolverError::reference(Some(&c.id), "section", rid.clone()));
                    }
                    // z[r] only exists as a decision variable for nearest-semester
                    // sections (spec §3); a reference to a later-semester section
                    // has no selectable variable behind it.
                    if !catalog.is_nearest_semester_section(rid) {
                        return Err(SolverError::reference(
                            Some(&c.id),
                            "section (not offered in nearest semester)",
                            rid.clone(),
                        ));
                    }
                }
            }
            ConstraintKind::EnforceOrdering { before, after } => {
                if !catalog.has_course(before) {
                    return Err(SolverError::reference(Some(&c.id), "course", before.clone()));
                }
                if !catalog.has_course(after) {
                    return Err(SolverError::reference(Some(&c.id), "course", after.clone()));
                }
            }
            ConstraintKind::RequireGroupCounts { groups, .. } => {
                for g in groups {
                    if !catalog.has_group(g) {
                        log::warn!("constraint {}: group '{g}' is unknown; treated as empty", c.id);
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Rough upper bound on the variable count the Model Builder would
/// allocate, checked before building so an oversized request fails fast
/// (spec §5 "The builder rejects inputs whose resulting model exceeds a
/// configurable ceiling").
fn check_model_size(catalog: &CatalogIndex, input: &ScheduleRequest) -> Result<()> {
    let num_semesters = input.semesters.len();
    let num_courses = catalog.course_ids.len();
    let estimate = catalog.sections.len() + num_courses * num_semesters;
    if estimate > DEFAULT_VARIABLE_CEILING {
        return Err(SolverError::ModelTooLarge {
            dimension: "x+z variables".to_string(),
            actual: estimate,
            ceiling: DEFAULT_VARIABLE_CEILING,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::parse_constraints;
    use crate::contract::{ConstraintSpec, Relation};
    use std::collections::{HashMap, HashSet};

    fn relation(rid: &str, class_id: &str, semester: &str, days: &[&str], start: u32, end: u32) -> Relation {
        Relation {
            rid: rid.to_string(),
            class_id: class_id.to_string(),
            semester: semester.to_string(),
            days: days.iter().map(|d| d.to_string()).collect(),
            start_minute: start,
            end_minute: end,
            instructor_id: None,
            rating: None,
        }
    }

    fn request(relations: Vec<Relation>, semesters: &[&str], constraints: Vec<ConstraintSpec>) -> ScheduleRequest {
        ScheduleRequest {
            relations,
            conflicts: None,
            groups: HashMap::new(),
            hubs: Default::default(),
            semesters: semesters.iter().map(|s| s.to_string()).collect(),
            bookmarks: HashSet::new(),
            completed_courses: HashSet::new(),
            course_scores: HashMap::new(),
            num_courses_per_semester: 4,
            constraints,
            time_limit_sec: 5.0,
            scale: 1000,
            tier_order: None,
            prerequisites: HashMap::new(),
            graduation: None,
            num_search_workers: None,
            random_seed: None,
        }
    }

    fn spec(id: &str, kind: &str, payload: serde_json::Value) -> ConstraintSpec {
        ConstraintSpec {
            id: id.to_string(),
            kind: kind.to_string(),
            mode: None,
            weight: None,
            tier: None,
            payload,
        }
    }

    #[test]
    fn pin_sections_rejects_a_later_semester_section() {
        let req = request(
            vec![
                relation("r0", "X", "F25", &["Mon"], 600, 660),
                relation("r1", "X", "S26", &["Tue"], 600, 660),
            ],
            &["F25", "S26"],
            vec![spec("pin", "pin_sections", serde_json::json!({"section_ids": ["r1"]}))],
        );
        let catalog = CatalogIndex::build(&req).unwrap();
        let constraints = parse_constraints(&req.constraints).unwrap();
        assert!(validate(&req, &catalog, &constraints).is_err());
    }

    #[test]
    fn pin_sections_accepts_a_nearest_semester_section() {
        let req = request(
            vec![
                relation("r0", "X", "F25", &["Mon"], 600, 660),
                relation("r1", "X", "S26", &["Tue"], 600, 660),
            ],
            &["F25", "S26"],
            vec![spec("pin", "pin_sections", serde_json::json!({"section_ids": ["r0"]}))],
        );
        let catalog = CatalogIndex::build(&req).unwrap();
        let constraints = parse_constraints(&req.constraints).unwrap();
        assert!(validate(&req, &catalog, &constraints).is_ok());
    }
}
