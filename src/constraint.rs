//! Typed representation of the declarative constraint language (spec §3,
//! §4.2) and validation/dispatch of the flat, JSON-carried constraint list.
//!
//! Two layers live here:
//!
//! - [`ConstraintTree`]: the recursive boolean/counting sub-language (`And`,
//!   `Or`, `Not`, `When`, `Course`, `Group`, `Range`, `Attribute`), used to
//!   express a course's prerequisites and the graduation predicate (spec
//!   §4.2 "Prerequisites"/"Graduation").
//! - [`ConstraintKind`]: the closed set of top-level leaf kinds accepted from
//!   the wire format's `constraints` list (spec §4.2 dispatch table). Every
//!   kind not in this set is a validation error — there is no open dispatch.

use std::collections::HashMap;

use serde::Deserialize;

use crate::contract::{ConstraintSpec, CourseId, GroupName, HubTag, InstructorId, SectionId};
use crate::error::{Result, SolverError};
use crate::time::{parse_days, parse_hhmm, Day};

/// The recursive boolean/counting sub-language. Carried in JSON as a tagged
/// enum (`{"type": "and", "children": [...]}`, etc.).
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintTree {
    When { offset: i64, child: Box<ConstraintTree> },
    And { children: Vec<ConstraintTree> },
    Or { children: Vec<ConstraintTree> },
    Not { child: Box<ConstraintTree> },
    Course { course_id: CourseId },
    Group { group_id: GroupName, count: u32 },
    Range {
        school: String,
        department: String,
        min_num: u32,
        max_num: u32,
        count: u32,
    },
    Attribute { key: String, value: String },
}

/// Hard constraints are mandatory; soft constraints contribute a weighted
/// term to a named objective tier (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Hard,
    Soft,
}

impl Mode {
    fn parse(raw: Option<&str>) -> Mode {
        match raw {
            Some("soft") => Mode::Soft,
            _ => Mode::Hard,
        }
    }
}

/// Degenerate forms of a section filter, and everything else the dispatch
/// table names (spec §4.2).
#[derive(Debug, Clone)]
pub enum ConstraintKind {
    IncludeCourse { course_ids: Vec<CourseId> },
    ExcludeCourse { course_ids: Vec<CourseId> },
    IncludeSection { section_ids: Vec<SectionId> },
    ExcludeSection { section_ids: Vec<SectionId> },
    PinSections { section_ids: Vec<SectionId> },
    IncludeInstructor { instructor_ids: Vec<InstructorId> },
    ExcludeInstructor { instructor_ids: Vec<InstructorId> },
    SectionFilter {
        days_any: Option<Vec<Day>>,
        instructors_any: Option<Vec<InstructorId>>,
        start_before: Option<u32>,
        end_after: Option<u32>,
    },
    AllowedDays { days: Vec<Day> },
    DisallowedDays { days: Vec<Day> },
    EarliestStart { minute: u32 },
    LatestEnd { minute: u32 },
    BlockTimeWindow {
        days: Vec<Day>,
        start_minute: u32,
        end_minute: u32,
    },
    MaxCoursesPerSemester { k: u32, semesters: Option<Vec<String>> },
    MinCoursesPerSemester { m: u32, semesters: Option<Vec<String>> },
    TargetCoursesPerSemester { k: u32, semesters: Option<Vec<String>> },
    RequireGroupCounts {
        groups: Vec<GroupName>,
        op: CountOp,
        count: u32,
    },
    HubTargets { overrides: HashMap<HubTag, u32> },
    EnforceOrdering { before: CourseId, after: CourseId },
    FreeDay { days: Vec<Day>, count: u32 },
    BookmarkedBonus { course_ids: Vec<CourseId>, bonus: f64 },
    ProfessorRatingWeight { alpha: f64, threshold: f64 },
    LexicographicPriority { tiers: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountOp {
    AtLeast,
    AtMost,
    Exact,
}

impl CountOp {
    fn parse(raw: &str) -> Result<CountOp> {
        match raw {
            "at_least" => Ok(CountOp::AtLeast),
            "at_most" => Ok(CountOp::AtMost),
            "exact" => Ok(CountOp::Exact),
            other => Err(SolverError::invalid(format!("unknown count op: {other}"))),
        }
    }
}

/// A fully parsed, typed top-level constraint.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub id: String,
    pub mode: Mode,
    pub weight: f64,
    pub tier: String,
    pub kind: ConstraintKind,
}

/// Hard-only kinds: a `soft` mode on one of these is a validation error
/// rather than a silent downgrade, so authors notice the mistake.
fn is_hard_only(kind: &str) -> bool {
    matches!(
        kind,
        "include_course"
            | "exclude_course"
            | "include_section"
            | "exclude_section"
            | "pin_sections"
            | "enforce_ordering"
            | "lexicographic_priority"
    )
}

pub fn parse_constraints(specs: &[ConstraintSpec]) -> Result<Vec<Constraint>> {
    specs.iter().map(parse_one).collect()
}

fn parse_one(spec: &ConstraintSpec) -> Result<Constraint> {
    let p = &spec.payload;
    let mode_raw = spec.mode.as_deref();
    if mode_raw == Some("soft") && is_hard_only(&spec.kind) {
        return Err(SolverError::invalid(format!(
            "constraint {}: kind {} does not accept mode=soft",
            spec.id, spec.kind
        )));
    }
    let mode = Mode::parse(mode_raw);
    let weight = spec.weight.unwrap_or(1.0);
    let tier = spec.tier.clone().unwrap_or_else(|| "comfort".to_string());

    let kind = match spec.kind.as_str() {
        "include_course" => ConstraintKind::IncludeCourse {
            course_ids: string_list(p, "course_ids")?,
        },
        "exclude_course" => ConstraintKind::ExcludeCourse {
            course_ids: string_list(p, "course_ids")?,
        },
        "include_section" => ConstraintKind::IncludeSection {
            section_ids: string_list(p, "section_ids")?,
        },
        "exclude_section" => ConstraintKind::ExcludeSection {
            section_ids: string_list(p, "section_ids")?,
        },
        "pin_sections" => ConstraintKind::PinSections {
            section_ids: string_list(p, "section_ids")?,
        },
        "include_instructor" => ConstraintKind::IncludeInstructor {
            instructor_ids: string_list(p, "instructor_ids")?,
        },
        "exclude_instructor" => ConstraintKind::ExcludeInstructor {
            instructor_ids: string_list(p, "instructor_ids")?,
        },
        "section_filter" => ConstraintKind::SectionFilter {
            days_any: optional_day_list(p, "days_any")?,
            instructors_any: optional_string_list(p, "instructors_any")?,
            start_before: optional_time(p, "start_before")?,
            end_after: optional_time(p, "end_after")?,
        },
        "allowed_days" => ConstraintKind::AllowedDays {
            days: day_list(p, "days")?,
        },
        "disallowed_days" => ConstraintKind::DisallowedDays {
            days: day_list(p, "days")?,
        },
        "earliest_start" => ConstraintKind::EarliestStart {
            minute: time_field(p, "time")?,
        },
        "latest_end" => ConstraintKind::LatestEnd {
            minute: time_field(p, "time")?,
        },
        "block_time_window" => ConstraintKind::BlockTimeWindow {
            days: optional_day_list(p, "days")?.unwrap_or_else(|| vec![Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri]),
            start_minute: time_field(p, "start")?,
            end_minute: time_field(p, "end")?,
        },
        "max_courses_per_semester" => ConstraintKind::MaxCoursesPerSemester {
            k: u32_field(p, "k")?,
            semesters: optional_string_list(p, "semesters")?,
        },
        "min_courses_per_semester" => ConstraintKind::MinCoursesPerSemester {
            m: u32_field(p, "m")?,
            semesters: optional_string_list(p, "semesters")?,
        },
        "target_courses_per_semester" => ConstraintKind::TargetCoursesPerSemester {
            k: u32_field(p, "k")?,
            semesters: optional_string_list(p, "semesters")?,
        },
        "require_group_counts" => {
            let groups = match p.get("groups").and_then(|v| v.as_array()) {
                Some(arr) => arr
                    .iter()
                    .map(|v| v.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| SolverError::invalid("require_group_counts.groups must be strings"))?,
                None => vec![string_field(p, "group")?],
            };
            let op = CountOp::parse(p.get("op").and_then(|v| v.as_str()).unwrap_or("at_least"))?;
            ConstraintKind::RequireGroupCounts {
                groups,
                op,
                count: u32_field(p, "count")?,
            }
        }
        "hub_targets" => {
            let mut overrides = HashMap::new();
            if let Some(obj) = p.as_object() {
                for (k, v) in obj {
                    if let Some(n) = v.as_u64() {
                        overrides.insert(k.clone(), n as u32);
                    }
                }
            }
            ConstraintKind::HubTargets { overrides }
        }
        "enforce_ordering" => ConstraintKind::EnforceOrdering {
            before: string_field(p, "before")?,
            after: string_field(p, "after")?,
        },
        "free_day" => ConstraintKind::FreeDay {
            days: optional_day_list(p, "days")?.unwrap_or_else(|| vec![Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri]),
            count: p.get("count").and_then(|v| v.as_u64()).unwrap_or(1) as u32,
        },
        "bookmarked_bonus" => ConstraintKind::BookmarkedBonus {
            course_ids: optional_string_list(p, "course_ids")?.unwrap_or_default(),
            bonus: p.get("bonus").and_then(|v| v.as_f64()).unwrap_or(1.0),
        },
        "professor_rating_weight" => ConstraintKind::ProfessorRatingWeight {
            alpha: p.get("alpha").and_then(|v| v.as_f64()).unwrap_or(1.0),
            threshold: p.get("threshold").and_then(|v| v.as_f64()).unwrap_or(0.0),
        },
        "lexicographic_priority" => ConstraintKind::LexicographicPriority {
            tiers: optional_string_list(p, "tiers")?.unwrap_or_default(),
        },
        other => {
            return Err(SolverError::invalid(format!("unknown constraint kind: {other}")));
        }
    };

    Ok(Constraint {
        id: spec.id.clone(),
        mode,
        weight,
        tier,
        kind,
    })
}

fn string_field(p: &serde_json::Value, key: &str) -> Result<String> {
    p.get(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| SolverError::invalid(format!("payload missing string field: {key}")))
}

fn u32_field(p: &serde_json::Value, key: &str) -> Result<u32> {
    p.get(key)
        .and_then(|v| v.as_u64())
        .map(|v| v as u32)
        .ok_or_else(|| SolverError::invalid(format!("payload missing integer field: {key}")))
}

fn time_field(p: &serde_json::Value, key: &str) -> Result<u32> {
    let raw = string_field(p, key)?;
    parse_hhmm(&raw)
}

fn optional_time(p: &serde_json::Value, key: &str) -> Result<Option<u32>> {
    match p.get(key).and_then(|v| v.as_str()) {
        Some(raw) => Ok(Some(parse_hhmm(raw)?)),
        None => Ok(None),
    }
}

fn string_list(p: &serde_json::Value, key: &str) -> Result<Vec<String>> {
    optional_string_list(p, key)?.ok_or_else(|| SolverError::invalid(format!("payload missing list field: {key}")))
}

fn optional_string_list(p: &serde_json::Value, key: &str) -> Result<Option<Vec<String>>> {
    let Some(v) = p.get(key) else {
        return Ok(None);
    };
    let arr = v
        .as_array()
        .ok_or_else(|| SolverError::invalid(format!("payload field {key} must be a list")))?;
    let strings = arr
        .iter()
        .map(|x| x.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| SolverError::invalid(format!("payload field {key} must be a list of strings")))?;
    Ok(Some(strings))
}

fn day_list(p: &serde_json::Value, key: &str) -> Result<Vec<Day>> {
    optional_day_list(p, key)?.ok_or_else(|| SolverError::invalid(format!("payload missing list field: {key}")))
}

fn optional_day_list(p: &serde_json::Value, key: &str) -> Result<Option<Vec<Day>>> {
    match optional_string_list(p, key)? {
        Some(raw) => Ok(Some(parse_days(&raw)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(kind: &str, payload: serde_json::Value) -> ConstraintSpec {
        ConstraintSpec {
            id: "c1".to_string(),
            kind: kind.to_string(),
            mode: None,
            weight: None,
            tier: None,
            payload,
        }
    }

    #[test]
    fn unknown_kind_rejected() {
        let specs = vec![spec("frobnicate", json!({}))];
        assert!(parse_constraints(&specs).is_err());
    }

    #[test]
    fn hard_only_kind_rejects_soft_mode() {
        let mut s = spec("include_course", json!({"course_ids": ["X"]}));
        s.mode = Some("soft".to_string());
        assert!(parse_constraints(&[s]).is_err());
    }

    #[test]
    fn parses_disallowed_days() {
        let specs = vec![spec("disallowed_days", json!({"days": ["Fri"]}))];
        let parsed = parse_constraints(&specs).unwrap();
        match &parsed[0].kind {
            ConstraintKind::DisallowedDays { days } => assert_eq!(days, &vec![Day::Fri]),
            _ => panic!("wrong kind"),
        }
    }

    #[test]
    fn parses_require_group_counts_union() {
        let specs = vec![spec(
            "require_group_counts",
            json!({"groups": ["A", "B", "C", "D"], "op": "at_least", "count": 15}),
        )];
        let parsed = parse_constraints(&specs).unwrap();
        match &parsed[0].kind {
            ConstraintKind::RequireGroupCounts { groups, op, count } => {
                assert_eq!(groups.len(), 4);
                assert_eq!(*op, CountOp::AtLeast);
                assert_eq!(*count, 15);
            }
            _ => panic!("wrong kind"),
        }
    }
}
