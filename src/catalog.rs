//! Normalizes the input contract into O(1) lookup tables (spec §4.1).
//!
//! Catalog Index entities are constructed once, at model-build time, and are
//! immutable thereafter — nothing here mutates after [`CatalogIndex::build`]
//! returns.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::contract::{CourseId, Hubs, Relation, ScheduleRequest, SectionId};
use crate::error::{Result, SolverError};
use crate::time::{parse_days, TimeSlot};

/// A single scheduled offering of a course in a semester.
#[derive(Debug, Clone)]
pub struct Section {
    pub rid: SectionId,
    pub course_id: CourseId,
    /// Index into [`CatalogIndex::semesters`], or `0` ("nearest") in
    /// practice — only semester-0 sections are ever enumerated as decision
    /// variables (spec §4.3 "Completed courses"/Non-goals).
    pub semester_index: usize,
    pub slot: TimeSlot,
    pub instructor_id: Option<String>,
    pub rating: Option<f64>,
}

/// Canonical `school dept number` triple parsed from a course id rendered as
/// `"CAS CS 320"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseCode {
    pub school: String,
    pub department: String,
    pub number: u32,
}

impl CourseCode {
    /// Parse the canonical rendering. Non-parseable ids (e.g. missing a
    /// numeric catalog number) simply never match a [`Constraint::Range`],
    /// rather than erroring — only constraints whose semantics require
    /// existence error out (spec §4.1 "Guarantees").
    pub fn parse(course_id: &str) -> Option<CourseCode> {
        let mut parts = course_id.split_whitespace();
        let school = parts.next()?.to_string();
        let department = parts.next()?.to_string();
        let number_token = parts.next()?;
        let digits: String = number_token.chars().take_while(|c| c.is_ascii_digit()).collect();
        let number: u32 = digits.parse().ok()?;
        Some(CourseCode {
            school,
            department,
            number,
        })
    }
}

pub struct CatalogIndex {
    pub semesters: Vec<String>,
    pub sections: HashMap<SectionId, Section>,
    pub course_ids: HashSet<CourseId>,
    sections_by_course: HashMap<CourseId, Vec<SectionId>>,
    sections_by_semester: Vec<Vec<SectionId>>,
    groups: HashMap<String, HashSet<CourseId>>,
    hubs: Hubs,
    conflicts: Vec<(SectionId, SectionId)>,
}

impl CatalogIndex {
    pub fn build(input: &ScheduleRequest) -> Result<CatalogIndex> {
        if input.semesters.is_empty() {
            return Err(SolverError::invalid("semesters list must not be empty"));
        }
        let semester_order: HashMap<&str, usize> = input
            .semesters
            .iter()
            .enumerate()
            .map(|(i, s)| (s.as_str(), i))
            .collect();

        let mut sections = HashMap::new();
        let mut sections_by_course: HashMap<CourseId, Vec<SectionId>> = HashMap::new();
        let mut sections_by_semester: Vec<Vec<SectionId>> = vec![Vec::new(); input.semesters.len()];
        let mut course_ids = HashSet::new();

        for rel in &input.relations {
            if sections.contains_key(&rel.rid) {
                return Err(SolverError::invalid(format!("duplicate section id: {}", rel.rid)));
            }
            let semester_index = *semester_order.get(rel.semester.as_str()).ok_or_else(|| {
                SolverError::invalid(format!(
                    "relation {} references unknown semester {}",
                    rel.rid, rel.semester
                ))
            })?;
            let days = parse_days(&rel.days)?;
            let slot = TimeSlot::new(days, rel.start_minute, rel.end_minute)?;

            course_ids.insert(rel.class_id.clone());
            sections_by_course
                .entry(rel.class_id.clone())
                .or_default()
                .push(rel.rid.clone());
            sections_by_semester[semester_index].push(rel.rid.clone());

            sections.insert(
                rel.rid.clone(),
                Section {
                    rid: rel.rid.clone(),
                    course_id: rel.class_id.clone(),
                    semester_index,
                    slot,
                    instructor_id: rel.instructor_id.clone(),
                    rating: rel.rating,
                },
            );
        }

        debug!(
            "catalog: {} sections across {} courses and {} semesters",
            sections.len(),
            course_ids.len(),
            input.semesters.len()
        );

        let conflicts = match &input.conflicts {
            Some(explicit) => explicit.clone(),
            None => Self::compute_conflicts(&sections, &sections_by_semester),
        };

        Ok(CatalogIndex {
            semesters: input.semesters.clone(),
            sections,
            course_ids,
            sections_by_course,
            sections_by_semester,
            groups: input.groups.clone(),
            hubs: input.hubs.clone(),
            conflicts,
        })
    }

    /// Sweep every semester's sections, sorted by `(weekday, start, end, id)`,
    /// and emit every conflicting pair once (spec §4.1 "Conflict
    /// computation").
    fn compute_conflicts(
        sections: &HashMap<SectionId, Section>,
        sections_by_semester: &[Vec<SectionId>],
    ) -> Vec<(SectionId, SectionId)> {
        let mut conflicts = Vec::new();
        for rids in sections_by_semester {
            let mut ordered: Vec<&SectionId> = rids.iter().collect();
            ordered.sort_by(|a, b| {
                let sa = &sections[*a].slot;
                let sb = &sections[*b].slot;
                let day_a = sa.days.iter().min().copied();
                let day_b = sb.days.iter().min().copied();
                day_a
                    .cmp(&day_b)
                    .then(sa.start_minute.cmp(&sb.start_minute))
                    .then(sa.end_minute.cmp(&sb.end_minute))
                    .then(a.cmp(b))
            });
            for i in 0..ordered.len() {
                for j in (i + 1)..ordered.len() {
                    let (ri, rj) = (ordered[i], ordered[j]);
                    if sections[ri].slot.conflicts_with(&sections[rj].slot) {
                        conflicts.push((ri.clone(), rj.clone()));
                    }
                }
            }
        }
        trace!("computed {} conflict pairs from time slots", conflicts.len());
        conflicts
    }

    pub fn sections_of(&self, course_id: &str) -> &[SectionId] {
        self.sections_by_course
            .get(course_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn sections_in(&self, semester_index: usize) -> &[SectionId] {
        self.sections_by_semester
            .get(semester_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn conflicting_pairs(&self) -> &[(SectionId, SectionId)] {
        &self.conflicts
    }

    pub fn section(&self, rid: &str) -> Option<&Section> {
        self.sections.get(rid)
    }

    /// `z[r]` is only ever a decision variable for a section offered in the
    /// nearest semester (spec §3 "Decision variables") — section-level
    /// selection constraints (`include_section`/`exclude_section`/
    /// `pin_sections`) only make sense against these.
    pub fn is_nearest_semester_section(&self, rid: &str) -> bool {
        self.sections.get(rid).map(|s| s.semester_index == 0).unwrap_or(false)
    }

    /// Absent group names resolve to the empty set rather than an error
    /// (spec §4.1 "Guarantees") — callers whose semantics require existence
    /// check separately via [`CatalogIndex::has_group`].
    pub fn group(&self, name: &str) -> HashSet<CourseId> {
        self.groups.get(name).cloned().unwrap_or_default()
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn hub(&self, tag: &str) -> HashSet<CourseId> {
        self.hubs.classes_by_tag.get(tag).cloned().unwrap_or_default()
    }

    pub fn hub_requirements(&self) -> &HashMap<String, u32> {
        &self.hubs.requirements
    }

    pub fn courses_in_range(&self, school: &str, dept: &str, min_num: u32, max_num: u32) -> Vec<CourseId> {
        self.course_ids
            .iter()
            .filter(|cid| match CourseCode::parse(cid) {
                Some(code) => code.school == school && code.department == dept && (min_num..=max_num).contains(&code.number),
                None => false,
            })
            .cloned()
            .collect()
    }

    pub fn has_course(&self, course_id: &str) -> bool {
        self.course_ids.contains(course_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ScheduleRequest;

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

    fn minimal_request(relations: Vec<Relation>) -> ScheduleRequest {
        ScheduleRequest {
            relations,
            conflicts: None,
            groups: Default::default(),
            hubs: Default::default(),
            semesters: vec!["F25".to_string()],
            bookmarks: Default::default(),
            completed_courses: Default::default(),
            course_scores: Default::default(),
            num_courses_per_semester: 4,
            constraints: vec![],
            time_limit_sec: 5.0,
            scale: 1000,
            tier_order: None,
            prerequisites: Default::default(),
            graduation: None,
            num_search_workers: None,
            random_seed: None,
        }
    }

    #[test]
    fn computes_conflicts_from_overlapping_times() {
        let req = minimal_request(vec![
            relation("r1", "X", "F25", &["Mon"], 600, 660),
            relation("r2", "Y", "F25", &["Mon"], 630, 690),
            relation("r3", "Z", "F25", &["Tue"], 600, 660),
        ]);
        let catalog = CatalogIndex::build(&req).unwrap();
        let pairs = catalog.conflicting_pairs();
        assert_eq!(pairs.len(), 1);
        assert!(pairs.contains(&("r1".to_string(), "r2".to_string())));
    }

    #[test]
    fn rejects_duplicate_section_ids() {
        let req = minimal_request(vec![
            relation("r1", "X", "F25", &["Mon"], 600, 660),
            relation("r1", "Y", "F25", &["Tue"], 600, 660),
        ]);
        assert!(CatalogIndex::build(&req).is_err());
    }

    #[test]
    fn parses_course_code() {
        let code = CourseCode::parse("CAS CS 320").unwrap();
        assert_eq!(code.school, "CAS");
        assert_eq!(code.department, "CS");
        assert_eq!(code.number, 320);
        assert!(CourseCode::parse("CAS").is_none());
    }
}
