//! The single typed input/output boundary (spec §6). Everything upstream —
//! scraping, embeddings, ingestion, HTTP, auth, UI — talks to the core only
//! through [`ScheduleRequest`] and [`ScheduleResponse`].

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

pub type CourseId = String;
pub type SectionId = String;
pub type InstructorId = String;
pub type GroupName = String;
pub type HubTag = String;

/// A single offered meeting of a course in a semester.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub rid: SectionId,
    pub class_id: CourseId,
    pub semester: String,
    pub days: Vec<String>,
    pub start_minute: u32,
    pub end_minute: u32,
    pub instructor_id: Option<InstructorId>,
    pub rating: Option<f64>,
}

/// `{requirements, classes_by_tag}` — hub/distribution-tag bookkeeping.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Hubs {
    #[serde(default)]
    pub requirements: HashMap<HubTag, u32>,
    #[serde(default)]
    pub classes_by_tag: HashMap<HubTag, HashSet<CourseId>>,
}

/// One entry of the declarative constraint language (spec §3, §4.2).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintSpec {
    pub id: String,
    pub kind: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default = "serde_json::Value::default")]
    pub payload: serde_json::Value,
}

/// The complete input contract (spec §6).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub conflicts: Option<Vec<(SectionId, SectionId)>>,
    #[serde(default)]
    pub groups: HashMap<GroupName, HashSet<CourseId>>,
    #[serde(default)]
    pub hubs: Hubs,
    pub semesters: Vec<String>,
    #[serde(default)]
    pub bookmarks: HashSet<CourseId>,
    #[serde(default)]
    pub completed_courses: HashSet<CourseId>,
    /// Optional baseline preference per course (spec §3 Course.score),
    /// folded into the `comfort` tier once per course regardless of which
    /// explicit constraints are present.
    #[serde(default)]
    pub course_scores: HashMap<CourseId, f64>,
    #[serde(default = "default_num_courses_per_semester")]
    pub num_courses_per_semester: u32,
    #[serde(default)]
    pub constraints: Vec<ConstraintSpec>,
    #[serde(default = "default_time_limit_sec")]
    pub time_limit_sec: f64,
    #[serde(default = "default_scale")]
    pub scale: i64,
    #[serde(default)]
    pub tier_order: Option<Vec<String>>,
    /// Search worker count handed to the CP-SAT backend (spec §5 "multiple
    /// search workers allowed"); `None` uses the Solver Driver's own default.
    #[serde(default)]
    pub num_search_workers: Option<u32>,
    /// Fixed search seed for deterministic runs (spec §5 "Determinism across
    /// runs is controlled by the solver's search-seed parameter").
    #[serde(default)]
    pub random_seed: Option<i64>,
    /// Per-course prerequisite predicate, evaluated one semester back (spec
    /// §4.2 "Prerequisites"). Not part of the distilled contract's explicit
    /// field list; see DESIGN.md for why this field exists.
    #[serde(default)]
    pub prerequisites: HashMap<CourseId, crate::constraint::ConstraintTree>,
    /// The single top-level graduation predicate, evaluated at `s = last`
    /// (spec §4.2 "Graduation").
    #[serde(default)]
    pub graduation: Option<crate::constraint::ConstraintTree>,
}

fn default_num_courses_per_semester() -> u32 {
    4
}

fn default_time_limit_sec() -> f64 {
    10.0
}

fn default_scale() -> i64 {
    1000
}

/// Terminal solver status (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unknown,
}

/// A concrete, non-overlapping section assignment for the nearest semester.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub course_id: CourseId,
    pub rid: SectionId,
    pub days: Vec<String>,
    pub start_minute: u32,
    pub end_minute: u32,
    pub instructor_id: Option<InstructorId>,
}

/// The complete output contract (spec §6).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub status: ScheduleStatus,
    /// Semester index (0 = nearest future semester) -> course ids chosen.
    pub plan: HashMap<i64, Vec<CourseId>>,
    pub assignments: Vec<Assignment>,
    pub objective_scores: HashMap<String, i64>,
    pub scale: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
