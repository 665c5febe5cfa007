//! End-to-end scenarios exercising the public `solve` entry point (spec §8
//! "Testable properties" and "Boundary behaviors"). The toy catalog
//! mirrors the original solver's own feasibility fixture: three
//! non-conflicting semester-0 sections across CS 237/320/330.

use std::collections::{HashMap, HashSet};

use course_scheduler_core::contract::{ConstraintSpec, Relation, ScheduleRequest, ScheduleStatus};

fn relation(rid: &str, class_id: &str, days: &[&str], start: u32, end: u32, instructor: &str, rating: f64) -> Relation {
    Relation {
        rid: rid.to_string(),
        class_id: class_id.to_string(),
        semester: "2026SP".to_string(),
        days: days.iter().map(|d| d.to_string()).collect(),
        start_minute: start,
        end_minute: end,
        instructor_id: Some(instructor.to_string()),
        rating: Some(rating),
    }
}

fn toy_relations() -> Vec<Relation> {
    vec![
        relation("r_cs320", "CAS CS 320", &["Tue", "Thu"], 840, 915, "Kim,Ana", 0.6),
        relation("r_cs237", "CAS CS 237", &["Mon", "Wed"], 600, 675, "Doe,Alex", 0.9),
        relation("r_cs330", "CAS CS 330", &["Tue", "Thu"], 660, 735, "Zed,Bob", 0.7),
    ]
}

fn base_request() -> ScheduleRequest {
    ScheduleRequest {
        relations: toy_relations(),
        conflicts: None,
        groups: HashMap::new(),
        hubs: Default::default(),
        semesters: vec!["2026SP".to_string()],
        bookmarks: HashSet::new(),
        completed_courses: HashSet::new(),
        course_scores: HashMap::new(),
        num_courses_per_semester: 2,
        constraints: Vec::new(),
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
fn empty_constraints_prefers_bookmarked_courses_within_the_load_cap() {
    let mut request = base_request();
    request.bookmarks = ["CAS CS 237", "CAS CS 320"].iter().map(|s| s.to_string()).collect();

    let response = course_scheduler_core::solve(&request).expect("solve should not error");
    assert!(matches!(response.status, ScheduleStatus::Optimal | ScheduleStatus::Feasible));

    let plan0 = &response.plan[&0];
    assert!(plan0.len() <= 2);
    assert!(plan0.contains(&"CAS CS 237".to_string()));
    assert!(plan0.contains(&"CAS CS 320".to_string()));
}

#[test]
fn disallowed_day_removes_every_section_meeting_that_day() {
    let mut request = base_request();
    request.constraints = vec![spec("no_fri", "disallowed_days", serde_json::json!({"days": ["Fri"]}))];

    let response = course_scheduler_core::solve(&request).expect("solve should not error");
    assert!(matches!(response.status, ScheduleStatus::Optimal | ScheduleStatus::Feasible));
}

#[test]
fn exclude_course_never_appears_in_the_plan() {
    let mut request = base_request();
    request.constraints = vec![spec(
        "no_330",
        "exclude_course",
        serde_json::json!({"course_ids": ["CAS CS 330"]}),
    )];

    let response = course_scheduler_core::solve(&request).expect("solve should not error");
    let plan0 = response.plan.get(&0).cloned().unwrap_or_default();
    assert!(!plan0.contains(&"CAS CS 330".to_string()));
}

#[test]
fn completed_courses_never_reappear() {
    let mut request = base_request();
    request.completed_courses = ["CAS CS 320".to_string()].into_iter().collect();

    let response = course_scheduler_core::solve(&request).expect("solve should not error");
    for courses in response.plan.values() {
        assert!(!courses.contains(&"CAS CS 320".to_string()));
    }
    assert!(response.assignments.iter().all(|a| a.course_id != "CAS CS 320"));
}

#[test]
fn conflicting_sections_are_never_both_assigned() {
    let mut request = base_request();
    // Force CS237 and a conflicting twin of CS330 into the same slot.
    request.relations.push(relation(
        "r_cs330_conflict",
        "CAS CS 330",
        &["Mon", "Wed"],
        600,
        675,
        "Zed,Bob",
        0.7,
    ));
    request.constraints = vec![
        spec("pin_a", "pin_sections", serde_json::json!({"section_ids": ["r_cs237"]})),
        spec(
            "pin_b",
            "pin_sections",
            serde_json::json!({"section_ids": ["r_cs330_conflict"]}),
        ),
    ];

    let response = course_scheduler_core::solve(&request).expect("solve should not error");
    assert_eq!(response.status, ScheduleStatus::Infeasible);
}

#[test]
fn max_courses_per_semester_is_respected() {
    let mut request = base_request();
    request.num_courses_per_semester = 3;
    request.constraints = vec![spec("cap", "max_courses_per_semester", serde_json::json!({"k": 1}))];

    let response = course_scheduler_core::solve(&request).expect("solve should not error");
    if let Some(plan0) = response.plan.get(&0) {
        assert!(plan0.len() <= 1);
    }
}

#[test]
fn require_group_counts_enforces_a_hard_floor() {
    let mut request = base_request();
    request.groups.insert("A".to_string(), ["CAS CS 330".to_string()].into_iter().collect());
    request.num_courses_per_semester = 3;
    request.constraints = vec![spec(
        "need_a",
        "require_group_counts",
        serde_json::json!({"groups": ["A"], "op": "at_least", "count": 1}),
    )];

    let response = course_scheduler_core::solve(&request).expect("solve should not error");
    assert!(matches!(response.status, ScheduleStatus::Optimal | ScheduleStatus::Feasible));
    assert!(response.plan[&0].contains(&"CAS CS 330".to_string()));
}

#[test]
fn a_course_s_later_semester_section_never_satisfies_the_semester_zero_linking_sum() {
    // CAS CS 400 is offered once in the nearest semester (r0) and again a
    // semester later (r1). Excluding r0 must force the course, if taken at
    // all, into semester 1 as a course-level decision with no concrete
    // section — r1 must never be allowed to stand in for a semester-0
    // section choice (spec §3 "z[r] ... for each Section r offered in the
    // nearest semester").
    let mut request = base_request();
    request.semesters = vec!["2026SP".to_string(), "2026FA".to_string()];
    request.relations.push(Relation {
        rid: "r0".to_string(),
        class_id: "CAS CS 400".to_string(),
        semester: "2026SP".to_string(),
        days: vec!["Fri".to_string()],
        start_minute: 540,
        end_minute: 600,
        instructor_id: None,
        rating: None,
    });
    request.relations.push(Relation {
        rid: "r1".to_string(),
        class_id: "CAS CS 400".to_string(),
        semester: "2026FA".to_string(),
        days: vec!["Tue".to_string()],
        start_minute: 540,
        end_minute: 600,
        instructor_id: None,
        rating: None,
    });
    request.constraints = vec![
        spec("no_r0", "exclude_section", serde_json::json!({"section_ids": ["r0"]})),
        spec(
            "need_cs400",
            "include_course",
            serde_json::json!({"course_ids": ["CAS CS 400"]}),
        ),
    ];

    let response = course_scheduler_core::solve(&request).expect("solve should not error");
    assert!(matches!(response.status, ScheduleStatus::Optimal | ScheduleStatus::Feasible));

    let plan0 = response.plan.get(&0).cloned().unwrap_or_default();
    assert!(!plan0.contains(&"CAS CS 400".to_string()));
    let plan1 = response.plan.get(&1).cloned().unwrap_or_default();
    assert!(plan1.contains(&"CAS CS 400".to_string()));
    assert!(response.assignments.iter().all(|a| a.course_id != "CAS CS 400"));
}

#[test]
fn doubling_scale_doubles_objective_scores() {
    let mut request = base_request();
    request.bookmarks = ["CAS CS 237".to_string()].into_iter().collect();
    let base = course_scheduler_core::solve(&request).expect("solve should not error");

    request.scale = 2000;
    let doubled = course_scheduler_core::solve(&request).expect("solve should not error");

    for (tier, value) in &base.objective_scores {
        let doubled_value = doubled.objective_scores.get(tier).copied().unwrap_or(0);
        assert_eq!(doubled_value, value * 2);
    }
}
