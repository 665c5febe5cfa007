//! Result Decoder (spec §4.6): reads the solver's value function once and
//! renders it into the wire-level [`ScheduleResponse`].

use std::collections::HashMap;

use crate::contract::{Assignment, CourseId, ScheduleResponse, ScheduleStatus};
use crate::model::ModelContext;
use crate::solver::SolveOutcome;

pub fn status_of(outcome: &SolveOutcome) -> ScheduleStatus {
    match outcome.status {
        cp_sat::proto::CpSolverStatus::Optimal => ScheduleStatus::Optimal,
        cp_sat::proto::CpSolverStatus::Feasible => ScheduleStatus::Feasible,
        cp_sat::proto::CpSolverStatus::Infeasible => ScheduleStatus::Infeasible,
        _ => ScheduleStatus::Unknown,
    }
}

/// Builds `plan[s]`, semester-0 `assignments`, and `objective_scores` from
/// a terminated solve (spec §4.6).
pub fn decode(ctx: &ModelContext, outcome: &SolveOutcome) -> ScheduleResponse {
    let mut plan: HashMap<i64, Vec<CourseId>> = HashMap::new();
    for ((course_id, s), var) in ctx.all_x() {
        if outcome.value(var) {
            plan.entry(*s).or_default().push(course_id.clone());
        }
    }
    for courses in plan.values_mut() {
        courses.sort();
    }

    let mut assignments: Vec<Assignment> = Vec::new();
    for (rid, var) in ctx.all_z() {
        if !outcome.value(var) {
            continue;
        }
        let Some(section) = ctx.catalog.section(rid) else {
            continue;
        };
        assignments.push(Assignment {
            course_id: section.course_id.clone(),
            rid: section.rid.clone(),
            days: section.slot.days.iter().map(|d| format!("{d:?}")).collect(),
            start_minute: section.slot.start_minute,
            end_minute: section.slot.end_minute,
            instructor_id: section.instructor_id.clone(),
        });
    }
    assignments.sort();

    let objective_scores = ctx.objective.tier_values(|var| outcome.value(var));

    ScheduleResponse {
        status: status_of(outcome),
        plan,
        assignments,
        objective_scores,
        scale: ctx.objective.scale(),
        error: None,
    }
}
