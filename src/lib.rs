//! Course-schedule optimizer core: a pure function from a typed request to
//! a typed response (spec §1, §5 "single request/single logical task").
//!
//! Callers (CLI, HTTP server, or any other embedder) only ever talk to
//! [`solve`] and the types in [`contract`]. Nothing else in this crate is
//! meant to be consumed directly, though the module boundaries mirror the
//! components named in the design: Catalog Index, Constraint AST, Model
//! Builder, Objective Manager, Solver Driver, Result Decoder.

pub mod catalog;
pub mod constraint;
pub mod contract;
mod decode;
pub mod error;
mod model;
pub mod objective;
mod solver;
pub mod time;
mod validate;

use contract::{ScheduleRequest, ScheduleResponse, ScheduleStatus};
use error::{Result, SolverError};

/// The single public entry point (spec §6). Builds the Catalog Index and
/// Constraint AST, hands both to the Model Builder, runs the Solver
/// Driver, and decodes the result — never returning a partially-built
/// model or leaking solver state across the call boundary.
pub fn solve(input: &ScheduleRequest) -> Result<ScheduleResponse> {
    let catalog = catalog::CatalogIndex::build(input)?;
    let constraints = constraint::parse_constraints(&input.constraints)?;
    validate::validate(input, &catalog, &constraints)?;

    let mut built = model::build(input, &catalog, &input.completed_courses, &constraints)?;

    let params = solver::SolveParams::new(input.time_limit_sec, input.num_search_workers, input.random_seed);
    match solver::solve(&mut built.ctx, params) {
        Ok(outcome) => Ok(decode::decode(&built.ctx, &outcome)),
        Err(err @ SolverError::Infeasible { .. }) => Ok(infeasible_response(input, ScheduleStatus::Infeasible, err)),
        Err(err @ SolverError::Timeout { .. }) => Ok(infeasible_response(input, ScheduleStatus::Unknown, err)),
        Err(other) => Err(other),
    }
}

/// A terminated-without-a-solution solver run still reports through the
/// normal `Ok` channel (spec §6 "error? structured reason when status !=
/// OPTIMAL/FEASIBLE") rather than as a `Result::Err` — only validation and
/// build-time failures are hard errors.
fn infeasible_response(input: &ScheduleRequest, status: ScheduleStatus, err: SolverError) -> ScheduleResponse {
    ScheduleResponse {
        status,
        plan: Default::default(),
        assignments: Vec::new(),
        objective_scores: Default::default(),
        scale: input.scale,
        error: Some(err.to_string()),
    }
}
