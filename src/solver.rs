//! Solver Driver (spec §4.5): configures the CP-SAT backend, runs it under
//! a wall-clock budget, and maps its terminal status onto [`SolverError`].
//!
//! Both execution modes the Objective Manager can produce are implemented:
//! [`solve_single_pass`] drives the big-M composite objective in one solve;
//! [`solve_staged`] drives the lexicographic re-solve, locking in each
//! tier's optimum as a hard floor before moving to the next. [`solve`]
//! picks single-pass by default, since [`crate::objective::ObjectiveManager`]
//! always computes a tight per-tier upper bound (see DESIGN.md) — the
//! staged path exists for callers who want tier-by-tier values replayed
//! against independently-solved optima rather than trusting the composite
//! weighting.

use cp_sat::proto::{CpSolverStatus, SatParameters};

use crate::error::{Result, SolverError};
use crate::model::ModelContext;

/// One terminated solve: status plus a closure-friendly accessor for
/// boolean variable values (spec §4.6 "solver's value function").
pub struct SolveOutcome {
    pub status: CpSolverStatus,
    response: cp_sat::proto::CpSolverResponse,
}

impl SolveOutcome {
    pub fn value(&self, var: &cp_sat::builder::BoolVar) -> bool {
        var.solution_value(&self.response)
    }

    pub fn has_solution(&self) -> bool {
        matches!(self.status, CpSolverStatus::Optimal | CpSolverStatus::Feasible)
    }
}

/// Solver-tunable knobs that travel through the input contract itself (spec
/// §5 "multiple search workers allowed", "Determinism across runs") rather
/// than a separate config layer.
#[derive(Debug, Clone, Copy)]
pub struct SolveParams {
    pub time_limit_sec: f64,
    pub num_search_workers: Option<u32>,
    pub random_seed: Option<i64>,
}

impl SolveParams {
    pub fn new(time_limit_sec: f64, num_search_workers: Option<u32>, random_seed: Option<i64>) -> SolveParams {
        SolveParams {
            time_limit_sec,
            num_search_workers,
            random_seed,
        }
    }

    fn with_time_limit(self, time_limit_sec: f64) -> SolveParams {
        SolveParams { time_limit_sec, ..self }
    }
}

fn parameters(params: SolveParams) -> SatParameters {
    let mut sat_params = SatParameters::default();
    sat_params.max_time_in_seconds = Some(params.time_limit_sec);
    sat_params.num_search_workers = Some(params.num_search_workers.unwrap_or(8) as i32);
    sat_params.random_seed = Some(params.random_seed.unwrap_or(42) as i32);
    sat_params.search_branching = Some(2);
    sat_params
}

/// Mode 1 (spec §4.4): maximize the single big-M composite objective. The
/// `cp_sat` builder only exposes `minimize`, so maximization is expressed
/// as minimizing the negated expression (spec §9 "maximize via negated
/// minimize").
pub fn solve_single_pass(ctx: &mut ModelContext, params: SolveParams) -> Result<SolveOutcome> {
    let time_limit_sec = params.time_limit_sec;
    let objective = negate(ctx.objective.big_m_objective());
    ctx.model.minimize(objective);
    let response = ctx.model.solve_with_parameters(&parameters(params));
    let status = response.status();
    log::info!("single-pass solve terminated with status {status:?}");
    match status {
        CpSolverStatus::Optimal | CpSolverStatus::Feasible => Ok(SolveOutcome { status, response }),
        CpSolverStatus::Infeasible => Err(SolverError::Infeasible { constraint_id: None }),
        _ => Err(SolverError::Timeout { time_limit_sec }),
    }
}

/// Mode 2 (spec §4.4): maximize each tier in priority order, locking each
/// tier's achieved optimum in as a hard floor (`tier_expr >= V_t`) before
/// moving to the next. The final solve (over the lowest-priority tier with
/// every higher tier's floor already in the model) is the returned outcome.
pub fn solve_staged(ctx: &mut ModelContext, params: SolveParams) -> Result<SolveOutcome> {
    let plan = ctx.objective.staged_plan();
    if plan.is_empty() {
        return solve_single_pass(ctx, params);
    }
    let per_tier_budget = params.time_limit_sec / plan.len() as f64;
    let mut last_outcome = None;
    let n_tiers = plan.len();
    for (i, (tier, expr)) in plan.into_iter().enumerate() {
        ctx.model.minimize(negate(expr.clone()));
        let response = ctx
            .model
            .solve_with_parameters(&parameters(params.with_time_limit(per_tier_budget)));
        let status = response.status();
        log::debug!("staged solve, tier '{tier}' ({}/{}): {status:?}", i + 1, n_tiers);
        match status {
            CpSolverStatus::Optimal | CpSolverStatus::Feasible => {
                let outcome = SolveOutcome { status, response };
                let achieved: i64 = ctx
                    .objective
                    .tier_terms(&tier)
                    .iter()
                    .filter(|(var, _)| outcome.value(var))
                    .map(|(_, coeff)| coeff)
                    .sum();
                ctx.model.add_ge(expr, cp_sat::builder::LinearExpr::from(achieved));
                last_outcome = Some(outcome);
            }
            _ => {
                return Err(SolverError::Infeasible {
                    constraint_id: Some(format!("objective tier '{tier}'")),
                });
            }
        }
    }
    last_outcome.ok_or_else(|| SolverError::SolverInternal {
        message: "staged solve produced no outcome despite a non-empty tier plan".to_string(),
    })
}

pub fn solve(ctx: &mut ModelContext, params: SolveParams) -> Result<SolveOutcome> {
    solve_single_pass(ctx, params)
}

fn negate(expr: cp_sat::builder::LinearExpr) -> cp_sat::builder::LinearExpr {
    cp_sat::builder::LinearExpr::from(0) - expr
}
