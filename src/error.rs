//! Typed errors surfaced at the `solve` boundary (spec §7).
//!
//! Every path out of the crate converts into one of these variants so callers
//! get a closed, matchable error instead of an opaque string.

use thiserror::Error;

/// A single declarative constraint failed to resolve to something the model
/// builder could act on. Carries the constraint `id` when one was given.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// Shape mismatch, unknown constraint kind, unparseable time, duplicate
    /// section ids, empty semester list, etc. Caught before model build.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// A constraint referenced a course/section/group/hub that does not
    /// exist, and whose semantics require existence.
    #[error("constraint {constraint_id:?} references unknown {kind}: {reference}")]
    ReferenceError {
        constraint_id: Option<String>,
        kind: String,
        reference: String,
    },

    /// The computed variable/constraint count exceeds the configured ceiling.
    #[error("model too large: {actual} exceeds ceiling {ceiling} ({dimension})")]
    ModelTooLarge {
        dimension: String,
        actual: usize,
        ceiling: usize,
    },

    /// The solver proved no solution exists.
    #[error("infeasible{}", responsible_suffix(constraint_id))]
    Infeasible { constraint_id: Option<String> },

    /// The wall-clock budget expired with no feasible solution found.
    #[error("timed out after {time_limit_sec}s with no feasible solution")]
    Timeout { time_limit_sec: f64 },

    /// The solver backend returned a status we don't know how to interpret.
    #[error("solver internal error: {message}")]
    SolverInternal { message: String },
}

fn responsible_suffix(constraint_id: &Option<String>) -> String {
    match constraint_id {
        Some(id) => format!(" (responsible constraint: {id})"),
        None => String::new(),
    }
}

impl SolverError {
    pub fn invalid(message: impl Into<String>) -> Self {
        SolverError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn reference(constraint_id: Option<&str>, kind: impl Into<String>, reference: impl Into<String>) -> Self {
        SolverError::ReferenceError {
            constraint_id: constraint_id.map(str::to_owned),
            kind: kind.into(),
            reference: reference.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SolverError>;
