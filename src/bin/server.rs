//! HTTP surface over the course-schedule optimizer core: a single
//! `POST /v1/schedule/solve` route taking a
//! [`course_scheduler_core::contract::ScheduleRequest`] and returning its
//! [`course_scheduler_core::contract::ScheduleResponse`] (spec §6 "JSON
//! over HTTP in the reference deployment").

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use course_scheduler_core::contract::{ScheduleRequest, ScheduleResponse};
use course_scheduler_core::error::SolverError;
use log::{error, info};

#[derive(Clone, Default)]
struct AppState;

async fn solve_handler(
    State(_state): State<AppState>,
    Json(request): Json<ScheduleRequest>,
) -> Result<Json<ScheduleResponse>, (StatusCode, String)> {
    match course_scheduler_core::solve(&request) {
        Ok(response) => Ok(Json(response)),
        Err(err) => {
            error!("solve failed: {err}");
            Err((status_for(&err), err.to_string()))
        }
    }
}

fn status_for(err: &SolverError) -> StatusCode {
    match err {
        SolverError::InvalidInput { .. } | SolverError::ReferenceError { .. } => StatusCode::BAD_REQUEST,
        SolverError::ModelTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        SolverError::Infeasible { .. } | SolverError::Timeout { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SolverError::SolverInternal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let addr = std::env::var("SCHEDULE_SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let app = Router::new()
        .route("/v1/schedule/solve", post(solve_handler))
        .with_state(AppState);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("could not bind {addr}: {e}"));

    info!("schedule-server listening on {addr}");
    axum::serve(listener, app).await.unwrap_or_else(|e| panic!("server error: {e}"));
}
