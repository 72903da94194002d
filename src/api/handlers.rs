//! HTTP request handlers for the roster engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Duration;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::scheduling::solve;

use super::request::SolveRequest;
use super::response::{ApiError, ApiErrorResponse, HealthResponse, SolverStatusResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/solve", post(solve_handler))
        .route("/health", get(health_handler))
        .route("/solver-status", get(solver_status_handler))
        .with_state(state)
}

/// Handler for POST /solve endpoint.
///
/// Every request that decodes is answered with 200 and a scheduling result,
/// including structurally invalid ones, whose problems are listed in the
/// result's errors.
async fn solve_handler(
    State(state): State<AppState>,
    payload: Result<Json<SolveRequest>, JsonRejection>,
) -> Response {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing solve request");

    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            return ApiErrorResponse::bad_request(rejection_error(correlation_id, rejection))
                .into_response();
        }
    };

    let budget_ms = state.config().effective_budget_ms(body.time_budget_ms);
    let employees_count = body.request.employees.len();
    let shifts_count = body.request.shifts.len();
    info!(
        correlation_id = %correlation_id,
        employees_count,
        shifts_count,
        budget_ms,
        "Starting solve"
    );

    let config = state.shared_config();
    let guard = state.begin_solve();
    let solved = tokio::task::spawn_blocking(move || {
        let _guard = guard;
        solve(&body.request, config.config(), Duration::from_millis(budget_ms))
    })
    .await;

    match solved {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                status = %result.status,
                assignments_count = result.assignments.len(),
                errors_count = result.errors.len(),
                warnings_count = result.warnings.len(),
                solving_time_ms = result.solving_time_ms,
                "Solve completed"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(result),
            )
                .into_response()
        }
        Err(err) => {
            error!(
                correlation_id = %correlation_id,
                error = %err,
                "Solve task failed"
            );
            ApiErrorResponse::internal(ApiError::solver_failure(err.to_string())).into_response()
        }
    }
}

/// Handler for GET /health endpoint.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handler for GET /solver-status endpoint.
async fn solver_status_handler(State(state): State<AppState>) -> Json<SolverStatusResponse> {
    Json(SolverStatusResponse {
        ready: true,
        active_solves: state.active_solves(),
    })
}

fn rejection_error(correlation_id: Uuid, rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's detailed message
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    }
}
