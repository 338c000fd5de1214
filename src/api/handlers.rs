//! HTTP request handlers for the attendance API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{PayrollQuery, RequestId};
use crate::workflow::{
    LateSubmission, LeaveSubmission, OvertimeSubmission, RequestFilter, ReviewDecision, Submission,
};

use super::actor::Actor;
use super::request::{CheckpointRequest, HistoryParams, PayrollRequest};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Room left in a request body for the JSON around the evidence.
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// Largest request body that can carry `max_evidence_bytes` of base64 evidence.
fn body_limit(max_evidence_bytes: usize) -> usize {
    max_evidence_bytes
        .div_ceil(3)
        .saturating_mul(4)
        .saturating_add(BODY_OVERHEAD_BYTES)
}

/// Creates the API router with all endpoints.
///
/// The body limit is sized from the evidence limit in effect when the
/// router is built.
pub fn create_router(state: AppState) -> Router {
    let limit = body_limit(state.tracker().max_evidence_bytes());

    Router::new()
        .route("/attendance/check-in", post(check_in_handler))
        .route("/attendance/check-out", post(check_out_handler))
        .route("/attendance/today", get(today_handler))
        .route("/attendance/history", get(history_handler))
        .route("/requests", get(list_requests_handler))
        .route("/requests/overtime", post(submit_overtime_handler))
        .route("/requests/leave", post(submit_leave_handler))
        .route("/requests/late", post(submit_late_handler))
        .route("/requests/:id", get(get_request_handler))
        .route("/requests/:id/review", post(review_handler))
        .route("/requests/:id/cancel", post(cancel_handler))
        .route("/payroll/preview", post(payroll_preview_handler))
        .route("/payroll/export", post(payroll_export_handler))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

/// Turns a body that failed to parse into a 400 response, or a 413 when it
/// was over the body limit.
fn json_rejection(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        let body_text = rejection.body_text();
        warn!(
            correlation_id = %correlation_id,
            error = %body_text,
            "Request body over limit"
        );
        return ApiErrorResponse::payload_too_large(body_text).into_response();
    }

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
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
    };
    ApiErrorResponse::bad_request(error).into_response()
}

fn query_rejection(correlation_id: Uuid, rejection: QueryRejection) -> Response {
    let body_text = rejection.body_text();
    warn!(
        correlation_id = %correlation_id,
        error = %body_text,
        "Query string error"
    );
    ApiErrorResponse::bad_request(ApiError::validation_error(body_text)).into_response()
}

/// Logs an engine error and turns it into its mapped response.
fn engine_error(correlation_id: Uuid, operation: &str, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        operation,
        code = err.code(),
        error = %err,
        "Operation rejected"
    );
    ApiErrorResponse::from(err).into_response()
}

fn json_ok<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Handler for POST /attendance/check-in.
async fn check_in_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<CheckpointRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, employee_id = actor.actor_id, "Processing check-in");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    let command = match request.into_command(actor.actor_id, state.now()) {
        Ok(command) => command,
        Err(err) => return engine_error(correlation_id, "check_in", err),
    };

    match state.tracker().check_in(command).await {
        Ok(row) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = row.employee_id,
                work_date = %row.work_date,
                is_late = row.is_late,
                "Check-in recorded"
            );
            json_ok(StatusCode::OK, row)
        }
        Err(err) => engine_error(correlation_id, "check_in", err),
    }
}

/// Handler for POST /attendance/check-out.
async fn check_out_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<CheckpointRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, employee_id = actor.actor_id, "Processing check-out");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    let command = match request.into_command(actor.actor_id, state.now()) {
        Ok(command) => command,
        Err(err) => return engine_error(correlation_id, "check_out", err),
    };

    match state.tracker().check_out(command).await {
        Ok(row) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = row.employee_id,
                work_date = %row.work_date,
                total_hours = ?row.total_hours,
                "Check-out recorded"
            );
            json_ok(StatusCode::OK, row)
        }
        Err(err) => engine_error(correlation_id, "check_out", err),
    }
}

/// Handler for GET /attendance/today.
///
/// Responds with `null` when the actor has not checked in today.
async fn today_handler(State(state): State<AppState>, Actor(actor): Actor) -> Response {
    let today = state.now().date();
    json_ok(StatusCode::OK, state.tracker().today(actor.actor_id, today))
}

/// Handler for GET /attendance/history.
async fn history_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => return query_rejection(correlation_id, rejection),
    };

    match state
        .tracker()
        .history(actor.actor_id, params.page, params.page_size)
    {
        Ok(page) => json_ok(StatusCode::OK, page),
        Err(err) => engine_error(correlation_id, "history", err),
    }
}

/// Shared tail of the three submit handlers.
fn submit(state: &AppState, actor: Actor, correlation_id: Uuid, submission: Submission) -> Response {
    let Actor(actor) = actor;
    match state.workflow().submit(&actor, submission, state.now()) {
        Ok(request) => {
            info!(
                correlation_id = %correlation_id,
                request_id = request.request_id,
                employee_id = request.employee_id,
                kind = %request.kind(),
                "Request submitted"
            );
            json_ok(StatusCode::CREATED, request)
        }
        Err(err) => engine_error(correlation_id, "submit", err),
    }
}

/// Handler for POST /requests/overtime.
async fn submit_overtime_handler(
    State(state): State<AppState>,
    actor: Actor,
    payload: Result<Json<OvertimeSubmission>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match payload {
        Ok(Json(body)) => submit(&state, actor, correlation_id, Submission::Overtime(body)),
        Err(rejection) => json_rejection(correlation_id, rejection),
    }
}

/// Handler for POST /requests/leave.
async fn submit_leave_handler(
    State(state): State<AppState>,
    actor: Actor,
    payload: Result<Json<LeaveSubmission>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match payload {
        Ok(Json(body)) => submit(&state, actor, correlation_id, Submission::Leave(body)),
        Err(rejection) => json_rejection(correlation_id, rejection),
    }
}

/// Handler for POST /requests/late.
async fn submit_late_handler(
    State(state): State<AppState>,
    actor: Actor,
    payload: Result<Json<LateSubmission>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match payload {
        Ok(Json(body)) => submit(&state, actor, correlation_id, Submission::Late(body)),
        Err(rejection) => json_rejection(correlation_id, rejection),
    }
}

/// Handler for GET /requests.
///
/// Staff callers only ever see their own requests.
async fn list_requests_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    filter: Result<Query<RequestFilter>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let filter = match filter {
        Ok(Query(filter)) => filter,
        Err(rejection) => return query_rejection(correlation_id, rejection),
    };
    json_ok(StatusCode::OK, state.workflow().list(&actor, &filter))
}

/// Handler for GET /requests/:id.
async fn get_request_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(request_id): Path<RequestId>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.workflow().get(&actor, request_id) {
        Ok(request) => json_ok(StatusCode::OK, request),
        Err(err) => engine_error(correlation_id, "get_request", err),
    }
}

/// Handler for POST /requests/:id/review.
async fn review_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(request_id): Path<RequestId>,
    payload: Result<Json<ReviewDecision>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        request_id,
        reviewer_id = actor.actor_id,
        "Processing review"
    );

    let decision = match payload {
        Ok(Json(decision)) => decision,
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    match state
        .workflow()
        .review(&actor, request_id, decision, state.now())
    {
        Ok(request) => {
            info!(
                correlation_id = %correlation_id,
                request_id,
                status = %request.status,
                "Request reviewed"
            );
            json_ok(StatusCode::OK, request)
        }
        Err(err) => engine_error(correlation_id, "review", err),
    }
}

/// Handler for POST /requests/:id/cancel.
async fn cancel_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(request_id): Path<RequestId>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.workflow().cancel(&actor, request_id, state.now()) {
        Ok(request) => {
            info!(correlation_id = %correlation_id, request_id, "Request cancelled");
            json_ok(StatusCode::OK, request)
        }
        Err(err) => engine_error(correlation_id, "cancel", err),
    }
}

fn payroll_query(
    correlation_id: Uuid,
    payload: Result<Json<PayrollRequest>, JsonRejection>,
) -> Result<PayrollQuery, Response> {
    let Json(body) = payload.map_err(|rejection| json_rejection(correlation_id, rejection))?;
    PayrollQuery::try_from(body).map_err(|err| engine_error(correlation_id, "payroll", err))
}

/// Handler for POST /payroll/preview.
///
/// Amounts are returned unrounded.
async fn payroll_preview_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<PayrollRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, actor_id = actor.actor_id, "Processing payroll preview");

    let query = match payroll_query(correlation_id, payload) {
        Ok(query) => query,
        Err(response) => return response,
    };

    match state.payroll().preview(&actor, &query) {
        Ok(lines) => json_ok(StatusCode::OK, lines),
        Err(err) => engine_error(correlation_id, "payroll_preview", err),
    }
}

/// Handler for POST /payroll/export.
///
/// Returns the report with amounts rounded to whole currency units and a
/// suggested download name.
async fn payroll_export_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<PayrollRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, actor_id = actor.actor_id, "Processing payroll export");

    let query = match payroll_query(correlation_id, payload) {
        Ok(query) => query,
        Err(response) => return response,
    };

    match state.payroll().export(&actor, &query, state.now()) {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                employees = report.employee_count,
                grand_total = %report.grand_total.round_dp(0),
                "Payroll exported"
            );
            let disposition = format!("attachment; filename=\"{}.json\"", report.file_stem());
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/json".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                Json(report.rounded(0)),
            )
                .into_response()
        }
        Err(err) => engine_error(correlation_id, "payroll_export", err),
    }
}
