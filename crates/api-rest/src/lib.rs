//! # API REST
//!
//! REST API implementation for the triage pipeline.
//!
//! Handles:
//! - HTTP endpoints with axum, mounted under `/healthcare`
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, body validation, CORS, error mapping)
//!
//! Uses `api-shared` for request/response types and `triage-core` for the pipeline.

#![warn(rust_2018_idioms)]

use api_shared::{AlertListsRes, AssessmentSubmissionReq, ErrorRes, HealthRes, HealthService};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use triage_core::{ApiError, AssessmentService, Patient};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST API handlers
///
/// Holds the assessment service, which owns the fetcher and the submission channel.
#[derive(Clone)]
pub struct AppState {
    pub assessment: AssessmentService,
}

type HandlerError = (StatusCode, Json<ErrorRes>);

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_patients,
        process_patients,
        submit_assessment,
        process_and_submit,
    ),
    components(schemas(HealthRes, ErrorRes, AlertListsRes, AssessmentSubmissionReq))
)]
pub struct ApiDoc;

/// Build the REST router with OpenAPI docs and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/healthcare/patients", get(list_patients))
        .route("/healthcare/process", post(process_patients))
        .route("/healthcare/submit", post(submit_assessment))
        .route("/healthcare/process-and-submit", post(process_and_submit))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks; never touches the remote API.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/healthcare/patients",
    responses(
        (status = 200, description = "Every patient record from the remote API, in page order"),
        (status = 502, description = "Remote API unreachable or returned an undecodable body", body = ErrorRes)
    )
)]
/// Fetch all patients from the remote API
///
/// Pages through the remote listing with retry and backoff. Remote status errors are returned
/// with the remote status code.
#[axum::debug_handler]
async fn list_patients(
    State(state): State<AppState>,
) -> Result<Json<Vec<Patient>>, HandlerError> {
    state
        .assessment
        .fetcher()
        .fetch_all_patients()
        .await
        .map(Json)
        .map_err(|e| upstream_failure("Fetch patients", e))
}

#[utoipa::path(
    post,
    path = "/healthcare/process",
    responses(
        (status = 200, description = "Alert lists built from every patient", body = AlertListsRes),
        (status = 502, description = "Remote API unreachable or returned an undecodable body", body = ErrorRes)
    )
)]
/// Fetch, score and classify all patients without submitting
#[axum::debug_handler]
async fn process_patients(
    State(state): State<AppState>,
) -> Result<Json<AlertListsRes>, HandlerError> {
    state
        .assessment
        .process_patients()
        .await
        .map(|lists| Json(lists.into()))
        .map_err(|e| upstream_failure("Process patients", e))
}

#[utoipa::path(
    post,
    path = "/healthcare/submit",
    request_body = AssessmentSubmissionReq,
    responses(
        (status = 200, description = "Grader response, passed through verbatim"),
        (status = 400, description = "Invalid submission body", body = ErrorRes),
        (status = 502, description = "Remote API unreachable", body = ErrorRes)
    )
)]
/// Submit caller-provided alert lists
///
/// Every list must be present, non-empty and contain only strings. The submission is sent
/// once; failures are not retried.
#[axum::debug_handler]
async fn submit_assessment(
    State(state): State<AppState>,
    Json(req): Json<AssessmentSubmissionReq>,
) -> Result<Json<Value>, HandlerError> {
    let submission = req.validate().map_err(|errors| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorRes {
                errors,
                ..ErrorRes::new("Invalid assessment submission")
            }),
        )
    })?;

    state
        .assessment
        .submit(&submission)
        .await
        .map(|response| Json(response.into_inner()))
        .map_err(|e| upstream_failure("Submit assessment", e))
}

#[utoipa::path(
    post,
    path = "/healthcare/process-and-submit",
    responses(
        (status = 200, description = "Grader response, passed through verbatim"),
        (status = 502, description = "Remote API unreachable", body = ErrorRes)
    )
)]
/// Run the whole pipeline: fetch, classify and submit
#[axum::debug_handler]
async fn process_and_submit(
    State(state): State<AppState>,
) -> Result<Json<Value>, HandlerError> {
    state
        .assessment
        .process_and_submit()
        .await
        .map(|response| Json(response.into_inner()))
        .map_err(|e| upstream_failure("Process and submit", e))
}

/// Map a remote API failure onto a response.
///
/// Remote statuses are passed through; failures without one become `502 Bad Gateway`.
fn upstream_failure(context: &str, error: ApiError) -> HandlerError {
    tracing::error!("{} error: {:?}", context, error);

    let status = error
        .status()
        .and_then(|s| StatusCode::from_u16(s).ok())
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::BAD_GATEWAY);
    let upstream_body = error.body().map(|body| {
        serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
    });

    (
        status,
        Json(ErrorRes {
            upstream_status: error.status(),
            upstream_body,
            ..ErrorRes::new(error.to_string())
        }),
    )
}
