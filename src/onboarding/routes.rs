//! REST endpoints for driving onboarding sessions.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::warn;
use uuid::Uuid;

use super::catalog::SymptomCatalog;
use super::session::{OnboardingSession, SessionRegistry};
use crate::auth::{FormFields, SubmitOutcome};
use crate::error::{SessionError, SubmitError};

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub registry: Arc<SessionRegistry>,
}

/// Build the onboarding REST routes.
pub fn onboarding_routes(registry: Arc<SessionRegistry>) -> Router {
    let state = OnboardingRouteState { registry };

    Router::new()
        .route("/health", get(health))
        .route("/api/symptoms", get(list_symptoms))
        .route("/api/onboarding/sessions", post(create_session))
        .route(
            "/api/onboarding/sessions/{id}",
            get(get_session).delete(end_session),
        )
        .route("/api/onboarding/sessions/{id}/advance", post(advance))
        .route("/api/onboarding/sessions/{id}/back", post(back))
        .route(
            "/api/onboarding/sessions/{id}/symptoms/{symptom_id}/toggle",
            post(toggle_symptom),
        )
        .route("/api/onboarding/sessions/{id}/mode", post(toggle_mode))
        .route("/api/onboarding/sessions/{id}/submit", post(submit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn list_symptoms() -> impl IntoResponse {
    Json(SymptomCatalog::builtin().entries())
}

async fn create_session(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    let session = state.registry.create().await;
    (StatusCode::CREATED, Json(session.view()))
}

async fn get_session(
    State(state): State<OnboardingRouteState>,
    Path(id): Path<String>,
) -> Response {
    match lookup(&state, &id).await {
        Ok(session) => Json(session.view()).into_response(),
        Err(resp) => resp,
    }
}

async fn end_session(
    State(state): State<OnboardingRouteState>,
    Path(id): Path<String>,
) -> Response {
    let Ok(session_id) = Uuid::parse_str(&id) else {
        return invalid_id();
    };
    match state.registry.remove(session_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => not_found(e),
    }
}

async fn advance(State(state): State<OnboardingRouteState>, Path(id): Path<String>) -> Response {
    match lookup(&state, &id).await {
        Ok(session) => {
            session.advance();
            Json(session.view()).into_response()
        }
        Err(resp) => resp,
    }
}

async fn back(State(state): State<OnboardingRouteState>, Path(id): Path<String>) -> Response {
    match lookup(&state, &id).await {
        Ok(session) => {
            session.back();
            Json(session.view()).into_response()
        }
        Err(resp) => resp,
    }
}

async fn toggle_symptom(
    State(state): State<OnboardingRouteState>,
    Path((id, symptom_id)): Path<(String, String)>,
) -> Response {
    let session = match lookup(&state, &id).await {
        Ok(session) => session,
        Err(resp) => return resp,
    };
    if !SymptomCatalog::builtin().contains(&symptom_id) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("Unknown symptom: {symptom_id}")})),
        )
            .into_response();
    }
    session.toggle_symptom(&symptom_id);
    Json(session.view()).into_response()
}

async fn toggle_mode(
    State(state): State<OnboardingRouteState>,
    Path(id): Path<String>,
) -> Response {
    let session = match lookup(&state, &id).await {
        Ok(session) => session,
        Err(resp) => return resp,
    };
    match session.toggle_mode() {
        Ok(_) => Json(session.view()).into_response(),
        Err(e) => submit_error(&session, e),
    }
}

async fn submit(
    State(state): State<OnboardingRouteState>,
    Path(id): Path<String>,
    Json(fields): Json<FormFields>,
) -> Response {
    let session = match lookup(&state, &id).await {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    // Run on its own task so a dropped connection cannot cut the two-phase
    // sign-up in half.
    let task = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.submit(&fields).await })
    };
    let result = match task.await {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "Submit task failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Submission failed unexpectedly"})),
            )
                .into_response();
        }
    };

    match result {
        Ok(outcome) => {
            let (status, account_id) = match &outcome {
                SubmitOutcome::Registered { account_id } => ("registered", account_id),
                SubmitOutcome::Authenticated(s) => ("authenticated", &s.account_id),
            };
            Json(json!({
                "status": status,
                "account_id": account_id.as_str(),
                "view": session.view(),
            }))
            .into_response()
        }
        Err(e) => submit_error(&session, e),
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────

async fn lookup(
    state: &OnboardingRouteState,
    id: &str,
) -> Result<Arc<OnboardingSession>, Response> {
    let session_id = Uuid::parse_str(id).map_err(|_| invalid_id())?;
    state.registry.get(session_id).await.map_err(not_found)
}

fn invalid_id() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": "Invalid session ID"})),
    )
        .into_response()
}

fn not_found(e: SessionError) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"error": e.to_string()}))).into_response()
}

fn submit_error(session: &OnboardingSession, e: SubmitError) -> Response {
    // Local failures never reached the identity service.
    let status = match e {
        SubmitError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ref e if e.is_local() => StatusCode::CONFLICT,
        _ => StatusCode::BAD_GATEWAY,
    };
    let partial = matches!(e, SubmitError::PartialSuccess { .. });
    (
        status,
        Json(json!({
            "error": e.to_string(),
            "partial": partial,
            "view": session.view(),
        })),
    )
        .into_response()
}
