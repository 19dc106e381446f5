//! REST endpoints for driving and watching an onboarding run.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::manager::Orchestrator;
use super::model::OnboardingConfig;
use crate::error::OnboardingError;

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub orchestrator: Orchestrator,
}

/// GET /api/onboarding/steps
async fn get_steps(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    Json(state.orchestrator.steps())
}

/// GET /api/onboarding/status
///
/// Phase, wizard step marker, per-step results and the ids produced so far.
async fn get_status(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    Json(state.orchestrator.snapshot().await)
}

/// POST /api/onboarding/start
///
/// Claims the run slot synchronously, then executes the steps in the
/// background. Poll `/api/onboarding/status` for progress.
async fn start(
    State(state): State<OnboardingRouteState>,
    Json(config): Json<OnboardingConfig>,
) -> impl IntoResponse {
    match state.orchestrator.begin(config).await {
        Ok(run) => {
            let run_id = run.run_id();
            tokio::spawn(run.run());
            (
                StatusCode::ACCEPTED,
                Json(serde_json::json!({"status": "started", "run_id": run_id})),
            )
        }
        Err(e @ OnboardingError::AlreadyRunning) => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({"error": e.to_string()})),
        ),
        Err(e @ OnboardingError::Client(_)) => {
            tracing::error!(error = %e, "Could not start onboarding run");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
        }
    }
}

/// Build the onboarding REST routes.
pub fn onboarding_routes(state: OnboardingRouteState) -> Router {
    Router::new()
        .route("/api/onboarding/steps", get(get_steps))
        .route("/api/onboarding/status", get(get_status))
        .route("/api/onboarding/start", post(start))
        .with_state(state)
}
