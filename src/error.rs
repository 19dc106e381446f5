//! Error types for the onboarding gateway.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::onboarding::StepKind;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Faults raised by the proxy gateway while handling one inbound request.
///
/// Upstream error responses are not represented here: they are relayed
/// verbatim and never reinterpreted.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("X-API-Key header is required")]
    MissingApiKey,

    #[error("Unable to reach Adyen API: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::MissingApiKey => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": self.to_string() }),
            ),
            Self::Unavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                serde_json::json!({
                    "error": "Service unavailable",
                    "message": "Unable to reach Adyen API"
                }),
            ),
            Self::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({
                    "error": "Internal server error",
                    "message": message
                }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Uniform error shape produced by the API client for every failed call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The proxy (or Adyen behind it) answered with a non-2xx status.
    #[error("{message}")]
    Upstream {
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
    },

    /// No response was received (connect failure, timeout, reset).
    #[error("Network error: unable to reach the proxy server")]
    Network(String),

    /// A 2xx response whose body was not JSON.
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// The HTTP client itself could not be built or the request was malformed.
    #[error("{0}")]
    Client(String),
}

impl ApiError {
    /// Raw upstream payload attached to the error, if any.
    pub fn body(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Upstream { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// HTTP status of the failed call, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Why a single onboarding step failed.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("Cannot run {step}: missing {missing}")]
    MissingPrerequisite { step: StepKind, missing: String },

    #[error("Response from {step} has no {field}")]
    MissingField {
        step: StepKind,
        field: &'static str,
        response: serde_json::Value,
    },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl StepError {
    /// Upstream payload to record alongside the failed step.
    pub fn response(&self) -> Option<serde_json::Value> {
        match self {
            Self::MissingPrerequisite { .. } => None,
            Self::MissingField { response, .. } => Some(response.clone()),
            Self::Api(e) => e.body().cloned(),
        }
    }
}

/// Errors that escape `Orchestrator::start`. Step failures never do.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error("An onboarding run is already in progress")]
    AlreadyRunning,

    #[error("Failed to build API client: {0}")]
    Client(#[from] ApiError),
}
