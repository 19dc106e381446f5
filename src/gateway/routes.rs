//! HTTP surface of the proxy: the three Adyen prefixes plus the health probe.

use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method};
use axum::response::IntoResponse;
use axum::routing::{any, get};
use axum::{Json, Router};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use super::proxy::{GatewayState, forward};
use crate::adyen::Service;

/// Build the gateway router.
pub fn gateway_routes(state: GatewayState) -> Router {
    let mut router = Router::new().route("/api/health", get(health));

    for service in Service::ALL {
        let handler = any(move |State(state): State<GatewayState>, request: Request| async move {
            forward(&state, service, request).await
        });
        let prefix = service.route_prefix();
        // `{*path}` needs at least one character, so the bare `prefix/` is
        // registered separately.
        router = router
            .route(&format!("{prefix}/"), handler.clone())
            .route(&format!("{prefix}/{{*path}}"), handler);
    }

    router.with_state(state)
}

/// GET /api/health
///
/// Liveness only; never touches Adyen.
async fn health(State(state): State<GatewayState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": state.app_environment,
    }))
}

/// CORS for the configured frontend origins, with credentials.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
