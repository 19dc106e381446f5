//! Request forwarding — one inbound request becomes one upstream call.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::{Query, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use tracing::{error, info, warn};

use crate::adyen::{Environment, Service, UpstreamTable};
use crate::error::GatewayError;

/// Largest inbound body the proxy will buffer.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

const API_KEY_HEADER: &str = "x-api-key";
const ENVIRONMENT_PARAM: &str = "environment";

/// Shared, immutable gateway state.
#[derive(Clone)]
pub struct GatewayState {
    pub client: reqwest::Client,
    pub upstreams: Arc<UpstreamTable>,
    /// Deployment name reported by the health probe.
    pub app_environment: String,
}

impl GatewayState {
    pub fn new(
        upstreams: UpstreamTable,
        app_environment: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Internal(e.to_string()))?;
        Ok(Self {
            client,
            upstreams: Arc::new(upstreams),
            app_environment: app_environment.into(),
        })
    }
}

/// A fully resolved upstream call.
#[derive(Debug)]
struct Forward {
    method: Method,
    target_url: String,
    query: Vec<(String, String)>,
    api_key: HeaderValue,
}

/// Forward `request` to `service` and relay whatever comes back.
pub async fn forward(state: &GatewayState, service: Service, request: Request) -> Response {
    match try_forward(state, service, request).await {
        Ok(response) => response,
        Err(e) => {
            match &e {
                GatewayError::MissingApiKey => warn!(service = service.slug(), "Missing API key"),
                GatewayError::Unavailable(reason) => {
                    error!(service = service.slug(), %reason, "Network error reaching Adyen")
                }
                GatewayError::Internal(reason) => {
                    error!(service = service.slug(), %reason, "Unexpected proxy error")
                }
            }
            e.into_response()
        }
    }
}

async fn try_forward(
    state: &GatewayState,
    service: Service,
    request: Request,
) -> Result<Response, GatewayError> {
    let (parts, body) = request.into_parts();
    let call = resolve(&state.upstreams, service, &parts)?;
    info!(method = %call.method, target = %call.target_url, "Proxying request");

    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| GatewayError::Internal(e.to_string()))?;

    let mut upstream = state
        .client
        .request(call.method, &call.target_url)
        .header(CONTENT_TYPE, "application/json")
        .header(API_KEY_HEADER, call.api_key)
        .body(body);
    if !call.query.is_empty() {
        upstream = upstream.query(&call.query);
    }

    let response = upstream.send().await.map_err(|e| {
        if e.is_builder() {
            GatewayError::Internal(e.to_string())
        } else {
            GatewayError::Unavailable(e.to_string())
        }
    })?;

    relay(response).await
}

/// Work out where a request goes, rejecting it before any network activity
/// if the API key is missing.
fn resolve(
    upstreams: &UpstreamTable,
    service: Service,
    parts: &axum::http::request::Parts,
) -> Result<Forward, GatewayError> {
    let params: Vec<(String, String)> = Query::try_from_uri(&parts.uri)
        .map(|Query(params)| params)
        .unwrap_or_default();

    let environment = Environment::from_param(
        params
            .iter()
            .find(|(k, _)| k == ENVIRONMENT_PARAM)
            .map(|(_, v)| v.as_str()),
    );
    let query = params
        .into_iter()
        .filter(|(k, _)| k != ENVIRONMENT_PARAM)
        .collect();

    let prefix = service.route_prefix();
    let path = parts.uri.path();
    let suffix = path.strip_prefix(prefix.as_str()).unwrap_or(path);
    let target_url = upstreams.target_url(service, environment, suffix);

    let api_key = parts
        .headers
        .get(API_KEY_HEADER)
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or(GatewayError::MissingApiKey)?;

    Ok(Forward {
        method: parts.method.clone(),
        target_url,
        query,
        api_key,
    })
}

/// Relay the upstream status and body verbatim, success or not.
async fn relay(response: reqwest::Response) -> Result<Response, GatewayError> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));
    let bytes: Bytes = response
        .bytes()
        .await
        .map_err(|e| GatewayError::Internal(e.to_string()))?;

    if !status.is_success() {
        warn!(
            status = status.as_u16(),
            body = %String::from_utf8_lossy(&bytes),
            "Adyen API error"
        );
    }

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(bytes))
        .map_err(|e| GatewayError::Internal(e.to_string()))
}
