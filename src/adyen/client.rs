//! API client — the seven Adyen calls the onboarding flow makes, routed
//! through the proxy gateway.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::endpoints::{Environment, Service};
use super::requests::{
    AccountHolderRequest, BalanceAccountRequest, BusinessLineRequest, LegalEntityRequest,
    OnboardingLinkRequest, PaymentMethodRequest, StoreRequest,
};
use crate::config::UPSTREAM_TIMEOUT;
use crate::error::ApiError;

/// The Adyen operations the onboarding flow depends on.
///
/// Each returns the parsed upstream response body.
#[async_trait]
pub trait AdyenApi: Send + Sync {
    async fn create_organization(&self, data: &LegalEntityRequest) -> Result<Value, ApiError>;

    async fn create_account_holder(&self, data: &AccountHolderRequest) -> Result<Value, ApiError>;

    async fn create_balance_account(&self, data: &BalanceAccountRequest)
    -> Result<Value, ApiError>;

    async fn create_business_lines(&self, data: &BusinessLineRequest) -> Result<Value, ApiError>;

    async fn create_store(&self, data: &StoreRequest) -> Result<Value, ApiError>;

    async fn configure_payment_methods(
        &self,
        data: &PaymentMethodRequest,
        merchant_id: &str,
    ) -> Result<Value, ApiError>;

    async fn create_onboarding_link(
        &self,
        legal_entity_id: &str,
        data: &OnboardingLinkRequest,
    ) -> Result<Value, ApiError>;
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

/// The two API keys a run needs. Debug output is redacted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCredentials {
    /// Used for Legal Entity Management and Balance Platform calls.
    #[serde(deserialize_with = "deserialize_secret")]
    pub lem_api_key: SecretString,
    /// Used for Management API calls.
    #[serde(deserialize_with = "deserialize_secret")]
    pub management_api_key: SecretString,
}

impl ApiCredentials {
    pub fn new(lem_api_key: impl Into<String>, management_api_key: impl Into<String>) -> Self {
        Self {
            lem_api_key: SecretString::from(lem_api_key.into()),
            management_api_key: SecretString::from(management_api_key.into()),
        }
    }
}

/// Builds an [`AdyenApi`] bound to one run's credentials and environment.
pub trait ApiConnector: Send + Sync {
    fn connect(
        &self,
        environment: Environment,
        credentials: &ApiCredentials,
    ) -> Result<Arc<dyn AdyenApi>, ApiError>;
}

/// Connector producing [`ProxyClient`]s that talk to the gateway.
#[derive(Debug, Clone)]
pub struct ProxyConnector {
    pub proxy_base_url: String,
    pub timeout: Duration,
}

impl ProxyConnector {
    pub fn new(proxy_base_url: impl Into<String>) -> Self {
        Self {
            proxy_base_url: proxy_base_url.into(),
            timeout: UPSTREAM_TIMEOUT,
        }
    }
}

impl ApiConnector for ProxyConnector {
    fn connect(
        &self,
        environment: Environment,
        credentials: &ApiCredentials,
    ) -> Result<Arc<dyn AdyenApi>, ApiError> {
        let client = ProxyClient::new(&self.proxy_base_url, environment, credentials, self.timeout)?;
        Ok(Arc::new(client))
    }
}

/// HTTP client for the proxy gateway.
pub struct ProxyClient {
    http: reqwest::Client,
    proxy_base_url: String,
    environment: Environment,
    lem_api_key: SecretString,
    management_api_key: SecretString,
}

impl ProxyClient {
    pub fn new(
        proxy_base_url: &str,
        environment: Environment,
        credentials: &ApiCredentials,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;
        Ok(Self {
            http,
            proxy_base_url: proxy_base_url.trim_end_matches('/').to_string(),
            environment,
            lem_api_key: SecretString::from(credentials.lem_api_key.expose_secret().to_owned()),
            management_api_key: SecretString::from(
                credentials.management_api_key.expose_secret().to_owned(),
            ),
        })
    }

    fn url(&self, service: Service, path: &str) -> String {
        format!("{}{}{}", self.proxy_base_url, service.route_prefix(), path)
    }

    fn key_for(&self, service: Service) -> &SecretString {
        match service {
            Service::Lem | Service::Bcl => &self.lem_api_key,
            Service::Management => &self.management_api_key,
        }
    }

    async fn post<T: Serialize + Sync>(
        &self,
        service: Service,
        path: &str,
        body: &T,
    ) -> Result<Value, ApiError> {
        let url = self.url(service, path);
        tracing::debug!(%url, environment = %self.environment, "Posting to proxy");

        let response = self
            .http
            .post(&url)
            .query(&[("environment", self.environment.as_str())])
            .header("X-API-Key", self.key_for(service).expose_secret())
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        read_response(response).await
    }
}

#[async_trait]
impl AdyenApi for ProxyClient {
    async fn create_organization(&self, data: &LegalEntityRequest) -> Result<Value, ApiError> {
        tracing::info!(legal_name = %data.organization.legal_name, "Creating organization");
        self.post(Service::Lem, "/legalEntities", data).await
    }

    async fn create_account_holder(&self, data: &AccountHolderRequest) -> Result<Value, ApiError> {
        tracing::info!(legal_entity_id = %data.legal_entity_id, "Creating account holder");
        self.post(Service::Bcl, "/accountHolders", data).await
    }

    async fn create_balance_account(
        &self,
        data: &BalanceAccountRequest,
    ) -> Result<Value, ApiError> {
        tracing::info!(account_holder_id = %data.account_holder_id, "Creating balance account");
        self.post(Service::Bcl, "/balanceAccounts", data).await
    }

    async fn create_business_lines(&self, data: &BusinessLineRequest) -> Result<Value, ApiError> {
        tracing::info!(legal_entity_id = %data.legal_entity_id, "Creating business lines");
        self.post(Service::Lem, "/businessLines", data).await
    }

    async fn create_store(&self, data: &StoreRequest) -> Result<Value, ApiError> {
        tracing::info!(merchant_id = %data.merchant_id, "Creating store");
        self.post(Service::Management, "/stores", data).await
    }

    async fn configure_payment_methods(
        &self,
        data: &PaymentMethodRequest,
        merchant_id: &str,
    ) -> Result<Value, ApiError> {
        tracing::info!(%merchant_id, method = %data.kind, "Configuring payment methods");
        let path = format!("/merchants/{merchant_id}/paymentMethodSettings");
        self.post(Service::Management, &path, data).await
    }

    async fn create_onboarding_link(
        &self,
        legal_entity_id: &str,
        data: &OnboardingLinkRequest,
    ) -> Result<Value, ApiError> {
        tracing::info!(%legal_entity_id, "Creating onboarding link");
        let path = format!("/legalEntities/{legal_entity_id}/onboardingLinks");
        self.post(Service::Lem, &path, data).await
    }
}

// ── Error interceptor ───────────────────────────────────────────────────

/// Map a failure to obtain a response into the uniform error shape.
fn transport_error(e: reqwest::Error) -> ApiError {
    if e.is_builder() {
        ApiError::Client(e.to_string())
    } else {
        tracing::warn!(error = %e, "Proxy unreachable");
        ApiError::Network(e.to_string())
    }
}

/// Turn a proxy response into either the parsed body or an [`ApiError`].
async fn read_response(response: reqwest::Response) -> Result<Value, ApiError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(transport_error)?;

    if status.is_success() {
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        return serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()));
    }

    let body = parse_error_body(&bytes);
    let message = error_message(status, body.as_ref());
    tracing::warn!(status = status.as_u16(), %message, "API error");
    Err(ApiError::Upstream {
        status: status.as_u16(),
        message,
        body,
    })
}

fn parse_error_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    serde_json::from_slice(bytes)
        .ok()
        .or_else(|| Some(Value::String(String::from_utf8_lossy(bytes).into_owned())))
}

/// Pick the most descriptive message from an error payload: `message`, then
/// `detail`, then `error`, falling back to the HTTP status line.
pub fn error_message(status: StatusCode, body: Option<&Value>) -> String {
    body.and_then(|b| {
        ["message", "detail", "error"]
            .iter()
            .find_map(|key| b.get(key).and_then(Value::as_str))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
    .unwrap_or_else(|| {
        format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        )
    })
}
