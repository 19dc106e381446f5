//! Shared harness: a fake Adyen upstream and an in-process gateway, each on
//! a random local port.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use merchant_onboarding::adyen::{ApiCredentials, Environment, Service, UpstreamTable};
use merchant_onboarding::gateway::{GatewayState, gateway_routes};
use merchant_onboarding::onboarding::{
    Address, BusinessDetails, OnboardingConfig, OnboardingSettings, Organization,
};

/// One request as seen by the fake upstream.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    /// Path and query, exactly as received.
    pub uri: String,
    pub api_key: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Clone, Default)]
pub struct FakeAdyen {
    pub requests: Arc<Mutex<Vec<UpstreamRequest>>>,
}

impl FakeAdyen {
    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn fake_handler(
    State(fake): State<FakeAdyen>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    fake.requests.lock().unwrap().push(UpstreamRequest {
        method: method.clone(),
        uri: uri.to_string(),
        api_key: header("x-api-key"),
        content_type: header("content-type"),
        body: body.clone(),
    });

    let path = uri.path();
    if path.ends_with("/legalEntities") {
        if body["organization"]["vatNumber"] == "INVALID" {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                axum::Json(json!({"message": "Invalid VAT", "errorCode": "30_102"})),
            );
        }
        return (StatusCode::OK, axum::Json(json!({"id": "LE-100"})));
    }
    if path.ends_with("/onboardingLinks") {
        let legal_entity = path.split('/').rev().nth(1).unwrap_or_default().to_string();
        return (
            StatusCode::OK,
            axum::Json(json!({
                "hostedOnboardingUrl": format!("https://hosted.example.com/{legal_entity}")
            })),
        );
    }
    let id = match path.rsplit('/').next().unwrap_or_default() {
        "accountHolders" => "AH-100",
        "balanceAccounts" => "BA-100",
        "businessLines" => "BL-100",
        "stores" => "ST-100",
        "paymentMethodSettings" => "PM-100",
        _ => {
            return (
                StatusCode::NOT_FOUND,
                axum::Json(json!({"detail": format!("no route for {path}")})),
            );
        }
    };
    (StatusCode::OK, axum::Json(json!({"id": id})))
}

async fn serve(app: Router) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(20)).await;
    port
}

/// Start the fake upstream, return (port, handle).
pub async fn start_fake_adyen() -> (u16, FakeAdyen) {
    let fake = FakeAdyen::default();
    let app = Router::new()
        .fallback(fake_handler)
        .with_state(fake.clone());
    (serve(app).await, fake)
}

/// Upstream table whose six entries all point at the fake, each under a
/// distinct `/<service>-<env>` prefix so tests can tell them apart.
pub fn table_for(fake_port: u16) -> UpstreamTable {
    let mut table = UpstreamTable::default();
    for service in Service::ALL {
        for env in [Environment::Test, Environment::Live] {
            table = table.with_base_url(
                service,
                env,
                format!("http://127.0.0.1:{fake_port}/{}-{env}", service.slug()),
            );
        }
    }
    table
}

/// Start a gateway in front of `table`, return its port.
pub async fn start_gateway(table: UpstreamTable) -> u16 {
    let state = GatewayState::new(table, "integration", Duration::from_secs(5)).unwrap();
    serve(gateway_routes(state)).await
}

/// A port nothing listens on.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

pub fn sample_config(environment: Environment) -> OnboardingConfig {
    OnboardingConfig {
        organization: Organization {
            legal_name: "Acme SAS".into(),
            registration_number: "123456789".into(),
            vat_number: "FR12345678901".into(),
            reference: "ACME-001".into(),
            address: Address {
                street: "1 rue de Rivoli".into(),
                city: "Paris".into(),
                postal_code: "75001".into(),
                country: "FR".into(),
            },
        },
        business: BusinessDetails {
            industry_code: "4531".into(),
            web_address: "https://acme.example.com".into(),
            merchant_id: "AcmeECOM".into(),
            phone_number: "+33123456789".into(),
        },
        onboarding: OnboardingSettings {
            redirect_url: "https://acme.example.com/onboarded".into(),
            locale: "fr-FR".into(),
            theme_id: None,
        },
        credentials: ApiCredentials::new("lem-key", "mgmt-key"),
        environment,
    }
}
