use std::sync::Arc;

use anyhow::Context;
use merchant_onboarding::adyen::{ProxyConnector, UpstreamTable};
use merchant_onboarding::config::GatewayConfig;
use merchant_onboarding::gateway::{GatewayState, cors_layer, gateway_routes};
use merchant_onboarding::onboarding::{
    OnboardingRouteState, Orchestrator, TracingObserver, onboarding_routes,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = GatewayConfig::from_env().context("invalid configuration")?;

    // ── Gateway ─────────────────────────────────────────────────────────
    let gateway_state = GatewayState::new(
        UpstreamTable::default(),
        config.app_environment.clone(),
        config.upstream_timeout,
    )
    .context("failed to build upstream HTTP client")?;

    // ── Orchestrator ────────────────────────────────────────────────────
    let connector = ProxyConnector {
        proxy_base_url: config.proxy_base_url.clone(),
        timeout: config.upstream_timeout,
    };
    let orchestrator = Orchestrator::new(
        Arc::new(connector),
        Arc::new(TracingObserver),
        config.step_delay,
    );

    let app = gateway_routes(gateway_state)
        .merge(onboarding_routes(OnboardingRouteState { orchestrator }))
        .layer(cors_layer(&config.allowed_origins));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;

    eprintln!("🚀 Adyen onboarding proxy v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Listening: http://0.0.0.0:{}", config.port);
    eprintln!("   Environment: {}", config.app_environment);
    eprintln!("   Proxy API: {}/api/adyen", config.proxy_base_url);
    eprintln!("   Onboarding API: {}/api/onboarding", config.proxy_base_url);
    tracing::info!(port = config.port, "Gateway started");

    axum::serve(listener, app).await?;
    Ok(())
}
