//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Ceiling applied to every outbound HTTP call, both in the gateway and in
/// the API client.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Process configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Deployment name reported by the health probe (`NODE_ENV`).
    pub app_environment: String,
    /// Origins allowed by CORS.
    pub allowed_origins: Vec<String>,
    /// Address the onboarding API client uses to reach this proxy.
    pub proxy_base_url: String,
    /// Pause between successful onboarding steps.
    pub step_delay: Duration,
    /// Timeout for outbound calls.
    pub upstream_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            app_environment: "development".to_string(),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
            proxy_base_url: "http://localhost:3001".to_string(),
            step_delay: Duration::from_millis(500),
            upstream_timeout: UPSTREAM_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    /// Build config from environment variables, falling back to defaults for
    /// anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".into(),
                message: format!("'{raw}' is not a valid port"),
            })?,
            None => defaults.port,
        };

        let app_environment = lookup("NODE_ENV")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.app_environment);

        let allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.allowed_origins,
        };

        let proxy_base_url = lookup("PROXY_BASE_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("http://localhost:{port}"));

        let step_delay = match lookup("ONBOARDING_STEP_DELAY_MS") {
            Some(raw) => Duration::from_millis(raw.trim().parse().map_err(|_| {
                ConfigError::InvalidValue {
                    key: "ONBOARDING_STEP_DELAY_MS".into(),
                    message: format!("'{raw}' is not a number of milliseconds"),
                }
            })?),
            None => defaults.step_delay,
        };

        Ok(Self {
            port,
            app_environment,
            allowed_origins,
            proxy_base_url,
            step_delay,
            upstream_timeout: defaults.upstream_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = GatewayConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.app_environment, "development");
        assert_eq!(config.proxy_base_url, "http://localhost:3001");
        assert_eq!(config.allowed_origins.len(), 2);
        assert_eq!(config.step_delay, Duration::from_millis(500));
        assert_eq!(config.upstream_timeout, Duration::from_secs(30));
    }

    #[test]
    fn proxy_url_follows_port_unless_overridden() {
        let config = GatewayConfig::from_lookup(lookup(&[("PORT", "8080")])).unwrap();
        assert_eq!(config.proxy_base_url, "http://localhost:8080");

        let config = GatewayConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("PROXY_BASE_URL", "https://onboarding.example.com/"),
        ]))
        .unwrap();
        assert_eq!(config.proxy_base_url, "https://onboarding.example.com");
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        let config = GatewayConfig::from_lookup(lookup(&[(
            "CORS_ALLOWED_ORIGINS",
            "https://a.example.com, https://b.example.com,,",
        )]))
        .unwrap();
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example.com", "https://b.example.com"]
        );
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = GatewayConfig::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn invalid_delay_is_rejected() {
        let err = GatewayConfig::from_lookup(lookup(&[("ONBOARDING_STEP_DELAY_MS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("ONBOARDING_STEP_DELAY_MS"));
    }
}
