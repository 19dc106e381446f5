//! Adyen sub-APIs, environments, and the base URL table that ties them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Which Adyen platform a call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Test,
    Live,
}

impl Environment {
    /// Lenient parse used for the `environment` query parameter: anything
    /// other than `live` selects the test platform.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("live") => Self::Live,
            _ => Self::Test,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Live => "live",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three Adyen REST services the gateway fronts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Legal Entity Management.
    Lem,
    /// Balance Platform configuration.
    Bcl,
    Management,
}

impl Service {
    pub const ALL: [Service; 3] = [Service::Lem, Service::Bcl, Service::Management];

    /// Path segment used both in local routes and by the API client.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Lem => "lem",
            Self::Bcl => "bcl",
            Self::Management => "management",
        }
    }

    /// Local routing prefix, e.g. `/api/adyen/lem`.
    pub fn route_prefix(&self) -> String {
        format!("/api/adyen/{}", self.slug())
    }

    fn default_base_url(&self, environment: Environment) -> &'static str {
        match (self, environment) {
            (Self::Lem, Environment::Test) => "https://kyc-test.adyen.com/lem/v3",
            (Self::Lem, Environment::Live) => "https://kyc-live.adyen.com/lem/v3",
            (Self::Bcl, Environment::Test) => "https://balanceplatform-api-test.adyen.com/bcl/v2",
            (Self::Bcl, Environment::Live) => "https://balanceplatform-api-live.adyen.com/bcl/v2",
            (Self::Management, Environment::Test) => "https://management-test.adyen.com/v3",
            (Self::Management, Environment::Live) => "https://management-live.adyen.com/v3",
        }
    }
}

/// Base URL for every (service, environment) pair.
#[derive(Debug, Clone)]
pub struct UpstreamTable {
    urls: HashMap<(Service, Environment), String>,
}

impl Default for UpstreamTable {
    fn default() -> Self {
        let urls = Service::ALL
            .into_iter()
            .flat_map(|service| {
                [Environment::Test, Environment::Live].map(|env| {
                    ((service, env), service.default_base_url(env).to_string())
                })
            })
            .collect();
        Self { urls }
    }
}

impl UpstreamTable {
    /// Replace one entry, e.g. to point a service at a local fake.
    pub fn with_base_url(
        mut self,
        service: Service,
        environment: Environment,
        url: impl Into<String>,
    ) -> Self {
        let url = url.into();
        self.urls
            .insert((service, environment), url.trim_end_matches('/').to_string());
        self
    }

    pub fn base_url(&self, service: Service, environment: Environment) -> &str {
        self.urls
            .get(&(service, environment))
            .map(String::as_str)
            .unwrap_or_else(|| service.default_base_url(environment))
    }

    /// Full upstream URL for a path suffix (which keeps its leading `/`).
    pub fn target_url(&self, service: Service, environment: Environment, suffix: &str) -> String {
        format!("{}{}", self.base_url(service, environment), suffix)
    }
}
