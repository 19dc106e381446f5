//! Caller-supplied onboarding input.

use serde::Deserialize;

use crate::adyen::{ApiCredentials, Environment};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
}

/// Legal identity of the organization being onboarded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub legal_name: String,
    pub registration_number: String,
    pub vat_number: String,
    /// Merchant reference reused as shopper statement and store reference.
    #[serde(default)]
    pub reference: String,
    pub address: Address,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessDetails {
    pub industry_code: String,
    pub web_address: String,
    pub merchant_id: String,
    pub phone_number: String,
}

/// Hosted onboarding page settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingSettings {
    pub redirect_url: String,
    pub locale: String,
    #[serde(default)]
    pub theme_id: Option<String>,
}

impl OnboardingSettings {
    /// Theme id, if one was given and is not blank.
    pub fn theme(&self) -> Option<&str> {
        self.theme_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Everything one onboarding run needs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingConfig {
    pub organization: Organization,
    pub business: BusinessDetails,
    pub onboarding: OnboardingSettings,
    #[serde(flatten)]
    pub credentials: ApiCredentials,
    #[serde(default)]
    pub environment: Environment,
}
