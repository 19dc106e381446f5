//! Request bodies sent to the Adyen APIs through the proxy.
//!
//! Only the fields the onboarding flow sets are modelled; everything is
//! serialized in the camelCase form Adyen expects.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredAddress {
    pub city: String,
    pub country: String,
    pub postal_code: String,
    pub street: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationDetails {
    pub legal_name: String,
    pub registration_number: String,
    pub vat_number: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub registered_address: RegisteredAddress,
}

/// `POST /legalEntities`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalEntityRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub organization: OrganizationDetails,
    pub reference: String,
}

/// `POST /accountHolders`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountHolderRequest {
    pub legal_entity_id: String,
    pub description: String,
    pub reference: String,
}

/// `POST /balanceAccounts`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceAccountRequest {
    pub account_holder_id: String,
    pub description: String,
    pub default_currency_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebData {
    pub web_address: String,
}

/// `POST /businessLines`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessLineRequest {
    pub service: String,
    pub industry_code: String,
    pub sales_channels: Vec<String>,
    pub legal_entity_id: String,
    pub web_data: Vec<WebData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreAddress {
    pub country: String,
    pub line1: String,
    pub city: String,
    pub postal_code: String,
}

/// `POST /stores`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRequest {
    pub merchant_id: String,
    pub description: String,
    pub shopper_statement: String,
    pub phone_number: String,
    pub reference: String,
    pub business_line_ids: Vec<String>,
    pub address: StoreAddress,
}

/// `POST /merchants/{merchantId}/paymentMethodSettings`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodRequest {
    pub business_line_id: String,
    pub store_ids: Vec<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub currencies: Vec<String>,
    pub countries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingLinkSettings {
    pub change_legal_entity_type: bool,
    pub edit_prefilled_country: bool,
    pub allow_bank_account_format_selection: bool,
    pub allow_intra_region_cross_border_payout: bool,
}

impl Default for OnboardingLinkSettings {
    fn default() -> Self {
        Self {
            change_legal_entity_type: true,
            edit_prefilled_country: true,
            allow_bank_account_format_selection: false,
            allow_intra_region_cross_border_payout: false,
        }
    }
}

/// `POST /legalEntities/{id}/onboardingLinks`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingLinkRequest {
    pub redirect_url: String,
    pub locale: String,
    pub settings: OnboardingLinkSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<String>,
}
