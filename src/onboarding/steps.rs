//! The seven onboarding steps: static metadata plus one handler each.
//!
//! A handler checks its prerequisites against the run's [`ProcessState`],
//! builds its payload from literal defaults and the caller's config, calls
//! the API, and reports which identifier (if any) it produced. Handlers never
//! mutate state themselves; the runner applies the produced id.

use serde::Serialize;
use serde_json::{Value, json};

use super::model::OnboardingConfig;
use super::state::{ProcessState, ProducedId};
use crate::adyen::AdyenApi;
use crate::adyen::requests::{
    AccountHolderRequest, BalanceAccountRequest, BusinessLineRequest, LegalEntityRequest,
    OnboardingLinkRequest, OnboardingLinkSettings, OrganizationDetails, PaymentMethodRequest,
    RegisteredAddress, StoreAddress, StoreRequest, WebData,
};
use crate::error::StepError;

const DEFAULT_CURRENCY: &str = "EUR";

/// Closed set of onboarding operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    CreateOrganization,
    CreateAccountHolder,
    CreateBalanceAccount,
    CreateBusinessLines,
    CreateStore,
    ConfigurePaymentMethods,
    CreateOnboardingLink,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::CreateOrganization => "createOrganization",
            Self::CreateAccountHolder => "createAccountHolder",
            Self::CreateBalanceAccount => "createBalanceAccount",
            Self::CreateBusinessLines => "createBusinessLines",
            Self::CreateStore => "createStore",
            Self::ConfigurePaymentMethods => "configurePaymentMethods",
            Self::CreateOnboardingLink => "createOnboardingLink",
        };
        write!(f, "{s}")
    }
}

/// Display metadata for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepDefinition {
    pub title: &'static str,
    pub description: &'static str,
    pub endpoint: StepKind,
}

/// The workflow, in execution order.
pub const STEPS: [StepDefinition; 7] = [
    StepDefinition {
        title: "1. Create the organization",
        description: "Create the organization's legal entity in Adyen",
        endpoint: StepKind::CreateOrganization,
    },
    StepDefinition {
        title: "2. Create the account holder",
        description: "Create the account holder for the organization",
        endpoint: StepKind::CreateAccountHolder,
    },
    StepDefinition {
        title: "3. Create the balance account",
        description: "Create the balance account that holds transaction funds",
        endpoint: StepKind::CreateBalanceAccount,
    },
    StepDefinition {
        title: "4. Create the business lines",
        description: "Declare the business lines used for payment processing",
        endpoint: StepKind::CreateBusinessLines,
    },
    StepDefinition {
        title: "5. Create the store",
        description: "Create the store in the Management API",
        endpoint: StepKind::CreateStore,
    },
    StepDefinition {
        title: "6. Configure payment methods",
        description: "Configure the payment methods the store accepts",
        endpoint: StepKind::ConfigurePaymentMethods,
    },
    StepDefinition {
        title: "7. Create the onboarding link",
        description: "Generate the hosted onboarding link",
        endpoint: StepKind::CreateOnboardingLink,
    },
];

/// What a successful step hands back to the runner.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub produced: Option<(ProducedId, String)>,
    pub message: String,
    pub data: Option<Value>,
    pub response: Value,
}

impl StepKind {
    /// Run this step against `api`.
    pub async fn execute(
        self,
        api: &dyn AdyenApi,
        config: &OnboardingConfig,
        state: &ProcessState,
    ) -> Result<StepOutcome, StepError> {
        match self {
            Self::CreateOrganization => create_organization(api, config).await,
            Self::CreateAccountHolder => create_account_holder(api, config, state).await,
            Self::CreateBalanceAccount => create_balance_account(api, config, state).await,
            Self::CreateBusinessLines => create_business_lines(api, config, state).await,
            Self::CreateStore => create_store(api, config, state).await,
            Self::ConfigurePaymentMethods => configure_payment_methods(api, config, state).await,
            Self::CreateOnboardingLink => create_onboarding_link(api, config, state).await,
        }
    }
}

fn require<'a>(
    step: StepKind,
    value: &'a Option<String>,
    what: &str,
) -> Result<&'a str, StepError> {
    value.as_deref().ok_or_else(|| StepError::MissingPrerequisite {
        step,
        missing: what.to_string(),
    })
}

fn response_id(step: StepKind, response: &Value) -> Result<String, StepError> {
    response
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StepError::MissingField {
            step,
            field: "id",
            response: response.clone(),
        })
}

fn created(slot: ProducedId, label: &str, id: String, response: Value) -> StepOutcome {
    StepOutcome {
        message: format!("{label} created with ID: {id}"),
        data: Some(json!({ "id": id })),
        produced: Some((slot, id)),
        response,
    }
}

async fn create_organization(
    api: &dyn AdyenApi,
    config: &OnboardingConfig,
) -> Result<StepOutcome, StepError> {
    let org = &config.organization;
    let request = LegalEntityRequest {
        kind: "organization".into(),
        organization: OrganizationDetails {
            legal_name: org.legal_name.clone(),
            registration_number: org.registration_number.clone(),
            vat_number: org.vat_number.clone(),
            kind: "privateCompany".into(),
            registered_address: RegisteredAddress {
                city: org.address.city.clone(),
                country: org.address.country.clone(),
                postal_code: org.address.postal_code.clone(),
                street: org.address.street.clone(),
            },
        },
        reference: org.reference.clone(),
    };

    let response = api.create_organization(&request).await?;
    let id = response_id(StepKind::CreateOrganization, &response)?;
    Ok(created(ProducedId::LegalEntity, "Organization", id, response))
}

async fn create_account_holder(
    api: &dyn AdyenApi,
    config: &OnboardingConfig,
    state: &ProcessState,
) -> Result<StepOutcome, StepError> {
    let step = StepKind::CreateAccountHolder;
    let legal_entity_id = require(step, &state.legal_entity_id, "organization id")?;

    let request = AccountHolderRequest {
        legal_entity_id: legal_entity_id.to_string(),
        description: format!("{} Account Holder", config.organization.legal_name),
        reference: config.organization.reference.clone(),
    };

    let response = api.create_account_holder(&request).await?;
    let id = response_id(step, &response)?;
    Ok(created(ProducedId::AccountHolder, "Account holder", id, response))
}

async fn create_balance_account(
    api: &dyn AdyenApi,
    config: &OnboardingConfig,
    state: &ProcessState,
) -> Result<StepOutcome, StepError> {
    let step = StepKind::CreateBalanceAccount;
    let account_holder_id = require(step, &state.account_holder_id, "account holder id")?;

    let request = BalanceAccountRequest {
        account_holder_id: account_holder_id.to_string(),
        description: format!("{} Balance Account", config.organization.legal_name),
        default_currency_code: DEFAULT_CURRENCY.into(),
    };

    let response = api.create_balance_account(&request).await?;
    let id = response_id(step, &response)?;
    Ok(created(ProducedId::BalanceAccount, "Balance account", id, response))
}

async fn create_business_lines(
    api: &dyn AdyenApi,
    config: &OnboardingConfig,
    state: &ProcessState,
) -> Result<StepOutcome, StepError> {
    let step = StepKind::CreateBusinessLines;
    let legal_entity_id = require(step, &state.legal_entity_id, "organization id")?;

    let request = BusinessLineRequest {
        service: "paymentProcessing".into(),
        industry_code: config.business.industry_code.clone(),
        sales_channels: vec!["eCommerce".into()],
        legal_entity_id: legal_entity_id.to_string(),
        web_data: vec![WebData {
            web_address: config.business.web_address.clone(),
        }],
    };

    let response = api.create_business_lines(&request).await?;
    let id = response_id(step, &response)?;
    Ok(created(ProducedId::BusinessLine, "Business line", id, response))
}

async fn create_store(
    api: &dyn AdyenApi,
    config: &OnboardingConfig,
    state: &ProcessState,
) -> Result<StepOutcome, StepError> {
    let step = StepKind::CreateStore;
    let business_line_id = require(step, &state.business_line_id, "business line id")?;
    let org = &config.organization;

    let request = StoreRequest {
        merchant_id: config.business.merchant_id.clone(),
        description: format!("{} eCommerce", org.legal_name),
        shopper_statement: org.reference.clone(),
        phone_number: config.business.phone_number.clone(),
        reference: org.reference.clone(),
        business_line_ids: vec![business_line_id.to_string()],
        address: StoreAddress {
            country: org.address.country.clone(),
            line1: org.address.street.clone(),
            city: org.address.city.clone(),
            postal_code: org.address.postal_code.clone(),
        },
    };

    let response = api.create_store(&request).await?;
    let id = response_id(step, &response)?;
    Ok(created(ProducedId::Store, "Store", id, response))
}

async fn configure_payment_methods(
    api: &dyn AdyenApi,
    config: &OnboardingConfig,
    state: &ProcessState,
) -> Result<StepOutcome, StepError> {
    let step = StepKind::ConfigurePaymentMethods;
    let (Some(business_line_id), Some(store_id)) = (&state.business_line_id, &state.store_id)
    else {
        return Err(StepError::MissingPrerequisite {
            step,
            missing: "business line id or store id".into(),
        });
    };

    let request = PaymentMethodRequest {
        business_line_id: business_line_id.clone(),
        store_ids: vec![store_id.clone()],
        kind: "visa".into(),
        currencies: vec![DEFAULT_CURRENCY.into()],
        countries: vec![config.organization.address.country.clone()],
    };

    let response = api
        .configure_payment_methods(&request, &config.business.merchant_id)
        .await?;
    Ok(StepOutcome {
        produced: None,
        message: "Payment methods configured".into(),
        data: Some(response.clone()),
        response,
    })
}

async fn create_onboarding_link(
    api: &dyn AdyenApi,
    config: &OnboardingConfig,
    state: &ProcessState,
) -> Result<StepOutcome, StepError> {
    let step = StepKind::CreateOnboardingLink;
    let legal_entity_id = require(step, &state.legal_entity_id, "organization id")?;

    let request = OnboardingLinkRequest {
        redirect_url: config.onboarding.redirect_url.clone(),
        locale: config.onboarding.locale.clone(),
        settings: OnboardingLinkSettings::default(),
        theme_id: config.onboarding.theme().map(str::to_string),
    };

    let response = api.create_onboarding_link(legal_entity_id, &request).await?;
    let url = response
        .get("hostedOnboardingUrl")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StepError::MissingField {
            step,
            field: "hostedOnboardingUrl",
            response: response.clone(),
        })?;

    Ok(StepOutcome {
        produced: None,
        message: format!("Onboarding link created: {url}"),
        data: Some(json!({ "url": url })),
        response,
    })
}
