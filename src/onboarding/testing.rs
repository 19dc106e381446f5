//! In-memory `AdyenApi` double for orchestrator tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};

use super::steps::StepKind;
use crate::adyen::requests::{
    AccountHolderRequest, BalanceAccountRequest, BusinessLineRequest, LegalEntityRequest,
    OnboardingLinkRequest, PaymentMethodRequest, StoreRequest,
};
use crate::adyen::{AdyenApi, ApiConnector, ApiCredentials, Environment};
use crate::error::ApiError;

/// (step, path argument, serialized body)
pub type RecordedCall = (StepKind, Option<String>, Value);

/// Records every call and answers with canned ids unless told otherwise.
#[derive(Default)]
pub struct RecordingApi {
    calls: Mutex<Vec<RecordedCall>>,
    overrides: Mutex<HashMap<StepKind, Result<Value, ApiError>>>,
    latency: Duration,
}

impl RecordingApi {
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// Answer `step` with `result` instead of the canned success.
    pub fn respond_with(self, step: StepKind, result: Result<Value, ApiError>) -> Self {
        self.overrides.lock().unwrap().insert(step, result);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call(&self, step: StepKind) -> Option<(Option<String>, Value)> {
        self.calls()
            .into_iter()
            .find(|(s, _, _)| *s == step)
            .map(|(_, target, body)| (target, body))
    }

    async fn answer<T: Serialize + Sync>(
        &self,
        step: StepKind,
        target: Option<&str>,
        body: &T,
    ) -> Result<Value, ApiError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let body = serde_json::to_value(body).unwrap();
        self.calls
            .lock()
            .unwrap()
            .push((step, target.map(str::to_string), body));

        if let Some(result) = self.overrides.lock().unwrap().remove(&step) {
            return result;
        }
        Ok(match step {
            StepKind::CreateOrganization => json!({"id": "LE-1"}),
            StepKind::CreateAccountHolder => json!({"id": "AH-1"}),
            StepKind::CreateBalanceAccount => json!({"id": "BA-1"}),
            StepKind::CreateBusinessLines => json!({"id": "BL-1"}),
            StepKind::CreateStore => json!({"id": "ST-1"}),
            StepKind::ConfigurePaymentMethods => json!({"id": "PM-1", "type": "visa"}),
            StepKind::CreateOnboardingLink => json!({
                "hostedOnboardingUrl":
                    format!("https://onboarding.example.com/{}", target.unwrap_or_default())
            }),
        })
    }
}

#[async_trait]
impl AdyenApi for RecordingApi {
    async fn create_organization(&self, data: &LegalEntityRequest) -> Result<Value, ApiError> {
        self.answer(StepKind::CreateOrganization, None, data).await
    }

    async fn create_account_holder(&self, data: &AccountHolderRequest) -> Result<Value, ApiError> {
        self.answer(StepKind::CreateAccountHolder, None, data).await
    }

    async fn create_balance_account(
        &self,
        data: &BalanceAccountRequest,
    ) -> Result<Value, ApiError> {
        self.answer(StepKind::CreateBalanceAccount, None, data).await
    }

    async fn create_business_lines(&self, data: &BusinessLineRequest) -> Result<Value, ApiError> {
        self.answer(StepKind::CreateBusinessLines, None, data).await
    }

    async fn create_store(&self, data: &StoreRequest) -> Result<Value, ApiError> {
        self.answer(StepKind::CreateStore, None, data).await
    }

    async fn configure_payment_methods(
        &self,
        data: &PaymentMethodRequest,
        merchant_id: &str,
    ) -> Result<Value, ApiError> {
        self.answer(StepKind::ConfigurePaymentMethods, Some(merchant_id), data)
            .await
    }

    async fn create_onboarding_link(
        &self,
        legal_entity_id: &str,
        data: &OnboardingLinkRequest,
    ) -> Result<Value, ApiError> {
        self.answer(StepKind::CreateOnboardingLink, Some(legal_entity_id), data)
            .await
    }
}

/// Connector that hands out the same shared double on every run.
pub struct SharedConnector(pub Arc<RecordingApi>);

impl ApiConnector for SharedConnector {
    fn connect(
        &self,
        _environment: Environment,
        _credentials: &ApiCredentials,
    ) -> Result<Arc<dyn AdyenApi>, ApiError> {
        Ok(self.0.clone())
    }
}
