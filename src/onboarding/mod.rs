//! Onboarding workflow — a fixed, linear sequence of Adyen calls.
//!
//! The orchestrator creates the legal entity, account holder, balance
//! account, business line and store, configures payment methods, and finally
//! requests a hosted onboarding link. Each step feeds the identifiers it
//! produced into later steps; the first failure ends the run.

pub mod manager;
pub mod model;
pub mod observer;
pub mod routes;
pub mod state;
pub mod steps;

#[cfg(test)]
pub(crate) mod testing;

pub use manager::{DEFAULT_STEP_DELAY, Orchestrator, PreparedRun};
pub use model::{Address, BusinessDetails, OnboardingConfig, OnboardingSettings, Organization};
pub use observer::{NoopObserver, ProgressObserver, TracingObserver};
pub use routes::{OnboardingRouteState, onboarding_routes};
pub use state::{ProcessState, ProducedId, RunPhase, RunReport, RunSnapshot, StepResult};
pub use steps::{STEPS, StepDefinition, StepKind, StepOutcome};
