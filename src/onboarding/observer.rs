//! Progress notifications emitted while a run executes.
//!
//! Purely advisory: the runner behaves identically whatever the observer
//! does, and every method defaults to a no-op.

use tracing::{error, info};

use super::state::StepResult;
use super::steps::StepDefinition;

pub trait ProgressObserver: Send + Sync {
    fn run_started(&self) {}

    fn step_succeeded(&self, _index: usize, _step: &StepDefinition, _result: &StepResult) {}

    fn step_failed(&self, _index: usize, _step: &StepDefinition, _result: &StepResult) {}

    fn run_finished(&self, _success: bool) {}
}

/// Discards all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}

/// Logs notifications through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn run_started(&self) {
        info!("Starting onboarding process");
    }

    fn step_succeeded(&self, index: usize, step: &StepDefinition, result: &StepResult) {
        info!(
            step = index + 1,
            endpoint = %step.endpoint,
            message = %result.message,
            "Step completed successfully"
        );
    }

    fn step_failed(&self, index: usize, step: &StepDefinition, result: &StepResult) {
        error!(
            step = index + 1,
            endpoint = %step.endpoint,
            message = %result.message,
            "Step failed"
        );
    }

    fn run_finished(&self, success: bool) {
        if success {
            info!("Onboarding process completed successfully");
        } else {
            error!("Onboarding process failed");
        }
    }
}
