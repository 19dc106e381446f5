//! Orchestrator — runs the onboarding steps in order, one run at a time.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::OnboardingConfig;
use super::observer::ProgressObserver;
use super::state::{ProcessState, RunPhase, RunReport, RunSnapshot, StepResult};
use super::steps::{STEPS, StepDefinition};
use crate::adyen::{AdyenApi, ApiConnector};
use crate::error::OnboardingError;

/// Default pause between successful steps.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(500);

struct Inner {
    connector: Arc<dyn ApiConnector>,
    observer: Arc<dyn ProgressObserver>,
    step_delay: Duration,
    snapshot: RwLock<RunSnapshot>,
}

/// Drives the onboarding workflow. Cheap to clone; clones share one run slot.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl Orchestrator {
    pub fn new(
        connector: Arc<dyn ApiConnector>,
        observer: Arc<dyn ProgressObserver>,
        step_delay: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                connector,
                observer,
                step_delay,
                snapshot: RwLock::new(RunSnapshot::default()),
            }),
        }
    }

    /// The workflow this orchestrator executes.
    pub fn steps(&self) -> &'static [StepDefinition] {
        &STEPS
    }

    /// Current state of the latest run (or idle).
    pub async fn snapshot(&self) -> RunSnapshot {
        self.inner.snapshot.read().await.clone()
    }

    pub async fn is_running(&self) -> bool {
        self.inner.snapshot.read().await.phase.is_running()
    }

    /// Run the whole workflow for `config`.
    ///
    /// Step failures are reported in the returned [`RunReport`]; only misuse
    /// (a run already active) or a client construction fault is an `Err`.
    pub async fn start(&self, config: OnboardingConfig) -> Result<RunReport, OnboardingError> {
        Ok(self.begin(config).await?.run().await)
    }

    /// Claim the run slot and reset all run state, without executing anything.
    ///
    /// The returned [`PreparedRun`] should be driven with [`PreparedRun::run`];
    /// until then the orchestrator reports step 1 as running. Dropping it
    /// instead releases the slot.
    pub async fn begin(&self, config: OnboardingConfig) -> Result<PreparedRun, OnboardingError> {
        let mut snapshot = self.inner.snapshot.write().await;
        if snapshot.phase.is_running() {
            tracing::warn!(run_id = ?snapshot.run_id, "Rejected start: run already in progress");
            return Err(OnboardingError::AlreadyRunning);
        }

        let api = self
            .inner
            .connector
            .connect(config.environment, &config.credentials)?;

        let run_id = Uuid::new_v4();
        debug_assert!(snapshot.phase.can_transition_to(RunPhase::Running { step: 0 }));
        *snapshot = RunSnapshot {
            run_id: Some(run_id),
            phase: RunPhase::Running { step: 0 },
            current_step: 1,
            results: Vec::new(),
            process: ProcessState::default(),
            started_at: Some(chrono::Utc::now()),
            finished_at: None,
        };
        tracing::info!(
            %run_id,
            environment = %config.environment,
            legal_name = %config.organization.legal_name,
            "Onboarding run started"
        );

        Ok(PreparedRun {
            orchestrator: self.clone(),
            config,
            api,
            slot: RunSlot {
                inner: self.inner.clone(),
                run_id,
                finished: false,
            },
        })
    }

    async fn enter_step(&self, index: usize) {
        let mut snapshot = self.inner.snapshot.write().await;
        let next = RunPhase::Running { step: index };
        if snapshot.phase != next {
            debug_assert!(snapshot.phase.can_transition_to(next));
            snapshot.phase = next;
        }
        snapshot.current_step = index + 1;
    }

    async fn record(&self, result: StepResult, process: &ProcessState) {
        let mut snapshot = self.inner.snapshot.write().await;
        snapshot.results.push(result);
        snapshot.process = process.clone();
    }

    async fn finish(&self, phase: RunPhase, current_step: usize) {
        let mut snapshot = self.inner.snapshot.write().await;
        debug_assert!(snapshot.phase.can_transition_to(phase));
        snapshot.phase = phase;
        snapshot.current_step = current_step;
        snapshot.finished_at = Some(chrono::Utc::now());
    }
}

/// Releases the run slot if a run ends without reaching `finish`: the
/// prepared run was dropped undriven, the `run` future was cancelled, or the
/// task running it panicked.
struct RunSlot {
    inner: Arc<Inner>,
    run_id: Uuid,
    finished: bool,
}

impl RunSlot {
    fn complete(mut self) {
        self.finished = true;
    }
}

impl Drop for RunSlot {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        tracing::warn!(run_id = %self.run_id, "Onboarding run abandoned before finishing");
        self.inner.observer.run_finished(false);

        let run_id = self.run_id;
        match self.inner.snapshot.try_write() {
            Ok(mut snapshot) => abandon(&mut snapshot, run_id),
            Err(_) => {
                // Someone holds the lock right now; release from a task instead.
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    let inner = self.inner.clone();
                    handle.spawn(async move {
                        abandon(&mut *inner.snapshot.write().await, run_id);
                    });
                }
            }
        }
    }
}

/// Mark `run_id` as failed at the first step that has no result, unless a
/// newer run has already replaced it.
fn abandon(snapshot: &mut RunSnapshot, run_id: Uuid) {
    if snapshot.run_id != Some(run_id) || !snapshot.phase.is_running() {
        return;
    }
    let step = snapshot.results.len().min(STEPS.len() - 1);
    if snapshot.results.len() == step {
        snapshot
            .results
            .push(StepResult::failed("Onboarding run was interrupted", None));
    }
    snapshot.phase = RunPhase::Failed { step };
    snapshot.current_step = step + 1;
    snapshot.finished_at = Some(chrono::Utc::now());
}

/// A claimed, not yet executed run.
///
/// Dropping it without calling [`PreparedRun::run`] releases the slot and
/// marks the run failed.
#[must_use = "a prepared run holds the run slot until it is driven or dropped"]
pub struct PreparedRun {
    orchestrator: Orchestrator,
    config: OnboardingConfig,
    api: Arc<dyn AdyenApi>,
    slot: RunSlot,
}

impl PreparedRun {
    pub fn run_id(&self) -> Uuid {
        self.slot.run_id
    }

    /// Execute the steps in order, halting at the first failure.
    pub async fn run(self) -> RunReport {
        let Self {
            orchestrator,
            config,
            api,
            slot,
        } = self;
        let run_id = slot.run_id;
        let inner = &orchestrator.inner;

        let mut process = ProcessState::default();
        let mut results: Vec<StepResult> = Vec::with_capacity(STEPS.len());
        inner.observer.run_started();

        for (index, step) in STEPS.iter().enumerate() {
            orchestrator.enter_step(index).await;
            tracing::debug!(%run_id, step = index + 1, endpoint = %step.endpoint, "Executing step");

            let result = match step.endpoint.execute(api.as_ref(), &config, &process).await {
                Ok(outcome) => {
                    if let Some((slot, id)) = outcome.produced {
                        *slot.slot(&mut process) = Some(id);
                    }
                    StepResult::succeeded(outcome.message, outcome.data, outcome.response)
                }
                Err(e) => StepResult::failed(e.to_string(), e.response()),
            };

            let success = result.success;
            orchestrator.record(result.clone(), &process).await;

            if !success {
                inner.observer.step_failed(index, step, &result);
                results.push(result);
                break;
            }

            inner.observer.step_succeeded(index, step, &result);
            results.push(result);

            if index + 1 < STEPS.len() && !inner.step_delay.is_zero() {
                tokio::time::sleep(inner.step_delay).await;
            }
        }

        let success = results.len() == STEPS.len() && results.iter().all(|r| r.success);
        let (phase, current_step) = if success {
            (RunPhase::Completed, STEPS.len() + 1)
        } else {
            let failed = results.len().saturating_sub(1);
            (RunPhase::Failed { step: failed }, failed + 1)
        };
        orchestrator.finish(phase, current_step).await;
        slot.complete();
        inner.observer.run_finished(success);
        tracing::info!(%run_id, %phase, steps_run = results.len(), "Onboarding run finished");

        RunReport {
            run_id,
            phase,
            results,
            process,
        }
    }
}
