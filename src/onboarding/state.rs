//! Run state — phase machine, produced identifiers, and per-step results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where the orchestrator is in its lifecycle.
///
/// `Idle → Running { step } → Completed | Failed { step }`. Steps are
/// 0-based indexes into the step table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    Running {
        step: usize,
    },
    Completed,
    Failed {
        step: usize,
    },
}

impl RunPhase {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed { .. })
    }

    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: RunPhase) -> bool {
        use RunPhase::*;
        match (self, target) {
            (Idle | Completed | Failed { .. }, Running { step: 0 }) => true,
            (Running { step: from }, Running { step: to }) => to == from + 1,
            (Running { .. }, Completed) => true,
            (Running { step: from }, Failed { step: at }) => *from == at,
            _ => false,
        }
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running { step } => write!(f, "running(step {})", step + 1),
            Self::Completed => write!(f, "completed"),
            Self::Failed { step } => write!(f, "failed(step {})", step + 1),
        }
    }
}

/// Identifiers produced during a run. Each is written once, by one step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessState {
    pub legal_entity_id: Option<String>,
    pub account_holder_id: Option<String>,
    pub balance_account_id: Option<String>,
    pub business_line_id: Option<String>,
    pub store_id: Option<String>,
}

impl ProcessState {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Which [`ProcessState`] slot a step fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducedId {
    LegalEntity,
    AccountHolder,
    BalanceAccount,
    BusinessLine,
    Store,
}

impl ProducedId {
    pub fn slot<'a>(&self, state: &'a mut ProcessState) -> &'a mut Option<String> {
        match self {
            Self::LegalEntity => &mut state.legal_entity_id,
            Self::AccountHolder => &mut state.account_holder_id,
            Self::BalanceAccount => &mut state.balance_account_id,
            Self::BusinessLine => &mut state.business_line_id,
            Self::Store => &mut state.store_id,
        }
    }
}

/// Outcome of one executed step. Never mutated after it is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Raw upstream payload (the success body, or the error body).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<bool>,
}

impl StepResult {
    pub fn succeeded(
        message: impl Into<String>,
        data: Option<serde_json::Value>,
        response: serde_json::Value,
    ) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            response: Some(response),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>, response: Option<serde_json::Value>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            response,
            error: Some(true),
        }
    }
}

/// Final outcome of a run returned by `Orchestrator::start`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub phase: RunPhase,
    pub results: Vec<StepResult>,
    pub process: ProcessState,
}

impl RunReport {
    /// True iff every recorded result succeeded and all steps ran.
    pub fn is_success(&self) -> bool {
        self.phase == RunPhase::Completed
    }

    /// Hosted onboarding URL produced by the last step, if the run got there.
    pub fn onboarding_url(&self) -> Option<&str> {
        self.results
            .last()
            .filter(|r| r.success)
            .and_then(|r| r.data.as_ref())
            .and_then(|d| d.get("url"))
            .and_then(|u| u.as_str())
    }
}

/// Point-in-time view of the orchestrator, for status endpoints.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSnapshot {
    pub run_id: Option<Uuid>,
    #[serde(flatten)]
    pub phase: RunPhase,
    /// Wizard-style marker: 0 when idle, the 1-based step while running or
    /// where it failed, and one past the last step after success.
    pub current_step: usize,
    pub results: Vec<StepResult>,
    pub process: ProcessState,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSnapshot {
    pub fn is_processing(&self) -> bool {
        self.phase.is_running()
    }
}
