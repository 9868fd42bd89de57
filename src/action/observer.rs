//! Chain instrumentation: step transitions and the per-chain report.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use super::descriptor::{ActionError, ActionKind};

/// Lifecycle of one chain step: `Pending -> Executing -> {Succeeded, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Pending,
    Executing,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Failed)
    }
}

/// Engine-wide unique id of one executed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(pub u64);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step#{}", self.0)
    }
}

/// Sees every step transition of every chain an engine runs.
pub trait ActionObserver: Send + Sync {
    fn on_transition(&self, step: StepId, kind: ActionKind, phase: Phase);
}

/// Why a step failed.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// The auth or network collaborator reported an error (or a failing status).
    Effect(String),
    /// Form pre-flight validation failed; field id -> message.
    Validation(BTreeMap<String, String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Succeeded,
    Failed(FailureReason),
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Succeeded)
    }
}

/// One executed step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub id: StepId,
    pub kind: ActionKind,
    pub outcome: StepOutcome,
    /// Result payload written to the scratch key, if the step produces one.
    pub payload: Option<Value>,
}

/// How a chain ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Termination {
    /// The last step ran and had nothing (or nothing applicable) to continue with.
    Completed,
    /// The last step failed and no error branch was given.
    FailedUnhandled,
    /// The screen unmounted before the next step could start.
    Unmounted,
    /// The descriptor was rejected before any step ran.
    Rejected(ActionError),
}

/// Everything that happened in one chain, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainReport {
    pub steps: Vec<StepRecord>,
    pub termination: Termination,
}

impl ChainReport {
    pub(crate) fn new() -> Self {
        Self {
            steps: Vec::new(),
            termination: Termination::Completed,
        }
    }

    pub(crate) fn rejected(error: ActionError) -> Self {
        Self {
            steps: Vec::new(),
            termination: Termination::Rejected(error),
        }
    }

    /// Kinds of the executed steps, in order.
    pub fn kinds(&self) -> Vec<ActionKind> {
        self.steps.iter().map(|s| s.kind).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The chain ran to its end (success or a handled failure).
    pub fn is_completed(&self) -> bool {
        self.termination == Termination::Completed
    }

    pub fn last(&self) -> Option<&StepRecord> {
        self.steps.last()
    }
}
