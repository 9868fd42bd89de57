//! Action execution: descriptors, collaborators, the engine, instrumentation.
//!
//! - [`descriptor`]: the closed action vocabulary, decoded at dispatch time.
//! - [`effects`]: navigator, auth, network and validator contracts.
//! - [`engine`]: runs a chain step by step, branching on each outcome.
//! - [`observer`]: step transitions and per-chain reports.

pub mod descriptor;
pub mod effects;
pub mod engine;
pub mod observer;

pub use descriptor::{ActionDescriptor, ActionError, ActionKind, HttpMethod};
pub use effects::{
    AuthBackend, AuthError, Effects, FieldValidator, Navigator, NetworkBackend, NetworkError,
    Response, Session, ValidationResult,
};
pub use engine::ActionEngine;
pub use observer::{
    ActionObserver, ChainReport, FailureReason, Phase, StepId, StepOutcome, StepRecord, Termination,
};
