//! ActionEngine: runs one action chain against the view state and effects.
//!
//! A chain is a strict tree of owned descriptors, so execution is a loop: run
//! the current step, then continue with at most one of its branches. Steps
//! run strictly in sequence; a branch never starts before its parent's effect
//! resolves. The only awaits are the auth and network calls.
//!
//! Every step checks at entry that the screen is still mounted. If it isn't,
//! the chain stops with [`Termination::Unmounted`] instead of touching a
//! torn-down context.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use super::descriptor::{
    ActionDescriptor, ActionError, ActionKind, ApiCall, HttpMethod, Login, Navigate, SetState,
    SubmitForm,
};
use super::effects::{Effects, NetworkError, Response};
use super::observer::{
    ActionObserver, ChainReport, FailureReason, Phase, StepId, StepOutcome, StepRecord, Termination,
};
use crate::app::AppConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::props::template::{interpolate, interpolate_str};
use crate::render::RenderContext;

/// Result of running one step, before branching.
struct StepResult {
    outcome: StepOutcome,
    payload: Option<Value>,
}

impl StepResult {
    fn succeeded(payload: Option<Value>) -> Self {
        Self {
            outcome: StepOutcome::Succeeded,
            payload,
        }
    }

    fn failed(reason: FailureReason, payload: Value) -> Self {
        Self {
            outcome: StepOutcome::Failed(reason),
            payload: Some(payload),
        }
    }
}

/// Interprets action descriptors.
pub struct ActionEngine {
    effects: Effects,
    config: Arc<AppConfig>,
    observer: Option<Arc<dyn ActionObserver>>,
    next_step: AtomicU64,
}

impl ActionEngine {
    pub fn new(effects: Effects, config: Arc<AppConfig>) -> Self {
        Self {
            effects,
            config,
            observer: None,
            next_step: AtomicU64::new(1),
        }
    }

    /// Attach an observer that sees every step transition (builder).
    pub fn with_observer(mut self, observer: Arc<dyn ActionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Shared handle to the config.
    pub fn shared_config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    /// Decode a raw descriptor, reporting a rejection to `diagnostics`.
    pub fn decode(&self, raw: &Value, diagnostics: &Diagnostics) -> Result<ActionDescriptor, ActionError> {
        ActionDescriptor::from_value(raw, self.config.max_chain_depth).map_err(|err| {
            let diagnostic = match &err {
                ActionError::UnknownKind(kind) => Diagnostic::UnknownActionKind { kind: kind.clone() },
                other => Diagnostic::MalformedAction {
                    message: other.to_string(),
                },
            };
            diagnostics.report(diagnostic);
            err
        })
    }

    /// Decode and run a raw descriptor. A rejected descriptor runs no step.
    pub async fn execute_value(&self, raw: &Value, ctx: &RenderContext) -> ChainReport {
        match self.decode(raw, &ctx.diagnostics) {
            Ok(descriptor) => self.execute(&descriptor, ctx).await,
            Err(err) => ChainReport::rejected(err),
        }
    }

    /// Run a decoded chain to its end.
    pub async fn execute(&self, descriptor: &ActionDescriptor, ctx: &RenderContext) -> ChainReport {
        let mut report = ChainReport::new();
        let mut current = Some(descriptor);

        while let Some(step) = current.take() {
            if !ctx.is_active() {
                debug!(executed = report.len(), "screen unmounted, chain stopped");
                report.termination = Termination::Unmounted;
                return report;
            }

            let id = StepId(self.next_step.fetch_add(1, Ordering::Relaxed));
            let kind = step.kind();
            self.emit(id, kind, Phase::Pending);
            self.emit(id, kind, Phase::Executing);

            let result = self.run_step(step, ctx).await;
            if let Some(payload) = &result.payload {
                ctx.store.set_one(self.config.result_key.clone(), payload.clone());
            }

            let (phase, next) = match &result.outcome {
                StepOutcome::Succeeded => (Phase::Succeeded, step.next_on_success()),
                StepOutcome::Failed(_) => (Phase::Failed, step.next_on_error()),
            };
            self.emit(id, kind, phase);
            debug!(%id, %kind, ?phase, branch = next.is_some(), "action step finished");

            if next.is_none() && phase == Phase::Failed {
                report.termination = Termination::FailedUnhandled;
            }
            report.steps.push(StepRecord {
                id,
                kind,
                outcome: result.outcome,
                payload: result.payload,
            });
            current = next;
        }
        report
    }

    fn emit(&self, id: StepId, kind: ActionKind, phase: Phase) {
        if let Some(observer) = &self.observer {
            observer.on_transition(id, kind, phase);
        }
    }

    // ── Handlers ─────────────────────────────────────────────────────

    async fn run_step(&self, step: &ActionDescriptor, ctx: &RenderContext) -> StepResult {
        match step {
            ActionDescriptor::Navigate(a) => self.navigate(a, ctx),
            ActionDescriptor::Login(a) => self.login(a, ctx).await,
            ActionDescriptor::SubmitForm(a) => self.submit_form(a, ctx).await,
            ActionDescriptor::SetState(a) => self.set_state(a, ctx),
            ActionDescriptor::ApiCall(a) => self.api_call(a, ctx).await,
            ActionDescriptor::Logout(_) => self.logout(ctx).await,
        }
    }

    fn navigate(&self, action: &Navigate, ctx: &RenderContext) -> StepResult {
        let target = interpolate_str(&action.target, &ctx.store.snapshot());
        self.effects.navigator.navigate(&target, action.replace);
        StepResult::succeeded(None)
    }

    async fn login(&self, action: &Login, ctx: &RenderContext) -> StepResult {
        let email = ctx.inputs.value(&action.email_field).unwrap_or_default();
        let password = ctx.inputs.value(&action.password_field).unwrap_or_default();
        match self.effects.auth.login(&email, &password).await {
            Ok(session) => StepResult::succeeded(Some(json!({
                "ok": true,
                "token": session.token,
                "user": session.user,
            }))),
            Err(err) => {
                let message = err.to_string();
                StepResult::failed(
                    FailureReason::Effect(message.clone()),
                    json!({"ok": false, "error": message}),
                )
            }
        }
    }

    async fn submit_form(&self, action: &SubmitForm, ctx: &RenderContext) -> StepResult {
        let mut errors = BTreeMap::new();
        if !ctx.inputs.has_form(&action.form_id) {
            errors.insert(action.form_id.clone(), "form has no registered fields".to_owned());
        }
        for field in ctx.inputs.form_fields(&action.form_id) {
            let value = ctx.inputs.value(&field).unwrap_or_default();
            let result = self.effects.validator.validate(&field, &value);
            if !result.valid && result.errors.is_empty() {
                errors.insert(field.clone(), "invalid".to_owned());
            }
            errors.extend(result.errors);
        }

        if !errors.is_empty() {
            ctx.diagnostics.report(Diagnostic::ValidationFailure {
                form_id: action.form_id.clone(),
                errors: errors.clone(),
            });
            let payload = json!({"ok": false, "errors": errors});
            return StepResult::failed(FailureReason::Validation(errors), payload);
        }

        let body = Value::Object(ctx.inputs.form_values(&action.form_id));
        let endpoint = interpolate_str(&action.endpoint, &ctx.store.snapshot());
        self.request(action.method, &endpoint, Some(&body)).await
    }

    fn set_state(&self, action: &SetState, ctx: &RenderContext) -> StepResult {
        let snapshot = ctx.store.snapshot();
        let updates: Vec<(String, Value)> = action
            .updates
            .iter()
            .map(|(key, value)| (key.clone(), interpolate(value, &snapshot)))
            .collect();
        ctx.store.set(updates);
        StepResult::succeeded(None)
    }

    async fn api_call(&self, action: &ApiCall, ctx: &RenderContext) -> StepResult {
        let snapshot = ctx.store.snapshot();
        let endpoint = interpolate_str(&action.endpoint, &snapshot);
        let body = action.body.as_ref().map(|b| interpolate(b, &snapshot));
        self.request(action.method, &endpoint, body.as_ref()).await
    }

    async fn logout(&self, ctx: &RenderContext) -> StepResult {
        self.effects.auth.logout().await;
        ctx.store.clear();
        ctx.inputs.clear();
        StepResult::succeeded(None)
    }

    async fn request(&self, method: HttpMethod, endpoint: &str, body: Option<&Value>) -> StepResult {
        debug!(%method, endpoint, "network request");
        let result: Result<Response, NetworkError> =
            self.effects.network.request(method, endpoint, body).await;
        match result {
            Ok(response) if response.is_success() => StepResult::succeeded(Some(json!({
                "ok": true,
                "status": response.status,
                "data": response.body,
            }))),
            Ok(response) => StepResult::failed(
                FailureReason::Effect(format!("{method} {endpoint} returned {}", response.status)),
                json!({"ok": false, "status": response.status, "data": response.body}),
            ),
            Err(err) => {
                let message = err.to_string();
                StepResult::failed(
                    FailureReason::Effect(message.clone()),
                    json!({"ok": false, "error": message}),
                )
            }
        }
    }
}

impl std::fmt::Debug for ActionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionEngine")
            .field("config", &self.config)
            .field("observed", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
