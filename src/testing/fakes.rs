//! In-memory collaborators for tests.
//!
//! Every fake records what it was asked to do so tests can assert on effects
//! without a real navigator, auth service or network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::action::{
    ActionKind, ActionObserver, AuthBackend, AuthError, Effects, FieldValidator, HttpMethod,
    Navigator, NetworkBackend, NetworkError, Phase, Response, Session, StepId, ValidationResult,
};
use crate::state::lock;

// ---------------------------------------------------------------------------
// RecordingNavigator
// ---------------------------------------------------------------------------

/// Records every `navigate(target, replace)` call.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    calls: Mutex<Vec<(String, bool)>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(String, bool)> {
        lock(&self.calls).clone()
    }

    /// Targets only, in call order.
    pub fn targets(&self) -> Vec<String> {
        lock(&self.calls).iter().map(|(t, _)| t.clone()).collect()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &str, replace: bool) {
        lock(&self.calls).push((target.to_owned(), replace));
    }
}

// ---------------------------------------------------------------------------
// FakeAuth
// ---------------------------------------------------------------------------

/// Accepts the credential pairs registered with [`FakeAuth::accept`]; rejects
/// everything else with [`AuthError::InvalidCredentials`].
#[derive(Debug, Default)]
pub struct FakeAuth {
    accounts: Mutex<HashMap<String, String>>,
    attempts: Mutex<Vec<String>>,
    logouts: AtomicUsize,
}

impl FakeAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&self, email: &str, password: &str) {
        lock(&self.accounts).insert(email.to_owned(), password.to_owned());
    }

    /// Emails of every login attempt, in order.
    pub fn attempts(&self) -> Vec<String> {
        lock(&self.attempts).clone()
    }

    pub fn logout_count(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthBackend for FakeAuth {
    async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        lock(&self.attempts).push(email.to_owned());
        let accepted = lock(&self.accounts).get(email).is_some_and(|p| p == password);
        if accepted {
            Ok(Session {
                token: format!("token-{email}"),
                user: json!({"email": email}),
            })
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    async fn logout(&self) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// FakeNetwork
// ---------------------------------------------------------------------------

/// One request seen by [`FakeNetwork`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub endpoint: String,
    pub body: Option<Value>,
}

/// Answers by endpoint. Unconfigured endpoints get `200 {}`.
#[derive(Debug, Default)]
pub struct FakeNetwork {
    routes: Mutex<HashMap<String, Result<Response, NetworkError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    latency: Mutex<Option<Duration>>,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, endpoint: &str, response: Response) {
        lock(&self.routes).insert(endpoint.to_owned(), Ok(response));
    }

    pub fn fail(&self, endpoint: &str, error: NetworkError) {
        lock(&self.routes).insert(endpoint.to_owned(), Err(error));
    }

    /// Delay every answer by `latency` (uses `tokio::time::sleep`).
    pub fn set_latency(&self, latency: Duration) {
        *lock(&self.latency) = Some(latency);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait]
impl NetworkBackend for FakeNetwork {
    async fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Response, NetworkError> {
        lock(&self.requests).push(RecordedRequest {
            method,
            endpoint: endpoint.to_owned(),
            body: body.cloned(),
        });
        let latency = *lock(&self.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        lock(&self.routes)
            .get(endpoint)
            .cloned()
            .unwrap_or_else(|| Ok(Response::ok(json!({}))))
    }
}

// ---------------------------------------------------------------------------
// StaticValidator
// ---------------------------------------------------------------------------

/// Returns a fixed result per field; unconfigured fields are valid.
#[derive(Debug, Default)]
pub struct StaticValidator {
    results: Mutex<HashMap<String, ValidationResult>>,
    checked: Mutex<Vec<String>>,
}

impl StaticValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, field_id: &str, result: ValidationResult) {
        lock(&self.results).insert(field_id.to_owned(), result);
    }

    /// Field ids validated so far, in order.
    pub fn checked(&self) -> Vec<String> {
        lock(&self.checked).clone()
    }
}

impl FieldValidator for StaticValidator {
    fn validate(&self, field_id: &str, _value: &str) -> ValidationResult {
        lock(&self.checked).push(field_id.to_owned());
        lock(&self.results)
            .get(field_id)
            .cloned()
            .unwrap_or_else(ValidationResult::valid)
    }
}

// ---------------------------------------------------------------------------
// CountingObserver
// ---------------------------------------------------------------------------

/// Records every step transition.
#[derive(Debug, Default)]
pub struct CountingObserver {
    transitions: Mutex<Vec<(StepId, ActionKind, Phase)>>,
}

impl CountingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transitions(&self) -> Vec<(StepId, ActionKind, Phase)> {
        lock(&self.transitions).clone()
    }

    pub fn count(&self, phase: Phase) -> usize {
        lock(&self.transitions)
            .iter()
            .filter(|(_, _, p)| *p == phase)
            .count()
    }

    /// Transitions into `Succeeded` or `Failed`.
    pub fn terminal_count(&self) -> usize {
        lock(&self.transitions)
            .iter()
            .filter(|(_, _, p)| p.is_terminal())
            .count()
    }
}

impl ActionObserver for CountingObserver {
    fn on_transition(&self, step: StepId, kind: ActionKind, phase: Phase) {
        lock(&self.transitions).push((step, kind, phase));
    }
}

// ---------------------------------------------------------------------------
// FakeEffects
// ---------------------------------------------------------------------------

/// One of each fake, kept typed so tests can configure and inspect them.
#[derive(Debug, Clone, Default)]
pub struct FakeEffects {
    pub navigator: Arc<RecordingNavigator>,
    pub auth: Arc<FakeAuth>,
    pub network: Arc<FakeNetwork>,
    pub validator: Arc<StaticValidator>,
}

impl FakeEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fakes as engine collaborators.
    pub fn effects(&self) -> Effects {
        Effects::new(
            Arc::clone(&self.navigator) as Arc<dyn Navigator>,
            Arc::clone(&self.auth) as Arc<dyn AuthBackend>,
            Arc::clone(&self.network) as Arc<dyn NetworkBackend>,
            Arc::clone(&self.validator) as Arc<dyn FieldValidator>,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_accepts_registered_pairs_only() {
        let auth = FakeAuth::new();
        auth.accept("a@b.c", "pw");
        assert!(tokio_test::block_on(auth.login("a@b.c", "pw")).is_ok());
        assert_eq!(
            tokio_test::block_on(auth.login("a@b.c", "nope")),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(auth.attempts().len(), 2);
    }

    #[test]
    fn network_routes_and_records() {
        let net = FakeNetwork::new();
        net.respond("/x", Response::new(201, json!({"id": 1})));
        let res = tokio_test::block_on(net.request(HttpMethod::Post, "/x", None)).unwrap();
        assert_eq!(res.status, 201);
        let res = tokio_test::block_on(net.request(HttpMethod::Get, "/other", None)).unwrap();
        assert_eq!(res, Response::ok(json!({})));
        assert_eq!(net.request_count(), 2);
    }

    #[test]
    fn validator_defaults_to_valid() {
        let v = StaticValidator::new();
        v.set("email", ValidationResult::invalid("email", "required"));
        assert!(!v.validate("email", "").valid);
        assert!(v.validate("name", "").valid);
        assert_eq!(v.checked(), vec!["email", "name"]);
    }
}
