//! External collaborators the engine drives.
//!
//! Navigation and validation are synchronous. Auth and network are the only
//! suspension points in a chain, so they are async traits.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::descriptor::HttpMethod;

// ---------------------------------------------------------------------------
// Data
// ---------------------------------------------------------------------------

/// An authenticated session as reported by the auth backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub user: Value,
}

/// A completed network exchange. Any status may come back here; the engine
/// decides what counts as success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    #[serde(default)]
    pub body: Value,
}

impl Response {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    /// Statuses below 400 count as success.
    pub fn is_success(&self) -> bool {
        self.status < 400
    }
}

/// Outcome of validating one form field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    /// Field id -> message.
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: BTreeMap::new(),
        }
    }

    pub fn invalid(field_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: BTreeMap::from([(field_id.into(), message.into())]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("auth backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetworkError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connection(String),
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &str, replace: bool);
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError>;
    async fn logout(&self);
}

#[async_trait]
pub trait NetworkBackend: Send + Sync {
    async fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Response, NetworkError>;
}

/// Validates one form field given its current input value.
pub trait FieldValidator: Send + Sync {
    fn validate(&self, field_id: &str, value: &str) -> ValidationResult;
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// The full set of collaborators handed to an engine.
#[derive(Clone)]
pub struct Effects {
    pub navigator: Arc<dyn Navigator>,
    pub auth: Arc<dyn AuthBackend>,
    pub network: Arc<dyn NetworkBackend>,
    pub validator: Arc<dyn FieldValidator>,
}

impl Effects {
    pub fn new(
        navigator: Arc<dyn Navigator>,
        auth: Arc<dyn AuthBackend>,
        network: Arc<dyn NetworkBackend>,
        validator: Arc<dyn FieldValidator>,
    ) -> Self {
        Self {
            navigator,
            auth,
            network,
            validator,
        }
    }
}

impl fmt::Debug for Effects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effects").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_success_threshold() {
        assert!(Response::ok(json!({})).is_success());
        assert!(Response::new(302, Value::Null).is_success());
        assert!(!Response::new(400, Value::Null).is_success());
        assert!(!Response::new(503, Value::Null).is_success());
    }

    #[test]
    fn validation_result_helpers() {
        assert!(ValidationResult::valid().valid);
        let bad = ValidationResult::invalid("email", "required");
        assert!(!bad.valid);
        assert_eq!(bad.errors.get("email").map(String::as_str), Some("required"));
    }

    #[test]
    fn validation_result_deserializes() {
        let r: ValidationResult =
            serde_json::from_value(json!({"valid": false, "errors": {"email": "required"}})).unwrap();
        assert_eq!(r, ValidationResult::invalid("email", "required"));
    }
}
