//! ActionDescriptor: the closed action vocabulary as an owned tree of variants.
//!
//! Descriptors are decoded from JSON at dispatch time (never at render time),
//! internally tagged by the `action` key with camelCase fields:
//!
//! ```json
//! {"action":"login","emailField":"email_id","passwordField":"password_id",
//!  "onSuccess":{"action":"navigate","target":"dashboard","replace":true},
//!  "onError":{"action":"setState","updates":{"error":"Invalid credentials"}}}
//! ```
//!
//! Before serde runs, [`ActionDescriptor::from_value`] walks the nested
//! branches so an unknown kind anywhere in the chain, or nesting beyond the
//! configured depth, rejects the whole chain up front.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// ActionError
// ---------------------------------------------------------------------------

/// Why a raw descriptor was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    #[error("action descriptor must be a JSON object")]
    NotAnObject,

    #[error("action descriptor has no string `action` discriminator")]
    MissingKind,

    #[error("unknown action kind `{0}`")]
    UnknownKind(String),

    #[error("action chain nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("malformed `{kind}` action: {message}")]
    Malformed { kind: String, message: String },
}

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

/// The `action` discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Navigate,
    Login,
    SubmitForm,
    SetState,
    ApiCall,
    Logout,
}

impl ActionKind {
    pub const ALL: [ActionKind; 6] = [
        ActionKind::Navigate,
        ActionKind::Login,
        ActionKind::SubmitForm,
        ActionKind::SetState,
        ActionKind::ApiCall,
        ActionKind::Logout,
    ];

    /// The JSON tag for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Navigate => "navigate",
            ActionKind::Login => "login",
            ActionKind::SubmitForm => "submitForm",
            ActionKind::SetState => "setState",
            ActionKind::ApiCall => "apiCall",
            ActionKind::Logout => "logout",
        }
    }

    /// Parse a JSON tag (exact match).
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == tag)
    }

    /// JSON keys holding nested descriptors for this kind.
    fn branch_keys(self) -> &'static [&'static str] {
        match self {
            ActionKind::Navigate | ActionKind::SetState => &[],
            ActionKind::Logout => &["onComplete"],
            ActionKind::Login | ActionKind::SubmitForm | ActionKind::ApiCall => &["onSuccess", "onError"],
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// HttpMethod
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
    #[serde(alias = "put")]
    Put,
    #[serde(alias = "patch")]
    Patch,
    #[serde(alias = "delete")]
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    fn post() -> Self {
        HttpMethod::Post
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

type Branch = Option<Box<ActionDescriptor>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigate {
    pub target: String,
    #[serde(default)]
    pub replace: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Login {
    pub email_field: String,
    pub password_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_success: Branch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Branch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitForm {
    pub form_id: String,
    pub endpoint: String,
    #[serde(default = "HttpMethod::post")]
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_success: Branch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Branch,
}

/// Branches are accepted for uniformity but never run, so they are kept as
/// raw JSON and never decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetState {
    #[serde(default)]
    pub updates: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_success: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCall {
    #[serde(default)]
    pub method: HttpMethod,
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_success: Branch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Branch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_complete: Branch,
}

// ---------------------------------------------------------------------------
// ActionDescriptor
// ---------------------------------------------------------------------------

/// One step of an action chain, owning its follow-up steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ActionDescriptor {
    Navigate(Navigate),
    Login(Login),
    SubmitForm(SubmitForm),
    SetState(SetState),
    ApiCall(ApiCall),
    Logout(Logout),
}

impl ActionDescriptor {
    /// Validate and decode a raw descriptor. `max_depth` bounds how many
    /// branch levels may sit below the root.
    pub fn from_value(value: &Value, max_depth: usize) -> Result<Self, ActionError> {
        let kind = precheck(value, 0, max_depth)?;
        ActionDescriptor::deserialize(value).map_err(|err| ActionError::Malformed {
            kind: kind.as_str().to_owned(),
            message: err.to_string(),
        })
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            ActionDescriptor::Navigate(_) => ActionKind::Navigate,
            ActionDescriptor::Login(_) => ActionKind::Login,
            ActionDescriptor::SubmitForm(_) => ActionKind::SubmitForm,
            ActionDescriptor::SetState(_) => ActionKind::SetState,
            ActionDescriptor::ApiCall(_) => ActionKind::ApiCall,
            ActionDescriptor::Logout(_) => ActionKind::Logout,
        }
    }

    /// The step that runs after this one succeeds.
    ///
    /// `navigate` has no branches; `setState` branches are no-ops; `logout`
    /// continues with `onComplete`.
    pub fn next_on_success(&self) -> Option<&ActionDescriptor> {
        match self {
            ActionDescriptor::Login(a) => a.on_success.as_deref(),
            ActionDescriptor::SubmitForm(a) => a.on_success.as_deref(),
            ActionDescriptor::ApiCall(a) => a.on_success.as_deref(),
            ActionDescriptor::Logout(a) => a.on_complete.as_deref(),
            ActionDescriptor::Navigate(_) | ActionDescriptor::SetState(_) => None,
        }
    }

    /// The step that runs after this one fails.
    pub fn next_on_error(&self) -> Option<&ActionDescriptor> {
        match self {
            ActionDescriptor::Login(a) => a.on_error.as_deref(),
            ActionDescriptor::SubmitForm(a) => a.on_error.as_deref(),
            ActionDescriptor::ApiCall(a) => a.on_error.as_deref(),
            ActionDescriptor::Navigate(_)
            | ActionDescriptor::SetState(_)
            | ActionDescriptor::Logout(_) => None,
        }
    }

    /// Levels of nesting below this descriptor (a single step is 0).
    pub fn depth(&self) -> usize {
        let branches: [Option<&ActionDescriptor>; 2] = match self {
            ActionDescriptor::Navigate(_) | ActionDescriptor::SetState(_) => [None, None],
            ActionDescriptor::Login(a) => [a.on_success.as_deref(), a.on_error.as_deref()],
            ActionDescriptor::SubmitForm(a) => [a.on_success.as_deref(), a.on_error.as_deref()],
            ActionDescriptor::ApiCall(a) => [a.on_success.as_deref(), a.on_error.as_deref()],
            ActionDescriptor::Logout(a) => [a.on_complete.as_deref(), None],
        };
        branches
            .into_iter()
            .flatten()
            .map(|b| b.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Check the discriminator of `value` and of every nested branch.
fn precheck(value: &Value, depth: usize, max_depth: usize) -> Result<ActionKind, ActionError> {
    let Value::Object(obj) = value else {
        return Err(ActionError::NotAnObject);
    };
    let tag = obj
        .get("action")
        .and_then(Value::as_str)
        .ok_or(ActionError::MissingKind)?;
    let kind = ActionKind::from_tag(tag).ok_or_else(|| ActionError::UnknownKind(tag.to_owned()))?;
    if depth > max_depth {
        return Err(ActionError::TooDeep(max_depth));
    }
    for key in kind.branch_keys() {
        if let Some(branch) = obj.get(*key).filter(|b| !b.is_null()) {
            precheck(branch, depth + 1, max_depth)?;
        }
    }
    Ok(kind)
}
