//! Non-fatal failures as data.
//!
//! Nothing on the render or dispatch path is allowed to take a screen down.
//! Malformed nodes, unknown widget types, unknown action kinds and the like are
//! turned into [`Diagnostic`] values and pushed to a shared, bounded
//! [`Diagnostics`] sink. Every report is also emitted as a `tracing` warning.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::state::lock;

/// Default number of diagnostics kept before the oldest are dropped.
pub const DEFAULT_DIAGNOSTICS_CAPACITY: usize = 256;

/// One reported, recoverable problem.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Diagnostic {
    /// A node's type tag has no registered builder. A placeholder was rendered.
    #[error("unknown widget type `{widget_type}`")]
    UnknownWidgetType { widget_type: String },

    /// A property could not be resolved and its default was used instead.
    #[error("unresolvable property `{property}` on `{widget_type}`: {message}")]
    UnresolvableProperty {
        widget_type: String,
        property: String,
        message: String,
    },

    /// A JSON node was structurally invalid (wrong shape, missing `type`).
    #[error("malformed node at {path}: {message}")]
    MalformedNode { path: String, message: String },

    /// An action descriptor named a kind outside the action vocabulary.
    #[error("unknown action kind `{kind}`")]
    UnknownActionKind { kind: String },

    /// An action descriptor could not be decoded.
    #[error("malformed action: {message}")]
    MalformedAction { message: String },

    /// A form failed its pre-flight validation.
    #[error("form `{form_id}` failed validation ({} field(s))", errors.len())]
    ValidationFailure {
        form_id: String,
        errors: BTreeMap<String, String>,
    },
}

/// Shared, bounded diagnostic sink. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    entries: Arc<Mutex<VecDeque<Diagnostic>>>,
    capacity: usize,
}

impl Diagnostics {
    /// Create a sink that keeps at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::new())),
            capacity: capacity.max(1),
        }
    }

    /// Record a diagnostic, dropping the oldest entry when full.
    pub fn report(&self, diagnostic: Diagnostic) {
        tracing::warn!(%diagnostic, "diagnostic reported");
        let mut entries = lock(&self.entries);
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(diagnostic);
    }

    /// Copy of all retained diagnostics, oldest first.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        lock(&self.entries).iter().cloned().collect()
    }

    /// Remove and return all retained diagnostics.
    pub fn drain(&self) -> Vec<Diagnostic> {
        lock(&self.entries).drain(..).collect()
    }

    /// Whether any retained diagnostic satisfies `predicate`.
    pub fn any(&self, predicate: impl Fn(&Diagnostic) -> bool) -> bool {
        lock(&self.entries).iter().any(predicate)
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(DEFAULT_DIAGNOSTICS_CAPACITY)
    }
}
