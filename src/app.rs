//! App struct: configuration, registry and engine wiring, screen mounting.
//!
//! [`App`] owns what is shared by every screen (config, widget registry,
//! action engine and its collaborators). [`App::mount`] turns one JSON
//! document into a live [`Screen`] with its own view state.

use std::sync::Arc;

use serde_json::Value;

use crate::action::{ActionEngine, ActionObserver, Effects};
use crate::diagnostics::{Diagnostic, Diagnostics, DEFAULT_DIAGNOSTICS_CAPACITY};
use crate::render::{RenderContext, Renderer};
use crate::screen::Screen;
use crate::state::{ViewState, ViewStateStore};
use crate::tree::{WidgetNode, DEFAULT_EVENT_PREFIX};
use crate::widget::WidgetRegistry;

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Configuration for the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// View-state key that receives login/apiCall/submitForm results.
    pub result_key: String,
    /// Maximum branch nesting below a chain's root.
    pub max_chain_depth: usize,
    /// Diagnostics kept per screen before the oldest are dropped.
    pub max_diagnostics: usize,
    /// Prefix for event prop keys (`tap` -> `onTap`).
    pub event_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            result_key: "_result".to_owned(),
            max_chain_depth: 32,
            max_diagnostics: DEFAULT_DIAGNOSTICS_CAPACITY,
            event_prefix: DEFAULT_EVENT_PREFIX.to_owned(),
        }
    }
}

impl AppConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the result scratch key (builder).
    pub fn with_result_key(mut self, key: impl Into<String>) -> Self {
        self.result_key = key.into();
        self
    }

    /// Set the maximum chain depth (builder).
    pub fn with_max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = depth;
        self
    }

    /// Set the diagnostics capacity (builder).
    pub fn with_max_diagnostics(mut self, capacity: usize) -> Self {
        self.max_diagnostics = capacity;
        self
    }

    /// Set the event prop prefix (builder).
    pub fn with_event_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.event_prefix = prefix.into();
        self
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// The main application struct.
#[derive(Debug, Clone)]
pub struct App {
    config: Arc<AppConfig>,
    registry: Arc<WidgetRegistry>,
    effects: Effects,
    engine: Arc<ActionEngine>,
}

impl App {
    /// Create an app. Use [`WidgetRegistry::with_builtins`] for the standard widgets.
    pub fn new(config: AppConfig, registry: WidgetRegistry, effects: Effects) -> Self {
        let config = Arc::new(config);
        let engine = Arc::new(ActionEngine::new(effects.clone(), Arc::clone(&config)));
        Self {
            config,
            registry: Arc::new(registry),
            effects,
            engine,
        }
    }

    /// Attach an observer to the action engine (builder).
    pub fn with_observer(mut self, observer: Arc<dyn ActionObserver>) -> Self {
        self.engine = Arc::new(
            ActionEngine::new(self.effects.clone(), Arc::clone(&self.config)).with_observer(observer),
        );
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &Arc<ActionEngine> {
        &self.engine
    }

    /// Mount a document and render it.
    ///
    /// `document` is either a bare node or `{"root": <node>, "state": {...}}`,
    /// where `state` seeds the screen's view state.
    pub fn mount(&self, document: &Value) -> Screen {
        let diagnostics = Diagnostics::new(self.config.max_diagnostics);
        let (root, initial) = split_document(document, &diagnostics);
        let node = WidgetNode::parse_with_prefix(root, &self.config.event_prefix, &diagnostics);
        tracing::debug!(widget_type = %node.widget_type, nodes = node.count(), "mounting screen");

        let ctx = RenderContext::new(Arc::clone(&self.engine))
            .with_store(Arc::new(ViewStateStore::with_initial(initial)))
            .with_diagnostics(diagnostics);
        Screen::new(node, ctx, Renderer::new(Arc::clone(&self.registry)))
    }
}

/// Split a screen document into its root node and initial view state.
fn split_document<'a>(document: &'a Value, diagnostics: &Diagnostics) -> (&'a Value, ViewState) {
    let Some(obj) = document.as_object() else {
        return (document, ViewState::new());
    };
    if obj.contains_key("type") {
        return (document, ViewState::new());
    }
    let Some(root) = obj.get("root") else {
        return (document, ViewState::new());
    };
    let initial = match obj.get("state") {
        None | Some(Value::Null) => ViewState::new(),
        Some(Value::Object(state)) => state.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Some(other) => {
            diagnostics.report(Diagnostic::MalformedNode {
                path: "state".to_owned(),
                message: format!("`state` must be an object, got {other}"),
            });
            ViewState::new()
        }
    };
    (root, initial)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fakes::FakeEffects;
    use serde_json::json;

    fn app() -> App {
        App::new(AppConfig::default(), WidgetRegistry::with_builtins(), FakeEffects::new().effects())
    }

    // ── AppConfig builder ────────────────────────────────────────────

    #[test]
    fn config_defaults() {
        let config = AppConfig::new();
        assert_eq!(config.result_key, "_result");
        assert_eq!(config.max_chain_depth, 32);
        assert_eq!(config.max_diagnostics, 256);
        assert_eq!(config.event_prefix, "on");
    }

    #[test]
    fn config_builder_chain() {
        let config = AppConfig::new()
            .with_result_key("last")
            .with_max_chain_depth(4)
            .with_max_diagnostics(8)
            .with_event_prefix("handle");
        assert_eq!(config.result_key, "last");
        assert_eq!(config.max_chain_depth, 4);
        assert_eq!(config.max_diagnostics, 8);
        assert_eq!(config.event_prefix, "handle");
    }

    // ── mount ────────────────────────────────────────────────────────

    #[test]
    fn mount_bare_node() {
        let screen = app().mount(&json!({"type": "Text", "properties": {"text": "hi"}}));
        assert_eq!(screen.element().widget_type, "Text");
        assert!(screen.diagnostics().is_empty());
    }

    #[test]
    fn mount_document_with_state() {
        let screen = app().mount(&json!({
            "root": {"type": "Text", "properties": {"text": "Hello ${name}"}},
            "state": {"name": "Ada"}
        }));
        assert_eq!(screen.element().props.str("text"), Some("Hello Ada"));
        assert_eq!(screen.store().get("name"), Some(json!("Ada")));
    }

    #[test]
    fn mount_bad_state_is_reported() {
        let screen = app().mount(&json!({"root": {"type": "Text"}, "state": [1, 2]}));
        assert_eq!(screen.element().widget_type, "Text");
        assert!(screen
            .diagnostics()
            .any(|d| matches!(d, Diagnostic::MalformedNode { path, .. } if path == "state")));
    }

    #[test]
    fn custom_event_prefix() {
        let config = AppConfig::new().with_event_prefix("handle");
        let app = App::new(config, WidgetRegistry::with_builtins(), FakeEffects::new().effects());
        let screen = app.mount(&json!({"type": "Button", "events": {"tap": {"action": "logout"}}}));
        assert!(screen.element().props.trigger("handleTap").is_some());
    }

    #[test]
    fn custom_event_prefix_lifts_inline_events() {
        let config = AppConfig::new().with_event_prefix("handle");
        let app = App::new(config, WidgetRegistry::with_builtins(), FakeEffects::new().effects());
        let screen = app.mount(&json!({"type": "Button", "handleTap": {"action": "logout"}}));
        assert_eq!(screen.document().events.len(), 1);
        assert!(screen.element().props.trigger("handleTap").is_some());
    }
}
