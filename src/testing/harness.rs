//! Harness: drive a mounted screen without a host UI.
//!
//! The `Harness` mounts a document against [`FakeEffects`], then lets a test
//! type into fields, tap elements by id and inspect the re-rendered tree.

use std::sync::Arc;

use serde_json::Value;

use super::fakes::FakeEffects;
use super::snapshot::element_to_string;
use crate::action::{ActionObserver, ChainReport};
use crate::app::{App, AppConfig};
use crate::screen::Screen;
use crate::tree::Element;
use crate::widget::WidgetRegistry;

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// A headless screen driver for testing.
///
/// ```ignore
/// let mut h = Harness::new(&json!({"type": "Button", "properties": {"id": "go"},
///     "events": {"tap": {"action": "navigate", "target": "home"}}}));
/// h.tap("go").await;
/// assert_eq!(h.fakes().navigator.targets(), vec!["home"]);
/// ```
pub struct Harness {
    fakes: FakeEffects,
    app: App,
    screen: Screen,
}

impl Harness {
    /// Mount `document` with the built-in widgets and default config.
    pub fn new(document: &Value) -> Self {
        Self::build(document, AppConfig::default(), WidgetRegistry::with_builtins(), None)
    }

    /// Mount `document` with a custom registry.
    pub fn with_registry(document: &Value, registry: WidgetRegistry) -> Self {
        Self::build(document, AppConfig::default(), registry, None)
    }

    /// Mount `document` with a custom config and an optional observer.
    pub fn with_config(
        document: &Value,
        config: AppConfig,
        observer: Option<Arc<dyn ActionObserver>>,
    ) -> Self {
        Self::build(document, config, WidgetRegistry::with_builtins(), observer)
    }

    fn build(
        document: &Value,
        config: AppConfig,
        registry: WidgetRegistry,
        observer: Option<Arc<dyn ActionObserver>>,
    ) -> Self {
        let fakes = FakeEffects::new();
        let mut app = App::new(config, registry, fakes.effects());
        if let Some(observer) = observer {
            app = app.with_observer(observer);
        }
        let screen = app.mount(document);
        Self { fakes, app, screen }
    }

    // ── Interaction ──────────────────────────────────────────────────

    /// Replace the text of input field `field_id`.
    pub fn type_text(&mut self, field_id: &str, text: &str) {
        self.screen.inputs().set_value(field_id, text);
    }

    /// Run the `tap` trigger of the element with `id` to completion, then
    /// refresh. Returns `None` if there is no such trigger.
    pub async fn tap(&mut self, id: &str) -> Option<ChainReport> {
        self.fire(id, "tap").await
    }

    /// Run the `event` trigger of the element with `id`, then refresh.
    pub async fn fire(&mut self, id: &str, event: &str) -> Option<ChainReport> {
        let trigger = self.screen.trigger(id, event)?;
        let report = trigger.run().await;
        self.screen.refresh();
        Some(report)
    }

    /// Dispatch a raw descriptor, then refresh.
    pub async fn dispatch(&mut self, descriptor: &Value) -> ChainReport {
        let report = self.screen.dispatch(descriptor).await;
        self.screen.refresh();
        report
    }

    // ── Inspection ───────────────────────────────────────────────────

    pub fn element(&self) -> &Element {
        self.screen.element()
    }

    /// The current tree as text (see [`element_to_string`]).
    pub fn snapshot(&self) -> String {
        element_to_string(self.screen.element())
    }

    pub fn fakes(&self) -> &FakeEffects {
        &self.fakes
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }
}

// ===========================================================================
// Tests
// ===========================================================================
