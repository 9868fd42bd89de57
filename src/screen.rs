//! Screen: one mounted document and its live element tree.
//!
//! [`Screen`] owns the parsed node tree, the current [`Element`] tree and the
//! per-screen context. It subscribes to its view state and collects changed
//! keys; [`Screen::refresh`] re-renders only the subtrees that read them.
//! Dropping a screen unmounts it, which stops any chain still in flight at its
//! next step.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::action::ChainReport;
use crate::diagnostics::Diagnostics;
use crate::render::{RenderContext, Renderer, Trigger};
use crate::state::{lock, InputStore, SubscriptionId, ViewStateStore};
use crate::tree::{event_prop_key, Element, WidgetNode};

pub struct Screen {
    document: WidgetNode,
    ctx: RenderContext,
    renderer: Renderer,
    tree: Element,
    dirty: Arc<Mutex<BTreeSet<String>>>,
    subscription: SubscriptionId,
}

impl Screen {
    /// Render `document` and start tracking view-state changes.
    pub fn new(document: WidgetNode, ctx: RenderContext, renderer: Renderer) -> Self {
        let dirty = Arc::new(Mutex::new(BTreeSet::new()));
        let sink = Arc::clone(&dirty);
        let subscription = ctx.store.subscribe_all(move |change| {
            lock(&sink).extend(change.changed.iter().cloned());
        });
        let tree = renderer.render(&document, &ctx);
        Self {
            document,
            ctx,
            renderer,
            tree,
            dirty,
            subscription,
        }
    }

    // ── Query ────────────────────────────────────────────────────────

    /// The current rendered tree.
    pub fn element(&self) -> &Element {
        &self.tree
    }

    pub fn document(&self) -> &WidgetNode {
        &self.document
    }

    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }

    pub fn store(&self) -> &Arc<ViewStateStore> {
        &self.ctx.store
    }

    pub fn inputs(&self) -> &Arc<InputStore> {
        &self.ctx.inputs
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.ctx.diagnostics
    }

    pub fn is_mounted(&self) -> bool {
        self.ctx.is_active()
    }

    /// Whether view state changed since the last render.
    pub fn is_dirty(&self) -> bool {
        !lock(&self.dirty).is_empty()
    }

    /// The trigger bound to `event` on the element with `id`.
    pub fn trigger(&self, id: &str, event: &str) -> Option<Trigger> {
        let key = event_prop_key(&self.ctx.config.event_prefix, event);
        self.tree.find_by_id(id)?.props.trigger(&key).cloned()
    }

    // ── Rendering ────────────────────────────────────────────────────

    /// Re-render subtrees affected by state changes since the last render.
    /// Returns `false` if nothing changed.
    pub fn refresh(&mut self) -> bool {
        let changed = std::mem::take(&mut *lock(&self.dirty));
        if changed.is_empty() || !self.is_mounted() {
            return false;
        }
        self.tree = self
            .renderer
            .rerender(&self.document, &self.tree, &changed, &self.ctx);
        true
    }

    /// Re-render the whole tree regardless of what changed.
    pub fn render_full(&mut self) -> &Element {
        lock(&self.dirty).clear();
        self.tree = self.renderer.render(&self.document, &self.ctx);
        &self.tree
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Decode and run `descriptor` against this screen.
    pub async fn dispatch(&self, descriptor: &Value) -> ChainReport {
        self.ctx.dispatch(descriptor).await
    }

    /// Tear the screen down. Chains in flight stop at their next step.
    pub fn unmount(&mut self) {
        self.ctx.store.unsubscribe(self.subscription);
        self.ctx.store.unmount();
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screen")
            .field("root", &self.document.widget_type)
            .field("elements", &self.tree.count())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use crate::app::{App, AppConfig};
    use crate::testing::fakes::FakeEffects;
    use crate::testing::Harness;
    use crate::widget::WidgetRegistry;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn mount(document: serde_json::Value) -> (FakeEffects, super::Screen) {
        let fakes = FakeEffects::new();
        let app = App::new(AppConfig::default(), WidgetRegistry::with_builtins(), fakes.effects());
        let screen = app.mount(&document);
        (fakes, screen)
    }

    #[test]
    fn refresh_picks_up_state_changes() {
        let (_, mut screen) = mount(json!({
            "root": {"type": "Text", "properties": {"text": "n=${n}"}},
            "state": {"n": 1}
        }));
        assert!(!screen.is_dirty());
        assert!(!screen.refresh());

        screen.store().set_one("n", json!(2));
        assert!(screen.is_dirty());
        assert!(screen.refresh());
        assert_eq!(screen.element().props.str("text"), Some("n=2"));
        assert!(!screen.is_dirty());
    }

    #[test]
    fn trigger_lookup_by_id() {
        let (fakes, screen) = mount(json!({
            "type": "Button",
            "properties": {"id": "go"},
            "events": {"tap": {"action": "navigate", "target": "home"}}
        }));
        assert!(screen.trigger("go", "longPress").is_none());
        assert!(screen.trigger("nope", "tap").is_none());
        let report = tokio_test::block_on(screen.trigger("go", "tap").unwrap().run());
        assert_eq!(report.len(), 1);
        assert_eq!(fakes.navigator.targets(), vec!["home"]);
    }

    #[test]
    fn unmount_stops_tracking() {
        let (_, mut screen) = mount(json!({"type": "Text"}));
        let store = std::sync::Arc::clone(screen.store());
        screen.unmount();
        assert!(!screen.is_mounted());
        assert!(!store.set_one("x", json!(1)));
        assert!(!screen.refresh());
    }

    #[test]
    fn partial_refresh_matches_full_render() {
        let mut h = Harness::new(&json!({
            "root": {
                "type": "Column",
                "children": [
                    {"type": "Text", "properties": {"text": "Hi ${user}"}},
                    {"type": "Form", "properties": {"formId": "f1"}, "children": [
                        {"type": "TextField", "properties": {"fieldId": "email"}}
                    ]},
                    {"type": "Button", "properties": {"id": "rename"},
                     "events": {"tap": {"action": "setState", "updates": {"user": "Grace"}}}},
                    {"type": "Button", "properties": {"id": "out"},
                     "events": {"tap": {"action": "logout"}}}
                ]
            },
            "state": {"user": "Ada"}
        }));
        h.type_text("email", "ada@example.com");
        tokio_test::block_on(h.tap("rename")).unwrap();
        tokio_test::block_on(h.tap("out")).unwrap();

        let partial = h.element().clone();
        let fields = h.screen().inputs().form_fields("f1");
        assert_eq!(partial.children[0].props.str("text"), Some("Hi "));

        let full = h.screen_mut().render_full().clone();
        assert_eq!(partial, full);
        assert_eq!(h.screen().inputs().form_fields("f1"), fields);
        assert_eq!(fields, vec!["email"]);
        assert!(!h.screen().is_dirty());
    }

    #[test]
    fn drop_unmounts_store() {
        let (_, screen) = mount(json!({"type": "Text"}));
        let store = std::sync::Arc::clone(screen.store());
        drop(screen);
        assert!(!store.is_mounted());
    }
}
