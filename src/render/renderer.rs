//! Renderer: WidgetNode tree -> Element tree.
//!
//! One pass reads a single view-state snapshot, so every binding in the tree
//! sees the same state. Per node:
//!
//! 1. resolve the builder (a miss yields a marked placeholder),
//! 2. render the children, in order,
//! 3. substitute `${...}` bindings in properties, recording the keys read,
//! 4. register `fieldId` inputs under the enclosing `formId`,
//! 5. bind each event as a [`Trigger`](super::Trigger) under its `onXxx` key,
//! 6. invoke the builder.
//!
//! [`Renderer::rerender`] rebuilds only the subtrees whose recorded keys
//! intersect a set of changed keys and reuses the rest.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::context::RenderContext;
use crate::diagnostics::Diagnostic;
use crate::props::template::{substitute, value_to_text};
use crate::state::ViewState;
use crate::tree::{event_prop_key, Element, Props, WidgetNode};
use crate::widget::{BuildContext, WidgetRegistry};

/// Walks widget nodes and builds elements through a [`WidgetRegistry`].
#[derive(Debug, Clone)]
pub struct Renderer {
    registry: Arc<WidgetRegistry>,
}

impl Renderer {
    pub fn new(registry: Arc<WidgetRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    /// Render `node` and its whole subtree.
    pub fn render(&self, node: &WidgetNode, ctx: &RenderContext) -> Element {
        let snapshot = ctx.store.snapshot();
        let pass = Pass {
            registry: &self.registry,
            ctx,
            state: &snapshot,
        };
        let element = pass.render(node, None);
        debug!(elements = element.count(), version = ctx.store.version(), "render pass");
        element
    }

    /// Re-render `node` given the `previous` render of it, rebuilding only
    /// subtrees that read one of `changed`.
    pub fn rerender(
        &self,
        node: &WidgetNode,
        previous: &Element,
        changed: &BTreeSet<String>,
        ctx: &RenderContext,
    ) -> Element {
        let snapshot = ctx.store.snapshot();
        let pass = Pass {
            registry: &self.registry,
            ctx,
            state: &snapshot,
        };
        pass.patch(node, previous, changed, None)
    }
}

/// State of one render pass.
struct Pass<'a> {
    registry: &'a WidgetRegistry,
    ctx: &'a RenderContext,
    state: &'a ViewState,
}

impl Pass<'_> {
    fn render(&self, node: &WidgetNode, form: Option<&str>) -> Element {
        let scope = form_scope(node, form);
        let children = node
            .children
            .iter()
            .map(|child| self.render(child, scope))
            .collect();
        self.build(node, scope, children)
    }

    fn patch(
        &self,
        node: &WidgetNode,
        previous: &Element,
        changed: &BTreeSet<String>,
        form: Option<&str>,
    ) -> Element {
        if previous.reads.is_disjoint(changed) && previous.widget_type == node.widget_type {
            return previous.clone();
        }
        if previous.children.len() != node.children.len() {
            return self.render(node, form);
        }
        let scope = form_scope(node, form);
        let children = node
            .children
            .iter()
            .zip(&previous.children)
            .map(|(child, prev)| self.patch(child, prev, changed, scope))
            .collect();
        self.build(node, scope, children)
    }

    fn build(&self, node: &WidgetNode, form: Option<&str>, children: Vec<Element>) -> Element {
        let mut reads = BTreeSet::new();
        let mut props = Props::new();
        for (key, value) in &node.properties {
            props.insert_value(key.clone(), substitute(value, self.state, &mut reads));
        }

        if let Some(field_id) = props.str("fieldId") {
            let initial = props.value("value").map(value_to_text);
            self.ctx
                .inputs
                .register_field(form, field_id, initial.as_deref());
        }

        for (event, descriptor) in &node.events {
            let key = event_prop_key(&self.ctx.config.event_prefix, event);
            props.insert_trigger(key, self.ctx.trigger(descriptor.clone()));
        }

        let mut element = match self.registry.resolve(&node.widget_type) {
            Some(builder) => {
                let build_ctx = BuildContext::new(&node.widget_type, &self.ctx.diagnostics);
                builder(props, children, &build_ctx)
            }
            None => {
                // Malformed nodes were already reported by the parser.
                if !node.is_malformed() {
                    self.ctx.diagnostics.report(Diagnostic::UnknownWidgetType {
                        widget_type: node.widget_type.clone(),
                    });
                }
                Element::placeholder(node.widget_type.clone(), props, children)
            }
        };

        for child in &element.children {
            reads.extend(child.reads.iter().cloned());
        }
        element.reads = reads;
        element
    }
}

/// The form scope for `node`'s subtree: its own `formId`, else the inherited one.
fn form_scope<'n>(node: &'n WidgetNode, inherited: Option<&'n str>) -> Option<&'n str> {
    node.properties
        .get("formId")
        .and_then(Value::as_str)
        .or(inherited)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionEngine;
    use crate::app::AppConfig;
    use crate::diagnostics::Diagnostics;
    use crate::testing::fakes::FakeEffects;
    use crate::testing::snapshot::element_to_string;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn setup() -> (FakeEffects, Renderer, RenderContext) {
        let fakes = FakeEffects::new();
        let engine = ActionEngine::new(fakes.effects(), Arc::new(AppConfig::default()));
        let ctx = RenderContext::new(Arc::new(engine));
        let renderer = Renderer::new(Arc::new(WidgetRegistry::with_builtins()));
        (fakes, renderer, ctx)
    }

    fn node(value: Value) -> WidgetNode {
        WidgetNode::parse(&value, &Diagnostics::default())
    }

    // ── Shape ────────────────────────────────────────────────────────

    #[test]
    fn preserves_shape() {
        let (_, renderer, ctx) = setup();
        let tree = node(json!({
            "type": "Column",
            "children": [
                {"type": "Text", "properties": {"text": "a"}},
                {"type": "Row", "children": [{"type": "Text"}, {"type": "Spacer"}]},
                {"type": "Mystery", "children": [{"type": "Text"}]}
            ]
        }));
        let el = renderer.render(&tree, &ctx);
        assert_eq!(el.count(), tree.count());
        assert_eq!(el.children.len(), 3);
        assert_eq!(el.children[1].children[1].widget_type, "Spacer");
        assert_eq!(el.children[2].children.len(), 1);
    }

    #[test]
    fn unknown_type_renders_placeholder() {
        let (_, renderer, ctx) = setup();
        let el = renderer.render(&node(json!({"type": "Unknown"})), &ctx);
        assert!(el.is_placeholder());
        assert_eq!(el.widget_type, "Unknown");
        assert_eq!(
            ctx.diagnostics.snapshot(),
            vec![Diagnostic::UnknownWidgetType { widget_type: "Unknown".into() }]
        );
    }

    #[test]
    fn malformed_node_is_not_reported_twice() {
        let (_, renderer, ctx) = setup();
        let tree = WidgetNode::parse(&json!({"type": "Column", "children": [7]}), &ctx.diagnostics);
        let el = renderer.render(&tree, &ctx);
        assert!(el.children[0].is_placeholder());
        assert_eq!(ctx.diagnostics.len(), 1);
    }

    // ── Bindings ─────────────────────────────────────────────────────

    #[test]
    fn substitutes_bindings_and_records_reads() {
        let (_, renderer, ctx) = setup();
        ctx.store.set([("name", json!("Ada")), ("count", json!(3))]);
        let el = renderer.render(
            &node(json!({
                "type": "Column",
                "children": [
                    {"type": "Text", "properties": {"text": "Hello ${name}"}},
                    {"type": "Text", "properties": {"text": "${count}"}},
                    {"type": "Text", "properties": {"text": "[${missing}]"}}
                ]
            })),
            &ctx,
        );
        assert_eq!(el.children[0].props.str("text"), Some("Hello Ada"));
        assert_eq!(el.children[1].props.str("text"), Some("3"));
        assert_eq!(el.children[2].props.str("text"), Some("[]"));
        assert_eq!(
            el.reads(),
            &BTreeSet::from(["count".to_owned(), "missing".to_owned(), "name".to_owned()])
        );
        assert_eq!(el.children[0].reads(), &BTreeSet::from(["name".to_owned()]));
    }

    // ── Events ───────────────────────────────────────────────────────

    #[test]
    fn events_become_triggers_without_running() {
        let (fakes, renderer, ctx) = setup();
        let el = renderer.render(
            &node(json!({
                "type": "Button",
                "properties": {"label": "Go", "id": "go"},
                "events": {"tap": {"action": "navigate", "target": "home"}},
                "onLongPress": {"action": "bogus"}
            })),
            &ctx,
        );
        assert!(el.props.trigger("onTap").is_some());
        assert!(el.props.trigger("onLongPress").is_some());
        assert!(fakes.navigator.calls().is_empty());
        // The bogus kind is only reported once it fires.
        assert!(ctx.diagnostics.is_empty());

        let report = tokio_test::block_on(el.props.trigger("onTap").unwrap().run());
        assert_eq!(report.len(), 1);
        assert_eq!(fakes.navigator.calls(), vec![("home".to_owned(), false)]);
    }

    // ── Forms ────────────────────────────────────────────────────────

    #[test]
    fn registers_fields_under_form_scope() {
        let (_, renderer, ctx) = setup();
        renderer.render(
            &node(json!({
                "type": "Form",
                "properties": {"formId": "signup"},
                "children": [
                    {"type": "TextField", "properties": {"fieldId": "email", "value": "a@b.c"}},
                    {"type": "Column", "children": [
                        {"type": "TextField", "properties": {"fieldId": "password"}}
                    ]}
                ]
            })),
            &ctx,
        );
        assert_eq!(ctx.inputs.form_fields("signup"), vec!["email", "password"]);
        assert_eq!(ctx.inputs.value("email").as_deref(), Some("a@b.c"));
        assert_eq!(ctx.inputs.value("password"), None);
    }

    #[test]
    fn rerender_keeps_user_input() {
        let (_, renderer, ctx) = setup();
        let tree = node(json!({"type": "TextField", "properties": {"fieldId": "q", "value": "seed"}}));
        renderer.render(&tree, &ctx);
        ctx.inputs.set_value("q", "typed");
        renderer.render(&tree, &ctx);
        assert_eq!(ctx.inputs.value("q").as_deref(), Some("typed"));
    }

    // ── Partial re-render ────────────────────────────────────────────

    #[test]
    fn rerender_only_rebuilds_affected_subtrees() {
        let (_, renderer, ctx) = setup();
        ctx.store.set([("a", json!("1")), ("b", json!("x"))]);
        let tree = node(json!({
            "type": "Column",
            "children": [
                {"type": "Text", "properties": {"text": "${a}"}},
                {"type": "Text", "properties": {"text": "${b}"}}
            ]
        }));
        let first = renderer.render(&tree, &ctx);
        ctx.store.set_one("a", json!("2"));
        let changed = BTreeSet::from(["a".to_owned()]);
        let second = renderer.rerender(&tree, &first, &changed, &ctx);

        assert_eq!(second.children[0].props.str("text"), Some("2"));
        assert_eq!(second.children[1], first.children[1]);
        // Partial and full renders agree.
        assert_eq!(second, renderer.render(&tree, &ctx));
    }

    #[test]
    fn render_snapshot() {
        let (_, renderer, ctx) = setup();
        ctx.store.set_one("user", json!("Ada"));
        let el = renderer.render(
            &node(json!({
                "type": "Column",
                "properties": {"padding": {"horizontal": 20, "vertical": 10}},
                "children": [
                    {"type": "Text", "properties": {"text": "Hi ${user}"}},
                    {"type": "Button", "properties": {"label": "Out"},
                     "events": {"tap": {"action": "logout"}}},
                    {"type": "Gizmo"}
                ]
            })),
            &ctx,
        );
        insta::assert_snapshot!(element_to_string(&el), @r###"
        Column padding=(20, 10, 20, 10)
          Text text="Hi Ada"
          Button enabled=true label="Out" onTap=<logout>
          ?Gizmo
        "###);
    }
}
