//! WidgetNode: the parsed JSON description of one widget.
//!
//! Parsing is lenient. A value that is not a usable node still produces a
//! [`WidgetNode`] (tagged [`MALFORMED_NODE_TYPE`], which never resolves to a
//! builder) and a [`Diagnostic::MalformedNode`], so a single bad entry can't
//! drop its siblings.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::diagnostics::{Diagnostic, Diagnostics};

/// Type tag given to nodes that could not be parsed.
pub const MALFORMED_NODE_TYPE: &str = "<malformed>";

/// Prefix that marks inline event properties unless configured otherwise.
pub const DEFAULT_EVENT_PREFIX: &str = "on";

/// Keys with structural meaning on a node object.
const STRUCTURAL_KEYS: &[&str] = &["type", "properties", "children", "child", "events"];

/// One JSON-described UI element.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WidgetNode {
    /// Type tag, matched verbatim (case-sensitive) against the registry.
    #[serde(rename = "type")]
    pub widget_type: String,
    pub properties: Map<String, Value>,
    pub children: Vec<WidgetNode>,
    /// Event name (e.g. `tap`) -> raw action descriptor. Decoded only at dispatch.
    pub events: BTreeMap<String, Value>,
}

impl WidgetNode {
    /// Create an empty node of the given type.
    pub fn new(widget_type: impl Into<String>) -> Self {
        Self {
            widget_type: widget_type.into(),
            ..Self::default()
        }
    }

    /// Set a property (builder).
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Append a child (builder).
    pub fn with_child(mut self, child: WidgetNode) -> Self {
        self.children.push(child);
        self
    }

    /// Bind an event to a raw action descriptor (builder).
    pub fn with_event(mut self, event: impl Into<String>, descriptor: Value) -> Self {
        self.events.insert(event.into(), descriptor);
        self
    }

    /// Whether this node came from unparseable input.
    pub fn is_malformed(&self) -> bool {
        self.widget_type == MALFORMED_NODE_TYPE
    }

    /// Total number of nodes in this subtree (including `self`).
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(WidgetNode::count).sum::<usize>()
    }

    /// Parse a node tree from JSON, reporting problems to `diagnostics`.
    ///
    /// Accepted shape:
    ///
    /// ```text
    /// { "type": "Button",
    ///   "properties": { "label": "Go" },
    ///   "children": [ ... ],            // or a single "child": { ... }
    ///   "events": { "tap": { "action": "navigate", "target": "home" } } }
    /// ```
    ///
    /// Other top-level keys are treated as properties (explicit `properties`
    /// entries win). A property `onXxx` whose value is an object carrying an
    /// `action` key is an event binding for `xxx`, not a plain value.
    pub fn parse(value: &Value, diagnostics: &Diagnostics) -> Self {
        Self::parse_with_prefix(value, DEFAULT_EVENT_PREFIX, diagnostics)
    }

    /// [`WidgetNode::parse`] with a custom inline event prefix
    /// (`handleTap` with prefix `handle`).
    pub fn parse_with_prefix(value: &Value, prefix: &str, diagnostics: &Diagnostics) -> Self {
        Self::parse_at(value, "root", prefix, diagnostics)
    }

    fn parse_at(value: &Value, path: &str, prefix: &str, diagnostics: &Diagnostics) -> Self {
        let malformed = |message: String| {
            diagnostics.report(Diagnostic::MalformedNode {
                path: path.to_owned(),
                message,
            });
            WidgetNode::new(MALFORMED_NODE_TYPE)
        };

        let Value::Object(obj) = value else {
            return malformed(format!("expected an object, got {value}"));
        };
        let widget_type = match obj.get("type") {
            Some(Value::String(t)) if !t.is_empty() => t.clone(),
            Some(other) => return malformed(format!("`type` must be a non-empty string, got {other}")),
            None => return malformed("missing `type`".to_owned()),
        };

        let mut node = WidgetNode::new(widget_type);

        // Inline properties first, so an explicit `properties` map overrides them.
        for (key, v) in obj {
            if !STRUCTURAL_KEYS.contains(&key.as_str()) {
                node.properties.insert(key.clone(), v.clone());
            }
        }
        match obj.get("properties") {
            None | Some(Value::Null) => {}
            Some(Value::Object(props)) => {
                for (key, v) in props {
                    node.properties.insert(key.clone(), v.clone());
                }
            }
            Some(other) => diagnostics.report(Diagnostic::MalformedNode {
                path: path.to_owned(),
                message: format!("`properties` must be an object, got {other}"),
            }),
        }

        // Lift inline event properties out of the bag.
        let inline_events: Vec<String> = node
            .properties
            .iter()
            .filter(|(key, v)| event_name(prefix, key).is_some() && is_action_object(v))
            .map(|(key, _)| key.clone())
            .collect();
        for key in inline_events {
            if let (Some(name), Some(descriptor)) = (event_name(prefix, &key), node.properties.remove(&key)) {
                node.events.insert(name, descriptor);
            }
        }

        match obj.get("events") {
            None | Some(Value::Null) => {}
            Some(Value::Object(events)) => {
                for (name, descriptor) in events {
                    node.events.insert(name.clone(), descriptor.clone());
                }
            }
            Some(other) => diagnostics.report(Diagnostic::MalformedNode {
                path: path.to_owned(),
                message: format!("`events` must be an object, got {other}"),
            }),
        }

        match obj.get("children") {
            None | Some(Value::Null) => {}
            Some(Value::Array(children)) => {
                for (i, child) in children.iter().enumerate() {
                    let child_path = format!("{path}/children[{i}]");
                    node.children.push(Self::parse_at(child, &child_path, prefix, diagnostics));
                }
            }
            Some(other) => diagnostics.report(Diagnostic::MalformedNode {
                path: path.to_owned(),
                message: format!("`children` must be an array, got {other}"),
            }),
        }
        if let Some(child) = obj.get("child").filter(|c| !c.is_null()) {
            let child_path = format!("{path}/child");
            node.children.push(Self::parse_at(child, &child_path, prefix, diagnostics));
        }

        node
    }
}

/// `onLongPress` -> `longPress` for prefix `on`. `None` if `key` is not a
/// `<prefix>Xxx` name.
pub fn event_name(prefix: &str, key: &str) -> Option<String> {
    let rest = key.strip_prefix(prefix)?;
    let mut chars = rest.chars();
    let first = chars.next()?;
    if !first.is_ascii_uppercase() {
        return None;
    }
    Some(first.to_ascii_lowercase().to_string() + chars.as_str())
}

/// `longPress` -> `onLongPress` using `prefix`. Names that already carry the
/// prefix (`onTap`) are kept as they are.
pub fn event_prop_key(prefix: &str, event: &str) -> String {
    if let Some(rest) = event.strip_prefix(prefix) {
        if rest.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
            return event.to_owned();
        }
    }
    let mut chars = event.chars();
    match chars.next() {
        Some(first) => format!("{prefix}{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => prefix.to_owned(),
    }
}

fn is_action_object(value: &Value) -> bool {
    value.as_object().is_some_and(|o| o.contains_key("action"))
}
