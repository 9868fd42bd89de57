//! Element: one node of the rendered tree, plus its property bag.
//!
//! Builders turn resolved [`Props`] and rendered children into an
//! [`Element`]. Event properties hold a [`Trigger`] rather than a value, so an
//! element tree is inert until the host fires one.

use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::geometry::{Alignment, Color, Shape, Spacing};
use crate::render::trigger::Trigger;

// ---------------------------------------------------------------------------
// Props
// ---------------------------------------------------------------------------

/// A resolved property: a plain JSON value or a bound event trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Value(Value),
    Trigger(Trigger),
}

/// Resolved property bag handed to builders. Keys are kept sorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    entries: BTreeMap<String, PropValue>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries.get(key)
    }

    /// The plain value under `key` (`None` for triggers).
    pub fn value(&self, key: &str) -> Option<&Value> {
        match self.entries.get(key)? {
            PropValue::Value(v) => Some(v),
            PropValue::Trigger(_) => None,
        }
    }

    /// The string value under `key`.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.value(key).and_then(Value::as_str)
    }

    /// The trigger bound under `key` (e.g. `onTap`).
    pub fn trigger(&self, key: &str) -> Option<&Trigger> {
        match self.entries.get(key)? {
            PropValue::Trigger(t) => Some(t),
            PropValue::Value(_) => None,
        }
    }

    pub fn insert_value(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), PropValue::Value(value));
    }

    pub fn insert_trigger(&mut self, key: impl Into<String>, trigger: Trigger) {
        self.entries.insert(key.into(), PropValue::Trigger(trigger));
    }

    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, PropValue> {
        self.entries.iter()
    }

    /// Names of all bound triggers.
    pub fn trigger_keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|(k, v)| match v {
            PropValue::Trigger(_) => Some(k.as_str()),
            PropValue::Value(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Props {
    type Item = (&'a String, &'a PropValue);
    type IntoIter = btree_map::Iter<'a, String, PropValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// ElementStyle
// ---------------------------------------------------------------------------

/// Typed visual properties resolved by a builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementStyle {
    pub padding: Spacing,
    pub margin: Spacing,
    pub color: Option<Color>,
    pub background: Option<Color>,
    pub alignment: Option<Alignment>,
    pub shape: Shape,
    /// Flex layout derived from the properties above.
    pub layout: taffy::Style,
}

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// One node of the rendered tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// The widget type tag this element was built for.
    pub widget_type: String,
    pub props: Props,
    pub style: ElementStyle,
    pub children: Vec<Element>,
    /// Set when no builder was registered for `widget_type`.
    pub placeholder: bool,
    /// State keys read anywhere in this subtree; drives partial re-render.
    pub(crate) reads: BTreeSet<String>,
}

impl Element {
    /// Create an element with no props, style or children.
    pub fn new(widget_type: impl Into<String>) -> Self {
        Self {
            widget_type: widget_type.into(),
            props: Props::new(),
            style: ElementStyle::default(),
            children: Vec::new(),
            placeholder: false,
            reads: BTreeSet::new(),
        }
    }

    /// A visibly marked stand-in for an unregistered type. Keeps the original
    /// type tag, properties and children.
    pub fn placeholder(widget_type: impl Into<String>, props: Props, children: Vec<Element>) -> Self {
        Self {
            props,
            children,
            placeholder: true,
            ..Self::new(widget_type)
        }
    }

    /// Set props (builder).
    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    /// Set style (builder).
    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.style = style;
        self
    }

    /// Set children (builder).
    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }

    /// Whether this element stands in for an unknown widget type.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// The `id` property, if it is a string.
    pub fn id(&self) -> Option<&str> {
        self.props.str("id")
    }

    /// State keys read by this subtree.
    pub fn reads(&self) -> &BTreeSet<String> {
        &self.reads
    }

    /// Depth-first, pre-order walk of this subtree (including `self`).
    pub fn walk(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(el) = stack.pop() {
            out.push(el);
            stack.extend(el.children.iter().rev());
        }
        out
    }

    /// First element in pre-order whose `id` property equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.walk().into_iter().find(|el| el.id() == Some(id))
    }

    /// All elements of a widget type, in pre-order.
    pub fn find_by_type(&self, widget_type: &str) -> Vec<&Element> {
        self.walk()
            .into_iter()
            .filter(|el| el.widget_type == widget_type)
            .collect()
    }

    /// Number of elements in this subtree (including `self`).
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Element::count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree() -> Element {
        let mut a_props = Props::new();
        a_props.insert_value("id", json!("a"));
        let mut c_props = Props::new();
        c_props.insert_value("id", json!("c"));
        Element::new("Column").with_children(vec![
            Element::new("Row")
                .with_props(a_props)
                .with_children(vec![Element::new("Text"), Element::new("Text").with_props(c_props)]),
            Element::new("Text"),
        ])
    }

    #[test]
    fn props_value_access() {
        let mut props = Props::new();
        props.insert_value("label", json!("Go"));
        props.insert_value("size", json!(3));
        assert_eq!(props.str("label"), Some("Go"));
        assert_eq!(props.str("size"), None);
        assert_eq!(props.value("size"), Some(&json!(3)));
        assert!(props.trigger("label").is_none());
        assert_eq!(props.len(), 2);
        assert!(props.remove("size").is_some());
        assert!(!props.contains("size"));
    }

    #[test]
    fn props_iterate_sorted() {
        let mut props = Props::new();
        props.insert_value("z", json!(1));
        props.insert_value("a", json!(2));
        let keys: Vec<&String> = props.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "z"]);
    }

    #[test]
    fn walk_is_preorder() {
        let t = tree();
        let order: Vec<&str> = t.walk().iter().map(|e| e.widget_type.as_str()).collect();
        assert_eq!(order, vec!["Column", "Row", "Text", "Text", "Text"]);
        assert_eq!(t.count(), 5);
    }

    #[test]
    fn find_helpers() {
        let t = tree();
        assert_eq!(t.find_by_id("c").unwrap().widget_type, "Text");
        assert_eq!(t.find_by_id("a").unwrap().widget_type, "Row");
        assert!(t.find_by_id("zzz").is_none());
        assert_eq!(t.find_by_type("Text").len(), 3);
    }

    #[test]
    fn placeholder_keeps_tag_and_children() {
        let p = Element::placeholder("Unknown", Props::new(), vec![Element::new("Text")]);
        assert!(p.is_placeholder());
        assert_eq!(p.widget_type, "Unknown");
        assert_eq!(p.children.len(), 1);
        assert!(!Element::new("Text").is_placeholder());
    }
}
