//! WidgetRegistry: type tag -> builder lookup table.
//!
//! Built-ins and host extensions share one namespace. Registering a tag that
//! already exists replaces the previous builder (last writer wins). Unknown
//! tags resolve to `None`; the renderer owns the placeholder fallback.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::build::BuildContext;
use crate::tree::{Element, Props};

/// A pure function from resolved props and rendered children to an element.
pub type Builder = Arc<dyn Fn(Props, Vec<Element>, &BuildContext<'_>) -> Element + Send + Sync>;

/// Lookup table from widget type tag to [`Builder`].
#[derive(Clone, Default)]
pub struct WidgetRegistry {
    builders: HashMap<String, Builder>,
}

impl WidgetRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in widgets.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        super::builtins::register_builtins(&mut registry);
        registry
    }

    /// Register `builder` for `widget_type`, replacing any previous one.
    pub fn register<F>(&mut self, widget_type: impl Into<String>, builder: F) -> &mut Self
    where
        F: Fn(Props, Vec<Element>, &BuildContext<'_>) -> Element + Send + Sync + 'static,
    {
        self.register_builder(widget_type, Arc::new(builder))
    }

    /// Register an already shared builder.
    pub fn register_builder(&mut self, widget_type: impl Into<String>, builder: Builder) -> &mut Self {
        let widget_type = widget_type.into();
        let replaced = self.builders.insert(widget_type.clone(), builder).is_some();
        tracing::debug!(%widget_type, replaced, "widget builder registered");
        self
    }

    /// Builder for `widget_type` (case-sensitive), if registered.
    pub fn resolve(&self, widget_type: &str) -> Option<Builder> {
        self.builders.get(widget_type).cloned()
    }

    pub fn contains(&self, widget_type: &str) -> bool {
        self.builders.contains_key(widget_type)
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Registered tags, sorted.
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetRegistry")
            .field("types", &self.types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;

    fn tagged(tag: &'static str) -> impl Fn(Props, Vec<Element>, &BuildContext<'_>) -> Element {
        move |props, children, _| {
            let mut el = Element::new(tag).with_props(props).with_children(children);
            el.props.insert_value("builtBy", serde_json::json!(tag));
            el
        }
    }

    #[test]
    fn register_and_resolve() {
        let mut registry = WidgetRegistry::new();
        assert!(registry.is_empty());
        registry.register("Card", tagged("Card"));
        assert!(registry.contains("Card"));
        assert!(registry.resolve("Card").is_some());
        assert!(registry.resolve("card").is_none());
        assert!(registry.resolve("Missing").is_none());
    }

    #[test]
    fn last_writer_wins() {
        let mut registry = WidgetRegistry::new();
        registry.register("Card", tagged("first"));
        registry.register("Card", tagged("second"));
        assert_eq!(registry.len(), 1);

        let diags = Diagnostics::default();
        let builder = registry.resolve("Card").unwrap();
        let el = builder(Props::new(), Vec::new(), &BuildContext::new("Card", &diags));
        assert_eq!(el.props.str("builtBy"), Some("second"));
    }

    #[test]
    fn builtins_are_registered() {
        let registry = WidgetRegistry::with_builtins();
        for tag in [
            "Column", "Row", "Stack", "Container", "Text", "Button", "TextField", "Form", "Spacer",
            "Image", "Divider",
        ] {
            assert!(registry.contains(tag), "missing built-in {tag}");
        }
    }

    #[test]
    fn types_are_sorted() {
        let mut registry = WidgetRegistry::new();
        registry.register("b", tagged("b")).register("a", tagged("a"));
        assert_eq!(registry.types(), vec!["a", "b"]);
    }
}
