//! BuildContext: what a builder may consult besides its props and children.
//!
//! Builders are pure. The context carries the type tag being built and the
//! diagnostic sink, plus helpers that resolve common properties into typed
//! primitives. A value that fails to parse falls back to its default and is
//! reported as [`Diagnostic::UnresolvableProperty`].

use serde_json::Value;
use taffy::prelude::{AlignItems, FlexDirection, JustifyContent};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::geometry::{Alignment, Color, Shape, Spacing};
use crate::props::layout::{try_parse_cross_axis, try_parse_main_axis};
use crate::props::{
    build_style, try_parse_alignment, try_parse_border_radius, try_parse_color, try_parse_number,
    try_parse_shape, try_parse_spacing, LayoutInput, PropertyError,
};
use crate::tree::{ElementStyle, Props};

/// Context handed to every builder invocation.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    widget_type: &'a str,
    diagnostics: &'a Diagnostics,
}

impl<'a> BuildContext<'a> {
    pub fn new(widget_type: &'a str, diagnostics: &'a Diagnostics) -> Self {
        Self {
            widget_type,
            diagnostics,
        }
    }

    /// The type tag being built.
    pub fn widget_type(&self) -> &'a str {
        self.widget_type
    }

    pub fn diagnostics(&self) -> &'a Diagnostics {
        self.diagnostics
    }

    /// Report `property` as unresolvable on the current widget.
    pub fn unresolvable(&self, property: &str, message: impl Into<String>) {
        self.diagnostics.report(Diagnostic::UnresolvableProperty {
            widget_type: self.widget_type.to_owned(),
            property: property.to_owned(),
            message: message.into(),
        });
    }

    /// Parse `props[key]` with `parse`. Absent, `null` and `""` values yield
    /// `None` silently; parse failures are reported and yield `None`.
    pub fn resolve<T>(
        &self,
        props: &Props,
        key: &str,
        parse: impl FnOnce(&Value) -> Result<T, PropertyError>,
    ) -> Option<T> {
        let value = props.value(key).filter(|v| !is_blank(v))?;
        match parse(value) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                self.unresolvable(key, err.to_string());
                None
            }
        }
    }

    // ── Typed helpers ────────────────────────────────────────────────

    pub fn spacing(&self, props: &Props, key: &str) -> Spacing {
        self.resolve(props, key, try_parse_spacing).unwrap_or_default()
    }

    pub fn color(&self, props: &Props, key: &str) -> Option<Color> {
        self.resolve(props, key, try_parse_color)
    }

    /// `None` when absent; [`Alignment::CENTER`] when present but unparseable.
    pub fn alignment(&self, props: &Props, key: &str) -> Option<Alignment> {
        if props.value(key).filter(|v| !is_blank(v)).is_none() {
            return None;
        }
        Some(self.resolve(props, key, try_parse_alignment).unwrap_or_default())
    }

    pub fn number(&self, props: &Props, key: &str) -> Option<f32> {
        self.resolve(props, key, try_parse_number)
    }

    /// `shape` wins over `borderRadius`; neither gives a square rectangle.
    pub fn shape(&self, props: &Props) -> Shape {
        if let Some(shape) = self.resolve(props, "shape", try_parse_shape) {
            return shape;
        }
        self.resolve(props, "borderRadius", try_parse_border_radius)
            .map(Shape::Rectangle)
            .unwrap_or_default()
    }

    pub fn main_axis(&self, props: &Props) -> Option<JustifyContent> {
        self.resolve(props, "mainAxisAlignment", try_parse_main_axis)
    }

    pub fn cross_axis(&self, props: &Props) -> Option<AlignItems> {
        self.resolve(props, "crossAxisAlignment", try_parse_cross_axis)
    }

    /// Resolve every common visual property into an [`ElementStyle`].
    pub fn style(&self, props: &Props, direction: Option<FlexDirection>) -> ElementStyle {
        let padding = self.spacing(props, "padding");
        let margin = self.spacing(props, "margin");
        let alignment = self.alignment(props, "alignment");
        let layout = build_style(&LayoutInput {
            direction,
            padding,
            margin,
            gap: self.number(props, "gap").unwrap_or(0.0),
            width: self.number(props, "width"),
            height: self.number(props, "height"),
            flex: self.number(props, "flex"),
            main_axis: self.main_axis(props),
            cross_axis: self.cross_axis(props),
            alignment,
        });
        ElementStyle {
            padding,
            margin,
            color: self.color(props, "color"),
            background: self.color(props, "backgroundColor"),
            alignment,
            shape: self.shape(props),
            layout,
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
