//! Built-in widgets.
//!
//! Each builder resolves its visual properties into an [`ElementStyle`] and
//! keeps every rendered child, in order. Hosts map the resulting elements onto
//! their own primitives.

use serde_json::Value;
use taffy::prelude::*;
use taffy::style::Position;

use super::build::BuildContext;
use super::registry::WidgetRegistry;
use crate::props::{parse_bool, parse_number};
use crate::props::template::value_to_text;
use crate::tree::{Element, Props};

/// Register every built-in widget on `registry`.
pub fn register_builtins(registry: &mut WidgetRegistry) {
    registry
        .register("Column", |p, c, ctx| flex("Column", FlexDirection::Column, p, c, ctx))
        .register("Row", |p, c, ctx| flex("Row", FlexDirection::Row, p, c, ctx))
        .register("Form", |p, c, ctx| flex("Form", FlexDirection::Column, p, c, ctx))
        .register("Stack", stack)
        .register("Container", container)
        .register("Text", text)
        .register("Button", button)
        .register("TextField", text_field)
        .register("Spacer", spacer)
        .register("Image", image)
        .register("Divider", divider);
}

// ---------------------------------------------------------------------------
// Layout widgets
// ---------------------------------------------------------------------------

fn flex(
    tag: &str,
    direction: FlexDirection,
    props: Props,
    children: Vec<Element>,
    ctx: &BuildContext<'_>,
) -> Element {
    let style = ctx.style(&props, Some(direction));
    Element::new(tag)
        .with_style(style)
        .with_props(props)
        .with_children(children)
}

/// Children are layered on top of each other.
fn stack(props: Props, mut children: Vec<Element>, ctx: &BuildContext<'_>) -> Element {
    let style = ctx.style(&props, None);
    for child in &mut children {
        child.style.layout.position = Position::Absolute;
    }
    Element::new("Stack")
        .with_style(style)
        .with_props(props)
        .with_children(children)
}

fn container(props: Props, children: Vec<Element>, ctx: &BuildContext<'_>) -> Element {
    let style = ctx.style(&props, None);
    Element::new("Container")
        .with_style(style)
        .with_props(props)
        .with_children(children)
}

fn spacer(props: Props, children: Vec<Element>, ctx: &BuildContext<'_>) -> Element {
    let mut style = ctx.style(&props, None);
    // `style` already reported a bad `flex`.
    if props.value("flex").and_then(parse_number).is_none() {
        style.layout.flex_grow = 1.0;
    }
    Element::new("Spacer")
        .with_style(style)
        .with_props(props)
        .with_children(children)
}

fn divider(props: Props, children: Vec<Element>, ctx: &BuildContext<'_>) -> Element {
    let mut style = ctx.style(&props, None);
    let thickness = ctx.number(&props, "thickness").unwrap_or(1.0);
    style.layout.size.height = Dimension::from_length(thickness);
    Element::new("Divider")
        .with_style(style)
        .with_props(props)
        .with_children(children)
}

// ---------------------------------------------------------------------------
// Content widgets
// ---------------------------------------------------------------------------

/// Coerce `props[key]` to text (numbers from bindings become strings).
fn coerce_text(props: &mut Props, key: &str) {
    let text = props.value(key).map(value_to_text).unwrap_or_default();
    props.insert_value(key, Value::String(text));
}

fn text(mut props: Props, children: Vec<Element>, ctx: &BuildContext<'_>) -> Element {
    coerce_text(&mut props, "text");
    if props.value("fontSize").is_some() && ctx.number(&props, "fontSize").is_none() {
        props.remove("fontSize");
    }
    let style = ctx.style(&props, None);
    Element::new("Text")
        .with_style(style)
        .with_props(props)
        .with_children(children)
}

fn button(mut props: Props, children: Vec<Element>, ctx: &BuildContext<'_>) -> Element {
    coerce_text(&mut props, "label");
    let enabled = match props.value("enabled") {
        None => true,
        Some(v) => parse_bool(v).unwrap_or_else(|| {
            ctx.unresolvable("enabled", format!("expected a boolean, got {v}"));
            true
        }),
    };
    props.insert_value("enabled", Value::Bool(enabled));
    let style = ctx.style(&props, Some(FlexDirection::Row));
    Element::new("Button")
        .with_style(style)
        .with_props(props)
        .with_children(children)
}

fn text_field(mut props: Props, children: Vec<Element>, ctx: &BuildContext<'_>) -> Element {
    if props.str("fieldId").is_none() {
        ctx.unresolvable("fieldId", "text field has no `fieldId`; its input is not tracked");
    }
    coerce_text(&mut props, "value");
    let obscure = props.value("obscureText").and_then(parse_bool).unwrap_or(false);
    props.insert_value("obscureText", Value::Bool(obscure));
    let style = ctx.style(&props, None);
    Element::new("TextField")
        .with_style(style)
        .with_props(props)
        .with_children(children)
}

fn image(props: Props, children: Vec<Element>, ctx: &BuildContext<'_>) -> Element {
    if props.str("src").map_or(true, str::is_empty) {
        ctx.unresolvable("src", "image has no source");
    }
    let style = ctx.style(&props, None);
    Element::new("Image")
        .with_style(style)
        .with_props(props)
        .with_children(children)
}
