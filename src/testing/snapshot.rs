//! Snapshot rendering helpers.
//!
//! Turns a rendered [`Element`] tree into indented plain text suitable for
//! `insta` snapshots and assertions.

use crate::geometry::{BorderRadius, Shape, Spacing};
use crate::tree::{Element, PropValue};

/// Property keys folded into the style summary instead of printed raw.
const STYLE_KEYS: &[&str] = &[
    "padding",
    "margin",
    "color",
    "backgroundColor",
    "shape",
    "borderRadius",
    "alignment",
    "mainAxisAlignment",
    "crossAxisAlignment",
    "gap",
];

/// Render an element tree as text, one element per line.
///
/// Each line is the type tag (prefixed with `?` for placeholders), the
/// non-default resolved style, then the remaining props sorted by key. Triggers
/// print as `<kind>`. Children are indented by two spaces per level.
///
/// ```ignore
/// Column padding=(20, 10, 20, 10)
///   Text text="Hi Ada"
///   Button enabled=true label="Out" onTap=<logout>
///   ?Gizmo
/// ```
pub fn element_to_string(element: &Element) -> String {
    let mut lines = Vec::new();
    write_element(element, 0, &mut lines);
    lines.join("\n")
}

fn write_element(element: &Element, depth: usize, lines: &mut Vec<String>) {
    let mut line = "  ".repeat(depth);
    if element.is_placeholder() {
        line.push('?');
    }
    line.push_str(&element.widget_type);

    let style = &element.style;
    if !style.padding.is_zero() {
        line.push_str(&format!(" padding={}", spacing(style.padding)));
    }
    if !style.margin.is_zero() {
        line.push_str(&format!(" margin={}", spacing(style.margin)));
    }
    if let Some(color) = style.color {
        line.push_str(&format!(" color={color}"));
    }
    if let Some(bg) = style.background {
        line.push_str(&format!(" background={bg}"));
    }
    if let Some(a) = style.alignment {
        line.push_str(&format!(" alignment=({}, {})", a.x, a.y));
    }
    match style.shape {
        Shape::Circle => line.push_str(" shape=circle"),
        Shape::Rectangle(r) if r != BorderRadius::ZERO => line.push_str(&format!(
            " radius=({}, {}, {}, {})",
            r.top_left, r.top_right, r.bottom_right, r.bottom_left
        )),
        Shape::Rectangle(_) => {}
    }

    for (key, value) in &element.props {
        if STYLE_KEYS.contains(&key.as_str()) {
            continue;
        }
        match value {
            PropValue::Value(v) => line.push_str(&format!(" {key}={v}")),
            PropValue::Trigger(t) => {
                let kind = t.descriptor().get("action").and_then(|k| k.as_str()).unwrap_or("?");
                line.push_str(&format!(" {key}=<{kind}>"));
            }
        }
    }
    lines.push(line);

    for child in &element.children {
        write_element(child, depth + 1, lines);
    }
}

fn spacing(s: Spacing) -> String {
    format!("({}, {}, {}, {})", s.left, s.top, s.right, s.bottom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Alignment, Color};
    use crate::tree::Props;
    use serde_json::json;

    #[test]
    fn nested_tree() {
        let mut props = Props::new();
        props.insert_value("text", json!("hi"));
        let mut text = Element::new("Text").with_props(props);
        text.style.color = Some(Color::WHITE);
        let root = Element::new("Column").with_children(vec![
            text,
            Element::placeholder("Gizmo", Props::new(), Vec::new()),
        ]);
        insta::assert_snapshot!(element_to_string(&root), @r###"
        Column
          Text color=#ffffffff text="hi"
          ?Gizmo
        "###);
    }

    #[test]
    fn style_summary() {
        let mut el = Element::new("Container");
        el.style.margin = Spacing::all(2.0);
        el.style.alignment = Some(Alignment::TOP_LEFT);
        el.style.shape = Shape::Circle;
        assert_eq!(
            element_to_string(&el),
            "Container margin=(2, 2, 2, 2) alignment=(-1, -1) shape=circle"
        );
    }
}
