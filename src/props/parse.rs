//! Property parsing: raw JSON values -> typed UI primitives.
//!
//! Every `try_parse_*` returns a [`PropertyError`] describing why a value was
//! rejected; the matching `parse_*` wrapper falls back to the primitive's
//! default (or `None` for colors) so callers on the render path never fail.

use serde_json::{Map, Value};

use crate::geometry::{Alignment, BorderRadius, Color, Shape, Spacing};

/// Errors from property parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyError {
    #[error("expected a number, got {0}")]
    NotANumber(Value),
    #[error("invalid value for {property}: {message}")]
    InvalidValue { property: String, message: String },
}

fn invalid(property: &str, message: impl Into<String>) -> PropertyError {
    PropertyError::InvalidValue {
        property: property.into(),
        message: message.into(),
    }
}

/// Lowercase and strip `_`, `-` and spaces so `top_left`, `topLeft` and
/// `top-left` compare equal.
fn normalize_ident(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

/// Coerce a JSON number or numeric string into `f32`.
pub fn try_parse_number(value: &Value) -> Result<f32, PropertyError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(|f| f as f32)
            .filter(|f| f.is_finite())
            .ok_or_else(|| PropertyError::NotANumber(value.clone())),
        Value::String(s) => s
            .trim()
            .parse::<f32>()
            .ok()
            .filter(|f| f.is_finite())
            .ok_or_else(|| PropertyError::NotANumber(value.clone())),
        other => Err(PropertyError::NotANumber(other.clone())),
    }
}

/// Lenient numeric coercion. `None` if the value is not numeric.
pub fn parse_number(value: &Value) -> Option<f32> {
    try_parse_number(value).ok()
}

/// Booleans, `"true"`/`"false"` strings and numbers (non-zero is `true`).
pub fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        _ => None,
    }
}

/// Read an optional numeric key from a map, defaulting to 0.
fn side(map: &Map<String, Value>, key: &str) -> Result<f32, PropertyError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(0.0),
        Some(v) => try_parse_number(v),
    }
}

// ---------------------------------------------------------------------------
// Spacing
// ---------------------------------------------------------------------------

/// Parse margin/padding shorthand into normalized four-side [`Spacing`].
///
/// Accepted shapes, in precedence order when an object carries several keys:
///
/// 1. a bare number (or numeric string), or `{"all": N}`: uniform
/// 2. `{"horizontal": H, "vertical": V}`: symmetric, a missing axis is 0
/// 3. `{"left": L, "top": T, "right": R, "bottom": B}`: missing sides are 0
///
/// An array of 1-4 numbers is also accepted with CSS ordering
/// (`[all]`, `[vertical, horizontal]`, `[top, horizontal, bottom]`,
/// `[top, right, bottom, left]`). `null` is zero spacing.
pub fn try_parse_spacing(value: &Value) -> Result<Spacing, PropertyError> {
    match value {
        Value::Null => Ok(Spacing::ZERO),
        Value::Number(_) | Value::String(_) => Ok(Spacing::all(try_parse_number(value)?)),
        Value::Object(map) => {
            if let Some(all) = map.get("all") {
                return Ok(Spacing::all(try_parse_number(all)?));
            }
            if map.contains_key("horizontal") || map.contains_key("vertical") {
                return Ok(Spacing::symmetric(
                    side(map, "horizontal")?,
                    side(map, "vertical")?,
                ));
            }
            Ok(Spacing::new(
                side(map, "left")?,
                side(map, "top")?,
                side(map, "right")?,
                side(map, "bottom")?,
            ))
        }
        Value::Array(items) => {
            let n = items
                .iter()
                .map(try_parse_number)
                .collect::<Result<Vec<f32>, _>>()?;
            match n.as_slice() {
                [all] => Ok(Spacing::all(*all)),
                [v, h] => Ok(Spacing::symmetric(*h, *v)),
                [t, h, b] => Ok(Spacing::new(*h, *t, *h, *b)),
                [t, r, b, l] => Ok(Spacing::new(*l, *t, *r, *b)),
                _ => Err(invalid("spacing", format!("expected 1-4 values, got {}", n.len()))),
            }
        }
        Value::Bool(_) => Err(invalid("spacing", "expected a number or spacing object")),
    }
}

/// Lenient [`try_parse_spacing`]: unparseable input yields zero spacing.
pub fn parse_spacing(value: &Value) -> Spacing {
    try_parse_spacing(value).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Border radius / shape
// ---------------------------------------------------------------------------

/// Parse corner radii: a number, `{"all": N}`, or per-corner keys
/// (`topLeft`, `topRight`, `bottomRight`, `bottomLeft`; missing corners are 0).
pub fn try_parse_border_radius(value: &Value) -> Result<BorderRadius, PropertyError> {
    match value {
        Value::Null => Ok(BorderRadius::ZERO),
        Value::Number(_) | Value::String(_) => Ok(BorderRadius::all(try_parse_number(value)?)),
        Value::Object(map) => {
            if let Some(all) = map.get("all") {
                return Ok(BorderRadius::all(try_parse_number(all)?));
            }
            let mut radius = BorderRadius::ZERO;
            for (key, v) in map {
                let r = try_parse_number(v)?;
                match normalize_ident(key).as_str() {
                    "topleft" => radius.top_left = r,
                    "topright" => radius.top_right = r,
                    "bottomright" => radius.bottom_right = r,
                    "bottomleft" => radius.bottom_left = r,
                    _ => {}
                }
            }
            Ok(radius)
        }
        _ => Err(invalid("borderRadius", "expected a number or corner object")),
    }
}

/// Lenient [`try_parse_border_radius`].
pub fn parse_border_radius(value: &Value) -> BorderRadius {
    try_parse_border_radius(value).unwrap_or_default()
}

/// Parse a background shape.
///
/// - `"circle"` / `"rectangle"`
/// - a number: rectangle with that uniform corner radius
/// - `{"type": "circle"}`, `{"type": "rounded", "radius": <radius>}`, or a
///   bare corner-radius object
pub fn try_parse_shape(value: &Value) -> Result<Shape, PropertyError> {
    match value {
        Value::Null => Ok(Shape::default()),
        Value::String(s) => match normalize_ident(s).as_str() {
            "circle" | "oval" => Ok(Shape::Circle),
            "rectangle" | "rect" | "box" => Ok(Shape::default()),
            _ => try_parse_border_radius(value)
                .map(Shape::Rectangle)
                .map_err(|_| invalid("shape", format!("unknown shape `{s}`"))),
        },
        Value::Number(_) => Ok(Shape::Rectangle(try_parse_border_radius(value)?)),
        Value::Object(map) => {
            let kind = map
                .get("type")
                .or_else(|| map.get("shape"))
                .and_then(Value::as_str)
                .map(normalize_ident);
            if matches!(kind.as_deref(), Some("circle") | Some("oval")) {
                return Ok(Shape::Circle);
            }
            match map.get("radius").or_else(|| map.get("borderRadius")) {
                Some(radius) => Ok(Shape::Rectangle(try_parse_border_radius(radius)?)),
                None => Ok(Shape::Rectangle(try_parse_border_radius(value)?)),
            }
        }
        _ => Err(invalid("shape", "expected a shape name, radius or shape object")),
    }
}

/// Lenient [`try_parse_shape`].
pub fn parse_shape(value: &Value) -> Shape {
    try_parse_shape(value).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// Parse a color.
///
/// Supports:
/// - Hex strings: `#rgb`, `#rrggbb`, `#aarrggbb`, and the same with a `0x` prefix
/// - Integers in `0xAARRGGBB` layout
/// - Named colors (case-insensitive): `black`, `white`, `red`, `green`, `blue`,
///   `yellow`, `orange`, `purple`, `pink`, `cyan`, `magenta`, `teal`, `indigo`,
///   `amber`, `brown`, `grey`/`gray`, `transparent`
pub fn try_parse_color(value: &Value) -> Result<Color, PropertyError> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Some(hex) = s.strip_prefix('#').or_else(|| {
                s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
            }) {
                return parse_hex_color(hex)
                    .ok_or_else(|| invalid("color", format!("bad hex color `{s}`")));
            }
            named_color(s).ok_or_else(|| invalid("color", format!("unknown color `{s}`")))
        }
        Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(Color::from_argb_u32)
            .ok_or_else(|| invalid("color", format!("integer color out of range: {n}"))),
        other => Err(invalid("color", format!("expected a color string, got {other}"))),
    }
}

/// Lenient [`try_parse_color`]: `None` for anything unparseable.
pub fn parse_color(value: &Value) -> Option<Color> {
    try_parse_color(value).ok()
}

/// Parse hex digits (without the leading `#`/`0x`).
fn parse_hex_color(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let nib = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
            let (r, g, b) = (nib(0)?, nib(1)?, nib(2)?);
            // Expand: 0xA -> 0xAA
            Some(Color::rgb(r * 17, g * 17, b * 17))
        }
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::argb(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Color> {
    let color = match normalize_ident(name).as_str() {
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "transparent" => Color::TRANSPARENT,
        "red" => Color::rgb(0xF4, 0x43, 0x36),
        "pink" => Color::rgb(0xE9, 0x1E, 0x63),
        "purple" => Color::rgb(0x9C, 0x27, 0xB0),
        "indigo" => Color::rgb(0x3F, 0x51, 0xB5),
        "blue" => Color::rgb(0x21, 0x96, 0xF3),
        "cyan" => Color::rgb(0x00, 0xBC, 0xD4),
        "teal" => Color::rgb(0x00, 0x96, 0x88),
        "green" => Color::rgb(0x4C, 0xAF, 0x50),
        "yellow" => Color::rgb(0xFF, 0xEB, 0x3B),
        "amber" => Color::rgb(0xFF, 0xC1, 0x07),
        "orange" => Color::rgb(0xFF, 0x98, 0x00),
        "brown" => Color::rgb(0x79, 0x55, 0x48),
        "magenta" => Color::rgb(0xFF, 0x00, 0xFF),
        "grey" | "gray" => Color::rgb(0x9E, 0x9E, 0x9E),
        _ => return None,
    };
    Some(color)
}

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

/// Parse a child alignment.
///
/// Accepts the nine named positions (`topLeft`, `topCenter`, `topRight`,
/// `centerLeft`, `center`, `centerRight`, `bottomLeft`, `bottomCenter`,
/// `bottomRight`; any casing, `_`/`-` separators allowed), the edge shorthands
/// `top`, `bottom`, `left`, `right`, and `{"x": X, "y": Y}` with fractions in
/// `-1..=1` (clamped).
pub fn try_parse_alignment(value: &Value) -> Result<Alignment, PropertyError> {
    match value {
        Value::String(s) => {
            let a = match normalize_ident(s).as_str() {
                "topleft" | "topstart" => Alignment::TOP_LEFT,
                "topcenter" | "top" => Alignment::TOP_CENTER,
                "topright" | "topend" => Alignment::TOP_RIGHT,
                "centerleft" | "centerstart" | "left" | "start" => Alignment::CENTER_LEFT,
                "center" => Alignment::CENTER,
                "centerright" | "centerend" | "right" | "end" => Alignment::CENTER_RIGHT,
                "bottomleft" | "bottomstart" => Alignment::BOTTOM_LEFT,
                "bottomcenter" | "bottom" => Alignment::BOTTOM_CENTER,
                "bottomright" | "bottomend" => Alignment::BOTTOM_RIGHT,
                _ => return Err(invalid("alignment", format!("unknown alignment `{s}`"))),
            };
            Ok(a)
        }
        Value::Object(map) => Ok(Alignment::new(side(map, "x")?, side(map, "y")?).clamped()),
        other => Err(invalid("alignment", format!("expected a name or {{x, y}}, got {other}"))),
    }
}

/// Lenient [`try_parse_alignment`]: unparseable input yields
/// [`Alignment::CENTER`].
pub fn parse_alignment(value: &Value) -> Alignment {
    try_parse_alignment(value).unwrap_or_default()
}

// ===========================================================================
// Tests
// ===========================================================================
