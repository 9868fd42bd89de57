//! Typed primitives -> taffy layout style.
//!
//! Maps [`Spacing`], [`Alignment`] and flex shorthands onto a
//! [`taffy::Style`] so hosts that lay out with taffy can use a rendered
//! element's style directly.

use serde_json::Value;
use taffy::prelude::*;

use super::parse::PropertyError;
use crate::geometry::{Alignment, Spacing};

/// Layout-relevant properties of one widget, already parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutInput {
    /// `None` leaves taffy's default (row).
    pub direction: Option<FlexDirection>,
    pub padding: Spacing,
    pub margin: Spacing,
    pub gap: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub flex: Option<f32>,
    pub main_axis: Option<JustifyContent>,
    pub cross_axis: Option<AlignItems>,
    /// Where a single child sits; overridden per axis by `main_axis`/`cross_axis`.
    pub alignment: Option<Alignment>,
}

/// Convert [`Spacing`] into a taffy padding rect.
pub fn spacing_to_padding(spacing: Spacing) -> taffy::geometry::Rect<LengthPercentage> {
    taffy::geometry::Rect {
        top: LengthPercentage::from_length(spacing.top),
        right: LengthPercentage::from_length(spacing.right),
        bottom: LengthPercentage::from_length(spacing.bottom),
        left: LengthPercentage::from_length(spacing.left),
    }
}

/// Convert [`Spacing`] into a taffy margin rect.
pub fn spacing_to_margin(spacing: Spacing) -> taffy::geometry::Rect<LengthPercentageAuto> {
    taffy::geometry::Rect {
        top: LengthPercentageAuto::from_length(spacing.top),
        right: LengthPercentageAuto::from_length(spacing.right),
        bottom: LengthPercentageAuto::from_length(spacing.bottom),
        left: LengthPercentageAuto::from_length(spacing.left),
    }
}

fn ident(value: &Value, property: &str) -> Result<String, PropertyError> {
    value
        .as_str()
        .map(|s| {
            s.chars()
                .filter(|c| !matches!(c, '_' | '-' | ' '))
                .flat_map(char::to_lowercase)
                .collect()
        })
        .ok_or_else(|| PropertyError::InvalidValue {
            property: property.into(),
            message: format!("expected a string, got {value}"),
        })
}

/// Parse `mainAxisAlignment`: `start`, `end`, `center`, `spaceBetween`,
/// `spaceAround`, `spaceEvenly`, `stretch`.
pub fn try_parse_main_axis(value: &Value) -> Result<JustifyContent, PropertyError> {
    let justify = match ident(value, "mainAxisAlignment")?.as_str() {
        "start" | "flexstart" => JustifyContent::FlexStart,
        "end" | "flexend" => JustifyContent::FlexEnd,
        "center" => JustifyContent::Center,
        "spacebetween" => JustifyContent::SpaceBetween,
        "spacearound" => JustifyContent::SpaceAround,
        "spaceevenly" => JustifyContent::SpaceEvenly,
        "stretch" => JustifyContent::Stretch,
        other => {
            return Err(PropertyError::InvalidValue {
                property: "mainAxisAlignment".into(),
                message: format!("unknown value `{other}`"),
            })
        }
    };
    Ok(justify)
}

/// Parse `crossAxisAlignment`: `start`, `end`, `center`, `stretch`, `baseline`.
pub fn try_parse_cross_axis(value: &Value) -> Result<AlignItems, PropertyError> {
    let align = match ident(value, "crossAxisAlignment")?.as_str() {
        "start" | "flexstart" => AlignItems::FlexStart,
        "end" | "flexend" => AlignItems::FlexEnd,
        "center" => AlignItems::Center,
        "stretch" => AlignItems::Stretch,
        "baseline" => AlignItems::Baseline,
        other => {
            return Err(PropertyError::InvalidValue {
                property: "crossAxisAlignment".into(),
                message: format!("unknown value `{other}`"),
            })
        }
    };
    Ok(align)
}

fn fraction_to_justify(f: f32) -> JustifyContent {
    if f < -0.33 {
        JustifyContent::FlexStart
    } else if f > 0.33 {
        JustifyContent::FlexEnd
    } else {
        JustifyContent::Center
    }
}

fn fraction_to_align(f: f32) -> AlignItems {
    if f < -0.33 {
        AlignItems::FlexStart
    } else if f > 0.33 {
        AlignItems::FlexEnd
    } else {
        AlignItems::Center
    }
}

/// Build a flex [`taffy::Style`] from parsed layout properties.
///
/// Mapping summary:
/// - `direction` -> `flex_direction`
/// - `padding`/`margin` -> rects in length units
/// - `gap` -> both row and column gap
/// - `width`/`height` -> `size`, `flex` -> `flex_grow`
/// - `alignment` -> justify/align along the style's axes (x is the main axis
///   for rows, y for columns); explicit `main_axis`/`cross_axis` win
pub fn build_style(input: &LayoutInput) -> taffy::Style {
    let mut style = taffy::Style::default();
    style.display = Display::Flex;
    if let Some(direction) = input.direction {
        style.flex_direction = direction;
    }

    style.padding = spacing_to_padding(input.padding);
    style.margin = spacing_to_margin(input.margin);

    if input.gap > 0.0 {
        style.gap = taffy::geometry::Size {
            width: LengthPercentage::from_length(input.gap),
            height: LengthPercentage::from_length(input.gap),
        };
    }

    if let Some(w) = input.width {
        style.size.width = Dimension::from_length(w);
    }
    if let Some(h) = input.height {
        style.size.height = Dimension::from_length(h);
    }
    if let Some(flex) = input.flex {
        style.flex_grow = flex;
    }

    if let Some(alignment) = input.alignment {
        let (main, cross) = match style.flex_direction {
            FlexDirection::Column | FlexDirection::ColumnReverse => (alignment.y, alignment.x),
            FlexDirection::Row | FlexDirection::RowReverse => (alignment.x, alignment.y),
        };
        style.justify_content = Some(fraction_to_justify(main));
        style.align_items = Some(fraction_to_align(cross));
    }
    if let Some(main) = input.main_axis {
        style.justify_content = Some(main);
    }
    if let Some(cross) = input.cross_axis {
        style.align_items = Some(cross);
    }

    style
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn padding_rect_matches_sides() {
        let rect = spacing_to_padding(Spacing::new(20.0, 10.0, 20.0, 10.0));
        assert_eq!(rect.left, LengthPercentage::from_length(20.0));
        assert_eq!(rect.top, LengthPercentage::from_length(10.0));
        assert_eq!(rect.right, LengthPercentage::from_length(20.0));
        assert_eq!(rect.bottom, LengthPercentage::from_length(10.0));
    }

    #[test]
    fn margin_rect_matches_sides() {
        let rect = spacing_to_margin(Spacing::all(3.0));
        assert_eq!(rect.left, LengthPercentageAuto::from_length(3.0));
        assert_eq!(rect.bottom, LengthPercentageAuto::from_length(3.0));
    }

    #[test]
    fn main_axis_values() {
        assert_eq!(
            try_parse_main_axis(&json!("spaceBetween")).unwrap(),
            JustifyContent::SpaceBetween
        );
        assert_eq!(
            try_parse_main_axis(&json!("space_evenly")).unwrap(),
            JustifyContent::SpaceEvenly
        );
        assert!(try_parse_main_axis(&json!("sideways")).is_err());
        assert!(try_parse_main_axis(&json!(1)).is_err());
    }

    #[test]
    fn cross_axis_values() {
        assert_eq!(try_parse_cross_axis(&json!("stretch")).unwrap(), AlignItems::Stretch);
        assert_eq!(try_parse_cross_axis(&json!("END")).unwrap(), AlignItems::FlexEnd);
        assert!(try_parse_cross_axis(&json!("middle")).is_err());
    }

    #[test]
    fn column_style_from_input() {
        let style = build_style(&LayoutInput {
            direction: Some(FlexDirection::Column),
            padding: Spacing::all(4.0),
            gap: 2.0,
            width: Some(100.0),
            ..LayoutInput::default()
        });
        assert_eq!(style.display, Display::Flex);
        assert_eq!(style.flex_direction, FlexDirection::Column);
        assert_eq!(style.padding.top, LengthPercentage::from_length(4.0));
        assert_eq!(style.gap.width, LengthPercentage::from_length(2.0));
        assert_eq!(style.size.width, Dimension::from_length(100.0));
        assert_eq!(style.justify_content, None);
    }

    #[test]
    fn alignment_follows_axis() {
        let row = build_style(&LayoutInput {
            direction: Some(FlexDirection::Row),
            alignment: Some(Alignment::TOP_RIGHT),
            ..LayoutInput::default()
        });
        assert_eq!(row.justify_content, Some(JustifyContent::FlexEnd));
        assert_eq!(row.align_items, Some(AlignItems::FlexStart));

        let column = build_style(&LayoutInput {
            direction: Some(FlexDirection::Column),
            alignment: Some(Alignment::TOP_RIGHT),
            ..LayoutInput::default()
        });
        assert_eq!(column.justify_content, Some(JustifyContent::FlexStart));
        assert_eq!(column.align_items, Some(AlignItems::FlexEnd));
    }

    #[test]
    fn explicit_axes_override_alignment() {
        let style = build_style(&LayoutInput {
            direction: Some(FlexDirection::Row),
            alignment: Some(Alignment::CENTER),
            main_axis: Some(JustifyContent::SpaceAround),
            ..LayoutInput::default()
        });
        assert_eq!(style.justify_content, Some(JustifyContent::SpaceAround));
        assert_eq!(style.align_items, Some(AlignItems::Center));
    }
}
