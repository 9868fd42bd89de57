//! Property resolution: JSON values -> typed primitives, bindings, layout.
//!
//! - [`parse`]: spacing/color/alignment/shape shorthands with numeric coercion.
//! - [`template`]: `${key}` binding substitution against the view state.
//! - [`layout`]: typed primitives -> [`taffy::Style`].

pub mod layout;
pub mod parse;
pub mod template;

pub use layout::{build_style, LayoutInput};
pub use parse::{
    parse_alignment, parse_bool, parse_border_radius, parse_color, parse_number, parse_shape,
    parse_spacing, try_parse_alignment, try_parse_border_radius, try_parse_color, try_parse_number,
    try_parse_shape, try_parse_spacing, PropertyError,
};
