//! Typed UI primitives: Spacing, BorderRadius, Shape, Color, Alignment.
//!
//! These are the values that raw JSON properties resolve into. They carry no
//! knowledge of JSON themselves; see [`crate::props::parse`] for the shorthand
//! resolution rules.

use std::fmt;
use std::ops::Add;

// ---------------------------------------------------------------------------
// Spacing
// ---------------------------------------------------------------------------

/// Spacing around the four sides of a rectangle, used for margin and padding.
///
/// Always stored in the normalized four-side form, so two shorthands that
/// describe the same sides compare equal.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Spacing {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Spacing {
    /// No spacing on any side.
    pub const ZERO: Spacing = Spacing { left: 0.0, top: 0.0, right: 0.0, bottom: 0.0 };

    /// Create spacing from explicit per-side values.
    #[inline]
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self { left, top, right, bottom }
    }

    /// The same value on all four sides.
    #[inline]
    pub const fn all(value: f32) -> Self {
        Self { left: value, top: value, right: value, bottom: value }
    }

    /// `horizontal` on left/right, `vertical` on top/bottom.
    #[inline]
    pub const fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self { left: horizontal, top: vertical, right: horizontal, bottom: vertical }
    }

    /// Total horizontal spacing (`left + right`).
    #[inline]
    pub fn width(self) -> f32 {
        self.left + self.right
    }

    /// Total vertical spacing (`top + bottom`).
    #[inline]
    pub fn height(self) -> f32 {
        self.top + self.bottom
    }

    /// Whether every side is zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self == Spacing::ZERO
    }
}

impl Add for Spacing {
    type Output = Spacing;
    #[inline]
    fn add(self, rhs: Spacing) -> Spacing {
        Spacing {
            left: self.left + rhs.left,
            top: self.top + rhs.top,
            right: self.right + rhs.right,
            bottom: self.bottom + rhs.bottom,
        }
    }
}

// ---------------------------------------------------------------------------
// BorderRadius / Shape
// ---------------------------------------------------------------------------

/// Corner radii of a rounded rectangle.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BorderRadius {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl BorderRadius {
    pub const ZERO: BorderRadius =
        BorderRadius { top_left: 0.0, top_right: 0.0, bottom_right: 0.0, bottom_left: 0.0 };

    /// The same radius on every corner.
    #[inline]
    pub const fn all(radius: f32) -> Self {
        Self { top_left: radius, top_right: radius, bottom_right: radius, bottom_left: radius }
    }
}

/// Outline of a widget's background.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    /// A (possibly rounded) rectangle.
    Rectangle(BorderRadius),
    /// A circle inscribed in the widget's bounds.
    Circle,
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Rectangle(BorderRadius::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// An 8-bit-per-channel color with alpha.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::argb(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Opaque color from red, green, blue.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { a: 255, r, g, b }
    }

    /// Color from alpha, red, green, blue.
    #[inline]
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Unpack a `0xAARRGGBB` integer.
    #[inline]
    pub const fn from_argb_u32(value: u32) -> Self {
        Self {
            a: (value >> 24) as u8,
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        }
    }

    /// Pack into a `0xAARRGGBB` integer.
    #[inline]
    pub const fn to_argb_u32(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.a, self.r, self.g, self.b)
    }
}

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

/// Position of a child inside its parent, as fractions in `-1.0..=1.0`.
///
/// `(-1, -1)` is the top-left corner, `(0, 0)` the center, `(1, 1)` the
/// bottom-right corner.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Alignment {
    pub x: f32,
    pub y: f32,
}

impl Alignment {
    pub const TOP_LEFT: Alignment = Alignment::new(-1.0, -1.0);
    pub const TOP_CENTER: Alignment = Alignment::new(0.0, -1.0);
    pub const TOP_RIGHT: Alignment = Alignment::new(1.0, -1.0);
    pub const CENTER_LEFT: Alignment = Alignment::new(-1.0, 0.0);
    pub const CENTER: Alignment = Alignment::new(0.0, 0.0);
    pub const CENTER_RIGHT: Alignment = Alignment::new(1.0, 0.0);
    pub const BOTTOM_LEFT: Alignment = Alignment::new(-1.0, 1.0);
    pub const BOTTOM_CENTER: Alignment = Alignment::new(0.0, 1.0);
    pub const BOTTOM_RIGHT: Alignment = Alignment::new(1.0, 1.0);

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Clamp both axes into `-1.0..=1.0`.
    #[inline]
    pub fn clamped(self) -> Self {
        Self { x: self.x.clamp(-1.0, 1.0), y: self.y.clamp(-1.0, 1.0) }
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Alignment::CENTER
    }
}

// ===========================================================================
// Tests
// ===========================================================================
