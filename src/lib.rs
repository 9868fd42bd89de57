//! # gilt-sdui
//!
//! A server-driven UI runtime: renders JSON widget trees into typed element
//! trees and runs declarative action chains against pluggable effects.
//!
//! A screen document is a tree of `{"type", "properties", "children", "events"}`
//! nodes. Properties may reference view state with `${key}` templates; events
//! hold action descriptors (`navigate`, `login`, `submitForm`, `setState`,
//! `apiCall`, `logout`) that branch on success or failure.
//!
//! ## Core Systems
//!
//! - **[`tree`]**: JSON node parsing and the rendered element tree
//! - **[`props`]**: Property parsers (spacing, colors, alignment, shapes) and `${}` templates
//! - **[`widget`]**: Widget registry and built-in widget builders
//! - **[`render`]**: Full and partial rendering, trigger binding
//! - **[`action`]**: Action descriptors, the chain engine, effect traits
//! - **[`state`]**: Observable view state and form input store
//! - **[`diagnostics`]**: Bounded sink for non-fatal problems
//! - **[`app`]**: Application config and screen mounting
//! - **[`screen`]**: A mounted document with change tracking
//! - **[`testing`]**: Fakes, a headless harness, snapshot helpers
//! - **[`geometry`]**: Spacing, Color, Alignment, Shape primitives

// Foundation
pub mod diagnostics;
pub mod geometry;

// Documents and widgets
pub mod props;
pub mod tree;
pub mod widget;

// State and actions
pub mod action;
pub mod state;

// Rendering
pub mod render;

// Application
pub mod app;
pub mod screen;

// Test support
pub mod testing;

pub use app::{App, AppConfig};
pub use screen::Screen;
