//! Rendering pipeline: context, triggers, renderer.
//!
//! A render pass walks a [`WidgetNode`](crate::tree::WidgetNode) tree against one
//! view-state snapshot and produces an [`Element`](crate::tree::Element) tree whose
//! event props are [`Trigger`]s bound to the [`ActionEngine`](crate::action::ActionEngine).

pub mod context;
pub mod renderer;
pub mod trigger;

pub use context::RenderContext;
pub use renderer::Renderer;
pub use trigger::Trigger;
