//! Widget trees: the parsed JSON input and the rendered output.
//!
//! - [`WidgetNode`]: lenient model of one JSON node (type, properties, children, events).
//! - [`Element`]: what a builder produces; event props are bound [`Trigger`](crate::render::Trigger)s.

pub mod element;
pub mod node;

pub use element::{Element, ElementStyle, PropValue, Props};
pub use node::{event_name, event_prop_key, WidgetNode, DEFAULT_EVENT_PREFIX, MALFORMED_NODE_TYPE};
