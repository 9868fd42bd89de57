//! Widget resolution: registry, build context, built-in builders.

pub mod build;
pub mod builtins;
pub mod registry;

pub use build::BuildContext;
pub use builtins::register_builtins;
pub use registry::{Builder, WidgetRegistry};
