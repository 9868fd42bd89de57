//! RenderContext: explicit handles threaded through every render and dispatch.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::trigger::Trigger;
use crate::action::{ActionEngine, ChainReport};
use crate::app::AppConfig;
use crate::diagnostics::Diagnostics;
use crate::state::{InputStore, ViewStateStore};

/// Per-screen handles: view state, form inputs, engine, diagnostics, config.
///
/// Cloning is cheap; every clone refers to the same screen.
#[derive(Clone)]
pub struct RenderContext {
    pub store: Arc<ViewStateStore>,
    pub inputs: Arc<InputStore>,
    pub engine: Arc<ActionEngine>,
    pub diagnostics: Diagnostics,
    pub config: Arc<AppConfig>,
}

impl RenderContext {
    /// A fresh context with an empty store, inputs and diagnostics. The
    /// config is taken from `engine`.
    pub fn new(engine: Arc<ActionEngine>) -> Self {
        let config = engine.shared_config();
        Self {
            store: Arc::new(ViewStateStore::new()),
            inputs: Arc::new(InputStore::new()),
            diagnostics: Diagnostics::new(config.max_diagnostics),
            engine,
            config,
        }
    }

    /// Use `store` as the view state (builder).
    pub fn with_store(mut self, store: Arc<ViewStateStore>) -> Self {
        self.store = store;
        self
    }

    /// Use `diagnostics` as the sink (builder).
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Whether the owning screen is still mounted.
    pub fn is_active(&self) -> bool {
        self.store.is_mounted()
    }

    /// Bind `descriptor` into a trigger. Nothing is decoded until it fires.
    pub fn trigger(&self, descriptor: Value) -> Trigger {
        Trigger::new(descriptor, self.clone())
    }

    /// Decode and run `descriptor` now.
    pub async fn dispatch(&self, descriptor: &Value) -> ChainReport {
        self.engine.execute_value(descriptor, self).await
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("store", &self.store)
            .field("diagnostics", &self.diagnostics.len())
            .finish_non_exhaustive()
    }
}
