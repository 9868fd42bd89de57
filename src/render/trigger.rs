//! Trigger: a zero-argument handle that runs one bound action descriptor.
//!
//! The renderer stores the raw JSON; decoding happens each time the trigger
//! runs, so a bad descriptor never fails a render.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;

use super::context::RenderContext;
use crate::action::ChainReport;

#[derive(Clone)]
pub struct Trigger {
    descriptor: Arc<Value>,
    ctx: RenderContext,
}

impl Trigger {
    pub(crate) fn new(descriptor: Value, ctx: RenderContext) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            ctx,
        }
    }

    /// The raw descriptor this trigger runs.
    pub fn descriptor(&self) -> &Value {
        &self.descriptor
    }

    /// Run the bound chain to completion.
    pub async fn run(&self) -> ChainReport {
        self.ctx.dispatch(&self.descriptor).await
    }

    /// Spawn the chain on the current tokio runtime and return immediately.
    ///
    /// Returns `None` when called outside a runtime.
    pub fn fire(&self) -> Option<JoinHandle<ChainReport>> {
        let handle = tokio::runtime::Handle::try_current().ok()?;
        let trigger = self.clone();
        Some(handle.spawn(async move { trigger.run().await }))
    }
}

impl PartialEq for Trigger {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Trigger").field(&self.descriptor).finish()
    }
}
