//! Shared state behind every result cache built from one job.

use std::sync::Arc;

use motif_core::ConfigRegistry;
use motif_storage::Storage;

use crate::engine::ExecutionContext;

/// Execution context plus the registry that tracks the active configuration.
///
/// Caches derived from one another share a session, so they launch engines
/// through the same context and initialize against the same registry.
#[derive(Debug, Clone)]
pub struct Session {
    context: Arc<dyn ExecutionContext>,
    registry: Arc<ConfigRegistry>,
}

impl Session {
    pub fn new(context: Arc<dyn ExecutionContext>, registry: Arc<ConfigRegistry>) -> Self {
        Self { context, registry }
    }

    /// Session with a fresh registry holding the built-in strategies
    pub fn with_context(context: Arc<dyn ExecutionContext>) -> Self {
        Self::new(context, Arc::new(ConfigRegistry::default()))
    }

    pub fn context(&self) -> &Arc<dyn ExecutionContext> {
        &self.context
    }

    pub fn registry(&self) -> &Arc<ConfigRegistry> {
        &self.registry
    }

    /// Storage the engine writes to
    pub fn storage(&self) -> Arc<dyn Storage> {
        self.context.storage()
    }
}
