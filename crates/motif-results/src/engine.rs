//! Engine handle lifecycle.
//!
//! The execution context builds an engine handle for one run; this module
//! drives it through `Constructed -> Running -> Finalized` and only hands out
//! handles that have completed all three steps.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use motif_core::{
    ActiveConfiguration, EmbeddingSet, Error, NativeSettings, OutputDescriptorSet, Result,
};
use motif_storage::{Storage, StoragePath};
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Everything an execution context needs to build an engine for one run
#[derive(Debug, Clone)]
pub struct EngineLaunch {
    pub run_id: Uuid,
    pub activation: Arc<ActiveConfiguration>,
    pub settings: NativeSettings,
}

impl EngineLaunch {
    pub fn new(activation: Arc<ActiveConfiguration>, settings: NativeSettings) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            activation,
            settings,
        }
    }

    /// Where the engine writes final embeddings, or `None` if the run
    /// does not produce them
    pub fn output_path(&self) -> Result<Option<StoragePath>> {
        let config = self.activation.configuration();
        if config.is_output_active()? {
            Ok(Some(StoragePath::parse(config.output_path()?)))
        } else {
            Ok(None)
        }
    }
}

/// One run of the distributed computation, as built by an execution context
pub trait EngineHandle: Send + Sync + fmt::Debug {
    /// Run all supersteps to completion
    fn run(&mut self) -> Result<()>;

    /// Release engine resources once the run is over
    fn finalize(&mut self) -> Result<()>;

    /// Per-superstep output descriptors
    fn output_descriptors(&self) -> Result<OutputDescriptorSet>;

    /// Final embeddings; only available when built for output
    fn embeddings(&self) -> Result<EmbeddingSet>;
}

/// Owner of the distributed engine
pub trait ExecutionContext: Send + Sync + fmt::Debug {
    /// Construct (but do not run) an engine handle
    fn create_engine(&self, launch: &EngineLaunch) -> Result<Box<dyn EngineHandle>>;

    /// Storage the engine writes its output to
    fn storage(&self) -> Arc<dyn Storage>;
}

/// Lifecycle state of an engine handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    Constructed,
    Running,
    Finalized,
}

impl HandleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandleState::Constructed => "constructed",
            HandleState::Running => "running",
            HandleState::Finalized => "finalized",
        }
    }
}

impl fmt::Display for HandleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine handle with enforced lifecycle
#[derive(Debug)]
pub struct ManagedHandle {
    launch: EngineLaunch,
    output_path: Option<StoragePath>,
    inner: Box<dyn EngineHandle>,
    state: HandleState,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl ManagedHandle {
    /// Construct a handle through the execution context
    pub fn construct(context: &dyn ExecutionContext, launch: EngineLaunch) -> Result<Self> {
        let output_path = launch.output_path()?;
        let inner = context.create_engine(&launch)?;
        debug!(run_id = %launch.run_id, master = %launch.settings.master, "Engine constructed");
        Ok(Self {
            launch,
            output_path,
            inner,
            state: HandleState::Constructed,
            started_at: None,
            finished_at: None,
        })
    }

    /// Construct, run and finalize a handle.
    ///
    /// The handle is returned only after finalization, so callers never see
    /// a partially-run engine. A failed run is still finalized before its
    /// error is returned.
    pub fn launch(context: &dyn ExecutionContext, launch: EngineLaunch) -> Result<Self> {
        let mut handle = Self::construct(context, launch)?;
        if let Err(err) = handle.run() {
            handle.release_failed_run(&err);
            return Err(err);
        }
        handle.finalize()?;
        Ok(handle)
    }

    fn release_failed_run(&mut self, err: &Error) {
        if self.state != HandleState::Running {
            return;
        }
        warn!(run_id = %self.launch.run_id, error = %err, "Engine run failed");
        match self.inner.finalize() {
            Ok(()) => self.finished_at = Some(Utc::now()),
            Err(finalize_err) => warn!(
                run_id = %self.launch.run_id,
                error = %finalize_err,
                "Failed to finalize engine after failed run"
            ),
        }
    }

    fn transition(&mut self, from: HandleState, to: HandleState) -> Result<()> {
        if self.state != from {
            return Err(Error::InvalidState {
                from: self.state.as_str(),
                to: to.as_str(),
            });
        }
        self.state = to;
        Ok(())
    }

    /// Run the engine to completion
    pub fn run(&mut self) -> Result<()> {
        self.transition(HandleState::Constructed, HandleState::Running)?;
        self.started_at = Some(Utc::now());

        let strategies = self.launch.activation.strategies();
        info!(
            run_id = %self.launch.run_id,
            computation = %strategies.computation.id(),
            embedding_kind = ?strategies.computation.embedding_kind(),
            max_supersteps = ?strategies.master_computation.max_supersteps(),
            output = self.output_path.is_some(),
            "Engine run started"
        );
        let start = Instant::now();
        self.inner.run()?;
        info!(
            run_id = %self.launch.run_id,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Engine run completed"
        );
        Ok(())
    }

    /// Finalize a completed run
    pub fn finalize(&mut self) -> Result<()> {
        self.transition(HandleState::Running, HandleState::Finalized)?;
        self.inner.finalize()?;
        self.finished_at = Some(Utc::now());
        debug!(run_id = %self.launch.run_id, "Engine finalized");
        Ok(())
    }

    fn ensure_finalized(&self) -> Result<()> {
        if self.state != HandleState::Finalized {
            return Err(Error::InvalidState {
                from: self.state.as_str(),
                to: "read",
            });
        }
        Ok(())
    }

    pub fn output_descriptors(&self) -> Result<OutputDescriptorSet> {
        self.ensure_finalized()?;
        self.inner.output_descriptors()
    }

    pub fn embeddings(&self) -> Result<EmbeddingSet> {
        self.ensure_finalized()?;
        if self.output_path.is_none() {
            return Err(Error::engine(format!(
                "run {} was not built to produce embeddings",
                self.launch.run_id
            )));
        }
        self.inner.embeddings()
    }

    pub fn run_id(&self) -> Uuid {
        self.launch.run_id
    }

    pub fn state(&self) -> HandleState {
        self.state
    }

    pub fn settings(&self) -> &NativeSettings {
        &self.launch.settings
    }

    pub fn activation(&self) -> &Arc<ActiveConfiguration> {
        &self.launch.activation
    }

    /// Whether the run was built to produce final embeddings
    pub fn produces_output(&self) -> bool {
        self.output_path.is_some()
    }

    /// Path the engine wrote its embeddings to during the run.
    ///
    /// Fixed at construction; relocations done afterwards are tracked by
    /// [`ResultCache::output_location`](crate::ResultCache::output_location).
    pub fn output_path(&self) -> Option<&StoragePath> {
        self.output_path.as_ref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Run summary for logs and diagnostics
    pub fn summary(&self) -> serde_json::Value {
        let strategies = self.launch.activation.strategies();
        let settings: BTreeMap<_, _> = self.launch.settings.to_pairs().into_iter().collect();
        json!({
            "run_id": self.launch.run_id.to_string(),
            "state": self.state.as_str(),
            "settings": settings,
            "embedding_kind": strategies.computation.embedding_kind(),
            "max_supersteps": strategies.master_computation.max_supersteps(),
            "written_to": self.output_path.as_ref().map(|p| p.to_string()),
            "started_at": self.started_at.map(|t| t.to_rfc3339()),
            "finished_at": self.finished_at.map(|t| t.to_rfc3339()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motif_core::{keys, ConfigRegistry, Configuration, StepComputation, StrategyRegistry};
    use motif_storage::LocalStorage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Cliques;

    impl StepComputation for Cliques {
        fn id(&self) -> &str {
            "cliques"
        }
    }

    #[derive(Debug, Default)]
    struct NullEngine;

    impl EngineHandle for NullEngine {
        fn run(&mut self) -> Result<()> {
            Ok(())
        }

        fn finalize(&mut self) -> Result<()> {
            Ok(())
        }

        fn output_descriptors(&self) -> Result<OutputDescriptorSet> {
            Ok(OutputDescriptorSet::new(Uuid::nil(), vec![]))
        }

        fn embeddings(&self) -> Result<EmbeddingSet> {
            Ok(EmbeddingSet::new(Uuid::nil(), vec![]))
        }
    }

    #[derive(Debug)]
    struct NullContext;

    impl ExecutionContext for NullContext {
        fn create_engine(&self, _launch: &EngineLaunch) -> Result<Box<dyn EngineHandle>> {
            Ok(Box::new(NullEngine))
        }

        fn storage(&self) -> Arc<dyn Storage> {
            Arc::new(LocalStorage)
        }
    }

    fn launch(output_active: bool) -> EngineLaunch {
        let strategies = StrategyRegistry::with_defaults();
        strategies.register_computation("cliques", || Arc::new(Cliques));
        let registry = ConfigRegistry::new(strategies);

        let mut config = Configuration::from_pairs([(keys::COMPUTATION_CLASS, "cliques")]);
        config.set(keys::OUTPUT_ACTIVE, output_active);
        let activation = registry.initialize(&mut config).unwrap();
        let settings = activation.configuration().translate_to_engine_native().unwrap();
        EngineLaunch::new(activation, settings)
    }

    #[test]
    fn test_launch_finalizes() {
        let handle = ManagedHandle::launch(&NullContext, launch(true)).unwrap();

        assert_eq!(handle.state(), HandleState::Finalized);
        assert!(handle.produces_output());
        assert_eq!(handle.output_path().map(|p| p.as_str()), Some(keys::DEFAULT_OUTPUT_PATH));
        assert!(handle.started_at().unwrap() <= handle.finished_at().unwrap());
    }

    #[test]
    fn test_finalized_handle_cannot_rerun() {
        let mut handle = ManagedHandle::launch(&NullContext, launch(true)).unwrap();

        let err = handle.run().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidState { from: "finalized", to: "running" }
        ));
    }

    #[test]
    fn test_reads_require_finalization() {
        let mut handle = ManagedHandle::construct(&NullContext, launch(true)).unwrap();
        assert!(handle.output_descriptors().is_err());
        assert!(matches!(
            handle.finalize(),
            Err(Error::InvalidState { from: "constructed", .. })
        ));

        handle.run().unwrap();
        handle.finalize().unwrap();
        assert!(handle.output_descriptors().is_ok());
    }

    #[test]
    fn test_non_output_run_has_no_embeddings() {
        let handle = ManagedHandle::launch(&NullContext, launch(false)).unwrap();

        assert!(!handle.produces_output());
        assert!(matches!(handle.embeddings(), Err(Error::Engine(_))));
    }

    #[test]
    fn test_summary() {
        let handle = ManagedHandle::launch(&NullContext, launch(true)).unwrap();
        let summary = handle.summary();

        assert_eq!(summary["state"], "finalized");
        assert_eq!(summary["settings"]["master"], keys::DEFAULT_MASTER_ENDPOINT);
        assert_eq!(summary["embedding_kind"], "vertex_induced");
        assert!(summary["max_supersteps"].is_null());
        assert_eq!(summary["written_to"], keys::DEFAULT_OUTPUT_PATH);
    }

    #[derive(Debug)]
    struct CrashingEngine {
        finalized: Arc<AtomicUsize>,
    }

    impl EngineHandle for CrashingEngine {
        fn run(&mut self) -> Result<()> {
            Err(Error::engine("executor lost"))
        }

        fn finalize(&mut self) -> Result<()> {
            self.finalized.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn output_descriptors(&self) -> Result<OutputDescriptorSet> {
            Err(Error::engine("no run"))
        }

        fn embeddings(&self) -> Result<EmbeddingSet> {
            Err(Error::engine("no run"))
        }
    }

    #[derive(Debug, Default)]
    struct CrashingContext {
        finalized: Arc<AtomicUsize>,
    }

    impl ExecutionContext for CrashingContext {
        fn create_engine(&self, _launch: &EngineLaunch) -> Result<Box<dyn EngineHandle>> {
            Ok(Box::new(CrashingEngine {
                finalized: Arc::clone(&self.finalized),
            }))
        }

        fn storage(&self) -> Arc<dyn Storage> {
            Arc::new(LocalStorage)
        }
    }

    #[test]
    fn test_failed_run_is_finalized() {
        let context = CrashingContext::default();

        let err = ManagedHandle::launch(&context, launch(true)).unwrap_err();

        assert!(matches!(err, Error::Engine(ref msg) if msg == "executor lost"));
        assert_eq!(context.finalized.load(Ordering::SeqCst), 1);
    }
}
