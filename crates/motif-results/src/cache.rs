//! Lazily computed, cached results of a mining job.
//!
//! A [`ResultCache`] owns the job's configuration and up to three cached
//! artifacts:
//!
//! - the finalized engine handle
//! - the per-superstep output descriptors
//! - the final embeddings
//!
//! Each artifact is computed on first request and reused afterwards. The
//! embeddings need a run built with output enabled; asking for them from a
//! cache configured without output switches output on and drops every cached
//! artifact, so the next request starts a fresh run.

use std::collections::BTreeMap;
use std::sync::Arc;

use motif_core::{
    keys, ConfigValue, Configuration, EmbeddingSet, Error, NativeSettings, OutputDescriptorSet,
    Result,
};
use motif_storage::StoragePath;
use tracing::{debug, info, trace, warn};

use crate::engine::{EngineLaunch, ManagedHandle};
use crate::session::Session;

/// Output-mode corrections allowed per embeddings request
const MAX_OUTPUT_CORRECTIONS: usize = 1;

/// Result cache for one configured mining job
#[derive(Debug)]
pub struct ResultCache {
    session: Arc<Session>,
    pub(crate) config: Configuration,
    engine: Option<Arc<ManagedHandle>>,
    descriptors: Option<Arc<OutputDescriptorSet>>,
    pub(crate) embeddings: Option<Arc<EmbeddingSet>>,
    /// Where the cached engine's embeddings currently live
    pub(crate) engine_output: Option<StoragePath>,
}

impl ResultCache {
    /// Create a cache for `config`. Legacy key aliases are resolved here.
    pub fn new(session: Arc<Session>, mut config: Configuration) -> Self {
        config.resolve_aliases();
        Self {
            session,
            config,
            engine: None,
            descriptors: None,
            embeddings: None,
            engine_output: None,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Engine-native settings the next run would launch with
    pub fn native_settings(&self) -> Result<NativeSettings> {
        self.config.translate_to_engine_native()
    }

    /// Finalized engine handle, running the engine on first use.
    ///
    /// Initializes the configuration against the session registry, derives
    /// native settings, then constructs, runs and finalizes a handle. A
    /// failure at any step leaves nothing cached.
    pub fn engine_handle(&mut self) -> Result<Arc<ManagedHandle>> {
        if let Some(handle) = &self.engine {
            trace!(run_id = %handle.run_id(), "Engine handle cache hit");
            return Ok(Arc::clone(handle));
        }

        let activation = self.session.registry().initialize(&mut self.config)?;
        let settings = activation.configuration().translate_to_engine_native()?;
        let launch = EngineLaunch::new(activation, settings);

        let handle = Arc::new(ManagedHandle::launch(
            self.session.context().as_ref(),
            launch,
        )?);

        info!(
            run_id = %handle.run_id(),
            master = %handle.settings().master,
            output = handle.produces_output(),
            "Engine handle cached"
        );

        self.engine_output = handle.output_path().cloned();
        self.engine = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Output descriptors of the cached run
    pub fn output_descriptors(&mut self) -> Result<Arc<OutputDescriptorSet>> {
        if let Some(descriptors) = &self.descriptors {
            trace!("Output descriptors cache hit");
            return Ok(Arc::clone(descriptors));
        }

        let handle = self.engine_handle()?;
        let descriptors = Arc::new(handle.output_descriptors()?);
        debug!(
            run_id = %handle.run_id(),
            descriptors = descriptors.len(),
            supersteps = descriptors.num_supersteps(),
            "Output descriptors cached"
        );
        self.descriptors = Some(Arc::clone(&descriptors));
        Ok(descriptors)
    }

    /// Final embeddings of the cached run.
    ///
    /// If output is disabled, or the cached handle was built without it,
    /// output is switched on and every cached artifact is dropped before the
    /// embeddings are computed from a fresh run.
    pub fn embeddings(&mut self) -> Result<Arc<EmbeddingSet>> {
        for correction in 0..=MAX_OUTPUT_CORRECTIONS {
            if self.needs_output_correction()? {
                if correction == MAX_OUTPUT_CORRECTIONS {
                    break;
                }
                warn!(
                    key = keys::OUTPUT_ACTIVE,
                    "Output disabled for embeddings, enabling it and dropping cached results"
                );
                self.config.set(keys::OUTPUT_ACTIVE, true);
                self.invalidate_all();
                continue;
            }

            if let Some(embeddings) = &self.embeddings {
                trace!("Embeddings cache hit");
                return Ok(Arc::clone(embeddings));
            }

            let handle = self.engine_handle()?;
            let embeddings = Arc::new(handle.embeddings()?);
            debug!(
                run_id = %handle.run_id(),
                embeddings = embeddings.len(),
                location = ?self.engine_output.as_ref().map(StoragePath::as_str),
                "Embeddings cached"
            );
            self.embeddings = Some(Arc::clone(&embeddings));
            return Ok(embeddings);
        }

        Err(Error::engine("output could not be enabled for the embeddings run"))
    }

    /// Number of embeddings per canonical pattern code.
    ///
    /// Codes come from the configured pattern representation and are
    /// computed against the run's input graph, which must be configured.
    pub fn pattern_counts(&mut self) -> Result<BTreeMap<String, u64>> {
        let embeddings = self.embeddings()?;
        let handle = self.engine_handle()?;
        let activation = handle.activation();
        let graph = activation
            .graph()
            .ok_or_else(|| Error::MissingKey(keys::GRAPH_PATH.to_string()))?;
        let pattern = &activation.strategies().pattern;

        let mut counts = BTreeMap::new();
        for embedding in embeddings.iter() {
            *counts.entry(pattern.canonical_code(graph, embedding)).or_insert(0) += 1;
        }
        debug!(
            run_id = %handle.run_id(),
            pattern = pattern.id(),
            patterns = counts.len(),
            "Counted embeddings per pattern"
        );
        Ok(counts)
    }

    fn needs_output_correction(&self) -> Result<bool> {
        if !self.config.is_output_active()? {
            return Ok(true);
        }
        Ok(self
            .engine
            .as_ref()
            .is_some_and(|handle| !handle.produces_output()))
    }

    /// Independent cache over a copy of this configuration with one key
    /// replaced. Nothing cached here is carried over.
    pub fn with_override(&self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        let mut config = self.config.clone();
        config.set(key, value);
        Self::new(Arc::clone(&self.session), config)
    }

    /// Drop every cached artifact
    pub fn invalidate_all(&mut self) {
        if self.engine.is_some() || self.descriptors.is_some() || self.embeddings.is_some() {
            debug!("Invalidating cached results");
        }
        self.engine = None;
        self.descriptors = None;
        self.embeddings = None;
        self.engine_output = None;
    }

    pub fn is_engine_cached(&self) -> bool {
        self.engine.is_some()
    }

    pub fn are_descriptors_cached(&self) -> bool {
        self.descriptors.is_some()
    }

    pub fn are_embeddings_cached(&self) -> bool {
        self.embeddings.is_some()
    }

    /// Storage location of the cached embeddings
    pub fn output_location(&self) -> Option<&StoragePath> {
        self.embeddings.as_ref().and(self.engine_output.as_ref())
    }
}
