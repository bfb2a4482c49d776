//! Test doubles: an engine that replays fixed embeddings and a storage
//! backend that counts operations.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use motif_core::{
    keys, ConfigRegistry, Configuration, Embedding, EmbeddingSet, OutputDescriptor,
    OutputDescriptorSet, Result, StepComputation, StrategyRegistry,
};
use motif_storage::{write_structured, LocalStorage, Storage, StoragePath};

use crate::engine::{EngineHandle, EngineLaunch, ExecutionContext};
use crate::session::Session;
use crate::ResultCache;

#[derive(Debug)]
pub(crate) struct Motifs;

impl StepComputation for Motifs {
    fn id(&self) -> &str {
        "motifs"
    }
}

/// Local storage that counts writes and renames
#[derive(Debug, Default)]
pub(crate) struct RecordingStorage {
    inner: LocalStorage,
    pub(crate) writes: AtomicUsize,
    pub(crate) renames: AtomicUsize,
}

impl Storage for RecordingStorage {
    fn write(&self, path: &StoragePath, contents: &[u8]) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write(path, contents)
    }

    fn read(&self, path: &StoragePath) -> Result<Vec<u8>> {
        self.inner.read(path)
    }

    fn rename(&self, from: &StoragePath, to: &StoragePath) -> Result<()> {
        self.renames.fetch_add(1, Ordering::SeqCst);
        self.inner.rename(from, to)
    }

    fn exists(&self, path: &StoragePath) -> Result<bool> {
        self.inner.exists(path)
    }

    fn delete(&self, path: &StoragePath) -> Result<()> {
        self.inner.delete(path)
    }
}

/// Engine that writes its embeddings to the output path while running
#[derive(Debug)]
struct ReplayEngine {
    launch: EngineLaunch,
    storage: Arc<RecordingStorage>,
    embeddings: Vec<Embedding>,
}

impl EngineHandle for ReplayEngine {
    fn run(&mut self) -> Result<()> {
        if let Some(path) = self.launch.output_path()? {
            write_structured(self.storage.as_ref(), &path, &self.embeddings)?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }

    fn output_descriptors(&self) -> Result<OutputDescriptorSet> {
        let descriptors = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(partition, embedding)| OutputDescriptor {
                superstep: embedding.len() as u32,
                partition: partition as u32,
                candidate_count: 1,
                encoded: embedding.to_output_line().into_bytes(),
            })
            .collect();
        Ok(OutputDescriptorSet::new(self.launch.run_id, descriptors))
    }

    fn embeddings(&self) -> Result<EmbeddingSet> {
        Ok(EmbeddingSet::new(self.launch.run_id, self.embeddings.clone()))
    }
}

/// Execution context that counts engine runs
#[derive(Debug)]
pub(crate) struct RecordingContext {
    pub(crate) storage: Arc<RecordingStorage>,
    pub(crate) runs: AtomicUsize,
    embeddings: Vec<Embedding>,
}

impl RecordingContext {
    pub(crate) fn new() -> Self {
        Self {
            storage: Arc::new(RecordingStorage::default()),
            runs: AtomicUsize::new(0),
            embeddings: vec![
                Embedding::vertex_induced(vec![0, 1]),
                Embedding::vertex_induced(vec![0, 1, 2]),
                Embedding::edge_induced(vec![3]),
            ],
        }
    }

    pub(crate) fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub(crate) fn renames(&self) -> usize {
        self.storage.renames.load(Ordering::SeqCst)
    }
}

impl ExecutionContext for RecordingContext {
    fn create_engine(&self, launch: &EngineLaunch) -> Result<Box<dyn EngineHandle>> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ReplayEngine {
            launch: launch.clone(),
            storage: Arc::clone(&self.storage),
            embeddings: self.embeddings.clone(),
        }))
    }

    fn storage(&self) -> Arc<dyn Storage> {
        self.storage.clone()
    }
}

/// Cache over a recording context, with output written under `dir`
pub(crate) fn recording_cache(
    dir: &Path,
    output_active: bool,
) -> (Arc<RecordingContext>, ResultCache) {
    let strategies = StrategyRegistry::with_defaults();
    strategies.register_computation("motifs", || Arc::new(Motifs));

    let context = Arc::new(RecordingContext::new());
    let session = Arc::new(Session::new(
        Arc::clone(&context) as Arc<dyn ExecutionContext>,
        Arc::new(ConfigRegistry::new(strategies)),
    ));

    let mut config = Configuration::from_pairs([(keys::COMPUTATION_CLASS, "motifs")]);
    config.set(keys::OUTPUT_ACTIVE, output_active);
    config.set(keys::OUTPUT_PATH, dir.join("Output").display().to_string());

    (context, ResultCache::new(session, config))
}
