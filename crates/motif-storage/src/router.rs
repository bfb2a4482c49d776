//! Scheme-based dispatch between local and distributed backends.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use motif_core::{Error, Result};
use tracing::debug;

use crate::{LocalStorage, Scheme, Storage, StoragePath};

/// Routes each path to the backend registered for its scheme
#[derive(Clone, Default)]
pub struct StorageRouter {
    local: LocalStorage,
    distributed: HashMap<String, Arc<dyn Storage>>,
}

impl fmt::Debug for StorageRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut schemes: Vec<_> = self.distributed.keys().collect();
        schemes.sort();
        f.debug_struct("StorageRouter")
            .field("distributed", &schemes)
            .finish()
    }
}

impl StorageRouter {
    /// Router that only serves local paths
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend for a distributed scheme (`hdfs`, `s3a`, ...)
    pub fn with_backend(mut self, scheme: impl Into<String>, backend: Arc<dyn Storage>) -> Self {
        let scheme = scheme.into().to_ascii_lowercase();
        debug!(scheme = %scheme, "Registered storage backend");
        self.distributed.insert(scheme, backend);
        self
    }

    fn backend(&self, path: &StoragePath) -> Result<&dyn Storage> {
        match path.scheme() {
            Scheme::Local => Ok(&self.local),
            Scheme::Distributed(scheme) => self
                .distributed
                .get(scheme)
                .map(|b| b.as_ref())
                .ok_or_else(|| Error::UnsupportedScheme(scheme.clone())),
        }
    }
}

impl Storage for StorageRouter {
    fn write(&self, path: &StoragePath, contents: &[u8]) -> Result<()> {
        self.backend(path)?.write(path, contents)
    }

    fn read(&self, path: &StoragePath) -> Result<Vec<u8>> {
        self.backend(path)?.read(path)
    }

    fn rename(&self, from: &StoragePath, to: &StoragePath) -> Result<()> {
        if from.scheme() != to.scheme() {
            return Err(Error::UnsupportedScheme(format!(
                "cannot relocate {from} to {to} across filesystems"
            )));
        }
        self.backend(from)?.rename(from, to)
    }

    fn exists(&self, path: &StoragePath) -> Result<bool> {
        self.backend(path)?.exists(path)
    }

    fn delete(&self, path: &StoragePath) -> Result<()> {
        self.backend(path)?.delete(path)
    }
}
