//! Configuration store.
//!
//! Holds generic key/value settings for a mining job, resolves legacy key
//! names, derives the engine-native launch settings and tracks which
//! configuration is currently active.
//!
//! ## Loading
//!
//! Settings can be built programmatically, parsed from a JSON object, or
//! overridden from environment variables:
//!
//! ```text
//! MOTIF_ENGINE__NUM_WORKERS=4   ->  engine.num_workers = 4
//! MOTIF_MOTIF__OUTPUT__ACTIVE=false  ->  motif.output.active = false
//! ```

pub mod alias;
pub mod keys;
pub mod native;
pub mod registry;
pub mod value;

pub use alias::{canonical_key, ALIASES};
pub use native::{ClusterMode, NativeSettings, ResourceDirectives};
pub use registry::{ActiveConfiguration, ConfigRegistry};
pub use value::{ConfigValue, FromConfigValue, StrategyRef};

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Default prefix for environment overrides
pub const ENV_PREFIX: &str = "MOTIF_";

/// Key/value settings for one mining job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration {
    entries: BTreeMap<String, ConfigValue>,
}

impl Configuration {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from key/value pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<ConfigValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse a JSON object of settings
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(Error::config("configuration document must be a JSON object"));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Load settings from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        debug!(path = %path.display(), entries = config.len(), "Loaded configuration file");
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self, prefix: &str) -> usize {
        self.apply_overrides(std::env::vars(), prefix)
    }

    /// Apply overrides from `(NAME, value)` pairs.
    ///
    /// Names carrying `prefix` are lowercased with `__` mapped to `.`; values
    /// are parsed to the narrowest scalar type. Returns the number applied.
    pub fn apply_overrides<I>(&mut self, vars: I, prefix: &str) -> usize
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut applied = 0;
        for (name, raw) in vars {
            let Some(stripped) = name.strip_prefix(prefix) else {
                continue;
            };
            if stripped.is_empty() {
                continue;
            }
            let key = stripped.to_lowercase().replace("__", ".");
            debug!(key = %key, "Applying configuration override");
            self.set(key, ConfigValue::parse_scalar(&raw));
            applied += 1;
        }
        applied
    }

    /// Get a value cast to `T`, or `default` if the key is absent.
    ///
    /// Fails with [`Error::TypeMismatch`] if the stored value has another type.
    pub fn get<T: FromConfigValue>(&self, key: &str, default: T) -> Result<T> {
        Ok(self.get_optional(key)?.unwrap_or(default))
    }

    /// Get a value cast to `T`, or `None` if the key is absent
    pub fn get_optional<T: FromConfigValue>(&self, key: &str) -> Result<Option<T>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(value) => T::from_config_value(value)
                .map(Some)
                .ok_or_else(|| Error::TypeMismatch {
                    key: key.to_string(),
                    expected: T::EXPECTED,
                    found: value.type_name(),
                }),
        }
    }

    /// Strategy identifier stored under `key` (reference or plain string)
    pub fn get_strategy_id(&self, key: &str) -> Result<Option<String>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_strategy_id()
                .map(|id| Some(id.to_string()))
                .ok_or_else(|| Error::TypeMismatch {
                    key: key.to_string(),
                    expected: "strategy",
                    found: value.type_name(),
                }),
        }
    }

    /// Raw stored value
    pub fn get_raw(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    /// Set a value, returning the previous one
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Option<ConfigValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Set a value only if the key is absent. Returns whether it was set.
    pub fn set_if_unset(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> bool {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, value.into());
        true
    }

    /// Remove a key
    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.entries.remove(key)
    }

    /// Whether the key is present
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Stored keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn master_endpoint(&self) -> Result<String> {
        self.get(keys::MASTER_ENDPOINT, keys::DEFAULT_MASTER_ENDPOINT.to_string())
    }

    pub fn app_name(&self) -> Result<String> {
        self.get(keys::APP_NAME, keys::DEFAULT_APP_NAME.to_string())
    }

    pub fn worker_memory(&self) -> Result<String> {
        self.get(keys::WORKER_MEMORY, keys::DEFAULT_WORKER_MEMORY.to_string())
    }

    pub fn num_workers(&self) -> Result<u32> {
        self.get(keys::NUM_WORKERS, keys::DEFAULT_NUM_WORKERS)
    }

    pub fn num_compute_threads(&self) -> Result<u32> {
        self.get(keys::NUM_COMPUTE_THREADS, keys::DEFAULT_NUM_COMPUTE_THREADS)
    }

    pub fn graph_path(&self) -> Result<Option<String>> {
        self.get_optional(keys::GRAPH_PATH)
    }

    pub fn is_graph_local(&self) -> Result<bool> {
        self.get(keys::GRAPH_LOCAL, keys::DEFAULT_GRAPH_LOCAL)
    }

    pub fn is_output_active(&self) -> Result<bool> {
        self.get(keys::OUTPUT_ACTIVE, keys::DEFAULT_OUTPUT_ACTIVE)
    }

    pub fn output_path(&self) -> Result<String> {
        self.get(keys::OUTPUT_PATH, keys::DEFAULT_OUTPUT_PATH.to_string())
    }
}
