//! Translation of generic settings into engine-native launch settings.
//!
//! Resource directives depend on how the master endpoint is deployed:
//!
//! | Endpoint | Directives |
//! |---|---|
//! | `yarn`, `yarn-client`, `yarn-cluster` | `executor.instances`, `executor.cores` |
//! | `spark://host:port` | `cores.max` |
//! | anything else (`local[*]`, ...) | none |
//!
//! Instances are the worker count, cores the compute threads per worker and
//! `cores.max` their product.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Configuration;
use crate::Result;

pub const NATIVE_APP_NAME: &str = "app.name";
pub const NATIVE_MASTER: &str = "master";
pub const NATIVE_EXECUTOR_MEMORY: &str = "executor.memory";
pub const NATIVE_EXECUTOR_INSTANCES: &str = "executor.instances";
pub const NATIVE_EXECUTOR_CORES: &str = "executor.cores";
pub const NATIVE_CORES_MAX: &str = "cores.max";

/// Endpoints served by a managed cluster resource manager
const MANAGED_ENDPOINTS: &[&str] = &["yarn", "yarn-client", "yarn-cluster"];

/// URL scheme of standalone cluster masters
const STANDALONE_SCHEME: &str = "spark://";

/// Deployment mode derived from the master endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterMode {
    /// Resource-managed cluster: executors requested per worker
    Managed,
    /// Standalone cluster: total core cap
    Standalone,
    /// Local execution or unrecognized endpoint
    Other,
}

impl ClusterMode {
    /// Classify a master endpoint
    pub fn from_endpoint(endpoint: &str) -> Self {
        if MANAGED_ENDPOINTS.contains(&endpoint) {
            ClusterMode::Managed
        } else if endpoint.starts_with(STANDALONE_SCHEME) {
            ClusterMode::Standalone
        } else {
            ClusterMode::Other
        }
    }
}

/// Resource directives for the chosen cluster mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ResourceDirectives {
    Managed { executor_instances: u32, executor_cores: u32 },
    Standalone { cores_max: u64 },
    None,
}

/// Settings handed to the engine at launch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeSettings {
    pub app_name: String,
    pub master: String,
    pub executor_memory: String,
    pub resources: ResourceDirectives,
}

impl NativeSettings {
    /// Derive native settings from a configuration
    pub fn from_configuration(config: &Configuration) -> Result<Self> {
        let master = config.master_endpoint()?;
        let mode = ClusterMode::from_endpoint(&master);

        let resources = match mode {
            ClusterMode::Managed => ResourceDirectives::Managed {
                executor_instances: config.num_workers()?,
                executor_cores: config.num_compute_threads()?,
            },
            ClusterMode::Standalone => ResourceDirectives::Standalone {
                cores_max: u64::from(config.num_workers()?)
                    * u64::from(config.num_compute_threads()?),
            },
            ClusterMode::Other => ResourceDirectives::None,
        };

        let settings = Self {
            app_name: config.app_name()?,
            master,
            executor_memory: config.worker_memory()?,
            resources,
        };
        debug!(master = %settings.master, mode = ?mode, "Translated engine settings");
        Ok(settings)
    }

    /// Cluster mode the settings were derived for
    pub fn cluster_mode(&self) -> ClusterMode {
        ClusterMode::from_endpoint(&self.master)
    }

    /// Native key/value pairs in emission order
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            (NATIVE_APP_NAME, self.app_name.clone()),
            (NATIVE_MASTER, self.master.clone()),
            (NATIVE_EXECUTOR_MEMORY, self.executor_memory.clone()),
        ];
        match self.resources {
            ResourceDirectives::Managed {
                executor_instances,
                executor_cores,
            } => {
                pairs.push((NATIVE_EXECUTOR_INSTANCES, executor_instances.to_string()));
                pairs.push((NATIVE_EXECUTOR_CORES, executor_cores.to_string()));
            }
            ResourceDirectives::Standalone { cores_max } => {
                pairs.push((NATIVE_CORES_MAX, cores_max.to_string()));
            }
            ResourceDirectives::None => {}
        }
        pairs
    }

    /// Look up one native setting
    pub fn get(&self, key: &str) -> Option<String> {
        self.to_pairs()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }
}

impl Configuration {
    /// Derive the engine-native launch settings
    pub fn translate_to_engine_native(&self) -> Result<NativeSettings> {
        NativeSettings::from_configuration(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::keys;

    fn cluster_config(master: &str) -> Configuration {
        let mut config = Configuration::new();
        config.set(keys::MASTER_ENDPOINT, master);
        config.set(keys::NUM_WORKERS, 4i64);
        config.set(keys::NUM_COMPUTE_THREADS, 2i64);
        config
    }

    #[test]
    fn test_managed_cluster_directives() {
        let settings = cluster_config("yarn").translate_to_engine_native().unwrap();

        assert_eq!(settings.cluster_mode(), ClusterMode::Managed);
        assert_eq!(settings.get(NATIVE_EXECUTOR_INSTANCES).as_deref(), Some("4"));
        assert_eq!(settings.get(NATIVE_EXECUTOR_CORES).as_deref(), Some("2"));
        assert_eq!(settings.get(NATIVE_CORES_MAX), None);
    }

    #[test]
    fn test_standalone_cluster_directives() {
        let settings = cluster_config("spark://master:7077")
            .translate_to_engine_native()
            .unwrap();

        assert_eq!(settings.cluster_mode(), ClusterMode::Standalone);
        assert_eq!(settings.get(NATIVE_CORES_MAX).as_deref(), Some("8"));
        assert_eq!(settings.get(NATIVE_EXECUTOR_INSTANCES), None);
    }

    #[test]
    fn test_local_has_no_resource_directives() {
        let settings = cluster_config("local[*]").translate_to_engine_native().unwrap();

        assert_eq!(settings.resources, ResourceDirectives::None);
        let keys: Vec<_> = settings.to_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![NATIVE_APP_NAME, NATIVE_MASTER, NATIVE_EXECUTOR_MEMORY]);
    }

    #[test]
    fn test_defaults_always_emitted() {
        let settings = Configuration::new().translate_to_engine_native().unwrap();

        assert_eq!(settings.app_name, keys::DEFAULT_APP_NAME);
        assert_eq!(settings.master, keys::DEFAULT_MASTER_ENDPOINT);
        assert_eq!(settings.executor_memory, "1g");
    }

    #[test]
    fn test_cluster_mode_matching() {
        assert_eq!(ClusterMode::from_endpoint("yarn-cluster"), ClusterMode::Managed);
        assert_eq!(ClusterMode::from_endpoint("YARN"), ClusterMode::Other);
        assert_eq!(ClusterMode::from_endpoint("spark://10.0.0.1:7077"), ClusterMode::Standalone);
        assert_eq!(ClusterMode::from_endpoint("mesos://zk:2181"), ClusterMode::Other);
    }
}
