//! Active-configuration registry.
//!
//! Exactly one configuration is active per registry. Initialization runs
//! under a mutex and is idempotent: a caller whose resolved configuration
//! equals the active one gets the active instance back without any
//! strategy instantiation or graph loading.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info};
use uuid::Uuid;

use super::Configuration;
use crate::graph::MainGraph;
use crate::strategy::{Strategies, StrategyRegistry};
use crate::{Error, Result};

/// An initialized configuration: aliases resolved, strategies instantiated,
/// input graph loaded
#[derive(Debug)]
pub struct ActiveConfiguration {
    id: Uuid,
    config: Configuration,
    strategies: Strategies,
    graph: Option<Arc<MainGraph>>,
}

impl ActiveConfiguration {
    /// Identifier of this activation
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    pub fn strategies(&self) -> &Strategies {
        &self.strategies
    }

    /// Input graph, if the configuration names one
    pub fn graph(&self) -> Option<&Arc<MainGraph>> {
        self.graph.as_ref()
    }

    /// Path and locality the graph was loaded from
    fn graph_source(&self) -> Result<Option<(String, bool)>> {
        graph_source(&self.config)
    }
}

fn graph_source(config: &Configuration) -> Result<Option<(String, bool)>> {
    match config.graph_path()? {
        Some(path) => Ok(Some((path, config.is_graph_local()?))),
        None => Ok(None),
    }
}

/// Registry tracking the active configuration
#[derive(Debug)]
pub struct ConfigRegistry {
    strategies: StrategyRegistry,
    active: Mutex<Option<Arc<ActiveConfiguration>>>,
    initialized: AtomicBool,
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::new(StrategyRegistry::with_defaults())
    }
}

impl ConfigRegistry {
    pub fn new(strategies: StrategyRegistry) -> Self {
        Self {
            strategies,
            active: Mutex::new(None),
            initialized: AtomicBool::new(false),
        }
    }

    /// Strategy factories used during initialization
    pub fn strategies(&self) -> &StrategyRegistry {
        &self.strategies
    }

    /// Whether any configuration has been activated
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Currently active configuration
    pub fn active(&self) -> Result<Option<Arc<ActiveConfiguration>>> {
        let guard = self
            .active
            .lock()
            .map_err(|_| Error::LockPoisoned("config registry"))?;
        Ok(guard.clone())
    }

    /// Initialize `config` and make it the active configuration.
    ///
    /// Aliases are resolved in place. If the active configuration equals the
    /// resolved one it is returned unchanged. Otherwise strategies are
    /// instantiated, the input graph is loaded (or taken over from the
    /// previous activation when path and locality match) and the result is
    /// registered. Concurrent callers serialize on the registry lock.
    ///
    /// # Errors
    /// Unknown strategy identifiers, a missing step computation, type
    /// mismatches and graph loading failures abort initialization; the
    /// previously active configuration stays in place.
    pub fn initialize(&self, config: &mut Configuration) -> Result<Arc<ActiveConfiguration>> {
        config.resolve_aliases();

        let mut active = self
            .active
            .lock()
            .map_err(|_| Error::LockPoisoned("config registry"))?;

        if let Some(current) = active.as_ref() {
            if current.config == *config {
                debug!(activation = %current.id, "Reusing active configuration");
                return Ok(Arc::clone(current));
            }
        }

        let strategies = self.strategies.resolve(config)?;

        let source = graph_source(config)?;
        let previous_graph = match active.as_ref() {
            Some(current) if current.graph_source()? == source => current.graph.clone(),
            _ => None,
        };
        let graph = match (previous_graph, &source) {
            (Some(graph), _) => {
                debug!("Input graph already loaded, reusing it");
                Some(graph)
            }
            (None, Some((path, local))) => {
                Some(Arc::new(strategies.graph_loader.load(path, *local)?))
            }
            (None, None) => None,
        };

        let activation = Arc::new(ActiveConfiguration {
            id: Uuid::new_v4(),
            config: config.clone(),
            strategies,
            graph,
        });

        info!(
            activation = %activation.id,
            computation = %activation.strategies.computation.id(),
            entries = activation.config.len(),
            "Configuration initialized"
        );

        *active = Some(Arc::clone(&activation));
        self.initialized.store(true, Ordering::Release);
        Ok(activation)
    }

    /// Drop the active configuration
    pub fn reset(&self) -> Result<()> {
        let mut active = self
            .active
            .lock()
            .map_err(|_| Error::LockPoisoned("config registry"))?;
        *active = None;
        self.initialized.store(false, Ordering::Release);
        Ok(())
    }
}
