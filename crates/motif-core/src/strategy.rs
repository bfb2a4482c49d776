//! Pluggable strategies and the registry that instantiates them.
//!
//! A configuration names its strategies by identifier. The registry maps each
//! identifier to a factory, so strategies are resolved once per configuration
//! initialization instead of being looked up by name at run time.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::config::{keys, Configuration};
use crate::graph::{AdjacencyListLoader, MainGraph};
use crate::types::{Embedding, EmbeddingKind};
use crate::{Error, Result};

/// Builds the input graph from a path and locality flag
pub trait GraphLoader: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    fn load(&self, path: &str, local: bool) -> Result<MainGraph>;
}

/// Per-step computation run by the engine in every superstep
pub trait StepComputation: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    /// Whether embeddings grow by vertices or by edges
    fn embedding_kind(&self) -> EmbeddingKind {
        EmbeddingKind::VertexInduced
    }
}

/// Master-level computation run between supersteps
pub trait MasterComputation: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    /// Upper bound on supersteps, if the master enforces one
    fn max_supersteps(&self) -> Option<u32> {
        None
    }
}

/// Canonical representation of the pattern an embedding instantiates
pub trait PatternRepresentation: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    fn canonical_code(&self, graph: &MainGraph, embedding: &Embedding) -> String;
}

/// Master computation that never intervenes
#[derive(Debug, Clone, Default)]
pub struct NoopMasterComputation;

impl NoopMasterComputation {
    pub const ID: &'static str = "noop";
}

impl MasterComputation for NoopMasterComputation {
    fn id(&self) -> &str {
        Self::ID
    }
}

/// Pattern code built from sorted vertex labels and labelled edges
#[derive(Debug, Clone, Default)]
pub struct AdjacencyPattern;

impl AdjacencyPattern {
    pub const ID: &'static str = "adjacency";
}

impl PatternRepresentation for AdjacencyPattern {
    fn id(&self) -> &str {
        Self::ID
    }

    fn canonical_code(&self, graph: &MainGraph, embedding: &Embedding) -> String {
        let label = |v: u32| graph.vertex_label(v).unwrap_or(u32::MAX);

        let (vertices, edges): (Vec<u32>, Vec<(u32, u32)>) = match embedding.kind {
            EmbeddingKind::VertexInduced => {
                let vs = embedding.words.clone();
                let es = graph
                    .edges()
                    .iter()
                    .filter(|(a, b)| vs.contains(a) && vs.contains(b))
                    .copied()
                    .collect();
                (vs, es)
            }
            EmbeddingKind::EdgeInduced => {
                let es: Vec<(u32, u32)> =
                    embedding.words.iter().filter_map(|&e| graph.edge(e)).collect();
                let mut vs: Vec<u32> = es.iter().flat_map(|&(a, b)| [a, b]).collect();
                vs.sort_unstable();
                vs.dedup();
                (vs, es)
            }
        };

        let mut labels: Vec<u32> = vertices.iter().map(|&v| label(v)).collect();
        labels.sort_unstable();

        let mut edges: Vec<(u32, u32)> = edges
            .into_iter()
            .map(|(a, b)| {
                let (la, lb) = (label(a), label(b));
                (la.min(lb), la.max(lb))
            })
            .collect();
        edges.sort_unstable();

        let labels = labels.iter().map(u32::to_string).collect::<Vec<_>>().join(",");
        let edges = edges
            .iter()
            .map(|(a, b)| format!("{a}-{b}"))
            .collect::<Vec<_>>()
            .join(",");
        format!("[{labels}|{edges}]")
    }
}

type Factory<T> = Arc<dyn Fn() -> Arc<T> + Send + Sync>;

/// Identifier-to-factory table for one capability
struct FactoryTable<T: ?Sized> {
    kind: &'static str,
    factories: DashMap<String, Factory<T>>,
}

impl<T: ?Sized> FactoryTable<T> {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            factories: DashMap::new(),
        }
    }

    fn register(&self, id: String, factory: Factory<T>) {
        debug!(kind = self.kind, id = %id, "Registered strategy");
        self.factories.insert(id, factory);
    }

    fn resolve(&self, id: &str) -> Result<Arc<T>> {
        let factory = self
            .factories
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| Error::UnknownStrategy {
                kind: self.kind,
                id: id.to_string(),
            })?;
        Ok(factory())
    }

    fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.factories.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }
}

/// Registry of strategy factories
pub struct StrategyRegistry {
    graph_loaders: FactoryTable<dyn GraphLoader>,
    computations: FactoryTable<dyn StepComputation>,
    master_computations: FactoryTable<dyn MasterComputation>,
    patterns: FactoryTable<dyn PatternRepresentation>,
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("graph_loaders", &self.graph_loaders.ids())
            .field("computations", &self.computations.ids())
            .field("master_computations", &self.master_computations.ids())
            .field("patterns", &self.patterns.ids())
            .finish()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl StrategyRegistry {
    /// Registry with no strategies
    pub fn empty() -> Self {
        Self {
            graph_loaders: FactoryTable::new("graph loader"),
            computations: FactoryTable::new("computation"),
            master_computations: FactoryTable::new("master computation"),
            patterns: FactoryTable::new("pattern representation"),
        }
    }

    /// Registry with the built-in loader, master computation and pattern
    pub fn with_defaults() -> Self {
        let registry = Self::empty();
        registry.register_graph_loader(AdjacencyListLoader::ID, || Arc::new(AdjacencyListLoader));
        registry.register_master_computation(NoopMasterComputation::ID, || {
            Arc::new(NoopMasterComputation)
        });
        registry.register_pattern(AdjacencyPattern::ID, || Arc::new(AdjacencyPattern));
        registry
    }

    pub fn register_graph_loader<F>(&self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn GraphLoader> + Send + Sync + 'static,
    {
        self.graph_loaders.register(id.into(), Arc::new(factory));
    }

    pub fn register_computation<F>(&self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn StepComputation> + Send + Sync + 'static,
    {
        self.computations.register(id.into(), Arc::new(factory));
    }

    pub fn register_master_computation<F>(&self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn MasterComputation> + Send + Sync + 'static,
    {
        self.master_computations.register(id.into(), Arc::new(factory));
    }

    pub fn register_pattern<F>(&self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn PatternRepresentation> + Send + Sync + 'static,
    {
        self.patterns.register(id.into(), Arc::new(factory));
    }

    /// Instantiate every strategy a configuration names.
    ///
    /// The step computation is required; the others fall back to the
    /// built-in defaults when unset.
    pub fn resolve(&self, config: &Configuration) -> Result<Strategies> {
        let computation_id = config
            .get_strategy_id(keys::COMPUTATION_CLASS)?
            .ok_or_else(|| Error::MissingKey(keys::COMPUTATION_CLASS.to_string()))?;

        let loader_id = config
            .get_strategy_id(keys::GRAPH_LOADER_CLASS)?
            .unwrap_or_else(|| keys::DEFAULT_GRAPH_LOADER.to_string());
        let master_id = config
            .get_strategy_id(keys::MASTER_COMPUTATION_CLASS)?
            .unwrap_or_else(|| keys::DEFAULT_MASTER_COMPUTATION.to_string());
        let pattern_id = config
            .get_strategy_id(keys::PATTERN_CLASS)?
            .unwrap_or_else(|| keys::DEFAULT_PATTERN.to_string());

        Ok(Strategies {
            graph_loader: self.graph_loaders.resolve(&loader_id)?,
            computation: self.computations.resolve(&computation_id)?,
            master_computation: self.master_computations.resolve(&master_id)?,
            pattern: self.patterns.resolve(&pattern_id)?,
        })
    }
}

/// Strategies instantiated for one active configuration
#[derive(Debug, Clone)]
pub struct Strategies {
    pub graph_loader: Arc<dyn GraphLoader>,
    pub computation: Arc<dyn StepComputation>,
    pub master_computation: Arc<dyn MasterComputation>,
    pub pattern: Arc<dyn PatternRepresentation>,
}
