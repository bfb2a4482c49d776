//! # Motif Core
//!
//! Configuration and shared types for the motif result layer.
//!
//! This crate provides:
//! - A typed key/value configuration store with legacy key aliases
//! - Translation into engine-native launch settings
//! - The active-configuration registry and its initialization protocol
//! - Strategy traits (graph loader, computations, pattern representation)
//!   and the registry that instantiates them
//! - Artifact types produced by an engine run

#![warn(missing_debug_implementations, rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod strategy;
pub mod types;

pub use config::{
    keys, ActiveConfiguration, ClusterMode, ConfigRegistry, ConfigValue, Configuration,
    NativeSettings, StrategyRef,
};
pub use error::{Error, Result};
pub use graph::MainGraph;
pub use strategy::{
    GraphLoader, MasterComputation, PatternRepresentation, StepComputation, Strategies,
    StrategyRegistry,
};
pub use types::{Embedding, EmbeddingKind, EmbeddingSet, OutputDescriptor, OutputDescriptorSet};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{keys, ConfigRegistry, ConfigValue, Configuration, NativeSettings};
    pub use crate::types::{Embedding, EmbeddingSet, OutputDescriptorSet};
    pub use crate::{Error, Result};
}
