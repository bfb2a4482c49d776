//! # Motif Results
//!
//! Materialization of mining results on top of a distributed engine.
//!
//! This crate provides:
//! - Engine handle lifecycle (construct, run, finalize) behind an execution
//!   context trait
//! - A per-job result cache for the engine handle, output descriptors and
//!   final embeddings, with output-mode correction
//! - Structured (relocated) and text (rewritten) output persistence
//! - Derived caches with a single configuration override
//!
//! ## Example
//!
//! ```ignore
//! let session = Arc::new(Session::with_context(context));
//! let mut results = ResultCache::new(session, config);
//!
//! let embeddings = results.embeddings()?;
//! results.persist_text("motifs.txt")?;
//!
//! let mut on_yarn = results.with_override(keys::MASTER_ENDPOINT, "yarn-client");
//! on_yarn.persist_structured("hdfs://namenode/out/motifs")?;
//! ```

#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]

pub mod cache;
pub mod engine;
pub mod persist;
pub mod session;

#[cfg(test)]
mod testing;

pub use cache::ResultCache;
pub use engine::{EngineHandle, EngineLaunch, ExecutionContext, HandleState, ManagedHandle};
pub use session::Session;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{EngineHandle, EngineLaunch, ExecutionContext, ResultCache, Session};
    pub use motif_core::prelude::*;
}
