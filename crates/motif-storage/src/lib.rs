//! # Motif Storage
//!
//! Storage backends for mining results.
//!
//! This crate provides:
//! - Path classification into local and distributed filesystems
//! - A local filesystem backend
//! - A router dispatching distributed schemes to registered backends
//! - JSON-lines and text encodings for result files

#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]

pub mod codec;
pub mod local;
pub mod path;
pub mod router;

use motif_core::Result;

pub use codec::{read_structured, write_structured, write_text_lines};
pub use local::LocalStorage;
pub use path::{Scheme, StoragePath};
pub use router::StorageRouter;

/// Trait for storage backends.
///
/// Errors are returned as produced by the backend; callers see the
/// underlying I/O failure unchanged.
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Write an object, replacing any existing one
    fn write(&self, path: &StoragePath, contents: &[u8]) -> Result<()>;

    /// Read an object
    fn read(&self, path: &StoragePath) -> Result<Vec<u8>>;

    /// Atomically move an object
    fn rename(&self, from: &StoragePath, to: &StoragePath) -> Result<()>;

    /// Whether an object exists
    fn exists(&self, path: &StoragePath) -> Result<bool>;

    /// Remove an object
    fn delete(&self, path: &StoragePath) -> Result<()>;
}

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{LocalStorage, Storage, StoragePath, StorageRouter};
}
