//! Error types shared across the motif crates.

use thiserror::Error;

/// Result type alias for motif operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring, running or persisting a mining job
#[derive(Debug, Error)]
pub enum Error {
    /// Stored configuration value cannot be read as the requested type
    #[error("Type mismatch for key '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Required configuration key is absent
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Strategy identifier has no registered factory
    #[error("Unknown {kind} identifier: {id}")]
    UnknownStrategy { kind: &'static str, id: String },

    /// Invalid configuration document or value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Input graph could not be loaded
    #[error("Graph loading failed for {path}: {message}")]
    GraphLoad { path: String, message: String },

    /// Engine handle reported a failure
    #[error("Engine error: {0}")]
    Engine(String),

    /// Engine handle lifecycle transition is not allowed
    #[error("Invalid engine state transition: {from} -> {to}")]
    InvalidState {
        from: &'static str,
        to: &'static str,
    },

    /// Storage path uses a scheme with no registered backend
    #[error("Unsupported storage scheme: {0}")]
    UnsupportedScheme(String),

    /// A shared lock was poisoned by a panicking holder
    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),

    /// Underlying I/O failure, surfaced unchanged
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create an engine error
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a graph loading error
    pub fn graph_load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::GraphLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether the error came from the storage layer
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Io(_) | Self::UnsupportedScheme(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_message() {
        let err = Error::TypeMismatch {
            key: "engine.num_workers".to_string(),
            expected: "integer",
            found: "string",
        };
        assert_eq!(
            err.to_string(),
            "Type mismatch for key 'engine.num_workers': expected integer, found string"
        );
    }

    #[test]
    fn test_io_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: Error = io.into();
        assert_eq!(err.to_string(), "no such file");
        assert!(err.is_storage());
    }
}
