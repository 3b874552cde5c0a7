//! Error types for brusync-sync.

use std::path::PathBuf;

use thiserror::Error;

use brusync_core::{ConfigError, ServiceAcronym};

/// All errors that can arise from sync operations.
///
/// Inside a single-service sync these are folded into a failed
/// [`SyncOutcome`](brusync_core::SyncOutcome); only workspace setup and
/// scope resolution surface them to the caller.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the configuration store.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The converter process could not be started at all.
    #[error("failed to run converter '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The converter ran but left no collection behind. The message is the
    /// captured stderr, stdout or a generic fallback.
    #[error("{0}")]
    ConverterFailed(String),

    /// No specification matched the requested acronym.
    #[error("service '{acronym}' not found under {root}")]
    ServiceNotFound {
        acronym: ServiceAcronym,
        root: PathBuf,
    },

    /// A blocking background task (directory walk) panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// JSON serialization error (workspace `bruno.json`).
    #[error("workspace JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
