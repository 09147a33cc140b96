//! Error types for gh-dumpster

use std::path::PathBuf;

use thiserror::Error;

use crate::kind::ResourceKind;
use crate::source::SourceError;

/// Result type alias for gh-dumpster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for gh-dumpster operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error (credentials, repository identifier, flags)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Fetching one resource kind from the remote failed
    #[error("failed to sync {kind}: {source}")]
    Fetch {
        kind: ResourceKind,
        #[source]
        source: SourceError,
    },

    /// Persisting a single record failed
    #[error("failed to save {} {number}: {source}", .kind.singular())]
    Save {
        kind: ResourceKind,
        number: u64,
        #[source]
        source: std::io::Error,
    },

    /// Creating the output directory tree failed
    #[error("failed to create output directories: {source}")]
    Layout {
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing the sync-state document failed
    #[error("failed to {action} sync state {}: {source}", .path.display())]
    State {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The sync-state document is not valid
    #[error("failed to parse sync state {}: {source}", .path.display())]
    StateFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
