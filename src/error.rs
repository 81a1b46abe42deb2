//! Error types for charter.

use std::path::PathBuf;

/// Errors that can occur while chunking or answering.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source document could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid chunk size (must be > 0).
    #[error("invalid chunk size: {0} (must be > 0)")]
    InvalidChunkSize(usize),

    /// Overlap is not smaller than the chunk size.
    #[error("overlap {overlap} must be smaller than chunk size {size}")]
    OverlapExceedsSize {
        /// The chunk size.
        size: usize,
        /// The overlap that reached or exceeded the size.
        overlap: usize,
    },

    /// The separator list is empty.
    #[error("at least one separator is required")]
    NoSeparators,

    /// A header rule marker is not a run of `#` characters.
    #[error("invalid header marker {marker:?} for label {label:?} (expected one or more '#')")]
    InvalidHeaderMarker {
        /// The rejected marker.
        marker: String,
        /// The label the marker was configured for.
        label: String,
    },

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A question with no content was asked.
    #[error("query is empty")]
    EmptyQuery,

    /// An external collaborator (embedder, index, reranker, model) failed.
    #[error("{service} error: {message}")]
    Service {
        /// Which collaborator failed.
        service: &'static str,
        /// Provider-supplied detail.
        message: String,
    },
}

impl Error {
    /// Build a collaborator error.
    pub fn service(service: &'static str, message: impl Into<String>) -> Self {
        Self::Service {
            service,
            message: message.into(),
        }
    }

    /// Whether this error is a configuration problem rather than a runtime one.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidChunkSize(_)
                | Self::OverlapExceedsSize { .. }
                | Self::NoSeparators
                | Self::InvalidHeaderMarker { .. }
                | Self::Config(_)
        )
    }
}

/// Result type for charter operations.
pub type Result<T> = std::result::Result<T, Error>;
