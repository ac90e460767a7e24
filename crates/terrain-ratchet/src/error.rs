//! Error types for ratchet checks

use std::path::PathBuf;

/// Errors reading ratchet configuration or metric files
#[derive(Debug, thiserror::Error)]
pub enum RatchetError {
    /// File could not be read or written
    #[error("io error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not the expected JSON shape
    #[error("invalid JSON in {path}: {source}")]
    Parse {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Tolerance below zero
    #[error("metric '{metric}' has negative tolerance {tolerance}")]
    NegativeTolerance {
        /// Metric name
        metric: String,
        /// Configured tolerance
        tolerance: f64,
    },
}

impl RatchetError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create parse error for path
    pub fn parse_error(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}
