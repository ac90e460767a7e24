//! Error types for drift measurement

use std::path::PathBuf;

/// Errors that stop a measurement
///
/// A failing Effector run is not an error; it is counted in the report.
#[derive(Debug, thiserror::Error)]
pub enum DriftError {
    /// Isolated Map copy could not be prepared
    #[error("io error on {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Map path has no file name to copy
    #[error("invalid map path: {0}")]
    InvalidMapPath(PathBuf),
}

impl DriftError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
