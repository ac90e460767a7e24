//! Error types for the Effector and Validator

use std::path::PathBuf;
use terrain_map::MapError;

/// Errors proposing or applying a Map update
#[derive(Debug, thiserror::Error)]
pub enum EffectorError {
    /// Map has no designated block; nothing was written
    #[error("structural error: {0}")]
    Structural(#[from] MapError),

    /// Map file could not be read or written
    #[error("io error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl EffectorError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors that stop validation before any finding can be produced
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    /// Map or source file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Terrain parser could not run
    #[error("parser unavailable: {0}")]
    Parser(String),
}

impl ValidatorError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Unknown strategy name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy: '{0}' (expected pass, typed, duplicate, missing, extra, stochastic or mock)")]
pub struct StrategyParseError(pub String);
