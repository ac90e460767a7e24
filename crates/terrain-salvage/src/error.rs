//! Error types for salvage orchestration

use std::path::PathBuf;

use crate::state::SalvageState;

/// Errors that abort an attempt
///
/// Step failures are not errors: they end in a quarantined outcome.
#[derive(Debug, thiserror::Error)]
pub enum SalvageError {
    /// Map lacks the block heading; nothing was run or mutated
    #[error("structural error: {doc} has no '{heading}' heading")]
    Structural {
        /// Map file
        doc: PathBuf,
        /// Heading that was searched for
        heading: String,
    },

    /// Filesystem failure on the Map or in the quarantine
    #[error("io error on {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Every suffixed quarantine directory name for this second is taken
    #[error("quarantine exhausted: {base} and {max} suffixed variants already exist")]
    QuarantineExhausted {
        /// Unsuffixed run id
        base: String,
        /// Highest suffix tried
        max: u32,
    },

    /// Manifest or findings serialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// State machine violation
    #[error("illegal transition {from:?} -> {to:?}")]
    IllegalTransition {
        /// Current state
        from: SalvageState,
        /// Requested state
        to: SalvageState,
    },
}

impl SalvageError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
