//! Structured findings
//!
//! Every failure the workspace reports to machine consumers is a [`Finding`].
//! Human consumers get the terse one-line rendering from [`Finding::summary`].

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Failure category carried by a [`Finding`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Map claim does not match the canonical grammar
    MalformedSignature,
    /// Map claims the same signature more than once
    DuplicateSignature,
    /// Terrain could not be parsed, or has duplicate/unsupported signatures
    TerrainInvalid,
    /// Signature present in Terrain but absent from the Map
    MissingInMap,
    /// Signature claimed by the Map but absent from Terrain
    ExtraInMap,
    /// Ratchet configured with a direction other than `up`/`down`
    UnknownDirection,
    /// Ratchet metric moved past its tolerance in the wrong direction
    RatchetViolation,
}

impl ErrorCode {
    /// Wire name, identical to the serialized form
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MalformedSignature => "malformed_signature",
            ErrorCode::DuplicateSignature => "duplicate_signature",
            ErrorCode::TerrainInvalid => "terrain_invalid",
            ErrorCode::MissingInMap => "missing_in_map",
            ErrorCode::ExtraInMap => "extra_in_map",
            ErrorCode::UnknownDirection => "unknown_direction",
            ErrorCode::RatchetViolation => "ratchet_violation",
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failure with enough context to act on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// File the finding is about (Map, source file or ratchet config)
    pub file: String,
    /// Machine-readable category
    pub error_code: ErrorCode,
    /// What was observed
    pub details: String,
    /// Human-readable remediation
    pub suggested_fix: String,
}

impl Finding {
    /// Create a finding
    pub fn new(
        file: impl Into<String>,
        error_code: ErrorCode,
        details: impl Into<String>,
        suggested_fix: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            error_code,
            details: details.into(),
            suggested_fix: suggested_fix.into(),
        }
    }

    /// Terse single-line form for human output
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{} {}: {}", self.error_code, self.file, self.details)
    }

    /// Serialize a finding list as a pretty JSON array (`[]` when empty)
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json_array(findings: &[Finding]) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(findings)
    }
}
