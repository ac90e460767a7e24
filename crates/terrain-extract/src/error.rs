//! Error types for Terrain extraction

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

/// Parameter shapes the strict extractor refuses to normalize
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamShape {
    /// Parameters before a bare `/`
    PositionalOnly,
    /// Parameters after a bare `*`
    KeywordOnly,
    /// `*args`
    VarPositional,
    /// `**kwargs`
    VarKeyword,
    /// Anything else the canonical form cannot express (e.g. tuple patterns)
    Other(String),
}

impl Display for ParamShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParamShape::PositionalOnly => f.write_str("positional-only parameters"),
            ParamShape::KeywordOnly => f.write_str("keyword-only parameters"),
            ParamShape::VarPositional => f.write_str("variadic *args"),
            ParamShape::VarKeyword => f.write_str("variadic **kwargs"),
            ParamShape::Other(kind) => write!(f, "unsupported parameter node '{kind}'"),
        }
    }
}

/// One reason the Terrain is invalid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerrainIssue {
    /// Source did not parse
    Syntax {
        /// Offending file
        path: PathBuf,
        /// 1-based line of the first error node
        line: usize,
        /// 1-based column of the first error node
        column: usize,
    },

    /// Public function uses a parameter shape outside the canonical form
    Unsupported {
        /// Offending file
        path: PathBuf,
        /// Function name
        function: String,
        /// Rejected shape
        shape: ParamShape,
    },

    /// Function name or parameter cannot be written canonically
    Malformed {
        /// Offending file
        path: PathBuf,
        /// Raw rendering of what was found
        signature: String,
    },

    /// Two or more public functions canonicalize identically
    Duplicate {
        /// Shared canonical form
        signature: String,
        /// Every file defining it, once per definition
        paths: Vec<PathBuf>,
    },
}

impl TerrainIssue {
    /// File the issue is attributed to (first definition for duplicates)
    #[must_use]
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            TerrainIssue::Syntax { path, .. }
            | TerrainIssue::Unsupported { path, .. }
            | TerrainIssue::Malformed { path, .. } => Some(path),
            TerrainIssue::Duplicate { paths, .. } => paths.first(),
        }
    }

    /// Remediation text for structured findings
    #[must_use]
    pub fn suggested_fix(&self) -> String {
        match self {
            TerrainIssue::Syntax { .. } => "fix the syntax error so the source parses".to_string(),
            TerrainIssue::Unsupported { function, .. } => format!(
                "give '{function}' plain positional-or-keyword parameters, or make it private with a leading underscore"
            ),
            TerrainIssue::Malformed { .. } => {
                "use ASCII letter/underscore-led identifiers for public functions".to_string()
            }
            TerrainIssue::Duplicate { signature, .. } => {
                format!("rename or remove all but one definition of {signature}")
            }
        }
    }
}

impl Display for TerrainIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TerrainIssue::Syntax { path, line, column } => {
                write!(f, "{}:{line}:{column}: syntax error", path.display())
            }
            TerrainIssue::Unsupported {
                path,
                function,
                shape,
            } => write!(
                f,
                "{}: unsupported signature shape ({shape}): {function}",
                path.display()
            ),
            TerrainIssue::Malformed { path, signature } => {
                write!(f, "{}: malformed signature: '{signature}'", path.display())
            }
            TerrainIssue::Duplicate { signature, paths } => {
                let files: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
                write!(
                    f,
                    "duplicate signature in Terrain: {signature} ({})",
                    files.join(", ")
                )
            }
        }
    }
}

/// Errors from strict Terrain extraction
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Source file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// tree-sitter could not be initialised
    #[error("parser initialization failed: {0}")]
    ParserInit(String),

    /// Terrain has syntax errors, unsupported shapes or duplicates
    #[error("terrain invalid: {} issue(s)", issues.len())]
    TerrainInvalid {
        /// Every issue found, in discovery order
        issues: Vec<TerrainIssue>,
    },
}

impl ExtractError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Issues carried by a [`ExtractError::TerrainInvalid`]
    #[must_use]
    pub fn issues(&self) -> &[TerrainIssue] {
        match self {
            ExtractError::TerrainInvalid { issues } => issues,
            _ => &[],
        }
    }
}
