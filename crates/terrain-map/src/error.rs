//! Error types for the Map codec

/// Errors locating or rewriting the Map block
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    /// The designated heading line is absent
    #[error("heading not found: {heading}")]
    HeadingNotFound {
        /// Heading that was searched for
        heading: String,
    },
}
