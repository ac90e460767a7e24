//! Terrain Extraction
//!
//! Derives the set of canonical [`Signature`]s for the public top-level
//! functions of a Python source tree. Two extractors are provided and they
//! deliberately share nothing beyond file discovery:
//!
//! - [`LenientExtractor`]: line-oriented pattern match. Strips annotations,
//!   defaults and `*`/`**` markers, skips anything it cannot read, never fails.
//!   Used by the Effector.
//! - [`StrictExtractor`]: full tree-sitter parse. Rejects positional-only,
//!   keyword-only and variadic parameters, syntax errors, and functions that
//!   canonicalize identically. Used by the Validator.
//!
//! A bug in one extractor therefore cannot silently hide behind the same bug
//! in the other.
//!
//! # Example
//!
//! ```rust,ignore
//! use terrain_extract::{LenientExtractor, StrictExtractor};
//!
//! let proposed = LenientExtractor::new().extract(src_root);
//! let truth = StrictExtractor::new().extract(src_root)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod lenient;
pub mod source;
pub mod strict;

pub use error::{ExtractError, ParamShape, TerrainIssue};
pub use lenient::LenientExtractor;
pub use source::python_sources;
pub use strict::StrictExtractor;

pub use terrain_model::Signature;
