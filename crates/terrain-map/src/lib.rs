//! Map Block Codec
//!
//! The Map is a Markdown document with one designated block:
//!
//! ```text
//! ## Public Interfaces        <- exact heading (trailing whitespace ignored)
//!
//! - `name(p1, p2)`
//!
//! - `other()`
//!
//! ## Next Section            <- block ends at the next "## " line, or EOF
//! ```
//!
//! [`MapCodec`] finds that block, renders a replacement and splices it in
//! while leaving every byte outside the block untouched. Re-encoding an
//! unchanged signature list is byte-identical, which is what lets callers
//! treat an empty [`unified_diff`] as "no drift".

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod codec;
pub mod diff;
pub mod error;

pub use codec::{BlockEntry, BlockSpan, MapCodec};
pub use diff::unified_diff;
pub use error::MapError;
