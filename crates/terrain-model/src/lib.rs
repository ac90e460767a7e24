//! Terrain Model
//!
//! Foundation types for keeping a documentation surface (the Map) aligned with
//! signatures derived from source code (the Terrain).
//!
//! # Core Types
//!
//! - [`Signature`]: a function name plus ordered bare parameter names, with a
//!   single canonical text form `name(p1, p2)`
//! - [`Finding`]: a machine-readable failure record with remediation text
//! - [`ErrorCode`]: the closed set of failure categories a [`Finding`] carries
//!
//! Signatures are recomputed on every invocation and never persisted; the
//! canonical string is the identity used for ordering, equality and hashing.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod finding;
pub mod signature;

pub use finding::{ErrorCode, Finding};
pub use signature::{is_canonical, is_identifier, Signature, SignatureError};

/// Exact heading line that opens the Map block.
pub const PUBLIC_INTERFACES_HEADING: &str = "## Public Interfaces";
