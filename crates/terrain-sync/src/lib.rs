//! Terrain Sync
//!
//! The two halves of one synchronization attempt:
//!
//! - [`Effector`]: extracts Terrain with the lenient extractor, renders the
//!   Map block according to a [`Strategy`] and returns the unified diff.
//!   The Map file is written only in [`ApplyMode::Apply`]; the default is a
//!   dry run.
//! - [`Validator`]: recomputes Terrain with the strict extractor, reads the
//!   claims in the Map block and reports [`Finding`]s. It never writes.
//!
//! # Architecture
//!
//! ```text
//! src/ ──LenientExtractor──▶ Effector ──(diff, optional write)──▶ Map
//! src/ ──StrictExtractor───▶ Validator ◀──────(claims)────────── Map
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod effector;
pub mod error;
pub mod strategy;
pub mod validator;

pub use effector::{ApplyMode, EffectOutcome, EffectRequest, Effector, Proposal};
pub use error::{EffectorError, StrategyParseError, ValidatorError};
pub use strategy::Strategy;
pub use validator::{ValidationReport, Validator};

pub use terrain_model::{ErrorCode, Finding, Signature};
