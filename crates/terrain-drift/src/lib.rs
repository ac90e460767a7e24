//! Terrain Drift
//!
//! Repeats the stochastic Effector under incrementing seeds and measures how
//! many distinct outputs it produces. Run `i` (1-based) uses seed
//! `base_seed + i`, so a report is reproducible from its configuration.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod harness;
pub mod report;

pub use error::DriftError;
pub use harness::{measure, DriftConfig};
pub use report::{DriftReport, DriftSample};
