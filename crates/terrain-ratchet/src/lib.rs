//! Terrain Ratchet
//!
//! Compares scalar metrics against recorded baselines. A metric with
//! direction `up` may not fall more than its tolerance below the baseline;
//! `down` may not rise more than its tolerance above it. Baselines move only
//! through [`update_baselines`], which demands a [`Confirmed`] token.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod baseline;
pub mod config;
pub mod error;
pub mod guard;

pub use baseline::{update_baselines, BaselineUpdate, Confirmed};
pub use config::{read_metric, RatchetConfig, RatchetEntry};
pub use error::RatchetError;
pub use guard::{Direction, Ratchet, RatchetGuard, RatchetReport};
