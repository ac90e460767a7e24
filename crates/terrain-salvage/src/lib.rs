//! Terrain Salvage
//!
//! Runs the Effector and the Validator as one attempt and either commits the
//! Map mutation or reverts it byte for byte and records the rejected attempt
//! in an immutable quarantine directory.
//!
//! # State machine
//!
//! ```text
//! Start ──▶ EffectApplied ──▶ ValidatedOk                         (commit)
//!                        └──▶ ValidatedFail ──▶ Reverted ──▶ Quarantined
//! ```
//!
//! Steps are executed through the [`StepRunner`] seam: [`ProcessRunner`]
//! spawns short-lived subprocesses with a timeout, [`InProcessRunner`] calls
//! the library directly.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod orchestrator;
pub mod quarantine;
pub mod runner;
pub mod state;

pub use error::SalvageError;
pub use orchestrator::{Orchestrator, SalvageOutcome, SalvageRequest};
pub use quarantine::{QuarantineEntry, QuarantineRecord, QuarantineStore, RunManifest};
pub use runner::{
    Captured, EffectorCommand, InProcessRunner, Invocation, ProcessRunner, StepKind, StepRunner,
};
pub use state::SalvageState;
