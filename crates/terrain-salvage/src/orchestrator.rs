//! Commit-or-revert orchestration
//!
//! The Map's original bytes are captured before the Effector runs. Unless
//! both steps succeed, the Map ends the attempt holding exactly those bytes,
//! including when the attempt aborts with an error between the two steps.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use terrain_map::MapCodec;
use terrain_model::Finding;
use terrain_sync::Strategy;

use crate::error::SalvageError;
use crate::quarantine::{QuarantineRecord, QuarantineStore, RunManifest};
use crate::runner::{Captured, Invocation, StepRunner};
use crate::state::{SalvageState, StateTrail};

/// One salvage attempt
#[derive(Debug, Clone)]
pub struct SalvageRequest {
    /// Terrain root
    pub src: PathBuf,
    /// Map file
    pub doc: PathBuf,
    /// Effector strategy
    pub strategy: Strategy,
    /// Seed forwarded to an external Effector
    pub seed: Option<u64>,
}

impl SalvageRequest {
    /// Attempt with the given strategy
    #[must_use]
    pub fn new(src: impl Into<PathBuf>, doc: impl Into<PathBuf>, strategy: Strategy) -> Self {
        Self {
            src: src.into(),
            doc: doc.into(),
            strategy,
            seed: None,
        }
    }

    /// Set seed
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

/// How an attempt ended
#[derive(Debug, Clone)]
pub enum SalvageOutcome {
    /// Both steps succeeded; the Map keeps the Effector's changes
    Committed {
        /// Effector output
        effect: Captured,
        /// Validator output
        validation: Captured,
        /// States visited
        states: Vec<SalvageState>,
    },
    /// A step failed; the Map was restored and the attempt quarantined
    Quarantined {
        /// Manifest of the new quarantine directory
        manifest: RunManifest,
        /// Directory holding the evidence
        dir: PathBuf,
        /// Structured findings from the re-validation
        findings: Vec<Finding>,
        /// States visited
        states: Vec<SalvageState>,
    },
}

impl SalvageOutcome {
    /// Whether the mutation was kept
    #[inline]
    #[must_use]
    pub fn committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    /// States visited by the attempt
    #[must_use]
    pub fn states(&self) -> &[SalvageState] {
        match self {
            Self::Committed { states, .. } | Self::Quarantined { states, .. } => states,
        }
    }
}

/// Restores the Map's original bytes when dropped while armed
struct RestoreGuard<'a> {
    doc: &'a Path,
    original: &'a [u8],
    armed: bool,
}

impl<'a> RestoreGuard<'a> {
    fn new(doc: &'a Path, original: &'a [u8]) -> Self {
        Self {
            doc,
            original,
            armed: true,
        }
    }

    fn restore(mut self) -> Result<(), SalvageError> {
        self.armed = false;
        fs::write(self.doc, self.original).map_err(|e| SalvageError::io_error(self.doc, e))
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = fs::write(self.doc, self.original) {
                tracing::error!("failed to restore {}: {}", self.doc.display(), e);
            }
        }
    }
}

/// Runs Effector and Validator, then commits or reverts and quarantines
pub struct Orchestrator {
    runner: Arc<dyn StepRunner>,
    store: QuarantineStore,
    codec: MapCodec,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("store", &self.store)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Orchestrator quarantining into `store`
    #[must_use]
    pub fn new(runner: Arc<dyn StepRunner>, store: QuarantineStore) -> Self {
        Self {
            runner,
            store,
            codec: MapCodec::default(),
        }
    }

    /// Quarantine store in use
    #[must_use]
    pub fn store(&self) -> &QuarantineStore {
        &self.store
    }

    /// Run one attempt
    ///
    /// # Errors
    /// [`SalvageError::Structural`] before anything runs when the Map lacks
    /// its heading. IO and quarantine errors abort the attempt; the Map is
    /// still restored if the Effector may have touched it.
    pub async fn run(&self, request: &SalvageRequest) -> Result<SalvageOutcome, SalvageError> {
        let doc = request.doc.as_path();
        let original = fs::read(doc).map_err(|e| SalvageError::io_error(doc, e))?;

        if !self.codec.has_heading(&String::from_utf8_lossy(&original)) {
            return Err(SalvageError::Structural {
                doc: doc.to_path_buf(),
                heading: self.codec.heading().to_string(),
            });
        }

        let mut trail = StateTrail::new();
        let guard = RestoreGuard::new(doc, &original);
        let label = doc.display().to_string();

        let effect = self
            .runner
            .run(
                &Invocation::effect(&request.src, doc, request.strategy, true)
                    .with_label(label)
                    .with_seed(request.seed),
            )
            .await;
        trail.advance(SalvageState::EffectApplied)?;

        let validation = self
            .runner
            .run(&Invocation::validate(&request.src, doc, false))
            .await;

        if effect.succeeded() && validation.succeeded() {
            trail.advance(SalvageState::ValidatedOk)?;
            guard.disarm();
            tracing::info!("salvage committed {} ({})", doc.display(), request.strategy);
            return Ok(SalvageOutcome::Committed {
                effect,
                validation,
                states: trail.into_states(),
            });
        }

        trail.advance(SalvageState::ValidatedFail)?;
        tracing::warn!(
            "salvage attempt failed (effector exit {:?}, validator exit {:?})",
            effect.exit_code,
            validation.exit_code
        );

        let structured = self
            .runner
            .run(&Invocation::validate(&request.src, doc, true))
            .await;
        // Unparseable output is kept verbatim next to the empty findings array.
        let (findings, validator_stdout) = match parse_findings(&structured.stdout) {
            Some(findings) => (findings, String::new()),
            None => (Vec::new(), structured.stdout),
        };

        guard.restore()?;
        trail.advance(SalvageState::Reverted)?;

        let record = QuarantineRecord {
            diff: effect.stdout,
            findings: findings.clone(),
            effector_stderr: effect.stderr,
            validator_stderr: validation.stderr,
            validator_stdout,
            strategy: self.runner.effector_name(&request.strategy),
            effector_exit: effect.exit_code,
            validator_exit: validation.exit_code,
            timed_out: effect.timed_out || validation.timed_out,
        };
        let manifest = self.store.persist(&record)?;
        trail.advance(SalvageState::Quarantined)?;

        let dir = self.store.root().join(&manifest.run_id);
        Ok(SalvageOutcome::Quarantined {
            manifest,
            dir,
            findings,
            states: trail.into_states(),
        })
    }
}

/// Findings array from structured Validator output; `None` when unparseable
fn parse_findings(stdout: &str) -> Option<Vec<Finding>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Some(Vec::new());
    }
    match serde_json::from_str(trimmed) {
        Ok(findings) => Some(findings),
        Err(e) => {
            tracing::warn!("structured validator output is not a findings array: {}", e);
            None
        }
    }
}
