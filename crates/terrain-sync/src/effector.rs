//! Effector: propose, and optionally apply, a Map update
//!
//! The Effector trusts the lenient extractor and the chosen [`Strategy`].
//! It never judges its own output; that is the Validator's job.

use std::fs;
use std::path::{Path, PathBuf};
use terrain_extract::LenientExtractor;
use terrain_map::{unified_diff, MapCodec};
use terrain_model::Signature;

use crate::error::EffectorError;
use crate::strategy::Strategy;

/// Whether the Effector may write the Map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyMode {
    /// Report the diff only
    #[default]
    DryRun,
    /// Write the proposed Map back to disk
    Apply,
}

impl ApplyMode {
    /// `Apply` when `apply` is set
    #[inline]
    #[must_use]
    pub fn from_flag(apply: bool) -> Self {
        if apply {
            Self::Apply
        } else {
            Self::DryRun
        }
    }
}

/// Inputs for one Effector invocation
#[derive(Debug, Clone)]
pub struct EffectRequest {
    /// Terrain root
    pub src: PathBuf,
    /// Map file
    pub doc: PathBuf,
    /// Name used in the diff headers; the Map path when unset
    pub label: Option<String>,
    /// Rendering strategy
    pub strategy: Strategy,
    /// Dry run or apply
    pub mode: ApplyMode,
}

impl EffectRequest {
    /// Dry-run request with the `Pass` strategy
    #[must_use]
    pub fn new(src: impl Into<PathBuf>, doc: impl Into<PathBuf>) -> Self {
        Self {
            src: src.into(),
            doc: doc.into(),
            label: None,
            strategy: Strategy::Pass,
            mode: ApplyMode::DryRun,
        }
    }

    /// Set strategy
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set apply mode
    #[must_use]
    pub fn with_mode(mut self, mode: ApplyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set diff label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn diff_label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| self.doc.display().to_string())
    }
}

/// Proposed Map text and its diff against the current one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    /// Strategy that produced the proposal
    pub strategy: Strategy,
    /// Signatures the lenient extractor found
    pub signatures: Vec<Signature>,
    /// Current Map text
    pub before: String,
    /// Proposed Map text
    pub after: String,
    /// Unified diff, empty when nothing changes
    pub diff: String,
}

impl Proposal {
    /// Whether the proposal changes the Map
    #[inline]
    #[must_use]
    pub fn changes_map(&self) -> bool {
        !self.diff.is_empty()
    }
}

/// Result of [`Effector::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectOutcome {
    /// What was proposed
    pub proposal: Proposal,
    /// Whether the Map file was rewritten
    pub applied: bool,
}

impl EffectOutcome {
    /// Human status lines for the diagnostic stream
    #[must_use]
    pub fn status_lines(&self, doc: &Path) -> Vec<String> {
        let mut lines = vec![format!(
            "[effector] strategy={} signatures={}",
            self.proposal.strategy,
            self.proposal.signatures.len()
        )];
        if !self.proposal.changes_map() {
            lines.push("[effector] map already in sync".to_string());
        } else if self.applied {
            lines.push(format!("[effector] applied update to {}", doc.display()));
        } else {
            lines.push("[effector] dry run; pass --apply to write".to_string());
        }
        lines
    }
}

/// Map updater driven by the lenient extractor
#[derive(Debug, Clone, Default)]
pub struct Effector {
    codec: MapCodec,
    extractor: LenientExtractor,
}

impl Effector {
    /// Effector for the default Public Interfaces block
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Propose a new Map text for already-extracted signatures
    ///
    /// # Errors
    /// [`EffectorError::Structural`] when the Map has no block.
    pub fn propose_text(
        &self,
        signatures: Vec<Signature>,
        map_text: &str,
        label: &str,
        strategy: Strategy,
    ) -> Result<Proposal, EffectorError> {
        let entries = strategy.render(&signatures);
        let after = self.codec.replace(map_text, &entries)?;
        let diff = unified_diff(map_text, &after, label);

        Ok(Proposal {
            strategy,
            signatures,
            before: map_text.to_string(),
            after,
            diff,
        })
    }

    /// Extract, render and diff without touching the Map
    ///
    /// # Errors
    /// [`EffectorError::Io`] reading the Map, or
    /// [`EffectorError::Structural`] when the Map has no block.
    pub fn propose(&self, request: &EffectRequest) -> Result<Proposal, EffectorError> {
        let map_text = fs::read_to_string(&request.doc)
            .map_err(|e| EffectorError::io_error(&request.doc, e))?;
        let signatures = self.extractor.extract(&request.src);

        tracing::debug!(
            "effector extracted {} signature(s) from {}",
            signatures.len(),
            request.src.display()
        );

        self.propose_text(signatures, &map_text, &request.diff_label(), request.strategy)
    }

    /// Propose, then write the Map in [`ApplyMode::Apply`] if it changes
    ///
    /// # Errors
    /// As [`Effector::propose`], plus [`EffectorError::Io`] on write.
    pub fn run(&self, request: &EffectRequest) -> Result<EffectOutcome, EffectorError> {
        let proposal = self.propose(request)?;

        let applied = request.mode == ApplyMode::Apply && proposal.changes_map();
        if applied {
            fs::write(&request.doc, &proposal.after)
                .map_err(|e| EffectorError::io_error(&request.doc, e))?;
            tracing::info!("effector wrote {}", request.doc.display());
        }

        Ok(EffectOutcome { proposal, applied })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrain_test_utils::{Fixture, HEADINGLESS_MAP, SYNCED_MAP, UNSYNCED_MAP};

    fn request(fixture: &Fixture) -> EffectRequest {
        EffectRequest::new(fixture.src(), fixture.doc())
    }

    #[test]
    fn dry_run_reports_diff_and_leaves_map() {
        let fixture = Fixture::tax_calculator();
        let outcome = Effector::new().run(&request(&fixture)).unwrap();

        assert!(!outcome.applied);
        assert!(outcome.proposal.diff.contains("-- `stale_function(x)`"));
        assert!(outcome
            .proposal
            .diff
            .contains("+- `calculate_tax(amount, country, rate)`"));
        assert_eq!(fixture.read_map(), UNSYNCED_MAP);
    }

    #[test]
    fn apply_writes_synced_map() {
        let fixture = Fixture::tax_calculator();
        let outcome = Effector::new()
            .run(&request(&fixture).with_mode(ApplyMode::Apply))
            .unwrap();

        assert!(outcome.applied);
        assert_eq!(fixture.read_map(), SYNCED_MAP);
    }

    #[test]
    fn pass_is_idempotent() {
        let fixture = Fixture::tax_calculator();
        let effector = Effector::new();
        let apply = request(&fixture).with_mode(ApplyMode::Apply);

        effector.run(&apply).unwrap();
        let second = effector.run(&apply).unwrap();

        assert!(!second.applied);
        assert!(second.proposal.diff.is_empty());
        assert_eq!(fixture.read_map(), SYNCED_MAP);
    }

    #[test]
    fn label_overrides_diff_headers() {
        let fixture = Fixture::tax_calculator();
        let proposal = Effector::new()
            .propose(&request(&fixture).with_label("docs/architecture.md"))
            .unwrap();
        assert!(proposal
            .diff
            .starts_with("--- docs/architecture.md\n+++ docs/architecture.md\n"));
    }

    #[test]
    fn missing_heading_is_structural_and_writes_nothing() {
        let fixture = Fixture::tax_calculator();
        fixture.write_map(HEADINGLESS_MAP);

        let err = Effector::new()
            .run(&request(&fixture).with_mode(ApplyMode::Apply))
            .unwrap_err();

        assert!(matches!(err, EffectorError::Structural(_)));
        assert_eq!(fixture.read_map(), HEADINGLESS_MAP);
    }

    #[test]
    fn missing_map_is_io_error() {
        let fixture = Fixture::tax_calculator();
        let req = EffectRequest::new(fixture.src(), fixture.root().join("nope.md"));
        assert!(matches!(
            Effector::new().run(&req).unwrap_err(),
            EffectorError::Io { .. }
        ));
    }

    #[test]
    fn status_lines_describe_outcome() {
        let fixture = Fixture::tax_calculator();
        let outcome = Effector::new()
            .run(&request(&fixture).with_strategy(Strategy::Typed))
            .unwrap();
        let lines = outcome.status_lines(&fixture.doc());
        assert_eq!(lines[0], "[effector] strategy=typed signatures=2");
        assert!(lines[1].contains("dry run"));
    }
}
