//! Sequential drift runs
//!
//! Without validation every run is a dry run against the real Map, so the
//! Map is never written. With validation each run applies its candidate to
//! a private copy in a temporary directory and validates that copy.

use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use terrain_salvage::{Invocation, StepRunner};
use terrain_sync::Strategy;

use crate::error::DriftError;
use crate::report::{DriftReport, DriftSample};

/// Measurement parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriftConfig {
    /// Number of runs
    pub runs: u32,
    /// Run `i` uses `base_seed + i`
    pub base_seed: u64,
    /// Use the deterministic error-injecting variants instead of `Stochastic`
    pub mock: bool,
    /// Apply each candidate to an isolated copy and validate it
    pub validate: bool,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            runs: 10,
            base_seed: 1234,
            mock: false,
            validate: false,
        }
    }
}

impl DriftConfig {
    /// Set run count
    #[must_use]
    pub fn with_runs(mut self, runs: u32) -> Self {
        self.runs = runs;
        self
    }

    /// Set base seed
    #[must_use]
    pub fn with_base_seed(mut self, base_seed: u64) -> Self {
        self.base_seed = base_seed;
        self
    }

    /// Enable mock variants
    #[must_use]
    pub fn with_mock(mut self, mock: bool) -> Self {
        self.mock = mock;
        self
    }

    /// Enable per-run validation
    #[must_use]
    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Seed for 1-based run `run`
    #[inline]
    #[must_use]
    pub fn seed_for(&self, run: u32) -> u64 {
        self.base_seed.wrapping_add(u64::from(run))
    }

    /// Strategy for 1-based run `run`
    #[must_use]
    pub fn strategy_for(&self, run: u32) -> Strategy {
        let seed = self.seed_for(run);
        if self.mock {
            Strategy::mock_variant(seed)
        } else {
            Strategy::Stochastic(seed)
        }
    }
}

/// Run the Effector `config.runs` times and aggregate the outputs
///
/// # Errors
/// [`DriftError`] when an isolated copy cannot be prepared. Failing runs
/// are counted, not returned as errors.
pub async fn measure(
    runner: &dyn StepRunner,
    src: &Path,
    doc: &Path,
    config: &DriftConfig,
) -> Result<DriftReport, DriftError> {
    let label = doc.display().to_string();
    let mut samples = Vec::with_capacity(config.runs as usize);

    for run in 1..=config.runs {
        let seed = config.seed_for(run);
        let strategy = config.strategy_for(run);

        let sample = if config.validate {
            let copy = IsolatedMap::new(doc)?;
            let effect = runner
                .run(&Invocation::effect(src, copy.path(), strategy, true).with_label(label.as_str()))
                .await;

            if effect.succeeded() {
                let verdict = runner
                    .run(&Invocation::validate(src, copy.path(), false))
                    .await;
                DriftSample {
                    run,
                    seed,
                    output_hash: Some(digest(&effect.stdout)),
                    validated: Some(verdict.succeeded()),
                }
            } else {
                failed(run, seed, &effect.stderr)
            }
        } else {
            let effect = runner
                .run(&Invocation::effect(src, doc, strategy, false).with_label(label.as_str()))
                .await;
            if effect.succeeded() {
                DriftSample {
                    run,
                    seed,
                    output_hash: Some(digest(&effect.stdout)),
                    validated: None,
                }
            } else {
                failed(run, seed, &effect.stderr)
            }
        };

        tracing::debug!("drift run {} seed {} -> {:?}", run, seed, sample.output_hash);
        samples.push(sample);
    }

    Ok(DriftReport::from_samples(config.runs, samples))
}

fn failed(run: u32, seed: u64, stderr: &str) -> DriftSample {
    tracing::warn!("drift run {} (seed {}) failed: {}", run, seed, stderr.trim());
    DriftSample {
        run,
        seed,
        output_hash: None,
        validated: None,
    }
}

/// Lowercase hex SHA-256 of `text`
#[must_use]
pub fn digest(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Private copy of the Map, removed on drop
struct IsolatedMap {
    _dir: tempfile::TempDir,
    path: PathBuf,
}

impl IsolatedMap {
    fn new(doc: &Path) -> Result<Self, DriftError> {
        let name = doc
            .file_name()
            .ok_or_else(|| DriftError::InvalidMapPath(doc.to_path_buf()))?;
        let dir = tempfile::tempdir().map_err(|e| DriftError::io_error(doc, e))?;
        let path = dir.path().join(name);
        fs::copy(doc, &path).map_err(|e| DriftError::io_error(doc, e))?;
        Ok(Self { _dir: dir, path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
