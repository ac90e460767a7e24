//! Explicitly confirmed baseline updates

use std::fs;
use std::path::PathBuf;

use crate::config::{read_metric, RatchetConfig};
use crate::error::RatchetError;

/// Proof that a human confirmed the update
///
/// Only obtainable from an explicit yes, so nothing can update baselines as
/// a side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmed(());

impl Confirmed {
    /// `Some` only when `yes` is set
    #[must_use]
    pub fn from_flag(yes: bool) -> Option<Self> {
        yes.then_some(Self(()))
    }
}

/// One rewritten baseline
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineUpdate {
    /// Metric name
    pub metric: String,
    /// Baseline file that was overwritten
    pub file: PathBuf,
    /// New baseline value
    pub value: f64,
}

impl BaselineUpdate {
    /// Terse human line
    #[must_use]
    pub fn render_plain(&self) -> String {
        format!(
            "[ratchet] baseline_updated metric={} file={}",
            self.metric,
            self.file.display()
        )
    }
}

/// Overwrite every baseline file with its current file
///
/// Current files are validated before anything is written, so a bad metric
/// leaves every baseline untouched.
///
/// # Errors
/// [`RatchetError`] reading a current file or writing a baseline.
pub fn update_baselines(
    config: &RatchetConfig,
    _confirmed: Confirmed,
) -> Result<Vec<BaselineUpdate>, RatchetError> {
    let mut pending = Vec::with_capacity(config.ratchets.len());
    for (metric, entry) in &config.ratchets {
        let value = read_metric(&entry.current_file)?;
        let contents =
            fs::read(&entry.current_file).map_err(|e| RatchetError::io_error(&entry.current_file, e))?;
        pending.push((metric, entry, value, contents));
    }

    let mut updates = Vec::with_capacity(pending.len());
    for (metric, entry, value, contents) in pending {
        if let Some(parent) = entry.baseline_file.parent() {
            fs::create_dir_all(parent).map_err(|e| RatchetError::io_error(parent, e))?;
        }
        fs::write(&entry.baseline_file, contents)
            .map_err(|e| RatchetError::io_error(&entry.baseline_file, e))?;
        tracing::info!("baseline for {} set to {}", metric, value);

        updates.push(BaselineUpdate {
            metric: metric.clone(),
            file: entry.baseline_file.clone(),
            value,
        });
    }

    Ok(updates)
}
