//! Ratchet configuration and metric files

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RatchetError;

/// One configured metric
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RatchetEntry {
    /// `up` or `down`; anything else is reported, not rejected at load
    pub direction: String,
    /// Allowed slack, non-negative
    #[serde(default)]
    pub tolerance: f64,
    /// `{"value": n}` file holding the baseline
    pub baseline_file: PathBuf,
    /// `{"value": n}` file holding the current measurement
    pub current_file: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigFile {
    Wrapped { ratchets: BTreeMap<String, RatchetEntry> },
    Bare(BTreeMap<String, RatchetEntry>),
}

#[derive(Deserialize)]
struct MetricFile {
    value: f64,
}

/// Loaded configuration with metric paths resolved
#[derive(Debug, Clone, PartialEq)]
pub struct RatchetConfig {
    /// Configuration file, used to attribute findings
    pub source: PathBuf,
    /// Metrics by name, in name order
    pub ratchets: BTreeMap<String, RatchetEntry>,
}

impl RatchetConfig {
    /// Load `path`, resolving relative metric paths against `base_dir`
    ///
    /// # Errors
    /// [`RatchetError::Io`], [`RatchetError::Parse`], or
    /// [`RatchetError::NegativeTolerance`].
    pub fn load(path: &Path, base_dir: &Path) -> Result<Self, RatchetError> {
        let text = fs::read_to_string(path).map_err(|e| RatchetError::io_error(path, e))?;
        Self::from_json(path, &text, base_dir)
    }

    /// Parse configuration text attributed to `source`
    ///
    /// Accepts `{"ratchets": {...}}` or the bare metric mapping.
    ///
    /// # Errors
    /// [`RatchetError::Parse`] or [`RatchetError::NegativeTolerance`].
    pub fn from_json(source: &Path, text: &str, base_dir: &Path) -> Result<Self, RatchetError> {
        let file: ConfigFile =
            serde_json::from_str(text).map_err(|e| RatchetError::parse_error(source, e))?;
        let mut ratchets = match file {
            ConfigFile::Wrapped { ratchets } | ConfigFile::Bare(ratchets) => ratchets,
        };

        for (metric, entry) in &mut ratchets {
            if entry.tolerance < 0.0 {
                return Err(RatchetError::NegativeTolerance {
                    metric: metric.clone(),
                    tolerance: entry.tolerance,
                });
            }
            entry.baseline_file = base_dir.join(&entry.baseline_file);
            entry.current_file = base_dir.join(&entry.current_file);
        }

        Ok(Self {
            source: source.to_path_buf(),
            ratchets,
        })
    }
}

/// Read the number from a `{"value": n}` file
///
/// # Errors
/// [`RatchetError::Io`] or [`RatchetError::Parse`].
pub fn read_metric(path: &Path) -> Result<f64, RatchetError> {
    let text = fs::read_to_string(path).map_err(|e| RatchetError::io_error(path, e))?;
    let metric: MetricFile =
        serde_json::from_str(&text).map_err(|e| RatchetError::parse_error(path, e))?;
    Ok(metric.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = r#"{"direction": "up", "baseline_file": "b.json", "current_file": "c.json"}"#;

    #[test]
    fn wrapped_and_bare_forms_are_equivalent() {
        let base = Path::new("/work");
        let wrapped = RatchetConfig::from_json(
            Path::new("r.json"),
            &format!(r#"{{"ratchets": {{"tests": {SPEC}}}}}"#),
            base,
        )
        .unwrap();
        let bare =
            RatchetConfig::from_json(Path::new("r.json"), &format!(r#"{{"tests": {SPEC}}}"#), base)
                .unwrap();

        assert_eq!(wrapped, bare);
        let entry = &wrapped.ratchets["tests"];
        assert_eq!(entry.tolerance, 0.0);
        assert_eq!(entry.baseline_file, PathBuf::from("/work/b.json"));
        assert_eq!(entry.current_file, PathBuf::from("/work/c.json"));
    }

    #[test]
    fn absolute_paths_are_kept() {
        let text = r#"{"m": {"direction": "down", "tolerance": 1.5,
                      "baseline_file": "/abs/b.json", "current_file": "c.json"}}"#;
        let config = RatchetConfig::from_json(Path::new("r.json"), text, Path::new("/work")).unwrap();
        assert_eq!(config.ratchets["m"].baseline_file, PathBuf::from("/abs/b.json"));
        assert_eq!(config.ratchets["m"].tolerance, 1.5);
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let text = r#"{"m": {"direction": "up", "tolerance": -1,
                      "baseline_file": "b", "current_file": "c"}}"#;
        let err = RatchetConfig::from_json(Path::new("r.json"), text, Path::new(".")).unwrap_err();
        assert!(matches!(err, RatchetError::NegativeTolerance { .. }));
    }

    #[test]
    fn missing_fields_are_parse_errors() {
        let err = RatchetConfig::from_json(Path::new("r.json"), r#"{"m": {"direction": "up"}}"#, Path::new("."))
            .unwrap_err();
        assert!(matches!(err, RatchetError::Parse { .. }));
    }

    #[test]
    fn read_metric_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.json");
        fs::write(&path, r#"{"value": 42.5, "note": "ignored"}"#).unwrap();
        assert_eq!(read_metric(&path).unwrap(), 42.5);

        fs::write(&path, r#"{"other": 1}"#).unwrap();
        assert!(matches!(read_metric(&path).unwrap_err(), RatchetError::Parse { .. }));
    }
}
