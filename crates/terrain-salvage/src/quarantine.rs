//! Append-only quarantine of rejected attempts
//!
//! Each failed attempt gets a fresh directory `run_<UTC timestamp>` under the
//! quarantine root, suffixed `_001` to `_999` when the second is already
//! taken. Files are created with create-new semantics and never rewritten.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use terrain_model::Finding;

use crate::error::SalvageError;

/// Highest numeric suffix tried before giving up
pub const MAX_SUFFIX: u32 = 999;

const RUN_PREFIX: &str = "run_";
const DIFF_FILE: &str = "attempt-1.diff";
const FINDINGS_FILE: &str = "attempt-1.findings.json";
const EFFECTOR_STDERR_FILE: &str = "attempt-1.effector.stderr.txt";
const VALIDATOR_STDERR_FILE: &str = "attempt-1.validator.stderr.txt";
const VALIDATOR_STDOUT_FILE: &str = "attempt-1.validator.stdout.txt";
const MANIFEST_FILE: &str = "run.json";

/// Summary written as `run.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunManifest {
    /// Directory name
    pub run_id: String,
    /// Allocation time
    pub created_at: DateTime<Utc>,
    /// Effector strategy or program
    pub strategy: String,
    /// Effector exit code, if it produced one
    pub effector_exit: Option<i32>,
    /// Validator exit code, if it produced one
    pub validator_exit: Option<i32>,
    /// Whether either step hit the timeout
    pub timed_out: bool,
}

/// Evidence for one rejected attempt
#[derive(Debug, Clone, Default)]
pub struct QuarantineRecord {
    /// Effector output (the proposed diff)
    pub diff: String,
    /// Structured Validator findings
    pub findings: Vec<Finding>,
    /// Effector diagnostics
    pub effector_stderr: String,
    /// Validator diagnostics
    pub validator_stderr: String,
    /// Raw structured Validator output that did not parse as findings
    pub validator_stdout: String,
    /// Effector strategy or program
    pub strategy: String,
    /// Effector exit code
    pub effector_exit: Option<i32>,
    /// Validator exit code
    pub validator_exit: Option<i32>,
    /// Whether either step hit the timeout
    pub timed_out: bool,
}

/// One quarantined run as seen by a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuarantineEntry {
    /// Directory name
    pub run_id: String,
    /// Directory path
    pub path: PathBuf,
    /// Number of `.diff` files
    pub diffs: usize,
    /// Number of findings across `.findings.json` files
    pub findings: usize,
}

/// Quarantine root directory
#[derive(Debug, Clone)]
pub struct QuarantineStore {
    root: PathBuf,
}

impl QuarantineStore {
    /// Store rooted at `root`; created lazily on first write
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a fresh run directory for `now`
    ///
    /// # Errors
    /// [`SalvageError::QuarantineExhausted`] past [`MAX_SUFFIX`], or
    /// [`SalvageError::Io`].
    pub fn allocate(&self, now: DateTime<Utc>) -> Result<(String, PathBuf), SalvageError> {
        fs::create_dir_all(&self.root).map_err(|e| SalvageError::io_error(&self.root, e))?;

        let base = format!("{RUN_PREFIX}{}", now.format("%Y%m%dT%H%M%SZ"));
        let candidates =
            std::iter::once(base.clone()).chain((1..=MAX_SUFFIX).map(|n| format!("{base}_{n:03}")));

        for run_id in candidates {
            let dir = self.root.join(&run_id);
            match fs::create_dir(&dir) {
                Ok(()) => return Ok((run_id, dir)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(SalvageError::io_error(dir, e)),
            }
        }

        Err(SalvageError::QuarantineExhausted {
            base,
            max: MAX_SUFFIX,
        })
    }

    /// Allocate a directory and write every artifact of `record` into it
    ///
    /// # Errors
    /// As [`QuarantineStore::allocate`], plus write and serialization
    /// failures.
    pub fn persist(&self, record: &QuarantineRecord) -> Result<RunManifest, SalvageError> {
        let created_at = Utc::now();
        let (run_id, dir) = self.allocate(created_at)?;

        write_new(&dir.join(DIFF_FILE), &record.diff)?;
        let findings = Finding::to_json_array(&record.findings)?;
        write_new(&dir.join(FINDINGS_FILE), &findings)?;
        if !record.effector_stderr.is_empty() {
            write_new(&dir.join(EFFECTOR_STDERR_FILE), &record.effector_stderr)?;
        }
        if !record.validator_stderr.is_empty() {
            write_new(&dir.join(VALIDATOR_STDERR_FILE), &record.validator_stderr)?;
        }
        if !record.validator_stdout.is_empty() {
            write_new(&dir.join(VALIDATOR_STDOUT_FILE), &record.validator_stdout)?;
        }

        let manifest = RunManifest {
            run_id,
            created_at,
            strategy: record.strategy.clone(),
            effector_exit: record.effector_exit,
            validator_exit: record.validator_exit,
            timed_out: record.timed_out,
        };
        write_new(&dir.join(MANIFEST_FILE), &serde_json::to_string_pretty(&manifest)?)?;

        tracing::info!("quarantined attempt in {}", dir.display());
        Ok(manifest)
    }

    /// Quarantined runs, oldest first
    ///
    /// A missing root lists as empty.
    ///
    /// # Errors
    /// [`SalvageError::Io`] when the root or a run directory cannot be read.
    pub fn list(&self) -> Result<Vec<QuarantineEntry>, SalvageError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SalvageError::io_error(&self.root, e)),
        };

        let mut runs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SalvageError::io_error(&self.root, e))?;
            let path = entry.path();
            let run_id = entry.file_name().to_string_lossy().into_owned();
            if !path.is_dir() || !run_id.starts_with(RUN_PREFIX) {
                continue;
            }
            let (diffs, findings) = count_artifacts(&path)?;
            runs.push(QuarantineEntry {
                run_id,
                path,
                diffs,
                findings,
            });
        }

        // Timestamped names sort chronologically.
        runs.sort_by(|a, b| a.run_id.cmp(&b.run_id));
        Ok(runs)
    }
}

fn write_new(path: &Path, contents: &str) -> Result<(), SalvageError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| SalvageError::io_error(path, e))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| SalvageError::io_error(path, e))
}

fn count_artifacts(dir: &Path) -> Result<(usize, usize), SalvageError> {
    let mut diffs = 0;
    let mut findings = 0;

    for entry in fs::read_dir(dir).map_err(|e| SalvageError::io_error(dir, e))? {
        let path = entry.map_err(|e| SalvageError::io_error(dir, e))?.path();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if name.ends_with(".diff") {
            diffs += 1;
        } else if name.ends_with(".findings.json") {
            let text = fs::read_to_string(&path).map_err(|e| SalvageError::io_error(&path, e))?;
            match serde_json::from_str::<Vec<serde_json::Value>>(&text) {
                Ok(items) => findings += items.len(),
                Err(e) => tracing::warn!("unreadable findings in {}: {}", path.display(), e),
            }
        }
    }

    Ok((diffs, findings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use terrain_model::ErrorCode;

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, secs).unwrap()
    }

    #[test]
    fn allocate_suffixes_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let store = QuarantineStore::new(dir.path().join("q"));

        let (first, _) = store.allocate(at(5)).unwrap();
        let (second, _) = store.allocate(at(5)).unwrap();
        let (third, _) = store.allocate(at(5)).unwrap();

        assert_eq!(first, "run_20260102T030405Z");
        assert_eq!(second, "run_20260102T030405Z_001");
        assert_eq!(third, "run_20260102T030405Z_002");
    }

    #[test]
    fn allocate_fails_past_bound() {
        let dir = tempfile::tempdir().unwrap();
        let store = QuarantineStore::new(dir.path());
        let base = "run_20260102T030405Z";
        fs::create_dir(dir.path().join(base)).unwrap();
        for n in 1..=MAX_SUFFIX {
            fs::create_dir(dir.path().join(format!("{base}_{n:03}"))).unwrap();
        }

        let err = store.allocate(at(5)).unwrap_err();
        assert!(matches!(err, SalvageError::QuarantineExhausted { max: 999, .. }));
    }

    #[test]
    fn persist_writes_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = QuarantineStore::new(dir.path());
        let record = QuarantineRecord {
            diff: "--- a\n+++ a\n".to_string(),
            findings: vec![Finding::new("doc.md", ErrorCode::ExtraInMap, "x", "y")],
            effector_stderr: "eff\n".to_string(),
            validator_stderr: String::new(),
            validator_stdout: "Traceback".to_string(),
            strategy: "extra".to_string(),
            effector_exit: Some(0),
            validator_exit: Some(1),
            timed_out: false,
        };

        let manifest = store.persist(&record).unwrap();
        let run = dir.path().join(&manifest.run_id);

        assert_eq!(fs::read_to_string(run.join(DIFF_FILE)).unwrap(), record.diff);
        assert!(run.join(FINDINGS_FILE).exists());
        assert!(run.join(EFFECTOR_STDERR_FILE).exists());
        assert!(!run.join(VALIDATOR_STDERR_FILE).exists());
        assert_eq!(fs::read_to_string(run.join(VALIDATOR_STDOUT_FILE)).unwrap(), "Traceback");

        let stored: RunManifest =
            serde_json::from_str(&fs::read_to_string(run.join(MANIFEST_FILE)).unwrap()).unwrap();
        assert_eq!(stored, manifest);
    }

    #[test]
    fn empty_findings_are_an_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let store = QuarantineStore::new(dir.path());
        let manifest = store.persist(&QuarantineRecord::default()).unwrap();
        let text = fs::read_to_string(dir.path().join(manifest.run_id).join(FINDINGS_FILE)).unwrap();
        assert_eq!(text, "[]");
    }

    #[test]
    fn existing_files_are_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        write_new(&path, "first").unwrap();
        assert!(write_new(&path, "second").is_err());
        assert_eq!(fs::read_to_string(path).unwrap(), "first");
    }

    #[test]
    fn list_is_chronological_with_counts() {
        let dir = tempfile::tempdir().unwrap();
        let store = QuarantineStore::new(dir.path());
        assert!(store.list().unwrap().is_empty());

        let (late, late_dir) = store.allocate(at(9)).unwrap();
        let (early, early_dir) = store.allocate(at(1)).unwrap();
        write_new(&late_dir.join(DIFF_FILE), "d").unwrap();
        write_new(
            &late_dir.join(FINDINGS_FILE),
            &Finding::to_json_array(&[
                Finding::new("a", ErrorCode::MissingInMap, "b", "c"),
                Finding::new("a", ErrorCode::ExtraInMap, "b", "c"),
            ])
            .unwrap(),
        )
        .unwrap();
        write_new(&early_dir.join(FINDINGS_FILE), "[]").unwrap();
        fs::create_dir(dir.path().join("unrelated")).unwrap();

        let runs = store.list().unwrap();
        let ids: Vec<&str> = runs.iter().map(|r| r.run_id.as_str()).collect();
        assert_eq!(ids, vec![early.as_str(), late.as_str()]);
        assert_eq!((runs[0].diffs, runs[0].findings), (0, 0));
        assert_eq!((runs[1].diffs, runs[1].findings), (1, 2));
    }

    #[test]
    fn missing_root_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = QuarantineStore::new(dir.path().join("never-created"));
        assert!(store.list().unwrap().is_empty());
    }
}
