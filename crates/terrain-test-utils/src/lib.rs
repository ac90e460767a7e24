//! Testing utilities for the terrain workspace
//!
//! Shared fixtures: a throwaway directory holding a Terrain (`src/`) and a
//! Map (`docs/architecture.md`), plus canned source and document texts.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const TAX_CALCULATOR_SOURCE: &str = "\
def normalize_country(country: str) -> str:
    return country.strip().upper()


def calculate_tax(amount: float, country: str, rate: float) -> float:
    normalized = normalize_country(country)
    return amount * rate
";

pub const TAX_SIGNATURES: [&str; 2] = [
    "calculate_tax(amount, country, rate)",
    "normalize_country(country)",
];

/// Map whose block lists a stale signature, between two other sections
pub const UNSYNCED_MAP: &str = "\
# Architecture

Intro text that must survive untouched.

## Public Interfaces

- `stale_function(x)`

## Data Flow

Amounts flow through `calculate_tax`.
";

/// Map whose block already mirrors [`TAX_CALCULATOR_SOURCE`]
pub const SYNCED_MAP: &str = "\
# Architecture

Intro text that must survive untouched.

## Public Interfaces

- `calculate_tax(amount, country, rate)`

- `normalize_country(country)`

## Data Flow

Amounts flow through `calculate_tax`.
";

/// Map without the Public Interfaces heading
pub const HEADINGLESS_MAP: &str = "# Architecture\n\n## Data Flow\n\nNothing here.\n";

/// Temp directory with `src/` (Terrain) and `docs/architecture.md` (Map)
#[derive(Debug)]
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    /// Empty Terrain and the given Map text
    pub fn new(map: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        let fixture = Self { dir };
        fixture.write_map(map);
        fixture
    }

    /// Tax calculator Terrain with an unsynchronised Map
    pub fn tax_calculator() -> Self {
        let fixture = Self::new(UNSYNCED_MAP);
        fixture.write_source("tax_calculator.py", TAX_CALCULATOR_SOURCE);
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn src(&self) -> PathBuf {
        self.dir.path().join("src")
    }

    pub fn doc(&self) -> PathBuf {
        self.dir.path().join("docs").join("architecture.md")
    }

    pub fn quarantine(&self) -> PathBuf {
        self.dir.path().join(".sdac").join("workflow-quarantine")
    }

    pub fn write_source(&self, relative: &str, text: &str) -> PathBuf {
        let path = self.src().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, text).unwrap();
        path
    }

    pub fn write_map(&self, text: &str) {
        fs::write(self.doc(), text).unwrap();
    }

    pub fn read_map(&self) -> String {
        fs::read_to_string(self.doc()).unwrap()
    }

    pub fn map_bytes(&self) -> Vec<u8> {
        fs::read(self.doc()).unwrap()
    }

    /// Write a `{"value": n}` metric file relative to the fixture root
    pub fn write_metric(&self, relative: &str, value: f64) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, format!("{{\"value\": {value}}}\n")).unwrap();
        path
    }

    /// Names of quarantine run directories, sorted
    pub fn quarantine_runs(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.quarantine()) else {
            return Vec::new();
        };
        let mut runs: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|e| e.path().is_dir())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        runs.sort();
        runs
    }
}
