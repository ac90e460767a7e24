//! Validator: independent Map/Terrain alignment check
//!
//! Terrain truth comes from the strict extractor, never from the Effector.
//! Checks run in order and stop at the first failing tier:
//!
//! 1. Terrain must parse (syntax, supported shapes, no duplicates).
//! 2. Every claim must satisfy the signature grammar, and no claim may
//!    repeat. Both are reported together.
//! 3. Claims and Terrain must be equal as sets.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use terrain_extract::{ExtractError, StrictExtractor, TerrainIssue};
use terrain_map::MapCodec;
use terrain_model::{is_canonical, ErrorCode, Finding, Signature};

use crate::error::ValidatorError;

/// Status line printed on success
pub const PASS_LINE: &str = "[validator] map_terrain_sync=pass";

/// Header line printed on failure
pub const FAIL_LINE: &str = "[validator] map_terrain_sync_fail";

/// Outcome of one validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Map file that was checked
    pub doc: String,
    /// Number of Terrain signatures (0 when Terrain is invalid)
    pub terrain_count: usize,
    /// Number of raw claims in the Map block
    pub claim_count: usize,
    /// Every problem found, in tier order
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    /// Whether the Map and Terrain are aligned
    #[inline]
    #[must_use]
    pub fn passed(&self) -> bool {
        self.findings.is_empty()
    }

    /// Process exit code for this report
    #[inline]
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.passed())
    }

    /// Plain-text rendering as `(stdout, stderr)`
    #[must_use]
    pub fn render_plain(&self) -> (String, String) {
        if self.passed() {
            return (format!("{PASS_LINE}\n"), String::new());
        }

        let mut stderr = format!("{FAIL_LINE}\n");
        for finding in &self.findings {
            stderr.push_str("  ");
            stderr.push_str(&finding.summary());
            stderr.push('\n');
        }
        (String::new(), stderr)
    }

    /// Findings as a JSON array (`[]` on success)
    ///
    /// # Errors
    /// Serialization failure.
    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        Finding::to_json_array(&self.findings)
    }

    /// Findings with the given code
    pub fn with_code(&self, code: ErrorCode) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.error_code == code)
    }
}

/// Map/Terrain alignment checker
#[derive(Debug, Clone, Default)]
pub struct Validator {
    codec: MapCodec,
    extractor: StrictExtractor,
}

impl Validator {
    /// Validator for the default Public Interfaces block
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the Map at `doc` against the Terrain under `src`
    ///
    /// # Errors
    /// [`ValidatorError::Io`] when a file cannot be read, or
    /// [`ValidatorError::Parser`] when the parser cannot start. Alignment
    /// problems are findings, not errors.
    pub fn validate(&self, src: &Path, doc: &Path) -> Result<ValidationReport, ValidatorError> {
        let map_text = fs::read_to_string(doc).map_err(|e| ValidatorError::io_error(doc, e))?;

        let terrain = match self.extractor.extract(src) {
            Ok(signatures) => Ok(signatures),
            Err(ExtractError::TerrainInvalid { issues }) => Err(issues),
            Err(ExtractError::Io { path, source }) => {
                return Err(ValidatorError::Io { path, source })
            }
            Err(ExtractError::ParserInit(message)) => return Err(ValidatorError::Parser(message)),
        };

        Ok(self.validate_text(terrain, &doc.display().to_string(), &map_text))
    }

    /// Validate Map text against an extraction result
    #[must_use]
    pub fn validate_text(
        &self,
        terrain: Result<Vec<Signature>, Vec<TerrainIssue>>,
        doc_label: &str,
        map_text: &str,
    ) -> ValidationReport {
        let claims = self.codec.claims(map_text).unwrap_or_else(|err| {
            tracing::warn!("{doc_label}: {err}; treating the Map as claiming nothing");
            Vec::new()
        });

        let mut report = ValidationReport {
            doc: doc_label.to_string(),
            terrain_count: 0,
            claim_count: claims.len(),
            findings: Vec::new(),
        };

        let signatures = match terrain {
            Ok(signatures) => signatures,
            Err(issues) => {
                report.findings = issues.iter().map(terrain_finding).collect();
                return report;
            }
        };
        report.terrain_count = signatures.len();

        report.findings = grammar_findings(doc_label, &claims);
        if !report.findings.is_empty() {
            return report;
        }

        report.findings = set_findings(doc_label, &signatures, &claims);
        report
    }
}

fn terrain_finding(issue: &TerrainIssue) -> Finding {
    let file = issue
        .path()
        .map_or_else(String::new, |p| p.display().to_string());
    Finding::new(
        file,
        ErrorCode::TerrainInvalid,
        issue.to_string(),
        issue.suggested_fix(),
    )
}

/// Malformed claims, then repeated claims, each reported once
fn grammar_findings(doc: &str, claims: &[String]) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut seen = BTreeSet::new();

    for claim in claims {
        if !is_canonical(claim) && seen.insert(claim.as_str()) {
            findings.push(Finding::new(
                doc,
                ErrorCode::MalformedSignature,
                format!("malformed signature in map: '{claim}'"),
                "write name(param1, param2) with bare parameter names separated by ', '",
            ));
        }
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for claim in claims.iter().filter(|c| is_canonical(c)) {
        *counts.entry(claim.as_str()).or_default() += 1;
    }
    for (claim, count) in counts.into_iter().filter(|(_, n)| *n > 1) {
        findings.push(Finding::new(
            doc,
            ErrorCode::DuplicateSignature,
            format!("'{claim}' is claimed {count} times"),
            format!("keep a single bullet for {claim}"),
        ));
    }

    findings
}

fn set_findings(doc: &str, signatures: &[Signature], claims: &[String]) -> Vec<Finding> {
    let terrain: BTreeSet<&str> = signatures.iter().map(Signature::canonical).collect();
    let claimed: BTreeSet<&str> = claims.iter().map(String::as_str).collect();

    let missing = terrain.difference(&claimed).map(|sig| {
        Finding::new(
            doc,
            ErrorCode::MissingInMap,
            format!("{sig} is defined in Terrain but not listed in the Map"),
            format!("add a bullet - `{sig}` under the Public Interfaces heading"),
        )
    });
    let extra = claimed.difference(&terrain).map(|sig| {
        Finding::new(
            doc,
            ErrorCode::ExtraInMap,
            format!("{sig} is listed in the Map but not defined in Terrain"),
            format!("remove the bullet for {sig} or restore the function"),
        )
    });

    missing.chain(extra).collect()
}
