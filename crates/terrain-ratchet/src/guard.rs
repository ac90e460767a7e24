//! Regression check

use serde::Serialize;
use std::fmt::{self, Display};
use terrain_model::{ErrorCode, Finding};

use crate::config::{read_metric, RatchetConfig};
use crate::error::RatchetError;

/// Direction a metric may move in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Higher is better
    Up,
    /// Lower is better
    Down,
}

impl Direction {
    /// Parse `up` / `down`
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => None,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "up",
            Self::Down => "down",
        })
    }
}

/// One metric with its values loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ratchet {
    /// Metric name
    pub metric: String,
    /// Configured direction, verbatim
    pub direction: String,
    /// Allowed slack
    pub tolerance: f64,
    /// Recorded baseline
    pub baseline: f64,
    /// Current measurement
    pub current: f64,
}

impl Ratchet {
    /// Finding for this metric, if it regressed or its direction is unknown
    #[must_use]
    pub fn evaluate(&self, file: &str) -> Option<Finding> {
        let Some(direction) = Direction::parse(&self.direction) else {
            return Some(Finding::new(
                file,
                ErrorCode::UnknownDirection,
                format!("metric={} direction={}", self.metric, self.direction),
                "set direction to \"up\" or \"down\"",
            ));
        };

        let violated = match direction {
            Direction::Up => self.current < self.baseline - self.tolerance,
            Direction::Down => self.current > self.baseline + self.tolerance,
        };
        if !violated {
            return None;
        }

        Some(Finding::new(
            file,
            ErrorCode::RatchetViolation,
            format!(
                "metric={} direction={} baseline={} current={} tol={}",
                self.metric, direction, self.baseline, self.current, self.tolerance
            ),
            format!(
                "bring {} back within {} of the baseline, or update the baseline with explicit confirmation",
                self.metric, self.tolerance
            ),
        ))
    }
}

/// Result of a check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatchetReport {
    /// Every evaluated metric
    pub ratchets: Vec<Ratchet>,
    /// One finding per violated or unknown-direction metric
    pub findings: Vec<Finding>,
}

impl RatchetReport {
    /// Whether no metric regressed
    #[inline]
    #[must_use]
    pub fn passed(&self) -> bool {
        self.findings.is_empty()
    }

    /// Terse human lines
    #[must_use]
    pub fn render_plain(&self) -> Vec<String> {
        if self.passed() {
            return vec!["[ratchet] PASS".to_string()];
        }
        self.findings
            .iter()
            .map(|f| format!("[ratchet] FAIL {} {}", f.error_code, f.details))
            .collect()
    }
}

/// Checks every configured metric
#[derive(Debug, Clone, Copy, Default)]
pub struct RatchetGuard;

impl RatchetGuard {
    /// Create guard
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Load every metric and evaluate it
    ///
    /// # Errors
    /// [`RatchetError`] when a baseline or current file cannot be read.
    pub fn check(&self, config: &RatchetConfig) -> Result<RatchetReport, RatchetError> {
        let file = config.source.display().to_string();
        let mut ratchets = Vec::with_capacity(config.ratchets.len());
        let mut findings = Vec::new();

        for (metric, entry) in &config.ratchets {
            let ratchet = Ratchet {
                metric: metric.clone(),
                direction: entry.direction.clone(),
                tolerance: entry.tolerance,
                baseline: read_metric(&entry.baseline_file)?,
                current: read_metric(&entry.current_file)?,
            };
            if let Some(finding) = ratchet.evaluate(&file) {
                tracing::warn!("{}", finding.summary());
                findings.push(finding);
            }
            ratchets.push(ratchet);
        }

        Ok(RatchetReport { ratchets, findings })
    }
}
