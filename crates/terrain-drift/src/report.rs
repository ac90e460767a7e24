//! Drift samples and aggregate report

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Display};

/// Maximum example run indices in a report
pub const MAX_EXAMPLES: usize = 5;

/// Outcome of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftSample {
    /// 1-based run index
    pub run: u32,
    /// Seed used for the run
    pub seed: u64,
    /// SHA-256 hex digest of the Effector output; `None` if the run failed
    pub output_hash: Option<String>,
    /// Validator verdict when per-run validation was requested
    pub validated: Option<bool>,
}

/// Aggregate over all runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    /// Requested run count
    pub runs: u32,
    /// Distinct digests among successful runs
    pub unique_diffs: usize,
    /// `unique_diffs / successful runs`, 0 when none succeeded
    pub drift_coefficient: f64,
    /// Runs whose Effector step failed
    pub failures: usize,
    /// Candidates the Validator accepted, when validating
    pub passes: Option<usize>,
    /// Candidates the Validator rejected, when validating
    pub rejects: Option<usize>,
    /// First run producing each distinct digest, ascending, at most five
    pub example_unique_runs: Vec<u32>,
    /// Per-run detail
    pub samples: Vec<DriftSample>,
}

impl DriftReport {
    /// Aggregate `samples`
    #[must_use]
    pub fn from_samples(runs: u32, samples: Vec<DriftSample>) -> Self {
        let mut first_run: HashMap<&str, u32> = HashMap::new();
        for sample in &samples {
            if let Some(hash) = &sample.output_hash {
                first_run.entry(hash.as_str()).or_insert(sample.run);
            }
        }

        let successful = samples.iter().filter(|s| s.output_hash.is_some()).count();
        let failures = samples.len() - successful;
        let unique_diffs = first_run.len();

        #[allow(clippy::cast_precision_loss)]
        let drift_coefficient = if successful == 0 {
            0.0
        } else {
            unique_diffs as f64 / successful as f64
        };

        let mut example_unique_runs: Vec<u32> = first_run.into_values().collect();
        example_unique_runs.sort_unstable();
        example_unique_runs.truncate(MAX_EXAMPLES);

        let validated: Vec<bool> = samples.iter().filter_map(|s| s.validated).collect();
        let (passes, rejects) = if samples.iter().any(|s| s.validated.is_some()) {
            let passes = validated.iter().filter(|v| **v).count();
            (Some(passes), Some(validated.len() - passes))
        } else {
            (None, None)
        };

        Self {
            runs,
            unique_diffs,
            drift_coefficient,
            failures,
            passes,
            rejects,
            example_unique_runs,
            samples,
        }
    }
}

impl Display for DriftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "runs={} unique_diffs={} drift_coefficient={:.3} failures={}",
            self.runs, self.unique_diffs, self.drift_coefficient, self.failures
        )?;
        if let (Some(passes), Some(rejects)) = (self.passes, self.rejects) {
            write!(f, "\nvalidated passes={passes} rejects={rejects}")?;
        }
        if !self.example_unique_runs.is_empty() {
            let examples: Vec<String> =
                self.example_unique_runs.iter().map(ToString::to_string).collect();
            write!(f, "\nexample_unique_runs={}", examples.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample(run: u32, hash: Option<&str>) -> DriftSample {
        DriftSample {
            run,
            seed: u64::from(run),
            output_hash: hash.map(ToString::to_string),
            validated: None,
        }
    }

    #[test]
    fn identical_outputs_give_minimal_coefficient() {
        let report = DriftReport::from_samples(
            3,
            vec![sample(1, Some("a")), sample(2, Some("a")), sample(3, Some("a"))],
        );
        assert_eq!(report.unique_diffs, 1);
        assert!((report.drift_coefficient - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(report.example_unique_runs, vec![1]);
        assert_eq!(
            report.to_string(),
            "runs=3 unique_diffs=1 drift_coefficient=0.333 failures=0\nexample_unique_runs=1"
        );
    }

    #[test]
    fn failures_are_excluded_from_denominator() {
        let report = DriftReport::from_samples(
            4,
            vec![sample(1, None), sample(2, Some("a")), sample(3, Some("b")), sample(4, None)],
        );
        assert_eq!(report.failures, 2);
        assert_eq!(report.unique_diffs, 2);
        assert!((report.drift_coefficient - 1.0).abs() < f64::EPSILON);
        assert_eq!(report.example_unique_runs, vec![2, 3]);
    }

    #[test]
    fn all_failed_runs_give_zero() {
        let report = DriftReport::from_samples(2, vec![sample(1, None), sample(2, None)]);
        assert_eq!(report.drift_coefficient, 0.0);
        assert!(report.example_unique_runs.is_empty());
        assert_eq!(
            report.to_string(),
            "runs=2 unique_diffs=0 drift_coefficient=0.000 failures=2"
        );
    }

    #[test]
    fn examples_capped_at_five() {
        let samples = (1..=8)
            .map(|i| sample(i, Some(&format!("h{i}"))))
            .collect::<Vec<_>>();
        let report = DriftReport::from_samples(8, samples);
        assert_eq!(report.example_unique_runs, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn validation_tallies() {
        let mut samples = vec![sample(1, Some("a")), sample(2, Some("b")), sample(3, None)];
        samples[0].validated = Some(true);
        samples[1].validated = Some(false);
        let report = DriftReport::from_samples(3, samples);
        assert_eq!((report.passes, report.rejects), (Some(1), Some(1)));
        assert!(report.to_string().contains("validated passes=1 rejects=1"));
    }

    proptest! {
        #[test]
        fn coefficient_is_bounded(hashes in prop::collection::vec(prop::option::of(0u8..4), 0..20)) {
            let samples: Vec<DriftSample> = hashes
                .iter()
                .enumerate()
                .map(|(i, h)| DriftSample {
                    run: u32::try_from(i + 1).unwrap(),
                    seed: 0,
                    output_hash: h.map(|v| v.to_string()),
                    validated: None,
                })
                .collect();
            let runs = u32::try_from(samples.len()).unwrap();
            let report = DriftReport::from_samples(runs, samples);

            prop_assert!(report.drift_coefficient >= 0.0);
            prop_assert!(report.drift_coefficient <= 1.0);
            let successful = hashes.iter().filter(|h| h.is_some()).count();
            if successful > 1 && report.unique_diffs == successful {
                prop_assert!((report.drift_coefficient - 1.0).abs() < f64::EPSILON);
            }
        }
    }
}
