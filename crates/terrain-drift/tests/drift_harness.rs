//! Drift measurement through the in-process runner

use async_trait::async_trait;
use terrain_drift::{measure, DriftConfig};
use terrain_salvage::{Captured, InProcessRunner, Invocation, StepRunner};
use terrain_test_utils::{Fixture, UNSYNCED_MAP};

#[tokio::test]
async fn stochastic_runs_are_reproducible_and_leave_map_alone() {
    let fixture = Fixture::tax_calculator();
    let runner = InProcessRunner::new();
    let config = DriftConfig::default().with_runs(12).with_base_seed(7);

    let first = measure(&runner, &fixture.src(), &fixture.doc(), &config)
        .await
        .unwrap();
    let second = measure(&runner, &fixture.src(), &fixture.doc(), &config)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.failures, 0);
    assert!(first.unique_diffs >= 1);
    assert!(first.drift_coefficient > 0.0 && first.drift_coefficient <= 1.0);
    assert_eq!(fixture.read_map(), UNSYNCED_MAP);
}

#[tokio::test]
async fn validated_runs_use_isolated_copies() {
    let fixture = Fixture::tax_calculator();
    let config = DriftConfig::default()
        .with_runs(5)
        .with_base_seed(0)
        .with_mock(true)
        .with_validate(true);

    let report = measure(&InProcessRunner::new(), &fixture.src(), &fixture.doc(), &config)
        .await
        .unwrap();

    // Seeds 1..=5 cycle through every mock variant; only Pass validates.
    assert_eq!(report.passes, Some(1));
    assert_eq!(report.rejects, Some(4));
    assert_eq!(report.unique_diffs, 5);
    assert!((report.drift_coefficient - 1.0).abs() < f64::EPSILON);
    assert_eq!(report.example_unique_runs, vec![1, 2, 3, 4, 5]);
    assert_eq!(fixture.read_map(), UNSYNCED_MAP);
}

#[tokio::test]
async fn identical_outputs_share_one_digest() {
    let fixture = Fixture::tax_calculator();
    // Seeds 5..=10: Pass, Typed, Duplicate, Missing, Extra, Pass.
    let config = DriftConfig::default()
        .with_runs(6)
        .with_base_seed(4)
        .with_mock(true);

    let report = measure(&InProcessRunner::new(), &fixture.src(), &fixture.doc(), &config)
        .await
        .unwrap();

    assert_eq!(report.samples[0].output_hash, report.samples[5].output_hash);
    assert_eq!(report.unique_diffs, 5);
    assert!((report.drift_coefficient - 5.0 / 6.0).abs() < 1e-9);
    assert_eq!(report.example_unique_runs, vec![1, 2, 3, 4, 5]);
}

/// Every step fails
struct BrokenRunner;

#[async_trait]
impl StepRunner for BrokenRunner {
    async fn run(&self, _invocation: &Invocation) -> Captured {
        Captured::failure("boom")
    }
}

#[tokio::test]
async fn failed_runs_are_counted_separately() {
    let fixture = Fixture::tax_calculator();
    let report = measure(
        &BrokenRunner,
        &fixture.src(),
        &fixture.doc(),
        &DriftConfig::default().with_runs(3),
    )
    .await
    .unwrap();

    assert_eq!(report.failures, 3);
    assert_eq!(report.unique_diffs, 0);
    assert_eq!(report.drift_coefficient, 0.0);
}
