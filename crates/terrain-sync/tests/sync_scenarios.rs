//! End-to-end Effector/Validator scenarios on a temp Terrain and Map

use terrain_model::ErrorCode;
use terrain_sync::{ApplyMode, EffectRequest, Effector, Strategy, Validator};
use terrain_test_utils::{Fixture, SYNCED_MAP, TAX_SIGNATURES};

fn apply(fixture: &Fixture, strategy: Strategy) {
    let request = EffectRequest::new(fixture.src(), fixture.doc())
        .with_strategy(strategy)
        .with_mode(ApplyMode::Apply);
    Effector::new().run(&request).unwrap();
}

fn validate(fixture: &Fixture) -> terrain_sync::ValidationReport {
    Validator::new()
        .validate(&fixture.src(), &fixture.doc())
        .unwrap()
}

#[test]
fn pass_apply_then_validate_succeeds() {
    let fixture = Fixture::tax_calculator();
    apply(&fixture, Strategy::Pass);

    let text = fixture.read_map();
    for sig in TAX_SIGNATURES {
        assert!(text.contains(&format!("- `{sig}`")));
    }
    assert!(!text.contains("stale_function"));

    let report = validate(&fixture);
    assert!(report.passed(), "{:?}", report.findings);
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn duplicated_bullet_fails_with_duplicate_signature() {
    let fixture = Fixture::tax_calculator();
    apply(&fixture, Strategy::Duplicate);

    let report = validate(&fixture);
    assert_eq!(report.exit_code(), 1);
    assert_eq!(
        report.with_code(ErrorCode::DuplicateSignature).count(),
        1,
        "{:?}",
        report.findings
    );
}

#[test]
fn each_error_injecting_strategy_is_rejected() {
    let cases = [
        (Strategy::Typed, ErrorCode::MalformedSignature),
        (Strategy::Duplicate, ErrorCode::DuplicateSignature),
        (Strategy::Missing, ErrorCode::MissingInMap),
        (Strategy::Extra, ErrorCode::ExtraInMap),
    ];

    for (strategy, expected) in cases {
        let fixture = Fixture::tax_calculator();
        apply(&fixture, strategy);
        let report = validate(&fixture);
        assert!(
            report.with_code(expected).count() >= 1,
            "{strategy}: {:?}",
            report.findings
        );
    }
}

#[test]
fn pass_on_synced_map_is_a_no_op() {
    let fixture = Fixture::tax_calculator();
    fixture.write_map(SYNCED_MAP);

    let outcome = Effector::new()
        .run(
            &EffectRequest::new(fixture.src(), fixture.doc()).with_mode(ApplyMode::Apply),
        )
        .unwrap();

    assert!(outcome.proposal.diff.is_empty());
    assert!(!outcome.applied);
    assert_eq!(fixture.read_map(), SYNCED_MAP);
}

#[test]
fn effector_applies_even_when_strict_terrain_is_invalid() {
    let fixture = Fixture::tax_calculator();
    fixture.write_source("varargs.py", "def collect(*items):\n    return items\n");
    apply(&fixture, Strategy::Pass);

    assert!(fixture.read_map().contains("- `collect(items)`"));
    let report = validate(&fixture);
    assert!(report.with_code(ErrorCode::TerrainInvalid).count() >= 1);
}
