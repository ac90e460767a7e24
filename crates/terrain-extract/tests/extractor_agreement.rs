//! Lenient vs strict extraction over on-disk Terrains
//!
//! The two extractors must agree on plain sources and are expected to
//! disagree, in a fixed way, on shapes only the lenient side normalises.

use terrain_extract::{ExtractError, LenientExtractor, ParamShape, StrictExtractor, TerrainIssue};
use terrain_model::Signature;
use terrain_test_utils::{Fixture, TAX_CALCULATOR_SOURCE, TAX_SIGNATURES};

fn canon(sigs: &[Signature]) -> Vec<String> {
    sigs.iter().map(|s| s.canonical().to_string()).collect()
}

#[test]
fn extractors_agree_on_tax_calculator() {
    let fixture = Fixture::tax_calculator();

    let lenient = LenientExtractor::new().extract(&fixture.src());
    let strict = StrictExtractor::new().extract(&fixture.src()).unwrap();

    assert_eq!(canon(&strict), TAX_SIGNATURES.to_vec());
    assert_eq!(lenient, strict);
}

#[test]
fn output_is_sorted_across_files() {
    let fixture = Fixture::new("");
    fixture.write_source("z_mod.py", "def alpha(x):\n    pass\n");
    fixture.write_source("a_mod.py", "def zeta(y):\n    pass\n");
    fixture.write_source("pkg/inner.py", "def middle():\n    pass\n");

    let strict = StrictExtractor::new().extract(&fixture.src()).unwrap();
    assert_eq!(canon(&strict), vec!["alpha(x)", "middle()", "zeta(y)"]);
    assert_eq!(LenientExtractor::new().extract(&fixture.src()), strict);
}

#[test]
fn variadic_shapes_split_the_extractors() {
    let fixture = Fixture::new("");
    fixture.write_source("tax_calculator.py", TAX_CALCULATOR_SOURCE);
    fixture.write_source("extra.py", "def log_all(*messages, sep=\" \"):\n    pass\n");

    let lenient = LenientExtractor::new().extract(&fixture.src());
    assert!(canon(&lenient).contains(&"log_all(messages, sep)".to_string()));

    let err = StrictExtractor::new().extract(&fixture.src()).unwrap_err();
    let issues = err.issues();
    assert_eq!(issues.len(), 1);
    assert!(matches!(
        &issues[0],
        TerrainIssue::Unsupported { function, shape: ParamShape::VarPositional, .. } if function == "log_all"
    ));
}

#[test]
fn cross_file_duplicates_fail_strict_only() {
    let fixture = Fixture::new("");
    fixture.write_source("a.py", "def shared(x):\n    pass\n");
    fixture.write_source("b.py", "def shared(x: int = 0):\n    pass\n");

    assert_eq!(canon(&LenientExtractor::new().extract(&fixture.src())), vec!["shared(x)"]);

    match StrictExtractor::new().extract(&fixture.src()) {
        Err(ExtractError::TerrainInvalid { issues }) => {
            assert_eq!(issues.len(), 1);
            match &issues[0] {
                TerrainIssue::Duplicate { signature, paths } => {
                    assert_eq!(signature, "shared(x)");
                    assert_eq!(paths.len(), 2);
                }
                other => panic!("unexpected issue: {other:?}"),
            }
        }
        other => panic!("expected TerrainInvalid, got {other:?}"),
    }
}

#[test]
fn strict_collects_issues_from_every_file() {
    let fixture = Fixture::new("");
    fixture.write_source("a.py", "def kw(a, *, b):\n    pass\n");
    fixture.write_source("b.py", "def pos(a, /):\n    pass\n");
    fixture.write_source("c.py", "def broken(:\n");

    let err = StrictExtractor::new().extract(&fixture.src()).unwrap_err();
    assert_eq!(err.issues().len(), 3);
}

#[test]
fn empty_terrain_is_valid() {
    let fixture = Fixture::new("");
    assert!(StrictExtractor::new().extract(&fixture.src()).unwrap().is_empty());
    assert!(LenientExtractor::new().extract(&fixture.src()).is_empty());
}
