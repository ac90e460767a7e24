//! Rendering strategies for the Map block
//!
//! `Pass` is the only strategy that always yields a Map the Validator
//! accepts. The others deliberately inject one kind of error, and
//! `Stochastic` mixes rendering styles under a seeded generator.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use terrain_map::BlockEntry;
use terrain_model::Signature;

use crate::error::StrategyParseError;

/// Signature appended by [`Strategy::Extra`]
pub const INVENTED_SIGNATURE: &str = "invented()";

/// Probability that the stochastic strategy shuffles instead of sorting
const SHUFFLE_PROBABILITY: f64 = 0.4;

/// Probability that a stochastic bullet is followed by a blank line
const TRAILING_BLANK_PROBABILITY: f64 = 0.6;

/// How the Effector renders the extracted signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// One canonical bullet per signature, sorted
    Pass,
    /// Parameters annotated with guessed types (malformed claims)
    Typed,
    /// First signature listed twice
    Duplicate,
    /// Last signature dropped
    Missing,
    /// `invented()` appended
    Extra,
    /// Seeded mix of ordering, styles and spacing
    Stochastic(u64),
}

/// Variants cycled through in mock mode
const MOCK_VARIANTS: [Strategy; 5] = [
    Strategy::Pass,
    Strategy::Typed,
    Strategy::Duplicate,
    Strategy::Missing,
    Strategy::Extra,
];

impl Strategy {
    /// Deterministic error-injection variant for `seed`
    #[must_use]
    pub fn mock_variant(seed: u64) -> Self {
        // Index is < 5, the cast cannot truncate.
        #[allow(clippy::cast_possible_truncation)]
        let index = (seed % MOCK_VARIANTS.len() as u64) as usize;
        MOCK_VARIANTS[index]
    }

    /// Build from a CLI name and optional seed
    ///
    /// `stochastic` and `mock` use `seed`, defaulting to 0.
    ///
    /// # Errors
    /// [`StrategyParseError`] for an unknown name.
    pub fn from_name(name: &str, seed: Option<u64>) -> Result<Self, StrategyParseError> {
        let seed = seed.unwrap_or(0);
        match name {
            "pass" => Ok(Self::Pass),
            "typed" => Ok(Self::Typed),
            "duplicate" => Ok(Self::Duplicate),
            "missing" => Ok(Self::Missing),
            "extra" => Ok(Self::Extra),
            "stochastic" => Ok(Self::Stochastic(seed)),
            "mock" => Ok(Self::mock_variant(seed)),
            other => Err(StrategyParseError(other.to_string())),
        }
    }

    /// CLI name of the strategy
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Typed => "typed",
            Self::Duplicate => "duplicate",
            Self::Missing => "missing",
            Self::Extra => "extra",
            Self::Stochastic(_) => "stochastic",
        }
    }

    /// Command-line arguments that reproduce this strategy
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["--strategy".to_string(), self.name().to_string()];
        if let Self::Stochastic(seed) = self {
            args.push("--seed".to_string());
            args.push(seed.to_string());
        }
        args
    }

    /// Block entries for `signatures` (already sorted by canonical text)
    #[must_use]
    pub fn render(&self, signatures: &[Signature]) -> Vec<BlockEntry> {
        let plain = || {
            signatures
                .iter()
                .map(|s| BlockEntry::signature(s.canonical()))
                .collect::<Vec<_>>()
        };

        match self {
            Self::Pass => plain(),
            Self::Typed => signatures
                .iter()
                .map(|s| BlockEntry::signature(&typed(s)))
                .collect(),
            Self::Duplicate => {
                let mut entries = plain();
                if let Some(first) = entries.first().cloned() {
                    entries.insert(0, first);
                }
                entries
            }
            Self::Missing => {
                let mut entries = plain();
                entries.pop();
                entries
            }
            Self::Extra => {
                let mut entries = plain();
                entries.push(BlockEntry::signature(INVENTED_SIGNATURE));
                entries
            }
            Self::Stochastic(seed) => render_stochastic(*seed, signatures),
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stochastic(seed) => write!(f, "stochastic(seed={seed})"),
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Style {
    Plain,
    Typed,
    Described,
}

/// Plain appears twice so it is drawn half the time
const STYLES: [Style; 4] = [Style::Plain, Style::Typed, Style::Plain, Style::Described];

fn render_stochastic(seed: u64, signatures: &[Signature]) -> Vec<BlockEntry> {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut ordered: Vec<&Signature> = signatures.iter().collect();
    if rng.gen_bool(SHUFFLE_PROBABILITY) {
        ordered.shuffle(&mut rng);
    } else {
        ordered.sort_by(|a, b| a.name().cmp(b.name()));
    }

    ordered
        .into_iter()
        .map(|sig| {
            let style = STYLES.choose(&mut rng).copied().unwrap_or(Style::Plain);
            let bullet = match style {
                Style::Plain => format!("`{}`", sig.canonical()),
                Style::Typed => format!("`{}`", typed(sig)),
                Style::Described => format!("`{}` - {}", sig.canonical(), describe(sig.name())),
            };
            BlockEntry::raw(bullet, rng.gen_bool(TRAILING_BLANK_PROBABILITY))
        })
        .collect()
}

/// `name(a: T, b: U)` with guessed annotations
fn typed(sig: &Signature) -> String {
    let params: Vec<String> = sig
        .params()
        .iter()
        .map(|p| format!("{p}: {}", guess_type(p)))
        .collect();
    format!("{}({})", sig.name(), params.join(", "))
}

fn guess_type(param: &str) -> &'static str {
    let lower = param.to_ascii_lowercase();
    if lower.contains("country") {
        "str"
    } else if matches!(lower.as_str(), "amount" | "rate" | "tax" | "income") {
        "float"
    } else if matches!(lower.as_str(), "n" | "count" | "limit") {
        "int"
    } else {
        "Any"
    }
}

/// `calculate_tax` becomes `Calculate tax.`
fn describe(name: &str) -> String {
    let words = name.replace('_', " ").to_ascii_lowercase();
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => format!("{}{}.", first.to_ascii_uppercase(), chars.as_str()),
        None => ".".to_string(),
    }
}
