//! Lenient, pattern-based extraction
//!
//! Reads each source line independently and only recognises single-line
//! `def` statements at column zero. Formatting noise is tolerated and
//! anything unrecognisable is skipped, so this extractor never fails.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use terrain_model::Signature;

use crate::source::python_sources;

static DEF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^def\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*\((?P<args>[^)]*)\)\s*(?:->\s*[^:]+)?\s*:",
    )
    .unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});

/// Best-effort extractor used on the Effector side
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientExtractor;

impl LenientExtractor {
    /// Create new lenient extractor
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Extract sorted, deduplicated signatures from every `.py` file under `root`
    #[must_use]
    pub fn extract(&self, root: &Path) -> Vec<Signature> {
        let mut signatures = BTreeSet::new();

        for path in python_sources(root) {
            match std::fs::read_to_string(&path) {
                Ok(source) => signatures.extend(self.extract_source(&source)),
                Err(err) => {
                    tracing::warn!("lenient extractor skipping {}: {}", path.display(), err);
                }
            }
        }

        signatures.into_iter().collect()
    }

    /// Extract signatures from one source text, in line order
    #[must_use]
    pub fn extract_source(&self, source: &str) -> Vec<Signature> {
        source
            .lines()
            .filter_map(Self::parse_line)
            .collect()
    }

    fn parse_line(line: &str) -> Option<Signature> {
        let caps = DEF_RE.captures(line)?;
        let name = caps.name("name")?.as_str();
        if name.starts_with('_') {
            return None;
        }

        let params: Vec<&str> = caps
            .name("args")?
            .as_str()
            .split(',')
            .filter_map(clean_param)
            .collect();

        match Signature::new(name, params) {
            Ok(sig) => Some(sig),
            Err(err) => {
                tracing::debug!("lenient extractor skipping line {:?}: {}", line, err);
                None
            }
        }
    }
}

/// Reduce a raw parameter to its bare name
///
/// Drops bare `*` and `/` markers, leading `*`/`**`, annotations and defaults.
fn clean_param(raw: &str) -> Option<&str> {
    let param = raw.trim();
    if param.is_empty() || param == "*" || param == "/" {
        return None;
    }

    let param = param.trim_start_matches('*');
    let param = param.split(':').next().unwrap_or(param);
    let param = param.split('=').next().unwrap_or(param);
    let param = param.trim();

    (!param.is_empty()).then_some(param)
}
