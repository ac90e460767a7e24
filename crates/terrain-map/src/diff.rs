//! Unified diffs between Map revisions

use similar::TextDiff;

/// Lines of context around each hunk
const CONTEXT_LINES: usize = 3;

/// Unified diff from `before` to `after`, both headed with `label`
///
/// Returns an empty string when the texts are identical, so "empty diff"
/// and "no drift" are the same test.
#[must_use]
pub fn unified_diff(before: &str, after: &str, label: &str) -> String {
    if before == after {
        return String::new();
    }

    TextDiff::from_lines(before, after)
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .header(label, label)
        .to_string()
}
