//! Block location, rendering and replacement

use once_cell::sync::Lazy;
use regex::Regex;
use terrain_model::PUBLIC_INTERFACES_HEADING;

use crate::error::MapError;

/// Backticked text containing a parenthesised part, e.g. `` `f(a, b)` ``
static CLAIM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"`([^`]+\([^`]*\))`").unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});

/// Prefix of a line that closes the block
const SECTION_PREFIX: &str = "## ";

/// Half-open line range `[start, end)` of the block, heading included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    /// Index of the heading line
    pub start: usize,
    /// Index of the first line after the block (line count at EOF)
    pub end: usize,
}

/// One bullet of a rendered block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockEntry {
    /// Text after `- `, without the line terminator
    pub bullet: String,
    /// Emit an empty line after the bullet
    pub trailing_blank: bool,
}

impl BlockEntry {
    /// Standard entry: backticked signature followed by a blank line
    #[must_use]
    pub fn signature(sig: &str) -> Self {
        Self {
            bullet: format!("`{sig}`"),
            trailing_blank: true,
        }
    }

    /// Free-form bullet text
    #[must_use]
    pub fn raw(bullet: impl Into<String>, trailing_blank: bool) -> Self {
        Self {
            bullet: bullet.into(),
            trailing_blank,
        }
    }
}

/// Codec for the block opened by a fixed heading line
#[derive(Debug, Clone)]
pub struct MapCodec {
    heading: String,
}

impl Default for MapCodec {
    fn default() -> Self {
        Self::new(PUBLIC_INTERFACES_HEADING)
    }
}

impl MapCodec {
    /// Codec for a custom heading
    #[must_use]
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
        }
    }

    /// Heading line this codec matches
    #[inline]
    #[must_use]
    pub fn heading(&self) -> &str {
        &self.heading
    }

    /// Locate the block
    ///
    /// # Errors
    /// [`MapError::HeadingNotFound`] when no line equals the heading after
    /// trailing-whitespace trim.
    pub fn locate(&self, text: &str) -> Result<BlockSpan, MapError> {
        let lines = split_lines(text);
        self.locate_in(&lines)
    }

    /// Whether the document has the heading at all
    #[must_use]
    pub fn has_heading(&self, text: &str) -> bool {
        self.locate(text).is_ok()
    }

    /// Block text, heading line included
    ///
    /// # Errors
    /// [`MapError::HeadingNotFound`]
    pub fn block<'a>(&self, text: &'a str) -> Result<&'a str, MapError> {
        let lines = split_lines(text);
        let span = self.locate_in(&lines)?;

        let offset = |index: usize| lines[..index].iter().map(|l| l.len()).sum::<usize>();
        Ok(&text[offset(span.start)..offset(span.end)])
    }

    /// Replace the block with the heading, a blank line and `entries`
    ///
    /// Everything before the heading and from the next section on is copied
    /// through byte for byte.
    ///
    /// # Errors
    /// [`MapError::HeadingNotFound`]
    pub fn replace(&self, text: &str, entries: &[BlockEntry]) -> Result<String, MapError> {
        let lines = split_lines(text);
        let span = self.locate_in(&lines)?;

        let mut out = String::with_capacity(text.len());
        out.extend(lines[..span.start].iter().copied());
        out.push_str(&self.render(entries));
        out.extend(lines[span.end..].iter().copied());
        Ok(out)
    }

    /// Replace the block with one standard bullet per signature, in order
    ///
    /// # Errors
    /// [`MapError::HeadingNotFound`]
    pub fn encode<S: AsRef<str>>(&self, text: &str, signatures: &[S]) -> Result<String, MapError> {
        let entries: Vec<BlockEntry> = signatures
            .iter()
            .map(|s| BlockEntry::signature(s.as_ref()))
            .collect();
        self.replace(text, &entries)
    }

    /// Rendered block text for `entries`
    #[must_use]
    pub fn render(&self, entries: &[BlockEntry]) -> String {
        let mut out = String::new();
        out.push_str(&self.heading);
        out.push_str("\n\n");
        for entry in entries {
            out.push_str("- ");
            out.push_str(&entry.bullet);
            out.push('\n');
            if entry.trailing_blank {
                out.push('\n');
            }
        }
        out
    }

    /// Every backticked, parenthesised claim in the block, in document order
    ///
    /// Claims are returned raw; grammar and duplicate checks are the caller's.
    ///
    /// # Errors
    /// [`MapError::HeadingNotFound`]
    pub fn claims(&self, text: &str) -> Result<Vec<String>, MapError> {
        let block = self.block(text)?;
        Ok(CLAIM_RE
            .captures_iter(block)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect())
    }

    fn locate_in(&self, lines: &[&str]) -> Result<BlockSpan, MapError> {
        let start = lines
            .iter()
            .position(|line| line.trim_end() == self.heading)
            .ok_or_else(|| MapError::HeadingNotFound {
                heading: self.heading.clone(),
            })?;

        let end = lines[start + 1..]
            .iter()
            .position(|line| line.starts_with(SECTION_PREFIX))
            .map_or(lines.len(), |offset| start + 1 + offset);

        Ok(BlockSpan { start, end })
    }
}

/// Lines with their terminators kept, so concatenation restores the input
fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = "\
# Title

## Public Interfaces

- `old(x)`

## Next

tail
";

    #[test]
    fn locate_finds_heading_and_next_section() {
        let span = MapCodec::default().locate(DOC).unwrap();
        assert_eq!(span, BlockSpan { start: 2, end: 6 });
    }

    #[test]
    fn heading_match_ignores_trailing_whitespace_only() {
        let codec = MapCodec::default();
        assert!(codec.has_heading("## Public Interfaces   \r\nbody\n"));
        assert!(!codec.has_heading("  ## Public Interfaces\n"));
        assert!(!codec.has_heading("## Public interfaces\n"));
        assert!(!codec.has_heading("### Public Interfaces\n"));
    }

    #[test]
    fn missing_heading_is_an_error() {
        let err = MapCodec::default().locate("# Nothing\n").unwrap_err();
        assert_eq!(
            err,
            MapError::HeadingNotFound {
                heading: "## Public Interfaces".to_string()
            }
        );
    }

    #[test]
    fn block_runs_to_eof_without_next_section() {
        let text = "# T\n## Public Interfaces\n- `a()`\n### Sub stays inside\n";
        let codec = MapCodec::default();
        assert_eq!(codec.locate(text).unwrap(), BlockSpan { start: 1, end: 4 });
        assert_eq!(
            codec.block(text).unwrap(),
            "## Public Interfaces\n- `a()`\n### Sub stays inside\n"
        );
    }

    #[test]
    fn encode_preserves_outside_bytes() {
        let out = MapCodec::default().encode(DOC, &["a(x)", "b()"]).unwrap();
        assert_eq!(
            out,
            "\
# Title

## Public Interfaces

- `a(x)`

- `b()`

## Next

tail
"
        );
    }

    #[test]
    fn encode_is_idempotent() {
        let codec = MapCodec::default();
        let once = codec.encode(DOC, &["a(x)"]).unwrap();
        let twice = codec.encode(&once, &["a(x)"]).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn heading_without_newline_at_eof() {
        let out = MapCodec::default()
            .encode("# T\n## Public Interfaces", &["f()"])
            .unwrap();
        assert_eq!(out, "# T\n## Public Interfaces\n\n- `f()`\n\n");
    }

    #[test]
    fn empty_signature_list_renders_heading_only() {
        let out = MapCodec::default().encode::<&str>(DOC, &[]).unwrap();
        assert!(out.contains("## Public Interfaces\n\n## Next\n"));
    }

    #[test]
    fn raw_entries_control_blank_lines() {
        let entries = vec![
            BlockEntry::raw("`a()` - Does a.", false),
            BlockEntry::raw("`b()`", true),
        ];
        let rendered = MapCodec::default().render(&entries);
        assert_eq!(rendered, "## Public Interfaces\n\n- `a()` - Does a.\n- `b()`\n\n");
    }

    #[test]
    fn claims_are_raw_and_ordered() {
        let text = "\
## Public Interfaces

- `b(x)`
- `a(y: int)` - described
- `not_a_claim`
- `b(x)`

## Other

- `outside(z)`
";
        let claims = MapCodec::default().claims(text).unwrap();
        assert_eq!(claims, vec!["b(x)", "a(y: int)", "b(x)"]);
    }

    #[test]
    fn custom_heading() {
        let codec = MapCodec::new("## API");
        let out = codec.encode("## API\nold\n", &["f()"]).unwrap();
        assert_eq!(out, "## API\n\n- `f()`\n\n");
    }
}
