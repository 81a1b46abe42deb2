//! Header-aware segmentation of markdown.
//!
//! The first pass of the pipeline. A converted constitution is organised as
//! parts, chapters, and articles; splitting on those headings first means no
//! chunk ever straddles two articles, and every chunk knows where it lives.
//!
//! ## How It Works
//!
//! ```text
//! rules: [("#", "Part"), ("##", "Article")]
//!
//! Preamble text.                 -> segment 0  {}
//! # Part 1 Fundamental Rights    -> segment 1  {Part: "Part 1 Fundamental Rights"}
//! Intro to part 1.
//! ## Article 16 Right to live    -> segment 2  {Part: "Part 1 ...", Article: "Article 16 ..."}
//! Every person has ...
//! # Part 2 Citizenship           -> segment 3  {Part: "Part 2 Citizenship"}
//! ```
//!
//! A heading clears every deeper level, so segment 3 no longer carries
//! `Article`. Headings whose marker is not configured (`###` with the rules
//! above) are ordinary body text.
//!
//! ## Code Fences
//!
//! Lines inside fenced blocks (```` ``` ```` or `~~~`) are never headings.
//! Legal texts quote formatted material, and a `#` inside a quoted block is
//! not structure.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::{Document, Error, Result};

/// A heading marker and the label its text is recorded under.
///
/// The marker is a run of `#` characters; its length is the heading level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRule {
    /// Heading prefix, e.g. `"##"`.
    pub marker: String,
    /// Metadata key, e.g. `"Article"`.
    pub label: String,
}

impl HeaderRule {
    /// Create a rule.
    #[must_use]
    pub fn new(marker: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            label: label.into(),
        }
    }

    /// Heading depth: the number of `#` in the marker.
    #[must_use]
    pub fn level(&self) -> usize {
        self.marker.len()
    }

    /// Check the marker is a non-empty run of `#`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeaderMarker`] otherwise.
    pub fn validate(&self) -> Result<()> {
        if self.marker.is_empty() || !self.marker.bytes().all(|b| b == b'#') {
            return Err(Error::InvalidHeaderMarker {
                marker: self.marker.clone(),
                label: self.label.clone(),
            });
        }
        Ok(())
    }

    /// The heading text if `line` (already trimmed) is a heading of this rule.
    fn matches<'a>(&self, line: &'a str) -> Option<&'a str> {
        let rest = line.strip_prefix(self.marker.as_str())?;
        if rest.starts_with([' ', '\t']) {
            Some(rest.trim())
        } else {
            None
        }
    }
}

impl From<(&str, &str)> for HeaderRule {
    fn from((marker, label): (&str, &str)) -> Self {
        Self::new(marker, label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Heading {
    level: usize,
    label: String,
    text: String,
}

/// Ordered heading labels in effect at a point in the document.
///
/// Entries are kept outermost first. Serializes as a map from label to
/// heading text, in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    headings: Vec<Heading>,
}

impl Metadata {
    /// The heading text recorded under `label`.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&str> {
        self.headings
            .iter()
            .rev()
            .find(|h| h.label == label)
            .map(|h| h.text.as_str())
    }

    /// `(label, text)` pairs, outermost heading first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headings
            .iter()
            .map(|h| (h.label.as_str(), h.text.as_str()))
    }

    /// Number of active headings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.headings.len()
    }

    /// Whether no heading is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }

    /// Record a heading, dropping any active heading at the same or deeper level.
    pub(crate) fn enter(&mut self, level: usize, label: &str, text: &str) {
        self.headings.retain(|h| h.level < level);
        self.headings.push(Heading {
            level,
            label: label.to_string(),
            text: text.to_string(),
        });
    }
}

impl Serialize for Metadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.headings.len()))?;
        for (label, text) in self.iter() {
            map.serialize_entry(label, text)?;
        }
        map.end()
    }
}

/// A structural section of the document delimited by headings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Section text, trimmed of surrounding whitespace.
    pub text: String,
    /// Byte offset of `text` in the original document.
    pub start: usize,
    /// Byte offset where `text` ends (exclusive).
    pub end: usize,
    /// Zero-based position among the document's segments.
    pub index: usize,
    /// Headings active for this section.
    pub metadata: Metadata,
}

/// Splits markdown into [`Segment`]s at configured heading levels.
///
/// ## Example
///
/// ```rust
/// use charter::{HeaderRule, HeaderSplitter};
///
/// let splitter = HeaderSplitter::new(vec![HeaderRule::new("#", "Part")], false).unwrap();
/// let segments = splitter.split("# Part 1\nArticle 1.\n\n# Part 2\nArticle 2.");
///
/// assert_eq!(segments.len(), 2);
/// assert_eq!(segments[1].metadata.get("Part"), Some("Part 2"));
/// assert!(segments[1].text.starts_with("# Part 2"));
/// ```
#[derive(Debug, Clone)]
pub struct HeaderSplitter {
    rules: Vec<HeaderRule>,
    strip_headers: bool,
}

impl HeaderSplitter {
    /// Create a splitter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeaderMarker`] if any rule's marker is not a run of `#`.
    pub fn new(rules: Vec<HeaderRule>, strip_headers: bool) -> Result<Self> {
        for rule in &rules {
            rule.validate()?;
        }
        Ok(Self {
            rules,
            strip_headers,
        })
    }

    /// The configured rules, in matching order.
    #[must_use]
    pub fn rules(&self) -> &[HeaderRule] {
        &self.rules
    }

    /// Split a loaded document.
    #[must_use]
    pub fn split_document(&self, document: &Document) -> Vec<Segment> {
        self.split(document.text())
    }

    /// Split raw markdown.
    ///
    /// Never fails: text without any configured heading becomes a single
    /// segment, and empty or whitespace-only text yields no segments.
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut metadata = Metadata::default();
        let mut fence: Option<Fence> = None;
        let mut segment_start = 0;
        let mut offset = 0;

        for line in text.split_inclusive('\n') {
            let line_start = offset;
            offset += line.len();
            let trimmed = line.trim();

            if let Some(open) = fence {
                if open.closed_by(trimmed) {
                    fence = None;
                }
                continue;
            }
            if let Some(open) = Fence::opened_by(trimmed) {
                fence = Some(open);
                continue;
            }

            let Some((rule, heading)) = self
                .rules
                .iter()
                .find_map(|rule| rule.matches(trimmed).map(|h| (rule, h)))
            else {
                continue;
            };

            push_segment(&mut segments, text, segment_start, line_start, &metadata);
            metadata.enter(rule.level(), &rule.label, heading);
            segment_start = if self.strip_headers { offset } else { line_start };
        }

        push_segment(&mut segments, text, segment_start, text.len(), &metadata);
        segments
    }
}

impl Default for HeaderSplitter {
    fn default() -> Self {
        Self {
            rules: vec![HeaderRule::new("#", "Part")],
            strip_headers: false,
        }
    }
}

/// Close `text[start..end]` as a segment unless it is only whitespace.
fn push_segment(
    segments: &mut Vec<Segment>,
    text: &str,
    start: usize,
    end: usize,
    metadata: &Metadata,
) {
    let span = &text[start..end];
    let body = span.trim();
    if body.is_empty() {
        return;
    }
    let leading_ws = span.len() - span.trim_start().len();
    let start = start + leading_ws;
    segments.push(Segment {
        text: body.to_string(),
        start,
        end: start + body.len(),
        index: segments.len(),
        metadata: metadata.clone(),
    });
}

/// An open fenced code block.
#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: u8,
    len: usize,
}

impl Fence {
    fn opened_by(line: &str) -> Option<Self> {
        let marker = *line.as_bytes().first()?;
        if marker != b'`' && marker != b'~' {
            return None;
        }
        let len = line.bytes().take_while(|&b| b == marker).count();
        (len >= 3).then_some(Self { marker, len })
    }

    /// A fence closes on a bare run of the same character at least as long.
    /// A run followed by an info string (```` ```python ````) is content.
    fn closed_by(&self, line: &str) -> bool {
        line.len() >= self.len && line.bytes().all(|b| b == self.marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter(rules: &[(&str, &str)], strip: bool) -> HeaderSplitter {
        HeaderSplitter::new(rules.iter().map(|&r| r.into()).collect(), strip).unwrap()
    }

    #[test]
    fn test_two_parts() {
        let text = "# Part 1\nArticle 1 text...\n\n# Part 2\nArticle 2 text...";
        let segments = splitter(&[("#", "Part")], false).split(text);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "# Part 1\nArticle 1 text...");
        assert_eq!(segments[0].metadata.get("Part"), Some("Part 1"));
        assert_eq!(segments[1].text, "# Part 2\nArticle 2 text...");
        assert_eq!(segments[1].metadata.get("Part"), Some("Part 2"));
    }

    #[test]
    fn test_strip_headers() {
        let text = "# Part 1\nArticle 1 text.\n# Part 2\nArticle 2 text.";
        let segments = splitter(&[("#", "Part")], true).split(text);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Article 1 text.");
        assert_eq!(segments[1].text, "Article 2 text.");
        assert_eq!(segments[1].metadata.get("Part"), Some("Part 2"));
    }

    #[test]
    fn test_offsets_point_into_source() {
        let text = "Preamble.\n\n# Part 1\n\n  Body one.\n# Part 2\nBody two.\n";
        for strip in [false, true] {
            for segment in splitter(&[("#", "Part")], strip).split(text) {
                assert_eq!(&text[segment.start..segment.end], segment.text);
            }
        }
    }

    #[test]
    fn test_leading_content_has_empty_metadata() {
        let segments = splitter(&[("#", "Part")], false).split("Preamble.\n# Part 1\nBody.");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Preamble.");
        assert!(segments[0].metadata.is_empty());
    }

    #[test]
    fn test_no_headings_single_segment() {
        let text = "We, the sovereign people of Nepal,\n\ninternalizing the rights.";
        let segments = splitter(&[("#", "Part")], false).split(text);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, text);
        assert!(segments[0].metadata.is_empty());
    }

    #[test]
    fn test_empty_text() {
        let splitter = HeaderSplitter::default();
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("  \n\n\t").is_empty());
    }

    #[test]
    fn test_hierarchy_accumulates_and_resets() {
        let text = "# Part 1\n## Article 1\nOne.\n## Article 2\nTwo.\n# Part 2\nThree.";
        let segments = splitter(&[("#", "Part"), ("##", "Article")], true).split(text);

        assert_eq!(segments.len(), 3);
        let pairs: Vec<_> = segments[0].metadata.iter().collect();
        assert_eq!(pairs, vec![("Part", "Part 1"), ("Article", "Article 1")]);
        assert_eq!(segments[1].metadata.get("Article"), Some("Article 2"));
        assert_eq!(segments[1].metadata.get("Part"), Some("Part 1"));
        assert_eq!(segments[2].metadata.get("Part"), Some("Part 2"));
        assert_eq!(segments[2].metadata.get("Article"), None);
    }

    #[test]
    fn test_unconfigured_levels_are_body() {
        let text = "# Part 1\n### Schedule\nBody.";
        let segments = splitter(&[("#", "Part")], false).split(text);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].text.contains("### Schedule"));
    }

    #[test]
    fn test_marker_needs_space() {
        let text = "#hashtag is not a heading\n# Part 1\nBody.";
        let segments = splitter(&[("#", "Part")], false).split(text);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "#hashtag is not a heading");
    }

    #[test]
    fn test_headings_inside_code_fence_ignored() {
        let text = "# Part 1\n```\n# not a heading\n```\nAfter.\n~~~~\n# also quoted\n```\n~~~~\n# Part 2\nEnd.";
        let segments = splitter(&[("#", "Part")], false).split(text);

        assert_eq!(segments.len(), 2);
        assert!(segments[0].text.contains("# not a heading"));
        assert!(segments[0].text.contains("# also quoted"));
        assert_eq!(segments[1].metadata.get("Part"), Some("Part 2"));
    }

    #[test]
    fn test_info_string_does_not_close_fence() {
        let text = "# Part 1\n```\nquoted\n```python\n# not a heading\n```  \nafter\n# Part 2\nEnd.";
        let segments = splitter(&[("#", "Part")], false).split(text);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].metadata.get("Part"), Some("Part 1"));
        assert!(segments[0].text.contains("# not a heading"));
        assert!(segments[0].text.ends_with("after"));
        // The bare closing run ends the block, so later headings still count
        assert_eq!(segments[1].metadata.get("Part"), Some("Part 2"));
    }

    #[test]
    fn test_consecutive_headings_stripped_skip_empty_segment() {
        let text = "# Part 1\n## Article 1\nBody.";
        let segments = splitter(&[("#", "Part"), ("##", "Article")], true).split(text);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].metadata.len(), 2);
        assert_eq!(segments[0].index, 0);
    }

    #[test]
    fn test_rule_validation() {
        assert!(HeaderSplitter::new(vec![HeaderRule::new("", "Part")], false).is_err());
        assert!(HeaderSplitter::new(vec![HeaderRule::new("#-", "Part")], false).is_err());
        assert_eq!(HeaderRule::new("###", "Section").level(), 3);
    }

    #[test]
    fn test_metadata_serializes_in_heading_order() {
        let mut metadata = Metadata::default();
        metadata.enter(1, "Part", "Part 3");
        metadata.enter(2, "Article", "Article 51");
        let json = serde_json::to_string(&metadata).unwrap();
        assert_eq!(json, r#"{"Part":"Part 3","Article":"Article 51"}"#);
    }
}
