//! The Chunk type: a bounded piece of a document with its heading provenance.

use serde::Serialize;

use crate::Metadata;

/// A chunk of text with its position in the source document and the headings
/// it was found under.
///
/// Chunks are what gets embedded, indexed, and retrieved. Each one carries
/// everything a downstream index needs: the text, the heading metadata of
/// the segment it came from, and its position in the sequence.
///
/// ## Byte Offsets
///
/// `start` and `end` are byte offsets into the original document, not
/// character indices, matching Rust's string slicing semantics. For every
/// chunk produced by the pipeline, `&document[chunk.start..chunk.end]`
/// equals `chunk.text`.
///
/// ## Overlap Handling
///
/// Consecutive chunks from the same segment share `chunk_overlap` characters:
///
/// ```text
/// Segment: "Article 1. Nepal is a federal republic."
/// Chunk 0: "Article 1. Nepal is "        [0..20]
/// Chunk 1: "l is a federal republic."    [15..39]
///           ^^^^^
///           overlap copied from the tail of chunk 0
/// ```
///
/// The first chunk of a segment never carries text from the previous segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// The chunk text.
    pub text: String,
    /// Byte offset where this chunk starts in the original document.
    pub start: usize,
    /// Byte offset where this chunk ends (exclusive) in the original document.
    pub end: usize,
    /// Zero-based index of this chunk across the whole document.
    pub index: usize,
    /// Index of the segment this chunk was cut from.
    pub segment: usize,
    /// Heading labels active where this chunk's segment begins.
    pub metadata: Metadata,
}

impl Chunk {
    /// The length of this chunk in characters.
    ///
    /// This is the unit `chunk_size` and `chunk_overlap` are measured in.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// The length of this chunk in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether this chunk is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The byte span of this chunk in the original document.
    #[must_use]
    pub fn span(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl std::fmt::Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunk {{ index: {}, segment: {}, span: {}..{}, chars: {} }}",
            self.index,
            self.segment,
            self.start,
            self.end,
            self.char_len()
        )
    }
}
