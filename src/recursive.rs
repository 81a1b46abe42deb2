//! Recursive character splitting with overlap.
//!
//! Tries progressively finer separators until pieces fit within the size limit,
//! then stitches consecutive pieces together with a fixed character overlap.
//!
//! ## The Algorithm
//!
//! Given separators `["\n\n", "\n", ". ", " "]`, `chunk_size = 100` and
//! `chunk_overlap = 20`, each segment is cut into *bodies* of at most
//! `100 - 20 = 80` characters:
//!
//! ```text
//! 1. Split on "\n\n" (paragraphs), merging neighbours that fit in 80
//! 2. For each piece > 80 characters:
//!    - Split that piece on "\n" (lines)
//! 3. For each piece still > 80:
//!    - Split on ". " (sentences)
//! 4. For each piece still > 80:
//!    - Split on " " (words)
//! 5. Still > 80 and no separators left:
//!    - Emit the piece whole (a single oversized word)
//! ```
//!
//! A separator stays attached to the end of the piece it terminates, so the
//! bodies tile the segment exactly. An empty separator `""` in the list means
//! "hard cut at the limit"; cuts land on grapheme cluster boundaries so
//! Devanagari conjuncts and combining marks are never torn apart.
//!
//! ## Overlap
//!
//! Every chunk after the first in a segment starts with the last
//! `chunk_overlap` characters of the chunk before it:
//!
//! ```text
//! bodies:  [ body 0 ][ body 1 ][ body 2 ]
//! chunk 0: [ body 0 ]
//! chunk 1:      [tail][ body 1 ]
//! chunk 2:                [tail][ body 2 ]
//! ```
//!
//! Since a body is at most `chunk_size - chunk_overlap` characters, every
//! chunk built from fitting pieces is at most `chunk_size`. Only an atomic
//! piece (a word with no separator left to split it) can outgrow the budget.
//! Its tail is shortened to `chunk_size - len`, and a piece longer than
//! `chunk_size` gets no tail at all. Overlap never reaches back
//! into the previous segment.
//!
//! The tail is counted in `char`s, so with combining scripts it may begin on
//! a vowel sign. The repeated context is a copy; the source text itself is
//! only ever cut on grapheme boundaries.
//!
//! Sizes are counted in `char`s (Unicode scalar values), not bytes.

use std::ops::Range;

use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::{validate_sizes, DEFAULT_SEPARATORS};
use crate::{Chunk, ChunkOptions, Error, Metadata, Result, Segment};

/// Recursive character splitter.
///
/// Splits text using a hierarchy of separators, trying the coarsest first.
///
/// ## Example
///
/// ```rust
/// use charter::RecursiveChunker;
///
/// let chunker = RecursiveChunker::new(40, 8, &["\n\n", "\n", ". ", " "]).unwrap();
/// let text = "Article 1.\n\nThe Constitution is the fundamental law of Nepal.";
/// let chunks = chunker.chunk_text(text);
///
/// assert!(chunks.len() >= 2);
/// assert!(chunks.iter().all(|c| c.char_len() <= 40));
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveChunker {
    /// Create a new recursive chunker.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` - Maximum chunk length in characters
    /// * `chunk_overlap` - Characters repeated from the previous chunk
    /// * `separators` - Hierarchy of separators, coarsest first
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `chunk_size == 0`,
    /// `chunk_overlap >= chunk_size`, or `separators` is empty.
    pub fn new(chunk_size: usize, chunk_overlap: usize, separators: &[&str]) -> Result<Self> {
        validate_sizes(chunk_size, chunk_overlap)?;
        if separators.is_empty() {
            return Err(Error::NoSeparators);
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: separators.iter().map(|s| (*s).to_string()).collect(),
        })
    }

    /// Create a chunker with the default prose separators.
    ///
    /// # Errors
    ///
    /// As [`RecursiveChunker::new`].
    pub fn prose(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        Self::new(chunk_size, chunk_overlap, &DEFAULT_SEPARATORS)
    }

    /// Create a chunker from pipeline options.
    ///
    /// # Errors
    ///
    /// As [`ChunkOptions::validate`].
    pub fn from_options(options: &ChunkOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            chunk_size: options.chunk_size,
            chunk_overlap: options.chunk_overlap,
            separators: options.separators.clone(),
        })
    }

    /// Maximum chunk length in characters.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Overlap between consecutive chunks in characters.
    #[must_use]
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Chunk every segment, numbering chunks across the whole sequence.
    #[must_use]
    pub fn chunk_segments(&self, segments: &[Segment]) -> Vec<Chunk> {
        let mut chunks = Vec::with_capacity(self.estimate_chunks(
            segments.iter().map(|s| s.text.len()).sum(),
        ));
        for segment in segments {
            let before = chunks.len();
            self.chunk_into(
                &segment.text,
                segment.start,
                segment.index,
                &segment.metadata,
                &mut chunks,
            );
            debug!(
                segment = segment.index,
                chunks = chunks.len() - before,
                "chunked segment"
            );
        }
        chunks
    }

    /// Chunk plain text as a single segment with no heading metadata.
    ///
    /// Offsets are relative to `text`.
    #[must_use]
    pub fn chunk_text(&self, text: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        self.chunk_into(text, 0, 0, &Metadata::default(), &mut chunks);
        chunks
    }

    /// Estimate the number of chunks for a given text length.
    #[must_use]
    pub fn estimate_chunks(&self, text_len: usize) -> usize {
        (text_len / self.budget()).max(1)
    }

    /// Characters available to a chunk body once the overlap is reserved.
    fn budget(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }

    /// Overlap carried in front of a body of `body_len` characters.
    ///
    /// Only an atomic piece can exceed the budget; its overlap shrinks so the
    /// chunk still fits, down to none for a piece longer than `chunk_size`.
    fn overlap_for(&self, body_len: usize) -> usize {
        self.chunk_overlap.min(self.chunk_size.saturating_sub(body_len))
    }

    fn chunk_into(
        &self,
        text: &str,
        base: usize,
        segment: usize,
        metadata: &Metadata,
        chunks: &mut Vec<Chunk>,
    ) {
        if text.is_empty() {
            return;
        }

        let mut bodies = Vec::new();
        self.split_recursive(text, 0..text.len(), 0, &mut bodies);

        let mut previous: Option<Range<usize>> = None;
        for body in bodies {
            let start = match &previous {
                Some(prev) => {
                    let overlap = self.overlap_for(char_len(&text[body.clone()]));
                    prev.start + tail_offset(&text[prev.clone()], overlap)
                }
                None => body.start,
            };
            let range = start..body.end;
            chunks.push(Chunk {
                text: text[range.clone()].to_string(),
                start: base + range.start,
                end: base + range.end,
                index: chunks.len(),
                segment,
                metadata: metadata.clone(),
            });
            previous = Some(range);
        }
    }

    /// Cut `text[range]` into pieces of at most `budget` characters, appending
    /// them to `out` in order.
    fn split_recursive(
        &self,
        text: &str,
        range: Range<usize>,
        sep_index: usize,
        out: &mut Vec<Range<usize>>,
    ) {
        let budget = self.budget();
        if char_len(&text[range.clone()]) <= budget {
            out.push(range);
            return;
        }

        // Out of separators: the piece is atomic
        let Some(sep) = self.separators.get(sep_index) else {
            out.push(range);
            return;
        };
        if sep.is_empty() {
            self.force_split(text, range, out);
            return;
        }

        let parts = split_keep_separator(text, range.clone(), sep);
        if parts.len() == 1 {
            // Separator not found, try next one
            self.split_recursive(text, range, sep_index + 1, out);
            return;
        }

        let mut current: Option<(Range<usize>, usize)> = None;
        for part in parts {
            let part_len = char_len(&text[part.clone()]);
            current = match current {
                Some((cur, cur_len)) if cur_len + part_len <= budget => {
                    Some((cur.start..part.end, cur_len + part_len))
                }
                Some((cur, cur_len)) => {
                    self.flush(text, cur, cur_len, sep_index, out);
                    Some((part, part_len))
                }
                None => Some((part, part_len)),
            };
        }

        // Don't forget the last piece
        if let Some((cur, cur_len)) = current {
            self.flush(text, cur, cur_len, sep_index, out);
        }
    }

    fn flush(
        &self,
        text: &str,
        range: Range<usize>,
        len: usize,
        sep_index: usize,
        out: &mut Vec<Range<usize>>,
    ) {
        if len <= self.budget() {
            out.push(range);
        } else {
            // Too big, recurse with finer separator
            self.split_recursive(text, range, sep_index + 1, out);
        }
    }

    /// Hard cut at the character budget, never inside a grapheme cluster.
    ///
    /// A single cluster longer than the budget becomes its own piece.
    fn force_split(&self, text: &str, range: Range<usize>, out: &mut Vec<Range<usize>>) {
        let budget = self.budget();
        let mut piece_start = range.start;
        let mut piece_len = 0;

        for (offset, grapheme) in text[range.clone()].grapheme_indices(true) {
            let at = range.start + offset;
            let len = grapheme.chars().count();
            if piece_len > 0 && piece_len + len > budget {
                out.push(piece_start..at);
                piece_start = at;
                piece_len = 0;
            }
            piece_len += len;
        }

        if piece_start < range.end {
            out.push(piece_start..range.end);
        }
    }
}

impl Default for RecursiveChunker {
    fn default() -> Self {
        let options = ChunkOptions::default();
        Self {
            chunk_size: options.chunk_size,
            chunk_overlap: options.chunk_overlap,
            separators: options.separators,
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset in `s` where its last `n` characters begin.
fn tail_offset(s: &str, n: usize) -> usize {
    if n == 0 {
        return s.len();
    }
    s.char_indices().rev().nth(n - 1).map_or(0, |(i, _)| i)
}

/// Split `text[range]` on `sep`, keeping each separator on the end of the
/// piece before it. The pieces tile the range exactly.
fn split_keep_separator(text: &str, range: Range<usize>, sep: &str) -> Vec<Range<usize>> {
    let span = &text[range.clone()];
    let mut parts = Vec::new();
    let mut start = 0;

    for (pos, matched) in span.match_indices(sep) {
        let end = pos + matched.len();
        parts.push(range.start + start..range.start + end);
        start = end;
    }
    if start < span.len() {
        parts.push(range.start + start..range.end);
    }
    parts
}
