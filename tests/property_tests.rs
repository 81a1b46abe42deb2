//! Property-based tests for the chunking pipeline.
//!
//! These tests verify that chunking maintains key invariants:
//! - Coverage: segments reconstruct the input, chunks tile their segment
//! - Size: chunks stay within `chunk_size` unless a single word does not fit
//! - Overlap: consecutive chunks of a segment share exactly `chunk_overlap` chars,
//!   less only where a long word needs the room
//! - Isolation: no chunk carries text from a previous segment
//! - Provenance: chunk text matches its span, metadata matches its segment

use charter::{Chunk, ChunkOptions, ChunkPipeline, Document, HeaderRule, Segment};
use proptest::prelude::*;

// =============================================================================
// Test Generators
// =============================================================================

/// Words joined by separators of every priority.
fn body_text() -> impl Strategy<Value = String> {
    words_up_to(12)
}

/// Like [`body_text`], with words of up to `max_word` characters.
fn words_up_to(max_word: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(
        (
            prop::string::string_regex(&format!("[A-Za-z0-9]{{1,{max_word}}}")).unwrap(),
            prop::sample::select(vec![" ", " ", " ", ". ", "\n", "\n\n"]),
        ),
        1..40,
    )
    .prop_map(|words| {
        let mut result = String::new();
        for (word, sep) in words {
            result.push_str(&word);
            result.push_str(sep);
        }
        result
    })
}

/// Markdown with `#` and `##` headings between bodies.
fn markdown() -> impl Strategy<Value = String> {
    prop::collection::vec(
        (
            prop::option::of((
                prop::sample::select(vec!["#", "##", "###"]),
                prop::string::string_regex("[A-Za-z0-9]{1,10}").unwrap(),
            )),
            body_text(),
        ),
        1..8,
    )
    .prop_map(|blocks| {
        let mut result = String::new();
        for (heading, body) in blocks {
            if let Some((marker, title)) = heading {
                result.push_str(&format!("{marker} {title}\n"));
            }
            result.push_str(&body);
            result.push('\n');
        }
        result
    })
}

fn pipeline(size: usize, overlap: usize, strip: bool) -> ChunkPipeline {
    ChunkPipeline::new(
        ChunkOptions::default()
            .with_chunk_size(size)
            .with_chunk_overlap(overlap)
            .with_headers(vec![HeaderRule::new("#", "Part"), HeaderRule::new("##", "Article")])
            .with_strip_headers(strip),
    )
    .unwrap()
}

// =============================================================================
// Invariant Helpers
// =============================================================================

fn without_whitespace(s: &str) -> String {
    s.split_whitespace().collect()
}

fn last_chars(s: &str, n: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    chars[chars.len().saturating_sub(n)..].iter().collect()
}

fn first_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// A token is a word plus the whitespace character that ends it, the
/// smallest piece the chunker can emit once its separators run out.
fn has_token_longer_than(s: &str, n: usize) -> bool {
    s.split_inclusive(char::is_whitespace)
        .any(|t| t.chars().count() > n)
}

fn chunks_of<'a>(chunks: &'a [Chunk], segment: &Segment) -> Vec<&'a Chunk> {
    chunks.iter().filter(|c| c.segment == segment.index).collect()
}

// =============================================================================
// Header Splitter
// =============================================================================

proptest! {
    #[test]
    fn segments_reconstruct_input(text in markdown()) {
        let doc = Document::new("prop.md", text.clone());
        let segments = pipeline(100, 10, false).segments(&doc);

        let rebuilt: String = segments.iter().map(|s| without_whitespace(&s.text)).collect();
        prop_assert_eq!(rebuilt, without_whitespace(&text));
    }

    #[test]
    fn segments_are_ordered_source_spans(text in markdown(), strip in any::<bool>()) {
        let doc = Document::new("prop.md", text.clone());
        let segments = pipeline(100, 10, strip).segments(&doc);

        for (i, segment) in segments.iter().enumerate() {
            prop_assert_eq!(segment.index, i);
            prop_assert_eq!(&text[segment.start..segment.end], segment.text.as_str());
        }
        for pair in segments.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
        }
    }
}

// =============================================================================
// Recursive Chunker
// =============================================================================

proptest! {
    #[test]
    fn chunks_respect_size(
        text in markdown(),
        (size, overlap) in (30usize..200).prop_flat_map(|size| (Just(size), 0..size)),
    ) {
        let doc = Document::new("prop.md", text);
        for chunk in pipeline(size, overlap, false).run_document(&doc) {
            prop_assert!(
                chunk.char_len() <= size,
                "chunk of {} chars exceeds {}: {:?}",
                chunk.char_len(),
                size,
                chunk.text
            );
        }
    }

    #[test]
    fn only_oversized_words_exceed_size(
        text in words_up_to(40),
        (size, overlap) in (10usize..60).prop_flat_map(|size| (Just(size), 0..size)),
    ) {
        let doc = Document::new("prop.md", text);
        for chunk in pipeline(size, overlap, false).run_document(&doc) {
            if has_token_longer_than(&chunk.text, size) {
                continue;
            }
            prop_assert!(
                chunk.char_len() <= size,
                "chunk of {} chars exceeds {}: {:?}",
                chunk.char_len(),
                size,
                chunk.text
            );
        }
    }

    #[test]
    fn consecutive_chunks_overlap_exactly(
        text in markdown(),
        size in 30usize..120,
        overlap in 1usize..14,
    ) {
        let doc = Document::new("prop.md", text);
        let chunks = pipeline(size, overlap, false).run_document(&doc);

        for pair in chunks.windows(2) {
            if pair[0].segment != pair[1].segment {
                continue;
            }
            let shared = overlap.min(pair[0].char_len());
            prop_assert_eq!(
                last_chars(&pair[0].text, shared),
                first_chars(&pair[1].text, shared)
            );
        }
    }

    #[test]
    fn long_words_shorten_the_overlap(
        text in words_up_to(40),
        (size, overlap) in (10usize..60).prop_flat_map(|size| (Just(size), 0..size)),
    ) {
        let doc = Document::new("prop.md", text.clone());
        let chunks = pipeline(size, overlap, false).run_document(&doc);

        for pair in chunks.windows(2) {
            if pair[0].segment != pair[1].segment {
                continue;
            }
            // Each chunk is a tail of the previous one followed by new text
            let body = &text[pair[0].end..pair[1].end];
            let shared = overlap
                .min(pair[0].char_len())
                .min(size.saturating_sub(body.chars().count()));
            prop_assert_eq!(
                format!("{}{}", last_chars(&pair[0].text, shared), body),
                pair[1].text.clone()
            );
        }
    }

    #[test]
    fn chunks_tile_their_segment(text in markdown(), strip in any::<bool>()) {
        let doc = Document::new("prop.md", text);
        let pipeline = pipeline(40, 8, strip);
        let segments = pipeline.segments(&doc);
        let chunks = pipeline.run_document(&doc);

        for segment in &segments {
            let own = chunks_of(&chunks, segment);
            prop_assert!(!own.is_empty());
            // First chunk starts at the segment: nothing from the previous one
            prop_assert_eq!(own[0].start, segment.start);
            prop_assert_eq!(own[own.len() - 1].end, segment.end);
            for pair in own.windows(2) {
                prop_assert!(pair[1].start <= pair[0].end, "gap between chunks");
                prop_assert!(pair[1].end > pair[0].end, "chunk made no progress");
            }
        }
    }

    #[test]
    fn chunks_carry_provenance(text in markdown(), strip in any::<bool>()) {
        let doc = Document::new("prop.md", text.clone());
        let pipeline = pipeline(50, 5, strip);
        let segments = pipeline.segments(&doc);
        let chunks = pipeline.run_document(&doc);

        for (i, chunk) in chunks.iter().enumerate() {
            prop_assert_eq!(chunk.index, i);
            prop_assert_eq!(&text[chunk.span()], chunk.text.as_str());
            prop_assert_eq!(&chunk.metadata, &segments[chunk.segment].metadata);
        }
    }

    #[test]
    fn chunking_is_deterministic(text in markdown()) {
        let doc = Document::new("prop.md", text);
        let pipeline = pipeline(60, 12, false);
        prop_assert_eq!(pipeline.run_document(&doc), pipeline.run_document(&doc));
    }
}

// =============================================================================
// Edge Cases
// =============================================================================

#[test]
fn unicode_offsets_stay_on_char_boundaries() {
    let text = "# भाग १\nनेपालको संविधान। सबै नागरिक कानूनको दृष्टिमा समान हुनेछन्।\n\n# Part 2\nHello 世界! Привет мир!";
    let chunks = pipeline(20, 4, false).run_document(&Document::new("np.md", text));

    assert!(!chunks.is_empty());
    for chunk in &chunks {
        assert_eq!(&text[chunk.start..chunk.end], chunk.text);
        assert!(chunk.char_len() <= 20 || !chunk.text.contains(' '));
    }
    assert_eq!(chunks[0].metadata.get("Part"), Some("भाग १"));
}
