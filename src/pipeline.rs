//! End-to-end chunking: markdown file in, chunk sequence out.
//!
//! ```text
//! converted_law.md ──read──▶ Document ──HeaderSplitter──▶ [Segment]
//!                                       ──RecursiveChunker──▶ [Chunk]
//! ```
//!
//! Options are validated when the pipeline is built, before any file is
//! opened. A run either returns every chunk or an error; there are no
//! partial results.

use std::path::Path;

use tracing::info;

use crate::{Chunk, ChunkOptions, Document, HeaderSplitter, RecursiveChunker, Result, Segment};

/// A validated header splitter and recursive chunker, run in sequence.
///
/// ## Example
///
/// ```rust
/// use charter::{ChunkOptions, ChunkPipeline, Document};
///
/// let pipeline = ChunkPipeline::new(
///     ChunkOptions::default().with_chunk_size(20).with_chunk_overlap(5),
/// ).unwrap();
///
/// let doc = Document::new("law.md", "# Part 1\nArticle 1 text...\n\n# Part 2\nArticle 2 text...");
/// let chunks = pipeline.run_document(&doc);
///
/// assert_eq!(chunks.first().unwrap().metadata.get("Part"), Some("Part 1"));
/// assert_eq!(chunks.last().unwrap().metadata.get("Part"), Some("Part 2"));
/// assert!(chunks.iter().all(|c| c.char_len() <= 20));
/// ```
#[derive(Debug, Clone)]
pub struct ChunkPipeline {
    splitter: HeaderSplitter,
    chunker: RecursiveChunker,
}

impl ChunkPipeline {
    /// Validate `options` and build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns a configuration error (see [`ChunkOptions::validate`]).
    pub fn new(options: ChunkOptions) -> Result<Self> {
        let chunker = RecursiveChunker::from_options(&options)?;
        let splitter = HeaderSplitter::new(options.headers_to_split_on, options.strip_headers)?;
        Ok(Self { splitter, chunker })
    }

    /// Read a markdown file and chunk it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the file cannot be read.
    pub fn run(&self, path: impl AsRef<Path>) -> Result<Vec<Chunk>> {
        let document = Document::load(path)?;
        Ok(self.run_document(&document))
    }

    /// Chunk a document already in memory.
    #[must_use]
    pub fn run_document(&self, document: &Document) -> Vec<Chunk> {
        let segments = self.segments(document);
        let chunks = self.chunker.chunk_segments(&segments);
        info!(
            source = document.source(),
            chunks = chunks.len(),
            "created final chunks"
        );
        chunks
    }

    /// Only the header pass, for inspecting how a document is sectioned.
    #[must_use]
    pub fn segments(&self, document: &Document) -> Vec<Segment> {
        let segments = self.splitter.split_document(document);
        info!(
            source = document.source(),
            segments = segments.len(),
            "split document by headers"
        );
        segments
    }
}

impl Default for ChunkPipeline {
    fn default() -> Self {
        Self {
            splitter: HeaderSplitter::default(),
            chunker: RecursiveChunker::default(),
        }
    }
}

/// Load a markdown file, split it by headers, then recursively into final chunks.
///
/// # Errors
///
/// Configuration errors are reported before the file is read; I/O errors
/// after.
pub fn split_markdown_into_chunks(
    path: impl AsRef<Path>,
    options: &ChunkOptions,
) -> Result<Vec<Chunk>> {
    ChunkPipeline::new(options.clone())?.run(path)
}
