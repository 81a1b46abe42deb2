//! # charter
//!
//! Header-aware chunking of a converted constitution for retrieval-augmented
//! question answering.
//!
//! ## The Problem
//!
//! A constitution converted from PDF to markdown is one long file organised
//! into parts, chapters, and articles. To answer questions about it, the text
//! has to be cut into pieces small enough to embed and retrieve, without
//! losing track of *where* each piece sits. A passage that says "the
//! President shall..." is useless to a reader if nobody knows which Part it
//! came from.
//!
//! ## Two Passes
//!
//! ### 1. Header Splitting
//!
//! Cut the markdown at configured heading levels. Each [`Segment`] remembers
//! the headings above it:
//!
//! ```text
//! # Part 5 Structure of State       ──▶ {Part: "Part 5 Structure of State"}
//! Article 56. The main structure...
//! # Part 6 President                ──▶ {Part: "Part 6 President"}
//! Article 61. There shall be...
//! ```
//!
//! ### 2. Recursive Chunking
//!
//! Split each segment into chunks of at most `chunk_size` characters, trying
//! paragraph breaks first, then line breaks, sentence ends, and words.
//! Consecutive chunks of a segment share `chunk_overlap` characters; chunks
//! never overlap across segments.
//!
//! ```text
//! Separators: ["\n\n", "\n", ". ", " "]
//!
//! 1. Try splitting on "\n\n" (paragraphs)
//! 2. Any piece too large? Split that piece on "\n" (lines)
//! 3. Still too large? Split on ". " (sentences)
//! 4. Still too large? Split on " " (words)
//! 5. A single word longer than the limit is kept whole
//! ```
//!
//! Every [`Chunk`] inherits its segment's heading metadata and records its
//! byte span in the source.
//!
//! ## Quick Start
//!
//! ```rust
//! use charter::{ChunkOptions, ChunkPipeline, Document, HeaderRule};
//!
//! let options = ChunkOptions::default()
//!     .with_chunk_size(200)
//!     .with_chunk_overlap(20)
//!     .with_headers(vec![HeaderRule::new("#", "Part"), HeaderRule::new("##", "Article")])
//!     .with_strip_headers(true);
//! let pipeline = ChunkPipeline::new(options).unwrap();
//!
//! let doc = Document::new(
//!     "constitution.md",
//!     "# Part 1 Preliminary\n## Article 1 Constitution as the fundamental law\n\
//!      This Constitution is the fundamental law of Nepal.",
//! );
//! let chunks = pipeline.run_document(&doc);
//!
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].metadata.get("Part"), Some("Part 1 Preliminary"));
//! assert_eq!(chunks[0].text, "This Constitution is the fundamental law of Nepal.");
//! ```
//!
//! Reading from disk goes through [`ChunkPipeline::run`] or
//! [`split_markdown_into_chunks`], which fail with [`Error::Io`] on an
//! unreadable file. Invalid options (`chunk_overlap >= chunk_size`, zero
//! size, no separators) are rejected before any text is read.
//!
//! ## Answering Questions
//!
//! Embedding, hybrid search, reranking, and generation are external services
//! behind the traits in [`services`]. [`Assistant`] strings them together:
//! retrieve 20 candidates, rerank, keep 8, and prompt the model with only
//! those passages. [`Resource`] builds the service clients once per process.

mod assistant;
mod chunk;
mod config;
mod document;
mod error;
mod header;
mod pipeline;
mod recursive;
mod resource;
pub mod services;

pub use assistant::{build_context, build_prompt, Answer, Assistant, AssistantOptions};
pub use chunk::Chunk;
pub use config::{ChunkOptions, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_SEPARATORS};
pub use document::Document;
pub use error::{Error, Result};
pub use header::{HeaderRule, HeaderSplitter, Metadata, Segment};
pub use pipeline::{split_markdown_into_chunks, ChunkPipeline};
pub use recursive::RecursiveChunker;
pub use resource::Resource;
