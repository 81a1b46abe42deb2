//! Contracts for the external services around the chunker.
//!
//! Embedding models, the hybrid vector index, the cross-encoder reranker and
//! the language model are all opaque. This module only fixes the shapes that
//! cross the boundary; implementations live with whatever client library the
//! application uses.
//!
//! Every trait is `Send + Sync` and object safe, so clients can be shared as
//! `Arc<dyn Trait>` (see [`crate::Resource`] for building them lazily).
//! Implementations report failures with [`crate::Error::service`].

use crate::{Chunk, Result};

/// Dense text embedding (e.g. a sentence-transformer model).
pub trait Embedder: Send + Sync {
    /// Embed one text into a dense vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// A sparse lexical vector, e.g. BM25 term weights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    /// Term ids, parallel to `values`.
    pub indices: Vec<u32>,
    /// Term weights.
    pub values: Vec<f32>,
}

impl SparseVector {
    /// Number of non-zero terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether no term is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Sparse lexical embedding.
pub trait SparseEmbedder: Send + Sync {
    /// Embed one text into a sparse vector.
    fn embed_sparse(&self, text: &str) -> Result<SparseVector>;
}

/// A chunk with both of its vectors, ready for upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRecord {
    /// The chunk being stored; its text and metadata are the payload.
    pub chunk: Chunk,
    /// Dense vector.
    pub dense: Vec<f32>,
    /// Sparse vector.
    pub sparse: SparseVector,
}

/// A query against the hybrid index.
#[derive(Debug, Clone, PartialEq)]
pub struct HybridQuery {
    /// Original question text.
    pub text: String,
    /// Dense embedding of the question.
    pub dense: Vec<f32>,
    /// Sparse embedding of the question.
    pub sparse: SparseVector,
}

/// A vector store searched by dense and sparse similarity together.
pub trait HybridIndex: Send + Sync {
    /// Store records, replacing any with the same chunk index.
    fn upsert(&self, records: Vec<IndexRecord>) -> Result<()>;

    /// Up to `k` chunks, best match first.
    fn search(&self, query: &HybridQuery, k: usize) -> Result<Vec<Chunk>>;
}

/// A cross-encoder scoring (query, candidate) pairs jointly.
pub trait Reranker: Send + Sync {
    /// One relevance score per candidate, in candidate order. Higher is better.
    fn score(&self, query: &str, candidates: &[&str]) -> Result<Vec<f32>>;
}

/// A language model completion endpoint.
pub trait CompletionModel: Send + Sync {
    /// Generate text for a prompt.
    fn complete(&self, prompt: &str) -> Result<String>;
}
