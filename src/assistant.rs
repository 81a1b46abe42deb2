//! Grounded question answering over indexed chunks.
//!
//! ## Indexing
//!
//! Each chunk is embedded twice (dense and sparse) and upserted into the
//! hybrid index in one batch.
//!
//! ## Answering
//!
//! ```text
//! question ─▶ embed ─▶ hybrid search (k = 20)
//!                            │
//!                            ▼
//!              cross-encoder rerank, keep top 8
//!                            │
//!                            ▼
//!          "[Source 1]\n…\n\n[Source 2]\n…"  ─▶ prompt ─▶ model ─▶ Answer
//! ```
//!
//! Hybrid search casts a wide net cheaply; the cross-encoder then reads each
//! (question, passage) pair in full to pick the few passages the model sees.

use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::services::{
    CompletionModel, Embedder, HybridIndex, HybridQuery, IndexRecord, Reranker, SparseEmbedder,
};
use crate::{Chunk, ChunkPipeline, Error, Result};

/// Retrieval depths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssistantOptions {
    /// Candidates fetched from the hybrid index.
    pub retrieve_k: usize,
    /// Candidates kept after reranking and shown to the model.
    pub rerank_top_k: usize,
}

impl Default for AssistantOptions {
    fn default() -> Self {
        Self {
            retrieve_k: 20,
            rerank_top_k: 8,
        }
    }
}

/// A generated answer and the passages it was grounded on.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    /// Model output.
    pub text: String,
    /// Reranked passages, in the order they were numbered in the prompt.
    pub sources: Vec<Chunk>,
}

/// Wires the chunk stream to the external retrieval and generation services.
pub struct Assistant {
    embedder: Arc<dyn Embedder>,
    sparse: Arc<dyn SparseEmbedder>,
    index: Arc<dyn HybridIndex>,
    reranker: Arc<dyn Reranker>,
    llm: Arc<dyn CompletionModel>,
    options: AssistantOptions,
}

impl Assistant {
    /// Create an assistant with default retrieval depths.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        sparse: Arc<dyn SparseEmbedder>,
        index: Arc<dyn HybridIndex>,
        reranker: Arc<dyn Reranker>,
        llm: Arc<dyn CompletionModel>,
    ) -> Self {
        Self {
            embedder,
            sparse,
            index,
            reranker,
            llm,
            options: AssistantOptions::default(),
        }
    }

    /// Override retrieval depths.
    #[must_use]
    pub fn with_options(mut self, options: AssistantOptions) -> Self {
        self.options = options;
        self
    }

    /// Current retrieval depths.
    #[must_use]
    pub fn options(&self) -> AssistantOptions {
        self.options
    }

    /// Chunk a markdown file and index the result.
    ///
    /// # Errors
    ///
    /// Fails on unreadable input or any collaborator error; nothing is
    /// upserted unless every chunk was embedded.
    pub fn ingest(&self, path: impl AsRef<Path>, pipeline: &ChunkPipeline) -> Result<usize> {
        let chunks = pipeline.run(path)?;
        self.index_chunks(&chunks)
    }

    /// Embed and upsert chunks; returns how many were stored.
    ///
    /// # Errors
    ///
    /// Propagates the first embedder or index failure.
    pub fn index_chunks(&self, chunks: &[Chunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }
        let records = chunks
            .iter()
            .map(|chunk| -> Result<IndexRecord> {
                Ok(IndexRecord {
                    dense: self.embedder.embed(&chunk.text)?,
                    sparse: self.sparse.embed_sparse(&chunk.text)?,
                    chunk: chunk.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let count = records.len();
        self.index.upsert(records)?;
        info!(chunks = count, "indexed chunks");
        Ok(count)
    }

    /// Hybrid search for the question.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyQuery`] for a blank question, otherwise
    /// collaborator errors.
    pub fn retrieve(&self, question: &str) -> Result<Vec<Chunk>> {
        let text = question.trim();
        if text.is_empty() {
            return Err(Error::EmptyQuery);
        }
        let query = HybridQuery {
            text: text.to_string(),
            dense: self.embedder.embed(text)?,
            sparse: self.sparse.embed_sparse(text)?,
        };
        let hits = self.index.search(&query, self.options.retrieve_k)?;
        debug!(hits = hits.len(), "hybrid search");
        Ok(hits)
    }

    /// Reorder candidates by cross-encoder score and keep the best `top_k`.
    ///
    /// Ties keep retrieval order; a NaN score ranks last.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Service`] if the reranker fails or returns a score
    /// count that does not match the candidates.
    pub fn rerank(
        &self,
        question: &str,
        candidates: Vec<Chunk>,
        top_k: usize,
    ) -> Result<Vec<Chunk>> {
        if candidates.is_empty() {
            return Ok(candidates);
        }
        let texts: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
        let scores = self.reranker.score(question, &texts)?;
        if scores.len() != candidates.len() {
            return Err(Error::service(
                "reranker",
                format!(
                    "returned {} scores for {} candidates",
                    scores.len(),
                    candidates.len()
                ),
            ));
        }

        let mut ranked: Vec<(Chunk, f32)> = candidates.into_iter().zip(scores).collect();
        ranked.sort_by(|a, b| by_score_desc(a.1, b.1));
        Ok(ranked.into_iter().take(top_k).map(|(c, _)| c).collect())
    }

    /// Answer a question from the indexed document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyQuery`] for a blank question; collaborator
    /// errors are passed through.
    pub fn ask(&self, question: &str) -> Result<Answer> {
        let retrieved = self.retrieve(question)?;
        let sources = self.rerank(question.trim(), retrieved, self.options.rerank_top_k)?;
        let prompt = build_prompt(&build_context(&sources), question.trim());
        let text = self.llm.complete(&prompt)?;
        info!(sources = sources.len(), "answered question");
        Ok(Answer { text, sources })
    }
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn by_score_desc(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Number the passages for the prompt.
#[must_use]
pub fn build_context(sources: &[Chunk]) -> String {
    sources
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("[Source {}]\n{}", i + 1, chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The grounded legal-assistant prompt.
#[must_use]
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a constitutional law assistant for Nepal.

RULES:
- Use ONLY the provided context.
- Do NOT invent articles, clauses, or interpretations.
- If the answer is not found, say so explicitly.
- Use formal, neutral legal language.
- Reference article/section numbers when mentioned.

CONTEXT:
{context}

QUESTION:
{question}

ANSWER:
"
    )
}
