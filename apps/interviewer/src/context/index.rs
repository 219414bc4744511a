//! Context Index: nearest-neighbour lookup over résumé / job-description chunks.
//!
//! The embedding model sits behind the [`Embedder`] trait. The index itself is a
//! flat (brute-force) squared-L2 index: documents here are a few dozen chunks,
//! so exhaustive search is exact and fast enough.

use serde::{Deserialize, Serialize};

use crate::context::chunking::chunk_text;

/// Dimension of vectors produced by [`HashingEmbedder`].
pub const HASHING_DIMENSION: usize = 256;

/// The embedding capability. Implementations must be deterministic for a
/// given input so that stored message context is reproducible.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Vec<f32>;
}

/// Local embedder: hashed bag-of-words term frequencies, L2-normalised.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimension: HASHING_DIMENSION,
        }
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimension];
        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.chars().count() > 1)
        {
            let bucket = (fnv1a(token.as_bytes()) % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }
        normalize(&mut vector);
        vector
    }
}

/// 64-bit FNV-1a; stable across builds, unlike `DefaultHasher`.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(PRIME))
}

fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|v| *v /= norm);
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// A single similarity-search result. Lower distance = more similar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub text: String,
    pub distance: f32,
}

/// Chunks of one document plus their embeddings, index-aligned.
#[derive(Debug, Clone)]
pub struct ContextIndex {
    chunks: Vec<String>,
    vectors: Vec<Vec<f32>>,
}

impl ContextIndex {
    /// Embeds every chunk. Returns `None` when there is nothing to index.
    pub fn build(chunks: Vec<String>, embedder: &dyn Embedder) -> Option<Self> {
        if chunks.is_empty() {
            return None;
        }
        let vectors = chunks.iter().map(|c| embedder.embed(c)).collect();
        Some(Self { chunks, vectors })
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// Returns up to `top_k` chunks ordered by ascending distance to `query`.
    /// Ties keep document order.
    pub fn search(&self, query: &str, embedder: &dyn Embedder, top_k: usize) -> Vec<SearchHit> {
        if top_k == 0 {
            return Vec::new();
        }
        let query_vector = embedder.embed(query);
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, squared_l2(&query_vector, v)))
            .collect();
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(top_k)
            .map(|(i, distance)| SearchHit {
                text: self.chunks[i].clone(),
                distance,
            })
            .collect()
    }
}

/// Retrieval context for one source document.
///
/// `NoContext` covers both "nothing supplied" and "nothing indexable"; callers
/// never need to null-check an index handle.
#[derive(Debug, Clone, Default)]
pub enum DocumentContext {
    #[default]
    NoContext,
    Indexed { text: String, index: ContextIndex },
}

impl DocumentContext {
    pub fn build(text: &str, chunk_size: usize, embedder: &dyn Embedder) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return DocumentContext::NoContext;
        }
        match ContextIndex::build(chunk_text(text, chunk_size), embedder) {
            Some(index) => DocumentContext::Indexed {
                text: text.to_string(),
                index,
            },
            None => DocumentContext::NoContext,
        }
    }

    /// Full source text; empty for `NoContext`.
    pub fn text(&self) -> &str {
        match self {
            DocumentContext::NoContext => "",
            DocumentContext::Indexed { text, .. } => text,
        }
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self, DocumentContext::Indexed { .. })
    }

    pub fn chunk_count(&self) -> usize {
        match self {
            DocumentContext::NoContext => 0,
            DocumentContext::Indexed { index, .. } => index.chunks().len(),
        }
    }

    /// Similarity search; always empty for `NoContext`.
    pub fn search(&self, query: &str, embedder: &dyn Embedder, top_k: usize) -> Vec<SearchHit> {
        match self {
            DocumentContext::NoContext => Vec::new(),
            DocumentContext::Indexed { index, .. } => index.search(query, embedder, top_k),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedder() -> HashingEmbedder {
        HashingEmbedder::default()
    }

    #[test]
    fn test_embedding_is_normalized_and_deterministic() {
        let e = embedder();
        let a = e.embed("Rust services at Acme");
        let b = e.embed("Rust services at Acme");
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_blank_text_embeds_to_zero_vector() {
        let v = embedder().embed("   ");
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_build_returns_none_for_no_chunks() {
        assert!(ContextIndex::build(vec![], &embedder()).is_none());
    }

    #[test]
    fn test_search_ranks_most_similar_chunk_first() {
        let e = embedder();
        let index = ContextIndex::build(
            vec![
                "Managed payroll spreadsheets for the finance team".to_string(),
                "Built a Kafka streaming pipeline in Rust".to_string(),
                "Organized the office holiday party".to_string(),
            ],
            &e,
        )
        .unwrap();

        let hits = index.search("kafka rust pipeline", &e, 3);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].text, "Built a Kafka streaming pipeline in Rust");
        assert!(hits[0].distance <= hits[1].distance);
        assert!(hits[1].distance <= hits[2].distance);
        assert!(hits.iter().all(|h| h.distance >= 0.0));
    }

    #[test]
    fn test_search_caps_at_top_k_and_chunk_count() {
        let e = embedder();
        let index = ContextIndex::build(vec!["one chunk".to_string()], &e).unwrap();
        assert_eq!(index.search("chunk", &e, 3).len(), 1);
        assert!(index.search("chunk", &e, 0).is_empty());
    }

    #[test]
    fn test_document_context_blank_text_is_no_context() {
        let ctx = DocumentContext::build("  \n ", 512, &embedder());
        assert!(!ctx.is_indexed());
        assert_eq!(ctx.text(), "");
        assert!(ctx.search("anything", &embedder(), 3).is_empty());
    }

    #[test]
    fn test_document_context_indexes_text() {
        let ctx = DocumentContext::build(
            "Led the migration to Postgres. Wrote Python tooling.",
            20,
            &embedder(),
        );
        assert!(ctx.is_indexed());
        assert_eq!(ctx.chunk_count(), 2);
        let hits = ctx.search("python tooling", &embedder(), 3);
        assert_eq!(hits[0].text, "Wrote Python tooling.");
    }
}
