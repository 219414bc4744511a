// Retrieval context for personalised questions.
// Implements: keyword extraction, chunking, embedding + flat vector index, PDF text extraction.

pub mod chunking;
pub mod extract;
pub mod index;
pub mod keywords;

pub use index::{DocumentContext, Embedder, HashingEmbedder, SearchHit};
pub use keywords::extract_keywords;
