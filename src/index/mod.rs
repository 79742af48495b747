pub mod qdrant;

use crate::error::RagError;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// A bounded span of source text plus sanitized metadata, the unit of
/// storage and retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub metadata: Map<String, Value>,
}

/// A chunk together with its embedding, ephemeral between the embedding
/// step and the index write.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedChunk {
    pub text: String,
    pub metadata: Map<String, Value>,
    pub vector: Vec<f32>,
}

/// One similarity-search hit. Results are ordered most-similar first,
/// using the index's native ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub text: String,
    pub metadata: Map<String, Value>,
    pub score: Option<f32>,
}

/// Narrow boundary to the vector store: batch writes and top-k similarity
/// queries against one fixed collection. Anything satisfying this trait can
/// back the chains, including in-memory stubs in tests.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Persists the batch. Errors map to [`RagError::Upload`].
    async fn add_chunks(&self, chunks: &[EmbeddedChunk]) -> Result<(), RagError>;

    /// Returns the `k` nearest chunks to `vector`, most similar first.
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<RetrievedChunk>, RagError>;
}
