pub mod hash;
pub mod ollama;

use crate::config::{Config, EmbeddingsBackend};
use crate::error::RagError;
use async_trait::async_trait;
use std::sync::Arc;

/// Maps text to a fixed-length vector. The same implementation (and model)
/// must serve both ingestion and querying, or similarity scores between the
/// two are meaningless.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

/// Maps a prompt to generated text. Implementations run at temperature 0 so
/// repeated calls with the same prompt are deterministic.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, RagError>;
}

/// Picks the embedding backend configured for this process. The hash backend
/// needs no model server and is meant for offline development and tests.
pub fn create_embedder(config: &Config) -> Arc<dyn Embedder> {
    match config.embeddings_backend {
        EmbeddingsBackend::Ollama => Arc::new(ollama::OllamaClient::new(
            &config.ollama_base_url,
            &config.embedding_model,
            &config.llm_model,
        )),
        EmbeddingsBackend::Hash => Arc::new(hash::HashEmbedder::new(config.hash_embedding_dim)),
    }
}
