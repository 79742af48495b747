//! Shared test doubles: scripted/echoing generators, a recording embedder,
//! and in-memory vector indexes. Anything satisfying the three provider
//! traits can stand in for the real services.

#![allow(dead_code)]

use async_trait::async_trait;
use document_rag_server::error::RagError;
use document_rag_server::index::{EmbeddedChunk, RetrievedChunk, VectorIndex};
use document_rag_server::providers::{hash::HashEmbedder, Embedder, Generator};
use serde_json::Map;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Replays a fixed list of replies in order, repeating the last one once the
/// list is exhausted, and records every prompt it was given.
pub struct ScriptedGenerator {
    replies: Vec<String>,
    calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|s| s.to_string()).collect(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.to_string());
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let idx = n.min(self.replies.len().saturating_sub(1));
        self.replies
            .get(idx)
            .cloned()
            .ok_or_else(|| RagError::Provider("no scripted reply".to_string()))
    }
}

/// Returns its prompt verbatim, so answers visibly contain whatever context
/// the chain put in front of the model.
pub struct EchoGenerator;

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        Ok(prompt.to_string())
    }
}

/// Deterministic hash embedder that records every text it embeds.
pub struct RecordingEmbedder {
    inner: HashEmbedder,
    pub texts: Mutex<Vec<String>>,
}

impl RecordingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self {
            inner: HashEmbedder::new(dim),
            texts: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded_texts(&self) -> Vec<String> {
        self.texts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Embedder for RecordingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        self.texts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());
        self.inner.embed(text).await
    }
}

/// Cosine-similarity index over an in-memory chunk list; records every
/// query vector it receives.
#[derive(Default)]
pub struct InMemoryIndex {
    chunks: Mutex<Vec<EmbeddedChunk>>,
    pub queries: Mutex<Vec<Vec<f32>>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded_queries(&self) -> Vec<Vec<f32>> {
        self.queries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn stored_texts(&self) -> Vec<String> {
        self.chunks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|c| c.text.clone())
            .collect()
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::MIN;
    }
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn add_chunks(&self, chunks: &[EmbeddedChunk]) -> Result<(), RagError> {
        self.chunks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(chunks);
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<RetrievedChunk>, RagError> {
        self.queries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(vector.to_vec());

        let chunks = self.chunks.lock().unwrap_or_else(|e| e.into_inner());
        let mut scored: Vec<(f32, &EmbeddedChunk)> = chunks
            .iter()
            .map(|c| (cosine(&c.vector, vector), c))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(score, c)| RetrievedChunk {
                text: c.text.clone(),
                metadata: c.metadata.clone(),
                score: Some(score),
            })
            .collect())
    }
}

/// Ignores the query entirely and always returns the same chunk texts.
pub struct FixedIndex {
    texts: Vec<String>,
}

impl FixedIndex {
    pub fn new(texts: &[&str]) -> Self {
        Self {
            texts: texts.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl VectorIndex for FixedIndex {
    async fn add_chunks(&self, _chunks: &[EmbeddedChunk]) -> Result<(), RagError> {
        Ok(())
    }

    async fn query(&self, _vector: &[f32], _k: usize) -> Result<Vec<RetrievedChunk>, RagError> {
        Ok(self
            .texts
            .iter()
            .map(|t| RetrievedChunk {
                text: t.clone(),
                metadata: Map::new(),
                score: None,
            })
            .collect())
    }
}
