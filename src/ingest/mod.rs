//! Document ingestion: load a PDF, split each page into overlapping chunks,
//! sanitize metadata, embed, and write the whole batch to the vector index.
//!
//! Embedding and indexing are one unguarded step: an index failure after the
//! embedding cost is spent leaves nothing behind and is not resumable.
//! Re-ingesting the same source creates duplicate chunks, not an update.

pub mod loader;
pub mod metadata;
pub mod splitter;

use crate::error::RagError;
use crate::index::{Chunk, EmbeddedChunk, VectorIndex};
use crate::providers::Embedder;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub chunks: usize,
}

#[derive(Clone)]
pub struct IngestPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl IngestPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Self {
        Self {
            embedder,
            index,
            chunk_size,
            chunk_overlap,
        }
    }

    pub async fn ingest_document(&self, path: &Path) -> Result<IngestReport, RagError> {
        info!(path = %path.display(), "ingesting document");

        let pages = loader::load_pdf(path)?;
        let chunks = self.split_pages(&pages);
        info!(pages = pages.len(), chunks = chunks.len(), "split document");

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        let embedded: Vec<EmbeddedChunk> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| EmbeddedChunk {
                text: chunk.text,
                metadata: chunk.metadata,
                vector,
            })
            .collect();

        self.index.add_chunks(&embedded).await?;
        info!(chunks = embedded.len(), "ingestion complete");

        Ok(IngestReport {
            chunks: embedded.len(),
        })
    }

    fn split_pages(&self, pages: &[loader::PageDocument]) -> Vec<Chunk> {
        let mut out = Vec::new();
        for page in pages {
            if page.text.trim().is_empty() {
                continue;
            }
            let sanitized = metadata::sanitize_metadata(&page.metadata);
            for text in splitter::split_text(&page.text, self.chunk_size, self.chunk_overlap) {
                out.push(Chunk {
                    text,
                    metadata: sanitized.clone(),
                });
            }
        }
        out
    }
}
