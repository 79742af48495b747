//! Standard retrieval chain: the question itself is embedded and used as
//! the similarity query.

use crate::chains::{format_context, grounded_answer_prompt, ChainOutput};
use crate::error::RagError;
use crate::index::{RetrievedChunk, VectorIndex};
use crate::providers::{Embedder, Generator};
use std::sync::Arc;

#[derive(Clone)]
pub struct RagChain {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    generator: Arc<dyn Generator>,
    top_k: usize,
}

impl RagChain {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        generator: Arc<dyn Generator>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            index,
            generator,
            top_k,
        }
    }

    /// Embeds the question verbatim and returns the nearest chunks.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<RetrievedChunk>, RagError> {
        let vector = self.embedder.embed(question).await?;
        self.index.query(&vector, self.top_k).await
    }

    pub async fn answer_with_context(&self, question: &str) -> Result<ChainOutput, RagError> {
        let retrieved = self.retrieve(question).await?;
        let context = format_context(&retrieved);
        let prompt = grounded_answer_prompt(&context, question);
        let answer = self.generator.generate(&prompt).await?;

        Ok(ChainOutput {
            answer: answer.trim().to_string(),
            contexts: retrieved.into_iter().map(|c| c.text).collect(),
        })
    }

    pub async fn ask(&self, question: &str) -> Result<String, RagError> {
        Ok(self.answer_with_context(question).await?.answer)
    }
}
