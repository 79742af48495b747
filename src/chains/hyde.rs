//! HyDE retrieval chain: draft a hypothetical passage answering the
//! question, embed the draft, and retrieve real chunks near that embedding.
//!
//! The draft is allowed to fabricate freely; it is never shown to the
//! caller and never stored. Its only job is to be phrased in the register
//! of the documents, so its embedding lands closer to genuine supporting
//! passages than the bare question would. The final answer is then grounded
//! in the retrieved chunks exactly like the standard chain.

use crate::chains::{draft_passage_prompt, format_context, grounded_answer_prompt, ChainOutput};
use crate::error::RagError;
use crate::index::VectorIndex;
use crate::providers::{Embedder, Generator};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct HydeChain {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    generator: Arc<dyn Generator>,
    top_k: usize,
}

impl HydeChain {
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

    /// Runs the three stages in order: draft, retrieve, answer. Any stage
    /// failure aborts the request; no partial answer is returned and no
    /// stage is retried.
    pub async fn answer_with_context(&self, question: &str) -> Result<ChainOutput, RagError> {
        let draft = self
            .generator
            .generate(&draft_passage_prompt(question))
            .await?;
        debug!(preview = %preview(&draft, 100), "generated hypothetical passage");

        // The draft, never the literal question, drives retrieval.
        let vector = self.embedder.embed(&draft).await?;
        let retrieved = self.index.query(&vector, self.top_k).await?;

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

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut s: String = text.chars().take(max_chars).collect();
        s.push_str("...");
        s
    }
}
