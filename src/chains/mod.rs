//! Retrieval chains. Both share the grounded-answer prompt and the context
//! join rule; they differ only in what gets embedded for retrieval.

pub mod hyde;
pub mod standard;

use crate::index::RetrievedChunk;

/// Answer plus the chunk texts it was grounded in, in similarity order.
/// The evaluation harness consumes the contexts; the HTTP surface only
/// returns the answer.
#[derive(Debug, Clone)]
pub struct ChainOutput {
    pub answer: String,
    pub contexts: Vec<String>,
}

/// Joins retrieved chunk texts with a blank line, most similar first.
pub fn format_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub(crate) fn grounded_answer_prompt(context: &str, question: &str) -> String {
    format!(
        "You are an AI assistant for question answering.\n\
         Use the following pieces of retrieved context to answer the question.\n\
         If you don't know the answer, just say that you don't know.\n\
         Keep the answer concise.\n\n\
         Context: {context}\n\n\
         Question: {question}\n\n\
         Answer:"
    )
}

pub(crate) fn draft_passage_prompt(question: &str) -> String {
    format!(
        "Please write a brief passage that answers the question.\n\
         Do not verify facts, just generate a plausible-sounding answer.\n\n\
         Question: {question}\n\n\
         Passage:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn chunk(text: &str) -> RetrievedChunk {
        RetrievedChunk {
            text: text.to_string(),
            metadata: Map::new(),
            score: None,
        }
    }

    #[test]
    fn context_chunks_are_joined_by_a_blank_line() {
        let joined = format_context(&[chunk("ctx1"), chunk("ctx2")]);
        assert_eq!(joined, "ctx1\n\nctx2");
    }

    #[test]
    fn empty_retrieval_formats_to_empty_context() {
        assert_eq!(format_context(&[]), "");
    }

    #[test]
    fn answer_prompt_carries_context_and_question() {
        let prompt = grounded_answer_prompt("some context", "some question?");
        assert!(prompt.contains("Context: some context"));
        assert!(prompt.contains("Question: some question?"));
        assert!(prompt.contains("don't know"));
    }

    #[test]
    fn draft_prompt_carries_only_the_question() {
        let prompt = draft_passage_prompt("what is photosynthesis?");
        assert!(prompt.contains("what is photosynthesis?"));
        assert!(prompt.contains("Do not verify facts"));
        assert!(!prompt.contains("Context:"));
    }
}
