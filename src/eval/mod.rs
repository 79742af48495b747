//! Evaluation harness: runs both chains over a fixed question set and
//! scores each (question, answer, contexts) tuple on four metrics with an
//! LLM-as-judge, writing a CSV report. Judge calls are strictly serialized
//! so a local inference backend is never asked for more than one completion
//! at a time.

use crate::chains::{hyde::HydeChain, standard::RagChain, ChainOutput};
use crate::error::RagError;
use crate::providers::Generator;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub struct EvalSample {
    pub question: &'static str,
    pub ground_truth: &'static str,
}

pub const DATA_SAMPLES: [EvalSample; 2] = [
    EvalSample {
        question: "What is the main topic of this document?",
        ground_truth: "The document is about Photosynthesis.",
    },
    EvalSample {
        question: "List one key detail mentioned in the text.",
        ground_truth: "It mentions sunlight converting to chemical energy.",
    },
];

#[derive(Debug, Clone)]
pub struct MetricScores {
    pub context_precision: f32,
    pub context_recall: f32,
    pub faithfulness: f32,
    pub answer_relevancy: f32,
}

#[derive(Debug, Clone)]
pub struct EvalRow {
    pub chain: String,
    pub question: String,
    pub answer: String,
    pub scores: MetricScores,
}

pub struct Evaluator {
    judge: Arc<dyn Generator>,
}

impl Evaluator {
    pub fn new(judge: Arc<dyn Generator>) -> Self {
        Self { judge }
    }

    pub async fn score(
        &self,
        question: &str,
        ground_truth: &str,
        answer: &str,
        contexts: &[String],
    ) -> Result<MetricScores, RagError> {
        let context = contexts.join("\n\n");

        let context_precision = self
            .judge_one(&format!(
                "Question: {question}\n\nRetrieved context:\n{context}\n\n\
                 What fraction of the retrieved context passages are relevant \
                 to answering the question?\n\
                 Respond with a single number between 0 and 1."
            ))
            .await?;

        let context_recall = self
            .judge_one(&format!(
                "Reference answer: {ground_truth}\n\nRetrieved context:\n{context}\n\n\
                 How much of the information needed to produce the reference \
                 answer is present in the retrieved context?\n\
                 Respond with a single number between 0 and 1."
            ))
            .await?;

        let faithfulness = self
            .judge_one(&format!(
                "Retrieved context:\n{context}\n\nAnswer: {answer}\n\n\
                 How well is every claim in the answer supported by the \
                 retrieved context?\n\
                 Respond with a single number between 0 and 1."
            ))
            .await?;

        let answer_relevancy = self
            .judge_one(&format!(
                "Question: {question}\n\nAnswer: {answer}\n\n\
                 How directly does the answer address the question?\n\
                 Respond with a single number between 0 and 1."
            ))
            .await?;

        Ok(MetricScores {
            context_precision,
            context_recall,
            faithfulness,
            answer_relevancy,
        })
    }

    async fn judge_one(&self, prompt: &str) -> Result<f32, RagError> {
        let reply = self.judge.generate(prompt).await?;
        parse_score(&reply).ok_or_else(|| {
            RagError::Provider(format!("judge returned no score: {}", reply.trim()))
        })
    }
}

/// Extracts the first number from a judge reply and clamps it to [0, 1].
pub fn parse_score(reply: &str) -> Option<f32> {
    reply
        .split(|c: char| !c.is_ascii_digit() && c != '.' && c != '-')
        .filter(|s| !s.is_empty())
        .find_map(|token| token.parse::<f32>().ok())
        .map(|v| v.clamp(0.0, 1.0))
}

pub async fn run_eval(
    standard: &RagChain,
    hyde: &HydeChain,
    judge: Arc<dyn Generator>,
    report_path: &Path,
) -> Result<Vec<EvalRow>> {
    let evaluator = Evaluator::new(judge);
    let mut rows = Vec::new();

    for (chain_name, output_of) in [
        ("standard", ChainKind::Standard),
        ("hyde", ChainKind::Hyde),
    ] {
        for sample in &DATA_SAMPLES {
            info!(chain = chain_name, question = sample.question, "evaluating");
            let output: ChainOutput = match output_of {
                ChainKind::Standard => standard.answer_with_context(sample.question).await?,
                ChainKind::Hyde => hyde.answer_with_context(sample.question).await?,
            };

            let scores = evaluator
                .score(
                    sample.question,
                    sample.ground_truth,
                    &output.answer,
                    &output.contexts,
                )
                .await?;

            rows.push(EvalRow {
                chain: chain_name.to_string(),
                question: sample.question.to_string(),
                answer: output.answer,
                scores,
            });
        }
    }

    write_report(&rows, report_path)?;
    info!(path = %report_path.display(), rows = rows.len(), "evaluation report saved");
    Ok(rows)
}

enum ChainKind {
    Standard,
    Hyde,
}

fn write_report(rows: &[EvalRow], path: &Path) -> Result<()> {
    let mut out = String::from(
        "chain,question,answer,context_precision,context_recall,faithfulness,answer_relevancy\n",
    );
    for row in rows {
        out.push_str(&format!(
            "{},{},{},{:.4},{:.4},{:.4},{:.4}\n",
            csv_escape(&row.chain),
            csv_escape(&row.question),
            csv_escape(&row.answer),
            row.scores.context_precision,
            row.scores.context_recall,
            row.scores.faithfulness,
            row.scores.answer_relevancy,
        ));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create report dir: {}", parent.display()))?;
        }
    }
    std::fs::write(path, out)
        .with_context(|| format!("Failed to write report: {}", path.display()))
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
