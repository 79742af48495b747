//! Ollama REST client covering both provider roles: embeddings and text
//! generation. Generation is pinned to temperature 0.

use crate::error::RagError;
use crate::providers::{Embedder, Generator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    embedding_model: String,
    llm_model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, embedding_model: &str, llm_model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            embedding_model: embedding_model.to_string(),
            llm_model: llm_model.to_string(),
        }
    }

    /// Client with a request timeout, for the evaluation judge which may
    /// take minutes per call on a local inference backend.
    pub fn with_timeout(
        base_url: &str,
        embedding_model: &str,
        llm_model: &str,
        timeout: Duration,
    ) -> Result<Self, RagError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RagError::Provider(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            embedding_model: embedding_model.to_string(),
            llm_model: llm_model.to_string(),
        })
    }
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl Embedder for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let url = format!("{}/api/embeddings", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&EmbeddingsRequest {
                model: &self.embedding_model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|err| RagError::Provider(format!("embeddings request failed: {err}")))?;

        if !resp.status().is_success() {
            return Err(RagError::Provider(format!(
                "embeddings request returned {}",
                resp.status()
            )));
        }

        let body: EmbeddingsResponse = resp
            .json()
            .await
            .map_err(|err| RagError::Provider(format!("invalid embeddings response: {err}")))?;
        Ok(body.embedding)
    }
}

#[async_trait]
impl Generator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        let url = format!("{}/api/generate", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&GenerateRequest {
                model: &self.llm_model,
                prompt,
                stream: false,
                options: GenerateOptions { temperature: 0.0 },
            })
            .send()
            .await
            .map_err(|err| RagError::Provider(format!("generate request failed: {err}")))?;

        if !resp.status().is_success() {
            return Err(RagError::Provider(format!(
                "generate request returned {}",
                resp.status()
            )));
        }

        let body: GenerateResponse = resp
            .json()
            .await
            .map_err(|err| RagError::Provider(format!("invalid generate response: {err}")))?;
        Ok(body.response)
    }
}
