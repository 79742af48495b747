//! Qdrant REST client. Speaks plaintext HTTP to a co-deployed index: one
//! fixed collection holds every chunk regardless of source document.
//!
//! Connecting tolerates the index still starting up: the readiness probe is
//! retried at a fixed interval, unboundedly, until it answers. The interval
//! is injected so tests do not sleep for real.

use crate::error::RagError;
use crate::index::{EmbeddedChunk, RetrievedChunk, VectorIndex};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct IndexSettings {
    pub host: String,
    pub http_port: u16,
    /// Carried for deployments that enable the gRPC transport; this client
    /// speaks the HTTP API only.
    pub grpc_port: u16,
    pub collection: String,
    pub retry_interval: Duration,
}

impl IndexSettings {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.http_port)
    }
}

pub struct QdrantIndex {
    http: reqwest::Client,
    base_url: String,
    collection: String,
}

impl QdrantIndex {
    /// Blocks until the index answers its readiness probe, retrying at the
    /// configured fixed interval. Transient connection errors are logged and
    /// consumed here; they never surface to callers.
    pub async fn connect(settings: IndexSettings) -> Self {
        let http = reqwest::Client::new();
        let base_url = settings.base_url();

        loop {
            match probe_ready(&http, &base_url).await {
                Ok(()) => break,
                Err(err) => {
                    warn!(
                        host = %settings.host,
                        port = settings.http_port,
                        grpc_port = settings.grpc_port,
                        error = %err,
                        "vector index not ready yet, retrying"
                    );
                    tokio::time::sleep(settings.retry_interval).await;
                }
            }
        }

        info!(url = %base_url, collection = %settings.collection, "connected to vector index");
        Self {
            http,
            base_url,
            collection: settings.collection,
        }
    }

    async fn ensure_collection(&self, dim: usize) -> Result<(), RagError> {
        let url = format!("{}/collections/{}", self.base_url, self.collection);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| RagError::Upload(format!("collection lookup failed: {err}")))?;
        if resp.status().is_success() {
            return Ok(());
        }

        let body = json!({ "vectors": { "size": dim, "distance": "Cosine" } });
        let resp = self
            .http
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| RagError::Upload(format!("collection create failed: {err}")))?;
        if !resp.status().is_success() {
            return Err(RagError::Upload(format!(
                "collection create returned {}",
                resp.status()
            )));
        }
        Ok(())
    }
}

async fn probe_ready(http: &reqwest::Client, base_url: &str) -> Result<(), RagError> {
    let resp = http
        .get(format!("{base_url}/readyz"))
        .send()
        .await
        .map_err(|err| RagError::Connection(err.to_string()))?;
    if resp.status().is_success() {
        Ok(())
    } else {
        Err(RagError::Connection(format!(
            "readiness probe returned {}",
            resp.status()
        )))
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    score: Option<f32>,
    payload: Option<Value>,
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn add_chunks(&self, chunks: &[EmbeddedChunk]) -> Result<(), RagError> {
        let Some(first) = chunks.first() else {
            return Ok(());
        };
        self.ensure_collection(first.vector.len()).await?;

        let points: Vec<Value> = chunks
            .iter()
            .map(|chunk| {
                json!({
                    "id": Uuid::new_v4().to_string(),
                    "vector": chunk.vector,
                    "payload": {
                        "text": chunk.text,
                        "metadata": chunk.metadata,
                    },
                })
            })
            .collect();

        let url = format!(
            "{}/collections/{}/points?wait=true",
            self.base_url, self.collection
        );
        let resp = self
            .http
            .put(&url)
            .json(&json!({ "points": points }))
            .send()
            .await
            .map_err(|err| RagError::Upload(format!("points upsert failed: {err}")))?;
        if !resp.status().is_success() {
            return Err(RagError::Upload(format!(
                "points upsert returned {}",
                resp.status()
            )));
        }
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<RetrievedChunk>, RagError> {
        let url = format!(
            "{}/collections/{}/points/search",
            self.base_url, self.collection
        );
        let resp = self
            .http
            .post(&url)
            .json(&json!({
                "vector": vector,
                "limit": k,
                "with_payload": true,
            }))
            .send()
            .await
            .map_err(|err| RagError::Provider(format!("vector index query failed: {err}")))?;

        // No collection yet means nothing has been ingested.
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !resp.status().is_success() {
            return Err(RagError::Provider(format!(
                "vector index query returned {}",
                resp.status()
            )));
        }

        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|err| RagError::Provider(format!("invalid search response: {err}")))?;

        Ok(body
            .result
            .into_iter()
            .map(|hit| {
                let payload = hit.payload.unwrap_or(Value::Null);
                let text = payload
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let metadata = payload
                    .get("metadata")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_else(Map::new);
                RetrievedChunk {
                    text,
                    metadata,
                    score: hit.score,
                }
            })
            .collect())
    }
}
