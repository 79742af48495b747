//! HTTP surface: liveness, the two chat endpoints, and multipart upload
//! feeding the ingestion pipeline. Chains are constructed once at startup
//! and shared across requests through the router state.

use crate::chains::{hyde::HydeChain, standard::RagChain};
use crate::config::Config;
use crate::error::RagError;
use crate::ingest::IngestPipeline;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{net::SocketAddr, path::Path, sync::Arc};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub standard: RagChain,
    pub hyde: HydeChain,
    pub ingestor: IngestPipeline,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/chat", post(chat))
        .route("/hyde-chat", post(hyde_chat))
        .route("/upload", post(upload))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

fn failure_response(err: &RagError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": err.to_string() })),
    )
        .into_response()
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "status": "running",
        "message": "POST a question to /chat or /hyde-chat",
    }))
}

async fn chat(State(state): State<AppState>, Json(req): Json<QueryRequest>) -> Response {
    match state.standard.ask(&req.question).await {
        Ok(answer) => Json(QueryResponse { answer }).into_response(),
        Err(err) => {
            error!(error = %err, "chat request failed");
            failure_response(&err)
        }
    }
}

async fn hyde_chat(State(state): State<AppState>, Json(req): Json<QueryRequest>) -> Response {
    match state.hyde.ask(&req.question).await {
        Ok(answer) => Json(QueryResponse { answer }).into_response(),
        Err(err) => {
            error!(error = %err, "hyde-chat request failed");
            failure_response(&err)
        }
    }
}

async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let (file_name, bytes) = loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let Some(name) = field.file_name().map(sanitize_file_name) else {
                    continue;
                };
                match field.bytes().await {
                    Ok(bytes) => break (name, bytes),
                    Err(err) => {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(json!({ "detail": format!("failed to read upload: {err}") })),
                        )
                            .into_response();
                    }
                }
            }
            Ok(None) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "detail": "missing file field" })),
                )
                    .into_response();
            }
            Err(err) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "detail": format!("invalid multipart body: {err}") })),
                )
                    .into_response();
            }
        }
    };

    let dir = &state.config.upload_dir;
    if let Err(err) = tokio::fs::create_dir_all(dir).await {
        error!(error = %err, "could not create upload dir");
        return failure_response(&RagError::Upload(format!("could not save file: {err}")));
    }
    let file_path = dir.join(&file_name);
    if let Err(err) = tokio::fs::write(&file_path, &bytes).await {
        error!(error = %err, path = %file_path.display(), "could not save upload");
        return failure_response(&RagError::Upload(format!("could not save file: {err}")));
    }
    info!(path = %file_path.display(), "file saved, starting ingestion");

    match state.ingestor.ingest_document(&file_path).await {
        Ok(report) => Json(json!({
            "message": "File uploaded and ingested successfully",
            "chunks": report.chunks,
        }))
        .into_response(),
        Err(err) => {
            error!(error = %err, "ingestion failed");
            failure_response(&err)
        }
    }
}

/// Strips any path components from a client-supplied filename.
fn sanitize_file_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.pdf".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RagError;
    use crate::index::{EmbeddedChunk, RetrievedChunk, VectorIndex};
    use crate::providers::{hash::HashEmbedder, Embedder, Generator};
    use async_trait::async_trait;
    use http_body_util::BodyExt;
    use serde_json::{Map, Value};

    struct FixedGenerator(&'static str);

    #[async_trait]
    impl Generator for FixedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, RagError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl Generator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, RagError> {
            Err(RagError::Provider("model unavailable".to_string()))
        }
    }

    struct SinglePassageIndex;

    #[async_trait]
    impl VectorIndex for SinglePassageIndex {
        async fn add_chunks(&self, _chunks: &[EmbeddedChunk]) -> Result<(), RagError> {
            Ok(())
        }

        async fn query(
            &self,
            _vector: &[f32],
            _k: usize,
        ) -> Result<Vec<RetrievedChunk>, RagError> {
            Ok(vec![RetrievedChunk {
                text: "stored passage".to_string(),
                metadata: Map::new(),
                score: Some(0.9),
            }])
        }
    }

    fn test_config() -> Config {
        let dir = std::env::temp_dir().join(format!(
            "doc-rag-server-test-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        Config {
            vector_host: "localhost".to_string(),
            vector_port: 6333,
            vector_grpc_port: 6334,
            collection_name: "document_chunks".to_string(),
            connect_retry_secs: 5,
            ollama_base_url: "http://localhost:11434".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            llm_model: "llama3".to_string(),
            embeddings_backend: crate::config::EmbeddingsBackend::Hash,
            hash_embedding_dim: 16,
            chunk_size: 1000,
            chunk_overlap: 100,
            retrieval_top_k: 4,
            upload_dir: dir.clone(),
            eval_report_path: dir.join("evaluation_report.csv"),
            judge_timeout_secs: 360,
            server_addr: "127.0.0.1:8000".parse().unwrap(),
        }
    }

    fn test_state(generator: Arc<dyn Generator>) -> AppState {
        let config = test_config();

        let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(16));
        let index: Arc<dyn VectorIndex> = Arc::new(SinglePassageIndex);

        AppState {
            config: Arc::new(config.clone()),
            standard: RagChain::new(embedder.clone(), index.clone(), generator.clone(), 4),
            hyde: HydeChain::new(embedder.clone(), index.clone(), generator, 4),
            ingestor: IngestPipeline::new(embedder, index, config.chunk_size, config.chunk_overlap),
        }
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn root_reports_running() {
        let Json(v) = root().await;
        assert_eq!(v.get("status").and_then(Value::as_str), Some("running"));
    }

    #[tokio::test]
    async fn chat_returns_the_chain_answer() {
        let state = test_state(Arc::new(FixedGenerator("the answer")));
        let resp = chat(
            State(state),
            Json(QueryRequest {
                question: "what?".to_string(),
            }),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::OK);
        let v = body_json(resp).await;
        assert_eq!(v.get("answer").and_then(Value::as_str), Some("the answer"));
    }

    #[tokio::test]
    async fn hyde_chat_returns_the_chain_answer() {
        let state = test_state(Arc::new(FixedGenerator("hyde answer")));
        let resp = hyde_chat(
            State(state),
            Json(QueryRequest {
                question: "what?".to_string(),
            }),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::OK);
        let v = body_json(resp).await;
        assert_eq!(v.get("answer").and_then(Value::as_str), Some("hyde answer"));
    }

    #[tokio::test]
    async fn provider_failure_maps_to_500_with_detail() {
        let state = test_state(Arc::new(FailingGenerator));
        let resp = chat(
            State(state),
            Json(QueryRequest {
                question: "what?".to_string(),
            }),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let v = body_json(resp).await;
        assert!(v
            .get("detail")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .contains("model unavailable"));
    }

    #[tokio::test]
    async fn missing_file_surfaces_the_not_found_message() {
        let state = test_state(Arc::new(FixedGenerator("unused")));
        let err = state
            .ingestor
            .ingest_document(std::path::Path::new("/no/such/upload.pdf"))
            .await
            .unwrap_err();

        let resp = failure_response(&err);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let v = body_json(resp).await;
        assert_eq!(
            v.get("detail").and_then(Value::as_str),
            Some("File not found")
        );
    }

    #[test]
    fn file_names_lose_their_path_components() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
        assert_eq!(sanitize_file_name("dir/nested.pdf"), "nested.pdf");
    }
}
