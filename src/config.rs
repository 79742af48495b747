use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::{env, net::SocketAddr, path::PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingsBackend {
    Ollama,
    Hash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub vector_host: String,
    pub vector_port: u16,
    pub vector_grpc_port: u16,
    pub collection_name: String,
    pub connect_retry_secs: u64,

    pub ollama_base_url: String,
    pub embedding_model: String,
    pub llm_model: String,
    pub embeddings_backend: EmbeddingsBackend,
    pub hash_embedding_dim: usize,

    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub retrieval_top_k: usize,

    pub upload_dir: PathBuf,
    pub eval_report_path: PathBuf,
    pub judge_timeout_secs: u64,

    pub server_addr: SocketAddr,
}

impl Config {
    /// Reads configuration from the environment. Every variable has a
    /// local-development default, so an empty environment yields a working
    /// config pointed at localhost services.
    pub fn from_env() -> Result<Self> {
        let vector_host =
            optional_env("VECTOR_INDEX_HOST").unwrap_or_else(|| "localhost".to_string());
        let vector_port = optional_env("VECTOR_INDEX_PORT")
            .as_deref()
            .map(parse_u16)
            .transpose()?
            .unwrap_or(6333);
        let vector_grpc_port = optional_env("VECTOR_INDEX_GRPC_PORT")
            .as_deref()
            .map(parse_u16)
            .transpose()?
            .unwrap_or(6334);
        let collection_name =
            optional_env("COLLECTION_NAME").unwrap_or_else(|| "document_chunks".to_string());
        let connect_retry_secs = optional_env("CONNECT_RETRY_SECS")
            .as_deref()
            .map(parse_u64)
            .transpose()?
            .unwrap_or(5);

        let ollama_base_url = optional_env("OLLAMA_BASE_URL")
            .unwrap_or_else(|| "http://localhost:11434".to_string())
            .trim_end_matches('/')
            .to_string();
        let embedding_model =
            optional_env("EMBEDDING_MODEL").unwrap_or_else(|| "nomic-embed-text".to_string());
        let llm_model = optional_env("LLM_MODEL").unwrap_or_else(|| "llama3".to_string());

        let embeddings_backend = optional_env("EMBEDDINGS_BACKEND")
            .as_deref()
            .map(parse_embeddings_backend)
            .transpose()?
            .unwrap_or(EmbeddingsBackend::Ollama);
        let hash_embedding_dim = optional_env("HASH_EMBEDDING_DIM")
            .as_deref()
            .map(parse_usize)
            .transpose()?
            .unwrap_or(64);

        let chunk_size = optional_env("CHUNK_SIZE")
            .as_deref()
            .map(parse_usize)
            .transpose()?
            .unwrap_or(1000);
        let chunk_overlap = optional_env("CHUNK_OVERLAP")
            .as_deref()
            .map(parse_usize)
            .transpose()?
            .unwrap_or(100);
        if chunk_size == 0 {
            return Err(anyhow!("CHUNK_SIZE must be positive"));
        }
        if chunk_overlap >= chunk_size {
            return Err(anyhow!(
                "CHUNK_OVERLAP ({chunk_overlap}) must be smaller than CHUNK_SIZE ({chunk_size})"
            ));
        }

        let retrieval_top_k = optional_env("RETRIEVAL_TOP_K")
            .as_deref()
            .map(parse_usize)
            .transpose()?
            .unwrap_or(4)
            .max(1);

        let upload_dir = optional_env("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));
        let eval_report_path = optional_env("EVAL_REPORT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/evaluation_report.csv"));
        let judge_timeout_secs = optional_env("JUDGE_TIMEOUT_SECS")
            .as_deref()
            .map(parse_u64)
            .transpose()?
            .unwrap_or(360);

        let server_addr = optional_env("SERVER_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8000".to_string())
            .parse::<SocketAddr>()
            .map_err(|err| anyhow!("Invalid SERVER_ADDR: {err}"))?;

        Ok(Self {
            vector_host,
            vector_port,
            vector_grpc_port,
            collection_name,
            connect_retry_secs,
            ollama_base_url,
            embedding_model,
            llm_model,
            embeddings_backend,
            hash_embedding_dim,
            chunk_size,
            chunk_overlap,
            retrieval_top_k,
            upload_dir,
            eval_report_path,
            judge_timeout_secs,
            server_addr,
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|v| {
        let v = v.trim().to_string();
        if v.is_empty() {
            None
        } else {
            Some(v)
        }
    })
}

fn parse_embeddings_backend(value: &str) -> Result<EmbeddingsBackend> {
    match value.trim().to_lowercase().as_str() {
        "ollama" => Ok(EmbeddingsBackend::Ollama),
        "hash" => Ok(EmbeddingsBackend::Hash),
        other => Err(anyhow!("Invalid EMBEDDINGS_BACKEND: {other}")),
    }
}

fn parse_usize(value: &str) -> Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|err| anyhow!("Invalid integer '{value}': {err}"))
}

fn parse_u64(value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|err| anyhow!("Invalid integer '{value}': {err}"))
}

fn parse_u16(value: &str) -> Result<u16> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|err| anyhow!("Invalid port '{value}': {err}"))
}
