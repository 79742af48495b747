use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use document_rag_server::chains::{hyde::HydeChain, standard::RagChain};
use document_rag_server::config::{Config, EmbeddingsBackend};
use document_rag_server::eval;
use document_rag_server::index::qdrant::{IndexSettings, QdrantIndex};
use document_rag_server::ingest::IngestPipeline;
use document_rag_server::providers::{hash::HashEmbedder, ollama::OllamaClient, Embedder, Generator};
use document_rag_server::server::{self, AppState};

fn wants_help(args: &[String]) -> bool {
    args.iter()
        .skip(1)
        .any(|a| a == "-h" || a == "--help" || a == "help")
}

fn wants_version(args: &[String]) -> bool {
    args.iter()
        .skip(1)
        .any(|a| a == "-V" || a == "--version" || a == "version")
}

fn wants_eval(args: &[String]) -> bool {
    args.iter().skip(1).any(|a| a == "eval")
}

fn print_help() {
    println!("document-rag-server");
    println!();
    println!("RAG service over PDF documents: ingest, retrieve, answer.");
    println!();
    println!("Usage:");
    println!("  document-rag-server            start the HTTP server");
    println!("  document-rag-server eval       run the evaluation harness");
    println!("  document-rag-server --help");
    println!("  document-rag-server --version");
    println!();
    println!("Env (defaults shown):");
    println!("  SERVER_ADDR=127.0.0.1:8000");
    println!("  VECTOR_INDEX_HOST=localhost");
    println!("  VECTOR_INDEX_PORT=6333");
    println!("  VECTOR_INDEX_GRPC_PORT=6334");
    println!("  COLLECTION_NAME=document_chunks");
    println!("  CONNECT_RETRY_SECS=5");
    println!("  OLLAMA_BASE_URL=http://localhost:11434");
    println!("  EMBEDDING_MODEL=nomic-embed-text");
    println!("  LLM_MODEL=llama3");
    println!("  EMBEDDINGS_BACKEND=ollama|hash   (default: ollama)");
    println!("  HASH_EMBEDDING_DIM=64");
    println!("  CHUNK_SIZE=1000");
    println!("  CHUNK_OVERLAP=100");
    println!("  RETRIEVAL_TOP_K=4");
    println!("  UPLOAD_DIR=data");
    println!("  EVAL_REPORT_PATH=data/evaluation_report.csv");
    println!("  JUDGE_TIMEOUT_SECS=360");
    println!();
    println!("Endpoints:");
    println!("  GET  /            liveness");
    println!("  POST /chat        answer via standard retrieval");
    println!("  POST /hyde-chat   answer via HyDE retrieval");
    println!("  POST /upload      multipart PDF upload + ingestion");
}

fn print_version() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = std::env::args().collect::<Vec<_>>();
    if wants_help(&args) {
        print_help();
        return Ok(());
    }
    if wants_version(&args) {
        print_version();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting document-rag-server"
    );

    run(wants_eval(&args)).await
}

async fn run(eval_mode: bool) -> Result<()> {
    let config = Arc::new(Config::from_env()?);

    let index = Arc::new(
        QdrantIndex::connect(IndexSettings {
            host: config.vector_host.clone(),
            http_port: config.vector_port,
            grpc_port: config.vector_grpc_port,
            collection: config.collection_name.clone(),
            retry_interval: Duration::from_secs(config.connect_retry_secs),
        })
        .await,
    );

    let ollama = Arc::new(OllamaClient::new(
        &config.ollama_base_url,
        &config.embedding_model,
        &config.llm_model,
    ));
    let embedder: Arc<dyn Embedder> = match config.embeddings_backend {
        EmbeddingsBackend::Ollama => ollama.clone(),
        EmbeddingsBackend::Hash => Arc::new(HashEmbedder::new(config.hash_embedding_dim)),
    };
    let generator: Arc<dyn Generator> = ollama;

    let standard = RagChain::new(
        embedder.clone(),
        index.clone(),
        generator.clone(),
        config.retrieval_top_k,
    );
    let hyde = HydeChain::new(
        embedder.clone(),
        index.clone(),
        generator,
        config.retrieval_top_k,
    );

    if eval_mode {
        // The judge gets its own client with a generous per-request timeout;
        // local inference can take minutes per completion.
        let judge: Arc<dyn Generator> = Arc::new(OllamaClient::with_timeout(
            &config.ollama_base_url,
            &config.embedding_model,
            &config.llm_model,
            Duration::from_secs(config.judge_timeout_secs),
        )?);
        eval::run_eval(&standard, &hyde, judge, &config.eval_report_path).await?;
        return Ok(());
    }

    let ingestor = IngestPipeline::new(
        embedder,
        index,
        config.chunk_size,
        config.chunk_overlap,
    );
    let state = AppState {
        config: config.clone(),
        standard,
        hyde,
        ingestor,
    };
    server::serve(state, config.server_addr).await
}
