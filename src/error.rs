use thiserror::Error;

/// Failure classes surfaced by ingestion and the retrieval chains.
///
/// `Connection` is only produced while waiting for the vector index to come
/// up; the retry loop consumes it and it never reaches a caller.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("File not found")]
    NotFound,

    #[error("Failed to load PDF: {0}")]
    Load(String),

    #[error("Failed to upload chunks to vector index: {0}")]
    Upload(String),

    #[error("Vector index not reachable: {0}")]
    Connection(String),

    #[error("Provider call failed: {0}")]
    Provider(String),
}
