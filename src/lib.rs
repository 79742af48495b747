//! Retrieval-augmented generation service over PDF documents.
//!
//! Documents are split into overlapping chunks, embedded, and stored in a
//! vector index. Questions are answered either by embedding the question
//! directly (standard chain) or by first drafting a hypothetical passage and
//! embedding that instead (HyDE chain).

pub mod chains;
pub mod config;
pub mod error;
pub mod eval;
pub mod index;
pub mod ingest;
pub mod providers;
pub mod server;
