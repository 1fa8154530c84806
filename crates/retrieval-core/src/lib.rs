//! Core domain models, error types and cross-cutting traits for the
//! document indexing / retrieval pipeline.
//!
//! This crate has no knowledge of HTTP, the search engine wire format, or
//! any particular embedding/tokenizer implementation. It defines the shapes
//! that flow between `retrieval-vector`, `retrieval-search` and the
//! `indexer` service.

pub mod chunk;
pub mod error;
pub mod ids;
pub mod models;
pub mod traits;

pub use chunk::{
    Chunk, ChunkDocumentMetadata, EmbeddedChunk, EngineChunk, MetadataAwareChunk, DEFAULT_BOOST,
    PUBLIC_ACL_ENTRY, UNTIMED_SENTINEL,
};
pub use error::{Result, RetrievalError};
pub use ids::chunk_uuid;
pub use models::{Document, Section, SourceType};

/// Re-export commonly used types so downstream crates don't need to pin
/// their own `chrono`/`uuid` versions.
pub use chrono::{DateTime, Utc};
pub use uuid::Uuid;
