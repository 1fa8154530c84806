//! Query construction and result decoding for the four retrieval modes
//! (keyword / semantic / hybrid / admin) described in spec §4.5-§4.6.
//!
//! This crate knows the shape of a structured query and of an engine hit;
//! it has no HTTP client of its own — the `indexer` service's
//! `DocumentIndex` adapter sends the built query and hands back raw hits.

pub mod models;
pub mod query_builder;
pub mod result_decoder;

pub use models::{InferenceChunk, IndexFilters, RetrievalMode, StructuredQuery};
pub use query_builder::{QueryBuilder, RetrievalQueryConfig};
pub use result_decoder::{hit_to_inference_chunk, process_dynamic_summary, EngineHit};
