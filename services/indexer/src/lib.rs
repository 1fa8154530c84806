//! The indexing service: chunks documents, embeds them, decorates them
//! with access/document-set metadata and writes them to the search engine
//! (spec §4 "Indexing pipeline").

pub mod chunking;
pub mod document_index;
pub mod pipeline;
pub mod record_of_truth;

pub use chunking::chunk_document;
pub use document_index::{DocumentIndex, IndexOutcome, UpdateRequest};
pub use pipeline::{IndexingOutcome, IndexingPipeline};
pub use record_of_truth::InMemoryRecordOfTruth;
