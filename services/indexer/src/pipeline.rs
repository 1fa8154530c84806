//! The end-to-end indexing pipeline (spec §4.3): lock, upsert metadata,
//! chunk, embed, decorate, write, unlock.

use crate::chunking::chunk_document;
use crate::document_index::DocumentIndex;
use retrieval_core::chunk::ChunkDocumentMetadata;
use retrieval_core::traits::{DocumentMetadataRecord, RecordOfTruth, Tokenizer};
use retrieval_core::{Document, MetadataAwareChunk, Result};
use retrieval_vector::Embedder;
use std::sync::Arc;

/// Outcome of running the pipeline over one batch of documents (spec §4.3
/// step 9): distinct new document ids and total chunks written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexingOutcome {
    pub new_document_count: usize,
    pub chunk_count: usize,
}

pub struct IndexingPipeline {
    record_of_truth: Arc<dyn RecordOfTruth>,
    embedder: Arc<dyn Embedder>,
    document_index: Arc<DocumentIndex>,
    tokenizer: Arc<dyn Tokenizer>,
    chunk_size: usize,
    chunk_overlap: usize,
    blurb_size: usize,
}

impl IndexingPipeline {
    pub fn new(
        record_of_truth: Arc<dyn RecordOfTruth>,
        embedder: Arc<dyn Embedder>,
        document_index: Arc<DocumentIndex>,
        tokenizer: Arc<dyn Tokenizer>,
        chunk_size: usize,
        chunk_overlap: usize,
        blurb_size: usize,
    ) -> Self {
        Self {
            record_of_truth,
            embedder,
            document_index,
            tokenizer,
            chunk_size,
            chunk_overlap,
            blurb_size,
        }
    }

    /// Run the pipeline over `documents` (spec §4.3 steps 1-9). Locks are
    /// released on every exit path, success or failure.
    #[tracing::instrument(skip_all, fields(document_count = documents.len()))]
    pub async fn run(&self, documents: &[Document]) -> Result<IndexingOutcome> {
        // Ascending by document id, so concurrent pipeline runs over
        // overlapping document sets always acquire locks in the same
        // order and can't deadlock against each other.
        let mut document_ids: Vec<String> = documents.iter().map(|d| d.id.clone()).collect();
        document_ids.sort_unstable();
        tracing::debug!(?document_ids, "locking documents");
        self.record_of_truth.lock_documents(&document_ids).await?;

        let result = self.run_locked(documents).await;
        if let Err(ref e) = result {
            tracing::error!(error = %e, "pipeline run failed");
        }

        self.record_of_truth.unlock_documents(&document_ids).await?;
        result
    }

    async fn run_locked(&self, documents: &[Document]) -> Result<IndexingOutcome> {
        let metadata_records: Vec<DocumentMetadataRecord> = documents
            .iter()
            .map(|document| DocumentMetadataRecord {
                connector_id: 0,
                credential_id: 0,
                document_id: document.id.clone(),
                semantic_identifier: document.semantic_identifier.clone(),
                first_non_empty_link: document.first_non_empty_link().map(str::to_string),
                primary_owners: document.primary_owners.clone(),
                secondary_owners: document.secondary_owners.clone(),
            })
            .collect();
        self.record_of_truth.upsert_metadata(&metadata_records).await?;

        let mut flat_chunks = Vec::new();
        for document in documents {
            let chunks = chunk_document(
                document,
                self.tokenizer.as_ref(),
                self.chunk_size,
                self.chunk_overlap,
                self.blurb_size,
            )?;
            flat_chunks.extend(chunks);
        }

        let embedded_chunks = self.embedder.embed(flat_chunks).await?;

        let document_ids: Vec<String> = documents.iter().map(|d| d.id.clone()).collect();
        let access = self.record_of_truth.fetch_access(&document_ids).await?;
        let document_sets = self.record_of_truth.fetch_document_sets(&document_ids).await?;

        let document_metadata: std::collections::HashMap<String, ChunkDocumentMetadata> = documents
            .iter()
            .map(|document| {
                let doc_updated_at = document
                    .doc_updated_at
                    .map(|ts| ts.timestamp())
                    .unwrap_or(retrieval_core::UNTIMED_SENTINEL);
                (
                    document.id.clone(),
                    ChunkDocumentMetadata {
                        semantic_identifier: document.semantic_identifier.clone(),
                        source_type: document.source_type.to_string(),
                        title: document.semantic_identifier.clone(),
                        doc_updated_at,
                        primary_owners: document.primary_owners.clone(),
                        secondary_owners: document.secondary_owners.clone(),
                        hidden: false,
                        metadata: document.metadata.clone(),
                    },
                )
            })
            .collect();

        let decorated: Vec<MetadataAwareChunk> = embedded_chunks
            .into_iter()
            .map(|embedded| {
                let document_id = embedded.chunk.document_id.clone();
                MetadataAwareChunk {
                    access: access.get(&document_id).cloned().unwrap_or_default(),
                    document_sets: document_sets.get(&document_id).cloned().unwrap_or_default(),
                    document_metadata: document_metadata
                        .get(&document_id)
                        .cloned()
                        .unwrap_or_else(|| ChunkDocumentMetadata {
                            semantic_identifier: String::new(),
                            source_type: String::new(),
                            title: String::new(),
                            doc_updated_at: retrieval_core::UNTIMED_SENTINEL,
                            primary_owners: Default::default(),
                            secondary_owners: Default::default(),
                            hidden: false,
                            metadata: Default::default(),
                        }),
                    embedded,
                }
            })
            .collect();

        let chunk_count = decorated.len();
        let outcomes = self.document_index.index(decorated).await?;

        let new_document_count = outcomes
            .iter()
            .filter(|o| !o.already_existed)
            .map(|o| o.document_id.clone())
            .collect::<std::collections::HashSet<_>>()
            .len();

        Ok(IndexingOutcome {
            new_document_count,
            chunk_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_of_truth::InMemoryRecordOfTruth;
    use retrieval_config::{EngineConfig, IndexingConfig, RetrievalConfig};
    use retrieval_core::traits::WhitespaceTokenizer;
    use retrieval_core::{RetrievalError, Section, SourceType};
    use retrieval_vector::MockEmbedder;

    fn sample_document(id: &str) -> Document {
        Document {
            id: id.to_string(),
            semantic_identifier: format!("{id} title"),
            source_type: SourceType::File,
            sections: vec![Section::new("hello world this is a test document")],
            metadata: Default::default(),
            primary_owners: Default::default(),
            secondary_owners: Default::default(),
            doc_updated_at: None,
        }
    }

    fn pipeline() -> IndexingPipeline {
        IndexingPipeline::new(
            Arc::new(InMemoryRecordOfTruth::new()),
            Arc::new(MockEmbedder::new(8)),
            Arc::new(DocumentIndex::new(
                EngineConfig::default(),
                IndexingConfig::default(),
                RetrievalConfig::default(),
            )),
            Arc::new(WhitespaceTokenizer),
            512,
            0,
            100,
        )
    }

    #[tokio::test]
    async fn invalid_document_fails_the_batch() {
        let pipeline = pipeline();
        let mut bad_document = sample_document("doc1");
        bad_document.id = String::new();
        let result = pipeline.run(std::slice::from_ref(&bad_document)).await;
        assert!(result.is_err());
    }

    mockall::mock! {
        FailingEmbedder {}

        #[async_trait::async_trait]
        impl Embedder for FailingEmbedder {
            async fn embed(&self, chunks: Vec<retrieval_core::Chunk>) -> Result<Vec<retrieval_core::EmbeddedChunk>>;
            fn dimension(&self) -> usize;
        }
    }

    #[tokio::test]
    async fn embedder_failure_fails_the_batch_and_unlocks_the_document() {
        let mut mock_embedder = MockFailingEmbedder::new();
        mock_embedder
            .expect_embed()
            .returning(|_| Err(RetrievalError::external_service("embedder", "model unavailable")));

        let record_of_truth = Arc::new(InMemoryRecordOfTruth::new());
        let pipeline = IndexingPipeline::new(
            record_of_truth.clone(),
            Arc::new(mock_embedder),
            Arc::new(DocumentIndex::new(
                EngineConfig::default(),
                IndexingConfig::default(),
                RetrievalConfig::default(),
            )),
            Arc::new(WhitespaceTokenizer),
            512,
            0,
            100,
        );

        let result = pipeline.run(&[sample_document("doc1")]).await;
        assert!(result.is_err());
        assert!(!record_of_truth.is_locked("doc1"));
    }
}
