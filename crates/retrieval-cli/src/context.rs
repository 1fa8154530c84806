use anyhow::{Context as _, Result};
use retrieval_config::{load_config, AppConfig};
use retrieval_core::traits::{RecordOfTruth, Tokenizer, WhitespaceTokenizer};
use retrieval_indexer::{DocumentIndex, IndexingPipeline, InMemoryRecordOfTruth};
use retrieval_vector::{Embedder, MockEmbedder};
use std::path::Path;
use std::sync::Arc;

/// Everything a command needs to run: loaded config plus the wired-up
/// pipeline collaborators. No real connector, tokenizer or embedder ships
/// with this crate (spec §1 scopes those out), so this assembles the same
/// in-memory/mock stand-ins the library's own tests use — sufficient to
/// drive the pipeline end-to-end against a real engine.
pub struct Context {
    pub config: AppConfig,
    pub document_index: Arc<DocumentIndex>,
    pub record_of_truth: Arc<dyn RecordOfTruth>,
    pub tokenizer: Arc<dyn Tokenizer>,
    pub embedder: Arc<dyn Embedder>,
}

impl Context {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = load_config(config_path).context("loading configuration")?;
        config.validate().context("validating configuration")?;
        let document_index = Arc::new(DocumentIndex::new(
            config.engine.clone(),
            config.indexing.clone(),
            config.retrieval.clone(),
        ));
        Ok(Self {
            embedder: Arc::new(MockEmbedder::new(384)),
            document_index,
            record_of_truth: Arc::new(InMemoryRecordOfTruth::new()),
            tokenizer: Arc::new(WhitespaceTokenizer),
            config,
        })
    }

    pub fn pipeline(&self) -> IndexingPipeline {
        IndexingPipeline::new(
            self.record_of_truth.clone(),
            self.embedder.clone(),
            self.document_index.clone(),
            self.tokenizer.clone(),
            self.config.indexing.chunk_size,
            self.config.indexing.chunk_overlap,
            self.config.indexing.blurb_size,
        )
    }
}
