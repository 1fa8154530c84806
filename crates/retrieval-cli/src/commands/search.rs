use crate::commands::Command;
use crate::context::Context;
use crate::output;
use anyhow::Result;
use async_trait::async_trait;
use clap::{Args, ValueEnum};
use retrieval_core::Chunk;
use retrieval_search::{IndexFilters, RetrievalMode};

#[derive(Args)]
pub struct SearchCommand {
    /// Search query
    pub query: String,

    /// Maximum number of results to return
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Retrieval mode
    #[arg(short, long, value_enum, default_value = "hybrid")]
    pub mode: Mode,

    /// Prefer more recently updated documents
    #[arg(long)]
    pub favor_recent: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Mode {
    Keyword,
    Semantic,
    Hybrid,
    Admin,
}

impl From<Mode> for RetrievalMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Keyword => RetrievalMode::Keyword,
            Mode::Semantic => RetrievalMode::Semantic,
            Mode::Hybrid => RetrievalMode::Hybrid,
            Mode::Admin => RetrievalMode::Admin,
        }
    }
}

#[async_trait]
impl Command for SearchCommand {
    async fn execute(&self, context: &Context) -> Result<()> {
        let mode: RetrievalMode = self.mode.into();

        let embedding = if mode.is_vector_mode() {
            let query_chunk = Chunk {
                document_id: String::new(),
                chunk_id: 0,
                blurb: self.query.clone(),
                content: self.query.clone(),
                source_links: vec![(0, None)],
                section_continuation: false,
            };
            let embedded = context.embedder.embed(vec![query_chunk]).await?;
            embedded.into_iter().next().map(|e| e.full_embedding)
        } else {
            None
        };

        let results = context
            .document_index
            .query(
                mode,
                &self.query,
                &IndexFilters::default(),
                self.favor_recent,
                self.limit,
                embedding.as_deref(),
            )
            .await?;

        if results.is_empty() {
            output::display_warning(&format!("no results for '{}'", self.query));
            return Ok(());
        }

        output::display_search_results(&results);
        Ok(())
    }
}
