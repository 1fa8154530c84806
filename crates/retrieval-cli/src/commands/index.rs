use crate::commands::Command;
use crate::connector;
use crate::context::Context;
use crate::output;
use anyhow::{bail, Result};
use async_trait::async_trait;
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct IndexCommand {
    /// Directory of markdown documents to index
    pub path: PathBuf,
}

#[async_trait]
impl Command for IndexCommand {
    async fn execute(&self, context: &Context) -> Result<()> {
        if !self.path.is_dir() {
            bail!("not a directory: {}", self.path.display());
        }

        let documents = connector::load_documents(&self.path)?;
        if documents.is_empty() {
            output::display_warning(&format!(
                "no markdown files found under {}",
                self.path.display()
            ));
            return Ok(());
        }

        let outcome = context.pipeline().run(&documents).await?;
        output::display_success(&format!(
            "indexed {} documents ({} new), {} chunks written",
            documents.len(),
            outcome.new_document_count,
            outcome.chunk_count
        ));
        Ok(())
    }
}
