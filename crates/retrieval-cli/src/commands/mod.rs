pub mod config;
pub mod index;
pub mod search;
pub mod status;

use crate::context::Context;
use anyhow::Result;
use async_trait::async_trait;

/// Common shape for every CLI subcommand.
#[async_trait]
pub trait Command {
    async fn execute(&self, context: &Context) -> Result<()>;
}
