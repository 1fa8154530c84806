use crate::commands::Command;
use crate::context::Context;
use crate::output;
use anyhow::Result;
use async_trait::async_trait;
use clap::Args;
use retrieval_observability::HealthChecker;

#[derive(Args)]
pub struct StatusCommand;

#[async_trait]
impl Command for StatusCommand {
    async fn execute(&self, context: &Context) -> Result<()> {
        let mut checker = HealthChecker::new(env!("CARGO_PKG_VERSION"));
        checker.add_check(context.document_index.health_check());
        let report = checker.check_health().await;
        output::display_health(&report);
        Ok(())
    }
}
