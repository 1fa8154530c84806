use crate::commands::Command;
use crate::context::Context;
use anyhow::Result;
use async_trait::async_trait;
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration (env > file > defaults)
    Show,
}

#[async_trait]
impl Command for ConfigCommand {
    async fn execute(&self, context: &Context) -> Result<()> {
        match self.action {
            ConfigAction::Show => {
                println!("{}", serde_json::to_string_pretty(&context.config)?);
            }
        }
        Ok(())
    }
}
