use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};
use rainfall_core::{Config, Language, YahooPlaceClient};
use rmcp::ServiceExt;
use std::sync::Arc;

use crate::server::RainfallServer;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "rainfall-mcp", version, about = "Yahoo! JAPAN rainfall MCP server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the rainfall tools over stdio.
    Serve {
        /// Yahoo! JAPAN application id (Client ID).
        #[arg(long = "yahoo-app-id", env = "YAHOO_APP_ID", hide_env_values = true)]
        yahoo_app_id: Option<String>,

        /// Language of the tool responses: "ja" or "en".
        #[arg(long = "lang")]
        language: Option<Language>,
    },

    /// Store the Yahoo! JAPAN application id in the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve {
                yahoo_app_id,
                language,
            } => serve(yahoo_app_id, language).await,
            Command::Configure => configure(),
        }
    }
}

async fn serve(yahoo_app_id: Option<String>, language: Option<Language>) -> anyhow::Result<()> {
    let config = Config::load()?.resolve(yahoo_app_id, language)?;

    let source = Arc::new(YahooPlaceClient::new(config.app_id.clone()));
    let server = RainfallServer::new(source, config.language.labels());

    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .context("Failed to start MCP stdio transport")?;

    tracing::info!(
        "Yahoo Weather JP MCP Server running on stdio (API Key: {})",
        config.redacted_app_id()
    );

    service.waiting().await?;

    tracing::info!("rainfall-mcp server stopped");
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let app_id = Password::new("Yahoo! JAPAN application id:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Create one at https://e.developer.yahoo.co.jp/")
        .prompt()
        .context("Failed to read application id")?;

    let languages = Language::all().to_vec();
    let current = config.language.unwrap_or_default();
    let start = languages.iter().position(|l| *l == current).unwrap_or(0);

    let language = Select::new("Response language:", languages)
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read language")?;

    config.set_app_id(app_id.trim().to_string());
    config.language = Some(language);

    if config.app_id().is_none() {
        anyhow::bail!("Application id must not be empty");
    }

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}
