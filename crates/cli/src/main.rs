//! Spotify Hit Predictor CLI
//!
//! Ask a running predictor server (or a local artifact) whether a song
//! with the given characteristics is likely to be a hit.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{model, predict, schema};

/// Spotify Hit Predictor CLI
#[derive(Parser)]
#[command(name = "hitp")]
#[command(author, version, about = "CLI for the Spotify Hit Predictor", long_about = None)]
pub struct Cli {
    /// API endpoint URL [default: http://localhost:8501]
    #[arg(long, env = "HITP_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict whether a song is a hit
    Predict(predict::PredictArgs),

    /// Show the input fields with their bounds and defaults
    Schema,

    /// Show the status of the server's model artifact
    Model,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::Config::load()?;

    let client = client::ApiClient::new(&config.api_url(cli.api_url))?;

    match cli.command {
        Commands::Predict(args) => {
            predict::run(&client, &config, &args, cli.format).await?;
        }
        Commands::Schema => {
            schema::show_schema(&client, cli.format).await?;
        }
        Commands::Model => {
            model::show_model(&client, cli.format).await?;
        }
    }

    Ok(())
}
