//! Triage Control - terminal front end for the hardware triage engine.
//!
//! Thin rendering adapter: reads terminal input, translates it into
//! `UserEvent`s, and prints the transcript. All triage logic lives in
//! `triage_core`.

mod repl;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use triage_core::{HttpLlmClient, TriageConfig, TriageSession};

#[derive(Parser)]
#[command(name = "triagectl")]
#[command(about = "Hardware support triage assistant", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the LLM endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Override the LLM model
    #[arg(long)]
    model: Option<String>,

    /// Run without the LLM capability (deterministic fallbacks only)
    #[arg(long)]
    offline: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from("triage.toml"));
    let mut config = TriageConfig::load(&config_path)?;

    if let Some(endpoint) = cli.endpoint {
        config.llm.endpoint = endpoint;
    }
    if let Some(model) = cli.model {
        config.llm.model = model;
    }
    if cli.offline {
        config.llm.enabled = false;
    }

    let client = Arc::new(HttpLlmClient::new(config.llm)?);
    let session = TriageSession::new(client);

    repl::run(session)
}
