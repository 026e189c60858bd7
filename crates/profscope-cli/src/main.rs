//! Profscope CLI - Profile time-series analysis
//!
//! Usage:
//!   profscope analyze --file samples.ndjson --kind heap     Run heuristic detectors
//!   profscope analyze --file samples.ndjson --llm           Add an LLM analysis pass
//!   profscope watch --file samples.ndjson                   Replay through the sampler loop
//!   profscope prompt --file samples.ndjson                  Print the analysis prompt
//!   profscope ollama test                                   Check backend connectivity

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            file,
            kind,
            llm,
            mock_llm,
            model,
        } => {
            commands::cmd_analyze(
                &config,
                &file,
                &kind,
                llm,
                mock_llm,
                model.as_deref(),
            )
            .await
        }
        Commands::Watch {
            file,
            kind,
            interval,
        } => commands::cmd_watch(&config, &file, &kind, interval).await,
        Commands::Prompt { file, kind } => commands::cmd_prompt(&config, &file, &kind),
        Commands::Ollama { action } => match action {
            OllamaAction::Test { generate } => commands::cmd_ollama_test(&config, generate).await,
        },
    }
}
