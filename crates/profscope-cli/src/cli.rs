//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Profscope - Profile time-series analysis with optional LLM insights
#[derive(Parser)]
#[command(name = "profscope")]
#[command(about = "Analyze recorded pprof-style profile samples", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to the data-dir override, then embedded defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a recorded sample file
    Analyze {
        /// NDJSON sample file (one {"timestamp", "samples"} object per line)
        #[arg(short, long)]
        file: PathBuf,

        /// Profile kind: cpu, heap, allocs, goroutine
        #[arg(short, long, default_value = "heap")]
        kind: String,

        /// Also request an LLM analysis from the configured Ollama endpoint
        #[arg(long)]
        llm: bool,

        /// Use the built-in mock backend instead of Ollama (for demos/tests)
        #[arg(long, conflicts_with = "llm")]
        mock_llm: bool,

        /// Override the configured model name
        #[arg(long)]
        model: Option<String>,
    },

    /// Replay a recorded sample file through the live sampler loop
    Watch {
        /// NDJSON sample file to replay
        #[arg(short, long)]
        file: PathBuf,

        /// Profile kind: cpu, heap, allocs, goroutine
        #[arg(short, long, default_value = "heap")]
        kind: String,

        /// Seconds between replayed samples (overrides config)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Print the analysis prompt that would be sent for a sample file
    Prompt {
        /// NDJSON sample file
        #[arg(short, long)]
        file: PathBuf,

        /// Profile kind: cpu, heap, allocs, goroutine
        #[arg(short, long, default_value = "heap")]
        kind: String,
    },

    /// Manage the Ollama analysis backend
    Ollama {
        #[command(subcommand)]
        action: OllamaAction,
    },
}

#[derive(Subcommand)]
pub enum OllamaAction {
    /// Test connectivity and run a sample analysis round trip
    Test {
        /// Send a generate request with synthetic profile data
        #[arg(long)]
        generate: bool,
    },
}
