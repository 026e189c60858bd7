//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - Run heuristic detectors (and optionally LLM analysis) on a sample file
//! - `ollama` - Ollama backend commands (test)
//! - `prompt` - Print the analysis prompt for a sample file
//! - `watch` - Replay a sample file through the live sampler loop
//!
//! Shared helpers for config resolution and NDJSON replay files live here.

pub mod analyze;
pub mod ollama;
pub mod prompt;
pub mod watch;

// Re-export command functions for main.rs
pub use analyze::*;
pub use ollama::*;
pub use prompt::*;
pub use watch::*;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use profscope_core::{Config, ProfileKind, ProfileSession, RawSample};

/// One line of an NDJSON sample recording
#[derive(Debug, Deserialize)]
pub struct SampleRecord {
    pub timestamp: DateTime<Utc>,
    pub samples: RawSample,
}

/// Resolve config: explicit --config path wins over the default resolution
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Config::load().context("Failed to load config"),
    }
}

/// Parse a recorded NDJSON sample file. Blank lines are skipped; a
/// malformed line fails the whole load with its line number.
pub fn read_records(path: &Path) -> Result<Vec<SampleRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open sample file {}", path.display()))?;
    let mut records = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: SampleRecord = serde_json::from_str(&line)
            .with_context(|| format!("Invalid sample record on line {}", i + 1))?;
        records.push(record);
    }
    Ok(records)
}

/// Parse the profile kind argument
pub fn parse_kind(kind: &str) -> Result<ProfileKind> {
    kind.parse().map_err(|e: String| anyhow::anyhow!(e))
}

/// Build a session and ingest a whole recording, reporting skipped samples
pub fn session_from_records(
    config: &Config,
    kind: ProfileKind,
    records: &[SampleRecord],
) -> Result<ProfileSession> {
    let session = ProfileSession::new(kind, config.session.retention, config.thresholds.clone());
    let mut skipped = 0;
    for record in records {
        if session.ingest(record.timestamp, &record.samples).is_err() {
            skipped += 1;
        }
    }
    if skipped > 0 {
        println!("  ⚠️  Skipped {} out-of-order samples", skipped);
    }
    Ok(session)
}
