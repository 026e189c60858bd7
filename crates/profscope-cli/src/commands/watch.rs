//! Watch command: replay a recording through the live sampler loop

use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::oneshot;

use profscope_core::{run_sampler, Config, ProfileSession, RawSample, SampleSource};

use super::analyze::print_insights;
use super::{parse_kind, read_records, SampleRecord};

/// Replays a recording in order, then reports exhaustion
struct FileSource {
    records: VecDeque<SampleRecord>,
}

#[async_trait]
impl SampleSource for FileSource {
    async fn fetch(&mut self) -> profscope_core::Result<Option<RawSample>> {
        Ok(self.records.pop_front().map(|r| r.samples))
    }
}

/// Replay a sample file on the configured tick, then print insights
pub async fn cmd_watch(
    config: &Config,
    file: &Path,
    kind: &str,
    interval: Option<u64>,
) -> Result<()> {
    let kind = parse_kind(kind)?;
    let records = read_records(file)?;
    if records.is_empty() {
        println!("No samples found in {}", file.display());
        return Ok(());
    }

    let interval = Duration::from_secs(interval.unwrap_or(config.session.sample_interval_secs));
    println!(
        "👀 Replaying {} {} samples from {} every {:?} (Ctrl-C to stop)\n",
        records.len(),
        kind,
        file.display(),
        interval
    );

    let session = ProfileSession::new(kind, config.session.retention, config.thresholds.clone());
    let source = FileSource {
        records: records.into(),
    };

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = shutdown_tx.send(());
    });

    let stats = run_sampler(session.clone(), source, interval, shutdown_rx).await;

    println!(
        "\n📈 Replay finished: {} merged, {} skipped, {} errors\n",
        stats.merged, stats.skipped, stats.errors
    );
    print_insights(&session.insights()?);

    Ok(())
}
