//! Periodic sample collection
//!
//! Drives a [`ProfileSession`] from any [`SampleSource`] on a fixed tick.
//! At most one fetch is in flight: a fetch still running when the next
//! tick is due is dropped, so a slow or hung source can never pile up
//! pending requests. Out-of-order samples from the source are logged and
//! skipped, never fatal.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::series::RawSample;
use crate::session::ProfileSession;

/// A source of raw profile samples (live endpoint, recorded file, mock)
#[async_trait]
pub trait SampleSource: Send + Sync {
    /// Fetch the next sample. `Ok(None)` means the source is exhausted
    /// and the loop should stop.
    async fn fetch(&mut self) -> Result<Option<RawSample>>;
}

/// Handle for stopping a running sampler
pub struct SamplerHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: tokio::task::JoinHandle<SamplerStats>,
}

/// Counters reported when the sampler loop exits
#[derive(Debug, Default, Clone, Copy)]
pub struct SamplerStats {
    pub merged: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl SamplerHandle {
    /// Signal shutdown and wait for the loop to report its counters
    pub async fn stop(mut self) -> SamplerStats {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.join.await.unwrap_or_default()
    }
}

/// Spawn the sampler loop for a session
pub fn spawn_sampler<S>(session: ProfileSession, source: S, interval: Duration) -> SamplerHandle
where
    S: SampleSource + 'static,
{
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = tokio::spawn(run_sampler(session, source, interval, shutdown_rx));
    SamplerHandle {
        shutdown_tx: Some(shutdown_tx),
        join,
    }
}

/// The sampler loop body
///
/// Each tick races the fetch against the tick period; a fetch that has
/// not completed by then is dropped and counted as an error. Runs until
/// the source is exhausted or shutdown fires.
pub async fn run_sampler<S>(
    session: ProfileSession,
    mut source: S,
    interval: Duration,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> SamplerStats
where
    S: SampleSource,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut stats = SamplerStats::default();

    info!(
        kind = session.kind().as_str(),
        interval_ms = interval.as_millis() as u64,
        "Sampler started"
    );

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                debug!(kind = session.kind().as_str(), "Sampler shutdown requested");
                break;
            }
            _ = ticker.tick() => {
                match tokio::time::timeout(interval, source.fetch()).await {
                    Ok(Ok(Some(raw))) => {
                        match session.ingest(Utc::now(), &raw) {
                            Ok(()) => stats.merged += 1,
                            Err(Error::OutOfOrderSample { .. }) => {
                                stats.skipped += 1;
                                warn!(
                                    kind = session.kind().as_str(),
                                    "Out-of-order sample skipped"
                                );
                            }
                            Err(e) => {
                                stats.errors += 1;
                                warn!(
                                    kind = session.kind().as_str(),
                                    error = %e,
                                    "Failed to merge sample"
                                );
                            }
                        }
                    }
                    Ok(Ok(None)) => {
                        debug!(kind = session.kind().as_str(), "Sample source exhausted");
                        break;
                    }
                    Ok(Err(e)) => {
                        stats.errors += 1;
                        warn!(
                            kind = session.kind().as_str(),
                            error = %e,
                            "Sample fetch failed"
                        );
                    }
                    Err(_) => {
                        // Fetch overran the tick period and was dropped.
                        stats.errors += 1;
                        warn!(
                            kind = session.kind().as_str(),
                            "Sample fetch timed out, dropping request"
                        );
                    }
                }
            }
        }
    }

    info!(
        kind = session.kind().as_str(),
        merged = stats.merged,
        skipped = stats.skipped,
        errors = stats.errors,
        "Sampler stopped"
    );
    stats
}
