//! Ingestion session and analysis orchestration
//!
//! A [`ProfileSession`] owns the time-series store for one profile kind.
//! The merge path is the only writer; detectors and the analysis path work
//! from read snapshots. Analysis requests are single-flight: a new request
//! while one is pending is rejected, never queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::ai::{build_prompt, parse_analysis, AnalysisBackend, AnalysisClient, LlmAnalysis};
use crate::config::Thresholds;
use crate::error::{Error, Result};
use crate::insights::{self, ProfileInsights};
use crate::series::{ProfileKind, RawSample, TimeSeriesStore};

/// Summary used when the analysis endpoint fails
const ANALYSIS_ERROR_SUMMARY: &str = "Error analyzing profile data";

/// One profile's ingestion session
#[derive(Clone)]
pub struct ProfileSession {
    kind: ProfileKind,
    store: Arc<RwLock<TimeSeriesStore>>,
    thresholds: Thresholds,
    analysis_in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag when the analysis future completes or is
/// dropped mid-call (cancellation must not wedge the session).
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ProfileSession {
    pub fn new(kind: ProfileKind, retention: usize, thresholds: Thresholds) -> Self {
        Self {
            kind,
            store: Arc::new(RwLock::new(TimeSeriesStore::new(retention))),
            thresholds,
            analysis_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    /// Merge one sample into the store. This is the sole write path.
    pub fn ingest(&self, timestamp: DateTime<Utc>, raw: &RawSample) -> Result<()> {
        let mut store = self
            .store
            .write()
            .map_err(|_| Error::InvalidData("Failed to acquire store lock".into()))?;
        store.merge(timestamp, raw)?;
        debug!(
            kind = self.kind.as_str(),
            samples = store.len(),
            functions = store.series().len(),
            "Sample merged"
        );
        Ok(())
    }

    /// Number of samples currently retained
    pub fn sample_count(&self) -> usize {
        self.store.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Run the heuristic detectors against a snapshot of the store
    pub fn insights(&self) -> Result<ProfileInsights> {
        let store = self
            .store
            .read()
            .map_err(|_| Error::InvalidData("Failed to acquire store lock".into()))?;
        Ok(insights::analyze(self.kind, &store, &self.thresholds))
    }

    /// Build the analysis prompt from the current snapshot
    pub fn prompt(&self) -> Result<String> {
        let store = self
            .store
            .read()
            .map_err(|_| Error::InvalidData("Failed to acquire store lock".into()))?;
        Ok(build_prompt(self.kind, &store))
    }

    /// Request an external analysis of the current snapshot.
    ///
    /// At most one analysis call may be outstanding per session; a second
    /// request while one is pending fails with
    /// [`Error::AnalysisInProgress`] without disturbing the pending call.
    /// Transport and format failures are not propagated: the caller gets
    /// an empty analysis with an error summary, and the failure is logged.
    pub async fn analyze(&self, client: &AnalysisClient) -> Result<LlmAnalysis> {
        if self
            .analysis_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::AnalysisInProgress);
        }
        let _guard = InFlightGuard(self.analysis_in_flight.clone());

        let prompt = self.prompt()?;
        debug!(
            kind = self.kind.as_str(),
            model = client.model(),
            host = client.host(),
            "Requesting profile analysis"
        );

        match client.generate(&prompt).await {
            Ok(raw) => Ok(parse_analysis(&raw)),
            Err(e) => {
                warn!(
                    kind = self.kind.as_str(),
                    error = %e,
                    "Profile analysis failed, returning empty result"
                );
                Ok(LlmAnalysis::empty(ANALYSIS_ERROR_SUMMARY))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;
    use crate::series::SamplePoint;
    use chrono::TimeZone;
    use std::time::Duration;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn session_with_samples() -> ProfileSession {
        let session = ProfileSession::new(ProfileKind::Heap, 128, Thresholds::default());
        for i in 0..3 {
            let raw: RawSample = [(
                "app.cache".to_string(),
                SamplePoint::new(100.0 + i as f64 * 20.0, 120.0),
            )]
            .into_iter()
            .collect();
            session.ingest(ts(i), &raw).unwrap();
        }
        session
    }

    #[test]
    fn test_ingest_and_insights() {
        let session = session_with_samples();
        assert_eq!(session.sample_count(), 3);

        let insights = session.insights().unwrap();
        assert_eq!(insights.summary, "Analyzing 3 heap snapshots");
        // 100 -> 140 is 40% growth
        assert!(insights.insights.iter().any(|i| i.metric == "heap_growth"));
    }

    #[test]
    fn test_out_of_order_ingest_propagates() {
        let session = session_with_samples();
        let raw: RawSample = RawSample::new();
        assert!(matches!(
            session.ingest(ts(0), &raw),
            Err(Error::OutOfOrderSample { .. })
        ));
        assert_eq!(session.sample_count(), 3);
    }

    #[tokio::test]
    async fn test_analyze_success() {
        let session = session_with_samples();
        let client = AnalysisClient::mock();

        let analysis = session.analyze(&client).await.unwrap();
        assert_eq!(analysis.insights.len(), 2);
        assert_eq!(analysis.summary, "Mock analysis of the submitted profile.");
    }

    #[tokio::test]
    async fn test_analyze_transport_failure_degrades() {
        let session = session_with_samples();
        let client = AnalysisClient::Mock(MockBackend::failing());

        let analysis = session.analyze(&client).await.unwrap();
        assert!(analysis.is_empty());
        assert_eq!(analysis.summary, ANALYSIS_ERROR_SUMMARY);
    }

    #[tokio::test]
    async fn test_single_flight() {
        let session = session_with_samples();
        let slow = AnalysisClient::Mock(
            MockBackend::new().with_latency(Duration::from_millis(50)),
        );
        let fast = AnalysisClient::mock();

        // join! polls in order: the slow call claims the slot first, the
        // second request must be rejected without affecting the first.
        let (first, second) = tokio::join!(session.analyze(&slow), session.analyze(&fast));

        assert_eq!(first.unwrap().insights.len(), 2);
        assert!(matches!(second, Err(Error::AnalysisInProgress)));
    }

    #[tokio::test]
    async fn test_flag_released_after_completion() {
        let session = session_with_samples();
        let client = AnalysisClient::mock();

        session.analyze(&client).await.unwrap();
        // A later request succeeds once the first finished.
        assert!(session.analyze(&client).await.is_ok());
    }

    #[tokio::test]
    async fn test_flag_released_on_cancellation() {
        let session = session_with_samples();
        let slow = AnalysisClient::Mock(
            MockBackend::new().with_latency(Duration::from_secs(30)),
        );

        let pending = session.clone();
        let handle = tokio::spawn(async move {
            let _ = pending.analyze(&slow).await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.abort();
        let _ = handle.await;

        // The dropped call released the slot.
        let client = AnalysisClient::mock();
        assert!(session.analyze(&client).await.is_ok());
    }
}
