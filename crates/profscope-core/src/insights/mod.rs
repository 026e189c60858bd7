//! Heuristic insight detectors
//!
//! Each detector is a pure function of a store snapshot and the configured
//! thresholds. Detectors never fail: degenerate input (no samples, zero
//! totals) yields an empty insight list, and profile kinds without a
//! detector yield an empty result with a generic summary.

mod cpu;
mod heap;
mod types;

pub use types::{Insight, ProfileInsights, Severity, TopConsumer};

use crate::config::Thresholds;
use crate::series::{ProfileKind, TimeSeriesStore};

/// Run the detector for `kind` against a store snapshot
pub fn analyze(kind: ProfileKind, store: &TimeSeriesStore, thresholds: &Thresholds) -> ProfileInsights {
    match kind {
        ProfileKind::Heap => heap::analyze(store, thresholds),
        ProfileKind::Cpu => cpu::analyze(store, thresholds),
        _ => ProfileInsights::empty(format!("No insights available for {}", kind)),
    }
}

/// Rank `(name, latest flat)` entries and annotate with share of `total`.
///
/// The sort is stable and the input arrives in store insertion order, so
/// equal values keep a deterministic ranking.
fn rank_consumers(mut entries: Vec<(String, f64)>, total: f64, limit: usize) -> Vec<TopConsumer> {
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    entries
        .into_iter()
        .take(limit)
        .map(|(name, value)| TopConsumer {
            name,
            value,
            percentage_of_total: if total > 0.0 { value / total * 100.0 } else { 0.0 },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::SamplePoint;
    use chrono::{TimeZone, Utc};

    pub(super) fn store_from(rows: &[&[(&str, f64)]]) -> TimeSeriesStore {
        let mut store = TimeSeriesStore::new(1024);
        for (i, row) in rows.iter().enumerate() {
            let raw = row
                .iter()
                .map(|(name, flat)| (name.to_string(), SamplePoint::new(*flat, *flat)))
                .collect();
            let ts = Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap();
            store.merge(ts, &raw).unwrap();
        }
        store
    }

    #[test]
    fn test_unsupported_kind_is_empty_with_summary() {
        let store = store_from(&[&[("main.work", 10.0)]]);
        let thresholds = Thresholds::default();

        for kind in [ProfileKind::Allocs, ProfileKind::Goroutine] {
            let result = analyze(kind, &store, &thresholds);
            assert!(result.insights.is_empty());
            assert!(result.top_consumers.is_empty());
            assert_eq!(result.summary, format!("No insights available for {}", kind));
        }
    }

    #[test]
    fn test_rank_consumers_stable_on_ties() {
        let entries = vec![
            ("first".to_string(), 5.0),
            ("second".to_string(), 5.0),
            ("big".to_string(), 9.0),
        ];
        let ranked = rank_consumers(entries, 19.0, 3);
        assert_eq!(ranked[0].name, "big");
        assert_eq!(ranked[1].name, "first");
        assert_eq!(ranked[2].name, "second");
    }

    #[test]
    fn test_rank_consumers_zero_total() {
        let ranked = rank_consumers(vec![("a".to_string(), 0.0)], 0.0, 5);
        assert_eq!(ranked[0].percentage_of_total, 0.0);
    }
}
