//! Aligned profiling time series
//!
//! A [`TimeSeriesStore`] holds one point per function per sample timestamp.
//! Every series always has exactly as many points as there are recorded
//! timestamps: functions missing from a sample get a zero point, and a
//! function appearing for the first time is backfilled with zeros for every
//! earlier timestamp. Detectors and the prompt builder rely on this
//! alignment and only ever read snapshots.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Profile types produced by a pprof-style endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    Cpu,
    Heap,
    Allocs,
    Goroutine,
}

impl ProfileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::Cpu => "cpu",
            ProfileKind::Heap => "heap",
            ProfileKind::Allocs => "allocs",
            ProfileKind::Goroutine => "goroutine",
        }
    }

    pub fn all() -> &'static [ProfileKind] {
        &[
            ProfileKind::Cpu,
            ProfileKind::Heap,
            ProfileKind::Allocs,
            ProfileKind::Goroutine,
        ]
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProfileKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "cpu" => Ok(ProfileKind::Cpu),
            "heap" => Ok(ProfileKind::Heap),
            "allocs" => Ok(ProfileKind::Allocs),
            "goroutine" => Ok(ProfileKind::Goroutine),
            _ => Err(format!("Unknown profile kind: {}", s)),
        }
    }
}

/// One measurement for one function at one instant
///
/// `flat` is the self cost (excluding callees), `cum` the inclusive cost.
/// Both default to zero when absent from the wire format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    #[serde(default)]
    pub flat: f64,
    #[serde(default)]
    pub cum: f64,
}

impl SamplePoint {
    pub fn new(flat: f64, cum: f64) -> Self {
        Self { flat, cum }
    }
}

/// A raw per-tick sample: function name to measured point
pub type RawSample = HashMap<String, SamplePoint>;

/// Point history for one named function
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<SamplePoint>,
}

impl Series {
    /// Latest point, or a zero point when the store is empty
    pub fn latest(&self) -> SamplePoint {
        self.points.last().copied().unwrap_or_default()
    }

    /// First recorded point
    pub fn first(&self) -> SamplePoint {
        self.points.first().copied().unwrap_or_default()
    }

    /// Highest flat value across the whole history
    pub fn peak_flat(&self) -> f64 {
        self.points.iter().map(|p| p.flat).fold(0.0, f64::max)
    }
}

/// Append-only store of aligned profiling series
///
/// Series are kept in insertion order so downstream ranking is stable when
/// values tie. A name index gives O(1) lookup during merges.
#[derive(Debug, Clone)]
pub struct TimeSeriesStore {
    dates: Vec<DateTime<Utc>>,
    series: Vec<Series>,
    index: HashMap<String, usize>,
    retention: usize,
}

impl TimeSeriesStore {
    /// Create an empty store retaining at most `retention` samples
    pub fn new(retention: usize) -> Self {
        Self {
            dates: Vec::new(),
            series: Vec::new(),
            index: HashMap::new(),
            retention: retention.max(1),
        }
    }

    /// Merge one sample into the store.
    ///
    /// Appends `timestamp` and one point to every series: the sampled value
    /// for names present in `raw`, zero for every existing series the sample
    /// does not mention. Names seen for the first time are created with zero
    /// points backfilled for all earlier timestamps. Timestamps must be
    /// strictly increasing; a stale timestamp is rejected and the store is
    /// left untouched.
    pub fn merge(&mut self, timestamp: DateTime<Utc>, raw: &RawSample) -> Result<()> {
        if let Some(&latest) = self.dates.last() {
            if timestamp <= latest {
                return Err(Error::OutOfOrderSample {
                    latest,
                    incoming: timestamp,
                });
            }
        }

        let backfill = self.dates.len();
        self.dates.push(timestamp);

        // Register unseen names first. Sorting makes series order (and
        // therefore tie-breaking) independent of map iteration order.
        let mut new_names: Vec<&String> =
            raw.keys().filter(|n| !self.index.contains_key(*n)).collect();
        new_names.sort();
        for name in new_names {
            self.index.insert(name.clone(), self.series.len());
            self.series.push(Series {
                name: name.clone(),
                points: vec![SamplePoint::default(); backfill],
            });
        }

        // Absence means zero usage at this instant, not deletion.
        for series in &mut self.series {
            let point = raw.get(&series.name).copied().unwrap_or_default();
            series.points.push(point);
        }

        if self.dates.len() > self.retention {
            self.evict_oldest();
        }

        Ok(())
    }

    /// Drop the oldest timestamp and the first point of every series
    fn evict_oldest(&mut self) {
        self.dates.remove(0);
        for series in &mut self.series {
            series.points.remove(0);
        }
    }

    /// Recorded timestamps, oldest first
    pub fn dates(&self) -> &[DateTime<Utc>] {
        &self.dates
    }

    /// All series in insertion order
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Look up a series by function name
    pub fn get(&self, name: &str) -> Option<&Series> {
        self.index.get(name).map(|&i| &self.series[i])
    }

    /// Number of recorded samples
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Timestamp of the most recent sample
    pub fn latest_date(&self) -> Option<DateTime<Utc>> {
        self.dates.last().copied()
    }

    /// Seconds covered by the recorded samples
    pub fn duration_secs(&self) -> f64 {
        match (self.dates.first(), self.dates.last()) {
            (Some(first), Some(last)) => (*last - *first).num_milliseconds() as f64 / 1000.0,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn sample(entries: &[(&str, f64, f64)]) -> RawSample {
        entries
            .iter()
            .map(|(name, flat, cum)| (name.to_string(), SamplePoint::new(*flat, *cum)))
            .collect()
    }

    #[test]
    fn test_alignment_after_merges() {
        let mut store = TimeSeriesStore::new(100);
        store.merge(ts(0), &sample(&[("a", 1.0, 2.0)])).unwrap();
        store
            .merge(ts(1), &sample(&[("a", 1.5, 2.5), ("b", 3.0, 3.0)]))
            .unwrap();
        store.merge(ts(2), &sample(&[("b", 4.0, 4.0)])).unwrap();

        assert_eq!(store.len(), 3);
        for series in store.series() {
            assert_eq!(series.points.len(), store.dates().len());
        }
    }

    #[test]
    fn test_backfill_for_late_arrival() {
        let mut store = TimeSeriesStore::new(100);
        store.merge(ts(0), &sample(&[("a", 1.0, 1.0)])).unwrap();
        store.merge(ts(1), &sample(&[("a", 1.0, 1.0)])).unwrap();
        store
            .merge(ts(2), &sample(&[("a", 1.0, 1.0), ("late", 9.0, 9.0)]))
            .unwrap();

        let late = store.get("late").unwrap();
        assert_eq!(late.points.len(), 3);
        assert_eq!(late.points[0], SamplePoint::default());
        assert_eq!(late.points[1], SamplePoint::default());
        assert_eq!(late.points[2].flat, 9.0);
    }

    #[test]
    fn test_absent_series_gets_zero_point() {
        let mut store = TimeSeriesStore::new(100);
        store.merge(ts(0), &sample(&[("a", 5.0, 5.0)])).unwrap();
        store.merge(ts(1), &sample(&[("b", 2.0, 2.0)])).unwrap();

        let a = store.get("a").unwrap();
        assert_eq!(a.points[1], SamplePoint::default());
        assert_eq!(a.latest().flat, 0.0);
    }

    #[test]
    fn test_out_of_order_rejected_store_unchanged() {
        let mut store = TimeSeriesStore::new(100);
        store.merge(ts(5), &sample(&[("a", 1.0, 1.0)])).unwrap();

        let err = store.merge(ts(5), &sample(&[("a", 2.0, 2.0)])).unwrap_err();
        assert!(matches!(err, Error::OutOfOrderSample { .. }));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().latest().flat, 1.0);

        assert!(store.merge(ts(3), &sample(&[("a", 2.0, 2.0)])).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_retention_evicts_oldest_aligned() {
        let mut store = TimeSeriesStore::new(3);
        for i in 0..5 {
            store
                .merge(ts(i), &sample(&[("a", i as f64, i as f64)]))
                .unwrap();
        }

        assert_eq!(store.len(), 3);
        assert_eq!(store.dates()[0], ts(2));
        let a = store.get("a").unwrap();
        assert_eq!(a.points.len(), 3);
        assert_eq!(a.first().flat, 2.0);
        assert_eq!(a.latest().flat, 4.0);
    }

    #[test]
    fn test_new_names_registered_in_sorted_order() {
        let mut store = TimeSeriesStore::new(100);
        store
            .merge(ts(0), &sample(&[("zeta", 1.0, 1.0), ("alpha", 1.0, 1.0)]))
            .unwrap();

        let names: Vec<&str> = store.series().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_sample_point_defaults_from_json() {
        let point: SamplePoint = serde_json::from_str(r#"{"flat": 4.2}"#).unwrap();
        assert_eq!(point.flat, 4.2);
        assert_eq!(point.cum, 0.0);

        let empty: SamplePoint = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, SamplePoint::default());
    }

    #[test]
    fn test_peak_flat() {
        let mut store = TimeSeriesStore::new(100);
        store.merge(ts(0), &sample(&[("a", 1.0, 1.0)])).unwrap();
        store.merge(ts(1), &sample(&[("a", 7.0, 7.0)])).unwrap();
        store.merge(ts(2), &sample(&[("a", 3.0, 3.0)])).unwrap();
        assert_eq!(store.get("a").unwrap().peak_flat(), 7.0);
    }

    #[test]
    fn test_profile_kind_round_trip() {
        for kind in ProfileKind::all() {
            assert_eq!(ProfileKind::from_str(kind.as_str()).unwrap(), *kind);
        }
        assert!(ProfileKind::from_str("mutex").is_err());
    }
}
