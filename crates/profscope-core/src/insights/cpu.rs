//! CPU profile detector
//!
//! Ranks the functions burning the most CPU time and warns when the total
//! crosses the configured budget. Runtime internals are hidden except for
//! the GC/allocator entries users actually need to see.

use chrono::Utc;

use crate::config::Thresholds;
use crate::series::TimeSeriesStore;

use super::types::{Insight, ProfileInsights, Severity};
use super::rank_consumers;

/// Whether a series counts toward user-visible CPU time.
///
/// The synthetic `total` series is always dropped. runtime.* entries are
/// dropped too unless they match the keep-list (GC, malloc, memclr by
/// default) since those reflect pressure caused by user code.
fn is_user_relevant(name: &str, keep: &[String]) -> bool {
    if name == "total" {
        return false;
    }
    if name.starts_with("runtime.") {
        return keep.iter().any(|k| name.contains(k.as_str()));
    }
    true
}

pub fn analyze(store: &TimeSeriesStore, thresholds: &Thresholds) -> ProfileInsights {
    let mut insights = Vec::new();
    let timestamp = store.latest_date().unwrap_or_else(Utc::now);

    let relevant: Vec<(String, f64)> = store
        .series()
        .iter()
        .filter(|s| is_user_relevant(&s.name, &thresholds.cpu_runtime_keep))
        .map(|s| (s.name.clone(), s.latest().flat))
        .collect();

    let total_cpu_ms: f64 = relevant.iter().map(|(_, v)| v).sum();
    let top_consumers = rank_consumers(relevant, total_cpu_ms, thresholds.top_consumers);

    if total_cpu_ms > 0.0 {
        insights.push(
            Insight::new(
                Severity::Info,
                format!("Total CPU time: {:.2}ms in last profile", total_cpu_ms),
                timestamp,
                "cpu_time",
            )
            .with_value(total_cpu_ms),
        );
    }

    for consumer in &top_consumers {
        if consumer.percentage_of_total > thresholds.cpu_consumer_pct {
            insights.push(
                Insight::new(
                    Severity::Info,
                    format!(
                        "{} consumed {:.1}% of CPU time",
                        consumer.name, consumer.percentage_of_total
                    ),
                    timestamp,
                    "cpu_usage",
                )
                .with_value(consumer.value),
            );
        }
    }

    if total_cpu_ms > thresholds.cpu_high_usage_ms {
        insights.push(
            Insight::new(
                Severity::Warning,
                format!(
                    "High CPU usage detected: {:.1}ms in 1s sample",
                    total_cpu_ms
                ),
                timestamp,
                "cpu_high_usage",
            )
            .with_value(total_cpu_ms),
        );
    }

    ProfileInsights {
        insights,
        top_consumers,
        summary: format!("Analyzing {} CPU samples", store.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::tests::store_from;

    #[test]
    fn test_keep_list_retains_allocator_entries() {
        let store = store_from(&[&[
            ("runtime.mallocgc", 50.0),
            ("runtime.gcBgMarkWorker", 30.0),
            ("runtime.memclrNoHeapPointers", 10.0),
            ("main.process", 10.0),
        ]]);
        let result = analyze(&store, &Thresholds::default());

        let names: Vec<&str> = result
            .top_consumers
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert!(names.contains(&"runtime.mallocgc"));
        assert!(names.contains(&"runtime.gcBgMarkWorker"));
        assert!(names.contains(&"runtime.memclrNoHeapPointers"));
        assert!(names.contains(&"main.process"));
    }

    #[test]
    fn test_internal_runtime_and_total_excluded() {
        let store = store_from(&[&[
            ("runtime.futex", 80.0),
            ("total", 100.0),
            ("main.work", 20.0),
        ]]);
        let result = analyze(&store, &Thresholds::default());

        assert_eq!(result.top_consumers.len(), 1);
        assert_eq!(result.top_consumers[0].name, "main.work");
        // Excluded series also do not count toward total CPU time.
        assert_eq!(result.top_consumers[0].percentage_of_total, 100.0);
    }

    #[test]
    fn test_high_usage_warning() {
        let store = store_from(&[&[("main.spin", 25.0)]]);
        let result = analyze(&store, &Thresholds::default());

        let warning = result
            .insights
            .iter()
            .find(|i| i.severity == Severity::Warning)
            .unwrap();
        assert_eq!(warning.metric, "cpu_high_usage");
        assert_eq!(warning.value, Some(25.0));
    }

    #[test]
    fn test_no_warning_under_budget() {
        let store = store_from(&[&[("main.idle", 5.0)]]);
        let result = analyze(&store, &Thresholds::default());
        assert!(result.insights.iter().all(|i| i.severity == Severity::Info));
    }

    #[test]
    fn test_consumer_threshold() {
        let store = store_from(&[&[("main.hot", 96.0), ("main.cold", 4.0)]]);
        let result = analyze(&store, &Thresholds::default());

        let usages: Vec<_> = result
            .insights
            .iter()
            .filter(|i| i.metric == "cpu_usage")
            .collect();
        assert_eq!(usages.len(), 1);
        assert!(usages[0].message.starts_with("main.hot"));
    }

    #[test]
    fn test_zero_total_no_insights() {
        let store = store_from(&[&[("main.done", 0.0)]]);
        let result = analyze(&store, &Thresholds::default());
        assert!(result.insights.is_empty());
        assert_eq!(result.summary, "Analyzing 1 CPU samples");
    }
}
