//! Heap profile detector
//!
//! Flags sustained heap growth, reports the total live size, and calls out
//! the functions holding the largest share of the heap.

use chrono::Utc;

use crate::config::Thresholds;
use crate::series::TimeSeriesStore;

use super::types::{Insight, ProfileInsights, Severity};
use super::rank_consumers;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

pub fn analyze(store: &TimeSeriesStore, thresholds: &Thresholds) -> ProfileInsights {
    let mut insights = Vec::new();
    let timestamp = store.latest_date().unwrap_or_else(Utc::now);

    // Total includes runtime internals and the synthetic total series;
    // only the top-consumer ranking filters those out.
    let total_heap: f64 = store.series().iter().map(|s| s.latest().flat).sum();

    let consumers: Vec<(String, f64)> = store
        .series()
        .iter()
        .filter(|s| !s.name.starts_with("runtime.") && s.name != "total")
        .map(|s| (s.name.clone(), s.latest().flat))
        .collect();
    let top_consumers = rank_consumers(consumers, total_heap, thresholds.top_consumers);

    if store.len() > 1 {
        let first_total: f64 = store.series().iter().map(|s| s.first().flat).sum();
        let growth_rate = if first_total > 0.0 {
            (total_heap - first_total) / first_total * 100.0
        } else {
            0.0
        };

        if growth_rate > thresholds.heap_growth_warn_pct {
            insights.push(
                Insight::new(
                    Severity::Warning,
                    format!(
                        "Memory usage has grown by {:.1}% since monitoring began",
                        growth_rate
                    ),
                    timestamp,
                    "heap_growth",
                )
                .with_value(growth_rate),
            );
        }
    }

    if total_heap > 0.0 {
        let heap_mb = total_heap / BYTES_PER_MB;
        insights.push(
            Insight::new(
                Severity::Info,
                format!("Total heap size: {:.1} MB", heap_mb),
                timestamp,
                "heap_size",
            )
            .with_value(heap_mb),
        );
    }

    for consumer in &top_consumers {
        if consumer.percentage_of_total > thresholds.heap_consumer_pct {
            insights.push(
                Insight::new(
                    Severity::Info,
                    format!(
                        "{} is using {:.1}% of heap space",
                        consumer.name, consumer.percentage_of_total
                    ),
                    timestamp,
                    "heap_usage",
                )
                .with_value(consumer.value),
            );
        }
    }

    ProfileInsights {
        insights,
        top_consumers,
        summary: format!("Analyzing {} heap snapshots", store.len()),
    }
}
