//! Analysis prompt construction
//!
//! Builds the fixed, auditable prompt sent to the analysis endpoint. The
//! closing instructions pin the model to the four section markers the
//! parser in [`super::parsing`] keys on; changing either side breaks the
//! contract.

use std::collections::HashMap;
use std::fmt::Write;

use crate::series::{ProfileKind, TimeSeriesStore};

use super::parsing::{
    CODE_SUGGESTIONS_MARKER, INSIGHTS_MARKER, RECOMMENDATIONS_MARKER, SUMMARY_MARKER,
};

/// Growth percentage above which a function counts as a hot path
const HOT_GROWTH_PCT: f64 = 20.0;
/// Share of the current total above which a function counts as a hot path
const HOT_SHARE: f64 = 0.1;
/// How many top functions the prompt lists in full
const TOP_FUNCTIONS: usize = 10;
/// How many package groups the prompt lists
const TOP_GROUPS: usize = 5;

/// Per-function metrics derived for the prompt
struct FunctionStat {
    name: String,
    flat: f64,
    cumulative: f64,
    growth_pct: f64,
    peak: f64,
    is_runtime: bool,
    stack: Vec<String>,
}

/// Functions aggregated by their leading path segment
struct PackageGroup {
    name: String,
    total_flat: f64,
    total_cum: f64,
    functions: usize,
}

/// Decompose a function name into its stack path: slash segments, with the
/// final segment further split on dots (package.Function).
fn stack_path(name: &str) -> Vec<String> {
    let mut parts: Vec<String> = name.split('/').map(str::to_string).collect();
    if let Some(last) = parts.pop() {
        parts.extend(last.split('.').map(str::to_string));
    }
    parts
}

fn function_stats(store: &TimeSeriesStore) -> Vec<FunctionStat> {
    store
        .series()
        .iter()
        .map(|series| {
            let current = series.latest();
            let initial = series.first();
            let growth_pct = if initial.flat > 0.0 {
                (current.flat - initial.flat) / initial.flat * 100.0
            } else {
                0.0
            };
            FunctionStat {
                name: series.name.clone(),
                flat: current.flat,
                cumulative: current.cum,
                growth_pct,
                peak: series.peak_flat(),
                is_runtime: series.name.starts_with("runtime."),
                stack: stack_path(&series.name),
            }
        })
        .collect()
}

fn package_groups(stats: &[FunctionStat]) -> Vec<PackageGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, PackageGroup> = HashMap::new();

    for stat in stats {
        let key = stat.name.split('/').next().unwrap_or(&stat.name).to_string();
        let group = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            PackageGroup {
                name: key,
                total_flat: 0.0,
                total_cum: 0.0,
                functions: 0,
            }
        });
        group.total_flat += stat.flat;
        group.total_cum += stat.cumulative;
        group.functions += 1;
    }

    // Rebuild in first-seen order so the sort below breaks ties stably.
    let mut result: Vec<PackageGroup> = order
        .into_iter()
        .filter_map(|name| groups.remove(&name))
        .collect();
    result.sort_by(|a, b| {
        b.total_flat
            .partial_cmp(&a.total_flat)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    result
}

/// Build the analysis prompt for one profile's store snapshot
pub fn build_prompt(kind: ProfileKind, store: &TimeSeriesStore) -> String {
    let stats = function_stats(store);

    // `+ 0.0` normalizes the -0.0 an empty f64 sum yields (std's float sum
    // identity) so the zero prints as "0", not "-0".
    let total_current: f64 = stats.iter().map(|s| s.flat).sum::<f64>() + 0.0;
    let total_peak: f64 = stats.iter().map(|s| s.peak).sum::<f64>() + 0.0;
    let runtime_overhead: f64 =
        stats.iter().filter(|s| s.is_runtime).map(|s| s.flat).sum::<f64>() + 0.0;
    let overhead_pct = if total_current > 0.0 {
        runtime_overhead / total_current * 100.0
    } else {
        0.0
    };

    let mut by_flat: Vec<&FunctionStat> = stats.iter().collect();
    by_flat.sort_by(|a, b| b.flat.partial_cmp(&a.flat).unwrap_or(std::cmp::Ordering::Equal));
    let top_functions = &by_flat[..by_flat.len().min(TOP_FUNCTIONS)];

    let hot_paths: Vec<&&FunctionStat> = by_flat
        .iter()
        .filter(|s| s.growth_pct > HOT_GROWTH_PCT || s.flat > total_current * HOT_SHARE)
        .collect();

    let groups = package_groups(&stats);

    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "You are a performance analysis expert specializing in Go applications. \
         Your task is to analyze the following {kind} profile data and provide a detailed analysis.\n"
    );

    let _ = writeln!(prompt, "PROFILE OVERVIEW:");
    let _ = writeln!(prompt, "Type: {kind}");
    let _ = writeln!(prompt, "Duration: {}s", store.duration_secs());
    let _ = writeln!(prompt, "Total Current: {total_current}");
    let _ = writeln!(prompt, "Peak Usage: {total_peak}");
    let _ = writeln!(
        prompt,
        "Runtime Overhead: {runtime_overhead} ({overhead_pct:.1}%)\n"
    );

    let _ = writeln!(prompt, "TOP CONSUMERS (with full paths):");
    for stat in top_functions {
        let _ = writeln!(prompt, "- {}", stat.name);
        let _ = writeln!(prompt, "   Flat: {}", stat.flat);
        let _ = writeln!(prompt, "   Cumulative: {}", stat.cumulative);
        let _ = writeln!(prompt, "   Growth: {:.1}%", stat.growth_pct);
        let _ = writeln!(prompt, "   Stack: {}", stat.stack.join(" -> "));
    }

    let _ = writeln!(prompt, "\nHOT PATHS (high growth or usage):");
    for stat in &hot_paths {
        let share_pct = if total_current > 0.0 {
            stat.flat / total_current * 100.0
        } else {
            0.0
        };
        let _ = writeln!(
            prompt,
            "- {} ({:.1}% growth, {:.1}% of total)",
            stat.name, stat.growth_pct, share_pct
        );
    }

    let _ = writeln!(prompt, "\nPACKAGE GROUPS:");
    for group in groups.iter().take(TOP_GROUPS) {
        let impact_pct = if total_current > 0.0 {
            group.total_flat / total_current * 100.0
        } else {
            0.0
        };
        let _ = writeln!(prompt, "- {}", group.name);
        let _ = writeln!(prompt, "   Total Impact: {impact_pct:.1}%");
        let _ = writeln!(prompt, "   Functions: {}", group.functions);
    }

    let _ = write!(
        prompt,
        "\nAnalyze this data and provide your response in the following EXACT format \
         (keep the section headers exactly as shown):\n\n\
         {INSIGHTS_MARKER}\n\
         [List each insight on a new line, prefix critical issues with [CRITICAL] and warnings with [WARNING]]\n\
         - Insight 1\n\
         - Insight 2\n\
         ...\n\n\
         {RECOMMENDATIONS_MARKER}\n\
         [List each recommendation on a new line]\n\
         - Recommendation 1\n\
         - Recommendation 2\n\
         ...\n\n\
         {CODE_SUGGESTIONS_MARKER}\n\
         [List each code suggestion on a new line, include specific function names and paths]\n\
         - Code suggestion 1\n\
         - Code suggestion 2\n\
         ...\n\n\
         {SUMMARY_MARKER}\n\
         [Write a concise paragraph summarizing the key findings and most important optimization opportunities]"
    );

    prompt
}
