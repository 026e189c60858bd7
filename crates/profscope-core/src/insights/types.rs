//! Core types for heuristic profile insights

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity level of an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational - no action needed
    Info,
    /// Should be addressed soon
    Warning,
    /// Requires immediate attention
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }

    /// Numeric priority for display grouping (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Info => 1,
            Severity::Warning => 2,
            Severity::Critical => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// One observation about resource usage
///
/// Insights are immutable and kept in generation order, not severity order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub severity: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Stable metric key (e.g., "heap_growth", "cpu_usage")
    pub metric: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl Insight {
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
        metric: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            timestamp,
            metric: metric.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}

/// A function ranked among the highest resource users in the latest sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopConsumer {
    pub name: String,
    pub value: f64,
    pub percentage_of_total: f64,
}

/// Heuristic analysis result for one profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileInsights {
    pub insights: Vec<Insight>,
    pub top_consumers: Vec<TopConsumer>,
    pub summary: String,
}

impl ProfileInsights {
    /// Result with no findings, just a summary line
    pub fn empty(summary: impl Into<String>) -> Self {
        Self {
            insights: Vec::new(),
            top_consumers: Vec::new(),
            summary: summary.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_priority() {
        assert!(Severity::Critical.priority() > Severity::Warning.priority());
        assert!(Severity::Warning.priority() > Severity::Info.priority());
    }

    #[test]
    fn test_severity_round_trip() {
        for s in [Severity::Info, Severity::Warning, Severity::Critical] {
            assert_eq!(Severity::from_str(s.as_str()).unwrap(), s);
        }
        assert!(Severity::from_str("fatal").is_err());
    }

    #[test]
    fn test_insight_builder() {
        let insight = Insight::new(
            Severity::Warning,
            "Memory usage has grown",
            Utc::now(),
            "heap_growth",
        )
        .with_value(30.0);

        assert_eq!(insight.metric, "heap_growth");
        assert_eq!(insight.value, Some(30.0));
    }
}
