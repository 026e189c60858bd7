//! Analysis backend response types

use serde::{Deserialize, Serialize};

use crate::insights::Insight;

/// Typed result of an external model's free-text analysis
///
/// Always well-formed: when the model call or the parse fails, callers get
/// an instance with empty collections and a placeholder summary rather than
/// an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmAnalysis {
    pub insights: Vec<Insight>,
    pub summary: String,
    pub recommendations: Vec<String>,
    pub code_suggestions: Vec<String>,
}

impl LlmAnalysis {
    /// Analysis with no content, just a summary line
    pub fn empty(summary: impl Into<String>) -> Self {
        Self {
            insights: Vec::new(),
            summary: summary.into(),
            recommendations: Vec::new(),
            code_suggestions: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.insights.is_empty()
            && self.recommendations.is_empty()
            && self.code_suggestions.is_empty()
    }
}
