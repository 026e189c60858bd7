//! Mock backend for testing
//!
//! Returns a configurable canned reply for every generate call. Useful for
//! unit tests and for exercising the pipeline without a running LLM server.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::parsing::{
    CODE_SUGGESTIONS_MARKER, INSIGHTS_MARKER, RECOMMENDATIONS_MARKER, SUMMARY_MARKER,
};
use super::AnalysisBackend;

/// Mock analysis backend
#[derive(Clone)]
pub struct MockBackend {
    reply: String,
    healthy: bool,
    failing: bool,
    latency: Option<Duration>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Healthy mock returning a well-formed four-section analysis
    pub fn new() -> Self {
        Self {
            reply: default_reply(),
            healthy: true,
            failing: false,
            latency: None,
        }
    }

    /// Mock whose health check fails
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Mock whose generate call always errors (transport failure stand-in)
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    /// Override the canned reply
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = reply.into();
        self
    }

    /// Delay each generate call, for in-flight/cancellation tests
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }
}

fn default_reply() -> String {
    format!(
        "{INSIGHTS_MARKER}\n\
         - [WARNING] Mock heap growth detected\n\
         - Mock allocation pattern is stable\n\n\
         {RECOMMENDATIONS_MARKER}\n\
         - Mock recommendation: reuse buffers\n\n\
         {CODE_SUGGESTIONS_MARKER}\n\
         - Mock suggestion: pool objects in main.alloc\n\n\
         {SUMMARY_MARKER}\n\
         Mock analysis of the submitted profile."
    )
}

#[async_trait]
impl AnalysisBackend for MockBackend {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing {
            return Err(Error::InvalidData("mock generate failure".into()));
        }
        Ok(self.reply.clone())
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::parsing::parse_analysis;

    #[tokio::test]
    async fn test_default_reply_parses_cleanly() {
        let mock = MockBackend::new();
        let raw = mock.generate("whatever").await.unwrap();
        let analysis = parse_analysis(&raw);

        assert_eq!(analysis.insights.len(), 2);
        assert_eq!(analysis.recommendations.len(), 1);
        assert_eq!(analysis.code_suggestions.len(), 1);
        assert_eq!(analysis.summary, "Mock analysis of the submitted profile.");
    }

    #[tokio::test]
    async fn test_failing_mock() {
        let mock = MockBackend::failing();
        assert!(mock.generate("x").await.is_err());
        assert!(mock.health_check().await);
    }

    #[tokio::test]
    async fn test_unhealthy_mock() {
        let mock = MockBackend::unhealthy();
        assert!(!mock.health_check().await);
    }
}
