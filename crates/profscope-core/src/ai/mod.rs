//! Pluggable analysis backend abstraction
//!
//! This module turns a store snapshot into a prompt, sends it to an
//! LLM-style endpoint, and parses the free-text reply into a typed
//! [`LlmAnalysis`].
//!
//! # Architecture
//!
//! - `AnalysisBackend` trait: the single generate/health interface
//! - `AnalysisClient` enum: concrete wrapper providing Clone + compile-time
//!   dispatch
//! - Backend implementations: `OllamaBackend`, `MockBackend`
//!
//! The client is constructor-injected wherever analysis happens; there is
//! no global instance, so tests substitute a mock without process-wide
//! state.
//!
//! # Configuration
//!
//! Environment variables (for `AnalysisClient::from_env`):
//! - `OLLAMA_HOST`: Ollama server URL (required)
//! - `OLLAMA_MODEL`: Model name (default: codellama)

mod mock;
mod ollama;
pub mod parsing;
pub mod prompt;
mod types;

pub use mock::MockBackend;
pub use ollama::{GenerateOptions, OllamaBackend};
pub use parsing::parse_analysis;
pub use prompt::build_prompt;
pub use types::LlmAnalysis;

use async_trait::async_trait;

use crate::config::OllamaConfig;
use crate::error::Result;

/// Trait defining the interface for analysis backends
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Send a prompt and return the raw model reply
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete analysis client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AnalysisClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AnalysisClient {
    /// Create an Ollama client from config
    pub fn ollama(config: &OllamaConfig) -> Self {
        AnalysisClient::Ollama(OllamaBackend::new(config))
    }

    /// Create an Ollama client from environment variables
    ///
    /// Returns None when OLLAMA_HOST is not set.
    pub fn from_env() -> Option<Self> {
        OllamaBackend::from_env().map(AnalysisClient::Ollama)
    }

    /// Create a mock client for testing
    pub fn mock() -> Self {
        AnalysisClient::Mock(MockBackend::new())
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            AnalysisClient::Ollama(b) => AnalysisClient::Ollama(b.with_model(model)),
            AnalysisClient::Mock(b) => AnalysisClient::Mock(b.clone()),
        }
    }
}

#[async_trait]
impl AnalysisBackend for AnalysisClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        match self {
            AnalysisClient::Ollama(b) => b.generate(prompt).await,
            AnalysisClient::Mock(b) => b.generate(prompt).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AnalysisClient::Ollama(b) => b.health_check().await,
            AnalysisClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AnalysisClient::Ollama(b) => b.model(),
            AnalysisClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AnalysisClient::Ollama(b) => b.host(),
            AnalysisClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_client_mock() {
        let client = AnalysisClient::mock();
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        let client = AnalysisClient::mock();
        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_mock_generate_round_trip() {
        let client = AnalysisClient::mock();
        let raw = client.generate("prompt").await.unwrap();
        let analysis = parse_analysis(&raw);
        assert!(!analysis.is_empty());
    }
}
