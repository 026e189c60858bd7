//! Profscope Core Library
//!
//! Shared functionality for the profscope profiling tool:
//! - Aligned time-series store for periodic profile samples
//! - Heuristic heap and CPU insight detectors
//! - Prompt construction and reply parsing for LLM-assisted analysis
//! - Pluggable analysis backends (Ollama, mock)
//! - Single-flight analysis sessions and a bounded sampler loop
//! - Layered TOML configuration

pub mod ai;
pub mod config;
pub mod error;
pub mod insights;
pub mod sampler;
pub mod series;
pub mod session;

/// Test utilities including mock Ollama server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    build_prompt, parse_analysis, AnalysisBackend, AnalysisClient, LlmAnalysis, MockBackend,
    OllamaBackend,
};
pub use config::{Config, OllamaConfig, SessionConfig, Thresholds};
pub use error::{Error, Result};
pub use insights::{Insight, ProfileInsights, Severity, TopConsumer};
pub use sampler::{run_sampler, spawn_sampler, SampleSource, SamplerHandle, SamplerStats};
pub use series::{ProfileKind, RawSample, SamplePoint, Series, TimeSeriesStore};
pub use session::ProfileSession;
