//! Configuration for detectors, sessions, and the analysis endpoint
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for an override in the data dir
//!    (~/.local/share/profscope/config/profscope.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! The detector thresholds and the CPU runtime keep-list are empirically
//! chosen constants carried over from the profiling dashboard this tool
//! grew out of. They are exposed here as named values rather than being
//! hard-coded at their use sites.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/profscope.toml");

/// Heuristic detector thresholds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Heap growth percentage that triggers a warning insight
    pub heap_growth_warn_pct: f64,
    /// Share of total heap above which a consumer gets its own insight
    pub heap_consumer_pct: f64,
    /// Share of total CPU time above which a consumer gets its own insight
    pub cpu_consumer_pct: f64,
    /// Total CPU ms per sample counted as high usage (20ms of a 1s window = 2%)
    pub cpu_high_usage_ms: f64,
    /// How many top consumers to report
    pub top_consumers: usize,
    /// runtime.* substrings that stay visible in CPU profiles
    pub cpu_runtime_keep: Vec<String>,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            heap_growth_warn_pct: 20.0,
            heap_consumer_pct: 10.0,
            cpu_consumer_pct: 5.0,
            cpu_high_usage_ms: 20.0,
            top_consumers: 5,
            cpu_runtime_keep: vec!["GC".into(), "malloc".into(), "memclr".into()],
        }
    }
}

/// Ingestion session settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum retained samples per profile
    pub retention: usize,
    /// Seconds between sample fetches in watch mode
    pub sample_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            retention: 512,
            sample_interval_secs: 1,
        }
    }
}

/// Analysis endpoint settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
    pub temperature: f64,
    pub num_predict: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "codellama".to_string(),
            temperature: 0.7,
            num_predict: 2000,
        }
    }
}

/// Full profscope configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub thresholds: Thresholds,
    pub session: SessionConfig,
    pub ollama: OllamaConfig,
}

impl Config {
    /// Load config, preferring the data-dir override when present
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => Self::from_path(&path),
            _ => Self::parse(DEFAULT_CONFIG),
        }
    }

    /// Load config from an explicit file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }
}

/// Location of the user override file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("profscope").join("config").join("profscope.toml"))
}
