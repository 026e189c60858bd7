//! Ollama backend implementation
//!
//! HTTP client for the Ollama generate API. The backend is an explicit
//! service object injected by the caller; nothing here is process-global.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OllamaConfig;
use crate::error::{Error, Result};

use super::AnalysisBackend;

/// Ollama backend for profile analysis
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
    options: GenerateOptions,
}

/// Sampling options forwarded to the model
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GenerateOptions {
    pub temperature: f64,
    pub num_predict: u32,
}

impl OllamaBackend {
    /// Create a backend from config
    pub fn new(config: &OllamaConfig) -> Self {
        Self {
            http_client: Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            options: GenerateOptions {
                temperature: config.temperature,
                num_predict: config.num_predict,
            },
        }
    }

    /// Create from environment variables (OLLAMA_HOST, OLLAMA_MODEL)
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("OLLAMA_HOST").ok()?;
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "codellama".to_string());
        Some(Self::new(&OllamaConfig {
            url,
            model,
            ..OllamaConfig::default()
        }))
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: model.to_string(),
            options: self.options,
        }
    }
}

/// Request to Ollama API
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

/// Response from Ollama API
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl AnalysisBackend for OllamaBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: self.options,
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Http(response.error_for_status().unwrap_err()));
        }

        let generated: GenerateResponse = response.json().await?;
        debug!("Ollama response: {}", generated.response);

        Ok(generated.response)
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let backend = OllamaBackend::new(&OllamaConfig {
            url: "http://localhost:11434/".to_string(),
            ..OllamaConfig::default()
        });
        assert_eq!(backend.host(), "http://localhost:11434");
    }

    #[test]
    fn test_with_model_override() {
        let backend = OllamaBackend::new(&OllamaConfig::default());
        let override_backend = backend.with_model("llama3.2");
        assert_eq!(override_backend.model(), "llama3.2");
        assert_eq!(backend.model(), "codellama");
    }

    #[test]
    fn test_request_wire_shape() {
        let request = GenerateRequest {
            model: "codellama",
            prompt: "analyze this",
            stream: false,
            options: GenerateOptions {
                temperature: 0.7,
                num_predict: 2000,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "codellama");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["temperature"], 0.7);
        assert_eq!(json["options"]["num_predict"], 2000);
    }
}
