//! Test utilities for profscope-core
//!
//! Provides a mock Ollama server speaking just enough of the generate API
//! for integration tests and local development without a running model.

use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// Mock Ollama server for testing and development
pub struct MockOllamaServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOllamaServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        Self::start_router(
            Router::new()
                .route("/api/tags", get(handle_tags))
                .route("/api/generate", post(handle_generate)),
        )
        .await
    }

    /// Start a variant whose generate endpoint always returns 500
    pub async fn start_failing() -> Self {
        Self::start_router(
            Router::new()
                .route("/api/tags", get(handle_tags))
                .route("/api/generate", post(handle_generate_error)),
        )
        .await
    }

    async fn start_router(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOllamaServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ollama tags endpoint response (health check)
async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "codellama:latest".to_string(),
            modified_at: "2024-01-01T00:00:00Z".to_string(),
            size: 4_000_000_000,
        }],
    })
}

/// Ollama generate endpoint: answers every prompt with a well-formed
/// four-section analysis, echoing the profile type when it can find one.
async fn handle_generate(Json(request): Json<GenerateRequest>) -> Json<GenerateResponse> {
    let profile_type = request
        .prompt
        .lines()
        .find_map(|line| line.strip_prefix("Type: "))
        .unwrap_or("unknown");

    let response = format!(
        "=== INSIGHTS ===\n\
         - [WARNING] {profile_type} profile shows a steadily growing top consumer\n\
         - Runtime overhead is within normal bounds\n\n\
         === RECOMMENDATIONS ===\n\
         - Reuse allocations on the hot path\n\
         - Re-profile after the next deploy\n\n\
         === CODE_SUGGESTIONS ===\n\
         - Pre-size the map in the top consumer\n\n\
         === SUMMARY ===\n\
         The {profile_type} profile is healthy with one growth trend worth watching."
    );

    Json(GenerateResponse {
        model: request.model,
        response,
        done: true,
    })
}

async fn handle_generate_error() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "model exploded")
}

// Request/Response types for the mock server

#[derive(Debug, Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    name: String,
    modified_at: String,
    size: u64,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[allow(dead_code)]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AnalysisBackend, OllamaBackend};
    use crate::config::OllamaConfig;

    fn backend_for(server: &MockOllamaServer) -> OllamaBackend {
        OllamaBackend::new(&OllamaConfig {
            url: server.url(),
            ..OllamaConfig::default()
        })
    }

    #[tokio::test]
    async fn test_mock_server_health_check() {
        let server = MockOllamaServer::start().await;
        assert!(backend_for(&server).health_check().await);
    }

    #[tokio::test]
    async fn test_mock_server_generate_echoes_profile_type() {
        let server = MockOllamaServer::start().await;
        let client = backend_for(&server);

        let raw = client
            .generate("PROFILE OVERVIEW\nType: heap\nDuration: 10s")
            .await
            .unwrap();
        assert!(raw.contains("=== SUMMARY ==="));
        assert!(raw.contains("heap profile"));
    }

    #[tokio::test]
    async fn test_failing_server_returns_http_error() {
        let server = MockOllamaServer::start_failing().await;
        let client = backend_for(&server);

        assert!(client.health_check().await);
        assert!(client.generate("anything").await.is_err());
    }
}
