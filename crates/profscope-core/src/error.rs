//! Error types for profscope

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Out-of-order sample: {incoming} is not after {latest}")]
    OutOfOrderSample {
        latest: chrono::DateTime<chrono::Utc>,
        incoming: chrono::DateTime<chrono::Utc>,
    },

    #[error("An analysis request is already in progress")]
    AnalysisInProgress,

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;
