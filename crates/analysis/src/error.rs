use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("network error: {0}")]
    Network(reqwest::Error),
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for AnalysisError {
    // Request urls may carry credentials.
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.without_url())
    }
}
