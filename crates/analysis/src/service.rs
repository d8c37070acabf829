use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AnalysisError, AnalysisProvider};

/// Client of the standalone analysis service.
#[derive(Clone, Debug)]
pub struct ServiceProvider {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    document_text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ServiceProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AnalysisError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(AnalysisError::NotConfigured(
                "analysis service url is empty".to_string(),
            ));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn decode(resp: reqwest::Response) -> Result<Value, AnalysisError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<Value>().await?);
        }

        let message = match resp.json::<ErrorBody>().await {
            Ok(err) => err.error,
            Err(_) => "server error".to_string(),
        };
        Err(AnalysisError::Server { status, message })
    }

    async fn analyze(&self, path: &str, text: &str) -> Result<Value, AnalysisError> {
        let resp = self
            .client
            .post(self.url(path))
            .json(&AnalyzeRequest {
                document_text: text,
            })
            .send()
            .await?;
        Self::decode(resp).await
    }

    /// Status reported by the service's `/health` endpoint.
    pub async fn health(&self) -> Result<Value, AnalysisError> {
        let resp = self.client.get(self.url("/health")).send().await?;
        Self::decode(resp).await
    }
}

#[async_trait]
impl AnalysisProvider for ServiceProvider {
    fn name(&self) -> &'static str {
        "service"
    }

    async fn financial_analysis(&self, text: &str) -> Result<Value, AnalysisError> {
        self.analyze("/analyze/financial", text).await
    }

    async fn payment_details(&self, text: &str) -> Result<Value, AnalysisError> {
        self.analyze("/analyze/payment", text).await
    }

    async fn validate(&self, text: &str) -> Result<Value, AnalysisError> {
        self.analyze("/analyze/validation", text).await
    }
}
