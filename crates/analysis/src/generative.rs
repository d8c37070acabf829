use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{AnalysisError, AnalysisProvider};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const API_KEY_HEADER: &str = "x-goog-api-key";

const FINANCIAL_QUERY: &str = "Analyze this financial document and provide insights about education fees, payment schedules, due dates, and any potential issues or recommendations.";
const PAYMENT_QUERY: &str = "Extract key payment information from this document including: total amount, due dates, payment methods, late fees, and any special conditions or discounts.";
const VALIDATION_QUERY: &str = "Validate this financial document for completeness, accuracy, and potential red flags. Check for missing information, inconsistencies, or suspicious elements.";

fn prompt(query: &str, context: &str) -> String {
    format!(
        "You are a helpful assistant that analyzes financial documents and provides insights about education fees and payments. Use the following context to answer the question.\n\nContext:\n{context}\n\nQuestion: {query}\n\nAnswer:"
    )
}

/// Client of a `generateContent` style model API.
#[derive(Clone, Debug)]
pub struct GenerativeProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl GenerativeProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AnalysisError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AnalysisError::NotConfigured(
                "generative provider needs an api key".to_string(),
            ));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
            model: model.into(),
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    async fn query(&self, query: &str, context: &str) -> Result<Value, AnalysisError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt(query, context),
                }],
            }],
        };
        let resp = self
            .client
            .post(self.url())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = match resp.json::<ErrorBody>().await {
                Ok(err) => err.error.message,
                Err(_) => "model error".to_string(),
            };
            return Err(AnalysisError::Server { status, message });
        }

        let text = resp
            .json::<GenerateResponse>()
            .await?
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<String>()
            })
            .ok_or_else(|| AnalysisError::InvalidResponse("no candidates returned".to_string()))?;

        Ok(json!({ "response": text }))
    }
}

#[async_trait]
impl AnalysisProvider for GenerativeProvider {
    fn name(&self) -> &'static str {
        "generative"
    }

    async fn financial_analysis(&self, text: &str) -> Result<Value, AnalysisError> {
        self.query(FINANCIAL_QUERY, text).await
    }

    async fn payment_details(&self, text: &str) -> Result<Value, AnalysisError> {
        self.query(PAYMENT_QUERY, text).await
    }

    async fn validate(&self, text: &str) -> Result<Value, AnalysisError> {
        self.query(VALIDATION_QUERY, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_context_and_question() {
        let prompt = prompt(PAYMENT_QUERY, "Tuition: 50000");
        assert!(prompt.contains("Context:\nTuition: 50000"));
        assert!(prompt.contains("Question: Extract key payment information"));
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn missing_key_is_not_configured() {
        let provider =
            GenerativeProvider::new(DEFAULT_BASE_URL, "", DEFAULT_MODEL, Duration::from_secs(1));
        assert!(matches!(provider, Err(AnalysisError::NotConfigured(_))));
    }

    #[test]
    fn url_targets_the_model() {
        let provider = GenerativeProvider::new(
            "http://localhost:9000/",
            "key",
            "test-model",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            provider.url(),
            "http://localhost:9000/v1beta/models/test-model:generateContent"
        );
    }
}
