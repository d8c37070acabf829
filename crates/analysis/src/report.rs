use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{AnalysisError, AnalysisProvider};

pub const REPORT_SUMMARY: &str = "Document analysis complete";

/// Combined result of the three analyses of one document.
///
/// A failed analysis is reported in place as `{"error": message}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub financial_analysis: Value,
    pub payment_details: Value,
    pub validation: Value,
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

fn settle(provider: &str, kind: &str, result: Result<Value, AnalysisError>) -> Value {
    result.unwrap_or_else(|err| {
        tracing::warn!("{provider} {kind} analysis failed: {err}");
        json!({ "error": err.to_string() })
    })
}

/// Runs the financial, payment and validation analyses concurrently.
///
/// Waits for all three; a failure never cancels or fails the others.
pub async fn analyze_document(provider: &dyn AnalysisProvider, text: &str) -> AnalysisReport {
    let (financial, payment, validation) = tokio::join!(
        provider.financial_analysis(text),
        provider.payment_details(text),
        provider.validate(text),
    );
    let name = provider.name();

    AnalysisReport {
        financial_analysis: settle(name, "financial", financial),
        payment_details: settle(name, "payment", payment),
        validation: settle(name, "validation", validation),
        summary: REPORT_SUMMARY.to_string(),
        timestamp: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct FlakyProvider;

    #[async_trait]
    impl AnalysisProvider for FlakyProvider {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn financial_analysis(&self, _text: &str) -> Result<Value, AnalysisError> {
            Ok(json!({"insight": "fees look fine"}))
        }

        async fn payment_details(&self, _text: &str) -> Result<Value, AnalysisError> {
            Err(AnalysisError::InvalidResponse("empty body".to_string()))
        }

        async fn validate(&self, text: &str) -> Result<Value, AnalysisError> {
            Ok(json!({"length": text.len()}))
        }
    }

    #[tokio::test]
    async fn failed_analysis_does_not_fail_the_report() {
        let report = analyze_document(&FlakyProvider, "abc").await;

        assert_eq!(report.financial_analysis, json!({"insight": "fees look fine"}));
        assert_eq!(
            report.payment_details,
            json!({"error": "invalid response: empty body"})
        );
        assert_eq!(report.validation, json!({"length": 3}));
        assert_eq!(report.summary, REPORT_SUMMARY);
    }

    #[tokio::test]
    async fn report_serializes_in_camel_case() {
        let report = analyze_document(&FlakyProvider, "abc").await;
        let value = serde_json::to_value(&report).unwrap();

        for key in [
            "financialAnalysis",
            "paymentDetails",
            "validation",
            "summary",
            "timestamp",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}
