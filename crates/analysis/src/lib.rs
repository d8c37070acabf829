//! Bridge between uploaded documents and the AI analysis backends.
//!
//! Every backend implements [`AnalysisProvider`]; [`analyze_document`] fans
//! the three analyses out concurrently and folds them into one
//! [`AnalysisReport`].

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

pub use error::AnalysisError;
pub use generative::GenerativeProvider;
pub use heuristic::HeuristicProvider;
pub use report::{AnalysisReport, REPORT_SUMMARY, analyze_document};
pub use service::ServiceProvider;

mod error;
pub mod generative;
mod heuristic;
mod report;
mod service;

/// Which backend answers analysis requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Remote analysis service speaking the `/analyze/*` protocol.
    Service,
    /// Generative model API (`generateContent`).
    Generative,
    /// Offline keyword scan.
    #[default]
    Heuristic,
}

#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Insights about fees, schedules, due dates and recommendations.
    async fn financial_analysis(&self, text: &str) -> Result<Value, AnalysisError>;

    /// Amounts, due dates, payment methods, late fees and discounts.
    async fn payment_details(&self, text: &str) -> Result<Value, AnalysisError>;

    /// Completeness and red-flag checks.
    async fn validate(&self, text: &str) -> Result<Value, AnalysisError>;
}
