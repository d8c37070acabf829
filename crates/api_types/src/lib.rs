//! JSON bodies of the EduFinance HTTP API.
//!
//! Every key is camelCase and every amount is an integer number of minor
//! units. Required request fields are `Option`s so the server can answer a
//! missing field with its own 400 message.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub mod user {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Register {
        pub first_name: Option<String>,
        pub last_name: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
        pub password: Option<String>,
        pub role: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct Login {
        pub email: Option<String>,
        pub password: Option<String>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserView {
        pub id: String,
        pub email: String,
        pub first_name: String,
        pub last_name: String,
        pub phone: Option<String>,
        pub role: String,
        pub created_at: DateTime<Utc>,
    }

    /// Answer of `/register` and `/login`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthResponse {
        pub message: String,
        /// Bearer token for the `Authorization` header.
        pub token: String,
        pub user: UserView,
    }
}

pub mod fees {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FeeDetails {
        pub total_fee: i64,
        pub paid_amount: i64,
        /// `totalFee - paidAmount`, negative after some manual edits.
        pub remaining_fee: i64,
        pub last_updated: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FeesResponse {
        pub fee_details: FeeDetails,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FeeUpdate {
        pub total_fee: Option<i64>,
        pub paid_amount: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FeeUpdateResponse {
        pub success: bool,
        pub fee_details: FeeDetails,
    }
}

pub mod payments {
    use super::*;
    use crate::fees::FeeDetails;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PaymentNew {
        pub amount: Option<i64>,
        pub description: Option<String>,
        pub method: Option<String>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PaymentView {
        pub id: Uuid,
        pub amount: i64,
        pub description: String,
        pub method: String,
        pub status: String,
        pub payment_date: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PaymentCreated {
        pub message: String,
        pub payment: PaymentView,
        pub fee_details: FeeDetails,
    }

    /// Query string of `GET /payments`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PaymentList {
        pub limit: Option<u64>,
        /// Opaque pagination cursor (base64), from `nextCursor`.
        ///
        /// Newest → older pagination.
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PaymentListResponse {
        pub payments: Vec<PaymentView>,
        /// Opaque cursor for fetching the next page (older items).
        pub next_cursor: Option<String>,
    }
}

pub mod expenses {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub description: Option<String>,
        pub amount: Option<i64>,
        /// One of `tuition`, `books`, `food`, `transportation`, `lab`, `other`.
        pub category: Option<String>,
        /// RFC3339 timestamp; the server uses now() when absent.
        pub date: Option<DateTime<FixedOffset>>,
        pub method: Option<String>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseView {
        pub id: Uuid,
        pub description: String,
        pub amount: i64,
        pub category: String,
        pub date: DateTime<Utc>,
        pub method: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        pub message: String,
        pub expense: ExpenseView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpensesResponse {
        pub expenses: Vec<ExpenseView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryBreakdown {
        pub category: String,
        pub total: i64,
        pub count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyTrend {
        pub year: i32,
        pub month: u32,
        pub total: i64,
        pub count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseStatsResponse {
        pub total_expenses: i64,
        pub category_breakdown: Vec<CategoryBreakdown>,
        /// Most recent month first.
        pub monthly_trends: Vec<MonthlyTrend>,
    }
}

pub mod dashboard {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FinancialOverview {
        pub total_semester_cost: i64,
        pub amount_paid: i64,
        pub pending_payments: i64,
        pub monthly_budget: i64,
        pub paid_percentage: i64,
        pub total_expenses: i64,
    }
}

pub mod documents {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DocumentUpload {
        pub filename: Option<String>,
        pub content_type: Option<String>,
        /// File contents, standard base64.
        pub data: Option<String>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DocumentView {
        pub id: Uuid,
        pub filename: String,
        pub content_type: String,
        pub extracted_text: String,
        pub upload_date: DateTime<Utc>,
        pub ai_insights: Option<Value>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DocumentCreated {
        pub message: String,
        pub document: DocumentView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DocumentsResponse {
        pub documents: Vec<DocumentView>,
    }
}

pub mod insights {
    use super::*;

    /// Fresh analysis of one document.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct InsightsResponse {
        pub insights: Value,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct QuickInsight {
        pub document_id: Uuid,
        pub filename: String,
        pub upload_date: DateTime<Utc>,
        pub ai_insights: Option<Value>,
    }

    /// Cached analyses of the most recent documents.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct QuickInsightsResponse {
        pub insights: Vec<QuickInsight>,
    }
}
