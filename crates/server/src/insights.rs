//! AI insight endpoints

use api_types::insights::{InsightsResponse, QuickInsight, QuickInsightsResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::User;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

const QUICK_INSIGHTS_LIMIT: u64 = 5;
const NO_TEXT_FALLBACK: &str = "Text extraction not supported for this file type.";

/// Analyses a document now and caches the report on it.
pub async fn analyze(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InsightsResponse>, ServerError> {
    let document = state.engine.document(&user.id, id).await?;
    let text = if document.extracted_text.trim().is_empty() {
        NO_TEXT_FALLBACK
    } else {
        document.extracted_text.as_str()
    };

    let report = analysis::analyze_document(state.analysis.as_ref(), text).await;
    let insights = serde_json::to_value(&report)
        .map_err(|err| ServerError::Generic(format!("cannot encode insights: {err}")))?;
    state.engine.save_insights(&user.id, id, &insights).await?;

    Ok(Json(InsightsResponse { insights }))
}

/// Cached insights of the latest documents, for the dashboard.
pub async fn quick(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<QuickInsightsResponse>, ServerError> {
    let recent = state
        .engine
        .recent_insights(&user.id, QUICK_INSIGHTS_LIMIT)
        .await?;

    Ok(Json(QuickInsightsResponse {
        insights: recent
            .into_iter()
            .map(|insight| QuickInsight {
                document_id: insight.document_id,
                filename: insight.filename,
                upload_date: insight.upload_date,
                ai_insights: insight.ai_insights,
            })
            .collect(),
    }))
}
