//! Document upload and retrieval endpoints

use api_types::documents::{DocumentCreated, DocumentUpload, DocumentView, DocumentsResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use base64::Engine as _;
use engine::{DocumentSummary, User};
use uuid::Uuid;

use crate::{JsonBody, ServerError, required, server::ServerState};

fn view(summary: DocumentSummary) -> DocumentView {
    let ai_insights = summary
        .ai_insights
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok());

    DocumentView {
        id: summary.id,
        filename: summary.filename,
        content_type: summary.content_type,
        extracted_text: summary.extracted_text,
        upload_date: summary.upload_date,
        ai_insights,
    }
}

pub async fn upload(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<DocumentUpload>,
) -> Result<(StatusCode, Json<DocumentCreated>), ServerError> {
    let filename = required(payload.filename, "filename")?;
    let data = required(payload.data, "data")?;
    let data = base64::engine::general_purpose::STANDARD
        .decode(data.as_bytes())
        .map_err(|_| ServerError::Generic("data must be base64 encoded".to_string()))?;
    let content_type = payload.content_type.unwrap_or_default();

    let summary = state
        .engine
        .store_document(&user.id, &filename, &content_type, data)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DocumentCreated {
            message: "File uploaded successfully".to_string(),
            document: view(summary),
        }),
    ))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<DocumentsResponse>, ServerError> {
    let documents = state.engine.documents(&user.id).await?;
    Ok(Json(DocumentsResponse {
        documents: documents.into_iter().map(view).collect(),
    }))
}

/// Raw bytes of a document, served with its stored content type.
pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let document = state.engine.document(&user.id, id).await?;
    Ok(([(header::CONTENT_TYPE, document.content_type)], document.data))
}
