use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};

use crate::{
    Document, DocumentInsight, DocumentSummary, EngineError, ResultEngine, documents,
    util::normalize_required,
};

use super::{Engine, with_tx};

impl Engine {
    /// Stores an uploaded document and the text extracted from it.
    pub async fn store_document(
        &self,
        user_id: &str,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> ResultEngine<DocumentSummary> {
        let filename = normalize_required(filename, "filename")?;
        if data.is_empty() {
            return Err(EngineError::InvalidInput("document is empty".to_string()));
        }
        let content_type = content_type.trim();
        let content_type = if content_type.is_empty() {
            "application/octet-stream"
        } else {
            content_type
        };

        let document = Document::new(
            user_id.to_string(),
            filename,
            content_type.to_string(),
            data,
            Utc::now(),
        );

        with_tx!(self, |db_tx| {
            documents::ActiveModel::from(&document)
                .insert(&db_tx)
                .await?;
            Ok(document.summary())
        })
    }

    /// Documents of `user_id` without their bytes, newest first.
    pub async fn documents(&self, user_id: &str) -> ResultEngine<Vec<DocumentSummary>> {
        Ok(self
            .recent_documents(user_id, None)
            .await?
            .iter()
            .map(Document::summary)
            .collect())
    }

    /// A single document owned by `user_id`.
    pub async fn document(&self, user_id: &str, document_id: Uuid) -> ResultEngine<Document> {
        with_tx!(self, |db_tx| {
            self.require_document(&db_tx, user_id, document_id).await
        })
    }

    /// Replaces the cached AI analysis of a document.
    pub async fn save_insights(
        &self,
        user_id: &str,
        document_id: Uuid,
        insights: &serde_json::Value,
    ) -> ResultEngine<()> {
        let serialized = serde_json::to_string(insights)
            .map_err(|err| EngineError::InvalidInput(format!("invalid insights: {err}")))?;

        with_tx!(self, |db_tx| {
            self.require_document(&db_tx, user_id, document_id)
                .await?;
            let active = documents::ActiveModel {
                id: ActiveValue::Set(document_id.to_string()),
                ai_insights: ActiveValue::Set(Some(serialized)),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Cached insights of the `limit` most recent documents.
    pub async fn recent_insights(
        &self,
        user_id: &str,
        limit: u64,
    ) -> ResultEngine<Vec<DocumentInsight>> {
        Ok(self
            .recent_documents(user_id, Some(limit))
            .await?
            .iter()
            .map(Document::insight)
            .collect())
    }

    async fn recent_documents(
        &self,
        user_id: &str,
        limit: Option<u64>,
    ) -> ResultEngine<Vec<Document>> {
        with_tx!(self, |db_tx| {
            let models = documents::Entity::find()
                .filter(documents::Column::UserId.eq(user_id))
                .order_by_desc(documents::Column::UploadDate)
                .order_by_desc(documents::Column::Id)
                .limit(limit)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Document::try_from).collect()
        })
    }

    async fn require_document(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        document_id: Uuid,
    ) -> ResultEngine<Document> {
        let model = documents::Entity::find_by_id(document_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("document not exists".to_string()))?;
        if model.user_id != user_id {
            return Err(EngineError::Forbidden(
                "document belongs to another user".to_string(),
            ));
        }
        Document::try_from(model)
    }
}
