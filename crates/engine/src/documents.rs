//! Uploaded financial documents.
//!
//! Documents keep their raw bytes alongside the text extracted at upload time
//! and the last AI analysis (as opaque JSON text).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

pub const PDF_PLACEHOLDER: &str = "PDF text extraction not supported";
pub const IMAGE_PLACEHOLDER: &str = "Image file. Text extraction not supported yet.";
pub const UNSUPPORTED_PLACEHOLDER: &str = "Unsupported file type. Text extraction not supported.";

/// Derives the searchable text of an upload from its content type.
pub fn extract_text(content_type: &str, data: &[u8]) -> String {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if mime == "text/plain" {
        String::from_utf8_lossy(data).into_owned()
    } else if mime == "application/pdf" {
        PDF_PLACEHOLDER.to_string()
    } else if mime.starts_with("image/") {
        IMAGE_PLACEHOLDER.to_string()
    } else {
        UNSUPPORTED_PLACEHOLDER.to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub id: Uuid,
    pub user_id: String,
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub extracted_text: String,
    pub upload_date: DateTime<Utc>,
    pub ai_insights: Option<String>,
}

/// A document without its bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub extracted_text: String,
    pub upload_date: DateTime<Utc>,
    pub ai_insights: Option<String>,
}

/// Cached analysis of a recent document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentInsight {
    pub document_id: Uuid,
    pub filename: String,
    pub upload_date: DateTime<Utc>,
    /// `None` when the document was never analysed or the cache is not JSON.
    pub ai_insights: Option<serde_json::Value>,
}

impl Document {
    pub fn new(
        user_id: String,
        filename: String,
        content_type: String,
        data: Vec<u8>,
        upload_date: DateTime<Utc>,
    ) -> Self {
        let extracted_text = extract_text(&content_type, &data);
        Self {
            id: Uuid::new_v4(),
            user_id,
            filename,
            content_type,
            data,
            extracted_text,
            upload_date,
            ai_insights: None,
        }
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id,
            filename: self.filename.clone(),
            content_type: self.content_type.clone(),
            extracted_text: self.extracted_text.clone(),
            upload_date: self.upload_date,
            ai_insights: self.ai_insights.clone(),
        }
    }

    pub fn insight(&self) -> DocumentInsight {
        DocumentInsight {
            document_id: self.id,
            filename: self.filename.clone(),
            upload_date: self.upload_date,
            ai_insights: self
                .ai_insights
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .and_then(|s| serde_json::from_str(s).ok()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
    #[sea_orm(column_type = "Text")]
    pub extracted_text: String,
    pub upload_date: DateTimeUtc,
    #[sea_orm(column_type = "Text", nullable)]
    pub ai_insights: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Document {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "document")?,
            user_id: model.user_id,
            filename: model.filename,
            content_type: model.content_type,
            data: model.data,
            extracted_text: model.extracted_text,
            upload_date: model.upload_date,
            ai_insights: model.ai_insights,
        })
    }
}

impl From<&Document> for ActiveModel {
    fn from(value: &Document) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            filename: ActiveValue::Set(value.filename.clone()),
            content_type: ActiveValue::Set(value.content_type.clone()),
            data: ActiveValue::Set(value.data.clone()),
            extracted_text: ActiveValue::Set(value.extracted_text.clone()),
            upload_date: ActiveValue::Set(value.upload_date),
            ai_insights: ActiveValue::Set(value.ai_insights.clone()),
        }
    }
}
