//! Payment records.
//!
//! A `Payment` is written once by [`Engine::apply_payment`] and never
//! updated or removed afterwards.
//!
//! [`Engine::apply_payment`]: crate::Engine::apply_payment

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

pub const DEFAULT_DESCRIPTION: &str = "Fee Payment";
pub const DEFAULT_METHOD: &str = "online";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Completed,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
        }
    }
}

impl TryFrom<&str> for PaymentStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "completed" => Ok(Self::Completed),
            other => Err(EngineError::InvalidInput(format!(
                "invalid payment status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: String,
    pub amount_minor: i64,
    pub description: String,
    pub method: String,
    pub status: PaymentStatus,
    pub payment_date: DateTime<Utc>,
}

impl Payment {
    /// Builds a completed payment, falling back to the default description and
    /// method when none (or only whitespace) is given.
    pub fn completed(
        user_id: String,
        amount_minor: i64,
        description: Option<&str>,
        method: Option<&str>,
        payment_date: DateTime<Utc>,
    ) -> Self {
        let or_default = |value: Option<&str>, default: &str| {
            value
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(default)
                .to_string()
        };

        Self {
            id: Uuid::new_v4(),
            user_id,
            amount_minor,
            description: or_default(description, DEFAULT_DESCRIPTION),
            method: or_default(method, DEFAULT_METHOD),
            status: PaymentStatus::Completed,
            payment_date,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub amount_minor: i64,
    pub description: String,
    pub method: String,
    pub status: String,
    pub payment_date: DateTimeUtc,
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

impl TryFrom<Model> for Payment {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "payment")?,
            user_id: model.user_id,
            amount_minor: model.amount_minor,
            description: model.description,
            method: model.method,
            status: PaymentStatus::try_from(model.status.as_str())?,
            payment_date: model.payment_date,
        })
    }
}

impl From<&Payment> for ActiveModel {
    fn from(value: &Payment) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            amount_minor: ActiveValue::Set(value.amount_minor),
            description: ActiveValue::Set(value.description.clone()),
            method: ActiveValue::Set(value.method.clone()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            payment_date: ActiveValue::Set(value.payment_date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_payment_uses_defaults() {
        let payment = Payment::completed("s".to_string(), 10, None, Some("  "), Utc::now());
        assert_eq!(payment.description, DEFAULT_DESCRIPTION);
        assert_eq!(payment.method, DEFAULT_METHOD);
        assert_eq!(payment.status, PaymentStatus::Completed);
    }

    #[test]
    fn completed_payment_keeps_given_text() {
        let payment = Payment::completed(
            "s".to_string(),
            10,
            Some(" Semester 2 "),
            Some("card"),
            Utc::now(),
        );
        assert_eq!(payment.description, "Semester 2");
        assert_eq!(payment.method, "card");
    }

    #[test]
    fn status_round_trips_through_storage_string() {
        let status = PaymentStatus::try_from(PaymentStatus::Completed.as_str()).unwrap();
        assert_eq!(status, PaymentStatus::Completed);
        assert!(PaymentStatus::try_from("refunded").is_err());
    }
}
