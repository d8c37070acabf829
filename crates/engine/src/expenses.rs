//! Expenses: money a student spent, tracked independently of the fee ledger.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

pub const DEFAULT_METHOD: &str = "cash";

/// Fixed set of expense categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Tuition,
    Books,
    Food,
    Transportation,
    Lab,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 6] = [
        Self::Tuition,
        Self::Books,
        Self::Food,
        Self::Transportation,
        Self::Lab,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tuition => "tuition",
            Self::Books => "books",
            Self::Food => "food",
            Self::Transportation => "transportation",
            Self::Lab => "lab",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseCategory {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| EngineError::InvalidInput(format!("invalid expense category: {s}")))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: String,
    pub description: String,
    pub amount_minor: i64,
    pub category: ExpenseCategory,
    pub date: DateTime<Utc>,
    pub method: String,
    pub created_at: DateTime<Utc>,
}

/// Input for [`Engine::add_expense`](crate::Engine::add_expense).
#[derive(Clone, Debug, Default)]
pub struct NewExpense {
    pub description: String,
    pub amount_minor: i64,
    pub category: String,
    /// Defaults to the creation time.
    pub date: Option<DateTime<Utc>>,
    /// Defaults to [`DEFAULT_METHOD`].
    pub method: Option<String>,
}

/// Aggregated expense figures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseStats {
    pub total_minor: i64,
    /// Sorted by total, largest first.
    pub categories: Vec<CategoryTotal>,
    /// Most recent month first, at most six months.
    pub monthly: Vec<MonthlyTotal>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub total_minor: i64,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub total_minor: i64,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub description: String,
    pub amount_minor: i64,
    pub category: String,
    pub date: DateTimeUtc,
    pub method: String,
    pub created_at: DateTimeUtc,
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

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            user_id: model.user_id,
            description: model.description,
            amount_minor: model.amount_minor,
            category: model.category.parse()?,
            date: model.date,
            method: model.method,
            created_at: model.created_at,
        })
    }
}

impl From<&Expense> for ActiveModel {
    fn from(value: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            description: ActiveValue::Set(value.description.clone()),
            amount_minor: ActiveValue::Set(value.amount_minor),
            category: ActiveValue::Set(value.category.as_str().to_string()),
            date: ActiveValue::Set(value.date),
            method: ActiveValue::Set(value.method.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}
