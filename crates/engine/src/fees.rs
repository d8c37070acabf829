//! The module contains the `FeeAccount` struct and its table.
//!
//! A fee account tracks the tuition owed by a single student. The three
//! amounts are kept consistent: `remaining_fee_minor` is always
//! `total_fee_minor - paid_amount_minor`.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Fee balance of a student.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeAccount {
    /// Owning user id.
    pub user_id: String,
    pub total_fee_minor: i64,
    pub paid_amount_minor: i64,
    pub remaining_fee_minor: i64,
    pub last_updated: DateTime<Utc>,
}

impl FeeAccount {
    /// A fresh account: nothing paid, everything remaining.
    pub fn new(user_id: String, total_fee_minor: i64, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            total_fee_minor,
            paid_amount_minor: 0,
            remaining_fee_minor: total_fee_minor,
            last_updated: now,
        }
    }

    /// An account with an explicit fee structure.
    ///
    /// `paid_amount_minor` is not checked against `total_fee_minor`, so the
    /// remaining fee can be negative.
    pub fn with_structure(
        user_id: String,
        total_fee_minor: i64,
        paid_amount_minor: i64,
        now: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        let remaining_fee_minor = total_fee_minor
            .checked_sub(paid_amount_minor)
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))?;
        Ok(Self {
            user_id,
            total_fee_minor,
            paid_amount_minor,
            remaining_fee_minor,
            last_updated: now,
        })
    }

    /// Checks that `amount_minor` can be paid against this account.
    pub fn check_payment(&self, amount_minor: i64) -> ResultEngine<()> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "payment amount must be > 0".to_string(),
            ));
        }
        if amount_minor > self.remaining_fee_minor {
            return Err(EngineError::ExceedsBalance(format!(
                "requested {amount_minor}, remaining {}",
                self.remaining_fee_minor
            )));
        }
        Ok(())
    }

    /// Records a payment in memory.
    pub fn apply_payment(&mut self, amount_minor: i64, now: DateTime<Utc>) -> ResultEngine<()> {
        self.check_payment(amount_minor)?;
        self.paid_amount_minor += amount_minor;
        self.remaining_fee_minor -= amount_minor;
        self.last_updated = now;
        Ok(())
    }

    /// `true` when the remaining fee matches total minus paid.
    pub fn is_consistent(&self) -> bool {
        self.total_fee_minor.checked_sub(self.paid_amount_minor) == Some(self.remaining_fee_minor)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "student_fees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub total_fee_minor: i64,
    pub paid_amount_minor: i64,
    pub remaining_fee_minor: i64,
    pub last_updated: DateTimeUtc,
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

impl From<Model> for FeeAccount {
    fn from(model: Model) -> Self {
        Self {
            user_id: model.user_id,
            total_fee_minor: model.total_fee_minor,
            paid_amount_minor: model.paid_amount_minor,
            remaining_fee_minor: model.remaining_fee_minor,
            last_updated: model.last_updated,
        }
    }
}

impl From<&FeeAccount> for ActiveModel {
    fn from(value: &FeeAccount) -> Self {
        Self {
            user_id: ActiveValue::Set(value.user_id.clone()),
            total_fee_minor: ActiveValue::Set(value.total_fee_minor),
            paid_amount_minor: ActiveValue::Set(value.paid_amount_minor),
            remaining_fee_minor: ActiveValue::Set(value.remaining_fee_minor),
            last_updated: ActiveValue::Set(value.last_updated),
        }
    }
}
