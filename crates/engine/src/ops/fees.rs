use chrono::Utc;
use serde::{Deserialize, Serialize};

use sea_orm::{
    DatabaseTransaction, QueryFilter, QuerySelect, TransactionTrait,
    prelude::*,
    sea_query::{Expr, OnConflict},
};

use crate::{
    EngineError, FeeAccount, Payment, ResultEngine, expenses, fees, payments, util::sum_minor,
};

use super::{Engine, with_tx};

/// Outcome of a successful payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub payment: Payment,
    /// Account snapshot right after the payment was applied.
    pub account: FeeAccount,
}

/// Dashboard figures derived from the fee account and the expenses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialOverview {
    pub total_semester_cost_minor: i64,
    pub amount_paid_minor: i64,
    pub pending_payments_minor: i64,
    /// Pending payments spread over three months.
    pub monthly_budget_minor: i64,
    /// Share of the total already paid, 0..=100 for consistent accounts.
    pub paid_percentage: i64,
    pub total_expenses_minor: i64,
}

impl FinancialOverview {
    fn compute(account: Option<&FeeAccount>, total_expenses_minor: i64) -> Self {
        let total = account.map_or(0, |a| a.total_fee_minor);
        let paid = account.map_or(0, |a| a.paid_amount_minor);
        let pending = total.saturating_sub(paid);
        let paid_percentage = if total > 0 {
            ((paid as f64 / total as f64) * 100.0).round() as i64
        } else {
            0
        };

        Self {
            total_semester_cost_minor: total,
            amount_paid_minor: paid,
            pending_payments_minor: pending,
            monthly_budget_minor: (pending as f64 / 3.0).round() as i64,
            paid_percentage,
            total_expenses_minor,
        }
    }
}

impl Engine {
    /// Returns the fee account of `user_id`, creating it with the default
    /// total fee when it does not exist yet.
    ///
    /// Creation is an insert-or-ignore on the primary key, so concurrent first
    /// accesses still end up with a single account.
    pub async fn fee_account(&self, user_id: &str) -> ResultEngine<FeeAccount> {
        with_tx!(self, |db_tx| self.ensure_fee_account(&db_tx, user_id).await)
    }

    pub(super) async fn ensure_fee_account(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<FeeAccount> {
        if let Some(model) = fees::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
        {
            return Ok(model.into());
        }

        let account = FeeAccount::new(
            user_id.to_string(),
            self.default_total_fee_minor,
            Utc::now(),
        );
        fees::Entity::insert(fees::ActiveModel::from(&account))
            .on_conflict(
                OnConflict::column(fees::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        tracing::debug!("created fee account for {user_id}");

        self.require_fee_account(db, user_id).await
    }

    async fn require_fee_account(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<FeeAccount> {
        fees::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .map(Into::into)
            .ok_or_else(|| EngineError::KeyNotFound("fee account not exists".to_string()))
    }

    /// Pays `amount_minor` towards the fee account of `user_id`.
    ///
    /// The account row is updated with a guarded increment
    /// (`remaining_fee_minor >= amount`), so two concurrent payments can never
    /// both consume the same remaining balance. The payment record and the
    /// account update commit together or not at all.
    pub async fn apply_payment(
        &self,
        user_id: &str,
        amount_minor: i64,
        description: Option<&str>,
        method: Option<&str>,
    ) -> ResultEngine<PaymentReceipt> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "payment amount must be > 0".to_string(),
            ));
        }
        let now = Utc::now();

        with_tx!(self, |db_tx| {
            let account = self.ensure_fee_account(&db_tx, user_id).await?;
            let mut preview = account.clone();
            preview.apply_payment(amount_minor, now)?;

            let updated = fees::Entity::update_many()
                .col_expr(
                    fees::Column::PaidAmountMinor,
                    Expr::col(fees::Column::PaidAmountMinor).add(amount_minor),
                )
                .col_expr(
                    fees::Column::RemainingFeeMinor,
                    Expr::col(fees::Column::RemainingFeeMinor).sub(amount_minor),
                )
                .col_expr(fees::Column::LastUpdated, Expr::value(now))
                .filter(fees::Column::UserId.eq(user_id))
                .filter(fees::Column::RemainingFeeMinor.gte(amount_minor))
                .exec(&db_tx)
                .await?;
            if updated.rows_affected == 0 {
                // A concurrent payment drained the balance after our read.
                return Err(EngineError::ExceedsBalance(format!(
                    "requested {amount_minor}, remaining fee changed concurrently"
                )));
            }

            let payment = Payment::completed(
                user_id.to_string(),
                amount_minor,
                description,
                method,
                now,
            );
            payments::ActiveModel::from(&payment).insert(&db_tx).await?;

            let account = self.require_fee_account(&db_tx, user_id).await?;
            Ok(PaymentReceipt { payment, account })
        })
    }

    /// Overwrites the fee structure of `user_id` (administrative correction).
    ///
    /// `remaining_fee_minor` is recomputed as `total - paid`. No check is made
    /// that `paid <= total`, so the remaining fee can become negative.
    pub async fn update_fee_structure(
        &self,
        user_id: &str,
        total_fee_minor: i64,
        paid_amount_minor: i64,
    ) -> ResultEngine<FeeAccount> {
        let account = FeeAccount::with_structure(
            user_id.to_string(),
            total_fee_minor,
            paid_amount_minor,
            Utc::now(),
        )?;
        if account.remaining_fee_minor < 0 {
            tracing::warn!(
                "fee structure for {user_id} leaves a negative remaining fee ({})",
                account.remaining_fee_minor
            );
        }

        with_tx!(self, |db_tx| {
            fees::Entity::insert(fees::ActiveModel::from(&account))
                .on_conflict(
                    OnConflict::column(fees::Column::UserId)
                        .update_columns([
                            fees::Column::TotalFeeMinor,
                            fees::Column::PaidAmountMinor,
                            fees::Column::RemainingFeeMinor,
                            fees::Column::LastUpdated,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(&db_tx)
                .await?;
            self.require_fee_account(&db_tx, user_id).await
        })
    }

    /// Dashboard overview. A student without a fee account gets zeros and no
    /// account is created.
    pub async fn financial_overview(&self, user_id: &str) -> ResultEngine<FinancialOverview> {
        with_tx!(self, |db_tx| {
            let account: Option<FeeAccount> = fees::Entity::find_by_id(user_id.to_string())
                .one(&db_tx)
                .await?
                .map(Into::into);

            let amounts: Vec<i64> = expenses::Entity::find()
                .select_only()
                .column(expenses::Column::AmountMinor)
                .filter(expenses::Column::UserId.eq(user_id))
                .into_tuple()
                .all(&db_tx)
                .await?;
            let total_expenses_minor = sum_minor(amounts)?;

            Ok(FinancialOverview::compute(
                account.as_ref(),
                total_expenses_minor,
            ))
        })
    }
}
