use std::collections::BTreeMap;

use chrono::{Datelike, Utc};
use uuid::Uuid;

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    CategoryTotal, EngineError, Expense, ExpenseCategory, ExpenseStats, MonthlyTotal, NewExpense,
    ResultEngine, expenses,
    util::{add_minor, normalize_optional_text, normalize_required, sum_minor},
};

use super::{Engine, with_tx};

const MONTHLY_TREND_LEN: usize = 6;

fn stats_from(expenses: &[Expense]) -> ResultEngine<ExpenseStats> {
    let total_minor = sum_minor(expenses.iter().map(|e| e.amount_minor))?;

    let mut by_category: BTreeMap<ExpenseCategory, (i64, u64)> = BTreeMap::new();
    let mut by_month: BTreeMap<(i32, u32), (i64, u64)> = BTreeMap::new();
    for expense in expenses {
        let slot = by_category.entry(expense.category).or_default();
        slot.0 = add_minor(slot.0, expense.amount_minor)?;
        slot.1 += 1;

        let slot = by_month
            .entry((expense.date.year(), expense.date.month()))
            .or_default();
        slot.0 = add_minor(slot.0, expense.amount_minor)?;
        slot.1 += 1;
    }

    let mut categories: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, (total_minor, count))| CategoryTotal {
            category,
            total_minor,
            count,
        })
        .collect();
    // Stable sort keeps the enum order for ties.
    categories.sort_by(|a, b| b.total_minor.cmp(&a.total_minor));

    let monthly = by_month
        .into_iter()
        .rev()
        .take(MONTHLY_TREND_LEN)
        .map(|((year, month), (total_minor, count))| MonthlyTotal {
            year,
            month,
            total_minor,
            count,
        })
        .collect();

    Ok(ExpenseStats {
        total_minor,
        categories,
        monthly,
    })
}

impl Engine {
    /// Records a new expense for `user_id`.
    pub async fn add_expense(&self, user_id: &str, input: NewExpense) -> ResultEngine<Expense> {
        let description = normalize_required(&input.description, "description")?;
        if input.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "expense amount must be > 0".to_string(),
            ));
        }
        let category: ExpenseCategory = input.category.parse()?;
        let now = Utc::now();

        let expense = Expense {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            description,
            amount_minor: input.amount_minor,
            category,
            date: input.date.unwrap_or(now),
            method: normalize_optional_text(input.method.as_deref())
                .unwrap_or_else(|| expenses::DEFAULT_METHOD.to_string()),
            created_at: now,
        };

        with_tx!(self, |db_tx| {
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
            Ok(expense)
        })
    }

    /// Expenses of `user_id`, most recent `date` first.
    pub async fn expenses(&self, user_id: &str) -> ResultEngine<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            let models = expenses::Entity::find()
                .filter(expenses::Column::UserId.eq(user_id))
                .order_by_desc(expenses::Column::Date)
                .order_by_desc(expenses::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Expense::try_from).collect()
        })
    }

    /// Totals per category and per month for `user_id`.
    pub async fn expense_stats(&self, user_id: &str) -> ResultEngine<ExpenseStats> {
        let expenses = self.expenses(user_id).await?;
        stats_from(&expenses)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn expense(category: ExpenseCategory, amount_minor: i64, year: i32, month: u32) -> Expense {
        let date = Utc.with_ymd_and_hms(year, month, 10, 12, 0, 0).unwrap();
        Expense {
            id: Uuid::new_v4(),
            user_id: "s".to_string(),
            description: "x".to_string(),
            amount_minor,
            category,
            date,
            method: "cash".to_string(),
            created_at: date,
        }
    }

    #[test]
    fn stats_group_by_category_largest_first() {
        let stats = stats_from(&[
            expense(ExpenseCategory::Food, 300, 2026, 1),
            expense(ExpenseCategory::Books, 1000, 2026, 1),
            expense(ExpenseCategory::Food, 200, 2026, 2),
        ])
        .unwrap();

        assert_eq!(stats.total_minor, 1500);
        assert_eq!(stats.categories[0].category, ExpenseCategory::Books);
        assert_eq!(stats.categories[1].category, ExpenseCategory::Food);
        assert_eq!(stats.categories[1].total_minor, 500);
        assert_eq!(stats.categories[1].count, 2);
    }

    #[test]
    fn stats_keep_six_most_recent_months() {
        let list: Vec<Expense> = (1..=8)
            .map(|m| expense(ExpenseCategory::Other, 100 * i64::from(m), 2026, m))
            .collect();
        let stats = stats_from(&list).unwrap();

        assert_eq!(stats.monthly.len(), 6);
        assert_eq!((stats.monthly[0].year, stats.monthly[0].month), (2026, 8));
        assert_eq!((stats.monthly[5].year, stats.monthly[5].month), (2026, 3));
    }

    #[test]
    fn stats_of_nothing_are_empty() {
        let stats = stats_from(&[]).unwrap();
        assert_eq!(stats.total_minor, 0);
        assert!(stats.categories.is_empty());
        assert!(stats.monthly.is_empty());
    }

    #[test]
    fn stats_reject_overflowing_totals() {
        let huge = i64::MAX / 2 + 1;
        let result = stats_from(&[
            expense(ExpenseCategory::Food, huge, 2026, 1),
            expense(ExpenseCategory::Books, huge, 2026, 2),
        ]);
        assert!(matches!(result, Err(EngineError::InvalidAmount(_))));
    }
}
