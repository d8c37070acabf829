//! Expense endpoints

use api_types::expenses::{
    CategoryBreakdown, ExpenseCreated, ExpenseNew, ExpenseStatsResponse, ExpenseView,
    ExpensesResponse, MonthlyTrend,
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;
use engine::{Expense, NewExpense, User};

use crate::{JsonBody, ServerError, required, server::ServerState};

fn view(expense: Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        description: expense.description,
        amount: expense.amount_minor,
        category: expense.category.to_string(),
        date: expense.date,
        method: expense.method,
        created_at: expense.created_at,
    }
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseCreated>), ServerError> {
    let input = NewExpense {
        description: required(payload.description, "description")?,
        amount_minor: required(payload.amount, "amount")?,
        category: required(payload.category, "category")?,
        date: payload.date.map(|dt| dt.with_timezone(&Utc)),
        method: payload.method,
    };

    let expense = state.engine.add_expense(&user.id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ExpenseCreated {
            message: "Expense added successfully".to_string(),
            expense: view(expense),
        }),
    ))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<ExpensesResponse>, ServerError> {
    let expenses = state.engine.expenses(&user.id).await?;
    Ok(Json(ExpensesResponse {
        expenses: expenses.into_iter().map(view).collect(),
    }))
}

pub async fn stats(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<ExpenseStatsResponse>, ServerError> {
    let stats = state.engine.expense_stats(&user.id).await?;

    Ok(Json(ExpenseStatsResponse {
        total_expenses: stats.total_minor,
        category_breakdown: stats
            .categories
            .into_iter()
            .map(|c| CategoryBreakdown {
                category: c.category.to_string(),
                total: c.total_minor,
                count: c.count,
            })
            .collect(),
        monthly_trends: stats
            .monthly
            .into_iter()
            .map(|m| MonthlyTrend {
                year: m.year,
                month: m.month,
                total: m.total_minor,
                count: m.count,
            })
            .collect(),
    }))
}
