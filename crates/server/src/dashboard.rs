use api_types::dashboard::FinancialOverview;
use axum::{Extension, Json, extract::State};
use engine::User;

use crate::{ServerError, server::ServerState};

pub async fn financial(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<FinancialOverview>, ServerError> {
    let overview = state.engine.financial_overview(&user.id).await?;

    Ok(Json(FinancialOverview {
        total_semester_cost: overview.total_semester_cost_minor,
        amount_paid: overview.amount_paid_minor,
        pending_payments: overview.pending_payments_minor,
        monthly_budget: overview.monthly_budget_minor,
        paid_percentage: overview.paid_percentage,
        total_expenses: overview.total_expenses_minor,
    }))
}
