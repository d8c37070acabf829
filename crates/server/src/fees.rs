//! Fee account endpoints

use api_types::fees::{FeeDetails, FeeUpdate, FeeUpdateResponse, FeesResponse};
use axum::{Extension, Json, extract::State};
use engine::{FeeAccount, User};

use crate::{JsonBody, ServerError, required, server::ServerState};

pub(crate) fn details(account: FeeAccount) -> FeeDetails {
    FeeDetails {
        total_fee: account.total_fee_minor,
        paid_amount: account.paid_amount_minor,
        remaining_fee: account.remaining_fee_minor,
        last_updated: account.last_updated,
    }
}

/// Current fee account, created with the default total on first access.
pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<FeesResponse>, ServerError> {
    let account = state.engine.fee_account(&user.id).await?;
    Ok(Json(FeesResponse {
        fee_details: details(account),
    }))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<FeeUpdate>,
) -> Result<Json<FeeUpdateResponse>, ServerError> {
    let total_fee = required(payload.total_fee, "totalFee")?;
    let paid_amount = required(payload.paid_amount, "paidAmount")?;

    let account = state
        .engine
        .update_fee_structure(&user.id, total_fee, paid_amount)
        .await?;

    Ok(Json(FeeUpdateResponse {
        success: true,
        fee_details: details(account),
    }))
}
