//! Payment endpoints

use api_types::payments::{
    PaymentCreated, PaymentList, PaymentListResponse, PaymentNew, PaymentView,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use engine::{Payment, User};

use crate::{JsonBody, ServerError, fees::details, required, server::ServerState};

const DEFAULT_PAGE_SIZE: u64 = 50;

fn view(payment: Payment) -> PaymentView {
    PaymentView {
        id: payment.id,
        amount: payment.amount_minor,
        description: payment.description,
        method: payment.method,
        status: payment.status.as_str().to_string(),
        payment_date: payment.payment_date,
    }
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<PaymentNew>,
) -> Result<(StatusCode, Json<PaymentCreated>), ServerError> {
    let amount = required(payload.amount, "amount")?;

    let receipt = state
        .engine
        .apply_payment(
            &user.id,
            amount,
            payload.description.as_deref(),
            payload.method.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PaymentCreated {
            message: "Payment processed successfully".to_string(),
            payment: view(receipt.payment),
            fee_details: details(receipt.account),
        }),
    ))
}

/// Payment history, newest first.
///
/// Without `limit` and `cursor` the whole history is returned. Otherwise the
/// history is paged, `DEFAULT_PAGE_SIZE` rows at a time unless `limit` says
/// otherwise.
pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<PaymentList>,
) -> Result<Json<PaymentListResponse>, ServerError> {
    let (payments, next_cursor) = match (query.limit, query.cursor.as_deref()) {
        (None, None) => (state.engine.payments(&user.id).await?, None),
        (limit, cursor) => {
            state
                .engine
                .payments_page(&user.id, limit.unwrap_or(DEFAULT_PAGE_SIZE), cursor)
                .await?
        }
    };

    Ok(Json(PaymentListResponse {
        payments: payments.into_iter().map(view).collect(),
        next_cursor,
    }))
}
