use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sea_orm::{Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};

use crate::{EngineError, Payment, ResultEngine, payments};

use super::{Engine, with_tx};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct PaymentsCursor {
    payment_date: DateTime<Utc>,
    payment_id: String,
}

impl PaymentsCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid payments cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("invalid payments cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid payments cursor".to_string()))
    }
}

impl Engine {
    /// Full payment history of `user_id`, newest first.
    pub async fn payments(&self, user_id: &str) -> ResultEngine<Vec<Payment>> {
        with_tx!(self, |db_tx| {
            let models = payments::Entity::find()
                .filter(payments::Column::UserId.eq(user_id))
                .order_by_desc(payments::Column::PaymentDate)
                .order_by_desc(payments::Column::Id)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Payment::try_from).collect()
        })
    }

    /// Payment history of `user_id` with cursor-based pagination.
    ///
    /// Pagination is newest → older by `(payment_date DESC, id DESC)`. The
    /// returned cursor is `Some` only when more payments follow.
    pub async fn payments_page(
        &self,
        user_id: &str,
        limit: u64,
        cursor: Option<&str>,
    ) -> ResultEngine<(Vec<Payment>, Option<String>)> {
        if limit == 0 {
            return Err(EngineError::InvalidInput("limit must be > 0".to_string()));
        }

        with_tx!(self, |db_tx| {
            let mut query = payments::Entity::find()
                .filter(payments::Column::UserId.eq(user_id))
                .order_by_desc(payments::Column::PaymentDate)
                .order_by_desc(payments::Column::Id)
                .limit(limit.saturating_add(1));

            if let Some(cursor) = cursor {
                let cursor = PaymentsCursor::decode(cursor)?;
                query = query.filter(
                    Condition::any()
                        .add(payments::Column::PaymentDate.lt(cursor.payment_date))
                        .add(
                            Condition::all()
                                .add(payments::Column::PaymentDate.eq(cursor.payment_date))
                                .add(payments::Column::Id.lt(cursor.payment_id)),
                        ),
                );
            }

            let rows = query.all(&db_tx).await?;
            let has_more = rows.len() > limit as usize;

            let out = rows
                .into_iter()
                .take(limit as usize)
                .map(Payment::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            let next_cursor = if has_more {
                out.last()
                    .map(|p| PaymentsCursor {
                        payment_date: p.payment_date,
                        payment_id: p.id.to_string(),
                    })
                    .map(|c| c.encode())
                    .transpose()?
            } else {
                None
            };

            Ok((out, next_cursor))
        })
    }
}
