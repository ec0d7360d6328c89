use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use ulid::Ulid;

type Result<T> = std::result::Result<T, Error>;

/// A payment record. Immutable once written; there is no update or delete
/// path on purpose.
#[derive(Serialize, Deserialize, Clone, Debug, sqlx::FromRow)]
pub struct Payment {
    pub id: String,
    pub transaction_id: String,
    pub user_id: String,
    pub restaurant_id: String,
    pub created_at: NaiveDateTime,
}

pub struct CreatePaymentPayload {
    pub transaction_id: String,
    pub user_id: String,
    pub restaurant_id: String,
}

#[derive(Debug)]
pub enum Error {
    UnexpectedError,
}

pub async fn create<'e, E: PgExecutor<'e>>(e: E, payload: CreatePaymentPayload) -> Result<Payment> {
    sqlx::query_as::<_, Payment>(
        "
        INSERT INTO payments (id, transaction_id, user_id, restaurant_id)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.transaction_id)
    .bind(payload.user_id)
    .bind(payload.restaurant_id)
    .fetch_one(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while creating a payment: {}", err);
        Error::UnexpectedError
    })
}

pub async fn find_many_by_user_id<'e, E: PgExecutor<'e>>(
    e: E,
    user_id: String,
) -> Result<Vec<Payment>> {
    sqlx::query_as::<_, Payment>(
        "SELECT * FROM payments WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while fetching payments: {}", err);
        Error::UnexpectedError
    })
}
