use crate::utils::database::DatabaseConnection;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use sqlx::PgExecutor;
use ulid::Ulid;

type Result<T> = std::result::Result<T, Error>;

#[derive(Serialize, Deserialize, Clone, Debug, sqlx::FromRow)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub driver_id: Option<String>,
    pub restaurant_id: String,
    pub status: String,
    pub total: BigDecimal,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Serialize, Deserialize, Clone, Debug, sqlx::FromRow)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub dish_id: String,
    pub quantity: i32,
}

pub struct CreateOrderPayload {
    pub customer_id: String,
    pub restaurant_id: String,
    pub total: BigDecimal,
    pub items: Vec<CreateOrderItemPayload>,
}

pub struct CreateOrderItemPayload {
    pub dish_id: String,
    pub quantity: i32,
}

#[derive(Debug)]
pub enum Error {
    UnexpectedError,
}

/// The order row and its items are one compound write; either all of it
/// lands or none of it does.
pub async fn create(db: DatabaseConnection, payload: CreateOrderPayload) -> Result<Order> {
    let mut tx = db.pool.begin().await.map_err(|err| {
        tracing::error!("Failed to begin transaction: {}", err);
        Error::UnexpectedError
    })?;

    let order = sqlx::query_as::<_, Order>(
        "
        INSERT INTO orders (id, customer_id, restaurant_id, total)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.customer_id)
    .bind(payload.restaurant_id)
    .bind(payload.total)
    .fetch_one(&mut *tx)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while creating an order: {}", err);
        Error::UnexpectedError
    })?;

    for item in payload.items {
        sqlx::query("INSERT INTO order_items (id, order_id, dish_id, quantity) VALUES ($1, $2, $3, $4)")
            .bind(Ulid::new().to_string())
            .bind(order.id.clone())
            .bind(item.dish_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await
            .map_err(|err| {
                tracing::error!("Error occurred while creating an order item: {}", err);
                Error::UnexpectedError
            })?;
    }

    tx.commit().await.map_err(|err| {
        tracing::error!("Failed to commit transaction: {}", err);
        Error::UnexpectedError
    })?;

    Ok(order)
}

pub async fn find_by_id<'e, E: PgExecutor<'e>>(e: E, id: String) -> Result<Option<Order>> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id.clone())
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while fetching order with id {}: {}", id, err);
            Error::UnexpectedError
        })
}

pub async fn find_items_by_order_id<'e, E: PgExecutor<'e>>(
    e: E,
    order_id: String,
) -> Result<Vec<OrderItem>> {
    sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = $1")
        .bind(order_id)
        .fetch_all(e)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while fetching order items: {}", err);
            Error::UnexpectedError
        })
}

pub async fn find_many_by_customer_id<'e, E: PgExecutor<'e>>(
    e: E,
    customer_id: String,
) -> Result<Vec<Order>> {
    sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE customer_id = $1 ORDER BY created_at DESC",
    )
    .bind(customer_id)
    .fetch_all(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while fetching orders: {}", err);
        Error::UnexpectedError
    })
}
