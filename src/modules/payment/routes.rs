use super::repository;
use crate::{
    modules::{auth::middleware::OwnerAuth, restaurant},
    types::Context,
    utils,
};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

#[derive(Deserialize, Validate)]
struct CreatePaymentPayload {
    #[validate(length(min = 1))]
    pub transaction_id: String,
    pub restaurant_id: String,
}

/// A successful payment by the restaurant's owner starts a 7-day promotion
/// window before the payment row itself is written.
async fn create_payment(
    State(ctx): State<Arc<Context>>,
    auth: OwnerAuth,
    Json(payload): Json<CreatePaymentPayload>,
) -> impl IntoResponse {
    if let Err(errors) = payload.validate() {
        return utils::validation::into_response(errors);
    }

    let found =
        match restaurant::repository::find_by_id(&ctx.db_conn.pool, payload.restaurant_id).await {
            Ok(Some(found)) => found,
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": "Restaurant not found" })),
                )
            }
            Err(_) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to create payment" })),
                )
            }
        };

    if !restaurant::repository::is_owner(&auth.user, &found) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "You are not the owner of this restaurant" })),
        );
    }

    let until = restaurant::repository::promotion_window(Utc::now().naive_utc());

    if let Err(_) =
        restaurant::repository::promote_by_id(&ctx.db_conn.pool, found.id.clone(), until).await
    {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to create payment" })),
        );
    }

    match repository::create(
        &ctx.db_conn.pool,
        repository::CreatePaymentPayload {
            transaction_id: payload.transaction_id,
            user_id: auth.user.id,
            restaurant_id: found.id,
        },
    )
    .await
    {
        Ok(payment) => (StatusCode::CREATED, Json(json!(payment))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to create payment" })),
        ),
    }
}

async fn get_payments(auth: OwnerAuth, State(ctx): State<Arc<Context>>) -> impl IntoResponse {
    match repository::find_many_by_user_id(&ctx.db_conn.pool, auth.user.id).await {
        Ok(payments) => (StatusCode::OK, Json(json!(payments))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch payments" })),
        ),
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new().route("/", post(create_payment).get(get_payments))
}
