use super::repository;
use crate::{
    modules::{
        auth::middleware::{Auth, ClientAuth},
        dish, restaurant,
    },
    types::Context,
    utils,
};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

#[derive(Deserialize, Serialize, Validate)]
struct CreateOrderItemPayload {
    pub dish_id: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Deserialize, Validate)]
struct CreateOrderPayload {
    pub restaurant_id: String,
    #[validate(length(min = 1), nested)]
    pub items: Vec<CreateOrderItemPayload>,
}

async fn create_order(
    State(ctx): State<Arc<Context>>,
    auth: ClientAuth,
    Json(payload): Json<CreateOrderPayload>,
) -> impl IntoResponse {
    if let Err(errors) = payload.validate() {
        return utils::validation::into_response(errors);
    }

    let restaurant =
        match restaurant::repository::find_by_id(&ctx.db_conn.pool, payload.restaurant_id.clone())
            .await
        {
            Ok(Some(restaurant)) => restaurant,
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": "Restaurant not found" })),
                )
            }
            Err(_) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to create order" })),
                )
            }
        };

    let mut total = BigDecimal::from(0);
    let mut items = Vec::with_capacity(payload.items.len());

    for item in payload.items {
        let found = match dish::repository::find_by_id(&ctx.db_conn.pool, item.dish_id.clone()).await
        {
            Ok(found) => found,
            Err(_) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to create order" })),
                )
            }
        };

        // Every dish has to exist and come from the ordered restaurant.
        let dish = match found {
            Some(dish) if dish.restaurant_id == restaurant.id => dish,
            _ => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Dish not found on this restaurant's menu" })),
                )
            }
        };

        total += dish.price * BigDecimal::from(item.quantity);
        items.push(repository::CreateOrderItemPayload {
            dish_id: dish.id,
            quantity: item.quantity,
        });
    }

    match repository::create(
        ctx.db_conn.clone(),
        repository::CreateOrderPayload {
            customer_id: auth.user.id,
            restaurant_id: restaurant.id,
            total,
            items,
        },
    )
    .await
    {
        Ok(order) => (StatusCode::CREATED, Json(json!(order))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to create order" })),
        ),
    }
}

async fn get_orders(auth: ClientAuth, State(ctx): State<Arc<Context>>) -> impl IntoResponse {
    match repository::find_many_by_customer_id(&ctx.db_conn.pool, auth.user.id).await {
        Ok(orders) => (StatusCode::OK, Json(json!(orders))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch orders" })),
        ),
    }
}

async fn get_order_by_id(
    Path(id): Path<String>,
    State(ctx): State<Arc<Context>>,
    auth: Auth,
) -> impl IntoResponse {
    let order = match repository::find_by_id(&ctx.db_conn.pool, id).await {
        Ok(Some(order)) => order,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Order not found" })),
            )
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch order" })),
            )
        }
    };

    // Visible to its customer, its driver, and the restaurant's owner.
    let mut allowed = order.customer_id == auth.user.id
        || order.driver_id.as_deref() == Some(auth.user.id.as_str());

    if !allowed {
        allowed =
            match restaurant::repository::find_by_id(&ctx.db_conn.pool, order.restaurant_id.clone())
                .await
            {
                Ok(Some(restaurant)) => restaurant.owner_id == auth.user.id,
                _ => false,
            };
    }

    if !allowed {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "You cannot see this order" })),
        );
    }

    match repository::find_items_by_order_id(&ctx.db_conn.pool, order.id.clone()).await {
        Ok(items) => (
            StatusCode::OK,
            Json(json!({ "order": order, "items": items })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch order" })),
        ),
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", post(create_order).get(get_orders))
        .route("/:id", get(get_order_by_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn an_order_without_items_fails_validation() {
        let payload = CreateOrderPayload {
            restaurant_id: "01J6W2Q0C0000000000000000E".to_string(),
            items: vec![],
        };

        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("items"));
    }

    #[test]
    fn an_item_with_zero_quantity_fails_validation() {
        let payload = CreateOrderPayload {
            restaurant_id: "01J6W2Q0C0000000000000000E".to_string(),
            items: vec![CreateOrderItemPayload {
                dish_id: "01J6W2Q0C0000000000000000F".to_string(),
                quantity: 0,
            }],
        };

        assert!(payload.validate().is_err());
    }
}
