use super::repository;
use crate::{
    modules::{auth::middleware::OwnerAuth, restaurant},
    types::Context,
    utils,
};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Router,
};
use bigdecimal::{BigDecimal, FromPrimitive};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

#[derive(Deserialize, Validate)]
struct CreateDishPayload {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(url)]
    pub photo: Option<String>,
    pub description: String,
    pub restaurant_id: String,
}

async fn create_dish(
    State(ctx): State<Arc<Context>>,
    auth: OwnerAuth,
    Json(payload): Json<CreateDishPayload>,
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
                    Json(json!({ "error": "Failed to create dish" })),
                )
            }
        };

    if !restaurant::repository::is_owner(&auth.user, &restaurant) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "You are not the owner of this restaurant" })),
        );
    }

    match repository::create(
        &ctx.db_conn.pool,
        repository::CreateDishPayload {
            name: payload.name,
            price: BigDecimal::from_f64(payload.price).unwrap_or(BigDecimal::from(0)),
            photo: payload.photo,
            description: payload.description,
            restaurant_id: restaurant.id,
        },
    )
    .await
    {
        Ok(dish) => (StatusCode::CREATED, Json(json!(dish))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to create dish" })),
        ),
    }
}

async fn get_dishes_by_restaurant_id(
    Path(restaurant_id): Path<String>,
    State(ctx): State<Arc<Context>>,
) -> impl IntoResponse {
    match repository::find_many_by_restaurant_id(&ctx.db_conn.pool, restaurant_id).await {
        Ok(dishes) => (StatusCode::OK, Json(json!(dishes))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch dishes" })),
        ),
    }
}

/// Loads the dish and its restaurant, enforcing existence before ownership.
async fn load_owned_dish(
    ctx: &Arc<Context>,
    auth: &OwnerAuth,
    id: String,
) -> Result<repository::Dish, (StatusCode, Json<serde_json::Value>)> {
    let dish = repository::find_by_id(&ctx.db_conn.pool, id)
        .await
        .map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch dish" })),
            )
        })?
        .ok_or((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Dish not found" })),
        ))?;

    let restaurant =
        restaurant::repository::find_by_id(&ctx.db_conn.pool, dish.restaurant_id.clone())
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to fetch dish" })),
                )
            })?
            .ok_or((
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Restaurant not found" })),
            ))?;

    if !repository::is_owner(&auth.user, &restaurant, &dish) {
        return Err((
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "You are not the owner of this dish" })),
        ));
    }

    Ok(dish)
}

#[derive(Deserialize, Validate)]
struct UpdateDishPayload {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(url)]
    pub photo: Option<String>,
    pub description: Option<String>,
}

async fn update_dish_by_id(
    Path(id): Path<String>,
    State(ctx): State<Arc<Context>>,
    auth: OwnerAuth,
    Json(payload): Json<UpdateDishPayload>,
) -> impl IntoResponse {
    if let Err(errors) = payload.validate() {
        return utils::validation::into_response(errors);
    }

    let dish = match load_owned_dish(&ctx, &auth, id).await {
        Ok(dish) => dish,
        Err(err) => return err,
    };

    match repository::update_by_id(
        &ctx.db_conn.pool,
        dish.id,
        repository::UpdateDishPayload {
            name: payload.name,
            price: payload
                .price
                .map(|price| BigDecimal::from_f64(price).unwrap_or(BigDecimal::from(0))),
            photo: payload.photo,
            description: payload.description,
        },
    )
    .await
    {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "message": "Dish updated successfully" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to update dish" })),
        ),
    }
}

async fn delete_dish_by_id(
    Path(id): Path<String>,
    State(ctx): State<Arc<Context>>,
    auth: OwnerAuth,
) -> impl IntoResponse {
    let dish = match load_owned_dish(&ctx, &auth, id).await {
        Ok(dish) => dish,
        Err(err) => return err,
    };

    match repository::delete_by_id(&ctx.db_conn.pool, dish.id).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "message": "Dish deleted successfully" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to delete dish" })),
        ),
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", post(create_dish))
        .route("/:id", patch(update_dish_by_id).delete(delete_dish_by_id))
        .route("/restaurant/:restaurant_id", get(get_dishes_by_restaurant_id))
}
