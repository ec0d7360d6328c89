use super::repository;
use crate::{
    modules::{auth::middleware::OwnerAuth, category},
    types::Context,
    utils::{self, pagination::Pagination},
};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

#[derive(Deserialize, Validate)]
struct CreateRestaurantPayload {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(url)]
    pub cover_image: String,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(min = 1))]
    pub category_name: String,
}

async fn create_restaurant(
    State(ctx): State<Arc<Context>>,
    auth: OwnerAuth,
    Json(payload): Json<CreateRestaurantPayload>,
) -> impl IntoResponse {
    if let Err(errors) = payload.validate() {
        return utils::validation::into_response(errors);
    }

    let categ =
        match category::repository::get_or_create(&ctx.db_conn.pool, payload.category_name).await {
            Ok(categ) => categ,
            Err(_) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to create restaurant" })),
                )
            }
        };

    match repository::create(
        &ctx.db_conn.pool,
        repository::CreateRestaurantPayload {
            name: payload.name,
            cover_image: payload.cover_image,
            address: payload.address,
            category_id: categ.id,
            owner_id: auth.user.id,
        },
    )
    .await
    {
        Ok(restaurant) => (StatusCode::CREATED, Json(json!(restaurant))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to create restaurant" })),
        ),
    }
}

async fn get_restaurants(
    State(ctx): State<Arc<Context>>,
    Query(filters): Query<repository::FindManyFilters>,
    pagination: Pagination,
) -> impl IntoResponse {
    match repository::find_many(&ctx.db_conn.pool, pagination, filters).await {
        Ok(paginated_restaurants) => (StatusCode::OK, Json(json!(paginated_restaurants))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch restaurants" })),
        ),
    }
}

async fn get_restaurant_by_id(
    Path(id): Path<String>,
    State(ctx): State<Arc<Context>>,
) -> impl IntoResponse {
    match repository::find_by_id(&ctx.db_conn.pool, id).await {
        Ok(Some(restaurant)) => (StatusCode::OK, Json(json!(restaurant))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Restaurant not found" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch restaurant" })),
        ),
    }
}

#[derive(Deserialize, Validate)]
struct UpdateRestaurantPayload {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(url)]
    pub cover_image: Option<String>,
    #[validate(length(min = 1))]
    pub address: Option<String>,
    #[validate(length(min = 1))]
    pub category_name: Option<String>,
}

async fn update_restaurant_by_id(
    Path(id): Path<String>,
    State(ctx): State<Arc<Context>>,
    auth: OwnerAuth,
    Json(payload): Json<UpdateRestaurantPayload>,
) -> impl IntoResponse {
    if let Err(errors) = payload.validate() {
        return utils::validation::into_response(errors);
    }

    // Existence first, ownership second; a missing restaurant must never
    // reveal an ownership verdict.
    let restaurant = match repository::find_by_id(&ctx.db_conn.pool, id).await {
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
                Json(json!({ "error": "Failed to fetch restaurant" })),
            )
        }
    };

    if !repository::is_owner(&auth.user, &restaurant) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "You are not the owner of this restaurant" })),
        );
    }

    let category_id = match payload.category_name {
        Some(category_name) => {
            match category::repository::get_or_create(&ctx.db_conn.pool, category_name).await {
                Ok(categ) => Some(categ.id),
                Err(_) => {
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": "Failed to update restaurant" })),
                    )
                }
            }
        }
        None => None,
    };

    match repository::update_by_id(
        &ctx.db_conn.pool,
        restaurant.id,
        repository::UpdateRestaurantPayload {
            name: payload.name,
            cover_image: payload.cover_image,
            address: payload.address,
            category_id,
        },
    )
    .await
    {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "message": "Restaurant updated successfully" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to update restaurant" })),
        ),
    }
}

async fn delete_restaurant_by_id(
    Path(id): Path<String>,
    State(ctx): State<Arc<Context>>,
    auth: OwnerAuth,
) -> impl IntoResponse {
    let restaurant = match repository::find_by_id(&ctx.db_conn.pool, id).await {
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
                Json(json!({ "error": "Failed to fetch restaurant" })),
            )
        }
    };

    if !repository::is_owner(&auth.user, &restaurant) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "You are not the owner of this restaurant" })),
        );
    }

    match repository::delete_by_id(&ctx.db_conn.pool, restaurant.id).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "message": "Restaurant deleted successfully" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to delete restaurant" })),
        ),
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", post(create_restaurant).get(get_restaurants))
        .route(
            "/:id",
            get(get_restaurant_by_id)
                .patch(update_restaurant_by_id)
                .delete(delete_restaurant_by_id),
        )
}
