use super::repository;
use crate::{
    modules::restaurant,
    types::Context,
    utils::pagination::Pagination,
};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;
use std::sync::Arc;

async fn get_categories(State(ctx): State<Arc<Context>>) -> impl IntoResponse {
    match repository::find_many(&ctx.db_conn.pool).await {
        Ok(categories) => (StatusCode::OK, Json(json!(categories))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch categories" })),
        ),
    }
}

async fn get_category_by_slug(
    Path(slug): Path<String>,
    State(ctx): State<Arc<Context>>,
    pagination: Pagination,
) -> impl IntoResponse {
    let category = match repository::find_by_slug(&ctx.db_conn.pool, slug).await {
        Ok(Some(category)) => category,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Category not found" })),
            )
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch category" })),
            )
        }
    };

    match restaurant::repository::find_many_by_category_id(
        &ctx.db_conn.pool,
        category.id.clone(),
        pagination,
    )
    .await
    {
        Ok(restaurants) => (
            StatusCode::OK,
            Json(json!({ "category": category, "restaurants": restaurants })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch category" })),
        ),
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", get(get_categories))
        .route("/:slug", get(get_category_by_slug))
}
