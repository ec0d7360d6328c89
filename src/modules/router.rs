use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

use super::{auth, category, dish, media, order, payment, restaurant, user};
use crate::types::Context;
use std::sync::Arc;

async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "message": "Welcome to NomNom Eats API" })),
    )
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", get(health_check))
        .nest("/auth", auth::get_router())
        .nest("/users", user::get_router())
        .nest("/categories", category::get_router())
        .nest("/restaurants", restaurant::get_router())
        .nest("/dishes", dish::get_router())
        .nest("/orders", order::get_router())
        .nest("/payments", payment::get_router())
        .nest("/media", media::get_router())
}
