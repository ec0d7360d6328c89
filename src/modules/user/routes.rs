use super::repository;
use crate::{
    modules::auth::{middleware::Auth, service},
    types::Context,
    utils,
};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

async fn get_profile(auth: Auth) -> impl IntoResponse {
    (StatusCode::OK, Json(json!(auth.user)))
}

#[derive(Deserialize, Validate)]
struct UpdateProfilePayload {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
}

async fn update_profile(
    auth: Auth,
    State(ctx): State<Arc<Context>>,
    Json(payload): Json<UpdateProfilePayload>,
) -> impl IntoResponse {
    if let Err(errors) = payload.validate() {
        return utils::validation::into_response(errors);
    }

    // Only rehash when the password is actually being set.
    let password = match payload.password.as_deref() {
        Some(raw_password) => match service::hash_password(raw_password) {
            Ok(password) => Some(password),
            Err(_) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to update profile" })),
                )
            }
        },
        None => None,
    };

    let email_changed = payload
        .email
        .as_ref()
        .is_some_and(|email| *email != auth.user.email);

    if let Err(err) = repository::update_by_id(
        &ctx.db_conn.pool,
        auth.user.id.clone(),
        repository::UpdateUserPayload {
            email: payload.email,
            password,
            // A new address has to be verified again.
            is_verified: email_changed.then_some(false),
        },
    )
    .await
    {
        return match err {
            repository::Error::DuplicateEmail => (
                StatusCode::CONFLICT,
                Json(json!({ "error": "There is a user with that email already" })),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to update profile" })),
            ),
        };
    }

    if email_changed {
        match repository::find_by_id(&ctx.db_conn.pool, auth.user.id).await {
            Ok(Some(user)) => service::send_verification_email(ctx.clone(), user).await,
            _ => (),
        }
    }

    (
        StatusCode::OK,
        Json(json!({ "message": "Profile updated successfully" })),
    )
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new().route("/profile", get(get_profile).patch(update_profile))
}
