use super::{repository, service};
use crate::{
    modules::user::{self, repository::Role},
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
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

#[derive(Deserialize, Validate)]
struct SignUpPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub role: Role,
}

async fn sign_up(
    State(ctx): State<Arc<Context>>,
    Json(payload): Json<SignUpPayload>,
) -> impl IntoResponse {
    if let Err(errors) = payload.validate() {
        return utils::validation::into_response(errors);
    }

    let password = match service::hash_password(&payload.password) {
        Ok(password) => password,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to create account" })),
            )
        }
    };

    let user = match user::repository::create(
        &ctx.db_conn.pool,
        user::repository::CreateUserPayload {
            email: payload.email,
            password,
            role: payload.role,
        },
    )
    .await
    {
        Ok(user) => user,
        Err(user::repository::Error::DuplicateEmail) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "error": "There is a user with that email already" })),
            )
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to create account" })),
            )
        }
    };

    service::send_verification_email(ctx.clone(), user).await;

    (
        StatusCode::CREATED,
        Json(json!({ "message": "Account created!" })),
    )
}

#[derive(Deserialize, Validate)]
struct SignInPayload {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

async fn sign_in(
    State(ctx): State<Arc<Context>>,
    Json(payload): Json<SignInPayload>,
) -> impl IntoResponse {
    if let Err(errors) = payload.validate() {
        return utils::validation::into_response(errors);
    }

    // One message for both a missing user and a wrong password.
    let rejection = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Wrong email or password" })),
        )
    };

    let user = match user::repository::find_by_email(&ctx.db_conn.pool, payload.email).await {
        Ok(Some(user)) => user,
        Ok(None) => return rejection(),
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to sign in" })),
            )
        }
    };

    if !service::verify_password(&payload.password, &user.password) {
        return rejection();
    }

    match service::create_session(ctx.clone(), user.id).await {
        Ok(session) => (
            StatusCode::OK,
            Json(json!({ "access_token": session.id })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to sign in" })),
        ),
    }
}

#[derive(Deserialize)]
struct VerifyPayload {
    pub code: String,
}

async fn verify_email(
    State(ctx): State<Arc<Context>>,
    Json(payload): Json<VerifyPayload>,
) -> impl IntoResponse {
    let verification =
        match repository::find_verification_by_code(&ctx.db_conn.pool, payload.code).await {
            Ok(Some(verification)) => verification,
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": "Verification not found" })),
                )
            }
            Err(_) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to verify email" })),
                )
            }
        };

    if let Err(_) = user::repository::update_by_id(
        &ctx.db_conn.pool,
        verification.user_id,
        user::repository::UpdateUserPayload {
            is_verified: Some(true),
            ..Default::default()
        },
    )
    .await
    {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to verify email" })),
        );
    }

    let _ = repository::delete_verification_by_id(&ctx.db_conn.pool, verification.id).await;

    (
        StatusCode::OK,
        Json(json!({ "message": "Email verified!" })),
    )
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/sign-up", post(sign_up))
        .route("/sign-in", post(sign_in))
        .route("/verify", post(verify_email))
}
