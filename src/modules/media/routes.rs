use crate::{
    modules::auth::middleware::Auth,
    types::Context,
    utils::storage,
};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Router,
};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use serde_json::json;
use std::{io::Read, sync::Arc};
use tempfile::NamedTempFile;

#[derive(TryFromMultipart)]
struct UploadFilePayload {
    #[form_data(limit = "10MiB")]
    file: FieldData<NamedTempFile>,
}

/// Upload failures degrade to a JSON `null` body; the object store being
/// down must not fail the enclosing flow.
async fn upload_file(
    State(ctx): State<Arc<Context>>,
    _: Auth,
    TypedMultipart(mut payload): TypedMultipart<UploadFilePayload>,
) -> impl IntoResponse {
    let mut buf: Vec<u8> = vec![];

    if let Err(err) = payload.file.contents.read_to_end(&mut buf) {
        tracing::error!("Failed to read the uploaded file: {:?}", err);
        return (StatusCode::OK, Json(json!(null)));
    }

    match storage::upload_file(ctx.storage.clone(), buf).await {
        Ok(url) => (StatusCode::OK, Json(json!({ "url": url }))),
        Err(_) => (StatusCode::OK, Json(json!(null))),
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new().route("/", post(upload_file))
}
