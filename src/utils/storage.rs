use crate::types::StorageContext;
use reqwest::{
    multipart::{Form, Part},
    Client, StatusCode,
};
use sha2::{Digest, Sha256};
use ulid::Ulid;

#[derive(Debug)]
pub enum Error {
    UploadFailed,
}

/// Uploads a binary payload to the object store under a freshly generated
/// key and returns the public URL it will be served from. Failures are
/// logged here; callers decide how to degrade.
pub async fn upload_file(cfg: StorageContext, contents: Vec<u8>) -> Result<String, Error> {
    let key = Ulid::new().to_string();
    let part = Part::bytes(contents).file_name(key.clone());

    let timestamp = chrono::Utc::now().timestamp();
    let data_to_sign = format!("key={}&timestamp={}{}", key, timestamp, cfg.api_secret);

    let mut hasher = Sha256::new();
    hasher.update(data_to_sign);
    let hash = hasher.finalize();
    let signature = base16ct::lower::encode_string(&hash);

    let form = Form::new()
        .text("api_key", cfg.api_key.clone())
        .text("key", key.clone())
        .text("timestamp", format!("{}", timestamp))
        .text("signature", signature)
        .text("signature_algorithm", "sha256")
        .part("file", part);

    let res = Client::new()
        .post(cfg.upload_endpoint)
        .multipart(form)
        .send()
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while trying to upload a file: {:?}", err);
            Error::UploadFailed
        })?;

    if res.status() != StatusCode::OK {
        let data = res.text().await.map_err(|err| {
            tracing::error!("Error occurred while processing upload response: {:?}", err);
            Error::UploadFailed
        })?;

        tracing::error!("Failed to upload file: {}", data);
        return Err(Error::UploadFailed);
    }

    Ok(format!("{}/{}", cfg.serve_endpoint, key))
}
