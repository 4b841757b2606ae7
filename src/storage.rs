//! File storage: bucket uploads, deletion and public URLs.

use log::debug;
use serde::Serialize;

use crate::auth::ApiAuth;
use crate::error::{classify_backend_error, extract_error_message, Result, VizinhaLinkError};

/// Images above this size are rejected client-side
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// A successfully uploaded object.
#[derive(Debug, Clone)]
pub struct UploadedObject {
    /// Path of the object inside the bucket
    pub path: String,
    /// Public URL serving the object
    pub public_url: String,
}

#[derive(Serialize)]
struct DeletePrefixes<'a> {
    prefixes: [&'a str; 1],
}

/// Client for the backend storage subsystem (`/storage/v1/...`).
#[derive(Clone)]
pub struct StorageClient {
    base_url: String,
    http_client: reqwest::Client,
    auth: ApiAuth,
}

impl StorageClient {
    pub(crate) fn new(
        base_url: impl Into<String>,
        http_client: reqwest::Client,
        auth: ApiAuth,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            http_client,
            auth,
        }
    }

    /// Upload an image into `bucket` at `path` and return its public URL.
    ///
    /// Validates client-side that the payload is an image of at most 5 MiB,
    /// so obviously bad uploads never reach the network. A missing bucket is
    /// reported with a message naming the bucket, since the backend's own
    /// phrasing does not say which one was meant.
    pub async fn upload_image(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<UploadedObject> {
        if !content_type.starts_with("image/") {
            return Err(VizinhaLinkError::ValidationError(
                "file must be an image".to_string(),
            ));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(VizinhaLinkError::ValidationError(
                "image must be at most 5 MiB".to_string(),
            ));
        }

        debug!(
            "[STORAGE] upload bucket={} path={} bytes={}",
            bucket,
            path,
            bytes.len()
        );

        let request = self
            .http_client
            .post(format!(
                "{}/storage/v1/object/{}/{}",
                self.base_url, bucket, path
            ))
            .header("Content-Type", content_type)
            .header("Cache-Control", "max-age=3600")
            .body(bytes);

        let response = self.auth.apply_to_request(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_error_message(&body);
            let lowered = message.to_lowercase();
            if lowered.contains("bucket") && lowered.contains("not found") {
                return Err(VizinhaLinkError::QueryError(format!(
                    "bucket '{}' not found; create the storage buckets before uploading",
                    bucket
                )));
            }
            return Err(classify_backend_error(status.as_u16(), &message));
        }

        Ok(UploadedObject {
            path: path.to_string(),
            public_url: self.public_url(bucket, path),
        })
    }

    /// Remove one object from a bucket.
    pub async fn delete_object(&self, bucket: &str, path: &str) -> Result<()> {
        let request = self
            .http_client
            .delete(format!("{}/storage/v1/object/{}", self.base_url, bucket))
            .json(&DeletePrefixes { prefixes: [path] });

        let response = self.auth.apply_to_request(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_error_message(&body);
            return Err(classify_backend_error(status.as_u16(), &message));
        }
        Ok(())
    }

    /// Public URL of an object in a public bucket. Pure string
    /// construction; does not verify the object exists.
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_client() -> StorageClient {
        StorageClient::new(
            "http://localhost:9",
            reqwest::Client::new(),
            ApiAuth::new("anon-key"),
        )
    }

    #[test]
    fn test_public_url_shape() {
        let storage = offline_client();
        assert_eq!(
            storage.public_url("avatars", "users/u-1.png"),
            "http://localhost:9/storage/v1/object/public/avatars/users/u-1.png"
        );
    }

    #[tokio::test]
    async fn test_rejects_non_image_content_type() {
        let storage = offline_client();
        let result = storage
            .upload_image("avatars", "a.pdf", vec![1, 2, 3], "application/pdf")
            .await;
        assert!(matches!(
            result,
            Err(VizinhaLinkError::ValidationError(message)) if message.contains("image")
        ));
    }

    #[tokio::test]
    async fn test_rejects_oversized_image() {
        let storage = offline_client();
        let result = storage
            .upload_image(
                "avatars",
                "big.png",
                vec![0u8; MAX_IMAGE_BYTES + 1],
                "image/png",
            )
            .await;
        assert!(matches!(
            result,
            Err(VizinhaLinkError::ValidationError(message)) if message.contains("5 MiB")
        ));
    }
}
