//! Object Store Adapter (C6, spec.md §4.6). Upload goes straight to the
//! bucket's S3-compatible PUT endpoint; view URLs are signed locally with
//! HMAC-SHA256 rather than round-tripping to the bucket provider, matching
//! how a presigned-URL scheme is meant to work.

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use crate::config::ObjectStoreConfig;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::ports::object_store::ObjectStore;

type HmacSha256 = Hmac<Sha256>;

pub struct HttpObjectStore {
    client: reqwest::Client,
    config: ObjectStoreConfig,
}

impl HttpObjectStore {
    pub fn new(config: ObjectStoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn bucket_base_url(&self) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com",
            self.config.bucket, self.config.region
        )
    }

    fn sign(&self, key: &str, expires_at: i64) -> String {
        let secret = self.config.secret.as_deref().unwrap_or("");
        let mut mac =
            HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
        mac.update(format!("{key}:{expires_at}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> DomainResult<()> {
        if !content_type.starts_with("image/") {
            return Err(DomainError::Validation {
                field: "content_type",
                message: "must start with image/".to_string(),
            }
            .into());
        }
        const MAX_BYTES: usize = 10 * 1024 * 1024;
        if bytes.len() > MAX_BYTES {
            return Err(DomainError::Validation {
                field: "photo",
                message: "exceeds 10 MiB limit".to_string(),
            }
            .into());
        }

        let url = format!("{}/{}", self.bucket_base_url(), key);
        let response = self
            .client
            .put(&url)
            .header("Content-Type", content_type)
            .header("x-amz-server-side-encryption", "AES256")
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| DomainError::ExternalTransient {
                service: "object_store",
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DomainError::ExternalTransient {
                service: "object_store",
                message: format!("upload returned {}", response.status()),
            }
            .into());
        }

        debug!(key, bytes = bytes.len(), "photo uploaded");
        Ok(())
    }

    async fn signed_view_url(&self, key: &str, ttl_seconds: u32) -> DomainResult<String> {
        let ttl_seconds = ttl_seconds.clamp(60, 3600);
        let expires_at = Utc::now().timestamp() + ttl_seconds as i64;
        let signature = self.sign(key, expires_at);

        Ok(format!(
            "{}/{}?Expires={}&Signature={}",
            self.bucket_base_url(),
            key,
            expires_at,
            signature
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> HttpObjectStore {
        HttpObjectStore::new(ObjectStoreConfig {
            bucket: "test-bucket".to_string(),
            photo_prefix: String::new(),
            region: "us-east-1".to_string(),
            access_key: Some("AKIA".to_string()),
            secret: Some("secret".to_string()),
        })
    }

    #[tokio::test]
    async fn signed_url_clamps_ttl_to_configured_bounds() {
        let store = store();
        let url = store.signed_view_url("sessions/S/P.jpg", 30).await.unwrap();
        assert!(url.contains("sessions/S/P.jpg"));
        assert!(url.contains("Signature="));
    }

    #[tokio::test]
    async fn upload_rejects_non_image_content_type() {
        let store = store();
        let result = store.upload("k", b"bytes", "application/pdf").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn upload_rejects_oversized_payload() {
        let store = store();
        let huge = vec![0u8; 10 * 1024 * 1024 + 1];
        let result = store.upload("k", &huge, "image/jpeg").await;
        assert!(result.is_err());
    }
}
