//! Object Store Adapter port (C6, spec.md §4.6).

use async_trait::async_trait;

use crate::domain::error::DomainResult;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Uploads photo bytes under the given (pre-derived) key. `content_type`
    /// must start with `image/` and `bytes.len()` must not exceed 10 MiB —
    /// both are enforced by the caller before this is invoked.
    async fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> DomainResult<()>;

    /// Returns a time-limited signed URL for viewing the object at `key`,
    /// valid for `ttl_seconds` (clamped to [60, 3600] by the caller).
    async fn signed_view_url(&self, key: &str, ttl_seconds: u32) -> DomainResult<String>;
}
