//! Lock Service port (C2, spec.md §4.7) — short-TTL named mutual exclusion
//! used exclusively by the Quote Dispatcher's assignment protocol.

use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait LockService: Send + Sync {
    /// Returns a holder token iff no other holder currently exists for
    /// `key`. Strictly advisory and bounded by `ttl`.
    async fn try_acquire(&self, key: &str, ttl: Duration) -> Option<String>;

    /// Releases the lock iff `token` matches the current holder's token.
    async fn release(&self, key: &str, token: &str);
}
