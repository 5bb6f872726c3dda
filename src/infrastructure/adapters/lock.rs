//! In-process Lock Service (C2, spec.md §4.7).
//!
//! Backed by a `DashMap` rather than Redis — single-node correctness is
//! sufficient for the MVP target load (spec.md §4.7), mirroring the
//! teacher's `SessionRegistry` DashMap-of-state shape.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::ports::LockService;

struct Holder {
    token: String,
    expires_at: Instant,
}

pub struct InProcessLockService {
    holders: DashMap<String, Holder>,
}

impl InProcessLockService {
    pub fn new() -> Self {
        Self {
            holders: DashMap::new(),
        }
    }
}

impl Default for InProcessLockService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LockService for InProcessLockService {
    async fn try_acquire(&self, key: &str, ttl: Duration) -> Option<String> {
        use dashmap::mapref::entry::Entry;

        let now = Instant::now();
        let token = Uuid::new_v4().to_string();

        match self.holders.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().expires_at > now {
                    return None;
                }
                occupied.insert(Holder {
                    token: token.clone(),
                    expires_at: now + ttl,
                });
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Holder {
                    token: token.clone(),
                    expires_at: now + ttl,
                });
            }
        }
        Some(token)
    }

    async fn release(&self, key: &str, token: &str) {
        if let Some(existing) = self.holders.get(key) {
            if existing.token != token {
                return;
            }
        } else {
            return;
        }
        self.holders.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_acquire_fails_while_first_holds() {
        let lock = InProcessLockService::new();
        let t1 = lock.try_acquire("job_assignment:1", Duration::from_secs(30)).await;
        assert!(t1.is_some());
        let t2 = lock.try_acquire("job_assignment:1", Duration::from_secs(30)).await;
        assert!(t2.is_none());
    }

    #[tokio::test]
    async fn release_frees_the_key_for_reacquisition() {
        let lock = InProcessLockService::new();
        let token = lock
            .try_acquire("job_assignment:1", Duration::from_secs(30))
            .await
            .unwrap();
        lock.release("job_assignment:1", &token).await;
        let t2 = lock.try_acquire("job_assignment:1", Duration::from_secs(30)).await;
        assert!(t2.is_some());
    }

    #[tokio::test]
    async fn release_with_wrong_token_is_a_no_op() {
        let lock = InProcessLockService::new();
        let _token = lock
            .try_acquire("job_assignment:1", Duration::from_secs(30))
            .await
            .unwrap();
        lock.release("job_assignment:1", "not-the-real-token").await;
        let t2 = lock.try_acquire("job_assignment:1", Duration::from_secs(30)).await;
        assert!(t2.is_none());
    }

    #[tokio::test]
    async fn expired_holder_allows_reacquisition() {
        let lock = InProcessLockService::new();
        let _token = lock
            .try_acquire("job_assignment:1", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        let t2 = lock.try_acquire("job_assignment:1", Duration::from_secs(30)).await;
        assert!(t2.is_some());
    }
}
