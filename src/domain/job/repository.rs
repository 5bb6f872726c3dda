//! Job repository port.

use async_trait::async_trait;

use super::model::{Job, JobStatus};
use crate::domain::error::DomainResult;

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn insert(&self, job: Job) -> DomainResult<Job>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Job>>;
    async fn find_all(&self) -> DomainResult<Vec<Job>>;

    /// Used by the payment webhook handler to locate the Job a
    /// `refund.created`/`payment_intent.*` event refers to, since the
    /// Payment Adapter itself never advances Job state (spec.md §4.8).
    async fn find_by_payment_intent_id(&self, payment_intent_id: &str) -> DomainResult<Option<Job>>;

    async fn save(&self, job: Job) -> DomainResult<()>;

    /// Atomically re-reads the job and transitions it, used inside the
    /// assignment critical section (spec.md §4.2 step 2-3) and for wave
    /// bookkeeping. Returns `Ok(None)` if the current status isn't in
    /// `from`.
    async fn compare_and_transition(
        &self,
        id: &str,
        from: &[JobStatus],
        mutate: Box<dyn FnOnce(&mut Job) + Send>,
    ) -> DomainResult<Option<Job>>;
}
