//! Offer repository port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{Offer, OfferStatus};
use crate::domain::error::DomainResult;

#[async_trait]
pub trait OfferRepository: Send + Sync {
    async fn insert(&self, offer: Offer) -> DomainResult<Offer>;
    async fn insert_many(&self, offers: Vec<Offer>) -> DomainResult<Vec<Offer>>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Offer>>;
    async fn find_by_session(&self, session_id: &str) -> DomainResult<Vec<Offer>>;
    async fn find_by_job(&self, job_id: &str) -> DomainResult<Vec<Offer>>;

    /// Most recent (by `sent_at`) Pending offer for this provider, scoped to
    /// either sessions or jobs, used by the tie-break rule in spec.md §4.2.
    async fn find_latest_pending_for_provider(
        &self,
        provider_id: &str,
        session_scoped_only: Option<bool>,
    ) -> DomainResult<Option<Offer>>;

    /// Provider ids already contacted for a job, across all waves.
    async fn find_contacted_provider_ids(&self, job_id: &str) -> DomainResult<Vec<String>>;

    async fn save(&self, offer: Offer) -> DomainResult<()>;

    /// Cancels every still-Pending offer for `job_id` other than `keep_id`,
    /// in one statement, for the assignment protocol's step 4.
    async fn cancel_other_pending_for_job(&self, job_id: &str, keep_id: &str) -> DomainResult<()>;

    /// Cancels every still-Pending offer for `job_id` (dispatch restart/cancel).
    async fn cancel_all_pending_for_job(&self, job_id: &str) -> DomainResult<()>;

    async fn expire_pending_older_than(&self, now: DateTime<Utc>) -> DomainResult<Vec<Offer>>;

    async fn count_unresolved_in_wave(&self, job_id: &str, wave_number: i32) -> DomainResult<i64>;

    async fn find_by_provider_message_id(
        &self,
        provider_message_id: &str,
    ) -> DomainResult<Option<Offer>>;
}

pub fn is_resolved(status: OfferStatus) -> bool {
    status.is_terminal()
}
