//! Session repository port.

use async_trait::async_trait;

use super::model::{Session, SessionStatus};
use crate::domain::error::DomainResult;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert(&self, session: Session) -> DomainResult<Session>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Session>>;
    async fn find_all(&self) -> DomainResult<Vec<Session>>;
    async fn find_latest_by_customer_phone(&self, phone: &str) -> DomainResult<Option<Session>>;

    /// Used by the payment webhook handler to resolve which session a
    /// `payment_intent.*` event belongs to when it arrives asynchronously,
    /// ahead of (or instead of) the customer's own `/complete` call.
    async fn find_by_payment_intent_id(&self, payment_intent_id: &str) -> DomainResult<Option<Session>>;

    /// Persists the full session row. Implementations that back onto a SQL
    /// store should additionally support `compare_and_transition` for the
    /// per-session serialization spec.md §5 requires; `save` alone is used
    /// by operations that don't change `status` (e.g. attaching telemetry).
    async fn save(&self, session: Session) -> DomainResult<()>;

    /// Atomically transitions `id` from `from` to `to`, applying `mutate` to
    /// the in-memory copy before persisting. Returns `Ok(None)` if the
    /// session wasn't in status `from` at the time of the call (a losing
    /// concurrent transition), so the caller can surface
    /// `DomainError::PreconditionFailed`.
    async fn compare_and_transition(
        &self,
        id: &str,
        from: &[SessionStatus],
        to: SessionStatus,
        mutate: Box<dyn FnOnce(&mut Session) + Send>,
    ) -> DomainResult<Option<Session>>;
}
