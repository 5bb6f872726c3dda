//! Message repository port. Append-only.

use async_trait::async_trait;

use super::model::Message;
use crate::domain::error::DomainResult;

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn insert(&self, message: Message) -> DomainResult<Message>;
    async fn find_all(&self) -> DomainResult<Vec<Message>>;

    /// Used to deduplicate at-least-once webhook delivery (spec.md §5,
    /// §9 "re-entrancy of webhooks").
    async fn find_by_provider_message_id(
        &self,
        provider_message_id: &str,
    ) -> DomainResult<Option<Message>>;
}
