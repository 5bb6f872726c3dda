//! AuditEvent repository port. Append-only, write-only from every
//! component's perspective (spec.md §3 Ownership).

use async_trait::async_trait;

use super::model::AuditEvent;
use crate::domain::error::DomainResult;

#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn insert(&self, event: AuditEvent) -> DomainResult<()>;
    async fn find_by_entity(&self, entity_type: &str, entity_id: &str) -> DomainResult<Vec<AuditEvent>>;
}
