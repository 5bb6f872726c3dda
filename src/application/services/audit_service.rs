//! Audit Log (C10, spec.md §4.9). Append-only and write-only from every
//! other component's perspective — a failure to record an event never
//! fails the caller's own transition, mirroring the teacher's
//! `EventBus::publish` fire-and-forget posture.

use std::sync::Arc;

use serde_json::Value;
use tracing::error;
use uuid::Uuid;

use crate::domain::audit::{ActorType, AuditEvent, AuditRepository};

pub struct AuditService {
    repo: Arc<dyn AuditRepository>,
}

impl AuditService {
    pub fn new(repo: Arc<dyn AuditRepository>) -> Self {
        Self { repo }
    }

    pub async fn record(
        &self,
        entity_type: &str,
        entity_id: &str,
        event_type: &str,
        actor_type: ActorType,
        actor_email: Option<&str>,
        payload: Value,
    ) {
        let event = AuditEvent {
            id: Uuid::new_v4().to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            event_type: event_type.to_string(),
            actor_type,
            actor_email: actor_email.map(|s| s.to_string()),
            payload,
            created_at: chrono::Utc::now(),
        };

        if let Err(e) = self.repo.insert(event).await {
            error!(entity_type, entity_id, event_type, error = %e, "failed to write audit event");
        }
    }

    pub async fn record_system(&self, entity_type: &str, entity_id: &str, event_type: &str, payload: Value) {
        self.record(entity_type, entity_id, event_type, ActorType::System, None, payload)
            .await;
    }
}
