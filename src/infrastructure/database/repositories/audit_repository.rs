//! SeaORM implementation of AuditRepository (C10, spec.md §4.9).

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::domain::audit::{ActorType, AuditEvent, AuditRepository};
use crate::domain::error::DomainResult;
use crate::infrastructure::database::entities::audit_event;

pub struct SeaOrmAuditRepository {
    db: DatabaseConnection,
}

impl SeaOrmAuditRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: audit_event::Model) -> AuditEvent {
    AuditEvent {
        id: m.id,
        entity_type: m.entity_type,
        entity_id: m.entity_id,
        event_type: m.event_type,
        actor_type: ActorType::from_str(&m.actor_type).unwrap_or(ActorType::System),
        actor_email: m.actor_email,
        payload: serde_json::from_str(&m.payload).unwrap_or(serde_json::Value::Null),
        created_at: m.created_at,
    }
}

fn domain_to_active_model(e: &AuditEvent) -> audit_event::ActiveModel {
    audit_event::ActiveModel {
        id: Set(e.id.clone()),
        entity_type: Set(e.entity_type.clone()),
        entity_id: Set(e.entity_id.clone()),
        event_type: Set(e.event_type.clone()),
        actor_type: Set(e.actor_type.as_str().to_string()),
        actor_email: Set(e.actor_email.clone()),
        payload: Set(e.payload.to_string()),
        created_at: Set(e.created_at),
    }
}

#[async_trait]
impl AuditRepository for SeaOrmAuditRepository {
    async fn insert(&self, event: AuditEvent) -> DomainResult<()> {
        let model = domain_to_active_model(&event);
        model.insert(&self.db).await?;
        Ok(())
    }

    async fn find_by_entity(&self, entity_type: &str, entity_id: &str) -> DomainResult<Vec<AuditEvent>> {
        let models = audit_event::Entity::find()
            .filter(audit_event::Column::EntityType.eq(entity_type))
            .filter(audit_event::Column::EntityId.eq(entity_id))
            .order_by_asc(audit_event::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }
}
