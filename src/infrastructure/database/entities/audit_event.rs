//! AuditEvent entity — append-only.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub entity_type: String,
    #[sea_orm(indexed)]
    pub entity_id: String,
    pub event_type: String,
    pub actor_type: String,
    #[sea_orm(nullable)]
    pub actor_email: Option<String>,
    pub payload: String,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
