//! AuditEvent domain entity (spec.md §3, §4.9). Append-only.

use chrono::{DateTime, Utc};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorType {
    System,
    Admin,
    Provider,
}

impl ActorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Admin => "admin",
            Self::Provider => "provider",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "system" => Self::System,
            "admin" => Self::Admin,
            "provider" => Self::Provider,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub id: String,
    pub entity_type: String,
    pub entity_id: String,
    pub event_type: String,
    pub actor_type: ActorType,
    pub actor_email: Option<String>,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}
