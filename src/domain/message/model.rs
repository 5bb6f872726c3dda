//! Message domain entity (spec.md §3) — append-only SMS log.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageDirection {
    Outbound,
    Inbound,
}

impl MessageDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Outbound => "outbound",
            Self::Inbound => "inbound",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "outbound" => Self::Outbound,
            "inbound" => Self::Inbound,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub direction: MessageDirection,
    pub to_phone: String,
    pub from_phone: String,
    pub body: String,
    pub provider_message_id: Option<String>,
    pub delivery_status: String,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub job_id: Option<String>,
    pub provider_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new_outbound(
        id: String,
        to_phone: String,
        from_phone: String,
        body: String,
        provider_message_id: Option<String>,
    ) -> Self {
        Self {
            id,
            direction: MessageDirection::Outbound,
            to_phone,
            from_phone,
            body,
            provider_message_id,
            delivery_status: "queued".to_string(),
            error_code: None,
            error_message: None,
            job_id: None,
            provider_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn new_inbound(
        id: String,
        from_phone: String,
        to_phone: String,
        body: String,
        provider_message_id: String,
    ) -> Self {
        Self {
            id,
            direction: MessageDirection::Inbound,
            to_phone,
            from_phone,
            body,
            provider_message_id: Some(provider_message_id),
            delivery_status: "received".to_string(),
            error_code: None,
            error_message: None,
            job_id: None,
            provider_id: None,
            created_at: Utc::now(),
        }
    }
}
