//! Offer domain entity (spec.md §3, §4.2).

use chrono::{DateTime, Utc};

use crate::shared::Cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
    Canceled,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Expired => "expired",
            Self::Canceled => "canceled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "pending" => Self::Pending,
            "accepted" => Self::Accepted,
            "declined" => Self::Declined,
            "expired" => Self::Expired,
            "canceled" => Self::Canceled,
            _ => return None,
        })
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Which parent an offer solicits for: a session-scoped quote (Mode A) or a
/// job-scoped assignment (Mode B). Exactly one is ever set (invariant 2).
#[derive(Debug, Clone)]
pub enum OfferScope {
    Session(String),
    Job(String),
}

impl OfferScope {
    pub fn session_id(&self) -> Option<&str> {
        match self {
            Self::Session(id) => Some(id),
            Self::Job(_) => None,
        }
    }

    pub fn job_id(&self) -> Option<&str> {
        match self {
            Self::Job(id) => Some(id),
            Self::Session(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Offer {
    pub id: String,
    pub scope: OfferScope,
    pub provider_id: String,
    pub wave_number: i32,
    pub status: OfferStatus,
    pub quoted_price: Option<Cents>,
    pub provider_message_id: Option<String>,
    pub sent_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Offer {
    pub fn new_session_offer(id: String, session_id: String, provider_id: String) -> Self {
        Self {
            id,
            scope: OfferScope::Session(session_id),
            provider_id,
            wave_number: 1,
            status: OfferStatus::Pending,
            quoted_price: None,
            provider_message_id: None,
            sent_at: Utc::now(),
            responded_at: None,
            expires_at: None,
        }
    }

    pub fn new_job_offer(
        id: String,
        job_id: String,
        provider_id: String,
        wave_number: i32,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            scope: OfferScope::Job(job_id),
            provider_id,
            wave_number,
            status: OfferStatus::Pending,
            quoted_price: None,
            provider_message_id: None,
            sent_at: Utc::now(),
            responded_at: None,
            expires_at: Some(expires_at),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == OfferStatus::Pending
            && self.expires_at.map(|exp| exp < now).unwrap_or(false)
    }
}
