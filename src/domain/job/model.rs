//! Job domain entity (spec.md §3, §4.4).

use chrono::{DateTime, Utc};

use crate::domain::session::model::{ServiceType, Urgency, Vehicle};
use crate::shared::Cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Created,
    Dispatching,
    Offered,
    Assigned,
    EnRoute,
    Completed,
    Canceled,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Dispatching => "dispatching",
            Self::Offered => "offered",
            Self::Assigned => "assigned",
            Self::EnRoute => "en_route",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "created" => Self::Created,
            "dispatching" => Self::Dispatching,
            "offered" => Self::Offered,
            "assigned" => Self::Assigned,
            "en_route" => Self::EnRoute,
            "completed" => Self::Completed,
            "canceled" => Self::Canceled,
            "failed" => Self::Failed,
            _ => return None,
        })
    }

    /// Statuses in which the dispatcher is still actively seeking a provider.
    pub fn is_dispatchable(&self) -> bool {
        matches!(self, Self::Dispatching | Self::Offered)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Succeeded,
    Refunded,
    PartiallyRefunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Refunded => "refunded",
            Self::PartiallyRefunded => "partially_refunded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "succeeded" => Self::Succeeded,
            "refunded" => Self::Refunded,
            "partially_refunded" => Self::PartiallyRefunded,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub session_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub service_type: ServiceType,
    pub urgency: Urgency,
    pub description: Option<String>,
    pub vehicle: Option<Vehicle>,
    pub deposit_amount: Cents,
    pub payment_intent_id: String,
    pub payment_status: PaymentStatus,
    pub refund_amount: Option<Cents>,
    pub refund_id: Option<String>,
    pub assigned_provider_id: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub status: JobStatus,
    pub current_wave: i32,
    pub dispatch_started_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Invariant: `status ∈ {Assigned, EnRoute, Completed} ⇒ assigned_provider_id is set`.
    pub fn check_assignment_invariant(&self) -> bool {
        let must_be_assigned = matches!(
            self.status,
            JobStatus::Assigned | JobStatus::EnRoute | JobStatus::Completed
        );
        !must_be_assigned || self.assigned_provider_id.is_some()
    }
}
