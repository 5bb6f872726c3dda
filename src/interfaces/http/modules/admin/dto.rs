//! DTOs for the admin console routes (spec.md §6 "HTTP surface (admin)").
//! Admin access is trusted at the network edge (spec.md §1 Non-goals) — the
//! only identity captured here is an optional `actor_email` for audit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::job::model::Job;
use crate::domain::message::model::Message;
use crate::domain::provider::model::{Capabilities, Provider};
use crate::domain::session::model::{ServiceType, Session, SessionStatus, Urgency};

#[derive(Debug, Serialize)]
pub struct ProviderDto {
    pub id: String,
    pub display_name: String,
    pub phone: String,
    pub home_city: String,
    pub home_lockout: bool,
    pub car_lockout: bool,
    pub rekey: bool,
    pub smart_lock: bool,
    pub is_active: bool,
    pub is_available: bool,
    pub notes: Option<String>,
    pub onboarded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProviderDto {
    pub fn from_domain(p: &Provider) -> Self {
        Self {
            id: p.id.clone(),
            display_name: p.display_name.clone(),
            phone: p.phone.clone(),
            home_city: p.home_city.clone(),
            home_lockout: p.capabilities.home_lockout,
            car_lockout: p.capabilities.car_lockout,
            rekey: p.capabilities.rekey,
            smart_lock: p.capabilities.smart_lock,
            is_active: p.is_active,
            is_available: p.is_available,
            notes: p.notes.clone(),
            onboarded_at: p.onboarded_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProviderRequest {
    #[validate(length(min = 1, message = "display_name is required"))]
    pub display_name: String,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "home_city is required"))]
    pub home_city: String,
    #[serde(default)]
    pub home_lockout: bool,
    #[serde(default)]
    pub car_lockout: bool,
    #[serde(default)]
    pub rekey: bool,
    #[serde(default)]
    pub smart_lock: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProviderRequest {
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub home_city: Option<String>,
    pub home_lockout: Option<bool>,
    pub car_lockout: Option<bool>,
    pub rekey: Option<bool>,
    pub smart_lock: Option<bool>,
    pub is_active: Option<bool>,
    pub is_available: Option<bool>,
    pub notes: Option<String>,
}

impl UpdateProviderRequest {
    /// Applies the partial update, then restores invariant 1 from spec.md
    /// §3: `¬is_active ⇒ ¬is_available`.
    pub fn apply_to(self, provider: &mut Provider) {
        if let Some(name) = self.display_name {
            provider.display_name = name;
        }
        if let Some(phone) = self.phone {
            provider.phone = crate::shared::Phone::normalize(&phone).0;
        }
        if let Some(city) = self.home_city {
            provider.home_city = city;
        }
        let mut caps = provider.capabilities.clone();
        if let Some(v) = self.home_lockout {
            caps.home_lockout = v;
        }
        if let Some(v) = self.car_lockout {
            caps.car_lockout = v;
        }
        if let Some(v) = self.rekey {
            caps.rekey = v;
        }
        if let Some(v) = self.smart_lock {
            caps.smart_lock = v;
        }
        provider.capabilities = caps;
        if let Some(v) = self.is_active {
            provider.is_active = v;
        }
        if let Some(v) = self.is_available {
            provider.is_available = v;
        }
        if let Some(notes) = self.notes {
            provider.notes = Some(notes);
        }
        if !provider.is_active {
            provider.is_available = false;
        }
        provider.updated_at = Utc::now();
    }
}

impl From<&CreateProviderRequest> for Capabilities {
    fn from(r: &CreateProviderRequest) -> Self {
        Capabilities {
            home_lockout: r.home_lockout,
            car_lockout: r.car_lockout,
            rekey: r.rekey,
            smart_lock: r.smart_lock,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobDto {
    pub id: String,
    pub session_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub service_type: ServiceType,
    pub urgency: Urgency,
    pub description: Option<String>,
    pub deposit_amount_cents: i64,
    pub deposit_amount_display: String,
    pub payment_status: &'static str,
    pub refund_amount_cents: Option<i64>,
    pub refund_id: Option<String>,
    pub assigned_provider_id: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub status: &'static str,
    pub current_wave: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobDto {
    pub fn from_domain(j: &Job) -> Self {
        Self {
            id: j.id.clone(),
            session_id: j.session_id.clone(),
            customer_name: j.customer_name.clone(),
            customer_phone: j.customer_phone.clone(),
            address: j.address.clone(),
            city: j.city.clone(),
            service_type: j.service_type,
            urgency: j.urgency,
            description: j.description.clone(),
            deposit_amount_cents: j.deposit_amount.0,
            deposit_amount_display: j.deposit_amount.to_string(),
            payment_status: j.payment_status.as_str(),
            refund_amount_cents: j.refund_amount.map(|c| c.0),
            refund_id: j.refund_id.clone(),
            assigned_provider_id: j.assigned_provider_id.clone(),
            assigned_at: j.assigned_at,
            status: j.status.as_str(),
            current_wave: j.current_wave,
            created_at: j.created_at,
            updated_at: j.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AssignJobRequest {
    #[validate(length(min = 1, message = "provider_id is required"))]
    pub provider_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CancelJobRequest {
    #[validate(length(min = 1, message = "reason is required"))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefundJobRequest {
    pub amount_cents: Option<i64>,
    #[validate(length(min = 1, message = "reason is required"))]
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct SessionSummaryDto {
    pub id: String,
    pub status: &'static str,
    pub step_reached: i32,
    pub customer_name: String,
    pub customer_phone: String,
    pub city: Option<String>,
    pub service_type: Option<ServiceType>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SessionSummaryDto {
    pub fn from_domain(s: &Session) -> Self {
        Self {
            id: s.id.clone(),
            status: s.status.as_str(),
            step_reached: s.step_reached,
            customer_name: s.customer.name.clone(),
            customer_phone: s.customer.phone.clone(),
            city: s.location.city.clone(),
            service_type: s.service.service_type,
            created_at: s.created_at,
            updated_at: s.updated_at,
            completed_at: s.completed_at,
        }
    }
}

/// Funnel analytics (spec.md §6 "list sessions and funnel stats"): a count
/// of sessions at each `step_reached`/status bucket, computed in-process
/// rather than via a dedicated SQL aggregate, since the admin console's
/// session volume is small enough that a full scan is cheap.
#[derive(Debug, Serialize, Default)]
pub struct FunnelStatsDto {
    pub total: usize,
    pub started: usize,
    pub location_validated: usize,
    pub location_rejected: usize,
    pub service_selected: usize,
    pub pending_approval: usize,
    pub payment_pending: usize,
    pub payment_completed: usize,
    pub abandoned: usize,
}

impl FunnelStatsDto {
    pub fn from_sessions(sessions: &[Session]) -> Self {
        let mut stats = FunnelStatsDto {
            total: sessions.len(),
            ..Default::default()
        };
        for s in sessions {
            match s.status {
                SessionStatus::Started => stats.started += 1,
                SessionStatus::LocationValidated => stats.location_validated += 1,
                SessionStatus::LocationRejected => stats.location_rejected += 1,
                SessionStatus::ServiceSelected => stats.service_selected += 1,
                SessionStatus::PendingApproval => stats.pending_approval += 1,
                SessionStatus::PaymentPending => stats.payment_pending += 1,
                SessionStatus::PaymentCompleted => stats.payment_completed += 1,
                SessionStatus::Abandoned => stats.abandoned += 1,
            }
        }
        stats
    }
}

#[derive(Debug, Serialize)]
pub struct SessionListResponseDto {
    pub sessions: Vec<SessionSummaryDto>,
    pub funnel: FunnelStatsDto,
}

#[derive(Debug, Serialize)]
pub struct MessageDto {
    pub id: String,
    pub direction: &'static str,
    pub to_phone: String,
    pub from_phone: String,
    pub body: String,
    pub provider_message_id: Option<String>,
    pub delivery_status: String,
    pub job_id: Option<String>,
    pub provider_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MessageDto {
    pub fn from_domain(m: &Message) -> Self {
        Self {
            id: m.id.clone(),
            direction: m.direction.as_str(),
            to_phone: m.to_phone.clone(),
            from_phone: m.from_phone.clone(),
            body: m.body.clone(),
            provider_message_id: m.provider_message_id.clone(),
            delivery_status: m.delivery_status.clone(),
            job_id: m.job_id.clone(),
            provider_id: m.provider_id.clone(),
            created_at: m.created_at,
        }
    }
}
