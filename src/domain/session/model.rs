//! Session domain entity (spec.md §3, §4.1).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::Cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Started,
    LocationValidated,
    LocationRejected,
    ServiceSelected,
    PendingApproval,
    PaymentPending,
    PaymentCompleted,
    Abandoned,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::LocationValidated => "location_validated",
            Self::LocationRejected => "location_rejected",
            Self::ServiceSelected => "service_selected",
            Self::PendingApproval => "pending_approval",
            Self::PaymentPending => "payment_pending",
            Self::PaymentCompleted => "payment_completed",
            Self::Abandoned => "abandoned",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "started" => Self::Started,
            "location_validated" => Self::LocationValidated,
            "location_rejected" => Self::LocationRejected,
            "service_selected" => Self::ServiceSelected,
            "pending_approval" => Self::PendingApproval,
            "payment_pending" => Self::PaymentPending,
            "payment_completed" => Self::PaymentCompleted,
            "abandoned" => Self::Abandoned,
            _ => return None,
        })
    }

    /// True if this status is non-terminal and therefore eligible for the
    /// `timeout -> Abandoned` edge (spec.md §4.1).
    pub fn is_non_terminal(&self) -> bool {
        !matches!(self, Self::PaymentCompleted | Self::Abandoned)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    HomeLockout,
    CarLockout,
    Rekey,
    SmartLock,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HomeLockout => "home_lockout",
            Self::CarLockout => "car_lockout",
            Self::Rekey => "rekey",
            Self::SmartLock => "smart_lock",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "home_lockout" => Self::HomeLockout,
            "car_lockout" => Self::CarLockout,
            "rekey" => Self::Rekey,
            "smart_lock" => Self::SmartLock,
            _ => return None,
        })
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::HomeLockout => "Home Lockout",
            Self::CarLockout => "Car Lockout",
            Self::Rekey => "Lock Rekey",
            Self::SmartLock => "Smart Lock Install",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Standard,
    Emergency,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Emergency => "emergency",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "standard" => Self::Standard,
            "emergency" => Self::Emergency,
            _ => return None,
        })
    }

    pub fn is_emergency(&self) -> bool {
        matches!(self, Self::Emergency)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vehicle {
    pub make: String,
    pub model: String,
    pub year: String,
}

#[derive(Debug, Clone, Default)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Location {
    pub address: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_in_service_area: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceSelectionFields {
    pub service_type: Option<ServiceType>,
    pub urgency: Option<Urgency>,
    pub description: Option<String>,
    pub deposit_amount: Cents,
    pub vehicle: Option<Vehicle>,
}

#[derive(Debug, Clone, Default)]
pub struct Telemetry {
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub referrer: Option<String>,
    pub utm_params: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub status: SessionStatus,
    pub step_reached: i32,
    pub customer: Customer,
    pub location: Location,
    pub service: ServiceSelectionFields,
    pub payment_intent_id: Option<String>,
    pub telemetry: Telemetry,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(id: String, telemetry: Telemetry) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: SessionStatus::Started,
            step_reached: 1,
            customer: Customer::default(),
            location: Location::default(),
            service: ServiceSelectionFields::default(),
            payment_intent_id: None,
            telemetry,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }
}
