//! Provider domain entity (spec.md §3).

use chrono::{DateTime, Utc};

use crate::domain::session::model::ServiceType;

#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    pub home_lockout: bool,
    pub car_lockout: bool,
    pub rekey: bool,
    pub smart_lock: bool,
}

impl Capabilities {
    pub fn supports(&self, service_type: ServiceType) -> bool {
        match service_type {
            ServiceType::HomeLockout => self.home_lockout,
            ServiceType::CarLockout => self.car_lockout,
            ServiceType::Rekey => self.rekey,
            ServiceType::SmartLock => self.smart_lock,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Provider {
    pub id: String,
    pub display_name: String,
    pub phone: String,
    pub home_city: String,
    pub capabilities: Capabilities,
    pub is_active: bool,
    pub is_available: bool,
    pub notes: Option<String>,
    pub onboarded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Provider {
    /// Invariant: `¬is_active ⇒ ¬is_available`.
    pub fn check_activity_invariant(&self) -> bool {
        self.is_active || !self.is_available
    }

    pub fn is_eligible_for(&self, city: &str, service_type: ServiceType) -> bool {
        self.is_active
            && self.is_available
            && self.home_city.eq_ignore_ascii_case(city)
            && self.capabilities.supports(service_type)
    }
}
