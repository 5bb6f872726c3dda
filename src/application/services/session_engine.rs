//! Session Engine (C7, spec.md §4.1) — the funnel state machine:
//! `Started -> LocationValidated|LocationRejected -> PendingApproval|ServiceSelected
//! -> PaymentPending -> PaymentCompleted`.

use std::sync::Arc;

use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::application::services::job_factory::JobFactory;
use crate::application::services::quote_dispatcher::QuoteDispatcher;
use crate::config::AppConfig;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::job::Job;
use crate::domain::ports::geocoder::Geocoder;
use crate::domain::ports::payment::PaymentGateway;
use crate::domain::session::model::{ServiceType, Urgency, Vehicle};
use crate::domain::session::{Session, SessionRepository, SessionStatus, Telemetry};
use crate::shared::Cents;

use super::audit_service::AuditService;

#[derive(Debug, Clone, Default)]
pub struct RequestMetadata {
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub referrer: Option<String>,
    pub utm_params: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub enum LocationInput {
    Address(String),
    Pin { latitude: f64, longitude: f64 },
}

#[derive(Debug, Clone)]
pub struct VehicleInput {
    pub make: String,
    pub model: String,
    pub year: String,
}

pub struct SessionEngine {
    sessions: Arc<dyn SessionRepository>,
    geocoder: Arc<dyn Geocoder>,
    payment: Arc<dyn PaymentGateway>,
    audit: Arc<AuditService>,
    job_factory: Arc<JobFactory>,
    dispatcher: Arc<QuoteDispatcher>,
    config: AppConfig,
}

impl SessionEngine {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        geocoder: Arc<dyn Geocoder>,
        payment: Arc<dyn PaymentGateway>,
        audit: Arc<AuditService>,
        job_factory: Arc<JobFactory>,
        dispatcher: Arc<QuoteDispatcher>,
        config: AppConfig,
    ) -> Self {
        Self {
            sessions,
            geocoder,
            payment,
            audit,
            job_factory,
            dispatcher,
            config,
        }
    }

    pub async fn create_session(&self, metadata: RequestMetadata) -> DomainResult<Session> {
        let id = Uuid::new_v4().to_string();
        let session = Session::new(
            id,
            Telemetry {
                user_agent: metadata.user_agent,
                ip: metadata.ip,
                referrer: metadata.referrer,
                utm_params: metadata.utm_params,
            },
        );
        let session = self.sessions.insert(session).await?;

        self.audit
            .record_system("session", &session.id, "session_created", json!({}))
            .await;

        Ok(session)
    }

    fn is_in_service_area(&self, city: &str) -> bool {
        let city = city.trim().to_ascii_lowercase();
        self.config
            .service_areas
            .iter()
            .any(|area| area.trim().to_ascii_lowercase() == city)
    }

    pub async fn validate_location(
        &self,
        session_id: &str,
        customer: CustomerInfo,
        location_input: LocationInput,
    ) -> DomainResult<Session> {
        let current = self
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "session",
                field: "id",
                value: session_id.to_string(),
            })?;

        if !matches!(current.status, SessionStatus::Started | SessionStatus::LocationRejected) {
            return Err(DomainError::PreconditionFailed {
                entity: "session",
                status: current.status.as_str().to_string(),
                expected: "started or location_rejected",
            }
            .into());
        }

        if let LocationInput::Address(ref addr) = location_input {
            if addr.trim().len() < 10 {
                return Err(DomainError::Validation {
                    field: "address",
                    message: "must be at least 10 characters".to_string(),
                }
                .into());
            }
        }

        let geocoded = match &location_input {
            LocationInput::Address(addr) => self.geocoder.forward(addr).await.map(|r| (r.address, r.city, r.latitude, r.longitude)),
            LocationInput::Pin { latitude, longitude } => self
                .geocoder
                .reverse(*latitude, *longitude)
                .await
                .map(|r| (r.address, r.city, *latitude, *longitude)),
        };

        let (address, city, latitude, longitude, in_area) = match geocoded {
            Some((address, city, lat, lng)) => {
                let in_area = self.is_in_service_area(&city);
                (Some(address), Some(city), Some(lat), Some(lng), in_area)
            }
            None if self.config.app_env.is_development() => {
                let fallback_address = match &location_input {
                    LocationInput::Address(a) => Some(a.clone()),
                    LocationInput::Pin { .. } => None,
                };
                let (lat, lng) = match &location_input {
                    LocationInput::Pin { latitude, longitude } => (Some(*latitude), Some(*longitude)),
                    LocationInput::Address(_) => (None, None),
                };
                (fallback_address, None, lat, lng, true)
            }
            None => (None, None, None, None, false),
        };

        let new_status = if in_area {
            SessionStatus::LocationValidated
        } else {
            SessionStatus::LocationRejected
        };

        let updated = self
            .sessions
            .compare_and_transition(
                session_id,
                &[SessionStatus::Started, SessionStatus::LocationRejected],
                new_status,
                Box::new(move |s: &mut Session| {
                    s.customer.name = customer.name;
                    s.customer.phone = customer.phone;
                    s.customer.email = customer.email;
                    s.location.address = address;
                    s.location.city = city;
                    s.location.latitude = latitude;
                    s.location.longitude = longitude;
                    s.location.is_in_service_area = Some(in_area);
                }),
            )
            .await?
            .ok_or(DomainError::PreconditionFailed {
                entity: "session",
                status: "unknown".to_string(),
                expected: "started or location_rejected",
            })?;

        self.audit
            .record_system(
                "session",
                session_id,
                if in_area { "location_validated" } else { "location_rejected" },
                json!({ "city": updated.location.city, "is_in_service_area": in_area }),
            )
            .await;

        Ok(updated)
    }

    fn base_price(&self, service_type: ServiceType) -> Cents {
        self.config
            .deposit_amounts
            .get(&service_type)
            .copied()
            .unwrap_or(Cents::ZERO)
    }

    /// `direct_pay`: when true, skips the open quote broadcast (Mode A) and
    /// transitions straight to `ServiceSelected`, per spec.md §4.1's note
    /// that a direct-pay path may skip the broadcast.
    #[allow(clippy::too_many_arguments)]
    pub async fn select_service(
        &self,
        session_id: &str,
        service_type: ServiceType,
        urgency: Urgency,
        description: Option<String>,
        vehicle: Option<VehicleInput>,
        direct_pay: bool,
    ) -> DomainResult<Session> {
        if service_type == ServiceType::CarLockout && vehicle.is_none() {
            return Err(DomainError::Validation {
                field: "vehicle",
                message: "car_lockout requires make/model/year".to_string(),
            }
            .into());
        }

        let deposit_amount = self.base_price(service_type).with_emergency_surcharge(urgency.is_emergency());
        let vehicle = vehicle.map(|v| Vehicle {
            make: v.make,
            model: v.model,
            year: v.year,
        });

        let new_status = if direct_pay {
            SessionStatus::ServiceSelected
        } else {
            SessionStatus::PendingApproval
        };

        let updated = self
            .sessions
            .compare_and_transition(
                session_id,
                &[SessionStatus::LocationValidated],
                new_status,
                Box::new(move |s: &mut Session| {
                    s.step_reached = 2;
                    s.service.service_type = Some(service_type);
                    s.service.urgency = Some(urgency);
                    s.service.description = description;
                    s.service.deposit_amount = deposit_amount;
                    s.service.vehicle = vehicle;
                }),
            )
            .await?
            .ok_or(DomainError::PreconditionFailed {
                entity: "session",
                status: "unknown".to_string(),
                expected: "location_validated",
            })?;

        self.audit
            .record_system(
                "session",
                session_id,
                "service_selected",
                json!({
                    "service_type": service_type.as_str(),
                    "urgency": urgency.as_str(),
                    "deposit_amount": deposit_amount.0,
                    "direct_pay": direct_pay,
                }),
            )
            .await;

        if !direct_pay {
            self.dispatcher.broadcast_quote_requests(&updated).await?;
        }

        Ok(updated)
    }

    /// Returns the client secret alongside the updated session, since the
    /// HTTP caller must hand it to the customer's payment widget.
    pub async fn request_payment(&self, session_id: &str) -> DomainResult<(Session, String)> {
        let current = self
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "session",
                field: "id",
                value: session_id.to_string(),
            })?;

        if !matches!(
            current.status,
            SessionStatus::PendingApproval | SessionStatus::ServiceSelected
        ) {
            return Err(DomainError::PreconditionFailed {
                entity: "session",
                status: current.status.as_str().to_string(),
                expected: "pending_approval or service_selected",
            }
            .into());
        }

        let intent = self
            .payment
            .create_intent(session_id, current.service.deposit_amount)
            .await?;
        let intent_id = intent.intent_id.clone();

        let updated = self
            .sessions
            .compare_and_transition(
                session_id,
                &[SessionStatus::PendingApproval, SessionStatus::ServiceSelected],
                SessionStatus::PaymentPending,
                Box::new(move |s: &mut Session| {
                    s.step_reached = 3;
                    s.payment_intent_id = Some(intent_id);
                }),
            )
            .await?
            .ok_or(DomainError::PreconditionFailed {
                entity: "session",
                status: "unknown".to_string(),
                expected: "pending_approval or service_selected",
            })?;

        self.audit
            .record_system(
                "session",
                session_id,
                "payment_requested",
                json!({ "intent_id": updated.payment_intent_id }),
            )
            .await;

        Ok((updated, intent.client_secret))
    }

    pub async fn complete(&self, session_id: &str) -> DomainResult<(Session, Job)> {
        let current = self
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "session",
                field: "id",
                value: session_id.to_string(),
            })?;

        if current.status != SessionStatus::PaymentPending {
            return Err(DomainError::PreconditionFailed {
                entity: "session",
                status: current.status.as_str().to_string(),
                expected: "payment_pending",
            }
            .into());
        }

        let intent_id = current
            .payment_intent_id
            .clone()
            .ok_or(DomainError::Validation {
                field: "payment_intent_id",
                message: "session has no payment intent".to_string(),
            })?;

        let confirmed = self.payment.confirm(&intent_id).await?;
        if !confirmed {
            return Err(DomainError::ExternalTransient {
                service: "payment",
                message: "payment not confirmed".to_string(),
            }
            .into());
        }

        let completed_at = chrono::Utc::now();
        let updated = self
            .sessions
            .compare_and_transition(
                session_id,
                &[SessionStatus::PaymentPending],
                SessionStatus::PaymentCompleted,
                Box::new(move |s: &mut Session| {
                    s.completed_at = Some(completed_at);
                }),
            )
            .await?
            .ok_or(DomainError::PreconditionFailed {
                entity: "session",
                status: "unknown".to_string(),
                expected: "payment_pending",
            })?;

        self.audit
            .record_system("session", session_id, "payment_completed", json!({}))
            .await;

        let job = self.job_factory.create_from_session(&updated).await?;
        info!(job_id = %job.id, session_id, "job created from completed session");

        self.dispatcher.start_assignment_wave(&job).await?;

        Ok((updated, job))
    }

    /// Demotes any non-terminal session to `Abandoned` after inactivity.
    /// Spec.md §4.1's `timeout -> Abandoned` edge has no caller-facing
    /// precondition beyond "not already terminal".
    pub async fn abandon(&self, session_id: &str) -> DomainResult<Option<Session>> {
        let non_terminal = [
            SessionStatus::Started,
            SessionStatus::LocationValidated,
            SessionStatus::LocationRejected,
            SessionStatus::ServiceSelected,
            SessionStatus::PendingApproval,
            SessionStatus::PaymentPending,
        ];

        let result = self
            .sessions
            .compare_and_transition(session_id, &non_terminal, SessionStatus::Abandoned, Box::new(|_| {}))
            .await?;

        if result.is_some() {
            self.audit
                .record_system("session", session_id, "session_abandoned", json!({}))
                .await;
        }

        Ok(result)
    }
}
