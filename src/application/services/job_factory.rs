//! Job Factory (C4.4, spec.md §4.4) — the only writer that creates Jobs.
//! Snapshots a `PaymentCompleted` Session into a Job.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::job::{Job, JobRepository, JobStatus, PaymentStatus};
use crate::domain::session::{Session, SessionStatus};

pub struct JobFactory {
    jobs: Arc<dyn JobRepository>,
}

impl JobFactory {
    pub fn new(jobs: Arc<dyn JobRepository>) -> Self {
        Self { jobs }
    }

    pub async fn create_from_session(&self, session: &Session) -> DomainResult<Job> {
        if session.status != SessionStatus::PaymentCompleted {
            return Err(DomainError::PreconditionFailed {
                entity: "session",
                status: session.status.as_str().to_string(),
                expected: "payment_completed",
            }
            .into());
        }

        let service_type = session.service.service_type.ok_or(DomainError::Validation {
            field: "service_type",
            message: "session has no service selected".to_string(),
        })?;
        let urgency = session.service.urgency.ok_or(DomainError::Validation {
            field: "urgency",
            message: "session has no urgency selected".to_string(),
        })?;
        let payment_intent_id = session
            .payment_intent_id
            .clone()
            .ok_or(DomainError::Validation {
                field: "payment_intent_id",
                message: "session has no payment intent".to_string(),
            })?;

        let now = chrono::Utc::now();
        let job = Job {
            id: Uuid::new_v4().to_string(),
            session_id: session.id.clone(),
            customer_name: session.customer.name.clone(),
            customer_phone: session.customer.phone.clone(),
            address: session.location.address.clone(),
            city: session.location.city.clone(),
            latitude: session.location.latitude,
            longitude: session.location.longitude,
            service_type,
            urgency,
            description: session.service.description.clone(),
            vehicle: session.service.vehicle.clone(),
            deposit_amount: session.service.deposit_amount,
            payment_intent_id,
            payment_status: PaymentStatus::Succeeded,
            refund_amount: None,
            refund_id: None,
            assigned_provider_id: None,
            assigned_at: None,
            status: JobStatus::Created,
            current_wave: 0,
            dispatch_started_at: None,
            created_at: now,
            updated_at: now,
        };

        self.jobs.insert(job).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AppError;
    use crate::domain::session::model::{ServiceSelectionFields, Telemetry};
    use crate::shared::Cents;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeJobRepo {
        inserted: Mutex<Vec<Job>>,
    }

    #[async_trait]
    impl JobRepository for FakeJobRepo {
        async fn insert(&self, job: Job) -> DomainResult<Job> {
            self.inserted.lock().unwrap().push(job.clone());
            Ok(job)
        }
        async fn find_by_id(&self, _id: &str) -> DomainResult<Option<Job>> {
            Ok(None)
        }
        async fn find_all(&self) -> DomainResult<Vec<Job>> {
            Ok(vec![])
        }
        async fn find_by_payment_intent_id(&self, _payment_intent_id: &str) -> DomainResult<Option<Job>> {
            Ok(None)
        }
        async fn save(&self, _job: Job) -> DomainResult<()> {
            Ok(())
        }
        async fn compare_and_transition(
            &self,
            _id: &str,
            _from: &[JobStatus],
            _mutate: Box<dyn FnOnce(&mut Job) + Send>,
        ) -> DomainResult<Option<Job>> {
            Ok(None)
        }
    }

    fn completed_session() -> Session {
        use crate::domain::session::model::{Location, ServiceType, Urgency};
        Session {
            id: "S1".to_string(),
            status: SessionStatus::PaymentCompleted,
            step_reached: 3,
            customer: crate::domain::session::model::Customer {
                name: "Jane".to_string(),
                phone: "+19565550101".to_string(),
                email: None,
            },
            location: Location {
                address: Some("123 Main St".to_string()),
                city: Some("Laredo".to_string()),
                latitude: Some(27.5),
                longitude: Some(-99.5),
                is_in_service_area: Some(true),
            },
            service: ServiceSelectionFields {
                service_type: Some(ServiceType::HomeLockout),
                urgency: Some(Urgency::Standard),
                description: None,
                deposit_amount: Cents(4900),
                vehicle: None,
            },
            payment_intent_id: Some("pi_123".to_string()),
            telemetry: Telemetry::default(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            completed_at: Some(chrono::Utc::now()),
        }
    }

    #[tokio::test]
    async fn creates_job_snapshotting_session_fields() {
        let repo = Arc::new(FakeJobRepo {
            inserted: Mutex::new(vec![]),
        });
        let factory = JobFactory::new(repo.clone());
        let job = factory.create_from_session(&completed_session()).await.unwrap();
        assert_eq!(job.session_id, "S1");
        assert_eq!(job.deposit_amount, Cents(4900));
        assert_eq!(job.payment_status, PaymentStatus::Succeeded);
        assert_eq!(job.status, JobStatus::Created);
    }

    #[tokio::test]
    async fn rejects_session_not_payment_completed() {
        let repo = Arc::new(FakeJobRepo {
            inserted: Mutex::new(vec![]),
        });
        let factory = JobFactory::new(repo);
        let mut session = completed_session();
        session.status = SessionStatus::PaymentPending;
        let result = factory.create_from_session(&session).await;
        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::PreconditionFailed { .. }))
        ));
    }
}
