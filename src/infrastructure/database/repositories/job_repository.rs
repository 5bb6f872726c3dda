//! SeaORM implementation of JobRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use crate::domain::error::DomainResult;
use crate::domain::job::{Job, JobRepository, JobStatus, PaymentStatus};
use crate::domain::session::model::{ServiceType, Urgency, Vehicle};
use crate::infrastructure::database::entities::job;
use crate::shared::Cents;

pub struct SeaOrmJobRepository {
    db: DatabaseConnection,
}

impl SeaOrmJobRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: job::Model) -> Job {
    let vehicle = if m.vehicle_make.is_some() || m.vehicle_model.is_some() || m.vehicle_year.is_some()
    {
        Some(Vehicle {
            make: m.vehicle_make.unwrap_or_default(),
            model: m.vehicle_model.unwrap_or_default(),
            year: m.vehicle_year.unwrap_or_default(),
        })
    } else {
        None
    };

    Job {
        id: m.id,
        session_id: m.session_id,
        customer_name: m.customer_name,
        customer_phone: m.customer_phone,
        address: m.address,
        city: m.city,
        latitude: m.latitude,
        longitude: m.longitude,
        service_type: ServiceType::from_str(&m.service_type).unwrap_or(ServiceType::HomeLockout),
        urgency: Urgency::from_str(&m.urgency).unwrap_or(Urgency::Standard),
        description: m.description,
        vehicle,
        deposit_amount: Cents(m.deposit_amount),
        payment_intent_id: m.payment_intent_id,
        payment_status: PaymentStatus::from_str(&m.payment_status)
            .unwrap_or(PaymentStatus::Succeeded),
        refund_amount: m.refund_amount.map(Cents),
        refund_id: m.refund_id,
        assigned_provider_id: m.assigned_provider_id,
        assigned_at: m.assigned_at,
        status: JobStatus::from_str(&m.status).unwrap_or(JobStatus::Created),
        current_wave: m.current_wave,
        dispatch_started_at: m.dispatch_started_at,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn domain_to_active_model(j: &Job) -> job::ActiveModel {
    job::ActiveModel {
        id: Set(j.id.clone()),
        session_id: Set(j.session_id.clone()),
        customer_name: Set(j.customer_name.clone()),
        customer_phone: Set(j.customer_phone.clone()),
        address: Set(j.address.clone()),
        city: Set(j.city.clone()),
        latitude: Set(j.latitude),
        longitude: Set(j.longitude),
        service_type: Set(j.service_type.as_str().to_string()),
        urgency: Set(j.urgency.as_str().to_string()),
        description: Set(j.description.clone()),
        vehicle_make: Set(j.vehicle.as_ref().map(|v| v.make.clone())),
        vehicle_model: Set(j.vehicle.as_ref().map(|v| v.model.clone())),
        vehicle_year: Set(j.vehicle.as_ref().map(|v| v.year.clone())),
        deposit_amount: Set(j.deposit_amount.0),
        payment_intent_id: Set(j.payment_intent_id.clone()),
        payment_status: Set(j.payment_status.as_str().to_string()),
        refund_amount: Set(j.refund_amount.map(|c| c.0)),
        refund_id: Set(j.refund_id.clone()),
        assigned_provider_id: Set(j.assigned_provider_id.clone()),
        assigned_at: Set(j.assigned_at),
        status: Set(j.status.as_str().to_string()),
        current_wave: Set(j.current_wave),
        dispatch_started_at: Set(j.dispatch_started_at),
        created_at: Set(j.created_at),
        updated_at: Set(j.updated_at),
    }
}

#[async_trait]
impl JobRepository for SeaOrmJobRepository {
    async fn insert(&self, job: Job) -> DomainResult<Job> {
        debug!(job_id = %job.id, "inserting job");
        let model = domain_to_active_model(&job);
        model.insert(&self.db).await?;
        Ok(job)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Job>> {
        let model = job::Entity::find_by_id(id.to_string()).one(&self.db).await?;
        Ok(model.map(model_to_domain))
    }

    async fn find_all(&self) -> DomainResult<Vec<Job>> {
        let models = job::Entity::find()
            .order_by_desc(job::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_by_payment_intent_id(&self, payment_intent_id: &str) -> DomainResult<Option<Job>> {
        let model = job::Entity::find()
            .filter(job::Column::PaymentIntentId.eq(payment_intent_id))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }

    async fn save(&self, job: Job) -> DomainResult<()> {
        let model = domain_to_active_model(&job);
        model.update(&self.db).await?;
        Ok(())
    }

    async fn compare_and_transition(
        &self,
        id: &str,
        from: &[JobStatus],
        mutate: Box<dyn FnOnce(&mut Job) + Send>,
    ) -> DomainResult<Option<Job>> {
        let Some(model) = job::Entity::find_by_id(id.to_string()).one(&self.db).await? else {
            return Ok(None);
        };

        let mut candidate = model_to_domain(model);
        if !from.contains(&candidate.status) {
            return Ok(None);
        }

        mutate(&mut candidate);
        candidate.updated_at = Utc::now();

        let from_strs: Vec<String> = from.iter().map(|s| s.as_str().to_string()).collect();
        let active = domain_to_active_model(&candidate);

        let result = job::Entity::update_many()
            .col_expr(job::Column::ServiceType, Expr::value(active.service_type.unwrap()))
            .col_expr(job::Column::Urgency, Expr::value(active.urgency.unwrap()))
            .col_expr(job::Column::Description, Expr::value(active.description.unwrap()))
            .col_expr(job::Column::VehicleMake, Expr::value(active.vehicle_make.unwrap()))
            .col_expr(job::Column::VehicleModel, Expr::value(active.vehicle_model.unwrap()))
            .col_expr(job::Column::VehicleYear, Expr::value(active.vehicle_year.unwrap()))
            .col_expr(job::Column::DepositAmount, Expr::value(active.deposit_amount.unwrap()))
            .col_expr(
                job::Column::PaymentIntentId,
                Expr::value(active.payment_intent_id.unwrap()),
            )
            .col_expr(job::Column::PaymentStatus, Expr::value(active.payment_status.unwrap()))
            .col_expr(job::Column::RefundAmount, Expr::value(active.refund_amount.unwrap()))
            .col_expr(job::Column::RefundId, Expr::value(active.refund_id.unwrap()))
            .col_expr(
                job::Column::AssignedProviderId,
                Expr::value(active.assigned_provider_id.unwrap()),
            )
            .col_expr(job::Column::AssignedAt, Expr::value(active.assigned_at.unwrap()))
            .col_expr(job::Column::Status, Expr::value(active.status.unwrap()))
            .col_expr(job::Column::CurrentWave, Expr::value(active.current_wave.unwrap()))
            .col_expr(
                job::Column::DispatchStartedAt,
                Expr::value(active.dispatch_started_at.unwrap()),
            )
            .col_expr(job::Column::UpdatedAt, Expr::value(active.updated_at.unwrap()))
            .filter(job::Column::Id.eq(id))
            .filter(job::Column::Status.is_in(from_strs))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 1 {
            Ok(Some(candidate))
        } else {
            Ok(None)
        }
    }
}
