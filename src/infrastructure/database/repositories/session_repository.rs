//! SeaORM implementation of SessionRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use crate::domain::error::DomainResult;
use crate::domain::session::{
    Customer, Location, ServiceSelectionFields, Session, SessionRepository, SessionStatus,
    Telemetry, Vehicle,
};
use crate::infrastructure::database::entities::session;
use crate::shared::Cents;

pub struct SeaOrmSessionRepository {
    db: DatabaseConnection,
}

impl SeaOrmSessionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: session::Model) -> Session {
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

    Session {
        id: m.id,
        status: SessionStatus::from_str(&m.status).unwrap_or(SessionStatus::Started),
        step_reached: m.step_reached,
        customer: Customer {
            name: m.customer_name,
            phone: m.customer_phone,
            email: m.customer_email,
        },
        location: Location {
            address: m.address,
            city: m.city,
            latitude: m.latitude,
            longitude: m.longitude,
            is_in_service_area: m.is_in_service_area,
        },
        service: ServiceSelectionFields {
            service_type: m.service_type.as_deref().and_then(|s| {
                crate::domain::session::ServiceType::from_str(s)
            }),
            urgency: m
                .urgency
                .as_deref()
                .and_then(crate::domain::session::Urgency::from_str),
            description: m.description,
            deposit_amount: Cents(m.deposit_amount),
            vehicle,
        },
        payment_intent_id: m.payment_intent_id,
        telemetry: Telemetry {
            user_agent: m.user_agent,
            ip: m.ip,
            referrer: m.referrer,
            utm_params: m.utm_params,
        },
        created_at: m.created_at,
        updated_at: m.updated_at,
        completed_at: m.completed_at,
    }
}

fn domain_to_active_model(s: &Session) -> session::ActiveModel {
    session::ActiveModel {
        id: Set(s.id.clone()),
        status: Set(s.status.as_str().to_string()),
        step_reached: Set(s.step_reached),
        customer_name: Set(s.customer.name.clone()),
        customer_phone: Set(s.customer.phone.clone()),
        customer_email: Set(s.customer.email.clone()),
        address: Set(s.location.address.clone()),
        city: Set(s.location.city.clone()),
        latitude: Set(s.location.latitude),
        longitude: Set(s.location.longitude),
        is_in_service_area: Set(s.location.is_in_service_area),
        service_type: Set(s.service.service_type.map(|t| t.as_str().to_string())),
        urgency: Set(s.service.urgency.map(|u| u.as_str().to_string())),
        description: Set(s.service.description.clone()),
        deposit_amount: Set(s.service.deposit_amount.0),
        vehicle_make: Set(s.service.vehicle.as_ref().map(|v| v.make.clone())),
        vehicle_model: Set(s.service.vehicle.as_ref().map(|v| v.model.clone())),
        vehicle_year: Set(s.service.vehicle.as_ref().map(|v| v.year.clone())),
        payment_intent_id: Set(s.payment_intent_id.clone()),
        user_agent: Set(s.telemetry.user_agent.clone()),
        ip: Set(s.telemetry.ip.clone()),
        referrer: Set(s.telemetry.referrer.clone()),
        utm_params: Set(s.telemetry.utm_params.clone()),
        created_at: Set(s.created_at),
        updated_at: Set(s.updated_at),
        completed_at: Set(s.completed_at),
    }
}

#[async_trait]
impl SessionRepository for SeaOrmSessionRepository {
    async fn insert(&self, session: Session) -> DomainResult<Session> {
        debug!(session_id = %session.id, "inserting session");
        let model = domain_to_active_model(&session);
        model.insert(&self.db).await?;
        Ok(session)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Session>> {
        let model = session::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }

    async fn find_all(&self) -> DomainResult<Vec<Session>> {
        let models = session::Entity::find()
            .order_by_desc(session::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_latest_by_customer_phone(&self, phone: &str) -> DomainResult<Option<Session>> {
        let model = session::Entity::find()
            .filter(session::Column::CustomerPhone.eq(phone))
            .order_by_desc(session::Column::CreatedAt)
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_payment_intent_id(&self, payment_intent_id: &str) -> DomainResult<Option<Session>> {
        let model = session::Entity::find()
            .filter(session::Column::PaymentIntentId.eq(payment_intent_id))
            .order_by_desc(session::Column::CreatedAt)
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }

    async fn save(&self, session: Session) -> DomainResult<()> {
        let model = domain_to_active_model(&session);
        model.update(&self.db).await?;
        Ok(())
    }

    async fn compare_and_transition(
        &self,
        id: &str,
        from: &[SessionStatus],
        to: SessionStatus,
        mutate: Box<dyn FnOnce(&mut Session) + Send>,
    ) -> DomainResult<Option<Session>> {
        let Some(model) = session::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut candidate = model_to_domain(model);
        if !from.contains(&candidate.status) {
            return Ok(None);
        }

        mutate(&mut candidate);
        candidate.status = to;
        candidate.updated_at = Utc::now();

        let from_strs: Vec<String> = from.iter().map(|s| s.as_str().to_string()).collect();
        let active = domain_to_active_model(&candidate);

        let result = session::Entity::update_many()
            .col_expr(session::Column::Status, Expr::value(active.status.unwrap()))
            .col_expr(session::Column::StepReached, Expr::value(active.step_reached.unwrap()))
            .col_expr(session::Column::CustomerName, Expr::value(active.customer_name.unwrap()))
            .col_expr(session::Column::CustomerPhone, Expr::value(active.customer_phone.unwrap()))
            .col_expr(session::Column::CustomerEmail, Expr::value(active.customer_email.unwrap()))
            .col_expr(session::Column::Address, Expr::value(active.address.unwrap()))
            .col_expr(session::Column::City, Expr::value(active.city.unwrap()))
            .col_expr(session::Column::Latitude, Expr::value(active.latitude.unwrap()))
            .col_expr(session::Column::Longitude, Expr::value(active.longitude.unwrap()))
            .col_expr(
                session::Column::IsInServiceArea,
                Expr::value(active.is_in_service_area.unwrap()),
            )
            .col_expr(session::Column::ServiceType, Expr::value(active.service_type.unwrap()))
            .col_expr(session::Column::Urgency, Expr::value(active.urgency.unwrap()))
            .col_expr(session::Column::Description, Expr::value(active.description.unwrap()))
            .col_expr(session::Column::DepositAmount, Expr::value(active.deposit_amount.unwrap()))
            .col_expr(session::Column::VehicleMake, Expr::value(active.vehicle_make.unwrap()))
            .col_expr(session::Column::VehicleModel, Expr::value(active.vehicle_model.unwrap()))
            .col_expr(session::Column::VehicleYear, Expr::value(active.vehicle_year.unwrap()))
            .col_expr(
                session::Column::PaymentIntentId,
                Expr::value(active.payment_intent_id.unwrap()),
            )
            .col_expr(session::Column::UserAgent, Expr::value(active.user_agent.unwrap()))
            .col_expr(session::Column::Ip, Expr::value(active.ip.unwrap()))
            .col_expr(session::Column::Referrer, Expr::value(active.referrer.unwrap()))
            .col_expr(session::Column::UtmParams, Expr::value(active.utm_params.unwrap()))
            .col_expr(session::Column::UpdatedAt, Expr::value(active.updated_at.unwrap()))
            .col_expr(session::Column::CompletedAt, Expr::value(active.completed_at.unwrap()))
            .filter(session::Column::Id.eq(id))
            .filter(session::Column::Status.is_in(from_strs))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 1 {
            Ok(Some(candidate))
        } else {
            Ok(None)
        }
    }
}
