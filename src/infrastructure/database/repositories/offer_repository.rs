//! SeaORM implementation of OfferRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use crate::domain::error::DomainResult;
use crate::domain::offer::{Offer, OfferRepository, OfferScope, OfferStatus};
use crate::infrastructure::database::entities::offer;
use crate::shared::Cents;

pub struct SeaOrmOfferRepository {
    db: DatabaseConnection,
}

impl SeaOrmOfferRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: offer::Model) -> Offer {
    let scope = match (m.session_id, m.job_id) {
        (Some(session_id), _) => OfferScope::Session(session_id),
        (None, Some(job_id)) => OfferScope::Job(job_id),
        (None, None) => OfferScope::Session(String::new()),
    };

    Offer {
        id: m.id,
        scope,
        provider_id: m.provider_id,
        wave_number: m.wave_number,
        status: OfferStatus::from_str(&m.status).unwrap_or(OfferStatus::Pending),
        quoted_price: m.quoted_price.map(Cents),
        provider_message_id: m.provider_message_id,
        sent_at: m.sent_at,
        responded_at: m.responded_at,
        expires_at: m.expires_at,
    }
}

fn domain_to_active_model(o: &Offer) -> offer::ActiveModel {
    offer::ActiveModel {
        id: Set(o.id.clone()),
        session_id: Set(o.scope.session_id().map(|s| s.to_string())),
        job_id: Set(o.scope.job_id().map(|s| s.to_string())),
        provider_id: Set(o.provider_id.clone()),
        wave_number: Set(o.wave_number),
        status: Set(o.status.as_str().to_string()),
        quoted_price: Set(o.quoted_price.map(|c| c.0)),
        provider_message_id: Set(o.provider_message_id.clone()),
        sent_at: Set(o.sent_at),
        responded_at: Set(o.responded_at),
        expires_at: Set(o.expires_at),
    }
}

#[async_trait]
impl OfferRepository for SeaOrmOfferRepository {
    async fn insert(&self, offer: Offer) -> DomainResult<Offer> {
        let model = domain_to_active_model(&offer);
        model.insert(&self.db).await?;
        Ok(offer)
    }

    async fn insert_many(&self, offers: Vec<Offer>) -> DomainResult<Vec<Offer>> {
        debug!(count = offers.len(), "inserting offer batch");
        let models: Vec<offer::ActiveModel> = offers.iter().map(domain_to_active_model).collect();
        if !models.is_empty() {
            offer::Entity::insert_many(models).exec(&self.db).await?;
        }
        Ok(offers)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Offer>> {
        let model = offer::Entity::find_by_id(id.to_string()).one(&self.db).await?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_session(&self, session_id: &str) -> DomainResult<Vec<Offer>> {
        let models = offer::Entity::find()
            .filter(offer::Column::SessionId.eq(session_id))
            .order_by_asc(offer::Column::SentAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_by_job(&self, job_id: &str) -> DomainResult<Vec<Offer>> {
        let models = offer::Entity::find()
            .filter(offer::Column::JobId.eq(job_id))
            .order_by_asc(offer::Column::SentAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_latest_pending_for_provider(
        &self,
        provider_id: &str,
        session_scoped_only: Option<bool>,
    ) -> DomainResult<Option<Offer>> {
        let mut query = offer::Entity::find()
            .filter(offer::Column::ProviderId.eq(provider_id))
            .filter(offer::Column::Status.eq(OfferStatus::Pending.as_str()));

        query = match session_scoped_only {
            Some(true) => query.filter(offer::Column::SessionId.is_not_null()),
            Some(false) => query.filter(offer::Column::JobId.is_not_null()),
            None => query,
        };

        let model = query
            .order_by_desc(offer::Column::SentAt)
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }

    async fn find_contacted_provider_ids(&self, job_id: &str) -> DomainResult<Vec<String>> {
        let models = offer::Entity::find()
            .filter(offer::Column::JobId.eq(job_id))
            .all(&self.db)
            .await?;
        let mut ids: Vec<String> = models.into_iter().map(|m| m.provider_id).collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn save(&self, offer: Offer) -> DomainResult<()> {
        let model = domain_to_active_model(&offer);
        model.update(&self.db).await?;
        Ok(())
    }

    async fn cancel_other_pending_for_job(&self, job_id: &str, keep_id: &str) -> DomainResult<()> {
        offer::Entity::update_many()
            .col_expr(offer::Column::Status, Expr::value(OfferStatus::Canceled.as_str()))
            .filter(offer::Column::JobId.eq(job_id))
            .filter(offer::Column::Status.eq(OfferStatus::Pending.as_str()))
            .filter(offer::Column::Id.ne(keep_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn cancel_all_pending_for_job(&self, job_id: &str) -> DomainResult<()> {
        offer::Entity::update_many()
            .col_expr(offer::Column::Status, Expr::value(OfferStatus::Canceled.as_str()))
            .filter(offer::Column::JobId.eq(job_id))
            .filter(offer::Column::Status.eq(OfferStatus::Pending.as_str()))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn expire_pending_older_than(&self, now: DateTime<Utc>) -> DomainResult<Vec<Offer>> {
        let expiring = offer::Entity::find()
            .filter(offer::Column::Status.eq(OfferStatus::Pending.as_str()))
            .filter(offer::Column::ExpiresAt.lt(now))
            .all(&self.db)
            .await?;

        if expiring.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = expiring.iter().map(|m| m.id.clone()).collect();
        offer::Entity::update_many()
            .col_expr(offer::Column::Status, Expr::value(OfferStatus::Expired.as_str()))
            .filter(offer::Column::Id.is_in(ids))
            .exec(&self.db)
            .await?;

        Ok(expiring
            .into_iter()
            .map(|m| {
                let mut o = model_to_domain(m);
                o.status = OfferStatus::Expired;
                o
            })
            .collect())
    }

    async fn count_unresolved_in_wave(&self, job_id: &str, wave_number: i32) -> DomainResult<i64> {
        let count = offer::Entity::find()
            .filter(
                Condition::all()
                    .add(offer::Column::JobId.eq(job_id))
                    .add(offer::Column::WaveNumber.eq(wave_number))
                    .add(offer::Column::Status.eq(OfferStatus::Pending.as_str())),
            )
            .count(&self.db)
            .await?;
        Ok(count as i64)
    }

    async fn find_by_provider_message_id(
        &self,
        provider_message_id: &str,
    ) -> DomainResult<Option<Offer>> {
        let model = offer::Entity::find()
            .filter(offer::Column::ProviderMessageId.eq(provider_message_id))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }
}
