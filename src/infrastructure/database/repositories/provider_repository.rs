//! SeaORM implementation of ProviderRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::provider::{Capabilities, Provider, ProviderRepository};
use crate::domain::session::model::ServiceType;
use crate::infrastructure::database::entities::provider;

pub struct SeaOrmProviderRepository {
    db: DatabaseConnection,
}

impl SeaOrmProviderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: provider::Model) -> Provider {
    Provider {
        id: m.id,
        display_name: m.display_name,
        phone: m.phone,
        home_city: m.home_city,
        capabilities: Capabilities {
            home_lockout: m.cap_home_lockout,
            car_lockout: m.cap_car_lockout,
            rekey: m.cap_rekey,
            smart_lock: m.cap_smart_lock,
        },
        is_active: m.is_active,
        is_available: m.is_available,
        notes: m.notes,
        onboarded_at: m.onboarded_at,
        updated_at: m.updated_at,
    }
}

fn domain_to_active_model(p: &Provider) -> provider::ActiveModel {
    provider::ActiveModel {
        id: Set(p.id.clone()),
        display_name: Set(p.display_name.clone()),
        phone: Set(p.phone.clone()),
        home_city: Set(p.home_city.clone()),
        cap_home_lockout: Set(p.capabilities.home_lockout),
        cap_car_lockout: Set(p.capabilities.car_lockout),
        cap_rekey: Set(p.capabilities.rekey),
        cap_smart_lock: Set(p.capabilities.smart_lock),
        is_active: Set(p.is_active),
        is_available: Set(p.is_available),
        notes: Set(p.notes.clone()),
        onboarded_at: Set(p.onboarded_at),
        updated_at: Set(p.updated_at),
    }
}

#[async_trait]
impl ProviderRepository for SeaOrmProviderRepository {
    async fn insert(&self, provider: Provider) -> DomainResult<Provider> {
        let model = domain_to_active_model(&provider);
        model.insert(&self.db).await?;
        Ok(provider)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Provider>> {
        let model = provider::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_phone(&self, phone: &str) -> DomainResult<Option<Provider>> {
        let model = provider::Entity::find()
            .filter(provider::Column::Phone.eq(phone))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }

    async fn find_all(&self) -> DomainResult<Vec<Provider>> {
        let models = provider::Entity::find().all(&self.db).await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn update(&self, provider: Provider) -> DomainResult<()> {
        let model = domain_to_active_model(&provider);
        model.update(&self.db).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = provider::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound {
                entity: "Provider",
                field: "id",
                value: id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn find_eligible(
        &self,
        city: &str,
        service_type: ServiceType,
        exclude_ids: &[String],
        limit: Option<u64>,
    ) -> DomainResult<Vec<Provider>> {
        let cap_column = match service_type {
            ServiceType::HomeLockout => provider::Column::CapHomeLockout,
            ServiceType::CarLockout => provider::Column::CapCarLockout,
            ServiceType::Rekey => provider::Column::CapRekey,
            ServiceType::SmartLock => provider::Column::CapSmartLock,
        };

        let mut query = provider::Entity::find()
            .filter(provider::Column::HomeCity.eq(city))
            .filter(provider::Column::IsActive.eq(true))
            .filter(provider::Column::IsAvailable.eq(true))
            .filter(cap_column.eq(true));

        if !exclude_ids.is_empty() {
            query = query.filter(provider::Column::Id.is_not_in(exclude_ids.to_vec()));
        }

        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }
}
