//! Provider repository port.

use async_trait::async_trait;

use super::model::Provider;
use crate::domain::error::DomainResult;
use crate::domain::session::model::ServiceType;

#[async_trait]
pub trait ProviderRepository: Send + Sync {
    async fn insert(&self, provider: Provider) -> DomainResult<Provider>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Provider>>;
    async fn find_by_phone(&self, phone: &str) -> DomainResult<Option<Provider>>;
    async fn find_all(&self) -> DomainResult<Vec<Provider>>;
    async fn update(&self, provider: Provider) -> DomainResult<()>;
    async fn delete(&self, id: &str) -> DomainResult<()>;

    /// Active, available providers in `city` that support `service_type`,
    /// excluding ids already contacted. Used by both dispatch modes.
    async fn find_eligible(
        &self,
        city: &str,
        service_type: ServiceType,
        exclude_ids: &[String],
        limit: Option<u64>,
    ) -> DomainResult<Vec<Provider>>;
}
