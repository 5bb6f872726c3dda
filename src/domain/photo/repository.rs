//! Photo repository port.

use async_trait::async_trait;

use super::model::Photo;
use crate::domain::error::DomainResult;

#[async_trait]
pub trait PhotoRepository: Send + Sync {
    async fn insert(&self, photo: Photo) -> DomainResult<Photo>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Photo>>;
    async fn find_by_session(&self, session_id: &str) -> DomainResult<Vec<Photo>>;
}
