//! Domain layer: entities, repository ports, outbound adapter ports, and
//! the error taxonomy. No entry here depends on SeaORM, Axum, or any
//! concrete adapter — only on `async_trait`/`chrono`/`serde`.

pub mod audit;
pub mod error;
pub mod job;
pub mod message;
pub mod offer;
pub mod photo;
pub mod ports;
pub mod provider;
pub mod session;

use std::sync::Arc;

use self::audit::repository::AuditRepository;
use self::job::repository::JobRepository;
use self::message::repository::MessageRepository;
use self::offer::repository::OfferRepository;
use self::photo::repository::PhotoRepository;
use self::provider::repository::ProviderRepository;
use self::session::repository::SessionRepository;

/// Bundles every repository behind one handle, mirroring the teacher's
/// `domain::RepositoryProvider` — services take one `Arc<dyn RepositoryProvider>`
/// instead of five separate constructor parameters.
pub trait RepositoryProvider: Send + Sync {
    fn sessions(&self) -> Arc<dyn SessionRepository>;
    fn offers(&self) -> Arc<dyn OfferRepository>;
    fn jobs(&self) -> Arc<dyn JobRepository>;
    fn providers(&self) -> Arc<dyn ProviderRepository>;
    fn messages(&self) -> Arc<dyn MessageRepository>;
    fn photos(&self) -> Arc<dyn PhotoRepository>;
    fn audit(&self) -> Arc<dyn AuditRepository>;
}
