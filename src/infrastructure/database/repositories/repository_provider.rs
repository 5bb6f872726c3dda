//! SeaORM implementation of `RepositoryProvider` — one connection pool,
//! one repository struct per aggregate (spec.md §3 Ownership).

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::domain::audit::repository::AuditRepository;
use crate::domain::job::repository::JobRepository;
use crate::domain::message::repository::MessageRepository;
use crate::domain::offer::repository::OfferRepository;
use crate::domain::photo::repository::PhotoRepository;
use crate::domain::provider::repository::ProviderRepository;
use crate::domain::session::repository::SessionRepository;
use crate::domain::RepositoryProvider;

use super::audit_repository::SeaOrmAuditRepository;
use super::job_repository::SeaOrmJobRepository;
use super::message_repository::SeaOrmMessageRepository;
use super::offer_repository::SeaOrmOfferRepository;
use super::photo_repository::SeaOrmPhotoRepository;
use super::provider_repository::SeaOrmProviderRepository;
use super::session_repository::SeaOrmSessionRepository;

pub struct SeaOrmRepositoryProvider {
    sessions: Arc<SeaOrmSessionRepository>,
    offers: Arc<SeaOrmOfferRepository>,
    jobs: Arc<SeaOrmJobRepository>,
    providers: Arc<SeaOrmProviderRepository>,
    messages: Arc<SeaOrmMessageRepository>,
    photos: Arc<SeaOrmPhotoRepository>,
    audit: Arc<SeaOrmAuditRepository>,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            sessions: Arc::new(SeaOrmSessionRepository::new(db.clone())),
            offers: Arc::new(SeaOrmOfferRepository::new(db.clone())),
            jobs: Arc::new(SeaOrmJobRepository::new(db.clone())),
            providers: Arc::new(SeaOrmProviderRepository::new(db.clone())),
            messages: Arc::new(SeaOrmMessageRepository::new(db.clone())),
            photos: Arc::new(SeaOrmPhotoRepository::new(db.clone())),
            audit: Arc::new(SeaOrmAuditRepository::new(db)),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn sessions(&self) -> Arc<dyn SessionRepository> {
        self.sessions.clone()
    }

    fn offers(&self) -> Arc<dyn OfferRepository> {
        self.offers.clone()
    }

    fn jobs(&self) -> Arc<dyn JobRepository> {
        self.jobs.clone()
    }

    fn providers(&self) -> Arc<dyn ProviderRepository> {
        self.providers.clone()
    }

    fn messages(&self) -> Arc<dyn MessageRepository> {
        self.messages.clone()
    }

    fn photos(&self) -> Arc<dyn PhotoRepository> {
        self.photos.clone()
    }

    fn audit(&self) -> Arc<dyn AuditRepository> {
        self.audit.clone()
    }
}
