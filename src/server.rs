//! Wiring for the HTTP process: database, adapters, services, router.
//! Grounded on the teacher's `main.rs` bootstrap order, simplified to a
//! single HTTP server (no WebSocket listener, no metrics exporter, no
//! default-admin bootstrap, since this crate has no login).

use std::sync::Arc;
use std::time::Duration;

use sea_orm_migration::MigratorTrait;
use tracing::{info, warn};

use crate::application::services::audit_service::AuditService;
use crate::application::services::command_parser::CommandParser;
use crate::application::services::job_factory::JobFactory;
use crate::application::services::quote_dispatcher::QuoteDispatcher;
use crate::application::services::session_engine::SessionEngine;
use crate::config::AppConfig;
use crate::domain::ports::geocoder::Geocoder;
use crate::domain::ports::lock::LockService;
use crate::domain::ports::object_store::ObjectStore;
use crate::domain::ports::payment::PaymentGateway;
use crate::domain::ports::sms::SmsGateway;
use crate::domain::RepositoryProvider;
use crate::infrastructure::adapters::{
    HttpGeocoder, HttpObjectStore, InProcessLockService, StripeLikePaymentGateway, TwilioLikeSmsGateway,
};
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};
use crate::interfaces::http::router::{build_router, AppState};

/// Connects to the database, runs pending migrations, constructs every
/// adapter and service, and returns a bound `axum::Router` ready to serve.
pub async fn build_app(config: AppConfig) -> Result<axum::Router, Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig {
        url: config.database_url.clone(),
    };
    let db = init_database(&db_config).await?;

    info!("running database migrations");
    Migrator::up(&db, None).await?;

    let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db));

    let sms: Arc<dyn SmsGateway> = Arc::new(TwilioLikeSmsGateway::new(config.sms.clone()));
    let payment: Arc<dyn PaymentGateway> = Arc::new(StripeLikePaymentGateway::new(config.payment.clone()));
    let geocoder: Arc<dyn Geocoder> = Arc::new(HttpGeocoder::new(config.geocoder.clone()));
    let object_store: Arc<dyn ObjectStore> = Arc::new(HttpObjectStore::new(config.object_store.clone()));
    let lock: Arc<dyn LockService> = Arc::new(InProcessLockService::new());

    let audit = Arc::new(AuditService::new(repos.audit()));
    let job_factory = Arc::new(JobFactory::new(repos.jobs()));

    let dispatcher = Arc::new(QuoteDispatcher::new(
        repos.offers(),
        repos.jobs(),
        repos.providers(),
        repos.messages(),
        repos.sessions(),
        sms.clone(),
        lock,
        payment.clone(),
        audit.clone(),
        config.clone(),
    ));

    let session_engine = Arc::new(SessionEngine::new(
        repos.sessions(),
        geocoder,
        payment.clone(),
        audit.clone(),
        job_factory,
        dispatcher.clone(),
        config.clone(),
    ));

    let command_parser = Arc::new(CommandParser::new(
        repos.providers(),
        repos.messages(),
        dispatcher.clone(),
        audit.clone(),
    ));

    spawn_offer_expiry_sweeper(dispatcher.clone(), config.dispatch.wave_delay_seconds);

    let state = AppState {
        session_engine,
        dispatcher,
        command_parser,
        audit,
        repos,
        object_store,
        payment,
        config,
    };

    Ok(build_router(state))
}

/// Periodic fallback for spec.md §5's lazy expiry sweep: `progress_wave_if_resolved`
/// already re-checks expiry on every decline, but a wave where every contacted
/// provider stays silent (no `Y`/`N` ever arrives) has no decline to trigger
/// that check. This loop catches those jobs instead of leaving them in
/// `Offered` forever.
fn spawn_offer_expiry_sweeper(dispatcher: Arc<QuoteDispatcher>, wave_delay_seconds: i64) {
    let interval = Duration::from_secs(wave_delay_seconds.max(1) as u64);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match dispatcher.expire_stale_offers().await {
                Ok(count) if count > 0 => info!(expired = count, "offer expiry sweep demoted stale offers"),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "offer expiry sweep failed"),
            }
        }
    });
}
