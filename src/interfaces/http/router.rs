//! HTTP surface wiring (spec.md §6). One shared `AppState` handed to every
//! handler by `FromRef`-free `State<AppState>` extraction — this crate has
//! no per-route auth/tenant scoping, so the teacher's `FromRef` substate
//! split buys nothing here.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::application::services::audit_service::AuditService;
use crate::application::services::command_parser::CommandParser;
use crate::application::services::quote_dispatcher::QuoteDispatcher;
use crate::application::services::session_engine::SessionEngine;
use crate::config::AppConfig;
use crate::domain::ports::object_store::ObjectStore;
use crate::domain::ports::payment::PaymentGateway;
use crate::domain::RepositoryProvider;

use super::modules::{admin, customer, webhooks};

#[derive(Clone)]
pub struct AppState {
    pub session_engine: Arc<SessionEngine>,
    pub dispatcher: Arc<QuoteDispatcher>,
    pub command_parser: Arc<CommandParser>,
    pub audit: Arc<AuditService>,
    pub repos: Arc<dyn RepositoryProvider>,
    pub object_store: Arc<dyn ObjectStore>,
    pub payment: Arc<dyn PaymentGateway>,
    pub config: AppConfig,
}

pub fn build_router(state: AppState) -> Router {
    let customer_routes = Router::new()
        .route("/sessions", post(customer::handlers::start_session))
        .route("/sessions/{id}", get(customer::handlers::get_session))
        .route(
            "/sessions/{id}/location",
            post(customer::handlers::validate_location),
        )
        .route("/sessions/{id}/service", post(customer::handlers::select_service))
        .route(
            "/sessions/{id}/payment-intent",
            post(customer::handlers::request_payment_intent),
        )
        .route("/sessions/{id}/complete", post(customer::handlers::complete_session))
        .route("/sessions/{id}/offers", get(customer::handlers::list_offers))
        .route("/sessions/{id}/photos", post(customer::handlers::upload_photo))
        .route(
            "/sessions/{id}/photos/{photo_id}/view-url",
            get(customer::handlers::get_photo_view_url),
        );

    let admin_provider_routes = Router::new()
        .route("/", get(admin::handlers::list_providers).post(admin::handlers::create_provider))
        .route(
            "/{id}",
            get(admin::handlers::get_provider)
                .patch(admin::handlers::update_provider)
                .delete(admin::handlers::delete_provider),
        );

    let admin_job_routes = Router::new()
        .route("/", get(admin::handlers::list_jobs))
        .route("/{id}", get(admin::handlers::get_job))
        .route("/{id}/assign", post(admin::handlers::assign_job))
        .route("/{id}/cancel", post(admin::handlers::cancel_job))
        .route("/{id}/refund", post(admin::handlers::refund_job))
        .route("/{id}/restart-dispatch", post(admin::handlers::restart_dispatch));

    let admin_routes = Router::new()
        .nest("/locksmiths", admin_provider_routes)
        .nest("/jobs", admin_job_routes)
        .route("/sessions", get(admin::handlers::list_sessions))
        .route("/sessions/{id}", get(admin::handlers::get_session))
        .route("/messages", get(admin::handlers::list_messages));

    let webhook_routes = Router::new()
        .route("/sms", post(webhooks::handlers::inbound_sms))
        .route("/payment", post(webhooks::handlers::inbound_payment));

    Router::new()
        .nest("/api/v1/customer", customer_routes)
        .nest("/api/v1/admin", admin_routes)
        .nest("/api/v1/webhooks", webhook_routes)
        .route("/healthz", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
