//! Handlers for the admin console (spec.md §6 "HTTP surface (admin)").
//! All routes here are trusted as authenticated at the network edge; the
//! `actor_email` header is captured for audit only (spec.md §1 Non-goals).

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::audit::ActorType;
use crate::domain::error::{AppError, DomainError};
use crate::domain::provider::Provider;
use crate::interfaces::http::common::{ApiResponse, ValidatedJson};
use crate::interfaces::http::router::AppState;
use crate::shared::Cents;

use super::dto::*;

fn actor_email(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-actor-email")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

// ---- Providers (spec.md §6 `/admin/locksmiths`) ----

pub async fn list_providers(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ProviderDto>>>, AppError> {
    let providers = state.repos.providers().find_all().await?;
    Ok(Json(ApiResponse::success(
        providers.iter().map(ProviderDto::from_domain).collect(),
    )))
}

pub async fn get_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ProviderDto>>, AppError> {
    let provider = state
        .repos
        .providers()
        .find_by_id(&id)
        .await?
        .ok_or(DomainError::NotFound {
            entity: "provider",
            field: "id",
            value: id,
        })?;
    Ok(Json(ApiResponse::success(ProviderDto::from_domain(&provider))))
}

pub async fn create_provider(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<CreateProviderRequest>,
) -> Result<Json<ApiResponse<ProviderDto>>, AppError> {
    let now = Utc::now();
    let provider = Provider {
        id: Uuid::new_v4().to_string(),
        display_name: body.display_name.clone(),
        phone: crate::shared::Phone::normalize(&body.phone).0,
        home_city: body.home_city.clone(),
        capabilities: (&body).into(),
        is_active: true,
        is_available: true,
        notes: body.notes.clone(),
        onboarded_at: now,
        updated_at: now,
    };
    let inserted = state.repos.providers().insert(provider).await?;

    state
        .audit
        .record(
            "provider",
            &inserted.id,
            "provider_created",
            ActorType::Admin,
            actor_email(&headers).as_deref(),
            serde_json::json!({ "phone": inserted.phone }),
        )
        .await;

    Ok(Json(ApiResponse::success(ProviderDto::from_domain(&inserted))))
}

pub async fn update_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<UpdateProviderRequest>,
) -> Result<Json<ApiResponse<ProviderDto>>, AppError> {
    let mut provider = state
        .repos
        .providers()
        .find_by_id(&id)
        .await?
        .ok_or(DomainError::NotFound {
            entity: "provider",
            field: "id",
            value: id.clone(),
        })?;

    body.apply_to(&mut provider);
    state.repos.providers().update(provider.clone()).await?;

    state
        .audit
        .record(
            "provider",
            &id,
            "provider_updated",
            ActorType::Admin,
            actor_email(&headers).as_deref(),
            serde_json::json!({}),
        )
        .await;

    Ok(Json(ApiResponse::success(ProviderDto::from_domain(&provider))))
}

pub async fn delete_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state
        .repos
        .providers()
        .find_by_id(&id)
        .await?
        .ok_or(DomainError::NotFound {
            entity: "provider",
            field: "id",
            value: id.clone(),
        })?;

    state.repos.providers().delete(&id).await?;

    state
        .audit
        .record(
            "provider",
            &id,
            "provider_deleted",
            ActorType::Admin,
            actor_email(&headers).as_deref(),
            serde_json::json!({}),
        )
        .await;

    Ok(Json(ApiResponse::success(())))
}

// ---- Jobs (spec.md §6 `/admin/jobs`) ----

pub async fn list_jobs(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<JobDto>>>, AppError> {
    let jobs = state.repos.jobs().find_all().await?;
    Ok(Json(ApiResponse::success(
        jobs.iter().map(JobDto::from_domain).collect(),
    )))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<JobDto>>, AppError> {
    let job = state
        .repos
        .jobs()
        .find_by_id(&id)
        .await?
        .ok_or(DomainError::NotFound {
            entity: "job",
            field: "id",
            value: id,
        })?;
    Ok(Json(ApiResponse::success(JobDto::from_domain(&job))))
}

pub async fn assign_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<AssignJobRequest>,
) -> Result<Json<ApiResponse<JobDto>>, AppError> {
    let email = actor_email(&headers);
    let job = state
        .dispatcher
        .admin_assign(&id, &body.provider_id, email.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(JobDto::from_domain(&job))))
}

pub async fn cancel_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<CancelJobRequest>,
) -> Result<Json<ApiResponse<JobDto>>, AppError> {
    let email = actor_email(&headers);
    let job = state
        .dispatcher
        .admin_cancel_job(&id, &body.reason, email.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(JobDto::from_domain(&job))))
}

pub async fn refund_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<RefundJobRequest>,
) -> Result<Json<ApiResponse<JobDto>>, AppError> {
    let email = actor_email(&headers);
    let amount = body.amount_cents.map(Cents);
    let job = state
        .dispatcher
        .admin_refund(&id, amount, &body.reason, email.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(JobDto::from_domain(&job))))
}

pub async fn restart_dispatch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let email = actor_email(&headers);
    state.dispatcher.admin_restart_wave(&id, email.as_deref()).await?;
    Ok(Json(ApiResponse::success(())))
}

// ---- Sessions (spec.md §6 `/admin/sessions`) ----

#[derive(Debug, Deserialize)]
pub struct SessionListQuery {
    /// Caps how many sessions are scanned for the funnel breakdown; the
    /// admin console's session volume is small enough that this is a
    /// generous default rather than a true pagination cursor.
    #[serde(default = "default_session_limit")]
    pub limit: usize,
}

fn default_session_limit() -> usize {
    500
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<SessionListQuery>,
) -> Result<Json<ApiResponse<SessionListResponseDto>>, AppError> {
    let mut sessions = state.repos.sessions().find_all().await?;
    let funnel = FunnelStatsDto::from_sessions(&sessions);
    sessions.truncate(query.limit);

    Ok(Json(ApiResponse::success(SessionListResponseDto {
        sessions: sessions.iter().map(SessionSummaryDto::from_domain).collect(),
        funnel,
    })))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SessionSummaryDto>>, AppError> {
    let session = state
        .repos
        .sessions()
        .find_by_id(&id)
        .await?
        .ok_or(DomainError::NotFound {
            entity: "session",
            field: "id",
            value: id,
        })?;
    Ok(Json(ApiResponse::success(SessionSummaryDto::from_domain(&session))))
}

// ---- Messages (spec.md §6 `/admin/messages`) ----

pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<MessageDto>>>, AppError> {
    let messages = state.repos.messages().find_all().await?;
    Ok(Json(ApiResponse::success(
        messages.iter().map(MessageDto::from_domain).collect(),
    )))
}
