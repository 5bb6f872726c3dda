//! Domain error taxonomy (spec.md §7), mirrored from the teacher's
//! `shared/types/errors.rs`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::shared::ApiResponse;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Precondition failed: {entity} is in status {status}, expected one of {expected}")]
    PreconditionFailed {
        entity: &'static str,
        status: String,
        expected: &'static str,
    },

    #[error("Validation error on {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Out of service area: {city}")]
    OutOfServiceArea { city: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("External transient error calling {service}: {message}")]
    ExternalTransient { service: &'static str, message: String },

    #[error("External permanent error calling {service}: {message}")]
    ExternalPermanent { service: &'static str, message: String },
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Infra(#[from] InfraError),
}

impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        AppError::Infra(InfraError::Database(e))
    }
}

pub type DomainResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Domain(DomainError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Domain(DomainError::PreconditionFailed { .. }) => StatusCode::BAD_REQUEST,
            AppError::Domain(DomainError::Validation { .. }) => StatusCode::BAD_REQUEST,
            AppError::Domain(DomainError::OutOfServiceArea { .. }) => StatusCode::OK,
            AppError::Domain(DomainError::Conflict(_)) => StatusCode::CONFLICT,
            AppError::Domain(DomainError::ExternalTransient { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Domain(DomainError::ExternalPermanent { .. }) => StatusCode::BAD_REQUEST,
            AppError::Infra(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}
