//! Handlers for the customer funnel (spec.md §4.1, §6). Every handler is a
//! thin composition over `SessionEngine`/`QuoteDispatcher` — no business
//! logic lives here (C11).

use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::http::HeaderMap;
use axum::Json;
use uuid::Uuid;

use crate::application::services::session_engine::{CustomerInfo, LocationInput, RequestMetadata, VehicleInput};
use crate::domain::error::{AppError, DomainError};
use crate::domain::photo::{Photo, PhotoScope, PhotoSource};
use crate::interfaces::http::common::{ApiResponse, ValidatedJson};
use crate::interfaces::http::router::AppState;
use crate::shared::Phone;

use super::dto::*;

pub async fn start_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<StartSessionRequest>,
) -> Result<Json<ApiResponse<SessionDto>>, AppError> {
    let metadata = RequestMetadata {
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        ip: headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        referrer: headers
            .get(header::REFERER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        utm_params: body.utm_params,
    };

    let session = state.session_engine.create_session(metadata).await?;
    Ok(Json(ApiResponse::success(SessionDto::from_domain(&session))))
}

pub async fn validate_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<ValidateLocationRequest>,
) -> Result<Json<ApiResponse<SessionDto>>, AppError> {
    let location_input = match body.location_method {
        LocationMethod::Address => {
            let address = body.address.ok_or(DomainError::Validation {
                field: "address",
                message: "address is required for location_method=address".to_string(),
            })?;
            LocationInput::Address(address)
        }
        LocationMethod::Pin => {
            let (latitude, longitude) = match (body.latitude, body.longitude) {
                (Some(lat), Some(lng)) => (lat, lng),
                _ => {
                    return Err(DomainError::Validation {
                        field: "latitude/longitude",
                        message: "latitude and longitude are required for location_method=pin".to_string(),
                    }
                    .into())
                }
            };
            LocationInput::Pin { latitude, longitude }
        }
    };

    let customer = CustomerInfo {
        name: body.customer_name,
        phone: Phone::normalize(&body.customer_phone).0,
        email: body.customer_email,
    };

    let session = state
        .session_engine
        .validate_location(&id, customer, location_input)
        .await?;
    Ok(Json(ApiResponse::success(SessionDto::from_domain(&session))))
}

pub async fn select_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<SelectServiceRequest>,
) -> Result<Json<ApiResponse<SessionDto>>, AppError> {
    let has_vehicle_field = body.car_make.is_some() || body.car_model.is_some() || body.car_year.is_some();
    let vehicle = has_vehicle_field.then(|| VehicleInput {
        make: body.car_make.unwrap_or_default(),
        model: body.car_model.unwrap_or_default(),
        year: body.car_year.unwrap_or_default(),
    });

    let session = state
        .session_engine
        .select_service(&id, body.service_type, body.urgency, body.description, vehicle, body.direct_pay)
        .await?;
    Ok(Json(ApiResponse::success(SessionDto::from_domain(&session))))
}

pub async fn request_payment_intent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PaymentIntentResponseDto>>, AppError> {
    let (session, client_secret) = state.session_engine.request_payment(&id).await?;
    Ok(Json(ApiResponse::success(PaymentIntentResponseDto {
        client_secret,
        session: SessionDto::from_domain(&session),
    })))
}

pub async fn complete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CompleteResponseDto>>, AppError> {
    let (session, job) = state.session_engine.complete(&id).await?;
    Ok(Json(ApiResponse::success(CompleteResponseDto {
        session: SessionDto::from_domain(&session),
        job_id: job.id,
    })))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SessionDto>>, AppError> {
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
    Ok(Json(ApiResponse::success(SessionDto::from_domain(&session))))
}

pub async fn list_offers(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<OfferDto>>>, AppError> {
    let offers = state.repos.offers().find_by_session(&id).await?;
    let mut dtos = Vec::with_capacity(offers.len());
    for offer in &offers {
        let provider = state.repos.providers().find_by_id(&offer.provider_id).await?;
        dtos.push(OfferDto::from_domain(offer, provider.as_ref()));
    }
    Ok(Json(ApiResponse::success(dtos)))
}

pub async fn upload_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<PhotoUploadResponseDto>>, AppError> {
    let mut bytes: Option<Vec<u8>> = None;
    let mut content_type = String::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| DomainError::Validation {
        field: "photo",
        message: e.to_string(),
    })? {
        if field.name() == Some("photo") {
            content_type = field.content_type().unwrap_or("application/octet-stream").to_string();
            bytes = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| DomainError::Validation {
                        field: "photo",
                        message: e.to_string(),
                    })?
                    .to_vec(),
            );
        }
    }

    let bytes = bytes.ok_or(DomainError::Validation {
        field: "photo",
        message: "missing photo field".to_string(),
    })?;

    if !content_type.starts_with("image/") {
        return Err(DomainError::Validation {
            field: "content_type",
            message: "must start with image/".to_string(),
        }
        .into());
    }
    const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;
    if bytes.len() > MAX_PHOTO_BYTES {
        return Err(DomainError::Validation {
            field: "photo",
            message: "byte count must not exceed 10 MiB".to_string(),
        }
        .into());
    }

    let photo = Photo {
        id: Uuid::new_v4().to_string(),
        scope: PhotoScope::Session(id),
        source: PhotoSource::WebUpload,
        bucket: state.config.object_store.bucket.clone(),
        content_type: content_type.clone(),
        byte_count: bytes.len() as i64,
        mms_media_id: None,
        created_at: chrono::Utc::now(),
    };
    let key = photo.object_key(&state.config.object_store.photo_prefix);

    state.object_store.upload(&key, &bytes, &content_type).await?;
    let inserted = state.repos.photos().insert(photo).await?;

    Ok(Json(ApiResponse::success(PhotoUploadResponseDto {
        id: inserted.id,
        content_type: inserted.content_type,
        byte_count: inserted.byte_count,
    })))
}

/// Time-limited view URL for a previously uploaded photo (spec.md §4.6):
/// defaults to 300s, clamped to [60, 3600] by the object store adapter.
pub async fn get_photo_view_url(
    State(state): State<AppState>,
    Path((session_id, photo_id)): Path<(String, String)>,
    Query(query): Query<PhotoViewUrlQuery>,
) -> Result<Json<ApiResponse<PhotoViewUrlResponseDto>>, AppError> {
    let photo = state
        .repos
        .photos()
        .find_by_id(&photo_id)
        .await?
        .ok_or(DomainError::NotFound {
            entity: "photo",
            field: "id",
            value: photo_id.clone(),
        })?;

    if !matches!(&photo.scope, PhotoScope::Session(s) if *s == session_id) {
        return Err(DomainError::NotFound {
            entity: "photo",
            field: "id",
            value: photo_id,
        }
        .into());
    }

    let key = photo.object_key(&state.config.object_store.photo_prefix);
    let url = state
        .object_store
        .signed_view_url(&key, query.expires_in.unwrap_or(300))
        .await?;

    Ok(Json(ApiResponse::success(PhotoViewUrlResponseDto { url })))
}
