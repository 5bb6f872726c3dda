//! DTOs for the customer funnel routes (spec.md §4.1).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::offer::Offer;
use crate::domain::provider::Provider;
use crate::domain::session::model::{ServiceType, Urgency};
use crate::domain::session::Session;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartSessionRequest {
    pub utm_params: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionDto {
    pub id: String,
    pub status: String,
    pub step_reached: i32,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_in_service_area: Option<bool>,
    pub service_type: Option<ServiceType>,
    pub urgency: Option<Urgency>,
    pub description: Option<String>,
    pub deposit_amount_cents: i64,
    pub deposit_amount_display: String,
    pub payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SessionDto {
    pub fn from_domain(s: &Session) -> Self {
        Self {
            id: s.id.clone(),
            status: s.status.as_str().to_string(),
            step_reached: s.step_reached,
            customer_name: s.customer.name.clone(),
            customer_phone: s.customer.phone.clone(),
            customer_email: s.customer.email.clone(),
            address: s.location.address.clone(),
            city: s.location.city.clone(),
            latitude: s.location.latitude,
            longitude: s.location.longitude,
            is_in_service_area: s.location.is_in_service_area,
            service_type: s.service.service_type,
            urgency: s.service.urgency,
            description: s.service.description.clone(),
            deposit_amount_cents: s.service.deposit_amount.0,
            deposit_amount_display: s.service.deposit_amount.to_string(),
            payment_intent_id: s.payment_intent_id.clone(),
            created_at: s.created_at,
            updated_at: s.updated_at,
            completed_at: s.completed_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationMethod {
    Address,
    Pin,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ValidateLocationRequest {
    #[validate(length(min = 1, message = "customer_name is required"))]
    pub customer_name: String,
    #[validate(length(min = 1, message = "customer_phone is required"))]
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub location_method: LocationMethod,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SelectServiceRequest {
    pub service_type: ServiceType,
    pub urgency: Urgency,
    pub description: Option<String>,
    pub car_make: Option<String>,
    pub car_model: Option<String>,
    pub car_year: Option<String>,
    #[serde(default)]
    pub direct_pay: bool,
}

#[derive(Debug, Serialize)]
pub struct PaymentIntentResponseDto {
    pub client_secret: String,
    pub session: SessionDto,
}

#[derive(Debug, Serialize)]
pub struct CompleteResponseDto {
    pub session: SessionDto,
    pub job_id: String,
}

#[derive(Debug, Serialize)]
pub struct OfferDto {
    pub id: String,
    pub provider_name: String,
    pub provider_phone: String,
    pub status: String,
    pub quoted_price_cents: Option<i64>,
    pub quoted_price_display: Option<String>,
    pub sent_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl OfferDto {
    pub fn from_domain(offer: &Offer, provider: Option<&Provider>) -> Self {
        Self {
            id: offer.id.clone(),
            provider_name: provider.map(|p| p.display_name.clone()).unwrap_or_default(),
            provider_phone: provider.map(|p| p.phone.clone()).unwrap_or_default(),
            status: offer.status.as_str().to_string(),
            quoted_price_cents: offer.quoted_price.map(|c| c.0),
            quoted_price_display: offer.quoted_price.map(|c| c.to_string()),
            sent_at: offer.sent_at,
            responded_at: offer.responded_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PhotoUploadResponseDto {
    pub id: String,
    pub content_type: String,
    pub byte_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct PhotoViewUrlQuery {
    pub expires_in: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PhotoViewUrlResponseDto {
    pub url: String,
}
