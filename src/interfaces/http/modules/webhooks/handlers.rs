//! Inbound webhook handlers (spec.md §6 "HTTP surface (webhooks)").

use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{info, warn};

use crate::domain::error::{AppError, DomainError};
use crate::domain::ports::payment::PaymentWebhookEvent;
use crate::infrastructure::adapters::sms::twiml_response;
use crate::interfaces::http::router::AppState;

use super::dto::InboundSmsWebhook;

/// SMS inbound webhook (spec.md §4.?, §6): provider replies (`Y $price`,
/// `N`, `AVAILABLE`, `STOP`, etc.) land here and are handed to the
/// `CommandParser`. The response is always 200 with a TwiML body — the SMS
/// gateway doesn't retry on anything but a transport-level failure.
pub async fn inbound_sms(State(state): State<AppState>, Form(payload): Form<InboundSmsWebhook>) -> Response {
    let reply = match state
        .command_parser
        .handle_inbound(&payload.from, &payload.to, &payload.body, &payload.message_sid)
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "inbound sms handling failed");
            "Sorry, something went wrong processing your reply.".to_string()
        }
    };

    let xml = twiml_response(&reply);
    ([(axum::http::header::CONTENT_TYPE, "application/xml")], xml).into_response()
}

/// Payment gateway webhook (spec.md §6, §7): raw body + signature header.
/// A bad signature is `ExternalPermanent`, mapped to 400 so the gateway
/// does not retry a delivery that will never verify.
pub async fn inbound_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<StatusCode, AppError> {
    let signature = headers
        .get("x-payment-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(DomainError::Validation {
            field: "x-payment-signature",
            message: "missing signature header".to_string(),
        })?;

    let event = state.payment.verify_and_parse_webhook(&body, signature)?;

    match event {
        PaymentWebhookEvent::PaymentSucceeded { intent_id } => {
            let session = state
                .repos
                .sessions()
                .find_by_payment_intent_id(&intent_id)
                .await?
                .ok_or(DomainError::NotFound {
                    entity: "session",
                    field: "payment_intent_id",
                    value: intent_id,
                })?;
            state.session_engine.complete(&session.id).await?;
        }
        PaymentWebhookEvent::PaymentFailed { intent_id } => {
            let session = state
                .repos
                .sessions()
                .find_by_payment_intent_id(&intent_id)
                .await?
                .ok_or(DomainError::NotFound {
                    entity: "session",
                    field: "payment_intent_id",
                    value: intent_id,
                })?;
            state.session_engine.abandon(&session.id).await?;
        }
        PaymentWebhookEvent::RefundCreated { intent_id, refund_id } => {
            info!(intent_id, refund_id, "payment gateway confirmed refund");
            state
                .audit
                .record_system(
                    "payment_intent",
                    &intent_id,
                    "refund_confirmed",
                    json!({ "refund_id": refund_id }),
                )
                .await;
        }
    }

    Ok(StatusCode::OK)
}
