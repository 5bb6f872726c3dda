//! Payment Adapter (C4, spec.md §4.8) — Stripe-shaped intents/refunds plus
//! HMAC-SHA256 signed webhook verification.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, warn};

use crate::config::PaymentConfig;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::ports::payment::{PaymentGateway, PaymentIntent, PaymentWebhookEvent};
use crate::shared::Cents;

type HmacSha256 = Hmac<Sha256>;

pub struct StripeLikePaymentGateway {
    client: reqwest::Client,
    config: PaymentConfig,
}

impl StripeLikePaymentGateway {
    pub fn new(config: PaymentConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeLikePaymentGateway {
    async fn create_intent(&self, session_id: &str, amount: Cents) -> DomainResult<PaymentIntent> {
        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.config.api_base_url))
            .basic_auth(&self.config.secret, Some(""))
            .form(&[
                ("amount", amount.0.to_string()),
                ("currency", "usd".to_string()),
                ("metadata[session_id]", session_id.to_string()),
            ])
            .send()
            .await
            .map_err(|e| DomainError::ExternalTransient {
                service: "payment",
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DomainError::ExternalTransient {
                service: "payment",
                message: format!("create_intent returned {}", response.status()),
            }
            .into());
        }

        let body: serde_json::Value = response.json().await.map_err(|e| DomainError::ExternalTransient {
            service: "payment",
            message: e.to_string(),
        })?;

        let intent_id = body
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| DomainError::ExternalTransient {
                service: "payment",
                message: "missing intent id in response".to_string(),
            })?
            .to_string();
        let client_secret = body
            .get("client_secret")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        debug!(intent_id, "payment intent created");
        Ok(PaymentIntent {
            client_secret,
            intent_id,
        })
    }

    async fn confirm(&self, intent_id: &str) -> DomainResult<bool> {
        let response = self
            .client
            .get(format!(
                "{}/v1/payment_intents/{intent_id}",
                self.config.api_base_url
            ))
            .basic_auth(&self.config.secret, Some(""))
            .send()
            .await
            .map_err(|e| DomainError::ExternalTransient {
                service: "payment",
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DomainError::ExternalTransient {
                service: "payment",
                message: format!("confirm returned {}", response.status()),
            }
            .into());
        }

        let body: serde_json::Value = response.json().await.map_err(|e| DomainError::ExternalTransient {
            service: "payment",
            message: e.to_string(),
        })?;

        Ok(body.get("status").and_then(|v| v.as_str()) == Some("succeeded"))
    }

    async fn refund(
        &self,
        payment_intent_id: &str,
        amount: Option<Cents>,
        reason: &str,
    ) -> DomainResult<String> {
        let mut form = vec![
            ("payment_intent", payment_intent_id.to_string()),
            ("reason", reason.to_string()),
        ];
        if let Some(amount) = amount {
            form.push(("amount", amount.0.to_string()));
        }

        let response = self
            .client
            .post(format!("{}/v1/refunds", self.config.api_base_url))
            .basic_auth(&self.config.secret, Some(""))
            .form(&form)
            .send()
            .await
            .map_err(|e| DomainError::ExternalTransient {
                service: "payment",
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DomainError::ExternalTransient {
                service: "payment",
                message: format!("refund returned {}", response.status()),
            }
            .into());
        }

        let body: serde_json::Value = response.json().await.map_err(|e| DomainError::ExternalTransient {
            service: "payment",
            message: e.to_string(),
        })?;

        Ok(body
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }

    fn verify_and_parse_webhook(
        &self,
        body: &[u8],
        signature_header: &str,
    ) -> DomainResult<PaymentWebhookEvent> {
        let mut mac = HmacSha256::new_from_slice(self.config.webhook_secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(body);
        let expected = hex::encode(mac.finalize().into_bytes());

        if !constant_time_eq(expected.as_bytes(), signature_header.trim().as_bytes()) {
            warn!("payment webhook signature verification failed");
            return Err(DomainError::ExternalPermanent {
                service: "payment",
                message: "signature verification failed".to_string(),
            }
            .into());
        }

        let parsed: serde_json::Value =
            serde_json::from_slice(body).map_err(|e| DomainError::ExternalPermanent {
                service: "payment",
                message: format!("invalid webhook payload: {e}"),
            })?;

        let event_type = parsed
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let intent_id = parsed
            .pointer("/data/object/id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        match event_type {
            "payment_intent.succeeded" => Ok(PaymentWebhookEvent::PaymentSucceeded { intent_id }),
            "payment_intent.payment_failed" => Ok(PaymentWebhookEvent::PaymentFailed { intent_id }),
            "refund.created" => {
                let refund_id = parsed
                    .pointer("/data/object/payment_intent")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                Ok(PaymentWebhookEvent::RefundCreated { intent_id, refund_id })
            }
            other => Err(DomainError::ExternalPermanent {
                service: "payment",
                message: format!("unrecognized webhook event type: {other}"),
            }
            .into()),
        }
    }
}

/// Constant-time comparison so signature verification doesn't leak timing
/// information about how many leading bytes matched.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> StripeLikePaymentGateway {
        StripeLikePaymentGateway::new(PaymentConfig {
            secret: "sk_test".to_string(),
            webhook_secret: "whsec_test".to_string(),
            api_base_url: "https://api.stripe.test".to_string(),
        })
    }

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn rejects_bad_signature() {
        let gw = gateway();
        let body = br#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_1"}}}"#;
        let result = gw.verify_and_parse_webhook(body, "deadbeef");
        assert!(result.is_err());
    }

    #[test]
    fn accepts_valid_signature_and_parses_event() {
        let gw = gateway();
        let body = br#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_1"}}}"#;
        let sig = sign("whsec_test", body);
        let event = gw.verify_and_parse_webhook(body, &sig).unwrap();
        assert_eq!(
            event,
            PaymentWebhookEvent::PaymentSucceeded {
                intent_id: "pi_1".to_string()
            }
        );
    }
}
