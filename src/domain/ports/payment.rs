//! Payment Adapter port (C4, spec.md §4.8).

use async_trait::async_trait;

use crate::domain::error::DomainResult;
use crate::shared::Cents;

#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub client_secret: String,
    pub intent_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentWebhookEvent {
    PaymentSucceeded { intent_id: String },
    PaymentFailed { intent_id: String },
    RefundCreated { intent_id: String, refund_id: String },
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(&self, session_id: &str, amount: Cents) -> DomainResult<PaymentIntent>;
    async fn confirm(&self, intent_id: &str) -> DomainResult<bool>;
    async fn refund(
        &self,
        payment_intent_id: &str,
        amount: Option<Cents>,
        reason: &str,
    ) -> DomainResult<String>;

    /// Verifies the webhook signature and parses the event. Returns
    /// `DomainError::ExternalPermanent` on signature failure (spec.md §7).
    fn verify_and_parse_webhook(
        &self,
        body: &[u8],
        signature_header: &str,
    ) -> DomainResult<PaymentWebhookEvent>;
}
