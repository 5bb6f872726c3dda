//! SMS Gateway Adapter port (C3, spec.md §4.? / §6).

use async_trait::async_trait;

use crate::domain::error::DomainResult;

#[derive(Debug, Clone)]
pub struct OutboundSms {
    pub to: String,
    pub from: String,
    pub body: String,
}

#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Sends one SMS, returning the gateway's message id. Callers are
    /// responsible for logging the Message row and tolerating per-recipient
    /// failure during fan-out (spec.md §7).
    async fn send(&self, message: OutboundSms) -> DomainResult<String>;
}
