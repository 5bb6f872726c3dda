//! Inbound Command Parser (C9, spec.md §4.3) — maps a normalized SMS body
//! to a typed command and routes it to the Quote Dispatcher or Provider
//! self-service actions.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use uuid::Uuid;

use crate::application::services::audit_service::AuditService;
use crate::application::services::quote_dispatcher::QuoteDispatcher;
use crate::domain::audit::ActorType;
use crate::domain::error::DomainResult;
use crate::domain::message::{Message, MessageRepository};
use crate::domain::provider::{Provider, ProviderRepository};
use crate::shared::{Cents, Phone};

static PRICE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$?\s*(\d+(?:\.\d{2})?)").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Accept(Option<Cents>),
    Decline,
    SetAvailable,
    SetUnavailable,
    Deactivate,
    Help,
    Unknown,
}

const HELP_TEXT: &str =
    "Reply Y $<price> to quote a job, N to decline, AVAILABLE/UNAVAILABLE to toggle status, or STOP to opt out.";

fn parse_command(normalized: &str, original: &str) -> Command {
    match normalized {
        "HELP" => Command::Help,
        "AVAILABLE" => Command::SetAvailable,
        "UNAVAILABLE" => Command::SetUnavailable,
        "STOP" => Command::Deactivate,
        "N" | "NO" => Command::Decline,
        _ if normalized == "Y" || normalized.starts_with('Y') || normalized == "YES" || normalized.starts_with("YES") => {
            match PRICE_RE.captures(original) {
                Some(caps) => match Cents::parse_dollars(&caps[1]) {
                    Some(price) => Command::Accept(Some(price)),
                    None => Command::Unknown,
                },
                None => Command::Accept(None),
            }
        }
        _ => Command::Unknown,
    }
}

pub struct CommandParser {
    providers: Arc<dyn ProviderRepository>,
    messages: Arc<dyn MessageRepository>,
    dispatcher: Arc<QuoteDispatcher>,
    audit: Arc<AuditService>,
}

impl CommandParser {
    pub fn new(
        providers: Arc<dyn ProviderRepository>,
        messages: Arc<dyn MessageRepository>,
        dispatcher: Arc<QuoteDispatcher>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            providers,
            messages,
            dispatcher,
            audit,
        }
    }

    /// Handles one inbound webhook delivery. Returns the reply body to wrap
    /// in TwiML. Idempotent on `provider_message_id`: a redelivered sid
    /// short-circuits without re-dispatching (spec.md §5).
    pub async fn handle_inbound(&self, from: &str, to: &str, body: &str, message_sid: &str) -> DomainResult<String> {
        if let Some(existing) = self.messages.find_by_provider_message_id(message_sid).await? {
            return Ok(format!("Already processed (message {}).", existing.id));
        }

        let inbound = Message::new_inbound(
            Uuid::new_v4().to_string(),
            from.to_string(),
            to.to_string(),
            body.to_string(),
            message_sid.to_string(),
        );
        self.messages.insert(inbound).await?;

        let phone = Phone::normalize(from);
        let provider = self.providers.find_by_phone(phone.as_str()).await?;

        let Some(provider) = provider else {
            let normalized = body.trim().to_ascii_uppercase();
            if normalized == "STOP" {
                return Ok("You're unsubscribed. Reply START to resume.".to_string());
            }
            return Ok("Unknown number. Reply HELP for assistance.".to_string());
        };

        let normalized = body.trim().to_ascii_uppercase();
        let command = parse_command(&normalized, body.trim());

        self.route(&provider, command).await
    }

    async fn route(&self, provider: &Provider, command: Command) -> DomainResult<String> {
        match command {
            Command::Accept(price) => self.dispatcher.handle_accept(provider, price).await,
            Command::Decline => self.dispatcher.handle_decline(provider).await,
            Command::SetAvailable => self.set_availability(provider, true).await,
            Command::SetUnavailable => self.set_availability(provider, false).await,
            Command::Deactivate => self.deactivate(provider).await,
            Command::Help => Ok(HELP_TEXT.to_string()),
            Command::Unknown => Ok(HELP_TEXT.to_string()),
        }
    }

    async fn set_availability(&self, provider: &Provider, available: bool) -> DomainResult<String> {
        let mut updated = provider.clone();
        updated.is_available = available && updated.is_active;
        updated.updated_at = chrono::Utc::now();
        self.providers.update(updated).await?;

        self.audit
            .record(
                "provider",
                &provider.id,
                if available { "provider_set_available" } else { "provider_set_unavailable" },
                ActorType::Provider,
                None,
                json!({ "phone": provider.phone }),
            )
            .await;

        Ok(if available {
            "You're marked available. Reply UNAVAILABLE anytime to pause.".to_string()
        } else {
            "You're marked unavailable. Reply AVAILABLE to resume receiving offers.".to_string()
        })
    }

    async fn deactivate(&self, provider: &Provider) -> DomainResult<String> {
        let mut updated = provider.clone();
        updated.is_active = false;
        updated.is_available = false;
        updated.updated_at = chrono::Utc::now();
        self.providers.update(updated).await?;

        self.audit
            .record(
                "provider",
                &provider.id,
                "provider_deactivated",
                ActorType::Provider,
                None,
                json!({ "phone": provider.phone }),
            )
            .await;

        Ok("You're unsubscribed and won't receive further job offers.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_accept_with_price() {
        assert_eq!(parse_command("Y $75.00", "Y $75.00"), Command::Accept(Some(Cents(7500))));
        assert_eq!(parse_command("YES 75", "YES 75"), Command::Accept(Some(Cents(7500))));
    }

    #[test]
    fn parses_accept_without_price() {
        assert_eq!(parse_command("Y", "Y"), Command::Accept(None));
        assert_eq!(parse_command("YES", "YES"), Command::Accept(None));
    }

    #[test]
    fn parses_decline() {
        assert_eq!(parse_command("N", "N"), Command::Decline);
        assert_eq!(parse_command("NO", "no"), Command::Decline);
    }

    #[test]
    fn parses_availability_toggles_and_stop() {
        assert_eq!(parse_command("AVAILABLE", "available"), Command::SetAvailable);
        assert_eq!(parse_command("UNAVAILABLE", "unavailable"), Command::SetUnavailable);
        assert_eq!(parse_command("STOP", "stop"), Command::Deactivate);
        assert_eq!(parse_command("HELP", "help"), Command::Help);
    }

    #[test]
    fn unrecognized_body_is_unknown() {
        assert_eq!(parse_command("MAYBE LATER", "maybe later"), Command::Unknown);
    }
}
