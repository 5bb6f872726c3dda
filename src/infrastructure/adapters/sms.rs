//! SMS Gateway Adapter (C3, spec.md §4.3 / §6) — Twilio-shaped outbound
//! REST call plus the TwiML reply document for inbound webhooks.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::SmsConfig;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::ports::sms::{OutboundSms, SmsGateway};

pub struct TwilioLikeSmsGateway {
    client: reqwest::Client,
    config: SmsConfig,
}

impl TwilioLikeSmsGateway {
    pub fn new(config: SmsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl SmsGateway for TwilioLikeSmsGateway {
    async fn send(&self, message: OutboundSms) -> DomainResult<String> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base_url, self.config.account
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.account, Some(&self.config.token))
            .form(&[
                ("To", message.to.as_str()),
                ("From", message.from.as_str()),
                ("Body", message.body.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DomainError::ExternalTransient {
                service: "sms_gateway",
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            warn!(status = %response.status(), to = %message.to, "sms send failed");
            return Err(DomainError::ExternalTransient {
                service: "sms_gateway",
                message: format!("gateway returned {}", response.status()),
            }
            .into());
        }

        let body: serde_json::Value = response.json().await.map_err(|e| DomainError::ExternalTransient {
            service: "sms_gateway",
            message: e.to_string(),
        })?;

        let sid = body
            .get("sid")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        debug!(sid, to = %message.to, "sms sent");
        Ok(sid)
    }
}

/// Wraps a reply body in the TwiML document the gateway webhook expects
/// (spec.md §6 — `content-type: application/xml`).
pub fn twiml_response(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        xml_escape(body)
    )
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twiml_wraps_the_body_and_escapes_entities() {
        let xml = twiml_response("Reply `Y $75` or `N` <now>");
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("&lt;now&gt;"));
        assert!(xml.ends_with("</Response>"));
    }
}
