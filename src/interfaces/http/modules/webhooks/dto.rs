//! DTOs for inbound webhook deliveries (spec.md §6 "HTTP surface
//! (webhooks)"). The SMS gateway posts form-encoded fields in the
//! Twilio-request shape; the payment gateway posts a raw JSON body that is
//! verified by signature before being parsed.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct InboundSmsWebhook {
    #[serde(rename = "MessageSid")]
    pub message_sid: String,
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "To")]
    pub to: String,
    #[serde(rename = "Body")]
    pub body: String,
}
