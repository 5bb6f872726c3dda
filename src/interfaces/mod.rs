//! Delivery mechanisms. The customer funnel, the admin console, and the
//! inbound SMS/payment webhooks are all thin adapters over the application
//! layer — no business logic lives here (C11, spec.md §6).

pub mod http;
