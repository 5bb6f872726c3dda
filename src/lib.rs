//! Locksmith dispatch marketplace: SMS-mediated quote fan-out and job
//! assignment behind a customer funnel and an admin console.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;
