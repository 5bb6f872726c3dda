//! Use-case orchestration: the Session Engine (C7), Quote Dispatcher (C8),
//! Inbound Command Parser (C9), Job Factory (C4.4), and Audit Log (C10).

pub mod services;

pub use services::audit_service::AuditService;
pub use services::command_parser::{Command, CommandParser};
pub use services::job_factory::JobFactory;
pub use services::quote_dispatcher::QuoteDispatcher;
pub use services::session_engine::SessionEngine;
