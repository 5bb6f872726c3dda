pub mod audit_service;
pub mod command_parser;
pub mod job_factory;
pub mod quote_dispatcher;
pub mod session_engine;
