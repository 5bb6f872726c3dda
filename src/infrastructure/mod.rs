//! External concerns: persistence and the outbound adapters for C2–C6.

pub mod adapters;
pub mod database;

pub use database::{init_database, DatabaseConfig};
pub use database::repositories::SeaOrmRepositoryProvider;
