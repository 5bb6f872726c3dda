pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_sessions;
mod m20240101_000002_create_providers;
mod m20240101_000003_create_jobs;
mod m20240101_000004_create_offers;
mod m20240101_000005_create_messages;
mod m20240101_000006_create_photos;
mod m20240101_000007_create_audit_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_sessions::Migration),
            Box::new(m20240101_000002_create_providers::Migration),
            Box::new(m20240101_000003_create_jobs::Migration),
            Box::new(m20240101_000004_create_offers::Migration),
            Box::new(m20240101_000005_create_messages::Migration),
            Box::new(m20240101_000006_create_photos::Migration),
            Box::new(m20240101_000007_create_audit_events::Migration),
        ]
    }
}
