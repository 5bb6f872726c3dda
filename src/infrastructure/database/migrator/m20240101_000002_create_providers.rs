//! Create providers table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Providers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Providers::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Providers::DisplayName).string().not_null())
                    .col(
                        ColumnDef::new(Providers::Phone)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Providers::HomeCity).string().not_null())
                    .col(
                        ColumnDef::new(Providers::CapHomeLockout)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Providers::CapCarLockout)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Providers::CapRekey)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Providers::CapSmartLock)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Providers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Providers::IsAvailable)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Providers::Notes).text())
                    .col(
                        ColumnDef::new(Providers::OnboardedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Providers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Providers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Providers {
    Table,
    Id,
    DisplayName,
    Phone,
    HomeCity,
    CapHomeLockout,
    CapCarLockout,
    CapRekey,
    CapSmartLock,
    IsActive,
    IsAvailable,
    Notes,
    OnboardedAt,
    UpdatedAt,
}
