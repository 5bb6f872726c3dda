//! Create messages table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Messages::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Messages::Direction).string().not_null())
                    .col(ColumnDef::new(Messages::ToPhone).string().not_null())
                    .col(ColumnDef::new(Messages::FromPhone).string().not_null())
                    .col(ColumnDef::new(Messages::Body).text().not_null())
                    .col(ColumnDef::new(Messages::ProviderMessageId).string())
                    .col(
                        ColumnDef::new(Messages::DeliveryStatus)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Messages::ErrorCode).string())
                    .col(ColumnDef::new(Messages::ErrorMessage).text())
                    .col(ColumnDef::new(Messages::JobId).string())
                    .col(ColumnDef::new(Messages::ProviderId).string())
                    .col(
                        ColumnDef::new(Messages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_messages_provider_message_id")
                    .table(Messages::Table)
                    .col(Messages::ProviderMessageId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Messages::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Messages {
    Table,
    Id,
    Direction,
    ToPhone,
    FromPhone,
    Body,
    ProviderMessageId,
    DeliveryStatus,
    ErrorCode,
    ErrorMessage,
    JobId,
    ProviderId,
    CreatedAt,
}
