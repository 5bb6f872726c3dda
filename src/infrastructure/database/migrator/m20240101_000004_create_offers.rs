//! Create offers table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Offers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Offers::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Offers::SessionId).string())
                    .col(ColumnDef::new(Offers::JobId).string())
                    .col(ColumnDef::new(Offers::ProviderId).string().not_null())
                    .col(ColumnDef::new(Offers::WaveNumber).integer().not_null())
                    .col(ColumnDef::new(Offers::Status).string().not_null())
                    .col(ColumnDef::new(Offers::QuotedPrice).big_integer())
                    .col(ColumnDef::new(Offers::ProviderMessageId).string())
                    .col(
                        ColumnDef::new(Offers::SentAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Offers::RespondedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Offers::ExpiresAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_offers_session_id")
                    .table(Offers::Table)
                    .col(Offers::SessionId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_offers_job_id")
                    .table(Offers::Table)
                    .col(Offers::JobId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_offers_provider_id")
                    .table(Offers::Table)
                    .col(Offers::ProviderId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Offers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Offers {
    Table,
    Id,
    SessionId,
    JobId,
    ProviderId,
    WaveNumber,
    Status,
    QuotedPrice,
    ProviderMessageId,
    SentAt,
    RespondedAt,
    ExpiresAt,
}
