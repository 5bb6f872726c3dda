//! Create photos table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Photos::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Photos::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Photos::SessionId).string())
                    .col(ColumnDef::new(Photos::JobId).string())
                    .col(ColumnDef::new(Photos::Source).string().not_null())
                    .col(ColumnDef::new(Photos::Bucket).string().not_null())
                    .col(ColumnDef::new(Photos::ContentType).string().not_null())
                    .col(ColumnDef::new(Photos::ByteCount).big_integer().not_null())
                    .col(ColumnDef::new(Photos::MmsMediaId).string())
                    .col(
                        ColumnDef::new(Photos::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Photos::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Photos {
    Table,
    Id,
    SessionId,
    JobId,
    Source,
    Bucket,
    ContentType,
    ByteCount,
    MmsMediaId,
    CreatedAt,
}
