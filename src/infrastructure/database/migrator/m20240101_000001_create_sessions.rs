//! Create sessions table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sessions::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Sessions::Status).string().not_null())
                    .col(ColumnDef::new(Sessions::StepReached).integer().not_null())
                    .col(ColumnDef::new(Sessions::CustomerName).string().not_null())
                    .col(ColumnDef::new(Sessions::CustomerPhone).string().not_null())
                    .col(ColumnDef::new(Sessions::CustomerEmail).string())
                    .col(ColumnDef::new(Sessions::Address).string())
                    .col(ColumnDef::new(Sessions::City).string())
                    .col(ColumnDef::new(Sessions::Latitude).double())
                    .col(ColumnDef::new(Sessions::Longitude).double())
                    .col(ColumnDef::new(Sessions::IsInServiceArea).boolean())
                    .col(ColumnDef::new(Sessions::ServiceType).string())
                    .col(ColumnDef::new(Sessions::Urgency).string())
                    .col(ColumnDef::new(Sessions::Description).text())
                    .col(
                        ColumnDef::new(Sessions::DepositAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Sessions::VehicleMake).string())
                    .col(ColumnDef::new(Sessions::VehicleModel).string())
                    .col(ColumnDef::new(Sessions::VehicleYear).string())
                    .col(ColumnDef::new(Sessions::PaymentIntentId).string())
                    .col(ColumnDef::new(Sessions::UserAgent).string())
                    .col(ColumnDef::new(Sessions::Ip).string())
                    .col(ColumnDef::new(Sessions::Referrer).string())
                    .col(ColumnDef::new(Sessions::UtmParams).string())
                    .col(
                        ColumnDef::new(Sessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sessions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Sessions::CompletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Sessions {
    Table,
    Id,
    Status,
    StepReached,
    CustomerName,
    CustomerPhone,
    CustomerEmail,
    Address,
    City,
    Latitude,
    Longitude,
    IsInServiceArea,
    ServiceType,
    Urgency,
    Description,
    DepositAmount,
    VehicleMake,
    VehicleModel,
    VehicleYear,
    PaymentIntentId,
    UserAgent,
    Ip,
    Referrer,
    UtmParams,
    CreatedAt,
    UpdatedAt,
    CompletedAt,
}
