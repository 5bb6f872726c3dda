//! Create jobs table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Jobs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Jobs::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Jobs::SessionId).string().not_null())
                    .col(ColumnDef::new(Jobs::CustomerName).string().not_null())
                    .col(ColumnDef::new(Jobs::CustomerPhone).string().not_null())
                    .col(ColumnDef::new(Jobs::Address).string())
                    .col(ColumnDef::new(Jobs::City).string())
                    .col(ColumnDef::new(Jobs::Latitude).double())
                    .col(ColumnDef::new(Jobs::Longitude).double())
                    .col(ColumnDef::new(Jobs::ServiceType).string().not_null())
                    .col(ColumnDef::new(Jobs::Urgency).string().not_null())
                    .col(ColumnDef::new(Jobs::Description).text())
                    .col(ColumnDef::new(Jobs::VehicleMake).string())
                    .col(ColumnDef::new(Jobs::VehicleModel).string())
                    .col(ColumnDef::new(Jobs::VehicleYear).string())
                    .col(ColumnDef::new(Jobs::DepositAmount).big_integer().not_null())
                    .col(ColumnDef::new(Jobs::PaymentIntentId).string().not_null())
                    .col(ColumnDef::new(Jobs::PaymentStatus).string().not_null())
                    .col(ColumnDef::new(Jobs::RefundAmount).big_integer())
                    .col(ColumnDef::new(Jobs::RefundId).string())
                    .col(ColumnDef::new(Jobs::AssignedProviderId).string())
                    .col(ColumnDef::new(Jobs::AssignedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Jobs::Status).string().not_null())
                    .col(
                        ColumnDef::new(Jobs::CurrentWave)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Jobs::DispatchStartedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Jobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Jobs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Jobs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Jobs {
    Table,
    Id,
    SessionId,
    CustomerName,
    CustomerPhone,
    Address,
    City,
    Latitude,
    Longitude,
    ServiceType,
    Urgency,
    Description,
    VehicleMake,
    VehicleModel,
    VehicleYear,
    DepositAmount,
    PaymentIntentId,
    PaymentStatus,
    RefundAmount,
    RefundId,
    AssignedProviderId,
    AssignedAt,
    Status,
    CurrentWave,
    DispatchStartedAt,
    CreatedAt,
    UpdatedAt,
}
