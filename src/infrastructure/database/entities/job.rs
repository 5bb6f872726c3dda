//! Job entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub session_id: String,

    pub customer_name: String,
    pub customer_phone: String,
    #[sea_orm(nullable)]
    pub address: Option<String>,
    #[sea_orm(nullable)]
    pub city: Option<String>,
    #[sea_orm(nullable)]
    pub latitude: Option<f64>,
    #[sea_orm(nullable)]
    pub longitude: Option<f64>,

    pub service_type: String,
    pub urgency: String,
    #[sea_orm(nullable)]
    pub description: Option<String>,

    #[sea_orm(nullable)]
    pub vehicle_make: Option<String>,
    #[sea_orm(nullable)]
    pub vehicle_model: Option<String>,
    #[sea_orm(nullable)]
    pub vehicle_year: Option<String>,

    pub deposit_amount: i64,
    pub payment_intent_id: String,
    pub payment_status: String,
    #[sea_orm(nullable)]
    pub refund_amount: Option<i64>,
    #[sea_orm(nullable)]
    pub refund_id: Option<String>,

    #[sea_orm(nullable, indexed)]
    pub assigned_provider_id: Option<String>,
    #[sea_orm(nullable)]
    pub assigned_at: Option<DateTimeUtc>,

    pub status: String,
    pub current_wave: i32,
    #[sea_orm(nullable)]
    pub dispatch_started_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
