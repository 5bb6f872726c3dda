//! Session entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub status: String,
    pub step_reached: i32,

    pub customer_name: String,
    pub customer_phone: String,
    #[sea_orm(nullable)]
    pub customer_email: Option<String>,

    #[sea_orm(nullable)]
    pub address: Option<String>,
    #[sea_orm(nullable)]
    pub city: Option<String>,
    #[sea_orm(nullable)]
    pub latitude: Option<f64>,
    #[sea_orm(nullable)]
    pub longitude: Option<f64>,
    #[sea_orm(nullable)]
    pub is_in_service_area: Option<bool>,

    #[sea_orm(nullable)]
    pub service_type: Option<String>,
    #[sea_orm(nullable)]
    pub urgency: Option<String>,
    #[sea_orm(nullable)]
    pub description: Option<String>,
    pub deposit_amount: i64,

    #[sea_orm(nullable)]
    pub vehicle_make: Option<String>,
    #[sea_orm(nullable)]
    pub vehicle_model: Option<String>,
    #[sea_orm(nullable)]
    pub vehicle_year: Option<String>,

    #[sea_orm(nullable)]
    pub payment_intent_id: Option<String>,

    #[sea_orm(nullable)]
    pub user_agent: Option<String>,
    #[sea_orm(nullable)]
    pub ip: Option<String>,
    #[sea_orm(nullable)]
    pub referrer: Option<String>,
    #[sea_orm(nullable)]
    pub utm_params: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    #[sea_orm(nullable)]
    pub completed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
