//! Offer entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "offers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(nullable, indexed)]
    pub session_id: Option<String>,
    #[sea_orm(nullable, indexed)]
    pub job_id: Option<String>,

    #[sea_orm(indexed)]
    pub provider_id: String,
    pub wave_number: i32,
    pub status: String,
    #[sea_orm(nullable)]
    pub quoted_price: Option<i64>,
    #[sea_orm(nullable)]
    pub provider_message_id: Option<String>,

    pub sent_at: DateTimeUtc,
    #[sea_orm(nullable)]
    pub responded_at: Option<DateTimeUtc>,
    #[sea_orm(nullable)]
    pub expires_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
