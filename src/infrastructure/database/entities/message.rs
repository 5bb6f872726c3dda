//! Message entity — append-only SMS log

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub direction: String,
    pub to_phone: String,
    pub from_phone: String,
    pub body: String,
    #[sea_orm(nullable, indexed)]
    pub provider_message_id: Option<String>,
    pub delivery_status: String,
    #[sea_orm(nullable)]
    pub error_code: Option<String>,
    #[sea_orm(nullable)]
    pub error_message: Option<String>,
    #[sea_orm(nullable)]
    pub job_id: Option<String>,
    #[sea_orm(nullable)]
    pub provider_id: Option<String>,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
