//! Provider entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "providers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub display_name: String,
    #[sea_orm(unique)]
    pub phone: String,
    pub home_city: String,

    pub cap_home_lockout: bool,
    pub cap_car_lockout: bool,
    pub cap_rekey: bool,
    pub cap_smart_lock: bool,

    pub is_active: bool,
    pub is_available: bool,

    #[sea_orm(nullable)]
    pub notes: Option<String>,

    pub onboarded_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
