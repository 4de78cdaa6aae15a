use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "gyms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// 一个管理员只能拥有一个健身房 (unique index)
    #[sea_orm(unique)]
    pub admin_id: Uuid,
    pub gym_name: String,
    pub owner_first_name: String,
    pub owner_last_name: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub promo_code_offers: bool,
    pub promo_code: Option<String>,
    pub stripe_account_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
