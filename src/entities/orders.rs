use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 货到付款订单, 不关联任何 Stripe 对象
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub gym_id: Uuid,
    pub product_id: Option<Uuid>,
    pub plan_name: Option<String>,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub phone_number: String,
    pub country: String,
    pub pin_code: String,
    pub payment_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
