use crate::entities::{PlanStatus, customer_entity as customers};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub gym_id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub plan_name: String,
    pub plan_status: PlanStatus,
    pub plan_start_date: Option<DateTime<Utc>>,
    pub plan_end_date: Option<DateTime<Utc>>,
    pub stripe_subscription_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<customers::Model> for CustomerResponse {
    fn from(c: customers::Model) -> Self {
        Self {
            id: c.id,
            user_id: c.user_id,
            gym_id: c.gym_id,
            username: c.username,
            first_name: c.first_name,
            last_name: c.last_name,
            plan_name: c.plan_name,
            plan_status: c.plan_status,
            plan_start_date: c.plan_start_date,
            plan_end_date: c.plan_end_date,
            stripe_subscription_id: c.stripe_subscription_id,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// 管理员手工登记会员 (不关联 Stripe 订阅)
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    pub user_id: Option<Uuid>,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub plan_name: String,
    pub plan_status: Option<PlanStatus>,
    pub plan_start_date: Option<DateTime<Utc>>,
    pub plan_end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateCustomerRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub plan_name: Option<String>,
    pub plan_status: Option<PlanStatus>,
    pub plan_start_date: Option<DateTime<Utc>>,
    pub plan_end_date: Option<DateTime<Utc>>,
}
