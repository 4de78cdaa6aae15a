use crate::entities::{PlanInterval, product_entity as products, subscription_plan_entity as plans};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub product_type: String,
    pub description: String,
    pub reviews: Option<String>,
    #[serde(default)]
    pub stock: i32,
    /// 以分为单位
    pub price_cents: i64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub product_type: Option<String>,
    pub description: Option<String>,
    pub reviews: Option<String>,
    pub stock: Option<i32>,
    pub price_cents: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub name: String,
    pub product_type: String,
    pub description: String,
    pub reviews: Option<String>,
    pub stock: i32,
    pub price_cents: i64,
    pub stripe_product_id: Option<String>,
    pub stripe_price_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<products::Model> for ProductResponse {
    fn from(p: products::Model) -> Self {
        Self {
            id: p.id,
            gym_id: p.gym_id,
            name: p.name,
            product_type: p.product_type,
            description: p.description,
            reviews: p.reviews,
            stock: p.stock,
            price_cents: p.price_cents,
            stripe_product_id: p.stripe_product_id,
            stripe_price_id: p.stripe_price_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePlanRequest {
    pub plan_name: String,
    pub description: String,
    pub price_cents: i64,
    pub interval: PlanInterval,
    #[serde(default = "default_interval_count")]
    pub interval_count: i32,
}

fn default_interval_count() -> i32 {
    1
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdatePlanRequest {
    pub plan_name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub interval: Option<PlanInterval>,
    pub interval_count: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlanResponse {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub plan_name: String,
    pub description: String,
    pub price_cents: i64,
    pub interval: PlanInterval,
    pub interval_count: i32,
    pub stripe_product_id: Option<String>,
    pub stripe_price_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<plans::Model> for PlanResponse {
    fn from(p: plans::Model) -> Self {
        Self {
            id: p.id,
            gym_id: p.gym_id,
            plan_name: p.plan_name,
            description: p.description,
            price_cents: p.price_cents,
            interval: p.interval,
            interval_count: p.interval_count,
            stripe_product_id: p.stripe_product_id,
            stripe_price_id: p.stripe_price_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
