use crate::entities::gym_entity as gyms;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGymRequest {
    pub gym_name: String,
    pub owner_first_name: String,
    pub owner_last_name: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    #[serde(default)]
    pub promo_code_offers: bool,
    pub promo_code: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateGymRequest {
    pub gym_name: Option<String>,
    pub owner_first_name: Option<String>,
    pub owner_last_name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub promo_code_offers: Option<bool>,
    pub promo_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StripeCallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GymResponse {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub gym_name: String,
    pub owner_first_name: String,
    pub owner_last_name: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub promo_code_offers: bool,
    pub promo_code: Option<String>,
    pub stripe_connected: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<gyms::Model> for GymResponse {
    fn from(gym: gyms::Model) -> Self {
        Self {
            id: gym.id,
            admin_id: gym.admin_id,
            gym_name: gym.gym_name,
            owner_first_name: gym.owner_first_name,
            owner_last_name: gym.owner_last_name,
            address: gym.address,
            phone_number: gym.phone_number,
            email: gym.email,
            promo_code_offers: gym.promo_code_offers,
            promo_code: gym.promo_code,
            stripe_connected: gym.stripe_account_id.is_some(),
            created_at: gym.created_at,
            updated_at: gym.updated_at,
        }
    }
}
