use crate::entities::mentor_entity as mentors;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateMentorRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub expertise: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateMentorRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub expertise: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MentorResponse {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub expertise: String,
    pub email: String,
    pub phone_number: String,
    pub is_logged_in: bool,
    pub created_at: DateTime<Utc>,
}

impl From<mentors::Model> for MentorResponse {
    fn from(m: mentors::Model) -> Self {
        Self {
            id: m.id,
            gym_id: m.gym_id,
            username: m.username,
            first_name: m.first_name,
            last_name: m.last_name,
            expertise: m.expertise,
            email: m.email,
            phone_number: m.phone_number,
            is_logged_in: m.is_logged_in,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MentorLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MentorAuthResponse {
    pub mentor: MentorResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}
