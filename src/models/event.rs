use crate::entities::event_entity as events;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub date: NaiveDate,
    pub timing: String,
    pub location: String,
    pub description: String,
    pub guest_name: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub timing: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub guest_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventResponse {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub timing: String,
    pub location: String,
    pub description: String,
    pub guest_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<events::Model> for EventResponse {
    fn from(e: events::Model) -> Self {
        Self {
            id: e.id,
            gym_id: e.gym_id,
            name: e.name,
            date: e.date,
            timing: e.timing,
            location: e.location,
            description: e.description,
            guest_name: e.guest_name,
            created_at: e.created_at,
        }
    }
}
