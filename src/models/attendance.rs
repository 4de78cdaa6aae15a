use crate::entities::attendance_entity as attendance;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct AttendanceRequest {
    pub user_id: Uuid,
    pub gym_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AttendanceQuery {
    pub gym_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AttendanceResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub gym_id: Uuid,
    pub check_in_time: DateTime<Utc>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub checked_in: bool,
}

impl From<attendance::Model> for AttendanceResponse {
    fn from(a: attendance::Model) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            gym_id: a.gym_id,
            check_in_time: a.check_in_time,
            check_out_time: a.check_out_time,
            checked_in: a.checked_in,
        }
    }
}
