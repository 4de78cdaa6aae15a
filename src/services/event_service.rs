use super::gym_service::{find_gym, find_owned_gym};
use crate::entities::event_entity as events;
use crate::error::{AppError, AppResult};
use crate::middlewares::AuthUser;
use crate::models::*;
use crate::utils::validate_length;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct EventService {
    pool: DatabaseConnection,
}

impl EventService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn create_event(
        &self,
        actor: &AuthUser,
        gym_id: Uuid,
        request: CreateEventRequest,
    ) -> AppResult<EventResponse> {
        let gym = find_owned_gym(&self.pool, actor, gym_id).await?;

        validate_length("name", &request.name, 255)?;
        validate_length("timing", &request.timing, 50)?;
        validate_length("location", &request.location, 255)?;
        validate_length("description", &request.description, 5000)?;

        let now = Utc::now();
        let event = events::ActiveModel {
            id: Set(Uuid::new_v4()),
            gym_id: Set(gym.id),
            name: Set(request.name),
            date: Set(request.date),
            timing: Set(request.timing),
            location: Set(request.location),
            description: Set(request.description),
            guest_name: Set(request.guest_name.filter(|g| !g.trim().is_empty())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await?;

        Ok(EventResponse::from(event))
    }

    /// 按日期升序
    pub async fn list_events(&self, gym_id: Uuid) -> AppResult<Vec<EventResponse>> {
        find_gym(&self.pool, gym_id).await?;
        let rows = events::Entity::find()
            .filter(events::Column::GymId.eq(gym_id))
            .order_by_asc(events::Column::Date)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(EventResponse::from).collect())
    }

    /// 所有健身房的活动, 无需登录
    pub async fn list_all_events(
        &self,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<EventResponse>> {
        let limit = params.get_limit();
        let total = events::Entity::find().count(&self.pool).await? as i64;
        let rows = events::Entity::find()
            .order_by_asc(events::Column::Date)
            .order_by_asc(events::Column::Name)
            .limit(limit as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(EventResponse::from).collect(),
            params.get_page(),
            limit,
            total,
        ))
    }

    async fn find_event(&self, gym_id: Uuid, event_id: Uuid) -> AppResult<events::Model> {
        events::Entity::find_by_id(event_id)
            .filter(events::Column::GymId.eq(gym_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    pub async fn get_event(&self, gym_id: Uuid, event_id: Uuid) -> AppResult<EventResponse> {
        Ok(EventResponse::from(self.find_event(gym_id, event_id).await?))
    }

    pub async fn update_event(
        &self,
        actor: &AuthUser,
        gym_id: Uuid,
        event_id: Uuid,
        request: UpdateEventRequest,
    ) -> AppResult<EventResponse> {
        find_owned_gym(&self.pool, actor, gym_id).await?;
        let mut model = self.find_event(gym_id, event_id).await?.into_active_model();

        if let Some(v) = request.name {
            validate_length("name", &v, 255)?;
            model.name = Set(v);
        }
        if let Some(v) = request.date {
            model.date = Set(v);
        }
        if let Some(v) = request.timing {
            validate_length("timing", &v, 50)?;
            model.timing = Set(v);
        }
        if let Some(v) = request.location {
            validate_length("location", &v, 255)?;
            model.location = Set(v);
        }
        if let Some(v) = request.description {
            validate_length("description", &v, 5000)?;
            model.description = Set(v);
        }
        if let Some(v) = request.guest_name {
            model.guest_name = Set(Some(v).filter(|g| !g.trim().is_empty()));
        }
        model.updated_at = Set(Utc::now());

        Ok(EventResponse::from(model.update(&self.pool).await?))
    }

    pub async fn delete_event(&self, actor: &AuthUser, gym_id: Uuid, event_id: Uuid) -> AppResult<()> {
        find_owned_gym(&self.pool, actor, gym_id).await?;
        self.find_event(gym_id, event_id)
            .await?
            .delete(&self.pool)
            .await?;
        Ok(())
    }
}
