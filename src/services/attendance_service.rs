use super::gym_service::find_gym;
use crate::entities::{attendance_entity as attendance, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::middlewares::AuthUser;
use crate::models::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

/// 签到/签退
///
/// 每个 (user, gym) 同时最多一条 `checked_in = true` 的记录 (部分唯一索引),
/// 签退后的记录保留为历史
#[derive(Clone)]
pub struct AttendanceService {
    pool: DatabaseConnection,
}

impl AttendanceService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 本人或该健身房管理员可以操作
    async fn authorize(&self, actor: &AuthUser, user_id: Uuid, gym_id: Uuid) -> AppResult<()> {
        let gym = find_gym(&self.pool, gym_id).await?;
        if actor.id != user_id && gym.admin_id != actor.id && !actor.is_superuser {
            return Err(AppError::Forbidden);
        }
        users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(())
    }

    async fn open_record(&self, user_id: Uuid, gym_id: Uuid) -> AppResult<Option<attendance::Model>> {
        Ok(attendance::Entity::find()
            .filter(attendance::Column::UserId.eq(user_id))
            .filter(attendance::Column::GymId.eq(gym_id))
            .filter(attendance::Column::CheckedIn.eq(true))
            .one(&self.pool)
            .await?)
    }

    pub async fn check_in(
        &self,
        actor: &AuthUser,
        request: AttendanceRequest,
    ) -> AppResult<AttendanceResponse> {
        self.authorize(actor, request.user_id, request.gym_id).await?;

        if self.open_record(request.user_id, request.gym_id).await?.is_some() {
            return Err(AppError::ValidationError("User is already checked in".to_string()));
        }

        let record = attendance::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(request.user_id),
            gym_id: Set(request.gym_id),
            check_in_time: Set(Utc::now()),
            check_out_time: Set(None),
            checked_in: Set(true),
        }
        .insert(&self.pool)
        .await
        .map_err(|e| {
            // 并发签到由部分唯一索引拦下
            if matches!(
                e.sql_err(),
                Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
            ) {
                AppError::ValidationError("User is already checked in".to_string())
            } else {
                AppError::DatabaseError(e)
            }
        })?;

        log::info!("User {} checked in at gym {}", record.user_id, record.gym_id);
        Ok(AttendanceResponse::from(record))
    }

    pub async fn check_out(
        &self,
        actor: &AuthUser,
        request: AttendanceRequest,
    ) -> AppResult<AttendanceResponse> {
        self.authorize(actor, request.user_id, request.gym_id).await?;

        let record = self
            .open_record(request.user_id, request.gym_id)
            .await?
            .ok_or_else(|| AppError::ValidationError("User is not checked in".to_string()))?;

        let mut model = record.into_active_model();
        model.checked_in = Set(false);
        model.check_out_time = Set(Some(Utc::now()));
        let record = model.update(&self.pool).await?;

        log::info!("User {} checked out of gym {}", record.user_id, record.gym_id);
        Ok(AttendanceResponse::from(record))
    }

    /// 管理员可查看本馆全部记录, 普通用户只能看自己的
    pub async fn list(
        &self,
        actor: &AuthUser,
        query: &AttendanceQuery,
    ) -> AppResult<PaginatedResponse<AttendanceResponse>> {
        let mut select = attendance::Entity::find();

        let is_gym_admin = match query.gym_id {
            Some(gym_id) => {
                let gym = find_gym(&self.pool, gym_id).await?;
                select = select.filter(attendance::Column::GymId.eq(gym_id));
                gym.admin_id == actor.id || actor.is_superuser
            }
            None => actor.is_superuser,
        };

        let user_id = match query.user_id {
            Some(id) if id != actor.id && !is_gym_admin => return Err(AppError::Forbidden),
            Some(id) => Some(id),
            None if is_gym_admin => None,
            None => Some(actor.id),
        };
        if let Some(id) = user_id {
            select = select.filter(attendance::Column::UserId.eq(id));
        }

        let params = PaginationParams::new(query.page, query.page_size);
        let limit = params.get_limit();
        let total = select.clone().count(&self.pool).await? as i64;
        let rows = select
            .order_by(attendance::Column::CheckInTime, Order::Desc)
            .limit(limit as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(AttendanceResponse::from).collect(),
            params.get_page(),
            limit,
            total,
        ))
    }
}
