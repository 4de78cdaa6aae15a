use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::middlewares::AuthUser;
use crate::models::*;
use crate::utils::{validate_length, validate_phone};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait, Set};
use uuid::Uuid;

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
}

impl UserService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn get_user(&self, user_id: Uuid) -> AppResult<UserResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(UserResponse::from(user))
    }

    /// 更新个人资料
    pub async fn update_user(
        &self,
        user_id: Uuid,
        request: UpdateUserRequest,
    ) -> AppResult<UserResponse> {
        // 检查是否有需要更新的字段
        if request.first_name.is_none()
            && request.last_name.is_none()
            && request.phone_number.is_none()
            && request.country.is_none()
        {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let mut model = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?
            .into_active_model();

        if let Some(first_name) = request.first_name {
            validate_length("first_name", &first_name, 50)?;
            model.first_name = Set(first_name.trim().to_string());
        }
        if let Some(last_name) = request.last_name {
            validate_length("last_name", &last_name, 50)?;
            model.last_name = Set(last_name.trim().to_string());
        }
        if let Some(phone) = request.phone_number {
            validate_phone(&phone)?;
            model.phone_number = Set(Some(phone));
        }
        if let Some(country) = request.country {
            model.country = Set(Some(country));
        }
        model.updated_at = Set(Utc::now());

        let updated = model.update(&self.pool).await?;
        Ok(UserResponse::from(updated))
    }

    /// 硬删除用户 (仅超级管理员); 其支付记录的 user_id 置空
    pub async fn delete_user(&self, actor: &AuthUser, user_id: Uuid) -> AppResult<()> {
        actor.require_superuser()?;

        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        user.delete(&self.pool).await?;

        log::info!("User {user_id} deleted by {}", actor.id);
        Ok(())
    }
}
