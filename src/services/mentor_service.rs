use super::gym_service::{find_gym, find_owned_gym};
use crate::entities::mentor_entity as mentors;
use crate::error::{AppError, AppResult};
use crate::middlewares::AuthUser;
use crate::models::*;
use crate::utils::{
    JwtService, hash_password, validate_email, validate_length, validate_password, validate_phone,
    verify_password,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

/// 教练管理与教练登录
///
/// 教练不是用户, 登录后拿到的是 `mentor_access` 令牌, 只用于教练自己的接口
#[derive(Clone)]
pub struct MentorService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl MentorService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    pub async fn create_mentor(
        &self,
        actor: &AuthUser,
        gym_id: Uuid,
        request: CreateMentorRequest,
    ) -> AppResult<MentorResponse> {
        let gym = find_owned_gym(&self.pool, actor, gym_id).await?;

        validate_length("username", &request.username, 50)?;
        validate_length("first_name", &request.first_name, 50)?;
        validate_length("last_name", &request.last_name, 50)?;
        validate_length("expertise", &request.expertise, 50)?;
        validate_email(&request.email)?;
        validate_phone(&request.phone_number)?;
        validate_password(&request.password, &request.username)?;

        let taken = mentors::Entity::find()
            .filter(mentors::Column::Username.eq(request.username.clone()))
            .one(&self.pool)
            .await?;
        if taken.is_some() {
            return Err(AppError::ValidationError("Username already registered".to_string()));
        }

        let password_hash = hash_password(&request.password)?;
        let now = Utc::now();
        let mentor = mentors::ActiveModel {
            id: Set(Uuid::new_v4()),
            gym_id: Set(gym.id),
            admin_id: Set(gym.admin_id),
            username: Set(request.username),
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            expertise: Set(request.expertise),
            email: Set(request.email),
            phone_number: Set(request.phone_number),
            password_hash: Set(password_hash),
            is_logged_in: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await
        .map_err(|e| {
            if matches!(
                e.sql_err(),
                Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
            ) {
                AppError::ValidationError("Username already registered".to_string())
            } else {
                AppError::DatabaseError(e)
            }
        })?;

        log::info!("Mentor {} added to gym {}", mentor.username, mentor.gym_id);

        Ok(MentorResponse::from(mentor))
    }

    pub async fn list_mentors(&self, gym_id: Uuid) -> AppResult<Vec<MentorResponse>> {
        find_gym(&self.pool, gym_id).await?;
        let rows = mentors::Entity::find()
            .filter(mentors::Column::GymId.eq(gym_id))
            .order_by_asc(mentors::Column::LastName)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(MentorResponse::from).collect())
    }

    async fn find_mentor(&self, gym_id: Uuid, mentor_id: Uuid) -> AppResult<mentors::Model> {
        mentors::Entity::find_by_id(mentor_id)
            .filter(mentors::Column::GymId.eq(gym_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Mentor not found".to_string()))
    }

    pub async fn get_mentor(&self, gym_id: Uuid, mentor_id: Uuid) -> AppResult<MentorResponse> {
        Ok(MentorResponse::from(self.find_mentor(gym_id, mentor_id).await?))
    }

    pub async fn update_mentor(
        &self,
        actor: &AuthUser,
        gym_id: Uuid,
        mentor_id: Uuid,
        request: UpdateMentorRequest,
    ) -> AppResult<MentorResponse> {
        find_owned_gym(&self.pool, actor, gym_id).await?;
        let mentor = self.find_mentor(gym_id, mentor_id).await?;
        if let Some(password) = &request.password {
            validate_password(password, &mentor.username)?;
        }
        let mut model = mentor.into_active_model();

        if let Some(v) = request.first_name {
            validate_length("first_name", &v, 50)?;
            model.first_name = Set(v);
        }
        if let Some(v) = request.last_name {
            validate_length("last_name", &v, 50)?;
            model.last_name = Set(v);
        }
        if let Some(v) = request.expertise {
            validate_length("expertise", &v, 50)?;
            model.expertise = Set(v);
        }
        if let Some(v) = request.email {
            validate_email(&v)?;
            model.email = Set(v);
        }
        if let Some(v) = request.phone_number {
            validate_phone(&v)?;
            model.phone_number = Set(v);
        }
        if let Some(v) = request.password {
            model.password_hash = Set(hash_password(&v)?);
        }
        model.updated_at = Set(Utc::now());

        Ok(MentorResponse::from(model.update(&self.pool).await?))
    }

    pub async fn delete_mentor(&self, actor: &AuthUser, gym_id: Uuid, mentor_id: Uuid) -> AppResult<()> {
        find_owned_gym(&self.pool, actor, gym_id).await?;
        self.find_mentor(gym_id, mentor_id)
            .await?
            .delete(&self.pool)
            .await?;
        Ok(())
    }

    // ---------------------------------------------------------------- auth

    pub async fn login(&self, request: MentorLoginRequest) -> AppResult<MentorAuthResponse> {
        let mentor = mentors::Entity::find()
            .filter(mentors::Column::Username.eq(request.username.trim()))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid credentials".to_string()))?;

        if !verify_password(&request.password, &mentor.password_hash)? {
            return Err(AppError::AuthError("Invalid credentials".to_string()));
        }

        let mentor = self.set_logged_in(mentor, true).await?;
        log::info!("Mentor {} logged in", mentor.id);
        self.issue_tokens(mentor)
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<MentorAuthResponse> {
        let claims = self.jwt_service.verify_mentor_refresh_token(refresh_token)?;
        let mentor = mentors::Entity::find_by_id(claims.user_id()?)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Mentor no longer exists".to_string()))?;

        self.issue_tokens(mentor)
    }

    /// 登出: 校验教练 access token 后清除登录标记
    pub async fn logout(&self, access_token: &str) -> AppResult<()> {
        let claims = self.jwt_service.verify_mentor_access_token(access_token)?;
        let mentor = mentors::Entity::find_by_id(claims.user_id()?)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Mentor not found".to_string()))?;

        self.set_logged_in(mentor, false).await?;
        Ok(())
    }

    async fn set_logged_in(&self, mentor: mentors::Model, logged_in: bool) -> AppResult<mentors::Model> {
        let mut model = mentor.into_active_model();
        model.is_logged_in = Set(logged_in);
        model.updated_at = Set(Utc::now());
        Ok(model.update(&self.pool).await?)
    }

    fn issue_tokens(&self, mentor: mentors::Model) -> AppResult<MentorAuthResponse> {
        let access_token = self.jwt_service.generate_mentor_access_token(&mentor)?;
        let refresh_token = self.jwt_service.generate_mentor_refresh_token(&mentor)?;

        Ok(MentorAuthResponse {
            mentor: MentorResponse::from(mentor),
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }
}
