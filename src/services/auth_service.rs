use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, Set,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// 登录入口对应的身份要求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginScope {
    Member,
    Staff,
    Superuser,
}

/// 当前密码哈希的指纹; 改密后旧的重置令牌随之失效
fn password_fingerprint(password_hash: &str) -> String {
    hex::encode(Sha256::digest(password_hash.as_bytes()))
}

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    /// 注册; `is_staff = true` 即健身房管理员
    pub async fn register(&self, request: RegisterRequest, is_staff: bool) -> AppResult<AuthResponse> {
        // 验证输入参数
        validate_username(&request.username)?;
        validate_email(&request.email)?;
        validate_password(&request.password, &request.username)?;
        validate_length("first_name", &request.first_name, 50)?;
        validate_length("last_name", &request.last_name, 50)?;
        if let Some(phone) = &request.phone_number {
            validate_phone(phone)?;
        }

        let email = request.email.trim().to_lowercase();

        // 检查用户名/邮箱是否已注册
        let existing = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(request.username.clone()))
                    .add(users::Column::Email.eq(email.clone())),
            )
            .one(&self.pool)
            .await?;
        if let Some(existing) = existing {
            let field = if existing.username == request.username {
                "Username"
            } else {
                "Email"
            };
            return Err(AppError::ValidationError(format!("{field} already registered")));
        }

        // 密码哈希
        let password_hash = hash_password(&request.password)?;

        let now = Utc::now();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(request.username),
            email: Set(email),
            password_hash: Set(password_hash),
            first_name: Set(request.first_name.trim().to_string()),
            last_name: Set(request.last_name.trim().to_string()),
            phone_number: Set(request.phone_number),
            country: Set(request.country),
            is_staff: Set(is_staff),
            is_superuser: Set(false),
            is_logged_in: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Registered {} {} ({})",
            if is_staff { "admin" } else { "member" },
            user.username,
            user.id
        );

        self.issue_tokens(user)
    }

    /// 登录; 管理员/超级管理员入口拒绝身份不符的账号
    pub async fn login(&self, request: LoginRequest, scope: LoginScope) -> AppResult<AuthResponse> {
        let identifier = request.username.trim();
        let user = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(identifier))
                    .add(users::Column::Email.eq(identifier.to_lowercase())),
            )
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid credentials".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError("Invalid credentials".to_string()));
        }

        let allowed = match scope {
            LoginScope::Member => true,
            LoginScope::Staff => user.is_staff,
            LoginScope::Superuser => user.is_superuser,
        };
        if !allowed {
            return Err(AppError::Forbidden);
        }

        let mut model = user.into_active_model();
        model.is_logged_in = Set(true);
        model.updated_at = Set(Utc::now());
        let user = model.update(&self.pool).await?;

        self.issue_tokens(user)
    }

    /// 刷新令牌
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user_id = claims.user_id()?;

        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))?;

        self.issue_tokens(user)
    }

    /// 登出: 仅清除登录标记, JWT 无服务端状态
    pub async fn logout(&self, user_id: Uuid) -> AppResult<()> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let mut model = user.into_active_model();
        model.is_logged_in = Set(false);
        model.updated_at = Set(Utc::now());
        model.update(&self.pool).await?;
        Ok(())
    }

    /// 申请重置密码, 未知邮箱返回 404
    pub async fn request_password_reset(
        &self,
        request: PasswordResetRequest,
    ) -> AppResult<PasswordResetResponse> {
        let email = request.email.trim().to_lowercase();
        validate_email(&email)?;

        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let token = self
            .jwt_service
            .generate_password_reset_token(&user, password_fingerprint(&user.password_hash))?;

        log::info!("Password reset requested for user {}", user.id);
        Ok(PasswordResetResponse {
            uid: user.id,
            token,
        })
    }

    /// 用 uid + token 设置新密码; 令牌只能使用一次
    pub async fn confirm_password_reset(&self, request: PasswordResetConfirmRequest) -> AppResult<()> {
        let invalid = || AppError::ValidationError("Invalid token".to_string());

        let claims = self
            .jwt_service
            .verify_password_reset_token(&request.token)
            .map_err(|_| invalid())?;
        if claims.user_id().map_err(|_| invalid())? != request.uid {
            return Err(invalid());
        }

        let user = users::Entity::find_by_id(request.uid)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::ValidationError("Invalid UID".to_string()))?;

        if claims.pwd.as_deref() != Some(password_fingerprint(&user.password_hash).as_str()) {
            return Err(invalid());
        }

        validate_password(&request.new_password, &user.username)?;
        let password_hash = hash_password(&request.new_password)?;

        let user_id = user.id;
        let mut model = user.into_active_model();
        model.password_hash = Set(password_hash);
        model.updated_at = Set(Utc::now());
        model.update(&self.pool).await?;

        log::info!("Password reset completed for user {user_id}");
        Ok(())
    }

    fn issue_tokens(&self, user: users::Model) -> AppResult<AuthResponse> {
        let access_token = self.jwt_service.generate_access_token(&user)?;
        let refresh_token = self.jwt_service.generate_refresh_token(&user)?;

        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }
}
