use crate::entities::{gym_entity as gyms, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::external::SharedGateway;
use crate::middlewares::AuthUser;
use crate::models::*;
use crate::utils::{validate_email, validate_length, validate_phone};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

/// 读取健身房并校验当前用户是其管理员 (超级管理员放行)
pub async fn find_owned_gym(
    pool: &DatabaseConnection,
    actor: &AuthUser,
    gym_id: Uuid,
) -> AppResult<gyms::Model> {
    let gym = find_gym(pool, gym_id).await?;
    if gym.admin_id != actor.id && !actor.is_superuser {
        return Err(AppError::Forbidden);
    }
    Ok(gym)
}

pub async fn find_gym(pool: &DatabaseConnection, gym_id: Uuid) -> AppResult<gyms::Model> {
    gyms::Entity::find_by_id(gym_id)
        .one(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Gym not found".to_string()))
}

#[derive(Clone)]
pub struct GymService {
    pool: DatabaseConnection,
    gateway: SharedGateway,
}

impl GymService {
    pub fn new(pool: DatabaseConnection, gateway: SharedGateway) -> Self {
        Self { pool, gateway }
    }

    pub async fn create_gym(&self, actor: &AuthUser, request: CreateGymRequest) -> AppResult<GymResponse> {
        // 管理员标记以数据库为准, token 可能是旧的
        let admin = users::Entity::find_by_id(actor.id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        if !admin.is_staff {
            return Err(AppError::Forbidden);
        }

        validate_length("gym_name", &request.gym_name, 50)?;
        validate_length("owner_first_name", &request.owner_first_name, 50)?;
        validate_length("owner_last_name", &request.owner_last_name, 50)?;
        validate_length("address", &request.address, 200)?;
        validate_phone(&request.phone_number)?;
        validate_email(&request.email)?;

        let existing = gyms::Entity::find()
            .filter(gyms::Column::AdminId.eq(admin.id))
            .one(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::ValidationError(
                "This admin already manages a gym".to_string(),
            ));
        }

        let now = Utc::now();
        let gym = gyms::ActiveModel {
            id: Set(Uuid::new_v4()),
            admin_id: Set(admin.id),
            gym_name: Set(request.gym_name.trim().to_string()),
            owner_first_name: Set(request.owner_first_name),
            owner_last_name: Set(request.owner_last_name),
            address: Set(request.address),
            phone_number: Set(request.phone_number),
            email: Set(request.email),
            promo_code_offers: Set(request.promo_code_offers),
            promo_code: Set(request.promo_code.filter(|c| !c.trim().is_empty())),
            stripe_account_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await
        .map_err(|e| {
            // 并发创建时由唯一索引兜底
            if matches!(
                e.sql_err(),
                Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
            ) {
                AppError::ValidationError("This admin already manages a gym".to_string())
            } else {
                AppError::DatabaseError(e)
            }
        })?;

        log::info!("Gym {} created by admin {}", gym.id, admin.id);
        Ok(GymResponse::from(gym))
    }

    pub async fn list_gyms(&self) -> AppResult<Vec<GymResponse>> {
        let rows = gyms::Entity::find()
            .order_by_asc(gyms::Column::GymName)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(GymResponse::from).collect())
    }

    pub async fn get_gym(&self, gym_id: Uuid) -> AppResult<GymResponse> {
        Ok(GymResponse::from(find_gym(&self.pool, gym_id).await?))
    }

    async fn my_gym(&self, actor: &AuthUser) -> AppResult<gyms::Model> {
        gyms::Entity::find()
            .filter(gyms::Column::AdminId.eq(actor.id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("No gym registered for this admin".to_string()))
    }

    pub async fn get_my_gym(&self, actor: &AuthUser) -> AppResult<GymResponse> {
        Ok(GymResponse::from(self.my_gym(actor).await?))
    }

    pub async fn update_my_gym(
        &self,
        actor: &AuthUser,
        request: UpdateGymRequest,
    ) -> AppResult<GymResponse> {
        let mut model = self.my_gym(actor).await?.into_active_model();

        if let Some(v) = request.gym_name {
            validate_length("gym_name", &v, 50)?;
            model.gym_name = Set(v.trim().to_string());
        }
        if let Some(v) = request.owner_first_name {
            validate_length("owner_first_name", &v, 50)?;
            model.owner_first_name = Set(v);
        }
        if let Some(v) = request.owner_last_name {
            validate_length("owner_last_name", &v, 50)?;
            model.owner_last_name = Set(v);
        }
        if let Some(v) = request.address {
            validate_length("address", &v, 200)?;
            model.address = Set(v);
        }
        if let Some(v) = request.phone_number {
            validate_phone(&v)?;
            model.phone_number = Set(v);
        }
        if let Some(v) = request.email {
            validate_email(&v)?;
            model.email = Set(v);
        }
        if let Some(v) = request.promo_code_offers {
            model.promo_code_offers = Set(v);
        }
        if let Some(v) = request.promo_code {
            model.promo_code = Set(Some(v).filter(|c| !c.trim().is_empty()));
        }
        model.updated_at = Set(Utc::now());

        let gym = model.update(&self.pool).await?;
        Ok(GymResponse::from(gym))
    }

    pub async fn delete_my_gym(&self, actor: &AuthUser) -> AppResult<()> {
        let gym = self.my_gym(actor).await?;
        let gym_id = gym.id;
        gym.delete(&self.pool).await?;
        log::info!("Gym {gym_id} deleted by admin {}", actor.id);
        Ok(())
    }

    /// Stripe Connect 授权回调: 用 code 换 account id, 只允许绑定一次
    pub async fn connect_stripe_account(
        &self,
        actor: &AuthUser,
        code: &str,
    ) -> AppResult<GymResponse> {
        let gym = self.my_gym(actor).await?;
        if gym.stripe_account_id.is_some() {
            return Err(AppError::ValidationError(
                "Stripe account already connected".to_string(),
            ));
        }

        let account_id = self.gateway.exchange_connect_code(code).await?;

        let mut model = gym.into_active_model();
        model.stripe_account_id = Set(Some(account_id.clone()));
        model.updated_at = Set(Utc::now());
        let gym = model.update(&self.pool).await?;

        log::info!("Gym {} connected Stripe account {account_id}", gym.id);
        Ok(GymResponse::from(gym))
    }
}
