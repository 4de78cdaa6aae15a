use super::gym_service::find_owned_gym;
use crate::entities::{PaymentStatus, payment_entity as payments};
use crate::error::{AppError, AppResult};
use crate::middlewares::AuthUser;
use crate::models::*;
use crate::utils::validate_length;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

/// 一笔待写入台账的支付, 以 `stripe_payment_id` 作为幂等键
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    pub user_id: Option<Uuid>,
    pub gym_id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub plan_name: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub stripe_payment_id: String,
    pub stripe_session_id: Option<String>,
}

#[derive(Clone)]
pub struct PaymentService {
    pool: DatabaseConnection,
    default_currency: String,
}

impl PaymentService {
    pub fn new(pool: DatabaseConnection, default_currency: String) -> Self {
        Self {
            pool,
            default_currency,
        }
    }

    /// 按 `stripe_payment_id` upsert; webhook 与成功回调重复到达时只会留下一行
    pub async fn upsert_payment(&self, record: PaymentRecord) -> AppResult<payments::Model> {
        let key = record.stripe_payment_id.clone();
        let now = Utc::now();
        let model = payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(record.user_id),
            gym_id: Set(record.gym_id),
            username: Set(record.username),
            first_name: Set(record.first_name),
            last_name: Set(record.last_name),
            plan_name: Set(record.plan_name),
            amount_cents: Set(record.amount_cents),
            currency: Set(record.currency),
            status: Set(record.status),
            stripe_payment_id: Set(record.stripe_payment_id),
            stripe_session_id: Set(record.stripe_session_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        payments::Entity::insert(model)
            .on_conflict(
                OnConflict::column(payments::Column::StripePaymentId)
                    .update_columns([
                        payments::Column::UserId,
                        payments::Column::GymId,
                        payments::Column::Username,
                        payments::Column::FirstName,
                        payments::Column::LastName,
                        payments::Column::PlanName,
                        payments::Column::AmountCents,
                        payments::Column::Currency,
                        payments::Column::Status,
                        payments::Column::StripeSessionId,
                        payments::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;

        self.find_by_key(&key)
            .await?
            .ok_or_else(|| AppError::InternalError(format!("payment {key} vanished after upsert")))
    }

    pub async fn find_by_key(&self, stripe_payment_id: &str) -> AppResult<Option<payments::Model>> {
        Ok(payments::Entity::find()
            .filter(payments::Column::StripePaymentId.eq(stripe_payment_id))
            .one(&self.pool)
            .await?)
    }

    /// 只更新已存在的记录; 返回是否命中
    pub async fn mark_succeeded(&self, stripe_payment_id: &str) -> AppResult<bool> {
        let Some(payment) = self.find_by_key(stripe_payment_id).await? else {
            return Ok(false);
        };
        if payment.status == PaymentStatus::Succeeded {
            return Ok(true);
        }

        let mut model = payment.into_active_model();
        model.status = Set(PaymentStatus::Succeeded);
        model.updated_at = Set(Utc::now());
        model.update(&self.pool).await?;
        Ok(true)
    }

    /// 健身房支付明细, 按时间倒序分页
    pub async fn list_for_gym(
        &self,
        actor: &AuthUser,
        query: &PaymentListQuery,
    ) -> AppResult<PaginatedResponse<PaymentResponse>> {
        find_owned_gym(&self.pool, actor, query.gym_id).await?;

        let params = PaginationParams::new(query.page, query.page_size);
        let offset = params.get_offset();
        let limit = params.get_limit();

        let base_query = payments::Entity::find().filter(payments::Column::GymId.eq(query.gym_id));
        let total = base_query.clone().count(&self.pool).await? as i64;

        let rows = base_query
            .order_by(payments::Column::CreatedAt, Order::Desc)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(PaymentResponse::from).collect(),
            params.get_page(),
            limit,
            total,
        ))
    }

    /// 前台手工录入
    pub async fn create_manual(
        &self,
        actor: &AuthUser,
        request: CreatePaymentRequest,
    ) -> AppResult<PaymentResponse> {
        let gym = find_owned_gym(&self.pool, actor, request.gym_id).await?;

        validate_length("username", &request.username, 50)?;
        validate_length("plan_name", &request.plan_name, 50)?;
        if request.amount_cents < 0 {
            return Err(AppError::ValidationError("amount_cents cannot be negative".to_string()));
        }

        if let Some(currency) = &request.currency
            && currency.len() != 3
        {
            return Err(AppError::ValidationError(
                "currency must be a 3-letter ISO code".to_string(),
            ));
        }

        let key = request
            .stripe_payment_id
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| format!("manual_{}", Uuid::new_v4().simple()));

        // 手工录入只插入, 不能覆盖已有的支付记录 (包括其他健身房的 Stripe 支付)
        let now = Utc::now();
        let payment = payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(request.user_id),
            gym_id: Set(gym.id),
            username: Set(request.username),
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            plan_name: Set(request.plan_name),
            amount_cents: Set(request.amount_cents),
            currency: Set(request
                .currency
                .map(|c| c.to_lowercase())
                .unwrap_or_else(|| self.default_currency.clone())),
            status: Set(request.status.unwrap_or(PaymentStatus::Succeeded)),
            stripe_payment_id: Set(key.clone()),
            stripe_session_id: Set(None),
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
                AppError::Conflict(format!("Payment {key} is already recorded"))
            } else {
                AppError::DatabaseError(e)
            }
        })?;

        log::info!("Manual payment {} recorded for gym {}", payment.id, gym.id);
        Ok(PaymentResponse::from(payment))
    }

    pub async fn update_payment(
        &self,
        actor: &AuthUser,
        payment_id: Uuid,
        request: UpdatePaymentRequest,
    ) -> AppResult<PaymentResponse> {
        let payment = payments::Entity::find_by_id(payment_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;
        find_owned_gym(&self.pool, actor, payment.gym_id).await?;

        let mut model = payment.into_active_model();
        if let Some(status) = request.status {
            model.status = Set(status);
        }
        if let Some(amount) = request.amount_cents {
            if amount < 0 {
                return Err(AppError::ValidationError(
                    "amount_cents cannot be negative".to_string(),
                ));
            }
            model.amount_cents = Set(amount);
        }
        if let Some(plan_name) = request.plan_name {
            validate_length("plan_name", &plan_name, 50)?;
            model.plan_name = Set(plan_name);
        }
        model.updated_at = Set(Utc::now());

        let payment = model.update(&self.pool).await?;
        Ok(PaymentResponse::from(payment))
    }
}
