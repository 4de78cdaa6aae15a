use super::gym_service::find_owned_gym;
use crate::entities::{PlanStatus, customer_entity as customers};
use crate::error::{AppError, AppResult};
use crate::middlewares::AuthUser;
use crate::models::*;
use crate::utils::validate_length;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

/// 由 Stripe 订阅还原出的会员信息
#[derive(Debug, Clone)]
pub struct SubscriptionRecord {
    pub stripe_subscription_id: String,
    pub gym_id: Uuid,
    pub user_id: Option<Uuid>,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub plan_name: String,
    pub plan_status: PlanStatus,
    pub plan_start_date: Option<DateTime<Utc>>,
    pub plan_end_date: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct CustomerService {
    pool: DatabaseConnection,
}

impl CustomerService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn find_by_subscription(
        &self,
        stripe_subscription_id: &str,
    ) -> AppResult<Option<customers::Model>> {
        Ok(customers::Entity::find()
            .filter(customers::Column::StripeSubscriptionId.eq(stripe_subscription_id))
            .one(&self.pool)
            .await?)
    }

    /// 按 `stripe_subscription_id` upsert
    pub async fn upsert_from_subscription(
        &self,
        record: SubscriptionRecord,
    ) -> AppResult<customers::Model> {
        let key = record.stripe_subscription_id.clone();
        let now = Utc::now();
        let model = customers::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(record.user_id),
            gym_id: Set(record.gym_id),
            username: Set(record.username),
            first_name: Set(record.first_name),
            last_name: Set(record.last_name),
            plan_name: Set(record.plan_name),
            plan_status: Set(record.plan_status),
            plan_start_date: Set(record.plan_start_date),
            plan_end_date: Set(record.plan_end_date),
            stripe_subscription_id: Set(Some(record.stripe_subscription_id)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        customers::Entity::insert(model)
            .on_conflict(
                OnConflict::column(customers::Column::StripeSubscriptionId)
                    .update_columns([
                        customers::Column::UserId,
                        customers::Column::GymId,
                        customers::Column::Username,
                        customers::Column::FirstName,
                        customers::Column::LastName,
                        customers::Column::PlanName,
                        customers::Column::PlanStatus,
                        customers::Column::PlanStartDate,
                        customers::Column::PlanEndDate,
                        customers::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;

        self.find_by_subscription(&key).await?.ok_or_else(|| {
            AppError::InternalError(format!("customer for {key} vanished after upsert"))
        })
    }

    /// 只刷新状态与计费周期, 行不存在时返回 `Ok(None)`
    pub async fn update_subscription_state(
        &self,
        stripe_subscription_id: &str,
        plan_status: PlanStatus,
        plan_start_date: Option<DateTime<Utc>>,
        plan_end_date: Option<DateTime<Utc>>,
    ) -> AppResult<Option<customers::Model>> {
        let Some(customer) = self.find_by_subscription(stripe_subscription_id).await? else {
            return Ok(None);
        };

        let mut model = customer.into_active_model();
        model.plan_status = Set(plan_status);
        if plan_start_date.is_some() {
            model.plan_start_date = Set(plan_start_date);
        }
        if plan_end_date.is_some() {
            model.plan_end_date = Set(plan_end_date);
        }
        model.updated_at = Set(Utc::now());
        Ok(Some(model.update(&self.pool).await?))
    }

    /// 删除该订阅对应的所有会员行, 返回删除条数
    pub async fn delete_by_subscription(&self, stripe_subscription_id: &str) -> AppResult<u64> {
        let result = customers::Entity::delete_many()
            .filter(customers::Column::StripeSubscriptionId.eq(stripe_subscription_id))
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn list_for_gym(
        &self,
        actor: &AuthUser,
        gym_id: Uuid,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<CustomerResponse>> {
        find_owned_gym(&self.pool, actor, gym_id).await?;

        let offset = params.get_offset();
        let limit = params.get_limit();
        let base_query = customers::Entity::find().filter(customers::Column::GymId.eq(gym_id));
        let total = base_query.clone().count(&self.pool).await? as i64;

        let rows = base_query
            .order_by(customers::Column::CreatedAt, Order::Desc)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(CustomerResponse::from).collect(),
            params.get_page(),
            limit,
            total,
        ))
    }

    /// 当前用户在所有健身房的订阅
    pub async fn my_subscriptions(&self, actor: &AuthUser) -> AppResult<Vec<CustomerResponse>> {
        let rows = customers::Entity::find()
            .filter(customers::Column::UserId.eq(actor.id))
            .order_by_desc(customers::Column::UpdatedAt)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(CustomerResponse::from).collect())
    }

    pub async fn create_manual(
        &self,
        actor: &AuthUser,
        gym_id: Uuid,
        request: CreateCustomerRequest,
    ) -> AppResult<CustomerResponse> {
        let gym = find_owned_gym(&self.pool, actor, gym_id).await?;
        validate_length("username", &request.username, 50)?;
        validate_length("plan_name", &request.plan_name, 50)?;

        let now = Utc::now();
        let customer = customers::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(request.user_id),
            gym_id: Set(gym.id),
            username: Set(request.username),
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            plan_name: Set(request.plan_name),
            plan_status: Set(request.plan_status.unwrap_or(PlanStatus::Pending)),
            plan_start_date: Set(request.plan_start_date),
            plan_end_date: Set(request.plan_end_date),
            stripe_subscription_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await?;

        Ok(CustomerResponse::from(customer))
    }

    async fn find_in_gym(&self, gym_id: Uuid, customer_id: Uuid) -> AppResult<customers::Model> {
        customers::Entity::find_by_id(customer_id)
            .filter(customers::Column::GymId.eq(gym_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))
    }

    pub async fn update_manual(
        &self,
        actor: &AuthUser,
        gym_id: Uuid,
        customer_id: Uuid,
        request: UpdateCustomerRequest,
    ) -> AppResult<CustomerResponse> {
        find_owned_gym(&self.pool, actor, gym_id).await?;
        let mut model = self.find_in_gym(gym_id, customer_id).await?.into_active_model();

        if let Some(v) = request.first_name {
            model.first_name = Set(v);
        }
        if let Some(v) = request.last_name {
            model.last_name = Set(v);
        }
        if let Some(v) = request.plan_name {
            validate_length("plan_name", &v, 50)?;
            model.plan_name = Set(v);
        }
        if let Some(v) = request.plan_status {
            model.plan_status = Set(v);
        }
        if let Some(v) = request.plan_start_date {
            model.plan_start_date = Set(Some(v));
        }
        if let Some(v) = request.plan_end_date {
            model.plan_end_date = Set(Some(v));
        }
        model.updated_at = Set(Utc::now());

        Ok(CustomerResponse::from(model.update(&self.pool).await?))
    }

    pub async fn delete_manual(
        &self,
        actor: &AuthUser,
        gym_id: Uuid,
        customer_id: Uuid,
    ) -> AppResult<()> {
        find_owned_gym(&self.pool, actor, gym_id).await?;
        let customer = self.find_in_gym(gym_id, customer_id).await?;
        customer.delete(&self.pool).await?;
        Ok(())
    }
}
