use super::gym_service::{find_gym, find_owned_gym};
use crate::entities::{product_entity as products, subscription_plan_entity as plans};
use crate::error::{AppError, AppResult};
use crate::external::{PriceParams, SharedGateway};
use crate::middlewares::AuthUser;
use crate::models::*;
use crate::utils::validate_length;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

fn validate_price(price_cents: i64) -> AppResult<()> {
    if price_cents <= 0 {
        return Err(AppError::ValidationError(
            "price_cents must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

fn validate_interval_count(count: i32) -> AppResult<()> {
    if !(1..=365).contains(&count) {
        return Err(AppError::ValidationError(
            "interval_count must be between 1 and 365".to_string(),
        ));
    }
    Ok(())
}

/// 商品与订阅计划, 每条记录在 Stripe 上镜像一个 product + price
#[derive(Clone)]
pub struct CatalogService {
    pool: DatabaseConnection,
    gateway: SharedGateway,
    currency: String,
}

impl CatalogService {
    pub fn new(pool: DatabaseConnection, gateway: SharedGateway, currency: String) -> Self {
        Self {
            pool,
            gateway,
            currency,
        }
    }

    // ---------------------------------------------------------------- products

    pub async fn create_product(
        &self,
        actor: &AuthUser,
        gym_id: Uuid,
        request: CreateProductRequest,
    ) -> AppResult<ProductResponse> {
        let gym = find_owned_gym(&self.pool, actor, gym_id).await?;

        validate_length("name", &request.name, 30)?;
        validate_length("product_type", &request.product_type, 50)?;
        validate_length("description", &request.description, 100)?;
        validate_price(request.price_cents)?;
        if request.stock < 0 {
            return Err(AppError::ValidationError("stock cannot be negative".to_string()));
        }

        let stripe_product_id = self
            .gateway
            .create_product(&request.name, &request.description)
            .await?;
        let stripe_price_id = self
            .gateway
            .create_price(PriceParams {
                product_id: stripe_product_id.clone(),
                unit_amount: request.price_cents,
                currency: self.currency.clone(),
                recurring: None,
            })
            .await?;

        let now = Utc::now();
        let product = products::ActiveModel {
            id: Set(Uuid::new_v4()),
            gym_id: Set(gym.id),
            admin_id: Set(gym.admin_id),
            name: Set(request.name),
            product_type: Set(request.product_type),
            description: Set(request.description),
            reviews: Set(request.reviews),
            stock: Set(request.stock),
            price_cents: Set(request.price_cents),
            stripe_product_id: Set(Some(stripe_product_id)),
            stripe_price_id: Set(Some(stripe_price_id)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await?;

        log::info!("Product {} created for gym {}", product.id, gym.id);
        Ok(ProductResponse::from(product))
    }

    pub async fn list_products(&self, gym_id: Uuid) -> AppResult<Vec<ProductResponse>> {
        find_gym(&self.pool, gym_id).await?;
        let rows = products::Entity::find()
            .filter(products::Column::GymId.eq(gym_id))
            .order_by_desc(products::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ProductResponse::from).collect())
    }

    async fn find_product(&self, gym_id: Uuid, product_id: Uuid) -> AppResult<products::Model> {
        products::Entity::find_by_id(product_id)
            .filter(products::Column::GymId.eq(gym_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    pub async fn get_product(&self, gym_id: Uuid, product_id: Uuid) -> AppResult<ProductResponse> {
        Ok(ProductResponse::from(self.find_product(gym_id, product_id).await?))
    }

    pub async fn update_product(
        &self,
        actor: &AuthUser,
        gym_id: Uuid,
        product_id: Uuid,
        request: UpdateProductRequest,
    ) -> AppResult<ProductResponse> {
        find_owned_gym(&self.pool, actor, gym_id).await?;
        let product = self.find_product(gym_id, product_id).await?;

        let name = request.name.clone().unwrap_or_else(|| product.name.clone());
        let description = request
            .description
            .clone()
            .unwrap_or_else(|| product.description.clone());
        validate_length("name", &name, 30)?;
        validate_length("description", &description, 100)?;
        if let Some(t) = &request.product_type {
            validate_length("product_type", t, 50)?;
        }
        if let Some(stock) = request.stock
            && stock < 0
        {
            return Err(AppError::ValidationError("stock cannot be negative".to_string()));
        }
        if let Some(p) = request.price_cents {
            validate_price(p)?;
        }

        let (stripe_product_id, stripe_price_id) = self
            .sync_provider(
                product.stripe_product_id.clone(),
                product.stripe_price_id.clone(),
                (&product.name, &product.description),
                (&name, &description),
                product.price_cents,
                request.price_cents,
                None,
            )
            .await?;

        let mut model = product.into_active_model();
        model.name = Set(name);
        model.description = Set(description);
        if let Some(t) = request.product_type {
            model.product_type = Set(t);
        }
        if let Some(r) = request.reviews {
            model.reviews = Set(Some(r));
        }
        if let Some(s) = request.stock {
            model.stock = Set(s);
        }
        if let Some(p) = request.price_cents {
            model.price_cents = Set(p);
        }
        model.stripe_product_id = Set(stripe_product_id);
        model.stripe_price_id = Set(stripe_price_id);
        model.updated_at = Set(Utc::now());

        let product = model.update(&self.pool).await?;
        Ok(ProductResponse::from(product))
    }

    pub async fn delete_product(
        &self,
        actor: &AuthUser,
        gym_id: Uuid,
        product_id: Uuid,
    ) -> AppResult<()> {
        find_owned_gym(&self.pool, actor, gym_id).await?;
        let product = self.find_product(gym_id, product_id).await?;
        self.archive_quietly(product.stripe_price_id.as_deref()).await;
        product.delete(&self.pool).await?;
        Ok(())
    }

    // ---------------------------------------------------------------- plans

    pub async fn create_plan(
        &self,
        actor: &AuthUser,
        gym_id: Uuid,
        request: CreatePlanRequest,
    ) -> AppResult<PlanResponse> {
        let gym = find_owned_gym(&self.pool, actor, gym_id).await?;

        validate_length("plan_name", &request.plan_name, 30)?;
        validate_length("description", &request.description, 100)?;
        validate_price(request.price_cents)?;
        validate_interval_count(request.interval_count)?;

        let stripe_product_id = self
            .gateway
            .create_product(&request.plan_name, &request.description)
            .await?;
        let stripe_price_id = self
            .gateway
            .create_price(PriceParams {
                product_id: stripe_product_id.clone(),
                unit_amount: request.price_cents,
                currency: self.currency.clone(),
                recurring: Some((request.interval, request.interval_count)),
            })
            .await?;

        let now = Utc::now();
        let plan = plans::ActiveModel {
            id: Set(Uuid::new_v4()),
            gym_id: Set(gym.id),
            admin_id: Set(gym.admin_id),
            plan_name: Set(request.plan_name),
            description: Set(request.description),
            price_cents: Set(request.price_cents),
            interval: Set(request.interval),
            interval_count: Set(request.interval_count),
            stripe_product_id: Set(Some(stripe_product_id)),
            stripe_price_id: Set(Some(stripe_price_id)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await?;

        log::info!("Subscription plan {} created for gym {}", plan.id, gym.id);
        Ok(PlanResponse::from(plan))
    }

    pub async fn list_plans(&self, gym_id: Uuid) -> AppResult<Vec<PlanResponse>> {
        find_gym(&self.pool, gym_id).await?;
        let rows = plans::Entity::find()
            .filter(plans::Column::GymId.eq(gym_id))
            .order_by_asc(plans::Column::PriceCents)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(PlanResponse::from).collect())
    }

    async fn find_plan(&self, gym_id: Uuid, plan_id: Uuid) -> AppResult<plans::Model> {
        plans::Entity::find_by_id(plan_id)
            .filter(plans::Column::GymId.eq(gym_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription plan not found".to_string()))
    }

    pub async fn get_plan(&self, gym_id: Uuid, plan_id: Uuid) -> AppResult<PlanResponse> {
        Ok(PlanResponse::from(self.find_plan(gym_id, plan_id).await?))
    }

    pub async fn update_plan(
        &self,
        actor: &AuthUser,
        gym_id: Uuid,
        plan_id: Uuid,
        request: UpdatePlanRequest,
    ) -> AppResult<PlanResponse> {
        find_owned_gym(&self.pool, actor, gym_id).await?;
        let plan = self.find_plan(gym_id, plan_id).await?;

        let name = request
            .plan_name
            .clone()
            .unwrap_or_else(|| plan.plan_name.clone());
        let description = request
            .description
            .clone()
            .unwrap_or_else(|| plan.description.clone());
        let interval = request.interval.unwrap_or(plan.interval);
        let interval_count = request.interval_count.unwrap_or(plan.interval_count);
        validate_length("plan_name", &name, 30)?;
        validate_length("description", &description, 100)?;
        validate_interval_count(interval_count)?;
        if let Some(p) = request.price_cents {
            validate_price(p)?;
        }

        // 计费周期变化同样需要新 price
        let billing_changed = interval != plan.interval || interval_count != plan.interval_count;
        let new_price = match request.price_cents {
            Some(p) => Some(p),
            None if billing_changed => Some(plan.price_cents),
            None => None,
        };
        let current_price = if billing_changed { 0 } else { plan.price_cents };

        let (stripe_product_id, stripe_price_id) = self
            .sync_provider(
                plan.stripe_product_id.clone(),
                plan.stripe_price_id.clone(),
                (&plan.plan_name, &plan.description),
                (&name, &description),
                current_price,
                new_price,
                Some((interval, interval_count)),
            )
            .await?;

        let mut model = plan.into_active_model();
        model.plan_name = Set(name);
        model.description = Set(description);
        model.interval = Set(interval);
        model.interval_count = Set(interval_count);
        if let Some(p) = new_price {
            model.price_cents = Set(p);
        }
        model.stripe_product_id = Set(stripe_product_id);
        model.stripe_price_id = Set(stripe_price_id);
        model.updated_at = Set(Utc::now());

        let plan = model.update(&self.pool).await?;
        Ok(PlanResponse::from(plan))
    }

    pub async fn delete_plan(&self, actor: &AuthUser, gym_id: Uuid, plan_id: Uuid) -> AppResult<()> {
        find_owned_gym(&self.pool, actor, gym_id).await?;
        let plan = self.find_plan(gym_id, plan_id).await?;
        self.archive_quietly(plan.stripe_price_id.as_deref()).await;
        plan.delete(&self.pool).await?;
        Ok(())
    }

    // ---------------------------------------------------------------- provider

    /// 同步 Stripe product/price: 名称描述变化更新 product;
    /// 价格变化创建新 price 并归档旧 price, price 本身从不修改
    #[allow(clippy::too_many_arguments)]
    async fn sync_provider(
        &self,
        product_id: Option<String>,
        price_id: Option<String>,
        (old_name, old_description): (&str, &str),
        (name, description): (&str, &str),
        current_price: i64,
        new_price: Option<i64>,
        recurring: Option<(crate::entities::PlanInterval, i32)>,
    ) -> AppResult<(Option<String>, Option<String>)> {
        // 先校验, 避免 product 已改名而 price 创建失败
        if let Some(amount) = new_price {
            validate_price(amount)?;
        }

        let product_id = match product_id {
            Some(id) => {
                if old_name != name || old_description != description {
                    self.gateway.update_product(&id, name, description).await?;
                }
                id
            }
            None => self.gateway.create_product(name, description).await?,
        };

        let price_id = match new_price {
            Some(amount) if amount != current_price || price_id.is_none() => {
                let created = self
                    .gateway
                    .create_price(PriceParams {
                        product_id: product_id.clone(),
                        unit_amount: amount,
                        currency: self.currency.clone(),
                        recurring,
                    })
                    .await?;
                if let Some(old) = &price_id {
                    self.gateway.archive_price(old).await?;
                }
                log::info!("Replaced Stripe price {:?} with {created}", price_id);
                Some(created)
            }
            _ => price_id,
        };

        Ok((Some(product_id), price_id))
    }

    async fn archive_quietly(&self, price_id: Option<&str>) {
        if let Some(price_id) = price_id
            && let Err(e) = self.gateway.archive_price(price_id).await
        {
            log::warn!("Failed to archive Stripe price {price_id}: {e}");
        }
    }
}
