use super::gym_service::find_gym;
use crate::entities::order_entity as orders;
use crate::error::{AppError, AppResult};
use crate::external::{CheckoutMode, CheckoutSessionParams, SharedGateway};
use crate::models::*;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

const SUCCESS_PATH: &str = "/payment/payment-success/";
const CANCEL_PATH: &str = "/payment/payment-cancel/";
/// Stripe 在跳转时替换该占位符
const SESSION_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

fn required(value: &Option<String>, field: &str) -> AppResult<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::ValidationError(format!("{field} is required")))
}

#[derive(Clone)]
pub struct CheckoutService {
    pool: DatabaseConnection,
    gateway: SharedGateway,
    public_base_url: String,
}

impl CheckoutService {
    pub fn new(pool: DatabaseConnection, gateway: SharedGateway, public_base_url: &str) -> Self {
        Self {
            pool,
            gateway,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn success_url(&self, query: &str) -> String {
        format!("{}{SUCCESS_PATH}?{query}", self.public_base_url)
    }

    fn cancel_url(&self) -> String {
        format!("{}{CANCEL_PATH}", self.public_base_url)
    }

    /// 发起结账
    ///
    /// - `payment_type == "cod"`: 只写本地订单, 不调用 Stripe
    /// - 其他: 创建 Stripe customer (metadata 携带买家信息) 与 hosted checkout session
    ///
    /// Stripe 调用失败时不写任何本地数据
    pub async fn create_checkout(&self, request: CheckoutRequest) -> AppResult<CheckoutResponse> {
        let price_id = required(&request.stripe_price_id, "stripe_price_id")?;
        let product_type = required(&request.product_type, "product_type")?;
        let gym_id = request
            .gym_id
            .ok_or_else(|| AppError::ValidationError("gym_id is required".to_string()))?;
        let gym = find_gym(&self.pool, gym_id).await?;

        if request.is_cod() {
            return self.create_cod_order(gym.id, &request).await;
        }

        // 只有开启优惠码的健身房才校验并附带 coupon
        let coupon = match request.promo_code.as_deref().map(str::trim) {
            Some(code) if gym.promo_code_offers && !code.is_empty() => {
                match self.gateway.retrieve_coupon(code).await? {
                    Some(c) if c.valid => Some(c.id),
                    _ => {
                        log::warn!("Rejected promo code {code} for gym {}", gym.id);
                        return Err(AppError::ValidationError("Invalid promo code".to_string()));
                    }
                }
            }
            _ => None,
        };

        let mode = CheckoutMode::for_product_type(&product_type);
        let metadata = CheckoutMetadata::from_request(&request).into_map();
        let customer_id = self
            .gateway
            .create_customer(request.email.as_deref(), metadata)
            .await?;

        let session = self
            .gateway
            .create_checkout_session(CheckoutSessionParams {
                customer_id,
                price_id,
                mode,
                success_url: self.success_url(&format!("session_id={SESSION_PLACEHOLDER}")),
                cancel_url: self.cancel_url(),
                coupon,
            })
            .await?;

        log::info!(
            "Checkout session {} created for gym {} ({})",
            session.id,
            gym.id,
            mode.as_str()
        );

        Ok(CheckoutResponse::Session {
            success_url: self.success_url(&format!("session_id={}", session.id)),
            cancel_url: self.cancel_url(),
            session_id: session.id,
            session_url: session.url,
        })
    }

    async fn create_cod_order(
        &self,
        gym_id: Uuid,
        request: &CheckoutRequest,
    ) -> AppResult<CheckoutResponse> {
        let s = |v: &Option<String>| v.clone().unwrap_or_default();
        let order = orders::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(request.user_id),
            gym_id: Set(gym_id),
            product_id: Set(request.product_id),
            plan_name: Set(request.plan_name.clone()),
            username: Set(s(&request.username)),
            first_name: Set(s(&request.first_name)),
            last_name: Set(s(&request.last_name)),
            address: Set(s(&request.address)),
            phone_number: Set(s(&request.phone_number)),
            country: Set(s(&request.country)),
            pin_code: Set(s(&request.pin_code)),
            payment_type: Set("cod".to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.pool)
        .await?;

        log::info!("Cash-on-delivery order {} created for gym {gym_id}", order.id);

        Ok(CheckoutResponse::CashOnDelivery {
            success_url: self.success_url(&format!("order_id={}", order.id)),
            message: "Order placed successfully with cash on delivery".to_string(),
        })
    }
}
