use crate::config::StripeConfig;
use crate::entities::PlanInterval;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

const CONNECT_TOKEN_URL: &str = "https://connect.stripe.com/oauth/token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutMode {
    Payment,
    Subscription,
}

impl CheckoutMode {
    /// `product_type == "subscription"` 走订阅模式, 其他都是一次性付款
    pub fn for_product_type(product_type: &str) -> Self {
        if product_type == "subscription" {
            CheckoutMode::Subscription
        } else {
            CheckoutMode::Payment
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutMode::Payment => "payment",
            CheckoutMode::Subscription => "subscription",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CouponInfo {
    pub id: String,
    pub valid: bool,
}

#[derive(Debug, Clone)]
pub struct CheckoutSessionParams {
    pub customer_id: String,
    pub price_id: String,
    pub mode: CheckoutMode,
    pub success_url: String,
    pub cancel_url: String,
    pub coupon: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreatedSession {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SessionDetails {
    pub id: String,
    pub mode: CheckoutMode,
    pub customer_id: Option<String>,
    pub payment_intent_id: Option<String>,
    pub subscription_id: Option<String>,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SubscriptionDetails {
    pub id: String,
    pub customer_id: String,
    pub status: String,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct PriceParams {
    pub product_id: String,
    pub unit_amount: i64,
    pub currency: String,
    /// 订阅计划: (interval, interval_count)
    pub recurring: Option<(PlanInterval, i32)>,
}

/// 对 Stripe 的所有出站调用
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// 不存在的 coupon 返回 `Ok(None)`
    async fn retrieve_coupon(&self, code: &str) -> AppResult<Option<CouponInfo>>;

    async fn create_customer(
        &self,
        email: Option<&str>,
        metadata: HashMap<String, String>,
    ) -> AppResult<String>;

    async fn retrieve_customer_metadata(
        &self,
        customer_id: &str,
    ) -> AppResult<HashMap<String, String>>;

    async fn create_checkout_session(
        &self,
        params: CheckoutSessionParams,
    ) -> AppResult<CreatedSession>;

    async fn retrieve_session(&self, session_id: &str) -> AppResult<SessionDetails>;

    async fn retrieve_subscription(&self, subscription_id: &str)
    -> AppResult<SubscriptionDetails>;

    async fn create_product(&self, name: &str, description: &str) -> AppResult<String>;

    async fn update_product(&self, product_id: &str, name: &str, description: &str)
    -> AppResult<()>;

    async fn create_price(&self, params: PriceParams) -> AppResult<String>;

    async fn archive_price(&self, price_id: &str) -> AppResult<()>;

    /// Stripe Connect OAuth: 用授权码换取 connected account id
    async fn exchange_connect_code(&self, code: &str) -> AppResult<String>;
}

pub type SharedGateway = Arc<dyn PaymentGateway>;

#[derive(Clone)]
pub struct StripeService {
    client: ::stripe::Client,
    http: reqwest::Client,
    config: StripeConfig,
}

#[derive(Debug, Deserialize)]
struct ConnectTokenResponse {
    stripe_user_id: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

fn parse_id<T: std::str::FromStr>(kind: &str, raw: &str) -> AppResult<T> {
    raw.parse::<T>()
        .map_err(|_| AppError::ValidationError(format!("Invalid Stripe {kind} id: {raw}")))
}

fn expandable_id<T>(value: &::stripe::Expandable<T>) -> String
where
    T: ::stripe::Object,
    T::Id: std::fmt::Display + Clone + Default,
{
    value.id().to_string()
}

impl StripeService {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: ::stripe::Client::new(config.secret_key.clone()),
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn into_shared(self) -> SharedGateway {
        Arc::new(self)
    }

    fn currency(&self, raw: &str) -> ::stripe::Currency {
        raw.to_lowercase()
            .parse::<::stripe::Currency>()
            .or_else(|_| self.config.currency.parse::<::stripe::Currency>())
            .unwrap_or(::stripe::Currency::USD)
    }
}

#[async_trait]
impl PaymentGateway for StripeService {
    async fn retrieve_coupon(&self, code: &str) -> AppResult<Option<CouponInfo>> {
        let coupon_id: ::stripe::CouponId = parse_id("coupon", code)?;
        match ::stripe::Coupon::retrieve(&self.client, &coupon_id, &[]).await {
            Ok(coupon) => Ok(Some(CouponInfo {
                id: coupon.id.to_string(),
                valid: coupon.valid.unwrap_or(false),
            })),
            Err(::stripe::StripeError::Stripe(err)) if err.http_status == 404 => {
                log::info!("Coupon {code} not found in Stripe");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create_customer(
        &self,
        email: Option<&str>,
        metadata: HashMap<String, String>,
    ) -> AppResult<String> {
        let mut params = ::stripe::CreateCustomer::new();
        params.email = email;
        params.metadata = Some(metadata);

        let customer = ::stripe::Customer::create(&self.client, params).await?;
        Ok(customer.id.to_string())
    }

    async fn retrieve_customer_metadata(
        &self,
        customer_id: &str,
    ) -> AppResult<HashMap<String, String>> {
        let id: ::stripe::CustomerId = parse_id("customer", customer_id)?;
        let customer = ::stripe::Customer::retrieve(&self.client, &id, &[]).await?;
        Ok(customer.metadata.unwrap_or_default())
    }

    async fn create_checkout_session(
        &self,
        params: CheckoutSessionParams,
    ) -> AppResult<CreatedSession> {
        let customer_id: ::stripe::CustomerId = parse_id("customer", &params.customer_id)?;

        let mut create = ::stripe::CreateCheckoutSession::new();
        create.customer = Some(customer_id);
        create.mode = Some(match params.mode {
            CheckoutMode::Payment => ::stripe::CheckoutSessionMode::Payment,
            CheckoutMode::Subscription => ::stripe::CheckoutSessionMode::Subscription,
        });
        create.success_url = Some(&params.success_url);
        create.cancel_url = Some(&params.cancel_url);
        create.payment_method_types =
            Some(vec![::stripe::CreateCheckoutSessionPaymentMethodTypes::Card]);
        create.line_items = Some(vec![::stripe::CreateCheckoutSessionLineItems {
            price: Some(params.price_id.clone()),
            quantity: Some(1),
            ..Default::default()
        }]);
        if let Some(coupon) = &params.coupon {
            create.discounts = Some(vec![::stripe::CreateCheckoutSessionDiscounts {
                coupon: Some(coupon.clone()),
                ..Default::default()
            }]);
        }

        let session = ::stripe::CheckoutSession::create(&self.client, create).await?;
        log::info!(
            "Created Stripe checkout session {} (mode={})",
            session.id,
            params.mode.as_str()
        );

        Ok(CreatedSession {
            id: session.id.to_string(),
            url: session.url,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> AppResult<SessionDetails> {
        let id: ::stripe::CheckoutSessionId = parse_id("checkout session", session_id)?;
        let session = ::stripe::CheckoutSession::retrieve(&self.client, &id, &[]).await?;

        Ok(SessionDetails {
            id: session.id.to_string(),
            mode: match session.mode {
                ::stripe::CheckoutSessionMode::Subscription => CheckoutMode::Subscription,
                _ => CheckoutMode::Payment,
            },
            customer_id: session.customer.as_ref().map(expandable_id),
            payment_intent_id: session.payment_intent.as_ref().map(expandable_id),
            subscription_id: session.subscription.as_ref().map(expandable_id),
            amount_total: session.amount_total,
            currency: session.currency.map(|c| c.to_string()),
        })
    }

    async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> AppResult<SubscriptionDetails> {
        let id: ::stripe::SubscriptionId = parse_id("subscription", subscription_id)?;
        let sub = ::stripe::Subscription::retrieve(&self.client, &id, &[]).await?;

        Ok(SubscriptionDetails {
            id: sub.id.to_string(),
            customer_id: expandable_id(&sub.customer),
            status: sub.status.as_str().to_string(),
            current_period_start: Some(sub.current_period_start),
            current_period_end: Some(sub.current_period_end),
        })
    }

    async fn create_product(&self, name: &str, description: &str) -> AppResult<String> {
        let mut params = ::stripe::CreateProduct::new(name);
        params.description = Some(description);

        let product = ::stripe::Product::create(&self.client, params).await?;
        Ok(product.id.to_string())
    }

    async fn update_product(
        &self,
        product_id: &str,
        name: &str,
        description: &str,
    ) -> AppResult<()> {
        let id: ::stripe::ProductId = parse_id("product", product_id)?;
        let mut params = ::stripe::UpdateProduct::new();
        params.name = Some(name);
        params.description = Some(description.to_string());

        ::stripe::Product::update(&self.client, &id, params).await?;
        Ok(())
    }

    async fn create_price(&self, params: PriceParams) -> AppResult<String> {
        let mut create = ::stripe::CreatePrice::new(self.currency(&params.currency));
        create.product = Some(::stripe::IdOrCreate::Id(&params.product_id));
        create.unit_amount = Some(params.unit_amount);
        if let Some((interval, count)) = params.recurring {
            create.recurring = Some(::stripe::CreatePriceRecurring {
                interval: match interval {
                    PlanInterval::Day => ::stripe::CreatePriceRecurringInterval::Day,
                    PlanInterval::Week => ::stripe::CreatePriceRecurringInterval::Week,
                    PlanInterval::Month => ::stripe::CreatePriceRecurringInterval::Month,
                    PlanInterval::Year => ::stripe::CreatePriceRecurringInterval::Year,
                },
                interval_count: Some(count.max(1) as u64),
                ..Default::default()
            });
        }

        let price = ::stripe::Price::create(&self.client, create).await?;
        Ok(price.id.to_string())
    }

    async fn archive_price(&self, price_id: &str) -> AppResult<()> {
        let id: ::stripe::PriceId = parse_id("price", price_id)?;
        let mut params = ::stripe::UpdatePrice::new();
        params.active = Some(false);

        ::stripe::Price::update(&self.client, &id, params).await?;
        Ok(())
    }

    async fn exchange_connect_code(&self, code: &str) -> AppResult<String> {
        let form = [
            ("client_secret", self.config.secret_key.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
        ];

        let response = self.http.post(CONNECT_TOKEN_URL).form(&form).send().await?;
        let status = response.status();
        let body: ConnectTokenResponse = response.json().await?;

        match body.stripe_user_id {
            Some(account_id) if status.is_success() => Ok(account_id),
            _ => Err(AppError::ExternalApiError(format!(
                "Stripe Connect token exchange failed: {} {}",
                body.error.unwrap_or_else(|| status.to_string()),
                body.error_description.unwrap_or_default()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_mode_selection() {
        assert_eq!(
            CheckoutMode::for_product_type("subscription"),
            CheckoutMode::Subscription
        );
        assert_eq!(CheckoutMode::for_product_type("one_time"), CheckoutMode::Payment);
        assert_eq!(CheckoutMode::for_product_type(""), CheckoutMode::Payment);
    }

    #[test]
    fn test_stripe_service_creation() {
        let config = StripeConfig {
            secret_key: "sk_test_123".to_string(),
            webhook_secret: "whsec_123".to_string(),
            connect_client_id: None,
            currency: "usd".to_string(),
            webhook_tolerance_secs: 300,
        };
        let service = StripeService::new(config);
        assert_eq!(service.currency("EUR"), ::stripe::Currency::EUR);
        assert_eq!(service.currency("not-a-currency"), ::stripe::Currency::USD);
    }
}
