#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use async_trait::async_trait;
use chrono::Utc;
use gym_backend::config::Config;
use gym_backend::entities::{gym_entity as gyms, user_entity as users};
use gym_backend::error::{AppError, AppResult};
use gym_backend::external::stripe_webhook::compute_signature;
use gym_backend::external::{
    CheckoutMode, CheckoutSessionParams, CouponInfo, CreatedSession, PaymentGateway, PriceParams,
    SessionDetails, SharedGateway, SubscriptionDetails,
};
use gym_backend::handlers;
use gym_backend::middlewares::AuthMiddleware;
use gym_backend::services::*;
use gym_backend::utils::JwtService;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

const TEST_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 8000
public_base_url = "https://gym.example.com"

[database]
url = "sqlite::memory:"
max_connections = 1

[jwt]
secret = "integration-test-secret"
access_token_expires_in = 3600
refresh_token_expires_in = 86400

[stripe]
secret_key = "sk_test_dummy"
webhook_secret = "whsec_test_secret"
"#;

/// 进程内的 Stripe 替身, 记录所有调用
#[derive(Default)]
pub struct FakeGateway {
    pub calls: Mutex<Vec<String>>,
    pub coupons: Mutex<HashMap<String, CouponInfo>>,
    pub customers: Mutex<HashMap<String, HashMap<String, String>>>,
    pub sessions: Mutex<HashMap<String, SessionDetails>>,
    pub subscriptions: Mutex<HashMap<String, SubscriptionDetails>>,
    pub session_params: Mutex<Vec<CheckoutSessionParams>>,
    counter: AtomicUsize,
}

impl FakeGateway {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn next(&self) -> usize {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn add_coupon(&self, id: &str, valid: bool) {
        self.coupons.lock().unwrap().insert(
            id.to_string(),
            CouponInfo {
                id: id.to_string(),
                valid,
            },
        );
    }

    pub fn add_customer(&self, id: &str, metadata: HashMap<String, String>) {
        self.customers.lock().unwrap().insert(id.to_string(), metadata);
    }

    pub fn add_subscription(&self, id: &str, customer_id: &str, status: &str) {
        let now = Utc::now().timestamp();
        self.subscriptions.lock().unwrap().insert(
            id.to_string(),
            SubscriptionDetails {
                id: id.to_string(),
                customer_id: customer_id.to_string(),
                status: status.to_string(),
                current_period_start: Some(now),
                current_period_end: Some(now + 30 * 24 * 3600),
            },
        );
    }

    pub fn last_session_params(&self) -> Option<CheckoutSessionParams> {
        self.session_params.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn retrieve_coupon(&self, code: &str) -> AppResult<Option<CouponInfo>> {
        self.record(format!("retrieve_coupon:{code}"));
        Ok(self.coupons.lock().unwrap().get(code).cloned())
    }

    async fn create_customer(
        &self,
        _email: Option<&str>,
        metadata: HashMap<String, String>,
    ) -> AppResult<String> {
        self.record("create_customer");
        let id = format!("cus_test_{}", self.next());
        self.add_customer(&id, metadata);
        Ok(id)
    }

    async fn retrieve_customer_metadata(
        &self,
        customer_id: &str,
    ) -> AppResult<HashMap<String, String>> {
        self.record(format!("retrieve_customer:{customer_id}"));
        self.customers
            .lock()
            .unwrap()
            .get(customer_id)
            .cloned()
            .ok_or_else(|| AppError::ExternalApiError(format!("No such customer {customer_id}")))
    }

    async fn create_checkout_session(
        &self,
        params: CheckoutSessionParams,
    ) -> AppResult<CreatedSession> {
        self.record(format!("create_checkout_session:{}", params.mode.as_str()));
        let n = self.next();
        let id = format!("cs_test_{n}");
        let details = SessionDetails {
            id: id.clone(),
            mode: params.mode,
            customer_id: Some(params.customer_id.clone()),
            payment_intent_id: match params.mode {
                CheckoutMode::Payment => Some(format!("pi_test_{n}")),
                CheckoutMode::Subscription => None,
            },
            subscription_id: match params.mode {
                CheckoutMode::Payment => None,
                CheckoutMode::Subscription => Some(format!("sub_test_{n}")),
            },
            amount_total: Some(4900),
            currency: Some("usd".to_string()),
        };
        self.sessions.lock().unwrap().insert(id.clone(), details);
        self.session_params.lock().unwrap().push(params);
        Ok(CreatedSession {
            url: Some(format!("https://checkout.stripe.com/c/pay/{id}")),
            id,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> AppResult<SessionDetails> {
        self.record(format!("retrieve_session:{session_id}"));
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| AppError::ExternalApiError(format!("No such session {session_id}")))
    }

    async fn retrieve_subscription(&self, subscription_id: &str) -> AppResult<SubscriptionDetails> {
        self.record(format!("retrieve_subscription:{subscription_id}"));
        self.subscriptions
            .lock()
            .unwrap()
            .get(subscription_id)
            .cloned()
            .ok_or_else(|| {
                AppError::ExternalApiError(format!("No such subscription {subscription_id}"))
            })
    }

    async fn create_product(&self, name: &str, _description: &str) -> AppResult<String> {
        self.record(format!("create_product:{name}"));
        Ok(format!("prod_test_{}", self.next()))
    }

    async fn update_product(&self, product_id: &str, name: &str, _description: &str) -> AppResult<()> {
        self.record(format!("update_product:{product_id}:{name}"));
        Ok(())
    }

    async fn create_price(&self, params: PriceParams) -> AppResult<String> {
        self.record(format!("create_price:{}:{}", params.product_id, params.unit_amount));
        Ok(format!("price_test_{}", self.next()))
    }

    async fn archive_price(&self, price_id: &str) -> AppResult<()> {
        self.record(format!("archive_price:{price_id}"));
        Ok(())
    }

    async fn exchange_connect_code(&self, code: &str) -> AppResult<String> {
        self.record(format!("exchange_connect_code:{code}"));
        Ok(format!("acct_{code}"))
    }
}

pub struct TestContext {
    pub pool: DatabaseConnection,
    pub gateway: Arc<FakeGateway>,
    pub jwt: JwtService,
    pub config: Config,
}

impl TestContext {
    pub async fn new() -> Self {
        let config = Config::parse(TEST_CONFIG).expect("test config");

        // 内存库每个连接各自独立, 只能用单连接
        let mut opts = ConnectOptions::new(config.database.url.clone());
        opts.max_connections(1).min_connections(1).sqlx_logging(false);
        let pool = Database::connect(opts).await.expect("sqlite connect");
        Migrator::up(&pool, None).await.expect("migrations");

        let jwt = JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_expires_in,
            config.jwt.refresh_token_expires_in,
        );

        Self {
            pool,
            gateway: Arc::new(FakeGateway::default()),
            jwt,
            config,
        }
    }

    pub fn shared_gateway(&self) -> SharedGateway {
        self.gateway.clone()
    }

    /// 直接落库, 跳过 bcrypt
    pub async fn create_user(&self, username: &str, is_staff: bool) -> users::Model {
        let now = Utc::now();
        users::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username.to_string()),
            email: Set(format!("{username}@example.com")),
            password_hash: Set("not-a-real-hash".to_string()),
            first_name: Set("Test".to_string()),
            last_name: Set("User".to_string()),
            phone_number: Set(None),
            country: Set(None),
            is_staff: Set(is_staff),
            is_superuser: Set(false),
            is_logged_in: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await
        .expect("insert user")
    }

    pub async fn create_gym(&self, admin: &users::Model, promo_code_offers: bool) -> gyms::Model {
        let now = Utc::now();
        gyms::ActiveModel {
            id: Set(Uuid::new_v4()),
            admin_id: Set(admin.id),
            gym_name: Set(format!("{} Fitness", admin.username)),
            owner_first_name: Set("Test".to_string()),
            owner_last_name: Set("Owner".to_string()),
            address: Set("1 Main St".to_string()),
            phone_number: Set("+1 555 0100".to_string()),
            email: Set(format!("gym-{}@example.com", admin.username)),
            promo_code_offers: Set(promo_code_offers),
            promo_code: Set(None),
            stripe_account_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await
        .expect("insert gym")
    }

    pub fn bearer(&self, user: &users::Model) -> (String, String) {
        let token = self.jwt.generate_access_token(user).expect("token");
        ("Authorization".to_string(), format!("Bearer {token}"))
    }
}

/// 和 main 相同的路由与中间件, 换成内存库与假网关
pub fn build_app(
    ctx: &TestContext,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody + use<>>,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let pool = ctx.pool.clone();
    let gateway = ctx.shared_gateway();
    let currency = ctx.config.stripe.currency.clone();

    let payment_service = PaymentService::new(pool.clone(), currency.clone());
    let customer_service = CustomerService::new(pool.clone());
    let reconcile_service = ReconcileService::new(
        pool.clone(),
        gateway.clone(),
        payment_service.clone(),
        customer_service.clone(),
        currency.clone(),
    );

    App::new()
        .wrap(AuthMiddleware::new(ctx.jwt.clone()))
        .app_data(web::Data::new(ctx.config.stripe.clone()))
        .app_data(web::Data::new(AuthService::new(pool.clone(), ctx.jwt.clone())))
        .app_data(web::Data::new(UserService::new(pool.clone())))
        .app_data(web::Data::new(GymService::new(pool.clone(), gateway.clone())))
        .app_data(web::Data::new(CatalogService::new(
            pool.clone(),
            gateway.clone(),
            currency,
        )))
        .app_data(web::Data::new(payment_service))
        .app_data(web::Data::new(customer_service))
        .app_data(web::Data::new(CheckoutService::new(
            pool.clone(),
            gateway,
            &ctx.config.server.public_base_url,
        )))
        .app_data(web::Data::new(reconcile_service))
        .app_data(web::Data::new(AttendanceService::new(pool.clone())))
        .app_data(web::Data::new(MentorService::new(pool.clone(), ctx.jwt.clone())))
        .app_data(web::Data::new(EventService::new(pool)))
        .configure(handlers::health_config)
        .configure(handlers::payment_config)
        .service(
            web::scope("/api/v1")
                .configure(handlers::auth_config)
                .configure(handlers::user_config)
                .configure(handlers::gym_config)
                .configure(handlers::customer_config)
                .configure(handlers::attendance_config)
                .configure(handlers::mentor_auth_config)
                .configure(handlers::public_event_config),
        )
}

/// 生成 `Stripe-Signature` 头
pub fn sign(payload: &str, secret: &str) -> String {
    let ts = Utc::now().timestamp();
    let sig = compute_signature(secret, ts, payload.as_bytes());
    format!("t={ts},v1={}", hex::encode(&sig))
}

pub fn metadata_for(gym_id: Uuid, user_id: Option<Uuid>, plan_name: &str) -> HashMap<String, String> {
    HashMap::from([
        ("username".to_string(), "member1".to_string()),
        ("first_name".to_string(), "Mia".to_string()),
        ("last_name".to_string(), "Lee".to_string()),
        ("gym_id".to_string(), gym_id.to_string()),
        (
            "user_id".to_string(),
            user_id.map(|u| u.to_string()).unwrap_or_default(),
        ),
        ("plan_name".to_string(), plan_name.to_string()),
    ])
}
