use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use gym_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::StripeService,
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // 创建JWT服务
    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );

    // Stripe 出站调用统一走 PaymentGateway
    let gateway = StripeService::new(config.stripe.clone()).into_shared();
    let currency = config.stripe.currency.clone();

    // 创建服务
    let auth_service = AuthService::new(pool.clone(), jwt_service.clone());
    let user_service = UserService::new(pool.clone());
    let gym_service = GymService::new(pool.clone(), gateway.clone());
    let catalog_service = CatalogService::new(pool.clone(), gateway.clone(), currency.clone());
    let payment_service = PaymentService::new(pool.clone(), currency.clone());
    let customer_service = CustomerService::new(pool.clone());
    let checkout_service =
        CheckoutService::new(pool.clone(), gateway.clone(), &config.server.public_base_url);
    let reconcile_service = ReconcileService::new(
        pool.clone(),
        gateway.clone(),
        payment_service.clone(),
        customer_service.clone(),
        currency,
    );
    let attendance_service = AttendanceService::new(pool.clone());
    let mentor_service = MentorService::new(pool.clone(), jwt_service.clone());
    let event_service = EventService::new(pool.clone());
    let stripe_config = config.stripe.clone();
    let allowed_origins = config.server.allowed_origins.clone();

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors(&allowed_origins))
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(stripe_config.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(gym_service.clone()))
            .app_data(web::Data::new(catalog_service.clone()))
            .app_data(web::Data::new(payment_service.clone()))
            .app_data(web::Data::new(customer_service.clone()))
            .app_data(web::Data::new(checkout_service.clone()))
            .app_data(web::Data::new(reconcile_service.clone()))
            .app_data(web::Data::new(attendance_service.clone()))
            .app_data(web::Data::new(mentor_service.clone()))
            .app_data(web::Data::new(event_service.clone()))
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
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
