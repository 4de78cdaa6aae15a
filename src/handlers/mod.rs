pub mod attendance;
pub mod auth;
pub mod catalog;
pub mod customer;
pub mod event;
pub mod gym;
pub mod mentor;
pub mod payment;
pub mod user;

pub use attendance::attendance_config;
pub use auth::auth_config;
pub use customer::customer_config;
pub use event::public_event_config;
pub use gym::gym_config;
pub use mentor::mentor_auth_config;
pub use payment::payment_config;
pub use user::user_config;

use actix_web::{HttpResponse, Result, web};
use serde_json::json;

pub async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({ "status": "ok" })))
}

pub fn health_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}
