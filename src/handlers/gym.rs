use crate::error::AppError;
use crate::middlewares::current_user;
use crate::models::*;
use crate::services::GymService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

pub async fn create_gym(
    gym_service: web::Data<GymService>,
    req: HttpRequest,
    request: web::Json<CreateGymRequest>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match gym_service.create_gym(&actor, request.into_inner()).await {
        Ok(gym) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": gym
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn list_gyms(gym_service: web::Data<GymService>) -> Result<HttpResponse> {
    match gym_service.list_gyms().await {
        Ok(gyms) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": gyms
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn get_gym(
    gym_service: web::Data<GymService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match gym_service.get_gym(path.into_inner()).await {
        Ok(gym) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": gym
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn get_my_gym(
    gym_service: web::Data<GymService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match gym_service.get_my_gym(&actor).await {
        Ok(gym) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": gym
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn update_my_gym(
    gym_service: web::Data<GymService>,
    req: HttpRequest,
    request: web::Json<UpdateGymRequest>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match gym_service.update_my_gym(&actor, request.into_inner()).await {
        Ok(gym) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": gym
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn delete_my_gym(
    gym_service: web::Data<GymService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match gym_service.delete_my_gym(&actor).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(e.error_response()),
    }
}

/// Stripe Connect OAuth 回调
pub async fn stripe_callback(
    gym_service: web::Data<GymService>,
    req: HttpRequest,
    query: web::Query<StripeCallbackQuery>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    let query = query.into_inner();
    if let Some(error) = query.error {
        log::warn!("Stripe Connect authorization denied for admin {}: {error}", actor.id);
        return Ok(AppError::ValidationError(format!("Stripe authorization failed: {error}"))
            .error_response());
    }
    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        return Ok(AppError::ValidationError("Missing authorization code".to_string())
            .error_response());
    };

    match gym_service.connect_stripe_account(&actor, &code).await {
        Ok(gym) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": gym
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// `/gyms` 下所有路由共用一个 scope, 健身房子资源在这里挂载;
/// 静态路径必须注册在 `/{id}` 之前
pub fn gym_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/gyms")
            .configure(super::catalog::catalog_routes)
            .configure(super::customer::gym_customer_routes)
            .configure(super::mentor::mentor_routes)
            .configure(super::event::event_routes)
            .route("", web::post().to(create_gym))
            .route("", web::get().to(list_gyms))
            .route("/mine", web::get().to(get_my_gym))
            .route("/mine", web::put().to(update_my_gym))
            .route("/mine", web::delete().to(delete_my_gym))
            .route("/stripe/callback", web::get().to(stripe_callback))
            .route("/{id}", web::get().to(get_gym)),
    );
}
