use crate::error::AppError;
use crate::middlewares::{bearer_token, current_user};
use crate::models::*;
use crate::services::MentorService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

pub async fn create_mentor(
    mentor_service: web::Data<MentorService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<CreateMentorRequest>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match mentor_service
        .create_mentor(&actor, path.into_inner(), request.into_inner())
        .await
    {
        Ok(mentor) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": mentor
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn list_mentors(
    mentor_service: web::Data<MentorService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match mentor_service.list_mentors(path.into_inner()).await {
        Ok(mentors) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": mentors
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn get_mentor(
    mentor_service: web::Data<MentorService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (gym_id, mentor_id) = path.into_inner();
    match mentor_service.get_mentor(gym_id, mentor_id).await {
        Ok(mentor) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": mentor
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn update_mentor(
    mentor_service: web::Data<MentorService>,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
    request: web::Json<UpdateMentorRequest>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    let (gym_id, mentor_id) = path.into_inner();

    match mentor_service
        .update_mentor(&actor, gym_id, mentor_id, request.into_inner())
        .await
    {
        Ok(mentor) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": mentor
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn delete_mentor(
    mentor_service: web::Data<MentorService>,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    let (gym_id, mentor_id) = path.into_inner();

    match mentor_service.delete_mentor(&actor, gym_id, mentor_id).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn mentor_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{gym_id}/mentors", web::post().to(create_mentor))
        .route("/{gym_id}/mentors", web::get().to(list_mentors))
        .route("/{gym_id}/mentors/{id}", web::get().to(get_mentor))
        .route("/{gym_id}/mentors/{id}", web::put().to(update_mentor))
        .route("/{gym_id}/mentors/{id}", web::delete().to(delete_mentor));
}

pub async fn mentor_login(
    mentor_service: web::Data<MentorService>,
    request: web::Json<MentorLoginRequest>,
) -> Result<HttpResponse> {
    match mentor_service.login(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn mentor_refresh(
    mentor_service: web::Data<MentorService>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse> {
    match mentor_service.refresh_token(&request.refresh_token).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn mentor_logout(
    mentor_service: web::Data<MentorService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let Some(token) = bearer_token(req.headers()) else {
        return Ok(AppError::AuthError("Missing access token".to_string()).error_response());
    };

    match mentor_service.logout(&token).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Logged out"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 教练登录相关接口, 挂在 `/api/v1/mentors`
pub fn mentor_auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/mentors")
            .route("/login", web::post().to(mentor_login))
            .route("/refresh", web::post().to(mentor_refresh))
            .route("/logout", web::post().to(mentor_logout)),
    );
}
